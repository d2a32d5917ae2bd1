//! Base tool-name synthesis.

use crate::extract::extract_resource_and_action;
use crate::lexicon::ActionLexicon;
use crate::operation::{HttpMethod, Operation};
use crate::sanitize::{sanitize, to_snake_case};
use crate::tokenize::split_identifier;

const CRUD_METHOD_PREFIXES: &[&str] = &["get_", "post_", "put_", "patch_", "delete_"];

/// True when `identifier` looks machine-generated from the method and path
/// (`get_users_id`, `post_api_v1_orders`, `put_pet_pet_id`).
#[must_use]
pub fn looks_auto_generated(identifier: &str, method: &HttpMethod) -> bool {
    let lower = identifier.to_ascii_lowercase();
    if lower.starts_with(&format!("{}_", method.as_lower())) || lower.contains("api_v") {
        return true;
    }
    CRUD_METHOD_PREFIXES.iter().any(|prefix| {
        lower
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.contains('_'))
    })
}

/// True when `identifier` reads like something an author named on purpose: at least two words,
/// or a single action word. `operation123` and `users` are not.
#[must_use]
pub fn has_friendly_shape(identifier: &str, lexicon: &ActionLexicon) -> bool {
    let words = split_identifier(identifier);
    match words.as_slice() {
        [] => false,
        [single] => lexicon.is_action_word(single),
        _ => true,
    }
}

/// Base tool name for `op`, before collision resolution.
///
/// An author-supplied identifier is snake_cased and used as-is. Otherwise the name is built from
/// the method and the resource/action inferred from the path.
#[must_use]
pub fn synthesize_name(op: &Operation, lexicon: &ActionLexicon) -> String {
    let identifier = op.identifier.trim();
    if !identifier.is_empty()
        && !looks_auto_generated(identifier, &op.method)
        && has_friendly_shape(identifier, lexicon)
    {
        return sanitize(&to_snake_case(identifier));
    }

    sanitize(&name_from_path(op, lexicon))
}

fn name_from_path(op: &Operation, lexicon: &ActionLexicon) -> String {
    let ra = extract_resource_and_action(&op.path_template, lexicon);
    let resource = ra.resource.as_str();

    match &op.method {
        HttpMethod::Get if op.has_path_parameter() => verb_resource("get", resource),
        HttpMethod::Get if resource.is_empty() => "list".to_string(),
        // The trailing "s" is appended even to resources that are already plural.
        HttpMethod::Get => format!("list_{resource}s"),
        HttpMethod::Post => match ra.action.as_deref() {
            Some(action) if ra.is_degenerate() => action.to_string(),
            Some(action) => verb_resource(action, resource),
            None => verb_resource("create", resource),
        },
        HttpMethod::Put => verb_resource("update", resource),
        HttpMethod::Patch => verb_resource("patch", resource),
        HttpMethod::Delete => verb_resource("delete", resource),
        other => verb_resource(other.as_lower(), resource),
    }
}

fn verb_resource(verb: &str, resource: &str) -> String {
    if resource.is_empty() {
        verb.to_string()
    } else {
        format!("{verb}_{resource}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(method: HttpMethod, path: &str) -> String {
        synthesize_name(&Operation::new(method, path), &ActionLexicon::default())
    }

    fn named(method: HttpMethod, path: &str, identifier: &str) -> String {
        synthesize_name(
            &Operation::new(method, path).with_identifier(identifier),
            &ActionLexicon::default(),
        )
    }

    #[test]
    fn get_single_and_collection() {
        assert_eq!(name(HttpMethod::Get, "/users/{id}"), "get_user");
        assert_eq!(name(HttpMethod::Get, "/users"), "list_users");
        assert_eq!(name(HttpMethod::Get, "/api/v1/users/{id}"), "get_user");
    }

    #[test]
    fn list_appends_s_regardless_of_plurality() {
        assert_eq!(name(HttpMethod::Get, "/news"), "list_news");
        assert_eq!(name(HttpMethod::Get, "/data"), "list_datas");
    }

    #[test]
    fn post_create_action_and_degenerate() {
        assert_eq!(name(HttpMethod::Post, "/users"), "create_user");
        assert_eq!(name(HttpMethod::Post, "/users/search"), "search_user");
        assert_eq!(name(HttpMethod::Post, "/calculate"), "calculate");
        assert_eq!(
            name(HttpMethod::Post, "/accounts/{id}/activate"),
            "activate_account"
        );
    }

    #[test]
    fn other_crud_methods() {
        assert_eq!(name(HttpMethod::Put, "/users/{id}"), "update_user");
        assert_eq!(name(HttpMethod::Patch, "/users/{id}"), "patch_user");
        assert_eq!(name(HttpMethod::Delete, "/users/{id}"), "delete_user");
        assert_eq!(name(HttpMethod::Head, "/users/{id}"), "head_user");
        assert_eq!(
            name(HttpMethod::Other("propfind".into()), "/folders/{id}"),
            "propfind_folder"
        );
    }

    #[test]
    fn empty_path_uses_bare_verb() {
        assert_eq!(name(HttpMethod::Get, "/"), "list");
        assert_eq!(name(HttpMethod::Post, "/api/v1"), "create");
    }

    #[test]
    fn friendly_identifier_wins_over_path() {
        assert_eq!(
            named(HttpMethod::Get, "/pet/{petId}", "getPetById"),
            "get_pet_by_id"
        );
        assert_eq!(
            named(HttpMethod::Post, "/reports/run", "generate-report"),
            "generate_report"
        );
        assert_eq!(named(HttpMethod::Post, "/x", "search"), "search");
    }

    #[test]
    fn auto_generated_identifier_falls_through() {
        assert_eq!(
            named(HttpMethod::Get, "/users/{id}", "get_users_id"),
            "get_user"
        );
        assert_eq!(
            named(HttpMethod::Post, "/orders", "post_api_v1_orders"),
            "create_order"
        );
        assert_eq!(
            named(HttpMethod::Put, "/users/{id}", "delete_users_by_id"),
            "update_user"
        );
    }

    #[test]
    fn unfriendly_identifier_falls_through() {
        assert_eq!(
            named(HttpMethod::Get, "/users/{id}", "operation123"),
            "get_user"
        );
        assert_eq!(named(HttpMethod::Get, "/users", "users"), "list_users");
    }

    #[test]
    fn auto_generated_detection() {
        assert!(looks_auto_generated("get_users", &HttpMethod::Get));
        assert!(looks_auto_generated("GET_users", &HttpMethod::Get));
        assert!(looks_auto_generated("fetchApi_v2Users", &HttpMethod::Get));
        assert!(looks_auto_generated("patch_user_id", &HttpMethod::Post));
        assert!(!looks_auto_generated("patch_user", &HttpMethod::Post));
        assert!(!looks_auto_generated("getUser", &HttpMethod::Get));
    }
}

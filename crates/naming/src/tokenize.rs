//! Path and identifier tokenization.

/// `{name}` placeholder segment of a path template.
#[must_use]
pub fn is_path_parameter(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

/// `v` followed by digits only (`v1`, `V20`); `v1.2` is not a bare marker.
fn is_bare_version(segment: &str) -> bool {
    segment
        .strip_prefix(['v', 'V'])
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn is_generic_segment(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("api")
        || segment.eq_ignore_ascii_case("apis")
        || is_bare_version(segment)
}

/// Semantic path segments in path order, original case preserved.
///
/// Drops empty segments, `{param}` placeholders, `api`/`apis`, and bare version markers.
#[must_use]
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && !is_path_parameter(s) && !is_generic_segment(s))
        .collect()
}

/// Lowercase semantic tokens of a URL path template.
#[must_use]
pub fn tokenize_path(path: &str) -> Vec<String> {
    path_segments(path)
        .into_iter()
        .map(str::to_lowercase)
        .collect()
}

/// Split a camelCase / PascalCase / kebab-case / snake_case identifier into lowercase words.
///
/// Boundaries: any non-alphanumeric character, a lowercase-to-uppercase transition, and the end
/// of an acronym (`HTTPResponse` splits before `R`).
#[must_use]
pub fn split_identifier(ident: &str) -> Vec<String> {
    let chars: Vec<char> = ident.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut tokens, &mut current);
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                flush(&mut tokens, &mut current);
            }
        }
        current.push(c);
    }
    flush(&mut tokens, &mut current);

    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(current.to_lowercase());
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_drops_params_prefixes_and_versions() {
        assert_eq!(tokenize_path("/api/v1/users/{id}"), vec!["users"]);
        assert_eq!(
            tokenize_path("/apis/V2/Orders/{orderId}/items"),
            vec!["orders", "items"]
        );
        assert_eq!(tokenize_path("//users///search/"), vec!["users", "search"]);
        assert!(tokenize_path("/").is_empty());
    }

    #[test]
    fn dotted_versions_and_version_like_words_are_kept() {
        assert_eq!(tokenize_path("/v1.2/users"), vec!["v1.2", "users"]);
        assert_eq!(tokenize_path("/videos/v"), vec!["videos", "v"]);
    }

    #[test]
    fn single_action_path_survives() {
        assert_eq!(tokenize_path("/calculate"), vec!["calculate"]);
    }

    #[test]
    fn segments_keep_original_case() {
        assert_eq!(path_segments("/api/userProfiles/{id}"), vec!["userProfiles"]);
    }

    #[test]
    fn identifier_splits_on_case_and_separators() {
        assert_eq!(split_identifier("getUserById"), vec!["get", "user", "by", "id"]);
        assert_eq!(split_identifier("ListPets"), vec!["list", "pets"]);
        assert_eq!(split_identifier("bulk-export"), vec!["bulk", "export"]);
        assert_eq!(split_identifier("create_user"), vec!["create", "user"]);
        assert_eq!(split_identifier("operation123"), vec!["operation123"]);
    }

    #[test]
    fn identifier_splits_acronyms() {
        assert_eq!(split_identifier("getUserID"), vec!["get", "user", "id"]);
        assert_eq!(
            split_identifier("parseHTTPResponse"),
            vec!["parse", "http", "response"]
        );
        assert_eq!(split_identifier("IDToken"), vec!["id", "token"]);
    }
}

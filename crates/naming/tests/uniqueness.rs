use std::collections::HashSet;

use openapi_mcp_naming::{HttpMethod, Operation, ParamLocation, Parameter, ToolNamer};
use regex::Regex;

const PREFIXES: &[&str] = &["", "/v1", "/v2", "/api/v1", "/api/v2", "/v1.1", "/V2", "/apis"];
const RESOURCES: &[&str] = &["users", "orders", "user-profiles", "categories"];
const SHAPES: &[&str] = &["", "/{id}", "/{userId}", "/search", "/{id}/activate", "/{id}/items"];
const IDENTIFIERS: &[&str] = &[
    "",
    "getUser",
    "get_users_id",
    "operation123",
    "listUsers",
    "fetchUserById",
    "users",
];

fn methods() -> Vec<HttpMethod> {
    vec![
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
        HttpMethod::parse("PROPFIND"),
    ]
}

fn permutations() -> Vec<Operation> {
    let mut ops = Vec::new();
    for prefix in PREFIXES {
        for resource in RESOURCES {
            for shape in SHAPES {
                for method in methods() {
                    for identifier in IDENTIFIERS {
                        let path = format!("{prefix}/{resource}{shape}");
                        let mut op = Operation::new(method.clone(), path)
                            .with_identifier(*identifier);
                        if shape.contains('{') {
                            op = op.with_parameter(Parameter::new(
                                "id",
                                ParamLocation::Path,
                                true,
                            ));
                        }
                        ops.push(op);
                    }
                }
            }
        }
    }
    ops
}

#[test]
fn generated_names_are_unique_and_well_formed() {
    let ops = permutations();
    let names = ToolNamer::default().assign_names(&ops);
    assert_eq!(names.len(), ops.len());

    let shape = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
    let mut seen = HashSet::new();
    for (op, name) in ops.iter().zip(&names) {
        let name = name
            .as_deref()
            .unwrap_or_else(|| panic!("no name for {} {}", op.method, op.path_template));
        assert!(shape.is_match(name), "malformed name {name:?}");
        assert!(seen.insert(name.to_string()), "duplicate name {name:?}");
    }
}

#[test]
fn identical_operations_still_get_distinct_names() {
    let op = Operation::new(HttpMethod::Get, "/users/{id}").with_identifier("getUser");
    let ops = vec![op.clone(), op.clone(), op.clone(), op];
    let names: Vec<String> = ToolNamer::default()
        .assign_names(&ops)
        .into_iter()
        .map(Option::unwrap)
        .collect();
    assert_eq!(
        names,
        ["get_user", "get_user_alt", "get_user_alt_2", "get_user_alt_3"]
    );
}

#[test]
fn versioned_duplicates_keep_first_bare() {
    let ops = vec![
        Operation::new(HttpMethod::Get, "/api/v1/users/{id}").with_identifier("getUser"),
        Operation::new(HttpMethod::Get, "/api/v2/users/{id}").with_identifier("getUser"),
    ];
    let names = ToolNamer::default().assign_names(&ops);
    assert_eq!(names[0].as_deref(), Some("get_user"));
    assert_eq!(names[1].as_deref(), Some("get_user_v2"));
}

#[test]
fn declaration_order_decides_the_winner() {
    let a = Operation::new(HttpMethod::Get, "/api/v1/users/{id}").with_identifier("getUser");
    let b = Operation::new(HttpMethod::Get, "/api/v2/users/{id}").with_identifier("getUser");
    let namer = ToolNamer::default();

    let forward = namer.assign_names(&[a.clone(), b.clone()]);
    let reverse = namer.assign_names(&[b, a]);
    assert_eq!(forward[0].as_deref(), Some("get_user"));
    assert_eq!(reverse[0].as_deref(), Some("get_user"));
    assert_eq!(reverse[1].as_deref(), Some("get_user_v1"));
}

#[test]
fn descriptions_follow_operations() {
    let namer = ToolNamer::default();
    let op = Operation::new(HttpMethod::Get, "/users/{id}")
        .with_summary("Get user")
        .with_parameter(Parameter::new("id", ParamLocation::Path, true));
    assert_eq!(namer.describe(&op), "Get user. Requires: id.");
    assert_eq!(namer.base_name(&op), "get_user");
}

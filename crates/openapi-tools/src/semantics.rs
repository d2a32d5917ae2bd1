//! MCP tool annotations from HTTP method semantics (RFC 9110).

use openapi_mcp_naming::HttpMethod;
use rmcp::model::ToolAnnotations;

/// Hints for a tool forwarding `method`. Every tool is open-world; extension methods get no
/// other hints.
#[must_use]
pub fn annotations_for_method(method: &HttpMethod, title: Option<String>) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match method {
        HttpMethod::Get | HttpMethod::Head | HttpMethod::Options | HttpMethod::Trace => {
            (Some(true), Some(false), Some(true))
        }
        HttpMethod::Post => (Some(false), Some(false), Some(false)),
        HttpMethod::Put | HttpMethod::Delete => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent.
        HttpMethod::Patch => (Some(false), Some(true), None),
        HttpMethod::Other(_) => (None, None, None),
    };

    ToolAnnotations {
        title,
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_methods_are_read_only() {
        for m in [HttpMethod::Get, HttpMethod::Head, HttpMethod::Options] {
            let a = annotations_for_method(&m, None);
            assert_eq!(a.read_only_hint, Some(true), "{m}");
            assert_eq!(a.idempotent_hint, Some(true), "{m}");
            assert_eq!(a.open_world_hint, Some(true), "{m}");
        }
    }

    #[test]
    fn unsafe_methods() {
        let post = annotations_for_method(&HttpMethod::Post, None);
        assert_eq!(post.destructive_hint, Some(false));
        assert_eq!(post.idempotent_hint, Some(false));

        let delete = annotations_for_method(&HttpMethod::Delete, Some("Delete a pet".into()));
        assert_eq!(delete.destructive_hint, Some(true));
        assert_eq!(delete.title.as_deref(), Some("Delete a pet"));

        let patch = annotations_for_method(&HttpMethod::Patch, None);
        assert_eq!(patch.idempotent_hint, None);
    }

    #[test]
    fn extension_methods_only_set_open_world() {
        let a = annotations_for_method(&HttpMethod::parse("PROPFIND"), None);
        assert_eq!(a.read_only_hint, None);
        assert_eq!(a.destructive_hint, None);
        assert_eq!(a.idempotent_hint, None);
        assert_eq!(a.open_world_hint, Some(true));
    }
}

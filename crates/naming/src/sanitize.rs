//! Tool-name character hygiene.

/// Force `raw` into a valid tool name.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, surrounding underscores are trimmed, a leading
/// digit gets an `api_` prefix, and the result is lowercased. Empty or purely symbolic input
/// yields an empty string. Idempotent.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let trimmed = replaced.trim_matches('_');
    let name = if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("api_{trimmed}")
    } else {
        trimmed.to_string()
    };

    name.to_ascii_lowercase()
}

/// Convert a camelCase / PascalCase / kebab-case identifier to snake_case.
///
/// Hyphens become underscores, `_` is inserted at lowercase-to-uppercase transitions, the result
/// is lowercased, runs of underscores collapse to one, and outer underscores are trimmed.
#[must_use]
pub fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev_lower = false;

    for c in ident.chars() {
        let c = if c == '-' { '_' } else { c };
        if c.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_lowercase();
        out.extend(c.to_lowercase());
    }

    let mut collapsed = String::with_capacity(out.len());
    for c in out.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('_').to_string()
}

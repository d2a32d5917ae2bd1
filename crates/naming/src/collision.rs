//! Disambiguation of colliding base names.

use crate::operation::Operation;
use crate::sanitize::sanitize;
use crate::tokenize::{split_identifier, tokenize_path};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static VERSION_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|/)(v\d+(?:\.\d+)?)(?:/|$)").expect("version segment pattern is valid")
});

/// Which rule produced a disambiguated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionStrategy {
    VersionTag,
    IdentifierFragment,
    UniquePathSegment,
    MethodSuffix,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: String,
    pub strategy: CollisionStrategy,
}

/// Lowercase `vN` / `vN.M` segment of `path`, if any.
#[must_use]
pub fn version_tag(path: &str) -> Option<String> {
    VERSION_SEGMENT
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Derive a free name for `new_op`, whose base name `base` is already owned by `existing_op`.
///
/// Strategies run in a fixed order: version tag, identifier fragment, unique path segment,
/// method suffix, `_alt` fallback. A strategy only wins when its candidate is not `taken`;
/// otherwise the next one is tried. The fallback counts up (`_alt`, `_alt_2`, ...) until free.
pub fn resolve_collision(
    base: &str,
    new_op: &Operation,
    existing_op: &Operation,
    taken: impl Fn(&str) -> bool,
) -> Resolution {
    let free = |suffix: &str| {
        let candidate = sanitize(&format!("{base}_{suffix}"));
        (!taken(&candidate)).then_some(candidate)
    };
    let base_last = base.rsplit('_').next().unwrap_or(base);

    if let Some(name) = version_tag(&new_op.path_template).and_then(|v| free(&v)) {
        return Resolution {
            name,
            strategy: CollisionStrategy::VersionTag,
        };
    }

    let new_id = new_op.identifier.trim();
    let existing_id = existing_op.identifier.trim();
    if !new_id.is_empty() && !existing_id.is_empty() && new_id != existing_id {
        let fragment = split_identifier(new_id).pop();
        if let Some(name) = fragment
            .filter(|f| f != base_last)
            .and_then(|f| free(&f))
        {
            return Resolution {
                name,
                strategy: CollisionStrategy::IdentifierFragment,
            };
        }
    }

    let existing_tokens: HashSet<String> = tokenize_path(&existing_op.path_template)
        .into_iter()
        .collect();
    if let Some(name) = tokenize_path(&new_op.path_template)
        .into_iter()
        .filter(|t| !existing_tokens.contains(t) && t != base_last)
        .find_map(|t| free(&t))
    {
        return Resolution {
            name,
            strategy: CollisionStrategy::UniquePathSegment,
        };
    }

    if new_op.path_template != existing_op.path_template
        && let Some(name) = free(new_op.method.as_lower())
    {
        return Resolution {
            name,
            strategy: CollisionStrategy::MethodSuffix,
        };
    }

    let mut name = sanitize(&format!("{base}_alt"));
    let mut n = 2;
    while taken(&name) {
        name = sanitize(&format!("{base}_alt_{n}"));
        n += 1;
    }
    Resolution {
        name,
        strategy: CollisionStrategy::Fallback,
    }
}

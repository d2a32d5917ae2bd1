use serde::{Deserialize, Serialize};

/// Naming engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingConfig {
    /// Action words recognized in addition to the built-in vocabulary.
    #[serde(default)]
    pub extra_action_words: Vec<String>,

    /// Restrict the action prefix fallback to inflected forms (`searching`, `exports`), so
    /// nouns like `addresses` are not read as `add`.
    #[serde(default)]
    pub strict_inflections: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_and_defaults() {
        let cfg: NamingConfig =
            serde_yaml::from_str("extraActionWords: [reconcile, refund]").unwrap();
        assert_eq!(cfg.extra_action_words, vec!["reconcile", "refund"]);

        let empty: NamingConfig = serde_yaml::from_str("{}").unwrap();
        assert!(empty.extra_action_words.is_empty());
        assert!(!empty.strict_inflections);

        let strict: NamingConfig = serde_yaml::from_str("strictInflections: true").unwrap();
        assert!(strict.strict_inflections);
    }
}

//! Action-word vocabulary.
//!
//! Action words are verbs that, when they appear in a path or identifier, override the default
//! CRUD reading of an operation (`POST /users/search` searches, it does not create).

use crate::config::NamingConfig;
use std::collections::BTreeSet;

/// Built-in vocabulary. Kept sorted; extend through [`NamingConfig::extra_action_words`].
pub const DEFAULT_ACTION_WORDS: &[&str] = &[
    "activate",
    "add",
    "analyze",
    "apply",
    "approve",
    "archive",
    "assign",
    "authenticate",
    "authorize",
    "calculate",
    "cancel",
    "certify",
    "check",
    "clone",
    "close",
    "compare",
    "complete",
    "compute",
    "confirm",
    "connect",
    "convert",
    "copy",
    "count",
    "create",
    "deactivate",
    "decline",
    "delete",
    "deploy",
    "disable",
    "disconnect",
    "download",
    "duplicate",
    "enable",
    "enroll",
    "estimate",
    "evaluate",
    "execute",
    "export",
    "fetch",
    "filter",
    "find",
    "generate",
    "get",
    "import",
    "invite",
    "list",
    "lock",
    "login",
    "logout",
    "merge",
    "notify",
    "process",
    "publish",
    "query",
    "refresh",
    "register",
    "reject",
    "remove",
    "rename",
    "reset",
    "resolve",
    "restore",
    "resume",
    "revoke",
    "schedule",
    "search",
    "send",
    "share",
    "start",
    "stop",
    "submit",
    "subscribe",
    "suspend",
    "sync",
    "terminate",
    "transfer",
    "trigger",
    "unlock",
    "unpublish",
    "unsubscribe",
    "update",
    "upload",
    "upsert",
    "validate",
    "verify",
];

/// Suffixes accepted after an action word when [`NamingConfig::strict_inflections`] is set.
const INFLECTION_SUFFIXES: &[&str] = &["s", "es", "d", "ed", "ing", "ings", "er", "ers"];

/// Case-insensitive set of action words, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLexicon {
    words: BTreeSet<String>,
    strict_inflections: bool,
}

impl Default for ActionLexicon {
    fn default() -> Self {
        Self {
            words: DEFAULT_ACTION_WORDS.iter().map(|w| (*w).to_string()).collect(),
            strict_inflections: false,
        }
    }
}

impl ActionLexicon {
    /// Default vocabulary plus `extra` words (trimmed, lowercased, blanks ignored).
    #[must_use]
    pub fn with_extra_words<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lexicon = Self::default();
        lexicon.words.extend(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_ascii_lowercase())
                .filter(|w| !w.is_empty()),
        );
        lexicon
    }

    #[must_use]
    pub fn from_config(config: &NamingConfig) -> Self {
        Self::with_extra_words(&config.extra_action_words)
            .with_strict_inflections(config.strict_inflections)
    }

    /// Only accept known inflection suffixes (`s`, `ed`, `ing`, ...) in the prefix fallback.
    #[must_use]
    pub fn with_strict_inflections(mut self, strict: bool) -> Self {
        self.strict_inflections = strict;
        self
    }

    /// Exact, case-insensitive lookup. No stemming.
    #[must_use]
    pub fn is_action_word(&self, token: &str) -> bool {
        self.words.contains(&token.to_ascii_lowercase())
    }

    /// Action word that `token` starts with (`searching`, `exportcsv`).
    ///
    /// When several words qualify the longest one wins (`deactivated` is `deactivate`). In strict
    /// mode the remainder must be an inflection suffix, so `address` no longer reads as `add`.
    #[must_use]
    pub fn inflected_action(&self, token: &str) -> Option<&str> {
        let lower = token.to_ascii_lowercase();
        self.words
            .iter()
            .filter(|w| {
                lower.strip_prefix(w.as_str()).is_some_and(|rest| {
                    !self.strict_inflections || INFLECTION_SUFFIXES.contains(&rest)
                })
            })
            .max_by_key(|w| w.len())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

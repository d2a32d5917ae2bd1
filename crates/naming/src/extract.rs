//! Resource and action inference from a path template.

use crate::lexicon::ActionLexicon;
use crate::tokenize::{path_segments, split_identifier};

/// What a path operates on, and the non-CRUD verb it carries (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAction {
    /// Singularized, lowercase resource noun. Empty when the path has no semantic segment.
    pub resource: String,
    /// Lowercase action word found in the path.
    pub action: Option<String>,
}

impl ResourceAction {
    /// `POST /calculate`: the only segment is the action itself.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.action.as_deref() == Some(self.resource.as_str())
    }
}

/// Infer the resource noun and action word of `path`.
///
/// The first segment (left to right) carrying an action word wins. Each segment is checked as an
/// exact word, then through its kebab/camelCase sub-words, then through the inflected-prefix
/// fallback. The resource is the last remaining segment; a path made only of the action segment
/// uses the action as its resource.
#[must_use]
pub fn extract_resource_and_action(path: &str, lexicon: &ActionLexicon) -> ResourceAction {
    let segments = path_segments(path);

    let found = segments
        .iter()
        .enumerate()
        .find_map(|(idx, segment)| find_action(segment, lexicon).map(|action| (idx, action)));

    let (action_idx, action) = match found {
        Some((idx, action)) => (Some(idx), Some(action)),
        None => (None, None),
    };

    let resource = segments
        .iter()
        .enumerate()
        .rev()
        .find(|(idx, _)| Some(*idx) != action_idx)
        .map(|(_, segment)| singularize(&segment.to_lowercase()))
        .or_else(|| action.clone())
        .unwrap_or_default();

    ResourceAction { resource, action }
}

fn find_action(segment: &str, lexicon: &ActionLexicon) -> Option<String> {
    let lower = segment.to_lowercase();
    if lexicon.is_action_word(&lower) {
        return Some(lower);
    }

    if let Some(word) = split_identifier(segment)
        .into_iter()
        .find(|t| lexicon.is_action_word(t))
    {
        return Some(word);
    }

    lexicon.inflected_action(&lower).map(str::to_string)
}

/// Naive English singularization. Exactly one rule fires, in priority order:
/// `-ies` to `-y`, strip `-es`, strip `-s`.
#[must_use]
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{stem}y");
    }
    if word.len() > 2
        && let Some(stem) = word.strip_suffix("es")
    {
        return stem.to_string();
    }
    if word.len() > 1
        && let Some(stem) = word.strip_suffix('s')
    {
        return stem.to_string();
    }
    word.to_string()
}

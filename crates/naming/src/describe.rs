//! One-line tool descriptions.

use crate::extract::extract_resource_and_action;
use crate::lexicon::ActionLexicon;
use crate::operation::{HttpMethod, Operation};

/// Description shown to the calling assistant for `op`.
///
/// The base sentence is the summary, else the first line of the description, else a phrase
/// generated from the method and path. Required inputs are appended as `Requires: a, b.`.
#[must_use]
pub fn synthesize_description(op: &Operation, lexicon: &ActionLexicon) -> String {
    let mut sentence = base_sentence(op, lexicon);

    let required = required_inputs(op);
    if required.is_empty() {
        return sentence;
    }

    if !sentence.ends_with('.') {
        sentence.push('.');
    }
    format!("{sentence} Requires: {}.", required.join(", "))
}

/// Names of required parameters in declaration order, then `body` for a required request body.
#[must_use]
pub fn required_inputs(op: &Operation) -> Vec<&str> {
    let mut names: Vec<&str> = op
        .parameters
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();
    if op.request_body.as_ref().is_some_and(|b| b.required) {
        names.push("body");
    }
    names
}

fn base_sentence(op: &Operation, lexicon: &ActionLexicon) -> String {
    if let Some(summary) = op.summary.as_deref().map(str::trim)
        && !summary.is_empty()
    {
        return summary.to_string();
    }

    if let Some(line) = op
        .description
        .as_deref()
        .and_then(|d| d.trim().lines().next())
        .map(str::trim)
        && !line.is_empty()
    {
        return line.to_string();
    }

    generated_phrase(op, lexicon)
}

fn generated_phrase(op: &Operation, lexicon: &ActionLexicon) -> String {
    let ra = extract_resource_and_action(&op.path_template, lexicon);
    let resource = if ra.resource.is_empty() {
        "resource"
    } else {
        ra.resource.as_str()
    };

    match &op.method {
        HttpMethod::Get if op.has_path_parameter() => format!("Get a single {resource}"),
        HttpMethod::Get => format!("List {resource}s"),
        HttpMethod::Post => match ra.action.as_deref() {
            Some(action) if ra.is_degenerate() => capitalize(action),
            Some(action) => format!("{} {resource}", capitalize(action)),
            None => format!("Create a new {resource}"),
        },
        HttpMethod::Put | HttpMethod::Patch => format!("Update a {resource}"),
        HttpMethod::Delete => format!("Delete a {resource}"),
        other => format!("Calls {other} {}", op.path_template),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

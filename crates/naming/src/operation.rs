//! Input data model: one documented `OpenAPI` operation, reduced to what naming needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP method of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
    /// Extension method, stored lowercase.
    #[serde(untagged)]
    Other(String),
}

impl HttpMethod {
    /// Parse a method token (case-insensitive).
    #[must_use]
    pub fn parse(method: &str) -> Self {
        match method.trim().to_ascii_lowercase().as_str() {
            "get" => Self::Get,
            "put" => Self::Put,
            "post" => Self::Post,
            "delete" => Self::Delete,
            "options" => Self::Options,
            "head" => Self::Head,
            "patch" => Self::Patch,
            "trace" => Self::Trace,
            other => Self::Other(other.to_string()),
        }
    }

    /// Lowercase method name, as used in tool names.
    #[must_use]
    pub fn as_lower(&self) -> &str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
            Self::Other(m) => m,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_lower().to_ascii_uppercase())
    }
}

/// Where a parameter travels in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Value,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, location: ParamLocation, required: bool) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            schema: Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBodySpec {
    #[serde(default)]
    pub required: bool,
    /// Media type the body schema was taken from (usually `application/json`).
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub schema: Value,
}

/// One (method, path) endpoint from an `OpenAPI` document.
///
/// `identifier` is the `operationId`; empty when the document omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub identifier: String,
    pub method: HttpMethod,
    pub path_template: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub request_body: Option<RequestBodySpec>,
}

impl Operation {
    /// Bare operation with no identifier, docs, or parameters.
    #[must_use]
    pub fn new(method: HttpMethod, path_template: impl Into<String>) -> Self {
        Self {
            identifier: String::new(),
            method,
            path_template: path_template.into(),
            summary: None,
            description: None,
            parameters: Vec::new(),
            request_body: None,
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_request_body(mut self, body: RequestBodySpec) -> Self {
        self.request_body = Some(body);
        self
    }

    /// True when the path template contains at least one `{name}` placeholder.
    #[must_use]
    pub fn has_path_parameter(&self) -> bool {
        self.path_template.contains('{')
    }
}

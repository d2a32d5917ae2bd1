//! Error types for `openapi-mcp-tools`.

use std::time::Duration;
use thiserror::Error;

/// Main error type for the `OpenAPI` tool source.
#[derive(Error, Debug)]
pub enum OpenApiToolsError {
    /// Startup errors (spec failed to load, no base URL).
    #[error("Startup error: {0}")]
    Startup(String),

    /// Runtime errors (source not started, malformed request parts).
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Upstream API answered with a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// `OpenAPI` errors (bad `$ref`, unsupported construct).
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    #[error("OpenAPI error: failed to fetch spec from '{url}': {message}")]
    OpenApiSpecFetch { url: String, message: String },

    #[error("OpenAPI error: failed to read spec body from '{url}': {message}")]
    OpenApiSpecReadBody { url: String, message: String },

    #[error("OpenAPI error: failed to read spec file '{path}': {source}")]
    OpenApiSpecReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OpenAPI error: failed to parse OpenAPI spec from '{location}': {source}")]
    OpenApiSpecParse {
        location: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments do not satisfy the tool's declared inputs.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Local request budget exhausted.
    #[error("Rate limit exceeded, retry after {}s", .retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    /// Transport-level HTTP client errors.
    #[error("Request error: {0}")]
    Request(String),
}

/// Result type alias for `OpenAPI` tool source operations.
pub type Result<T> = std::result::Result<T, OpenApiToolsError>;

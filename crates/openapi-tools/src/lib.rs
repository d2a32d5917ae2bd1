//! `OpenAPI` -> MCP tool source.
//!
//! Loads an `OpenAPI` 3.x document, names each operation with [`openapi_mcp_naming`], and forwards
//! MCP `tools/call` requests to the upstream HTTP API.
//!
//! It contains no transport or session handling; see `openapi-mcp-bridge` for the MCP server.

pub mod config;
pub mod discovery;
pub mod error;
pub mod ratelimit;
pub mod resolver;
pub mod runtime;
pub mod schema;
pub mod semantics;

pub use config::{ApiSourceConfig, AuthConfig, AutoDiscoverConfig, RateLimitConfig};
pub use error::{OpenApiToolsError, Result};
pub use runtime::OpenApiToolSource;

//! Tool naming for OpenAPI operations.
//!
//! Turns each operation (method, path template, `operationId`, summary) into a unique,
//! readable tool name and a one-line description. Names are assigned in document order by
//! [`ToolNamer::assign_names`]; the first operation to reach a base name keeps it, later ones
//! are disambiguated by the collision resolver.
//!
//! Everything here is synchronous and total. No I/O, no shared state.

pub mod collision;
pub mod config;
pub mod describe;
pub mod extract;
pub mod lexicon;
pub mod operation;
pub mod registry;
pub mod sanitize;
pub mod synthesize;
pub mod tokenize;

pub use collision::{CollisionStrategy, Resolution};
pub use config::NamingConfig;
pub use lexicon::ActionLexicon;
pub use operation::{HttpMethod, Operation, ParamLocation, Parameter, RequestBodySpec};
pub use registry::{RegisteredNames, ToolNamer};

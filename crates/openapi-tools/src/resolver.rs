//! Local `$ref` resolution.
//!
//! `openapiv3` keeps `$ref`s as `ReferenceOr<T>`. This resolver follows document-local
//! references (`#/components/...`) by JSON pointer into a JSON copy of the spec, repeatedly, until
//! it reaches an item. Chains that revisit a pointer are reported as cycles. External document
//! refs are rejected.

use crate::error::{OpenApiToolsError, Result};
use openapiv3::{OpenAPI, ReferenceOr};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug)]
pub struct RefResolver {
    document: Value,
}

impl RefResolver {
    /// # Errors
    ///
    /// Returns an error if the spec cannot be re-serialized as JSON.
    pub fn new(spec: &OpenAPI) -> Result<Self> {
        let document =
            serde_json::to_value(spec).map_err(|e| OpenApiToolsError::OpenApi(e.to_string()))?;
        Ok(Self { document })
    }

    /// Follow `r` until it is an item.
    ///
    /// # Errors
    ///
    /// Returns an error for external or malformed refs, dangling pointers, cycles, and targets
    /// that do not deserialize as `T`.
    pub fn resolve<T>(&self, r: &ReferenceOr<T>) -> Result<T>
    where
        T: Clone + DeserializeOwned,
    {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = r.clone();

        loop {
            let reference = match current {
                ReferenceOr::Item(item) => return Ok(item),
                ReferenceOr::Reference { reference } => reference,
            };

            if !visited.insert(reference.clone()) {
                return Err(OpenApiToolsError::OpenApi(format!(
                    "Cyclic $ref detected while resolving: {reference}",
                )));
            }

            let target = self.lookup(&reference)?;
            current = serde_json::from_value(target.clone()).map_err(|e| {
                OpenApiToolsError::OpenApi(format!(
                    "Referenced value '{reference}' has an unexpected shape: {e}",
                ))
            })?;
        }
    }

    /// Raw JSON value a local `#/...` reference points at.
    pub(crate) fn lookup(&self, reference: &str) -> Result<&Value> {
        let pointer = reference.strip_prefix('#').ok_or_else(|| {
            OpenApiToolsError::OpenApi(format!(
                "External $ref '{reference}' is not supported (only '#/...' refs)",
            ))
        })?;
        if !pointer.starts_with('/') {
            return Err(OpenApiToolsError::OpenApi(format!(
                "Unsupported $ref fragment (expected JSON pointer starting with '/'): {reference}",
            )));
        }

        self.document.pointer(pointer).ok_or_else(|| {
            OpenApiToolsError::OpenApi(format!("Unresolved $ref '{reference}'"))
        })
    }
}

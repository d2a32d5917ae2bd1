//! Name registration for one generation pass.

use std::collections::HashMap;

use crate::collision::resolve_collision;
use crate::config::NamingConfig;
use crate::describe::synthesize_description;
use crate::lexicon::ActionLexicon;
use crate::operation::Operation;
use crate::synthesize::synthesize_name;

/// Names handed out so far in a pass, each mapped to the index of the operation that owns it.
#[derive(Debug, Default, Clone)]
pub struct RegisteredNames {
    owners: HashMap<String, usize>,
}

impl RegisteredNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    #[must_use]
    pub fn owner(&self, name: &str) -> Option<usize> {
        self.owners.get(name).copied()
    }

    /// Returns false (and leaves the set untouched) if `name` is already taken.
    pub fn insert(&mut self, name: impl Into<String>, owner: usize) -> bool {
        match self.owners.entry(name.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(owner);
                true
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Entry point of the naming engine: base names, descriptions, and unique assignment.
#[derive(Debug, Clone, Default)]
pub struct ToolNamer {
    lexicon: ActionLexicon,
}

impl ToolNamer {
    #[must_use]
    pub fn new(lexicon: ActionLexicon) -> Self {
        Self { lexicon }
    }

    #[must_use]
    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(ActionLexicon::from_config(config))
    }

    #[must_use]
    pub fn base_name(&self, op: &Operation) -> String {
        synthesize_name(op, &self.lexicon)
    }

    #[must_use]
    pub fn describe(&self, op: &Operation) -> String {
        synthesize_description(op, &self.lexicon)
    }

    /// Assign a unique tool name to every operation, in order.
    ///
    /// Each call starts from an empty [`RegisteredNames`]; the first operation to reach a base
    /// name keeps it bare. Operations whose base name is empty get `None` and reserve nothing.
    #[must_use]
    pub fn assign_names(&self, operations: &[Operation]) -> Vec<Option<String>> {
        let (_, names) = operations.iter().enumerate().fold(
            (RegisteredNames::new(), Vec::with_capacity(operations.len())),
            |(mut registered, mut names), (idx, op)| {
                names.push(self.register(&mut registered, operations, idx, op));
                (registered, names)
            },
        );
        names
    }

    fn register(
        &self,
        registered: &mut RegisteredNames,
        operations: &[Operation],
        idx: usize,
        op: &Operation,
    ) -> Option<String> {
        let base = self.base_name(op);
        if base.is_empty() {
            return None;
        }

        let Some(owner) = registered.owner(&base) else {
            registered.insert(base.clone(), idx);
            return Some(base);
        };

        let resolution = resolve_collision(&base, op, &operations[owner], |candidate| {
            registered.contains(candidate)
        });
        tracing::debug!(
            base = %base,
            name = %resolution.name,
            strategy = ?resolution.strategy,
            method = %op.method,
            path = %op.path_template,
            "resolved tool name collision"
        );
        registered.insert(resolution.name.clone(), idx);
        Some(resolution.name)
    }
}

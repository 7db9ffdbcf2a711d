//! Lookup table from operation name to operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::interpreter::Operation;

/// The set of operations a script may call.
///
/// Built once by whoever hosts the interpreter and handed to it by
/// reference.
#[derive(Clone, Default)]
pub struct Registry {
    operations: BTreeMap<&'static str, Arc<dyn Operation>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation, replacing any existing one with the same name.
    pub fn register(&mut self, operation: impl Operation + 'static) {
        self.operations.insert(operation.name(), Arc::new(operation));
    }

    /// Builder form of [`Registry::register`].
    pub fn with(mut self, operation: impl Operation + 'static) -> Self {
        self.register(operation);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.get(name).cloned()
    }

    /// Operations in name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Operation> {
        self.operations.values().map(|op| op.as_ref())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

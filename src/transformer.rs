use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::edit::MutationError;
use crate::mutation::Mutation;
use crate::mutators::{
    MultipleMutator, TextDeleteMutator, TextInsertMutator, TextReplaceMutator, TextSwapMutator,
};

/// Rewrites content for one kind of mutation
///
/// Implementations receive the content as it stands after every
/// higher-offset mutation in the file has been applied, and must not assume
/// they run in the producer's list order.
pub trait Transformer: Send + Sync {
    fn mutate(&self, content: &str, mutation: &Mutation) -> Result<String, MutationError>;
}

impl<F> Transformer for F
where
    F: Fn(&str, &Mutation) -> Result<String, MutationError> + Send + Sync,
{
    fn mutate(&self, content: &str, mutation: &Mutation) -> Result<String, MutationError> {
        self(content, mutation)
    }
}

/// Maps mutation type tags to transformers
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<dyn Transformer>>,
}

impl TransformerRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the stock text mutators: `text-delete`,
    /// `text-insert`, `text-replace`, `text-swap` and `multiple`
    pub fn with_builtins() -> Self {
        let text = Self::text_builtins();
        let mut registry = text.clone();
        registry.register("multiple", MultipleMutator::new(text));
        registry
    }

    fn text_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("text-delete", TextDeleteMutator);
        registry.register("text-insert", TextInsertMutator);
        registry.register("text-replace", TextReplaceMutator);
        registry.register("text-swap", TextSwapMutator);
        registry
    }

    /// Add or replace the transformer for `kind`
    pub fn register(&mut self, kind: impl Into<String>, transformer: impl Transformer + 'static) {
        self.transformers.insert(kind.into(), Arc::new(transformer));
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, kind: impl Into<String>, transformer: impl Transformer + 'static) -> Self {
        self.register(kind, transformer);
        self
    }

    /// Look up the transformer registered for a type tag
    ///
    /// # Arguments
    /// * `kind` - The mutation's type tag
    ///
    /// # Returns
    /// * `Some(transformer)` if one is registered, `None` otherwise
    pub fn resolve(&self, kind: &str) -> Option<&dyn Transformer> {
        self.transformers.get(kind).map(|transformer| transformer.as_ref())
    }

    /// Registered type tags, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

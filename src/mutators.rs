//! Stock text transformers.
//!
//! Each mutator reads its settings from the mutation payload:
//!
//! | type           | payload                                                    |
//! |----------------|------------------------------------------------------------|
//! | `text-delete`  | none                                                       |
//! | `text-insert`  | `insertion`                                                |
//! | `text-swap`    | `insertion`                                                |
//! | `text-replace` | `search`, `replace`, optional `regex` and `all` flags      |
//! | `multiple`     | `mutations`: nested mutations applied as one unit          |

use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::edit::{MutationError, order_mutations, splice, validate_span};
use crate::mutation::Mutation;
use crate::position::Span;
use crate::transformer::{Transformer, TransformerRegistry};

fn parse_payload<T: DeserializeOwned>(mutation: &Mutation) -> Result<T, MutationError> {
    serde_json::from_value(Value::Object(mutation.payload.clone())).map_err(|source| {
        MutationError::InvalidPayload {
            kind: mutation.kind.clone(),
            source,
        }
    })
}

#[derive(Debug, Deserialize)]
struct Insertion {
    insertion: String,
}

/// Removes the mutation's span
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDeleteMutator;

impl Transformer for TextDeleteMutator {
    fn mutate(&self, content: &str, mutation: &Mutation) -> Result<String, MutationError> {
        validate_span(mutation.range, content)?;
        Ok(splice(content, mutation.range, ""))
    }
}

/// Inserts text at the start of the mutation's span; the end is ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct TextInsertMutator;

impl Transformer for TextInsertMutator {
    fn mutate(&self, content: &str, mutation: &Mutation) -> Result<String, MutationError> {
        let Insertion { insertion } = parse_payload(mutation)?;
        let point = Span::at(mutation.range.start);

        validate_span(point, content)?;
        Ok(splice(content, point, &insertion))
    }
}

/// Replaces the mutation's span with new text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSwapMutator;

impl Transformer for TextSwapMutator {
    fn mutate(&self, content: &str, mutation: &Mutation) -> Result<String, MutationError> {
        let Insertion { insertion } = parse_payload(mutation)?;

        validate_span(mutation.range, content)?;
        Ok(splice(content, mutation.range, &insertion))
    }
}

#[derive(Debug, Deserialize)]
struct Replacement {
    search: String,
    replace: String,
    #[serde(default)]
    regex: bool,
    #[serde(default)]
    all: bool,
}

/// Search-and-replace confined to the mutation's span
///
/// Replaces the first match unless `all` is set. With `regex` set, `search`
/// is a regular expression and `replace` may use `$1`-style group references.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReplaceMutator;

impl Transformer for TextReplaceMutator {
    fn mutate(&self, content: &str, mutation: &Mutation) -> Result<String, MutationError> {
        let replacement: Replacement = parse_payload(mutation)?;
        validate_span(mutation.range, content)?;

        let region = &content[mutation.range.start..mutation.range.end];
        let limit = if replacement.all { 0 } else { 1 };

        let replaced = if replacement.regex {
            let pattern =
                Regex::new(&replacement.search).map_err(|source| MutationError::InvalidPattern {
                    pattern: replacement.search.clone(),
                    source,
                })?;
            pattern
                .replacen(region, limit, replacement.replace.as_str())
                .into_owned()
        } else if replacement.search.is_empty() {
            region.to_string()
        } else if replacement.all {
            region.replace(&replacement.search, &replacement.replace)
        } else {
            region.replacen(&replacement.search, &replacement.replace, 1)
        };

        Ok(splice(content, mutation.range, &replaced))
    }
}

#[derive(Debug, Deserialize)]
struct Nested {
    mutations: Vec<Mutation>,
}

/// Applies a group of nested mutations as a single mutation
///
/// Nested ranges address the same content as the outer mutation and must lie
/// within its span. They are ordered and overlap-resolved the same way as a
/// file's mutations.
#[derive(Debug, Clone)]
pub struct MultipleMutator {
    registry: TransformerRegistry,
}

impl MultipleMutator {
    pub fn new(registry: TransformerRegistry) -> Self {
        Self { registry }
    }
}

impl Transformer for MultipleMutator {
    fn mutate(&self, content: &str, mutation: &Mutation) -> Result<String, MutationError> {
        let Nested { mutations } = parse_payload(mutation)?;
        let outer = mutation.range;

        // Text past the outer span may already hold other mutations' output
        if let Some(stray) = mutations
            .iter()
            .find(|m| m.range.start < outer.start || m.range.end > outer.end)
        {
            return Err(MutationError::NestedOutOfRange {
                nested: stray.range,
                outer,
            });
        }

        let mut content = content.to_string();

        for nested in order_mutations(&mutations) {
            let Some(transformer) = self.registry.resolve(&nested.kind) else {
                warn!(kind = %nested.kind, range = %nested.range, "Unknown nested mutator type");
                continue;
            };

            validate_span(nested.range, &content)?;
            content = transformer.mutate(&content, nested)?;
        }

        Ok(content)
    }
}

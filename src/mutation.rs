use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::position::Span;

/// Opaque mutation data, interpreted only by the transformer selected by type
pub type Payload = Map<String, Value>;

/// Mutations to apply, keyed by file name
///
/// Each list is expected in ascending `range.start` order.
pub type FileMutations = BTreeMap<String, Vec<Mutation>>;

/// A single range-addressed edit request
///
/// Payload fields sit next to `type` and `range` in the JSON object:
///
/// ```
/// use automutate::Mutation;
/// let mutation: Mutation = serde_json::from_str(
///     r#"{ "type": "text-swap", "range": [3, 5], "insertion": "xy" }"#,
/// ).unwrap();
/// assert_eq!(mutation.kind, "text-swap");
/// assert_eq!(mutation.range.start, 3);
/// assert_eq!(mutation.payload["insertion"], "xy");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Type tag used to resolve a transformer
    #[serde(rename = "type")]
    pub kind: String,
    /// Byte span the mutation addresses
    pub range: Span,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Mutation {
    /// Create a mutation with an empty payload
    ///
    /// # Arguments
    /// * `kind` - Type tag the transformer is resolved by
    /// * `range` - Byte span, e.g. `(start, end)`
    pub fn new(kind: impl Into<String>, range: impl Into<Span>) -> Self {
        Self {
            kind: kind.into(),
            range: range.into(),
            payload: Payload::new(),
        }
    }

    /// Add a payload field, replacing any existing value for `key`
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Remove `[start, end)`
    pub fn text_delete(range: impl Into<Span>) -> Self {
        Self::new("text-delete", range)
    }

    /// Insert `insertion` at `offset`
    pub fn text_insert(offset: usize, insertion: impl Into<String>) -> Self {
        Self::new("text-insert", Span::at(offset))
            .with_field("insertion", Value::String(insertion.into()))
    }

    /// Replace `[start, end)` with `insertion`
    pub fn text_swap(range: impl Into<Span>, insertion: impl Into<String>) -> Self {
        Self::new("text-swap", range)
            .with_field("insertion", Value::String(insertion.into()))
    }

    /// Replace the first occurrence of `search` within `[start, end)`
    pub fn text_replace(
        range: impl Into<Span>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self::new("text-replace", range)
            .with_field("search", Value::String(search.into()))
            .with_field("replace", Value::String(replace.into()))
    }
}

/// One batch of file mutations, or the sentinel signalling no more work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationsWave {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_mutations: Option<FileMutations>,
}

impl MutationsWave {
    /// A wave carrying work; an empty map is still work, not the sentinel
    pub fn new(file_mutations: FileMutations) -> Self {
        Self {
            file_mutations: Some(file_mutations),
        }
    }

    /// The sentinel wave
    pub fn done() -> Self {
        Self { file_mutations: None }
    }

    pub fn is_done(&self) -> bool {
        self.file_mutations.is_none()
    }

    /// Number of files named by the wave (zero for the sentinel)
    pub fn file_count(&self) -> usize {
        self.file_mutations.as_ref().map_or(0, |files| files.len())
    }

    /// Total mutations across all files (zero for the sentinel)
    pub fn mutation_count(&self) -> usize {
        self.file_mutations
            .as_ref()
            .map_or(0, |files| files.values().map(Vec::len).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_payload_is_flattened() {
        let mutation = Mutation::text_swap((2, 4), "XY");
        let json = serde_json::to_value(&mutation).unwrap();

        assert_eq!(json["type"], "text-swap");
        assert_eq!(json["range"], serde_json::json!([2, 4]));
        assert_eq!(json["insertion"], "XY");
    }

    #[test]
    fn test_mutation_without_payload() {
        let mutation: Mutation =
            serde_json::from_str(r#"{ "type": "upper", "range": [0, 1] }"#).unwrap();

        assert_eq!(mutation, Mutation::new("upper", (0, 1)));
        assert!(mutation.payload.is_empty());
    }

    #[test]
    fn test_wave_sentinel() {
        let wave: MutationsWave = serde_json::from_str("{}").unwrap();
        assert!(wave.is_done());
        assert_eq!(wave.file_count(), 0);
        assert_eq!(serde_json::to_string(&MutationsWave::done()).unwrap(), "{}");
    }

    #[test]
    fn test_wave_counts() {
        let wave: MutationsWave = serde_json::from_str(
            r#"{
                "fileMutations": {
                    "a.txt": [
                        { "type": "text-delete", "range": [0, 1] },
                        { "type": "text-delete", "range": [4, 6] }
                    ],
                    "b.txt": []
                }
            }"#,
        )
        .unwrap();

        assert!(!wave.is_done());
        assert_eq!(wave.file_count(), 2);
        assert_eq!(wave.mutation_count(), 2);
    }

    #[test]
    fn test_empty_map_is_not_sentinel() {
        let wave: MutationsWave = serde_json::from_str(r#"{ "fileMutations": {} }"#).unwrap();
        assert!(!wave.is_done());
    }
}

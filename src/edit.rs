use thiserror::Error;

use crate::mutation::Mutation;
use crate::position::Span;

/// Error types for individual mutations
#[derive(Debug, Error)]
pub enum MutationError {
    /// Span start lies after its end
    #[error("Invalid span: end ({end}) < start ({start})")]
    InvalidSpan { start: usize, end: usize },

    /// Span reaches past the end of the content
    #[error("Byte span {start}..{end} out of bounds (content length: {content_len})")]
    OutOfBounds {
        start: usize,
        end: usize,
        content_len: usize,
    },

    /// Offset splits a multi-byte UTF-8 character
    #[error("Byte offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    /// Nested mutation reaches outside the span of the mutation grouping it
    #[error("Nested span {nested} lies outside enclosing span {outer}")]
    NestedOutOfRange { nested: Span, outer: Span },

    /// Payload does not match what the transformer for `kind` expects
    #[error("Invalid payload for '{kind}' mutation: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// Search pattern failed to compile
    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Validate a span against the content it will be applied to
///
/// Empty spans are valid (insertion points). Both offsets must be within
/// `[0, content.len()]` and on character boundaries.
pub fn validate_span(span: Span, content: &str) -> Result<(), MutationError> {
    if span.start > span.end {
        return Err(MutationError::InvalidSpan {
            start: span.start,
            end: span.end,
        });
    }

    if span.end > content.len() {
        return Err(MutationError::OutOfBounds {
            start: span.start,
            end: span.end,
            content_len: content.len(),
        });
    }

    for offset in [span.start, span.end] {
        if !content.is_char_boundary(offset) {
            return Err(MutationError::NotCharBoundary { offset });
        }
    }

    Ok(())
}

/// Replace the bytes in `span` with `replacement`
///
/// The span must already have passed [`validate_span`] for `content`.
pub fn splice(content: &str, span: Span, replacement: &str) -> String {
    let mut spliced = String::with_capacity(content.len() - span.len() + replacement.len());
    spliced.push_str(&content[..span.start]);
    spliced.push_str(replacement);
    spliced.push_str(&content[span.end..]);
    spliced
}

/// Order mutations last-to-first, without overlaps
///
/// Mutations are applied from the highest offset down so an applied edit never
/// shifts the offsets of the ones still pending. Scanning right to left, a
/// mutation is accepted only if it ends at or before the start of the last
/// accepted one; anything reaching into that territory is dropped. On overlap
/// the later-starting mutation therefore always wins.
///
/// Input is expected in ascending `range.start` order. It is stably sorted
/// first, which leaves correctly ordered input untouched.
///
/// # Example
/// ```
/// use automutate::{Mutation, order_mutations};
/// let mutations = vec![
///     Mutation::text_delete((0, 5)),
///     Mutation::text_delete((3, 8)),
///     Mutation::text_delete((9, 10)),
/// ];
/// let ordered = order_mutations(&mutations);
/// assert_eq!(ordered.len(), 2);
/// assert_eq!(ordered[0].range.start, 9);
/// assert_eq!(ordered[1].range.start, 3);
/// ```
pub fn order_mutations(mutations: &[Mutation]) -> Vec<&Mutation> {
    order_mutations_with_dropped(mutations).0
}

/// Same as [`order_mutations`], also returning how many overlapping
/// mutations were dropped
pub fn order_mutations_with_dropped(mutations: &[Mutation]) -> (Vec<&Mutation>, usize) {
    let mut sorted: Vec<&Mutation> = mutations.iter().collect();
    sorted.sort_by_key(|mutation| mutation.range.start);

    let mut ordered = Vec::with_capacity(sorted.len());
    let mut boundary = usize::MAX;

    for mutation in sorted.into_iter().rev() {
        if mutation.range.end > boundary {
            continue;
        }

        boundary = mutation.range.start;
        ordered.push(mutation);
    }

    let dropped = mutations.len() - ordered.len();
    (ordered, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(ordered: &[&Mutation]) -> Vec<(usize, usize)> {
        ordered.iter().map(|m| (m.range.start, m.range.end)).collect()
    }

    #[test]
    fn test_order_non_overlapping_reverses() {
        let mutations = vec![
            Mutation::text_delete((0, 2)),
            Mutation::text_delete((2, 4)),
            Mutation::text_delete((6, 8)),
        ];

        let (ordered, dropped) = order_mutations_with_dropped(&mutations);

        assert_eq!(starts(&ordered), vec![(6, 8), (2, 4), (0, 2)]);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_order_overlap_later_wins() {
        let mutations = vec![Mutation::text_delete((0, 5)), Mutation::text_delete((3, 8))];

        let (ordered, dropped) = order_mutations_with_dropped(&mutations);

        assert_eq!(starts(&ordered), vec![(3, 8)]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_order_overlap_checks_last_accepted_only() {
        // (4, 9) loses to (6, 10); (0, 5) is then compared against (6, 10)
        let mutations = vec![
            Mutation::text_delete((0, 5)),
            Mutation::text_delete((4, 9)),
            Mutation::text_delete((6, 10)),
        ];

        let ordered = order_mutations(&mutations);

        assert_eq!(starts(&ordered), vec![(6, 10), (0, 5)]);
    }

    #[test]
    fn test_order_nested_span_dropped() {
        let mutations = vec![Mutation::text_delete((0, 10)), Mutation::text_delete((2, 3))];

        let ordered = order_mutations(&mutations);

        assert_eq!(starts(&ordered), vec![(2, 3)]);
    }

    #[test]
    fn test_order_insertions_at_same_offset_kept() {
        let mutations = vec![
            Mutation::text_insert(4, "a"),
            Mutation::text_insert(4, "b"),
        ];

        let ordered = order_mutations(&mutations);

        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].payload["insertion"], "b");
        assert_eq!(ordered[1].payload["insertion"], "a");
    }

    #[test]
    fn test_order_sorts_unsorted_input() {
        let mutations = vec![
            Mutation::text_delete((6, 8)),
            Mutation::text_delete((0, 2)),
            Mutation::text_delete((3, 4)),
        ];

        let ordered = order_mutations(&mutations);

        assert_eq!(starts(&ordered), vec![(6, 8), (3, 4), (0, 2)]);
    }

    #[test]
    fn test_order_empty() {
        assert!(order_mutations(&[]).is_empty());
    }

    #[test]
    fn test_validate_span_valid() {
        assert!(validate_span(Span::new(0, 5), "Hello").is_ok());
        assert!(validate_span(Span::at(5), "Hello").is_ok());
    }

    #[test]
    fn test_validate_span_inverted() {
        match validate_span(Span::new(4, 2), "Hello") {
            Err(MutationError::InvalidSpan { start, end }) => {
                assert_eq!((start, end), (4, 2));
            }
            other => panic!("Expected MutationError::InvalidSpan, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_span_out_of_bounds() {
        match validate_span(Span::new(3, 9), "Hello") {
            Err(MutationError::OutOfBounds { content_len, .. }) => assert_eq!(content_len, 5),
            other => panic!("Expected MutationError::OutOfBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_span_char_boundary() {
        // 'é' occupies bytes 1..3
        match validate_span(Span::new(2, 3), "héllo") {
            Err(MutationError::NotCharBoundary { offset }) => assert_eq!(offset, 2),
            other => panic!("Expected MutationError::NotCharBoundary, got {:?}", other),
        }
    }

    #[test]
    fn test_splice() {
        assert_eq!(splice("Hello, world!", Span::new(7, 12), "Rust"), "Hello, Rust!");
        assert_eq!(splice("abc", Span::at(3), "d"), "abcd");
        assert_eq!(splice("abc", Span::new(0, 3), ""), "");
    }
}

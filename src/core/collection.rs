//! Span list operations shared by the annotate and review flows.
//!
//! Every operation takes the list by value and returns the new list, so a
//! flow transition is always a copy-and-replace of its `spans` field.
//! Out-of-range indices never panic.

use std::collections::HashSet;

use crate::domain::{ResultChunk, TextSpan};

/// Separator placed between span texts in an assembled answer
pub const ANSWER_SEPARATOR: &str = "\n\n";

/// Append a newly selected span, clearing focus on every existing span
pub fn append(spans: Vec<TextSpan>, span: TextSpan) -> Vec<TextSpan> {
    let mut spans = clear_focus(spans);
    spans.push(span);
    spans
}

/// Remove the span at `index` and clear all focus.
///
/// An out-of-range index removes nothing.
pub fn remove_at(spans: Vec<TextSpan>, index: usize) -> Vec<TextSpan> {
    let mut spans = clear_focus(spans);
    if index < spans.len() {
        spans.remove(index);
    }
    spans
}

/// Move the span at `from` so it ends up at `to`.
///
/// Returns `None` when nothing would change (`from == to`) or an index is out
/// of range; callers must not dispatch an update in that case.
pub fn reorder(spans: &[TextSpan], from: usize, to: usize) -> Option<Vec<TextSpan>> {
    if from == to || from >= spans.len() || to >= spans.len() {
        return None;
    }

    let mut reordered = spans.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Some(reordered)
}

/// Focus the span at `index` and unfocus all others.
///
/// With an out-of-range index no span ends up focused.
pub fn focus(spans: Vec<TextSpan>, index: usize) -> Vec<TextSpan> {
    spans
        .into_iter()
        .enumerate()
        .map(|(i, span)| span.with_focus(i == index))
        .collect()
}

/// Replace the whole list
pub fn replace_all(_spans: Vec<TextSpan>, new_spans: Vec<TextSpan>) -> Vec<TextSpan> {
    new_spans
}

/// Index of the focused span, if any
pub fn focused_index(spans: &[TextSpan]) -> Option<usize> {
    spans.iter().position(TextSpan::is_focused)
}

/// Join span texts in list order with a blank line between them
pub fn assemble_answer_text(spans: &[TextSpan]) -> String {
    spans
        .iter()
        .map(|span| span.text.as_str())
        .collect::<Vec<_>>()
        .join(ANSWER_SEPARATOR)
}

/// Chunks referenced by the spans, in order of first appearance.
///
/// Spans sharing the same chunk text collapse into one entry.
pub fn chunks_referenced_by(spans: &[TextSpan]) -> Vec<ResultChunk> {
    let mut seen = HashSet::new();

    spans
        .iter()
        .filter_map(|span| {
            let chunk = span.source_chunk.as_deref()?;
            seen.insert(chunk)
                .then(|| ResultChunk::new(chunk, span.source_document_id.as_str()))
        })
        .collect()
}

/// Spans rendered on the surface with the given routing key, with their list indices
pub fn spans_for_key<'a>(
    spans: &'a [TextSpan],
    key: &'a str,
) -> impl Iterator<Item = (usize, &'a TextSpan)> + 'a {
    spans
        .iter()
        .enumerate()
        .filter(move |(_, span)| span.routing_key() == key)
}

fn clear_focus(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    spans.into_iter().map(TextSpan::without_focus).collect()
}

//! Selection surfaces: the boundary between a text display and the flows.
//!
//! A surface wraps the text of one source (the primary document or one
//! result chunk). It turns a user selection into a [`TextSpan`] candidate and
//! renders the spans routed to it as highlighted segments.
//!
//! # Offsets
//!
//! Offsets are character indices, not bytes. Each surface keeps a table of
//! character start positions so slicing never lands inside a UTF-8 sequence.

use thiserror::Error;
use tracing::debug;

use super::collection;
use crate::domain::{DocumentWithContent, ResultChunk, TextSpan};

/// Selection errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Selection {start}..{end} is outside '{key}' ({len} characters)")]
    OutOfBounds {
        key: String,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// Where a surface's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceSource {
    /// The primary document
    Document { document_id: String },

    /// A retrieved chunk shown next to the document
    Chunk(ResultChunk),
}

/// Line and column position (1-indexed for editor compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// A run of text with uniform highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Indices (into the full span list) of spans covering this run
    pub span_indices: Vec<usize>,
    /// Whether a covering span is focused
    pub focused: bool,
}

impl Segment {
    pub fn is_highlighted(&self) -> bool {
        !self.span_indices.is_empty()
    }
}

/// Selectable text for one source
#[derive(Debug, Clone)]
pub struct SelectionSurface {
    source: SurfaceSource,
    text: String,
    /// Byte offset of every character, plus `text.len()`
    char_starts: Vec<usize>,
}

impl SelectionSurface {
    pub fn new(source: SurfaceSource, text: impl Into<String>) -> Self {
        let text = text.into();
        let char_starts = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();

        Self {
            source,
            text,
            char_starts,
        }
    }

    /// Surface for the primary document
    pub fn for_document(document: &DocumentWithContent) -> Self {
        Self::new(
            SurfaceSource::Document {
                document_id: document.id.clone(),
            },
            document.content.clone(),
        )
    }

    /// Surface for a retrieved chunk
    pub fn for_chunk(chunk: &ResultChunk) -> Self {
        Self::new(SurfaceSource::Chunk(chunk.clone()), chunk.chunk.clone())
    }

    /// Routing key: document id, or chunk text for chunk surfaces
    pub fn key(&self) -> &str {
        match &self.source {
            SurfaceSource::Document { document_id } => document_id,
            SurfaceSource::Chunk(chunk) => &chunk.chunk,
        }
    }

    pub fn source(&self) -> &SurfaceSource {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.char_starts.len() - 1
    }

    /// Text between two character offsets (clamped to the surface)
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let len = self.char_len();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return "";
        }
        &self.text[self.char_starts[start]..self.char_starts[end]]
    }

    /// Turn a selection into a span candidate.
    ///
    /// `anchor` is where the drag started and `focus` where it ended; a
    /// backwards drag is normalized. A zero-length selection yields `None`.
    pub fn select(&self, anchor: usize, focus: usize) -> Result<Option<TextSpan>, SelectionError> {
        let (start, end) = if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        };

        let len = self.char_len();
        if end > len {
            return Err(SelectionError::OutOfBounds {
                key: self.key().to_string(),
                start,
                end,
                len,
            });
        }

        if start == end {
            return Ok(None);
        }

        let text = self.slice(start, end).to_string();
        debug!(key = self.key(), start, end, "Text selected");

        let span = match &self.source {
            SurfaceSource::Document { document_id } => {
                TextSpan::new(document_id.clone(), text, start, end)
            }
            SurfaceSource::Chunk(chunk) => TextSpan::from_chunk(chunk, text, start, end),
        };

        Ok(Some(span))
    }

    /// Whether the span's text still matches this surface at its offsets
    pub fn matches(&self, span: &TextSpan) -> bool {
        span.end_index <= self.char_len() && self.slice(span.start_index, span.end_index) == span.text
    }

    /// Render the full text as segments, highlighting spans routed here.
    ///
    /// `spans` is the whole answer list; only spans whose routing key matches
    /// this surface are drawn, and segments refer to them by list index.
    /// Overlapping spans split the text at every boundary. Ranges reaching past
    /// the end of the text are clipped.
    pub fn render(&self, spans: &[TextSpan]) -> Vec<Segment> {
        let len = self.char_len();

        let routed: Vec<(usize, &TextSpan, usize, usize)> = collection::spans_for_key(spans, self.key())
            .filter_map(|(index, span)| {
                let end = span.end_index.min(len);
                (span.start_index < end).then_some((index, span, span.start_index, end))
            })
            .collect();

        let mut cuts = vec![0, len];
        for (_, _, start, end) in &routed {
            cuts.push(*start);
            cuts.push(*end);
        }
        cuts.sort_unstable();
        cuts.dedup();

        cuts.windows(2)
            .map(|pair| {
                let (start, end) = (pair[0], pair[1]);
                let covering: Vec<&(usize, &TextSpan, usize, usize)> = routed
                    .iter()
                    .filter(|(_, _, s, e)| *s <= start && *e >= end)
                    .collect();

                Segment {
                    text: self.slice(start, end).to_string(),
                    start_index: start,
                    end_index: end,
                    span_indices: covering.iter().map(|(index, ..)| *index).collect(),
                    focused: covering.iter().any(|(_, span, ..)| span.is_focused()),
                }
            })
            .collect()
    }

    /// Convert a character offset to a line/column position
    pub fn line_col(&self, offset: usize) -> LineCol {
        let byte = self.char_starts[offset.min(self.char_len())];
        let prefix = &self.text[..byte];

        let line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = self.text[line_start..byte].chars().count() + 1;

        LineCol { line, col }
    }

    /// Span text with up to `window` characters of surrounding context
    pub fn snippet(&self, start: usize, end: usize, window: usize) -> String {
        let len = self.char_len();
        let end = end.min(len);
        let each_side = window.saturating_sub(end.saturating_sub(start)) / 2;

        let from = start.saturating_sub(each_side);
        let to = (end + each_side).min(len);

        let prefix = if from > 0 { "..." } else { "" };
        let suffix = if to < len { "..." } else { "" };

        format!("{}{}{}", prefix, self.slice(from, to), suffix)
    }
}

/// Surfaces for a document and the chunks shown beside it
#[derive(Debug, Clone)]
pub struct SurfaceSet {
    primary: SelectionSurface,
    chunks: Vec<SelectionSurface>,
}

impl SurfaceSet {
    /// One surface for the document plus one per distinct chunk text
    pub fn new(document: &DocumentWithContent, chunks: &[ResultChunk]) -> Self {
        let mut surfaces: Vec<SelectionSurface> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if !surfaces.iter().any(|s| s.key() == chunk.chunk) {
                surfaces.push(SelectionSurface::for_chunk(chunk));
            }
        }

        Self {
            primary: SelectionSurface::for_document(document),
            chunks: surfaces,
        }
    }

    pub fn primary(&self) -> &SelectionSurface {
        &self.primary
    }

    pub fn chunks(&self) -> &[SelectionSurface] {
        &self.chunks
    }

    /// Surface with the given routing key
    pub fn get(&self, key: &str) -> Option<&SelectionSurface> {
        self.iter().find(|surface| surface.key() == key)
    }

    /// Primary surface first, then chunks in display order
    pub fn iter(&self) -> impl Iterator<Item = &SelectionSurface> {
        std::iter::once(&self.primary).chain(self.chunks.iter())
    }

    /// Surface a span is drawn on, if it is shown at all
    pub fn surface_for(&self, span: &TextSpan) -> Option<&SelectionSurface> {
        self.get(span.routing_key())
    }

    /// Indices of spans no surface in this set will draw
    pub fn unrouted(&self, spans: &[TextSpan]) -> Vec<usize> {
        spans
            .iter()
            .enumerate()
            .filter(|(_, span)| self.surface_for(span).is_none())
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(content: &str) -> DocumentWithContent {
        DocumentWithContent {
            id: "doc-1".to_string(),
            file_name: "file1.txt".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_select_emits_span() {
        let surface = SelectionSurface::for_document(&document("hello world"));
        let span = surface.select(6, 11).unwrap().unwrap();

        assert_eq!(span, TextSpan::new("doc-1", "world", 6, 11));
    }

    #[test]
    fn test_backwards_drag_is_normalized() {
        let surface = SelectionSurface::for_document(&document("hello world"));
        let span = surface.select(5, 0).unwrap().unwrap();

        assert_eq!((span.start_index, span.end_index), (0, 5));
        assert_eq!(span.text, "hello");
    }

    #[test]
    fn test_click_emits_nothing() {
        let surface = SelectionSurface::for_document(&document("hello"));
        assert_eq!(surface.select(3, 3).unwrap(), None);
    }

    #[test]
    fn test_out_of_bounds_selection() {
        let surface = SelectionSurface::for_document(&document("hello"));
        let err = surface.select(2, 9).unwrap_err();
        assert!(matches!(err, SelectionError::OutOfBounds { len: 5, .. }));
    }

    #[test]
    fn test_offsets_are_characters() {
        let surface = SelectionSurface::for_document(&document("héllo wörld"));
        let span = surface.select(6, 11).unwrap().unwrap();

        assert_eq!(span.text, "wörld");
        assert_eq!(surface.char_len(), 11);
        assert!(surface.matches(&span));
    }

    #[test]
    fn test_chunk_surface_stamps_chunk() {
        let chunk = ResultChunk::new("hello this is from source", "file3.txt");
        let surface = SelectionSurface::for_chunk(&chunk);
        let span = surface.select(0, 5).unwrap().unwrap();

        assert_eq!(span.source_document_id, "file3.txt");
        assert_eq!(span.source_chunk.as_deref(), Some("hello this is from source"));
    }

    #[test]
    fn test_render_highlights_routed_spans() {
        let chunk = ResultChunk::new("chunk", "c.txt");
        let spans = vec![
            TextSpan::from_chunk(&chunk, "chu", 0, 3),
            TextSpan::new("doc-1", "hello", 0, 5).with_focus(true),
        ];
        let surface = SelectionSurface::for_document(&document("hello world"));
        let segments = surface.render(&spans);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "hello");
        assert_eq!(segments[0].span_indices, vec![1]);
        assert!(segments[0].focused);
        assert_eq!(segments[1].text, " world");
        assert!(!segments[1].is_highlighted());
    }

    #[test]
    fn test_render_overlapping_spans() {
        let spans = vec![
            TextSpan::new("doc-1", "hello wo", 0, 8),
            TextSpan::new("doc-1", "world", 6, 11),
        ];
        let surface = SelectionSurface::for_document(&document("hello world"));
        let segments = surface.render(&spans);

        let runs: Vec<(&str, Vec<usize>)> = segments
            .iter()
            .map(|s| (s.text.as_str(), s.span_indices.clone()))
            .collect();
        assert_eq!(
            runs,
            vec![("hello ", vec![0]), ("wo", vec![0, 1]), ("rld", vec![1])]
        );
    }

    #[test]
    fn test_render_clips_stale_ranges() {
        let spans = vec![TextSpan::new("doc-1", "lo there", 3, 40)];
        let surface = SelectionSurface::for_document(&document("hello"));
        let segments = surface.render(&spans);

        assert_eq!(segments.last().unwrap().text, "lo");
        assert!(segments.last().unwrap().is_highlighted());
    }

    #[test]
    fn test_render_empty_text() {
        let surface = SelectionSurface::for_document(&document(""));
        assert!(surface.render(&[]).is_empty());
    }

    #[test]
    fn test_line_col() {
        let surface = SelectionSurface::for_document(&document("line1\nline2\nline3"));

        assert_eq!(surface.line_col(0), LineCol { line: 1, col: 1 });
        assert_eq!(surface.line_col(6), LineCol { line: 2, col: 1 });
        assert_eq!(surface.line_col(8), LineCol { line: 2, col: 3 });
    }

    #[test]
    fn test_snippet() {
        let text = "This is a long transcript with many words and content for testing.";
        let surface = SelectionSurface::for_document(&document(text));
        let snippet = surface.snippet(10, 20, 20);

        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("long trans"));
    }

    #[test]
    fn test_surface_set_routing() {
        let a = ResultChunk::new("chunk a", "a.txt");
        let b = ResultChunk::new("chunk b", "b.txt");
        let set = SurfaceSet::new(&document("hello"), &[a.clone(), b.clone(), a.clone()]);

        assert_eq!(set.chunks().len(), 2);
        assert_eq!(set.iter().count(), 3);

        let orphan = ResultChunk::new("gone", "g.txt");
        let spans = vec![
            TextSpan::new("doc-1", "he", 0, 2),
            TextSpan::from_chunk(&b, "chunk", 0, 5),
            TextSpan::from_chunk(&orphan, "gone", 0, 4),
        ];

        assert_eq!(set.surface_for(&spans[1]).unwrap().key(), "chunk b");
        assert_eq!(set.unrouted(&spans), vec![2]);
    }
}

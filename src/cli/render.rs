//! Plain-text rendering of surfaces and span lists for the terminal.

use crate::core::{Segment, SurfaceSet};
use crate::domain::TextSpan;

/// Width of the context window in span listings
const SNIPPET_WINDOW: usize = 60;

/// Render segments inline: `[[...]]` for highlights, `<<...>>` for focus
pub fn render_segments(segments: &[Segment]) -> String {
    let mut out = String::new();

    for segment in segments {
        if segment.focused {
            out.push_str("<<");
            out.push_str(&segment.text);
            out.push_str(">>");
        } else if segment.is_highlighted() {
            out.push_str("[[");
            out.push_str(&segment.text);
            out.push_str("]]");
        } else {
            out.push_str(&segment.text);
        }
    }

    out
}

/// One line per span: position, source, location and context
pub fn span_lines(spans: &[TextSpan], surfaces: &SurfaceSet) -> Vec<String> {
    spans
        .iter()
        .enumerate()
        .map(|(i, span)| {
            let marker = if span.is_focused() { "*" } else { " " };
            let source = match &span.source_chunk {
                Some(_) => format!("chunk:{}", span.source_document_id),
                None => span.source_document_id.clone(),
            };

            let location = match surfaces.surface_for(span) {
                Some(surface) => {
                    let pos = surface.line_col(span.start_index);
                    let drift = if surface.matches(span) { "" } else { " (text drifted)" };
                    format!(
                        "{}:{}{}  {}",
                        pos.line,
                        pos.col,
                        drift,
                        surface.snippet(span.start_index, span.end_index, SNIPPET_WINDOW)
                    )
                }
                None => "(source not shown)".to_string(),
            };

            format!(
                "{}{:>3}. {:?} [{}] {}",
                marker,
                i + 1,
                span.text,
                source,
                location
            )
        })
        .collect()
}

/// Render every surface with the spans routed to it
pub fn render_surfaces(surfaces: &SurfaceSet, spans: &[TextSpan]) -> String {
    let mut out = String::new();

    for surface in surfaces.iter() {
        let title = match surface.source() {
            crate::core::SurfaceSource::Document { document_id } => format!("Document {}", document_id),
            crate::core::SurfaceSource::Chunk(chunk) => format!("Result from {}", chunk.source_document_id()),
        };

        out.push_str(&format!("=== {} ===\n", title));
        out.push_str(&render_segments(&surface.render(spans)));
        out.push_str("\n\n");
    }

    out
}

/// First line of a text, shortened to `max` characters
pub fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentWithContent, ResultChunk};

    fn surfaces() -> SurfaceSet {
        let document = DocumentWithContent {
            id: "doc-1".to_string(),
            file_name: "file1.txt".to_string(),
            content: "hello world".to_string(),
        };
        SurfaceSet::new(&document, &[ResultChunk::new("chunk text", "c.txt")])
    }

    #[test]
    fn test_render_markers() {
        let spans = vec![
            TextSpan::new("doc-1", "hello", 0, 5),
            TextSpan::new("doc-1", "world", 6, 11).with_focus(true),
        ];
        let rendered = render_segments(&surfaces().primary().render(&spans));
        assert_eq!(rendered, "[[hello]] <<world>>");
    }

    #[test]
    fn test_render_surfaces_includes_chunks() {
        let chunk = ResultChunk::new("chunk text", "c.txt");
        let spans = vec![TextSpan::from_chunk(&chunk, "text", 6, 10)];
        let rendered = render_surfaces(&surfaces(), &spans);

        assert!(rendered.contains("=== Document doc-1 ==="));
        assert!(rendered.contains("=== Result from c.txt ==="));
        assert!(rendered.contains("chunk [[text]]"));
    }

    #[test]
    fn test_span_lines() {
        let spans = vec![
            TextSpan::new("doc-1", "world", 6, 11).with_focus(true),
            TextSpan::new("elsewhere", "gone", 0, 4),
        ];
        let lines = span_lines(&spans, &surfaces());

        assert!(lines[0].starts_with("*  1. \"world\" [doc-1] 1:7"));
        assert!(lines[1].contains("(source not shown)"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("a much longer line", 8), "a muc...");
        assert_eq!(preview("first\nsecond", 20), "first");
    }
}

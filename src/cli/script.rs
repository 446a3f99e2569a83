//! Action scripts for driving a flow from the command line.
//!
//! A script is JSONL: one step per line, blank lines and `#` comments
//! skipped. A step is either a flow action in its wire form
//! (`{"type":"update-question","text":"..."}`) or a UI gesture that is
//! resolved against the current state first:
//!
//! ```text
//! {"type":"select","start":0,"end":5}                    # primary document
//! {"type":"select","chunk":"<chunk text>","start":0,"end":5}
//! {"type":"drag","from":0,"to":2}
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::core::{AnnotateAction, DragState, ReviewAction, SurfaceSet};
use crate::domain::TextSpan;

/// A simulated UI gesture
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Gesture {
    /// Drag-select text on the primary document or a chunk
    Select {
        #[serde(default)]
        chunk: Option<String>,
        start: usize,
        end: usize,
    },

    /// Drag a side-panel item onto another position
    Drag { from: usize, to: usize },
}

/// One line of a script
#[derive(Debug, Clone)]
pub enum ScriptStep<A> {
    Gesture(Gesture),
    Action(A),
}

/// Actions a gesture can turn into
pub trait FlowAction: DeserializeOwned {
    fn add_span(span: TextSpan) -> Self;
    fn replace_spans(spans: Vec<TextSpan>) -> Self;
}

impl FlowAction for AnnotateAction {
    fn add_span(span: TextSpan) -> Self {
        Self::AddAnnotatedText { span }
    }

    fn replace_spans(spans: Vec<TextSpan>) -> Self {
        Self::UpdateAnnotations { spans }
    }
}

impl FlowAction for ReviewAction {
    fn add_span(span: TextSpan) -> Self {
        Self::AddAnnotatedText { span }
    }

    fn replace_spans(spans: Vec<TextSpan>) -> Self {
        Self::UpdateAnnotations { spans }
    }
}

/// Parse script text
pub fn parse_script<A: FlowAction>(content: &str) -> Result<Vec<ScriptStep<A>>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str::<serde_json::Value>(line)
                .and_then(parse_step::<A>)
                .with_context(|| format!("Invalid step on line {}", n + 1))
        })
        .collect()
}

/// Gestures are matched by tag before anything else, so a malformed gesture
/// is an error rather than an unknown action
fn parse_step<A: FlowAction>(value: serde_json::Value) -> serde_json::Result<ScriptStep<A>> {
    match value.get("type").and_then(|t| t.as_str()) {
        Some("select") | Some("drag") => serde_json::from_value(value).map(ScriptStep::Gesture),
        _ => serde_json::from_value(value).map(ScriptStep::Action),
    }
}

/// Load a script file
pub async fn load_script<A: FlowAction>(path: &Path) -> Result<Vec<ScriptStep<A>>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script: {}", path.display()))?;

    parse_script(&content).with_context(|| format!("Failed to parse script: {}", path.display()))
}

/// Turn a step into the action to dispatch, if any.
///
/// Zero-length selections and no-op drags dispatch nothing.
pub fn resolve_step<A: FlowAction>(
    step: ScriptStep<A>,
    surfaces: &SurfaceSet,
    spans: &[TextSpan],
) -> Result<Option<A>> {
    match step {
        ScriptStep::Action(action) => Ok(Some(action)),
        ScriptStep::Gesture(Gesture::Select { chunk, start, end }) => {
            let surface = match chunk.as_deref() {
                Some(key) => surfaces
                    .get(key)
                    .with_context(|| format!("Chunk is not shown: {}", key))?,
                None => surfaces.primary(),
            };

            let span = surface.select(start, end)?;
            if span.is_none() {
                debug!(start, end, "Empty selection ignored");
            }
            Ok(span.map(A::add_span))
        }
        ScriptStep::Gesture(Gesture::Drag { from, to }) => {
            let mut drag = DragState::new();
            drag.start(from);
            drag.enter(to);

            let reordered = drag.drop_onto(spans);
            if reordered.is_none() {
                debug!(from, to, "Drag dropped without moving anything");
            }
            Ok(reordered.map(A::replace_spans))
        }
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
    fn test_parse_mixed_script() {
        let script = r#"
# question first
{"type":"update-question","text":"Greet me?"}
{"type":"select","start":0,"end":5}

{"type":"drag","from":1,"to":0}
"#;
        let steps: Vec<ScriptStep<AnnotateAction>> = parse_script(script).unwrap();
        assert_eq!(steps.len(), 3);
        assert!(matches!(
            steps[0],
            ScriptStep::Action(AnnotateAction::UpdateQuestion { .. })
        ));
        assert!(matches!(steps[1], ScriptStep::Gesture(Gesture::Select { .. })));
        assert!(matches!(steps[2], ScriptStep::Gesture(Gesture::Drag { .. })));
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = parse_script::<ReviewAction>("{\"type\":\"select\"}\n{oops").unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn test_select_resolves_to_add() {
        let step = ScriptStep::Gesture(Gesture::Select {
            chunk: Some("chunk text".to_string()),
            start: 0,
            end: 5,
        });
        let action: Option<ReviewAction> = resolve_step(step, &surfaces(), &[]).unwrap();

        match action {
            Some(ReviewAction::AddAnnotatedText { span }) => {
                assert_eq!(span.text, "chunk");
                assert_eq!(span.source_chunk.as_deref(), Some("chunk text"));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_empty_selection_and_noop_drag() {
        let select = ScriptStep::<AnnotateAction>::Gesture(Gesture::Select {
            chunk: None,
            start: 2,
            end: 2,
        });
        assert!(resolve_step(select, &surfaces(), &[]).unwrap().is_none());

        let spans = vec![TextSpan::new("doc-1", "hello", 0, 5)];
        let drag = ScriptStep::<AnnotateAction>::Gesture(Gesture::Drag { from: 0, to: 0 });
        assert!(resolve_step(drag, &surfaces(), &spans).unwrap().is_none());
    }

    #[test]
    fn test_unknown_chunk_is_an_error() {
        let step = ScriptStep::<AnnotateAction>::Gesture(Gesture::Select {
            chunk: Some("missing".to_string()),
            start: 0,
            end: 1,
        });
        assert!(resolve_step(step, &surfaces(), &[]).is_err());
    }
}

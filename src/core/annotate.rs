//! Authoring flow: one document, one question at a time.
//!
//! [`AnnotateFlowState::reduce`] is a total transition function. Every
//! action consumes the current state and returns the next one; I/O happens
//! before or after dispatch, never inside.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::collection;
use crate::domain::{AdditionalInfo, AnswerSubmission, QueryResult, ResultChunk, TextSpan};

/// What to do with chunk spans when a new query result arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleChunkPolicy {
    /// Drop every span selected from a chunk
    Drop,

    /// Keep chunk spans even though their chunks are no longer shown
    Keep,
}

impl Default for StaleChunkPolicy {
    fn default() -> Self {
        Self::Drop
    }
}

/// Tunables for the authoring flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotateSettings {
    pub stale_chunk_spans: StaleChunkPolicy,
}

/// State of one authoring session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateFlowState {
    pub question_text: String,
    pub question_category: String,
    pub question_type: String,
    pub spans: Vec<TextSpan>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_result: Option<QueryResult>,

    pub additional_info_list: Vec<AdditionalInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal_answer: Option<String>,
}

/// One user gesture in the authoring flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AnnotateAction {
    UpdateQuestion { text: String },
    UpdateQuestionType { question_type: String },
    UpdateQuestionCategory { category: String },
    AddAnnotatedText { span: TextSpan },
    DeleteAnnotatedText { index: usize },
    SelectAnnotatedText { index: usize },
    /// Full list replacement, dispatched after a drag reorder
    UpdateAnnotations { spans: Vec<TextSpan> },
    UpdateAdditionalInfoList { items: Vec<AdditionalInfo> },
    UpdateIdealAnswer { text: String },
    UpdateQueryResult { result: QueryResult },
    /// Start over, typically after a successful submission
    Reset { state: Box<AnnotateFlowState> },

    /// Any action this build does not know; leaves the state untouched
    #[serde(other)]
    Unknown,
}

impl AnnotateAction {
    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateQuestion { .. } => "update-question",
            Self::UpdateQuestionType { .. } => "update-question-type",
            Self::UpdateQuestionCategory { .. } => "update-question-category",
            Self::AddAnnotatedText { .. } => "add-annotated-text",
            Self::DeleteAnnotatedText { .. } => "delete-annotated-text",
            Self::SelectAnnotatedText { .. } => "select-annotated-text",
            Self::UpdateAnnotations { .. } => "update-annotations",
            Self::UpdateAdditionalInfoList { .. } => "update-additional-info-list",
            Self::UpdateIdealAnswer { .. } => "update-ideal-answer",
            Self::UpdateQueryResult { .. } => "update-query-result",
            Self::Reset { .. } => "reset",
            Self::Unknown => "unknown",
        }
    }
}

impl AnnotateFlowState {
    /// Fresh state carrying a default category and type
    pub fn with_defaults(category: impl Into<String>, question_type: impl Into<String>) -> Self {
        Self {
            question_category: category.into(),
            question_type: question_type.into(),
            ..Self::default()
        }
    }

    /// Apply an action with default settings
    pub fn reduce(self, action: AnnotateAction) -> Self {
        self.reduce_with(action, &AnnotateSettings::default())
    }

    /// Apply an action
    pub fn reduce_with(self, action: AnnotateAction, settings: &AnnotateSettings) -> Self {
        debug!(action = action.name(), spans = self.spans.len(), "Annotate transition");

        match action {
            AnnotateAction::UpdateQuestion { text } => Self {
                question_text: text,
                ..self
            },
            AnnotateAction::UpdateQuestionType { question_type } => Self {
                question_type,
                ..self
            },
            AnnotateAction::UpdateQuestionCategory { category } => Self {
                question_category: category,
                ..self
            },
            AnnotateAction::AddAnnotatedText { span } => Self {
                spans: collection::append(self.spans, span),
                ..self
            },
            AnnotateAction::DeleteAnnotatedText { index } => {
                if index >= self.spans.len() {
                    warn!(index, len = self.spans.len(), "Delete index out of range");
                }
                Self {
                    spans: collection::remove_at(self.spans, index),
                    ..self
                }
            }
            AnnotateAction::SelectAnnotatedText { index } => {
                if index >= self.spans.len() {
                    warn!(index, len = self.spans.len(), "Select index out of range");
                }
                Self {
                    spans: collection::focus(self.spans, index),
                    ..self
                }
            }
            AnnotateAction::UpdateAnnotations { spans } => Self {
                spans: collection::replace_all(self.spans, spans),
                ..self
            },
            AnnotateAction::UpdateAdditionalInfoList { items } => Self {
                additional_info_list: items,
                ..self
            },
            AnnotateAction::UpdateIdealAnswer { text } => Self {
                ideal_answer: Some(text),
                ..self
            },
            AnnotateAction::UpdateQueryResult { result } => {
                let spans = match settings.stale_chunk_spans {
                    StaleChunkPolicy::Drop => {
                        let before = self.spans.len();
                        let kept: Vec<TextSpan> = self
                            .spans
                            .into_iter()
                            .filter(|span| !span.is_from_chunk())
                            .collect();
                        if kept.len() < before {
                            debug!(dropped = before - kept.len(), "Dropped spans from previous query");
                        }
                        kept
                    }
                    StaleChunkPolicy::Keep => self.spans,
                };

                Self {
                    query_result: Some(result),
                    spans,
                    ..self
                }
            }
            AnnotateAction::Reset { state } => *state,
            AnnotateAction::Unknown => {
                debug!("Ignoring unknown annotate action");
                self
            }
        }
    }

    /// Answer text as it would be submitted
    pub fn answer_text(&self) -> String {
        collection::assemble_answer_text(&self.spans)
    }

    /// Chunks the current spans were selected from
    pub fn referenced_chunks(&self) -> Vec<ResultChunk> {
        collection::chunks_referenced_by(&self.spans)
    }

    /// Chunks currently shown next to the document
    pub fn visible_chunks(&self) -> &[ResultChunk] {
        self.query_result
            .as_ref()
            .map(|result| result.chunks.as_slice())
            .unwrap_or(&[])
    }

    /// Whether there is enough to submit: a question and at least one span
    pub fn is_submittable(&self) -> bool {
        !self.question_text.trim().is_empty() && !self.spans.is_empty()
    }

    /// Build the submission body for the backend
    pub fn to_submission(&self, document_id: &str) -> AnswerSubmission {
        AnswerSubmission {
            document_id: document_id.to_string(),
            query: self.question_text.clone(),
            annotated_text: self.spans.iter().cloned().map(TextSpan::without_focus).collect(),
            additional_answer: join_additional_info(&self.additional_info_list),
            chunk_result: self.referenced_chunks(),
        }
    }
}

/// Render the additional info list as one free-text block
fn join_additional_info(items: &[AdditionalInfo]) -> Option<String> {
    let lines: Vec<String> = items
        .iter()
        .filter(|item| !item.text.trim().is_empty())
        .map(|item| {
            if item.label.trim().is_empty() {
                item.text.clone()
            } else {
                format!("{}: {}", item.label, item.text)
            }
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

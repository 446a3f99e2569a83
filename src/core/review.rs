//! Review flow: navigate a document's stored questions and revise answers.
//!
//! The reviewed fields (`question_text`, `spans`, `result_chunks`,
//! `additional_info`) are always rebuilt from one [`AnswersResult`] when the
//! flow is initialized, moves to another question, or loads a version. They
//! are never cached per question.
//!
//! ```text
//! Loading ──InitializeState──▶ Ready(i) ──UpdateCurrentQuestion(j)──▶ Ready(j)
//!                               │  ▲
//!                               └──┘ UpdateAnswerVersion (same i)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::collection;
use crate::domain::{AnswerSubmission, AnswersResult, ResultChunk, TextSpan};

/// State of one review session over a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewFlowState {
    pub question_text: String,
    pub spans: Vec<TextSpan>,

    /// Chunks referenced by `spans`; recomputed, never edited directly
    pub result_chunks: Vec<ResultChunk>,

    /// Stored question/answer records for the document
    pub qna: Vec<AnswersResult>,

    /// Index into `qna` of the question under review
    pub current_index: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// One user gesture or load completion in the review flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReviewAction {
    AddAnnotatedText { span: TextSpan },
    DeleteAnnotatedText { index: usize },
    SelectAnnotatedText { index: usize },
    UpdateAnnotations { spans: Vec<TextSpan> },
    UpdateAdditionalInfo { text: String },
    /// The document's records finished loading
    InitializeState { qna: Vec<AnswersResult> },
    UpdateCurrentQuestion { index: usize },
    /// Show a historical version without moving off the current question
    UpdateAnswerVersion { record: Box<AnswersResult> },

    #[serde(other)]
    Unknown,
}

impl ReviewAction {
    /// Wire name of the action
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddAnnotatedText { .. } => "add-annotated-text",
            Self::DeleteAnnotatedText { .. } => "delete-annotated-text",
            Self::SelectAnnotatedText { .. } => "select-annotated-text",
            Self::UpdateAnnotations { .. } => "update-annotations",
            Self::UpdateAdditionalInfo { .. } => "update-additional-info",
            Self::InitializeState { .. } => "initialize-state",
            Self::UpdateCurrentQuestion { .. } => "update-current-question",
            Self::UpdateAnswerVersion { .. } => "update-answer-version",
            Self::Unknown => "unknown",
        }
    }
}

impl ReviewFlowState {
    /// Apply an action
    pub fn reduce(self, action: ReviewAction) -> Self {
        debug!(
            action = action.name(),
            current_index = self.current_index,
            "Review transition"
        );

        match action {
            ReviewAction::AddAnnotatedText { span } => Self {
                spans: collection::append(self.spans, span),
                ..self
            },
            ReviewAction::DeleteAnnotatedText { index } => {
                if index >= self.spans.len() {
                    warn!(index, len = self.spans.len(), "Delete index out of range");
                }
                Self {
                    spans: collection::remove_at(self.spans, index),
                    ..self
                }
            }
            ReviewAction::SelectAnnotatedText { index } => {
                if index >= self.spans.len() {
                    warn!(index, len = self.spans.len(), "Select index out of range");
                }
                Self {
                    spans: collection::focus(self.spans, index),
                    ..self
                }
            }
            ReviewAction::UpdateAnnotations { spans } => Self {
                spans: collection::replace_all(self.spans, spans),
                ..self
            },
            ReviewAction::UpdateAdditionalInfo { text } => Self {
                additional_info: Some(text),
                ..self
            },
            ReviewAction::InitializeState { qna } => {
                let current_index = if self.current_index < qna.len() {
                    self.current_index
                } else {
                    0
                };
                Self {
                    qna,
                    current_index,
                    ..self
                }
                .rebuild_from_current()
            }
            ReviewAction::UpdateCurrentQuestion { index } => {
                if index >= self.qna.len() {
                    warn!(index, len = self.qna.len(), "Question index out of range");
                    return self;
                }
                Self {
                    current_index: index,
                    ..self
                }
                .rebuild_from_current()
            }
            ReviewAction::UpdateAnswerVersion { record } => self.rebuild_from(Some(&*record)),
            ReviewAction::Unknown => {
                debug!("Ignoring unknown review action");
                self
            }
        }
    }

    /// Record the flow is currently positioned on
    pub fn current_record(&self) -> Option<&AnswersResult> {
        self.qna.get(self.current_index)
    }

    /// Whether there is a question after the current one
    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.qna.len()
    }

    /// Whether there is a question before the current one
    pub fn has_previous(&self) -> bool {
        self.current_index > 0 && !self.qna.is_empty()
    }

    /// Action moving to the next question, if there is one
    pub fn next_question(&self) -> Option<ReviewAction> {
        self.has_next().then(|| ReviewAction::UpdateCurrentQuestion {
            index: self.current_index + 1,
        })
    }

    /// Action moving to the previous question, if there is one
    pub fn previous_question(&self) -> Option<ReviewAction> {
        self.has_previous().then(|| ReviewAction::UpdateCurrentQuestion {
            index: self.current_index - 1,
        })
    }

    /// Answer text as it would be submitted
    pub fn answer_text(&self) -> String {
        collection::assemble_answer_text(&self.spans)
    }

    /// Build the submission body for a revised answer to the current question
    pub fn to_submission(&self, document_id: &str) -> AnswerSubmission {
        AnswerSubmission {
            document_id: document_id.to_string(),
            query: self.question_text.clone(),
            annotated_text: self.spans.iter().cloned().map(TextSpan::without_focus).collect(),
            additional_answer: self
                .additional_info
                .clone()
                .filter(|text| !text.trim().is_empty()),
            chunk_result: self.result_chunks.clone(),
        }
    }

    fn rebuild_from_current(self) -> Self {
        let record = self.qna.get(self.current_index).cloned();
        self.rebuild_from(record.as_ref())
    }

    /// Rebuild the reviewed fields from one record; `None` clears them
    fn rebuild_from(self, record: Option<&AnswersResult>) -> Self {
        match record {
            Some(record) => Self {
                question_text: record.query.clone(),
                result_chunks: collection::chunks_referenced_by(&record.answers),
                spans: collection::replace_all(self.spans, record.answers.clone()),
                additional_info: record.additional_text.clone(),
                ..self
            },
            None => Self {
                question_text: String::new(),
                spans: Vec::new(),
                result_chunks: Vec::new(),
                additional_info: None,
                ..self
            },
        }
    }
}

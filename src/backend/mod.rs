//! Backend interface for documents and stored answers.
//!
//! The flows never talk to a backend themselves; callers fetch, dispatch the
//! completed result as an action, and submit what the flow produces.

pub mod file;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AnswerSubmission, AnswersResult, DocumentWithContent};

pub use file::{document_id, FileBackend};

/// Errors surfaced by a backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Source of documents and sink for answers
#[async_trait]
pub trait AnnotationBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Load a document with its full text
    async fn fetch_document(&self, document_id: &str) -> Result<DocumentWithContent, BackendError>;

    /// Latest answer version of every question on a document, in question order
    async fn fetch_answers(&self, document_id: &str) -> Result<Vec<AnswersResult>, BackendError>;

    /// Every stored version of one question, oldest first
    async fn fetch_versions(
        &self,
        document_id: &str,
        query: &str,
    ) -> Result<Vec<AnswersResult>, BackendError>;

    /// Store an answer; returns the stored record with its version number
    async fn submit(&self, submission: &AnswerSubmission) -> Result<AnswersResult, BackendError>;
}

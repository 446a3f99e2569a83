//! Domain types for the annotator.
//!
//! This module contains the core data structures:
//! - Spans: Selected text ranges and the chunks they come from
//! - Records: Documents, stored answers and submissions

pub mod records;
pub mod span;

// Re-export commonly used types
pub use records::{AdditionalInfo, AnswerSubmission, AnswersResult, DocumentWithContent, QueryResult};
pub use span::{ChunkMetadata, ResultChunk, TextSpan};

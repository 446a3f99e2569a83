//! annotator - Text-span annotation engine
//!
//! Users select spans of text in a document (and in retrieved result chunks
//! shown beside it) and assemble them into ordered answers to questions. A
//! second role reviews stored answers and their versions.
//!
//! # Architecture
//!
//! The engine is built around pure reducers:
//! - Every user gesture or load completion is an action
//! - A flow's next state is `state.reduce(action)`, with no I/O inside
//! - Span list operations are shared by the authoring and review flows
//!
//! # Modules
//!
//! - `domain`: Data structures (TextSpan, ResultChunk, AnswersResult)
//! - `core`: Span collection, flow reducers, selection surfaces
//! - `backend`: Document/answer storage interface and file implementation
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Import a document
//! annotator import notes.txt
//!
//! # Author an answer from a script of selections and edits
//! annotator annotate <document-id> --script answer.jsonl --submit
//!
//! # Review the second question, at its first version
//! annotator review <document-id> --question 1 --version 1
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use backend::{AnnotationBackend, BackendError, FileBackend};
pub use crate::core::{AnnotateAction, AnnotateFlowState, ReviewAction, ReviewFlowState};
pub use domain::{AnswerSubmission, AnswersResult, DocumentWithContent, ResultChunk, TextSpan};

//! Annotation state engine.
//!
//! This module contains:
//! - collection: Span list operations shared by both flows
//! - annotate: Authoring flow reducer
//! - review: Review flow reducer with question/version navigation
//! - selection: Selection surfaces and highlight rendering
//! - drag: Drag-and-drop reorder gesture

pub mod annotate;
pub mod collection;
pub mod drag;
pub mod review;
pub mod selection;

// Re-export commonly used types
pub use annotate::{AnnotateAction, AnnotateFlowState, AnnotateSettings, StaleChunkPolicy};
pub use collection::{assemble_answer_text, chunks_referenced_by};
pub use drag::DragState;
pub use review::{ReviewAction, ReviewFlowState};
pub use selection::{LineCol, Segment, SelectionError, SelectionSurface, SurfaceSet, SurfaceSource};

//! Text spans and the result chunks they may be selected from.
//!
//! Offsets are character (Unicode scalar value) indices into the text of the
//! document the span was selected from, matching what a selection surface
//! reports. They are validated once, when the span is created.

use serde::{Deserialize, Serialize};

/// A contiguous character range selected from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Document the span was selected from (chunk file name for chunk spans)
    pub source_document_id: String,

    /// Selected text, verbatim
    pub text: String,

    /// Start character offset (inclusive)
    pub start_index: usize,

    /// End character offset (exclusive)
    pub end_index: usize,

    /// Exact chunk text when the span was selected from a retrieved chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chunk: Option<String>,

    /// Transient UI focus marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_focused: Option<bool>,
}

impl TextSpan {
    /// Create a span over the primary document
    pub fn new(
        source_document_id: impl Into<String>,
        text: impl Into<String>,
        start_index: usize,
        end_index: usize,
    ) -> Self {
        Self {
            source_document_id: source_document_id.into(),
            text: text.into(),
            start_index,
            end_index,
            source_chunk: None,
            is_focused: None,
        }
    }

    /// Create a span selected from a retrieved chunk
    pub fn from_chunk(
        chunk: &ResultChunk,
        text: impl Into<String>,
        start_index: usize,
        end_index: usize,
    ) -> Self {
        Self {
            source_chunk: Some(chunk.chunk.clone()),
            ..Self::new(chunk.metadata.file_name.clone(), text, start_index, end_index)
        }
    }

    /// Whether this span is currently the focused one
    pub fn is_focused(&self) -> bool {
        self.is_focused.unwrap_or(false)
    }

    /// Whether this span came from a retrieved chunk
    pub fn is_from_chunk(&self) -> bool {
        self.source_chunk.is_some()
    }

    /// Key of the selection surface this span is rendered on.
    ///
    /// Chunk spans route by chunk text, everything else by document id.
    pub fn routing_key(&self) -> &str {
        self.source_chunk
            .as_deref()
            .unwrap_or(&self.source_document_id)
    }

    /// Length of the span in characters
    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of this span with the focus marker set
    pub fn with_focus(mut self, focused: bool) -> Self {
        self.is_focused = Some(focused);
        self
    }

    /// Copy of this span with the focus marker removed
    pub fn without_focus(mut self) -> Self {
        self.is_focused = None;
        self
    }
}

/// Source metadata attached to a result chunk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Document the chunk was retrieved from
    pub file_name: String,
}

/// A retrieved passage plus the document it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultChunk {
    /// Passage text; also the association key for chunk spans
    pub chunk: String,

    pub metadata: ChunkMetadata,
}

impl ResultChunk {
    pub fn new(chunk: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            chunk: chunk.into(),
            metadata: ChunkMetadata {
                file_name: file_name.into(),
            },
        }
    }

    /// Passage text
    pub fn text(&self) -> &str {
        &self.chunk
    }

    /// Document the passage was retrieved from
    pub fn source_document_id(&self) -> &str {
        &self.metadata.file_name
    }
}

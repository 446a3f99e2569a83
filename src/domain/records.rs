//! Records exchanged with the annotation backend.
//!
//! Field names are the wire names; spans submitted in an
//! [`AnswerSubmission`] come back as [`AnswersResult::answers`] on the next
//! fetch.

use serde::{Deserialize, Serialize};

use super::span::{ResultChunk, TextSpan};

/// A source document with its full text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentWithContent {
    pub id: String,
    pub file_name: String,
    pub content: String,
}

/// One stored question/answer version for a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswersResult {
    pub id: String,

    /// Document this answer belongs to
    pub file_name: String,

    /// Question text
    pub query: String,

    /// Version of the answer for this query (1-indexed)
    pub version_number: u32,

    /// Answer spans in answer order
    #[serde(default)]
    pub answers: Vec<TextSpan>,

    /// Chunks stored alongside the answer
    #[serde(default)]
    pub chunk_results: Vec<ResultChunk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_text: Option<String>,
}

/// Result of a retrieval query: the chunks shown next to the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,

    #[serde(default)]
    pub chunks: Vec<ResultChunk>,
}

/// A labelled free-text note attached to a question in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    pub label: String,
    pub text: String,
}

impl AdditionalInfo {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Body submitted to the backend for one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub document_id: String,
    pub query: String,
    pub annotated_text: Vec<TextSpan>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_answer: Option<String>,

    #[serde(default)]
    pub chunk_result: Vec<ResultChunk>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_result_parses_wire_json() {
        let json = r#"{
            "id": "a1",
            "file_name": "file1.txt",
            "query": "Greet me?",
            "version_number": 2,
            "answers": [
                {"source_document_id": "file3.txt", "text": "hello", "start_index": 0, "end_index": 5,
                 "source_chunk": "hello this is from source"}
            ],
            "chunk_results": [{"chunk": "hello this is from source", "metadata": {"file_name": "file3.txt"}}]
        }"#;

        let record: AnswersResult = serde_json::from_str(json).unwrap();
        assert_eq!(record.version_number, 2);
        assert_eq!(record.answers.len(), 1);
        assert_eq!(
            record.answers[0].source_chunk.as_deref(),
            Some("hello this is from source")
        );
        assert_eq!(record.chunk_results[0].source_document_id(), "file3.txt");
        assert!(record.additional_text.is_none());
    }

    #[test]
    fn test_submission_omits_missing_additional_answer() {
        let submission = AnswerSubmission {
            document_id: "d1".to_string(),
            query: "q".to_string(),
            annotated_text: vec![TextSpan::new("d1", "x", 0, 1)],
            additional_answer: None,
            chunk_result: Vec::new(),
        };

        let json = serde_json::to_value(&submission).unwrap();
        assert!(json.get("additional_answer").is_none());
        assert_eq!(json["annotated_text"][0]["text"], "x");
    }
}

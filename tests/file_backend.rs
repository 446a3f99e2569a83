//! File Backend Integration Tests
//!
//! Tests for document import, answer submission, versioning and the
//! submit-then-review round trip.

use annotator::backend::{document_id, AnnotationBackend, BackendError, FileBackend};
use annotator::core::{AnnotateAction, AnnotateFlowState, ReviewAction, ReviewFlowState, SelectionSurface};
use annotator::domain::{AnswerSubmission, ResultChunk, TextSpan};
use tempfile::TempDir;

const CONTENT: &str = "hello world\nthis is the second line";

async fn backend_with_document() -> (TempDir, FileBackend, String) {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::new(temp_dir.path());
    let document = backend
        .import_document("file1.txt", CONTENT.to_string())
        .await
        .unwrap();
    (temp_dir, backend, document.id)
}

fn submission(document_id: &str, query: &str, text: &str) -> AnswerSubmission {
    AnswerSubmission {
        document_id: document_id.to_string(),
        query: query.to_string(),
        annotated_text: vec![TextSpan::new(document_id, text, 0, text.chars().count())],
        additional_answer: None,
        chunk_result: Vec::new(),
    }
}

#[tokio::test]
async fn test_import_is_content_addressed() {
    let (_temp_dir, backend, id) = backend_with_document().await;
    assert_eq!(id, document_id(CONTENT));

    let again = backend
        .import_document("renamed.txt", CONTENT.to_string())
        .await
        .unwrap();
    assert_eq!(again.id, id);

    let documents = backend.list_documents().await.unwrap();
    assert_eq!(documents.len(), 1);

    let fetched = backend.fetch_document(&id).await.unwrap();
    assert_eq!(fetched.file_name, "file1.txt");
    assert_eq!(fetched.content, CONTENT);
}

#[tokio::test]
async fn test_missing_and_invalid_documents() {
    let (_temp_dir, backend, _id) = backend_with_document().await;

    let missing = backend.fetch_document("0000000000000000").await;
    assert!(matches!(missing, Err(BackendError::DocumentNotFound(_))));

    let invalid = backend.fetch_document("../secrets").await;
    assert!(matches!(invalid, Err(BackendError::InvalidId(_))));

    assert!(backend.fetch_answers("0000000000000000").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submission_validation() {
    let (_temp_dir, backend, id) = backend_with_document().await;

    let empty_query = submission(&id, "  ", "hello");
    assert!(matches!(
        backend.submit(&empty_query).await,
        Err(BackendError::Rejected(_))
    ));

    let mut no_spans = submission(&id, "Greet me?", "hello");
    no_spans.annotated_text.clear();
    assert!(matches!(
        backend.submit(&no_spans).await,
        Err(BackendError::Rejected(_))
    ));
}

#[tokio::test]
async fn test_resubmission_creates_versions() {
    let (_temp_dir, backend, id) = backend_with_document().await;

    let v1 = backend.submit(&submission(&id, "Greet me?", "hello")).await.unwrap();
    let other = backend.submit(&submission(&id, "Which line?", "this")).await.unwrap();
    let v2 = backend.submit(&submission(&id, "Greet me?", "hello world")).await.unwrap();

    assert_eq!(v1.version_number, 1);
    assert_eq!(other.version_number, 1);
    assert_eq!(v2.version_number, 2);
    assert_eq!(v2.file_name, "file1.txt");
    assert_ne!(v1.id, v2.id);

    let latest = backend.fetch_answers(&id).await.unwrap();
    let summary: Vec<(&str, u32)> = latest
        .iter()
        .map(|r| (r.query.as_str(), r.version_number))
        .collect();
    assert_eq!(summary, vec![("Greet me?", 2), ("Which line?", 1)]);

    let versions = backend.fetch_versions(&id, "Greet me?").await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].answers[0].text, "hello");
    assert_eq!(versions[1].answers[0].text, "hello world");
}

#[tokio::test]
async fn test_authored_answer_round_trips_into_review() {
    let (_temp_dir, backend, id) = backend_with_document().await;
    let document = backend.fetch_document(&id).await.unwrap();
    let chunk = ResultChunk::new("hello this is from source", "file3.txt");

    let primary = SelectionSurface::for_document(&document);
    let results = SelectionSurface::for_chunk(&chunk);

    let state = AnnotateFlowState::default()
        .reduce(AnnotateAction::UpdateQuestion {
            text: "Greet me?".to_string(),
        })
        .reduce(AnnotateAction::UpdateQueryResult {
            result: annotator::domain::QueryResult {
                query: "greeting".to_string(),
                chunks: vec![chunk.clone()],
            },
        })
        .reduce(AnnotateAction::AddAnnotatedText {
            span: primary.select(0, 5).unwrap().unwrap(),
        })
        .reduce(AnnotateAction::AddAnnotatedText {
            span: results.select(14, 25).unwrap().unwrap(),
        })
        .reduce(AnnotateAction::SelectAnnotatedText { index: 1 });

    let stored = backend.submit(&state.to_submission(&id)).await.unwrap();
    assert_eq!(stored.chunk_results, vec![chunk.clone()]);

    let review = ReviewFlowState::default().reduce(ReviewAction::InitializeState {
        qna: backend.fetch_answers(&id).await.unwrap(),
    });

    assert_eq!(review.question_text, "Greet me?");
    assert_eq!(review.answer_text(), "hello\n\nfrom source");
    assert_eq!(review.result_chunks, vec![chunk]);
    assert!(review.spans.iter().all(|s| s.is_focused.is_none()));
    assert!(primary.matches(&review.spans[0]));
    assert!(results.matches(&review.spans[1]));
}

//! Directory-backed annotation backend.
//!
//! # Storage Layout
//!
//! ```text
//! <data>/
//! ├── documents/
//! │   └── <document_id>.json     # DocumentWithContent
//! └── answers/
//!     └── <document_id>.jsonl    # one AnswersResult per submitted version
//! ```
//!
//! Answer logs are append-only. A resubmitted question gets the next version
//! number; nothing is rewritten.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use super::{AnnotationBackend, BackendError};
use crate::domain::{AnswerSubmission, AnswersResult, DocumentWithContent};

/// Document identifier: SHA256(content)[0:16]
pub fn document_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// One line of an answer log
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAnswer {
    ts: DateTime<Utc>,
    #[serde(flatten)]
    record: AnswersResult,
}

/// Backend storing documents and answers under one directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Backend over the configured data directory
    pub fn from_config() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::data_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn documents_dir(&self) -> PathBuf {
        self.root.join("documents")
    }

    fn answers_dir(&self) -> PathBuf {
        self.root.join("answers")
    }

    fn document_path(&self, document_id: &str) -> Result<PathBuf, BackendError> {
        validate_id(document_id)?;
        Ok(self.documents_dir().join(format!("{}.json", document_id)))
    }

    fn answers_path(&self, document_id: &str) -> Result<PathBuf, BackendError> {
        validate_id(document_id)?;
        Ok(self.answers_dir().join(format!("{}.jsonl", document_id)))
    }

    /// Register a document; importing the same content twice is a no-op
    pub async fn import_document(
        &self,
        file_name: &str,
        content: String,
    ) -> Result<DocumentWithContent, BackendError> {
        let document = DocumentWithContent {
            id: document_id(&content),
            file_name: file_name.to_string(),
            content,
        };

        let path = self.document_path(&document.id)?;
        if path.exists() {
            debug!(id = %document.id, "Document already imported");
            return Ok(document);
        }

        fs::create_dir_all(self.documents_dir()).await?;
        fs::write(&path, serde_json::to_string_pretty(&document)?).await?;
        info!(id = %document.id, file_name, "Document imported");

        Ok(document)
    }

    /// All imported documents, sorted by file name
    pub async fn list_documents(&self) -> Result<Vec<DocumentWithContent>, BackendError> {
        let dir = self.documents_dir();
        let mut documents = Vec::new();

        if !dir.exists() {
            return Ok(documents);
        }

        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            documents.push(serde_json::from_str(&content)?);
        }

        documents.sort_by(|a: &DocumentWithContent, b| a.file_name.cmp(&b.file_name));
        Ok(documents)
    }

    /// Every stored version for a document, in submission order
    async fn load_answers(&self, document_id: &str) -> Result<Vec<AnswersResult>, BackendError> {
        let path = self.answers_path(document_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        parse_log(&content)
    }
}

/// Ids become file names, so only plain tokens are accepted
fn validate_id(id: &str) -> Result<(), BackendError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(BackendError::InvalidId(id.to_string()))
    }
}

fn parse_log(content: &str) -> Result<Vec<AnswersResult>, BackendError> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str::<StoredAnswer>(line)
                .map(|stored| stored.record)
                .map_err(BackendError::from)
        })
        .collect()
}

/// Keep the highest version of each query, ordered by first submission
fn latest_per_query(records: Vec<AnswersResult>) -> Vec<AnswersResult> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, AnswersResult> = HashMap::new();

    for record in records {
        let is_newer = latest
            .get(&record.query)
            .map(|existing| record.version_number > existing.version_number);

        match is_newer {
            Some(false) => {}
            Some(true) => {
                latest.insert(record.query.clone(), record);
            }
            None => {
                order.push(record.query.clone());
                latest.insert(record.query.clone(), record);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|query| latest.remove(&query))
        .collect()
}

#[async_trait]
impl AnnotationBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_document(&self, document_id: &str) -> Result<DocumentWithContent, BackendError> {
        let path = self.document_path(document_id)?;
        if !path.exists() {
            return Err(BackendError::DocumentNotFound(document_id.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn fetch_answers(&self, document_id: &str) -> Result<Vec<AnswersResult>, BackendError> {
        Ok(latest_per_query(self.load_answers(document_id).await?))
    }

    async fn fetch_versions(
        &self,
        document_id: &str,
        query: &str,
    ) -> Result<Vec<AnswersResult>, BackendError> {
        let mut versions: Vec<AnswersResult> = self
            .load_answers(document_id)
            .await?
            .into_iter()
            .filter(|record| record.query == query)
            .collect();

        versions.sort_by_key(|record| record.version_number);
        Ok(versions)
    }

    async fn submit(&self, submission: &AnswerSubmission) -> Result<AnswersResult, BackendError> {
        if submission.query.trim().is_empty() {
            return Err(BackendError::Rejected("question text is empty".to_string()));
        }
        if submission.annotated_text.is_empty() {
            return Err(BackendError::Rejected("answer has no spans".to_string()));
        }

        let document = self.fetch_document(&submission.document_id).await?;
        let path = self.answers_path(&document.id)?;
        fs::create_dir_all(self.answers_dir()).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        // Held until the file is dropped
        file.lock_exclusive()?;

        let mut existing = String::new();
        file.read_to_string(&mut existing)?;

        let version_number = parse_log(&existing)?
            .iter()
            .filter(|record| record.query == submission.query)
            .map(|record| record.version_number)
            .max()
            .unwrap_or(0)
            + 1;

        let record = AnswersResult {
            id: Uuid::new_v4().to_string(),
            file_name: document.file_name.clone(),
            query: submission.query.clone(),
            version_number,
            answers: submission.annotated_text.clone(),
            chunk_results: submission.chunk_result.clone(),
            additional_text: submission.additional_answer.clone(),
        };

        let stored = StoredAnswer {
            ts: Utc::now(),
            record,
        };

        writeln!(file, "{}", serde_json::to_string(&stored)?)?;
        file.flush()?;

        info!(
            document_id = %document.id,
            query = %stored.record.query,
            version = stored.record.version_number,
            "Answer stored"
        );

        Ok(stored.record)
    }
}

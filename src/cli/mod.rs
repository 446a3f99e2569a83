//! Command-line interface for annotator.
//!
//! Provides commands for importing documents, authoring answers from action
//! scripts, reviewing stored answers and their versions, and inspecting
//! configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::backend::{AnnotationBackend, FileBackend};
use crate::core::{AnnotateFlowState, ReviewAction, ReviewFlowState, SurfaceSet};
use crate::domain::DocumentWithContent;

pub mod render;
pub mod script;

/// annotator - Text-span annotation for question/answer datasets
#[derive(Parser, Debug)]
#[command(name = "annotator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a text file as a document
    Import {
        /// File to import
        path: PathBuf,

        /// Name to store (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List imported documents
    Documents,

    /// List the questions answered on a document
    Answers {
        /// Document ID
        document_id: String,
    },

    /// Show a document with one question's answer highlighted
    Show {
        /// Document ID
        document_id: String,

        /// Question index (0-based)
        #[arg(short, long, default_value = "0")]
        question: usize,
    },

    /// Author an answer by replaying an action script
    Annotate {
        /// Document ID
        document_id: String,

        /// JSONL script of actions and gestures
        #[arg(short, long)]
        script: PathBuf,

        /// Submit the resulting answer
        #[arg(long)]
        submit: bool,
    },

    /// Review stored answers, optionally revising one
    Review {
        /// Document ID
        document_id: String,

        /// Question index (0-based)
        #[arg(short, long)]
        question: Option<usize>,

        /// Load a specific answer version of the question
        #[arg(long)]
        version: Option<u32>,

        /// JSONL script of actions and gestures to apply
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Submit the reviewed answer as a new version
        #[arg(long)]
        submit: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Import { path, name } => import_document(path, name).await,
            Commands::Documents => list_documents().await,
            Commands::Answers { document_id } => list_answers(&document_id).await,
            Commands::Show {
                document_id,
                question,
            } => show_document(&document_id, question).await,
            Commands::Annotate {
                document_id,
                script,
                submit,
            } => annotate(&document_id, script, submit).await,
            Commands::Review {
                document_id,
                question,
                version,
                script,
                submit,
            } => review(&document_id, question, version, script, submit).await,
            Commands::Config => show_config().await,
        }
    }
}

/// Import a document from disk
async fn import_document(path: PathBuf, name: Option<String>) -> Result<()> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read document: {}", path.display()))?;

    if content.trim().is_empty() {
        anyhow::bail!("Document is empty: {}", path.display());
    }

    let file_name = match name {
        Some(name) => name,
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("Path has no file name: {}", path.display()))?,
    };

    let backend = FileBackend::from_config()?;
    let document = backend.import_document(&file_name, content).await?;

    println!("{}", document.id);
    eprintln!("Imported {} ({} characters)", document.file_name, document.content.chars().count());

    Ok(())
}

/// List imported documents
async fn list_documents() -> Result<()> {
    let backend = FileBackend::from_config()?;
    let documents = backend.list_documents().await?;

    if documents.is_empty() {
        println!("No documents. Use 'annotator import <file>' to add one.");
        return Ok(());
    }

    println!("{:<18} {:<40} {:>10}", "ID", "FILE", "CHARS");
    println!("{}", "-".repeat(70));

    for document in &documents {
        println!(
            "{:<18} {:<40} {:>10}",
            document.id,
            render::preview(&document.file_name, 40),
            document.content.chars().count()
        );
    }

    Ok(())
}

/// List the latest answer to every question on a document
async fn list_answers(document_id: &str) -> Result<()> {
    let backend = FileBackend::from_config()?;
    let document = backend.fetch_document(document_id).await?;
    let qna = backend.fetch_answers(&document.id).await?;

    if qna.is_empty() {
        println!("No answers for {}", document.file_name);
        return Ok(());
    }

    println!("{:<4} {:<8} {:<40} {:<30}", "#", "VERSION", "QUESTION", "ANSWER");
    println!("{}", "-".repeat(84));

    for (i, record) in qna.iter().enumerate() {
        let answer = crate::core::assemble_answer_text(&record.answers);
        println!(
            "{:<4} {:<8} {:<40} {:<30}",
            i,
            format!("v{}", record.version_number),
            render::preview(&record.query, 40),
            render::preview(&answer, 30)
        );
    }

    Ok(())
}

/// Print a document with the given question's spans highlighted
async fn show_document(document_id: &str, question: usize) -> Result<()> {
    let backend = FileBackend::from_config()?;
    let document = backend.fetch_document(document_id).await?;
    let state = load_review(&backend, &document, Some(question)).await?;

    if let Some(record) = state.current_record() {
        println!("Q{} (v{}): {}\n", state.current_index, record.version_number, state.question_text);
    }

    let surfaces = SurfaceSet::new(&document, &state.result_chunks);
    print!("{}", render::render_surfaces(&surfaces, &state.spans));

    Ok(())
}

/// Fold an action script through the authoring flow
async fn annotate(document_id: &str, script_path: PathBuf, submit: bool) -> Result<()> {
    let flow = crate::config::flow_settings()?;
    let settings = flow.annotate_settings();

    let backend = FileBackend::from_config()?;
    let document = backend.fetch_document(document_id).await?;
    let steps = script::load_script(&script_path).await?;

    let mut state = AnnotateFlowState::with_defaults(&flow.default_category, &flow.default_type);
    for step in steps {
        let surfaces = SurfaceSet::new(&document, state.visible_chunks());
        if let Some(action) = script::resolve_step(step, &surfaces, &state.spans)? {
            state = state.reduce_with(action, &settings);
        }
    }

    let surfaces = SurfaceSet::new(&document, state.visible_chunks());
    println!("Question: {}", state.question_text);
    println!("Category: {}   Type: {}", state.question_category, state.question_type);
    if let Some(ideal) = &state.ideal_answer {
        println!("Ideal answer: {}", ideal);
    }
    print_answer(&state.spans, &surfaces);

    let unrouted = surfaces.unrouted(&state.spans);
    if !unrouted.is_empty() {
        tracing::warn!(count = unrouted.len(), "Some spans come from chunks no longer shown");
    }

    if submit {
        if !state.is_submittable() {
            anyhow::bail!("Nothing to submit: a question and at least one span are required");
        }
        let stored = backend.submit(&state.to_submission(&document.id)).await?;
        eprintln!("Submitted \"{}\" as version {}", stored.query, stored.version_number);
    }

    Ok(())
}

/// Load the review flow, optionally revise, and optionally submit
async fn review(
    document_id: &str,
    question: Option<usize>,
    version: Option<u32>,
    script_path: Option<PathBuf>,
    submit: bool,
) -> Result<()> {
    let backend = FileBackend::from_config()?;
    let document = backend.fetch_document(document_id).await?;
    let mut state = load_review(&backend, &document, question).await?;

    if state.qna.is_empty() {
        println!("No answers to review for {}", document.file_name);
        return Ok(());
    }

    if let Some(version) = version {
        let record = backend
            .fetch_versions(&document.id, &state.question_text)
            .await?
            .into_iter()
            .find(|r| r.version_number == version)
            .with_context(|| format!("No version {} of \"{}\"", version, state.question_text))?;

        state = state.reduce(ReviewAction::UpdateAnswerVersion {
            record: Box::new(record),
        });
    }

    if let Some(path) = script_path {
        for step in script::load_script(&path).await? {
            let surfaces = SurfaceSet::new(&document, &state.result_chunks);
            if let Some(action) = script::resolve_step(step, &surfaces, &state.spans)? {
                state = state.reduce(action);
            }
        }
    }

    println!(
        "Question {}/{}: {}",
        state.current_index + 1,
        state.qna.len(),
        state.question_text
    );
    if let Some(info) = &state.additional_info {
        println!("Additional info: {}", info);
    }
    let surfaces = SurfaceSet::new(&document, &state.result_chunks);
    print_answer(&state.spans, &surfaces);

    if submit {
        if state.spans.is_empty() {
            anyhow::bail!("Nothing to submit: the answer has no spans");
        }
        let stored = backend.submit(&state.to_submission(&document.id)).await?;
        eprintln!("Submitted \"{}\" as version {}", stored.query, stored.version_number);
    }

    Ok(())
}

/// Fetch a document's answers and position the review flow on a question
async fn load_review(
    backend: &dyn AnnotationBackend,
    document: &DocumentWithContent,
    question: Option<usize>,
) -> Result<ReviewFlowState> {
    let qna = backend.fetch_answers(&document.id).await?;
    let total = qna.len();
    let mut state = ReviewFlowState::default().reduce(ReviewAction::InitializeState { qna });

    if let Some(index) = question {
        if index >= total && total > 0 {
            anyhow::bail!("Question {} out of range (document has {})", index, total);
        }
        state = state.reduce(ReviewAction::UpdateCurrentQuestion { index });
    }

    Ok(state)
}

fn print_answer(spans: &[crate::domain::TextSpan], surfaces: &SurfaceSet) {
    println!("\nSpans ({}):", spans.len());
    for line in render::span_lines(spans, surfaces) {
        println!("{}", line);
    }

    println!("\nAnswer:\n{}", crate::core::assemble_answer_text(spans));

    let chunks = crate::core::chunks_referenced_by(spans);
    if !chunks.is_empty() {
        println!("\nResults referenced:");
        for chunk in chunks {
            println!("  - {} ({})", render::preview(chunk.text(), 60), chunk.source_document_id());
        }
    }
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = crate::config::config()?;

    println!("Annotator Configuration");
    println!("{}", "=".repeat(40));
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:      {}", cfg.home.display());
    println!("  Data:      {}", cfg.data.display());
    println!("  Documents: {}", cfg.data.join("documents").display());
    println!("  Answers:   {}", cfg.data.join("answers").display());
    println!();
    println!("Flow:");
    println!("  Stale chunk spans: {:?}", cfg.flow.stale_chunk_spans);
    println!("  Default category:  {}", cfg.flow.default_category);
    println!("  Default type:      {}", cfg.flow.default_type);

    Ok(())
}

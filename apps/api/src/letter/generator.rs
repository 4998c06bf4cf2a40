//! Cover letter generation — orchestrates the full retrieval pipeline.
//!
//! Flow: extract → chunk → index → retrieve (resume, and coursework when
//!       supplied) → compose prompt → generate → return response.
//!
//! Nothing outlives the call: indexes are built and dropped per request.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::chunking::{split_text, ChunkingConfig};
use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::index::VectorIndex;
use crate::letter::composer::{compose_and_generate, PromptFields};
use crate::llm_client::prompts::CAREER_COACH_SYSTEM;
use crate::llm_client::ChatModel;
use crate::retrieval::{RetrievalResult, Retriever, DEFAULT_TOP_K};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Chunking and retrieval knobs shared by both sub-pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub chunking: ChunkingConfig,
    pub top_k: usize,
}

impl PipelineSettings {
    pub fn new(chunking: ChunkingConfig, top_k: usize) -> Result<Self, AppError> {
        if top_k == 0 {
            return Err(AppError::Validation(
                "retrieval top_k must be at least 1".to_string(),
            ));
        }
        Ok(Self { chunking, top_k })
    }

    pub fn from_parts(
        chunk_size: usize,
        chunk_overlap: usize,
        top_k: usize,
    ) -> Result<Self, AppError> {
        let chunking =
            ChunkingConfig::new(chunk_size, chunk_overlap).map_err(AppError::Chunking)?;
        Self::new(chunking, top_k)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Inputs for one cover letter. Document paths must stay readable for the
/// duration of the call.
#[derive(Debug, Clone)]
pub struct CoverLetterRequest {
    pub request_id: Uuid,
    pub resume_path: PathBuf,
    pub job_role: String,
    pub company_name: String,
    pub company_context: String,
    pub course_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverLetterResponse {
    pub request_id: Uuid,
    pub cover_letter: String,
    pub candidate_profile: String,
    pub course_context: Option<String>,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full pipeline for one request.
///
/// Steps:
/// 1. resume: extract → chunk → index → retrieve(job_role) → candidate profile
/// 2. coursework (only when a file was supplied): same stages → course context
/// 3. compose prompt → generate
///
/// Steps 1 and 2 run concurrently; the first failure aborts the request.
/// A supplied coursework file that fails any stage fails the request.
pub async fn generate_cover_letter(
    embedder: &dyn Embedder,
    llm: &dyn ChatModel,
    settings: &PipelineSettings,
    request: CoverLetterRequest,
) -> Result<CoverLetterResponse, AppError> {
    let request_id = request.request_id;
    info!(
        %request_id,
        "Generating cover letter for '{}' at '{}'",
        request.job_role,
        request.company_name
    );

    let resume = retrieve_context(&request.resume_path, &request.job_role, embedder, settings);
    let course = async {
        match &request.course_path {
            Some(path) => retrieve_context(path, &request.job_role, embedder, settings)
                .await
                .map(Some),
            None => Ok(None),
        }
    };
    let (candidate, course) = tokio::try_join!(resume, course)?;

    let candidate_profile = candidate.context();
    let course_context = course.map(|c| c.context());
    info!(
        %request_id,
        "Retrieved {} resume chunk(s), coursework: {}",
        candidate.len(),
        course_context
            .as_ref()
            .map(|c| format!("{} chars", c.chars().count()))
            .unwrap_or_else(|| "none".to_string())
    );

    let fields = PromptFields {
        job_role: &request.job_role,
        company_name: &request.company_name,
        company_context: &request.company_context,
        candidate_profile: &candidate_profile,
        course_context: course_context.as_deref(),
    };
    let cover_letter = compose_and_generate(llm, CAREER_COACH_SYSTEM, &fields).await?;

    info!(
        %request_id,
        "Cover letter generated ({} chars)",
        cover_letter.chars().count()
    );

    Ok(CoverLetterResponse {
        request_id,
        cover_letter,
        candidate_profile,
        course_context,
        generated_at: Utc::now(),
    })
}

/// One sub-pipeline: extract → chunk → index → retrieve.
pub async fn retrieve_context(
    path: &Path,
    query: &str,
    embedder: &dyn Embedder,
    settings: &PipelineSettings,
) -> Result<RetrievalResult, AppError> {
    let owned_path = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || extract_text(&owned_path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let chunks = split_text(&text, &settings.chunking);
    info!(
        "Split {} into {} chunk(s) from {} chars",
        path.display(),
        chunks.len(),
        text.chars().count()
    );

    let index = VectorIndex::build(chunks, embedder).await?;
    let result = Retriever::new(&index, embedder, settings.top_k)
        .retrieve(query)
        .await?;
    Ok(result)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

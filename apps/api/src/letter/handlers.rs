//! Axum route handlers for the Cover Letter API.

use std::io::Write;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::letter::generator::{generate_cover_letter, CoverLetterRequest, CoverLetterResponse};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Multipart form
// ────────────────────────────────────────────────────────────────────────────

/// An uploaded document spooled to disk. The file is removed on drop.
struct Upload {
    file: NamedTempFile,
    file_name: String,
}

#[derive(Default)]
struct CoverLetterForm {
    resume: Option<Upload>,
    coursework: Option<Upload>,
    job_role: Option<String>,
    company_name: Option<String>,
    company_context: Option<String>,
}

impl CoverLetterForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = CoverLetterForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" | "coursework" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part for an untouched file input.
                    if bytes.is_empty() {
                        continue;
                    }
                    let upload = spool(&file_name, &bytes)?;
                    debug!("Received {name} upload '{file_name}' ({} bytes)", bytes.len());
                    if name == "resume" {
                        form.resume = Some(upload);
                    } else {
                        form.coursework = Some(upload);
                    }
                }
                "job_role" => form.job_role = Some(field.text().await?),
                "company_name" => form.company_name = Some(field.text().await?),
                "company_context" => form.company_context = Some(field.text().await?),
                other => debug!("Ignoring unknown form field '{other}'"),
            }
        }

        Ok(form)
    }
}

/// Writes the upload to a temp file keeping the original extension, which
/// extraction uses as a format hint.
fn spool(file_name: &str, bytes: &[u8]) -> Result<Upload, AppError> {
    let suffix = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("cover-letter-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to create temp file: {e}")))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to spool upload: {e}")))?;

    Ok(Upload {
        file,
        file_name: file_name.to_string(),
    })
}

fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cover-letters
///
/// multipart/form-data: `resume` (file), `job_role`, `company_name`,
/// `company_context`, optional `coursework` (file).
/// Runs the retrieval pipeline over the uploads and returns the generated letter.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let form = CoverLetterForm::from_multipart(multipart).await?;

    let resume = form
        .resume
        .ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;
    let job_role = required_text(form.job_role, "job_role")?;
    let company_name = required_text(form.company_name, "company_name")?;
    let company_context = required_text(form.company_context, "company_context")?;

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        "Cover letter request: resume '{}', coursework {}",
        resume.file_name,
        form.coursework
            .as_ref()
            .map(|c| format!("'{}'", c.file_name))
            .unwrap_or_else(|| "none".to_string())
    );

    let request = CoverLetterRequest {
        request_id,
        resume_path: resume.file.path().to_path_buf(),
        job_role,
        company_name,
        company_context,
        course_path: form.coursework.as_ref().map(|c| c.file.path().to_path_buf()),
    };

    // `resume` and `form.coursework` stay alive until the pipeline finishes.
    let response = generate_cover_letter(
        state.embedder.as_ref(),
        state.llm.as_ref(),
        &state.config.pipeline,
        request,
    )
    .await?;

    Ok(Json(response))
}

//! Axum route handlers for the JSON API.
//!
//! `/api/v1/analyze` runs the same pipeline as the HTML form. The per-generator
//! endpoints take the snapshot explicitly, so callers can re-run one artifact
//! without repeating extraction.

use axum::{extract::Multipart, extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::generation::cover_letter::generate_cover_letter;
use crate::generation::pipeline::{run_pipeline, AnalysisReport};
use crate::generation::questions::{
    generate_employee_questions, generate_employer_questions, generate_job_questions,
};
use crate::generation::rating::{generate_rating, FitDisplay};
use crate::state::AppState;
use crate::store::StoreSnapshot;
use crate::ui::form::read_run_request;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TextArtifactResponse {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart form identical to the HTML one. Returns the full report as JSON.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let request = read_run_request(multipart).await?;
    let report = run_pipeline(&state, request).await?;
    Ok(Json(report))
}

/// POST /api/v1/generate/rating
pub async fn handle_rating(
    State(state): State<AppState>,
    Json(snapshot): Json<StoreSnapshot>,
) -> Result<Json<FitDisplay>, AppError> {
    validate_snapshot(&snapshot)?;
    let rating = generate_rating(&snapshot, &state.prompts, state.text.as_ref()).await?;
    Ok(Json(FitDisplay::from(rating)))
}

/// POST /api/v1/generate/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(snapshot): Json<StoreSnapshot>,
) -> Result<Json<TextArtifactResponse>, AppError> {
    validate_snapshot(&snapshot)?;
    let text = generate_cover_letter(&snapshot, &state.prompts, state.text.as_ref()).await?;
    Ok(Json(TextArtifactResponse { text }))
}

/// POST /api/v1/generate/questions/employer
pub async fn handle_employer_questions(
    State(state): State<AppState>,
    Json(snapshot): Json<StoreSnapshot>,
) -> Result<Json<TextArtifactResponse>, AppError> {
    validate_snapshot(&snapshot)?;
    let text = generate_employer_questions(&snapshot, &state.prompts, state.text.as_ref()).await?;
    Ok(Json(TextArtifactResponse { text }))
}

/// POST /api/v1/generate/questions/employee
pub async fn handle_employee_questions(
    State(state): State<AppState>,
    Json(snapshot): Json<StoreSnapshot>,
) -> Result<Json<TextArtifactResponse>, AppError> {
    validate_snapshot(&snapshot)?;
    let text = generate_employee_questions(&snapshot, &state.prompts, state.text.as_ref()).await?;
    Ok(Json(TextArtifactResponse { text }))
}

/// POST /api/v1/generate/questions/job
pub async fn handle_job_questions(
    State(state): State<AppState>,
    Json(snapshot): Json<StoreSnapshot>,
) -> Result<Json<TextArtifactResponse>, AppError> {
    validate_snapshot(&snapshot)?;
    let text = generate_job_questions(&snapshot, &state.prompts, state.text.as_ref()).await?;
    Ok(Json(TextArtifactResponse { text }))
}

fn validate_snapshot(snapshot: &StoreSnapshot) -> Result<(), AppError> {
    if snapshot.resume_text.trim().is_empty() {
        return Err(AppError::MissingPrerequisite(
            "resume_text is empty".to_string(),
        ));
    }
    if snapshot.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

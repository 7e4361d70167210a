//! Analysis pipeline: the single user action behind the Process button.
//!
//! Flow: validate inputs → extract (always) → rating (always) + cover letter (flag)
//!       + interview questions (flag), run concurrently over one snapshot → report.
//!
//! The report's field order is the display order, whatever order the flags were set in.

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, ErrorBody};
use crate::extraction::extractor::extract_resume;
use crate::generation::cover_letter::generate_cover_letter;
use crate::generation::questions::generate_employee_questions;
use crate::generation::rating::{generate_rating, FitDisplay};
use crate::state::AppState;
use crate::store::IntermediateStore;

pub const MISSING_INPUT_WARNING: &str =
    "Please upload a resume and enter a job description to proceed.";

/// The three UI checkboxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RunOptions {
    /// Show the rendered page and the raw extraction.
    pub extract: bool,
    pub cover_letter: bool,
    pub questions: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub resume: Option<Bytes>,
    pub job_description: String,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionView {
    pub image_base64: String,
    pub resume_text: String,
}

/// One optional artifact slot. A failure here does not hide the other artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Artifact {
    Ready { text: String },
    Failed { error: ErrorBody },
}

impl From<Result<String, AppError>> for Artifact {
    fn from(result: Result<String, AppError>) -> Self {
        match result {
            Ok(text) => Artifact::Ready { text },
            Err(e) => {
                e.log();
                Artifact::Failed { error: e.body() }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub fit: FitDisplay,
    pub extraction: Option<ExtractionView>,
    pub cover_letter: Option<Artifact>,
    pub interview_questions: Option<Artifact>,
}

/// Both inputs are required; nothing else runs when one is missing.
pub fn validate_request(request: &RunRequest) -> Result<(), AppError> {
    let has_resume = request.resume.as_ref().is_some_and(|b| !b.is_empty());
    if !has_resume || request.job_description.trim().is_empty() {
        return Err(AppError::Validation(MISSING_INPUT_WARNING.to_string()));
    }
    Ok(())
}

pub async fn run_pipeline(state: &AppState, request: RunRequest) -> Result<AnalysisReport, AppError> {
    validate_request(&request)?;
    let RunRequest {
        resume,
        job_description,
        options,
    } = request;
    let pdf = resume.unwrap_or_default();

    let run_id = Uuid::new_v4();
    info!("Run {run_id} started: {options:?}");

    // Step 1: Extraction (always runs, aborts the run on failure)
    let mut store = IntermediateStore::new();
    let extracted = extract_resume(
        &pdf,
        &job_description,
        state.renderer.as_ref(),
        state.vision.as_ref(),
        &state.prompts,
        &mut store,
    )
    .await?;

    if let Some(dir) = &state.config.scratch_dir {
        store.persist(&dir.join(run_id.to_string())).await?;
    }

    // Step 2: Generators over one read-only snapshot
    let snapshot = store.snapshot()?;
    let prompts = &state.prompts;
    let text = state.text.as_ref();

    let cover_letter = async {
        if options.cover_letter {
            Some(Artifact::from(generate_cover_letter(&snapshot, prompts, text).await))
        } else {
            None
        }
    };
    let interview_questions = async {
        if options.questions {
            Some(Artifact::from(
                generate_employee_questions(&snapshot, prompts, text).await,
            ))
        } else {
            None
        }
    };

    let (rating, cover_letter, interview_questions) = tokio::join!(
        generate_rating(&snapshot, prompts, text),
        cover_letter,
        interview_questions
    );
    let fit = FitDisplay::from(rating?);

    let failed = [&cover_letter, &interview_questions]
        .iter()
        .filter(|a| matches!(a, Some(Artifact::Failed { .. })))
        .count();
    if failed > 0 {
        warn!("Run {run_id} finished with {failed} failed artifact(s)");
    }
    info!("Run {run_id} finished: fit level '{}'", fit.fit_level);

    Ok(AnalysisReport {
        run_id,
        generated_at: Utc::now(),
        fit,
        extraction: options.extract.then(|| ExtractionView {
            image_base64: general_purpose::STANDARD.encode(&extracted.image_png),
            resume_text: extracted.resume_text,
        }),
        cover_letter,
        interview_questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::rating::Rating;
    use crate::llm_client::LlmError;
    use crate::test_support::{FakeText, FakeVision, Harness};

    fn request(pdf: &'static [u8], jd: &str, options: RunOptions) -> RunRequest {
        RunRequest {
            resume: Some(Bytes::from_static(pdf)),
            job_description: jd.to_string(),
            options,
        }
    }

    fn all_options() -> RunOptions {
        RunOptions {
            extract: true,
            cover_letter: true,
            questions: true,
        }
    }

    fn ready_text(artifact: &Option<Artifact>) -> &str {
        match artifact {
            Some(Artifact::Ready { text }) => text,
            other => panic!("expected ready artifact, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_makes_no_model_call() {
        let harness = Harness::new();
        let req = RunRequest {
            resume: None,
            job_description: "Rust engineer".to_string(),
            options: all_options(),
        };

        let err = run_pipeline(&harness.state, req).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(ref msg) if msg == MISSING_INPUT_WARNING));
        assert_eq!(harness.model_calls(), 0);
        assert_eq!(harness.renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_job_description_makes_no_model_call() {
        let harness = Harness::new();
        let err = run_pipeline(&harness.state, request(b"%PDF-ada", " \n\t ", all_options()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(harness.model_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_counts_as_missing() {
        let harness = Harness::new();
        let req = RunRequest {
            resume: Some(Bytes::new()),
            job_description: "Rust engineer".to_string(),
            options: RunOptions::default(),
        };
        assert!(matches!(
            run_pipeline(&harness.state, req).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(harness.model_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_flags_runs_extraction_and_rating_only() {
        let harness = Harness::new();
        let report = run_pipeline(&harness.state, request(b"%PDF-ada", "Rust engineer", RunOptions::default()))
            .await
            .unwrap();

        assert_eq!(report.fit.rating, Rating::Score(7));
        assert_eq!(report.fit.fit_level, "Good fit");
        assert_eq!(report.fit.stars.as_deref(), Some("★★★★★★★☆☆☆"));
        assert!(report.extraction.is_none());
        assert!(report.cover_letter.is_none());
        assert!(report.interview_questions.is_none());
        assert_eq!(harness.vision.calls(), 1);
        assert_eq!(harness.text.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_flags_produce_every_artifact() {
        let harness = Harness::new();
        let report = run_pipeline(&harness.state, request(b"%PDF-ada", "Rust engineer", all_options()))
            .await
            .unwrap();

        let extraction = report.extraction.as_ref().unwrap();
        assert_eq!(extraction.image_base64, general_purpose::STANDARD.encode(b"ada"));
        assert!(extraction.resume_text.contains("ada"));
        assert!(ready_text(&report.cover_letter).starts_with("COVER|Rust engineer|"));
        assert!(ready_text(&report.interview_questions).starts_with("EMPLOYEE:"));
        assert_eq!(harness.text.calls(), 3);
        assert_eq!(harness.text.streamed_calls(), 1);
    }

    #[tokio::test]
    async fn test_second_run_reflects_only_second_inputs() {
        let harness = Harness::new();
        run_pipeline(&harness.state, request(b"%PDF-alice", "Job Alpha", all_options()))
            .await
            .unwrap();
        let second = run_pipeline(&harness.state, request(b"%PDF-bob", "Job Beta", all_options()))
            .await
            .unwrap();

        for text in [
            ready_text(&second.cover_letter),
            ready_text(&second.interview_questions),
            second.extraction.as_ref().unwrap().resume_text.as_str(),
        ] {
            assert!(!text.contains("alice"), "stale resume in {text:?}");
            assert!(!text.contains("Job Alpha"), "stale job description in {text:?}");
        }
        assert!(ready_text(&second.cover_letter).contains("Job Beta"));
        assert!(ready_text(&second.cover_letter).contains("bob"));
    }

    #[tokio::test]
    async fn test_concurrent_runs_do_not_share_state() {
        let harness = Harness::new();
        let (a, b) = tokio::join!(
            run_pipeline(&harness.state, request(b"%PDF-alice", "Job Alpha", all_options())),
            run_pipeline(&harness.state, request(b"%PDF-bob", "Job Beta", all_options())),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.run_id, b.run_id);
        assert_eq!(ready_text(&a.cover_letter), "COVER|Job Alpha|{\"prompt\": \"EXTRACT\", \"name\": \"alice\"}");
        assert_eq!(ready_text(&b.cover_letter), "COVER|Job Beta|{\"prompt\": \"EXTRACT\", \"name\": \"bob\"}");
    }

    #[tokio::test]
    async fn test_unparseable_rating_still_completes_run() {
        let harness = Harness::with_models(
            FakeVision::default(),
            FakeText::new(|prompt| {
                if prompt.starts_with("RATE") {
                    Ok("abc".to_string())
                } else {
                    Ok(prompt.to_string())
                }
            }),
        );
        let report = run_pipeline(&harness.state, request(b"%PDF-ada", "Rust engineer", all_options()))
            .await
            .unwrap();

        assert_eq!(report.fit.rating, Rating::NoResponse);
        assert_eq!(report.fit.fit_level, "No response");
        assert!(matches!(report.cover_letter, Some(Artifact::Ready { .. })));
    }

    #[tokio::test]
    async fn test_failed_cover_letter_does_not_hide_questions() {
        let harness = Harness::with_models(
            FakeVision::default(),
            FakeText::new(|prompt| match prompt {
                p if p.starts_with("RATE") => Ok("9".to_string()),
                p if p.starts_with("COVER") => Err(LlmError::Api {
                    status: 500,
                    message: "backend error".to_string(),
                }),
                p => Ok(p.to_string()),
            }),
        );
        let report = run_pipeline(&harness.state, request(b"%PDF-ada", "Rust engineer", all_options()))
            .await
            .unwrap();

        assert_eq!(report.fit.fit_level, "Best fit");
        match &report.cover_letter {
            Some(Artifact::Failed { error }) => assert_eq!(error.code, "MODEL_INVOCATION_ERROR"),
            other => panic!("expected failed cover letter, got {other:?}"),
        }
        assert!(ready_text(&report.interview_questions).starts_with("EMPLOYEE:"));
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts_run() {
        let harness = Harness::with_models(FakeVision::failing(), FakeText::scripted());
        let err = run_pipeline(&harness.state, request(b"%PDF-ada", "Rust engineer", all_options()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ModelInvocation(_)));
        assert_eq!(harness.text.calls(), 0);
    }

    #[tokio::test]
    async fn test_scratch_dir_receives_a_copy_per_run() {
        let mut harness = Harness::new();
        let scratch = tempfile::tempdir().unwrap();
        harness.state.config.scratch_dir = Some(scratch.path().to_path_buf());

        let report = run_pipeline(&harness.state, request(b"%PDF-ada", "Rust engineer", RunOptions::default()))
            .await
            .unwrap();

        let loaded = IntermediateStore::load(&scratch.path().join(report.run_id.to_string()))
            .await
            .unwrap();
        let snapshot = loaded.snapshot().unwrap();
        assert_eq!(snapshot.job_description, "Rust engineer");
        assert!(snapshot.resume_text.contains("ada"));
    }

    #[test]
    fn test_report_serializes_artifacts_with_status_tag() {
        let artifact = Artifact::Ready {
            text: "Dear team".to_string(),
        };
        let value = serde_json::to_value(&artifact).unwrap();
        assert_eq!(value["status"], "ready");
        assert_eq!(value["text"], "Dear team");
    }
}

//! Presentation layer: the single page served at `/` and the Process action.

pub mod form;

use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Response},
};
use minijinja::{context, Environment};

use crate::errors::AppError;
use crate::generation::pipeline::{run_pipeline, AnalysisReport};
use crate::state::AppState;
use form::read_run_request;

/// Compiled page templates. `.html` names get HTML auto-escaping.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("templates/base.html"))?;
        env.add_template("index.html", include_str!("templates/index.html"))?;
        env.add_template("result.html", include_str!("templates/result.html"))?;
        Ok(Self { env })
    }

    /// `job_description` refills the textarea when the form is shown again after a failure.
    pub fn render_index(
        &self,
        warning: Option<&str>,
        job_description: &str,
    ) -> Result<String, AppError> {
        self.render(
            "index.html",
            context! { warning => warning, job_description => job_description },
        )
    }

    pub fn render_result(&self, report: &AnalysisReport) -> Result<String, AppError> {
        self.render("result.html", context! { report => report })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, AppError> {
        self.env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context(format!("rendering {name}"))))
    }
}

/// GET /
pub async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.views.render_index(None, "")?))
}

/// POST /process
///
/// Any failure is shown as a warning above the form, with the error's status code.
pub async fn handle_process(State(state): State<AppState>, multipart: Multipart) -> Response {
    let mut job_description = String::new();
    let outcome = match read_run_request(multipart).await {
        Ok(request) => {
            job_description.clone_from(&request.job_description);
            run_pipeline(&state, request).await
        }
        Err(e) => Err(e),
    };

    let (status, page) = match outcome {
        Ok(report) => (axum::http::StatusCode::OK, state.views.render_result(&report)),
        Err(e) => {
            e.log();
            let warning = e.user_message();
            (
                e.status(),
                state.views.render_index(Some(&warning), &job_description),
            )
        }
    };

    match page {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::pipeline::{Artifact, ExtractionView};
    use crate::generation::rating::{FitDisplay, Rating};

    fn report() -> AnalysisReport {
        AnalysisReport {
            run_id: uuid::Uuid::nil(),
            generated_at: chrono::Utc::now(),
            fit: FitDisplay::from(Rating::Score(3)),
            extraction: Some(ExtractionView {
                image_base64: "iVBORw0KGgo=".to_string(),
                resume_text: "{\"name\": \"<script>alert(1)</script>\"}".to_string(),
            }),
            cover_letter: Some(Artifact::Ready {
                text: "Dear Hiring Manager".to_string(),
            }),
            interview_questions: None,
        }
    }

    #[test]
    fn test_index_shows_warning_when_given() {
        let views = Views::new().unwrap();
        let html = views.render_index(Some("Please upload a resume"), "").unwrap();
        assert!(html.contains("Please upload a resume"));
        assert!(html.contains("name=\"job_description\""));

        let html = views.render_index(None, "").unwrap();
        assert!(!html.contains("class=\"warning\""));
    }

    #[test]
    fn test_index_refills_job_description_escaped() {
        let views = Views::new().unwrap();
        let html = views
            .render_index(Some("Please upload a resume"), "Rust engineer <b> & co")
            .unwrap();
        assert!(html.contains(">Rust engineer &lt;b&gt; &amp; co</textarea>"));
    }

    #[test]
    fn test_result_page_escapes_model_output() {
        let views = Views::new().unwrap();
        let html = views.render_result(&report()).unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_result_page_shows_fit_and_artifacts_in_order() {
        let views = Views::new().unwrap();
        let html = views.render_result(&report()).unwrap();

        assert!(html.contains("★★★☆☆☆☆☆☆☆"));
        assert!(html.contains("Below average fit"));
        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("Copy to Clipboard"));
        assert!(!html.contains("Personalized Interview Questions"));

        let fit = html.find("Fit Level").unwrap();
        let extracted = html.find("Extracted JSON Content").unwrap();
        let letter = html.find("Generated Cover Letter").unwrap();
        assert!(fit < extracted && extracted < letter);
    }

    #[test]
    fn test_failed_artifact_renders_its_message() {
        let views = Views::new().unwrap();
        let mut report = report();
        report.interview_questions = Some(Artifact::Failed {
            error: AppError::ModelInvocation("quota exceeded".to_string()).body(),
        });

        let html = views.render_result(&report).unwrap();
        assert!(html.contains("Personalized Interview Questions"));
        assert!(html.contains("quota exceeded"));
    }
}

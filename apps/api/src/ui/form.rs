//! Reads the Process form (shared by the HTML page and `/api/v1/analyze`).
//!
//! Fields: `resume` (file), `job_description` (text) and the checkboxes `extract`,
//! `cover_letter`, `questions`. Browsers omit unchecked boxes and send `on` for checked ones.

use axum::extract::Multipart;

use crate::errors::AppError;
use crate::generation::pipeline::RunRequest;

pub async fn read_run_request(mut multipart: Multipart) -> Result<RunRequest, AppError> {
    let mut request = RunRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let bytes = field.bytes().await.map_err(malformed)?;
                request.resume = (!bytes.is_empty()).then_some(bytes);
            }
            "job_description" => request.job_description = field.text().await.map_err(malformed)?,
            "extract" => request.options.extract = is_checked(&field.text().await.map_err(malformed)?),
            "cover_letter" => {
                request.options.cover_letter = is_checked(&field.text().await.map_err(malformed)?)
            }
            "questions" => request.options.questions = is_checked(&field.text().await.map_err(malformed)?),
            _ => {}
        }
    }

    Ok(request)
}

pub fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed form submission: {e}"))
}

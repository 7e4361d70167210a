// Derived-content generators and the pipeline that gates them.
// Every generator reads a `StoreSnapshot`; none of them mutates shared state.

pub mod cover_letter;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod questions;
pub mod rating;

use crate::errors::AppError;

/// A blank reply is reported as a parse failure naming the artifact.
pub(crate) fn require_text(reply: String, artifact: &str) -> Result<String, AppError> {
    if reply.trim().is_empty() {
        return Err(AppError::ResponseParse(format!(
            "the model returned no text for the {artifact}"
        )));
    }
    Ok(reply)
}

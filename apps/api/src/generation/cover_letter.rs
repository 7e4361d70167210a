//! Cover letter: the only generator that asks for a streamed reply.
//! The stream is drained in full before the letter is returned.

use tracing::debug;

use crate::errors::AppError;
use crate::generation::prompts::{fill_template, JOB_DESCRIPTION, JSON_DATA};
use crate::generation::require_text;
use crate::llm_client::TextModel;
use crate::prompt_loader::{PromptLoader, PromptName};
use crate::store::StoreSnapshot;

pub async fn generate_cover_letter(
    snapshot: &StoreSnapshot,
    prompts: &PromptLoader,
    text: &dyn TextModel,
) -> Result<String, AppError> {
    let template = prompts.load(PromptName::CoverLetter).await?;
    let prompt = fill_template(
        &template,
        &[
            (JOB_DESCRIPTION, snapshot.job_description.as_str()),
            (JSON_DATA, snapshot.resume_text.as_str()),
        ],
    );

    let letter = text.generate_streamed(&prompt).await?;
    debug!("Cover letter generated ({} chars)", letter.len());
    require_text(letter, "cover letter")
}

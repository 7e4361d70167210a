//! Resume Extractor: renders page 1, asks the vision model to transcribe it, and
//! writes the result plus the job description into the run's store.

use tracing::info;

use crate::errors::AppError;
use crate::extraction::render::PageRenderer;
use crate::generation::require_text;
use crate::llm_client::VisionModel;
use crate::prompt_loader::{PromptLoader, PromptName};
use crate::store::IntermediateStore;

/// Output of extraction, kept for immediate display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedResume {
    pub image_png: Vec<u8>,
    /// Raw vision-model output. Nominally JSON, never parsed.
    pub resume_text: String,
}

pub async fn extract_resume(
    pdf: &[u8],
    job_description: &str,
    renderer: &dyn PageRenderer,
    vision: &dyn VisionModel,
    prompts: &PromptLoader,
    store: &mut IntermediateStore,
) -> Result<ExtractedResume, AppError> {
    let image_png = renderer.render_first_page(pdf).await?;

    let prompt = prompts.load(PromptName::ResumeParsing).await?;
    let reply = vision.generate_with_image(&prompt, &image_png).await?;
    let resume_text = require_text(reply, "resume extraction")?;

    store.write_resume_text(resume_text.clone());
    store.write_job_description(job_description.to_string());
    info!(
        "Resume extracted: {} byte image, {} chars of text",
        image_png.len(),
        resume_text.len()
    );

    Ok(ExtractedResume {
        image_png,
        resume_text,
    })
}

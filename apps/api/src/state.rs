use std::sync::Arc;

use crate::config::Config;
use crate::extraction::render::PageRenderer;
use crate::llm_client::{TextModel, VisionModel};
use crate::prompt_loader::PromptLoader;
use crate::ui::Views;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds only immutable collaborators. Per-run data lives in an `IntermediateStore`
/// created by the pipeline, never here.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub prompts: PromptLoader,
    /// Default: `PdftoppmRenderer`.
    pub renderer: Arc<dyn PageRenderer>,
    pub vision: Arc<dyn VisionModel>,
    pub text: Arc<dyn TextModel>,
    pub views: Arc<Views>,
}

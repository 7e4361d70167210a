//! Fakes for the external collaborators, shared by the unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::render::{ensure_pdf_header, PageRenderer};
use crate::llm_client::{LlmError, TextModel, VisionModel};
use crate::prompt_loader::PromptLoader;
use crate::state::AppState;
use crate::ui::Views;

/// "Renders" by returning the PDF bytes after the header, so each input yields a distinct image.
#[derive(Default)]
pub struct FakeRenderer {
    calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render_first_page(&self, pdf: &[u8]) -> Result<Vec<u8>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ensure_pdf_header(pdf)?;
        let body = &pdf[b"%PDF-".len()..];
        if body.is_empty() || body == b"/Count 0" {
            return Err(AppError::DocumentFormat("document has no pages".to_string()));
        }
        Ok(body.to_vec())
    }
}

/// Replies with a small JSON document naming whatever the fake image contained.
#[derive(Default)]
pub struct FakeVision {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeVision {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for FakeVision {
    async fn generate_with_image(&self, prompt: &str, image_png: &[u8]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LlmError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            });
        }
        Ok(format!(
            "{{\"prompt\": \"{}\", \"name\": \"{}\"}}",
            prompt.trim(),
            String::from_utf8_lossy(image_png)
        ))
    }
}

type Responder = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

pub struct FakeText {
    responder: Box<Responder>,
    calls: AtomicUsize,
    streamed_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeText {
    pub fn new(responder: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            streamed_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers "7" to rating prompts and echoes every other prompt back.
    pub fn scripted() -> Self {
        Self::new(|prompt| {
            if prompt.starts_with("RATE") {
                Ok("7".to_string())
            } else {
                Ok(prompt.to_string())
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn streamed_calls(&self) -> usize {
        self.streamed_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}

#[async_trait]
impl TextModel for FakeText {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.respond(prompt)
    }

    async fn generate_streamed(&self, prompt: &str) -> Result<String, LlmError> {
        self.streamed_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(prompt)
    }
}

/// Writes terse templates whose first word identifies them in fake replies.
pub fn write_test_prompts(dir: &Path) {
    let templates = [
        ("resume_parsing_prompt.txt", "EXTRACT"),
        ("ratings_prompt.txt", "RATE|{job_description}|{resume_data}"),
        ("interview_questions_prompt.txt", "EMPLOYER:"),
        ("interview_questions_employee.txt", "EMPLOYEE:"),
        ("job_questions_prompt.txt", "JOBQ|{job_description}|{resume_description}"),
        ("cover_letter_prompt.txt", "COVER|{job_description}|{json_data}"),
    ];
    for (file, body) in templates {
        std::fs::write(dir.join(file), body).unwrap();
    }
}

pub fn test_config(prompts_dir: &Path) -> Config {
    Config {
        google_api_key: "test-key".to_string(),
        gemini_api_url: "http://127.0.0.1:9".to_string(),
        vision_model: "vision-test".to_string(),
        text_model: "text-test".to_string(),
        prompts_dir: prompts_dir.to_path_buf(),
        pdftoppm_bin: "pdftoppm".to_string(),
        render_dpi: 72,
        model_timeout_secs: 5,
        max_upload_bytes: 1024 * 1024,
        scratch_dir: None,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub struct Harness {
    pub state: AppState,
    pub renderer: Arc<FakeRenderer>,
    pub vision: Arc<FakeVision>,
    pub text: Arc<FakeText>,
    pub prompts_dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_models(FakeVision::default(), FakeText::scripted())
    }

    pub fn with_models(vision: FakeVision, text: FakeText) -> Self {
        let prompts_dir = tempfile::tempdir().unwrap();
        write_test_prompts(prompts_dir.path());

        let renderer = Arc::new(FakeRenderer::default());
        let vision = Arc::new(vision);
        let text = Arc::new(text);
        let state = AppState {
            config: test_config(prompts_dir.path()),
            prompts: PromptLoader::new(prompts_dir.path()),
            renderer: renderer.clone(),
            vision: vision.clone(),
            text: text.clone(),
            views: Arc::new(Views::new().unwrap()),
        };

        Self {
            state,
            renderer,
            vision,
            text,
            prompts_dir,
        }
    }

    pub fn model_calls(&self) -> usize {
        self.vision.calls() + self.text.calls()
    }
}

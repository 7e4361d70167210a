//! Prompt templates live as plain text files under the prompts directory.
//! They are re-read on every call; placeholder replacement is left to callers.

use std::path::{Path, PathBuf};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptName {
    ResumeParsing,
    Rating,
    EmployerQuestions,
    EmployeeQuestions,
    JobQuestions,
    CoverLetter,
}

impl PromptName {
    pub const ALL: [PromptName; 6] = [
        PromptName::ResumeParsing,
        PromptName::Rating,
        PromptName::EmployerQuestions,
        PromptName::EmployeeQuestions,
        PromptName::JobQuestions,
        PromptName::CoverLetter,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            PromptName::ResumeParsing => "resume_parsing_prompt.txt",
            PromptName::Rating => "ratings_prompt.txt",
            PromptName::EmployerQuestions => "interview_questions_prompt.txt",
            PromptName::EmployeeQuestions => "interview_questions_employee.txt",
            PromptName::JobQuestions => "job_questions_prompt.txt",
            PromptName::CoverLetter => "cover_letter_prompt.txt",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptLoader {
    dir: PathBuf,
}

impl PromptLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn load(&self, name: PromptName) -> Result<String, AppError> {
        load_prompt(&self.dir.join(name.file_name())).await
    }
}

/// Returns the full text of the template at `path`.
pub async fn load_prompt(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::FileAccess(format!(
            "failed to read prompt template {}: {e}",
            path.display()
        ))
    })
}

//! Interview question generators.
//!
//! Employer and employee variants append the stored resume text to a static prompt
//! prefix. The job-specific variant substitutes both the job description and the resume.

use crate::errors::AppError;
use crate::generation::prompts::{fill_template, JOB_DESCRIPTION, RESUME_DESCRIPTION};
use crate::generation::require_text;
use crate::llm_client::TextModel;
use crate::prompt_loader::{PromptLoader, PromptName};
use crate::store::StoreSnapshot;

/// Who the questions are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Questions a hiring manager should ask the candidate.
    Employer,
    /// Questions the candidate should prepare for.
    Employee,
}

impl Audience {
    fn prompt(self) -> PromptName {
        match self {
            Audience::Employer => PromptName::EmployerQuestions,
            Audience::Employee => PromptName::EmployeeQuestions,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Audience::Employer => "employer interview questions",
            Audience::Employee => "employee interview questions",
        }
    }
}

pub async fn generate_interview_questions(
    audience: Audience,
    snapshot: &StoreSnapshot,
    prompts: &PromptLoader,
    text: &dyn TextModel,
) -> Result<String, AppError> {
    let prefix = prompts.load(audience.prompt()).await?;
    let prompt = format!("{prefix}{}", snapshot.resume_text);
    let reply = text.generate(&prompt).await?;
    require_text(reply, audience.label())
}

pub async fn generate_employer_questions(
    snapshot: &StoreSnapshot,
    prompts: &PromptLoader,
    text: &dyn TextModel,
) -> Result<String, AppError> {
    generate_interview_questions(Audience::Employer, snapshot, prompts, text).await
}

pub async fn generate_employee_questions(
    snapshot: &StoreSnapshot,
    prompts: &PromptLoader,
    text: &dyn TextModel,
) -> Result<String, AppError> {
    generate_interview_questions(Audience::Employee, snapshot, prompts, text).await
}

/// Questions probing the candidate against this specific job description.
pub async fn generate_job_questions(
    snapshot: &StoreSnapshot,
    prompts: &PromptLoader,
    text: &dyn TextModel,
) -> Result<String, AppError> {
    let template = prompts.load(PromptName::JobQuestions).await?;
    let prompt = fill_template(
        &template,
        &[
            (JOB_DESCRIPTION, snapshot.job_description.as_str()),
            (RESUME_DESCRIPTION, snapshot.resume_text.as_str()),
        ],
    );
    let reply = text.generate(&prompt).await?;
    require_text(reply, "job interview questions")
}

//! Intermediate Store: the two values handed from extraction to the generators.
//!
//! One store per run, passed by reference through the pipeline, so concurrent runs
//! never see each other's data. `persist` / `load` mirror a store to a scratch
//! directory for inspection: the resume text as a JSON string literal in
//! `temp.json`, the job description as-is in `temp_job_desc.txt`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const RESUME_SCRATCH_FILE: &str = "temp.json";
pub const JOB_DESCRIPTION_SCRATCH_FILE: &str = "temp_job_desc.txt";

#[derive(Debug, Clone, Default)]
pub struct IntermediateStore {
    resume_text: Option<String>,
    job_description: Option<String>,
}

/// Read-only view of a fully populated store. Every generator works from one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub resume_text: String,
    pub job_description: String,
}

impl IntermediateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any previously stored resume text.
    pub fn write_resume_text(&mut self, text: String) {
        self.resume_text = Some(text);
    }

    /// Overwrites any previously stored job description.
    pub fn write_job_description(&mut self, text: String) {
        self.job_description = Some(text);
    }

    #[cfg(test)]
    pub fn resume_text(&self) -> Option<&str> {
        self.resume_text.as_deref()
    }

    /// Fails unless both values have been written.
    pub fn snapshot(&self) -> Result<StoreSnapshot, AppError> {
        let resume_text = self.resume_text.clone().ok_or_else(|| {
            AppError::MissingPrerequisite("No extracted resume text is stored".to_string())
        })?;
        let job_description = self.job_description.clone().ok_or_else(|| {
            AppError::MissingPrerequisite("No job description is stored".to_string())
        })?;
        Ok(StoreSnapshot {
            resume_text,
            job_description,
        })
    }

    pub async fn persist(&self, dir: &Path) -> Result<(), AppError> {
        let snapshot = self.snapshot()?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| file_access("create", dir, e))?;

        let wrapped = serde_json::to_string(&snapshot.resume_text)
            .map_err(|e| AppError::Internal(e.into()))?;
        let resume_path = dir.join(RESUME_SCRATCH_FILE);
        tokio::fs::write(&resume_path, wrapped)
            .await
            .map_err(|e| file_access("write", &resume_path, e))?;

        let jd_path = dir.join(JOB_DESCRIPTION_SCRATCH_FILE);
        tokio::fs::write(&jd_path, snapshot.job_description.as_bytes())
            .await
            .map_err(|e| file_access("write", &jd_path, e))?;

        Ok(())
    }

    /// Inverse of `persist`, for inspecting a mirrored run.
    #[cfg(test)]
    pub async fn load(dir: &Path) -> Result<Self, AppError> {
        let resume_path = dir.join(RESUME_SCRATCH_FILE);
        let wrapped = tokio::fs::read_to_string(&resume_path)
            .await
            .map_err(|e| file_access("read", &resume_path, e))?;
        let resume_text: String = serde_json::from_str(&wrapped).map_err(|e| {
            AppError::FileAccess(format!(
                "{} does not hold a JSON string: {e}",
                resume_path.display()
            ))
        })?;

        let jd_path = dir.join(JOB_DESCRIPTION_SCRATCH_FILE);
        let job_description = tokio::fs::read_to_string(&jd_path)
            .await
            .map_err(|e| file_access("read", &jd_path, e))?;

        Ok(Self {
            resume_text: Some(resume_text),
            job_description: Some(job_description),
        })
    }
}

fn file_access(action: &str, path: &Path, e: std::io::Error) -> AppError {
    AppError::FileAccess(format!("failed to {action} {}: {e}", path.display()))
}

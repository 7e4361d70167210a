//! Page rendering: turns page 1 of a PDF into a PNG.
//!
//! Default backend shells out to `pdftoppm` (poppler-utils). `AppState` holds an
//! `Arc<dyn PageRenderer>` so tests can swap in a fake.

use std::path::PathBuf;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";
/// pdftoppm's complaint when asked for page 1 of a document without pages.
const EMPTY_PAGE_RANGE: &str = "Wrong page range";

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders page index 0 of `pdf` and returns PNG bytes.
    async fn render_first_page(&self, pdf: &[u8]) -> Result<Vec<u8>, AppError>;
}

/// Rejects input that does not start with the PDF header (leading whitespace tolerated).
pub fn ensure_pdf_header(pdf: &[u8]) -> Result<(), AppError> {
    let start = pdf
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(pdf.len());
    if pdf[start..].starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(AppError::DocumentFormat(
            "file does not start with a %PDF- header".to_string(),
        ))
    }
}

pub struct PdftoppmRenderer {
    binary: PathBuf,
    dpi: u32,
}

impl PdftoppmRenderer {
    pub fn new(binary: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            binary: binary.into(),
            dpi,
        }
    }
}

#[async_trait]
impl PageRenderer for PdftoppmRenderer {
    async fn render_first_page(&self, pdf: &[u8]) -> Result<Vec<u8>, AppError> {
        ensure_pdf_header(pdf)?;

        let work_dir = tempfile::tempdir()
            .map_err(|e| AppError::FileAccess(format!("failed to create render directory: {e}")))?;
        let input = work_dir.path().join("resume.pdf");
        let output_prefix = work_dir.path().join("page");
        tokio::fs::write(&input, pdf)
            .await
            .map_err(|e| AppError::FileAccess(format!("failed to stage PDF for rendering: {e}")))?;

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-f")
            .arg("1")
            .arg("-l")
            .arg("1")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-singlefile")
            .arg(&input)
            .arg(&output_prefix)
            .output()
            .await
            .map_err(|e| {
                AppError::Internal(anyhow!(
                    "failed to run {} (install poppler-utils): {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains(EMPTY_PAGE_RANGE) {
                return Err(AppError::DocumentFormat("document has no pages".to_string()));
            }
            return Err(AppError::DocumentFormat(format!(
                "renderer rejected the document: {}",
                stderr.trim()
            )));
        }

        let png_path = output_prefix.with_extension("png");
        let png = match tokio::fs::read(&png_path).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ => {
                return Err(AppError::DocumentFormat(
                    "document has no pages".to_string(),
                ))
            }
        };

        debug!("Rendered page 1 at {} dpi ({} bytes)", self.dpi, png.len());
        Ok(png)
    }
}

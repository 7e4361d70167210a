use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VISION_MODEL: &str = "gemini-pro-vision";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-pro-latest";

/// Application configuration loaded from environment variables.
/// Startup fails if `GOOGLE_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_api_url: String,
    pub vision_model: String,
    pub text_model: String,
    pub prompts_dir: PathBuf,
    pub pdftoppm_bin: String,
    /// 72 matches the document's native resolution.
    pub render_dpi: u32,
    pub model_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// When set, every run mirrors its intermediate store into `<dir>/<run_id>/`.
    pub scratch_dir: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_api_url: env_or("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            vision_model: env_or("VISION_MODEL", DEFAULT_VISION_MODEL),
            text_model: env_or("TEXT_MODEL", DEFAULT_TEXT_MODEL),
            prompts_dir: PathBuf::from(env_or("PROMPTS_DIR", "prompts")),
            pdftoppm_bin: env_or("PDFTOPPM_BIN", "pdftoppm"),
            render_dpi: parse_env("RENDER_DPI", 72)?,
            model_timeout_secs: parse_env("MODEL_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            scratch_dir: std::env::var("SCRATCH_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

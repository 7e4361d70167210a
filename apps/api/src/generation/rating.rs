//! Fit rating: one text-model call that scores the resume against the job on 0–10.
//!
//! A reply that is not an integer in range degrades to `Rating::NoResponse` instead of
//! failing the run. Model failures are still errors.

use serde::{Serialize, Serializer};
use tracing::warn;

use crate::errors::AppError;
use crate::generation::prompts::{fill_template, JOB_DESCRIPTION, RESUME_DATA};
use crate::llm_client::TextModel;
use crate::prompt_loader::{PromptLoader, PromptName};
use crate::store::StoreSnapshot;

pub const MAX_RATING: u8 = 10;
pub const NO_RESPONSE: &str = "No response";
const FILLED_STAR: char = '★';
const EMPTY_STAR: char = '☆';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Score(u8),
    NoResponse,
}

/// Serializes as the bare integer, or the string "No response".
impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(n) => serializer.serialize_u8(*n),
            Rating::NoResponse => serializer.serialize_str(NO_RESPONSE),
        }
    }
}

impl Rating {
    pub fn parse(reply: &str) -> Self {
        reply
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|n| *n <= MAX_RATING)
            .map(Rating::Score)
            .unwrap_or(Rating::NoResponse)
    }

    pub fn score(self) -> Option<u8> {
        match self {
            Rating::Score(n) => Some(n),
            Rating::NoResponse => None,
        }
    }

    pub fn stars(self) -> Option<String> {
        self.score().map(star_rating)
    }

    pub fn fit_level(self) -> &'static str {
        self.score().map(fit_level).unwrap_or(NO_RESPONSE)
    }
}

/// `rating` filled stars followed by `10 - rating` empty ones. Values above 10 are clamped.
pub fn star_rating(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    let mut stars = String::with_capacity(MAX_RATING as usize * FILLED_STAR.len_utf8());
    stars.extend(std::iter::repeat(FILLED_STAR).take(filled));
    stars.extend(std::iter::repeat(EMPTY_STAR).take(MAX_RATING as usize - filled));
    stars
}

/// Band boundaries belong to the lower band.
pub fn fit_level(rating: u8) -> &'static str {
    match rating {
        0..=2 => "Not a great fit",
        3..=4 => "Below average fit",
        5..=6 => "Average fit",
        7..=8 => "Good fit",
        _ => "Best fit",
    }
}

/// What the UI shows for a rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDisplay {
    pub rating: Rating,
    pub stars: Option<String>,
    pub fit_level: &'static str,
}

impl From<Rating> for FitDisplay {
    fn from(rating: Rating) -> Self {
        Self {
            rating,
            stars: rating.stars(),
            fit_level: rating.fit_level(),
        }
    }
}

pub async fn generate_rating(
    snapshot: &StoreSnapshot,
    prompts: &PromptLoader,
    text: &dyn TextModel,
) -> Result<Rating, AppError> {
    let template = prompts.load(PromptName::Rating).await?;
    let prompt = fill_template(
        &template,
        &[
            (JOB_DESCRIPTION, snapshot.job_description.as_str()),
            (RESUME_DATA, snapshot.resume_text.as_str()),
        ],
    );

    let reply = text.generate(&prompt).await?;
    let rating = Rating::parse(&reply);
    if rating == Rating::NoResponse {
        warn!("Rating reply is not an integer in 0..=10: {:?}", reply.trim());
    }
    Ok(rating)
}

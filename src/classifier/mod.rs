use std::sync::Arc;

use tracing::{debug, warn};

use crate::inference::{GenerationParams, ModelConnector, ModelError, TextModel};
use crate::prompts;

/// Rating used whenever the model answer cannot be trusted.
pub const NEUTRAL_STARS: u8 = 3;

// Classification call: near-deterministic, a single digit expected.
const CLASSIFY_PARAMS: GenerationParams = GenerationParams::new(0.3, 10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
    Error,
}

impl Sentiment {
    pub fn from_stars(stars: u8) -> Self {
        match stars {
            s if s >= 4 => Sentiment::Positive,
            s if s <= 2 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn display_label(&self) -> &'static str {
        let labels = &prompts::catalog().labels;
        match self {
            Sentiment::Positive => labels.positive.as_str(),
            Sentiment::Neutral => labels.neutral.as_str(),
            Sentiment::Negative => labels.negative.as_str(),
            Sentiment::Error => labels.error.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: Sentiment,
    pub stars: u8,
}

impl Classification {
    pub fn from_stars(stars: u8) -> Self {
        Self {
            label: Sentiment::from_stars(stars),
            stars,
        }
    }

    fn unconfigured() -> Self {
        Self {
            label: Sentiment::Error,
            stars: NEUTRAL_STARS,
        }
    }

    fn neutral() -> Self {
        Self::from_stars(NEUTRAL_STARS)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("model not configured")]
    NotConfigured,
    #[error("failed to render classification prompt: {0}")]
    Prompt(#[from] minijinja::Error),
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),
    #[error("model answered `{0}` instead of a rating")]
    Unparseable(String),
}

/// Out-of-range ratings collapse to neutral instead of the nearest bound.
pub fn clamp_stars(raw: i64) -> u8 {
    match raw {
        1..=5 => raw as u8,
        _ => NEUTRAL_STARS,
    }
}

pub fn parse_rating(answer: &str) -> Result<u8, ClassifyError> {
    let trimmed = answer.trim();
    trimmed
        .parse::<i64>()
        .map(clamp_stars)
        .map_err(|_| ClassifyError::Unparseable(trimmed.to_string()))
}

pub struct SentimentClassifier {
    model: Option<Arc<dyn TextModel>>,
}

impl SentimentClassifier {
    pub fn new(connector: &ModelConnector) -> Self {
        Self {
            model: connector.model(),
        }
    }

    pub async fn try_classify(&self, review: &str) -> Result<Classification, ClassifyError> {
        let model = self.model.as_ref().ok_or(ClassifyError::NotConfigured)?;
        let prompt = prompts::catalog().classification_prompt(review)?;
        let answer = model.generate(&prompt, CLASSIFY_PARAMS).await?;
        let stars = parse_rating(&answer)?;
        debug!(stars, "review classified");
        Ok(Classification::from_stars(stars))
    }

    /// Never fails: unconfigured gives `(Error, 3)`, anything else that
    /// goes wrong gives `(Neutral, 3)`.
    pub async fn classify(&self, review: &str) -> Classification {
        match self.try_classify(review).await {
            Ok(classification) => classification,
            Err(ClassifyError::NotConfigured) => Classification::unconfigured(),
            Err(err) => {
                warn!("sentiment analysis failed: {err}");
                Classification::neutral()
            }
        }
    }
}

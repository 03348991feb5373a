use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::inference::{GenerationParams, ModelConnector, ModelError, TextModel};
use crate::prompts::{self, ToneProfile};

/// Replies shorter than this are treated as degenerate.
pub const MIN_REPLY_CHARS: usize = 15;

const TERMINAL_PUNCTUATION: [char; 3] = ['.', '!', '?'];

// Free-text call: some variety, room for two or three sentences.
const REPLY_PARAMS: GenerationParams = GenerationParams::new(0.7, 200);

static ECHO_PREFIX: Lazy<Regex> = Lazy::new(|| {
    let alternatives = prompts::catalog()
        .echo_prefixes
        .iter()
        .map(|prefix| regex::escape(prefix))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)^\s*(?:(?:{alternatives})\s*)+")).expect("invalid echo prefix pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneTier {
    Grateful,
    Cordial,
    Apologetic,
}

impl ToneTier {
    pub fn from_stars(stars: u8) -> Self {
        match stars {
            s if s >= 4 => ToneTier::Grateful,
            s if s <= 2 => ToneTier::Apologetic,
            _ => ToneTier::Cordial,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            ToneTier::Grateful => "grateful",
            ToneTier::Cordial => "cordial",
            ToneTier::Apologetic => "apologetic",
        }
    }

    pub fn profile(&self) -> &'static ToneProfile {
        prompts::catalog()
            .tone(self.key())
            .expect("prompt catalog lacks a tone profile")
    }

    pub fn fallback(&self) -> &'static str {
        &self.profile().fallback
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("model not configured")]
    NotConfigured,
    #[error("failed to render reply prompt: {0}")]
    Prompt(#[from] minijinja::Error),
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),
}

/// Clean up a raw completion. Degenerate output (empty, too short, or
/// echoing the customer's review) is replaced by the tier fallback.
pub fn polish_reply(raw: &str, review: &str, tier: ToneTier) -> String {
    let mut reply = ECHO_PREFIX.replace(raw, "").trim().to_string();

    if let Some(last) = reply.chars().last() {
        if !TERMINAL_PUNCTUATION.contains(&last) {
            reply.push('.');
        }
    }

    let review = review.trim();
    let echoes_review = review.chars().count() >= MIN_REPLY_CHARS && reply.contains(review);

    if reply.chars().count() < MIN_REPLY_CHARS || echoes_review {
        debug!(?tier, echoes_review, "reply replaced by fallback");
        return tier.fallback().to_string();
    }
    reply
}

pub struct ReplyGenerator {
    model: Option<Arc<dyn TextModel>>,
}

impl ReplyGenerator {
    pub fn new(connector: &ModelConnector) -> Self {
        Self {
            model: connector.model(),
        }
    }

    pub async fn try_generate(&self, review: &str, stars: u8) -> Result<String, ReplyError> {
        let model = self.model.as_ref().ok_or(ReplyError::NotConfigured)?;
        let tier = ToneTier::from_stars(stars);
        let prompt = prompts::catalog().reply_prompt(review, stars, tier.profile())?;
        let raw = model.generate(&prompt, REPLY_PARAMS).await?;
        Ok(polish_reply(&raw, review, tier))
    }

    /// Never fails: unconfigured gives the setup notice, errors give the
    /// generic reply.
    pub async fn generate(&self, review: &str, stars: u8) -> String {
        let messages = &prompts::catalog().messages;
        match self.try_generate(review, stars).await {
            Ok(reply) => reply,
            Err(ReplyError::NotConfigured) => messages.model_not_configured.clone(),
            Err(err) => {
                warn!("reply generation failed: {err}");
                messages.generic_reply.clone()
            }
        }
    }
}

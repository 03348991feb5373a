use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

// NOTE:
// Replies are produced for a single locale (pt-BR). The catalog keeps
// every customer-facing string in one file so wording changes never
// touch the pipeline code.

const CLASSIFICATION_TEMPLATE: &str = "classification";
const REPLY_TEMPLATE: &str = "reply";

#[derive(Deserialize)]
struct PromptFile {
    classification: String,
    reply: String,
    tones: HashMap<String, ToneProfile>,
    echo_prefixes: Vec<String>,
    labels: SentimentLabels,
    messages: Messages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToneProfile {
    pub tone: String,
    pub context: String,
    pub fallback: String,
}

#[derive(Debug, Deserialize)]
pub struct SentimentLabels {
    pub positive: String,
    pub neutral: String,
    pub negative: String,
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct Messages {
    pub stars_suffix: String,
    pub empty_review: String,
    pub api_not_configured: String,
    pub model_not_configured: String,
    pub generic_reply: String,
    pub unexpected_error: String,
}

pub struct PromptCatalog {
    env: Environment<'static>,
    tones: HashMap<String, ToneProfile>,
    pub echo_prefixes: Vec<String>,
    pub labels: SentimentLabels,
    pub messages: Messages,
}

macro_rules! prompt_file {
    ($lang:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/lang/",
            $lang,
            "/review_prompts.json"
        ))
    };
}

static PT_PROMPTS: Lazy<PromptCatalog> = Lazy::new(|| load_catalog(prompt_file!("pt")));

fn load_catalog(raw: &str) -> PromptCatalog {
    let parsed: PromptFile = serde_json::from_str(raw).expect("invalid prompt catalog");

    let mut env = Environment::new();
    env.add_template_owned(CLASSIFICATION_TEMPLATE, parsed.classification)
        .expect("invalid classification template");
    env.add_template_owned(REPLY_TEMPLATE, parsed.reply)
        .expect("invalid reply template");

    PromptCatalog {
        env,
        tones: parsed.tones,
        echo_prefixes: parsed.echo_prefixes,
        labels: parsed.labels,
        messages: parsed.messages,
    }
}

/// The compiled-in pt-BR catalog.
pub fn catalog() -> &'static PromptCatalog {
    &PT_PROMPTS
}

impl PromptCatalog {
    pub fn classification_prompt(&self, review: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template(CLASSIFICATION_TEMPLATE)?
            .render(context! { review })
    }

    pub fn reply_prompt(
        &self,
        review: &str,
        stars: u8,
        tone: &ToneProfile,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template(REPLY_TEMPLATE)?.render(context! {
            review,
            stars,
            tone => tone.tone.as_str(),
            context => tone.context.as_str(),
        })
    }

    /// Tone profile by key (`grateful`, `cordial`, `apologetic`).
    pub fn tone(&self, key: &str) -> Option<&ToneProfile> {
        self.tones.get(key)
    }
}

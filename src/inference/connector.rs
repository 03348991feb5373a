use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use super::{GeminiClient, GenerationParams, ModelError, TextModel};
use crate::config::{non_blank, ModelSettings, CREDENTIAL_VAR};

const LIVENESS_PROMPT: &str = "Hello";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("GOOGLE_API_KEY is not set")]
    MissingCredential,
    #[error("failed to build HTTP client: {0}")]
    Transport(String),
    #[error("no model candidate answered ({} tried)", .tried.len())]
    NoWorkingModel { tried: Vec<String> },
}

/// Result of the startup probe. Built once, then shared read-only.
pub struct ModelConnector {
    model: Option<Arc<dyn TextModel>>,
    failure: Option<ConnectError>,
}

impl ModelConnector {
    pub fn configured(model: Arc<dyn TextModel>) -> Self {
        Self {
            model: Some(model),
            failure: None,
        }
    }

    pub fn unconfigured(reason: ConnectError) -> Self {
        Self {
            model: None,
            failure: Some(reason),
        }
    }

    /// Resolve the credential through `lookup` and probe the configured
    /// Gemini candidates. Never fails: problems leave the connector
    /// unconfigured.
    pub async fn initialize(
        lookup: impl Fn(&str) -> Option<String>,
        settings: &ModelSettings,
    ) -> Self {
        let Some(api_key) = non_blank(lookup(CREDENTIAL_VAR)) else {
            warn!("⚠ {CREDENTIAL_VAR} not found; replies are disabled");
            warn!("  local use: export {CREDENTIAL_VAR}='<your key>' or add it to .env");
            warn!("  get a key at https://makersuite.google.com/app/apikey");
            return Self::unconfigured(ConnectError::MissingCredential);
        };

        let http = match Client::builder().build() {
            Ok(http) => http,
            Err(err) => {
                warn!("✗ failed to configure API transport: {err}");
                return Self::unconfigured(ConnectError::Transport(err.to_string()));
            }
        };

        Self::probe(&settings.candidates, |model| {
            Ok(Arc::new(GeminiClient::new(
                http.clone(),
                &settings.api_base,
                &api_key,
                model,
            )) as Arc<dyn TextModel>)
        })
        .await
    }

    /// Try each candidate in order: build a handle, send the liveness
    /// prompt, keep the first one that answers.
    pub async fn probe<F>(candidates: &[String], mut build: F) -> Self
    where
        F: FnMut(&str) -> Result<Arc<dyn TextModel>, ModelError>,
    {
        let mut tried = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            tried.push(candidate.clone());

            let model = match build(candidate) {
                Ok(model) => model,
                Err(err) => {
                    warn!(model = %candidate, "✗ could not create client: {err}");
                    continue;
                }
            };

            match model
                .generate(LIVENESS_PROMPT, GenerationParams::provider_default())
                .await
            {
                Ok(_) => {
                    info!(model = %candidate, "✓ model configured");
                    return Self::configured(model);
                }
                Err(err) => {
                    warn!(model = %candidate, "✗ liveness check failed: {err}");
                }
            }
        }

        warn!("✗ no model candidate worked");
        Self::unconfigured(ConnectError::NoWorkingModel { tried })
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub fn active_model_id(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model_id())
    }

    pub fn model(&self) -> Option<Arc<dyn TextModel>> {
        self.model.clone()
    }

    pub fn failure(&self) -> Option<&ConnectError> {
        self.failure.as_ref()
    }
}

use std::{env, net::SocketAddr};

use anyhow::{Context, Result};

pub const CREDENTIAL_VAR: &str = "GOOGLE_API_KEY";

const DEFAULT_REVIEWS_CSV: &str = "reviews_traduzidos.csv";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:7860";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Tried in order; the first one answering the liveness prompt wins.
pub const DEFAULT_MODEL_CANDIDATES: &[&str] =
    &["gemini-2.0-flash-lite", "gemini-1.5-flash", "gemini-pro"];

#[derive(Debug, Clone)]
pub struct Settings {
    pub reviews_csv: String,
    pub bind_addr: SocketAddr,
    pub model: ModelSettings,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_base: String,
    pub candidates: Vec<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            candidates: DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let reviews_csv = non_blank(lookup("REVIEWS_CSV"))
            .unwrap_or_else(|| DEFAULT_REVIEWS_CSV.to_string());

        let bind_raw =
            non_blank(lookup("BIND_ADDR")).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .with_context(|| format!("invalid BIND_ADDR `{bind_raw}`"))?;

        let mut model = ModelSettings::default();
        if let Some(base) = non_blank(lookup("GEMINI_API_BASE")) {
            model.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(list) = non_blank(lookup("GEMINI_MODELS")) {
            let candidates: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if !candidates.is_empty() {
                model.candidates = candidates;
            }
        }

        Ok(Self {
            reviews_csv,
            bind_addr,
            model,
        })
    }
}

/// Blank or whitespace-only values count as unset. The result is trimmed.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.reviews_csv, "reviews_traduzidos.csv");
        assert_eq!(settings.bind_addr.port(), 7860);
        assert_eq!(settings.model.candidates[0], "gemini-2.0-flash-lite");
        assert_eq!(settings.model.candidates.len(), 3);
    }

    #[test]
    fn model_list_override_is_trimmed() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("GEMINI_MODELS", " gemini-x , ,gemini-y "),
            ("GEMINI_API_BASE", "http://localhost:9999/v1/"),
        ]))
        .unwrap();
        assert_eq!(settings.model.candidates, vec!["gemini-x", "gemini-y"]);
        assert_eq!(settings.model.api_base, "http://localhost:9999/v1");
    }

    #[test]
    fn malformed_bind_addr_is_rejected() {
        assert!(Settings::from_lookup(lookup_from(&[("BIND_ADDR", "nowhere")])).is_err());
    }

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" key ".into())), Some("key".into()));
        assert_eq!(non_blank(None), None);
    }
}

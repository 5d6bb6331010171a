use anyhow::{Context, Result};
use extract::{OllamaClient, OpenAiClient, OracleBackend, OracleClient, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tally::LabelPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub retry: RetryConfig,
    pub strict_labels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub backend: OracleBackend,
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            oracle: OracleConfig {
                backend: OracleBackend::OpenAi,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o".to_string(),
                api_key: None,
                temperature: 0.0,
                request_timeout_secs: 120,
            },
            retry: RetryConfig {
                max_retries: 3,
                initial_backoff_ms: 1000,
                max_backoff_ms: 10000,
            },
            strict_labels: false,
        }
    }
}

impl AppConfig {
    /// Local Ollama server, no credentials
    pub fn ollama() -> Self {
        let mut config = Self::default();
        config.oracle.backend = OracleBackend::Ollama;
        config.oracle.base_url = "http://localhost:11434".to_string();
        config.oracle.model = "llama3".to_string();
        config
    }

    pub fn for_backend(backend: OracleBackend) -> Self {
        match backend {
            OracleBackend::OpenAi => Self::default(),
            OracleBackend::Ollama => Self::ollama(),
        }
    }

    /// Backend preset, then `BIAS_AUDIT_*` / `OPENAI_API_KEY` overrides.
    /// `backend` wins over `BIAS_AUDIT_BACKEND` when set.
    pub fn from_env(backend: Option<OracleBackend>) -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), backend)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        backend: Option<OracleBackend>,
    ) -> Result<Self> {
        let backend = match (backend, lookup("BIAS_AUDIT_BACKEND")) {
            (Some(backend), _) => backend,
            (None, Some(value)) => value
                .parse::<OracleBackend>()
                .map_err(anyhow::Error::msg)
                .context("Invalid BIAS_AUDIT_BACKEND")?,
            (None, None) => OracleBackend::OpenAi,
        };

        let mut config = Self::for_backend(backend);

        if let Some(base_url) = lookup("BIAS_AUDIT_BASE_URL") {
            config.oracle.base_url = base_url;
        }
        if let Some(model) = lookup("BIAS_AUDIT_MODEL") {
            config.oracle.model = model;
        }
        if let Some(secs) = lookup("BIAS_AUDIT_TIMEOUT_SECS") {
            config.oracle.request_timeout_secs =
                secs.parse().context("Invalid BIAS_AUDIT_TIMEOUT_SECS")?;
        }
        if let Some(retries) = lookup("BIAS_AUDIT_MAX_RETRIES") {
            config.retry.max_retries = retries.parse().context("Invalid BIAS_AUDIT_MAX_RETRIES")?;
        }
        config.oracle.api_key = lookup("OPENAI_API_KEY");

        Ok(config)
    }

    pub fn label_policy(&self) -> LabelPolicy {
        if self.strict_labels {
            LabelPolicy::CoerceUnknown
        } else {
            LabelPolicy::Lenient
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            self.retry.initial_backoff_ms,
            self.retry.max_backoff_ms,
        )
    }

    /// Fails before any record is read if the backend cannot be built
    pub fn build_oracle(&self) -> Result<OracleClient> {
        let oracle = &self.oracle;
        let timeout = Duration::from_secs(oracle.request_timeout_secs);

        let client = match oracle.backend {
            OracleBackend::OpenAi => OracleClient::OpenAi(OpenAiClient::new(
                oracle.base_url.clone(),
                oracle.model.clone(),
                oracle.api_key.clone(),
                oracle.temperature,
                timeout,
            )?),
            OracleBackend::Ollama => OracleClient::Ollama(OllamaClient::new(
                oracle.base_url.clone(),
                oracle.model.clone(),
                oracle.temperature,
                timeout,
            )?),
        };

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_deterministic_openai() {
        let config = AppConfig::from_lookup(lookup(&[]), None).unwrap();

        assert_eq!(config.oracle.backend, OracleBackend::OpenAi);
        assert_eq!(config.oracle.model, "gpt-4o");
        assert_eq!(config.oracle.temperature, 0.0);
        assert_eq!(config.label_policy(), LabelPolicy::Lenient);
    }

    #[test]
    fn test_openai_without_key_fails_at_startup() {
        let config = AppConfig::from_lookup(lookup(&[]), None).unwrap();
        assert!(config.build_oracle().is_err());

        let config = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")]), None).unwrap();
        assert_eq!(config.build_oracle().unwrap().backend(), OracleBackend::OpenAi);
    }

    #[test]
    fn test_ollama_backend_from_env() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BIAS_AUDIT_BACKEND", "ollama"),
            ("BIAS_AUDIT_MODEL", "mistral"),
            ("BIAS_AUDIT_MAX_RETRIES", "0"),
        ]), None)
        .unwrap();

        assert_eq!(config.oracle.base_url, "http://localhost:11434");
        assert_eq!(config.oracle.model, "mistral");
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.build_oracle().unwrap().backend(), OracleBackend::Ollama);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[("BIAS_AUDIT_BACKEND", "bard")]), None).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("BIAS_AUDIT_TIMEOUT_SECS", "soon")]), None).is_err());
    }

    #[test]
    fn test_backend_override_keeps_env_settings() {
        let vars = [
            ("BIAS_AUDIT_BACKEND", "openai"),
            ("BIAS_AUDIT_MAX_RETRIES", "0"),
            ("BIAS_AUDIT_TIMEOUT_SECS", "5"),
            ("BIAS_AUDIT_MODEL", "mistral"),
        ];
        let config = AppConfig::from_lookup(lookup(&vars), Some(OracleBackend::Ollama)).unwrap();

        assert_eq!(config.oracle.backend, OracleBackend::Ollama);
        assert_eq!(config.oracle.base_url, "http://localhost:11434");
        assert_eq!(config.oracle.model, "mistral");
        assert_eq!(config.oracle.request_timeout_secs, 5);
        assert_eq!(config.retry.max_retries, 0);
    }
}

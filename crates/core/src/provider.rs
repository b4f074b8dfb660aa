use std::time::Duration;

use crate::error::{KesitError, Result};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "KESIT_MODEL";
pub const API_BASE_ENV: &str = "KESIT_API_BASE";
pub const REQUEST_TIMEOUT_ENV: &str = "KESIT_REQUEST_TIMEOUT_SECS";

/// Model with search grounding support.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for the external analysis service.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_ENV).ok_or_else(|| KesitError::CredentialMissing {
            env_var: API_KEY_ENV.to_string(),
        })?;

        let mut config = Self::new(api_key.trim());
        if let Some(model) = get(MODEL_ENV) {
            config.model = model;
        }
        if let Some(api_base) = get(API_BASE_ENV) {
            config.api_base = api_base;
        }
        if let Some(secs) = get(REQUEST_TIMEOUT_ENV).and_then(|s| s.trim().parse().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

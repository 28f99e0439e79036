//! Configuration loading from the process environment.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context as _;
use thiserror::Error;

use surgeplan_ai::ServicePolicy;
use surgeplan_planner::{PlannerConfig, RoundingPolicy};

pub const ENV_CAP: &str = "SURGEPLAN_CAP";
pub const ENV_AI_EVENTS: &str = "SURGEPLAN_AI_EVENTS";
pub const ENV_AI_BRIEFING: &str = "SURGEPLAN_AI_BRIEFING";
pub const ENV_AI_MIN_CONF: &str = "SURGEPLAN_AI_MIN_CONF";
pub const ENV_MODEL: &str = "SURGEPLAN_MODEL";
pub const ENV_ROUNDING: &str = "SURGEPLAN_ROUNDING";
pub const ENV_LLM_TIMEOUT_MS: &str = "SURGEPLAN_LLM_TIMEOUT_MS";
pub const ENV_LLM_RETRIES: &str = "SURGEPLAN_LLM_RETRIES";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Where the OpenAI-compatible backend lives.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// `None` means "no backend": the planner runs on deterministic fallbacks.
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

impl core::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Planner and backend settings for one process.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub planner: PlannerConfig,
    pub backend: BackendSettings,
}

/// Read settings through `lookup` (an environment-like key -> value function).
///
/// Missing or blank keys keep their defaults.
pub fn load_from<F>(lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut planner = PlannerConfig::default();
    if let Some(v) = get(ENV_CAP) {
        planner.cap = parse(ENV_CAP, &v)?;
    }
    if let Some(v) = get(ENV_AI_EVENTS) {
        planner.ai_events = parse_bool(ENV_AI_EVENTS, &v)?;
    }
    if let Some(v) = get(ENV_AI_BRIEFING) {
        planner.ai_briefing = parse_bool(ENV_AI_BRIEFING, &v)?;
    }
    if let Some(v) = get(ENV_AI_MIN_CONF) {
        planner.ai_min_conf = parse(ENV_AI_MIN_CONF, &v)?;
    }
    if let Some(v) = get(ENV_MODEL) {
        planner.model_ref = v;
    }
    if let Some(v) = get(ENV_ROUNDING) {
        planner.rounding =
            RoundingPolicy::from_str(&v).map_err(|e| ConfigError::invalid(ENV_ROUNDING, e))?;
    }

    let mut service = ServicePolicy::default();
    if let Some(v) = get(ENV_LLM_TIMEOUT_MS) {
        service.timeout = Duration::from_millis(parse(ENV_LLM_TIMEOUT_MS, &v)?);
    }
    if let Some(v) = get(ENV_LLM_RETRIES) {
        service.max_retries = parse(ENV_LLM_RETRIES, &v)?;
    }
    planner.service = service;

    planner
        .validate()
        .map_err(|e| ConfigError::invalid("planner", e.to_string()))?;

    let backend = BackendSettings {
        api_key: get(ENV_OPENAI_API_KEY),
        base_url: get(ENV_OPENAI_BASE_URL)
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
    };

    Ok(Settings { planner, backend })
}

/// Read settings from the process environment.
pub fn from_env() -> anyhow::Result<Settings> {
    load_from(|key| std::env::var(key).ok())
        .context("loading surge planner configuration from environment")
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: core::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::invalid(key, format!("'{raw}': {e}")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, format!("'{raw}' is not a boolean"))),
    }
}

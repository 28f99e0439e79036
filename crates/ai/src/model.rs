use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AiError;

/// Shape the caller expects back from the model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    Json,
}

/// One generation request against a configured backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Which configured backend/model to use (e.g. "gpt-4o-mini").
    pub model_ref: String,
    pub system: Option<String>,
    pub prompt: String,
    pub format: ResponseFormat,
    /// Upper bound for this single call; backends should honour it.
    pub timeout: Duration,
}

impl GenerateRequest {
    pub fn new(model_ref: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_ref: model_ref.into(),
            system: None,
            prompt: prompt.into(),
            format: ResponseFormat::Text,
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The language-model capability: `generate(request) -> text`.
///
/// The only non-deterministic dependency of the planner. Implementations must
/// not hold shared locks across the await point; the planner runs many
/// requests concurrently against one instance.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError>;
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Arc<T> {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        (**self).generate(request).await
    }
}

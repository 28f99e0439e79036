//! Deterministic backends for tests, local runs and "no AI configured" mode.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::{GenerateRequest, LanguageModel};
use crate::result::AiError;

/// Backend used when no model is configured: every call is `Unavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineModel;

#[async_trait]
impl LanguageModel for OfflineModel {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, AiError> {
        Err(AiError::Unavailable(
            "no language-model backend configured".to_string(),
        ))
    }
}

/// Replays a fixed script of responses and records every request.
///
/// Once the script runs out, calls fail as `Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, AiError>>>,
    calls: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModel {
    pub fn new(script: impl IntoIterator<Item = Result<String, AiError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new([Ok(text.into())])
    }

    /// Requests seen so far, in call order.
    pub fn calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Unavailable("script exhausted".to_string())))
    }
}

/// Answers through a closure, e.g. to route on `request.format`.
pub struct FnModel<F> {
    respond: F,
}

impl<F> FnModel<F>
where
    F: Fn(&GenerateRequest) -> Result<String, AiError> + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self { respond }
    }
}

#[async_trait]
impl<F> LanguageModel for FnModel<F>
where
    F: Fn(&GenerateRequest) -> Result<String, AiError> + Send + Sync,
{
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        (self.respond)(request)
    }
}

/// Always fails with the same error.
#[derive(Debug, Clone)]
pub struct FailingModel {
    error: AiError,
}

impl FailingModel {
    pub fn new(error: AiError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, AiError> {
        Err(self.error.clone())
    }
}

/// Responds after a fixed delay (exercises timeouts).
#[derive(Debug, Clone)]
pub struct SlowModel {
    delay: Duration,
    text: String,
}

impl SlowModel {
    pub fn new(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for SlowModel {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, AiError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.text.clone())
    }
}

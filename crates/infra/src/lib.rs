//! Infrastructure layer: configuration and external language-model backends.

pub mod config;
pub mod openai;
pub mod service;

use std::sync::Arc;

use tracing::{info, warn};

use surgeplan_ai::{LanguageModel, ModelRegistry, OfflineModel};

pub use config::{BackendSettings, ConfigError, Settings, from_env, load_from};
pub use openai::OpenAiChatModel;
pub use service::{InMemoryPlanSink, NoopPlanSink, PlanSink, SurgePlanner};

/// Backend for the configured settings.
///
/// With an API key every `model_ref` is sent to the OpenAI-compatible
/// endpoint. Without one the planner runs offline on its deterministic
/// fallbacks.
pub fn build_model(settings: &BackendSettings) -> Arc<dyn LanguageModel> {
    match &settings.api_key {
        Some(key) => {
            info!(base_url = %settings.base_url, "using OpenAI-compatible backend");
            let backend: Arc<dyn LanguageModel> =
                Arc::new(OpenAiChatModel::new(settings.base_url.clone(), key.clone()));
            Arc::new(ModelRegistry::new().with_default(backend))
        }
        None => {
            warn!(
                "no language-model API key configured; event detection and briefings use fallbacks"
            );
            Arc::new(OfflineModel)
        }
    }
}

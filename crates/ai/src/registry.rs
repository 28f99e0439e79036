use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{GenerateRequest, LanguageModel};
use crate::result::AiError;

/// Routes a request's `model_ref` to the backend registered for it.
///
/// Lookup is exact; unmatched refs go to the default backend if one is set,
/// otherwise the call fails with [`AiError::UnknownModel`].
#[derive(Clone, Default)]
pub struct ModelRegistry {
    backends: BTreeMap<String, Arc<dyn LanguageModel>>,
    default: Option<Arc<dyn LanguageModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        model_ref: impl Into<String>,
        backend: Arc<dyn LanguageModel>,
    ) -> Self {
        self.backends.insert(model_ref.into(), backend);
        self
    }

    pub fn with_default(mut self, backend: Arc<dyn LanguageModel>) -> Self {
        self.default = Some(backend);
        self
    }

    pub fn resolve(&self, model_ref: &str) -> Option<&Arc<dyn LanguageModel>> {
        self.backends.get(model_ref).or(self.default.as_ref())
    }

    pub fn model_refs(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }
}

impl core::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

#[async_trait]
impl LanguageModel for ModelRegistry {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        match self.resolve(&request.model_ref) {
            Some(backend) => backend.generate(request).await,
            None => Err(AiError::UnknownModel(request.model_ref.clone())),
        }
    }
}

//! Process-level planning service: configured backend, config and an outcome sink.

use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tracing::{info, warn};

use surgeplan_ai::LanguageModel;
use surgeplan_core::{DomainError, DomainResult, PlanRequest};
use surgeplan_planner::{PlanOutcome, PlannerConfig, plan_surge};

use crate::build_model;
use crate::config::Settings;

/// Receives finished plans, e.g. for the persistence layer.
///
/// Plans are handed over after the pipeline finished; a sink never
/// influences the outcome.
pub trait PlanSink: Send + Sync + 'static {
    fn emit(&self, outcome: &PlanOutcome);
}

/// Discards every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPlanSink;

impl PlanSink for NoopPlanSink {
    fn emit(&self, _outcome: &PlanOutcome) {}
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPlanSink {
    inner: Mutex<Vec<PlanOutcome>>,
}

impl InMemoryPlanSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<PlanOutcome> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PlanSink for InMemoryPlanSink {
    fn emit(&self, outcome: &PlanOutcome) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(outcome.clone());
    }
}

/// Shared, cheaply clonable entry point for planning requests.
///
/// Holds no per-request state; concurrent requests share only the backend
/// and the immutable config.
#[derive(Clone)]
pub struct SurgePlanner {
    model: Arc<dyn LanguageModel>,
    config: Arc<PlannerConfig>,
    sink: Arc<dyn PlanSink>,
}

impl SurgePlanner {
    pub fn new(model: Arc<dyn LanguageModel>, config: PlannerConfig) -> Self {
        Self {
            model,
            config: Arc::new(config),
            sink: Arc::new(NoopPlanSink),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(build_model(&settings.backend), settings.planner.clone())
    }

    pub fn with_sink(mut self, sink: Arc<dyn PlanSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan one request and hand the outcome to the sink.
    pub async fn plan(&self, request: &PlanRequest) -> DomainResult<PlanOutcome> {
        let outcome = plan_surge(self.model.as_ref(), request, &self.config).await?;
        self.sink.emit(&outcome);
        Ok(outcome)
    }

    /// Plan independent requests in parallel; results keep input order.
    pub async fn plan_all(&self, requests: Vec<PlanRequest>) -> Vec<DomainResult<PlanOutcome>> {
        let total = requests.len();
        let mut set = JoinSet::new();
        for (idx, request) in requests.into_iter().enumerate() {
            let planner = self.clone();
            set.spawn(async move { (idx, planner.plan(&request).await) });
        }

        let mut results: Vec<Option<DomainResult<PlanOutcome>>> =
            (0..total).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, result)) => results[idx] = Some(result),
                Err(e) => warn!(error = %e, "planning task did not complete"),
            }
        }

        info!(requests = total, "batch planning finished");
        results
            .into_iter()
            .map(|r| {
                r.unwrap_or_else(|| Err(DomainError::invariant("planning task did not complete")))
            })
            .collect()
    }
}

impl core::fmt::Debug for SurgePlanner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurgePlanner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

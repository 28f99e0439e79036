//! Planner settings.

use surgeplan_ai::{DetectionSettings, ServicePolicy};
use surgeplan_core::{DomainError, DomainResult, validate_cap};

use crate::apply::RoundingPolicy;

pub const DEFAULT_CAP: f64 = 2.0;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_MODEL_REF: &str = "gpt-4o-mini";

/// Everything that shapes one planning run besides the request itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Multipliers are clamped into `[1/cap, cap]`.
    pub cap: f64,
    /// Ask the language model for local events.
    pub ai_events: bool,
    /// Events below this confidence are audited but never applied.
    pub ai_min_conf: f64,
    pub model_ref: String,
    /// Ask the language model for the briefing; otherwise use the template.
    pub ai_briefing: bool,
    pub rounding: RoundingPolicy,
    pub service: ServicePolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cap: DEFAULT_CAP,
            ai_events: true,
            ai_min_conf: DEFAULT_MIN_CONFIDENCE,
            model_ref: DEFAULT_MODEL_REF.to_string(),
            ai_briefing: true,
            rounding: RoundingPolicy::default(),
            service: ServicePolicy::default(),
        }
    }
}

impl PlannerConfig {
    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_ai_events(mut self, enabled: bool) -> Self {
        self.ai_events = enabled;
        self
    }

    pub fn with_min_confidence(mut self, min: f64) -> Self {
        self.ai_min_conf = min;
        self
    }

    pub fn with_model_ref(mut self, model_ref: impl Into<String>) -> Self {
        self.model_ref = model_ref.into();
        self
    }

    pub fn with_ai_briefing(mut self, enabled: bool) -> Self {
        self.ai_briefing = enabled;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_service(mut self, service: ServicePolicy) -> Self {
        self.service = service;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_cap(self.cap)?;
        if !(0.0..=1.0).contains(&self.ai_min_conf) {
            return Err(DomainError::validation(format!(
                "minimum event confidence must be within [0, 1] (got {})",
                self.ai_min_conf
            )));
        }
        if self.model_ref.trim().is_empty() {
            return Err(DomainError::validation("model reference must not be empty"));
        }
        if self.service.timeout.is_zero() {
            return Err(DomainError::validation("language-model timeout must be positive"));
        }
        Ok(())
    }

    pub fn detection_settings(&self) -> DetectionSettings {
        DetectionSettings {
            enabled: self.ai_events,
            min_confidence: self.ai_min_conf,
            model_ref: self.model_ref.clone(),
        }
    }
}

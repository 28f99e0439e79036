//! Detected local events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// A discrete, named local occurrence reported by the event detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEvent {
    /// Short event name (e.g. "heatwave", "marathon").
    pub kind: String,
    /// Confidence in \[0, 1\].
    pub confidence: f64,
    /// Demand multiplier contribution per inventory category.
    pub effects: BTreeMap<String, f64>,
    /// Free-text justification from the detector.
    pub evidence: String,
}

impl DetectedEvent {
    pub fn new(kind: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind: kind.into(),
            confidence,
            effects: BTreeMap::new(),
            evidence: String::new(),
        }
    }

    pub fn with_effect(mut self, category: impl Into<String>, factor: f64) -> Self {
        self.effects.insert(category.into(), factor);
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    /// Whether the event clears the planning threshold (`confidence >= min_confidence`).
    pub fn is_accepted(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence
    }

    /// Effect for a category, matching names case-insensitively after trimming.
    pub fn effect_for(&self, category: &str) -> Option<f64> {
        let wanted = category.trim();
        self.effects
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, factor)| *factor)
    }
}

impl ValueObject for DetectedEvent {}

//! Narrative briefing.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// How a briefing was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BriefingSource {
    Model { model_ref: String },
    Fallback { reason: String },
}

/// Human-readable operational summary of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    pub text: String,
    pub source: BriefingSource,
}

impl Briefing {
    pub fn from_model(text: impl Into<String>, model_ref: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: BriefingSource::Model {
                model_ref: model_ref.into(),
            },
        }
    }

    pub fn fallback(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: BriefingSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, BriefingSource::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.source {
            BriefingSource::Fallback { reason } => Some(reason),
            BriefingSource::Model { .. } => None,
        }
    }
}

impl core::fmt::Display for Briefing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}

impl ValueObject for Briefing {}

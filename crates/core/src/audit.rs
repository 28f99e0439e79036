//! Audit trail and degradation markers attached to a plan.

use serde::{Deserialize, Serialize};

use crate::event::DetectedEvent;

/// One retained record of what the planner saw while building a plan.
///
/// Filtered events are kept here even though they never influence a multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditBlock {
    /// Event at or above the confidence threshold; its effects were applied.
    EventAccepted { event: DetectedEvent },
    /// Event below the confidence threshold; recorded only.
    EventFiltered {
        event: DetectedEvent,
        min_confidence: f64,
    },
    /// The detection service failed; planning continued without events.
    EventDetectionUnavailable { reason: String },
    /// No feature or event information was derivable for a category.
    PartialData { category: String, note: String },
}

impl AuditBlock {
    pub fn accepted_event(&self) -> Option<&DetectedEvent> {
        match self {
            AuditBlock::EventAccepted { event } => Some(event),
            _ => None,
        }
    }

    pub fn filtered_event(&self) -> Option<&DetectedEvent> {
        match self {
            AuditBlock::EventFiltered { event, .. } => Some(event),
            _ => None,
        }
    }
}

/// Marker that some stage ran in reduced-accuracy mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Degradation {
    /// Event detection was enabled but the service was unusable.
    EventDetectionUnavailable { reason: String },
    /// The briefing was templated without the language model.
    NarrativeFallback { reason: String },
    /// The inventory context could not be parsed; features are minimal.
    InventoryContextUnparsed,
}

impl core::fmt::Display for Degradation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Degradation::EventDetectionUnavailable { reason } => {
                write!(f, "event detection unavailable: {reason}")
            }
            Degradation::NarrativeFallback { reason } => {
                write!(f, "narrative fallback used: {reason}")
            }
            Degradation::InventoryContextUnparsed => f.write_str("inventory context unparsed"),
        }
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use surgeplan_core::{AuditBlock, DetectedEvent, Location};

use crate::model::{GenerateRequest, LanguageModel, ResponseFormat};
use crate::parse::parse_events;
use crate::policy::{ServicePolicy, call_model};
use crate::prompts;

/// Event detection switches, taken from the planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub enabled: bool,
    /// Events below this confidence are audited but never applied.
    pub min_confidence: f64,
    pub model_ref: String,
}

/// Detector output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDetection {
    /// Events with `confidence >= min_confidence`, in model order.
    pub accepted: Vec<DetectedEvent>,
    /// Every detected event (accepted or filtered), or the unavailability marker.
    pub audit_blocks: Vec<AuditBlock>,
    /// Set when detection was enabled but the service could not be used.
    pub unavailable: Option<String>,
}

impl EventDetection {
    fn unavailable(reason: String) -> Self {
        Self {
            accepted: Vec::new(),
            audit_blocks: vec![AuditBlock::EventDetectionUnavailable {
                reason: reason.clone(),
            }],
            unavailable: Some(reason),
        }
    }
}

/// Ask the language model for local events and split them by confidence.
///
/// Disabled detection makes no call and returns an empty result. Service
/// failures and unparsable replies degrade to "no events" plus an
/// [`AuditBlock::EventDetectionUnavailable`] marker; they never fail planning.
pub async fn detect_events(
    model: &dyn LanguageModel,
    location: &Location,
    categories: &[String],
    as_of: NaiveDate,
    settings: &DetectionSettings,
    policy: &ServicePolicy,
) -> EventDetection {
    if !settings.enabled {
        return EventDetection::default();
    }

    let request = GenerateRequest::new(
        settings.model_ref.clone(),
        prompts::event_detection(location.as_str(), as_of, categories),
    )
    .with_system(prompts::EVENT_SYSTEM)
    .with_format(ResponseFormat::Json)
    .with_timeout(policy.timeout);

    let reply = match call_model(model, &request, policy).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(
                location = %location,
                model_ref = %settings.model_ref,
                error = %e,
                "event detection unavailable"
            );
            return EventDetection::unavailable(e.to_string());
        }
    };

    let events = match parse_events(&reply) {
        Ok(events) => events,
        Err(e) => {
            warn!(
                location = %location,
                model_ref = %settings.model_ref,
                error = %e,
                "event detection reply unusable"
            );
            return EventDetection::unavailable(e.to_string());
        }
    };

    let mut detection = EventDetection::default();
    for event in events {
        if event.is_accepted(settings.min_confidence) {
            detection.audit_blocks.push(AuditBlock::EventAccepted {
                event: event.clone(),
            });
            detection.accepted.push(event);
        } else {
            detection.audit_blocks.push(AuditBlock::EventFiltered {
                event,
                min_confidence: settings.min_confidence,
            });
        }
    }

    info!(
        location = %location,
        accepted = detection.accepted.len(),
        filtered = detection.audit_blocks.len() - detection.accepted.len(),
        min_confidence = settings.min_confidence,
        "event detection completed"
    );
    detection
}

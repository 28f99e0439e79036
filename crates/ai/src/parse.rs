//! Defensive parsing of model output into detected events.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tracing::debug;

use surgeplan_core::DetectedEvent;

use crate::result::AiError;

/// Pull the JSON payload out of a model reply.
///
/// Tolerates markdown code fences and prose around a single object or array.
pub fn extract_json(text: &str) -> Option<JsonValue> {
    let trimmed = strip_fences(text.trim());
    if let Ok(v) = serde_json::from_str::<JsonValue>(trimmed) {
        return Some(v);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(v) = serde_json::from_str::<JsonValue>(&trimmed[start..=end]) {
                    return Some(v);
                }
            }
        }
    }
    None
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a detection reply into events.
///
/// Accepts `{"events": [...]}` or a bare array. Individual malformed events are
/// dropped; an unusable reply as a whole is [`AiError::InvalidOutput`].
pub fn parse_events(text: &str) -> Result<Vec<DetectedEvent>, AiError> {
    let value = extract_json(text)
        .ok_or_else(|| AiError::InvalidOutput("reply contains no JSON".to_string()))?;

    let items = match value {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("events") {
            Some(JsonValue::Array(items)) => items,
            Some(JsonValue::Null) | None => Vec::new(),
            Some(_) => {
                return Err(AiError::InvalidOutput(
                    "\"events\" is not an array".to_string(),
                ));
            }
        },
        _ => {
            return Err(AiError::InvalidOutput(
                "reply is neither an object nor an array".to_string(),
            ));
        }
    };

    Ok(items.iter().filter_map(parse_event).collect())
}

fn parse_event(value: &JsonValue) -> Option<DetectedEvent> {
    let obj = value.as_object()?;

    let kind = ["kind", "name", "event"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(JsonValue::as_str))
        .map(str::trim)
        .filter(|k| !k.is_empty());
    let Some(kind) = kind else {
        debug!("dropping event without a kind");
        return None;
    };

    let confidence = obj.get("confidence").and_then(number).and_then(normalize_confidence);
    let Some(confidence) = confidence else {
        debug!(kind, "dropping event without a usable confidence");
        return None;
    };

    let effects: BTreeMap<String, f64> = obj
        .get("effects")
        .and_then(JsonValue::as_object)
        .map(|effects| {
            effects
                .iter()
                .filter_map(|(category, factor)| {
                    let factor = number(factor)?;
                    let category = category.trim();
                    (factor.is_finite() && factor > 0.0 && !category.is_empty())
                        .then(|| (category.to_string(), factor))
                })
                .collect()
        })
        .unwrap_or_default();

    let evidence = obj
        .get("evidence")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Some(DetectedEvent {
        kind: kind.to_string(),
        confidence,
        effects,
        evidence,
    })
}

/// Numbers, or numeric strings (models sometimes quote them).
fn number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Values in (1, 100] are percentages; everything is clamped into [0, 1].
fn normalize_confidence(raw: f64) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }
    let scaled = if raw > 1.0 && raw <= 100.0 { raw / 100.0 } else { raw };
    Some(scaled.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_reply() {
        let reply = "```json\n{\"events\":[{\"kind\":\"heatwave\",\"confidence\":0.8,\"effects\":{\"IV fluids\":1.5},\"evidence\":\"NWS excessive heat watch\"}]}\n```";
        let events = parse_events(reply).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "heatwave");
        assert_eq!(events[0].confidence, 0.8);
        assert_eq!(events[0].effect_for("IV fluids"), Some(1.5));
        assert_eq!(events[0].evidence, "NWS excessive heat watch");
    }

    #[test]
    fn parses_object_wrapped_in_prose() {
        let reply = "Sure! Here you go: {\"events\": []} Let me know.";
        assert!(parse_events(reply).unwrap().is_empty());
    }

    #[test]
    fn parses_bare_array() {
        let reply = r#"[{"name":"marathon","confidence":"0.7","effects":{"bandages":1.2}}]"#;
        let events = parse_events(reply).unwrap();
        assert_eq!(events[0].kind, "marathon");
        assert_eq!(events[0].confidence, 0.7);
    }

    #[test]
    fn drops_malformed_events_and_effects() {
        let reply = r#"{"events":[
            {"confidence":0.9},
            {"kind":"storm","confidence":"high"},
            {"kind":"flu","confidence":0.9,"effects":{"masks":-1,"gloves":0,"gowns":1.1,"  ":2}}
        ]}"#;
        let events = parse_events(reply).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "flu");
        assert_eq!(events[0].effects.len(), 1);
        assert_eq!(events[0].effect_for("gowns"), Some(1.1));
    }

    #[test]
    fn percent_and_out_of_range_confidence() {
        let reply = r#"{"events":[
            {"kind":"a","confidence":85},
            {"kind":"b","confidence":-0.2},
            {"kind":"c","confidence":250}
        ]}"#;
        let events = parse_events(reply).unwrap();
        assert_eq!(events[0].confidence, 0.85);
        assert_eq!(events[1].confidence, 0.0);
        assert_eq!(events[2].confidence, 1.0);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_events("I could not find any events."),
            Err(AiError::InvalidOutput(_))
        ));
        assert!(matches!(
            parse_events(r#"{"events": "none"}"#),
            Err(AiError::InvalidOutput(_))
        ));
    }
}

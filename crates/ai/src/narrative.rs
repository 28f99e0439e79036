//! Briefing generation: language model first, deterministic template second.

use std::fmt::Write as _;

use tracing::{info, warn};

use surgeplan_core::features::vocabulary;
use surgeplan_core::{
    AuditBlock, Briefing, Driver, DriverKind, FeatureSet, MultiplierPlan, TranslatedLine,
    TranslatedPlan,
};

use crate::model::{GenerateRequest, LanguageModel};
use crate::policy::{ServicePolicy, call_model};
use crate::prompts;

/// Render the plan as prose.
///
/// The model receives the deterministic summary as its facts. Empty replies,
/// failures and timeouts fall back to that summary. Model prose that omits a
/// changed category or an applied event gets an appendix naming it.
pub async fn make_human_nlg(
    model: &dyn LanguageModel,
    plan: &MultiplierPlan,
    features: &FeatureSet,
    audit_blocks: &[AuditBlock],
    translated: &TranslatedPlan,
    model_ref: &str,
    policy: &ServicePolicy,
) -> Briefing {
    let facts = fallback_briefing(plan, features, audit_blocks, translated);

    let request = GenerateRequest::new(model_ref, prompts::briefing(&facts))
        .with_system(prompts::BRIEFING_SYSTEM)
        .with_timeout(policy.timeout);

    let reason = match call_model(model, &request, policy).await {
        Ok(reply) if !reply.trim().is_empty() => {
            let text = with_missing_facts(reply.trim(), translated, audit_blocks);
            info!(model_ref, chars = text.len(), "briefing generated by language model");
            return Briefing::from_model(text, model_ref);
        }
        Ok(_) => "language model returned an empty briefing".to_string(),
        Err(e) => e.to_string(),
    };

    warn!(model_ref, reason = %reason, "using deterministic briefing");
    Briefing::fallback(facts, reason)
}

/// Deterministic briefing built only from structured plan data.
///
/// Every category with a non-zero delta appears, largest change first, with
/// baseline, recommended quantity and its primary driver. Unchanged categories
/// are listed as "no change".
pub fn fallback_briefing(
    plan: &MultiplierPlan,
    features: &FeatureSet,
    audit_blocks: &[AuditBlock],
    translated: &TranslatedPlan,
) -> String {
    let mut out = String::from("Surge plan briefing.\n");

    if translated.is_empty() {
        out.push_str("\nNo baseline quantities were supplied; there is nothing to adjust.\n");
    }

    let changes = translated.changes_by_magnitude();
    if !changes.is_empty() {
        out.push_str("\nChanges (largest first):\n");
        for (category, line) in &changes {
            let _ = write!(out, "- {}", change_line(category, line));
            match plan.entry(category) {
                Some(entry) => {
                    let driver = describe_driver(entry.primary_driver(), audit_blocks);
                    let _ = write!(out, "; driven by {driver}");
                    if entry.was_clamped() {
                        let _ = write!(out, " (capped at x{:.2})", plan.cap());
                    }
                }
                None => out.push_str("; driven by no recorded signal"),
            }
            out.push_str(".\n");
        }
    }

    let unchanged = translated.unchanged();
    if !unchanged.is_empty() {
        out.push_str("\nNo change:\n");
        for (category, line) in unchanged {
            let _ = writeln!(
                out,
                "- {category}: {} -> {}, no change.",
                line.baseline, line.recommended_quantity
            );
        }
    }

    let accepted: Vec<_> = audit_blocks.iter().filter_map(AuditBlock::accepted_event).collect();
    if !accepted.is_empty() {
        out.push_str("\nApplied events:\n");
        for event in accepted {
            let _ = write!(out, "- {} (confidence {:.2})", event.kind, event.confidence);
            if !event.evidence.is_empty() {
                let _ = write!(out, ": {}", event.evidence);
            }
            out.push('\n');
        }
    }

    let filtered: Vec<_> = audit_blocks
        .iter()
        .filter_map(|b| match b {
            AuditBlock::EventFiltered { event, min_confidence } => Some((event, *min_confidence)),
            _ => None,
        })
        .collect();
    if !filtered.is_empty() {
        out.push_str("\nEvents below the confidence threshold (not applied):\n");
        for (event, threshold) in filtered {
            let _ = writeln!(
                out,
                "- {} (confidence {:.2}, threshold {:.2})",
                event.kind, event.confidence, threshold
            );
        }
    }

    for block in audit_blocks {
        if let AuditBlock::EventDetectionUnavailable { reason } = block {
            let _ = writeln!(
                out,
                "\nEvent detection was unavailable ({reason}); \
                 only seasonal and capacity signals were used."
            );
        }
    }

    let notable = notable_features(features);
    if !notable.is_empty() {
        let _ = writeln!(out, "\nConditions considered: {}.", notable.join(", "));
    }

    out.trim_end().to_string()
}

fn change_line(category: &str, line: &TranslatedLine) -> String {
    format!(
        "{category}: {} -> {} ({:+}, x{:.2})",
        line.baseline, line.recommended_quantity, line.delta, line.multiplier
    )
}

fn describe_driver(driver: Option<&Driver>, audit_blocks: &[AuditBlock]) -> String {
    let Some(driver) = driver else {
        return "no recorded signal".to_string();
    };
    match driver.kind {
        DriverKind::Event => {
            let confidence = audit_blocks
                .iter()
                .filter_map(AuditBlock::accepted_event)
                .find(|e| e.kind == driver.name)
                .map(|e| e.confidence);
            match confidence {
                Some(c) => format!("event \"{}\" (confidence {c:.2})", driver.name),
                None => format!("event \"{}\"", driver.name),
            }
        }
        DriverKind::Feature => {
            format!("{} (x{:.2})", vocabulary::label(&driver.name), driver.factor)
        }
    }
}

fn notable_features(features: &FeatureSet) -> Vec<String> {
    features
        .iter()
        .filter(|(key, value)| *key != vocabulary::INVENTORY_CATEGORIES && *value != 0.0)
        .map(|(key, value)| {
            if key == vocabulary::CAPACITY_OCCUPANCY {
                format!("{} {:.0}%", vocabulary::label(key), value * 100.0)
            } else if value == 1.0 {
                vocabulary::label(key).to_string()
            } else {
                format!("{} {value:.2}", vocabulary::label(key))
            }
        })
        .collect()
}

/// Append every changed category and applied event the prose failed to name.
fn with_missing_facts(
    text: &str,
    translated: &TranslatedPlan,
    audit_blocks: &[AuditBlock],
) -> String {
    let lower = text.to_lowercase();
    let named = named_categories(&lower, translated.categories());

    let missing_changes: Vec<_> = translated
        .changes_by_magnitude()
        .into_iter()
        .filter(|(category, _)| !named.contains(category))
        .collect();
    let missing_events: Vec<_> = audit_blocks
        .iter()
        .filter_map(AuditBlock::accepted_event)
        .filter(|event| find_word(&lower, &event.kind.trim().to_lowercase(), 0).is_none())
        .collect();

    if missing_changes.is_empty() && missing_events.is_empty() {
        return text.to_string();
    }

    let mut out = text.to_string();
    if !missing_changes.is_empty() {
        out.push_str("\n\nQuantity changes not covered above:\n");
        for (category, line) in missing_changes {
            let _ = writeln!(out, "- {}", change_line(category, line));
        }
    }
    if !missing_events.is_empty() {
        out.push_str("\n\nApplied events not covered above:\n");
        for event in missing_events {
            let _ = writeln!(out, "- {} (confidence {:.2})", event.kind, event.confidence);
        }
    }
    out.trim_end().to_string()
}

/// Categories named in `lower` as whole words.
///
/// Longer names claim their span first, so `masks` is not counted as named
/// by a mention of `N95 masks`.
fn named_categories<'a>(lower: &str, categories: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut by_length: Vec<(&'a str, String)> =
        categories.map(|c| (c, c.trim().to_lowercase())).collect();
    by_length.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut named = Vec::new();
    for (category, needle) in by_length {
        let mut found = false;
        let mut from = 0;
        while let Some(span) = find_word(lower, &needle, from) {
            from = span.1;
            if claimed.iter().any(|c| c.0 < span.1 && span.0 < c.1) {
                continue;
            }
            claimed.push(span);
            found = true;
        }
        if found {
            named.push(category);
        }
    }
    named
}

/// First occurrence of `needle` at or after byte `from`, bounded by
/// non-alphanumeric characters on both sides, as a byte span.
fn find_word(haystack: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    haystack[from..]
        .match_indices(needle)
        .map(|(start, m)| (from + start, from + start + m.len()))
        .find(|&(start, end)| {
            let before = haystack[..start].chars().next_back();
            let after = haystack[end..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
}

//! End-to-end planning scenarios against scripted language models.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use surgeplan_ai::{
    AiError, FailingModel, FnModel, GenerateRequest, ResponseFormat, ScriptedModel, ServicePolicy,
    SlowModel,
};
use surgeplan_core::{AuditBlock, BriefingSource, Degradation, PlanRequest};
use surgeplan_planner::{PlannerConfig, RoundingPolicy, plan_surge};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// JSON requests get `events`; text requests get `prose` (or the given error).
fn routed(
    events: &'static str,
    prose: Result<&'static str, AiError>,
) -> FnModel<impl Fn(&GenerateRequest) -> Result<String, AiError> + Send + Sync> {
    FnModel::new(move |req: &GenerateRequest| match req.format {
        ResponseFormat::Json => Ok(events.to_string()),
        ResponseFormat::Text => prose.clone().map(str::to_string),
    })
}

#[tokio::test(start_paused = true)]
async fn quiet_summer_without_events_changes_nothing() {
    let model = ScriptedModel::default();
    let request = PlanRequest::new("Phoenix, AZ")
        .with_baseline("N95 masks", 100.0)
        .with_as_of(date(2024, 7, 10));
    let config = PlannerConfig::default().with_ai_events(false);

    let outcome = plan_surge(&model, &request, &config).await.unwrap();

    let line = outcome.translated.get("N95 masks").unwrap();
    assert_eq!(line.multiplier, 1.0);
    assert_eq!(line.recommended_quantity, 100);
    assert_eq!(line.delta, 0);
    assert!(outcome.audit_blocks.is_empty());

    // Only the briefing call was made, and the exhausted script forced the fallback.
    assert!(model.calls().iter().all(|c| c.format == ResponseFormat::Text));
    assert!(outcome.briefing.is_fallback());
    assert!(outcome.briefing.text.contains("N95 masks: 100 -> 100, no change."));
}

#[tokio::test]
async fn confident_event_raises_iv_fluids() {
    let model = routed(
        r#"{"events":[{"kind":"marathon","confidence":0.8,"effects":{"IV fluids":1.5},"evidence":"city marathon on Saturday"}]}"#,
        Ok("IV fluids go up for the marathon."),
    );
    let request = PlanRequest::new("Boston, MA")
        .with_baseline("IV fluids", 200.0)
        .with_as_of(date(2024, 3, 12));

    let outcome = plan_surge(&model, &request, &PlannerConfig::default()).await.unwrap();

    let line = outcome.translated.get("IV fluids").unwrap();
    assert_eq!(line.recommended_quantity, 300);
    assert_eq!(line.delta, 100);
    let marathon = outcome
        .audit_blocks
        .iter()
        .filter_map(AuditBlock::accepted_event)
        .any(|e| e.kind == "marathon");
    assert!(marathon);
    assert_eq!(
        outcome.briefing.source,
        BriefingSource::Model {
            model_ref: "gpt-4o-mini".to_string()
        }
    );
    assert!(!outcome.is_degraded());
}

#[tokio::test]
async fn low_confidence_event_is_audited_not_applied() {
    let model = routed(
        r#"{"events":[{"kind":"concert","confidence":0.5,"effects":{"IV fluids":1.5}}]}"#,
        Err(AiError::InvalidOutput("no prose".to_string())),
    );
    let request = PlanRequest::new("Boston, MA")
        .with_baseline("IV fluids", 200.0)
        .with_as_of(date(2024, 3, 12));

    let outcome = plan_surge(&model, &request, &PlannerConfig::default()).await.unwrap();

    assert_eq!(outcome.translated.get("IV fluids").unwrap().delta, 0);
    let filtered: Vec<_> =
        outcome.audit_blocks.iter().filter_map(AuditBlock::filtered_event).collect();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].kind, "concert");
    assert!(outcome.briefing.text.contains("concert (confidence 0.50, threshold 0.60)"));
}

#[tokio::test(start_paused = true)]
async fn failing_narrative_falls_back_to_template() {
    let model = routed(
        r#"{"events":[{"kind":"marathon","confidence":0.9,"effects":{"IV fluids":1.5}}]}"#,
        Err(AiError::Unavailable("503".to_string())),
    );
    let request = PlanRequest::new("Boston, MA")
        .with_baseline("IV fluids", 200.0)
        .with_baseline("gloves", 50.0)
        .with_as_of(date(2024, 3, 12));

    let outcome = plan_surge(&model, &request, &PlannerConfig::default()).await.unwrap();

    assert!(outcome.briefing.is_fallback());
    assert!(outcome.briefing.text.contains("IV fluids: 200 -> 300 (+100, x1.50)"));
    assert!(outcome.briefing.text.contains("gloves: 50 -> 50, no change."));
    assert!(
        outcome
            .degraded
            .iter()
            .any(|d| matches!(d, Degradation::NarrativeFallback { .. }))
    );
}

#[tokio::test]
async fn model_briefing_names_applied_events_it_left_out() {
    let model = routed(
        r#"{"events":[{"kind":"marathon","confidence":0.8,"effects":{"IV fluids":1.5}}]}"#,
        Ok("Raise IV fluids stock by 100 units."),
    );
    let request = PlanRequest::new("Boston, MA")
        .with_baseline("IV fluids", 200.0)
        .with_as_of(date(2024, 3, 12));

    let outcome = plan_surge(&model, &request, &PlannerConfig::default()).await.unwrap();

    assert!(!outcome.briefing.is_fallback());
    assert!(outcome.briefing.text.starts_with("Raise IV fluids stock by 100 units."));
    assert!(outcome.briefing.text.contains("- marathon (confidence 0.80)"));
}

#[tokio::test]
async fn overlapping_category_names_are_each_accounted_for() {
    let model = routed(
        r#"{"events":[{"kind":"outbreak","confidence":0.9,"effects":{"N95 masks":1.5,"masks":1.4}}]}"#,
        Ok("Order more N95 masks for the outbreak."),
    );
    let request = PlanRequest::new("Boston, MA")
        .with_baseline("N95 masks", 100.0)
        .with_baseline("masks", 100.0)
        .with_as_of(date(2024, 7, 10));
    let config = PlannerConfig::default();

    let outcome = plan_surge(&model, &request, &config).await.unwrap();

    assert_eq!(outcome.translated.get("masks").unwrap().delta, 40);
    assert!(outcome.briefing.text.contains("- masks: 100 -> 140 (+40, x1.40)"));
}

#[tokio::test(start_paused = true)]
async fn slow_model_is_cut_off_by_the_timeout() {
    let model = SlowModel::new(Duration::from_secs(60), r#"{"events":[]}"#);
    let service = ServicePolicy::default()
        .with_timeout(Duration::from_secs(1))
        .with_max_retries(0);
    let request = PlanRequest::new("Austin")
        .with_baseline("gloves", 10.0)
        .with_as_of(date(2024, 7, 10));

    let outcome = plan_surge(&model, &request, &PlannerConfig::default().with_service(service))
        .await
        .unwrap();

    assert!(
        outcome
            .degraded
            .iter()
            .any(|d| matches!(d, Degradation::EventDetectionUnavailable { .. }))
    );
    assert!(outcome.briefing.is_fallback());
    assert_eq!(outcome.translated.get("gloves").unwrap().delta, 0);
}

#[tokio::test]
async fn negative_baseline_is_rejected_before_any_model_call() {
    let model = Arc::new(ScriptedModel::default());
    let request = PlanRequest::new("Austin").with_baseline("gloves", -5.0);

    let err = plan_surge(model.as_ref(), &request, &PlannerConfig::default())
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn empty_location_is_rejected() {
    let model = FailingModel::new(AiError::Unavailable("unused".to_string()));
    let err = plan_surge(&model, &PlanRequest::new("   "), &PlannerConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn occupancy_pressure_and_cap_show_in_the_briefing() {
    let model = routed(
        r#"{"events":[{"kind":"wildfire smoke","confidence":0.95,"effects":{"N95 masks":3.0}}]}"#,
        Err(AiError::InvalidOutput("skip".to_string())),
    );
    let request = PlanRequest::new("Sacramento, CA")
        .with_inventory("occupancy: 100%")
        .with_baseline("N95 masks", 100.0)
        .with_as_of(date(2024, 7, 10));

    let outcome = plan_surge(&model, &request, &PlannerConfig::default()).await.unwrap();

    let line = outcome.translated.get("N95 masks").unwrap();
    assert_eq!(line.multiplier, 2.0);
    assert_eq!(line.recommended_quantity, 200);
    assert!(outcome.plan.entry("N95 masks").unwrap().was_clamped());
    assert!(outcome.briefing.text.contains("(capped at x2.00)"));
    assert!(outcome.briefing.text.contains("bed occupancy 100%"));
}

#[tokio::test]
async fn round_up_policy_is_honoured() {
    let model = routed(
        r#"{"events":[{"kind":"storm","confidence":0.9,"effects":{"bandages":1.01}}]}"#,
        Err(AiError::InvalidOutput("skip".to_string())),
    );
    let request = PlanRequest::new("Austin")
        .with_baseline("bandages", 10.0)
        .with_as_of(date(2024, 3, 12));
    let config = PlannerConfig::default().with_rounding(RoundingPolicy::Up);

    let outcome = plan_surge(&model, &request, &config).await.unwrap();
    // 10 * 1.01 = 10.1 -> 11 rounding up (10 half-up).
    assert_eq!(outcome.translated.get("bandages").unwrap().recommended_quantity, 11);
}

//! End-to-end planning: validate, build, apply, narrate.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use surgeplan_ai::{LanguageModel, fallback_briefing, make_human_nlg};
use surgeplan_core::{
    AuditBlock, Briefing, Degradation, DomainResult, FeatureSet, Location, MultiplierPlan, PlanId,
    PlanRequest, TranslatedPlan,
};

use crate::apply::apply_multipliers_with;
use crate::builder::build_multiplier_plan;
use crate::config::PlannerConfig;

/// Result of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub plan_id: PlanId,
    pub location: Location,
    pub as_of: NaiveDate,
    pub translated: TranslatedPlan,
    pub briefing: Briefing,
    pub plan: MultiplierPlan,
    pub features: FeatureSet,
    pub audit_blocks: Vec<AuditBlock>,
    /// Which optional steps ran in a reduced form.
    pub degraded: Vec<Degradation>,
}

impl PlanOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Run the full pipeline for one request.
///
/// Only invalid input or configuration is an error; this is checked before
/// any language-model call. Model failures degrade the outcome instead.
#[instrument(skip_all, fields(location = %request.location))]
pub async fn plan_surge(
    model: &dyn LanguageModel,
    request: &PlanRequest,
    config: &PlannerConfig,
) -> DomainResult<PlanOutcome> {
    config.validate()?;
    let validated = request.validate().inspect_err(|e| {
        warn!(error = %e, "plan request rejected");
    })?;

    let plan_id = PlanId::new();
    let as_of = validated.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let build = build_multiplier_plan(model, &validated, config, as_of).await?;
    let translated = apply_multipliers_with(&build.plan, &build.baselines, config.rounding);

    let mut degraded = build.degraded;
    let briefing = if config.ai_briefing {
        make_human_nlg(
            model,
            &build.plan,
            &build.features,
            &build.audit_blocks,
            &translated,
            &config.model_ref,
            &config.service,
        )
        .await
    } else {
        Briefing::fallback(
            fallback_briefing(&build.plan, &build.features, &build.audit_blocks, &translated),
            "narrative generation disabled",
        )
    };
    if config.ai_briefing {
        if let Some(reason) = briefing.fallback_reason() {
            degraded.push(Degradation::NarrativeFallback {
                reason: reason.to_string(),
            });
        }
    }

    let outcome = PlanOutcome {
        plan_id,
        location: validated.location,
        as_of,
        translated,
        briefing,
        plan: build.plan,
        features: build.features,
        audit_blocks: build.audit_blocks,
        degraded,
    };

    info!(
        %plan_id,
        %as_of,
        categories = outcome.translated.len(),
        changed = outcome.translated.changes_by_magnitude().len(),
        degraded = outcome.is_degraded(),
        "surge plan ready"
    );
    Ok(outcome)
}

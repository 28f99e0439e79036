//! Multiplier plan construction.
//!
//! Model:
//! - Each category gets feature drivers from its [`CategoryClass`].
//! - Each accepted event contributes its effect for the category, if any.
//! - Raw multiplier = product of all driver factors; the plan stores it
//!   clamped into `[1/cap, cap]`.

use chrono::NaiveDate;
use tracing::{debug, info};

use surgeplan_ai::{LanguageModel, detect_events};
use surgeplan_core::features::vocabulary::{
    CALENDAR_HOLIDAY, CALENDAR_WEEKEND, CAPACITY_OCCUPANCY, SEASONAL_HEAT, SEASONAL_RESPIRATORY,
};
use surgeplan_core::{
    AuditBlock, Degradation, DetectedEvent, Driver, DomainResult, FeatureSet, InventoryBaseline,
    MultiplierPlan, PlanEntry, ValidatedRequest,
};

use crate::categories::{CategoryClass, KNOWN_CATEGORIES, classify};
use crate::config::PlannerConfig;
use crate::context::{ContextFormat, parse_inventory_context};
use crate::features::features_from_context;

/// Occupancy above which capacity pressure starts to raise demand.
const OCCUPANCY_PRESSURE_START: f64 = 0.85;
/// Extra demand at full occupancy.
const OCCUPANCY_PRESSURE_MAX: f64 = 0.20;

/// Output of [`build_multiplier_plan`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanBuild {
    pub plan: MultiplierPlan,
    pub features: FeatureSet,
    pub audit_blocks: Vec<AuditBlock>,
    /// Baselines the plan was built for: the request's, or the quantities read
    /// from the inventory description when the request carried none.
    pub baselines: InventoryBaseline,
    pub degraded: Vec<Degradation>,
}

/// Feature-derived factors for a category class (factors of exactly 1.0 are omitted).
pub fn feature_drivers(class: CategoryClass, features: &FeatureSet) -> Vec<Driver> {
    let scaled = |key: &str, weight: f64| Driver::feature(key, 1.0 + weight * features.value(key));

    let mut drivers = match class {
        CategoryClass::Respiratory => vec![scaled(SEASONAL_RESPIRATORY, 0.30)],
        CategoryClass::Protective => vec![scaled(SEASONAL_RESPIRATORY, 0.15)],
        CategoryClass::Hydration => vec![scaled(SEASONAL_HEAT, 0.25)],
        CategoryClass::Trauma => {
            vec![scaled(CALENDAR_HOLIDAY, 0.20), scaled(CALENDAR_WEEKEND, 0.05)]
        }
        CategoryClass::General => Vec::new(),
    };

    if let Some(occupancy) = features.get(CAPACITY_OCCUPANCY) {
        let pressure = ((occupancy - OCCUPANCY_PRESSURE_START) / (1.0 - OCCUPANCY_PRESSURE_START))
            .clamp(0.0, 1.0);
        drivers.push(Driver::feature(CAPACITY_OCCUPANCY, 1.0 + OCCUPANCY_PRESSURE_MAX * pressure));
    }

    drivers.retain(|d| d.factor != 1.0);
    drivers
}

/// Combine features and accepted events into a capped plan over `categories`.
///
/// Returns the plan and the categories for which nothing was derivable.
/// Events must already be filtered by confidence.
pub fn compose_plan<'a>(
    categories: impl IntoIterator<Item = &'a str>,
    features: &FeatureSet,
    accepted: &[DetectedEvent],
    cap: f64,
) -> DomainResult<(MultiplierPlan, Vec<String>)> {
    let mut uninformed = Vec::new();
    let mut entries = Vec::new();

    for category in categories {
        let mut drivers = feature_drivers(classify(category), features);
        for event in accepted {
            if let Some(factor) = event.effect_for(category) {
                if factor != 1.0 {
                    drivers.push(Driver::event(event.kind.clone(), factor));
                }
            }
        }

        if drivers.is_empty() {
            uninformed.push(category.to_string());
        }

        let entry = PlanEntry::from_drivers(drivers, cap);
        debug!(category, raw = entry.raw, multiplier = entry.multiplier, "category multiplier");
        entries.push((category.to_string(), entry));
    }

    Ok((MultiplierPlan::from_entries(cap, entries)?, uninformed))
}

/// Extract features, detect events, and build the capped multiplier plan.
///
/// Categories come from the request baselines; failing those, from the
/// inventory description; failing both, from [`KNOWN_CATEGORIES`].
pub async fn build_multiplier_plan(
    model: &dyn LanguageModel,
    request: &ValidatedRequest,
    config: &PlannerConfig,
    as_of: NaiveDate,
) -> DomainResult<PlanBuild> {
    let context = parse_inventory_context(&request.inventory);
    let features = features_from_context(&request.location, &context, as_of);

    let mut degraded = Vec::new();
    if context.format == ContextFormat::Unknown {
        degraded.push(Degradation::InventoryContextUnparsed);
    }

    let baselines = if request.baselines.is_empty() {
        context.baseline()?
    } else {
        request.baselines.clone()
    };

    let categories: Vec<String> = if baselines.is_empty() {
        KNOWN_CATEGORIES.iter().map(|c| c.to_string()).collect()
    } else {
        baselines.categories().map(str::to_string).collect()
    };

    let settings = config.detection_settings();
    let detection = detect_events(
        model,
        &request.location,
        &categories,
        as_of,
        &settings,
        &config.service,
    )
    .await;
    if let Some(reason) = &detection.unavailable {
        degraded.push(Degradation::EventDetectionUnavailable {
            reason: reason.clone(),
        });
    }

    let (plan, uninformed) = compose_plan(
        categories.iter().map(String::as_str),
        &features,
        &detection.accepted,
        config.cap,
    )?;

    let mut audit_blocks = detection.audit_blocks;
    // With detection off the audit trail stays empty; the same gap is visible
    // as an entry without drivers.
    if settings.enabled {
        audit_blocks.extend(uninformed.iter().map(|category| AuditBlock::PartialData {
            category: category.clone(),
            note: "no feature or event signal; multiplier defaults to 1.0".to_string(),
        }));
    }

    info!(
        location = %request.location,
        categories = plan.len(),
        accepted_events = detection.accepted.len(),
        uninformed = uninformed.len(),
        cap = config.cap,
        "multiplier plan built"
    );

    Ok(PlanBuild {
        plan,
        features,
        audit_blocks,
        baselines,
        degraded,
    })
}

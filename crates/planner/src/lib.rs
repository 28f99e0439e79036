//! `surgeplan-planner`
//!
//! **Responsibility:** the deterministic planning pipeline around the model boundary.
//!
//! - Feature extraction from location, date and the inventory description.
//! - Multiplier plan construction (features x accepted events, capped).
//! - Application onto baseline quantities with a fixed rounding rule.
//! - [`plan_surge`] wires the stages together with the briefing step.

pub mod apply;
pub mod builder;
pub mod categories;
pub mod config;
pub mod context;
pub mod features;
pub mod pipeline;

pub use apply::{RoundingPolicy, apply_multipliers, apply_multipliers_with};
pub use builder::{PlanBuild, build_multiplier_plan, compose_plan, feature_drivers};
pub use categories::{CategoryClass, KNOWN_CATEGORIES, classify};
pub use config::PlannerConfig;
pub use context::{ContextFormat, InventoryContext, parse_inventory_context};
pub use features::{extract_features, features_from_context};
pub use pipeline::{PlanOutcome, plan_surge};

//! `surgeplan-core`: planning value types and boundary validation.
//!
//! This crate contains **pure** data and rules (no IO, no language-model calls).

pub mod audit;
pub mod briefing;
pub mod error;
pub mod event;
pub mod features;
pub mod id;
pub mod inventory;
pub mod plan;
pub mod request;
pub mod value_object;

pub use audit::{AuditBlock, Degradation};
pub use briefing::{Briefing, BriefingSource};
pub use error::{DomainError, DomainResult};
pub use event::DetectedEvent;
pub use features::FeatureSet;
pub use id::PlanId;
pub use inventory::{InventoryBaseline, Location};
pub use plan::{
    Driver, DriverKind, MultiplierPlan, PlanEntry, TranslatedLine, TranslatedPlan, clamp_to_cap,
    validate_cap,
};
pub use request::{PlanRequest, ValidatedRequest};
pub use value_object::ValueObject;

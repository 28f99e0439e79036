//! `surgeplan-ai`
//!
//! **Responsibility:** the language-model boundary of the planner.
//!
//! - One narrow capability, [`LanguageModel::generate`], injectable and mockable.
//! - Every call is timeout-bounded and retried at most a bounded number of times.
//! - Callers never see a model failure as a planning failure: event detection and
//!   briefing generation degrade to deterministic paths instead.

pub mod events;
pub mod model;
pub mod narrative;
pub mod parse;
pub mod policy;
pub mod prompts;
pub mod registry;
pub mod result;
pub mod stub;

pub use events::{DetectionSettings, EventDetection, detect_events};
pub use model::{GenerateRequest, LanguageModel, ResponseFormat};
pub use narrative::{fallback_briefing, make_human_nlg};
pub use policy::{ServicePolicy, call_model};
pub use registry::ModelRegistry;
pub use result::AiError;
pub use stub::{FailingModel, FnModel, OfflineModel, ScriptedModel, SlowModel};

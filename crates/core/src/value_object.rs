//! Value object trait: equality by value, not identity.
//!
//! Every planning artefact (features, events, plans, briefings) is created
//! fresh for one request and never mutated afterwards. None of them carry an
//! identity of their own; two plans with the same entries are the same plan.

/// Marker trait for immutable planning values.
///
/// Implementors are cheap to clone, compared by their contents and debuggable,
/// so they can be handed to the storage collaborator or asserted on in tests
/// without ceremony.
///
/// ```ignore
/// let a = apply_multipliers(&plan, &baselines);
/// let b = apply_multipliers(&plan, &baselines);
/// assert_eq!(a, b); // same inputs, same value
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

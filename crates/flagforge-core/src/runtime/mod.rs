// flagforge-core/src/runtime/mod.rs
// ============================================================================
// Module: FlagForge Runtime
// Description: Deterministic bucketing, predicate matching, pure
//              evaluation, and the namespace registry.
// Purpose: Execute evaluations against namespace snapshots while
//          preserving the invariants in §3 and the concurrency guarantees
//          in §5.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the hot evaluation path: [`bucketer`] for
//! deterministic percentage gating, [`predicates`] for targeting-axis
//! matching, [`evaluator`] for the pure per-call algorithm, and
//! [`registry`] for the concurrent, atomically-swappable namespace state
//! that owns the active snapshot.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod bucketer;
pub mod evaluator;
pub mod predicates;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bucketer::BUCKET_COUNT;
pub use bucketer::Bucketer;
pub use evaluator::evaluate;
pub use predicates::MatchOutcome;
pub use predicates::matches;
pub use registry::DEFAULT_HISTORY_LIMIT;
pub use registry::NamespaceRegistry;
pub use registry::RegistryError;

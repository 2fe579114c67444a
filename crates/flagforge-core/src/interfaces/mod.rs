// flagforge-core/src/interfaces/mod.rs
// ============================================================================
// Module: FlagForge Interfaces
// Description: Observation hook interfaces the NamespaceRegistry and
//              Evaluator call into.
// Purpose: Let hosts observe registry and evaluation events without the
//          core depending on any logging or metrics backend (§1, §4.6).
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Two interfaces, both purely optional and inline: [`RegistryHooks`] for
//! registry-level lifecycle events (load, rollback, kill switch), and
//! [`EvaluationObserver`] for per-evaluation events. Default methods are
//! no-ops, so implementors override only what they need. Neither hook may
//! mutate the registry or re-enter it; both must be lightweight and
//! non-blocking, since `RegistryHooks` methods run while the write mutex
//! is held and `EvaluationObserver` runs on the evaluating thread.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::core::decision::Decision;
use crate::core::identifiers::FeatureId;
use crate::core::configuration::MaterializedConfiguration;

// ============================================================================
// SECTION: RegistryHooks
// ============================================================================

/// Registry-level lifecycle callbacks.
///
/// Called synchronously while the registry's write mutex is held;
/// implementations must not call back into the registry (no re-entrancy)
/// and must return quickly.
pub trait RegistryHooks: Send + Sync {
    /// Called after a successful `load`, with the previous snapshot (if any)
    /// and the newly active one.
    fn on_load(&self, _old: Option<&MaterializedConfiguration>, _new: &MaterializedConfiguration) {}

    /// Called after a successful `rollback`, with the snapshot rolled back
    /// from and the snapshot rolled back to.
    fn on_rollback(&self, _from: &MaterializedConfiguration, _to: &MaterializedConfiguration) {}

    /// Called after `disable_all` takes effect.
    fn on_disable_all(&self) {}

    /// Called after `enable_all` takes effect.
    fn on_enable_all(&self) {}
}

/// A [`RegistryHooks`] implementation that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRegistryHooks;

impl RegistryHooks for NoopRegistryHooks {}

// ============================================================================
// SECTION: EvaluationObserver
// ============================================================================

/// Per-evaluation observation callback.
///
/// Called on the evaluating thread after every `evaluate`; implementations
/// must not block or allocate substantially, since this runs on every
/// hot-path call.
pub trait EvaluationObserver: Send + Sync {
    /// Called with the outcome of one evaluation.
    #[allow(clippy::too_many_arguments, reason = "mirrors the fixed observation tuple in §4.6")]
    fn on_evaluation(
        &self,
        feature_id: &FeatureId,
        decision: Decision,
        duration: Duration,
        matched_rule_index: Option<usize>,
        bucket: Option<u32>,
        config_version: Option<&str>,
    );
}

/// An [`EvaluationObserver`] implementation that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvaluationObserver;

impl EvaluationObserver for NoopEvaluationObserver {
    fn on_evaluation(
        &self,
        _feature_id: &FeatureId,
        _decision: Decision,
        _duration: Duration,
        _matched_rule_index: Option<usize>,
        _bucket: Option<u32>,
        _config_version: Option<&str>,
    ) {
    }
}

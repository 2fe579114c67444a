// flagforge-core/src/runtime/registry.rs
// ============================================================================
// Module: FlagForge NamespaceRegistry
// Description: Runtime holder of one namespace's active configuration,
//              bounded rollback history, and kill switch.
// Purpose: Implement §4.4's atomic-swap / rollback / kill-switch protocol
//          and §5's wait-free read path.
// Dependencies: crate::core, crate::interfaces, crate::runtime::evaluator,
//               std::sync
// ============================================================================

//! ## Overview
//! The registry is a read-copy-update protocol (§9, "Concurrency
//! primitives"): a `write_mutex` serialises every transition of the
//! `(active, history, kill_switch)` triple, while readers take a cheap
//! `Arc` clone under a read lock and never contend with each other or with
//! the writer's bookkeeping. This intentionally does not use a
//! compare-and-swap pointer crate — `std::sync::RwLock<Arc<T>>` is the
//! pattern this codebase's dependency stack already favours.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Instant;

use thiserror::Error;

use crate::core::configuration::MaterializedConfiguration;
use crate::core::context::Context;
use crate::core::decision::EvaluationMode;
use crate::core::decision::EvaluationResult;
use crate::core::identifiers::FeatureId;
use crate::core::schema::CompiledSchema;
use crate::interfaces::EvaluationObserver;
use crate::interfaces::NoopEvaluationObserver;
use crate::interfaces::NoopRegistryHooks;
use crate::interfaces::RegistryHooks;
use crate::runtime::evaluator;

/// Default bound on the number of retained historical snapshots.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

// ============================================================================
// SECTION: RegistryError
// ============================================================================

/// Errors raised by [`NamespaceRegistry`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The queried feature is not present in the active configuration.
    ///
    /// Under normal operation this cannot happen: every feature in a
    /// `MaterializedConfiguration` is schema-validated. It is surfaced as
    /// an error rather than a panic purely defensively.
    #[error("feature {0:?} is not present in the active configuration")]
    FeatureNotFound(String),
    /// A configuration was loaded against a schema other than the one this
    /// registry was constructed with.
    #[error("configuration validated against namespace {found:?}, expected {expected:?}")]
    NamespaceMismatch {
        /// The namespace id this registry owns.
        expected: String,
        /// The namespace id the configuration was validated against.
        found: String,
    },
}

// ============================================================================
// SECTION: NamespaceRegistry
// ============================================================================

/// Runtime holder of one namespace's active [`MaterializedConfiguration`].
pub struct NamespaceRegistry {
    /// The static feature declarations this registry's snapshots must
    /// conform to.
    schema: CompiledSchema,
    /// The currently active snapshot.
    active: RwLock<Arc<MaterializedConfiguration>>,
    /// Bounded history, oldest first; never contains the active snapshot.
    history: Mutex<VecDeque<Arc<MaterializedConfiguration>>>,
    /// Upper bound on `history`'s length.
    history_limit: usize,
    /// Whether every evaluation currently returns the default value.
    kill_switch: AtomicBool,
    /// Registry-level lifecycle callbacks.
    hooks: RwLock<Arc<dyn RegistryHooks>>,
    /// Per-evaluation observation callback.
    observer: RwLock<Arc<dyn EvaluationObserver>>,
    /// Serialises `(active, history, kill_switch)` transitions; readers
    /// never acquire this.
    write_mutex: Mutex<()>,
}

impl std::fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceRegistry")
            .field("namespace_id", &self.schema.namespace_id())
            .field("history_limit", &self.history_limit)
            .field("kill_switch", &self.kill_switch.load(Ordering::Acquire))
            .finish()
    }
}

impl NamespaceRegistry {
    /// Builds a registry for `schema`, initially active on `initial_config`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NamespaceMismatch`] if `initial_config` was
    /// validated against a different namespace than `schema`'s.
    pub fn new(
        schema: CompiledSchema,
        initial_config: MaterializedConfiguration,
        history_limit: usize,
        hooks: Arc<dyn RegistryHooks>,
    ) -> Result<Self, RegistryError> {
        if initial_config.namespace_id() != schema.namespace_id() {
            return Err(RegistryError::NamespaceMismatch {
                expected: schema.namespace_id().to_string(),
                found: initial_config.namespace_id().to_string(),
            });
        }
        Ok(Self {
            schema,
            active: RwLock::new(Arc::new(initial_config)),
            history: Mutex::new(VecDeque::with_capacity(history_limit)),
            history_limit,
            kill_switch: AtomicBool::new(false),
            hooks: RwLock::new(hooks),
            observer: RwLock::new(Arc::new(NoopEvaluationObserver)),
            write_mutex: Mutex::new(()),
        })
    }

    /// Builds a registry with no-op hooks and the default history limit.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NamespaceMismatch`] under the same
    /// condition as [`NamespaceRegistry::new`].
    pub fn with_defaults(
        schema: CompiledSchema,
        initial_config: MaterializedConfiguration,
    ) -> Result<Self, RegistryError> {
        Self::new(schema, initial_config, DEFAULT_HISTORY_LIMIT, Arc::new(NoopRegistryHooks))
    }

    /// The schema this registry's snapshots are validated against.
    #[must_use]
    pub const fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    /// Atomically replaces the active snapshot with `config`, pushing the
    /// previously active snapshot onto the tail of history (truncating the
    /// head if that would exceed `history_limit`).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NamespaceMismatch`] if `config` was
    /// validated against a different namespace than this registry's
    /// schema.
    pub fn load(&self, config: MaterializedConfiguration) -> Result<(), RegistryError> {
        if config.namespace_id() != self.schema.namespace_id() {
            return Err(RegistryError::NamespaceMismatch {
                expected: self.schema.namespace_id().to_string(),
                found: config.namespace_id().to_string(),
            });
        }

        let _write_guard = self.write_mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let new_active = Arc::new(config);

        let old_active = {
            let mut active_guard = self.active.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::replace(&mut *active_guard, Arc::clone(&new_active))
        };

        {
            let mut history_guard = self.history.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            history_guard.push_back(old_active.clone());
            while history_guard.len() > self.history_limit {
                history_guard.pop_front();
            }
        }

        self.hooks_snapshot().on_load(Some(&old_active), &new_active);
        Ok(())
    }

    /// Reverts to the configuration that was active `steps` loads ago.
    ///
    /// On success, that entry is removed from history (so rollbacks are
    /// not themselves undoable) and the snapshots between it and the
    /// current active one are discarded, not pushed onto history. Returns
    /// `false` and leaves state unchanged if history has fewer than
    /// `steps` entries.
    #[must_use]
    pub fn rollback(&self, steps: usize) -> bool {
        if steps == 0 {
            return false;
        }
        let _write_guard = self.write_mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut history_guard = self.history.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if history_guard.len() < steps {
            return false;
        }

        for _ in 1..steps {
            history_guard.pop_back();
        }
        let Some(target) = history_guard.pop_back() else {
            return false;
        };
        drop(history_guard);

        let previous_active = {
            let mut active_guard = self.active.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::replace(&mut *active_guard, Arc::clone(&target))
        };

        self.hooks_snapshot().on_rollback(&previous_active, &target);
        true
    }

    /// Kill-switches the namespace: every evaluation returns the default
    /// value until [`NamespaceRegistry::enable_all`] is called.
    pub fn disable_all(&self) {
        let _write_guard = self.write_mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.kill_switch.store(true, Ordering::Release);
        self.hooks_snapshot().on_disable_all();
    }

    /// Clears the kill switch set by [`NamespaceRegistry::disable_all`].
    pub fn enable_all(&self) {
        let _write_guard = self.write_mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.kill_switch.store(false, Ordering::Release);
        self.hooks_snapshot().on_enable_all();
    }

    /// A consistent, atomic read of the active snapshot.
    #[must_use]
    pub fn current_configuration(&self) -> Arc<MaterializedConfiguration> {
        Arc::clone(&self.active.read().unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    /// Replaces the registry-level hooks.
    pub fn set_hooks(&self, hooks: Arc<dyn RegistryHooks>) {
        *self.hooks.write().unwrap_or_else(std::sync::PoisonError::into_inner) = hooks;
    }

    /// Replaces the per-evaluation observer.
    pub fn set_observer(&self, observer: Arc<dyn EvaluationObserver>) {
        *self.observer.write().unwrap_or_else(std::sync::PoisonError::into_inner) = observer;
    }

    /// Evaluates `feature_id` against the active snapshot and `context`.
    ///
    /// Never acquires `write_mutex`; this is the wait-free hot path (§5).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::FeatureNotFound`] if `feature_id` is not
    /// present in the active snapshot. Under normal operation (every
    /// active snapshot is schema-validated) this cannot occur.
    pub fn evaluate(
        &self,
        feature_id: &FeatureId,
        context: &dyn Context,
        mode: EvaluationMode,
    ) -> Result<EvaluationResult, RegistryError> {
        let started_at = Instant::now();
        let active = self.current_configuration();
        let Some(flag) = active.flag(feature_id) else {
            return Err(RegistryError::FeatureNotFound(feature_id.canonical()));
        };
        let registry_disabled = self.kill_switch.load(Ordering::Acquire);
        let config_version = active.metadata().version.as_deref();

        let result = evaluator::evaluate(
            flag,
            &feature_id.canonical(),
            context,
            registry_disabled,
            mode,
            config_version,
        );

        let (matched_rule_index, bucket) = match result.decision {
            crate::core::decision::Decision::RuleMatched { rule_index, bucket } => (Some(rule_index), Some(bucket)),
            _ => (None, None),
        };
        self.observer_snapshot().on_evaluation(
            feature_id,
            result.decision,
            started_at.elapsed(),
            matched_rule_index,
            bucket,
            config_version,
        );

        Ok(result)
    }

    /// Borrows a clone of the current hooks implementation.
    fn hooks_snapshot(&self) -> Arc<dyn RegistryHooks> {
        Arc::clone(&self.hooks.read().unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    /// Borrows a clone of the current observer implementation.
    fn observer_snapshot(&self) -> Arc<dyn EvaluationObserver> {
        Arc::clone(&self.observer.read().unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

// flagforge-core/src/runtime/evaluator.rs
// ============================================================================
// Module: FlagForge Evaluator
// Description: The pure evaluation algorithm: FlagDefinition + Context →
//              value + decision trace.
// Purpose: Implement §4.3's evaluate() contract, independent of the
//          NamespaceRegistry's concurrency and snapshot-resolution concerns.
// Dependencies: crate::core, crate::runtime::{bucketer, predicates}
// ============================================================================

//! ## Overview
//! [`evaluate`] takes an already-resolved [`FlagDefinition`] (the registry
//! resolves `feature → FlagDefinition` and the kill-switch state before
//! calling in) and walks its pre-sorted rules in specificity order,
//! applying targeting predicates and ramp-up admission. It never raises:
//! any failure an extension predicate produces becomes an observed
//! non-match.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use crate::core::context::Context;
use crate::core::decision::Decision;
use crate::core::decision::EvaluationMode;
use crate::core::decision::EvaluationResult;
use crate::core::decision::ExplainTrace;
use crate::core::flag::FlagDefinition;
use crate::runtime::bucketer::Bucketer;
use crate::runtime::predicates;

// ============================================================================
// SECTION: RampUpSkip
// ============================================================================

/// The highest-specificity rule rejected purely by ramp-up gating, kept
/// for explain-mode diagnostics. Only the first such skip is retained
/// (§4.3, step 4b).
#[derive(Debug, Clone, Copy)]
struct RampUpSkip {
    /// Index of the skipped rule.
    rule_index: usize,
    /// The bucket computed for the skipped rule.
    bucket: u32,
}

// ============================================================================
// SECTION: evaluate
// ============================================================================

/// Evaluates `flag` for `context`, given whether the owning registry is
/// kill-switched.
///
/// `feature_id_canonical` is the flag's own feature id rendered
/// canonically; callers pass it in rather than recomputing it from
/// `flag.feature_id()` on every call, since the registry already holds it.
#[must_use]
pub fn evaluate(
    flag: &FlagDefinition,
    feature_id_canonical: &str,
    context: &dyn Context,
    registry_disabled: bool,
    mode: EvaluationMode,
    config_version: Option<&str>,
) -> EvaluationResult {
    let start = matches!(mode, EvaluationMode::Explain).then(Instant::now);

    if registry_disabled {
        return finish(flag, Decision::RegistryDisabled, None, start, config_version);
    }
    if !flag.is_active() {
        return finish(flag, Decision::FlagInactive, None, start, config_version);
    }

    let mut first_rampup_skip: Option<RampUpSkip> = None;

    for (rule_index, rule) in flag.rules().iter().enumerate() {
        let outcome = predicates::matches(rule, context);
        if !outcome.matched {
            continue;
        }

        let bucket = Bucketer::bucket(flag.salt(), feature_id_canonical, context.stable_id().as_hex());
        let admitted = rule.ramp_up_allowlist().contains(context.stable_id())
            || flag.namespace_allowlist().contains(context.stable_id())
            || Bucketer::admits(rule.ramp_up(), bucket);

        if admitted {
            return finish(
                flag,
                Decision::RuleMatched { rule_index, bucket },
                Some(RampUpSkip { rule_index, bucket }),
                start,
                config_version,
            );
        }

        if first_rampup_skip.is_none() {
            first_rampup_skip = Some(RampUpSkip { rule_index, bucket });
        }
    }

    finish(flag, Decision::Default, first_rampup_skip, start, config_version)
}

/// Builds the final [`EvaluationResult`], populating [`ExplainTrace`] only
/// when `start` is `Some` (i.e. [`EvaluationMode::Explain`]).
fn finish(
    flag: &FlagDefinition,
    decision: Decision,
    diagnostic: Option<RampUpSkip>,
    start: Option<Instant>,
    config_version: Option<&str>,
) -> EvaluationResult {
    let value = match decision {
        Decision::RuleMatched { rule_index, .. } => flag.rules()[rule_index].value().clone(),
        Decision::RegistryDisabled | Decision::FlagInactive | Decision::Default => {
            flag.default_value().clone()
        }
    };

    let trace = start.map(|started_at| {
        let (rule_index, bucket) = match decision {
            Decision::RuleMatched { rule_index, bucket } => (Some(rule_index), Some(bucket)),
            Decision::Default => diagnostic.map_or((None, None), |skip| (Some(skip.rule_index), Some(skip.bucket))),
            Decision::RegistryDisabled | Decision::FlagInactive => (None, None),
        };
        ExplainTrace {
            matched_or_skipped_rule_index: rule_index,
            bucket,
            elapsed: started_at.elapsed(),
            config_version: config_version.map(str::to_string),
        }
    });

    EvaluationResult { value, decision, trace }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

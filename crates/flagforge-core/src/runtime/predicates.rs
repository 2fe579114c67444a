// flagforge-core/src/runtime/predicates.rs
// ============================================================================
// Module: FlagForge Targeting Predicates
// Description: Per-axis conjunctive predicate matching for a Rule.
// Purpose: Answer "does this rule's predicate set match this context?"
//          (§4.2), catching panics raised by extension predicates.
// Dependencies: crate::core, std::panic
// ============================================================================

//! ## Overview
//! [`matches`] evaluates every targeting axis independently and
//! conjunctively: locales, platforms, version range, axis constraints, and
//! the optional extension predicate. Absence or emptiness is permissive
//! per axis; the overall result is the logical AND of all axes. A panic
//! raised inside an extension predicate is caught and treated as a
//! non-match (§4.3, "Failure"), recorded in the returned [`MatchOutcome`]
//! so the evaluator can emit an observation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;

use crate::core::context::Context;
use crate::core::rule::Rule;

// ============================================================================
// SECTION: MatchOutcome
// ============================================================================

/// The result of matching one rule's targeting predicates against a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Whether every targeting axis matched.
    pub matched: bool,
    /// Whether the rule's extension predicate panicked during evaluation.
    pub extension_panicked: bool,
}

// ============================================================================
// SECTION: matches
// ============================================================================

/// Evaluates every targeting axis of `rule` against `context`,
/// conjunctively.
#[must_use]
pub fn matches(rule: &Rule, context: &dyn Context) -> MatchOutcome {
    if !locale_matches(rule, context) {
        return MatchOutcome { matched: false, extension_panicked: false };
    }
    if !platform_matches(rule, context) {
        return MatchOutcome { matched: false, extension_panicked: false };
    }
    if !version_matches(rule, context) {
        return MatchOutcome { matched: false, extension_panicked: false };
    }
    if !axis_constraints_match(rule, context) {
        return MatchOutcome { matched: false, extension_panicked: false };
    }
    extension_matches(rule, context)
}

/// Matches iff `rule.locales()` is empty or contains the context's locale.
fn locale_matches(rule: &Rule, context: &dyn Context) -> bool {
    if rule.locales().is_empty() {
        return true;
    }
    context.locale().is_some_and(|locale| rule.locales().contains(locale))
}

/// Matches iff `rule.platforms()` is empty or contains the context's
/// platform.
fn platform_matches(rule: &Rule, context: &dyn Context) -> bool {
    if rule.platforms().is_empty() {
        return true;
    }
    context.platform().is_some_and(|platform| rule.platforms().contains(platform))
}

/// Matches iff the rule's version range contains the context's version;
/// an unbounded range always matches.
fn version_matches(rule: &Rule, context: &dyn Context) -> bool {
    match context.version() {
        Some(version) => rule.version_range().matches(version),
        None => !rule.version_range().is_bounded(),
    }
}

/// Matches iff, for every `(axis_id, allowed)` constraint, at least one of
/// the context's values for that axis is in `allowed`.
///
/// A context missing a value for a constrained axis yields an empty
/// value slice, which fails any non-empty allowed set — absence is
/// non-match, not wildcard (§9, open question resolved this way).
fn axis_constraints_match(rule: &Rule, context: &dyn Context) -> bool {
    rule.axis_constraints().iter().all(|(axis_id, allowed)| {
        context
            .axis_values(axis_id)
            .iter()
            .any(|value| allowed.contains(value))
    })
}

/// Matches iff the rule has no extension, or its extension returns `true`
/// for the context. A panic inside the extension is caught and treated as
/// a non-match.
fn extension_matches(rule: &Rule, context: &dyn Context) -> MatchOutcome {
    let Some(extension) = rule.extension() else {
        return MatchOutcome { matched: true, extension_panicked: false };
    };
    match catch_unwind(AssertUnwindSafe(|| extension(context))) {
        Ok(matched) => MatchOutcome { matched, extension_panicked: false },
        Err(_) => MatchOutcome { matched: false, extension_panicked: true },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

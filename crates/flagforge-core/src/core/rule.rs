// flagforge-core/src/core/rule.rs
// ============================================================================
// Module: FlagForge Rule
// Description: A bound predicate set plus value, ramp-up, allowlist, and
//              precomputed specificity.
// Purpose: The unit the evaluator walks, pre-sorted by specificity.
// Dependencies: std collections
// ============================================================================

//! ## Overview
//! A [`Rule`] bundles every targeting axis from §4.2 with the value it
//! returns when it wins. Specificity is computed once at construction
//! (§3, invariant 3: "specificity is pure, depends only on the Rule's own
//! fields") and cached, never recomputed on the evaluation hot path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::identifiers::StableId;
use crate::core::value::FlagValue;
use crate::core::version::VersionRange;

// ============================================================================
// SECTION: Extension predicate
// ============================================================================

/// A user-supplied predicate extension: an arbitrary side-effect-free
/// function of the context, paired with a specificity contribution.
///
/// Stored as a boxed closure because the evaluator is generic over no
/// context type — see [`crate::core::context::Context`].
pub type ExtensionPredicate =
    std::sync::Arc<dyn Fn(&dyn crate::core::context::Context) -> bool + Send + Sync>;

// ============================================================================
// SECTION: Rule
// ============================================================================

/// A single targeting rule within a [`crate::core::flag::FlagDefinition`].
///
/// Immutable once constructed. `specificity` is computed by
/// [`Rule::new`] and never recomputed afterwards.
#[derive(Clone)]
pub struct Rule {
    /// The value this rule returns when it wins.
    value: FlagValue,
    /// Percentage in `[0, 100]`; `100.0` disables ramp-up gating.
    ramp_up: f64,
    /// Stable ids that bypass this rule's ramp-up check.
    ramp_up_allowlist: BTreeSet<StableId>,
    /// Locale tags this rule is constrained to; empty means unconstrained.
    locales: BTreeSet<String>,
    /// Platform tags this rule is constrained to; empty means unconstrained.
    platforms: BTreeSet<String>,
    /// The version range this rule is constrained to.
    version_range: VersionRange,
    /// Per-axis allowed value sets.
    axis_constraints: BTreeMap<String, BTreeSet<String>>,
    /// An optional user-supplied predicate extension and its specificity.
    extension: Option<(ExtensionPredicate, u32)>,
    /// An optional free-text annotation.
    note: Option<String>,
    /// Cached specificity score; see [`Rule::specificity`].
    specificity: u32,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("value", &self.value)
            .field("ramp_up", &self.ramp_up)
            .field("ramp_up_allowlist", &self.ramp_up_allowlist)
            .field("locales", &self.locales)
            .field("platforms", &self.platforms)
            .field("version_range", &self.version_range)
            .field("axis_constraints", &self.axis_constraints)
            .field("has_extension", &self.extension.is_some())
            .field("note", &self.note)
            .field("specificity", &self.specificity)
            .finish()
    }
}

/// Builder-style construction parameters for [`Rule::new`].
///
/// Grouped into one struct to avoid an unwieldy positional-argument
/// constructor; every field mirrors a §3 `Rule` field one-to-one.
#[derive(Clone, Default)]
pub struct RuleSpec {
    /// Percentage in `[0, 100]`; `100.0` disables ramp-up gating.
    pub ramp_up: f64,
    /// Stable ids that bypass this rule's ramp-up check.
    pub ramp_up_allowlist: BTreeSet<StableId>,
    /// Locale tags this rule is constrained to.
    pub locales: BTreeSet<String>,
    /// Platform tags this rule is constrained to.
    pub platforms: BTreeSet<String>,
    /// The version range this rule is constrained to.
    pub version_range: VersionRange,
    /// Per-axis allowed value sets.
    pub axis_constraints: BTreeMap<String, BTreeSet<String>>,
    /// An optional user-supplied predicate extension and its specificity.
    pub extension: Option<(ExtensionPredicate, u32)>,
    /// An optional free-text annotation.
    pub note: Option<String>,
}

impl RuleSpec {
    /// A spec with `ramp_up = 100.0`, unbounded version range, and every
    /// other constraint empty.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            ramp_up: 100.0,
            version_range: VersionRange::Unbounded,
            ..Default::default()
        }
    }
}

impl Rule {
    /// Builds a rule from `value` and `spec`, computing and caching its
    /// specificity.
    #[must_use]
    pub fn new(value: FlagValue, spec: RuleSpec) -> Self {
        let specificity = Self::compute_specificity(&spec);
        Self {
            value,
            ramp_up: spec.ramp_up,
            ramp_up_allowlist: spec.ramp_up_allowlist,
            locales: spec.locales,
            platforms: spec.platforms,
            version_range: spec.version_range,
            axis_constraints: spec.axis_constraints,
            extension: spec.extension,
            note: spec.note,
            specificity,
        }
    }

    /// Computes the §3 specificity score: one point per non-empty
    /// constraint category, plus the sum of extension specificities.
    fn compute_specificity(spec: &RuleSpec) -> u32 {
        let mut score = 0_u32;
        if !spec.locales.is_empty() {
            score += 1;
        }
        if !spec.platforms.is_empty() {
            score += 1;
        }
        if spec.version_range.is_bounded() {
            score += 1;
        }
        score += u32::try_from(spec.axis_constraints.len()).unwrap_or(u32::MAX);
        if let Some((_, extension_specificity)) = &spec.extension {
            score += extension_specificity;
        }
        score
    }

    /// The value this rule returns when it wins.
    #[must_use]
    pub const fn value(&self) -> &FlagValue {
        &self.value
    }

    /// Percentage in `[0, 100]` gating this rule's admission.
    #[must_use]
    pub const fn ramp_up(&self) -> f64 {
        self.ramp_up
    }

    /// Stable ids that bypass this rule's ramp-up check.
    #[must_use]
    pub const fn ramp_up_allowlist(&self) -> &BTreeSet<StableId> {
        &self.ramp_up_allowlist
    }

    /// Locale tags this rule is constrained to.
    #[must_use]
    pub const fn locales(&self) -> &BTreeSet<String> {
        &self.locales
    }

    /// Platform tags this rule is constrained to.
    #[must_use]
    pub const fn platforms(&self) -> &BTreeSet<String> {
        &self.platforms
    }

    /// The version range this rule is constrained to.
    #[must_use]
    pub const fn version_range(&self) -> &VersionRange {
        &self.version_range
    }

    /// Per-axis allowed value sets.
    #[must_use]
    pub const fn axis_constraints(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.axis_constraints
    }

    /// The extension predicate, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&ExtensionPredicate> {
        self.extension.as_ref().map(|(predicate, _)| predicate)
    }

    /// The free-text annotation, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// The cached specificity score.
    #[must_use]
    pub const fn specificity(&self) -> u32 {
        self.specificity
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::Rule;
    use super::RuleSpec;
    use crate::core::value::FlagValue;
    use crate::core::version::Version;
    use crate::core::version::VersionRange;

    #[test]
    fn unconstrained_rule_has_zero_specificity() {
        let rule = Rule::new(FlagValue::Boolean(true), RuleSpec::unconstrained());
        assert_eq!(rule.specificity(), 0);
    }

    #[test]
    fn each_constraint_category_contributes_one() {
        let mut spec = RuleSpec::unconstrained();
        spec.platforms.insert("IOS".to_string());
        spec.version_range = VersionRange::MinOnly(Version::new(3, 0, 0));
        let rule = Rule::new(FlagValue::Boolean(true), spec);
        assert_eq!(rule.specificity(), 2);
    }

    #[test]
    fn extension_specificity_adds_to_total() {
        let mut spec = RuleSpec::unconstrained();
        spec.extension = Some((std::sync::Arc::new(|_: &dyn crate::core::context::Context| true), 5));
        let rule = Rule::new(FlagValue::Boolean(true), spec);
        assert_eq!(rule.specificity(), 5);
    }
}

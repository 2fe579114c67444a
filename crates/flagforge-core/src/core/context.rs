// flagforge-core/src/core/context.rs
// ============================================================================
// Module: FlagForge Evaluation Context
// Description: The abstract capability set the evaluator reads from.
// Purpose: Let hosts extend Context with domain fields while keeping the
//          evaluator's view fixed to {stable_id, locale, platform, version,
//          axis_values, custom_predicate_input}.
// Dependencies: none (std only)
// ============================================================================

//! ## Overview
//! [`Context`] is an object-safe trait so the evaluator can take `&dyn
//! Context` without being generic over the caller's concrete context type.
//! [`StaticContext`] is a ready-made implementation for tests and simple
//! callers; [`StaticContextBuilder`] assembles one field at a time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::identifiers::StableId;
use crate::core::version::Version;

// ============================================================================
// SECTION: Context
// ============================================================================

/// The abstract capability set the evaluator reads from.
///
/// Implementations may carry arbitrary additional domain fields; the
/// evaluator only ever calls the methods below. `custom_predicate_input`
/// hands an extension predicate a type-erased view of `self` so it can
/// downcast to whatever concrete context type the host actually passes.
pub trait Context {
    /// The stable cohort identifier used for ramp-up bucketing.
    fn stable_id(&self) -> &StableId;

    /// The caller's locale tag, if known.
    fn locale(&self) -> Option<&str>;

    /// The caller's platform tag, if known.
    fn platform(&self) -> Option<&str>;

    /// The caller's semantic version, if known.
    fn version(&self) -> Option<Version>;

    /// The set of values the context presents for a given targeting axis.
    ///
    /// Absence (an empty slice) is treated by the evaluator as "no value",
    /// which fails any non-empty allowed set.
    fn axis_values(&self, axis_id: &str) -> &[String];

    /// A type-erased view of `self`, for extension predicates to downcast.
    fn custom_predicate_input(&self) -> &dyn Any;
}

// ============================================================================
// SECTION: StaticContext
// ============================================================================

/// A plain, immutable [`Context`] implementation built from owned fields.
#[derive(Debug, Clone)]
pub struct StaticContext {
    /// The stable cohort identifier.
    stable_id: StableId,
    /// The caller's locale tag.
    locale: Option<String>,
    /// The caller's platform tag.
    platform: Option<String>,
    /// The caller's semantic version.
    version: Option<Version>,
    /// Axis id to allowed-value-set mapping.
    axis_values: BTreeMap<String, Vec<String>>,
}

impl StaticContext {
    /// Starts building a `StaticContext` for the given stable id.
    #[must_use]
    pub fn builder(stable_id: StableId) -> StaticContextBuilder {
        StaticContextBuilder::new(stable_id)
    }
}

impl Context for StaticContext {
    fn stable_id(&self) -> &StableId {
        &self.stable_id
    }

    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn axis_values(&self, axis_id: &str) -> &[String] {
        self.axis_values
            .get(axis_id)
            .map_or(&[], Vec::as_slice)
    }

    fn custom_predicate_input(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// SECTION: StaticContextBuilder
// ============================================================================

/// Builder for [`StaticContext`].
#[derive(Debug, Clone)]
pub struct StaticContextBuilder {
    /// The stable cohort identifier.
    stable_id: StableId,
    /// The caller's locale tag.
    locale: Option<String>,
    /// The caller's platform tag.
    platform: Option<String>,
    /// The caller's semantic version.
    version: Option<Version>,
    /// Axis id to allowed-value-set mapping, deduplicated on insert.
    axis_values: BTreeMap<String, BTreeSet<String>>,
}

impl StaticContextBuilder {
    /// Starts a new builder for the given stable id.
    #[must_use]
    pub fn new(stable_id: StableId) -> Self {
        Self {
            stable_id,
            locale: None,
            platform: None,
            version: None,
            axis_values: BTreeMap::new(),
        }
    }

    /// Sets the locale tag.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Sets the platform tag.
    #[must_use]
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Sets the semantic version.
    #[must_use]
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Adds a value the context presents for a given axis.
    #[must_use]
    pub fn axis_value(mut self, axis_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.axis_values
            .entry(axis_id.into())
            .or_default()
            .insert(value.into());
        self
    }

    /// Finalises the builder into a [`StaticContext`].
    #[must_use]
    pub fn build(self) -> StaticContext {
        let axis_values = self
            .axis_values
            .into_iter()
            .map(|(axis_id, values)| (axis_id, values.into_iter().collect()))
            .collect();
        StaticContext {
            stable_id: self.stable_id,
            locale: self.locale,
            platform: self.platform,
            version: self.version,
            axis_values,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

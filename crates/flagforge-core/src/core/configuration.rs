// flagforge-core/src/core/configuration.rs
// ============================================================================
// Module: FlagForge Configuration
// Description: An immutable namespace snapshot: every feature's
//              FlagDefinition plus metadata.
// Purpose: Hold the map the NamespaceRegistry swaps atomically, and the
//          single validation gate producing MaterializedConfiguration.
// Dependencies: std collections
// ============================================================================

//! ## Overview
//! [`Configuration`] is an ordered `FeatureId → FlagDefinition` map plus
//! [`ConfigurationMetadata`]; order follows schema declaration order so
//! encoded output is stable (§4.5). [`Configuration::validate`] is the only
//! path that produces a [`MaterializedConfiguration`] — it checks every
//! invariant in §3 against a [`CompiledSchema`] before allowing the
//! snapshot into a registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use thiserror::Error;

use crate::core::flag::FlagDefinition;
use crate::core::identifiers::FeatureId;
use crate::core::schema::CompiledSchema;

// ============================================================================
// SECTION: ConfigurationMetadata
// ============================================================================

/// Free-form provenance metadata attached to a [`Configuration`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationMetadata {
    /// An opaque version tag for this snapshot, if the source assigned one.
    pub version: Option<String>,
    /// The epoch-millisecond timestamp this snapshot was generated at.
    pub generated_at_epoch_millis: Option<i64>,
    /// A free-text description of where this snapshot came from.
    pub source: Option<String>,
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// An immutable `FeatureId → FlagDefinition` mapping, in schema order.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Entries in schema declaration order.
    entries: Vec<(FeatureId, FlagDefinition)>,
    /// Provenance metadata.
    metadata: ConfigurationMetadata,
}

impl Configuration {
    /// Builds a configuration from ordered entries and metadata.
    #[must_use]
    pub fn new(entries: Vec<(FeatureId, FlagDefinition)>, metadata: ConfigurationMetadata) -> Self {
        Self { entries, metadata }
    }

    /// Entries in schema declaration order.
    #[must_use]
    pub fn entries(&self) -> &[(FeatureId, FlagDefinition)] {
        &self.entries
    }

    /// Provenance metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ConfigurationMetadata {
        &self.metadata
    }

    /// Looks up a feature's definition by id.
    #[must_use]
    pub fn flag(&self, feature_id: &FeatureId) -> Option<&FlagDefinition> {
        self.entries
            .iter()
            .find(|(id, _)| id == feature_id)
            .map(|(_, flag)| flag)
    }

    /// Validates this configuration against `schema`, producing a
    /// [`MaterializedConfiguration`] — the only public constructor for that
    /// type, matching §3's "Only the Codec produces these" by making the
    /// validator the sole gate regardless of which crate calls it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] on the first invariant violation found:
    /// a feature not declared in the schema, a value whose kind disagrees
    /// with the schema's witness, or a rule with `ramp_up` outside
    /// `[0.0, 100.0]`.
    pub fn validate(self, schema: &CompiledSchema) -> Result<MaterializedConfiguration, ValidationError> {
        for (feature_id, flag) in &self.entries {
            let Some(entry) = schema.entry(feature_id) else {
                return Err(ValidationError::UnknownFeature(feature_id.canonical()));
            };
            if flag.default_value().kind() != entry.value_kind() {
                return Err(ValidationError::TypeMismatch {
                    feature_id: feature_id.canonical(),
                    expected: entry.value_kind(),
                    found: flag.default_value().kind(),
                });
            }
            for rule in flag.rules() {
                if rule.value().kind() != entry.value_kind() {
                    return Err(ValidationError::TypeMismatch {
                        feature_id: feature_id.canonical(),
                        expected: entry.value_kind(),
                        found: rule.value().kind(),
                    });
                }
                if !(0.0..=100.0).contains(&rule.ramp_up()) {
                    return Err(ValidationError::InvalidRampUp {
                        feature_id: feature_id.canonical(),
                        ramp_up: rule.ramp_up(),
                    });
                }
            }
        }
        Ok(MaterializedConfiguration {
            configuration: self,
            namespace_id: schema.namespace_id().to_string(),
        })
    }
}

/// Errors raised while validating a [`Configuration`] against a schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A feature in the configuration is not declared in the schema.
    #[error("feature {0:?} is not declared in the schema")]
    UnknownFeature(String),
    /// A value's runtime kind disagreed with the schema's declared witness.
    #[error("feature {feature_id:?} expected a {expected} value but found {found}")]
    TypeMismatch {
        /// The offending feature id.
        feature_id: String,
        /// The schema-declared kind.
        expected: crate::core::value::ValueKind,
        /// The kind actually found.
        found: crate::core::value::ValueKind,
    },
    /// A rule's `ramp_up` fell outside `[0.0, 100.0]`.
    #[error("feature {feature_id:?} has a rule with ramp_up {ramp_up} outside [0, 100]")]
    InvalidRampUp {
        /// The offending feature id.
        feature_id: String,
        /// The out-of-range ramp-up value.
        ramp_up: f64,
    },
}

// ============================================================================
// SECTION: MaterializedConfiguration
// ============================================================================

/// A [`Configuration`] that has been validated against a specific
/// [`CompiledSchema`] and is therefore safe to load into a
/// `NamespaceRegistry`.
#[derive(Debug, Clone)]
pub struct MaterializedConfiguration {
    /// The validated configuration.
    configuration: Configuration,
    /// The namespace id of the schema this was validated against.
    namespace_id: String,
}

impl MaterializedConfiguration {
    /// The namespace id this snapshot was validated against.
    #[must_use]
    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    /// Borrows the underlying validated configuration.
    #[must_use]
    pub const fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Looks up a feature's definition by id.
    #[must_use]
    pub fn flag(&self, feature_id: &FeatureId) -> Option<&FlagDefinition> {
        self.configuration.flag(feature_id)
    }

    /// Provenance metadata of the underlying configuration.
    #[must_use]
    pub const fn metadata(&self) -> &ConfigurationMetadata {
        self.configuration.metadata()
    }
}

/// Indexes feature ids to positions; used by callers that need random
/// access into a large configuration's entries without a linear scan.
#[must_use]
pub fn index_by_feature_id(configuration: &Configuration) -> HashMap<String, usize> {
    configuration
        .entries()
        .iter()
        .enumerate()
        .map(|(position, (feature_id, _))| (feature_id.canonical(), position))
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test fixtures")]
mod tests {
    use std::collections::BTreeSet;

    use super::Configuration;
    use super::ConfigurationMetadata;
    use super::ValidationError;
    use crate::core::flag::FlagDefinition;
    use crate::core::identifiers::FeatureId;
    use crate::core::schema::CompiledSchema;
    use crate::core::schema::FeatureEntry;
    use crate::core::value::FlagValue;
    use crate::core::value::ValueKind;

    fn schema_with_one_boolean_feature(feature_id: FeatureId) -> CompiledSchema {
        let declared_flag = FlagDefinition::new(
            feature_id.clone(),
            FlagValue::Boolean(false),
            vec![],
            "v1",
            true,
            BTreeSet::new(),
        );
        let entries = vec![FeatureEntry::new(
            feature_id.clone(),
            ValueKind::Boolean,
            FlagValue::Boolean(false),
            declared_flag,
        )];
        CompiledSchema::build(feature_id.namespace_id().to_string(), entries).expect("valid schema")
    }

    #[test]
    fn validate_accepts_matching_configuration() {
        let feature_id = FeatureId::new("app", "darkMode");
        let schema = schema_with_one_boolean_feature(feature_id.clone());
        let flag = FlagDefinition::new(
            feature_id.clone(),
            FlagValue::Boolean(true),
            vec![],
            "v1",
            true,
            BTreeSet::new(),
        );
        let configuration = Configuration::new(vec![(feature_id, flag)], ConfigurationMetadata::default());
        assert!(configuration.validate(&schema).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_feature() {
        let declared_id = FeatureId::new("app", "darkMode");
        let schema = schema_with_one_boolean_feature(declared_id);
        let unknown_id = FeatureId::new("app", "otherFlag");
        let flag = FlagDefinition::new(
            unknown_id.clone(),
            FlagValue::Boolean(true),
            vec![],
            "v1",
            true,
            BTreeSet::new(),
        );
        let configuration = Configuration::new(vec![(unknown_id, flag)], ConfigurationMetadata::default());
        assert!(matches!(
            configuration.validate(&schema),
            Err(ValidationError::UnknownFeature(_))
        ));
    }

    #[test]
    fn validate_rejects_type_mismatch() {
        let feature_id = FeatureId::new("app", "darkMode");
        let schema = schema_with_one_boolean_feature(feature_id.clone());
        let flag = FlagDefinition::new(
            feature_id.clone(),
            FlagValue::String("oops".to_string()),
            vec![],
            "v1",
            true,
            BTreeSet::new(),
        );
        let configuration = Configuration::new(vec![(feature_id, flag)], ConfigurationMetadata::default());
        assert!(matches!(
            configuration.validate(&schema),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }
}

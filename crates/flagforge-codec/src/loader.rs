// flagforge-codec/src/loader.rs
// ============================================================================
// Module: FlagForge Namespace Snapshot Loader
// Description: A convenience composing decode + NamespaceRegistry::load.
// Purpose: Give callers a single call that turns wire JSON directly into a
//          loaded, active snapshot, per §6.2's library surface.
// Dependencies: flagforge-core
// ============================================================================

//! ## Overview
//! [`NamespaceSnapshotLoader`] does not hold any state of its own beyond a
//! borrow of the registry it targets; it exists purely to spare callers
//! the two-step `decode` then `load` dance at every call site.

use thiserror::Error;

use flagforge_core::NamespaceRegistry;
use flagforge_core::RegistryError;

use crate::decode::decode;
use crate::error::ParseError;
use crate::options::DecodeOptions;

/// Errors raised while loading a wire snapshot into a registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoaderError {
    /// The payload failed to decode against the registry's schema.
    #[error(transparent)]
    Decode(#[from] ParseError),
    /// The decoded snapshot was rejected by the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Composes [`crate::decode::decode`] and [`NamespaceRegistry::load`]
/// against one registry.
pub struct NamespaceSnapshotLoader<'a> {
    /// The registry this loader decodes and loads snapshots into.
    registry: &'a NamespaceRegistry,
}

impl<'a> NamespaceSnapshotLoader<'a> {
    /// Targets `registry`; decodes will be validated against its schema.
    #[must_use]
    pub const fn new(registry: &'a NamespaceRegistry) -> Self {
        Self { registry }
    }

    /// Decodes `json` against the target registry's schema and loads it.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Decode`] on a decode failure (the registry's
    /// active snapshot is left untouched) or [`LoaderError::Registry`] if
    /// the decoded snapshot was validated against a different namespace.
    pub fn load(&self, json: &str, options: &DecodeOptions) -> Result<(), LoaderError> {
        let materialized = decode(json, self.registry.schema(), options)?;
        self.registry.load(materialized)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test fixtures")]
mod tests {
    use std::collections::BTreeSet;

    use flagforge_core::CompiledSchema;
    use flagforge_core::Configuration;
    use flagforge_core::ConfigurationMetadata;
    use flagforge_core::FeatureEntry;
    use flagforge_core::FeatureId;
    use flagforge_core::FlagDefinition;
    use flagforge_core::FlagValue;
    use flagforge_core::NamespaceRegistry;
    use flagforge_core::ValueKind;

    use super::LoaderError;
    use super::NamespaceSnapshotLoader;
    use crate::error::ParseError;
    use crate::options::DecodeOptions;

    #[test]
    fn load_composes_decode_and_registry_load() {
        let feature_id = FeatureId::new("app", "darkMode");
        let declared_flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(false), vec![], "v1", true, BTreeSet::new());
        let schema = CompiledSchema::build(
            "app",
            vec![FeatureEntry::new(feature_id.clone(), ValueKind::Boolean, FlagValue::Boolean(false), declared_flag.clone())],
        )
        .expect("valid schema");
        let initial = Configuration::new(vec![(feature_id.clone(), declared_flag)], ConfigurationMetadata::default())
            .validate(&schema)
            .expect("valid configuration");
        let registry = NamespaceRegistry::with_defaults(schema, initial).expect("valid namespace");

        let loader = NamespaceSnapshotLoader::new(&registry);
        let json = r#"{"flags": [{"key": "app::darkMode", "defaultValue": {"type": "BOOLEAN", "value": true}}]}"#;
        loader.load(json, &DecodeOptions::default()).expect("loads successfully");

        assert_eq!(registry.current_configuration().flag(&feature_id).expect("present").default_value(), &FlagValue::Boolean(true));
    }

    #[test]
    fn decode_failure_leaves_registry_untouched() {
        let feature_id = FeatureId::new("app", "darkMode");
        let declared_flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(false), vec![], "v1", true, BTreeSet::new());
        let schema = CompiledSchema::build(
            "app",
            vec![FeatureEntry::new(feature_id.clone(), ValueKind::Boolean, FlagValue::Boolean(false), declared_flag.clone())],
        )
        .expect("valid schema");
        let initial = Configuration::new(vec![(feature_id.clone(), declared_flag)], ConfigurationMetadata::default())
            .validate(&schema)
            .expect("valid configuration");
        let registry = NamespaceRegistry::with_defaults(schema, initial).expect("valid namespace");

        let loader = NamespaceSnapshotLoader::new(&registry);
        let err = loader.load("{not json", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, LoaderError::Decode(ParseError::InvalidJson { .. })));
        assert_eq!(registry.current_configuration().flag(&feature_id).expect("present").default_value(), &FlagValue::Boolean(false));
    }
}

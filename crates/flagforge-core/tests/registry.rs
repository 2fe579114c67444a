// flagforge-core/tests/registry.rs
// ============================================================================
// Module: NamespaceRegistry Cross-Module Tests
// Description: Load/rollback/history-limit coverage per §8 scenario 7.
// Purpose: Validate the registry's atomic swap and bounded rollback
//          protocol end to end.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use flagforge_core::CompiledSchema;
use flagforge_core::Configuration;
use flagforge_core::ConfigurationMetadata;
use flagforge_core::FeatureEntry;
use flagforge_core::FeatureId;
use flagforge_core::FlagDefinition;
use flagforge_core::FlagValue;
use flagforge_core::MaterializedConfiguration;
use flagforge_core::NamespaceRegistry;
use flagforge_core::RegistryHooks;
use flagforge_core::ValueKind;

fn schema() -> CompiledSchema {
    let feature_id = FeatureId::new("app", "darkMode");
    let declared_flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(false), vec![], "v1", true, BTreeSet::new());
    CompiledSchema::build(
        "app",
        vec![FeatureEntry::new(feature_id, ValueKind::Boolean, FlagValue::Boolean(false), declared_flag)],
    )
    .expect("valid schema")
}

fn config_with_default(schema: &CompiledSchema, default: bool, version: &str) -> MaterializedConfiguration {
    let feature_id = FeatureId::new("app", "darkMode");
    let flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(default), vec![], "v1", true, BTreeSet::new());
    let metadata = ConfigurationMetadata { version: Some(version.to_string()), ..ConfigurationMetadata::default() };
    Configuration::new(vec![(feature_id, flag)], metadata)
        .validate(schema)
        .expect("valid configuration")
}

#[test]
fn rollback_restores_prior_snapshot_then_fails_when_exhausted() {
    let schema = schema();
    let a = config_with_default(&schema, true, "a");
    let registry = NamespaceRegistry::with_defaults(schema.clone(), a).expect("valid namespace");

    let b = config_with_default(&schema, false, "b");
    registry.load(b).expect("same namespace");
    assert_eq!(registry.current_configuration().metadata().version.as_deref(), Some("b"));

    assert!(registry.rollback(1));
    assert_eq!(registry.current_configuration().metadata().version.as_deref(), Some("a"));

    assert!(!registry.rollback(1));
    assert_eq!(registry.current_configuration().metadata().version.as_deref(), Some("a"));
}

#[test]
fn parse_rejection_leaves_active_snapshot_consistent() {
    // Models §8 scenario 6: a registry only ever accepts a fully
    // validated MaterializedConfiguration, so a rejected decode never
    // reaches `load` and the previously active snapshot stays in force.
    let schema = schema();
    let a = config_with_default(&schema, true, "a");
    let registry = NamespaceRegistry::with_defaults(schema.clone(), a).expect("valid namespace");

    let bad_flag = FlagDefinition::new(
        FeatureId::new("app", "darkMode"),
        FlagValue::String("not-a-bool".to_string()),
        vec![],
        "v1",
        true,
        BTreeSet::new(),
    );
    let bad_config = Configuration::new(
        vec![(FeatureId::new("app", "darkMode"), bad_flag)],
        ConfigurationMetadata::default(),
    );
    assert!(bad_config.validate(&schema).is_err());
    assert_eq!(registry.current_configuration().metadata().version.as_deref(), Some("a"));
}

#[derive(Default)]
struct CountingHooks {
    loads: AtomicUsize,
}

impl RegistryHooks for CountingHooks {
    fn on_load(&self, _old: Option<&MaterializedConfiguration>, _new: &MaterializedConfiguration) {
        self.loads.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn history_length_never_exceeds_configured_limit() {
    let schema = schema();
    let hooks = Arc::new(CountingHooks::default());
    let registry = NamespaceRegistry::new(schema.clone(), config_with_default(&schema, true, "0"), 3, hooks.clone())
        .expect("valid namespace");

    for generation in 1..=10 {
        registry.load(config_with_default(&schema, generation % 2 == 0, &generation.to_string())).expect("same namespace");
    }

    assert_eq!(hooks.loads.load(Ordering::SeqCst), 10);
    for _ in 0..3 {
        assert!(registry.rollback(1));
    }
    assert!(!registry.rollback(1));
}

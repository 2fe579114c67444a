// flagforge-core/tests/evaluator_scenarios.rs
// ============================================================================
// Module: Evaluator Scenario Tests
// Description: Literal evaluation scenarios against the public API.
// Purpose: Exercise platform targeting, specificity ordering, and the kill
//          switch end to end through NamespaceRegistry.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use std::collections::BTreeSet;

use flagforge_core::CompiledSchema;
use flagforge_core::Configuration;
use flagforge_core::ConfigurationMetadata;
use flagforge_core::EvaluationMode;
use flagforge_core::FeatureEntry;
use flagforge_core::FeatureId;
use flagforge_core::FlagDefinition;
use flagforge_core::FlagValue;
use flagforge_core::NamespaceRegistry;
use flagforge_core::Rule;
use flagforge_core::RuleSpec;
use flagforge_core::StableId;
use flagforge_core::StaticContext;
use flagforge_core::ValueKind;
use flagforge_core::Version;
use flagforge_core::VersionRange;

fn single_feature_schema(feature_id: FeatureId, kind: ValueKind, default: FlagValue) -> CompiledSchema {
    let declared_flag = FlagDefinition::new(feature_id.clone(), default.clone(), vec![], "v1", true, BTreeSet::new());
    CompiledSchema::build(
        feature_id.namespace_id().to_string(),
        vec![FeatureEntry::new(feature_id, kind, default, declared_flag)],
    )
    .expect("valid schema")
}

#[test]
fn platform_targeting_resolves_per_scenario_two() {
    let feature_id = FeatureId::new("app", "darkMode");
    let schema = single_feature_schema(feature_id.clone(), ValueKind::Boolean, FlagValue::Boolean(false));

    let mut ios_spec = RuleSpec::unconstrained();
    ios_spec.platforms.insert("IOS".to_string());
    let rule = Rule::new(FlagValue::Boolean(true), ios_spec);

    let flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(false), vec![rule], "v1", true, BTreeSet::new());
    let config = Configuration::new(vec![(feature_id.clone(), flag)], ConfigurationMetadata::default());
    let materialized = config.validate(&schema).expect("valid configuration");
    let registry = NamespaceRegistry::with_defaults(schema, materialized).expect("valid namespace");

    let ios = StaticContext::builder(StableId::from_raw_bytes(b"u1")).platform("IOS").build();
    let android = StaticContext::builder(StableId::from_raw_bytes(b"u1")).platform("ANDROID").build();

    assert_eq!(
        registry.evaluate(&feature_id, &ios, EvaluationMode::Normal).expect("present").value,
        FlagValue::Boolean(true)
    );
    assert_eq!(
        registry.evaluate(&feature_id, &android, EvaluationMode::Normal).expect("present").value,
        FlagValue::Boolean(false)
    );
}

#[test]
fn specificity_wins_over_rampup_per_scenario_four() {
    let feature_id = FeatureId::new("app", "theme");
    let schema = single_feature_schema(feature_id.clone(), ValueKind::String, FlagValue::String("v1".to_string()));

    let mut r1_spec = RuleSpec::unconstrained();
    r1_spec.platforms.insert("IOS".to_string());
    r1_spec.version_range = VersionRange::MinOnly(Version::new(3, 0, 0));
    let r1 = Rule::new(FlagValue::String("v3".to_string()), r1_spec);

    let mut r2_spec = RuleSpec::unconstrained();
    r2_spec.platforms.insert("IOS".to_string());
    let r2 = Rule::new(FlagValue::String("v2".to_string()), r2_spec);

    let flag = FlagDefinition::new(
        feature_id.clone(),
        FlagValue::String("v1".to_string()),
        vec![r1, r2],
        "v1",
        true,
        BTreeSet::new(),
    );
    let config = Configuration::new(vec![(feature_id.clone(), flag)], ConfigurationMetadata::default());
    let materialized = config.validate(&schema).expect("valid configuration");
    let registry = NamespaceRegistry::with_defaults(schema, materialized).expect("valid namespace");

    let newer = StaticContext::builder(StableId::from_raw_bytes(b"u1")).platform("IOS").version(Version::new(3, 1, 0)).build();
    let older = StaticContext::builder(StableId::from_raw_bytes(b"u1")).platform("IOS").version(Version::new(2, 0, 0)).build();

    assert_eq!(
        registry.evaluate(&feature_id, &newer, EvaluationMode::Normal).expect("present").value,
        FlagValue::String("v3".to_string())
    );
    assert_eq!(
        registry.evaluate(&feature_id, &older, EvaluationMode::Normal).expect("present").value,
        FlagValue::String("v2".to_string())
    );
}

#[test]
fn kill_switch_overrides_every_rule_per_scenario_five() {
    let feature_id = FeatureId::new("app", "darkMode");
    let schema = single_feature_schema(feature_id.clone(), ValueKind::Boolean, FlagValue::Boolean(false));
    let rule = Rule::new(FlagValue::Boolean(true), RuleSpec::unconstrained());
    let flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(false), vec![rule], "v1", true, BTreeSet::new());
    let config = Configuration::new(vec![(feature_id.clone(), flag)], ConfigurationMetadata::default());
    let materialized = config.validate(&schema).expect("valid configuration");
    let registry = NamespaceRegistry::with_defaults(schema, materialized).expect("valid namespace");
    let context = StaticContext::builder(StableId::from_raw_bytes(b"u1")).build();

    assert_eq!(
        registry.evaluate(&feature_id, &context, EvaluationMode::Normal).expect("present").value,
        FlagValue::Boolean(true)
    );

    registry.disable_all();
    assert_eq!(
        registry.evaluate(&feature_id, &context, EvaluationMode::Normal).expect("present").value,
        FlagValue::Boolean(false)
    );

    registry.enable_all();
    assert_eq!(
        registry.evaluate(&feature_id, &context, EvaluationMode::Normal).expect("present").value,
        FlagValue::Boolean(true)
    );
}

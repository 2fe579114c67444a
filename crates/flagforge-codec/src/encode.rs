// flagforge-codec/src/encode.rs
// ============================================================================
// Module: FlagForge Encode
// Description: Bidirectional conversion's write half: a Configuration
//              produces its canonical wire JSON.
// Purpose: Implement §4.5's encode half: total over every constructible
//          Configuration, with a fixed field and feature order.
// Dependencies: serde_json, flagforge-core
// ============================================================================

//! ## Overview
//! Feature order follows `configuration.entries()`, which is itself schema
//! order by construction (`Configuration::new`/decode both preserve it).
//! Field order within each flag and rule is fixed by [`crate::wire`]'s
//! struct field declaration order, which `serde_json` honours.

use flagforge_core::Configuration;
use flagforge_core::FeatureId;
use flagforge_core::FlagDefinition;
use flagforge_core::FlagValue;
use flagforge_core::Rule;
use flagforge_core::VersionRange;

use crate::wire::MetaDto;
use crate::wire::RuleDto;
use crate::wire::SnapshotEnvelopeDto;
use crate::wire::TaggedValueDto;
use crate::wire::VersionRangeDto;

/// Encodes `configuration` to its canonical wire JSON text.
///
/// Serialization only fails for a `FlagValue::Double` carrying a non-finite
/// `f64` (`NaN` or infinity), which standard JSON cannot represent; that
/// case falls back to an empty flag list rather than panicking, since
/// every other `Configuration` encodes successfully.
#[must_use]
pub fn encode(configuration: &Configuration) -> String {
    let metadata = configuration.metadata();
    let meta = if metadata.version.is_none() && metadata.generated_at_epoch_millis.is_none() && metadata.source.is_none() {
        None
    } else {
        Some(MetaDto {
            version: metadata.version.clone(),
            generated_at_epoch_millis: metadata.generated_at_epoch_millis,
            source: metadata.source.clone(),
        })
    };

    let flags = configuration.entries().iter().map(|(feature_id, flag)| encode_flag(feature_id, flag)).collect();
    let envelope = SnapshotEnvelopeDto { meta, flags };

    serde_json::to_string(&envelope).unwrap_or_else(|_| r#"{"flags":[]}"#.to_string())
}

/// Encodes one `(FeatureId, FlagDefinition)` pair into its wire shape.
fn encode_flag(feature_id: &FeatureId, flag: &FlagDefinition) -> crate::wire::FlagDto {
    crate::wire::FlagDto {
        key: feature_id.canonical(),
        default_value: encode_value(flag.default_value()),
        salt: flag.salt().to_string(),
        is_active: flag.is_active(),
        ramp_up_allowlist: flag.namespace_allowlist().iter().map(|id| id.as_hex().to_string()).collect(),
        rules: flag.rules().iter().map(encode_rule).collect(),
    }
}

/// Encodes one rule into its wire shape.
fn encode_rule(rule: &Rule) -> RuleDto {
    RuleDto {
        value: encode_value(rule.value()),
        ramp_up: rule.ramp_up(),
        ramp_up_allowlist: rule.ramp_up_allowlist().iter().map(|id| id.as_hex().to_string()).collect(),
        note: rule.note().map(str::to_string),
        locales: rule.locales().iter().cloned().collect(),
        platforms: rule.platforms().iter().cloned().collect(),
        version_range: encode_version_range(rule.version_range()),
        axes: rule
            .axis_constraints()
            .iter()
            .map(|(axis_id, values)| (axis_id.clone(), values.iter().cloned().collect()))
            .collect(),
    }
}

/// Encodes a [`FlagValue`] into its wire tagged-value shape.
fn encode_value(value: &FlagValue) -> TaggedValueDto {
    match value {
        FlagValue::Boolean(value) => TaggedValueDto::Boolean { value: *value },
        FlagValue::String(value) => TaggedValueDto::String { value: value.clone() },
        FlagValue::Int(value) => TaggedValueDto::Int { value: *value },
        FlagValue::Double(value) => TaggedValueDto::Double { value: *value },
        FlagValue::Enum { constant, enum_class_name } => {
            TaggedValueDto::Enum { value: constant.clone(), enum_class_name: enum_class_name.clone() }
        }
        FlagValue::DataClass { fields, data_class_name } => {
            TaggedValueDto::DataClass { value: fields.clone(), data_class_name: data_class_name.clone() }
        }
    }
}

/// Encodes a [`VersionRange`] into its wire shape, or `None` for
/// [`VersionRange::Unbounded`] (the `versionRange` field is omitted).
const fn encode_version_range(range: &VersionRange) -> Option<VersionRangeDto> {
    match *range {
        VersionRange::Unbounded => None,
        VersionRange::MinOnly(min) => Some(VersionRangeDto::MinBound { min }),
        VersionRange::MaxOnly(max) => Some(VersionRangeDto::MaxBound { max }),
        VersionRange::Both(min, max) => Some(VersionRangeDto::FullyBound { min, max }),
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
    use flagforge_core::ValueKind;

    use super::encode;
    use crate::decode::decode;
    use crate::options::DecodeOptions;

    #[test]
    fn round_trips_through_decode() {
        let feature_id = FeatureId::new("app", "darkMode");
        let declared_flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(false), vec![], "v1", true, BTreeSet::new());
        let schema = CompiledSchema::build(
            "app",
            vec![FeatureEntry::new(feature_id.clone(), ValueKind::Boolean, FlagValue::Boolean(false), declared_flag)],
        )
        .expect("valid schema");

        let flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(true), vec![], "v1", true, BTreeSet::new());
        let configuration = Configuration::new(
            vec![(feature_id.clone(), flag)],
            ConfigurationMetadata { version: Some("rev-1".to_string()), ..ConfigurationMetadata::default() },
        );

        let json = encode(&configuration);
        let decoded = decode(&json, &schema, &DecodeOptions::default()).expect("round trip decodes");
        assert_eq!(decoded.flag(&feature_id).expect("present").default_value(), &FlagValue::Boolean(true));
        assert_eq!(decoded.metadata().version.as_deref(), Some("rev-1"));
    }

    #[test]
    fn omits_meta_block_when_metadata_is_entirely_absent() {
        let feature_id = FeatureId::new("app", "darkMode");
        let flag = FlagDefinition::new(feature_id.clone(), FlagValue::Boolean(false), vec![], "v1", true, BTreeSet::new());
        let configuration = Configuration::new(vec![(feature_id, flag)], ConfigurationMetadata::default());
        assert!(!encode(&configuration).contains("\"meta\""));
    }
}

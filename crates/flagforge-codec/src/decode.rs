// flagforge-codec/src/decode.rs
// ============================================================================
// Module: FlagForge Decode
// Description: Bidirectional conversion's read half: wire JSON + a
//              CompiledSchema produce a MaterializedConfiguration.
// Purpose: Implement the decode state machine: START -> JSON_PARSED ->
//          FLAGS_VALIDATED -> (DECLARED_GAPS_RESOLVED) -> MATERIALIZED,
//          with any stage able to fail to FAILED(ParseError).
// Dependencies: serde_json, flagforge-core
// ============================================================================

//! ## Overview
//! A failed decode never mutates anything the caller can observe: every
//! intermediate value here is owned locally and only the final, fully
//! validated [`MaterializedConfiguration`] is returned. Callers typically
//! reach this through [`crate::loader::NamespaceSnapshotLoader`] rather
//! than directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::HashMap;

use serde_json::Value as JsonValue;

use flagforge_core::CompiledSchema;
use flagforge_core::Configuration;
use flagforge_core::ConfigurationMetadata;
use flagforge_core::FeatureEntry;
use flagforge_core::FeatureId;
use flagforge_core::FlagDefinition;
use flagforge_core::FlagValue;
use flagforge_core::MaterializedConfiguration;
use flagforge_core::Rule;
use flagforge_core::RuleSpec;
use flagforge_core::StableId;
use flagforge_core::VersionRange;

use crate::error::ParseError;
use crate::options::DecodeOptions;
use crate::options::MissingDeclaredFlagStrategy;
use crate::options::UnknownFeatureKeyStrategy;
use crate::options::UnknownFieldStrategy;
use crate::wire::FlagDto;
use crate::wire::RuleDto;
use crate::wire::SnapshotEnvelopeDto;
use crate::wire::TaggedValueDto;
use crate::wire::VersionRangeDto;

// ============================================================================
// SECTION: Entry point
// ============================================================================

/// Decodes `json` against `schema`, applying `options`'s leniency.
///
/// # Errors
///
/// Returns [`ParseError::InvalidJson`] on syntactically invalid JSON;
/// [`ParseError::InvalidSnapshot`] on structurally valid JSON that
/// violates the wire contract or a schema invariant;
/// [`ParseError::FeatureNotFound`] on an undeclared key under strict
/// options; [`ParseError::InvalidHexId`] or [`ParseError::InvalidRollout`]
/// on a malformed field.
pub fn decode(
    json: &str,
    schema: &CompiledSchema,
    options: &DecodeOptions,
) -> Result<MaterializedConfiguration, ParseError> {
    let root: JsonValue = serde_json::from_str(json).map_err(|error| ParseError::InvalidJson {
        reason: error.to_string(),
        namespace_id: schema.namespace_id().to_string(),
    })?;

    reject_unknown_top_level_fields(&root, options)?;

    let envelope: SnapshotEnvelopeDto =
        serde_json::from_value(root).map_err(|error| ParseError::InvalidSnapshot(error.to_string()))?;

    let mut decoded = HashMap::with_capacity(envelope.flags.len());
    for flag in envelope.flags {
        if let Some((feature_id, flag)) = decode_flag(flag, schema, options)? {
            decoded.insert(feature_id.canonical(), (feature_id, flag));
        }
    }

    let mut entries = Vec::with_capacity(schema.entries().len());
    for entry in schema.entries() {
        let canonical = entry.feature_id().canonical();
        if let Some(decoded_entry) = decoded.remove(&canonical) {
            entries.push(decoded_entry);
        } else {
            match options.missing_declared_flag_strategy {
                MissingDeclaredFlagStrategy::Strict => {
                    return Err(ParseError::InvalidSnapshot(format!(
                        "declared feature {canonical:?} is missing from the payload"
                    )));
                }
                MissingDeclaredFlagStrategy::Permissive => {
                    entries.push((entry.feature_id().clone(), entry.declared_flag().clone()));
                }
            }
        }
    }

    let metadata = envelope.meta.map_or_else(ConfigurationMetadata::default, |meta| ConfigurationMetadata {
        version: meta.version,
        generated_at_epoch_millis: meta.generated_at_epoch_millis,
        source: meta.source,
    });

    Configuration::new(entries, metadata)
        .validate(schema)
        .map_err(|error| ParseError::InvalidSnapshot(error.to_string()))
}

/// Rejects any top-level field other than `meta`/`flags` under
/// [`UnknownFieldStrategy::Reject`].
fn reject_unknown_top_level_fields(root: &JsonValue, options: &DecodeOptions) -> Result<(), ParseError> {
    if options.unknown_field_strategy != UnknownFieldStrategy::Reject {
        return Ok(());
    }
    let JsonValue::Object(map) = root else {
        return Err(ParseError::InvalidSnapshot("top-level payload must be a JSON object".to_string()));
    };
    for key in map.keys() {
        if key != "meta" && key != "flags" {
            return Err(ParseError::InvalidSnapshot(format!("unknown top-level field {key:?}")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Flag decoding
// ============================================================================

/// Decodes one wire flag into a `(FeatureId, FlagDefinition)`, or `None`
/// if it was skipped under a lenient unknown-key strategy.
fn decode_flag(
    dto: FlagDto,
    schema: &CompiledSchema,
    options: &DecodeOptions,
) -> Result<Option<(FeatureId, FlagDefinition)>, ParseError> {
    let feature_id = FeatureId::parse(&dto.key)
        .map_err(|error| ParseError::InvalidSnapshot(format!("invalid feature key {:?}: {error}", dto.key)))?;

    let Some(entry) = schema.entry(&feature_id) else {
        return match options.unknown_feature_key_strategy {
            UnknownFeatureKeyStrategy::Strict => Err(ParseError::FeatureNotFound(feature_id.canonical())),
            UnknownFeatureKeyStrategy::Lenient => {
                options.warn(&format!("skipping undeclared feature {}", feature_id.canonical()));
                Ok(None)
            }
        };
    };

    let default_value = decode_tagged_value(dto.default_value, entry)?;
    check_kind(&default_value, entry)?;

    let mut rules = Vec::with_capacity(dto.rules.len());
    for rule_dto in dto.rules {
        rules.push(decode_rule(rule_dto, entry)?);
    }

    let ramp_up_allowlist = decode_stable_ids(dto.ramp_up_allowlist)?;

    let flag = FlagDefinition::new(feature_id.clone(), default_value, rules, dto.salt, dto.is_active, ramp_up_allowlist);
    Ok(Some((feature_id, flag)))
}

/// Checks that `value`'s runtime kind agrees with `entry`'s declared kind.
fn check_kind(value: &FlagValue, entry: &FeatureEntry) -> Result<(), ParseError> {
    if value.kind() == entry.value_kind() {
        Ok(())
    } else {
        Err(ParseError::InvalidSnapshot(format!(
            "feature {} expected a {} value but found {}",
            entry.feature_id(),
            entry.value_kind(),
            value.kind()
        )))
    }
}

/// Decodes a wire tagged value into a [`FlagValue`], validating its class
/// name and, for `DATA_CLASS`, running the schema's declared decoder.
fn decode_tagged_value(dto: TaggedValueDto, entry: &FeatureEntry) -> Result<FlagValue, ParseError> {
    match dto {
        TaggedValueDto::Boolean { value } => Ok(FlagValue::Boolean(value)),
        TaggedValueDto::String { value } => Ok(FlagValue::String(value)),
        TaggedValueDto::Int { value } => Ok(FlagValue::Int(value)),
        TaggedValueDto::Double { value } => Ok(FlagValue::Double(value)),
        TaggedValueDto::Enum { value, enum_class_name } => {
            check_class_name(entry, &enum_class_name)?;
            Ok(FlagValue::Enum { constant: value, enum_class_name })
        }
        TaggedValueDto::DataClass { value, data_class_name } => {
            check_class_name(entry, &data_class_name)?;
            let fields = match entry.data_class_decoder() {
                Some(decoder) => decoder(&value).map_err(|error| ParseError::InvalidSnapshot(error.to_string()))?,
                None => value,
            };
            Ok(FlagValue::DataClass { fields, data_class_name })
        }
    }
}

/// Checks `found` against `entry`'s trusted class name, if it declares one.
fn check_class_name(entry: &FeatureEntry, found: &str) -> Result<(), ParseError> {
    match entry.class_name() {
        Some(expected) if expected != found => Err(ParseError::InvalidSnapshot(format!(
            "feature {} declares class name {expected:?} but payload carries {found:?}",
            entry.feature_id()
        ))),
        _ => Ok(()),
    }
}

// ============================================================================
// SECTION: Rule decoding
// ============================================================================

/// Decodes one wire rule, validating its ramp-up range and allowlist ids.
fn decode_rule(dto: RuleDto, entry: &FeatureEntry) -> Result<Rule, ParseError> {
    let value = decode_tagged_value(dto.value, entry)?;
    check_kind(&value, entry)?;

    if !(0.0..=100.0).contains(&dto.ramp_up) {
        return Err(ParseError::InvalidRollout {
            value: dto.ramp_up,
            reason: "ramp_up must fall within [0, 100]".to_string(),
        });
    }

    let ramp_up_allowlist = decode_stable_ids(dto.ramp_up_allowlist)?;
    let locales = dto.locales.into_iter().collect::<BTreeSet<_>>();
    let platforms = dto.platforms.into_iter().collect::<BTreeSet<_>>();
    let version_range = dto.version_range.map_or(VersionRange::Unbounded, decode_version_range);
    let axis_constraints = dto
        .axes
        .into_iter()
        .map(|(axis_id, values)| (axis_id, values.into_iter().collect::<BTreeSet<_>>()))
        .collect();

    let spec = RuleSpec {
        ramp_up: dto.ramp_up,
        ramp_up_allowlist,
        locales,
        platforms,
        version_range,
        axis_constraints,
        extension: None,
        note: dto.note,
    };
    Ok(Rule::new(value, spec))
}

/// Maps a wire version-range tag onto the corresponding [`VersionRange`].
const fn decode_version_range(dto: VersionRangeDto) -> VersionRange {
    match dto {
        VersionRangeDto::Unbounded => VersionRange::Unbounded,
        VersionRangeDto::MinBound { min } => VersionRange::MinOnly(min),
        VersionRangeDto::MaxBound { max } => VersionRange::MaxOnly(max),
        VersionRangeDto::FullyBound { min, max } => VersionRange::Both(min, max),
    }
}

/// Parses each hex string into a [`StableId`], failing on the first
/// malformed entry.
fn decode_stable_ids(raw: Vec<String>) -> Result<BTreeSet<StableId>, ParseError> {
    raw.into_iter()
        .map(|hex| StableId::from_hex(&hex).map_err(|error| ParseError::InvalidHexId { input: hex, reason: error.to_string() }))
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

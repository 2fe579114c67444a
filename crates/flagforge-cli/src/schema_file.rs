// flagforge-cli/src/schema_file.rs
// ============================================================================
// Module: CLI Schema File
// Description: A small TOML description of a namespace's declared features,
//              compiled into a CompiledSchema.
// Purpose: Give the demo CLI a file-on-disk schema source, since spec.md
//          leaves CompiledSchema construction to the embedding host.
// Dependencies: serde, toml, flagforge-core
// ============================================================================

//! ## Overview
//! `BOOLEAN`, `STRING`, `INT`, `DOUBLE`, and `ENUM` features may be declared
//! this way; `DATA_CLASS` features carry a decoder closure that has no TOML
//! representation, so they are out of scope for this file format and must
//! be assembled in host code instead.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use flagforge_core::CompiledSchema;
use flagforge_core::FeatureEntry;
use flagforge_core::FeatureId;
use flagforge_core::FlagDefinition;
use flagforge_core::FlagValue;
use flagforge_core::SchemaError;

/// The salt every CLI-declared feature starts with; operators rotate it by
/// editing a loaded snapshot, not the schema file.
const DEFAULT_SALT: &str = "v1";

/// Errors raised while loading a [`CompiledSchema`] from a schema file.
#[derive(Debug, Error)]
pub enum SchemaFileError {
    /// The schema file could not be read.
    #[error("schema file io error: {0}")]
    Io(String),
    /// The schema file's TOML was malformed.
    #[error("schema file parse error: {0}")]
    Parse(String),
    /// A feature declared a `kind` this file format does not recognise.
    #[error("feature {key:?} declares unknown kind {kind:?}")]
    UnknownKind {
        /// The offending feature's key.
        key: String,
        /// The unrecognised kind string.
        kind: String,
    },
    /// A feature's `default` value did not match its declared `kind`.
    #[error("feature {key:?} of kind {kind:?} has a default value of the wrong shape")]
    DefaultTypeMismatch {
        /// The offending feature's key.
        key: String,
        /// The feature's declared kind.
        kind: String,
    },
    /// An `enum` feature omitted the required `enum_class_name` field.
    #[error("enum feature {0:?} is missing enum_class_name")]
    MissingEnumClassName(String),
    /// The compiled declarations were rejected by [`CompiledSchema::build`].
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Wire shape of the schema file's top level.
#[derive(Debug, Deserialize)]
struct SchemaFileDto {
    /// The namespace these features belong to.
    namespace_id: String,
    /// The declared features, in declaration order.
    #[serde(default)]
    features: Vec<FeatureFileDto>,
}

/// Wire shape of one declared feature.
#[derive(Debug, Deserialize)]
struct FeatureFileDto {
    /// The feature's local key (joined with `namespace_id` to form its
    /// canonical [`FeatureId`]).
    key: String,
    /// One of `boolean`, `string`, `int`, `double`, or `enum`.
    kind: String,
    /// The default value, in the shape `kind` requires.
    default: toml::Value,
    /// Required when `kind` is `enum`; the trusted enum class name.
    #[serde(default)]
    enum_class_name: Option<String>,
}

/// Loads and compiles the schema declared at `path`.
///
/// # Errors
///
/// Returns [`SchemaFileError`] if the file cannot be read, its TOML is
/// malformed, a feature's `kind`/`default` disagree, an `enum` feature
/// omits `enum_class_name`, or the compiled declarations are rejected by
/// [`CompiledSchema::build`] (for example, a duplicate feature key).
pub fn load_schema(path: &Path) -> Result<CompiledSchema, SchemaFileError> {
    let content = fs::read_to_string(path).map_err(|err| SchemaFileError::Io(err.to_string()))?;
    let dto: SchemaFileDto = toml::from_str(&content).map_err(|err| SchemaFileError::Parse(err.to_string()))?;

    let entries = dto
        .features
        .into_iter()
        .map(|feature| compile_feature(&dto.namespace_id, feature))
        .collect::<Result<Vec<_>, _>>()?;

    CompiledSchema::build(dto.namespace_id, entries).map_err(SchemaFileError::from)
}

/// Compiles one declared feature into a [`FeatureEntry`].
fn compile_feature(namespace_id: &str, feature: FeatureFileDto) -> Result<FeatureEntry, SchemaFileError> {
    let feature_id = FeatureId::new(namespace_id, feature.key.clone());
    let default_value = decode_default(&feature)?;
    let declared_flag = FlagDefinition::new(feature_id.clone(), default_value.clone(), vec![], DEFAULT_SALT, true, BTreeSet::new());

    if feature.kind.eq_ignore_ascii_case("enum") {
        let enum_class_name = feature
            .enum_class_name
            .clone()
            .ok_or_else(|| SchemaFileError::MissingEnumClassName(feature.key.clone()))?;
        return Ok(FeatureEntry::new_enum(feature_id, enum_class_name, default_value, declared_flag));
    }

    let value_kind = match feature.kind.to_ascii_lowercase().as_str() {
        "boolean" => flagforge_core::ValueKind::Boolean,
        "string" => flagforge_core::ValueKind::String,
        "int" => flagforge_core::ValueKind::Int,
        "double" => flagforge_core::ValueKind::Double,
        _ => {
            return Err(SchemaFileError::UnknownKind { key: feature.key.clone(), kind: feature.kind.clone() });
        }
    };
    Ok(FeatureEntry::new(feature_id, value_kind, default_value, declared_flag))
}

/// Decodes a feature's `default` field against its declared `kind`.
fn decode_default(feature: &FeatureFileDto) -> Result<FlagValue, SchemaFileError> {
    let default = &feature.default;
    let mismatch = || SchemaFileError::DefaultTypeMismatch { key: feature.key.clone(), kind: feature.kind.clone() };
    match feature.kind.to_ascii_lowercase().as_str() {
        "boolean" => default.as_bool().map(FlagValue::Boolean).ok_or_else(mismatch),
        "string" => default.as_str().map(|value| FlagValue::String(value.to_string())).ok_or_else(mismatch),
        "int" => default.as_integer().map(FlagValue::Int).ok_or_else(mismatch),
        "double" => default.as_float().map(FlagValue::Double).ok_or_else(mismatch),
        "enum" => {
            let constant = default.as_str().ok_or_else(mismatch)?.to_string();
            let enum_class_name = feature
                .enum_class_name
                .clone()
                .ok_or_else(|| SchemaFileError::MissingEnumClassName(feature.key.clone()))?;
            Ok(FlagValue::Enum { constant, enum_class_name })
        }
        kind => Err(SchemaFileError::UnknownKind { key: feature.key.clone(), kind: kind.to_string() }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

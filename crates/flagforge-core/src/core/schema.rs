// flagforge-core/src/core/schema.rs
// ============================================================================
// Module: FlagForge CompiledSchema
// Description: The static declaration of every feature a namespace owns.
// Purpose: Define the trust boundary the codec decodes against; replaces the
//          source's process-global feature registry (§9, "Global registry
//          → explicit schema").
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`CompiledSchema`] is built once per namespace, at construction time,
//! from an ordered list of [`FeatureEntry`] declarations. It answers two
//! questions during decode: "is this feature id known?" and "what
//! [`ValueKind`] does the wire payload need to carry for it?".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::flag::FlagDefinition;
use crate::core::identifiers::FeatureId;
use crate::core::value::FlagValue;
use crate::core::value::ValueKind;

// ============================================================================
// SECTION: DataClassDecoder
// ============================================================================

/// A typed decoder for `DATA_CLASS` feature payloads.
///
/// Re-architects the source's reflection-based decoding (§9): rather than
/// reading a class name from the payload and instantiating it via
/// reflection, the schema carries one decoder function per `DATA_CLASS`
/// feature. The decoder validates and normalises the raw JSON object;
/// final native-type deserialization remains the caller's responsibility at
/// their own boundary.
pub type DataClassDecoder =
    Arc<dyn Fn(&JsonValue) -> Result<JsonValue, DataClassDecodeError> + Send + Sync>;

/// Raised when a `DATA_CLASS` payload fails its declared decoder.
#[derive(Debug, Error, Clone)]
pub enum DataClassDecodeError {
    /// A required field was missing from the payload.
    #[error("data class payload is missing field {0:?}")]
    MissingField(String),
    /// A field had the wrong JSON shape.
    #[error("data class payload field {0:?} has an unexpected shape")]
    UnexpectedShape(String),
    /// A custom, decoder-specific failure message.
    #[error("data class payload is invalid: {0}")]
    Custom(String),
}

// ============================================================================
// SECTION: FeatureEntry
// ============================================================================

/// One namespace feature's static declaration.
#[derive(Clone)]
pub struct FeatureEntry {
    /// The qualified feature name.
    feature_id: FeatureId,
    /// The value type the wire payload must carry for this feature.
    value_kind: ValueKind,
    /// The declared default value, used to fill gaps under a permissive
    /// [`crate::MissingDeclaredFlagStrategy`].
    declared_default: FlagValue,
    /// The declared `FlagDefinition`, used to fill gaps the same way.
    declared_flag: FlagDefinition,
    /// The trusted class name for `ENUM` or `DATA_CLASS` features.
    class_name: Option<String>,
    /// The decoder for `DATA_CLASS` features; `None` for every other kind.
    data_class_decoder: Option<DataClassDecoder>,
}

impl std::fmt::Debug for FeatureEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureEntry")
            .field("feature_id", &self.feature_id)
            .field("value_kind", &self.value_kind)
            .field("class_name", &self.class_name)
            .field("has_data_class_decoder", &self.data_class_decoder.is_some())
            .finish()
    }
}

impl FeatureEntry {
    /// Builds a declaration for a feature whose kind is not `ENUM` or
    /// `DATA_CLASS`.
    #[must_use]
    pub fn new(
        feature_id: FeatureId,
        value_kind: ValueKind,
        declared_default: FlagValue,
        declared_flag: FlagDefinition,
    ) -> Self {
        Self {
            feature_id,
            value_kind,
            declared_default,
            declared_flag,
            class_name: None,
            data_class_decoder: None,
        }
    }

    /// Builds a declaration for an `ENUM` feature, carrying its trusted
    /// enum class name.
    #[must_use]
    pub fn new_enum(
        feature_id: FeatureId,
        enum_class_name: impl Into<String>,
        declared_default: FlagValue,
        declared_flag: FlagDefinition,
    ) -> Self {
        Self {
            feature_id,
            value_kind: ValueKind::Enum,
            declared_default,
            declared_flag,
            class_name: Some(enum_class_name.into()),
            data_class_decoder: None,
        }
    }

    /// Builds a declaration for a `DATA_CLASS` feature, carrying its
    /// trusted data class name and typed decoder.
    #[must_use]
    pub fn new_data_class(
        feature_id: FeatureId,
        data_class_name: impl Into<String>,
        decoder: DataClassDecoder,
        declared_default: FlagValue,
        declared_flag: FlagDefinition,
    ) -> Self {
        Self {
            feature_id,
            value_kind: ValueKind::DataClass,
            declared_default,
            declared_flag,
            class_name: Some(data_class_name.into()),
            data_class_decoder: Some(decoder),
        }
    }

    /// The qualified feature name.
    #[must_use]
    pub const fn feature_id(&self) -> &FeatureId {
        &self.feature_id
    }

    /// The value type the wire payload must carry for this feature.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    /// The declared default value.
    #[must_use]
    pub const fn declared_default(&self) -> &FlagValue {
        &self.declared_default
    }

    /// The declared `FlagDefinition`.
    #[must_use]
    pub const fn declared_flag(&self) -> &FlagDefinition {
        &self.declared_flag
    }

    /// The trusted class name, for `ENUM` or `DATA_CLASS` features.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// The `DATA_CLASS` decoder, if this entry declares one.
    #[must_use]
    pub fn data_class_decoder(&self) -> Option<&DataClassDecoder> {
        self.data_class_decoder.as_ref()
    }
}

// ============================================================================
// SECTION: CompiledSchema
// ============================================================================

/// Errors raised while building a [`CompiledSchema`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The same feature id was declared more than once.
    #[error("feature id {0:?} is declared more than once in this schema")]
    DuplicateFeatureId(String),
    /// A declared feature id's namespace did not match the schema's own.
    #[error("feature id {feature_id:?} does not belong to namespace {namespace_id:?}")]
    NamespaceMismatch {
        /// The offending feature id.
        feature_id: String,
        /// The schema's namespace id.
        namespace_id: String,
    },
}

/// The static declaration of every feature one namespace owns.
///
/// Built once at namespace construction (§9, "Global registry → explicit
/// schema") and held for the process lifetime; the codec receives it
/// explicitly on every decode rather than consulting process-global state.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    /// The owning namespace id.
    namespace_id: String,
    /// Declarations, in declaration order.
    entries: Vec<FeatureEntry>,
    /// Feature id (canonical string) to index into `entries`.
    index: HashMap<String, usize>,
}

impl CompiledSchema {
    /// Builds a schema from an ordered list of feature declarations.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateFeatureId`] if two entries share a
    /// feature id, or [`SchemaError::NamespaceMismatch`] if an entry's
    /// feature id does not belong to `namespace_id`.
    pub fn build(
        namespace_id: impl Into<String>,
        entries: Vec<FeatureEntry>,
    ) -> Result<Self, SchemaError> {
        let namespace_id = namespace_id.into();
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry.feature_id().namespace_id() != namespace_id {
                return Err(SchemaError::NamespaceMismatch {
                    feature_id: entry.feature_id().canonical(),
                    namespace_id,
                });
            }
            let canonical = entry.feature_id().canonical();
            if index.insert(canonical.clone(), position).is_some() {
                return Err(SchemaError::DuplicateFeatureId(canonical));
            }
        }
        Ok(Self {
            namespace_id,
            entries,
            index,
        })
    }

    /// The owning namespace id.
    #[must_use]
    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    /// Declarations, in declaration order; defines stable encoded output
    /// ordering (§4.5: "feature order follows the schema").
    #[must_use]
    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    /// Looks up a feature's declaration by id.
    #[must_use]
    pub fn entry(&self, feature_id: &FeatureId) -> Option<&FeatureEntry> {
        self.index
            .get(&feature_id.canonical())
            .map(|&position| &self.entries[position])
    }

    /// Returns whether `feature_id` is declared in this schema.
    #[must_use]
    pub fn contains(&self, feature_id: &FeatureId) -> bool {
        self.index.contains_key(&feature_id.canonical())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

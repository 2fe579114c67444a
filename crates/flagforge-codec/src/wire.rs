// flagforge-codec/src/wire.rs
// ============================================================================
// Module: FlagForge Wire DTOs
// Description: The JSON shapes exchanged on the wire, independent of the
//              in-memory core types they decode into and encode from.
// Purpose: Keep serde's derived (de)serialization confined to plain data
//          structs; all validation and construction of core types happens
//          in `decode`/`encode`.
// Dependencies: serde, serde_json, flagforge-core
// ============================================================================

//! ## Overview
//! These DTOs mirror the wire contract field-for-field: camelCase JSON keys,
//! the tagged-value shape for typed payloads, and the four-variant version
//! range shape. None of them carry invariants of their own — a `RuleDto`
//! can describe a ramp-up of `-5.0` perfectly well; rejecting that is
//! [`crate::decode::decode`]'s job.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use flagforge_core::Version;

// ============================================================================
// SECTION: Snapshot envelope
// ============================================================================

/// The top-level wire shape: `{ "meta": {...}?, "flags": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelopeDto {
    /// Optional provenance metadata.
    #[serde(default)]
    pub meta: Option<MetaDto>,
    /// The namespace's flags, in encounter order.
    #[serde(default)]
    pub flags: Vec<FlagDto>,
}

/// Wire shape of [`flagforge_core::ConfigurationMetadata`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaDto {
    /// An opaque version tag for the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The epoch-millisecond generation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "generatedAtEpochMillis")]
    pub generated_at_epoch_millis: Option<i64>,
    /// A free-text provenance description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ============================================================================
// SECTION: Flag
// ============================================================================

/// Wire shape of one flag within `flags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagDto {
    /// The canonical `namespace::local_key` feature id.
    pub key: String,
    /// The value returned when no rule matches.
    #[serde(rename = "defaultValue")]
    pub default_value: TaggedValueDto,
    /// The salt mixed into bucketing; defaults to `"v1"`.
    #[serde(default = "default_salt")]
    pub salt: String,
    /// Whether this flag evaluates rules at all; defaults to `true`.
    #[serde(default = "default_true", rename = "isActive")]
    pub is_active: bool,
    /// Stable ids that bypass ramp-up gating for every rule of this flag.
    #[serde(default, rename = "rampUpAllowlist")]
    pub ramp_up_allowlist: Vec<String>,
    /// Targeting rules, in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleDto>,
}

/// The default salt applied when a wire flag omits `salt`.
fn default_salt() -> String {
    "v1".to_string()
}

/// The default `isActive` value when a wire flag omits it.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Tagged value
// ============================================================================

/// Wire shape of a typed flag value; the `type` tag selects the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaggedValueDto {
    /// `BOOLEAN` tag.
    #[serde(rename = "BOOLEAN")]
    Boolean {
        /// The boolean payload.
        value: bool,
    },
    /// `STRING` tag.
    #[serde(rename = "STRING")]
    String {
        /// The string payload.
        value: String,
    },
    /// `INT` tag.
    #[serde(rename = "INT")]
    Int {
        /// The integer payload.
        value: i64,
    },
    /// `DOUBLE` tag.
    #[serde(rename = "DOUBLE")]
    Double {
        /// The floating-point payload.
        value: f64,
    },
    /// `ENUM` tag; carries the constant name and its trusted class name.
    #[serde(rename = "ENUM")]
    Enum {
        /// The constant's name.
        value: String,
        /// The trusted enum class name.
        #[serde(rename = "enumClassName")]
        enum_class_name: String,
    },
    /// `DATA_CLASS` tag; carries a field map and its trusted class name.
    #[serde(rename = "DATA_CLASS")]
    DataClass {
        /// The field map payload.
        value: JsonValue,
        /// The trusted data class name.
        #[serde(rename = "dataClassName")]
        data_class_name: String,
    },
}

// ============================================================================
// SECTION: Rule
// ============================================================================

/// Wire shape of one targeting rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDto {
    /// The value this rule returns when it wins.
    pub value: TaggedValueDto,
    /// Percentage in `[0, 100]`; defaults to `100`.
    #[serde(default = "default_ramp_up", rename = "rampUp")]
    pub ramp_up: f64,
    /// Stable ids that bypass this rule's ramp-up check.
    #[serde(default, rename = "rampUpAllowlist")]
    pub ramp_up_allowlist: Vec<String>,
    /// An optional free-text annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Locale tags this rule is constrained to.
    #[serde(default)]
    pub locales: Vec<String>,
    /// Platform tags this rule is constrained to.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// The version range this rule is constrained to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "versionRange")]
    pub version_range: Option<VersionRangeDto>,
    /// Per-axis allowed value sets.
    #[serde(default)]
    pub axes: BTreeMap<String, Vec<String>>,
}

/// The default `rampUp` percentage when a wire rule omits it.
const fn default_ramp_up() -> f64 {
    100.0
}

// ============================================================================
// SECTION: Version range
// ============================================================================

/// Wire shape of a rule's version range constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VersionRangeDto {
    /// No bound.
    #[serde(rename = "UNBOUNDED")]
    Unbounded,
    /// Lower-bounded only.
    #[serde(rename = "MIN_BOUND")]
    MinBound {
        /// The inclusive lower bound.
        min: Version,
    },
    /// Upper-bounded only.
    #[serde(rename = "MAX_BOUND")]
    MaxBound {
        /// The inclusive upper bound.
        max: Version,
    },
    /// Bounded on both sides.
    #[serde(rename = "FULLY_BOUND")]
    FullyBound {
        /// The inclusive lower bound.
        min: Version,
        /// The inclusive upper bound.
        max: Version,
    },
}

// flagforge-core/src/core/identifiers.rs
// ============================================================================
// Module: FlagForge Identifiers
// Description: Canonical identifiers for cohorts and features.
// Purpose: Provide strongly typed, serializable IDs with stable canonical forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`StableId`] is the canonical cohort key used to bucket a caller into a
//! percentage ramp-up. [`FeatureId`] is the qualified `namespace::local_key`
//! identifier used everywhere a feature is referenced, including the wire
//! format. Both types are opaque wrappers: equality and hashing operate on
//! the canonical form, never on the input the caller happened to supply.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: StableId
// ============================================================================

/// Canonical binary cohort identifier, stored as lowercase hex.
///
/// Constructed either from raw bytes (hex-encoded on construction) or from an
/// already hex-encoded string. Two `StableId`s are equal iff their canonical
/// hex forms are equal; the type carries no guarantee about what the
/// original bytes represented.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(String);

/// Errors raised while constructing a [`StableId`] from a hex string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexIdError {
    /// The input was empty.
    #[error("hex id must not be empty")]
    Empty,
    /// The input had an odd number of characters.
    #[error("hex id {0:?} has an odd number of characters")]
    OddLength(String),
    /// The input contained a non-hex-digit character.
    #[error("hex id {0:?} contains a non-hex-digit character")]
    NotHex(String),
}

impl StableId {
    /// Builds a `StableId` by hex-encoding arbitrary caller-supplied bytes.
    #[must_use]
    pub fn from_raw_bytes(bytes: &[u8]) -> Self {
        Self(hex_encode(bytes))
    }

    /// Builds a `StableId` from an already hex-encoded string.
    ///
    /// # Errors
    ///
    /// Returns [`HexIdError`] when the input is empty, has an odd length, or
    /// contains a character outside `[0-9a-fA-F]`.
    pub fn from_hex(input: &str) -> Result<Self, HexIdError> {
        if input.is_empty() {
            return Err(HexIdError::Empty);
        }
        if input.len() % 2 != 0 {
            return Err(HexIdError::OddLength(input.to_string()));
        }
        if !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HexIdError::NotHex(input.to_string()));
        }
        Ok(Self(input.to_ascii_lowercase()))
    }

    /// Returns the canonical lowercase hex form.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&[u8]> for StableId {
    fn from(bytes: &[u8]) -> Self {
        Self::from_raw_bytes(bytes)
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: FeatureId
// ============================================================================

/// Qualified feature identifier, rendered canonically as `namespace::local_key`.
///
/// Feature identity is by id, not by reference: two `FeatureId`s with the
/// same namespace and local key are the same feature even if constructed
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId {
    /// Owning namespace identifier.
    namespace_id: String,
    /// Key local to the namespace.
    local_key: String,
}

/// Errors raised while parsing a canonical `FeatureId` string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureIdError {
    /// The input did not contain the `::` separator.
    #[error("feature id {0:?} is missing the \"::\" namespace separator")]
    MissingSeparator(String),
    /// The namespace or local key half was empty.
    #[error("feature id {0:?} has an empty namespace or local key")]
    EmptyComponent(String),
}

impl FeatureId {
    /// Builds a feature id from its namespace and local key parts.
    #[must_use]
    pub fn new(namespace_id: impl Into<String>, local_key: impl Into<String>) -> Self {
        Self {
            namespace_id: namespace_id.into(),
            local_key: local_key.into(),
        }
    }

    /// Parses a canonical `namespace::local_key` string.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureIdError`] when the separator is missing or either
    /// half is empty.
    pub fn parse(canonical: &str) -> Result<Self, FeatureIdError> {
        let Some((namespace_id, local_key)) = canonical.split_once("::") else {
            return Err(FeatureIdError::MissingSeparator(canonical.to_string()));
        };
        if namespace_id.is_empty() || local_key.is_empty() {
            return Err(FeatureIdError::EmptyComponent(canonical.to_string()));
        }
        Ok(Self::new(namespace_id, local_key))
    }

    /// Returns the owning namespace identifier.
    #[must_use]
    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    /// Returns the key local to the namespace.
    #[must_use]
    pub fn local_key(&self) -> &str {
        &self.local_key
    }

    /// Returns the canonical `namespace::local_key` rendering.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}::{}", self.namespace_id, self.local_key)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace_id, self.local_key)
    }
}

impl Serialize for FeatureId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for FeatureId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test fixtures")]
mod tests {
    use super::FeatureId;
    use super::HexIdError;
    use super::StableId;

    #[test]
    fn stable_id_from_raw_bytes_is_lowercase_hex() {
        let id = StableId::from_raw_bytes(&[0xAB, 0x01]);
        assert_eq!(id.as_hex(), "ab01");
    }

    #[test]
    fn stable_id_from_hex_canonicalizes_case() {
        let id = StableId::from_hex("AB01").expect("valid hex");
        assert_eq!(id.as_hex(), "ab01");
    }

    #[test]
    fn stable_id_rejects_odd_length() {
        assert_eq!(StableId::from_hex("abc").unwrap_err(), HexIdError::OddLength("abc".to_string()));
    }

    #[test]
    fn stable_id_rejects_non_hex() {
        assert!(matches!(StableId::from_hex("zz").unwrap_err(), HexIdError::NotHex(_)));
    }

    #[test]
    fn feature_id_round_trips_canonical_form() {
        let id = FeatureId::new("app", "darkMode");
        assert_eq!(id.canonical(), "app::darkMode");
        let parsed = FeatureId::parse(&id.canonical()).expect("valid id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn feature_id_rejects_missing_separator() {
        assert!(FeatureId::parse("appdarkMode").is_err());
    }
}

// flagforge-core/src/core/value.rs
// ============================================================================
// Module: FlagForge Value Representation
// Description: The tagged value union stored and evaluated for every flag.
// Purpose: Collapse the source's deep type parameterisation to one runtime
//          tagged union, matching the wire format's value tags 1:1.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`FlagValue`] is the single representation used for defaults, rule
//! values, and evaluation results. Rather than threading a generic `T`
//! through `Rule`/`FlagDefinition`/`Configuration` (which cannot work once a
//! `Configuration` must hold many features of differing types in one map),
//! every stored value is a `FlagValue`; [`NativeValue`] offers ergonomic
//! native-type extraction at the call site.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Value as JsonValue;

// ============================================================================
// SECTION: ValueKind
// ============================================================================

/// The type witness a [`crate::core::schema::CompiledSchema`] declares for a
/// feature, and that every stored [`FlagValue`] must agree with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `BOOLEAN` wire tag.
    Boolean,
    /// `STRING` wire tag.
    String,
    /// `INT` wire tag.
    Int,
    /// `DOUBLE` wire tag.
    Double,
    /// `ENUM` wire tag; carries the trusted enum class name.
    Enum,
    /// `DATA_CLASS` wire tag; carries the trusted data class name.
    DataClass,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Boolean => "BOOLEAN",
            Self::String => "STRING",
            Self::Int => "INT",
            Self::Double => "DOUBLE",
            Self::Enum => "ENUM",
            Self::DataClass => "DATA_CLASS",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: FlagValue
// ============================================================================

/// A typed value flowing through the evaluation core.
///
/// Mirrors the wire format's tagged-value representation (§6.1) exactly so
/// the codec's decode step is a direct construction, not a lossy projection.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    /// A boolean value.
    Boolean(bool),
    /// A UTF-8 string value.
    String(String),
    /// A signed 64-bit integer value.
    Int(i64),
    /// A 64-bit floating point value.
    Double(f64),
    /// An enum constant, paired with its trusted class name.
    Enum {
        /// The constant's name.
        constant: String,
        /// The trusted enum class name the constant belongs to.
        enum_class_name: String,
    },
    /// A structured value, paired with its trusted class name.
    DataClass {
        /// The decoded field map.
        fields: JsonValue,
        /// The trusted data class name the fields belong to.
        data_class_name: String,
    },
}

impl FlagValue {
    /// Returns the [`ValueKind`] tag for this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::String(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::Enum { .. } => ValueKind::Enum,
            Self::DataClass { .. } => ValueKind::DataClass,
        }
    }
}

// ============================================================================
// SECTION: NativeValue
// ============================================================================

/// Ergonomic native-type extraction from a [`FlagValue`].
///
/// Implemented for the primitive native types that correspond 1:1 to a
/// `FlagValue` variant. `Enum` and `DataClass` have no native counterpart
/// here; callers access those fields directly.
pub trait NativeValue: Sized {
    /// Attempts to extract `Self` from `value`, returning `None` on a kind
    /// mismatch.
    fn from_flag_value(value: &FlagValue) -> Option<Self>;
}

impl NativeValue for bool {
    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        match value {
            FlagValue::Boolean(inner) => Some(*inner),
            _ => None,
        }
    }
}

impl NativeValue for String {
    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        match value {
            FlagValue::String(inner) => Some(inner.clone()),
            _ => None,
        }
    }
}

impl NativeValue for i64 {
    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        match value {
            FlagValue::Int(inner) => Some(*inner),
            _ => None,
        }
    }
}

impl NativeValue for f64 {
    fn from_flag_value(value: &FlagValue) -> Option<Self> {
        match value {
            FlagValue::Double(inner) => Some(*inner),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::FlagValue;
    use super::NativeValue;
    use super::ValueKind;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(FlagValue::Boolean(true).kind(), ValueKind::Boolean);
        assert_eq!(FlagValue::Int(7).kind(), ValueKind::Int);
    }

    #[test]
    fn native_value_extracts_matching_kind() {
        assert_eq!(bool::from_flag_value(&FlagValue::Boolean(true)), Some(true));
        assert_eq!(i64::from_flag_value(&FlagValue::Boolean(true)), None);
    }

    #[test]
    fn native_value_string_clones() {
        let value = FlagValue::String("dark".to_string());
        assert_eq!(String::from_flag_value(&value), Some("dark".to_string()));
    }
}

// flagforge-codec/src/options.rs
// ============================================================================
// Module: FlagForge Decode Options
// Description: Strictness knobs governing how a decode handles payload
//              surprises, plus a caller-supplied warning sink.
// Purpose: Let callers choose strict (reject anything unexpected) or
//          lenient (warn and continue) handling per surprise category.
// Dependencies: std::sync::Arc
// ============================================================================

//! ## Overview
//! Three independent strategies gate three independent kinds of surprise:
//! an encoded key the schema doesn't declare, a declared feature the
//! payload omits, and a top-level field this codec doesn't recognise.
//! `on_warning` receives one message per lenient skip; it is never called
//! on a strict failure, since those already return `Err`.

use std::fmt;
use std::sync::Arc;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// How to handle a flag key present in the payload but absent from the
/// schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFeatureKeyStrategy {
    /// Reject the decode with [`crate::ParseError::FeatureNotFound`].
    #[default]
    Strict,
    /// Warn and skip the offending flag.
    Lenient,
}

/// How to handle a feature declared in the schema but absent from the
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingDeclaredFlagStrategy {
    /// Reject the decode with [`crate::ParseError::InvalidSnapshot`].
    #[default]
    Strict,
    /// Fill the gap from the schema's declared `FlagDefinition`.
    Permissive,
}

/// How to handle a top-level JSON field this codec does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldStrategy {
    /// Reject the decode with [`crate::ParseError::InvalidSnapshot`].
    #[default]
    Reject,
    /// Ignore the field and continue.
    Ignore,
}

// ============================================================================
// SECTION: DecodeOptions
// ============================================================================

/// Options governing [`crate::decode::decode`]'s leniency.
///
/// The default is strict on every axis: unknown keys, missing declared
/// flags, and unrecognised top-level fields all fail the decode.
#[derive(Clone, Default)]
pub struct DecodeOptions {
    /// How to handle an undeclared flag key.
    pub unknown_feature_key_strategy: UnknownFeatureKeyStrategy,
    /// How to handle a declared feature missing from the payload.
    pub missing_declared_flag_strategy: MissingDeclaredFlagStrategy,
    /// How to handle an unrecognised top-level field.
    pub unknown_field_strategy: UnknownFieldStrategy,
    /// Invoked once per lenient skip, with a human-readable message.
    pub on_warning: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl fmt::Debug for DecodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("unknown_feature_key_strategy", &self.unknown_feature_key_strategy)
            .field("missing_declared_flag_strategy", &self.missing_declared_flag_strategy)
            .field("unknown_field_strategy", &self.unknown_field_strategy)
            .field("has_on_warning", &self.on_warning.is_some())
            .finish()
    }
}

impl DecodeOptions {
    /// Emits `message` to the configured warning sink, if any.
    pub(crate) fn warn(&self, message: &str) {
        if let Some(sink) = &self.on_warning {
            sink(message);
        }
    }
}

// flagforge-codec/src/error.rs
// ============================================================================
// Module: FlagForge Codec Errors
// Description: The sum type every decode failure is reported through.
// Purpose: Distinguish syntactic JSON failure from schema/invariant failure
//          and from field-level failures, per the wire contract's error kinds.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ParseError`] never escapes as a panic; every fallible step of
//! [`crate::decode::decode`] returns one of these variants. A failed decode
//! mutates nothing — the caller still holds whatever snapshot was active
//! before the attempt.

use thiserror::Error;

/// A failure encountered while decoding a wire snapshot.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The payload was not syntactically valid JSON.
    #[error("invalid json for namespace {namespace_id:?}: {reason}")]
    InvalidJson {
        /// A human-readable description of the syntax failure.
        reason: String,
        /// The namespace the decode was attempted against.
        namespace_id: String,
    },
    /// The JSON was syntactically valid but violated the wire contract or a
    /// schema invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    /// A flag's key was not declared in the schema, under strict options.
    #[error("feature {0:?} not found in schema")]
    FeatureNotFound(String),
    /// A hex-encoded id (a `StableId`) failed to parse.
    #[error("invalid hex id {input:?}: {reason}")]
    InvalidHexId {
        /// The offending raw input.
        input: String,
        /// A human-readable description of the failure.
        reason: String,
    },
    /// A version tuple failed to parse or was malformed.
    #[error("invalid version {input:?}: {reason}")]
    InvalidVersion {
        /// The offending raw input, rendered for diagnostics.
        input: String,
        /// A human-readable description of the failure.
        reason: String,
    },
    /// A rule's ramp-up percentage fell outside `[0, 100]`.
    #[error("invalid rollout {value}: {reason}")]
    InvalidRollout {
        /// The offending ramp-up value.
        value: f64,
        /// A human-readable description of the failure.
        reason: String,
    },
}

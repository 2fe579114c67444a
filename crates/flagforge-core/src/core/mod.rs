// flagforge-core/src/core/mod.rs
// ============================================================================
// Module: FlagForge Core Types
// Description: Canonical FlagForge data model types.
// Purpose: Provide stable, serializable types for feature declarations,
//          targeting rules, and namespace configurations.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! FlagForge core types define the data model described in §3: identifiers,
//! version ranges, typed values, evaluation context, rules, flag
//! definitions, compiled schemas, and namespace configurations. These types
//! are the canonical source of truth for the runtime evaluator and the
//! wire codec alike.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod configuration;
pub mod context;
pub mod decision;
pub mod flag;
pub mod identifiers;
pub mod rule;
pub mod schema;
pub mod value;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use configuration::Configuration;
pub use configuration::ConfigurationMetadata;
pub use configuration::MaterializedConfiguration;
pub use configuration::ValidationError;
pub use context::Context;
pub use context::StaticContext;
pub use context::StaticContextBuilder;
pub use decision::Decision;
pub use decision::EvaluationMode;
pub use decision::EvaluationResult;
pub use decision::ExplainTrace;
pub use flag::FlagDefinition;
pub use flag::DEFAULT_SALT;
pub use identifiers::FeatureId;
pub use identifiers::FeatureIdError;
pub use identifiers::HexIdError;
pub use identifiers::StableId;
pub use rule::ExtensionPredicate;
pub use rule::Rule;
pub use rule::RuleSpec;
pub use schema::CompiledSchema;
pub use schema::DataClassDecodeError;
pub use schema::DataClassDecoder;
pub use schema::FeatureEntry;
pub use schema::SchemaError;
pub use value::FlagValue;
pub use value::NativeValue;
pub use value::ValueKind;
pub use version::Version;
pub use version::VersionRange;

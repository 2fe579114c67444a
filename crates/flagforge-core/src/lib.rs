// flagforge-core/src/lib.rs
// ============================================================================
// Module: FlagForge Core Library
// Description: Public API surface for the FlagForge evaluation core.
// Purpose: Expose core types, observation interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! FlagForge core is a typed, deterministic feature-flag evaluation engine
//! for in-process use: given a request context, it answers which value a
//! named feature should resolve to, reproducibly and explainably, and it
//! can be updated safely while traffic is live. This crate is
//! backend-agnostic; wire-format parsing lives in `flagforge-codec` and a
//! demo CLI lives in `flagforge-cli`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::CompiledSchema;
pub use core::Configuration;
pub use core::ConfigurationMetadata;
pub use core::Context;
pub use core::DataClassDecodeError;
pub use core::DataClassDecoder;
pub use core::Decision;
pub use core::EvaluationMode;
pub use core::EvaluationResult;
pub use core::ExplainTrace;
pub use core::ExtensionPredicate;
pub use core::FeatureEntry;
pub use core::FeatureId;
pub use core::FeatureIdError;
pub use core::FlagDefinition;
pub use core::FlagValue;
pub use core::HexIdError;
pub use core::MaterializedConfiguration;
pub use core::NativeValue;
pub use core::Rule;
pub use core::RuleSpec;
pub use core::SchemaError;
pub use core::StableId;
pub use core::StaticContext;
pub use core::StaticContextBuilder;
pub use core::ValidationError;
pub use core::ValueKind;
pub use core::Version;
pub use core::VersionRange;
pub use core::DEFAULT_SALT;

pub use interfaces::EvaluationObserver;
pub use interfaces::NoopEvaluationObserver;
pub use interfaces::NoopRegistryHooks;
pub use interfaces::RegistryHooks;

pub use runtime::BUCKET_COUNT;
pub use runtime::Bucketer;
pub use runtime::DEFAULT_HISTORY_LIMIT;
pub use runtime::MatchOutcome;
pub use runtime::NamespaceRegistry;
pub use runtime::RegistryError;

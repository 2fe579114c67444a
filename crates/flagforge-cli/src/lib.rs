// flagforge-cli/src/lib.rs
// ============================================================================
// Module: FlagForge CLI Library
// Description: Shared helpers for the FlagForge command-line interface.
// Purpose: Provide reusable components (operator config, schema file
//          loading) for the CLI binary and its tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities. The binary entry point
//! (`src/main.rs`) imports these helpers to keep command dispatch focused
//! on argument parsing and output.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// CLI operator configuration (namespace id, schema path, history limit).
pub mod config;

/// Compiles a `CompiledSchema` from a small TOML feature declaration file.
pub mod schema_file;

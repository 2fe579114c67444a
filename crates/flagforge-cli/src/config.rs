// flagforge-cli/src/config.rs
// ============================================================================
// Module: CLI Operator Configuration
// Description: Loads the small TOML file naming a namespace's schema source
//              and rollback history bound.
// Purpose: Give the CLI a persistent, file-based alternative to repeating
//          `--namespace`/`--schema`/`--history-limit` on every invocation.
// Dependencies: serde, toml, std::fs
// ============================================================================

//! ## Overview
//! Resolution order mirrors the precedent CLI's own config loader: an
//! explicit `--config` path wins, then the `FLAGFORGE_CONFIG` environment
//! variable, then `flagforge.toml` in the current directory.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "flagforge.toml";
/// Environment variable used to override the config path.
const CONFIG_ENV_VAR: &str = "FLAGFORGE_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Errors raised while loading [`CliConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file exceeded [`MAX_CONFIG_FILE_SIZE`].
    #[error("config file exceeds the {MAX_CONFIG_FILE_SIZE} byte size limit")]
    TooLarge,
    /// The config file's TOML was malformed.
    #[error("config parse error: {0}")]
    Parse(String),
}

/// The CLI's own operator configuration: which namespace to act on, where
/// its schema lives, and how much rollback history to retain.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// The namespace id this CLI instance operates on.
    pub namespace_id: String,
    /// Path to the TOML file declaring the namespace's features.
    pub schema_path: PathBuf,
    /// Upper bound on retained rollback history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// The default `history_limit` when the config file omits it.
const fn default_history_limit() -> usize {
    flagforge_core::DEFAULT_HISTORY_LIMIT
}

impl CliConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the
    /// size limit, or fails to parse as TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let metadata = fs::metadata(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge);
        }
        let content = fs::read_to_string(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        toml::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

/// Resolves the effective config path from an explicit argument, the
/// environment, or the default filename, in that priority order.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(env_path);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test fixtures")]
mod tests {
    use std::io::Write;

    use super::CliConfig;
    use super::ConfigError;

    #[test]
    fn loads_a_well_formed_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, r#"namespace_id = "app""#).expect("write");
        writeln!(file, r#"schema_path = "schema.toml""#).expect("write");
        let config = CliConfig::load(Some(file.path())).expect("loads");
        assert_eq!(config.namespace_id, "app");
        assert_eq!(config.history_limit, flagforge_core::DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "not = [valid").expect("write");
        let err = CliConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

// flagforge-cli/src/main.rs
// ============================================================================
// Module: FlagForge CLI Entry Point
// Description: Command dispatcher exercising NamespaceSnapshotLoader,
//              evaluate, rollback, and disable-all against files on disk.
// Purpose: Give operators a small, scriptable client over the evaluation
//          core without embedding it in a host service.
// Dependencies: clap, flagforge-core, flagforge-codec, serde, thiserror
// ============================================================================

//! ## Overview
//! Every subcommand compiles a schema from `--schema` (or the configured
//! `schema_path`) and loads one or more `--snapshot` files, in order, into
//! a fresh in-process [`flagforge_core::NamespaceRegistry`] before
//! performing its own operation. Snapshots after the first are applied
//! through [`flagforge_codec::NamespaceSnapshotLoader`], so later files in
//! the sequence act as successive config pushes an operator could roll
//! back through.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;

use flagforge_cli::config::CliConfig;
use flagforge_cli::schema_file;
use flagforge_core::CompiledSchema;
use flagforge_core::EvaluationMode;
use flagforge_core::EvaluationResult;
use flagforge_core::FeatureId;
use flagforge_core::MaterializedConfiguration;
use flagforge_core::NamespaceRegistry;
use flagforge_core::NoopRegistryHooks;
use flagforge_core::StableId;
use flagforge_core::StaticContext;
use flagforge_core::Version;
use flagforge_codec::DecodeOptions;
use flagforge_codec::NamespaceSnapshotLoader;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "flagforge", disable_help_subcommand = true, arg_required_else_help = true)]
struct Cli {
    /// Path to the operator config file (defaults to flagforge.toml or
    /// FLAGFORGE_CONFIG).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a feature against a built-up registry.
    Evaluate(EvaluateCommand),
    /// Roll the registry back a number of loaded snapshots and print the
    /// resulting configuration.
    Rollback(RollbackCommand),
    /// Engage the namespace kill switch, then evaluate a feature.
    DisableAll(EvaluateCommand),
}

/// Snapshot files to load, in order, before the command's own operation.
#[derive(Args, Debug)]
struct SnapshotArgs {
    /// A configuration snapshot JSON file; repeat to build up history.
    #[arg(long = "snapshot", value_name = "PATH", action = ArgAction::Append, required = true)]
    paths: Vec<PathBuf>,
}

/// Arguments shared by `evaluate` and `disable-all`.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// Snapshots to load before evaluating.
    #[command(flatten)]
    snapshots: SnapshotArgs,
    /// The feature's local key within the configured namespace.
    #[arg(long, value_name = "KEY")]
    feature: String,
    /// The stable cohort id bucketing is computed against.
    #[arg(long, value_name = "ID")]
    stable_id: String,
    /// Treat `--stable-id` as already-hex-encoded rather than raw bytes.
    #[arg(long, action = ArgAction::SetTrue)]
    stable_id_hex: bool,
    /// The caller's locale tag.
    #[arg(long, value_name = "TAG")]
    locale: Option<String>,
    /// The caller's platform tag.
    #[arg(long, value_name = "TAG")]
    platform: Option<String>,
    /// The caller's semantic version, as MAJOR.MINOR.PATCH.
    #[arg(long, value_name = "X.Y.Z")]
    version: Option<String>,
    /// An axis value the context presents, as KEY=VALUE; repeatable.
    #[arg(long = "axis", value_name = "KEY=VALUE", action = ArgAction::Append)]
    axes: Vec<String>,
    /// Populate and print the evaluation's explain trace.
    #[arg(long, action = ArgAction::SetTrue)]
    explain: bool,
}

/// Arguments for the `rollback` subcommand.
#[derive(Args, Debug)]
struct RollbackCommand {
    /// Snapshots to load before rolling back.
    #[command(flatten)]
    snapshots: SnapshotArgs,
    /// How many loaded snapshots to roll back.
    #[arg(long, value_name = "N")]
    steps: usize,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from `message`.
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).map_err(|err| CliError::new(err.to_string()))?;

    match cli.command {
        Commands::Evaluate(command) => command_evaluate(&config, command),
        Commands::Rollback(command) => command_rollback(&config, command),
        Commands::DisableAll(command) => command_disable_all(&config, command),
    }
}

// ============================================================================
// SECTION: Registry Assembly
// ============================================================================

/// Compiles the configured schema and loads `snapshot_paths` in order into
/// a fresh registry, the first snapshot via direct decode and the rest via
/// [`NamespaceSnapshotLoader`].
fn build_registry(config: &CliConfig, snapshot_paths: &[PathBuf]) -> CliResult<NamespaceRegistry> {
    let schema = schema_file::load_schema(&config.schema_path).map_err(|err| CliError::new(err.to_string()))?;
    if schema.namespace_id() != config.namespace_id {
        return Err(CliError::new(format!(
            "schema file declares namespace {:?}, config expects {:?}",
            schema.namespace_id(),
            config.namespace_id
        )));
    }

    let Some((first, rest)) = snapshot_paths.split_first() else {
        return Err(CliError::new("at least one --snapshot is required"));
    };

    let initial = decode_snapshot_file(&schema, first)?;
    let registry =
        NamespaceRegistry::new(schema, initial, config.history_limit, Arc::new(NoopRegistryHooks)).map_err(|err| CliError::new(err.to_string()))?;

    let loader = NamespaceSnapshotLoader::new(&registry);
    for path in rest {
        let json = fs::read_to_string(path).map_err(|err| CliError::new(format!("reading {}: {err}", path.display())))?;
        loader.load(&json, &DecodeOptions::default()).map_err(|err| CliError::new(err.to_string()))?;
    }

    Ok(registry)
}

/// Reads and decodes one snapshot file against `schema`.
fn decode_snapshot_file(schema: &CompiledSchema, path: &Path) -> CliResult<MaterializedConfiguration> {
    let json = fs::read_to_string(path).map_err(|err| CliError::new(format!("reading {}: {err}", path.display())))?;
    flagforge_codec::decode(&json, schema, &DecodeOptions::default()).map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: Evaluate / DisableAll Commands
// ============================================================================

/// Executes the `evaluate` command.
fn command_evaluate(config: &CliConfig, command: EvaluateCommand) -> CliResult<ExitCode> {
    let registry = build_registry(config, &command.snapshots.paths)?;
    let feature_id = FeatureId::new(config.namespace_id.clone(), command.feature.clone());
    let context = build_context(&command)?;
    let mode = if command.explain { EvaluationMode::Explain } else { EvaluationMode::Normal };

    let result = registry.evaluate(&feature_id, &context, mode).map_err(|err| CliError::new(err.to_string()))?;
    print_evaluation(&feature_id, &result)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `disable-all` command: engages the kill switch, then
/// evaluates the same way `evaluate` does, to show the resulting decision.
fn command_disable_all(config: &CliConfig, command: EvaluateCommand) -> CliResult<ExitCode> {
    let registry = build_registry(config, &command.snapshots.paths)?;
    registry.disable_all();
    write_stdout_line("kill switch engaged; every evaluation now returns the default value")?;

    let feature_id = FeatureId::new(config.namespace_id.clone(), command.feature.clone());
    let context = build_context(&command)?;
    let mode = if command.explain { EvaluationMode::Explain } else { EvaluationMode::Normal };

    let result = registry.evaluate(&feature_id, &context, mode).map_err(|err| CliError::new(err.to_string()))?;
    print_evaluation(&feature_id, &result)?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the evaluation context from an [`EvaluateCommand`]'s arguments.
fn build_context(command: &EvaluateCommand) -> CliResult<StaticContext> {
    let stable_id = if command.stable_id_hex {
        StableId::from_hex(&command.stable_id).map_err(|err| CliError::new(err.to_string()))?
    } else {
        StableId::from_raw_bytes(command.stable_id.as_bytes())
    };

    let mut builder = StaticContext::builder(stable_id);
    if let Some(locale) = &command.locale {
        builder = builder.locale(locale.clone());
    }
    if let Some(platform) = &command.platform {
        builder = builder.platform(platform.clone());
    }
    if let Some(version) = &command.version {
        builder = builder.version(parse_version(version)?);
    }
    for axis in &command.axes {
        let (key, value) = axis
            .split_once('=')
            .ok_or_else(|| CliError::new(format!("invalid --axis {axis:?}, expected KEY=VALUE")))?;
        builder = builder.axis_value(key.to_string(), value.to_string());
    }

    Ok(builder.build())
}

/// Parses a `MAJOR.MINOR.PATCH` version string.
fn parse_version(raw: &str) -> CliResult<Version> {
    let mut parts = raw.splitn(3, '.');
    let (Some(major), Some(minor), Some(patch)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CliError::new(format!("invalid version {raw:?}, expected MAJOR.MINOR.PATCH")));
    };
    let component = |value: &str| value.parse::<u64>().map_err(|_| CliError::new(format!("invalid version component {value:?} in {raw:?}")));
    Ok(Version::new(component(major)?, component(minor)?, component(patch)?))
}

// ============================================================================
// SECTION: Rollback Command
// ============================================================================

/// Executes the `rollback` command.
fn command_rollback(config: &CliConfig, command: RollbackCommand) -> CliResult<ExitCode> {
    let registry = build_registry(config, &command.snapshots.paths)?;
    if !registry.rollback(command.steps) {
        return Err(CliError::new(format!("not enough history to roll back {} step(s)", command.steps)));
    }

    let snapshot = flagforge_codec::encode(registry.current_configuration().configuration());
    write_stdout_line(&snapshot)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Wire-shaped evaluation output, printed as pretty JSON.
#[derive(Serialize)]
struct EvaluationOutput {
    /// The evaluated feature's canonical id.
    feature: String,
    /// The resolved value, in the codec's tagged-value wire shape.
    value: flagforge_codec::TaggedValueDto,
    /// Why the value resolved this way.
    decision: String,
    /// The winning rule's index, if a rule matched.
    rule_index: Option<usize>,
    /// The winning rule's computed bucket, if a rule matched.
    bucket: Option<u32>,
    /// Populated only when `--explain` was passed.
    trace: Option<TraceOutput>,
}

/// Wire-shaped explain trace, printed as pretty JSON.
#[derive(Serialize)]
struct TraceOutput {
    /// The matched-or-skipped rule index, if any.
    matched_or_skipped_rule_index: Option<usize>,
    /// The computed bucket for that rule, if any.
    bucket: Option<u32>,
    /// Evaluation latency, in microseconds.
    elapsed_micros: u128,
    /// The active snapshot's version metadata, if present.
    config_version: Option<String>,
}

/// Prints an [`EvaluationResult`] as pretty JSON to stdout.
fn print_evaluation(feature_id: &FeatureId, result: &EvaluationResult) -> CliResult<()> {
    let (rule_index, bucket) = match result.decision {
        flagforge_core::Decision::RuleMatched { rule_index, bucket } => (Some(rule_index), Some(bucket)),
        _ => (None, None),
    };
    let output = EvaluationOutput {
        feature: feature_id.canonical(),
        value: value_to_wire(&result.value),
        decision: decision_label(result.decision),
        rule_index,
        bucket,
        trace: result.trace.as_ref().map(|trace| TraceOutput {
            matched_or_skipped_rule_index: trace.matched_or_skipped_rule_index,
            bucket: trace.bucket,
            elapsed_micros: trace.elapsed.as_micros(),
            config_version: trace.config_version.clone(),
        }),
    };
    let json = serde_json::to_string_pretty(&output).map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&json)
}

/// Converts a [`Decision`](flagforge_core::Decision) into a stable label.
fn decision_label(decision: flagforge_core::Decision) -> String {
    match decision {
        flagforge_core::Decision::RegistryDisabled => "registry_disabled".to_string(),
        flagforge_core::Decision::FlagInactive => "flag_inactive".to_string(),
        flagforge_core::Decision::RuleMatched { rule_index, .. } => format!("rule_matched[{rule_index}]"),
        flagforge_core::Decision::Default => "default".to_string(),
    }
}

/// Converts a [`flagforge_core::FlagValue`] into its codec wire shape, for
/// display purposes only.
fn value_to_wire(value: &flagforge_core::FlagValue) -> flagforge_codec::TaggedValueDto {
    use flagforge_codec::TaggedValueDto;
    use flagforge_core::FlagValue;

    match value {
        FlagValue::Boolean(value) => TaggedValueDto::Boolean { value: *value },
        FlagValue::String(value) => TaggedValueDto::String { value: value.clone() },
        FlagValue::Int(value) => TaggedValueDto::Int { value: *value },
        FlagValue::Double(value) => TaggedValueDto::Double { value: *value },
        FlagValue::Enum { constant, enum_class_name } => {
            TaggedValueDto::Enum { value: constant.clone(), enum_class_name: enum_class_name.clone() }
        }
        FlagValue::DataClass { fields, data_class_name } => {
            TaggedValueDto::DataClass { value: fields.clone(), data_class_name: data_class_name.clone() }
        }
    }
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(format!("writing to stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

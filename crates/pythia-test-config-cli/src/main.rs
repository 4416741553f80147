// crates/pythia-test-config-cli/src/main.rs
// ============================================================================
// Module: Pythia Env CLI Entry Point
// Description: Command dispatcher for inspecting integration-test configuration.
// Purpose: Show what tests will resolve, and whether they will run or skip.
// Dependencies: clap, pythia-test-config, serde, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! `pythia-env` builds the same resolver the integration tests use and
//! reports on it. `show` lists resolved settings with private key material
//! redacted, `key-id` derives a public key identifier, and `check` runs the
//! integration gate so CI scripts can decide whether to run the suite.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use pythia_test_config::ConfigResolver;
use pythia_test_config::ResolverConfig;
use pythia_test_config::Selection;
use pythia_test_config::SettingKey;
use pythia_test_config::TestHarness;
use pythia_test_config::audit::ConfigAuditSink;
use pythia_test_config::audit::NoopAuditSink;
use pythia_test_config::audit::StderrAuditSink;
use pythia_test_config::harness::RecordingHarness;
use pythia_test_config::resolver::MISSING_CONFIG_MESSAGE;
use pythia_test_config::sources::SystemProperties;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder printed in place of private key material.
const REDACTED: &str = "<redacted>";

/// Exit code when the integration suite would be skipped.
const SKIP_EXIT_CODE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pythia-env", version, disable_help_subcommand = true)]
struct Cli {
    /// Resolver inputs shared by every subcommand.
    #[command(flatten)]
    global: GlobalArgs,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Resolver inputs that override the `PYTHIA_*` environment variables.
#[derive(Args, Debug)]
struct GlobalArgs {
    /// Secrets document path (overrides `PYTHIA_ENV_JSON`).
    #[arg(long, value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,
    /// Environment partition (overrides `PYTHIA_TEST_ENVIRONMENT`).
    #[arg(long, value_name = "NAME", global = true)]
    environment: Option<String>,
    /// System property definitions.
    #[arg(short = 'D', value_name = "KEY=VALUE", action = ArgAction::Append, global = true)]
    defines: Vec<String>,
    /// Audit output (overrides `PYTHIA_TEST_AUDIT`).
    #[arg(long, value_enum, value_name = "MODE", global = true)]
    audit: Option<AuditArg>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show resolved settings with private material redacted.
    Show(ShowCommand),
    /// Derive the public key identifier for an application key.
    KeyId(KeyIdCommand),
    /// Run the integration gate; exit 2 when tests would skip.
    Check(CheckCommand),
}

/// Arguments for `show`.
#[derive(Args, Debug)]
struct ShowCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `key-id`.
#[derive(Args, Debug)]
struct KeyIdCommand {
    /// Base64 private key; defaults to the resolved `APP_KEY`.
    #[arg(long, value_name = "BASE64")]
    key: Option<String>,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Skip host resolution and only check credentials.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_dns: bool,
}

/// Output formats for `show`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Audit output selection.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum AuditArg {
    /// JSON lines on stderr.
    Stderr,
    /// Discard audit events.
    Off,
}

impl AuditArg {
    /// Builds the sink for this selection.
    fn sink(self) -> Arc<dyn ConfigAuditSink> {
        match self {
            Self::Stderr => Arc::new(StderrAuditSink),
            Self::Off => Arc::new(NoopAuditSink),
        }
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Resolved configuration as printed by `show`.
#[derive(Debug, Serialize)]
struct ShowReport {
    /// Secrets document path consulted, if any.
    document_path: Option<String>,
    /// Effective environment name.
    environment: Option<String>,
    /// Document partition selection label.
    selection: Option<String>,
    /// Pythia service URL.
    service_url: String,
    /// Identifier derived from `APP_KEY`.
    public_key_id: Option<String>,
    /// Whether credentials are complete.
    integration_configured: bool,
    /// Recognized settings in canonical order.
    settings: Vec<SettingReport>,
}

/// One recognized setting.
#[derive(Debug, Serialize)]
struct SettingReport {
    /// Canonical key name.
    key: &'static str,
    /// Whether only account-era suites read this key.
    legacy: bool,
    /// Value, redacted for private material.
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    /// Layer that supplied the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'static str>,
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
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
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
    let config = ResolverConfig::load().map_err(|err| CliError::new(err.to_string()))?;
    let resolver = build_resolver(&cli.global, config);
    match cli.command {
        Commands::Show(command) => command_show(&resolver, &command),
        Commands::KeyId(command) => command_key_id(&resolver, &command),
        Commands::Check(command) => command_check(&resolver, &command),
    }
}

/// Builds the resolver from environment configuration and CLI overrides.
fn build_resolver(global: &GlobalArgs, config: ResolverConfig) -> ConfigResolver {
    let mut builder = ConfigResolver::builder()
        .config(config)
        .properties(SystemProperties::from_defines(&global.defines));
    if let Some(path) = &global.env_file {
        builder = builder.document_path(path);
    }
    if let Some(name) = &global.environment {
        builder = builder.environment(name);
    }
    if let Some(audit) = global.audit {
        builder = builder.audit_sink(audit.sink());
    }
    builder.build()
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `show` command.
fn command_show(resolver: &ConfigResolver, command: &ShowCommand) -> CliResult<ExitCode> {
    let report = show_report(resolver);
    let rendered = match command.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|err| CliError::new(format!("failed to encode report: {err}")))?,
    };
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `key-id` command.
fn command_key_id(resolver: &ConfigResolver, command: &KeyIdCommand) -> CliResult<ExitCode> {
    let id = key_id(resolver, command.key.as_deref())?;
    write_stdout_line(&id).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `check` command.
fn command_check(resolver: &ConfigResolver, command: &CheckCommand) -> CliResult<ExitCode> {
    match check_gate(resolver, command.skip_dns) {
        None => Ok(ExitCode::SUCCESS),
        Some(message) => {
            write_stderr_line(&message).map_err(|err| CliError::new(output_error("stderr", &err)))?;
            Ok(ExitCode::from(SKIP_EXIT_CODE))
        }
    }
}

// ============================================================================
// SECTION: Command Helpers
// ============================================================================

/// Collects the resolved configuration with private material redacted.
fn show_report(resolver: &ConfigResolver) -> ShowReport {
    let settings = SettingKey::ALL
        .into_iter()
        .map(|key| {
            let resolved = resolver.resolve(key.as_str());
            SettingReport {
                key: key.as_str(),
                legacy: key.is_legacy(),
                value: resolved.as_ref().map(|resolved| {
                    if key.is_secret() { REDACTED.to_string() } else { resolved.value.clone() }
                }),
                source: resolved.map(|resolved| resolved.source),
            }
        })
        .collect();
    ShowReport {
        document_path: resolver.document_path().map(|path| path.display().to_string()),
        environment: resolver.environment().map(str::to_string),
        selection: resolver.document().selection().map(Selection::label),
        service_url: resolver.pythia_service_url(),
        public_key_id: resolver.api_public_key_id(),
        integration_configured: resolver.is_integration_configured(),
        settings,
    }
}

/// Renders a report as `name: value` lines.
fn render_text(report: &ShowReport) -> String {
    let mut out = String::new();
    let none = "-";
    let _ = writeln!(out, "document: {}", report.document_path.as_deref().unwrap_or(none));
    let _ = writeln!(out, "environment: {}", report.environment.as_deref().unwrap_or(none));
    let _ = writeln!(out, "selection: {}", report.selection.as_deref().unwrap_or(none));
    let _ = writeln!(out, "service url: {}", report.service_url);
    let _ = writeln!(out, "public key id: {}", report.public_key_id.as_deref().unwrap_or(none));
    let _ = writeln!(out, "integration configured: {}", report.integration_configured);
    for setting in &report.settings {
        let marker = if setting.legacy { " [legacy]" } else { "" };
        match (&setting.value, setting.source) {
            (Some(value), Some(source)) => {
                let _ = writeln!(out, "{}{marker} = {value} ({source})", setting.key);
            }
            _ => {
                let _ = writeln!(out, "{}{marker} unset", setting.key);
            }
        }
    }
    out.trim_end().to_string()
}

/// Derives the key id for `key`, or for the resolved `APP_KEY`.
fn key_id(resolver: &ConfigResolver, key: Option<&str>) -> CliResult<String> {
    let resolved = match key {
        Some(text) => Some(text.to_string()),
        None => resolver.api_private_key_str(),
    };
    let Some(text) = resolved else {
        return Err(CliError::new(format!("{} is not defined", SettingKey::AppKey.as_str())));
    };
    resolver
        .derive_public_key_id(Some(&text))
        .ok_or_else(|| CliError::new("public key id could not be derived".to_string()))
}

/// Runs the integration gate; returns the skip message when tests would skip.
fn check_gate(resolver: &ConfigResolver, skip_dns: bool) -> Option<String> {
    let harness = RecordingHarness::new();
    let proceed = if skip_dns {
        harness.skip_unless(resolver.is_integration_configured(), MISSING_CONFIG_MESSAGE)
    } else {
        resolver.assume_integration_configured(&harness)
    };
    if proceed { None } else { harness.skipped().into_iter().next() }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

//! CLI module for mojotest
//!
//! This module provides the command-line interface for the test runner.
//!
//! ## Usage
//!
//! `mojotest [PATH]... [-v] [-x] [-k EXPR] [-s] [--collect-only] [--interpreter BIN] [--format console|json]`
//!
//! ## Modules
//!
//! - `test_interfaces` - Discovery and interpreter invocation boundaries
//! - `test_items` - Collection hook, test files and test items
//! - `test_runner` - Session orchestration and reporters
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod test_interfaces;
pub mod test_items;
pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::config::RunnerConfig;
use crate::version::MOJOTEST_VERSION;
use test_runner::{ReportFormat, RunOptions};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Collect and run Mojo test files
#[derive(Parser, Debug)]
#[command(name = "mojotest")]
#[command(version = MOJOTEST_VERSION)]
#[command(about = "Collect and run Mojo test files (pytest-style)", long_about = None)]
pub struct Cli {
    /// Test files or directories to collect from
    #[arg(value_name = "PATH", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Stop on first failure
    #[arg(short = 'x', long = "exitfirst")]
    pub stop_on_fail: bool,

    /// Only run tests whose name contains EXPR
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Echo interpreter output while collecting
    #[arg(short = 's', long = "show-output")]
    pub show_output: bool,

    /// List collected tests without evaluating them
    #[arg(long)]
    pub collect_only: bool,

    /// Interpreter binary (overrides MOJOTEST_INTERPRETER)
    #[arg(long, value_name = "BIN")]
    pub interpreter: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    pub format: ReportFormat,
}

impl Cli {
    /// Runner configuration: defaults, then environment, then flags.
    pub fn runner_config(&self) -> RunnerConfig {
        let config = RunnerConfig::from_env();
        match &self.interpreter {
            Some(interpreter) => config.with_interpreter(interpreter.as_str()),
            None => config,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            verbose: self.verbose,
            stop_on_fail: self.stop_on_fail,
            filter: self.filter.clone(),
            show_output: self.show_output,
            collect_only: self.collect_only,
            format: self.format,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.runner_config();
    let options = cli.run_options();
    tracing::debug!(?config, ?options, "starting session");
    test_runner::run_tests(&cli.paths, &config, &options)
}

// ============================================================================
// Tests
// ============================================================================

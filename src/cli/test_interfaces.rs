//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations that touch the outside world:
//! - Test discovery (filesystem walk + file name predicate)
//! - Test invocation (interpreter subprocess + output capture)
//!
//! The session runner only talks to these traits, so tests can swap in canned invocations instead of
//! a real interpreter.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use mojotest_core::conventions::SKIPPED_DIRS;
use thiserror::Error;

use super::test_items::{MojoTestFile, collect_file};
use crate::config::RunnerConfig;

/// Exit code recorded when the interpreter was terminated by a signal and reported none.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Errors that occur during collection
#[derive(Debug, Error)]
pub enum TestError {
    /// The interpreter could not be started at all.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while discovering tests in '{}': {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; [`SIGNAL_EXIT_CODE`] when killed by a signal.
    pub exit_code: i32,
}

impl Invocation {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

// ============================================================================
// Test Discovery Interface
// ============================================================================

/// Find test files under a path.
pub trait TestDiscovery {
    /// Find all test files in a path (recursive), sorted by path.
    ///
    /// A file path yields itself when it is a test file and nothing otherwise.
    fn discover_test_files(&self, path: &Path) -> Result<Vec<MojoTestFile>, TestError>;
}

// ============================================================================
// Test Executor Interface
// ============================================================================

/// Run the interpreter against one test file.
///
/// A non-zero exit code is a normal [`Invocation`]; only failing to start the process is an error.
pub trait TestExecutor {
    fn invoke(&self, file: &Path) -> Result<Invocation, TestError>;
}

// ============================================================================
// Default Implementations
// ============================================================================

/// Filesystem-based test discovery.
pub struct DefaultTestDiscovery<'a> {
    config: &'a RunnerConfig,
}

impl<'a> DefaultTestDiscovery<'a> {
    pub fn new(config: &'a RunnerConfig) -> Self {
        Self { config }
    }

    fn walk(&self, dir: &Path, files: &mut Vec<MojoTestFile>) -> Result<(), TestError> {
        let entries = fs::read_dir(dir).map_err(|source| TestError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries.flatten() {
            let entry_path = entry.path();
            if entry_path.is_dir() {
                let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if name.starts_with('.') || SKIPPED_DIRS.contains(&name) {
                    continue;
                }
                // unreadable subdirectories are skipped, only the requested root is fatal
                if let Err(e) = self.walk(&entry_path, files) {
                    tracing::warn!("skipping {}: {}", entry_path.display(), e);
                }
            } else if let Some(file) = collect_file(self.config, &entry_path) {
                files.push(file);
            }
        }
        Ok(())
    }
}

impl TestDiscovery for DefaultTestDiscovery<'_> {
    fn discover_test_files(&self, path: &Path) -> Result<Vec<MojoTestFile>, TestError> {
        let mut files = Vec::new();

        if path.is_file() {
            files.extend(collect_file(self.config, path));
        } else if path.is_dir() {
            self.walk(path, &mut files)?;
        } else {
            tracing::debug!("path '{}' does not exist", path.display());
        }

        files.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(files)
    }
}

/// Interpreter subprocess with output capture.
pub struct DefaultTestExecutor<'a> {
    config: &'a RunnerConfig,
}

impl<'a> DefaultTestExecutor<'a> {
    pub fn new(config: &'a RunnerConfig) -> Self {
        Self { config }
    }
}

impl TestExecutor for DefaultTestExecutor<'_> {
    #[tracing::instrument(skip_all, fields(file = %file.display()))]
    fn invoke(&self, file: &Path) -> Result<Invocation, TestError> {
        tracing::debug!(command = %self.config.command_line(file), "running test file");

        let output = Command::new(&self.config.interpreter)
            .args(&self.config.flags)
            .arg(file)
            .output()
            .map_err(|source| TestError::Spawn {
                command: self.config.command_line(file),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(SIGNAL_EXIT_CODE);

        if !stderr.is_empty() {
            tracing::debug!(%stderr, "interpreter stderr");
        }
        tracing::debug!(exit_code, stdout_len = stdout.len(), "interpreter finished");

        Ok(Invocation {
            stdout,
            stderr,
            exit_code,
        })
    }
}

//! Test runner implementation (pytest-style)
//!
//! ## TestReporter Trait
//!
//! The test runner uses a `TestReporter` trait to separate reporting from
//! execution. `ConsoleReporter` prints pytest-style progress and a failure
//! section; `JsonReporter` builds a single JSON document.
//!
//! ## I/O Boundaries
//!
//! Discovery and interpreter invocation go through the traits in
//! `test_interfaces.rs`, so a session can run against canned output.
//!
//! ## Session flow
//!
//! 1. Discover test files under every requested path.
//! 2. Collect every file: one interpreter run each, in path order. A file
//!    whose interpreter cannot be started aborts the whole session.
//! 3. Filter items by keyword, then evaluate and report them in order.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::ValueEnum;
use serde_json::json;

use super::test_interfaces::{DefaultTestDiscovery, DefaultTestExecutor, TestDiscovery, TestExecutor};
use super::test_items::{MojoTestFile, MojoTestItem};
use super::{CliError, CliResult, ExitCode};
use crate::config::RunnerConfig;
use crate::version::MOJOTEST_VERSION;

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting test execution results.
///
/// Implement this trait to customize test output format (JSON, TAP, etc.)
pub trait TestReporter {
    /// Called when test discovery begins
    fn on_discovery_start(&mut self, _path: &Path) {}

    /// Called when a test file is discovered
    fn on_file_discovered(&mut self, _path: &Path) {}

    /// Called with an interpreter stdout line (trimmed) when `--show-output` is on
    fn on_output_line(&mut self, _path: &Path, _line: &str) {}

    /// Called when test collection is complete, with every item that will be evaluated
    fn on_collection_complete(&mut self, items: &[MojoTestItem]);

    /// Called instead of running anything when only collecting
    fn on_collect_only(&mut self, items: &[MojoTestItem]);

    /// Called when a test run begins
    fn on_test_start(&mut self, _item: &MojoTestItem) {}

    /// Called when a test completes
    fn on_test_complete(&mut self, item: &MojoTestItem, result: &TestResult);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

/// Result of evaluating a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    /// Rendered failure message
    Failed(String),
}

/// Summary of test run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Items collected but not evaluated because of `--exitfirst`
    pub not_run: usize,
    pub duration: Duration,
}

impl TestSummary {
    /// `2 passed, 1 failed in 0.12s`
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.passed > 0 {
            parts.push(format!("{} passed", self.passed));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        if self.not_run > 0 {
            parts.push(format!("{} not run", self.not_run));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }
        format!("{} in {:.2}s", parts.join(", "), self.duration.as_secs_f64())
    }
}

/// Output format for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

/// Options for one session
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub verbose: bool,
    pub stop_on_fail: bool,
    /// Keep only items whose name contains this keyword
    pub filter: Option<String>,
    /// Echo interpreter stdout while collecting
    pub show_output: bool,
    pub collect_only: bool,
    pub format: ReportFormat,
}

// ============================================================================
// Console reporter
// ============================================================================

/// Default console reporter (pytest-style)
#[derive(Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    failures: Vec<FailureReport>,
    progress_open: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_file_discovered(&mut self, path: &Path) {
        if self.verbose {
            println!("collecting {}", path.display());
        }
    }

    fn on_output_line(&mut self, _path: &Path, line: &str) {
        println!("{}", line);
    }

    fn on_collection_complete(&mut self, items: &[MojoTestItem]) {
        if items.is_empty() {
            eprintln!("No tests collected");
            return;
        }
        println!("\x1b[1m=================== test session starts ===================\x1b[0m");
        println!("collected {} item(s)", items.len());
        println!();
    }

    fn on_collect_only(&mut self, items: &[MojoTestItem]) {
        for item in items {
            println!("{}", item.node_id());
        }
    }

    fn on_test_start(&mut self, item: &MojoTestItem) {
        if self.verbose {
            print!("{} ", item.node_id());
        }
    }

    fn on_test_complete(&mut self, item: &MojoTestItem, result: &TestResult) {
        let status = match (result, self.verbose) {
            (TestResult::Passed, true) => "\x1b[32mPASSED\x1b[0m",
            (TestResult::Passed, false) => "\x1b[32m.\x1b[0m",
            (TestResult::Failed(_), true) => "\x1b[31mFAILED\x1b[0m",
            (TestResult::Failed(_), false) => "\x1b[31mF\x1b[0m",
        };

        if self.verbose {
            println!("{}", status);
        } else {
            print!("{}", status);
            self.progress_open = true;
        }

        if let TestResult::Failed(message) = result {
            self.failures.push(FailureReport::new(item, message));
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        if self.progress_open {
            println!();
        }

        if !self.failures.is_empty() {
            println!();
            println!("\x1b[1;31m=================== FAILURES ===================\x1b[0m");
            print!("{}", format_failures(&self.failures));
        }

        let color = if summary.failed > 0 { "\x1b[1;31m" } else { "\x1b[1;32m" };
        println!();
        println!("{}=================== {} ===================\x1b[0m", color, summary.describe());
    }
}

/// A failed item as shown in the FAILURES section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub name: String,
    /// `path:line: name`
    pub location: String,
    pub message: String,
}

impl FailureReport {
    pub fn new(item: &MojoTestItem, message: &str) -> Self {
        let (path, line, name) = item.report_info();
        Self {
            name: name.to_string(),
            location: format!("{}:{}: {}", path.display(), line, name),
            message: message.to_string(),
        }
    }
}

/// Render the body of the FAILURES section.
pub fn format_failures(failures: &[FailureReport]) -> String {
    let mut out = String::new();
    for failure in failures {
        out.push('\n');
        out.push_str(&format!("___________ {} ___________\n", failure.name));
        out.push('\n');
        out.push_str(&format!("    {}\n", failure.message));
        out.push('\n');
        out.push_str(&format!("    {}\n", failure.location));
    }
    out
}

// ============================================================================
// JSON reporter
// ============================================================================

/// Collects results and prints one JSON document when the run completes
#[derive(Default)]
pub struct JsonReporter {
    collected: Vec<serde_json::Value>,
    tests: Vec<serde_json::Value>,
    /// Lines echoed by `--show-output`
    output: Vec<serde_json::Value>,
    summary: Option<serde_json::Value>,
    emit: bool,
}

impl JsonReporter {
    /// A reporter that prints its document to stdout
    pub fn new() -> Self {
        Self {
            emit: true,
            ..Self::default()
        }
    }

    /// A reporter that only builds the document (see [`JsonReporter::document`])
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn document(&self) -> serde_json::Value {
        json!({
            "version": MOJOTEST_VERSION,
            "collected": self.collected,
            "tests": self.tests,
            "output": self.output,
            "summary": self.summary,
        })
    }

    fn print(&self) {
        if self.emit {
            match serde_json::to_string_pretty(&self.document()) {
                Ok(text) => println!("{}", text),
                Err(e) => tracing::error!("failed to serialize report: {}", e),
            }
        }
    }
}

fn item_json(item: &MojoTestItem) -> serde_json::Value {
    let (path, line, name) = item.report_info();
    json!({
        "path": path.display().to_string(),
        "line": line,
        "name": name,
    })
}

impl TestReporter for JsonReporter {
    fn on_output_line(&mut self, path: &Path, line: &str) {
        self.output.push(json!({
            "path": path.display().to_string(),
            "line": line,
        }));
    }

    fn on_collection_complete(&mut self, items: &[MojoTestItem]) {
        self.collected = items.iter().map(item_json).collect();
        // nothing will run, so `on_run_complete` never fires
        if items.is_empty() {
            self.on_run_complete(&TestSummary::default());
        }
    }

    fn on_collect_only(&mut self, items: &[MojoTestItem]) {
        self.collected = items.iter().map(item_json).collect();
        self.print();
    }

    fn on_test_complete(&mut self, item: &MojoTestItem, result: &TestResult) {
        let mut entry = item_json(item);
        let (outcome, message) = match result {
            TestResult::Passed => ("passed", None),
            TestResult::Failed(msg) => ("failed", Some(msg.clone())),
        };
        entry["outcome"] = json!(outcome);
        entry["status"] = json!(item.status());
        entry["message"] = json!(message);
        self.tests.push(entry);
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        self.summary = Some(json!({
            "total": summary.total,
            "passed": summary.passed,
            "failed": summary.failed,
            "not_run": summary.not_run,
            "duration_secs": summary.duration.as_secs_f64(),
        }));
        self.print();
    }
}

// ============================================================================
// Session
// ============================================================================

/// Run all tests under the given paths with the real filesystem and interpreter.
pub fn run_tests(paths: &[PathBuf], config: &RunnerConfig, options: &RunOptions) -> CliResult<ExitCode> {
    let discovery = DefaultTestDiscovery::new(config);
    let executor = DefaultTestExecutor::new(config);

    let result = match options.format {
        ReportFormat::Console => {
            let mut reporter = ConsoleReporter::new(options.verbose);
            run_session(paths, &discovery, &executor, options, &mut reporter)
        }
        ReportFormat::Json => {
            let mut reporter = JsonReporter::new();
            run_session(paths, &discovery, &executor, options, &mut reporter)
        }
    };

    result.map_err(|mut e| {
        if e.message.starts_with("No test files found") {
            e.message.push_str(&format!("\nTest files should be named {}", config.describe_patterns()));
        }
        e
    })
}

/// Run one session against the given discovery and executor.
///
/// ## Errors
/// - No test file under any path.
/// - A file's interpreter could not be started (the session stops; nothing is evaluated).
/// - Any evaluated item failed (empty message, the report was already printed).
pub fn run_session(
    paths: &[PathBuf],
    discovery: &dyn TestDiscovery,
    executor: &dyn TestExecutor,
    options: &RunOptions,
    reporter: &mut dyn TestReporter,
) -> CliResult<ExitCode> {
    let start_time = Instant::now();

    let mut files: Vec<MojoTestFile> = Vec::new();
    for path in paths {
        reporter.on_discovery_start(path);
        let found = discovery
            .discover_test_files(path)
            .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
        for file in found {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }

    if files.is_empty() {
        let shown: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        return Err(CliError::failure(format!("No test files found in '{}'", shown.join("', '"))));
    }

    let mut items: Vec<MojoTestItem> = Vec::new();
    for file in &files {
        reporter.on_file_discovered(file.path());
        let path = file.path();
        let collected = file
            .collect(executor, |line| {
                if options.show_output {
                    reporter.on_output_line(path, line);
                }
            })
            .map_err(|e| CliError::failure(format!("Error collecting {}: {}", file.path().display(), e)))?;
        items.extend(collected);
    }

    if let Some(keyword) = options.filter.as_deref() {
        let before = items.len();
        items.retain(|item| item.name().contains(keyword));
        tracing::debug!(keyword, deselected = before - items.len(), "applied keyword filter");
    }

    if options.collect_only {
        reporter.on_collect_only(&items);
        return Ok(ExitCode::SUCCESS);
    }

    reporter.on_collection_complete(&items);
    if items.is_empty() {
        return Ok(ExitCode::SUCCESS); // "no tests collected" is not a failure
    }

    let mut summary = TestSummary {
        total: items.len(),
        ..TestSummary::default()
    };

    for item in &items {
        reporter.on_test_start(item);

        let result = match item.run_test() {
            Ok(()) => TestResult::Passed,
            Err(failure) => {
                let message = item.repr_failure(&failure).unwrap_or_else(|| failure.to_string());
                TestResult::Failed(message)
            }
        };

        match result {
            TestResult::Passed => summary.passed += 1,
            TestResult::Failed(_) => summary.failed += 1,
        }
        reporter.on_test_complete(item, &result);

        if options.stop_on_fail && matches!(result, TestResult::Failed(_)) {
            break;
        }
    }

    summary.not_run = summary.total - summary.passed - summary.failed;
    summary.duration = start_time.elapsed();
    reporter.on_run_complete(&summary);

    if summary.failed > 0 {
        // Tests failed - return error with empty message (summary already printed)
        Err(CliError::new("", ExitCode::FAILURE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

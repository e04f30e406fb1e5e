//! Harness-facing test items
//!
//! ## Collection protocol
//!
//! - [`collect_file`] is the file-collection hook: it turns an eligible path into a [`MojoTestFile`].
//! - [`MojoTestFile::collect`] runs the interpreter once and yields one [`MojoTestItem`] per output segment.
//! - [`MojoTestItem::run_test`] evaluates an item. The file has already run, so this only inspects the recorded
//!   status and returns a [`MojoTestFailure`] for a non-zero one.
//! - [`MojoTestItem::repr_failure`] renders a [`MojoTestFailure`] as its bare message. Any other error kind gets
//!   `None` so the session falls back to its default rendering.
//! - [`MojoTestItem::report_info`] returns the `(path, line, name)` header of an item.
//!
//! Only the last item of a file can fail: the interpreter reports a single exit code per file.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use mojotest_core::conventions::REPORT_LINE_OFFSET;
use mojotest_core::{Segment, SegmentParser};
use thiserror::Error;

use super::test_interfaces::{TestError, TestExecutor};
use crate::config::RunnerConfig;

/// Collect `path` when it is a test file.
pub fn collect_file(config: &RunnerConfig, path: &Path) -> Option<MojoTestFile> {
    config.is_test_file(path).then(|| MojoTestFile::new(path))
}

/// Failure raised by a Mojo test item. Displays as the captured output lines joined by `,`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MojoTestFailure {
    pub message: String,
}

/// A discovered Mojo test file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MojoTestFile {
    path: PathBuf,
}

impl MojoTestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the file and split its output into items.
    ///
    /// ## Parameters
    /// - `executor`: runs the interpreter.
    /// - `echo`: receives every trimmed stdout line while parsing (`-s`). Pass `|_| {}` to discard.
    ///
    /// ## Errors
    /// - Returns the executor's [`TestError`] when the interpreter cannot be started. No items are produced for the
    ///   file in that case.
    pub fn collect(
        &self,
        executor: &dyn TestExecutor,
        mut echo: impl FnMut(&str),
    ) -> Result<Vec<MojoTestItem>, TestError> {
        let invocation = executor.invoke(&self.path)?;

        let mut parser = SegmentParser::new();
        let mut segments = Vec::new();
        for line in invocation.stdout.lines() {
            tracing::trace!(file = %self.path.display(), line = line.trim(), "output");
            echo(line.trim());
            segments.extend(parser.feed(line));
        }
        segments.extend(parser.finish(invocation.exit_code));

        if segments.is_empty() {
            if invocation.succeeded() {
                tracing::warn!("no '#' test markers in output of {}; nothing collected", self.path.display());
            } else {
                tracing::warn!(
                    exit_code = invocation.exit_code,
                    "{} failed before printing any '#' test marker; nothing collected",
                    self.path.display()
                );
            }
        }

        Ok(segments
            .into_iter()
            .map(|segment| MojoTestItem::from_segment(&self.path, segment))
            .collect())
    }
}

/// One test result collected from a Mojo test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MojoTestItem {
    path: PathBuf,
    segment: Segment,
}

impl MojoTestItem {
    pub fn from_segment(path: impl Into<PathBuf>, segment: Segment) -> Self {
        Self {
            path: path.into(),
            segment,
        }
    }

    /// The item name: the marker line that introduced it.
    pub fn name(&self) -> &str {
        &self.segment.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> i32 {
        self.segment.status
    }

    /// Output lines captured for this item.
    pub fn output(&self) -> &[String] {
        &self.segment.lines
    }

    /// `path::name`, as shown in listings.
    pub fn node_id(&self) -> String {
        format!("{}::{}", self.path.display(), self.segment.name)
    }

    /// Evaluate the recorded result.
    pub fn run_test(&self) -> Result<(), MojoTestFailure> {
        if self.segment.passed() {
            Ok(())
        } else {
            Err(MojoTestFailure {
                message: self.segment.joined_output(),
            })
        }
    }

    /// Render a failure raised while evaluating this item.
    ///
    /// ## Returns
    /// - (`Option<String>`): the bare message for a [`MojoTestFailure`]; `None` for anything else.
    pub fn repr_failure(&self, error: &(dyn StdError + 'static)) -> Option<String> {
        error.downcast_ref::<MojoTestFailure>().map(|failure| failure.message.clone())
    }

    /// Header information for reports: `(path, line offset, name)`.
    pub fn report_info(&self) -> (&Path, usize, &str) {
        (&self.path, REPORT_LINE_OFFSET, &self.segment.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::cli::test_interfaces::Invocation;

    struct CannedExecutor {
        stdout: &'static str,
        exit_code: i32,
        calls: Cell<usize>,
    }

    impl CannedExecutor {
        fn new(stdout: &'static str, exit_code: i32) -> Self {
            Self {
                stdout,
                exit_code,
                calls: Cell::new(0),
            }
        }
    }

    impl TestExecutor for CannedExecutor {
        fn invoke(&self, _file: &Path) -> Result<Invocation, TestError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Invocation {
                stdout: self.stdout.to_string(),
                stderr: String::new(),
                exit_code: self.exit_code,
            })
        }
    }

    struct MissingInterpreter;

    impl TestExecutor for MissingInterpreter {
        fn invoke(&self, file: &Path) -> Result<Invocation, TestError> {
            Err(TestError::Spawn {
                command: format!("mojo run -I . {}", file.display()),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    fn item(name: &str, lines: &[&str], status: i32) -> MojoTestItem {
        MojoTestItem::from_segment(
            "tests/test_math.mojo",
            Segment {
                name: name.to_string(),
                lines: lines.iter().map(|l| l.to_string()).collect(),
                status,
            },
        )
    }

    #[test]
    fn test_collect_file_predicate() {
        let config = RunnerConfig::default();
        assert!(collect_file(&config, Path::new("test_a.mojo")).is_some());
        assert!(collect_file(&config, Path::new("test_a.🔥")).is_some());
        assert!(collect_file(&config, Path::new("a.mojo")).is_none());
        assert!(collect_file(&config, Path::new("test_a.rs")).is_none());
    }

    #[test]
    fn test_collect_invokes_once_and_splits() {
        let executor = CannedExecutor::new("#A\np\n#B\nq\n", 7);
        let items = MojoTestFile::new("test_x.mojo").collect(&executor, |_| {}).unwrap();

        assert_eq!(executor.calls.get(), 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name(), "#A");
        assert_eq!(items[0].status(), 0);
        assert_eq!(items[1].name(), "#B");
        assert_eq!(items[1].status(), 7);
        assert_eq!(items[1].output(), &["q".to_string()]);
        assert!(items.iter().all(|i| i.path() == Path::new("test_x.mojo")));
    }

    #[test]
    fn test_collect_without_markers_is_empty() {
        let executor = CannedExecutor::new("compiled ok\n", 1);
        let items = MojoTestFile::new("test_x.mojo").collect(&executor, |_| {}).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_collect_echoes_trimmed_lines() {
        let executor = CannedExecutor::new("  #A \n  p  \nq\n", 0);
        let mut echoed = Vec::new();
        let items = MojoTestFile::new("test_x.mojo")
            .collect(&executor, |line| echoed.push(line.to_string()))
            .unwrap();
        assert_eq!(echoed, vec!["#A", "p", "q"]);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_collect_propagates_spawn_error() {
        let err = MojoTestFile::new("test_x.mojo")
            .collect(&MissingInterpreter, |_| {})
            .unwrap_err();
        assert!(matches!(err, TestError::Spawn { .. }));
    }

    #[test]
    fn test_run_test_passes_on_zero_status() {
        assert_eq!(item("#A", &["x"], 0).run_test(), Ok(()));
    }

    #[test]
    fn test_run_test_fails_with_joined_lines() {
        let failure = item("#B", &["expected 2", "got 3"], 1).run_test().unwrap_err();
        assert_eq!(failure.message, "expected 2,got 3");
        assert_eq!(failure.to_string(), "expected 2,got 3");
    }

    #[test]
    fn test_repr_failure_only_for_mojo_failures() {
        let it = item("#B", &["boom"], 1);
        let failure = it.run_test().unwrap_err();
        assert_eq!(it.repr_failure(&failure), Some("boom".to_string()));

        let other = std::io::Error::other("unrelated");
        assert_eq!(it.repr_failure(&other), None);
    }

    #[test]
    fn test_report_info() {
        let it = item("# test_add", &[], 0);
        assert_eq!(
            it.report_info(),
            (Path::new("tests/test_math.mojo"), 0, "# test_add")
        );
        assert_eq!(it.node_id(), "tests/test_math.mojo::# test_add");
    }
}

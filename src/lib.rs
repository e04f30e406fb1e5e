#![forbid(unsafe_code)]
//! mojotest: collect, run and report Mojo test files
//!
//! Each `test_*.mojo` (or `test_*.🔥`) file is run once with `mojo run -I . <file>`. The interpreter's stdout is split
//! into named results: a line starting with `#` names a test, the lines after it are that test's output. The process
//! exit code belongs to the last result of the file; every earlier result passes.
//!
//! ## Layout
//!
//! - [`config`]: how files are recognised and how the interpreter is launched.
//! - [`cli::test_interfaces`]: discovery and invocation boundaries.
//! - [`cli::test_items`]: the collection hook and the harness-facing file/item types.
//! - [`cli::test_runner`]: session orchestration and reporters.
//! - `mojotest_core`: the pure output segmentation state machine and shared conventions.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod version;

pub use cli::test_interfaces::{Invocation, TestDiscovery, TestError, TestExecutor};
pub use cli::test_items::{MojoTestFailure, MojoTestFile, MojoTestItem, collect_file};
pub use config::RunnerConfig;
pub use mojotest_core::{Segment, parse_output};

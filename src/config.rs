//! Runner configuration for mojotest
//!
//! Defaults mirror the canonical conventions in `mojotest_core::conventions`:
//! `mojo run -I . <file>` for every `test_*.mojo` / `test_*.🔥` file.

use std::path::Path;

use mojotest_core::conventions::{MOJO_INTERPRETER, MOJO_RUN_FLAGS, SOURCE_EXTENSIONS, TEST_PREFIX, is_test_file_name};

/// Environment variable overriding the interpreter binary.
pub const INTERPRETER_ENV_VAR: &str = "MOJOTEST_INTERPRETER";

/// How test files are recognised and how the interpreter is launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Interpreter binary (looked up on `PATH` when not a path)
    pub interpreter: String,
    /// Arguments placed before the test file path
    pub flags: Vec<String>,
    /// Accepted file extensions, without the leading dot
    pub extensions: Vec<String>,
    /// Required file name prefix
    pub prefix: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: MOJO_INTERPRETER.to_string(),
            flags: MOJO_RUN_FLAGS.iter().map(|f| f.to_string()).collect(),
            extensions: SOURCE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            prefix: TEST_PREFIX.to_string(),
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings with process environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Empty values are ignored so `MOJOTEST_INTERPRETER=` falls back to the default.
    pub fn with_env_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(INTERPRETER_ENV_VAR) {
            Some(interpreter) if !interpreter.trim().is_empty() => {
                tracing::debug!(%interpreter, "interpreter overridden from {}", INTERPRETER_ENV_VAR);
                self.with_interpreter(interpreter.trim())
            }
            _ => self,
        }
    }

    /// Set the interpreter binary
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the arguments placed before the test file path
    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the accepted extensions (a leading dot is stripped)
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| {
                let e: String = e.into();
                e.strip_prefix('.').map(str::to_string).unwrap_or(e)
            })
            .collect();
        self
    }

    /// Set the required file name prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Whether `path` names a file this config collects. Only the file name is inspected.
    pub fn is_test_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| is_test_file_name(name, &self.prefix, &self.extensions))
    }

    /// The command line used for `file`, for messages and logs
    pub fn command_line(&self, file: &Path) -> String {
        let mut parts = Vec::with_capacity(self.flags.len() + 2);
        parts.push(self.interpreter.clone());
        parts.extend(self.flags.iter().cloned());
        parts.push(file.display().to_string());
        parts.join(" ")
    }

    /// Human-readable file name patterns, e.g. `test_*.mojo or test_*.🔥`
    pub fn describe_patterns(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!("{}*.{}", self.prefix, ext))
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Default config tests
    // ========================================

    #[test]
    fn test_default_command() {
        let config = RunnerConfig::default();
        assert_eq!(config.interpreter, "mojo");
        assert_eq!(config.flags, vec!["run", "-I", "."]);
    }

    #[test]
    fn test_default_patterns() {
        let config = RunnerConfig::default();
        assert_eq!(config.prefix, "test_");
        assert_eq!(config.describe_patterns(), "test_*.mojo or test_*.🔥");
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(RunnerConfig::new(), RunnerConfig::default());
    }

    // ========================================
    // Discovery predicate
    // ========================================

    #[test]
    fn test_is_test_file() {
        let config = RunnerConfig::default();
        assert!(config.is_test_file(Path::new("test_math.mojo")));
        assert!(config.is_test_file(Path::new("pkg/tests/test_math.🔥")));
        assert!(!config.is_test_file(Path::new("pkg/tests/math.mojo")));
        assert!(!config.is_test_file(Path::new("pkg/test_dir/math.mojo")));
        assert!(!config.is_test_file(Path::new("test_math.py")));
        assert!(!config.is_test_file(Path::new("")));
    }

    // ========================================
    // Builder method tests
    // ========================================

    #[test]
    fn test_with_extensions_strips_dot() {
        let config = RunnerConfig::new().with_extensions([".mj", "mojo"]);
        assert_eq!(config.extensions, vec!["mj", "mojo"]);
        assert!(config.is_test_file(Path::new("test_a.mj")));
    }

    #[test]
    fn test_builder_chain() {
        let config = RunnerConfig::new()
            .with_interpreter("/opt/mojo/bin/mojo")
            .with_flags(["run"])
            .with_prefix("check_");
        assert_eq!(config.command_line(Path::new("check_a.mojo")), "/opt/mojo/bin/mojo run check_a.mojo");
        assert!(!config.is_test_file(Path::new("test_a.mojo")));
    }

    #[test]
    fn test_command_line_default() {
        let config = RunnerConfig::default();
        assert_eq!(config.command_line(Path::new("t/test_a.mojo")), "mojo run -I . t/test_a.mojo");
    }

    // ========================================
    // Environment overrides
    // ========================================

    #[test]
    fn test_env_override_interpreter() {
        let config = RunnerConfig::new().with_env_overrides(|key| {
            (key == INTERPRETER_ENV_VAR).then(|| "  /usr/local/bin/mojo ".to_string())
        });
        assert_eq!(config.interpreter, "/usr/local/bin/mojo");
        assert_eq!(config.flags, vec!["run", "-I", "."]);
    }

    #[test]
    fn test_env_override_empty_is_ignored() {
        let config = RunnerConfig::new().with_env_overrides(|_| Some(String::new()));
        assert_eq!(config.interpreter, "mojo");
    }

    #[test]
    fn test_env_override_missing() {
        let config = RunnerConfig::new().with_env_overrides(|_| None);
        assert_eq!(config, RunnerConfig::default());
    }
}

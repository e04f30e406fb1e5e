//! Shared conventions (well-known names, flags and spellings).

/// Interpreter binary invoked for every test file.
pub const MOJO_INTERPRETER: &str = "mojo";

/// Arguments placed between the interpreter and the test file path.
///
/// `-I .` puts the current directory on the include path, so a Mojo package living in a subdirectory of the working
/// directory is importable from the tests.
pub const MOJO_RUN_FLAGS: &[&str] = &["run", "-I", "."];

/// File name prefix a test file must start with (e.g. `test_something.mojo`).
pub const TEST_PREFIX: &str = "test_";

/// Interchangeable source extensions, without the leading dot.
pub const SOURCE_EXTENSIONS: &[&str] = &["mojo", "🔥"];

/// A trimmed output line starting with this character names a new test segment.
pub const SEGMENT_MARKER: char = '#';

/// Separator used when a failed segment's captured lines are joined into its failure message.
pub const FAILURE_LINE_SEPARATOR: &str = ",";

/// Line offset reported for every item; the interpreter gives no per-test locations.
pub const REPORT_LINE_OFFSET: usize = 0;

/// Directory names never descended into while walking for test files.
pub const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// Check whether `name` is a file name the collector should pick up.
///
/// ## Parameters
/// - `name`: the file name (no directory components).
/// - `prefix`: required file name prefix.
/// - `extensions`: accepted extensions without the leading dot.
///
/// ## Returns
/// - (`bool`): `true` when the name starts with `prefix` and ends in `.<ext>` for one of `extensions`.
///
/// ## Examples
/// ```rust
/// use mojotest_core::conventions::{SOURCE_EXTENSIONS, TEST_PREFIX, is_test_file_name};
/// assert!(is_test_file_name("test_math.mojo", TEST_PREFIX, SOURCE_EXTENSIONS));
/// assert!(is_test_file_name("test_math.🔥", TEST_PREFIX, SOURCE_EXTENSIONS));
/// assert!(!is_test_file_name("math_test.mojo", TEST_PREFIX, SOURCE_EXTENSIONS));
/// assert!(!is_test_file_name("test_math.py", TEST_PREFIX, SOURCE_EXTENSIONS));
/// ```
pub fn is_test_file_name<S: AsRef<str>>(name: &str, prefix: &str, extensions: &[S]) -> bool {
    if !name.starts_with(prefix) {
        return false;
    }
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    // `.mojo` alone has an empty stem and is a hidden file, not a source file
    !stem.is_empty() && extensions.iter().any(|e| e.as_ref() == ext)
}

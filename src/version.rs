//! mojotest version information.
//!
//! Exposes the version as a single constant so the CLI and the JSON report agree on the same value.

/// The mojotest version string (for example, `0.1.0`).
pub const MOJOTEST_VERSION: &str = env!("CARGO_PKG_VERSION");

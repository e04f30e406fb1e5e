//! Provide the pure, IO-free core of `mojotest`: the canonical conventions shared by discovery and invocation, and
//! the state machine that turns captured interpreter output into named test segments.
//!
//! ## Notes
//!
//! - This crate performs **no IO**: it never spawns processes or touches the filesystem. The root `mojotest` crate
//!   owns both.
//! - Everything here is deterministic; identical input always produces identical output.

pub mod conventions;
pub mod segment;

pub use segment::{Segment, SegmentParser, parse_output};

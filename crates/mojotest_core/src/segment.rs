//! Segmentation of captured interpreter output into named test results.
//!
//! The interpreter prints, for each logical test, a line starting with [`SEGMENT_MARKER`] naming the test, followed by
//! any number of diagnostic lines. The process exit code reports overall success for the whole file, so only the final
//! segment can carry a non-zero status.
//!
//! ```text
//! # test_add          <- starts segment "# test_add"
//! 1 + 1 == 2          <- buffered into "# test_add"
//! # test_sub          <- emits "# test_add" (status 0), starts "# test_sub"
//! assertion failed    <- buffered into "# test_sub"
//! <eof>, exit 1       <- emits "# test_sub" (status 1)
//! ```
//!
//! ## Notes
//!
//! - Lines printed before the first marker are buffered and then discarded with the buffer when the first marker
//!   arrives. Output without any marker produces no segment at all.
//! - A process that crashes mid-segment still yields that segment, tagged with the crash exit code.

use crate::conventions::{FAILURE_LINE_SEPARATOR, SEGMENT_MARKER};

/// One named test result recovered from interpreter output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The full trimmed marker line, marker character included (e.g. `# test_add`).
    pub name: String,
    /// Trimmed output lines printed after the marker line.
    pub lines: Vec<String>,
    /// `0` for every segment except the last, which carries the process exit code.
    pub status: i32,
}

impl Segment {
    /// Whether this segment reports success.
    pub fn passed(&self) -> bool {
        self.status == 0
    }

    /// The captured lines joined into a single failure message.
    pub fn joined_output(&self) -> String {
        self.lines.join(FAILURE_LINE_SEPARATOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    NoCurrentSegment,
    InSegment { name: String },
}

/// Incremental form of [`parse_output`].
///
/// Feed trimmed or untrimmed lines one at a time with [`SegmentParser::feed`], then close the stream with
/// [`SegmentParser::finish`]. Useful when the caller wants to observe each line as it is consumed.
#[derive(Debug, Clone)]
pub struct SegmentParser {
    state: ParserState,
    pending: Vec<String>,
}

impl Default for SegmentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::NoCurrentSegment,
            pending: Vec::new(),
        }
    }

    /// Consume one line of output.
    ///
    /// ## Returns
    /// - (`Option<Segment>`): the previous segment, with status `0`, when `line` is a marker that closes it.
    pub fn feed(&mut self, line: &str) -> Option<Segment> {
        let line = line.trim();
        if !line.starts_with(SEGMENT_MARKER) {
            self.pending.push(line.to_string());
            return None;
        }

        let lines = std::mem::take(&mut self.pending);
        let next = ParserState::InSegment { name: line.to_string() };
        match std::mem::replace(&mut self.state, next) {
            ParserState::InSegment { name } => Some(Segment { name, lines, status: 0 }),
            ParserState::NoCurrentSegment => None,
        }
    }

    /// Close the stream.
    ///
    /// ## Parameters
    /// - `exit_code`: the process exit code, attached to the final segment.
    ///
    /// ## Returns
    /// - (`Option<Segment>`): the open segment, if any marker was ever seen.
    pub fn finish(self, exit_code: i32) -> Option<Segment> {
        match self.state {
            ParserState::InSegment { name } => Some(Segment {
                name,
                lines: self.pending,
                status: exit_code,
            }),
            ParserState::NoCurrentSegment => None,
        }
    }
}

/// Split captured stdout into ordered test segments.
///
/// ## Parameters
/// - `stdout`: the complete captured standard output of one invocation.
/// - `exit_code`: the invocation's exit code.
///
/// ## Returns
/// - (`Vec<Segment>`): one segment per marker line, in output order. Only the last may have a non-zero status.
///
/// ## Examples
/// ```rust
/// use mojotest_core::parse_output;
/// let segments = parse_output("#A\np\n#B\nq\n", 7);
/// assert_eq!(segments.len(), 2);
/// assert_eq!((segments[0].name.as_str(), segments[0].status), ("#A", 0));
/// assert_eq!((segments[1].name.as_str(), segments[1].status), ("#B", 7));
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(stdout_len = stdout.len(), exit_code = exit_code))]
pub fn parse_output(stdout: &str, exit_code: i32) -> Vec<Segment> {
    let mut parser = SegmentParser::new();
    let mut segments: Vec<Segment> = stdout.lines().filter_map(|line| parser.feed(line)).collect();
    segments.extend(parser.finish(exit_code));
    segments
}

//! PACE text formats for dominating-set instances and solutions.
//!
//! Graphs are line-oriented: `c` starts a comment, a single `p <fmt> <n> <m>`
//! header declares the node and edge counts, and every remaining line is a
//! 1-based edge `u v`. Solutions are a size line followed by one node id per
//! line.

mod error;
mod graph;
mod instance;
mod solution;

pub use error::{FormatError, FormatErrorKind};
pub use graph::{
	AUTO_RENDER_THRESHOLD, Edge, Graph, NodeId, exceeds_auto_render_threshold,
	exceeds_render_threshold,
};
pub use instance::{parse_graph, write_graph};
pub use solution::{Solution, parse_solution, write_solution};

/// Problem identifier used when writing instances without one.
pub const PROBLEM_ID: &str = "ds";

/// Lines starting with this character are comments in both formats.
const COMMENT_MARKER: char = 'c';

/// Yields `(line_number, trimmed_line)` for every non-blank, non-comment line.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
	text.lines()
		.enumerate()
		.map(|(i, line)| (i + 1, line.trim()))
		.filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
}

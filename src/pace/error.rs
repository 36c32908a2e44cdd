use std::fmt;

use thiserror::Error;

use super::graph::NodeId;

/// What went wrong while parsing a graph or solution description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
	/// No `p` line before the first edge or end of input.
	#[error("no header found (expected 'p <fmt> <nodes> <edges>')")]
	MissingHeader,
	/// A second `p` line.
	#[error("duplicate header")]
	DuplicateHeader,
	/// A `p` line without four tokens.
	#[error("invalid header (expected 'p <fmt> <nodes> <edges>')")]
	InvalidHeader,
	/// Wrong number of tokens on an edge or solution line.
	#[error("expected {expected} value(s) on the line, found {found}")]
	TokenCount {
		/// Tokens the line should have.
		expected: usize,
		/// Tokens it has.
		found: usize,
	},
	/// A token that is not a non-negative integer.
	#[error("cannot parse `{0}` as an integer")]
	InvalidInteger(String),
	/// Node id beyond the declared node count, or zero in an edge.
	#[error("node {node} outside of [1, {num_nodes}]")]
	NodeOutOfRange {
		/// Offending id.
		node: NodeId,
		/// Declared node count.
		num_nodes: NodeId,
	},
	/// Edge from a node to itself.
	#[error("self-loop on node {0}")]
	SelfLoop(NodeId),
	/// Edge listed twice, in either direction.
	#[error("duplicate edge {0} {1}")]
	DuplicateEdge(NodeId, NodeId),
	/// Edge lines do not match the header count.
	#[error("header declares {declared} edges, found {found}")]
	EdgeCountMismatch {
		/// Count from the header.
		declared: u64,
		/// Edge lines read.
		found: u64,
	},
	/// Solution text without its leading size line.
	#[error("no solution size found")]
	MissingSolutionSize,
	/// Node id `0` in a solution.
	#[error("node ids start at 1")]
	ZeroNodeId,
	/// Node listed twice in a solution.
	#[error("node {0} appears more than once in the solution")]
	DuplicateMember(NodeId),
	/// Member lines do not match the declared size.
	#[error("solution declares {declared} nodes, found {found}")]
	SolutionSizeMismatch {
		/// Count from the size line.
		declared: u64,
		/// Member lines read.
		found: u64,
	},
}

/// A parse failure, with the 1-based line it was found on when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
	/// 1-based line, `None` for problems with the input as a whole.
	pub line: Option<usize>,
	/// What went wrong.
	pub kind: FormatErrorKind,
}

impl FormatError {
	pub(crate) fn at(line: usize, kind: FormatErrorKind) -> Self {
		Self {
			line: Some(line),
			kind,
		}
	}

	pub(crate) fn whole(kind: FormatErrorKind) -> Self {
		Self { line: None, kind }
	}
}

impl fmt::Display for FormatError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.line {
			Some(line) => write!(f, "line {line}: {}", self.kind),
			None => write!(f, "{}", self.kind),
		}
	}
}

impl std::error::Error for FormatError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.kind)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_includes_line_number() {
		let err = FormatError::at(3, FormatErrorKind::SelfLoop(2));
		assert_eq!(err.to_string(), "line 3: self-loop on node 2");

		let err = FormatError::whole(FormatErrorKind::EdgeCountMismatch {
			declared: 2,
			found: 1,
		});
		assert_eq!(err.to_string(), "header declares 2 edges, found 1");
	}
}

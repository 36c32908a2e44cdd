use std::collections::HashSet;
use std::io::Write;

use super::content_lines;
use super::error::{FormatError, FormatErrorKind};
use super::graph::{Graph, NodeId};

/// A candidate dominating set, kept in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
	members: Vec<NodeId>,
	lookup: HashSet<NodeId>,
}

impl Solution {
	/// Builds a solution from 1-based ids. Duplicates are collapsed.
	pub fn from_members(members: impl IntoIterator<Item = NodeId>) -> Self {
		let mut lookup = HashSet::new();
		let members = members.into_iter().filter(|&u| lookup.insert(u)).collect();
		Self { members, lookup }
	}

	/// Members in file order.
	pub fn members(&self) -> &[NodeId] {
		&self.members
	}

	/// Iterates members in file order.
	pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.members.iter().copied()
	}

	/// Whether `node` is selected.
	pub fn contains(&self, node: NodeId) -> bool {
		self.lookup.contains(&node)
	}

	/// Number of members.
	pub fn len(&self) -> usize {
		self.members.len()
	}

	/// Whether nothing is selected.
	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	/// Checks that every member names a node of `graph`.
	pub fn validate_for(&self, graph: &Graph) -> Result<(), FormatError> {
		match self.iter().find(|&u| !graph.contains(u)) {
			Some(node) => Err(FormatError::whole(FormatErrorKind::NodeOutOfRange {
				node,
				num_nodes: graph.num_nodes() as NodeId,
			})),
			None => Ok(()),
		}
	}
}

fn parse_value(line_no: usize, line: &str) -> Result<u64, FormatError> {
	if line.split_ascii_whitespace().count() != 1 {
		return Err(FormatError::at(
			line_no,
			FormatErrorKind::TokenCount {
				expected: 1,
				found: line.split_ascii_whitespace().count(),
			},
		));
	}
	line.parse()
		.map_err(|_| FormatError::at(line_no, FormatErrorKind::InvalidInteger(line.to_string())))
}

/// Parses a solution description: the declared size, then one node id per line.
pub fn parse_solution(text: &str) -> Result<Solution, FormatError> {
	let mut lines = content_lines(text);
	let (size_line, size) = lines
		.next()
		.ok_or(FormatError::whole(FormatErrorKind::MissingSolutionSize))?;
	let declared = parse_value(size_line, size)?;

	let mut members = Vec::with_capacity(declared.min(1 << 16) as usize);
	let mut lookup = HashSet::new();
	for (line_no, line) in lines {
		let value = parse_value(line_no, line)?;
		let node = NodeId::try_from(value).map_err(|_| {
			FormatError::at(line_no, FormatErrorKind::InvalidInteger(line.to_string()))
		})?;
		if node == 0 {
			return Err(FormatError::at(line_no, FormatErrorKind::ZeroNodeId));
		}
		if !lookup.insert(node) {
			return Err(FormatError::at(line_no, FormatErrorKind::DuplicateMember(node)));
		}
		members.push(node);
	}

	if members.len() as u64 != declared {
		return Err(FormatError::whole(FormatErrorKind::SolutionSizeMismatch {
			declared,
			found: members.len() as u64,
		}));
	}

	Ok(Solution { members, lookup })
}

/// Writes a solution in the same format [`parse_solution`] reads.
pub fn write_solution<W: Write>(mut writer: W, solution: &Solution) -> std::io::Result<()> {
	writeln!(writer, "{}", solution.len())?;
	for node in solution.iter() {
		writeln!(writer, "{node}")?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_members_in_file_order() {
		let solution = parse_solution("5\n1\n2\n3\n4\n6\n").unwrap();
		assert_eq!(solution.members(), &[1, 2, 3, 4, 6]);
		assert!(solution.contains(6));
		assert!(!solution.contains(5));
	}

	#[test]
	fn skips_comments_and_blank_lines() {
		let solution = parse_solution("c Test\n3\n\n 7 \ncBla\n2\n5\n").unwrap();
		assert_eq!(solution.members(), &[7, 2, 5]);
	}

	#[test]
	fn empty_solution() {
		let solution = parse_solution("0\n").unwrap();
		assert!(solution.is_empty());
	}

	#[test]
	fn rejects_non_integer_lines() {
		let err = parse_solution("3\n1\na\n2\n").unwrap_err();
		assert_eq!(
			err,
			FormatError::at(3, FormatErrorKind::InvalidInteger("a".into()))
		);

		let err = parse_solution("2\n1 2\n3\n").unwrap_err();
		assert_eq!(
			err.kind,
			FormatErrorKind::TokenCount {
				expected: 1,
				found: 2
			}
		);
	}

	#[test]
	fn rejects_size_mismatch() {
		assert_eq!(
			parse_solution("3\n1\n2\n").unwrap_err().kind,
			FormatErrorKind::SolutionSizeMismatch {
				declared: 3,
				found: 2
			}
		);
		assert_eq!(
			parse_solution("1\n1\n2\n").unwrap_err().kind,
			FormatErrorKind::SolutionSizeMismatch {
				declared: 1,
				found: 2
			}
		);
	}

	#[test]
	fn rejects_missing_size_zero_ids_and_duplicates() {
		assert_eq!(
			parse_solution("c only a comment\n").unwrap_err().kind,
			FormatErrorKind::MissingSolutionSize
		);
		assert_eq!(
			parse_solution("1\n0\n").unwrap_err(),
			FormatError::at(2, FormatErrorKind::ZeroNodeId)
		);
		assert_eq!(
			parse_solution("2\n4\n4\n").unwrap_err(),
			FormatError::at(3, FormatErrorKind::DuplicateMember(4))
		);
	}

	#[test]
	fn validate_against_graph() {
		let graph = Graph::new(3, Vec::new());
		assert!(Solution::from_members([1, 3]).validate_for(&graph).is_ok());
		assert_eq!(
			Solution::from_members([2, 4]).validate_for(&graph).unwrap_err().kind,
			FormatErrorKind::NodeOutOfRange {
				node: 4,
				num_nodes: 3
			}
		);
	}

	#[test]
	fn written_solution_reads_back() {
		let solution = Solution::from_members([9, 3, 5]);
		let mut buffer: Vec<u8> = Vec::new();
		write_solution(&mut buffer, &solution).unwrap();
		assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "3\n9\n3\n5\n");
		assert_eq!(
			parse_solution(std::str::from_utf8(&buffer).unwrap()).unwrap(),
			solution
		);
	}
}

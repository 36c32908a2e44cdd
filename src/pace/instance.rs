use std::collections::HashSet;
use std::io::Write;
use std::str::FromStr;

use super::error::{FormatError, FormatErrorKind};
use super::graph::{Edge, Graph, NodeId};
use super::content_lines;

struct Header {
	problem_id: String,
	num_nodes: NodeId,
	num_edges: u64,
}

fn parse_int<T: FromStr>(line: usize, token: &str) -> Result<T, FormatError> {
	token
		.parse()
		.map_err(|_| FormatError::at(line, FormatErrorKind::InvalidInteger(token.to_string())))
}

fn parse_header(line_no: usize, line: &str) -> Result<Header, FormatError> {
	let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
	let [p, problem_id, nodes, edges] = tokens.as_slice() else {
		return Err(FormatError::at(line_no, FormatErrorKind::InvalidHeader));
	};
	if *p != "p" {
		return Err(FormatError::at(line_no, FormatErrorKind::InvalidHeader));
	}

	Ok(Header {
		problem_id: problem_id.to_string(),
		num_nodes: parse_int(line_no, nodes)?,
		num_edges: parse_int(line_no, edges)?,
	})
}

fn parse_edge(line_no: usize, line: &str, num_nodes: NodeId) -> Result<Edge, FormatError> {
	let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
	let [u, v] = tokens.as_slice() else {
		return Err(FormatError::at(
			line_no,
			FormatErrorKind::TokenCount {
				expected: 2,
				found: tokens.len(),
			},
		));
	};
	let (u, v): (NodeId, NodeId) = (parse_int(line_no, u)?, parse_int(line_no, v)?);

	for node in [u, v] {
		if !(1..=num_nodes).contains(&node) {
			return Err(FormatError::at(
				line_no,
				FormatErrorKind::NodeOutOfRange { node, num_nodes },
			));
		}
	}
	if u == v {
		return Err(FormatError::at(line_no, FormatErrorKind::SelfLoop(u)));
	}

	Ok(Edge::new(u, v))
}

/// Parses a graph description.
///
/// Blank lines and comments are skipped. The header must appear exactly once
/// and before any edge; every edge must be a distinct pair of distinct nodes
/// in `[1, num_nodes]`, and the number of edges must match the header.
pub fn parse_graph(text: &str) -> Result<Graph, FormatError> {
	let mut header: Option<Header> = None;
	let mut links = Vec::new();
	let mut seen = HashSet::new();

	for (line_no, line) in content_lines(text) {
		if line.starts_with('p') {
			if header.is_some() {
				return Err(FormatError::at(line_no, FormatErrorKind::DuplicateHeader));
			}
			header = Some(parse_header(line_no, line)?);
			continue;
		}

		let Some(h) = header.as_ref() else {
			return Err(FormatError::at(line_no, FormatErrorKind::MissingHeader));
		};
		let edge = parse_edge(line_no, line, h.num_nodes)?;
		if !seen.insert(edge.normalized()) {
			return Err(FormatError::at(
				line_no,
				FormatErrorKind::DuplicateEdge(edge.source, edge.target),
			));
		}
		links.push(edge);
	}

	let header = header.ok_or(FormatError::whole(FormatErrorKind::MissingHeader))?;
	if links.len() as u64 != header.num_edges {
		return Err(FormatError::whole(FormatErrorKind::EdgeCountMismatch {
			declared: header.num_edges,
			found: links.len() as u64,
		}));
	}

	let mut graph = Graph::new(header.num_nodes, links);
	graph.problem_id = header.problem_id;
	Ok(graph)
}

/// Writes a graph in the same format [`parse_graph`] reads.
pub fn write_graph<W: Write>(mut writer: W, graph: &Graph) -> std::io::Result<()> {
	writeln!(
		writer,
		"p {} {} {}",
		graph.problem_id,
		graph.num_nodes(),
		graph.num_edges()
	)?;
	for edge in &graph.links {
		writeln!(writer, "{} {}", edge.source, edge.target)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;

	fn kind_of(text: &str) -> FormatErrorKind {
		parse_graph(text).unwrap_err().kind
	}

	#[test]
	fn parses_path_with_comments() {
		let graph = parse_graph("c TEST\n p  ds 4  3 \n1 2\nc mid\n\n2 3\n3 4\n").unwrap();
		assert_eq!(graph.problem_id, "ds");
		assert_eq!(graph.nodes, vec![1, 2, 3, 4]);
		assert_eq!(
			graph.links,
			vec![Edge::new(1, 2), Edge::new(2, 3), Edge::new(3, 4)]
		);
	}

	#[test]
	fn zero_declared_edges_with_no_edge_lines() {
		let graph = parse_graph("p ds 3 0\n").unwrap();
		assert_eq!(graph.num_nodes(), 3);
		assert!(graph.links.is_empty());
	}

	#[test]
	fn one_declared_edge_with_no_edge_lines_fails() {
		let err = parse_graph("p ds 3 1\n").unwrap_err();
		assert_eq!(err.line, None);
		assert_eq!(
			err.kind,
			FormatErrorKind::EdgeCountMismatch {
				declared: 1,
				found: 0
			}
		);
	}

	#[test]
	fn missing_header() {
		assert_eq!(kind_of("c nothing here\n"), FormatErrorKind::MissingHeader);
		let err = parse_graph("1 2\np ds 2 1\n").unwrap_err();
		assert_eq!(err, FormatError::at(1, FormatErrorKind::MissingHeader));
	}

	#[test]
	fn duplicate_header() {
		let err = parse_graph("p ds 2 1\np ds 2 1\n1 2\n").unwrap_err();
		assert_eq!(err, FormatError::at(2, FormatErrorKind::DuplicateHeader));
	}

	#[test]
	fn malformed_header() {
		assert_eq!(kind_of("p ds 2\n"), FormatErrorKind::InvalidHeader);
		assert_eq!(kind_of("p ds 2 1 7\n1 2\n"), FormatErrorKind::InvalidHeader);
		assert_eq!(kind_of("px ds 2 1\n1 2\n"), FormatErrorKind::InvalidHeader);
		assert_eq!(
			kind_of("p ds two 1\n1 2\n"),
			FormatErrorKind::InvalidInteger("two".into())
		);
	}

	#[test]
	fn rejects_bad_edges_with_line_numbers() {
		let err = parse_graph("p ds 3 2\n1 2\n2 x\n").unwrap_err();
		assert_eq!(
			err,
			FormatError::at(3, FormatErrorKind::InvalidInteger("x".into()))
		);

		let err = parse_graph("p ds 3 1\n1 4\n").unwrap_err();
		assert_eq!(
			err,
			FormatError::at(
				2,
				FormatErrorKind::NodeOutOfRange {
					node: 4,
					num_nodes: 3
				}
			)
		);

		assert_eq!(
			kind_of("p ds 3 1\n0 1\n"),
			FormatErrorKind::NodeOutOfRange {
				node: 0,
				num_nodes: 3
			}
		);
		assert_eq!(kind_of("p ds 3 1\n2 2\n"), FormatErrorKind::SelfLoop(2));
		assert_eq!(
			kind_of("p ds 3 1\n1 2 3\n"),
			FormatErrorKind::TokenCount {
				expected: 2,
				found: 3
			}
		);
		assert_eq!(
			kind_of("p ds 3 2\n1 2\n2 1\n"),
			FormatErrorKind::DuplicateEdge(2, 1)
		);
	}

	#[test]
	fn too_many_edges() {
		assert_eq!(
			kind_of("p ds 3 1\n1 2\n2 3\n"),
			FormatErrorKind::EdgeCountMismatch {
				declared: 1,
				found: 2
			}
		);
	}

	#[test]
	fn written_graph_reads_back_to_same_edge_set() {
		let inputs = [
			"p ds 5 6\n1 2\n3 2\n3 4\n5 4\n2 5\n1 5\n",
			"c star\np ds 6 5\n1 2\n1 3\n4 1\n1 5\n6 1\n",
			"p ds 1 0\n",
		];

		for text in inputs {
			let graph = parse_graph(text).unwrap();
			let mut buffer: Vec<u8> = Vec::new();
			write_graph(&mut buffer, &graph).unwrap();
			let written = String::from_utf8(buffer).unwrap();
			let reread = parse_graph(&written).unwrap();

			let before: BTreeSet<Edge> = graph.edges().collect();
			let after: BTreeSet<Edge> = reread.edges().collect();
			assert_eq!(before, after);
			assert_eq!(graph.num_nodes(), reread.num_nodes());
			assert_eq!(graph.problem_id, reread.problem_id);
		}
	}
}

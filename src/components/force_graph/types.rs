//! Inputs to the force graph component and the visual classes derived from coverage.

use std::sync::Arc;

use crate::domset::{AdjacencyIndex, CoverageEntry, CoverageModel};
use crate::pace::{Graph, NodeId};

/// A graph ready to be mounted, together with its neighbour index.
#[derive(Clone, Debug)]
pub struct GraphView {
	/// Graph to lay out.
	pub graph: Arc<Graph>,
	/// Neighbourhoods of `graph`, used for hover and tooltips.
	pub adjacency: Arc<AdjacencyIndex>,
}

/// Fill class of a node.
///
/// Uncovered nodes are deliberately drawn as [`NodeClass::Plain`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeClass {
	/// Not covered, or no solution shown.
	#[default]
	Plain,
	/// Member of the dominating set.
	Selected,
	/// Covered by exactly one selected neighbour.
	UniquelyCovered,
	/// Covered by more than one selected neighbour.
	MultiplyCovered,
}

impl NodeClass {
	/// Legend entries, in display order.
	pub const LEGEND: [NodeClass; 3] = [
		NodeClass::Selected,
		NodeClass::UniquelyCovered,
		NodeClass::MultiplyCovered,
	];

	/// Legend text.
	pub fn label(self) -> &'static str {
		match self {
			NodeClass::Plain => "Not covered",
			NodeClass::Selected => "In DomSet",
			NodeClass::UniquelyCovered => "Covered uniquely",
			NodeClass::MultiplyCovered => "Covered multiple times",
		}
	}
}

/// Stroke class of a link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LinkClass {
	/// No coverage loaded, or both endpoints selected.
	#[default]
	Plain,
	/// Neither endpoint is selected.
	Unused,
	/// Joins a selected node to a node it covers alone.
	UniquelyCovered,
	/// Joins a selected node to a node covered several times.
	MultiplyCovered,
}

/// Node classes indexed by `id - 1`, link classes in graph link order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
	/// One class per node.
	pub nodes: Vec<NodeClass>,
	/// One class per link.
	pub links: Vec<LinkClass>,
}

impl Classification {
	/// Class of `node`; unknown ids are plain.
	pub fn node(&self, node: NodeId) -> NodeClass {
		(node as usize)
			.checked_sub(1)
			.and_then(|slot| self.nodes.get(slot))
			.copied()
			.unwrap_or_default()
	}

	/// Class of the link at `index`; out of range is plain.
	pub fn link(&self, index: usize) -> LinkClass {
		self.links.get(index).copied().unwrap_or_default()
	}
}

fn node_class(entry: &CoverageEntry) -> NodeClass {
	match (entry.in_ds, entry.covered_by.len()) {
		(true, _) => NodeClass::Selected,
		(false, 0) => NodeClass::Plain,
		(false, 1) => NodeClass::UniquelyCovered,
		(false, _) => NodeClass::MultiplyCovered,
	}
}

fn link_class(a: &CoverageEntry, b: &CoverageEntry) -> LinkClass {
	let covered = match (a.in_ds, b.in_ds) {
		(false, false) => return LinkClass::Unused,
		(true, true) => return LinkClass::Plain,
		(true, false) => b,
		(false, true) => a,
	};
	match covered.covered_by.len() {
		0 => LinkClass::Plain,
		1 => LinkClass::UniquelyCovered,
		_ => LinkClass::MultiplyCovered,
	}
}

/// Derives node and link classes from the current coverage.
///
/// Without coverage everything is [`NodeClass::Plain`] / [`LinkClass::Plain`].
pub fn classify(graph: &Graph, coverage: Option<&CoverageModel>) -> Classification {
	let Some(coverage) = coverage else {
		return Classification {
			nodes: vec![NodeClass::Plain; graph.num_nodes()],
			links: vec![LinkClass::Plain; graph.num_edges()],
		};
	};

	let nodes = graph
		.nodes
		.iter()
		.map(|&id| coverage.entry(id).map(node_class).unwrap_or_default())
		.collect();
	let links = graph
		.links
		.iter()
		.map(|edge| match (coverage.entry(edge.source), coverage.entry(edge.target)) {
			(Some(a), Some(b)) => link_class(a, b),
			_ => LinkClass::Plain,
		})
		.collect();

	Classification { nodes, links }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pace::{Solution, parse_graph};

	fn star_plus_tail() -> Graph {
		// 1 is the hub of 2,3,4; 4-5 is a tail, 3-4 closes a triangle.
		parse_graph("p ds 5 5\n1 2\n1 3\n1 4\n4 5\n3 4\n").unwrap()
	}

	fn classes_for(graph: &Graph, members: &[NodeId]) -> Classification {
		let solution = Solution::from_members(members.iter().copied());
		let coverage = CoverageModel::compute(Some(graph), Some(&solution));
		classify(graph, coverage.as_ref())
	}

	#[test]
	fn no_coverage_is_plain() {
		let graph = star_plus_tail();
		let classes = classify(&graph, None);
		assert!(classes.nodes.iter().all(|&c| c == NodeClass::Plain));
		assert!(classes.links.iter().all(|&c| c == LinkClass::Plain));
		assert_eq!(classes.links.len(), 5);
	}

	#[test]
	fn node_and_link_classes() {
		let graph = star_plus_tail();
		let classes = classes_for(&graph, &[1, 4]);

		assert_eq!(classes.node(1), NodeClass::Selected);
		assert_eq!(classes.node(2), NodeClass::UniquelyCovered);
		assert_eq!(classes.node(3), NodeClass::MultiplyCovered);
		assert_eq!(classes.node(4), NodeClass::Selected);
		assert_eq!(classes.node(5), NodeClass::UniquelyCovered);

		assert_eq!(classes.link(0), LinkClass::UniquelyCovered); // 1-2
		assert_eq!(classes.link(1), LinkClass::MultiplyCovered); // 1-3
		assert_eq!(classes.link(2), LinkClass::Plain); // 1-4, both selected
		assert_eq!(classes.link(3), LinkClass::UniquelyCovered); // 4-5
		assert_eq!(classes.link(4), LinkClass::MultiplyCovered); // 3-4
	}

	#[test]
	fn uncovered_nodes_stay_plain_and_their_links_unused() {
		let graph = parse_graph("p edge 4 3\n1 2\n2 3\n3 4\n").unwrap();
		let classes = classes_for(&graph, &[1]);

		assert_eq!(classes.node(3), NodeClass::Plain);
		assert_eq!(classes.node(4), NodeClass::Plain);
		assert_eq!(classes.link(1), LinkClass::Unused);
		assert_eq!(classes.link(2), LinkClass::Unused);
	}

	#[test]
	fn classification_does_not_depend_on_history() {
		let graph = star_plus_tail();
		let a = classes_for(&graph, &[1, 4]);
		let b = classes_for(&graph, &[2, 3, 5]);
		let a_again = classes_for(&graph, &[1, 4]);
		assert_ne!(a, b);
		assert_eq!(a, a_again);
	}

	#[test]
	fn out_of_range_lookups_default_to_plain() {
		let classes = Classification::default();
		assert_eq!(classes.node(0), NodeClass::Plain);
		assert_eq!(classes.node(3), NodeClass::Plain);
		assert_eq!(classes.link(9), LinkClass::Plain);
	}
}

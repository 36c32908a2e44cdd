use std::collections::BTreeSet;

use crate::pace::{Graph, NodeId};

/// Neighbour lookup for every node, each set including the node itself.
///
/// Rebuilt wholesale from a [`Graph`]; never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdjacencyIndex {
	neighbors: Vec<BTreeSet<NodeId>>,
}

impl AdjacencyIndex {
	/// Index of `graph`; edges must already be validated.
	pub fn build(graph: &Graph) -> Self {
		let mut neighbors: Vec<BTreeSet<NodeId>> =
			graph.nodes.iter().map(|&id| BTreeSet::from([id])).collect();

		for edge in &graph.links {
			neighbors[(edge.source - 1) as usize].insert(edge.target);
			neighbors[(edge.target - 1) as usize].insert(edge.source);
		}

		Self { neighbors }
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.neighbors.len()
	}

	/// Whether the index covers no nodes.
	pub fn is_empty(&self) -> bool {
		self.neighbors.is_empty()
	}

	/// Closed neighbourhood of `node`, or `None` if the node is unknown.
	pub fn neighbors(&self, node: NodeId) -> Option<&BTreeSet<NodeId>> {
		let slot = (node as usize).checked_sub(1)?;
		self.neighbors.get(slot)
	}

	/// Number of incident edges. Zero for unknown nodes.
	pub fn degree(&self, node: NodeId) -> usize {
		self.neighbors(node).map_or(0, |n| n.len() - 1)
	}

	/// True when `a == b` or an edge joins them.
	pub fn is_adjacent_or_self(&self, a: NodeId, b: NodeId) -> bool {
		self.neighbors(a).is_some_and(|n| n.contains(&b))
	}
}

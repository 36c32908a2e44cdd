use super::adjacency::AdjacencyIndex;
use crate::pace::{Graph, NodeId, Solution};

/// Coverage state of one node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverageEntry {
	/// Whether the node is part of the solution.
	pub in_ds: bool,
	/// Selected nodes dominating this one. A selected node lists only itself.
	pub covered_by: Vec<NodeId>,
}

impl CoverageEntry {
	/// Neither selected nor next to a selected node.
	pub fn is_uncovered(&self) -> bool {
		!self.in_ds && self.covered_by.is_empty()
	}
}

/// Which selected node covers which, for every node of a graph.
///
/// Computed in one pass over the edges and treated as an immutable snapshot:
/// node classes, link classes and tooltips are all derived from the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageModel {
	entries: Vec<CoverageEntry>,
}

impl CoverageModel {
	/// Returns `None` without a graph. Solution members outside the graph are ignored.
	pub fn compute(graph: Option<&Graph>, solution: Option<&Solution>) -> Option<Self> {
		let graph = graph?;
		let mut entries = vec![CoverageEntry::default(); graph.num_nodes()];

		if let Some(solution) = solution {
			for node in solution.iter().filter(|&u| graph.contains(u)) {
				let entry = &mut entries[(node - 1) as usize];
				entry.in_ds = true;
				entry.covered_by = vec![node];
			}
		}

		for edge in &graph.links {
			let (u, v) = ((edge.source - 1) as usize, (edge.target - 1) as usize);
			if entries[u].in_ds && !entries[v].in_ds {
				entries[v].covered_by.push(edge.source);
			}
			if entries[v].in_ds && !entries[u].in_ds {
				entries[u].covered_by.push(edge.target);
			}
		}

		Some(Self { entries })
	}

	/// Coverage of `node`, `None` for ids outside the graph.
	pub fn entry(&self, node: NodeId) -> Option<&CoverageEntry> {
		let slot = (node as usize).checked_sub(1)?;
		self.entries.get(slot)
	}

	/// `(node, entry)` pairs in node order.
	pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CoverageEntry)> {
		self.entries
			.iter()
			.enumerate()
			.map(|(i, e)| (i as NodeId + 1, e))
	}

	/// Nodes neither selected nor adjacent to a selected node.
	pub fn uncovered(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.iter()
			.filter(|(_, e)| e.is_uncovered())
			.map(|(id, _)| id)
	}

	/// Whether every node is selected or covered.
	pub fn is_dominating(&self) -> bool {
		self.uncovered().next().is_none()
	}

	/// Number of selected nodes inside the graph.
	pub fn selected_count(&self) -> usize {
		self.entries.iter().filter(|e| e.in_ds).count()
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the graph has no nodes.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Tooltip text for a node: id and degree, then its coverage if any.
pub fn describe_node(
	node: NodeId,
	adjacency: &AdjacencyIndex,
	coverage: Option<&CoverageModel>,
) -> String {
	let mut text = format!("Node {node}, Degree: {}", adjacency.degree(node));
	if let Some(entry) = coverage.and_then(|c| c.entry(node)) {
		if entry.in_ds {
			text.push_str("\nIn DomSet");
		} else {
			let by: Vec<String> = entry.covered_by.iter().map(|u| u.to_string()).collect();
			text.push_str(&format!(
				"\nCoverage {} by node(s) [{}]",
				entry.covered_by.len(),
				by.join(", ")
			));
		}
	}
	text
}

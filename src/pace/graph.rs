use super::PROBLEM_ID;

/// 1-based node identifier, dense in `1..=num_nodes`.
pub type NodeId = u32;

/// Graphs with at least this many nodes are only drawn after explicit confirmation.
pub const AUTO_RENDER_THRESHOLD: usize = 100;

/// An undirected edge between two distinct nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
	/// First endpoint as written in the file.
	pub source: NodeId,
	/// Second endpoint as written in the file.
	pub target: NodeId,
}

impl Edge {
	/// Edge between `source` and `target`, in that order.
	pub fn new(source: NodeId, target: NodeId) -> Self {
		Self { source, target }
	}

	/// The same edge with the smaller endpoint first.
	pub fn normalized(&self) -> Self {
		if self.source <= self.target {
			*self
		} else {
			Self::new(self.target, self.source)
		}
	}

	/// Whether `node` is one of the endpoints.
	pub fn is_incident_to(&self, node: NodeId) -> bool {
		self.source == node || self.target == node
	}
}

/// A parsed instance: nodes `1..=N` and the edge list in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
	/// Format tag of the header, `ds` for dominating set.
	pub problem_id: String,
	/// `1..=N` in order.
	pub nodes: Vec<NodeId>,
	/// Edges as written, endpoints not reordered.
	pub links: Vec<Edge>,
}

impl Graph {
	/// Builds a graph over `1..=num_nodes`. Callers are responsible for edge validity.
	pub fn new(num_nodes: NodeId, links: Vec<Edge>) -> Self {
		Self {
			problem_id: PROBLEM_ID.to_string(),
			nodes: (1..=num_nodes).collect(),
			links,
		}
	}

	/// Declared node count `N`.
	pub fn num_nodes(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn num_edges(&self) -> usize {
		self.links.len()
	}

	/// Whether `node` lies in `1..=N`.
	pub fn contains(&self, node: NodeId) -> bool {
		node >= 1 && (node as usize) <= self.nodes.len()
	}

	/// Edges with the smaller endpoint first, in file order.
	pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
		self.links.iter().map(Edge::normalized)
	}

	/// See [`exceeds_auto_render_threshold`].
	pub fn exceeds_auto_render_threshold(&self) -> bool {
		exceeds_auto_render_threshold(self)
	}
}

/// Whether the graph is too large to visualize without asking first.
pub fn exceeds_auto_render_threshold(graph: &Graph) -> bool {
	exceeds_render_threshold(graph.num_nodes(), AUTO_RENDER_THRESHOLD)
}

/// Size guard for a node count known before the graph itself, e.g. from
/// instance metadata, against a configurable `threshold`.
pub fn exceeds_render_threshold(num_nodes: usize, threshold: usize) -> bool {
	num_nodes >= threshold
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalized_orders_endpoints() {
		assert_eq!(Edge::new(4, 2).normalized(), Edge::new(2, 4));
		assert_eq!(Edge::new(2, 4).normalized(), Edge::new(2, 4));
	}

	#[test]
	fn threshold_is_exclusive_below_one_hundred() {
		assert!(!Graph::new(99, Vec::new()).exceeds_auto_render_threshold());
		assert!(Graph::new(100, Vec::new()).exceeds_auto_render_threshold());
	}

	#[test]
	fn threshold_can_be_overridden() {
		assert!(!exceeds_render_threshold(249, 250));
		assert!(exceeds_render_threshold(250, 250));
		assert!(exceeds_render_threshold(0, 0));
	}

	#[test]
	fn contains_is_one_based() {
		let graph = Graph::new(3, Vec::new());
		assert!(!graph.contains(0));
		assert!(graph.contains(1));
		assert!(graph.contains(3));
		assert!(!graph.contains(4));
	}
}

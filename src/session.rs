//! The active graph, solution and derived views of one instance page.
//!
//! Everything handed out is a shared snapshot; a change replaces the snapshot
//! wholesale instead of mutating it.

use std::sync::Arc;

use log::{info, warn};

use crate::domset::{AdjacencyIndex, CoverageModel};
use crate::pace::{FormatError, Graph, Solution, parse_graph, parse_solution};

/// Identifies one solution request. Only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Graph, solution and coverage of the page, replaced as whole snapshots.
#[derive(Debug, Default)]
pub struct Session {
	graph: Option<Arc<Graph>>,
	adjacency: Option<Arc<AdjacencyIndex>>,
	solution: Option<Arc<Solution>>,
	coverage: Option<Arc<CoverageModel>>,
	latest_request: u64,
}

impl Session {
	/// Empty session: no graph, no solution.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses and installs a graph, then recomputes coverage.
	///
	/// An active solution that names nodes outside the new graph is dropped.
	pub fn load_graph(&mut self, text: &str) -> Result<Arc<Graph>, FormatError> {
		let graph = parse_graph(text)?;
		info!(
			"loaded graph with {} nodes and {} edges",
			graph.num_nodes(),
			graph.num_edges()
		);
		Ok(self.set_graph(graph))
	}

	/// Installs an already parsed graph; see [`Session::load_graph`].
	pub fn set_graph(&mut self, graph: Graph) -> Arc<Graph> {
		if let Some(solution) = &self.solution {
			if let Err(err) = solution.validate_for(&graph) {
				warn!("dropping active solution: {err}");
				self.solution = None;
			}
		}
		let graph = Arc::new(graph);
		self.adjacency = Some(Arc::new(AdjacencyIndex::build(&graph)));
		self.graph = Some(graph.clone());
		self.recompute();
		graph
	}

	/// Parses a solution and checks it against the loaded graph, if any.
	pub fn load_solution(&self, text: &str) -> Result<Solution, FormatError> {
		let solution = parse_solution(text)?;
		if let Some(graph) = &self.graph {
			solution.validate_for(graph)?;
		}
		Ok(solution)
	}

	/// Replaces the active solution (or clears it) and recomputes coverage.
	///
	/// A solution that does not fit the loaded graph is refused and the
	/// current state is kept. Without a graph the check waits for
	/// [`Session::set_graph`].
	pub fn set_active_solution(
		&mut self,
		solution: Option<Arc<Solution>>,
	) -> Result<(), FormatError> {
		if let (Some(solution), Some(graph)) = (&solution, &self.graph) {
			solution.validate_for(graph)?;
		}
		self.solution = solution;
		self.recompute();
		Ok(())
	}

	/// Starts a new solution request, superseding every earlier one.
	pub fn begin_solution_request(&mut self) -> RequestTicket {
		self.latest_request += 1;
		RequestTicket(self.latest_request)
	}

	/// Whether `ticket` belongs to the newest request.
	pub fn is_current(&self, ticket: RequestTicket) -> bool {
		ticket.0 == self.latest_request
	}

	/// Applies the result of a solution request unless a newer request was started.
	///
	/// Returns whether the solution became active; a current solution that
	/// does not fit the graph is an error.
	pub fn apply_solution(
		&mut self,
		ticket: RequestTicket,
		solution: Option<Arc<Solution>>,
	) -> Result<bool, FormatError> {
		if !self.is_current(ticket) {
			info!("ignoring stale solution response {:?}", ticket);
			return Ok(false);
		}
		self.set_active_solution(solution)?;
		Ok(true)
	}

	fn recompute(&mut self) {
		self.coverage =
			CoverageModel::compute(self.graph.as_deref(), self.solution.as_deref()).map(Arc::new);
	}

	/// Loaded graph, if any.
	pub fn graph(&self) -> Option<Arc<Graph>> {
		self.graph.clone()
	}

	/// Neighbourhoods of the loaded graph.
	pub fn adjacency(&self) -> Option<Arc<AdjacencyIndex>> {
		self.adjacency.clone()
	}

	/// Active solution, if any.
	pub fn solution(&self) -> Option<Arc<Solution>> {
		self.solution.clone()
	}

	/// Coverage of the active solution; present whenever a graph is loaded.
	pub fn coverage(&self) -> Option<Arc<CoverageModel>> {
		self.coverage.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PATH: &str = "p ds 4 3\n1 2\n2 3\n3 4\n";

	#[test]
	fn coverage_follows_graph_and_solution() {
		let mut session = Session::new();
		assert!(session.coverage().is_none());

		session.load_graph(PATH).unwrap();
		let plain = session.coverage().unwrap();
		assert_eq!(plain.selected_count(), 0);

		let solution = session.load_solution("2\n2\n4\n").unwrap();
		session.set_active_solution(Some(Arc::new(solution))).unwrap();
		let covered = session.coverage().unwrap();
		assert_eq!(covered.selected_count(), 2);
		assert!(covered.is_dominating());

		// earlier snapshots are untouched
		assert_eq!(plain.selected_count(), 0);

		session.set_active_solution(None).unwrap();
		assert_eq!(session.coverage().unwrap().selected_count(), 0);
	}

	#[test]
	fn solution_outside_graph_is_rejected() {
		let mut session = Session::new();
		session.load_graph(PATH).unwrap();
		assert!(session.load_solution("1\n9\n").is_err());
	}

	#[test]
	fn solution_before_graph_is_kept_when_valid() {
		let mut session = Session::new();
		let solution = session.load_solution("1\n3\n").unwrap();
		session.set_active_solution(Some(Arc::new(solution))).unwrap();
		assert!(session.coverage().is_none());

		session.load_graph(PATH).unwrap();
		let coverage = session.coverage().unwrap();
		assert!(coverage.entry(3).unwrap().in_ds);
	}

	#[test]
	fn new_graph_drops_solution_that_no_longer_fits() {
		let mut session = Session::new();
		session.load_graph(PATH).unwrap();
		session
			.set_active_solution(Some(Arc::new(Solution::from_members([4]))))
			.unwrap();

		session.load_graph("p ds 2 1\n1 2\n").unwrap();
		assert!(session.solution().is_none());
		assert_eq!(session.coverage().unwrap().selected_count(), 0);
	}

	#[test]
	fn failed_graph_load_keeps_previous_state() {
		let mut session = Session::new();
		session.load_graph(PATH).unwrap();
		assert!(session.load_graph("p ds 2 2\n1 2\n").is_err());
		assert_eq!(session.graph().unwrap().num_nodes(), 4);
	}

	#[test]
	fn stale_responses_are_not_applied() {
		let mut session = Session::new();
		session.load_graph(PATH).unwrap();

		let first = session.begin_solution_request();
		let second = session.begin_solution_request();

		let newer = Some(Arc::new(Solution::from_members([2, 3])));
		assert_eq!(session.apply_solution(second, newer), Ok(true));
		let older = Some(Arc::new(Solution::from_members([1])));
		assert_eq!(session.apply_solution(first, older), Ok(false));

		let coverage = session.coverage().unwrap();
		assert!(coverage.entry(2).unwrap().in_ds);
		assert!(!coverage.entry(1).unwrap().in_ds);
	}

	#[test]
	fn early_solution_is_checked_again_when_reapplied() {
		let mut session = Session::new();
		// parsed before the graph arrived, so nothing to check against yet
		let early = Arc::new(session.load_solution("2\n2\n9\n").unwrap());
		let ticket = session.begin_solution_request();
		assert_eq!(session.apply_solution(ticket, Some(early.clone())), Ok(true));

		session.load_graph(PATH).unwrap();
		assert!(session.solution().is_none());

		let ticket = session.begin_solution_request();
		assert!(session.apply_solution(ticket, Some(early)).is_err());
		assert!(session.solution().is_none());
		assert_eq!(session.coverage().unwrap().selected_count(), 0);
	}

	#[test]
	fn misfitting_solution_keeps_the_active_one() {
		let mut session = Session::new();
		session.load_graph(PATH).unwrap();
		let fits = Arc::new(Solution::from_members([2, 3]));
		session.set_active_solution(Some(fits.clone())).unwrap();

		let err = session
			.set_active_solution(Some(Arc::new(Solution::from_members([5]))))
			.unwrap_err();
		assert!(err.to_string().contains('5'));
		assert_eq!(session.solution(), Some(fits));
	}
}

//! Per-run memo of fetched results.
//!
//! Entries live for the whole page session and are never evicted; the working
//! set is bounded by how many runs a user opens.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::pace::Solution;

/// Score and runtime distribution of one solver run.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RunPerformance {
	/// Run these figures belong to.
	pub run: Uuid,
	/// Score on each instance of the run.
	pub score: Vec<f32>,
	/// Solver seconds on each instance of the run.
	pub seconds_computed: Vec<f32>,
}

#[derive(Debug)]
enum CacheEntry<T> {
	/// A fetch is in flight.
	Pending,
	Ready(Arc<T>),
}

/// Result of a cache lookup.
#[derive(Debug, PartialEq)]
pub enum Lookup<T> {
	/// Stored value.
	Ready(Arc<T>),
	/// A fetch is in flight.
	Pending,
	/// Never fetched; the caller has to fetch it.
	Missing,
}

/// Memo keyed by run id.
#[derive(Debug)]
pub struct RunCache<T> {
	entries: HashMap<Uuid, CacheEntry<T>>,
}

impl<T> Default for RunCache<T> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}
}

impl<T> RunCache<T> {
	/// Empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Looks `run` up without changing the cache.
	pub fn get(&self, run: &Uuid) -> Lookup<T> {
		match self.entries.get(run) {
			Some(CacheEntry::Ready(value)) => Lookup::Ready(value.clone()),
			Some(CacheEntry::Pending) => Lookup::Pending,
			None => Lookup::Missing,
		}
	}

	/// Stores `value` unconditionally, replacing a pending marker or older value.
	pub fn put(&mut self, run: Uuid, value: T) -> Arc<T> {
		let value = Arc::new(value);
		self.entries.insert(run, CacheEntry::Ready(value.clone()));
		value
	}

	/// Marks `run` as being fetched unless a value is already stored.
	pub fn mark_pending(&mut self, run: Uuid) {
		self.entries.entry(run).or_insert(CacheEntry::Pending);
	}

	/// Marks every run without an entry as pending and returns those runs, in input order.
	pub fn claim_missing<'a>(&mut self, runs: impl IntoIterator<Item = &'a Uuid>) -> Vec<Uuid> {
		let mut claimed = Vec::new();
		for run in runs {
			if !self.entries.contains_key(run) {
				self.entries.insert(*run, CacheEntry::Pending);
				claimed.push(*run);
			}
		}
		claimed
	}

	/// Drops the pending marker of a fetch that failed, so the run can be requested again.
	pub fn release(&mut self, run: &Uuid) {
		if matches!(self.entries.get(run), Some(CacheEntry::Pending)) {
			self.entries.remove(run);
		}
	}

	/// Settles a batch fetch of `claimed` runs: stores whatever arrived, then
	/// frees every claim still pending so those runs can be fetched again.
	/// The fetch error, if any, is handed back.
	pub fn settle<E>(
		&mut self,
		claimed: &[Uuid],
		fetched: Result<impl IntoIterator<Item = (Uuid, T)>, E>,
	) -> Result<(), E> {
		let stored = fetched.map(|values| {
			for (run, value) in values {
				self.put(run, value);
			}
		});
		for run in claimed {
			self.release(run);
		}
		stored
	}

	/// Stored values for `runs`, skipping pending or missing ones.
	pub fn ready<'a>(&self, runs: impl IntoIterator<Item = &'a Uuid>) -> Vec<Arc<T>> {
		runs.into_iter()
			.filter_map(|run| match self.entries.get(run) {
				Some(CacheEntry::Ready(value)) => Some(value.clone()),
				_ => None,
			})
			.collect()
	}

	/// Number of entries, pending ones included.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether nothing was stored or claimed.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Solutions already downloaded, by run.
pub type SolutionCache = RunCache<Solution>;

/// Performance summaries already downloaded, by run.
pub type PerformanceCache = RunCache<RunPerformance>;

#[cfg(test)]
mod tests {
	use super::*;

	fn run(n: u128) -> Uuid {
		Uuid::from_u128(n)
	}

	#[test]
	fn missing_then_ready() {
		let mut cache = SolutionCache::new();
		assert_eq!(cache.get(&run(1)), Lookup::Missing);

		let stored = cache.put(run(1), Solution::from_members([1, 2]));
		match cache.get(&run(1)) {
			Lookup::Ready(found) => assert!(Arc::ptr_eq(&found, &stored)),
			other => panic!("expected a stored solution, got {other:?}"),
		}
		assert_eq!(cache.get(&run(2)), Lookup::Missing);
	}

	#[test]
	fn pending_is_overwritten_by_put() {
		let mut cache = SolutionCache::new();
		cache.mark_pending(run(7));
		assert_eq!(cache.get(&run(7)), Lookup::Pending);

		cache.put(run(7), Solution::from_members([3]));
		assert!(matches!(cache.get(&run(7)), Lookup::Ready(_)));
	}

	#[test]
	fn mark_pending_keeps_stored_values() {
		let mut cache = SolutionCache::new();
		cache.put(run(1), Solution::from_members([3]));
		cache.mark_pending(run(1));
		assert!(matches!(cache.get(&run(1)), Lookup::Ready(_)));
	}

	#[test]
	fn claim_missing_only_returns_unknown_runs() {
		let mut cache = PerformanceCache::new();
		cache.put(
			run(1),
			RunPerformance {
				run: run(1),
				score: vec![1.0],
				seconds_computed: vec![0.5],
			},
		);
		cache.mark_pending(run(2));

		let runs = [run(1), run(2), run(3), run(4)];
		assert_eq!(cache.claim_missing(&runs), vec![run(3), run(4)]);
		assert_eq!(cache.get(&run(3)), Lookup::Pending);
		assert!(cache.claim_missing(&runs).is_empty());
		assert_eq!(cache.ready(&runs).len(), 1);
	}

	#[test]
	fn release_only_drops_pending_entries() {
		let mut cache = SolutionCache::new();
		cache.mark_pending(run(1));
		cache.put(run(2), Solution::from_members([1]));

		cache.release(&run(1));
		cache.release(&run(2));

		assert_eq!(cache.get(&run(1)), Lookup::Missing);
		assert!(matches!(cache.get(&run(2)), Lookup::Ready(_)));
		assert_eq!(cache.len(), 1);
	}

	fn perf(n: u128, score: f32) -> RunPerformance {
		RunPerformance {
			run: run(n),
			score: vec![score],
			seconds_computed: vec![1.0],
		}
	}

	#[test]
	fn settle_stores_answers_and_frees_unanswered_claims() {
		let mut cache = PerformanceCache::new();
		let runs = [run(1), run(2), run(3)];
		let claimed = cache.claim_missing(&runs);

		let answer: Result<_, String> = Ok([perf(1, 4.0), perf(3, 6.0)].map(|p| (p.run, p)));
		assert_eq!(cache.settle(&claimed, answer), Ok(()));

		assert_eq!(cache.ready(&runs).len(), 2);
		assert_eq!(cache.get(&run(2)), Lookup::Missing);
		assert_eq!(cache.claim_missing(&runs), vec![run(2)]);
	}

	#[test]
	fn failed_settle_keeps_earlier_values() {
		let mut cache = PerformanceCache::new();
		cache.put(run(1), perf(1, 2.0));
		let runs = [run(1), run(2)];
		let claimed = cache.claim_missing(&runs);
		assert_eq!(claimed, vec![run(2)]);

		let failed: Result<Vec<(Uuid, RunPerformance)>, &str> = Err("offline");
		assert_eq!(cache.settle(&claimed, failed), Err("offline"));

		assert_eq!(cache.get(&run(2)), Lookup::Missing);
		assert_eq!(cache.ready(&runs), vec![Arc::new(perf(1, 2.0))]);
	}

	#[test]
	fn performance_deserializes_from_api_shape() {
		let json = r#"{
			"run": "00000000-0000-0000-0000-000000000005",
			"score": [1.0, 1.25],
			"seconds_computed": [0.1, 2.0]
		}"#;
		let perf: RunPerformance = serde_json::from_str(json).unwrap();
		assert_eq!(perf.run, run(5));
		assert_eq!(perf.score, vec![1.0, 1.25]);
	}
}

//! HTTP client for the instance and solution endpoints.

use std::cell::RefCell;
use std::sync::Arc;

use gloo_net::http::{Request, Response};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cache::{PerformanceCache, RunPerformance};

/// A request that did not produce the expected answer.
#[derive(Debug, Error)]
pub enum NetworkError {
	/// Transport failure or a body that did not decode.
	#[error(transparent)]
	Request(#[from] gloo_net::Error),
	/// Non-success HTTP status.
	#[error("{url} answered with HTTP {status}")]
	Status {
		/// Requested URL.
		url: String,
		/// Status code of the answer.
		status: u16,
	},
	/// The instance listing had no entry for the id.
	#[error("instance {0} is not listed")]
	UnknownInstance(u32),
}

/// Name, description and size of an instance, as listed by the server.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct InstanceMeta {
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Free-form description, possibly empty.
	#[serde(default)]
	pub description: Option<String>,
	/// Node count, known before the graph itself is downloaded.
	pub nodes: usize,
}

/// One solver run listed for an instance.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SolverSolution {
	/// Run id, used to download the solution.
	pub run: Uuid,
	/// Human-readable run name, when the run has one.
	#[serde(default)]
	pub run_name: Option<String>,
	/// Size of the solution; absent when the run produced none.
	#[serde(default)]
	pub score: Option<u32>,
}

impl SolverSolution {
	/// Option text: run name (or id), then the score.
	pub fn label(&self) -> String {
		let name = self
			.run_name
			.clone()
			.unwrap_or_else(|| self.run.to_string());
		match self.score {
			Some(score) => format!("{name}, score: {score}"),
			None => name,
		}
	}
}

#[derive(Serialize)]
struct InstanceListRequest {
	iid: u32,
}

#[derive(Deserialize)]
struct InstanceList {
	#[serde(default)]
	results: Vec<InstanceMeta>,
}

#[derive(Deserialize)]
struct InstanceSolutions {
	#[serde(default)]
	solver_solutions: Vec<SolverSolution>,
}

#[derive(Serialize)]
struct PerformanceRequest<'a> {
	solver: Uuid,
	runs: &'a [Uuid],
	#[serde(skip_serializing_if = "Option::is_none")]
	instances_of: Option<Uuid>,
}

#[derive(Deserialize)]
struct PerformanceResponse {
	runs: Vec<RunPerformance>,
}

/// Client for the REST endpoints below one base path.
#[derive(Clone, Debug)]
pub struct ApiClient {
	base: String,
}

impl ApiClient {
	/// Client for `base`; a missing trailing slash is added.
	pub fn new(base: impl Into<String>) -> Self {
		let mut base = base.into();
		if !base.ends_with('/') {
			base.push('/');
		}
		Self { base }
	}

	/// Absolute URL of an endpoint path.
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base, path)
	}

	fn check(url: String, response: Response) -> Result<Response, NetworkError> {
		if response.ok() {
			Ok(response)
		} else {
			Err(NetworkError::Status {
				url,
				status: response.status(),
			})
		}
	}

	async fn get(&self, url: String) -> Result<Response, NetworkError> {
		debug!("GET {url}");
		let response = Request::get(&url).send().await?;
		Self::check(url, response)
	}

	async fn post<B: Serialize>(&self, url: String, body: &B) -> Result<Response, NetworkError> {
		debug!("POST {url}");
		let response = Request::post(&url).json(body)?.send().await?;
		Self::check(url, response)
	}

	/// Listing entry of instance `iid`.
	pub async fn instance_meta(&self, iid: u32) -> Result<InstanceMeta, NetworkError> {
		let response = self
			.post(self.url("instances/list"), &InstanceListRequest { iid })
			.await?;
		let listing = response.json::<InstanceList>().await?;
		first_listed(listing, iid)
	}

	/// Graph text of an instance.
	pub async fn instance_text(&self, iid: u32) -> Result<String, NetworkError> {
		let response = self.get(self.url(&format!("instances/download/{iid}"))).await?;
		Ok(response.text().await?)
	}

	/// Runs of `solver` on instance `iid`, in server order.
	pub async fn instance_solutions(
		&self,
		iid: u32,
		solver: Uuid,
	) -> Result<Vec<SolverSolution>, NetworkError> {
		let url = self.url(&format!("instance_solutions?iid={iid}&solver={solver}"));
		let response = self.get(url).await?;
		Ok(response.json::<InstanceSolutions>().await?.solver_solutions)
	}

	/// Solution text of one run.
	pub async fn solution_text(
		&self,
		iid: u32,
		solver: Uuid,
		run: Uuid,
	) -> Result<String, NetworkError> {
		let url = self.url(&format!(
			"solutions/download?iid={iid}&solver={solver}&run={run}"
		));
		let response = self.get(url).await?;
		Ok(response.text().await?)
	}

	/// Score and runtime figures of `runs`, optionally restricted to the
	/// instances of another run.
	pub async fn run_performance(
		&self,
		solver: Uuid,
		runs: &[Uuid],
		instances_of: Option<Uuid>,
	) -> Result<Vec<RunPerformance>, NetworkError> {
		let body = PerformanceRequest {
			solver,
			runs,
			instances_of,
		};
		let response = self.post(self.url("solver_run/performance"), &body).await?;
		Ok(response.json::<PerformanceResponse>().await?.runs)
	}

	/// Fetches performance for the runs the cache does not know yet, then
	/// returns every cached entry for `runs`.
	pub async fn load_run_performance(
		&self,
		cache: &RefCell<PerformanceCache>,
		solver: Uuid,
		runs: &[Uuid],
		instances_of: Option<Uuid>,
	) -> Result<Vec<Arc<RunPerformance>>, NetworkError> {
		let missing = cache.borrow_mut().claim_missing(runs);
		if !missing.is_empty() {
			let fetched = self.run_performance(solver, &missing, instances_of).await;
			let fetched = fetched.map(|runs| runs.into_iter().map(|perf| (perf.run, perf)));
			let settled = cache.borrow_mut().settle(&missing, fetched);
			if let Err(err) = settled {
				warn!("performance request failed: {err}");
				return Err(err);
			}
		}
		Ok(cache.borrow().ready(runs))
	}
}

fn first_listed(listing: InstanceList, iid: u32) -> Result<InstanceMeta, NetworkError> {
	listing
		.results
		.into_iter()
		.next()
		.ok_or(NetworkError::UnknownInstance(iid))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_are_relative_to_base() {
		assert_eq!(ApiClient::new("/api").url("instances/download/3"), "/api/instances/download/3");
		assert_eq!(ApiClient::new("/api/").url("x"), "/api/x");
	}

	#[test]
	fn solution_listing_shape() {
		let json = r#"{"solver_solutions":[
			{"run":"f47ac10b-58cc-4372-a567-0e02b2c3d479","run_name":"greedy","score":12},
			{"run":"6ba7b810-9dad-11d1-80b4-00c04fd430c8"}
		]}"#;
		let listing: InstanceSolutions = serde_json::from_str(json).unwrap();
		assert_eq!(listing.solver_solutions.len(), 2);
		assert_eq!(listing.solver_solutions[0].label(), "greedy, score: 12");
		assert_eq!(
			listing.solver_solutions[1].label(),
			"6ba7b810-9dad-11d1-80b4-00c04fd430c8"
		);

		let empty: InstanceSolutions = serde_json::from_str("{}").unwrap();
		assert!(empty.solver_solutions.is_empty());
	}

	#[test]
	fn instance_listing_shape() {
		let json = r#"{"results": [
			{"iid": 4, "name": "tiny-path", "description": null, "nodes": 250, "edges": 249}
		]}"#;
		let listing: InstanceList = serde_json::from_str(json).unwrap();
		let meta = first_listed(listing, 4).unwrap();
		assert_eq!(meta.name, "tiny-path");
		assert_eq!(meta.description, None);
		assert_eq!(meta.nodes, 250);

		let body = serde_json::to_string(&InstanceListRequest { iid: 4 }).unwrap();
		assert_eq!(body, r#"{"iid":4}"#);
	}

	#[test]
	fn unlisted_instance_is_an_error() {
		let listing: InstanceList = serde_json::from_str(r#"{"results":[]}"#).unwrap();
		let err = first_listed(listing, 9).unwrap_err();
		assert!(matches!(err, NetworkError::UnknownInstance(9)));
		assert_eq!(err.to_string(), "instance 9 is not listed");
	}

	#[test]
	fn performance_request_shape() {
		let runs = [Uuid::from_u128(1)];
		let body = serde_json::to_value(PerformanceRequest {
			solver: Uuid::from_u128(2),
			runs: &runs,
			instances_of: None,
		})
		.unwrap();
		assert_eq!(body["runs"][0], "00000000-0000-0000-0000-000000000001");
		assert!(body.get("instances_of").is_none());
	}
}

//! Query parameters of the instance page.

use log::warn;
use thiserror::Error;
use uuid::{Uuid, Variant};

/// A page parameter that is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputValidationError {
	/// No `iid` parameter.
	#[error("no instance id given")]
	MissingInstanceId,
	/// `iid` is not a non-negative integer.
	#[error("invalid instance id `{0}`")]
	InvalidInstanceId(String),
	/// `solver` is not a UUID.
	#[error("invalid solver id `{0}`")]
	InvalidSolver(String),
	/// `run` is not a UUID.
	#[error("invalid run id `{0}`")]
	InvalidRun(String),
}

impl InputValidationError {
	/// Whether the page cannot be shown at all.
	pub fn is_fatal(&self) -> bool {
		matches!(
			self,
			InputValidationError::MissingInstanceId | InputValidationError::InvalidInstanceId(_)
		)
	}
}

/// Accepts only hyphenated RFC 4122 UUIDs of versions 1 to 5.
pub fn parse_uuid(text: &str) -> Option<Uuid> {
	if text.len() != 36 {
		return None;
	}
	let id = Uuid::parse_str(text).ok()?;
	let version_ok = (1..=5).contains(&id.get_version_num());
	(version_ok && id.get_variant() == Variant::RFC4122).then_some(id)
}

/// Validated parameters of the instance page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
	/// Instance to show.
	pub iid: u32,
	/// Solver whose runs are offered; without it no solution can be picked.
	pub solver: Option<Uuid>,
	/// Run to show first.
	pub run: Option<Uuid>,
	/// Optional parameters that were present but malformed, and therefore ignored.
	pub rejected: Vec<InputValidationError>,
}

impl PageParams {
	/// Validates raw parameter values. Only a missing or bad `iid` is an error.
	pub fn parse(
		iid: Option<&str>,
		solver: Option<&str>,
		run: Option<&str>,
	) -> Result<Self, InputValidationError> {
		let iid = iid.ok_or(InputValidationError::MissingInstanceId)?;
		let iid = iid
			.trim()
			.parse::<u32>()
			.map_err(|_| InputValidationError::InvalidInstanceId(iid.to_owned()))?;

		let mut rejected = Vec::new();
		let mut optional = |text: Option<&str>, err: fn(String) -> InputValidationError| {
			let text = text?;
			let id = parse_uuid(text);
			if id.is_none() {
				rejected.push(err(text.to_owned()));
			}
			id
		};
		let solver = optional(solver, InputValidationError::InvalidSolver);
		let run = optional(run, InputValidationError::InvalidRun);

		Ok(Self {
			iid,
			solver,
			run,
			rejected,
		})
	}

	/// Reads `iid`, `solver` and `run` from the current location.
	pub fn from_location() -> Result<Self, InputValidationError> {
		let search = web_sys::window()
			.and_then(|w| w.location().search().ok())
			.unwrap_or_default();
		let query = web_sys::UrlSearchParams::new_with_str(&search).ok();
		let get = |key: &str| query.as_ref().and_then(|q| q.get(key));
		Self::parse(
			get("iid").as_deref(),
			get("solver").as_deref(),
			get("run").as_deref(),
		)
	}
}

/// Tells the user about a bad parameter, leaving the page for fatal ones.
pub fn report(err: &InputValidationError) {
	warn!("{err}");
	let Some(window) = web_sys::window() else {
		return;
	};
	let _ = window.alert_with_message(&err.to_string());
	if err.is_fatal() {
		let _ = window.location().set_href("/");
	}
}

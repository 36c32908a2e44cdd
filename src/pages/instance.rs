//! The instance page: graph view, solution picker, link strength and legend.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};
use uuid::Uuid;

use crate::api::{ApiClient, InstanceMeta, SolverSolution};
use crate::cache::{Lookup, SolutionCache};
use crate::components::force_graph::{ForceGraphCanvas, GraphView, NodeClass, Theme};
use crate::config::ViewerConfig;
use crate::domset::CoverageModel;
use crate::pace::{Solution, exceeds_render_threshold};
use crate::params::{PageParams, parse_uuid};
use crate::session::{RequestTicket, Session};

const NO_SOLUTION: &str = "none";

#[derive(Clone, Debug, PartialEq)]
enum GraphStatus {
	Loading,
	/// Large graph held back until the user asks for it; carries its node count.
	AwaitingConfirmation(usize),
	Ready,
	Failed(String),
}

fn status_text(status: &GraphStatus) -> String {
	match status {
		GraphStatus::Loading => "Loading instance...".into(),
		GraphStatus::AwaitingConfirmation(n) => {
			format!("This graph has {n} nodes; drawing it may be slow.")
		}
		GraphStatus::Ready => String::new(),
		GraphStatus::Failed(err) => format!("Could not load instance: {err}"),
	}
}

fn coverage_summary(coverage: &CoverageModel) -> String {
	let selected = coverage.selected_count();
	if selected == 0 {
		return String::new();
	}
	match coverage.uncovered().count() {
		0 => format!("{selected} selected, dominating"),
		missing => format!("{selected} selected, {missing} not covered"),
	}
}

fn title(iid: u32, meta: Option<&InstanceMeta>) -> String {
	match meta {
		Some(meta) if !meta.name.is_empty() => format!("Instance: {}", meta.name),
		_ => format!("Instance {iid}"),
	}
}

fn current_view(session: &Session) -> Option<GraphView> {
	Some(GraphView {
		graph: session.graph()?,
		adjacency: session.adjacency()?,
	})
}

/// Downloads the graph and hands it to the canvas.
#[derive(Clone)]
struct GraphLoader {
	api: ApiClient,
	session: Rc<RefCell<Session>>,
	iid: u32,
	status: RwSignal<GraphStatus>,
	graph_view: RwSignal<Option<GraphView>>,
	coverage: RwSignal<Option<Arc<CoverageModel>>>,
	solution_error: RwSignal<Option<String>>,
}

impl GraphLoader {
	/// Fetches and parses the graph. With a `guard` threshold a large graph
	/// waits for confirmation instead of being drawn.
	fn load(&self, guard: Option<usize>) {
		self.status.set(GraphStatus::Loading);
		let loader = self.clone();
		spawn_local(async move {
			let iid = loader.iid;
			let text = match loader.api.instance_text(iid).await {
				Ok(text) => text,
				Err(err) => {
					warn!("instance {iid}: {err}");
					loader.status.set(GraphStatus::Failed(err.to_string()));
					return;
				}
			};
			let had_solution = loader.session.borrow().solution().is_some();
			let loaded = loader.session.borrow_mut().load_graph(&text);
			match loaded {
				Ok(graph) => {
					// a solution that arrived first is only checked now
					if had_solution && loader.session.borrow().solution().is_none() {
						let message = "Solution rejected: it names nodes outside the instance";
						loader.solution_error.set(Some(message.into()));
					}
					loader.coverage.set(loader.session.borrow().coverage());
					let nodes = graph.num_nodes();
					match guard {
						Some(threshold) if exceeds_render_threshold(nodes, threshold) => {
							info!("instance {iid} has {nodes} nodes, waiting for confirmation");
							loader.status.set(GraphStatus::AwaitingConfirmation(nodes));
						}
						_ => loader.show(),
					}
				}
				Err(err) => {
					warn!("instance {iid}: {err}");
					loader.status.set(GraphStatus::Failed(err.to_string()));
				}
			}
		});
	}

	fn show(&self) {
		self.graph_view.set(current_view(&self.session.borrow()));
		self.status.set(GraphStatus::Ready);
	}

	/// Draws a held-back graph, downloading it first if only its size was known.
	fn confirm(&self) {
		let downloaded = self.session.borrow().graph().is_some();
		if downloaded {
			self.show();
		} else {
			self.load(None);
		}
	}
}

/// Fetches solutions on demand and applies them in request order.
#[derive(Clone)]
struct SolutionLoader {
	api: ApiClient,
	session: Rc<RefCell<Session>>,
	cache: Rc<RefCell<SolutionCache>>,
	coverage: RwSignal<Option<Arc<CoverageModel>>>,
	error: RwSignal<Option<String>>,
	iid: u32,
	solver: Option<Uuid>,
}

impl SolutionLoader {
	/// Applies a finished request and shows the outcome.
	fn apply(&self, ticket: RequestTicket, solution: Option<Arc<Solution>>) {
		let applied = self.session.borrow_mut().apply_solution(ticket, solution);
		match applied {
			Ok(true) => {
				self.error.set(None);
				self.coverage.set(self.session.borrow().coverage());
			}
			Ok(false) => {}
			Err(err) => {
				warn!("solution does not fit instance {}: {err}", self.iid);
				self.error.set(Some(format!("Solution rejected: {err}")));
			}
		}
	}

	/// Shows the solution of `run`, or clears the view for `None`.
	fn select(&self, run: Option<Uuid>) {
		let ticket = self.session.borrow_mut().begin_solution_request();
		let (Some(run), Some(solver)) = (run, self.solver) else {
			self.apply(ticket, None);
			return;
		};

		let cached = self.cache.borrow().get(&run);
		if let Lookup::Ready(solution) = cached {
			self.apply(ticket, Some(solution));
			return;
		}

		self.cache.borrow_mut().mark_pending(run);
		let loader = self.clone();
		spawn_local(async move {
			let parsed = match loader.api.solution_text(loader.iid, solver, run).await {
				Ok(text) => loader
					.session
					.borrow()
					.load_solution(&text)
					.map_err(|e| e.to_string()),
				Err(e) => Err(e.to_string()),
			};
			match parsed {
				Ok(solution) => {
					let solution = loader.cache.borrow_mut().put(run, solution);
					info!("loaded solution of run {run} with {} nodes", solution.len());
					loader.apply(ticket, Some(solution));
				}
				Err(err) => {
					loader.cache.borrow_mut().release(&run);
					warn!("solution of run {run}: {err}");
					if loader.session.borrow().is_current(ticket) {
						loader.error.set(Some(format!("Could not load solution: {err}")));
					}
				}
			}
		});
	}
}

/// Shows instance `params.iid` and, given a solver, lets the user pick one of its runs.
#[component]
pub fn InstancePage(params: PageParams, config: ViewerConfig) -> impl IntoView {
	let PageParams {
		iid, solver, run, ..
	} = params;
	let api = ApiClient::new(config.api_base.clone());
	let session = Rc::new(RefCell::new(Session::new()));

	let status = RwSignal::new(GraphStatus::Loading);
	let graph_view = RwSignal::new(None::<GraphView>);
	let coverage = RwSignal::new(None::<Arc<CoverageModel>>);
	let strength = RwSignal::new(config.initial_strength());
	let runs = RwSignal::new(Vec::<SolverSolution>::new());
	let meta = RwSignal::new(None::<InstanceMeta>);
	let solution_error = RwSignal::new(None::<String>);
	let selected = RwSignal::new(NO_SOLUTION.to_string());
	let theme = Theme::by_name(&config.theme);
	let threshold = config.auto_render_threshold;

	let loader = SolutionLoader {
		api: api.clone(),
		session: session.clone(),
		cache: Rc::new(RefCell::new(SolutionCache::new())),
		coverage,
		error: solution_error,
		iid,
		solver,
	};
	let graphs = GraphLoader {
		api: api.clone(),
		session: session.clone(),
		iid,
		status,
		graph_view,
		coverage,
		solution_error,
	};

	// the listing gives the size up front, so a large graph is not even downloaded
	{
		let (api, graphs) = (api.clone(), graphs.clone());
		spawn_local(async move {
			match api.instance_meta(iid).await {
				Ok(found) => {
					let nodes = found.nodes;
					meta.set(Some(found));
					if exceeds_render_threshold(nodes, threshold) {
						info!("instance {iid} has {nodes} nodes, waiting for confirmation");
						status.set(GraphStatus::AwaitingConfirmation(nodes));
					} else {
						graphs.load(None);
					}
				}
				Err(err) => {
					warn!("listing of instance {iid}: {err}");
					graphs.load(Some(threshold));
				}
			}
		});
	}

	if let Some(solver) = solver {
		let (api, loader) = (api.clone(), loader.clone());
		spawn_local(async move {
			match api.instance_solutions(iid, solver).await {
				Ok(list) => {
					let list: Vec<_> = list.into_iter().filter(|s| s.score.is_some()).collect();
					let initial = run.or_else(|| list.last().map(|s| s.run));
					runs.set(list);
					if let Some(initial) = initial {
						selected.set(initial.to_string());
						loader.select(Some(initial));
					}
				}
				Err(err) => warn!("solutions of instance {iid}: {err}"),
			}
		});
	}

	let confirm = move |_| graphs.confirm();

	let on_select = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		let run = parse_uuid(&value);
		selected.set(value);
		loader.select(run);
	};

	let on_strength = move |ev: leptos::ev::Event| {
		if let Ok(value) = event_target_value(&ev).parse::<u32>() {
			strength.set(value);
		}
	};

	let solution_picker = solver.map(|_| {
		view! {
			<label class="solution-picker">
				<select on:change=on_select prop:value=move || selected.get()>
					<option value=NO_SOLUTION>"Solution to visualize"</option>
					{move || {
						runs.get()
							.into_iter()
							.map(|s| view! { <option value=s.run.to_string()>{s.label()}</option> })
							.collect_view()
					}}
				</select>
			</label>
		}
	});

	let legend = NodeClass::LEGEND
		.into_iter()
		.map(|class| {
			let swatch = format!("background-color: {}", theme.node.color(class).to_css());
			view! {
				<li>
					<span class="legend-swatch" style=swatch></span>
					{class.label()}
				</li>
			}
		})
		.collect_view();

	view! {
		<div class="instance-page">
			<header class="instance-header">
				<h1>{move || title(iid, meta.get().as_ref())}</h1>
				<a href=api.url(&format!("instances/download/{iid}"))>"Download"</a>
			</header>
			<p class="instance-description">
				{move || meta.get().and_then(|m| m.description)}
			</p>
			<div class="instance-controls">
				{solution_picker}
				<label class="strength-slider">
					"Link strength "
					<input
						type="range"
						min="0"
						max=config.strength_slider_max.to_string()
						prop:value=move || strength.get().to_string()
						on:input=on_strength
					/>
				</label>
				<span class="coverage-summary">
					{move || coverage.get().map(|c| coverage_summary(&c)).unwrap_or_default()}
				</span>
			</div>
			<p class="solution-error">{move || solution_error.get()}</p>
			<ul class="legend">{legend}</ul>
			<p class="graph-status">{move || status_text(&status.get())}</p>
			<button
				class="graph-confirm"
				style:display=move || {
					if matches!(status.get(), GraphStatus::AwaitingConfirmation(_)) {
						"inline-block"
					} else {
						"none"
					}
				}
				on:click=confirm
			>
				"Draw anyway"
			</button>
			<div class="graph-container">
				<ForceGraphCanvas
					graph=graph_view
					coverage=coverage
					strength=strength
					strength_max=config.strength_slider_max
					layout=config.layout.clone()
					theme=theme
				/>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pace::parse_graph;

	#[test]
	fn status_messages() {
		assert_eq!(status_text(&GraphStatus::Ready), "");
		assert!(status_text(&GraphStatus::AwaitingConfirmation(250)).contains("250 nodes"));
		assert!(status_text(&GraphStatus::Failed("line 2: bad".into())).ends_with("line 2: bad"));
	}

	#[test]
	fn summary_reports_domination() {
		let graph = parse_graph("p ds 4 3\n1 2\n2 3\n3 4\n").unwrap();
		let summary = |members: &[u32]| {
			let solution = Solution::from_members(members.iter().copied());
			let coverage = CoverageModel::compute(Some(&graph), Some(&solution)).unwrap();
			coverage_summary(&coverage)
		};
		assert_eq!(summary(&[]), "");
		assert_eq!(summary(&[2]), "1 selected, 1 not covered");
		assert_eq!(summary(&[2, 3]), "2 selected, dominating");
	}

	#[test]
	fn title_prefers_the_listed_name() {
		let listed = |name: &str| InstanceMeta {
			name: name.into(),
			description: None,
			nodes: 12,
		};
		assert_eq!(title(7, None), "Instance 7");
		assert_eq!(title(7, Some(&listed("bremen-subgraph"))), "Instance: bremen-subgraph");
		assert_eq!(title(7, Some(&listed(""))), "Instance 7");
	}

	#[test]
	fn session_view_needs_a_graph() {
		let mut session = Session::new();
		assert!(current_view(&session).is_none());
		session.load_graph("p ds 2 1\n1 2\n").unwrap();
		let view = current_view(&session).unwrap();
		assert_eq!(view.adjacency.degree(1), 1);
	}
}

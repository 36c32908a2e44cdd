//! Force-directed layout of a dominating-set instance.
//!
//! Pairwise charge and velocity integration come from `force_graph`; link
//! springs with per-link strength, collision and centering are applied on top,
//! all scaled by a cooling energy `alpha`. The engine never draws: every step
//! is reported to a [`LayoutObserver`].

use std::f64::consts::PI;

use force_graph::{ForceGraph, NodeData, SimulationParameters};
use serde::Deserialize;

use super::types::{Classification, classify};
use crate::domset::{AdjacencyIndex, CoverageModel};
use crate::pace::{Graph, NodeId};

/// Tuning of the simulation.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutParams {
	/// Pairwise repulsion handed to `force_graph`.
	pub charge: f64,
	/// Cap on the charge force per node and step.
	pub max_force: f64,
	/// Velocity scale of the `force_graph` integrator.
	pub node_speed: f64,
	/// Velocity kept between steps.
	pub damping: f64,
	/// Rest length of every link.
	pub link_distance: f64,
	/// Nodes keep at least twice this apart.
	pub collide_radius: f64,
	/// Share of an overlap resolved per step.
	pub collide_strength: f64,
	/// Pull of the centroid towards the origin.
	pub center_strength: f64,
	/// Below this energy the layout counts as cooled.
	pub alpha_min: f64,
	/// Fraction of the gap to the target energy closed per step.
	pub alpha_decay: f64,
	/// Energy kept up while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge: 150.0,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			link_distance: 30.0,
			collide_radius: 20.0,
			collide_strength: 0.7,
			center_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
		}
	}
}

/// Lifecycle of one mounted layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
	/// Moving freely, cooling down.
	Simulating,
	/// A node is held by the pointer.
	Dragging,
	/// Torn down; the engine never moves again.
	Stopped,
}

/// One simulation step as seen by the renderer.
#[derive(Debug)]
pub struct LayoutFrame<'a> {
	/// Node positions indexed by `id - 1`.
	pub positions: &'a [(f64, f64)],
	/// Energy after this step.
	pub alpha: f64,
}

/// Receives layout output. Implemented by whatever draws the graph.
pub trait LayoutObserver {
	/// Called after every step.
	fn on_tick(&mut self, frame: &LayoutFrame<'_>);
	/// Called whenever node and link classes change.
	fn on_classify(&mut self, classes: &Classification);
}

/// Position of the link strength slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrengthSlider {
	/// Current position.
	pub value: u32,
	/// Upper end of the range.
	pub max: u32,
}

impl Default for StrengthSlider {
	fn default() -> Self {
		Self { value: 50, max: 100 }
	}
}

impl StrengthSlider {
	/// `value / max * 1.5`, with `value` clamped to `max`.
	pub fn base(self) -> f64 {
		if self.max == 0 {
			return 0.0;
		}
		f64::from(self.value.min(self.max)) / f64::from(self.max) * 1.5
	}
}

/// Links across the solution boundary pull at full strength, the rest at a quarter.
pub fn cross_boundary_factor(source_selected: Option<bool>, target_selected: Option<bool>) -> f64 {
	match (source_selected, target_selected) {
		(Some(a), Some(b)) if a == b => 0.25,
		_ => 1.0,
	}
}

/// Weakens links between high-degree nodes.
pub fn degree_damping(source_degree: usize, target_degree: usize) -> f64 {
	0.5 / ((source_degree + 1) as f64).sqrt() + 0.5 / ((target_degree + 1) as f64).sqrt()
}

/// Spring strength of one link from its three factors.
pub fn link_strength(base: f64, cross_boundary: f64, damping: f64) -> f64 {
	base * cross_boundary * damping
}

/// Reports the classification of `graph` under `coverage` and returns it.
pub fn update_classification(
	graph: &Graph,
	coverage: Option<&CoverageModel>,
	observer: &mut impl LayoutObserver,
) -> Classification {
	let classes = classify(graph, coverage);
	observer.on_classify(&classes);
	classes
}

#[derive(Clone, Debug)]
struct SimLink {
	source: usize,
	target: usize,
	/// Share of the correction applied to the target.
	bias: f64,
	strength: f64,
}

/// Tiny deterministic offset for coincident points.
fn jiggle(seed: usize) -> f64 {
	1e-6 * (1 + seed % 7) as f64
}

/// Simulation of one mounted graph, from mount until teardown.
pub struct ForceLayoutEngine {
	sim: ForceGraph<NodeId, ()>,
	positions: Vec<(f64, f64)>,
	degrees: Vec<usize>,
	links: Vec<SimLink>,
	/// Solution membership by slot, if coverage is loaded.
	selected: Option<Vec<bool>>,
	slider: StrengthSlider,
	params: LayoutParams,
	alpha: f64,
	alpha_target: f64,
	phase: LayoutPhase,
	/// Dragged slot and the position it is held at.
	pinned: Option<(usize, (f64, f64))>,
}

impl ForceLayoutEngine {
	/// Places the nodes on a circle around the origin and starts simulating.
	pub fn mount(
		graph: &Graph,
		adjacency: &AdjacencyIndex,
		width: f64,
		height: f64,
		params: LayoutParams,
	) -> Self {
		let mut sim = ForceGraph::new(SimulationParameters {
			force_charge: params.charge as _,
			force_spring: 0.0,
			force_max: params.max_force as _,
			node_speed: params.node_speed as _,
			damping_factor: params.damping as _,
		});

		let count = graph.num_nodes();
		let radius = (width.min(height) / 4.0).max(params.collide_radius);
		let mut positions = Vec::with_capacity(count);
		for (i, &id) in graph.nodes.iter().enumerate() {
			let angle = i as f64 * 2.0 * PI / count.max(1) as f64;
			let (x, y) = (radius * angle.cos(), radius * angle.sin());
			sim.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: id,
			});
			positions.push((x, y));
		}

		let degrees: Vec<usize> = graph.nodes.iter().map(|&id| adjacency.degree(id)).collect();
		let links = graph
			.links
			.iter()
			.map(|edge| {
				let (source, target) = ((edge.source - 1) as usize, (edge.target - 1) as usize);
				let (ds, dt) = (degrees[source], degrees[target]);
				SimLink {
					source,
					target,
					bias: ds as f64 / (ds + dt).max(1) as f64,
					strength: 0.0,
				}
			})
			.collect();

		let mut engine = Self {
			sim,
			positions,
			degrees,
			links,
			selected: None,
			slider: StrengthSlider::default(),
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			phase: LayoutPhase::Simulating,
			pinned: None,
		};
		engine.refresh_strengths();
		engine
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> LayoutPhase {
		self.phase
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Positions indexed by `id - 1`.
	pub fn positions(&self) -> &[(f64, f64)] {
		&self.positions
	}

	/// Position of `node`, `None` for unknown ids.
	pub fn position(&self, node: NodeId) -> Option<(f64, f64)> {
		let slot = (node as usize).checked_sub(1)?;
		self.positions.get(slot).copied()
	}

	/// Current spring strength of every link, in graph link order.
	pub fn link_strengths(&self) -> Vec<f64> {
		self.links.iter().map(|l| l.strength).collect()
	}

	/// Node currently held, if any.
	pub fn dragged_node(&self) -> Option<NodeId> {
		self.pinned.map(|(slot, _)| slot as NodeId + 1)
	}

	/// Whether another call to [`tick`](Self::tick) would move anything.
	pub fn is_active(&self) -> bool {
		match self.phase {
			LayoutPhase::Stopped => false,
			LayoutPhase::Dragging => true,
			LayoutPhase::Simulating => {
				self.alpha >= self.params.alpha_min || self.alpha_target >= self.params.alpha_min
			}
		}
	}

	/// Advances one step. Returns `false` once the layout has cooled or stopped.
	pub fn tick(&mut self, dt: f32, observer: &mut impl LayoutObserver) -> bool {
		if !self.is_active() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

		self.sim.update(dt * self.alpha as f32);
		self.read_positions();
		self.apply_links();
		self.apply_collision();
		self.apply_centering();
		if let Some((slot, held)) = self.pinned {
			self.positions[slot] = held;
		}
		self.write_positions();

		observer.on_tick(&LayoutFrame {
			positions: &self.positions,
			alpha: self.alpha,
		});
		true
	}

	/// Restores full energy without rebuilding anything.
	pub fn reheat(&mut self) {
		if self.phase != LayoutPhase::Stopped {
			self.alpha = 1.0;
		}
	}

	/// Moves the strength slider, re-weights every link and reheats.
	pub fn set_strength(&mut self, value: u32, max: u32) {
		if self.phase == LayoutPhase::Stopped {
			return;
		}
		self.slider = StrengthSlider { value, max };
		self.refresh_strengths();
		self.reheat();
	}

	/// Re-weights links for a new solution and reheats.
	pub fn update_coverage(&mut self, coverage: Option<&CoverageModel>) {
		if self.phase == LayoutPhase::Stopped {
			return;
		}
		self.selected = coverage.map(|c| c.iter().map(|(_, entry)| entry.in_ds).collect());
		self.refresh_strengths();
		self.reheat();
	}

	/// Pins `node` where it is and keeps the simulation warm until release.
	pub fn begin_drag(&mut self, node: NodeId) -> bool {
		if self.phase == LayoutPhase::Stopped {
			return false;
		}
		let Some(held) = self.position(node) else {
			return false;
		};
		if let Some((previous, _)) = self.pinned {
			self.set_anchor(previous as NodeId + 1, false);
		}
		self.set_anchor(node, true);
		self.pinned = Some(((node - 1) as usize, held));
		self.alpha_target = self.params.drag_alpha_target;
		self.phase = LayoutPhase::Dragging;
		true
	}

	/// Moves the held node to `(x, y)`. Ignored for any other node.
	pub fn drag_to(&mut self, node: NodeId, x: f64, y: f64) {
		if self.phase != LayoutPhase::Dragging || self.dragged_node() != Some(node) {
			return;
		}
		let slot = (node - 1) as usize;
		self.pinned = Some((slot, (x, y)));
		self.positions[slot] = (x, y);
		self.sim.visit_nodes_mut(|n| {
			if n.data.user_data == node {
				n.data.x = x as f32;
				n.data.y = y as f32;
			}
		});
	}

	/// Unpins the dragged node and lets the layout cool down.
	pub fn end_drag(&mut self) {
		if self.phase != LayoutPhase::Dragging {
			return;
		}
		if let Some(node) = self.dragged_node() {
			self.set_anchor(node, false);
		}
		self.pinned = None;
		self.alpha_target = 0.0;
		self.phase = LayoutPhase::Simulating;
	}

	/// Stops the layout for good; a new graph needs a new engine.
	pub fn teardown(&mut self) {
		if let Some(node) = self.dragged_node() {
			self.set_anchor(node, false);
		}
		self.pinned = None;
		self.alpha_target = 0.0;
		self.phase = LayoutPhase::Stopped;
	}

	fn set_anchor(&mut self, node: NodeId, anchored: bool) {
		self.sim.visit_nodes_mut(|n| {
			if n.data.user_data == node {
				n.data.is_anchor = anchored;
			}
		});
	}

	fn refresh_strengths(&mut self) {
		let base = self.slider.base();
		let selected = self.selected.as_deref();
		for link in &mut self.links {
			let cross = cross_boundary_factor(
				selected.and_then(|s| s.get(link.source).copied()),
				selected.and_then(|s| s.get(link.target).copied()),
			);
			let damping = degree_damping(self.degrees[link.source], self.degrees[link.target]);
			link.strength = link_strength(base, cross, damping);
		}
	}

	fn read_positions(&mut self) {
		let positions = &mut self.positions;
		self.sim.visit_nodes(|node| {
			let slot = (node.data.user_data - 1) as usize;
			positions[slot] = (node.x() as f64, node.y() as f64);
		});
	}

	fn write_positions(&mut self) {
		let positions = &self.positions;
		self.sim.visit_nodes_mut(|node| {
			let (x, y) = positions[(node.data.user_data - 1) as usize];
			node.data.x = x as f32;
			node.data.y = y as f32;
		});
	}

	fn apply_links(&mut self) {
		let (alpha, distance) = (self.alpha, self.params.link_distance);
		for link in &self.links {
			let (sx, sy) = self.positions[link.source];
			let (tx, ty) = self.positions[link.target];
			let (mut dx, mut dy) = (tx - sx, ty - sy);
			let mut dist = (dx * dx + dy * dy).sqrt();
			if dist < f64::EPSILON {
				(dx, dy) = (jiggle(link.source), jiggle(link.target));
				dist = (dx * dx + dy * dy).sqrt();
			}
			let l = (dist - distance) / dist * alpha * link.strength;
			let (fx, fy) = (dx * l, dy * l);

			let target = &mut self.positions[link.target];
			target.0 -= fx * link.bias;
			target.1 -= fy * link.bias;
			let source = &mut self.positions[link.source];
			source.0 += fx * (1.0 - link.bias);
			source.1 += fy * (1.0 - link.bias);
		}
	}

	fn apply_collision(&mut self) {
		let min_dist = 2.0 * self.params.collide_radius;
		let strength = self.params.collide_strength;
		let count = self.positions.len();
		for i in 0..count {
			for j in (i + 1)..count {
				let (xi, yi) = self.positions[i];
				let (xj, yj) = self.positions[j];
				let (mut dx, mut dy) = (xj - xi, yj - yi);
				let mut dist = (dx * dx + dy * dy).sqrt();
				if dist >= min_dist {
					continue;
				}
				if dist < f64::EPSILON {
					(dx, dy) = (jiggle(i), jiggle(j));
					dist = (dx * dx + dy * dy).sqrt();
				}
				let push = (min_dist - dist) / dist * 0.5 * strength;
				self.positions[i].0 -= dx * push;
				self.positions[i].1 -= dy * push;
				self.positions[j].0 += dx * push;
				self.positions[j].1 += dy * push;
			}
		}
	}

	fn apply_centering(&mut self) {
		if self.positions.is_empty() {
			return;
		}
		let n = self.positions.len() as f64;
		let (sx, sy) = self
			.positions
			.iter()
			.fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
		let (mx, my) = (
			sx / n * self.params.center_strength,
			sy / n * self.params.center_strength,
		);
		for p in &mut self.positions {
			p.0 -= mx;
			p.1 -= my;
		}
	}
}

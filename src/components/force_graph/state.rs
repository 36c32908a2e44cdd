//! Per-mount view state: the drawable scene, pan/zoom, dragging and hover fading.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::layout::{ForceLayoutEngine, LayoutFrame, LayoutObserver, LayoutParams};
use super::scale::{ScaleConfig, ScaledValues};
use super::types::Classification;
use crate::domset::{AdjacencyIndex, CoverageModel, describe_node};
use crate::pace::{Edge, Graph, NodeId};

/// What the renderer draws, as last reported by the layout engine.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	/// Indexed by `id - 1`.
	pub positions: Vec<(f64, f64)>,
	/// Node and link classes of the shown coverage.
	pub classes: Classification,
	/// Layout energy of the last step.
	pub alpha: f64,
}

impl Scene {
	/// Last reported position of `node`.
	pub fn position(&self, node: NodeId) -> Option<(f64, f64)> {
		let slot = (node as usize).checked_sub(1)?;
		self.positions.get(slot).copied()
	}
}

impl LayoutObserver for Scene {
	fn on_tick(&mut self, frame: &LayoutFrame<'_>) {
		self.positions.clear();
		self.positions.extend_from_slice(frame.positions);
		self.alpha = frame.alpha;
	}

	fn on_classify(&mut self, classes: &Classification) {
		self.classes = classes.clone();
	}
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	/// Screen x of the world origin.
	pub x: f64,
	/// Screen y of the world origin.
	pub y: f64,
	/// Zoom factor, clamped to 0.1..10.0.
	pub k: f64,
}

/// Node drag in progress; screen coordinates where the pointer went down.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Held node, `None` when nothing is dragged.
	pub node: Option<NodeId>,
	/// Pointer x at drag start.
	pub start_x: f64,
	/// Pointer y at drag start.
	pub start_y: f64,
	/// World x of the node at drag start.
	pub node_start_x: f64,
	/// World y of the node at drag start.
	pub node_start_y: f64,
}

/// Background drag that moves the view.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether the pointer is panning.
	pub active: bool,
	/// Pointer x at pan start.
	pub start_x: f64,
	/// Pointer y at pan start.
	pub start_y: f64,
	/// Transform x at pan start.
	pub transform_start_x: f64,
	/// Transform y at pan start.
	pub transform_start_y: f64,
}

/// Seconds a node stays lit after leaving the hovered neighbourhood.
const MIN_HOLD_TIME: f64 = 0.12;
const FADE_IN_SPEED: f64 = 6.0;
const FADE_OUT_SPEED: f64 = 4.0;
const VISIBLE: f64 = 0.005;

#[derive(Clone, Copy, Debug, Default)]
struct Fade {
	/// Membership in the hovered neighbourhood, 0..1.
	focus: f64,
	/// Being the hovered node itself, 0..1.
	ring: f64,
	hold: f64,
}

/// Smoothed hover highlighting.
///
/// Hovering a node lights its closed neighbourhood; everything else fades
/// through [`peak`](Self::peak). A link stays lit only while one of its
/// endpoints is the hovered node.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	hovered: Option<NodeId>,
	focus_set: HashSet<NodeId>,
	fades: HashMap<NodeId, Fade>,
	peak: f64,
}

impl HoverState {
	/// Focuses the closed neighbourhood of `node`; `None` lets everything fade out.
	pub fn set_hover(&mut self, node: Option<NodeId>, adjacency: &AdjacencyIndex) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		self.focus_set = node
			.and_then(|id| adjacency.neighbors(id))
			.map(|set| set.iter().copied().collect())
			.unwrap_or_default();
		for &id in &self.focus_set {
			self.fades.entry(id).or_default().hold = MIN_HOLD_TIME;
		}
	}

	/// Node under the pointer.
	pub fn hovered(&self) -> Option<NodeId> {
		self.hovered
	}

	/// Eases every intensity toward its target with exponential smoothing.
	pub fn tick(&mut self, dt: f64) {
		let rise = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let decay = (-FADE_OUT_SPEED * dt).exp();

		for &id in &self.focus_set {
			self.fades.entry(id).or_default();
		}

		let (focus_set, hovered) = (&self.focus_set, self.hovered);
		let mut peak: f64 = 0.0;
		self.fades.retain(|id, fade| {
			let focused = focus_set.contains(id);
			if focused {
				fade.focus += (1.0 - fade.focus) * rise;
			} else {
				fade.hold -= dt;
				if fade.hold <= 0.0 {
					fade.focus *= decay;
				}
			}

			if hovered == Some(*id) {
				fade.ring += (1.0 - fade.ring) * rise;
			} else if focused || fade.hold <= 0.0 {
				fade.ring *= decay;
			}

			peak = peak.max(fade.focus);
			focused || fade.hold > 0.0 || fade.focus > VISIBLE || fade.ring > VISIBLE
		});
		self.peak = peak;
	}

	/// Highlight of `node` in `[0, 1]`.
	pub fn node_focus(&self, node: NodeId) -> f64 {
		self.fades.get(&node).map_or(0.0, |f| f.focus)
	}

	/// Hover ring intensity of `node` in `[0, 1]`.
	pub fn ring(&self, node: NodeId) -> f64 {
		self.fades.get(&node).map_or(0.0, |f| f.ring)
	}

	/// Highlight of a link: the stronger ring of its endpoints.
	pub fn link_focus(&self, edge: Edge) -> f64 {
		self.ring(edge.source).max(self.ring(edge.target))
	}

	/// Strongest focus of any node; drives the dimming of everything else.
	pub fn peak(&self) -> f64 {
		self.peak
	}

	/// Whether nothing is lit or fading.
	pub fn is_idle(&self) -> bool {
		self.fades.is_empty()
	}
}

/// Everything one mounted canvas needs between frames.
pub struct ForceGraphState {
	/// Layout of `graph`.
	pub engine: ForceLayoutEngine,
	/// Output of `engine`, read by the renderer.
	pub scene: Scene,
	/// Mounted graph.
	pub graph: Arc<Graph>,
	/// Neighbourhoods of `graph`.
	pub adjacency: Arc<AdjacencyIndex>,
	/// Tooltip text by `id - 1`.
	pub tooltips: Vec<String>,
	/// Pan and zoom.
	pub transform: ViewTransform,
	/// Node drag.
	pub drag: DragState,
	/// View pan.
	pub pan: PanState,
	/// Hover fading.
	pub hover: HoverState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
}

impl ForceGraphState {
	/// Mounts a layout for `graph` centred in a `width` by `height` canvas.
	pub fn new(
		graph: Arc<Graph>,
		adjacency: Arc<AdjacencyIndex>,
		width: f64,
		height: f64,
		params: LayoutParams,
	) -> Self {
		let engine = ForceLayoutEngine::mount(&graph, &adjacency, width, height, params);
		let scene = Scene {
			positions: engine.positions().to_vec(),
			alpha: engine.alpha(),
			..Scene::default()
		};
		let mut state = Self {
			engine,
			scene,
			graph,
			adjacency,
			tooltips: Vec::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
		};
		state.set_coverage(None);
		state
	}

	/// Re-weights the layout, reclassifies and rebuilds tooltips for new coverage.
	pub fn set_coverage(&mut self, coverage: Option<&CoverageModel>) {
		self.engine.update_coverage(coverage);
		super::layout::update_classification(&self.graph, coverage, &mut self.scene);
		self.tooltips = self
			.graph
			.nodes
			.iter()
			.map(|&id| describe_node(id, &self.adjacency, coverage))
			.collect();
	}

	/// Forwards a slider move to the layout.
	pub fn set_strength(&mut self, value: u32, max: u32) {
		self.engine.set_strength(value, max);
	}

	/// Tooltip text of `node`.
	pub fn tooltip(&self, node: NodeId) -> Option<&str> {
		let slot = (node as usize).checked_sub(1)?;
		self.tooltips.get(slot).map(String::as_str)
	}

	/// World coordinates of a screen point.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let hit = ScaledValues::new(config, self.transform.k).hit_radius;
		self.scene
			.positions
			.iter()
			.enumerate()
			.rev()
			.find(|(_, (x, y))| ((x - gx).powi(2) + (y - gy).powi(2)).sqrt() < hit)
			.map(|(slot, _)| slot as NodeId + 1)
	}

	/// Hovers `node`, or nothing.
	pub fn set_hover(&mut self, node: Option<NodeId>) {
		self.hover.set_hover(node, &self.adjacency);
	}

	/// Grabs `node` at screen point `(sx, sy)`.
	pub fn begin_drag(&mut self, node: NodeId, sx: f64, sy: f64) {
		let Some((x, y)) = self.scene.position(node) else {
			return;
		};
		if self.engine.begin_drag(node) {
			self.drag = DragState {
				node: Some(node),
				start_x: sx,
				start_y: sy,
				node_start_x: x,
				node_start_y: y,
			};
		}
	}

	/// Moves the grabbed node with the pointer.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(node) = self.drag.node else {
			return;
		};
		let (x, y) = (
			self.drag.node_start_x + (sx - self.drag.start_x) / self.transform.k,
			self.drag.node_start_y + (sy - self.drag.start_y) / self.transform.k,
		);
		self.engine.drag_to(node, x, y);
	}

	/// Releases the grabbed node.
	pub fn end_drag(&mut self) {
		if self.drag.node.take().is_some() {
			self.engine.end_drag();
		}
	}

	/// Starts panning from screen point `(sx, sy)`.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Follows the pointer while panning.
	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Zooms by `factor` keeping the screen point under the cursor fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = k;
	}

	/// Ends any drag or pan.
	pub fn release_pointer(&mut self) {
		self.end_drag();
		self.pan.active = false;
	}

	/// Steps the layout and the hover fade by `dt` seconds.
	pub fn tick(&mut self, dt: f32) {
		self.engine.tick(dt, &mut self.scene);
		self.hover.tick(dt as f64);
	}

	/// Records a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Drops any drag and stops the layout for good.
	pub fn teardown(&mut self) {
		self.drag = DragState::default();
		self.engine.teardown();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::layout::LayoutPhase;
	use crate::components::force_graph::types::NodeClass;
	use crate::pace::{Solution, parse_graph};

	fn path4() -> (Arc<Graph>, Arc<AdjacencyIndex>) {
		let graph = parse_graph("p ds 4 3\n1 2\n2 3\n3 4\n").unwrap();
		let adjacency = AdjacencyIndex::build(&graph);
		(Arc::new(graph), Arc::new(adjacency))
	}

	fn mount(graph: Arc<Graph>, adjacency: Arc<AdjacencyIndex>) -> ForceGraphState {
		ForceGraphState::new(graph, adjacency, 400.0, 300.0, LayoutParams::default())
	}

	fn settle(hover: &mut HoverState, steps: usize) {
		for _ in 0..steps {
			hover.tick(0.016);
		}
	}

	#[test]
	fn hover_lights_neighbourhood_and_incident_links() {
		let (graph, adjacency) = path4();
		let mut hover = HoverState::default();
		hover.set_hover(Some(2), &adjacency);
		settle(&mut hover, 60);

		for node in [1, 2, 3] {
			assert!(hover.node_focus(node) > 0.9, "node {node}");
		}
		assert_eq!(hover.node_focus(4), 0.0);
		assert!(hover.peak() > 0.9);

		assert!(hover.link_focus(graph.links[0]) > 0.9);
		assert!(hover.link_focus(graph.links[1]) > 0.9);
		assert_eq!(hover.link_focus(graph.links[2]), 0.0);
	}

	#[test]
	fn leaving_restores_everything() {
		let (_, adjacency) = path4();
		let mut hover = HoverState::default();
		hover.set_hover(Some(1), &adjacency);
		settle(&mut hover, 30);
		hover.set_hover(None, &adjacency);
		settle(&mut hover, 200);

		assert!(hover.is_idle());
		assert_eq!(hover.peak(), 0.0);
		assert_eq!(hover.node_focus(1), 0.0);
	}

	#[test]
	fn moving_to_a_neighbour_fades_the_old_ring() {
		let (_, adjacency) = path4();
		let mut hover = HoverState::default();
		hover.set_hover(Some(1), &adjacency);
		settle(&mut hover, 30);
		hover.set_hover(Some(2), &adjacency);
		settle(&mut hover, 120);

		assert!(hover.ring(1) < 0.01);
		assert!(hover.ring(2) > 0.9);
		assert!(hover.node_focus(1) > 0.9);
	}

	#[test]
	fn coverage_updates_scene_and_tooltips() {
		let (graph, adjacency) = path4();
		let mut state = mount(graph.clone(), adjacency);
		assert_eq!(state.tooltip(2), Some("Node 2, Degree: 2"));
		assert_eq!(state.scene.classes.node(2), NodeClass::Plain);

		let coverage =
			CoverageModel::compute(Some(&graph), Some(&Solution::from_members([2]))).unwrap();
		state.set_coverage(Some(&coverage));
		assert_eq!(state.scene.classes.node(2), NodeClass::Selected);
		assert_eq!(state.tooltip(2), Some("Node 2, Degree: 2\nIn DomSet"));
		assert_eq!(state.tooltip(4), Some("Node 4, Degree: 1\nCoverage 0 by node(s) []"));
		assert_eq!(state.tooltip(5), None);
	}

	#[test]
	fn hit_testing_and_dragging() {
		let (graph, adjacency) = path4();
		let mut state = mount(graph, adjacency);
		let (x, y) = state.scene.position(3).unwrap();
		let (sx, sy) = (x + state.transform.x, y + state.transform.y);

		assert_eq!(state.node_at_position(sx, sy, &ScaleConfig::default()), Some(3));
		assert_eq!(state.node_at_position(-500.0, -500.0, &ScaleConfig::default()), None);

		state.begin_drag(3, sx, sy);
		assert_eq!(state.engine.phase(), LayoutPhase::Dragging);
		state.drag_to(sx + 10.0, sy);
		state.tick(0.016);
		let (nx, ny) = state.scene.position(3).unwrap();
		assert!((nx - (x + 10.0)).abs() < 1e-9);
		assert!((ny - y).abs() < 1e-9);

		state.release_pointer();
		assert_eq!(state.engine.phase(), LayoutPhase::Simulating);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let (graph, adjacency) = path4();
		let mut state = mount(graph, adjacency);
		let before = state.screen_to_graph(120.0, 80.0);
		state.zoom_at(120.0, 80.0, 1.1);
		let after = state.screen_to_graph(120.0, 80.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn teardown_freezes_the_scene() {
		let (graph, adjacency) = path4();
		let mut state = mount(graph, adjacency);
		let (x, y) = state.scene.position(1).unwrap();
		let (sx, sy) = (x + state.transform.x, y + state.transform.y);
		state.begin_drag(1, sx, sy);

		state.teardown();
		assert_eq!(state.engine.phase(), LayoutPhase::Stopped);
		assert_eq!(state.drag.node, None);

		let frozen = state.scene.positions.clone();
		for _ in 0..10 {
			state.tick(0.016);
		}
		state.begin_drag(2, sx, sy);
		state.drag_to(sx + 30.0, sy);
		assert_eq!(state.scene.positions, frozen);
		assert_eq!(state.engine.phase(), LayoutPhase::Stopped);
	}
}

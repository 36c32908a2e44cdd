//! Zoom-dependent sizes of graph visuals.
//!
//! Drawing happens in world space after the pan/zoom transform, so a value that
//! should keep its pixel size on screen is divided by the zoom level `k`.

/// How a visual property scales with zoom level.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "World/Screen variants complete the API for users customizing ScaleConfig"
)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space size, clamped to screen-space bounds.
	Clamped {
		/// Smallest on-screen size in pixels.
		min_screen: f64,
		/// Largest on-screen size in pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space size of `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Node disc, hit area and id label.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Node radius in world units.
	pub radius: f64,
	/// How `radius` follows the zoom.
	pub radius_behavior: ScaleBehavior,
	/// Pointer hit radius in world units.
	pub hit_radius: f64,
	/// How `hit_radius` follows the zoom.
	pub hit_behavior: ScaleBehavior,
	/// Id label size in screen pixels.
	pub label_size: f64,
	/// Below this zoom level labels stop shrinking.
	pub label_min_k: f64,
	/// Labels are hidden while zoomed out further than this.
	pub label_hide_k: f64,
}

/// Link strokes.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width in screen pixels.
	pub line_width: f64,
	/// Dash pattern of unused links, in world units.
	pub unused_dash: (f64, f64),
}

/// Hover ring around focused nodes.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Hover ring stroke in screen pixels.
	pub ring_width: f64,
	/// Gap between node and ring in screen pixels.
	pub ring_offset: f64,
}

/// Tooltip box, all in screen pixels.
#[derive(Clone, Debug)]
pub struct TooltipScaleConfig {
	/// Text size.
	pub font_size: f64,
	/// Space between text and box edge.
	pub padding: f64,
	/// Distance between baselines.
	pub line_height: f64,
	/// Distance from the cursor to the box, in screen pixels.
	pub offset: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Nodes and labels.
	pub node: NodeScaleConfig,
	/// Links.
	pub edge: EdgeScaleConfig,
	/// Hover rings.
	pub ring: RingScaleConfig,
	/// Tooltip box.
	pub tooltip: TooltipScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 14.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 4.0,
					max_screen: f64::INFINITY,
				},
				hit_radius: 14.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
				label_size: 11.0,
				label_min_k: 0.5,
				label_hide_k: 0.35,
			},
			edge: EdgeScaleConfig {
				line_width: 1.5,
				unused_dash: (4.0, 4.0),
			},
			ring: RingScaleConfig {
				ring_width: 1.5,
				ring_offset: 2.0,
			},
			tooltip: TooltipScaleConfig {
				font_size: 12.0,
				padding: 6.0,
				line_height: 16.0,
				offset: 14.0,
			},
		}
	}
}

/// Scale values for one zoom level, in world space. Built once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom level these values were computed for.
	pub k: f64,
	/// Node radius.
	pub node_radius: f64,
	/// Pointer hit radius.
	pub hit_radius: f64,
	/// CSS font of id labels.
	pub label_font: String,
	/// Whether id labels are drawn at this zoom.
	pub show_labels: bool,
	/// Link stroke width.
	pub edge_line_width: f64,
	/// Dash and gap of unused links.
	pub unused_dash: (f64, f64),
	/// Hover ring stroke width.
	pub ring_width: f64,
	/// Gap between node and hover ring.
	pub ring_offset: f64,
}

impl ScaledValues {
	/// Resolves `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_font_size = config.node.label_size / k.max(config.node.label_min_k);
		Self {
			k,
			node_radius: config.node.radius_behavior.apply(config.node.radius, k),
			hit_radius: config.node.hit_behavior.apply(config.node.hit_radius, k),
			label_font: format!("{label_font_size}px sans-serif"),
			show_labels: k >= config.node.label_hide_k,
			edge_line_width: config.edge.line_width / k,
			unused_dash: config.edge.unused_dash,
			ring_width: config.ring.ring_width / k,
			ring_offset: config.ring.ring_offset / k,
		}
	}
}

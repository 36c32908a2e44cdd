//! Colours and visual style of the graph canvas.

use super::types::{LinkClass, NodeClass};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Colour with opacity `a`.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same colour with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Mixes towards white (0.0 = unchanged, 1.0 = white).
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Mixes towards black (0.0 = unchanged, 1.0 = black).
	pub fn darken(self, factor: f64) -> Self {
		self.lerp(Color::rgba(0, 0, 0, self.a), factor)
	}

	/// Linear mix, `t = 0` is `self` and `t = 1` is `other`.
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Canvas background.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Base colour, also the gradient edge.
	pub color: Color,
	/// Centre colour of the radial gradient.
	pub color_secondary: Color,
	/// Radial gradient instead of a flat fill.
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Link stroke colour per [`LinkClass`].
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// [`LinkClass::Plain`].
	pub plain: Color,
	/// [`LinkClass::Unused`], drawn dashed.
	pub unused: Color,
	/// [`LinkClass::UniquelyCovered`].
	pub unique: Color,
	/// [`LinkClass::MultiplyCovered`].
	pub multiple: Color,
}

impl LinkStyle {
	/// Stroke colour of `class`.
	pub fn color(&self, class: LinkClass) -> Color {
		match class {
			LinkClass::Plain => self.plain,
			LinkClass::Unused => self.unused,
			LinkClass::UniquelyCovered => self.unique,
			LinkClass::MultiplyCovered => self.multiple,
		}
	}
}

/// Node fill per [`NodeClass`] plus shared node decoration.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// [`NodeClass::Plain`].
	pub plain: Color,
	/// [`NodeClass::Selected`].
	pub selected: Color,
	/// [`NodeClass::UniquelyCovered`].
	pub unique: Color,
	/// [`NodeClass::MultiplyCovered`].
	pub multiple: Color,
	/// Shade discs with a radial gradient.
	pub use_gradient: bool,
	/// Outline width in screen pixels, 0 for none.
	pub border_width: f64,
	/// Outline colour.
	pub border_color: Color,
	/// Id label colour.
	pub label_color: Color,
	/// Hover ring colour.
	pub ring_color: Color,
}

impl NodeStyle {
	/// Fill colour of `class`.
	pub fn color(&self, class: NodeClass) -> Color {
		match class {
			NodeClass::Plain => self.plain,
			NodeClass::Selected => self.selected,
			NodeClass::UniquelyCovered => self.unique,
			NodeClass::MultiplyCovered => self.multiple,
		}
	}
}

/// Tooltip box colours.
#[derive(Clone, Debug)]
pub struct TooltipStyle {
	/// Box fill.
	pub background: Color,
	/// Box outline.
	pub border: Color,
	/// Text colour.
	pub text: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Name accepted by [`Theme::by_name`].
	pub name: &'static str,
	/// Canvas background.
	pub background: BackgroundStyle,
	/// Link strokes.
	pub link: LinkStyle,
	/// Node fills and decoration.
	pub node: NodeStyle,
	/// Tooltip box.
	pub tooltip: TooltipStyle,
}

impl Theme {
	/// Dark slate canvas (default).
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
				vignette: 0.15,
			},
			link: LinkStyle {
				plain: Color::rgba(140, 160, 180, 0.6),
				unused: Color::rgba(140, 160, 180, 0.35),
				unique: Color::rgba(102, 187, 106, 0.85),
				multiple: Color::rgba(100, 160, 230, 0.85),
			},
			node: NodeStyle {
				plain: Color::rgb(120, 135, 155),
				selected: Color::rgb(229, 87, 72),
				unique: Color::rgb(92, 170, 98),
				multiple: Color::rgb(84, 140, 214),
				use_gradient: true,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				label_color: Color::rgba(255, 255, 255, 0.9),
				ring_color: Color::rgb(255, 255, 255),
			},
			tooltip: TooltipStyle {
				background: Color::rgba(13, 17, 23, 0.92),
				border: Color::rgba(140, 160, 180, 0.5),
				text: Color::rgb(230, 237, 243),
			},
		}
	}

	/// Light theme for printing and bright displays.
	pub fn paper() -> Self {
		Self {
			name: "paper",
			background: BackgroundStyle {
				color: Color::rgb(250, 250, 247),
				color_secondary: Color::rgb(250, 250, 247),
				use_gradient: false,
				vignette: 0.0,
			},
			link: LinkStyle {
				plain: Color::rgba(90, 90, 90, 0.6),
				unused: Color::rgba(120, 120, 120, 0.4),
				unique: Color::rgb(46, 125, 50),
				multiple: Color::rgb(21, 101, 192),
			},
			node: NodeStyle {
				plain: Color::rgb(200, 200, 200),
				selected: Color::rgb(211, 47, 47),
				unique: Color::rgb(129, 199, 132),
				multiple: Color::rgb(100, 181, 246),
				use_gradient: false,
				border_width: 1.0,
				border_color: Color::rgb(60, 60, 60),
				label_color: Color::rgb(20, 20, 20),
				ring_color: Color::rgb(30, 30, 30),
			},
			tooltip: TooltipStyle {
				background: Color::rgba(255, 255, 255, 0.95),
				border: Color::rgb(60, 60, 60),
				text: Color::rgb(20, 20, 20),
			},
		}
	}

	/// Looks a theme up by name, falling back to the default.
	pub fn by_name(name: &str) -> Self {
		match name {
			"paper" => Self::paper(),
			_ => Self::default_theme(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

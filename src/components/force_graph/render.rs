//! Canvas rendering for the force graph.
//!
//! Draw order: background, links, dimmed nodes, focused nodes with their
//! hover rings, then the tooltip in screen space.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::ForceGraphState;
use super::theme::{Color, Theme};
use super::types::LinkClass;
use crate::pace::NodeId;

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Draws one frame of `state`.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_links(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
	draw_tooltip(state, ctx, config, theme);
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			let radius = state.width.max(state.height) * 0.8;
			ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, radius)
		})
		.and_then(Result::ok);

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let Ok(gradient) = ctx.create_radial_gradient(
		cx,
		cy,
		state.width.min(state.height) * 0.3,
		cx,
		cy,
		state.width.max(state.height) * 0.7,
	) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(1.0, &format!("rgba(0, 0, 0, {})", theme.background.vignette));

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: Option<(f64, f64)>) {
	let pattern = match dash {
		Some((on, off)) => js_sys::Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off)),
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&pattern);
}

fn draw_links(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let peak = smooth_step(state.hover.peak());

	for (i, edge) in state.graph.links.iter().enumerate() {
		let (Some((x1, y1)), Some((x2, y2))) = (
			state.scene.position(edge.source),
			state.scene.position(edge.target),
		) else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let class = state.scene.classes.link(i);
		let focus = smooth_step(state.hover.link_focus(*edge));
		let (alpha, width) = if focus > 0.01 {
			(0.7 + 0.3 * focus, scale.edge_line_width * (1.0 + 0.6 * focus))
		} else {
			(1.0 - 0.85 * peak, scale.edge_line_width * (1.0 - 0.3 * peak))
		};

		let color = theme.link.color(class);
		ctx.set_stroke_style_str(&color.with_alpha(color.a * alpha).to_css());
		ctx.set_line_width(width);
		set_dash(
			ctx,
			(class == LinkClass::Unused).then_some(scale.unused_dash),
		);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * scale.node_radius, y1 + uy * scale.node_radius);
		ctx.line_to(x2 - ux * scale.node_radius, y2 - uy * scale.node_radius);
		ctx.stroke();
	}

	set_dash(ctx, None);
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let peak = smooth_step(state.hover.peak());
	let (dim_alpha, dim_radius) = (1.0 - 0.75 * peak, 1.0 - 0.15 * peak);

	// Dimmed nodes first so the hovered neighbourhood stays on top.
	for &id in &state.graph.nodes {
		if state.hover.node_focus(id) > 0.001 {
			continue;
		}
		draw_node(state, ctx, scale, theme, id, dim_alpha, dim_radius);
	}

	for &id in &state.graph.nodes {
		let focus = state.hover.node_focus(id);
		if focus <= 0.001 {
			continue;
		}
		let eased = smooth_step(focus);
		let ring = smooth_step(state.hover.ring(id));
		let lit_radius = 1.0 + 0.15 * eased + 0.15 * ring;
		let alpha = dim_alpha + (1.0 - dim_alpha) * eased;
		let radius_mult = dim_radius + (lit_radius - dim_radius) * eased;
		draw_node(state, ctx, scale, theme, id, alpha, radius_mult);

		if ring > 0.01 {
			let Some((x, y)) = state.scene.position(id) else {
				continue;
			};
			let radius = scale.node_radius * radius_mult + scale.ring_offset;
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.node.ring_color.with_alpha(0.8 * ring).to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}
	}
}

fn draw_node(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	id: NodeId,
	alpha: f64,
	radius_mult: f64,
) {
	let Some((x, y)) = state.scene.position(id) else {
		return;
	};
	let radius = scale.node_radius * radius_mult;
	let color = theme.node.color(state.scene.classes.node(id));

	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	fill_node(ctx, theme, color, x, y, radius);

	if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / scale.k);
		ctx.stroke();
	}

	if scale.show_labels {
		ctx.set_fill_style_str(&theme.node.label_color.to_css());
		ctx.set_font(&scale.label_font);
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(&id.to_string(), x, y);
	}
	ctx.set_global_alpha(1.0);
}

/// Fills the current path, shaded when the theme asks for it.
fn fill_node(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	color: Color,
	x: f64,
	y: f64,
	radius: f64,
) {
	if theme.node.use_gradient {
		if let Ok(gradient) =
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
		{
			let _ = gradient.add_color_stop(0.0, &color.lighten(0.35).to_css());
			let _ = gradient.add_color_stop(0.7, &color.to_css());
			let _ = gradient.add_color_stop(1.0, &color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
			return;
		}
	}
	ctx.set_fill_style_str(&color.to_css());
	ctx.fill();
}

fn draw_tooltip(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	if state.drag.node.is_some() {
		return;
	}
	let Some(node) = state.hover.hovered() else {
		return;
	};
	let (Some(text), Some((x, y))) = (state.tooltip(node), state.scene.position(node)) else {
		return;
	};

	let tip = &config.tooltip;
	ctx.set_font(&format!("{}px sans-serif", tip.font_size));
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");

	let lines: Vec<&str> = text.lines().collect();
	let text_width = lines
		.iter()
		.filter_map(|line| ctx.measure_text(line).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max);
	let box_w = text_width + 2.0 * tip.padding;
	let box_h = lines.len() as f64 * tip.line_height + 2.0 * tip.padding;

	let (sx, sy) = (
		x * state.transform.k + state.transform.x + tip.offset,
		y * state.transform.k + state.transform.y + tip.offset,
	);
	let bx = sx.min(state.width - box_w).max(0.0);
	let by = sy.min(state.height - box_h).max(0.0);

	ctx.set_fill_style_str(&theme.tooltip.background.to_css());
	ctx.fill_rect(bx, by, box_w, box_h);
	ctx.set_stroke_style_str(&theme.tooltip.border.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke_rect(bx, by, box_w, box_h);

	ctx.set_fill_style_str(&theme.tooltip.text.to_css());
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(
			line,
			bx + tip.padding,
			by + tip.padding + i as f64 * tip.line_height,
		);
	}
}

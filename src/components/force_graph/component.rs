//! Leptos component wrapping the force-directed graph canvas.
//!
//! A new graph tears the previous layout down and mounts a fresh one; coverage
//! and strength changes are pushed into the running layout. One
//! `requestAnimationFrame` loop per component steps and draws whatever is mounted.
//! Once the component is unmounted the loop tears the layout down, detaches
//! the resize listener and stops rescheduling itself.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::layout::LayoutParams;
use super::render;
use super::scale::ScaleConfig;
use super::state::ForceGraphState;
use super::theme::Theme;
use super::types::GraphView;
use crate::domset::CoverageModel;

const FRAME_DT: f32 = 0.016;

struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
	ctx: CanvasRenderingContext2d,
}

type Callback = RefCell<Option<Closure<dyn FnMut()>>>;

/// Stops the mounted layout and removes the window listener.
fn shut_down(context: &RefCell<Option<GraphContext>>, resize_cb: &Callback) {
	if let Some(mut c) = context.borrow_mut().take() {
		c.state.teardown();
	}
	if let Some(cb) = resize_cb.borrow_mut().take() {
		if let Some(window) = web_sys::window() {
			let _ =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}
	debug!("force graph unmounted, layout stopped");
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Mouse position relative to the canvas.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders a dominating-set instance as an interactive force layout.
///
/// `graph = None` shows an empty canvas. The component sizes itself to its
/// parent unless `fullscreen` is set or `width`/`height` are given.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] graph: Signal<Option<GraphView>>,
	#[prop(into)] coverage: Signal<Option<Arc<CoverageModel>>>,
	#[prop(into)] strength: Signal<u32>,
	#[prop(default = 100)] strength_max: u32,
	#[prop(default = LayoutParams::default())] layout: LayoutParams,
	#[prop(default = Theme::default())] theme: Theme,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<Callback> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<Callback> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	// cleanup must be Send; the frame loop notices the flag on its next run
	let mounted = Arc::new(AtomicBool::new(true));
	{
		let mounted = mounted.clone();
		on_cleanup(move || mounted.store(false, Ordering::Relaxed));
	}

	Effect::new(move |_| {
		let view = graph.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		if let Some(mut previous) = context_init.borrow_mut().take() {
			previous.state.teardown();
		}
		let Some(view) = view else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			let parent_width = || parent.as_ref().map_or(800.0, |p| p.client_width() as f64);
			let parent_height = || parent.as_ref().map_or(600.0, |p| p.client_height() as f64);
			(
				width.unwrap_or_else(parent_width),
				height.unwrap_or_else(parent_height),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>().ok(),
			_ => None,
		};
		let Some(ctx) = ctx else {
			warn!("canvas has no 2d context");
			return;
		};

		let mut state = ForceGraphState::new(view.graph, view.adjacency, w, h, layout.clone());
		state.set_strength(strength.get_untracked(), strength_max);
		state.set_coverage(coverage.get_untracked().as_deref());
		debug!("mounted layout for {} nodes", state.graph.num_nodes());

		*context_init.borrow_mut() = Some(GraphContext {
			state,
			scale: ScaleConfig::default(),
			theme: theme.clone(),
			ctx,
		});

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		if animate_init.borrow().is_none() {
			let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
			let (resize_anim, mounted) = (resize_cb_init.clone(), mounted.clone());
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				if !mounted.load(Ordering::Relaxed) {
					shut_down(&context_anim, &resize_anim);
					// released by wasm-bindgen once this call returns
					animate_inner.borrow_mut().take();
					return;
				}
				if let Some(ref mut c) = *context_anim.borrow_mut() {
					c.state.tick(FRAME_DT);
					render::render(&c.state, &c.ctx, &c.scale, &c.theme);
				}
				if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}
	});

	let context_cov = context.clone();
	Effect::new(move |_| {
		let coverage = coverage.get();
		if let Some(ref mut c) = *context_cov.borrow_mut() {
			c.state.set_coverage(coverage.as_deref());
		}
	});

	let context_str = context.clone();
	Effect::new(move |_| {
		let value = strength.get();
		if let Some(ref mut c) = *context_str.borrow_mut() {
			c.state.set_strength(value, strength_max);
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			match c.state.node_at_position(x, y, &c.scale) {
				Some(node) => c.state.begin_drag(node, x, y),
				None => c.state.begin_pan(x, y),
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.drag.node.is_some() {
				c.state.drag_to(x, y);
			} else {
				let hovered = c.state.node_at_position(x, y, &c.scale);
				c.state.set_hover(hovered);
				c.state.pan_to(x, y);
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.state.release_pointer();
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.release_pointer();
			c.state.set_hover(None);
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.state.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

//! Leptos component wrapping the mind map canvas.
//!
//! The component creates an HTML canvas element and wires up mouse, wheel and
//! keyboard handlers for the per-node controls, node dragging, panning and
//! zooming. An animation loop runs via `requestAnimationFrame`, stepping the
//! layout and redrawing the scene each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window};

use super::config::MindMapConfig;
use super::controller::Outcome;
use super::error::Result;
use super::prompt::BrowserPrompt;
use super::render;
use super::simulation::FRAME_SECONDS;
use super::state::MindMapState;
use super::theme::Theme;
use super::types::GraphData;

/// Bundles the mind map state with its theme.
struct MindMapContext {
	state: MindMapState,
	theme: Theme,
}

type Shared<T> = Rc<RefCell<Option<T>>>;

/// Renders an interactive, editable mind map on a canvas element.
///
/// Pass the initial graph via the reactive `data` signal; every new value
/// rebuilds the map from scratch. The component sizes itself to its parent
/// container by default; set `fullscreen = true` to fill the viewport and
/// follow window resizes. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn MindMapCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: MindMapConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Shared<MindMapContext> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut(f64)>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("mind-map: no window");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			let parent = |f: fn(&web_sys::Element) -> i32| {
				canvas.parent_element().map(|p| f(&p) as f64).unwrap_or(0.0)
			};
			(
				width.unwrap_or_else(|| parent(web_sys::Element::client_width)),
				height.unwrap_or_else(|| parent(web_sys::Element::client_height)),
			)
		};
		let (w, h) = config.surface_size(w, h);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("mind-map: canvas has no 2d context");
			return;
		};

		let theme = Theme::by_name(&config.theme);
		*context_init.borrow_mut() = Some(MindMapContext {
			state: MindMapState::with_curve_tension(&graph, &config, w, h, theme.edge.curve_tension),
			theme,
		});

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			let config_resize = config.clone();
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				let (nw, nh) = config_resize.surface_size(nw, nh);
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

		// A re-run only swaps the context; the running loop picks it up.
		if animate_init.borrow().is_some() {
			return;
		}
		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		let mut last_frame: Option<f64> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = last_frame.map_or(FRAME_SECONDS, |last| (now - last) / 1000.0);
			last_frame = Some(now);
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.tick(dt);
				render::render(&c.state, &ctx, &c.theme);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		dispatch(canvas_ref, &context_md, |s| s.pointer_down(x, y, &mut BrowserPrompt));
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		dispatch(canvas_ref, &context_mm, |s| s.pointer_move(x, y));
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		dispatch(canvas_ref, &context_mu, MindMapState::pointer_up);
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		dispatch(canvas_ref, &context_ml, MindMapState::pointer_leave);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		let delta = ev.delta_y();
		dispatch(canvas_ref, &context_wh, |s| Ok(s.wheel(x, y, delta)));
	};

	let context_kd = context.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		let key = ev.key();
		if dispatch(canvas_ref, &context_kd, |s| s.key(&key)) == Outcome::Applied {
			ev.prevent_default();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mind-map-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:keydown=on_keydown
			style="display: block; cursor: default; outline: none;"
		/>
	}
}

/// Runs one input handler against the live state, then refreshes the cursor.
fn dispatch(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	context: &Shared<MindMapContext>,
	handler: impl FnOnce(&mut MindMapState) -> Result<Outcome>,
) -> Outcome {
	let mut guard = context.borrow_mut();
	let Some(c) = guard.as_mut() else {
		return Outcome::Ignored;
	};
	let outcome = handler(&mut c.state).unwrap_or_else(|e| {
		error!("mind-map: {}", e);
		Outcome::Ignored
	});
	if let Some(canvas) = canvas_ref.get_untracked() {
		let canvas: HtmlCanvasElement = canvas.into();
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", c.state.cursor());
	}
	outcome
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: std::result::Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	(dim(window.inner_width()), dim(window.inner_height()))
}

/// Event position relative to the canvas' top-left corner.
fn local_point(canvas_ref: &NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	if rect.width() <= 0.0 {
		warn!("mind-map: input on a collapsed canvas");
		return None;
	}
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

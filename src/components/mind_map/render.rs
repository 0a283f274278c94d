//! Canvas rendering for the mind map.
//!
//! Draws the [`Scene`](super::sync::Scene) in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Connection curves (world space)
//! 3. Node bodies and labels in store order, later nodes on top
//! 4. Per-node controls above their node

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::ScaledValues;
use super::state::MindMapState;
use super::sync::{Control, Hit, NodeElement};
use super::theme::{Color, Theme};

/// Renders the complete mind map to the canvas.
pub fn render(state: &MindMapState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let scale = state.scaled();

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_links(state, ctx, &scale, theme);
	for node in state.scene.nodes() {
		let hover = state
			.scene
			.hover
			.as_ref()
			.filter(|h| h.node_id() == node.id);
		draw_node(ctx, node, &scale, theme, hover);
		if scale.control_alpha > 0.01 {
			draw_controls(ctx, node, &scale, theme, hover);
		}
	}

	ctx.restore();
}

fn draw_background(state: &MindMapState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);

	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, state.width.max(state.height) * 0.8)
				.ok()
		})
		.flatten();

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

fn draw_links(
	state: &MindMapState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let color = theme.edge.color;
	ctx.set_stroke_style_str(&color.with_alpha(color.a * scale.edge_alpha).to_css());
	ctx.set_line_width(scale.edge_line_width);

	for link in state.scene.links() {
		let curve = &link.curve;
		ctx.begin_path();
		ctx.move_to(curve.start.0, curve.start.1);
		ctx.quadratic_curve_to(curve.control.0, curve.control.1, curve.end.0, curve.end.1);
		ctx.stroke();
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &NodeElement,
	scale: &ScaledValues,
	theme: &Theme,
	hover: Option<&Hit>,
) {
	let (x, y) = (node.x, node.y);
	let radius = scale.node_radius;
	let base = theme.palette.get(node.color_index);
	let base = if matches!(hover, Some(Hit::Node(_))) {
		base.lighten(0.15)
	} else {
		base
	};

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	let gradient = theme
		.node
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &base.to_css());
			let _ = gradient.add_color_stop(1.0, &base.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&base.to_css()),
	}
	ctx.fill();

	let border = if node.pinned {
		Some(theme.node.pinned_border)
	} else if hover.is_some() {
		Some(theme.node.hover_border)
	} else {
		None
	};
	if let Some(border) = border {
		let width = theme.node.border_width * scale.outline_width / 2.0;
		ctx.set_stroke_style_str(&border.to_css());
		ctx.set_line_width(width);
		// Pinned outline is dashed so it reads apart from hover.
		if node.pinned {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(width * 3.0),
				&JsValue::from_f64(width * 2.0),
			));
		}
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	if scale.label_alpha > 0.01 {
		let color = theme.node.label_color;
		ctx.set_fill_style_str(&color.with_alpha(color.a * scale.label_alpha).to_css());
		ctx.set_font(&scale.label_font);
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(&truncate_label(&node.label, scale.label_max_chars), x, y);
	}
}

fn draw_controls(
	ctx: &CanvasRenderingContext2d,
	node: &NodeElement,
	scale: &ScaledValues,
	theme: &Theme,
	hover: Option<&Hit>,
) {
	let r = scale.control_radius;
	ctx.set_font(&format!("bold {}px sans-serif", r * 1.4));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for control in Control::ALL {
		let (cx, cy) = node.control_position(control, scale);
		let hovered = matches!(hover, Some(Hit::Control(_, c)) if *c == control);
		let fill = control_color(theme, control);
		let fill = if hovered { fill.lighten(0.25) } else { fill };

		ctx.begin_path();
		let _ = ctx.arc(cx, cy, if hovered { r * 1.15 } else { r }, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&fill.with_alpha(scale.control_alpha).to_css());
		ctx.fill();

		let glyph = theme.control.glyph;
		ctx.set_fill_style_str(&glyph.with_alpha(glyph.a * scale.control_alpha).to_css());
		let _ = ctx.fill_text(control.glyph(), cx, cy);
	}
}

fn control_color(theme: &Theme, control: Control) -> Color {
	match control {
		Control::Add => theme.control.add,
		Control::Edit => theme.control.edit,
		Control::Remove => theme.control.remove,
	}
}

/// Shortens `label` to at most `max_chars` characters, ending in an ellipsis.
fn truncate_label(label: &str, max_chars: usize) -> String {
	if label.chars().count() <= max_chars {
		return label.to_string();
	}
	let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
	format!("{}…", kept.trim_end())
}

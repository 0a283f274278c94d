//! How sizes and opacities follow the zoom level `k`.
//!
//! Drawing and hit-testing both read a [`ScaledValues`] built for the current
//! `k`, so a button is clickable exactly where it is drawn.
//!
//! Sizes are expressed in graph units; one graph unit covers `k` canvas
//! pixels. A [`ScaleBehavior`] says which of the two a base size is meant in.

/// How a base size maps to graph units at zoom `k`.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Base is in graph units and grows on screen when zooming in.
	World,
	/// Base is in pixels and looks the same at every zoom.
	Screen,
	/// Graph-unit base whose on-screen size is kept within a pixel range.
	Clamped {
		/// Smallest on-screen size in pixels.
		min_screen: f64,
		/// Largest on-screen size in pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// Graph-unit size of `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match *self {
			Self::World => base,
			Self::Screen => base / k,
			Self::Clamped {
				min_screen,
				max_screen,
			} => (base * k).clamp(min_screen, max_screen) / k,
		}
	}
}

/// How opacity follows zoom.
#[derive(Clone, Debug, PartialEq)]
pub enum AlphaBehavior {
	/// Always fully opaque.
	Constant,
	/// Linear ramp: invisible at or below `zero_alpha_k`, opaque from `full_alpha_k`.
	Fade {
		/// Zoom at and below which the element is invisible.
		zero_alpha_k: f64,
		/// Zoom from which the element is fully opaque.
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Opacity factor in `[0, 1]` at zoom `k`.
	pub fn apply(&self, k: f64) -> f64 {
		match *self {
			Self::Constant => 1.0,
			Self::Fade {
				zero_alpha_k,
				full_alpha_k,
			} if full_alpha_k > zero_alpha_k => {
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
			Self::Fade { full_alpha_k, .. } => {
				if k >= full_alpha_k {
					1.0
				} else {
					0.0
				}
			}
		}
	}
}

/// Node body and label scaling.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Body radius in world units. Also the body's hit radius.
	pub radius: f64,
	/// How the body radius follows zoom.
	pub radius_behavior: ScaleBehavior,
	/// Label font size in world units.
	pub label_size: f64,
	/// How the label size follows zoom.
	pub label_behavior: ScaleBehavior,
	/// Label fade-out when zoomed far out.
	pub label_alpha: AlphaBehavior,
	/// Labels longer than this are truncated with an ellipsis.
	pub label_max_chars: usize,
}

/// Add/edit/remove button scaling.
#[derive(Clone, Debug)]
pub struct ControlScaleConfig {
	/// Button radius in world units.
	pub radius: f64,
	/// How the button radius follows zoom.
	pub radius_behavior: ScaleBehavior,
	/// Button fade-out when zoomed far out.
	pub alpha_behavior: AlphaBehavior,
	/// Buttons fainter than this are neither drawn nor hittable.
	pub hit_alpha: f64,
}

/// Connection scaling.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width in screen pixels.
	pub line_width: f64,
	/// How the line width follows zoom.
	pub width_behavior: ScaleBehavior,
	/// Connection opacity by zoom.
	pub alpha_behavior: AlphaBehavior,
}

/// Complete scale configuration for all mind map elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node bodies and labels.
	pub node: NodeScaleConfig,
	/// Per-node buttons.
	pub control: ControlScaleConfig,
	/// Connections.
	pub edge: EdgeScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 42.0,
				radius_behavior: ScaleBehavior::World,
				label_size: 14.0,
				label_behavior: ScaleBehavior::Clamped {
					min_screen: 9.0,
					max_screen: 28.0,
				},
				label_alpha: AlphaBehavior::Fade {
					zero_alpha_k: 0.12,
					full_alpha_k: 0.25,
				},
				label_max_chars: 14,
			},
			control: ControlScaleConfig {
				radius: 10.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: 16.0,
				},
				alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.25,
					full_alpha_k: 0.45,
				},
				hit_alpha: 0.5,
			},
			edge: EdgeScaleConfig {
				line_width: 2.0,
				width_behavior: ScaleBehavior::Screen,
				alpha_behavior: AlphaBehavior::Constant,
			},
		}
	}
}

/// Every zoom-dependent quantity, resolved for one `k`.
///
/// Built once per frame and per hit test. Sizes are in graph units.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom factor these values were resolved for.
	pub k: f64,
	/// Body radius, also its hit radius.
	pub node_radius: f64,
	/// CSS font for labels.
	pub label_font: String,
	/// Label opacity.
	pub label_alpha: f64,
	/// Longest label drawn before truncation.
	pub label_max_chars: usize,
	/// Button radius, also its hit radius.
	pub control_radius: f64,
	/// Distance from a node's center to each control's center.
	pub control_offset: f64,
	/// Button opacity.
	pub control_alpha: f64,
	/// Whether buttons respond to clicks at this zoom.
	pub controls_hittable: bool,
	/// Connection line width.
	pub edge_line_width: f64,
	/// Connection opacity.
	pub edge_alpha: f64,
	/// Two screen pixels in graph units, for outlines.
	pub outline_width: f64,
}

impl ScaledValues {
	/// Resolve `config` for zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node_radius = config.node.radius_behavior.apply(config.node.radius, k);
		let control_radius = config.control.radius_behavior.apply(config.control.radius, k);
		let label_size = config.node.label_behavior.apply(config.node.label_size, k);
		let control_alpha = config.control.alpha_behavior.apply(k);

		Self {
			k,
			node_radius,
			label_font: format!("{}px sans-serif", label_size),
			label_alpha: config.node.label_alpha.apply(k),
			label_max_chars: config.node.label_max_chars,
			control_radius,
			control_offset: node_radius + control_radius,
			control_alpha,
			controls_hittable: control_alpha >= config.control.hit_alpha,
			edge_line_width: config.edge.width_behavior.apply(config.edge.line_width, k),
			edge_alpha: config.edge.alpha_behavior.apply(k),
			outline_width: 2.0 / k,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn behaviors_convert_between_spaces() {
		assert_eq!(ScaleBehavior::World.apply(10.0, 2.0), 10.0);
		assert_eq!(ScaleBehavior::Screen.apply(10.0, 2.0), 5.0);
		let clamped = ScaleBehavior::Clamped {
			min_screen: 6.0,
			max_screen: 16.0,
		};
		// 10 world units at k = 0.1 would be 1px; clamp to 6px.
		assert!((clamped.apply(10.0, 0.1) - 60.0).abs() < 1e-9);
		assert!((clamped.apply(10.0, 4.0) - 4.0).abs() < 1e-9);
	}

	#[test]
	fn controls_disappear_when_zoomed_far_out() {
		let config = ScaleConfig::default();
		assert!(ScaledValues::new(&config, 1.0).controls_hittable);
		assert!(ScaledValues::new(&config, 0.4).controls_hittable);
		let far = ScaledValues::new(&config, 0.2);
		assert!(!far.controls_hittable);
		assert_eq!(far.control_alpha, 0.0);
	}

	#[test]
	fn buttons_sit_outside_the_body_at_every_zoom() {
		let config = ScaleConfig::default();
		for step in 1..=40 {
			let s = ScaledValues::new(&config, step as f64 * 0.1);
			assert!(
				s.control_offset - s.control_radius >= s.node_radius - 1e-9,
				"button overlaps body at k = {}",
				s.k
			);
		}
	}
}

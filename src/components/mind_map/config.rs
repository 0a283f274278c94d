//! Tunable constants for layout, view and mounting.
//!
//! Everything deserializes with `#[serde(default)]`, so a host page only needs
//! to spell out the fields it wants to change:
//!
//! ```json
//! { "layout": { "link_distance": 200 }, "theme": "midnight" }
//! ```

use serde::Deserialize;

/// Force simulation parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Rest length of every connection.
	pub link_distance: f64,
	/// Many-body strength. Negative values repel.
	pub charge_strength: f64,
	/// Lower bound on the many-body distance, avoids blow-ups at d ≈ 0.
	pub charge_distance_min: f64,
	/// How strongly the centroid is pulled to the canvas center (0..=1).
	pub center_strength: f64,
	/// Radius of each node's collision circle.
	pub collision_radius: f64,
	/// Fraction of an overlap resolved per step (0..=1).
	pub collision_strength: f64,
	/// Starting temperature after a reheat.
	pub alpha_reheat: f64,
	/// Below this the simulation goes idle.
	pub alpha_min: f64,
	/// Per-step geometric decay of alpha toward its target.
	pub alpha_decay: f64,
	/// Temperature held while a node is being dragged.
	pub alpha_target_drag: f64,
	/// Fraction of velocity lost per step.
	pub velocity_decay: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			link_distance: 150.0,
			charge_strength: -500.0,
			charge_distance_min: 1.0,
			center_strength: 1.0,
			collision_radius: 100.0,
			collision_strength: 1.0,
			alpha_reheat: 1.0,
			alpha_min,
			// Settles from a full reheat in ~300 steps.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target_drag: 0.3,
			velocity_decay: 0.4,
		}
	}
}

/// Pan/zoom limits.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
	/// Smallest allowed zoom factor.
	pub min_zoom: f64,
	/// Largest allowed zoom factor.
	pub max_zoom: f64,
	/// Zoom factor applied per wheel notch or key press.
	pub zoom_step: f64,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 4.0,
			zoom_step: 1.1,
		}
	}
}

impl ViewConfig {
	/// This config with an unusable zoom range or step replaced by the defaults.
	///
	/// The range needs finite bounds with `0 < min_zoom <= max_zoom`, the step
	/// a finite factor above zero.
	pub fn validated(self) -> Self {
		let defaults = Self::default();
		let range_ok = self.min_zoom.is_finite()
			&& self.max_zoom.is_finite()
			&& self.min_zoom > 0.0
			&& self.min_zoom <= self.max_zoom;
		let (min_zoom, max_zoom) = if range_ok {
			(self.min_zoom, self.max_zoom)
		} else {
			log::warn!(
				"mind-map: zoom range [{}, {}] unusable, using [{}, {}]",
				self.min_zoom,
				self.max_zoom,
				defaults.min_zoom,
				defaults.max_zoom
			);
			(defaults.min_zoom, defaults.max_zoom)
		};
		let zoom_step = if self.zoom_step.is_finite() && self.zoom_step > 0.0 {
			self.zoom_step
		} else {
			log::warn!("mind-map: zoom step {} unusable, using {}", self.zoom_step, defaults.zoom_step);
			defaults.zoom_step
		};
		Self {
			min_zoom,
			max_zoom,
			zoom_step,
		}
	}
}

/// Top-level configuration read from the host page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MindMapConfig {
	/// Force simulation parameters.
	pub layout: LayoutConfig,
	/// Pan/zoom limits.
	pub view: ViewConfig,
	/// Canvas size used when the mount surface reports zero size.
	pub default_width: f64,
	/// Canvas height used when the mount surface reports zero size.
	pub default_height: f64,
	/// Name of a built-in [`Theme`](super::theme::Theme).
	pub theme: String,
}

impl Default for MindMapConfig {
	fn default() -> Self {
		Self {
			layout: LayoutConfig::default(),
			view: ViewConfig::default(),
			default_width: 800.0,
			default_height: 600.0,
			theme: "default".to_string(),
		}
	}
}

impl MindMapConfig {
	/// Parse a JSON override, falling back to defaults on malformed input.
	///
	/// An unusable zoom range falls back on its own, see [`ViewConfig::validated`].
	pub fn from_json(json: &str) -> Self {
		serde_json::from_str::<Self>(json)
			.map(|config| Self {
				view: config.view.clone().validated(),
				..config
			})
			.unwrap_or_else(|e| {
				log::warn!("mind-map: ignoring invalid config: {}", e);
				Self::default()
			})
	}

	/// Replace a non-positive surface size with the configured defaults.
	pub fn surface_size(&self, width: f64, height: f64) -> (f64, f64) {
		(
			if width > 0.0 { width } else { self.default_width },
			if height > 0.0 { height } else { self.default_height },
		)
	}
}

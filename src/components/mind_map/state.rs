//! Mind map state shared by the animation loop and the input handlers.
//!
//! Bundles the graph store, the layout simulation, the scene and the view
//! transform. Input handling lives in the `controller` module as further
//! `impl MindMapState` blocks.

use log::info;

use super::config::{MindMapConfig, ViewConfig};
use super::controller::{DragState, PanState, ViewTransform};
use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::Simulation;
use super::store::GraphStore;
use super::sync::Scene;
use super::types::GraphData;

/// Core state combining graph, physics, scene and interaction tracking.
///
/// Created when the component mounts, then mutated each frame by
/// [`tick`](Self::tick) and by the event handlers in between.
pub struct MindMapState {
	/// Authoritative nodes and connections.
	pub store: GraphStore,
	/// Force layout driving node positions.
	pub simulation: Simulation,
	/// Drawn elements mirroring the store.
	pub scene: Scene,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Zoom-dependent sizing.
	pub scale: ScaleConfig,
	/// Zoom limits and step.
	pub view: ViewConfig,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	pub(super) drag: Option<DragState>,
	pub(super) pan: Option<PanState>,
}

impl MindMapState {
	/// Build fresh state for a `width` x `height` surface.
	pub fn new(data: &GraphData, config: &MindMapConfig, width: f64, height: f64) -> Self {
		Self::with_curve_tension(data, config, width, height, 0.15)
	}

	/// Like [`new`](Self::new) with an explicit link curvature (from the theme).
	pub fn with_curve_tension(
		data: &GraphData,
		config: &MindMapConfig,
		width: f64,
		height: f64,
		curve_tension: f64,
	) -> Self {
		let (width, height) = config.surface_size(width, height);
		let center = (width / 2.0, height / 2.0);
		let store = GraphStore::from_data(data, center);
		let mut scene = Scene::new(curve_tension);
		scene.sync(&store);

		info!(
			"mind-map: mounted {} nodes, {} connections on {}x{}",
			store.nodes().len(),
			store.connections().len(),
			width,
			height
		);

		Self {
			simulation: Simulation::new(config.layout.clone(), center),
			store,
			scene,
			transform: ViewTransform::default(),
			scale: ScaleConfig::default(),
			view: config.view.clone().validated(),
			width,
			height,
			drag: None,
			pan: None,
		}
	}

	/// Scale values for the current zoom.
	pub fn scaled(&self) -> ScaledValues {
		ScaledValues::new(&self.scale, self.transform.k)
	}

	/// Advance the layout by `dt` seconds and re-place the scene.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.advance(&mut self.store, dt);
		self.scene.place(&self.store);
	}

	/// Follow a resized surface; the layout re-centers on the new middle.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation.set_center((width / 2.0, height / 2.0));
		self.simulation.reheat();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mind_map::simulation::Phase;

	#[test]
	fn zero_sized_mount_falls_back_to_default_size() {
		let state = MindMapState::new(&GraphData::seed(), &MindMapConfig::default(), 0.0, 0.0);
		assert_eq!((state.width, state.height), (800.0, 600.0));
		assert_eq!(state.scene.nodes().len(), 3);
		assert_eq!(state.scene.links().len(), 2);
	}

	#[test]
	fn ticking_settles_and_keeps_scene_in_step() {
		let mut state = MindMapState::new(&GraphData::seed(), &MindMapConfig::default(), 800.0, 600.0);
		for _ in 0..400 {
			state.tick(1.0 / 60.0);
		}
		assert_eq!(state.simulation.phase(), Phase::Idle);
		for (element, node) in state.scene.nodes().iter().zip(state.store.nodes()) {
			assert_eq!((element.x, element.y), (node.x, node.y));
		}
	}

	#[test]
	fn resize_moves_center_and_reheats() {
		let mut state = MindMapState::new(&GraphData::seed(), &MindMapConfig::default(), 800.0, 600.0);
		for _ in 0..400 {
			state.tick(1.0 / 60.0);
		}
		state.resize(1200.0, 600.0);
		assert_eq!(state.simulation.phase(), Phase::Active);
		for _ in 0..400 {
			state.tick(1.0 / 60.0);
		}
		let n = state.store.nodes().len() as f64;
		let cx = state.store.nodes().iter().map(|n| n.x).sum::<f64>() / n;
		assert!((cx - 600.0).abs() < 1.0);
	}
}

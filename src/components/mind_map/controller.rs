//! Pointer and keyboard handling.
//!
//! Input either edits the graph through the per-node buttons, pins a node
//! while it is dragged, or moves the view. Handlers run to completion and
//! leave the scene synced with the store before returning.

use log::debug;

use super::config::ViewConfig;
use super::error::{GraphError, Result};
use super::prompt::EditPrompt;
use super::state::MindMapState;
use super::sync::{Control, Hit};

/// Pan and zoom transform applied to the entire scene.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Convert a canvas position to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scale by `factor` keeping the graph point under `(sx, sy)` fixed.
	///
	/// Returns whether the zoom changed after clamping.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, view: &ViewConfig) -> bool {
		// Tolerates an inverted or NaN range.
		let new_k = (self.k * factor).max(view.min_zoom).min(view.max_zoom);
		if !new_k.is_finite() || new_k <= 0.0 {
			return false;
		}
		if new_k == self.k {
			return false;
		}
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
		true
	}
}

/// A node held under the pointer.
#[derive(Clone, Debug)]
pub struct DragState {
	/// Id of the pinned node.
	pub node_id: String,
}

/// Tracks an in-progress background pan.
#[derive(Clone, Debug)]
pub struct PanState {
	/// Pointer x where the pan started.
	pub start_x: f64,
	/// Pointer y where the pan started.
	pub start_y: f64,
	/// Transform x when the pan started.
	pub transform_start_x: f64,
	/// Transform y when the pan started.
	pub transform_start_y: f64,
}

/// Result of handling one input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// State changed.
	Applied,
	/// The user dismissed a dialog; nothing changed.
	Cancelled,
	/// The event had nothing to act on.
	Ignored,
}

impl MindMapState {
	/// Press at screen position `(sx, sy)`.
	///
	/// Buttons trigger their edit, node bodies start a drag, and the
	/// background starts a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, prompt: &mut dyn EditPrompt) -> Result<Outcome> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		match self.scene.hit(gx, gy, &self.scaled()) {
			Some(Hit::Control(id, control)) => self.activate(&id, control, prompt),
			Some(Hit::Node(id)) => self.begin_drag(&id),
			None => {
				self.pan = Some(PanState {
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				});
				Ok(Outcome::Applied)
			}
		}
	}

	/// Pointer moved to `(sx, sy)`: continue a drag or pan, else update hover.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Result<Outcome> {
		if let Some(drag) = &self.drag {
			if !self.store.contains(&drag.node_id) {
				debug!("mind-map: dragged node `{}` is gone", drag.node_id);
				self.drag = None;
				self.simulation.release();
				return Ok(Outcome::Ignored);
			}
			let pin = self.transform.screen_to_graph(sx, sy);
			self.store.set_pin(&drag.node_id, Some(pin))?;
			self.scene.place(&self.store);
			return Ok(Outcome::Applied);
		}

		if let Some(pan) = &self.pan {
			self.transform.x = pan.transform_start_x + (sx - pan.start_x);
			self.transform.y = pan.transform_start_y + (sy - pan.start_y);
			return Ok(Outcome::Applied);
		}

		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		let hit = self.scene.hit(gx, gy, &self.scaled());
		if hit == self.scene.hover {
			return Ok(Outcome::Ignored);
		}
		self.scene.hover = hit;
		Ok(Outcome::Applied)
	}

	/// Release: end any drag (un-pinning the node) or pan.
	pub fn pointer_up(&mut self) -> Result<Outcome> {
		if self.drag.is_some() {
			return self.end_drag();
		}
		if self.pan.take().is_some() {
			return Ok(Outcome::Applied);
		}
		Ok(Outcome::Ignored)
	}

	/// Pointer left the canvas: release and forget the hover.
	pub fn pointer_leave(&mut self) -> Result<Outcome> {
		let outcome = self.pointer_up()?;
		if self.scene.hover.take().is_some() {
			return Ok(Outcome::Applied);
		}
		Ok(outcome)
	}

	/// Wheel at `(sx, sy)`: positive `delta_y` zooms out.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) -> Outcome {
		let step = self.view.zoom_step;
		let factor = if delta_y > 0.0 { 1.0 / step } else { step };
		if self.transform.zoom_at(sx, sy, factor, &self.view) {
			Outcome::Applied
		} else {
			Outcome::Ignored
		}
	}

	/// Keyboard shortcuts: `+`/`=` and `-` zoom, `0` resets, `Escape` drops a drag.
	pub fn key(&mut self, key: &str) -> Result<Outcome> {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let step = self.view.zoom_step;
		let changed = match key {
			"+" | "=" => self.transform.zoom_at(cx, cy, step, &self.view),
			"-" => self.transform.zoom_at(cx, cy, 1.0 / step, &self.view),
			"0" => {
				let changed = self.transform != ViewTransform::default();
				self.transform = ViewTransform::default();
				changed
			}
			"Escape" if self.drag.is_some() => return self.end_drag(),
			_ => false,
		};
		Ok(if changed {
			Outcome::Applied
		} else {
			Outcome::Ignored
		})
	}

	/// CSS cursor for the current interaction.
	pub fn cursor(&self) -> &'static str {
		if self.drag.is_some() || self.pan.is_some() {
			return "grabbing";
		}
		match self.scene.hover {
			Some(Hit::Control(..)) => "pointer",
			Some(Hit::Node(_)) => "grab",
			None => "default",
		}
	}

	/// Whether a node is currently being dragged.
	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	fn activate(&mut self, id: &str, control: Control, prompt: &mut dyn EditPrompt) -> Result<Outcome> {
		match control {
			Control::Add => {
				let Some(text) = non_empty(prompt.request_text("New idea", "")) else {
					return Ok(Outcome::Cancelled);
				};
				self.store.add_node(id, &text)?;
				self.after_structure_change();
			}
			Control::Edit => {
				let current = self.current_text(id)?;
				let Some(text) = non_empty(prompt.request_text("Edit idea", &current)) else {
					return Ok(Outcome::Cancelled);
				};
				self.store.edit_node(id, &text)?;
				self.scene.sync(&self.store);
			}
			Control::Remove => {
				let current = self.current_text(id)?;
				let question = format!("Remove \"{}\" and its connections?", current);
				if !prompt.request_confirm(&question) {
					return Ok(Outcome::Cancelled);
				}
				if self.drag.as_ref().is_some_and(|d| d.node_id == id) {
					self.drag = None;
					self.simulation.release();
				}
				self.store.remove_node(id)?;
				self.after_structure_change();
			}
		}
		Ok(Outcome::Applied)
	}

	fn begin_drag(&mut self, id: &str) -> Result<Outcome> {
		let (x, y) = match self.store.node(id) {
			Some(node) => (node.x, node.y),
			None => return Err(GraphError::InvalidReference(id.to_string())),
		};
		self.store.set_pin(id, Some((x, y)))?;
		self.simulation.hold();
		self.drag = Some(DragState {
			node_id: id.to_string(),
		});
		Ok(Outcome::Applied)
	}

	fn end_drag(&mut self) -> Result<Outcome> {
		let Some(drag) = self.drag.take() else {
			return Ok(Outcome::Ignored);
		};
		if self.store.contains(&drag.node_id) {
			self.store.set_pin(&drag.node_id, None)?;
		}
		self.simulation.release();
		Ok(Outcome::Applied)
	}

	fn current_text(&self, id: &str) -> Result<String> {
		self.store
			.node(id)
			.map(|n| n.text.clone())
			.ok_or_else(|| GraphError::InvalidReference(id.to_string()))
	}

	fn after_structure_change(&mut self) {
		self.scene.sync(&self.store);
		self.simulation.reheat();
	}
}

fn non_empty(answer: Option<String>) -> Option<String> {
	answer
		.map(|t| t.trim().to_string())
		.filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mind_map::config::MindMapConfig;
	use crate::components::mind_map::prompt::ScriptedPrompt;
	use crate::components::mind_map::scale::ScaledValues;
	use crate::components::mind_map::simulation::Phase;
	use crate::components::mind_map::types::GraphData;

	fn state() -> MindMapState {
		MindMapState::new(&GraphData::seed(), &MindMapConfig::default(), 800.0, 600.0)
	}

	/// Screen position of a node's button under the current transform.
	fn button(state: &MindMapState, id: &str, control: Control) -> (f64, f64) {
		let scale = ScaledValues::new(&state.scale, state.transform.k);
		let element = state.scene.nodes().iter().find(|n| n.id == id).unwrap();
		let (gx, gy) = element.control_position(control, &scale);
		(
			gx * state.transform.k + state.transform.x,
			gy * state.transform.k + state.transform.y,
		)
	}

	fn center_of(state: &MindMapState, id: &str) -> (f64, f64) {
		let n = state.store.node(id).unwrap();
		(
			n.x * state.transform.k + state.transform.x,
			n.y * state.transform.k + state.transform.y,
		)
	}

	#[test]
	fn add_button_prompts_and_adds_child() {
		let mut state = state();
		let (sx, sy) = button(&state, "node1", Control::Add);
		let mut prompt = ScriptedPrompt::text(Some("Detail"));

		assert_eq!(state.pointer_down(sx, sy, &mut prompt), Ok(Outcome::Applied));

		assert_eq!(prompt.asked, [("New idea".to_string(), String::new())]);
		assert_eq!(state.store.nodes().len(), 4);
		let child = &state.store.nodes()[3];
		assert_eq!(child.text, "Detail");
		assert!(
			state
				.store
				.connections()
				.iter()
				.any(|c| c.source == "node1" && c.target == child.id)
		);
		// The scene already shows the new node before the next frame.
		assert_eq!(state.scene.nodes().len(), 4);
		assert_eq!(state.simulation.phase(), Phase::Active);
	}

	#[test]
	fn cancelled_or_blank_add_changes_nothing() {
		for answer in [None, Some("   ")] {
			let mut state = state();
			let revision = state.store.revision();
			let (sx, sy) = button(&state, "root", Control::Add);
			let mut prompt = ScriptedPrompt::text(answer);

			assert_eq!(state.pointer_down(sx, sy, &mut prompt), Ok(Outcome::Cancelled));
			assert_eq!(state.store.revision(), revision);
			assert_eq!(state.store.nodes().len(), 3);
		}
	}

	#[test]
	fn edit_button_prefills_current_text() {
		let mut state = state();
		let (sx, sy) = button(&state, "node2", Control::Edit);
		let mut prompt = ScriptedPrompt::text(Some("Chores"));

		assert_eq!(state.pointer_down(sx, sy, &mut prompt), Ok(Outcome::Applied));
		assert_eq!(prompt.asked[0], ("Edit idea".to_string(), "Tasks".to_string()));
		assert_eq!(state.store.node("node2").unwrap().text, "Chores");
		assert_eq!(state.scene.nodes()[2].label, "Chores");
	}

	#[test]
	fn remove_requires_confirmation() {
		let mut state = state();
		let (sx, sy) = button(&state, "root", Control::Remove);

		let mut no = ScriptedPrompt::confirm(false);
		assert_eq!(state.pointer_down(sx, sy, &mut no), Ok(Outcome::Cancelled));
		assert_eq!(state.store.nodes().len(), 3);
		assert!(no.asked[0].0.contains("Mind Map"));

		let mut yes = ScriptedPrompt::confirm(true);
		assert_eq!(state.pointer_down(sx, sy, &mut yes), Ok(Outcome::Applied));
		let ids: Vec<_> = state.store.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["node1", "node2"]);
		assert!(state.store.connections().is_empty());
		assert!(state.scene.links().is_empty());
	}

	#[test]
	fn drag_pins_to_pointer_then_releases() {
		let mut state = state();
		let (sx, sy) = center_of(&state, "node1");
		let mut prompt = ScriptedPrompt::default();

		assert_eq!(state.pointer_down(sx, sy, &mut prompt), Ok(Outcome::Applied));
		assert!(state.is_dragging());
		assert_eq!(state.simulation.phase(), Phase::Active);
		assert_eq!(state.store.node("node1").unwrap().pin(), Some((600.0, 200.0)));

		state.pointer_move(120.0, 80.0).unwrap();
		state.pointer_move(50.0, 50.0).unwrap();
		for _ in 0..10 {
			state.tick(1.0 / 60.0);
		}
		let n = state.store.node("node1").unwrap();
		assert_eq!((n.fx, n.fy), (Some(50.0), Some(50.0)));
		assert_eq!((n.x, n.y), (50.0, 50.0));
		let structure = state.store.structure_revision();

		assert_eq!(state.pointer_up(), Ok(Outcome::Applied));
		let n = state.store.node("node1").unwrap();
		assert_eq!((n.fx, n.fy), (None, None));
		assert_eq!(state.simulation.phase(), Phase::Cooling);

		state.tick(1.0 / 60.0);
		let n = state.store.node("node1").unwrap();
		assert!((n.x, n.y) != (50.0, 50.0));
		assert_eq!(state.store.structure_revision(), structure);
		assert!(prompt.asked.is_empty());
	}

	#[test]
	fn drag_of_removed_node_is_dropped() {
		let mut state = state();
		let (sx, sy) = center_of(&state, "node2");
		state.pointer_down(sx, sy, &mut ScriptedPrompt::default()).unwrap();

		state.store.remove_node("node2").unwrap();
		assert_eq!(state.pointer_move(10.0, 10.0), Ok(Outcome::Ignored));
		assert!(!state.is_dragging());
		state.tick(1.0 / 60.0);
		assert!(state.scene.nodes().iter().all(|n| n.id != "node2"));
		assert_eq!(state.pointer_up(), Ok(Outcome::Ignored));
	}

	#[test]
	fn background_drag_pans_without_touching_layout() {
		let mut state = state();
		let before = state.store.nodes().to_vec();
		let alpha = state.simulation.alpha();

		state.pointer_down(5.0, 5.0, &mut ScriptedPrompt::default()).unwrap();
		state.pointer_move(45.0, -15.0).unwrap();
		assert_eq!(state.cursor(), "grabbing");
		state.pointer_up().unwrap();

		assert_eq!((state.transform.x, state.transform.y), (40.0, -20.0));
		assert_eq!(state.store.nodes(), before.as_slice());
		assert_eq!(state.simulation.alpha(), alpha);
	}

	#[test]
	fn wheel_zoom_is_clamped_and_anchored() {
		let mut state = state();
		for _ in 0..100 {
			state.wheel(200.0, 100.0, -1.0);
		}
		assert_eq!(state.transform.k, 4.0);
		assert_eq!(state.wheel(200.0, 100.0, -1.0), Outcome::Ignored);
		// The graph point under the pointer did not move.
		let (gx, gy) = state.transform.screen_to_graph(200.0, 100.0);
		assert!((gx - 200.0).abs() < 1e-6 && (gy - 100.0).abs() < 1e-6);

		for _ in 0..200 {
			state.wheel(0.0, 0.0, 1.0);
		}
		assert_eq!(state.transform.k, 0.1);
	}

	#[test]
	fn wheel_survives_an_unusable_zoom_range() {
		let config = MindMapConfig::from_json(r#"{ "view": { "min_zoom": 5 } }"#);
		let mut state = MindMapState::new(&GraphData::seed(), &config, 800.0, 600.0);
		assert_eq!(state.wheel(10.0, 10.0, -1.0), Outcome::Applied);
		assert!((0.1..=4.0).contains(&state.transform.k));

		// A range set by hand after construction must not panic either.
		state.view.min_zoom = f64::NAN;
		state.view.max_zoom = 0.5;
		state.wheel(10.0, 10.0, 1.0);
		assert!(state.transform.k.is_finite() && state.transform.k > 0.0);
	}

	#[test]
	fn keys_zoom_and_reset() {
		let mut state = state();
		assert_eq!(state.key("+"), Ok(Outcome::Applied));
		assert!(state.transform.k > 1.0);
		assert_eq!(state.key("0"), Ok(Outcome::Applied));
		assert_eq!(state.transform, ViewTransform::default());
		assert_eq!(state.key("0"), Ok(Outcome::Ignored));
		assert_eq!(state.key("q"), Ok(Outcome::Ignored));
	}

	#[test]
	fn escape_cancels_drag() {
		let mut state = state();
		let (sx, sy) = center_of(&state, "root");
		state.pointer_down(sx, sy, &mut ScriptedPrompt::default()).unwrap();
		assert_eq!(state.key("Escape"), Ok(Outcome::Applied));
		assert!(!state.is_dragging());
		assert_eq!(state.store.node("root").unwrap().pin(), None);
	}

	#[test]
	fn hover_tracks_buttons_and_bodies() {
		let mut state = state();
		let (bx, by) = button(&state, "node2", Control::Remove);
		assert_eq!(state.pointer_move(bx, by), Ok(Outcome::Applied));
		assert_eq!(
			state.scene.hover,
			Some(Hit::Control("node2".into(), Control::Remove))
		);
		assert_eq!(state.cursor(), "pointer");
		assert_eq!(state.pointer_move(bx, by), Ok(Outcome::Ignored));

		let (cx, cy) = center_of(&state, "node2");
		state.pointer_move(cx, cy).unwrap();
		assert_eq!(state.cursor(), "grab");

		assert_eq!(state.pointer_leave(), Ok(Outcome::Applied));
		assert_eq!(state.cursor(), "default");
	}

	#[test]
	fn buttons_follow_zoom_and_pan() {
		let mut state = state();
		state.transform = ViewTransform {
			x: -100.0,
			y: 30.0,
			k: 2.0,
		};
		let (sx, sy) = button(&state, "root", Control::Add);
		let mut prompt = ScriptedPrompt::text(Some("Zoomed"));
		assert_eq!(state.pointer_down(sx, sy, &mut prompt), Ok(Outcome::Applied));
		assert_eq!(state.store.nodes().len(), 4);
	}
}

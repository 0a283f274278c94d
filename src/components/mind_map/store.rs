//! Authoritative graph state.
//!
//! [`GraphStore`] owns the node and connection lists. Everything else reads
//! through it, and the only writes from outside its own operations are the
//! layout engine's position write-back and the controller's drag pins.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::{GraphError, Result};
use super::types::{Connection, GraphData, GraphNode};

/// Distance between a parent and a freshly added child.
const SPAWN_OFFSET: f64 = 40.0;

/// Angular step between siblings, so consecutive children fan out.
fn golden_angle() -> f64 {
	PI * (3.0 - 5f64.sqrt())
}

/// A live node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unique identifier.
	pub id: String,
	/// Label shown inside the node.
	pub text: String,
	/// Current position, owned by the layout engine.
	pub x: f64,
	/// Current y, see `x`.
	pub y: f64,
	/// Pinned position, owned by the interaction controller while set.
	pub fx: Option<f64>,
	/// Pinned y, see `fx`.
	pub fy: Option<f64>,
}

impl Node {
	/// The pin, if both coordinates are set.
	pub fn pin(&self) -> Option<(f64, f64)> {
		self.fx.zip(self.fy)
	}
}

/// Owns the mind map's nodes (in render order) and connections.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	connections: Vec<Connection>,
	index: HashMap<String, usize>,
	next_id: u64,
	revision: u64,
	structure_revision: u64,
}

impl GraphStore {
	/// Build a store from a seed snapshot.
	///
	/// Duplicate ids and connections with unknown endpoints are skipped.
	/// Nodes without a position are laid out on a spiral around `center`.
	pub fn from_data(data: &GraphData, center: (f64, f64)) -> Self {
		let mut store = Self::default();

		for (i, seed) in data.nodes.iter().enumerate() {
			if store.index.contains_key(&seed.id) {
				warn!("mind-map: skipping duplicate node id `{}`", seed.id);
				continue;
			}
			let (x, y) = initial_position(seed, i, center);
			store.index.insert(seed.id.clone(), store.nodes.len());
			store.nodes.push(Node {
				id: seed.id.clone(),
				text: seed.text.clone(),
				x,
				y,
				fx: seed.fx.zip(seed.fy).map(|(fx, _)| fx),
				fy: seed.fx.zip(seed.fy).map(|(_, fy)| fy),
			});
		}

		for link in &data.connections {
			if store.contains(&link.source) && store.contains(&link.target) {
				store.connections.push(link.clone());
			} else {
				warn!(
					"mind-map: skipping connection {} -> {} with unknown endpoint",
					link.source, link.target
				);
			}
		}

		store
	}

	/// Nodes in render order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Connections in insertion order.
	pub fn connections(&self) -> &[Connection] {
		&self.connections
	}

	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	/// Position of `id` in [`nodes`](Self::nodes).
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Whether a node with `id` exists.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Bumped by every successful mutation, including text edits.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Bumped only when nodes or connections are added or removed.
	pub fn structure_revision(&self) -> u64 {
		self.structure_revision
	}

	/// Add a child under `parent_id` and connect the two.
	///
	/// The child starts next to its parent, offset so it never overlaps it.
	pub fn add_node(&mut self, parent_id: &str, text: &str) -> Result<Node> {
		let parent = self
			.node(parent_id)
			.ok_or_else(|| GraphError::InvalidReference(parent_id.to_string()))?;

		let siblings = self
			.connections
			.iter()
			.filter(|c| c.source == parent_id)
			.count();
		let angle = siblings as f64 * golden_angle();
		let (x, y) = (
			parent.x + SPAWN_OFFSET * angle.cos(),
			parent.y + SPAWN_OFFSET * angle.sin(),
		);

		let id = self.fresh_id();
		let node = Node {
			id: id.clone(),
			text: text.to_string(),
			x,
			y,
			fx: None,
			fy: None,
		};
		self.index.insert(id.clone(), self.nodes.len());
		self.nodes.push(node.clone());
		self.connections.push(Connection::new(parent_id, id.as_str()));
		self.bump_structure();

		debug!("mind-map: added `{}` under `{}`", id, parent_id);
		Ok(node)
	}

	/// Replace a node's text. Empty text leaves the node unchanged.
	pub fn edit_node(&mut self, id: &str, text: &str) -> Result<()> {
		let idx = self
			.index_of(id)
			.ok_or_else(|| GraphError::InvalidReference(id.to_string()))?;
		let text = text.trim();
		if text.is_empty() {
			return Ok(());
		}
		self.nodes[idx].text = text.to_string();
		self.revision += 1;
		debug!("mind-map: renamed `{}`", id);
		Ok(())
	}

	/// Remove a node together with every connection touching it.
	pub fn remove_node(&mut self, id: &str) -> Result<()> {
		let idx = self
			.index_of(id)
			.ok_or_else(|| GraphError::InvalidReference(id.to_string()))?;

		self.nodes.remove(idx);
		let before = self.connections.len();
		self.connections.retain(|c| !c.touches(id));
		self.reindex();
		self.bump_structure();

		debug!(
			"mind-map: removed `{}` and {} connection(s)",
			id,
			before - self.connections.len()
		);
		Ok(())
	}

	/// Pin a node at `pin` or release it with `None`.
	///
	/// Pinning also moves the node there so readers never see a stale position.
	pub fn set_pin(&mut self, id: &str, pin: Option<(f64, f64)>) -> Result<()> {
		let idx = self
			.index_of(id)
			.ok_or_else(|| GraphError::InvalidReference(id.to_string()))?;
		let node = &mut self.nodes[idx];
		match pin {
			Some((fx, fy)) => {
				node.fx = Some(fx);
				node.fy = Some(fy);
				node.x = fx;
				node.y = fy;
			}
			None => {
				node.fx = None;
				node.fy = None;
			}
		}
		Ok(())
	}

	/// Layout write-back: positions in node order.
	pub fn write_positions(&mut self, positions: impl IntoIterator<Item = (f64, f64)>) {
		for (node, (x, y)) in self.nodes.iter_mut().zip(positions) {
			node.x = x;
			node.y = y;
		}
	}

	fn fresh_id(&mut self) -> String {
		loop {
			self.next_id += 1;
			let id = format!("node-{}", self.next_id);
			if !self.contains(&id) {
				return id;
			}
		}
	}

	fn reindex(&mut self) {
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
	}

	fn bump_structure(&mut self) {
		self.revision += 1;
		self.structure_revision += 1;
	}
}

/// Where a seed node starts: its given position, else its pin, else a
/// phyllotaxis spiral around `center`.
fn initial_position(seed: &GraphNode, i: usize, center: (f64, f64)) -> (f64, f64) {
	if let (Some(x), Some(y)) = (seed.x, seed.y) {
		return (x, y);
	}
	if let (Some(fx), Some(fy)) = (seed.fx, seed.fy) {
		return (fx, fy);
	}
	let radius = 10.0 * (0.5 + i as f64).sqrt();
	let angle = i as f64 * golden_angle();
	(center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
}

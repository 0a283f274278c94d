//! Graph data structures exchanged with the host page.

use serde::{Deserialize, Serialize};

/// A node as supplied in the seed snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in connections.
	pub id: String,
	/// Label shown inside the node.
	#[serde(default)]
	pub text: String,
	/// Initial position. Nodes without one are spread around the canvas center.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Initial y, see `x`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	/// Fixed position. A node with both set starts pinned.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fx: Option<f64>,
	/// Fixed y, see `fx`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fy: Option<f64>,
}

/// A directed edge from a parent idea to a child idea.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
}

impl Connection {
	/// Connection from `source` to `target`.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// Whether either endpoint is `id`.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Complete graph snapshot: nodes and connections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes in render order.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Parent-to-child connections.
	#[serde(default)]
	pub connections: Vec<Connection>,
}

impl GraphData {
	/// The seed map bundled with the crate.
	pub fn seed() -> Self {
		serde_json::from_str(include_str!("../../../assets/seed.json")).unwrap_or_else(|e| {
			log::warn!("mind-map: bundled seed is invalid: {}", e);
			Self::default()
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_seed_has_root_and_two_children() {
		let data = GraphData::seed();
		let ids: Vec<_> = data.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["root", "node1", "node2"]);
		assert_eq!(
			data.connections,
			vec![
				Connection::new("root", "node1"),
				Connection::new("root", "node2")
			]
		);
	}

	#[test]
	fn bundled_seed_starts_unpinned_at_its_coordinates() {
		let data = GraphData::seed();
		let positions: Vec<_> = data.nodes.iter().map(|n| (n.x, n.y)).collect();
		assert_eq!(
			positions,
			[
				(Some(400.0), Some(300.0)),
				(Some(600.0), Some(200.0)),
				(Some(200.0), Some(400.0))
			]
		);
		assert!(data.nodes.iter().all(|n| n.fx.is_none() && n.fy.is_none()));
	}

	#[test]
	fn positions_are_optional_in_json() {
		let data: GraphData = serde_json::from_str(
			r#"{ "nodes": [{ "id": "a", "text": "A" }, { "id": "b", "fx": 1.0, "fy": 2.0 }] }"#,
		)
		.unwrap();
		assert_eq!(data.nodes[0].x, None);
		assert_eq!(data.nodes[1].text, "");
		assert_eq!(data.nodes[1].fx, Some(1.0));
		assert!(data.connections.is_empty());
	}
}

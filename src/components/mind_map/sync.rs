//! Scene model kept in step with the graph store.
//!
//! The scene holds one element per node and one curve per connection. On a
//! store change it diffs by identity and only creates or drops what changed,
//! so hover state on surviving elements is kept. Every frame [`Scene::place`]
//! copies positions over and recomputes the curves in a single linear pass.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_4;

use log::debug;

use super::scale::ScaledValues;
use super::store::GraphStore;

/// Per-node button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
	/// Add a child node.
	Add,
	/// Rename the node.
	Edit,
	/// Remove the node and its descendants.
	Remove,
}

impl Control {
	/// Every control, in drawing order.
	pub const ALL: [Control; 3] = [Control::Add, Control::Edit, Control::Remove];

	/// Direction from the node center, in canvas radians (y grows downward).
	fn angle(self) -> f64 {
		match self {
			Control::Add => -FRAC_PI_4,
			Control::Edit => 0.0,
			Control::Remove => FRAC_PI_4,
		}
	}

	/// Symbol drawn on the button.
	pub fn glyph(self) -> &'static str {
		match self {
			Control::Add => "+",
			Control::Edit => "✎",
			Control::Remove => "×",
		}
	}
}

/// What lies under a point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hit {
	/// A button of the given node.
	Control(String, Control),
	/// The body of the given node.
	Node(String),
}

impl Hit {
	/// Id of the node that was hit.
	pub fn node_id(&self) -> &str {
		match self {
			Hit::Control(id, _) | Hit::Node(id) => id,
		}
	}
}

/// Visual element of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeElement {
	/// Id of the node this element shows.
	pub id: String,
	/// Label text.
	pub label: String,
	/// Current x in graph coordinates.
	pub x: f64,
	/// Current y in graph coordinates.
	pub y: f64,
	/// Whether the node is pinned.
	pub pinned: bool,
	/// Palette slot, fixed for the element's lifetime.
	pub color_index: usize,
	/// Index of the node in the store, valid for the synced revision.
	slot: usize,
}

impl NodeElement {
	/// Center of one of this node's buttons.
	pub fn control_position(&self, control: Control, scale: &ScaledValues) -> (f64, f64) {
		let a = control.angle();
		(
			self.x + scale.control_offset * a.cos(),
			self.y + scale.control_offset * a.sin(),
		)
	}
}

/// Quadratic curve through `control`'s pull.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Curve {
	/// Point on the source node.
	pub start: (f64, f64),
	/// Quadratic control point.
	pub control: (f64, f64),
	/// Point on the target node.
	pub end: (f64, f64),
}

impl Curve {
	/// Curve between two points, bent sideways by `tension` of its length.
	pub fn between(start: (f64, f64), end: (f64, f64), tension: f64) -> Self {
		let (dx, dy) = (end.0 - start.0, end.1 - start.1);
		let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
		// Perpendicular of (dx, dy) scaled by tension; length cancels out.
		Self {
			start,
			control: (mid.0 - dy * tension, mid.1 + dx * tension),
			end,
		}
	}
}

/// Visual element of a connection.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkElement {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Curve as of the last placement.
	pub curve: Curve,
	from: usize,
	to: usize,
}

/// What a [`Scene::sync`] changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
	/// Node elements added.
	pub nodes_created: usize,
	/// Node elements dropped.
	pub nodes_removed: usize,
	/// Link elements added.
	pub links_created: usize,
	/// Link elements dropped.
	pub links_removed: usize,
}

impl SyncReport {
	/// Whether the sync changed nothing.
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

/// Rendered elements, in store order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: Vec<NodeElement>,
	links: Vec<LinkElement>,
	synced_at: Option<u64>,
	next_color: usize,
	curve_tension: f64,
	/// Element under the pointer, if any.
	pub hover: Option<Hit>,
}

impl Scene {
	/// Empty scene whose curves bend by `curve_tension`.
	pub fn new(curve_tension: f64) -> Self {
		Self {
			curve_tension,
			..Self::default()
		}
	}

	/// Node elements in store order.
	pub fn nodes(&self) -> &[NodeElement] {
		&self.nodes
	}

	/// Link elements in store order.
	pub fn links(&self) -> &[LinkElement] {
		&self.links
	}

	/// Bring the element set in line with `store`.
	///
	/// A no-op when the store has not changed since the last sync.
	pub fn sync(&mut self, store: &GraphStore) -> SyncReport {
		let mut report = SyncReport::default();
		if self.synced_at == Some(store.revision()) {
			return report;
		}

		let mut old_nodes: HashMap<String, NodeElement> =
			self.nodes.drain(..).map(|n| (n.id.clone(), n)).collect();
		for (slot, node) in store.nodes().iter().enumerate() {
			let element = match old_nodes.remove(&node.id) {
				Some(mut element) => {
					element.slot = slot;
					if element.label != node.text {
						element.label.clone_from(&node.text);
					}
					element
				}
				None => {
					report.nodes_created += 1;
					self.next_color += 1;
					NodeElement {
						id: node.id.clone(),
						label: node.text.clone(),
						x: node.x,
						y: node.y,
						pinned: false,
						color_index: self.next_color - 1,
						slot,
					}
				}
			};
			self.nodes.push(element);
		}
		report.nodes_removed = old_nodes.len();

		let element_of: HashMap<&str, usize> = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let mut old_links: HashMap<(String, String), Vec<LinkElement>> = HashMap::new();
		for link in self.links.drain(..) {
			old_links
				.entry((link.source.clone(), link.target.clone()))
				.or_default()
				.push(link);
		}
		let mut links = Vec::with_capacity(store.connections().len());
		for c in store.connections() {
			let (Some(&from), Some(&to)) = (
				element_of.get(c.source.as_str()),
				element_of.get(c.target.as_str()),
			) else {
				continue;
			};
			let reused = old_links
				.get_mut(&(c.source.clone(), c.target.clone()))
				.and_then(Vec::pop);
			let link = match reused {
				Some(mut link) => {
					link.from = from;
					link.to = to;
					link
				}
				None => {
					report.links_created += 1;
					LinkElement {
						source: c.source.clone(),
						target: c.target.clone(),
						curve: Curve::default(),
						from,
						to,
					}
				}
			};
			links.push(link);
		}
		self.links = links;
		report.links_removed = old_links.values().map(Vec::len).sum();

		if let Some(hover) = &self.hover {
			if !element_of.contains_key(hover.node_id()) {
				self.hover = None;
			}
		}

		self.synced_at = Some(store.revision());
		self.place(store);
		if !report.is_empty() {
			debug!("mind-map: scene sync {:?}", report);
		}
		report
	}

	/// Copy current positions onto the elements and recompute the curves.
	///
	/// Falls back to a full [`sync`](Self::sync) if the store changed since the
	/// last one, so elements never read a stale slot.
	pub fn place(&mut self, store: &GraphStore) {
		if self.synced_at != Some(store.revision()) {
			self.sync(store);
			return;
		}
		let nodes = store.nodes();
		for element in &mut self.nodes {
			let node = &nodes[element.slot];
			element.x = node.x;
			element.y = node.y;
			element.pinned = node.pin().is_some();
		}
		for link in &mut self.links {
			let (a, b) = (&self.nodes[link.from], &self.nodes[link.to]);
			link.curve = Curve::between((a.x, a.y), (b.x, b.y), self.curve_tension);
		}
	}

	/// Element at graph coordinates `(gx, gy)`.
	///
	/// Later nodes are drawn on top and win; a node's buttons win over its body.
	pub fn hit(&self, gx: f64, gy: f64, scale: &ScaledValues) -> Option<Hit> {
		let within = |(x, y): (f64, f64), r: f64| (x - gx).powi(2) + (y - gy).powi(2) <= r * r;

		self.nodes.iter().rev().find_map(|node| {
			if scale.controls_hittable {
				for control in Control::ALL {
					if within(node.control_position(control, scale), scale.control_radius) {
						return Some(Hit::Control(node.id.clone(), control));
					}
				}
			}
			within((node.x, node.y), scale.node_radius).then(|| Hit::Node(node.id.clone()))
		})
	}
}

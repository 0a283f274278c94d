//! Force-directed layout engine.
//!
//! A velocity-Verlet simulation in the style of d3-force: every step cools
//! `alpha` toward its target, accumulates link, many-body, centering and
//! collision contributions into per-node velocities, then integrates. Node
//! positions stay in the [`GraphStore`]; the engine only keeps velocities,
//! keyed by node id so they survive structural edits.

use std::collections::HashMap;

use log::debug;

use super::config::LayoutConfig;
use super::store::GraphStore;

/// Wall-clock length of one simulation step.
pub const FRAME_SECONDS: f64 = 1.0 / 60.0;

/// Most steps [`Simulation::advance`] will run to catch up after a stall.
const MAX_CATCH_UP_STEPS: usize = 4;

/// Lifecycle of the simulation's temperature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// At rest. No forces are applied; only pins are enforced.
	Idle,
	/// Just reheated, or held warm by a drag.
	Active,
	/// Alpha decaying toward zero.
	Cooling,
}

#[derive(Clone, Debug)]
struct Body {
	id: String,
	vx: f64,
	vy: f64,
}

#[derive(Clone, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the target end.
	bias: f64,
}

/// Deterministic generator for separating coincident nodes.
#[derive(Clone, Debug)]
struct Jiggle(u64);

impl Jiggle {
	fn next(&mut self) -> f64 {
		self.0 = (1_664_525 * self.0 + 1_013_904_223) % 4_294_967_296;
		(self.0 as f64 / 4_294_967_296.0 - 0.5) * 1e-6
	}

	fn nonzero(&mut self, v: f64) -> f64 {
		if v == 0.0 { self.next() } else { v }
	}
}

/// Simulation state: velocities, springs and temperature.
#[derive(Clone, Debug)]
pub struct Simulation {
	config: LayoutConfig,
	center: (f64, f64),
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	alpha: f64,
	alpha_target: f64,
	phase: Phase,
	built_at: Option<u64>,
	clock: f64,
	jiggle: Jiggle,
}

impl Simulation {
	/// Create a hot simulation pulling toward `center`.
	pub fn new(config: LayoutConfig, center: (f64, f64)) -> Self {
		Self {
			alpha: config.alpha_reheat,
			config,
			center,
			bodies: Vec::new(),
			springs: Vec::new(),
			alpha_target: 0.0,
			phase: Phase::Active,
			built_at: None,
			clock: 0.0,
			jiggle: Jiggle(1),
		}
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Move the centering target, e.g. after the canvas is resized.
	pub fn set_center(&mut self, center: (f64, f64)) {
		self.center = center;
	}

	/// Restart from full temperature.
	pub fn reheat(&mut self) {
		self.alpha = self.config.alpha_reheat;
		self.phase = Phase::Active;
	}

	/// Reheat and keep the system warm until [`release`](Self::release).
	pub fn hold(&mut self) {
		self.reheat();
		self.alpha_target = self.config.alpha_target_drag;
	}

	/// Stop holding the system warm and let it cool down.
	pub fn release(&mut self) {
		self.alpha_target = 0.0;
		if self.phase != Phase::Idle {
			self.phase = Phase::Cooling;
		}
	}

	/// Run as many steps as `dt` seconds of wall time cover.
	///
	/// Partial frames carry over to the next call. After a long stall at most
	/// a few steps run and the rest of the backlog is dropped.
	pub fn advance(&mut self, store: &mut GraphStore, dt: f64) -> usize {
		self.clock += dt.max(0.0);
		let due = (self.clock / FRAME_SECONDS).floor() as usize;
		let steps = due.min(MAX_CATCH_UP_STEPS);
		if due > MAX_CATCH_UP_STEPS {
			self.clock = 0.0;
		} else {
			self.clock -= steps as f64 * FRAME_SECONDS;
		}
		for _ in 0..steps {
			self.tick(store);
		}
		steps
	}

	/// Advance one step and write the new positions back to `store`.
	///
	/// Returns `false` when idle, in which case only pins are enforced.
	pub fn tick(&mut self, store: &mut GraphStore) -> bool {
		self.rebuild_if_stale(store);

		let mut pos: Vec<(f64, f64)> = store.nodes().iter().map(|n| (n.x, n.y)).collect();
		let pins: Vec<Option<(f64, f64)>> = store.nodes().iter().map(|n| n.pin()).collect();

		if self.phase == Phase::Idle {
			if pins.iter().any(Option::is_some) {
				for (p, pin) in pos.iter_mut().zip(&pins) {
					if let Some(pin) = pin {
						*p = *pin;
					}
				}
				store.write_positions(pos);
			}
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_links(&pos);
		self.apply_charge(&pos);
		self.apply_center(&mut pos, &pins);
		self.apply_collision(&pos);

		let keep = 1.0 - self.config.velocity_decay;
		for ((body, p), pin) in self.bodies.iter_mut().zip(pos.iter_mut()).zip(&pins) {
			match pin {
				Some(pin) => {
					*p = *pin;
					body.vx = 0.0;
					body.vy = 0.0;
				}
				None => {
					body.vx *= keep;
					body.vy *= keep;
					p.0 += body.vx;
					p.1 += body.vy;
				}
			}
		}
		store.write_positions(pos);

		if self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min {
			self.alpha = 0.0;
			self.phase = Phase::Idle;
			debug!("mind-map: layout at rest");
		} else if self.phase == Phase::Active && self.alpha_target == 0.0 {
			self.phase = Phase::Cooling;
		}
		true
	}

	/// Rebuild bodies and springs when the graph's structure changed.
	fn rebuild_if_stale(&mut self, store: &GraphStore) {
		let revision = store.structure_revision();
		if self.built_at == Some(revision) {
			return;
		}
		let first_build = self.built_at.is_none();
		self.built_at = Some(revision);

		let mut velocities: HashMap<String, (f64, f64)> = self
			.bodies
			.drain(..)
			.map(|b| (b.id, (b.vx, b.vy)))
			.collect();
		self.bodies = store
			.nodes()
			.iter()
			.map(|n| {
				let (vx, vy) = velocities.remove(&n.id).unwrap_or_default();
				Body {
					id: n.id.clone(),
					vx,
					vy,
				}
			})
			.collect();

		let mut degree = vec![0usize; self.bodies.len()];
		let ends: Vec<(usize, usize)> = store
			.connections()
			.iter()
			.filter_map(|c| Some((store.index_of(&c.source)?, store.index_of(&c.target)?)))
			.collect();
		for &(s, t) in &ends {
			degree[s] += 1;
			degree[t] += 1;
		}
		self.springs = ends
			.into_iter()
			.map(|(source, target)| Spring {
				source,
				target,
				strength: 1.0 / degree[source].min(degree[target]) as f64,
				bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
			})
			.collect();

		debug!(
			"mind-map: layout rebuilt with {} nodes, {} links",
			self.bodies.len(),
			self.springs.len()
		);
		if !first_build {
			self.reheat();
		}
	}

	/// Pull connected pairs toward `link_distance`.
	fn apply_links(&mut self, pos: &[(f64, f64)]) {
		let distance = self.config.link_distance;
		for spring in &self.springs {
			let (s, t) = (spring.source, spring.target);
			let dx = pos[t].0 + self.bodies[t].vx - pos[s].0 - self.bodies[s].vx;
			let dy = pos[t].1 + self.bodies[t].vy - pos[s].1 - self.bodies[s].vy;
			let dx = self.jiggle.nonzero(dx);
			let dy = self.jiggle.nonzero(dy);
			let l = (dx * dx + dy * dy).sqrt();
			let l = (l - distance) / l * self.alpha * spring.strength;
			let (dx, dy) = (dx * l, dy * l);

			self.bodies[t].vx -= dx * spring.bias;
			self.bodies[t].vy -= dy * spring.bias;
			self.bodies[s].vx += dx * (1.0 - spring.bias);
			self.bodies[s].vy += dy * (1.0 - spring.bias);
		}
	}

	/// Inverse-square interaction between every pair.
	fn apply_charge(&mut self, pos: &[(f64, f64)]) {
		let min2 = self.config.charge_distance_min.powi(2);
		let strength = self.config.charge_strength * self.alpha;
		for i in 0..pos.len() {
			for j in (i + 1)..pos.len() {
				let dx = self.jiggle.nonzero(pos[j].0 - pos[i].0);
				let dy = self.jiggle.nonzero(pos[j].1 - pos[i].1);
				let w = strength / (dx * dx + dy * dy).max(min2);

				self.bodies[i].vx += dx * w;
				self.bodies[i].vy += dy * w;
				self.bodies[j].vx -= dx * w;
				self.bodies[j].vy -= dy * w;
			}
		}
	}

	/// Shift free nodes so the centroid moves onto the center.
	fn apply_center(&self, pos: &mut [(f64, f64)], pins: &[Option<(f64, f64)>]) {
		if pos.is_empty() {
			return;
		}
		let n = pos.len() as f64;
		let (sx, sy) = pos.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
		let shift_x = (sx / n - self.center.0) * self.config.center_strength;
		let shift_y = (sy / n - self.center.1) * self.config.center_strength;
		for (p, pin) in pos.iter_mut().zip(pins) {
			if pin.is_none() {
				p.0 -= shift_x;
				p.1 -= shift_y;
			}
		}
	}

	/// Push apart nodes whose collision circles overlap.
	fn apply_collision(&mut self, pos: &[(f64, f64)]) {
		let reach = 2.0 * self.config.collision_radius;
		for i in 0..pos.len() {
			for j in (i + 1)..pos.len() {
				let x = pos[i].0 + self.bodies[i].vx - pos[j].0 - self.bodies[j].vx;
				let y = pos[i].1 + self.bodies[i].vy - pos[j].1 - self.bodies[j].vy;
				if x * x + y * y >= reach * reach {
					continue;
				}
				let x = self.jiggle.nonzero(x);
				let y = self.jiggle.nonzero(y);
				let l = (x * x + y * y).sqrt();
				let l = (reach - l) / l * self.config.collision_strength;
				let (x, y) = (x * l, y * l);

				// Equal radii split the correction evenly.
				self.bodies[i].vx += x * 0.5;
				self.bodies[i].vy += y * 0.5;
				self.bodies[j].vx -= x * 0.5;
				self.bodies[j].vy -= y * 0.5;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mind_map::types::{Connection, GraphData, GraphNode};

	const CENTER: (f64, f64) = (400.0, 300.0);

	fn seed() -> GraphStore {
		GraphStore::from_data(&GraphData::seed(), CENTER)
	}

	fn distance(store: &GraphStore, a: &str, b: &str) -> f64 {
		let (a, b) = (store.node(a).unwrap(), store.node(b).unwrap());
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	fn run_to_rest(sim: &mut Simulation, store: &mut GraphStore, limit: usize) -> usize {
		let mut steps = 0;
		while sim.tick(store) {
			steps += 1;
			assert!(steps <= limit, "still at alpha {} after {} steps", sim.alpha(), steps);
		}
		steps
	}

	#[test]
	fn alpha_decays_monotonically_to_rest() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);
		let mut last = sim.alpha();
		let mut steps = 0;
		while sim.tick(&mut store) {
			assert!(sim.alpha() < last);
			last = sim.alpha();
			steps += 1;
			assert!(steps <= 310);
		}
		assert_eq!(sim.phase(), Phase::Idle);
		assert_eq!(sim.alpha(), 0.0);
	}

	#[test]
	fn connected_pair_settles_at_link_distance() {
		let data = GraphData {
			nodes: vec![
				GraphNode {
					id: "a".into(),
					x: Some(400.0),
					y: Some(300.0),
					..Default::default()
				},
				GraphNode {
					id: "b".into(),
					x: Some(440.0),
					y: Some(300.0),
					..Default::default()
				},
			],
			connections: vec![Connection::new("a", "b")],
		};
		let mut store = GraphStore::from_data(&data, CENTER);
		let config = LayoutConfig {
			charge_strength: 0.0,
			collision_radius: 10.0,
			..LayoutConfig::default()
		};
		let mut sim = Simulation::new(config, CENTER);
		run_to_rest(&mut sim, &mut store, 310);

		assert!((distance(&store, "a", "b") - 150.0).abs() < 1.0);
	}

	#[test]
	fn default_forces_spread_seed_around_center() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);
		run_to_rest(&mut sim, &mut store, 310);

		// Collision circles keep linked nodes a little past the link distance.
		for child in ["node1", "node2"] {
			let d = distance(&store, "root", child);
			assert!((150.0..=210.0).contains(&d), "root-{} at {}", child, d);
		}
		let n = store.nodes().len() as f64;
		let cx = store.nodes().iter().map(|n| n.x).sum::<f64>() / n;
		let cy = store.nodes().iter().map(|n| n.y).sum::<f64>() / n;
		assert!((cx - CENTER.0).abs() < 1.0 && (cy - CENTER.1).abs() < 1.0);
	}

	#[test]
	fn pinned_node_stays_on_its_pin() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);
		store.set_pin("node1", Some((50.0, 50.0))).unwrap();
		sim.hold();

		for _ in 0..100 {
			sim.tick(&mut store);
			let n = store.node("node1").unwrap();
			assert_eq!((n.x, n.y), (50.0, 50.0));
		}

		store.set_pin("node1", None).unwrap();
		sim.release();
		sim.tick(&mut store);
		let n = store.node("node1").unwrap();
		assert!((n.x, n.y) != (50.0, 50.0));
	}

	#[test]
	fn idle_simulation_still_enforces_pins() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);
		run_to_rest(&mut sim, &mut store, 310);
		let rest = store.node("root").unwrap().clone();

		assert!(!sim.tick(&mut store));
		let still = store.node("root").unwrap();
		assert_eq!((still.x, still.y), (rest.x, rest.y));

		store.set_pin("node2", Some((1.0, 2.0))).unwrap();
		assert!(!sim.tick(&mut store));
		let n = store.node("node2").unwrap();
		assert_eq!((n.x, n.y), (1.0, 2.0));
	}

	#[test]
	fn hold_keeps_system_active_until_release() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);
		sim.hold();
		for _ in 0..1000 {
			sim.tick(&mut store);
		}
		assert_eq!(sim.phase(), Phase::Active);
		assert!((sim.alpha() - 0.3).abs() < 0.01);

		sim.release();
		assert_eq!(sim.phase(), Phase::Cooling);
		run_to_rest(&mut sim, &mut store, 400);
		assert_eq!(sim.phase(), Phase::Idle);
	}

	#[test]
	fn structural_change_reheats_and_keeps_survivors() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);
		run_to_rest(&mut sim, &mut store, 310);
		let root = store.node("root").unwrap().clone();

		let child = store.add_node("node1", "Detail").unwrap();
		sim.tick(&mut store);

		assert_eq!(sim.phase(), Phase::Cooling);
		assert!(sim.alpha() > 0.9);
		assert_eq!(sim.bodies.len(), 4);
		assert_eq!(sim.springs.len(), 3);
		// One step nudges survivors rather than re-seeding them.
		let moved = store.node("root").unwrap();
		assert!(((moved.x - root.x).powi(2) + (moved.y - root.y).powi(2)).sqrt() < 100.0);

		store.remove_node(&child.id).unwrap();
		sim.tick(&mut store);
		assert!(sim.bodies.iter().all(|b| b.id != child.id));
		assert_eq!(sim.springs.len(), 2);
	}

	#[test]
	fn removing_everything_leaves_an_empty_working_set() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);
		for id in ["root", "node1", "node2"] {
			store.remove_node(id).unwrap();
		}
		sim.tick(&mut store);
		assert!(sim.bodies.is_empty() && sim.springs.is_empty());
	}

	#[test]
	fn coincident_nodes_are_separated() {
		let data = GraphData {
			nodes: vec![
				GraphNode {
					id: "a".into(),
					x: Some(0.0),
					y: Some(0.0),
					..Default::default()
				},
				GraphNode {
					id: "b".into(),
					x: Some(0.0),
					y: Some(0.0),
					..Default::default()
				},
			],
			connections: vec![],
		};
		let mut store = GraphStore::from_data(&data, (0.0, 0.0));
		let mut sim = Simulation::new(LayoutConfig::default(), (0.0, 0.0));
		for _ in 0..50 {
			sim.tick(&mut store);
		}
		let d = distance(&store, "a", "b");
		assert!(d.is_finite() && d > 150.0);
	}

	#[test]
	fn advance_steps_by_elapsed_frames() {
		let mut store = seed();
		let mut sim = Simulation::new(LayoutConfig::default(), CENTER);

		assert_eq!(sim.advance(&mut store, FRAME_SECONDS * 0.5), 0);
		assert_eq!(sim.advance(&mut store, FRAME_SECONDS * 0.6), 1);
		assert_eq!(sim.advance(&mut store, FRAME_SECONDS * 2.0), 2);
		assert_eq!(sim.advance(&mut store, 5.0), MAX_CATCH_UP_STEPS);
		assert_eq!(sim.advance(&mut store, 0.0), 0);
	}
}

//! mind-map-canvas: an editable, force-directed mind map for the browser.
//!
//! This crate provides a WASM-based component that lays out a mind map with
//! a physics simulation and lets the user add, edit, remove and drag ideas,
//! pan and zoom.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::mind_map::{
	Connection, GraphData, GraphError, GraphNode, MindMapCanvas, MindMapConfig, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("mind-map: logging initialized");
}

/// Text of the `<script>` element with the given id, if present.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the initial graph from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], connections: [...] }
fn load_graph_data() -> Option<GraphData> {
	let json_text = script_text("graph-data")?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(data) => {
			info!(
				"mind-map: loaded {} nodes, {} connections",
				data.nodes.len(),
				data.connections.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("mind-map: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Load optional overrides from a script element with id="mind-map-config".
fn load_config() -> MindMapConfig {
	script_text("mind-map-config")
		.map(|json| MindMapConfig::from_json(&json))
		.unwrap_or_default()
}

/// Main application component.
/// Loads the graph and configuration from the DOM and renders the mind map.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_else(GraphData::seed);
	let graph_signal = Signal::derive(move || graph_data.clone());
	let config = load_config();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Mind Map" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-mind-map">
			<MindMapCanvas data=graph_signal config=config fullscreen=true />
			<div class="mind-map-overlay">
				<h1>"Mind Map"</h1>
				<p class="subtitle">
					"Use + ✎ × on a node to add, edit or remove. Drag nodes to move them. Scroll to zoom. Drag the background to pan."
				</p>
			</div>
		</div>
	}
}

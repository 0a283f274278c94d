//! Editable force-directed mind map component.
//!
//! Renders a mind map on an HTML canvas with:
//! - A graph store that owns nodes and connections and applies edits
//! - A force layout that settles node positions and honors drag pins
//! - A scene kept in step with the store by structural diffing
//! - Per-node add/edit/remove controls, node dragging, pan and zoom
//!
//! The store, layout, scene and controller have no DOM dependency; only the
//! component, the renderer and [`prompt::BrowserPrompt`] touch the browser.
//!
//! # Example
//!
//! ```ignore
//! use mind_map_canvas::{Connection, GraphData, GraphNode, MindMapCanvas};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         GraphNode { id: "root".into(), text: "Plans".into(), ..Default::default() },
//!         GraphNode { id: "a".into(), text: "Travel".into(), ..Default::default() },
//!     ],
//!     connections: vec![Connection::new("root", "a")],
//! };
//!
//! view! { <MindMapCanvas data=data fullscreen=true /> }
//! ```

mod component;
pub mod config;
pub mod controller;
pub mod error;
pub mod prompt;
mod render;
pub mod scale;
pub mod simulation;
mod state;
pub mod store;
pub mod sync;
pub mod theme;
mod types;

pub use component::MindMapCanvas;
pub use config::{LayoutConfig, MindMapConfig, ViewConfig};
pub use error::GraphError;
pub use state::MindMapState;
pub use theme::Theme;
pub use types::{Connection, GraphData, GraphNode};

//! Leptos client-side app wiring, routes and the graph visualization API.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod pages;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

pub use crate::components::graph_view::config::{LayoutConfig, ViewConfig};
pub use crate::components::graph_view::error::{ExportError, PayloadError};
pub use crate::components::graph_view::export::{
	DownloadLink, ExportCapability, ExportOutcome, ExportPlatform, Exporter, SVG_STYLING,
	SerializerStrategy, SvgSource, standalone_svg,
};
pub use crate::components::graph_view::gate::{
	InputDisposition, InteractionGate, KeyEvent, KeyPhase, TouchPhase, ZoomInput,
};
pub use crate::components::graph_view::inference::{
	CAPTION_PRIORITY, PaletteCursor, StyleCache, StylePass, infer_styles, pick_caption_property,
};
pub use crate::components::graph_view::keyboard::{KeySubscription, KeyboardBus};
pub use crate::components::graph_view::model::GraphModel;
pub use crate::components::graph_view::props::{RESERVED_KEYS, extract_properties, truncate_caption};
pub use crate::components::graph_view::style::{StyleRule, parse_style_config, selector_for};
pub use crate::components::graph_view::types::{
	ContainerSize, ElementId, GraphNode, GraphPayload, GraphRelationship, RawRelationship,
};
pub use crate::components::graph_view::view::{
	Action, ActionId, Container, FixedContainer, Host, LifecycleEvent, RenderHandle,
	Visualization, render,
};
pub use crate::components::graph_view::{
	BrowserPlatform, ElementContainer, ElementStyle, GraphVisualization, SVG_NS, StyleSheet,
	ViewTransform, browser_host, detect_capability, escape_xml, resolve_caption,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the homepage and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Graph Gist Viewer" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}

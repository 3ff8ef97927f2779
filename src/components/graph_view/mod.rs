mod browser;
mod component;
pub mod config;
pub mod error;
pub mod export;
pub mod gate;
mod grass;
pub mod inference;
pub mod keyboard;
pub mod model;
pub mod props;
mod render;
mod state;
pub mod style;
pub mod types;
pub mod view;

pub use browser::{BrowserPlatform, ElementContainer, browser_host, detect_capability};
pub use component::GraphVisualization;
pub use grass::{ElementStyle, StyleSheet, resolve_caption};
pub use render::{SVG_NS, escape_xml};
pub use state::ViewTransform;

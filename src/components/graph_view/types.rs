use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::PayloadError;

/// Opaque element key; graph payloads carry either numbers or strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum ElementId {
	Number(i64),
	Text(String),
}

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ElementId::Number(n) => write!(f, "{n}"),
			ElementId::Text(s) => f.write_str(s),
		}
	}
}

impl From<&str> for ElementId {
	fn from(value: &str) -> Self {
		ElementId::Text(value.to_string())
	}
}

impl From<i64> for ElementId {
	fn from(value: i64) -> Self {
		ElementId::Number(value)
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	pub id: ElementId,
	#[serde(default)]
	pub labels: Vec<String>,
	/// Every other field of the record, in payload order.
	#[serde(flatten)]
	pub bag: Map<String, Value>,
	/// Caption-ready view of `bag`, filled in per render pass.
	#[serde(skip)]
	pub properties: Map<String, Value>,
}

impl GraphNode {
	pub fn new(id: impl Into<ElementId>, labels: &[&str], bag: Map<String, Value>) -> Self {
		Self {
			id: id.into(),
			labels: labels.iter().map(|l| l.to_string()).collect(),
			bag,
			properties: Map::new(),
		}
	}

	/// The last label is the one used for styling.
	pub fn display_label(&self) -> &str {
		self.labels.last().map(String::as_str).unwrap_or("")
	}
}

/// A relationship as it arrives, with `start`/`end` endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct RawRelationship {
	pub id: ElementId,
	pub start: ElementId,
	pub end: ElementId,
	#[serde(rename = "type", default)]
	pub rel_type: String,
	#[serde(flatten)]
	pub bag: Map<String, Value>,
}

/// A relationship with endpoints in the source/target roles the renderer expects.
#[derive(Clone, Debug)]
pub struct GraphRelationship {
	pub id: ElementId,
	pub source: ElementId,
	pub target: ElementId,
	pub rel_type: String,
	pub bag: Map<String, Value>,
	pub properties: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default, alias = "relationships")]
	pub links: Vec<RawRelationship>,
}

impl GraphPayload {
	pub fn from_json(raw: &str) -> Result<Self, PayloadError> {
		Ok(serde_json::from_str(raw)?)
	}
}

/// Pixel size of the element hosting a rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerSize {
	pub width: f64,
	pub height: f64,
}

impl ContainerSize {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn is_empty(&self) -> bool {
		!(self.width > 0.0 && self.height > 0.0)
	}
}

//! Reader for the style sheet text handed to the renderer.
//!
//! The dialect is a flat list of `selector { key: value; ... }` blocks. Element
//! styles cascade from the bare `node`/`relationship` rule to the label or type
//! specific ones.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::props::display_value;
use super::types::{GraphNode, GraphRelationship};

#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
	rules: HashMap<String, HashMap<String, String>>,
}

impl StyleSheet {
	pub fn parse(text: &str) -> Self {
		let mut rules: HashMap<String, HashMap<String, String>> = HashMap::new();
		let mut rest = text;
		while let Some(open) = rest.find('{') {
			let selector = rest[..open].trim().to_string();
			let Some(close) = block_end(&rest[open..]) else {
				break;
			};
			let body = &rest[open + 1..open + close];
			let declarations = rules.entry(selector).or_default();
			for declaration in body.split(';') {
				if let Some((key, value)) = declaration.split_once(':') {
					let key = key.trim();
					if !key.is_empty() {
						declarations.insert(key.to_string(), unquote(value.trim()).to_string());
					}
				}
			}
			rest = &rest[open + close + 1..];
		}
		Self { rules }
	}

	pub fn has_selector(&self, selector: &str) -> bool {
		self.rules.contains_key(selector)
	}

	pub fn for_node(&self, node: &GraphNode) -> ElementStyle {
		let selectors = node.labels.iter().map(|l| format!("node.{l}"));
		self.cascade("node", selectors)
	}

	pub fn for_relationship(&self, relationship: &GraphRelationship) -> ElementStyle {
		let specific = std::iter::once(format!("relationship.{}", relationship.rel_type));
		self.cascade("relationship", specific)
	}

	fn cascade(&self, base: &str, specific: impl Iterator<Item = String>) -> ElementStyle {
		let mut props = self.rules.get(base).cloned().unwrap_or_default();
		for selector in specific {
			if let Some(rule) = self.rules.get(&selector) {
				props.extend(rule.iter().map(|(k, v)| (k.clone(), v.clone())));
			}
		}
		ElementStyle { props }
	}
}

/// Offset of the `}` closing the block that starts at `block[0]`, skipping
/// braces inside quoted values such as `caption: '{name}'`.
fn block_end(block: &str) -> Option<usize> {
	let mut quoted = false;
	for (i, c) in block.char_indices().skip(1) {
		match c {
			'\'' => quoted = !quoted,
			'}' if !quoted => return Some(i),
			_ => {}
		}
	}
	None
}

fn unquote(value: &str) -> &str {
	value
		.strip_prefix('\'')
		.and_then(|v| v.strip_suffix('\''))
		.unwrap_or(value)
}

/// Resolved declarations for one element.
#[derive(Clone, Debug, Default)]
pub struct ElementStyle {
	props: HashMap<String, String>,
}

impl ElementStyle {
	pub fn get(&self, key: &str) -> Option<&str> {
		self.props.get(key).map(String::as_str)
	}

	/// Numeric value of a `<n>px` declaration.
	pub fn pixels(&self, key: &str, fallback: f64) -> f64 {
		self.get(key)
			.and_then(|v| v.trim_end_matches("px").trim().parse().ok())
			.unwrap_or(fallback)
	}

	pub fn color(&self, key: &str, fallback: &'static str) -> String {
		self.get(key).unwrap_or(fallback).to_string()
	}
}

/// Fill `{key}` placeholders of a caption template from element properties.
/// `{id}` falls back to the element id. Unknown keys render empty.
pub fn resolve_caption(template: &str, properties: &Map<String, Value>, id: &str) -> String {
	let mut out = String::new();
	let mut rest = template;
	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);
		let Some(close) = rest[open..].find('}') else {
			out.push_str(&rest[open..]);
			return out;
		};
		let key = &rest[open + 1..open + close];
		match properties.get(key) {
			Some(value) => out.push_str(&display_value(value)),
			None if key == "id" => out.push_str(id),
			None => {}
		}
		rest = &rest[open + close + 1..];
	}
	out.push_str(rest);
	out
}

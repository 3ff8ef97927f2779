//! Caption and color inference for labels without an explicit style rule.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::debug;
use serde_json::{Map, Value};

use super::config::ViewConfig;
use super::props::truncate_caption;
use super::style::{StyleRule, selector_for};
use super::types::GraphNode;

/// Property names that usually identify a node to a human, best first.
pub const CAPTION_PRIORITY: &[&str] = &["name", "title", "tag", "username", "lastname"];

/// Rotating position in the palette. Only moves when a new label gets a color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaletteCursor {
	position: usize,
}

impl PaletteCursor {
	pub fn position(&self) -> usize {
		self.position
	}

	fn advance(&mut self, len: usize) -> usize {
		let at = self.position;
		self.position = (at + 1) % len;
		at
	}
}

/// Label selector to rule memo owned by one view instance.
#[derive(Clone, Debug)]
pub struct StyleCache {
	rules: HashMap<String, StyleRule>,
	palette: Vec<String>,
	cursor: PaletteCursor,
}

impl StyleCache {
	pub fn new(palette: Vec<String>) -> Self {
		Self {
			rules: HashMap::new(),
			palette,
			cursor: PaletteCursor::default(),
		}
	}

	/// Seed with rules from a style configuration. These are never replaced.
	pub fn with_explicit(palette: Vec<String>, explicit: Vec<StyleRule>) -> Self {
		let mut cache = Self::new(palette);
		for rule in explicit {
			cache.rules.insert(rule.selector.clone(), rule);
		}
		cache
	}

	pub fn get(&self, selector: &str) -> Option<&StyleRule> {
		self.rules.get(selector)
	}

	pub fn cursor(&self) -> PaletteCursor {
		self.cursor
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	fn resolve(&mut self, selector: &str, caption_property: &str) -> &StyleRule {
		match self.rules.entry(selector.to_string()) {
			Entry::Occupied(entry) => {
				let rule = entry.into_mut();
				// a configured rule without a caption takes the inferred one, once
				if rule.caption_property.is_none() {
					rule.caption_property = Some(caption_property.to_string());
				}
				rule
			}
			Entry::Vacant(entry) => {
				let color = if self.palette.is_empty() {
					None
				} else {
					Some(self.palette[self.cursor.advance(self.palette.len())].as_str())
				};
				debug!("assigning {color:?} to {selector} (caption {caption_property})");
				entry.insert(StyleRule::inferred(
					selector.to_string(),
					caption_property.to_string(),
					color,
				))
			}
		}
	}
}

/// Rules in effect for one render pass and the complete style sheet text.
#[derive(Clone, Debug, Default)]
pub struct StylePass {
	pub rules: Vec<StyleRule>,
	pub sheet: String,
}

impl StylePass {
	pub fn selectors(&self) -> Vec<&str> {
		self.rules.iter().map(|r| r.selector.as_str()).collect()
	}
}

pub fn pick_caption_property(properties: &Map<String, Value>) -> String {
	CAPTION_PRIORITY
		.iter()
		.find(|key| properties.contains_key(**key))
		.map(|key| key.to_string())
		.or_else(|| properties.keys().next().cloned())
		.unwrap_or_else(|| "id".to_string())
}

/// Work out the style of every labelled node and build the style sheet.
///
/// Expects `properties` to be extracted already. Caption values are truncated in
/// place so the renderer shows the shortened text.
pub fn infer_styles(nodes: &mut [GraphNode], cache: &mut StyleCache, config: &ViewConfig) -> StylePass {
	let mut seen: Vec<(String, Option<String>)> = Vec::new();

	for node in nodes.iter() {
		let label = node.display_label();
		if label.is_empty() {
			continue;
		}
		let selector = selector_for(label);
		let slot = match seen.iter().position(|(s, _)| *s == selector) {
			Some(i) => i,
			None => {
				seen.push((selector, None));
				seen.len() - 1
			}
		};
		if !node.properties.is_empty() && seen[slot].1.is_none() {
			seen[slot].1 = Some(pick_caption_property(&node.properties));
		}
	}

	let rules: Vec<StyleRule> = seen
		.into_iter()
		.filter_map(|(selector, caption)| match caption {
			Some(caption) => Some(cache.resolve(&selector, &caption).clone()),
			None => cache.get(&selector).cloned(),
		})
		.collect();

	// Captions are settled per label now; cut the one each node will show.
	for node in nodes.iter_mut() {
		let selector = selector_for(node.display_label());
		let caption = rules
			.iter()
			.find(|r| r.selector == selector)
			.and_then(|r| r.caption_property.as_deref());
		if let Some(value) = caption.and_then(|c| node.properties.get_mut(c)) {
			truncate_caption(value, config.caption_limit, &config.caption_ellipsis);
		}
	}

	let mut sheet = config.base_style.clone();
	sheet.push_str(
		&rules
			.iter()
			.map(StyleRule::to_style_string)
			.collect::<Vec<_>>()
			.join("\n"),
	);
	StylePass { rules, sheet }
}

//! Compact style configuration, e.g. `red:Person(name), green/lightgreen/white:Book(title)`.
//!
//! Each comma separated entry is `color[/borderColor[/textColor]]:label(captionProperty)`.
//! Entries are tokenized independently so one malformed entry never shifts the
//! ones after it.

use log::warn;

pub const DEFAULT_TEXT_COLOR: &str = "#000000";
const SELECTOR_PREFIX: &str = "node.";

/// Caption property and colors for one node label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
	pub selector: String,
	pub caption_property: Option<String>,
	pub color: Option<String>,
	pub border_color: Option<String>,
	pub text_color_internal: Option<String>,
}

pub fn is_selector(label: &str) -> bool {
	label.starts_with(SELECTOR_PREFIX)
}

pub fn selector_for(label: &str) -> String {
	if is_selector(label) {
		label.to_string()
	} else {
		format!("{SELECTOR_PREFIX}{label}")
	}
}

impl StyleRule {
	/// Rule from a `color[/border[/text]]` triple; missing parts default from the primary color.
	pub fn from_colors(selector: String, caption_property: Option<String>, colors: &str) -> Self {
		let mut parts = colors.split('/').map(str::trim);
		let color = parts.next().filter(|c| !c.is_empty()).map(str::to_string);
		let border_color = parts
			.next()
			.filter(|c| !c.is_empty())
			.map(str::to_string)
			.or_else(|| color.clone());
		let text_color_internal = parts
			.next()
			.filter(|c| !c.is_empty())
			.map(str::to_string)
			.or_else(|| color.as_ref().map(|_| DEFAULT_TEXT_COLOR.to_string()));
		Self {
			selector,
			caption_property,
			color,
			border_color,
			text_color_internal,
		}
	}

	/// Rule for an auto-colored label: fill and border share the palette color.
	pub fn inferred(selector: String, caption_property: String, color: Option<&str>) -> Self {
		Self {
			selector,
			caption_property: Some(caption_property),
			color: color.map(str::to_string),
			border_color: color.map(str::to_string),
			text_color_internal: color.map(|_| DEFAULT_TEXT_COLOR.to_string()),
		}
	}

	/// Render as a style sheet rule. Absent attributes are left to the base `node` rule.
	pub fn to_style_string(&self) -> String {
		let mut out = format!("{} {{", self.selector);
		if let Some(property) = &self.caption_property {
			out.push_str(&format!("caption: '{{{property}}}' "));
		}
		if let Some(color) = &self.color {
			out.push_str(&format!("; color: {color}"));
		}
		if let Some(border) = &self.border_color {
			out.push_str(&format!("; border-color: {border}"));
		}
		if let Some(text) = &self.text_color_internal {
			out.push_str(&format!(
				"; text-color-internal: {text}; text-color-external: {text}"
			));
		}
		out.push_str("; }");
		out
	}
}

/// Parse a style configuration into rules, in entry order. A later entry for the
/// same label replaces the earlier one in place.
pub fn parse_style_config(config: &str) -> Vec<StyleRule> {
	let mut rules: Vec<StyleRule> = Vec::new();
	for entry in config.split(',').map(str::trim).filter(|e| !e.is_empty()) {
		let Some(rule) = parse_entry(entry) else {
			warn!("ignoring style entry without a label: {entry:?}");
			continue;
		};
		match rules.iter_mut().find(|r| r.selector == rule.selector) {
			Some(existing) => *existing = rule,
			None => rules.push(rule),
		}
	}
	rules
}

fn parse_entry(entry: &str) -> Option<StyleRule> {
	let (colors, rest) = entry.split_once(':').unwrap_or(("", entry));
	let (label, property) = match rest.split_once('(') {
		Some((label, tail)) => {
			let property = tail.split(')').next().unwrap_or("").trim();
			(label.trim(), (!property.is_empty()).then(|| property.to_string()))
		}
		None => (rest.trim_end_matches(')').trim(), None),
	};
	if label.is_empty() {
		return None;
	}
	Some(StyleRule::from_colors(selector_for(label), property, colors.trim()))
}

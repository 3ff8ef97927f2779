use serde_json::{Map, Value};

/// Keys that describe graph structure or UI state rather than user data.
pub const RESERVED_KEYS: &[&str] = &["id", "start", "end", "source", "target", "labels", "type", "selected"];

pub fn extract_properties(bag: &Map<String, Value>) -> Map<String, Value> {
	bag.iter()
		.filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect()
}

/// Cut textual values longer than `limit` characters and append `ellipsis`.
pub fn truncate_caption(value: &mut Value, limit: usize, ellipsis: &str) {
	if let Value::String(text) = value {
		if text.chars().count() > limit {
			let mut cut: String = text.chars().take(limit).collect();
			cut.push_str(ellipsis);
			*text = cut;
		}
	}
}

/// Text shown for a property value inside a caption.
pub fn display_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}

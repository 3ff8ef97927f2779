use std::collections::HashSet;

use log::warn;

use super::props::extract_properties;
use super::types::{ElementId, GraphNode, GraphPayload, GraphRelationship, RawRelationship};

/// Nodes and relationships in the shape the renderer consumes.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub nodes: Vec<GraphNode>,
	pub relationships: Vec<GraphRelationship>,
}

impl GraphModel {
	/// Attach extracted properties to every element and move relationship
	/// endpoints into source/target roles.
	pub fn build(payload: GraphPayload) -> Self {
		let mut nodes = payload.nodes;
		for node in nodes.iter_mut() {
			node.properties = extract_properties(&node.bag);
		}

		let known: HashSet<&ElementId> = nodes.iter().map(|n| &n.id).collect();
		let relationships: Vec<GraphRelationship> = payload
			.links
			.into_iter()
			.map(|raw| {
				if !known.contains(&raw.start) || !known.contains(&raw.end) {
					warn!("relationship {} points outside the node set", raw.id);
				}
				into_relationship(raw)
			})
			.collect();

		Self { nodes, relationships }
	}

	pub fn node(&self, id: &ElementId) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

fn into_relationship(raw: RawRelationship) -> GraphRelationship {
	let properties = extract_properties(&raw.bag);
	GraphRelationship {
		id: raw.id,
		source: raw.start,
		target: raw.end,
		rel_type: raw.rel_type,
		bag: raw.bag,
		properties,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn payload() -> GraphPayload {
		GraphPayload::from_json(
			r#"{
				"nodes": [
					{"id": 1, "labels": ["Person"], "name": "Ada", "selected": true},
					{"id": 2, "labels": ["Book"], "title": "Cipher"}
				],
				"links": [
					{"id": 10, "start": 1, "end": 2, "type": "WROTE", "year": 1843, "source": 99},
					{"id": 11, "start": 2, "end": 3, "type": "CITES"}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn endpoints_move_to_source_and_target() {
		let model = GraphModel::build(payload());
		let wrote = &model.relationships[0];
		assert_eq!(wrote.source, ElementId::Number(1));
		assert_eq!(wrote.target, ElementId::Number(2));
		assert_eq!(wrote.rel_type, "WROTE");
		assert_eq!(wrote.properties.keys().collect::<Vec<_>>(), vec!["year"]);
	}

	#[test]
	fn node_properties_exclude_reserved_keys() {
		let model = GraphModel::build(payload());
		let ada = model.node(&ElementId::Number(1)).unwrap();
		assert_eq!(ada.properties.keys().collect::<Vec<_>>(), vec!["name"]);
	}

	#[test]
	fn dangling_relationships_are_kept() {
		let model = GraphModel::build(payload());
		assert_eq!(model.relationships.len(), 2);
		assert!(model.node(&ElementId::Number(3)).is_none());
	}
}

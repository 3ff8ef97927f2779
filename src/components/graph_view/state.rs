use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{debug, warn};

use super::config::LayoutConfig;
use super::model::GraphModel;
use super::types::{ContainerSize, ElementId};

#[derive(Clone, Copy, Debug, Default)]
pub struct NodeInfo {
	/// Position of the node in `GraphModel::nodes`.
	pub node: usize,
}

/// Pan offset and scale applied to both drawing layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	pub fn to_attribute(&self) -> String {
		format!("translate({},{})scale({})", self.x, self.y, self.k)
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug)]
pub struct PinchState {
	pub start_distance: f64,
	pub start: ViewTransform,
	pub mid_x: f64,
	pub mid_y: f64,
}

/// One relationship as placed in the simulation.
#[derive(Clone, Copy, Debug)]
pub struct PlacedEdge {
	pub source: usize,
	pub target: usize,
	/// Position of the relationship in `GraphModel::relationships`.
	pub relationship: usize,
}

/// Force-directed positions for one graph model.
pub struct LayoutState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub width: f64,
	pub height: f64,
	edges: Vec<PlacedEdge>,
}

impl LayoutState {
	pub fn new(model: &GraphModel, size: ContainerSize, config: &LayoutConfig) -> Self {
		let mut graph = ForceGraph::new(config.simulation_parameters());
		let mut id_to_idx: HashMap<&ElementId, (DefaultNodeIdx, usize)> = HashMap::new();
		let mut edges = Vec::new();
		let count = model.nodes.len().max(1) as f64;

		for (i, node) in model.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / count;
			let (x, y) = (
				(size.width / 2.0 + config.seed_radius * angle.cos()) as f32,
				(size.height / 2.0 + config.seed_radius * angle.sin()) as f32,
			);
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: config.node_mass,
				is_anchor: false,
				user_data: NodeInfo { node: i },
			});
			id_to_idx.insert(&node.id, (idx, i));
		}

		for (r, rel) in model.relationships.iter().enumerate() {
			let (Some(&(src, si)), Some(&(tgt, ti))) =
				(id_to_idx.get(&rel.source), id_to_idx.get(&rel.target))
			else {
				warn!("skipping relationship {} with unknown endpoint", rel.id);
				continue;
			};
			// self loops add no force, they are only drawn
			if src != tgt {
				graph.add_edge(src, tgt, EdgeData::default());
			}
			edges.push(PlacedEdge {
				source: si,
				target: ti,
				relationship: r,
			});
		}

		Self {
			graph,
			width: size.width,
			height: size.height,
			edges,
		}
	}

	/// Run the simulation until the layout is considered stable.
	pub fn settle(&mut self, ticks: usize, dt: f32) {
		for _ in 0..ticks {
			self.graph.update(dt);
		}
		debug!("layout settled after {ticks} ticks");
	}

	/// Node positions indexed like `GraphModel::nodes`.
	pub fn positions(&self, node_count: usize) -> Vec<Option<(f64, f64)>> {
		let mut out = vec![None; node_count];
		self.graph.visit_nodes(|node| {
			let i = node.data.user_data.node;
			if i < out.len() {
				let (x, y) = (node.x() as f64, node.y() as f64);
				if x.is_finite() && y.is_finite() {
					out[i] = Some((x, y));
				}
			}
		});
		out
	}

	pub fn edges(&self) -> &[PlacedEdge] {
		&self.edges
	}

	/// Keep the layout centred in a container of the new size. Positions move by
	/// half the size change; the view transform is left alone.
	pub fn resize(&mut self, width: f64, height: f64) {
		let (dx, dy) = ((width - self.width) / 2.0, (height - self.height) / 2.0);
		self.graph.visit_nodes_mut(|node| {
			node.data.x += dx as f32;
			node.data.y += dy as f32;
		});
		self.width = width;
		self.height = height;
	}
}

use super::grass::{ElementStyle, StyleSheet, resolve_caption};
use super::model::GraphModel;
use super::state::{LayoutState, ViewTransform};
use super::types::ContainerSize;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

const ARROW_SIZE: f64 = 8.0;
const LOOP_RADIUS: f64 = 14.0;

/// Markup of the two transformable layers, drawn once per layout.
#[derive(Clone, Debug, Default)]
pub struct Layers {
	pub relationships: String,
	pub nodes: String,
}

pub fn draw_layers(model: &GraphModel, layout: &LayoutState, sheet: &StyleSheet) -> Layers {
	let positions = layout.positions(model.nodes.len());
	let node_styles: Vec<ElementStyle> = model.nodes.iter().map(|n| sheet.for_node(n)).collect();
	let radius = |i: usize| node_styles[i].pixels("diameter", 40.0) / 2.0;

	let mut relationships = String::new();
	for edge in layout.edges() {
		let (Some(from), Some(to)) = (positions[edge.source], positions[edge.target]) else {
			continue;
		};
		let rel = &model.relationships[edge.relationship];
		let style = sheet.for_relationship(rel);
		let color = style.color("color", "#4356C0");
		let shaft = style.pixels("shaft-width", 3.0);
		let text = style.color("text-color-external", "#000000");
		let font = style.pixels("font-size", 9.0);

		relationships.push_str(&format!(
			"<g class=\"relationship\" data-id=\"{}\" data-type=\"{}\">",
			escape_xml(&rel.id.to_string()),
			escape_xml(&rel.rel_type)
		));
		if edge.source == edge.target {
			relationships.push_str(&self_loop(from, radius(edge.source), &color, shaft));
			relationships.push_str(&format!(
				"<text class=\"type\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{font}\" fill=\"{text}\">{}</text>",
				from.0,
				from.1 - radius(edge.source) - 2.0 * LOOP_RADIUS - 2.0,
				escape_xml(&rel.rel_type)
			));
		} else {
			relationships.push_str(&straight(from, to, radius(edge.source), radius(edge.target), &color, shaft));
			relationships.push_str(&format!(
				"<text class=\"type\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{font}\" fill=\"{text}\">{}</text>",
				(from.0 + to.0) / 2.0,
				(from.1 + to.1) / 2.0 - shaft,
				escape_xml(&rel.rel_type)
			));
		}
		relationships.push_str("</g>");
	}

	let mut nodes = String::new();
	for (i, node) in model.nodes.iter().enumerate() {
		let Some((x, y)) = positions[i] else {
			continue;
		};
		let style = &node_styles[i];
		let caption = resolve_caption(
			style.get("caption").unwrap_or(""),
			&node.properties,
			&node.id.to_string(),
		);
		nodes.push_str(&format!(
			"<g class=\"node\" data-id=\"{}\" data-label=\"{}\">",
			escape_xml(&node.id.to_string()),
			escape_xml(node.display_label())
		));
		nodes.push_str(&format!(
			"<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
			radius(i),
			style.color("color", "#DFE1E3"),
			style.color("border-color", "#D4D6D7"),
			style.pixels("border-width", 2.0)
		));
		if !caption.is_empty() {
			nodes.push_str(&format!(
				"<text class=\"caption\" x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-size=\"{}\" fill=\"{}\">{}</text>",
				style.pixels("font-size", 12.0),
				style.color("text-color-internal", "#000000"),
				escape_xml(&caption)
			));
		}
		nodes.push_str("</g>");
	}

	Layers { relationships, nodes }
}

fn straight(from: (f64, f64), to: (f64, f64), r_from: f64, r_to: f64, color: &str, shaft: f64) -> String {
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return String::new();
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let (tip_x, tip_y) = (to.0 - ux * r_to, to.1 - uy * r_to);
	let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
	let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
	format!(
		"<path class=\"shaft\" d=\"M {:.2} {:.2} L {back_x:.2} {back_y:.2}\" stroke=\"{color}\" stroke-width=\"{shaft}\" fill=\"none\"/>\
		 <path class=\"arrow\" d=\"M {tip_x:.2} {tip_y:.2} L {:.2} {:.2} L {:.2} {:.2} Z\" fill=\"{color}\"/>",
		from.0 + ux * r_from,
		from.1 + uy * r_from,
		back_x + px,
		back_y + py,
		back_x - px,
		back_y - py,
	)
}

fn self_loop(at: (f64, f64), r: f64, color: &str, shaft: f64) -> String {
	let (x, y) = at;
	format!(
		"<path class=\"shaft\" d=\"M {:.2} {:.2} A {LOOP_RADIUS} {LOOP_RADIUS} 0 1 1 {:.2} {:.2}\" stroke=\"{color}\" stroke-width=\"{shaft}\" fill=\"none\"/>",
		x - r * 0.5,
		y - r * 0.85,
		x + r * 0.5,
		y - r * 0.85,
	)
}

/// Assemble the root element around the layers. A zero-sized container
/// yields an empty root.
pub fn compose_svg(layers: &Layers, size: ContainerSize, transform: &ViewTransform) -> String {
	if size.is_empty() {
		return format!("<svg xmlns=\"{SVG_NS}\" class=\"graph-view\"></svg>");
	}
	let t = transform.to_attribute();
	format!(
		"<svg xmlns=\"{SVG_NS}\" class=\"graph-view\" viewBox=\"0 0 {} {}\" style=\"width: 100%; height: 100%; display: block;\">\
		 <g class=\"layer relationships\" transform=\"{t}\">{}</g>\
		 <g class=\"layer nodes\" transform=\"{t}\">{}</g></svg>",
		size.width, size.height, layers.relationships, layers.nodes
	)
}

/// Markup between the root tags, as a DOM `innerHTML` would return it.
pub fn inner_markup(svg: &str) -> &str {
	let start = svg.find('>').map(|i| i + 1).unwrap_or(0);
	let end = svg.rfind("</svg>").unwrap_or(svg.len()).max(start);
	&svg[start..end]
}

pub fn escape_xml(input: &str) -> String {
	input
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::config::{BASE_STYLE, LayoutConfig};
	use crate::components::graph_view::types::GraphPayload;

	fn draw(json: &str) -> Layers {
		let model = GraphModel::build(GraphPayload::from_json(json).unwrap());
		let mut layout = LayoutState::new(&model, ContainerSize::new(400.0, 300.0), &LayoutConfig::default());
		layout.settle(10, 0.016);
		draw_layers(&model, &layout, &StyleSheet::parse(BASE_STYLE))
	}

	#[test]
	fn nodes_and_relationships_are_drawn() {
		let layers = draw(
			r#"{"nodes":[{"id":1,"labels":["P"],"name":"Ada & Co"},{"id":2,"labels":["P"],"name":"Bob"}],
			   "links":[{"id":3,"start":1,"end":2,"type":"KNOWS"},{"id":4,"start":2,"end":2,"type":"SELF"}]}"#,
		);
		assert_eq!(layers.nodes.matches("<circle").count(), 2);
		assert!(layers.nodes.contains("Ada &amp; Co"));
		assert_eq!(layers.relationships.matches("class=\"relationship\"").count(), 2);
		assert!(layers.relationships.contains(">KNOWS</text>"));
		assert!(layers.relationships.contains(" A 14 14 0 1 1 "));
	}

	#[test]
	fn empty_container_gives_empty_root() {
		let svg = compose_svg(&Layers::default(), ContainerSize::new(0.0, 0.0), &ViewTransform::default());
		assert_eq!(svg, format!("<svg xmlns=\"{SVG_NS}\" class=\"graph-view\"></svg>"));
	}

	#[test]
	fn layers_carry_the_transform() {
		let t = ViewTransform { x: 5.0, y: 6.0, k: 1.5 };
		let svg = compose_svg(&Layers::default(), ContainerSize::new(400.0, 300.0), &t);
		assert_eq!(svg.matches("transform=\"translate(5,6)scale(1.5)\"").count(), 2);
		assert!(svg.contains("viewBox=\"0 0 400 300\""));
		assert!(!svg.contains(" width=\""));
	}

	#[test]
	fn inner_markup_strips_root_tags() {
		assert_eq!(inner_markup("<svg a=\"1\"><g></g></svg>"), "<g></g>");
		assert_eq!(inner_markup("<svg></svg>"), "");
	}
}

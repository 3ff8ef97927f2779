use std::cell::RefCell;
use std::rc::Rc;

use gist_graph_view::{
	ActionId, BrowserPlatform, ContainerSize, ExportCapability, ExportError, ExportOutcome,
	ExportPlatform, FixedContainer, GraphPayload, Host, InputDisposition, InteractionGate, KeyEvent,
	KeyboardBus, LifecycleEvent, SVG_STYLING, StyleSheet, ViewConfig, Visualization, ZoomInput,
	escape_xml, render, resolve_caption,
};

#[derive(Default)]
struct CapturingPlatform {
	files: RefCell<Vec<(String, String)>>,
}

impl ExportPlatform for CapturingPlatform {
	fn save_blob(&self, svg: &str, file_name: &str) -> Result<(), ExportError> {
		self.files.borrow_mut().push((file_name.to_string(), svg.to_string()));
		Ok(())
	}

	fn create_object_url(&self, svg: &str) -> Result<String, ExportError> {
		self.files.borrow_mut().push(("blob".to_string(), svg.to_string()));
		Ok(format!("blob:{}", self.files.borrow().len()))
	}

	fn revoke_object_url(&self, _url: &str) {}
}

fn host(capability: ExportCapability, platform: Rc<CapturingPlatform>) -> Host {
	let mut config = ViewConfig::default();
	config.layout.ticks = 30;
	Host {
		config,
		keyboard: KeyboardBus::default(),
		capability,
		platform,
	}
}

fn people_and_books() -> GraphPayload {
	GraphPayload::from_json(
		r#"{
			"nodes": [
				{"id": 1, "labels": ["Person"], "name": "Ada"},
				{"id": 2, "labels": ["Book"], "title": "Cipher"}
			],
			"links": [{"id": 3, "start": 1, "end": 2, "type": "WROTE"}]
		}"#,
	)
	.expect("fixture parses")
}

/// Mean of the node circle centres found in a piece of SVG markup.
fn node_centre(svg: &str) -> (f64, f64) {
	let read = |attr: &str| -> Vec<f64> {
		svg.split(attr)
			.skip(1)
			.filter_map(|rest| rest.split('"').next()?.parse().ok())
			.collect()
	};
	let (xs, ys) = (read(" cx=\""), read(" cy=\""));
	assert!(!xs.is_empty());
	(xs.iter().sum::<f64>() / xs.len() as f64, ys.iter().sum::<f64>() / ys.len() as f64)
}

#[test]
fn configured_styles_reach_the_sheet() {
	let view = Visualization::new(
		"gist",
		ContainerSize::new(400.0, 300.0),
		people_and_books(),
		Some("red/darkred:Person(name), green:Book(title)"),
		ViewConfig::default(),
		&KeyboardBus::default(),
	);
	let pass = view.style_pass();

	assert_eq!(pass.selectors(), vec!["node.Person", "node.Book"]);
	assert_eq!(pass.rules[0].caption_property.as_deref(), Some("name"));
	assert_eq!(pass.rules[1].caption_property.as_deref(), Some("title"));
	assert!(pass.sheet.contains("node.Person {caption: '{name}' ; color: red; border-color: darkred;"));
	assert!(pass.sheet.contains("node.Book {caption: '{title}' ; color: green; border-color: green;"));
	assert!(view.svg().contains("fill=\"red\" stroke=\"darkred\""));
	assert!(view.svg().contains(">Cipher</text>"));
}

#[test]
fn export_of_a_400_by_300_container() {
	let platform = Rc::new(CapturingPlatform::default());
	let capability = ExportCapability { blob_url: true, legacy_save: false };
	let container = Rc::new(FixedContainer::new(400.0, 300.0));
	let handle = render("gist", container, people_and_books(), None, &host(capability, platform.clone()));

	let outcome = handle.actions()[&ActionId::SaveSvg].trigger().expect("export succeeds");
	assert!(matches!(outcome, ExportOutcome::LinkReady { ref file_name, .. } if file_name == "gist.svg"));

	let files = platform.files.borrow();
	let svg = &files[0].1;
	assert!(svg.starts_with("<svg height=\"300\" width=\"400\" "));
	assert_eq!(svg.matches(SVG_STYLING).count(), 1);
	let style_at = svg.find(SVG_STYLING).unwrap();
	assert_eq!(svg.find("<g"), Some(style_at + SVG_STYLING.len() + 1));
	assert!(svg.ends_with("</svg>"));
}

#[test]
fn legacy_save_uses_container_id_for_file_name() {
	let platform = Rc::new(CapturingPlatform::default());
	let capability = ExportCapability { blob_url: false, legacy_save: true };
	let handle = render(
		"my-graph",
		Rc::new(FixedContainer::new(120.0, 80.0)),
		people_and_books(),
		None,
		&host(capability, platform.clone()),
	);

	handle.actions()[&ActionId::SaveSvg].trigger().unwrap();
	assert_eq!(platform.files.borrow()[0].0, "my-graph.svg");
}

#[test]
fn resize_keeps_transform_and_colors() {
	let platform = Rc::new(CapturingPlatform::default());
	let host = host(ExportCapability::default(), platform);
	let container = Rc::new(FixedContainer::new(400.0, 300.0));
	let handle = render("gist", container.clone(), people_and_books(), None, &host);

	host.keyboard.dispatch(&KeyEvent::down(false, true));
	let wheel = ZoomInput::Wheel { x: 200.0, y: 150.0, delta_y: -1.0 };
	assert_eq!(handle.handle_input(&wheel), InputDisposition::Handled);
	let view = handle.view();
	let transform = view.borrow().transform();
	let rules = view.borrow().style_pass().rules.clone();
	let (cx, cy) = node_centre(&container.mounted());

	container.set_size(800.0, 600.0);
	for event in LifecycleEvent::ALL {
		handle.notify(event);
	}

	let (nx, ny) = node_centre(&container.mounted());
	assert!((nx - cx - 200.0).abs() < 0.05);
	assert!((ny - cy - 150.0).abs() < 0.05);

	assert_eq!(view.borrow().transform(), transform);
	assert_eq!(view.borrow().style_pass().rules, rules);
	assert!(container.mounted().contains("viewBox=\"0 0 800 600\""));
	assert!(container.mounted().contains(&transform.to_attribute()));
}

#[test]
fn scroll_is_left_alone_until_a_modifier_is_held() {
	let platform = Rc::new(CapturingPlatform::default());
	let host = host(ExportCapability::default(), platform);
	let handle = render("gist", Rc::new(FixedContainer::new(400.0, 300.0)), people_and_books(), None, &host);
	let wheel = ZoomInput::Wheel { x: 1.0, y: 1.0, delta_y: 3.0 };

	assert_eq!(handle.view().borrow().gate(), InteractionGate::ZoomDisabled);
	assert_eq!(handle.handle_input(&wheel), InputDisposition::PassThrough);

	host.keyboard.dispatch(&KeyEvent::down(true, false));
	assert_eq!(handle.handle_input(&wheel), InputDisposition::Handled);

	host.keyboard.dispatch(&KeyEvent::up(false, false));
	assert_eq!(handle.handle_input(&wheel), InputDisposition::PassThrough);
}

#[test]
fn colors_survive_new_data_in_the_same_view() {
	let platform = Rc::new(CapturingPlatform::default());
	let host = host(ExportCapability::default(), platform);
	let handle = render(
		"gist",
		Rc::new(FixedContainer::new(400.0, 300.0)),
		GraphPayload::from_json(r#"{"nodes":[{"id":1,"labels":["City"],"name":"Rome"}]}"#).unwrap(),
		None,
		&host,
	);
	let view = handle.view();
	let city = view.borrow().style_pass().rules[0].clone();

	handle.update(
		GraphPayload::from_json(
			r#"{"nodes":[{"id":5,"labels":["River"],"name":"Tiber"},{"id":6,"labels":["City"],"title":"Ostia"}]}"#,
		)
		.unwrap(),
	);

	let pass = view.borrow().style_pass().clone();
	assert_eq!(pass.selectors(), vec!["node.River", "node.City"]);
	assert_eq!(pass.rules[1], city);
	assert_ne!(pass.rules[0].color, city.color);
	assert_eq!(view.borrow().style_cache().cursor().position(), 2);
}

#[test]
fn separate_views_keep_separate_palettes() {
	let bus = KeyboardBus::default();
	let a = Visualization::new("a", ContainerSize::new(10.0, 10.0), people_and_books(), None, ViewConfig::default(), &bus);
	let b = Visualization::new("b", ContainerSize::new(10.0, 10.0), people_and_books(), None, ViewConfig::default(), &bus);
	assert_eq!(a.style_pass().rules, b.style_pass().rules);
	assert_eq!(a.style_cache().cursor(), b.style_cache().cursor());
	assert_eq!(bus.len(), 2);
}

#[test]
fn sheet_helpers_are_usable_from_the_crate_root() {
	let view = Visualization::new(
		"gist",
		ContainerSize::new(400.0, 300.0),
		people_and_books(),
		None,
		ViewConfig::default(),
		&KeyboardBus::default(),
	);
	let sheet = StyleSheet::parse(&view.style_pass().sheet);
	let ada = &view.model().nodes[0];
	let style = sheet.for_node(ada);
	let caption = resolve_caption(style.get("caption").unwrap_or(""), &ada.properties, "1");
	assert_eq!(caption, "Ada");
	assert_eq!(escape_xml("<Ada & Co>"), "&lt;Ada &amp; Co&gt;");
}

#[test]
fn browser_platform_plugs_into_a_host() {
	let host = Host {
		config: ViewConfig::default(),
		keyboard: KeyboardBus::default(),
		capability: ExportCapability::default(),
		platform: Rc::new(BrowserPlatform),
	};
	assert!(!host.capability.is_available());
}

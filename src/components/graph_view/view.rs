//! One visualization instance and the render entry point hosts call.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, info, warn};

use super::config::ViewConfig;
use super::error::ExportError;
use super::export::{ExportCapability, ExportOutcome, ExportPlatform, Exporter, SvgSource};
use super::gate::{InputDisposition, InteractionGate, ZoomController, ZoomInput};
use super::grass::StyleSheet;
use super::inference::{StyleCache, StylePass, infer_styles};
use super::keyboard::{KeySubscription, KeyboardBus};
use super::model::GraphModel;
use super::render::{Layers, compose_svg, draw_layers, inner_markup};
use super::state::{LayoutState, ViewTransform};
use super::style::parse_style_config;
use super::types::{ContainerSize, GraphPayload};

/// The element a rendering lives in.
pub trait Container {
	fn size(&self) -> ContainerSize;

	/// Replace the rendering shown in the page.
	fn mount(&self, svg: &str) {
		let _ = svg;
	}

	/// The mounted root element, when the container belongs to a document.
	fn live_svg(&self) -> Option<Box<dyn SvgSource>> {
		None
	}
}

/// A container with a size set by the host, keeping the last mounted markup.
#[derive(Debug, Default)]
pub struct FixedContainer {
	size: Cell<ContainerSize>,
	mounted: RefCell<String>,
}

impl FixedContainer {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			size: Cell::new(ContainerSize::new(width, height)),
			mounted: RefCell::new(String::new()),
		}
	}

	pub fn set_size(&self, width: f64, height: f64) {
		self.size.set(ContainerSize::new(width, height));
	}

	pub fn mounted(&self) -> String {
		self.mounted.borrow().clone()
	}
}

impl Container for FixedContainer {
	fn size(&self) -> ContainerSize {
		self.size.get()
	}

	fn mount(&self, svg: &str) {
		*self.mounted.borrow_mut() = svg.to_string();
	}
}

pub struct Visualization {
	id: String,
	config: ViewConfig,
	cache: StyleCache,
	model: GraphModel,
	pass: StylePass,
	layout: Option<LayoutState>,
	layers: Layers,
	zoom: ZoomController,
	gate: Rc<Cell<InteractionGate>>,
	size: ContainerSize,
	svg: String,
	_keys: KeySubscription,
}

impl Visualization {
	pub fn new(
		id: &str,
		size: ContainerSize,
		payload: GraphPayload,
		style_config: Option<&str>,
		config: ViewConfig,
		keyboard: &KeyboardBus,
	) -> Self {
		let explicit = style_config.map(parse_style_config).unwrap_or_default();
		let cache = StyleCache::with_explicit(config.palette.clone(), explicit);
		let gate = Rc::new(Cell::new(InteractionGate::default()));
		let gate_keys = gate.clone();
		let keys = keyboard.subscribe(move |event| gate_keys.set(gate_keys.get().next(event)));

		let mut view = Self {
			id: id.to_string(),
			config,
			cache,
			model: GraphModel::default(),
			pass: StylePass::default(),
			layout: None,
			layers: Layers::default(),
			zoom: ZoomController::default(),
			gate,
			size,
			svg: String::new(),
			_keys: keys,
		};
		view.update(payload);
		view
	}

	/// Render new data. Transform and style cache carry over.
	pub fn update(&mut self, payload: GraphPayload) {
		let mut model = GraphModel::build(payload);
		self.pass = infer_styles(&mut model.nodes, &mut self.cache, &self.config);
		self.model = model;
		self.layout = None;
		debug!(
			"{}: {} nodes, {} relationships, {} style rules",
			self.id,
			self.model.nodes.len(),
			self.model.relationships.len(),
			self.pass.rules.len()
		);
		self.draw();
	}

	/// Re-apply the container size and redraw.
	pub fn refresh(&mut self, size: ContainerSize) {
		self.size = size;
		if let Some(layout) = self.layout.as_mut() {
			layout.resize(size.width, size.height);
		}
		self.draw();
	}

	fn draw(&mut self) {
		if self.size.is_empty() {
			warn!("{}: container has no size, rendering nothing", self.id);
			self.layers = Layers::default();
			self.compose();
			return;
		}
		if self.layout.is_none() {
			let mut layout = LayoutState::new(&self.model, self.size, &self.config.layout);
			layout.settle(self.config.layout.ticks, self.config.layout.tick_dt);
			self.layout = Some(layout);
		}
		if let Some(layout) = &self.layout {
			let sheet = StyleSheet::parse(&self.pass.sheet);
			self.layers = draw_layers(&self.model, layout, &sheet);
		}
		self.compose();
	}

	fn compose(&mut self) {
		self.svg = compose_svg(&self.layers, self.size, &self.zoom.transform);
	}

	pub fn handle_input(&mut self, input: &ZoomInput) -> InputDisposition {
		let disposition = self.zoom.handle(self.gate.get(), input, &self.config);
		if disposition == InputDisposition::Handled {
			self.compose();
		}
		disposition
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn svg(&self) -> &str {
		&self.svg
	}

	pub fn gate(&self) -> InteractionGate {
		self.gate.get()
	}

	pub fn transform(&self) -> ViewTransform {
		self.zoom.transform
	}

	pub fn style_pass(&self) -> &StylePass {
		&self.pass
	}

	pub fn style_cache(&self) -> &StyleCache {
		&self.cache
	}

	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	pub fn size(&self) -> ContainerSize {
		self.size
	}
}

impl SvgSource for Visualization {
	fn has_native_serializer(&self) -> bool {
		true
	}

	fn serialize_native(&self) -> Result<String, ExportError> {
		Ok(self.svg.clone())
	}

	fn inner_markup(&self) -> Result<String, ExportError> {
		Ok(inner_markup(&self.svg).to_string())
	}
}

/// Host notifications that trigger a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleEvent {
	Expand,
	Contract,
	SizeChange,
}

impl LifecycleEvent {
	pub const ALL: [LifecycleEvent; 3] = [LifecycleEvent::Expand, LifecycleEvent::Contract, LifecycleEvent::SizeChange];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionId {
	SaveSvg,
}

impl ActionId {
	pub fn icon_class(self) -> &'static str {
		match self {
			ActionId::SaveSvg => "ui large download icon fi-download",
		}
	}
}

type ActionFn = Rc<dyn Fn() -> Result<ExportOutcome, ExportError>>;

#[derive(Clone)]
pub struct Action {
	pub title: &'static str,
	run: ActionFn,
}

impl Action {
	pub fn trigger(&self) -> Result<ExportOutcome, ExportError> {
		(self.run)()
	}
}

/// Everything a render call needs from its surroundings.
#[derive(Clone)]
pub struct Host {
	pub config: ViewConfig,
	pub keyboard: KeyboardBus,
	pub capability: ExportCapability,
	pub platform: Rc<dyn ExportPlatform>,
}

/// Result of a render call: refresh hooks and the actions the platform supports.
pub struct RenderHandle {
	view: Rc<RefCell<Visualization>>,
	container: Rc<dyn Container>,
	exporter: Option<Rc<RefCell<Exporter>>>,
	actions: BTreeMap<ActionId, Action>,
}

impl RenderHandle {
	pub fn notify(&self, event: LifecycleEvent) {
		debug!("{:?} on {}", event, self.view.borrow().id());
		let size = self.container.size();
		self.view.borrow_mut().refresh(size);
		self.container.mount(self.view.borrow().svg());
	}

	pub fn subscriptions(&self) -> &'static [LifecycleEvent] {
		&LifecycleEvent::ALL
	}

	pub fn actions(&self) -> &BTreeMap<ActionId, Action> {
		&self.actions
	}

	pub fn handle_input(&self, input: &ZoomInput) -> InputDisposition {
		let disposition = self.view.borrow_mut().handle_input(input);
		if disposition == InputDisposition::Handled {
			self.container.mount(self.view.borrow().svg());
		}
		disposition
	}

	pub fn update(&self, payload: GraphPayload) {
		self.view.borrow_mut().update(payload);
		self.container.mount(self.view.borrow().svg());
	}

	pub fn view(&self) -> Rc<RefCell<Visualization>> {
		self.view.clone()
	}

	pub fn exporter(&self) -> Option<Rc<RefCell<Exporter>>> {
		self.exporter.clone()
	}
}

/// Render `payload` into `container` and wire up hooks and actions.
pub fn render(
	id: &str,
	container: Rc<dyn Container>,
	payload: GraphPayload,
	style_config: Option<&str>,
	host: &Host,
) -> RenderHandle {
	let view = Visualization::new(
		id,
		container.size(),
		payload,
		style_config,
		host.config.clone(),
		&host.keyboard,
	);
	container.mount(view.svg());
	let view = Rc::new(RefCell::new(view));

	let mut actions = BTreeMap::new();
	let exporter = host.capability.is_available().then(|| {
		Rc::new(RefCell::new(Exporter::new(id, host.capability, host.platform.clone())))
	});
	if let Some(exporter) = &exporter {
		let (view, container, exporter) = (view.clone(), container.clone(), exporter.clone());
		let run: ActionFn = Rc::new(move || {
			let size = container.size();
			match container.live_svg() {
				Some(live) => exporter.borrow_mut().export(live.as_ref(), size),
				None => exporter.borrow_mut().export(&*view.borrow(), size),
			}
		});
		actions.insert(ActionId::SaveSvg, Action { title: "Save as SVG", run });
	}
	info!("rendered {id} with {} action(s)", actions.len());

	RenderHandle {
		view,
		container,
		exporter,
		actions,
	}
}

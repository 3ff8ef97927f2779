//! `web-sys` implementations of the host traits.

use std::cell::OnceCell;
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, Element, HtmlElement, KeyboardEvent, Url, XmlSerializer};

use super::config::ViewConfig;
use super::error::ExportError;
use super::export::{ExportCapability, ExportPlatform, SvgSource};
use super::gate::KeyEvent;
use super::keyboard::KeyboardBus;
use super::types::ContainerSize;
use super::view::{Container, Host};

const LEGACY_SAVE: &str = "msSaveOrOpenBlob";

thread_local! {
	static CAPABILITY: OnceCell<ExportCapability> = const { OnceCell::new() };
}

fn platform_error(err: JsValue) -> ExportError {
	ExportError::Platform(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn has_property(target: &JsValue, key: &str) -> bool {
	js_sys::Reflect::has(target, &JsValue::from_str(key)).unwrap_or(false)
}

/// Download support of the current page, probed on first use.
pub fn detect_capability() -> ExportCapability {
	CAPABILITY.with(|cell| {
		*cell.get_or_init(|| {
			let Some(window) = web_sys::window() else {
				return ExportCapability::default();
			};
			let window: &JsValue = window.as_ref();
			let blob = has_property(window, "Blob");
			let url = js_sys::Reflect::get(window, &JsValue::from_str("URL"))
				.map(|url| !url.is_undefined() && has_property(&url, "createObjectURL"))
				.unwrap_or(false);
			let legacy = js_sys::Reflect::get(window, &JsValue::from_str("navigator"))
				.and_then(|nav| js_sys::Reflect::get(&nav, &JsValue::from_str(LEGACY_SAVE)))
				.map(|f| !f.is_undefined())
				.unwrap_or(false);
			let capability = ExportCapability {
				blob_url: blob && url,
				legacy_save: blob && legacy,
			};
			info!("export capability: {capability:?}");
			capability
		})
	})
}

/// Feed document key events into the page bus. Attaches at most once.
pub fn attach_keyboard(bus: &KeyboardBus) {
	if !bus.claim_source() {
		return;
	}
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return;
	};
	for (kind, down) in [("keydown", true), ("keyup", false)] {
		let bus = bus.clone();
		let cb = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
			let event = if down {
				KeyEvent::down(ev.alt_key(), ev.shift_key())
			} else {
				KeyEvent::up(ev.alt_key(), ev.shift_key())
			};
			bus.dispatch(&event);
		});
		let _ = document.add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref());
		// lives as long as the page
		cb.forget();
	}
	debug!("document keyboard listener attached");
}

pub fn browser_host(config: ViewConfig) -> Host {
	let keyboard = KeyboardBus::page();
	attach_keyboard(&keyboard);
	Host {
		config,
		keyboard,
		capability: detect_capability(),
		platform: Rc::new(BrowserPlatform),
	}
}

/// The element the rendering is mounted into.
pub struct ElementContainer {
	element: HtmlElement,
}

impl ElementContainer {
	pub fn new(element: HtmlElement) -> Self {
		Self { element }
	}
}

impl Container for ElementContainer {
	fn size(&self) -> ContainerSize {
		ContainerSize::new(self.element.client_width() as f64, self.element.client_height() as f64)
	}

	fn mount(&self, svg: &str) {
		self.element.set_inner_html(svg);
	}

	fn live_svg(&self) -> Option<Box<dyn SvgSource>> {
		self.element
			.first_element_child()
			.map(|svg| Box::new(DomSvg { element: svg }) as Box<dyn SvgSource>)
	}
}

/// A mounted `<svg>` element.
pub struct DomSvg {
	element: Element,
}

impl SvgSource for DomSvg {
	fn has_native_serializer(&self) -> bool {
		web_sys::window().is_some_and(|w| has_property(w.as_ref(), "XMLSerializer"))
	}

	fn serialize_native(&self) -> Result<String, ExportError> {
		XmlSerializer::new()
			.and_then(|s| s.serialize_to_string(&self.element))
			.map_err(platform_error)
	}

	fn inner_markup(&self) -> Result<String, ExportError> {
		Ok(self.element.inner_html())
	}
}

pub struct BrowserPlatform;

impl BrowserPlatform {
	fn blob(svg: &str) -> Result<Blob, ExportError> {
		let options = BlobPropertyBag::new();
		options.set_type("image/svg+xml");
		let parts = js_sys::Array::of1(&JsValue::from_str(svg));
		Blob::new_with_str_sequence_and_options(&parts, &options).map_err(platform_error)
	}
}

impl ExportPlatform for BrowserPlatform {
	fn save_blob(&self, svg: &str, file_name: &str) -> Result<(), ExportError> {
		let window = web_sys::window().ok_or(ExportError::Unavailable)?;
		let navigator: JsValue = window.navigator().into();
		let save: js_sys::Function = js_sys::Reflect::get(&navigator, &JsValue::from_str(LEGACY_SAVE))
			.map_err(platform_error)?
			.dyn_into()
			.map_err(|_| ExportError::Unavailable)?;
		let blob: JsValue = Self::blob(svg)?.into();
		save.call2(&navigator, &blob, &JsValue::from_str(file_name))
			.map_err(platform_error)?;
		Ok(())
	}

	fn create_object_url(&self, svg: &str) -> Result<String, ExportError> {
		Url::create_object_url_with_blob(&Self::blob(svg)?).map_err(platform_error)
	}

	fn revoke_object_url(&self, url: &str) {
		let _ = Url::revoke_object_url(url);
	}
}

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, MouseEvent, TouchEvent, WheelEvent};

use super::browser::{ElementContainer, browser_host};
use super::config::ViewConfig;
use super::export::{DownloadLink, ExportOutcome};
use super::gate::{InputDisposition, TouchPhase, ZoomInput};
use super::types::GraphPayload;
use super::view::{ActionId, LifecycleEvent, RenderHandle, render};

type Handle = Rc<RefCell<Option<RenderHandle>>>;

fn local_point(surface: &HtmlElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = surface.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn touch_points(surface: &HtmlElement, ev: &TouchEvent) -> Vec<(f64, f64)> {
	let touches = ev.touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.map(|t| local_point(surface, t.client_x(), t.client_y()))
		.collect()
}

/// Send one input to the view; returns whether the page default must be suppressed.
fn dispatch(handle: &Handle, input: ZoomInput) -> bool {
	handle
		.borrow()
		.as_ref()
		.is_some_and(|h| h.handle_input(&input) == InputDisposition::Handled)
}

#[component]
pub fn GraphVisualization(
	#[prop(into)] id: String,
	#[prop(into)] data: Signal<GraphPayload>,
	#[prop(optional, into)] style_config: Option<String>,
	#[prop(optional)] config: Option<ViewConfig>,
	#[prop(optional, into)] expanded: Option<Signal<bool>>,
) -> impl IntoView {
	let surface_ref = NodeRef::<leptos::html::Div>::new();
	let handle: Handle = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let host = browser_host(config.unwrap_or_default());
	let can_save = host.capability.is_available();
	let link = RwSignal::new(DownloadLink::default());
	let export_error = RwSignal::new(None::<String>);

	let (handle_init, resize_init, surface_id) = (handle.clone(), resize_cb.clone(), id.clone());
	Effect::new(move |_| {
		let payload = data.get();
		let Some(surface) = surface_ref.get() else {
			return;
		};
		if let Some(ref h) = *handle_init.borrow() {
			h.update(payload);
			return;
		}
		let surface: HtmlElement = surface.into();
		let container = Rc::new(ElementContainer::new(surface));
		*handle_init.borrow_mut() = Some(render(
			&surface_id,
			container,
			payload,
			style_config.as_deref(),
			&host,
		));

		let Some(window) = web_sys::window() else {
			return;
		};
		let handle_resize = handle_init.clone();
		*resize_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref h) = *handle_resize.borrow() {
				h.notify(LifecycleEvent::SizeChange);
			}
		}));
		if let Some(ref cb) = *resize_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	});

	if let Some(expanded) = expanded {
		let handle_expand = handle.clone();
		Effect::new(move |previous: Option<bool>| {
			let now = expanded.get();
			if previous.is_some_and(|p| p != now) {
				if let Some(ref h) = *handle_expand.borrow() {
					h.notify(if now { LifecycleEvent::Expand } else { LifecycleEvent::Contract });
				}
			}
			now
		});
	}

	let handle_save = handle.clone();
	let on_save = move |_: MouseEvent| {
		let Some(ref h) = *handle_save.borrow() else {
			return;
		};
		let Some(action) = h.actions().get(&ActionId::SaveSvg) else {
			return;
		};
		match action.trigger() {
			Ok(ExportOutcome::LinkReady { .. }) => {
				if let Some(exporter) = h.exporter() {
					link.set(exporter.borrow().link().clone());
				}
				export_error.set(None);
			}
			Ok(ExportOutcome::Saved { .. }) => export_error.set(None),
			Err(err) => {
				error!("export failed: {err}");
				export_error.set(Some(err.to_string()));
			}
		}
	};

	let handle_link = handle.clone();
	let on_link_click = move |_: MouseEvent| {
		if let Some(exporter) = handle_link.borrow().as_ref().and_then(|h| h.exporter()) {
			exporter.borrow_mut().link_clicked();
			link.set(exporter.borrow().link().clone());
		}
	};

	let handle_wh = handle.clone();
	let on_wheel = move |ev: WheelEvent| {
		let Some(surface) = surface_ref.get() else {
			return;
		};
		let surface: HtmlElement = surface.into();
		let (x, y) = local_point(&surface, ev.client_x(), ev.client_y());
		if dispatch(&handle_wh, ZoomInput::Wheel { x, y, delta_y: ev.delta_y() }) {
			ev.prevent_default();
		}
	};

	let handle_md = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(surface) = surface_ref.get() else {
			return;
		};
		let surface: HtmlElement = surface.into();
		let (x, y) = local_point(&surface, ev.client_x(), ev.client_y());
		if dispatch(&handle_md, ZoomInput::PointerDown { x, y }) {
			ev.prevent_default();
		}
	};

	let handle_mm = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(surface) = surface_ref.get() else {
			return;
		};
		let surface: HtmlElement = surface.into();
		let (x, y) = local_point(&surface, ev.client_x(), ev.client_y());
		dispatch(&handle_mm, ZoomInput::PointerMove { x, y });
	};

	let handle_mu = handle.clone();
	let on_mouseup = move |_: MouseEvent| {
		dispatch(&handle_mu, ZoomInput::PointerUp);
	};

	let handle_ml = handle.clone();
	let on_mouseleave = move |_: MouseEvent| {
		dispatch(&handle_ml, ZoomInput::PointerUp);
	};

	let touch = move |phase: TouchPhase, handle: Handle| {
		move |ev: TouchEvent| {
			let Some(surface) = surface_ref.get() else {
				return;
			};
			let surface: HtmlElement = surface.into();
			let points = touch_points(&surface, &ev);
			if dispatch(&handle, ZoomInput::Touch { phase, points }) {
				ev.prevent_default();
			}
		}
	};

	view! {
		<div class="graph-visualization" id=id style="position: relative; width: 100%; height: 100%;">
			<div
				node_ref=surface_ref
				class="graph-surface"
				on:wheel=on_wheel
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:touchstart=touch(TouchPhase::Start, handle.clone())
				on:touchmove=touch(TouchPhase::Move, handle.clone())
				on:touchend=touch(TouchPhase::End, handle.clone())
				style="width: 100%; height: 100%;"
			/>
			<div class="graph-actions" style="position: absolute; top: 0.5em; right: 0.5em;">
				{can_save
					.then(|| {
						view! {
							<button class="btn graph-action" title="Save as SVG" on:click=on_save>
								<i class={ActionId::SaveSvg.icon_class()}></i>
								" Save as SVG"
							</button>
						}
					})}
				<a
					class="btn btn-success visualization-download"
					target="_blank"
					href=move || link.get().href.unwrap_or_else(|| "#".to_string())
					download=move || link.get().file_name
					style:display=move || { if link.get().visible { "inline-block" } else { "none" } }
					on:click=on_link_click
				>
					<i class="ui large download icon fi-download"></i>
					" Download SVG"
				</a>
				{move || export_error.get().map(|e| view! { <p class="graph-export-error">{e}</p> })}
			</div>
		</div>
	}
}

//! Two-state gate deciding whether pointer input zooms the graph or is left
//! to the page, and the zoom/pan handling behind it.

use super::config::ViewConfig;
use super::state::{PanState, PinchState, ViewTransform};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionGate {
	#[default]
	ZoomDisabled,
	ZoomEnabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPhase {
	Down,
	Up,
}

/// The parts of a keyboard event the gate cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
	pub phase: KeyPhase,
	pub alt: bool,
	pub shift: bool,
}

impl KeyEvent {
	pub fn down(alt: bool, shift: bool) -> Self {
		Self { phase: KeyPhase::Down, alt, shift }
	}

	pub fn up(alt: bool, shift: bool) -> Self {
		Self { phase: KeyPhase::Up, alt, shift }
	}

	pub fn has_modifier(&self) -> bool {
		self.alt || self.shift
	}
}

impl InteractionGate {
	/// Next state after a key event. Releasing Shift reports `shift == false`,
	/// so both phases follow the same rule.
	pub fn next(self, event: &KeyEvent) -> Self {
		if event.has_modifier() {
			InteractionGate::ZoomEnabled
		} else {
			InteractionGate::ZoomDisabled
		}
	}

	pub fn fold<'a>(self, events: impl IntoIterator<Item = &'a KeyEvent>) -> Self {
		events.into_iter().fold(self, |gate, event| gate.next(event))
	}

	pub fn is_enabled(self) -> bool {
		self == InteractionGate::ZoomEnabled
	}
}

/// Pointer, wheel and touch input in container coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum ZoomInput {
	Wheel { x: f64, y: f64, delta_y: f64 },
	PointerDown { x: f64, y: f64 },
	PointerMove { x: f64, y: f64 },
	PointerUp,
	Touch { phase: TouchPhase, points: Vec<(f64, f64)> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
	Start,
	Move,
	End,
}

/// Whether the view consumed an input. `PassThrough` means the host must not
/// prevent the default page behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputDisposition {
	Handled,
	PassThrough,
}

#[derive(Clone, Debug, Default)]
pub struct ZoomController {
	pub transform: ViewTransform,
	pan: PanState,
	pinch: Option<PinchState>,
}

impl ZoomController {
	pub fn handle(&mut self, gate: InteractionGate, input: &ZoomInput, config: &ViewConfig) -> InputDisposition {
		if !gate.is_enabled() {
			// a gesture in progress ends when the modifier is released
			self.pan.active = false;
			self.pinch = None;
			return InputDisposition::PassThrough;
		}
		match input {
			ZoomInput::Wheel { x, y, delta_y } => {
				let factor = if *delta_y > 0.0 {
					config.wheel_zoom_out
				} else {
					config.wheel_zoom_in
				};
				self.zoom_at(*x, *y, self.transform.k * factor, config);
			}
			ZoomInput::PointerDown { x, y } => self.start_pan(*x, *y),
			ZoomInput::PointerMove { x, y } => {
				if !self.pan.active {
					return InputDisposition::PassThrough;
				}
				self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
				self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
			}
			ZoomInput::PointerUp => self.pan.active = false,
			ZoomInput::Touch { phase, points } => self.touch(*phase, points, config),
		}
		InputDisposition::Handled
	}

	fn start_pan(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			start_x: x,
			start_y: y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Scale to `k`, keeping the graph point under `(x, y)` fixed.
	fn zoom_at(&mut self, x: f64, y: f64, k: f64, config: &ViewConfig) {
		let new_k = config.clamp_scale(k);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	fn touch(&mut self, phase: TouchPhase, points: &[(f64, f64)], config: &ViewConfig) {
		match (phase, points) {
			(TouchPhase::End, _) | (_, []) => {
				self.pan.active = false;
				self.pinch = None;
			}
			(TouchPhase::Start, [(x, y)]) => {
				self.pinch = None;
				self.start_pan(*x, *y);
			}
			(TouchPhase::Move, [(x, y)]) => {
				if self.pan.active {
					self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
					self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
				}
			}
			(TouchPhase::Start, [a, b, ..]) => {
				self.pan.active = false;
				self.pinch = Some(PinchState {
					start_distance: distance(*a, *b),
					start: self.transform,
					mid_x: (a.0 + b.0) / 2.0,
					mid_y: (a.1 + b.1) / 2.0,
				});
			}
			(TouchPhase::Move, [a, b, ..]) => {
				let Some(pinch) = self.pinch.clone() else {
					return;
				};
				if pinch.start_distance < f64::EPSILON {
					return;
				}
				let k = pinch.start.k * distance(*a, *b) / pinch.start_distance;
				self.transform = pinch.start;
				self.zoom_at(pinch.mid_x, pinch.mid_y, k, config);
			}
		}
	}
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

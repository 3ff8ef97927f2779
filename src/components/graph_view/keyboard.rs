//! Page-wide keyboard events fanned out to every live view.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::debug;

use super::gate::KeyEvent;

type Listener = Rc<dyn Fn(&KeyEvent)>;

#[derive(Default)]
struct BusInner {
	next_id: u64,
	listeners: BTreeMap<u64, Listener>,
	attached: bool,
}

/// Registry of key listeners. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct KeyboardBus {
	inner: Rc<RefCell<BusInner>>,
}

thread_local! {
	static PAGE_BUS: KeyboardBus = KeyboardBus::default();
}

impl KeyboardBus {
	/// The bus fed by the document-level listener.
	pub fn page() -> Self {
		PAGE_BUS.with(Clone::clone)
	}

	pub fn subscribe(&self, listener: impl Fn(&KeyEvent) + 'static) -> KeySubscription {
		let mut inner = self.inner.borrow_mut();
		let id = inner.next_id;
		inner.next_id += 1;
		inner.listeners.insert(id, Rc::new(listener));
		debug!("key listener {id} subscribed");
		KeySubscription {
			id,
			bus: Rc::downgrade(&self.inner),
		}
	}

	pub fn dispatch(&self, event: &KeyEvent) {
		// listeners may subscribe or unsubscribe while running
		let listeners: Vec<Listener> = self.inner.borrow().listeners.values().cloned().collect();
		for listener in listeners {
			listener(event);
		}
	}

	pub fn len(&self) -> usize {
		self.inner.borrow().listeners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns `true` exactly once, for whoever attaches the source listener.
	pub fn claim_source(&self) -> bool {
		let mut inner = self.inner.borrow_mut();
		!std::mem::replace(&mut inner.attached, true)
	}
}

/// Keeps a listener registered; dropping it unsubscribes.
pub struct KeySubscription {
	id: u64,
	bus: Weak<RefCell<BusInner>>,
}

impl Drop for KeySubscription {
	fn drop(&mut self) {
		if let Some(inner) = self.bus.upgrade() {
			inner.borrow_mut().listeners.remove(&self.id);
			debug!("key listener {} unsubscribed", self.id);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::components::graph_view::gate::InteractionGate;

	#[test]
	fn events_reach_every_subscriber() {
		let bus = KeyboardBus::default();
		let a = Rc::new(Cell::new(InteractionGate::default()));
		let b = Rc::new(Cell::new(InteractionGate::default()));
		let (a2, b2) = (a.clone(), b.clone());
		let _sa = bus.subscribe(move |e| a2.set(a2.get().next(e)));
		let _sb = bus.subscribe(move |e| b2.set(b2.get().next(e)));

		bus.dispatch(&KeyEvent::down(false, true));
		assert!(a.get().is_enabled() && b.get().is_enabled());
		bus.dispatch(&KeyEvent::up(false, false));
		assert!(!a.get().is_enabled() && !b.get().is_enabled());
	}

	#[test]
	fn dropping_a_subscription_unregisters() {
		let bus = KeyboardBus::default();
		let hits = Rc::new(Cell::new(0));
		let h = hits.clone();
		let sub = bus.subscribe(move |_| h.set(h.get() + 1));
		bus.dispatch(&KeyEvent::down(true, false));
		drop(sub);
		bus.dispatch(&KeyEvent::down(true, false));
		assert_eq!(hits.get(), 1);
		assert!(bus.is_empty());
	}

	#[test]
	fn source_is_claimed_once() {
		let bus = KeyboardBus::default();
		assert!(bus.claim_source());
		assert!(!bus.clone().claim_source());
	}
}

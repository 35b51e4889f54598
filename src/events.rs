//! Per-container publish/subscribe channels.
//!
//! Every container owns an [`EventEmitter`]. Channels are keyed by
//! [`EventKind`]: the four pointer events the host delivers, plus
//! [`EventKind::Custom`] for signals a widget wants to layer on top.
//!
//! Listeners receive the whole [`Tree`] mutably, so a handler can move,
//! restyle, add or destroy containers (including the one that is emitting).
//! [`Tree::emit`] snapshots the listener list before invoking anything and
//! skips listeners that were unregistered while the fan-out was running.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::tree::{NodeId, Tree};

/// Name of an event channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    MousePress,
    MouseRelease,
    MouseMove,
    MouseDrag,
    /// Widget-specific named signal. Never routed to children.
    Custom(String),
}

impl EventKind {
    /// The channels every container routes to its children.
    pub const POINTER: [EventKind; 4] = [
        EventKind::MousePress,
        EventKind::MouseRelease,
        EventKind::MouseMove,
        EventKind::MouseDrag,
    ];

    pub fn custom(name: impl Into<String>) -> Self {
        EventKind::Custom(name.into())
    }

    pub fn is_pointer(&self) -> bool {
        !matches!(self, EventKind::Custom(_))
    }
}

/// Payload handed to listeners.
///
/// `x`/`y` are expressed in the coordinate frame of the receiving
/// container's parent (for the root: canvas coordinates). Movement deltas
/// are only meaningful for [`EventKind::MouseDrag`].
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub x: f32,
    pub y: f32,
    pub movement_x: f32,
    pub movement_y: f32,
    stopped: Cell<bool>,
}

impl Event {
    pub fn new(kind: EventKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            movement_x: 0.0,
            movement_y: 0.0,
            stopped: Cell::new(false),
        }
    }

    pub fn press(x: f32, y: f32) -> Self {
        Self::new(EventKind::MousePress, x, y)
    }

    pub fn release(x: f32, y: f32) -> Self {
        Self::new(EventKind::MouseRelease, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(EventKind::MouseMove, x, y)
    }

    pub fn drag(x: f32, y: f32, movement_x: f32, movement_y: f32) -> Self {
        Self::new(EventKind::MouseDrag, x, y).with_movement(movement_x, movement_y)
    }

    pub fn with_movement(mut self, movement_x: f32, movement_y: f32) -> Self {
        self.movement_x = movement_x;
        self.movement_y = movement_y;
        self
    }

    /// Ask the router that delivered this event not to offer it to any
    /// further siblings.
    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// Copy for the next level down, at new coordinates and with a fresh
    /// stop flag.
    pub(crate) fn forwarded(&self, x: f32, y: f32) -> Self {
        Self {
            kind: self.kind.clone(),
            x,
            y,
            movement_x: self.movement_x,
            movement_y: self.movement_y,
            stopped: Cell::new(false),
        }
    }
}

type ListenerFn = dyn Fn(&mut Tree, &Event) -> Result<()>;

/// A shareable event handler. Identity is the allocation: clones of the
/// same `Listener` are the same listener, two separately built listeners
/// never are.
#[derive(Clone)]
pub struct Listener(Rc<ListenerFn>);

impl Listener {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Tree, &Event) -> Result<()> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, tree: &mut Tree, event: &Event) -> Result<()> {
        (self.0)(tree, event)
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

struct Entry {
    kind: EventKind,
    listener: Listener,
    /// Container whose destruction unregisters this listener
    owner: Option<NodeId>,
}

/// Ordered listener registry of one container.
#[derive(Default)]
pub struct EventEmitter {
    entries: Vec<Entry>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` under `kind`. Returns false if that exact
    /// listener was already registered for `kind`.
    pub fn on(&mut self, kind: EventKind, listener: Listener) -> bool {
        self.insert(kind, listener, None)
    }

    /// Like [`on`](Self::on), but the registration disappears when `owner`
    /// is destroyed.
    pub fn on_owned(&mut self, kind: EventKind, owner: NodeId, listener: Listener) -> bool {
        self.insert(kind, listener, Some(owner))
    }

    fn insert(&mut self, kind: EventKind, listener: Listener, owner: Option<NodeId>) -> bool {
        if self.is_registered(&kind, &listener) {
            return false;
        }
        self.entries.push(Entry {
            kind,
            listener,
            owner,
        });
        true
    }

    /// Unregister. Returns false if the listener was not registered.
    pub fn off(&mut self, kind: &EventKind, listener: &Listener) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.kind == *kind && e.listener.ptr_eq(listener)));
        self.entries.len() != before
    }

    pub fn is_registered(&self, kind: &EventKind, listener: &Listener) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == *kind && e.listener.ptr_eq(listener))
    }

    /// Listeners for `kind` in registration order.
    pub fn snapshot(&self, kind: &EventKind) -> Vec<Listener> {
        self.entries
            .iter()
            .filter(|e| e.kind == *kind)
            .map(|e| e.listener.clone())
            .collect()
    }

    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.entries.iter().filter(|e| e.kind == *kind).count()
    }

    /// Drop every registration owned by one of `owners`.
    pub(crate) fn purge_owned(&mut self, owners: &[NodeId]) {
        self.entries
            .retain(|e| e.owner.is_none_or(|owner| !owners.contains(&owner)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Listener::new(|_, _| Ok(()))
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let mut emitter = EventEmitter::new();
        let listener = noop();
        assert!(emitter.on(EventKind::MousePress, listener.clone()));
        assert!(!emitter.on(EventKind::MousePress, listener.clone()));
        assert_eq!(emitter.listener_count(&EventKind::MousePress), 1);

        // The same listener may still be registered under another kind
        assert!(emitter.on(EventKind::MouseRelease, listener));
        assert_eq!(emitter.listener_count(&EventKind::MouseRelease), 1);
    }

    #[test]
    fn test_distinct_closures_are_distinct_listeners() {
        let mut emitter = EventEmitter::new();
        emitter.on(EventKind::MouseMove, noop());
        emitter.on(EventKind::MouseMove, noop());
        assert_eq!(emitter.listener_count(&EventKind::MouseMove), 2);
    }

    #[test]
    fn test_off_unregisters_only_the_given_kind() {
        let mut emitter = EventEmitter::new();
        let listener = noop();
        emitter.on(EventKind::MousePress, listener.clone());
        emitter.on(EventKind::MouseRelease, listener.clone());

        assert!(emitter.off(&EventKind::MousePress, &listener));
        assert!(!emitter.off(&EventKind::MousePress, &listener));
        assert!(!emitter.is_registered(&EventKind::MousePress, &listener));
        assert!(emitter.is_registered(&EventKind::MouseRelease, &listener));
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let mut emitter = EventEmitter::new();
        let first = noop();
        let second = noop();
        emitter.on(EventKind::custom("ping"), first.clone());
        emitter.on(EventKind::MousePress, noop());
        emitter.on(EventKind::custom("ping"), second.clone());

        let snapshot = emitter.snapshot(&EventKind::custom("ping"));
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].ptr_eq(&first));
        assert!(snapshot[1].ptr_eq(&second));
    }

    #[test]
    fn test_stop_flag_is_fresh_when_forwarded() {
        let event = Event::drag(10.0, 10.0, 2.0, 3.0);
        event.stop_propagation();
        assert!(event.is_propagation_stopped());

        let forwarded = event.forwarded(4.0, 5.0);
        assert!(!forwarded.is_propagation_stopped());
        assert_eq!(forwarded.kind, EventKind::MouseDrag);
        assert_eq!((forwarded.x, forwarded.y), (4.0, 5.0));
        assert_eq!((forwarded.movement_x, forwarded.movement_y), (2.0, 3.0));
    }

    #[test]
    fn test_custom_kinds_are_not_pointer_events() {
        assert!(EventKind::MouseDrag.is_pointer());
        assert!(!EventKind::custom("click").is_pointer());
        assert!(EventKind::POINTER.iter().all(EventKind::is_pointer));
    }
}

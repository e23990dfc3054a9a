//! Event queue and handler table
//!
//! Window callbacks (keyboard, mouse, resize) and physics callbacks (contact
//! starts) are turned into [`EngineEvent`]s. They are buffered in an
//! [`EventQueue`] and delivered, in arrival order, to exactly one handler per
//! event kind registered in an [`EventDispatcher`].
//!
//! # Example
//!
//! ```ignore
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.register(EventKind::Keyboard, Sandbox::on_key);
//!
//! queue.push(EngineEvent::Keyboard { key: KeyCode::KeyO, state: KeyState::Pressed });
//! queue.swap();
//! for event in queue.drain() {
//!     dispatcher.dispatch(&mut sandbox, &event);
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use rustc_hash::FxHashMap;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::physics::PhysicsHandle;

// ============================================================================
// Event Types
// ============================================================================

/// State of a key in a keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key went down this event
    Pressed,
    /// Key is held and the OS sent an auto-repeat
    Repeat,
    /// Key went up
    Released,
}

impl KeyState {
    /// Build from a winit element state plus its repeat flag
    #[must_use]
    pub fn from_winit(state: winit::event::ElementState, repeat: bool) -> Self {
        match (state, repeat) {
            (winit::event::ElementState::Released, _) => Self::Released,
            (winit::event::ElementState::Pressed, true) => Self::Repeat,
            (winit::event::ElementState::Pressed, false) => Self::Pressed,
        }
    }

    /// True for `Pressed` and `Repeat`
    #[must_use]
    pub const fn is_down(self) -> bool {
        !matches!(self, Self::Released)
    }
}

/// Events delivered to the application.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EngineEvent {
    /// A key changed state.
    Keyboard {
        /// Physical key
        key: KeyCode,
        /// New state
        state: KeyState,
    },

    /// A mouse button changed state.
    MouseButton {
        /// Which button
        button: MouseButton,
        /// True on press, false on release
        pressed: bool,
    },

    /// Two bodies started touching during the last physics step.
    Collision {
        /// First body
        body_a: PhysicsHandle,
        /// Second body
        body_b: PhysicsHandle,
        /// World-space contact point
        position: Vec3,
        /// World-space contact normal (from A to B)
        normal: Vec3,
    },

    /// The presentation surface was (re)created with a new size.
    Resized {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
}

/// Discriminant used as the handler table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Keyboard,
    MouseButton,
    Collision,
    Resized,
}

impl EngineEvent {
    /// The kind of this event
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Keyboard { .. } => EventKind::Keyboard,
            Self::MouseButton { .. } => EventKind::MouseButton,
            Self::Collision { .. } => EventKind::Collision,
            Self::Resized { .. } => EventKind::Resized,
        }
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue.
///
/// Events pushed by window callbacks land in the pending buffer; `swap()` at
/// the start of a frame makes them readable, so a frame sees a stable batch.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<EngineEvent>,
    /// Events from the previous batch, ready for processing
    processing: VecDeque<EngineEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed after the next `swap()`.
    #[inline]
    pub fn push(&mut self, event: EngineEvent) {
        self.pending.push_back(event);
    }

    /// Make pending events readable.
    ///
    /// Anything left unread from the previous batch is kept in front, so no
    /// input is dropped if a frame skipped draining.
    pub fn swap(&mut self) {
        self.processing.append(&mut self.pending);
    }

    /// Iterate over readable events without consuming them.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.processing.iter()
    }

    /// Drain readable events in delivery order.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = EngineEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are readable events.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of readable events.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events waiting for the next swap.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear both buffers.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handler Table
// ============================================================================

/// Handler signature: returns true if the event was consumed.
pub type EventHandler<T> = fn(&mut T, &EngineEvent) -> bool;

/// One handler per event kind, invoked synchronously.
///
/// Handlers are plain function pointers, so dispatching never holds a borrow
/// of the table while the target is mutated.
pub struct EventDispatcher<T> {
    handlers: FxHashMap<EventKind, EventHandler<T>>,
}

impl<T> std::fmt::Debug for EventDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl<T> EventDispatcher<T> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register the handler for `kind`, returning the one it replaces.
    pub fn register(&mut self, kind: EventKind, handler: EventHandler<T>) -> Option<EventHandler<T>> {
        self.handlers.insert(kind, handler)
    }

    /// Look up the handler for `kind`.
    #[must_use]
    pub fn handler(&self, kind: EventKind) -> Option<EventHandler<T>> {
        self.handlers.get(&kind).copied()
    }

    /// Deliver one event. Returns false when no handler is registered.
    pub fn dispatch(&self, target: &mut T, event: &EngineEvent) -> bool {
        match self.handler(event.kind()) {
            Some(handler) => handler(target, event),
            None => false,
        }
    }
}

impl<T> Default for EventDispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: KeyCode) -> EngineEvent {
        EngineEvent::Keyboard {
            key,
            state: KeyState::Pressed,
        }
    }

    #[derive(Default)]
    struct Recorder {
        keys: Vec<KeyCode>,
        resizes: u32,
    }

    fn record_key(recorder: &mut Recorder, event: &EngineEvent) -> bool {
        if let EngineEvent::Keyboard { key, .. } = event {
            recorder.keys.push(*key);
        }
        true
    }

    fn record_resize(recorder: &mut Recorder, _event: &EngineEvent) -> bool {
        recorder.resizes += 1;
        true
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(key(KeyCode::KeyO));
        assert!(queue.is_empty(), "Events should not be visible before swap");
        assert_eq!(queue.pending_count(), 1);

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_event_queue_keeps_delivery_order() {
        let mut queue = EventQueue::new();
        queue.push(key(KeyCode::KeyO));
        queue.push(key(KeyCode::KeyR));
        queue.swap();
        queue.push(key(KeyCode::KeyK));
        queue.swap();

        let keys: Vec<_> = queue
            .drain()
            .filter_map(|e| match e {
                EngineEvent::Keyboard { key, .. } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![KeyCode::KeyO, KeyCode::KeyR, KeyCode::KeyK]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_queue_clear() {
        let mut queue = EventQueue::new();
        queue.push(key(KeyCode::KeyO));
        queue.swap();
        queue.push(key(KeyCode::KeyP));

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_dispatcher_routes_by_kind() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(EventKind::Keyboard, record_key);
        dispatcher.register(EventKind::Resized, record_resize);

        let mut recorder = Recorder::default();
        assert!(dispatcher.dispatch(&mut recorder, &key(KeyCode::KeyM)));
        assert!(dispatcher.dispatch(
            &mut recorder,
            &EngineEvent::Resized {
                width: 10,
                height: 10
            }
        ));
        assert!(!dispatcher.dispatch(
            &mut recorder,
            &EngineEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true
            }
        ));

        assert_eq!(recorder.keys, vec![KeyCode::KeyM]);
        assert_eq!(recorder.resizes, 1);
    }

    #[test]
    fn test_dispatcher_single_handler_per_kind() {
        let mut dispatcher = EventDispatcher::<Recorder>::new();
        assert!(dispatcher.register(EventKind::Keyboard, record_key).is_none());
        assert!(dispatcher.register(EventKind::Keyboard, record_resize).is_some());

        let mut recorder = Recorder::default();
        dispatcher.dispatch(&mut recorder, &key(KeyCode::KeyO));
        assert!(recorder.keys.is_empty());
        assert_eq!(recorder.resizes, 1);
    }

    #[test]
    fn test_key_state_from_winit() {
        use winit::event::ElementState;
        assert_eq!(
            KeyState::from_winit(ElementState::Pressed, false),
            KeyState::Pressed
        );
        assert_eq!(
            KeyState::from_winit(ElementState::Pressed, true),
            KeyState::Repeat
        );
        assert_eq!(
            KeyState::from_winit(ElementState::Released, true),
            KeyState::Released
        );
        assert!(KeyState::Repeat.is_down());
        assert!(!KeyState::Released.is_down());
    }
}

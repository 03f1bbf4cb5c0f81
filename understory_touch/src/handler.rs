// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch handlers and the adapters that bridge mouse-only and gesture-only controls.
//!
//! A [`TouchHandler`] is what a view offers for a contact. It is shared between the touch
//! item that owns it and any gesture candidates that mention it, so it is held by
//! [`HandlerRef`], an `Rc` whose equality is pointer identity. All methods take `&self`;
//! handlers that keep state use interior mutability.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use core::ops::Deref;

use kurbo::{Point, Vec2};
use smallvec::{SmallVec, smallvec};
use understory_gesture::{Constraints, GestureEvent, GestureRequest, GestureType, Priority};

use crate::event::{MouseEvent, MouseEventKind, TouchEvent};

/// Receiver of one contact (or several, see [`add_touch`](Self::add_touch)).
///
/// The engine guarantees `begin` before any `trigger`, and exactly one `finish` per `begin`.
pub trait TouchHandler {
    /// The handler was accepted for the contact in `event`.
    fn begin(&self, event: &TouchEvent) {
        let _ = event;
    }

    /// A contact moved. Returns `false` when the handler is no longer interested.
    fn trigger(&self, event: &TouchEvent) -> bool {
        let _ = event;
        true
    }

    /// The contact ended or was taken away.
    fn finish(&self, event: &TouchEvent, canceled: bool) {
        let _ = (event, canceled);
    }

    /// Offer an additional contact over the handler's view. Return `true` to take it.
    fn add_touch(&self, event: &TouchEvent) -> bool {
        let _ = event;
        false
    }

    /// A gesture this handler requested was recognized or updated.
    ///
    /// Also receives `Possible` events while arbitration is still open.
    fn on_gesture(&self, event: &GestureEvent) -> bool {
        let _ = event;
        false
    }

    /// Gestures the handler needs before it can be accepted.
    ///
    /// An empty list means the handler can take the contact right away.
    fn required_gestures(&self) -> SmallVec<[GestureRequest; 4]> {
        SmallVec::new()
    }

    /// Returns `true` if the handler wants `kind` to keep listening as a shadow gesture
    /// after it won a competing gesture over the same contacts.
    fn allows_competing_gesture(&self, kind: GestureType) -> bool {
        let _ = kind;
        false
    }

    /// Returns `true` if the handler's view takes focus on acceptance.
    fn takes_focus(&self) -> bool {
        true
    }
}

/// Shared handle to a [`TouchHandler`]. Two handles are equal if they point at the same handler.
#[derive(Clone)]
pub struct HandlerRef(Rc<dyn TouchHandler>);

impl HandlerRef {
    /// Wrap a handler.
    pub fn new<T: TouchHandler + 'static>(handler: Rc<T>) -> Self {
        Self(handler)
    }

    /// Returns `true` if both handles refer to the same handler.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: TouchHandler + 'static> From<Rc<T>> for HandlerRef {
    fn from(handler: Rc<T>) -> Self {
        Self::new(handler)
    }
}

impl Deref for HandlerRef {
    type Target = dyn TouchHandler;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for HandlerRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for HandlerRef {}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// A mouse tracker created by a view in response to a synthetic mouse-down.
pub trait MouseHandler {
    /// The pointer moved. Returns `false` to stop tracking.
    fn on_move(&mut self, event: &MouseEvent) -> bool;

    /// The button was released, or the contact was taken away.
    fn on_release(&mut self, event: &MouseEvent, canceled: bool);
}

/// Raw mouse receiver, used when no view offers anything better.
pub trait MouseSink {
    /// Button pressed.
    fn mouse_down(&self, event: &MouseEvent);
    /// Button released.
    fn mouse_up(&self, event: &MouseEvent);
}

/// Gesture receiver for views that handle gestures directly.
pub trait GestureSink {
    /// Handle a gesture. Returns `true` if it was used.
    fn on_gesture(&self, event: &GestureEvent) -> bool;
}

fn focused_position(event: &TouchEvent) -> Point {
    event
        .focused_touch()
        .or_else(|| event.touches.first())
        .map_or(Point::ZERO, |t| t.position)
}

fn mouse_requests(horizontal: Priority, vertical: Priority) -> SmallVec<[GestureRequest; 4]> {
    smallvec![
        GestureRequest::new(GestureType::SingleTap).priority(horizontal),
        GestureRequest::new(GestureType::LongPress).priority(horizontal),
        GestureRequest::new(GestureType::Swipe)
            .horizontal()
            .priority(horizontal),
        GestureRequest::new(GestureType::Swipe)
            .vertical()
            .priority(vertical),
    ]
}

/// Drives a [`MouseHandler`] from touch input so mouse-only controls work under touch.
///
/// The control's preferred axes get [`Priority::HIGH`] for swipes in that direction, so a
/// horizontal slider inside a vertical scroller keeps horizontal drags.
pub struct MouseTouchHandler {
    inner: RefCell<Box<dyn MouseHandler>>,
    origin: Vec2,
    horizontal: Priority,
    vertical: Priority,
}

impl MouseTouchHandler {
    /// Wrap `handler`. `origin` is the view's top-left in window coordinates.
    pub fn new(handler: Box<dyn MouseHandler>, origin: Point, axes: Constraints) -> Self {
        let level = |axis| {
            if axes.contains(axis) {
                Priority::HIGH
            } else {
                Priority::NORMAL
            }
        };
        Self {
            inner: RefCell::new(handler),
            origin: origin.to_vec2(),
            horizontal: level(Constraints::HORIZONTAL),
            vertical: level(Constraints::VERTICAL),
        }
    }

    fn mouse_event(&self, kind: MouseEventKind, event: &TouchEvent) -> MouseEvent {
        MouseEvent::new(kind, focused_position(event) - self.origin, event.keys, event.time)
    }
}

impl fmt::Debug for MouseTouchHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MouseTouchHandler")
            .field("origin", &self.origin)
            .field("horizontal", &self.horizontal)
            .field("vertical", &self.vertical)
            .finish_non_exhaustive()
    }
}

impl TouchHandler for MouseTouchHandler {
    fn trigger(&self, event: &TouchEvent) -> bool {
        let mouse = self.mouse_event(MouseEventKind::Move, event);
        self.inner.borrow_mut().on_move(&mouse)
    }

    fn finish(&self, event: &TouchEvent, canceled: bool) {
        let mouse = self.mouse_event(MouseEventKind::Up, event);
        self.inner.borrow_mut().on_release(&mouse, canceled);
    }

    // Motion already reaches the mouse handler through `trigger`.
    fn on_gesture(&self, _event: &GestureEvent) -> bool {
        true
    }

    fn required_gestures(&self) -> SmallVec<[GestureRequest; 4]> {
        mouse_requests(self.horizontal, self.vertical)
    }
}

/// Last-resort handler for the root view: plain mouse down and up.
pub struct RootTouchHandler {
    sink: Rc<dyn MouseSink>,
    origin: Vec2,
}

impl RootTouchHandler {
    /// Forward to `sink`. `origin` is the root's top-left in window coordinates.
    pub fn new(sink: Rc<dyn MouseSink>, origin: Point) -> Self {
        Self {
            sink,
            origin: origin.to_vec2(),
        }
    }
}

impl fmt::Debug for RootTouchHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootTouchHandler")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl TouchHandler for RootTouchHandler {
    fn begin(&self, event: &TouchEvent) {
        let mouse = MouseEvent::new(
            MouseEventKind::Down,
            focused_position(event) - self.origin,
            event.keys,
            event.time,
        );
        self.sink.mouse_down(&mouse);
    }

    fn finish(&self, event: &TouchEvent, _canceled: bool) {
        let mouse = MouseEvent::new(
            MouseEventKind::Up,
            focused_position(event) - self.origin,
            event.keys,
            event.time,
        );
        self.sink.mouse_up(&mouse);
    }
}

/// The low-priority double-tap candidate added for controls that reset on double tap.
///
/// Never takes focus.
pub struct DoubleTapHandler {
    sink: Rc<dyn GestureSink>,
}

impl DoubleTapHandler {
    /// Forward recognized double taps to `sink`.
    pub fn new(sink: Rc<dyn GestureSink>) -> Self {
        Self { sink }
    }
}

impl fmt::Debug for DoubleTapHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoubleTapHandler").finish_non_exhaustive()
    }
}

impl TouchHandler for DoubleTapHandler {
    fn on_gesture(&self, event: &GestureEvent) -> bool {
        self.sink.on_gesture(event)
    }

    fn required_gestures(&self) -> SmallVec<[GestureRequest; 4]> {
        smallvec![GestureRequest::new(GestureType::DoubleTap).priority(Priority::LOW)]
    }

    fn takes_focus(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use understory_gesture::{GestureState, KeyState, TouchId};

    use crate::event::{TouchInfo, TouchPhase};

    struct Recorder(Rc<RefCell<Vec<MouseEvent>>>);

    impl MouseHandler for Recorder {
        fn on_move(&mut self, event: &MouseEvent) -> bool {
            self.0.borrow_mut().push(*event);
            true
        }

        fn on_release(&mut self, event: &MouseEvent, _canceled: bool) {
            self.0.borrow_mut().push(*event);
        }
    }

    #[test]
    fn handler_refs_compare_by_identity() {
        let a = HandlerRef::new(Rc::new(DoubleTapHandler::new(Rc::new(Nop))));
        let b = HandlerRef::new(Rc::new(DoubleTapHandler::new(Rc::new(Nop))));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    struct Nop;

    impl GestureSink for Nop {
        fn on_gesture(&self, _event: &GestureEvent) -> bool {
            false
        }
    }

    #[test]
    fn mouse_adapter_translates_into_view_space() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let h = MouseTouchHandler::new(
            Box::new(Recorder(log.clone())),
            Point::new(100.0, 50.0),
            Constraints::HORIZONTAL,
        );
        let touch = TouchInfo::new(TouchId(1), Point::new(130.0, 70.0), 16, TouchPhase::Move);
        let move_event = TouchEvent::batch(TouchPhase::Move, [touch]).for_touch(TouchId(1), TouchPhase::Move);
        assert!(h.trigger(&move_event));
        h.finish(&move_event.for_touch(TouchId(1), TouchPhase::End), false);

        let log = log.borrow();
        assert_eq!(log[0].kind, MouseEventKind::Move);
        assert_eq!(log[0].position, Point::new(30.0, 20.0));
        assert!(log[0].keys.contains(KeyState::LBUTTON));
        assert_eq!(log[1].kind, MouseEventKind::Up);
    }

    #[test]
    fn mouse_adapter_prefers_its_axis() {
        let h = MouseTouchHandler::new(
            Box::new(Recorder(Rc::new(RefCell::new(Vec::new())))),
            Point::ZERO,
            Constraints::VERTICAL,
        );
        let reqs = h.required_gestures();
        let vertical = reqs
            .iter()
            .find(|r| r.constraints == Constraints::VERTICAL)
            .map(|r| r.priority);
        let tap = reqs
            .iter()
            .find(|r| r.kind == GestureType::SingleTap)
            .map(|r| r.priority);
        assert_eq!(vertical, Some(Priority::HIGH));
        assert_eq!(tap, Some(Priority::NORMAL));
    }

    #[test]
    fn double_tap_handler_forwards() {
        struct Count(RefCell<u32>);
        impl GestureSink for Count {
            fn on_gesture(&self, _event: &GestureEvent) -> bool {
                *self.0.borrow_mut() += 1;
                true
            }
        }
        let sink = Rc::new(Count(RefCell::new(0)));
        let h = DoubleTapHandler::new(sink.clone());
        assert!(!h.takes_focus());
        let e = GestureEvent::new(GestureType::DoubleTap, GestureState::Begin, Point::ZERO);
        assert!(h.on_gesture(&e));
        assert_eq!(*sink.0.borrow(), 1);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-contact bookkeeping.

use kurbo::Point;
use smallvec::SmallVec;
use understory_gesture::{KeyState, TouchId};

use crate::event::TouchEvent;
use crate::handler::HandlerRef;

bitflags::bitflags! {
    /// State bits of a [`TouchItem`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// A wrapped mouse handler is among the candidates; no second one is created.
        const MOUSE_CANDIDATE       = 0b0000_0001;
        /// The contact touches the surface (as opposed to hovering).
        const CONTACT               = 0b0000_0010;
        /// The contact will not open a long-press context menu.
        const SUPPRESS_CONTEXT_MENU = 0b0000_0100;
        /// The contact is ignored from now on.
        const DISCARDED             = 0b0000_1000;
    }
}

/// A handler offered for a contact that has not been accepted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchCandidate<V> {
    /// View offering the handler.
    pub view: V,
    /// The handler.
    pub handler: HandlerRef,
}

/// State of one live contact.
///
/// Either [`handler`](Self::handler) is set, or [`candidates`](Self::candidates) lists the
/// handlers still competing for it; never both.
#[derive(Clone, Debug)]
pub struct TouchItem<V> {
    pub(crate) id: TouchId,
    pub(crate) position: Point,
    pub(crate) view: Option<V>,
    pub(crate) handler: Option<HandlerRef>,
    pub(crate) candidates: SmallVec<[TouchCandidate<V>; 2]>,
    pub(crate) first_event: TouchEvent,
    pub(crate) last_event_time: Option<u64>,
    pub(crate) last_keys: KeyState,
    pub(crate) flags: ItemFlags,
}

impl<V: Copy + PartialEq> TouchItem<V> {
    pub(crate) fn new(id: TouchId, position: Point, first_event: TouchEvent) -> Self {
        Self {
            id,
            position,
            view: None,
            handler: None,
            candidates: SmallVec::new(),
            first_event,
            last_event_time: None,
            last_keys: KeyState::empty(),
            flags: ItemFlags::empty(),
        }
    }

    /// Contact id.
    pub fn id(&self) -> TouchId {
        self.id
    }

    /// Last known window position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// View of the accepted handler.
    pub fn view(&self) -> Option<V> {
        self.view
    }

    /// Accepted handler.
    pub fn handler(&self) -> Option<&HandlerRef> {
        self.handler.as_ref()
    }

    /// Handlers still competing for the contact.
    pub fn candidates(&self) -> &[TouchCandidate<V>] {
        &self.candidates
    }

    /// The event that started physical contact (or the hover).
    pub fn first_event(&self) -> &TouchEvent {
        &self.first_event
    }

    /// State bits.
    pub fn flags(&self) -> ItemFlags {
        self.flags
    }

    /// Returns `true` while the contact touches the surface.
    pub fn has_contact(&self) -> bool {
        self.flags.contains(ItemFlags::CONTACT)
    }

    /// Returns `true` once the contact is ignored.
    pub fn is_discarded(&self) -> bool {
        self.flags.contains(ItemFlags::DISCARDED)
    }

    /// Returns `true` if the contact will not open a context menu.
    pub fn suppresses_context_menu(&self) -> bool {
        self.flags.contains(ItemFlags::SUPPRESS_CONTEXT_MENU)
    }

    pub(crate) fn set_flag(&mut self, flag: ItemFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Register a candidate. A handler is only listed once.
    pub(crate) fn add_candidate(&mut self, view: V, handler: HandlerRef) {
        if !self.candidates.iter().any(|c| c.handler == handler) {
            self.candidates.push(TouchCandidate { view, handler });
        }
    }

    pub(crate) fn remove_candidate(&mut self, handler: &HandlerRef) {
        self.candidates.retain(|c| c.handler != *handler);
    }

    pub(crate) fn candidate_view(&self, handler: &HandlerRef) -> Option<V> {
        self.candidates
            .iter()
            .find(|c| c.handler == *handler)
            .map(|c| c.view)
    }

    /// Make `handler` the accepted one. Returns `false` if it was not a candidate.
    pub(crate) fn accept_candidate(&mut self, handler: &HandlerRef) -> bool {
        let Some(view) = self.candidate_view(handler) else {
            return false;
        };
        self.handler = Some(handler.clone());
        self.view = Some(view);
        self.candidates.clear();
        true
    }

    /// Forget the handler, the candidates, and the view.
    pub(crate) fn reset(&mut self) {
        self.candidates.clear();
        self.flags.remove(ItemFlags::MOUSE_CANDIDATE);
        self.view = None;
        self.handler = None;
    }

    /// Largest per-axis distance between `position` and where the contact started.
    pub fn distance_from_first(&self, position: Point) -> f64 {
        let start = self
            .first_event
            .touch(self.id)
            .map_or(self.position, |t| t.position);
        let d = position - start;
        d.x.max(-d.x).max(d.y.max(-d.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;

    use crate::event::{TouchInfo, TouchPhase};
    use crate::handler::{GestureSink, DoubleTapHandler};
    use understory_gesture::GestureEvent;

    struct Nop;

    impl GestureSink for Nop {
        fn on_gesture(&self, _event: &GestureEvent) -> bool {
            false
        }
    }

    fn handler() -> HandlerRef {
        HandlerRef::new(Rc::new(DoubleTapHandler::new(Rc::new(Nop))))
    }

    fn item() -> TouchItem<u32> {
        let info = TouchInfo::new(TouchId(1), Point::new(10.0, 10.0), 0, TouchPhase::Begin);
        TouchItem::new(TouchId(1), info.position, TouchEvent::batch(TouchPhase::Begin, [info]))
    }

    #[test]
    fn accepting_clears_candidates() {
        let (a, b) = (handler(), handler());
        let mut item = item();
        item.add_candidate(1, a.clone());
        item.add_candidate(2, b.clone());
        item.add_candidate(3, a.clone());
        assert_eq!(item.candidates().len(), 2, "duplicates are ignored");

        assert!(item.accept_candidate(&b));
        assert_eq!(item.view(), Some(2));
        assert!(item.candidates().is_empty());
        assert!(!item.accept_candidate(&a), "a is no longer a candidate");
        assert_eq!(item.handler(), Some(&b));
    }

    #[test]
    fn reset_forgets_everything_but_contact() {
        let mut item = item();
        item.add_candidate(1, handler());
        item.set_flag(ItemFlags::MOUSE_CANDIDATE | ItemFlags::CONTACT, true);
        item.reset();
        assert!(item.candidates().is_empty());
        assert_eq!(item.flags(), ItemFlags::CONTACT);
    }

    #[test]
    fn distance_is_per_axis_maximum() {
        let item = item();
        assert_eq!(item.distance_from_first(Point::new(13.0, 6.0)), 4.0);
        assert_eq!(item.distance_from_first(Point::new(10.0, 10.0)), 0.0);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-gesture aggregate state.

use kurbo::Vec2;
use smallvec::SmallVec;
use understory_gesture::{CandidateSet, GestureEvent, GestureState, GestureType, TouchId};

use crate::handler::HandlerRef;
use crate::item::TouchItem;

/// Identifier of a gesture within one [`TouchInputState`](crate::TouchInputState).
///
/// Ids are never reused, so a stale id simply fails to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GestureId(pub(crate) u32);

/// Touch ids of one gesture.
pub type TouchIds = SmallVec<[TouchId; 4]>;

/// One gesture kind being resolved over a set of contacts.
#[derive(Debug)]
pub struct Gesture<V> {
    pub(crate) id: GestureId,
    pub(crate) kind: GestureType,
    pub(crate) touches: TouchIds,
    pub(crate) candidates: CandidateSet<HandlerRef, V>,
    pub(crate) handler: Option<HandlerRef>,
    pub(crate) last_event: Option<GestureEvent>,
    pub(crate) done: bool,
    pub(crate) shadow: bool,
    pub(crate) exclusive_touch: bool,
    pub(crate) delegate: Option<GestureId>,
    pub(crate) shadow_touches: TouchIds,
    pub(crate) offset: Vec2,
    pub(crate) retained: Option<TouchItem<V>>,
    pub(crate) multi_touch: bool,
}

impl<V: Copy + PartialEq> Gesture<V> {
    pub(crate) fn new(id: GestureId, kind: GestureType) -> Self {
        Self {
            id,
            kind,
            touches: SmallVec::new(),
            candidates: CandidateSet::new(),
            handler: None,
            last_event: None,
            done: false,
            shadow: false,
            exclusive_touch: false,
            delegate: None,
            shadow_touches: SmallVec::new(),
            offset: Vec2::ZERO,
            retained: None,
            multi_touch: false,
        }
    }

    /// Gesture id.
    pub fn id(&self) -> GestureId {
        self.id
    }

    /// Gesture kind.
    pub fn kind(&self) -> GestureType {
        self.kind
    }

    /// Participating contacts.
    pub fn touches(&self) -> &[TouchId] {
        &self.touches
    }

    /// Handlers competing for the gesture.
    pub fn candidates(&self) -> &CandidateSet<HandlerRef, V> {
        &self.candidates
    }

    /// Winning handler, once recognized.
    pub fn handler(&self) -> Option<&HandlerRef> {
        self.handler.as_ref()
    }

    /// Last event delivered to the handler.
    pub fn last_event(&self) -> Option<&GestureEvent> {
        self.last_event.as_ref()
    }

    /// State of the last delivered event.
    pub fn last_state(&self) -> Option<GestureState> {
        self.last_event.map(|e| e.state)
    }

    /// Returns `true` once the gesture ignores further events.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns `true` while the gesture only listens in the background.
    pub fn is_shadow(&self) -> bool {
        self.shadow
    }

    /// Returns `true` if the gesture owns its contacts exclusively.
    pub fn is_exclusive_touch(&self) -> bool {
        self.exclusive_touch
    }

    /// Gesture this one forwards its events to.
    pub fn delegate(&self) -> Option<GestureId> {
        self.delegate
    }

    /// Returns `true` if the gesture is kept alive for a released tap.
    pub fn retains_touch(&self) -> bool {
        self.retained.is_some()
    }

    pub(crate) fn contains(&self, id: TouchId) -> bool {
        self.touches.contains(&id)
    }

    pub(crate) fn add_touch(&mut self, id: TouchId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.touches.push(id);
        if self.touches.len() > 1 {
            self.multi_touch = true;
        }
        true
    }

    pub(crate) fn remove_touch(&mut self, id: TouchId) -> bool {
        let before = self.touches.len();
        self.touches.retain(|t| *t != id);
        self.touches.len() != before
    }

    pub(crate) fn shares_touch(&self, touches: &[TouchId]) -> bool {
        self.touches.iter().any(|t| touches.contains(t))
    }

    /// Zoom and rotate keep collecting contacts until they have two.
    pub fn needs_more_touches(&self) -> bool {
        !self.done && self.kind.is_multi_touch() && self.touches.len() < 2
    }

    /// A double tap that may still see its second press.
    pub fn awaits_second_tap(&self) -> bool {
        self.kind == GestureType::DoubleTap
            && !self.done
            && self.last_state().is_none_or(|s| s < GestureState::End)
    }

    /// Returns `true` if nothing keeps the gesture alive.
    pub fn can_remove(&self) -> bool {
        self.touches.is_empty() && !self.awaits_second_tap()
    }

    /// Pick the handler for the first relevant event, unless one is already set.
    pub(crate) fn check_candidates(&mut self, event: &GestureEvent) {
        if self.handler.is_none() {
            self.handler = self
                .candidates
                .select(event.amount_x, event.amount_y)
                .map(|c| c.handler.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn double_tap_is_kept_until_resolved() {
        let mut g: Gesture<u32> = Gesture::new(GestureId(0), GestureType::DoubleTap);
        g.add_touch(TouchId(1));
        g.remove_touch(TouchId(1));
        assert!(g.awaits_second_tap());
        assert!(!g.can_remove());
        g.last_event = Some(GestureEvent::new(
            GestureType::DoubleTap,
            GestureState::End,
            Point::ZERO,
        ));
        assert!(g.can_remove());
    }

    #[test]
    fn multi_touch_history_sticks() {
        let mut g: Gesture<u32> = Gesture::new(GestureId(0), GestureType::Zoom);
        assert!(g.needs_more_touches());
        g.add_touch(TouchId(1));
        assert!(!g.add_touch(TouchId(1)));
        g.add_touch(TouchId(2));
        assert!(!g.needs_more_touches());
        g.remove_touch(TouchId(2));
        assert!(g.multi_touch);
        assert!(g.shares_touch(&[TouchId(3), TouchId(1)]));
    }
}

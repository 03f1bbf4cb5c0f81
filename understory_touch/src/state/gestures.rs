// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture dispatch and handler resolution.

use core::fmt::Debug;

use kurbo::Vec2;
use smallvec::SmallVec;
use understory_gesture::{GestureEvent, GestureState, GestureType, KeyState, TouchId};

use super::TouchInputState;
use super::touches::accept_handler;
use crate::event::{TouchEvent, TouchEventData, TouchInfo, TouchPhase};
use crate::gesture::GestureId;
use crate::handler::HandlerRef;
use crate::host::{DragStep, ForeignEvent, TouchHost};
use crate::item::ItemFlags;

impl<V: Copy + Eq + Debug> TouchInputState<V> {
    /// Deliver a gesture transition.
    ///
    /// Gesture managers report through this. `Begin` settles which handler owns the
    /// gesture's contacts; every event then goes to that handler unless a drag session or a
    /// delegate gesture takes it first. Events for unknown or finished gestures are ignored,
    /// as are repeated identical `Changed` events.
    pub fn on_gesture<H>(&mut self, host: &mut H, id: GestureId, mut event: GestureEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if event.time == 0 {
            event.time = self.clock;
        }
        let Some(g) = self.gesture(id) else {
            return;
        };
        if g.kind == GestureType::Zoom {
            event.position += g.offset;
        }
        if event.state == GestureState::Changed
            && g.last_event.is_some_and(|last| event.is_same_as(&last))
        {
            return;
        }
        if g.done {
            return;
        }
        // Shadow gestures only listen for their own begin.
        if g.shadow && event.state != GestureState::Begin {
            return;
        }

        tracing::trace!(
            target: "understory_touch::state",
            ?id,
            kind = ?event.kind,
            state = ?event.state,
            "gesture"
        );
        let outer = core::mem::replace(&mut self.in_gesture_event, true);
        self.dispatch_gesture(host, id, event);
        self.in_gesture_event = outer;
    }

    fn dispatch_gesture<H>(&mut self, host: &mut H, id: GestureId, mut event: GestureEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if self.try_drag_gesture(host, &event) {
            return;
        }
        if self.try_delegate_gesture(host, id, &event) {
            return;
        }

        match event.state {
            GestureState::Begin => event = self.begin_gesture(host, id, event),
            GestureState::Failed => self.give_up_gesture(id),
            _ => {}
        }

        if let Some((handler, view)) = self.handler_for_gesture(id) {
            match view {
                Some(view) if !host.is_attached(view) => {
                    tracing::debug!(target: "understory_touch::state", ?view, "gesture for detached view");
                    self.discard_touches_for_view(host, view, false);
                }
                _ => {
                    handler.on_gesture(&event);
                    if let Some(g) = self.gesture_mut(id) {
                        g.last_event = Some(event);
                    }
                    host.gesture_processed(&event, view);
                    if host.popup_swallows(ForeignEvent::Gesture(&event)) {
                        // The gesture closed a popup; nothing else may come of it.
                        let touches = self.gesture(id).map(|g| g.touches.clone()).unwrap_or_default();
                        for t in touches {
                            self.set_touch_discarded(t);
                        }
                    }
                }
            }
        }

        let released_tap = self
            .gesture(id)
            .is_some_and(|g| g.kind.is_tap() && g.touches.is_empty());
        if event.state != GestureState::Failed && released_tap {
            let done: SmallVec<[GestureId; 4]> = self
                .gestures
                .iter()
                .filter(|g| g.kind.is_tap() && g.touches.is_empty())
                .map(|g| g.id)
                .collect();
            for gid in done {
                self.remove_gesture(gid, false);
            }
        }
    }

    /// The handler to feed, and its view.
    ///
    /// Taps may be recognized after their contact is gone, so they fall back to the gesture's
    /// own handler.
    fn handler_for_gesture(&self, id: GestureId) -> Option<(HandlerRef, Option<V>)> {
        let g = self.gesture(id)?;
        let from_items = g.touches.iter().find_map(|t| {
            let item = self.touch(*t)?;
            item.handler.clone().map(|h| (h, item.view))
        });
        if from_items.is_some() {
            return from_items;
        }
        if g.kind.is_tap() {
            return g.handler.clone().map(|h| (h, None));
        }
        None
    }

    /// Recognition failed: the gesture's handler stops competing for unclaimed contacts.
    fn give_up_gesture(&mut self, id: GestureId) {
        let Some(g) = self.gesture(id) else {
            return;
        };
        let Some(handler) = g
            .handler
            .clone()
            .or_else(|| g.candidates.single_handler().cloned())
        else {
            return;
        };
        let touches = g.touches.clone();
        for t in touches {
            if let Some(item) = self.item_mut(t) {
                if item.handler.is_none() {
                    tracing::trace!(target: "understory_touch::state", ?id, touch = ?t, "give up touch handler");
                    item.remove_candidate(&handler);
                }
            }
        }
    }

    /// Settle a beginning gesture. Returns the event with any pending zoom offset folded in.
    fn begin_gesture<H>(&mut self, host: &mut H, id: GestureId, mut event: GestureEvent) -> GestureEvent
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let alternative_view = self.switch_shadow_swipe_handler(id);

        let kind = match self.gesture_mut(id) {
            Some(g) => {
                g.check_candidates(&event);
                g.shadow = false;
                g.kind
            }
            None => return event,
        };

        // The anticipated delegate showed up on its own.
        if self.delegating.is_none() {
            let delegator = self
                .gestures
                .iter()
                .find(|g| g.delegate == Some(id))
                .map(|g| g.id);
            if let Some(delegator) = delegator {
                self.remove_gesture(delegator, true);
            }
        }

        let Some(handler) = self.gesture(id).and_then(|g| g.handler.clone()) else {
            return event;
        };
        tracing::trace!(target: "understory_touch::state", ?id, ?kind, "gesture begins");

        // The contacts are gone; begin and finish on the tap that was kept around.
        if self.gesture(id).is_some_and(|g| g.touches.is_empty()) {
            let retained = self.gesture_mut(id).and_then(|g| g.retained.take());
            if let Some(mut item) = retained {
                if item.handler.is_none() && accept_handler(host, &mut item, &handler) {
                    let end = item.first_event.for_touch(item.id, TouchPhase::End);
                    handler.finish(&end, false);
                }
            }
        }

        let mut superseded: SmallVec<[GestureId; 2]> = SmallVec::new();
        let touches = self.gesture(id).map(|g| g.touches.clone()).unwrap_or_default();
        for t in touches {
            let Some(item) = self.touch(t) else {
                continue;
            };
            if item.handler.as_ref() == Some(&handler) {
                continue;
            }
            if let Some(old) = item.handler.clone() {
                let info = TouchInfo::new(t, item.position, self.clock, TouchPhase::End);
                let data = TouchEventData {
                    device: item.first_event.device,
                    ..TouchEventData::new(TouchPhase::End)
                };
                old.finish(&TouchEvent::single(info, &data), false);

                let other = self
                    .gestures
                    .iter()
                    .find(|o| o.handler.as_ref() == Some(&old) && o.kind != kind)
                    .map(|o| o.id);
                if let Some(other) = other {
                    if !superseded.contains(&other) {
                        superseded.push(other);
                    }
                }
                if let Some(g) = self.gesture_mut(id) {
                    event.position += g.offset;
                    g.offset = Vec2::ZERO;
                }
            }

            // Accepting an earlier gesture may have cleared the candidates, and a joined
            // double tap registered its handler for an earlier contact.
            let view_for = self
                .gesture(id)
                .and_then(|g| g.candidates.view_for(&handler))
                .or(alternative_view);
            let Some(item) = self.item_mut(t) else {
                continue;
            };
            if let Some(view) = view_for {
                item.add_candidate(view, handler.clone());
            }
            item.handler = None;
            if !accept_handler(host, item, &handler) {
                continue;
            }
            let view = item.view;
            if let Some(view) = view {
                self.adopt_pending_touches(host, id, t, view, &handler);
            }
        }

        for other in superseded {
            if let Some(g) = self.gesture(other) {
                if let Some(h) = &g.handler {
                    let last = g
                        .last_event
                        .unwrap_or_else(|| GestureEvent::new(g.kind, GestureState::Possible, event.position));
                    h.on_gesture(&last.with_state(GestureState::Failed));
                }
            }
        }

        let competing = match kind {
            GestureType::Swipe => Some(GestureType::Zoom),
            GestureType::Zoom => Some(GestureType::Swipe),
            _ => None,
        };
        if let Some(shadow_kind) = competing {
            if handler.allows_competing_gesture(shadow_kind) {
                self.mark_shadow(id, shadow_kind);
            }
        }

        // The first tap of a recognized double tap never becomes a single tap.
        if kind == GestureType::DoubleTap {
            let taps: SmallVec<[GestureId; 2]> = self
                .gestures
                .iter()
                .filter(|o| o.kind == GestureType::SingleTap && o.touches.is_empty())
                .map(|o| o.id)
                .collect();
            for tap in taps {
                self.remove_gesture(tap, false);
            }
        }

        let touches = self.gesture(id).map(|g| g.touches.clone()).unwrap_or_default();
        let rivals: SmallVec<[GestureId; 4]> = self
            .gestures
            .iter()
            .filter(|o| {
                o.id != id
                    && !o.shadow
                    && Some(o.id) != self.delegating
                    && o.shares_touch(&touches)
            })
            .map(|o| o.id)
            .collect();
        for rival in rivals {
            self.remove_gesture(rival, true);
        }

        if self.gesture(id).is_some_and(|g| g.multi_touch) {
            for t in &touches {
                if let Some(item) = self.item_mut(*t) {
                    item.set_flag(ItemFlags::SUPPRESS_CONTEXT_MENU, true);
                }
            }
        }
        event
    }

    /// A shadow swipe whose handler already runs another gesture over the same contacts
    /// falls back to the handler it displaced. Returns the view of that handler.
    fn switch_shadow_swipe_handler(&mut self, id: GestureId) -> Option<V> {
        let g = self.gesture(id)?;
        if !g.shadow || g.kind != GestureType::Swipe {
            return None;
        }
        let handler = g
            .handler
            .clone()
            .or_else(|| g.candidates.single_handler().cloned())?;
        let busy = self.gestures.iter().any(|o| {
            o.id != id
                && o.handler.as_ref() == Some(&handler)
                && o.last_state().is_none_or(|s| s < GestureState::End)
                && o.shares_touch(&g.shadow_touches)
        });
        if !busy {
            return None;
        }
        let g = self.gesture_mut(id)?;
        let (alternative, view) = g.candidates.take_alternative()?;
        tracing::trace!(target: "understory_touch::state", ?id, ?view, "shadow swipe uses alternative handler");
        g.handler = Some(alternative);
        Some(view)
    }

    /// Hand other unclaimed contacts on `view` to `handler` if it takes them.
    fn adopt_pending_touches<H>(
        &mut self,
        host: &mut H,
        id: GestureId,
        owner: TouchId,
        view: V,
        handler: &HandlerRef,
    ) where
        H: TouchHost<View = V> + ?Sized,
    {
        let area = host.window_rect(view);
        let pending: SmallVec<[TouchId; 4]> = self
            .items
            .iter()
            .filter(|o| o.id != owner && o.handler.is_none() && area.contains(o.position))
            .map(|o| o.id)
            .collect();
        let mut adopted = false;
        for t in pending {
            let Some(other) = self.item_mut(t) else {
                continue;
            };
            if handler.add_touch(&other.first_event) {
                other.candidates.clear();
                other.handler = Some(handler.clone());
                other.view = Some(view);
                if let Some(g) = self.gesture_mut(id) {
                    g.add_touch(t);
                    adopted = true;
                }
            }
        }
        if adopted {
            self.sync_gesture_touches(id);
        }
    }

    /// Keep the competing gesture of `id` listening in the background.
    fn mark_shadow(&mut self, id: GestureId, shadow_kind: GestureType) {
        let Some(touches) = self.gesture(id).map(|g| g.touches.clone()) else {
            return;
        };
        let Some(first) = touches.first().copied() else {
            return;
        };
        let Some(other) = self.find_gesture(shadow_kind, first) else {
            return;
        };
        if let Some(g) = self.gesture_mut(other) {
            tracing::trace!(target: "understory_touch::state", gesture = ?other, kind = ?shadow_kind, "shadow gesture");
            g.shadow = true;
            g.shadow_touches = touches;
        }
    }

    /// Feed swipes and long presses to a running drag session instead of the handlers.
    pub(super) fn try_drag_gesture<H>(&mut self, host: &mut H, event: &GestureEvent) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if !matches!(event.kind, GestureType::LongPress | GestureType::Swipe) {
            return false;
        }
        let Some(drag) = host.active_drag() else {
            return false;
        };
        let keys = event.keys | KeyState::LBUTTON;
        let position = event.position;
        tracing::debug!(target: "understory_touch::state", state = ?event.state, "gesture drives drag session");
        match event.state {
            GestureState::Begin => host.drag_step(DragStep::Update, position, keys),
            GestureState::Changed => host.drag_step(DragStep::Over, position, keys),
            GestureState::End if drag.will_drop => {
                host.drag_step(DragStep::Drop, position, keys);
                host.drag_step(DragStep::Leave { canceled: false }, position, keys);
            }
            GestureState::End | GestureState::Failed => {
                host.drag_step(DragStep::Leave { canceled: true }, position, keys);
            }
            GestureState::Possible => {}
        }
        true
    }

    /// An exclusive swipe over contacts of a two-finger zoom is handled as that zoom.
    fn try_delegate_gesture<H>(&mut self, host: &mut H, id: GestureId, event: &GestureEvent) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let Some(g) = self.gesture(id) else {
            return false;
        };
        if !g.exclusive_touch || g.kind != GestureType::Swipe {
            return false;
        }

        if event.state == GestureState::Begin {
            let zoom = g
                .touches
                .first()
                .and_then(|first| self.find_gesture(GestureType::Zoom, *first))
                .filter(|zoom| self.gesture(*zoom).is_some_and(|z| z.touches.len() >= 2));
            if let Some(zoom) = zoom {
                tracing::trace!(target: "understory_touch::state", ?id, delegate = ?zoom, "delegate swipe to zoom");
                if let Some(g) = self.gesture_mut(id) {
                    g.delegate = Some(zoom);
                }
                if let Some(z) = self.gesture_mut(zoom) {
                    z.delegate = None;
                }
            }
        }

        let Some(delegate) = self.gesture(id).and_then(|g| g.delegate) else {
            return false;
        };
        if self
            .gesture(delegate)
            .is_none_or(|d| d.kind != GestureType::Zoom)
        {
            return false;
        }

        let mut zoom = *event;
        zoom.kind = GestureType::Zoom;
        zoom.amount_x = 1.0;
        zoom.amount_y = 1.0;
        let outer = self.delegating.replace(id);
        self.on_gesture(host, delegate, zoom);
        self.delegating = outer;
        true
    }
}

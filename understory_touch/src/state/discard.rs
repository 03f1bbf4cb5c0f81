// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Taking contacts away from their handlers.

use core::fmt::Debug;

use smallvec::SmallVec;
use understory_gesture::{GestureEvent, GestureState, GestureType, TouchId};

use super::TouchInputState;
use crate::deferred::DeferredCall;
use crate::event::{TouchEvent, TouchEventData, TouchInfo, TouchPhase};
use crate::host::TouchHost;
use crate::item::ItemFlags;

impl<V: Copy + Eq + Debug> TouchInputState<V> {
    /// Discard every contact that involves `view` or one of its descendants.
    ///
    /// Call this before a view leaves the window. A contact is involved if it lies in the
    /// view's window rectangle, if its accepted view is inside `view`, or if one of its
    /// candidates is. A drag session started from inside `view` is canceled.
    ///
    /// With `keep_items` the contacts are only marked discarded and stay tracked until the
    /// platform ends them. Calling this twice is harmless.
    pub fn discard_touches_for_view<H>(&mut self, host: &mut H, view: V, keep_items: bool)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if let Some(drag) = host.active_drag() {
            if drag.source.is_some_and(|source| host.is_within(view, source)) {
                let cancel = GestureEvent::new(GestureType::Swipe, GestureState::Failed, drag.position);
                self.try_drag_gesture(host, &cancel);
            }
        }

        let area = host.window_rect(view);
        let doomed: SmallVec<[TouchId; 4]> = self
            .items
            .iter()
            .filter(|item| {
                area.contains(item.position)
                    || item.view.is_some_and(|v| host.is_within(view, v))
                    || item.candidates.iter().any(|c| host.is_within(view, c.view))
            })
            .map(|item| item.id)
            .collect();
        for id in doomed {
            tracing::debug!(target: "understory_touch::state", ?id, ?view, keep_items, "discard touch for view");
            self.discard_touch_item(host, id, keep_items);
        }
    }

    /// Discard one contact.
    ///
    /// Its handler sees a canceled `finish`, unless `keep_item` is set, in which case the
    /// contact is only marked and ends normally later.
    pub fn discard_touch_item<H>(&mut self, host: &mut H, id: TouchId, keep_item: bool)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        self.set_touch_discarded(id);
        if keep_item {
            return;
        }
        let Some(item) = self.touch(id) else {
            return;
        };
        let info = TouchInfo::new(id, item.position, self.clock, TouchPhase::Leave);
        let data = TouchEventData {
            device: item.first_event.device,
            ..TouchEventData::new(TouchPhase::Leave)
        };
        if let Err(err) = self.process_touch_leave(host, info, &data) {
            tracing::debug!(target: "understory_touch::state", ?id, %err, "discarded touch already gone");
        }
    }

    /// Discard every tracked contact.
    ///
    /// With `deferred` the removal runs on the next
    /// [`run_deferred`](Self::run_deferred); the contacts are marked right away.
    pub fn discard_touches<H>(&mut self, host: &mut H, deferred: bool, keep_items: bool)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        for item in &mut self.items {
            item.set_flag(ItemFlags::DISCARDED, true);
        }
        let ids = self.touch_ids();
        for id in &ids {
            self.mark_gestures_done(*id);
        }
        if keep_items {
            return;
        }
        if deferred {
            self.post(DeferredCall::DiscardTouches, 0);
            return;
        }
        tracing::debug!(target: "understory_touch::state", count = ids.len(), "discard all touches");
        for id in ids {
            self.discard_touch_item(host, id, false);
        }
    }

    /// Discard the contacts of a platform cancel.
    pub fn discard_touches_for_event<H>(&mut self, host: &mut H, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        for touch in &event.touches {
            if self.has_touch(touch.id) {
                self.discard_touch_item(host, touch.id, false);
            }
        }
    }

    /// Drop hovering pointers; a new physical contact replaces them.
    pub(super) fn discard_hover_touches<H>(&mut self, host: &mut H)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let hovering: SmallVec<[TouchId; 2]> = self
            .items
            .iter()
            .filter(|item| !item.has_contact())
            .map(|item| item.id)
            .collect();
        for id in hovering {
            self.discard_touch_item(host, id, false);
        }
    }

    /// Mark a contact ignored, and every gesture it is part of finished.
    pub(super) fn set_touch_discarded(&mut self, id: TouchId) {
        if let Some(item) = self.item_mut(id) {
            item.set_flag(ItemFlags::DISCARDED, true);
        }
        self.mark_gestures_done(id);
    }

    fn mark_gestures_done(&mut self, id: TouchId) {
        for g in self.gestures.iter_mut().filter(|g| g.contains(id)) {
            g.done = true;
        }
    }
}

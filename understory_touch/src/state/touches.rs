// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contact intake, hit testing, and handler negotiation.

use alloc::rc::Rc;
use core::fmt::Debug;

use kurbo::Point;
use smallvec::SmallVec;
use understory_gesture::{GestureEvent, GestureState, GestureType, KeyState, RequestFlags, TouchId};

use super::TouchInputState;
use crate::config::{
    CONTEXT_MENU_DELAY_MS, CONTEXT_MENU_MAX_DISTANCE, EDGE_BAND, MOVE_RATE_LIMIT_MS,
};
use crate::deferred::DeferredCall;
use crate::error::TouchError;
use crate::event::{
    InputDevice, MouseEvent, MouseEventKind, TouchEvent, TouchEventData, TouchInfo, TouchPhase,
};
use crate::gesture::GestureId;
use crate::handler::{DoubleTapHandler, HandlerRef, MouseTouchHandler, RootTouchHandler};
use crate::host::{ForeignEvent, PopupKind, TouchHost};
use crate::item::{ItemFlags, TouchCandidate, TouchItem};

impl<V: Copy + Eq + Debug> TouchInputState<V> {
    /// Process a snapshot of every active contact.
    ///
    /// Tracked contacts missing from the snapshot, or reported with an ending phase, are
    /// ended and removed before any new contact of the same snapshot is added. While a drag
    /// session runs only the first contact is looked at.
    ///
    /// A [`TouchPhase::Cancel`] snapshot discards its contacts; a [`TouchPhase::End`] snapshot
    /// ends every tracked contact.
    pub fn process_touches<H>(&mut self, host: &mut H, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        self.advance_clock(event.time);
        match event.phase {
            TouchPhase::Cancel => {
                self.discard_touches_for_event(host, event);
                return;
            }
            TouchPhase::End => {
                for id in self.touch_ids() {
                    if self.has_touch(id) {
                        self.touch_ended(host, id, &event.for_touch(id, TouchPhase::End));
                        self.remove_item(id);
                    }
                }
                return;
            }
            _ => {}
        }

        // A modal loop of another window owns the contacts it shows; keep ours alive.
        if host.other_popup().is_none() {
            for id in self.touch_ids() {
                if !self.has_touch(id) {
                    continue;
                }
                let phase = match event.touch(id) {
                    None => TouchPhase::End,
                    Some(t) if t.phase.is_ending() => t.phase,
                    Some(_) => continue,
                };
                self.touch_ended(host, id, &event.for_touch(id, phase));
                self.remove_item(id);
            }
        }

        for (i, touch) in event.touches.iter().enumerate() {
            if i == 1 && host.active_drag().is_some() {
                break;
            }
            self.dispatch_touch(host, *touch, event.for_touch(touch.id, touch.phase));
        }
    }

    /// Process one contact, for platforms that report contacts individually.
    pub fn process_touch<H>(&mut self, host: &mut H, touch: TouchInfo, data: &TouchEventData)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        self.advance_clock(touch.time);
        self.dispatch_touch(host, touch, TouchEvent::single(touch, data));
    }

    /// End one contact.
    ///
    /// Returns [`TouchError::UnknownTouch`] without side effects if `touch.id` is not tracked.
    pub fn process_touch_end<H>(
        &mut self,
        host: &mut H,
        touch: TouchInfo,
        data: &TouchEventData,
    ) -> Result<(), TouchError>
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let Some(item) = self.item_mut(touch.id) else {
            tracing::warn!(target: "understory_touch::state", id = ?touch.id, "end for unknown touch");
            return Err(TouchError::UnknownTouch(touch.id));
        };
        item.position = touch.position;
        self.advance_clock(touch.time);
        self.touch_ended(host, touch.id, &TouchEvent::single(touch, data));
        self.remove_item(touch.id);
        Ok(())
    }

    /// A hovering contact went out of range.
    ///
    /// If the contact still touches the surface it is ended first, so handlers always see the
    /// end before the leave.
    pub fn process_touch_leave<H>(
        &mut self,
        host: &mut H,
        touch: TouchInfo,
        data: &TouchEventData,
    ) -> Result<(), TouchError>
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let Some(item) = self.item_mut(touch.id) else {
            tracing::warn!(target: "understory_touch::state", id = ?touch.id, "leave for unknown touch");
            return Err(TouchError::UnknownTouch(touch.id));
        };
        item.position = touch.position;
        if item.has_contact() {
            let touch = TouchInfo {
                phase: TouchPhase::End,
                ..touch
            };
            let data = TouchEventData {
                phase: TouchPhase::End,
                ..*data
            };
            return self.process_touch_end(host, touch, &data);
        }
        self.advance_clock(touch.time);
        self.trigger_hover_candidates(touch.id, &TouchEvent::single(touch, data));
        self.remove_item(touch.id);
        Ok(())
    }

    fn dispatch_touch<H>(&mut self, host: &mut H, touch: TouchInfo, mut event: TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if let Some(item) = self.touch(touch.id) {
            if item.is_discarded() {
                return;
            }
            let contact = item.has_contact();
            self.check_pen_buttons(host, touch.id, &event, false);
            if event.phase == TouchPhase::Begin && !contact {
                self.touch_began(host, touch, &event);
            } else {
                self.touch_changed(host, touch, &event);
            }
        } else if !event.phase.is_ending() {
            // A new contact starts with a press or an enter.
            event.phase = if event.phase.is_hover() {
                TouchPhase::Enter
            } else {
                TouchPhase::Begin
            };
            tracing::trace!(
                target: "understory_touch::state",
                id = ?touch.id,
                phase = ?event.phase,
                existing = self.items.len(),
                "add touch item"
            );
            self.items
                .push(TouchItem::new(touch.id, touch.position, event.clone()));
            self.check_pen_buttons(host, touch.id, &event, true);
            if event.phase == TouchPhase::Enter {
                self.touch_entered(host, touch, &event);
            } else {
                self.touch_began(host, touch, &event);
            }
        }
    }

    /// Turn a newly pressed pen barrel button into a pen-primary gesture on the root.
    fn check_pen_buttons<H>(&mut self, host: &mut H, id: TouchId, event: &TouchEvent, is_new: bool) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if !self.config.pen_barrel_gesture
            || event.device != InputDevice::Pen
            || !event.keys.contains(KeyState::PEN_BARREL)
        {
            return false;
        }
        let was_pressed = self
            .touch(id)
            .is_some_and(|item| item.last_keys.contains(KeyState::PEN_BARREL));
        if was_pressed && !is_new {
            return false;
        }
        let position = event.focused_touch().map_or(Point::ZERO, |t| t.position);
        let mut gesture = GestureEvent::new(GestureType::PenPrimary, GestureState::Begin, position);
        gesture.keys = event.keys;
        gesture.time = event.time;
        host.root_gesture(&gesture)
    }

    fn touch_entered<H>(&mut self, host: &mut H, touch: TouchInfo, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        self.update_hover_candidates(host, touch, event);
        if let Some(item) = self.item_mut(touch.id) {
            item.last_keys = event.keys;
        }
    }

    fn touch_began<H>(&mut self, host: &mut H, touch: TouchInfo, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let id = touch.id;
        if let Some(popup) = host.other_popup() {
            host.deactivate_popup();
            if popup == PopupKind::Dialog {
                return;
            }
            if host.popup_swallows(ForeignEvent::Touch(event)) {
                // The press closed the popup; it registers nothing here.
                if let Some(item) = self.item_mut(id) {
                    item.set_flag(ItemFlags::DISCARDED, true);
                }
                return;
            }
        }

        tracing::trace!(target: "understory_touch::state", ?id, "touch began");
        let Some(item) = self.item_mut(id) else {
            return;
        };
        item.set_flag(ItemFlags::CONTACT, true);
        item.first_event = event.clone();

        self.discard_hover_touches(host);

        if self.items.len() == 1 {
            let screen = host.window_to_screen(touch.position);
            host.set_last_mouse_position(screen);
        }

        // Strips along the screen edges belong to system gestures.
        let screen = host.screen_bounds();
        let p = host.window_to_screen(touch.position);
        if p.x - screen.x0 < EDGE_BAND.left
            || screen.x1 - p.x - 1.0 < EDGE_BAND.right
            || p.y - screen.y0 < EDGE_BAND.top
            || screen.y1 - p.y - 1.0 < EDGE_BAND.bottom
        {
            tracing::debug!(target: "understory_touch::state", ?id, position = ?p, "discard edge touch");
            if let Some(item) = self.item_mut(id) {
                item.set_flag(ItemFlags::DISCARDED, true);
            }
            return;
        }

        let needy: SmallVec<[GestureId; 4]> = self
            .gestures
            .iter()
            .filter(|g| g.needs_more_touches() && !g.contains(id))
            .map(|g| g.id)
            .collect();
        for gid in needy {
            let before = self.zoom_center_before(gid);
            if let Some(g) = self.gesture_mut(gid) {
                g.add_touch(id);
            }
            self.apply_zoom_offset(gid, before, true);
            self.sync_gesture_touches(gid);
        }

        if self.share_existing_handler(host, id, event) {
            self.feed_manager(host, |manager, out| manager.touch_began(&touch, out));
            return;
        }

        if self.gestures.iter().any(|g| g.shadow) {
            self.feed_manager(host, |manager, out| manager.touch_began(&touch, out));
            return;
        }

        let unclaimed = self
            .touch(id)
            .is_some_and(|item| item.handler.is_none() && item.candidates.is_empty());
        if unclaimed && self.collect_touch_handlers(host, touch, event) {
            // The view took the press as a double click; nothing negotiates for it.
            self.feed_manager(host, |manager, out| manager.touch_began(&touch, out));
            if let Some(item) = self.item_mut(id) {
                item.last_keys = event.keys;
            }
            return;
        }

        let required = self.register_required_gestures(id);
        if required {
            self.accept_common_handler(host, id, event);
        } else {
            let first = self
                .touch(id)
                .and_then(|item| item.candidates.first())
                .map(|c| c.handler.clone());
            if let Some(handler) = first {
                self.accept_touch_handler(host, id, &handler);
            }
        }

        self.update_gesture_recognizers();
        self.feed_manager(host, |manager, out| manager.touch_began(&touch, out));
        if let Some(item) = self.item_mut(id) {
            item.last_keys = event.keys;
        }
    }

    /// Offer a new contact to an accepted handler whose view it lands on.
    fn share_existing_handler<H>(&mut self, host: &mut H, id: TouchId, event: &TouchEvent) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let Some(position) = self.touch_position(id) else {
            return false;
        };
        let shared = self.items.iter().filter(|other| other.id != id).find_map(|other| {
            let (Some(handler), Some(view)) = (&other.handler, other.view) else {
                return None;
            };
            (host.window_rect(view).contains(position) && handler.add_touch(event))
                .then(|| (other.id, handler.clone(), view))
        });
        let Some((other, handler, view)) = shared else {
            return false;
        };
        tracing::trace!(target: "understory_touch::state", ?id, with = ?other, "share touch handler");
        // Several contacts on one handler never open a context menu.
        if let Some(item) = self.item_mut(id) {
            item.candidates.clear();
            item.handler = Some(handler);
            item.view = Some(view);
            item.set_flag(ItemFlags::SUPPRESS_CONTEXT_MENU, true);
        }
        if let Some(item) = self.item_mut(other) {
            item.set_flag(ItemFlags::SUPPRESS_CONTEXT_MENU, true);
        }
        true
    }

    /// Register every candidate on the gestures it asks for. Returns `true` if any was added.
    fn register_required_gestures(&mut self, id: TouchId) -> bool {
        let candidates: SmallVec<[TouchCandidate<V>; 2]> = self
            .touch(id)
            .map(|item| item.candidates.clone())
            .unwrap_or_default();

        let mut required = false;
        for candidate in &candidates {
            for request in candidate.handler.required_gestures() {
                let gid = self.find_or_create_gesture(request.kind, id);
                if request.flags.contains(RequestFlags::SUPPRESS_CONTEXT_MENU) {
                    if let Some(item) = self.item_mut(id) {
                        item.set_flag(ItemFlags::SUPPRESS_CONTEXT_MENU, true);
                    }
                }
                let Some(g) = self.gesture_mut(gid) else {
                    continue;
                };
                if request.flags.contains(RequestFlags::EXCLUSIVE_TOUCH) {
                    g.exclusive_touch = true;
                }
                let second_tap = g.awaits_second_tap() && !g.contains(id);
                if g.candidates.add(
                    candidate.handler.clone(),
                    candidate.view,
                    request.constraints,
                    request.priority,
                ) {
                    tracing::trace!(
                        target: "understory_touch::state",
                        ?id,
                        kind = ?request.kind,
                        constraints = ?request.constraints,
                        priority = request.priority.0,
                        view = ?candidate.view,
                        "gesture candidate"
                    );
                    g.add_touch(id);
                    required = true;
                } else if second_tap {
                    g.add_touch(id);
                }
            }
        }
        required
    }

    /// Accept the handler shared by every gesture of this lone contact, or send all
    /// candidates a preliminary `Possible` swipe while recognition decides.
    fn accept_common_handler<H>(&mut self, host: &mut H, id: TouchId, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let lone = |touches: &[TouchId]| touches.len() == 1 && touches[0] == id;

        let mut common: Option<HandlerRef> = None;
        let mut agreed = true;
        for g in self.gestures.iter().filter(|g| lone(g.touches.as_slice())) {
            match (g.candidates.single_handler(), &common) {
                (Some(h), None) => common = Some(h.clone()),
                (Some(h), Some(c)) if h == c => {}
                _ => {
                    agreed = false;
                    break;
                }
            }
        }

        if let (true, Some(handler)) = (agreed, common) {
            self.accept_touch_handler(host, id, &handler);
            return;
        }

        let mut handlers: SmallVec<[HandlerRef; 4]> = SmallVec::new();
        for g in self.gestures.iter().filter(|g| lone(g.touches.as_slice())) {
            for h in g.candidates.handlers() {
                if !handlers.contains(&h) {
                    handlers.push(h);
                }
            }
        }
        let position = self.touch_position(id).unwrap_or(Point::ZERO);
        let mut preliminary = GestureEvent::new(GestureType::Swipe, GestureState::Possible, position);
        preliminary.keys = event.keys;
        preliminary.time = event.time;
        for handler in &handlers {
            handler.on_gesture(&preliminary);
        }
    }

    fn touch_changed<H>(&mut self, host: &mut H, touch: TouchInfo, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let id = touch.id;
        let single = self.items.len() == 1;
        let Some(item) = self.item_mut(id) else {
            return;
        };
        item.position = touch.position;
        if single {
            host.set_last_mouse_position(host.window_to_screen(touch.position));
        }

        if let Some(handler) = item.handler.clone() {
            let throttled = matches!(event.phase, TouchPhase::Move | TouchPhase::Hover)
                && item.last_keys == event.keys
                && item
                    .last_event_time
                    .is_some_and(|last| event.time.saturating_sub(last) < MOVE_RATE_LIMIT_MS);
            if throttled {
                return;
            }
            item.last_event_time = Some(event.time);
            item.last_keys = event.keys;
            handler.trigger(event);
        } else if event.phase == TouchPhase::Hover {
            self.update_hover_candidates(host, touch, event);
        }

        if self.config.long_press_context_menu {
            if let Some(item) = self.item_mut(id) {
                if !item.suppresses_context_menu()
                    && !item.is_discarded()
                    && item.distance_from_first(touch.position) >= CONTEXT_MENU_MAX_DISTANCE
                {
                    item.set_flag(ItemFlags::SUPPRESS_CONTEXT_MENU, true);
                }
            }
        }

        if !event.phase.is_hover() {
            self.feed_manager(host, |manager, out| manager.touch_changed(&touch, out));
        }
    }

    fn touch_ended<H>(&mut self, host: &mut H, id: TouchId, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let Some(item) = self.touch(id) else {
            return;
        };
        tracing::trace!(target: "understory_touch::state", ?id, "touch ended");
        let time = event.touch(id).map_or(event.time, |t| t.time);
        let info = TouchInfo::new(id, item.position, time, TouchPhase::End);
        self.feed_manager(host, |manager, out| manager.touch_ended(&info, out));

        // Recognized gestures may have taken the item away already.
        let Some(item) = self.item_mut(id) else {
            return;
        };
        item.set_flag(ItemFlags::CONTACT, false);
        let discarded = item.is_discarded();
        let view = item.view;
        match item.handler.clone() {
            Some(handler) => {
                if view.is_some_and(|v| !host.is_attached(v)) {
                    self.set_touch_discarded(id);
                } else {
                    handler.finish(event, discarded);
                }
            }
            None if event.phase == TouchPhase::Leave => self.trigger_hover_candidates(id, event),
            None => {}
        }

        let mut is_last = self.items.len() == 1;
        let double_tap = self
            .gestures
            .iter()
            .find(|g| g.kind == GestureType::DoubleTap && g.contains(id) && g.awaits_second_tap())
            .map(|g| g.id);
        if double_tap.is_some() {
            is_last = false;
        }

        let containing: SmallVec<[GestureId; 4]> = self
            .gestures
            .iter()
            .filter(|g| g.contains(id))
            .map(|g| g.id)
            .collect();
        for gid in containing {
            let before = self.zoom_center_before(gid);
            let Some(g) = self.gesture_mut(gid) else {
                continue;
            };
            g.remove_touch(id);
            let kind = g.kind;
            self.apply_zoom_offset(gid, before, false);
            self.sync_gesture_touches(gid);

            // A released tap may still turn out to be the first half of a double tap.
            let waiting = double_tap.is_some() && kind == GestureType::SingleTap;
            if waiting {
                self.announce_double_tap(host, id, gid, event);
            }

            let removable = self.gesture(gid).is_some_and(|g| g.can_remove());
            if removable && !waiting {
                self.remove_gesture(gid, false);
            } else {
                is_last = false;
            }
        }

        if is_last {
            self.remove_all_gestures();
        }

        self.schedule_context_menu(host, id, event);
        if let Some(item) = self.item_mut(id) {
            item.last_keys = event.keys;
        }
    }

    /// Keep a single tap alive for its pending double tap, and tell its candidates.
    fn announce_double_tap<H>(&mut self, host: &mut H, id: TouchId, gid: GestureId, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let retained = self.touch(id).cloned();
        let Some(g) = self.gesture_mut(gid) else {
            return;
        };
        tracing::trace!(target: "understory_touch::state", ?gid, "keep single tap");
        let handlers = g.candidates.handlers();
        g.retained = retained;

        let position = self.touch_position(id).unwrap_or(Point::ZERO);
        let mut preliminary = GestureEvent::new(GestureType::DoubleTap, GestureState::Possible, position);
        preliminary.keys = event.keys;
        preliminary.time = event.time;
        host.popup_swallows(ForeignEvent::Touch(event));
        for handler in &handlers {
            handler.on_gesture(&preliminary);
        }
    }

    /// Open the context menu for a long, motionless press that nothing else used.
    fn schedule_context_menu<H>(&mut self, host: &mut H, id: TouchId, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if !self.config.long_press_context_menu || self.context_menu_pending {
            return;
        }
        let Some(item) = self.touch(id) else {
            return;
        };
        if item.suppresses_context_menu()
            || item.is_discarded()
            || event.time.saturating_sub(item.first_event.time) < CONTEXT_MENU_DELAY_MS
            || host.is_editing()
        {
            return;
        }
        let still = event
            .touch(id)
            .map(|t| t.position)
            .filter(|p| item.distance_from_first(*p) < CONTEXT_MENU_MAX_DISTANCE);
        if let Some(position) = still {
            self.context_menu_pending = true;
            self.post(DeferredCall::PopupContextMenu { position }, 0);
        }
    }

    /// Hit-test from the root and register every handler offered for the contact.
    ///
    /// Returns `true` if a view reported a double click for the synthetic mouse press, in which
    /// case the contact is left without candidates.
    fn collect_touch_handlers<H>(&mut self, host: &mut H, touch: TouchInfo, event: &TouchEvent) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let root = host.root();
        let local = touch.position - host.frame(root).origin().to_vec2();
        self.collect_in_view(host, root, local, touch.id, event)
    }

    fn collect_in_view<H>(
        &mut self,
        host: &mut H,
        view: V,
        local: Point,
        id: TouchId,
        event: &TouchEvent,
    ) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        // Front to back.
        if !host.suppresses_child_touch(view) {
            for index in (0..host.child_count(view)).rev() {
                let child = host.child(view, index);
                let frame = host.frame(child);
                if host.is_enabled(child)
                    && frame.contains(local)
                    && self.collect_in_view(host, child, local - frame.origin().to_vec2(), id, event)
                {
                    return true;
                }
            }
        }

        let mut handler = host.create_touch_handler(view, event);
        let has_mouse_candidate = self
            .touch(id)
            .is_some_and(|item| item.flags.contains(ItemFlags::MOUSE_CANDIDATE));
        if handler.is_none() && !has_mouse_candidate {
            let mut mouse = MouseEvent::new(MouseEventKind::Down, local, event.keys, event.time);
            if let Some(mouse_handler) = host.create_mouse_handler(view, &mut mouse) {
                let origin = host.window_rect(view).origin();
                let axes = host.preferred_axes(view);
                handler = Some(HandlerRef::new(Rc::new(MouseTouchHandler::new(
                    mouse_handler,
                    origin,
                    axes,
                ))));
            } else if view == host.root() {
                if let Some(sink) = host.root_mouse_sink() {
                    let origin = host.window_rect(view).origin();
                    handler = Some(HandlerRef::new(Rc::new(RootTouchHandler::new(sink, origin))));
                }
            }

            if mouse.double_clicked {
                tracing::debug!(target: "understory_touch::state", ?id, ?view, "double click handled by view");
                if let Some(item) = self.item_mut(id) {
                    item.reset();
                }
                return true;
            }

            if handler.is_some() {
                if let Some(item) = self.item_mut(id) {
                    item.set_flag(ItemFlags::MOUSE_CANDIDATE, true);
                }
            }
        }

        let double_tap = host
            .double_tap_sink(view)
            .map(|sink| HandlerRef::new(Rc::new(DoubleTapHandler::new(sink))));
        if let Some(item) = self.item_mut(id) {
            if let Some(handler) = handler {
                tracing::trace!(target: "understory_touch::state", ?id, ?view, "touch candidate");
                item.add_candidate(view, handler);
            }
            if let Some(handler) = double_tap {
                item.add_candidate(view, handler);
            }
        }
        false
    }

    /// Re-collect the candidates of a hovering contact.
    fn update_hover_candidates<H>(&mut self, host: &mut H, touch: TouchInfo, event: &TouchEvent)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let Some(item) = self.touch(touch.id) else {
            return;
        };
        // Candidates the pointer left get one last trigger.
        let left: SmallVec<[HandlerRef; 2]> = item
            .candidates
            .iter()
            .rev()
            .filter(|c| !host.window_rect(c.view).contains(touch.position))
            .map(|c| c.handler.clone())
            .collect();
        for handler in &left {
            handler.trigger(event);
        }

        if let Some(item) = self.item_mut(touch.id) {
            item.reset();
        }
        if self.items.len() <= 1 && self.collect_touch_handlers(host, touch, event) {
            return;
        }
        self.trigger_hover_candidates(touch.id, event);
    }

    fn trigger_hover_candidates(&self, id: TouchId, event: &TouchEvent) {
        let handlers: SmallVec<[HandlerRef; 2]> = self
            .touch(id)
            .map(|item| item.candidates.iter().map(|c| c.handler.clone()).collect())
            .unwrap_or_default();
        for handler in &handlers {
            handler.trigger(event);
        }
    }

    fn accept_touch_handler<H>(&mut self, host: &mut H, id: TouchId, handler: &HandlerRef) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        match self.item_mut(id) {
            Some(item) => accept_handler(host, item, handler),
            None => false,
        }
    }
}

/// Make `handler` the item's handler and begin it.
///
/// Returns `true` if the handler was begun, which requires an attached view.
pub(super) fn accept_handler<H, V>(host: &mut H, item: &mut TouchItem<V>, handler: &HandlerRef) -> bool
where
    H: TouchHost<View = V> + ?Sized,
    V: Copy + Eq + Debug,
{
    if item.view.is_some_and(|v| !host.is_attached(v)) {
        return false;
    }
    if !item.accept_candidate(handler) {
        item.candidates.clear();
        item.handler = Some(handler.clone());
        item.view = None;
    }
    match item.view {
        Some(view) if host.is_attached(view) => {
            if handler.takes_focus() {
                host.take_focus(view);
            }
            tracing::trace!(target: "understory_touch::state", id = ?item.id, ?view, "accept touch handler");
            handler.begin(&item.first_event);
            true
        }
        _ => false,
    }
}

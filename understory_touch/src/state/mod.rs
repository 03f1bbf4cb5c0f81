// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch resolution for one window.
//!
//! [`TouchInputState`] owns the live [`TouchItem`]s and [`Gesture`]s of a window. It is fed
//! raw contacts (batched through [`process_touches`](TouchInputState::process_touches) or one
//! by one through [`process_touch`](TouchInputState::process_touch) and friends), hit-tests the
//! host's view tree for handler candidates, negotiates the gestures those candidates need, and
//! turns whatever the [`GestureManager`] recognizes into handler callbacks.
//!
//! All entry points take the host explicitly. The state never stores views beyond their
//! copyable keys, so a host may rebuild its tree between calls as long as it reports detached
//! views through [`ViewTree::is_attached`](crate::ViewTree::is_attached) or calls
//! [`discard_touches_for_view`](TouchInputState::discard_touches_for_view) first.
//!
//! Work that must not run re-entrantly is queued as a [`DeferredCall`] and executed by
//! [`run_deferred`](TouchInputState::run_deferred) (or [`process_idle`](TouchInputState::process_idle)).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use understory_gesture::{GestureEvent, GestureState, GestureType, KeyState, TouchId};

use crate::config::{CONTEXT_MENU_RETRY_MS, TouchConfig};
use crate::deferred::{DeferredCall, DeferredQueue};
use crate::gesture::{Gesture, GestureId};
use crate::host::TouchHost;
use crate::item::TouchItem;
use crate::manager::{GestureManager, GestureTarget, Recognition};

mod discard;
mod gestures;
mod touches;


/// Half size of the square [`TouchInputState::has_touch_near`] tests against.
const TOUCH_NEAR_DISTANCE: f64 = 10.0;

/// Touch and gesture state of one window.
pub struct TouchInputState<V> {
    items: Vec<TouchItem<V>>,
    gestures: Vec<Gesture<V>>,
    next_gesture: u32,
    manager: Option<Box<dyn GestureManager>>,
    config: TouchConfig,
    deferred: DeferredQueue,
    clock: u64,
    delegating: Option<GestureId>,
    in_gesture_event: bool,
    context_menu_pending: bool,
}

impl<V: fmt::Debug> fmt::Debug for TouchInputState<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchInputState")
            .field("items", &self.items.len())
            .field("gestures", &self.gestures.len())
            .field("has_manager", &self.manager.is_some())
            .field("config", &self.config)
            .field("deferred", &self.deferred.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<V: Copy + Eq + fmt::Debug> Default for TouchInputState<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy + Eq + fmt::Debug> TouchInputState<V> {
    /// Create an empty state with the default configuration and no gesture manager.
    pub fn new() -> Self {
        Self::with_config(TouchConfig::default())
    }

    /// Create an empty state with `config`.
    pub fn with_config(config: TouchConfig) -> Self {
        Self {
            items: Vec::new(),
            gestures: Vec::new(),
            next_gesture: 0,
            manager: None,
            config,
            deferred: DeferredQueue::default(),
            clock: 0,
            delegating: None,
            in_gesture_event: false,
            context_menu_pending: false,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    /// Replace the configuration. The long-press delay is forwarded to the gesture manager.
    pub fn set_config(&mut self, config: TouchConfig) {
        if let Some(manager) = self.manager.as_mut() {
            manager.set_long_press_delay(config.long_press_delay_ms);
        }
        self.config = config;
    }

    /// Install a gesture manager, returning the previous one.
    ///
    /// Gestures that are already being resolved start recognizing on the new manager.
    pub fn set_gesture_manager(
        &mut self,
        manager: Option<Box<dyn GestureManager>>,
    ) -> Option<Box<dyn GestureManager>> {
        let old = core::mem::replace(&mut self.manager, manager);
        if let Some(manager) = self.manager.as_mut() {
            manager.set_long_press_delay(self.config.long_press_delay_ms);
        }
        self.update_gesture_recognizers();
        old
    }

    /// Returns `true` if a gesture manager is installed.
    pub fn has_gesture_manager(&self) -> bool {
        self.manager.is_some()
    }

    /// The installed gesture manager.
    pub fn gesture_manager(&self) -> Option<&dyn GestureManager> {
        self.manager.as_deref()
    }

    /// Live contacts, in the order they started.
    pub fn touches(&self) -> &[TouchItem<V>] {
        &self.items
    }

    /// Look up a live contact.
    pub fn touch(&self, id: TouchId) -> Option<&TouchItem<V>> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Ids of all live contacts.
    pub fn touch_ids(&self) -> SmallVec<[TouchId; 4]> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Id of the oldest live contact.
    pub fn first_touch_id(&self) -> Option<TouchId> {
        self.items.first().map(|item| item.id)
    }

    /// Returns `true` if `id` is a live contact.
    pub fn has_touch(&self, id: TouchId) -> bool {
        self.touch(id).is_some()
    }

    /// Last known window position of a live contact.
    pub fn touch_position(&self, id: TouchId) -> Option<Point> {
        self.touch(id).map(|item| item.position)
    }

    /// Returns `true` if a live contact is within 10 px (per axis) of `position`.
    pub fn has_touch_near(&self, position: Point) -> bool {
        self.items.iter().any(|item| {
            let d = item.position - position;
            d.x.max(-d.x) <= TOUCH_NEAR_DISTANCE && d.y.max(-d.y) <= TOUCH_NEAR_DISTANCE
        })
    }

    /// Returns `true` if an accepted handler's view overlaps `view`.
    pub fn has_touch_handler_in_view<H>(&self, host: &H, view: V) -> bool
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let area = host.window_rect(view);
        self.items.iter().any(|item| match (&item.handler, item.view) {
            (Some(_), Some(v)) => !host.window_rect(v).intersect(area).is_zero_area(),
            _ => false,
        })
    }

    /// Look up a gesture.
    pub fn gesture(&self, id: GestureId) -> Option<&Gesture<V>> {
        self.gestures.iter().find(|g| g.id == id)
    }

    /// Gestures being resolved, in creation order.
    pub fn gestures(&self) -> &[Gesture<V>] {
        &self.gestures
    }

    /// Returns `true` while a gesture event is being dispatched.
    pub fn is_in_gesture_event(&self) -> bool {
        self.in_gesture_event
    }

    /// Returns `true` while a long-press context menu waits to open.
    pub fn has_pending_context_menu(&self) -> bool {
        self.context_menu_pending
    }

    /// Returns `true` if deferred calls are queued.
    pub fn has_deferred_calls(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Deliver `event` to `gesture` again on the next [`run_deferred`](Self::run_deferred).
    pub fn defer_gesture(&mut self, gesture: GestureId, event: GestureEvent) {
        self.post(DeferredCall::ReplayGesture { gesture, event }, 0);
    }

    /// Run the deferred calls that are due at `now`.
    ///
    /// Calls posted while this runs wait for the next call.
    pub fn run_deferred<H>(&mut self, host: &mut H, now: u64)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        self.advance_clock(now);
        for call in self.deferred.take_due(now) {
            match call {
                DeferredCall::DiscardTouches => self.discard_touches(host, false, false),
                DeferredCall::ReplayGesture { gesture, event } => {
                    self.on_gesture(host, gesture, event);
                }
                DeferredCall::PopupContextMenu { position } => {
                    self.popup_context_menu(host, position);
                }
            }
        }
    }

    /// Timer tick: run due deferred calls, then let the gesture manager report time-based
    /// transitions such as long presses and tap timeouts.
    pub fn process_idle<H>(&mut self, host: &mut H, now: u64)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        self.run_deferred(host, now);
        self.feed_manager(host, |manager, out| manager.idle(now, out));
    }

    fn popup_context_menu<H>(&mut self, host: &mut H, position: Point)
    where
        H: TouchHost<View = V> + ?Sized,
    {
        if host.other_popup().is_some() {
            self.context_menu_pending = false;
            return;
        }
        if host.active_drag().is_some() {
            self.post(DeferredCall::PopupContextMenu { position }, CONTEXT_MENU_RETRY_MS);
            return;
        }
        tracing::debug!(target: "understory_touch::state", ?position, "long press context menu");
        self.context_menu_pending = false;
        host.popup_context_menu(position);
    }

    fn post(&mut self, call: DeferredCall, delay_ms: u64) {
        self.deferred.post(call, self.clock.saturating_add(delay_ms));
    }

    fn advance_clock(&mut self, time: u64) {
        self.clock = self.clock.max(time);
    }

    fn item_index(&self, id: TouchId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn item_mut(&mut self, id: TouchId) -> Option<&mut TouchItem<V>> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    fn gesture_mut(&mut self, id: GestureId) -> Option<&mut Gesture<V>> {
        self.gestures.iter_mut().find(|g| g.id == id)
    }

    /// The gesture of `kind` that contains `touch`.
    fn find_gesture(&self, kind: GestureType, touch: TouchId) -> Option<GestureId> {
        self.gestures
            .iter()
            .find(|g| g.kind == kind && g.contains(touch))
            .map(|g| g.id)
    }

    /// The gesture of `kind` for `touch`. A second press joins the double tap still waiting
    /// for it.
    fn find_or_create_gesture(&mut self, kind: GestureType, touch: TouchId) -> GestureId {
        if let Some(id) = self.find_gesture(kind, touch) {
            return id;
        }
        let waiting = self
            .gestures
            .iter()
            .find(|g| g.kind == kind && g.touches.is_empty() && g.awaits_second_tap())
            .map(|g| g.id);
        if let Some(id) = waiting {
            return id;
        }
        let id = GestureId(self.next_gesture);
        self.next_gesture = self.next_gesture.wrapping_add(1);
        tracing::trace!(target: "understory_touch::state", ?id, ?kind, "add gesture");
        self.gestures.push(Gesture::new(id, kind));
        id
    }

    /// Drop an item and purge it from every gesture.
    fn remove_item(&mut self, id: TouchId) {
        let Some(index) = self.item_index(id) else {
            return;
        };
        self.items.remove(index);
        tracing::trace!(
            target: "understory_touch::state",
            ?id,
            remaining = self.items.len(),
            "remove touch item"
        );
        let touched: SmallVec<[GestureId; 4]> = self
            .gestures
            .iter_mut()
            .filter_map(|g| g.remove_touch(id).then_some(g.id))
            .collect();
        for gid in touched {
            self.sync_gesture_touches(gid);
        }
    }

    /// Tell the manager about a changed touch set.
    fn sync_gesture_touches(&mut self, id: GestureId) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        let Some(g) = self.gestures.iter().find(|g| g.id == id) else {
            return;
        };
        if manager.is_recognizing(id) {
            manager.update_touches(GestureTarget {
                id,
                kind: g.kind,
                touches: &g.touches,
            });
        }
    }

    /// Start recognizers for gestures that have none yet.
    fn update_gesture_recognizers(&mut self) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        for g in &self.gestures {
            if !manager.is_recognizing(g.id) {
                manager.start_recognizing(GestureTarget {
                    id: g.id,
                    kind: g.kind,
                    touches: &g.touches,
                });
            }
        }
    }

    /// Remove a gesture, sending a closing `End` to continuous gestures left open.
    fn remove_gesture(&mut self, id: GestureId, aborted: bool) {
        let Some(index) = self.gestures.iter().position(|g| g.id == id) else {
            return;
        };
        let mut gesture = self.gestures.remove(index);
        gesture.done = true;
        tracing::trace!(target: "understory_touch::state", ?id, kind = ?gesture.kind, aborted, "remove gesture");

        if gesture.kind.is_continuous() {
            if let (Some(handler), Some(last)) = (&gesture.handler, gesture.last_event) {
                if matches!(last.state, GestureState::Begin | GestureState::Changed) {
                    let mut end = last.with_state(GestureState::End);
                    if gesture.shadow || aborted {
                        end.amount_x = 1.0;
                        end.amount_y = 1.0;
                    }
                    handler.on_gesture(&end);
                }
            }
        }

        if let Some(manager) = self.manager.as_mut() {
            manager.stop_recognizing(id);
        }
    }

    fn remove_all_gestures(&mut self) {
        let ids: SmallVec<[GestureId; 8]> = self.gestures.iter().map(|g| g.id).collect();
        for id in ids {
            self.remove_gesture(id, false);
        }
    }

    /// Run `feed` against the manager and dispatch what it recognized.
    fn feed_manager<H, F>(&mut self, host: &mut H, feed: F)
    where
        H: TouchHost<View = V> + ?Sized,
        F: FnOnce(&mut dyn GestureManager, &mut Vec<Recognition>),
    {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        let mut out = Vec::new();
        feed(manager.as_mut(), &mut out);
        for recognition in out {
            let keys = self.gesture_keys(recognition.gesture);
            let event = GestureEvent {
                kind: recognition.kind,
                state: recognition.state,
                position: recognition.position,
                amount_x: recognition.amount_x,
                amount_y: recognition.amount_y,
                keys,
                time: self.clock,
            };
            self.on_gesture(host, recognition.gesture, event);
        }
    }

    /// Keys last seen on the first live contact of a gesture.
    fn gesture_keys(&self, id: GestureId) -> KeyState {
        self.gesture(id)
            .and_then(|g| g.touches.iter().find_map(|t| self.touch(*t)))
            .map_or(KeyState::empty(), |item| item.last_keys)
    }

    /// Average position of the live contacts of a gesture.
    fn touch_center(&self, id: GestureId) -> Point {
        let Some(g) = self.gesture(id) else {
            return Point::ZERO;
        };
        let (sum, count) = g
            .touches
            .iter()
            .filter_map(|t| self.touch(*t))
            .fold((Vec2::ZERO, 0_u32), |(sum, n), item| {
                (sum + item.position.to_vec2(), n + 1)
            });
        if count == 0 {
            Point::ZERO
        } else {
            (sum / f64::from(count)).to_point()
        }
    }

    /// Center of a zoom gesture before its touch set changes.
    fn zoom_center_before(&self, id: GestureId) -> Option<Point> {
        self.gesture(id)
            .filter(|g| g.kind == GestureType::Zoom)
            .map(|_| self.touch_center(id))
    }

    /// Keep a running zoom anchored where it was when a touch joined or left it.
    fn apply_zoom_offset(&mut self, id: GestureId, before: Option<Point>, added: bool) {
        let Some(old) = before else {
            return;
        };
        let Some(g) = self.gesture(id) else {
            return;
        };
        let min = usize::from(added);
        if g.last_event.is_none() || g.touches.len() <= min {
            return;
        }
        let new = self.touch_center(id);
        if let Some(g) = self.gesture_mut(id) {
            g.offset += old - new;
            tracing::trace!(target: "understory_touch::state", ?id, offset = ?g.offset, "zoom offset");
        }
    }
}

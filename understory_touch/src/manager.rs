// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bridge to a gesture recognizer.
//!
//! A [`GestureManager`] is told which gestures to watch and is fed raw contact samples.
//! Whatever it recognizes is pushed into the `out` vector that every feeding method takes;
//! [`TouchInputState`](crate::TouchInputState) dispatches those transitions right after the
//! call returns. Platforms with native recognizers implement the trait over them;
//! everyone else uses [`BuiltinGestureManager`].

use alloc::vec::Vec;

use understory_gesture::{GestureRecognition, GestureType, Recognized, TouchId};

use crate::event::TouchInfo;
use crate::gesture::GestureId;

/// A transition reported by a [`GestureManager`].
pub type Recognition = Recognized<GestureId>;

/// The platform-independent recognizer pool.
pub type BuiltinGestureManager = GestureRecognition<GestureId>;

/// A gesture to watch.
#[derive(Copy, Clone, Debug)]
pub struct GestureTarget<'a> {
    /// Gesture id.
    pub id: GestureId,
    /// Gesture kind.
    pub kind: GestureType,
    /// Contacts currently part of it.
    pub touches: &'a [TouchId],
}

/// Recognizer bridge.
///
/// `start_recognizing` and `stop_recognizing` are idempotent per gesture, and
/// `is_recognizing` reflects exactly the gestures currently attached.
pub trait GestureManager {
    /// Start watching a gesture.
    fn start_recognizing(&mut self, target: GestureTarget<'_>);

    /// Stop watching a gesture.
    fn stop_recognizing(&mut self, id: GestureId);

    /// Returns `true` while the gesture is being watched.
    fn is_recognizing(&self, id: GestureId) -> bool;

    /// The contacts of a watched gesture changed.
    fn update_touches(&mut self, target: GestureTarget<'_>);

    /// A contact started.
    fn touch_began(&mut self, touch: &TouchInfo, out: &mut Vec<Recognition>);

    /// A contact moved.
    fn touch_changed(&mut self, touch: &TouchInfo, out: &mut Vec<Recognition>);

    /// A contact ended.
    fn touch_ended(&mut self, touch: &TouchInfo, out: &mut Vec<Recognition>);

    /// Timer tick for time-based recognition.
    fn idle(&mut self, now: u64, out: &mut Vec<Recognition>) {
        let _ = (now, out);
    }

    /// Hold time before a long press is recognized.
    fn set_long_press_delay(&mut self, delay_ms: u64) {
        let _ = delay_ms;
    }
}

impl GestureManager for BuiltinGestureManager {
    fn start_recognizing(&mut self, target: GestureTarget<'_>) {
        self.start(target.id, target.kind, target.touches);
    }

    fn stop_recognizing(&mut self, id: GestureId) {
        self.stop(id);
    }

    fn is_recognizing(&self, id: GestureId) -> bool {
        Self::is_recognizing(self, id)
    }

    fn update_touches(&mut self, target: GestureTarget<'_>) {
        self.set_touches(target.id, target.touches);
    }

    fn touch_began(&mut self, touch: &TouchInfo, out: &mut Vec<Recognition>) {
        Self::touch_began(self, touch.sample(), out);
    }

    fn touch_changed(&mut self, touch: &TouchInfo, out: &mut Vec<Recognition>) {
        Self::touch_changed(self, touch.sample(), out);
    }

    fn touch_ended(&mut self, touch: &TouchInfo, out: &mut Vec<Recognition>) {
        Self::touch_ended(self, touch.sample(), out);
    }

    fn idle(&mut self, now: u64, out: &mut Vec<Recognition>) {
        Self::idle(self, now, out);
    }

    fn set_long_press_delay(&mut self, delay_ms: u64) {
        Self::set_long_press_delay(self, delay_ms);
    }
}

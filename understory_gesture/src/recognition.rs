// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform-independent gesture recognizers.
//!
//! [`GestureRecognition`] owns one recognizer per gesture being watched and turns raw touch
//! samples into [`Recognized`] transitions. It is meant for platforms that do not offer native
//! gesture recognition; a native bridge can report the same transitions instead.
//!
//! Recognizers follow a two-level state model. The internal state tracks what the samples
//! say, the external state tracks what has been reported. Reporting happens from
//! [`GestureRecognition::idle`], which runs after every press and release and should also be
//! driven by a timer so time-based gestures (long press, delayed single tap) can fire.
//! Each call reports at most one transition.
//!
//! ```rust
//! use kurbo::Point;
//! use understory_gesture::{GestureRecognition, GestureState, GestureType, TouchId, TouchSample};
//!
//! let mut rec = GestureRecognition::new();
//! rec.start(7_u32, GestureType::LongPress, &[TouchId(1)]);
//!
//! let mut out = Vec::new();
//! rec.touch_began(TouchSample::new(TouchId(1), Point::new(10.0, 10.0), 0), &mut out);
//! rec.idle(300, &mut out);
//! assert!(out.is_empty());
//!
//! rec.idle(501, &mut out);
//! assert_eq!(out[0].gesture, 7);
//! assert_eq!(out[0].state, GestureState::Begin);
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::types::{GestureState, GestureType, TouchId};

/// Longest delay between the two presses of a double tap, in milliseconds.
pub const MAX_DOUBLE_TAP_TIME: u64 = 500;
/// Largest offset between the two presses of a double tap, per axis.
pub const MAX_DOUBLE_TAP_DISTANCE: f64 = 50.0;
/// Default hold time before a long press is recognized, in milliseconds.
pub const DEFAULT_LONG_PRESS_DELAY: u64 = 500;
/// Hold time a single tap waits for a competing long press, in milliseconds.
pub const SINGLE_TAP_MIN_TIME: u64 = 200;

const SWIPE_MARGIN: f64 = 10.0;
const SWIPE_REST_TOLERANCE: f64 = 4.0;
const SWIPE_HISTORY: usize = 3;
const ZOOM_MARGIN: f64 = 0.05;
const ROTATE_MARGIN: f64 = core::f64::consts::PI / 180.0 * 5.0;

/// One raw touch sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchSample {
    /// Contact.
    pub id: TouchId,
    /// Position in window coordinates.
    pub position: Point,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl TouchSample {
    /// Create a sample.
    pub const fn new(id: TouchId, position: Point, time: u64) -> Self {
        Self { id, position, time }
    }
}

/// A transition reported by a recognizer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Recognized<G> {
    /// Gesture the recognizer was started for.
    pub gesture: G,
    /// Its kind.
    pub kind: GestureType,
    /// Reported transition.
    pub state: GestureState,
    /// Center of the participating touches.
    pub position: Point,
    /// Swipe velocity in px/s, zoom scale, or rotation in radians.
    pub amount_x: f64,
    /// Vertical swipe velocity, or the zoom scale again.
    pub amount_y: f64,
}

#[derive(Clone, Debug)]
enum Detail {
    Swipe {
        last_point: Point,
        last_time: u64,
        velocity: Vec2,
        history: SmallVec<[Point; SWIPE_HISTORY]>,
        history_index: usize,
    },
    Zoom {
        initial_distance: f64,
        center: Point,
        amount: f64,
    },
    Rotate {
        initial_angle: f64,
    },
    LongPress,
    SingleTap,
    DoubleTap {
        taps: u8,
    },
}

#[derive(Clone, Debug)]
struct Recognizer<G> {
    gesture: G,
    kind: GestureType,
    gesture_touches: SmallVec<[TouchId; 4]>,
    touches: SmallVec<[TouchSample; 2]>,
    internal: GestureState,
    external: GestureState,
    minimum_time: u64,
    started: u64,
    detail: Detail,
}

fn center_of(touches: &[TouchSample]) -> Point {
    match touches {
        [] => Point::ZERO,
        [only] => only.position,
        _ => {
            let sum = touches
                .iter()
                .fold(Vec2::ZERO, |acc, t| acc + t.position.to_vec2());
            (sum / touches.len() as f64).to_point()
        }
    }
}

fn distance(a: &TouchSample, b: &TouchSample) -> f64 {
    (a.position - b.position).length()
}

fn angle(a: &TouchSample, b: &TouchSample) -> f64 {
    let d = a.position - b.position;
    if d == Vec2::ZERO { 0.0 } else { d.atan2() }
}

fn abs(v: f64) -> f64 {
    v.max(-v)
}

fn holds(touches: &[TouchSample], id: TouchId) -> bool {
    touches.iter().any(|t| t.id == id)
}

fn promote(internal: &mut GestureState, external: GestureState) {
    if *internal == GestureState::Begin && external == GestureState::Begin {
        *internal = GestureState::Changed;
    }
}

impl<G: Copy> Recognizer<G> {
    fn new(gesture: G, kind: GestureType, touches: &[TouchId], long_press_delay: u64) -> Option<Self> {
        let (detail, minimum_time) = match kind {
            GestureType::Swipe => (
                Detail::Swipe {
                    last_point: Point::ZERO,
                    last_time: 0,
                    velocity: Vec2::ZERO,
                    history: SmallVec::new(),
                    history_index: 0,
                },
                0,
            ),
            GestureType::Zoom => (
                Detail::Zoom {
                    initial_distance: 0.0,
                    center: Point::ZERO,
                    amount: 1.0,
                },
                0,
            ),
            GestureType::Rotate => (Detail::Rotate { initial_angle: 0.0 }, 0),
            GestureType::LongPress => (Detail::LongPress, long_press_delay),
            GestureType::SingleTap => (Detail::SingleTap, SINGLE_TAP_MIN_TIME),
            GestureType::DoubleTap => (Detail::DoubleTap { taps: 0 }, 0),
            GestureType::PenPrimary => return None,
        };
        Some(Self {
            gesture,
            kind,
            gesture_touches: touches.iter().copied().collect(),
            touches: SmallVec::new(),
            internal: GestureState::Possible,
            external: GestureState::Possible,
            minimum_time,
            started: 0,
            detail,
        })
    }

    fn replace_touch(&mut self, sample: TouchSample) -> bool {
        match self.touches.iter_mut().find(|t| t.id == sample.id) {
            Some(t) => {
                *t = sample;
                true
            }
            None => false,
        }
    }

    fn drop_touch(&mut self, id: TouchId) -> bool {
        let before = self.touches.len();
        self.touches.retain(|t| t.id != id);
        self.touches.len() != before
    }

    fn set_external(&mut self, state: GestureState) {
        self.external = state;
        self.internal = state;
    }

    fn minimum_time_elapsed(&self, now: u64) -> bool {
        now.saturating_sub(self.started) > self.minimum_time
    }

    fn add_touch(&mut self, sample: TouchSample) -> bool {
        let idle = self.touches.is_empty() && self.internal == GestureState::Possible;
        match &mut self.detail {
            Detail::Swipe {
                last_point,
                last_time,
                velocity,
                history,
                history_index,
            } => {
                if !idle {
                    return false;
                }
                *last_point = sample.position;
                *last_time = sample.time;
                *velocity = Vec2::ZERO;
                history.clear();
                *history_index = 0;
                self.touches.push(sample);
                true
            }
            Detail::Zoom {
                initial_distance,
                center,
                amount,
            } => {
                let mut added = false;
                if self.touches.len() < 2 {
                    if !holds(&self.touches, sample.id) {
                        self.touches.push(sample);
                        added = true;
                    }
                    *center = center_of(&self.touches);
                    *amount = 1.0;
                }
                if let [a, b] = self.touches.as_slice() {
                    *initial_distance = distance(a, b);
                }
                added
            }
            Detail::Rotate { initial_angle } => {
                let mut added = false;
                if self.touches.len() < 2 && !holds(&self.touches, sample.id) {
                    self.touches.push(sample);
                    added = true;
                }
                if let [a, b] = self.touches.as_slice() {
                    *initial_angle = angle(a, b);
                    self.internal = GestureState::Begin;
                    self.started = sample.time;
                }
                added
            }
            Detail::LongPress | Detail::SingleTap => {
                if !idle {
                    return false;
                }
                self.touches.push(sample);
                self.internal = GestureState::Begin;
                self.started = sample.time;
                true
            }
            Detail::DoubleTap { taps } => {
                if self.internal != GestureState::Possible {
                    return false;
                }
                if self.touches.is_empty() {
                    *taps = 1;
                    self.started = sample.time;
                    self.touches.push(sample);
                    return true;
                }
                if self.touches.len() == 1
                    && sample.time.saturating_sub(self.started) <= MAX_DOUBLE_TAP_TIME
                {
                    let diff = sample.position - self.touches[0].position;
                    if abs(diff.x).max(abs(diff.y)) <= MAX_DOUBLE_TAP_DISTANCE {
                        *taps += 1;
                        self.touches.push(sample);
                        return true;
                    }
                }
                // Too late or too far away.
                self.internal = GestureState::Failed;
                false
            }
        }
    }

    fn change_touch(&mut self, sample: TouchSample) -> bool {
        if matches!(self.detail, Detail::DoubleTap { .. }) || !self.replace_touch(sample) {
            return false;
        }
        let touch_count = self.touches.len();
        match &mut self.detail {
            Detail::Swipe {
                last_point,
                last_time,
                velocity,
                history,
                history_index,
            } => {
                if self.internal == GestureState::Possible {
                    let moved = sample.position - *last_point;
                    if abs(moved.x) > SWIPE_MARGIN || abs(moved.y) > SWIPE_MARGIN {
                        self.internal = GestureState::Begin;
                        self.started = sample.time;
                    }
                } else if self.internal == GestureState::Begin && self.external == GestureState::Begin {
                    self.internal = GestureState::Changed;
                }
                if self.internal != GestureState::Possible {
                    let dt = sample.time.saturating_sub(*last_time);
                    let dp = sample.position - *last_point;
                    if dt != 0 {
                        *velocity = dp * (1000.0 / dt as f64);
                        if abs(dp.x) < 1.0 {
                            velocity.x = 0.0;
                        }
                        if abs(dp.y) < 1.0 {
                            velocity.y = 0.0;
                        }
                    }
                    if history.len() == SWIPE_HISTORY {
                        if *history_index >= SWIPE_HISTORY {
                            *history_index = 0;
                        }
                        history[*history_index] = sample.position;
                        *history_index += 1;
                    } else {
                        history.push(sample.position);
                    }
                    *last_point = sample.position;
                    *last_time = sample.time;
                }
            }
            Detail::Zoom { initial_distance, .. } => {
                if touch_count == 2 && self.internal == GestureState::Possible && *initial_distance != 0.0 {
                    let d = distance(&self.touches[0], &self.touches[1]);
                    if abs(1.0 - d / *initial_distance) > ZOOM_MARGIN {
                        self.internal = GestureState::Begin;
                        self.started = sample.time;
                    }
                }
                promote(&mut self.internal, self.external);
            }
            Detail::Rotate { initial_angle } => {
                if touch_count == 2 && self.internal == GestureState::Possible {
                    let a = angle(&self.touches[0], &self.touches[1]);
                    if abs(a - *initial_angle) > ROTATE_MARGIN {
                        self.internal = GestureState::Begin;
                        self.started = sample.time;
                    }
                }
                promote(&mut self.internal, self.external);
            }
            Detail::LongPress | Detail::SingleTap => promote(&mut self.internal, self.external),
            Detail::DoubleTap { .. } => {}
        }
        true
    }

    fn remove_touch(&mut self, sample: TouchSample) -> bool {
        if self.kind.is_multi_touch() {
            let removed = self.drop_touch(sample.id);
            if removed && self.touches.len() == 1 {
                match &mut self.detail {
                    Detail::Zoom { initial_distance, .. } => *initial_distance = 0.0,
                    Detail::Rotate { initial_angle } => *initial_angle = 0.0,
                    _ => {}
                }
                self.started = 0;
                if self.external != GestureState::Possible {
                    self.internal = GestureState::End;
                }
            }
            return removed;
        }
        let known = holds(&self.touches, sample.id);
        match &mut self.detail {
            // The swipe keeps its last sample so the final report still has a center.
            Detail::Swipe {
                last_point,
                last_time,
                velocity,
                history,
                ..
            } => {
                if !known {
                    return false;
                }
                self.internal = if self.external != GestureState::Possible {
                    GestureState::End
                } else {
                    GestureState::Failed
                };
                let moved_x = history
                    .iter()
                    .any(|p| abs(sample.position.x - p.x) > SWIPE_REST_TOLERANCE);
                let moved_y = history
                    .iter()
                    .any(|p| abs(sample.position.y - p.y) > SWIPE_REST_TOLERANCE);
                if !moved_x {
                    velocity.x = 0.0;
                }
                if !moved_y {
                    velocity.y = 0.0;
                }
                *last_point = Point::ZERO;
                *last_time = 0;
                self.started = 0;
                true
            }
            Detail::Zoom { .. } | Detail::Rotate { .. } => false,
            Detail::LongPress => {
                if known && self.external != GestureState::Possible {
                    self.internal = GestureState::End;
                }
                known
            }
            Detail::SingleTap => {
                if known {
                    self.internal = GestureState::End;
                }
                known
            }
            Detail::DoubleTap { taps } => {
                if *taps == 2 && known {
                    self.internal = GestureState::Begin;
                    return true;
                }
                false
            }
        }
    }

    fn report(&mut self, state: GestureState) -> Recognized<G> {
        let center = center_of(&self.touches);
        let (position, amount_x, amount_y) = match &mut self.detail {
            Detail::Swipe { velocity, .. } => (center, velocity.x, velocity.y),
            Detail::Zoom {
                initial_distance,
                center: last_center,
                amount,
            } => {
                // Once a finger lifts, the last computed values are reported.
                if let [a, b] = self.touches.as_slice() {
                    if *initial_distance != 0.0 {
                        *last_center = center;
                        *amount = distance(a, b) / *initial_distance;
                    }
                }
                (*last_center, *amount, *amount)
            }
            Detail::Rotate { initial_angle } => match self.touches.as_slice() {
                [a, b] => (center, angle(a, b) - *initial_angle, 1.0),
                _ => (center, 1.0, 1.0),
            },
            Detail::LongPress | Detail::SingleTap | Detail::DoubleTap { .. } => (center, 1.0, 1.0),
        };
        Recognized {
            gesture: self.gesture,
            kind: self.kind,
            state,
            position,
            amount_x,
            amount_y,
        }
    }
}

/// A pool of recognizers keyed by gesture id.
///
/// `G` is whatever the caller uses to identify gestures; it only needs to be `Copy + Eq`.
#[derive(Clone, Debug)]
pub struct GestureRecognition<G> {
    recognizers: Vec<Recognizer<G>>,
    touches: SmallVec<[TouchSample; 4]>,
    long_press_delay: u64,
}

impl<G: Copy + Eq> Default for GestureRecognition<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Copy + Eq> GestureRecognition<G> {
    /// Create an empty pool with the default long-press delay.
    pub fn new() -> Self {
        Self {
            recognizers: Vec::new(),
            touches: SmallVec::new(),
            long_press_delay: DEFAULT_LONG_PRESS_DELAY,
        }
    }

    /// Set the hold time for long presses started from now on.
    pub fn set_long_press_delay(&mut self, delay_ms: u64) {
        self.long_press_delay = delay_ms;
    }

    /// Start watching `gesture` over `touches`.
    ///
    /// Starting a gesture twice is a no-op, as is starting a kind without a recognizer
    /// ([`GestureType::PenPrimary`]).
    pub fn start(&mut self, gesture: G, kind: GestureType, touches: &[TouchId]) {
        if self.is_recognizing(gesture) {
            return;
        }
        if let Some(r) = Recognizer::new(gesture, kind, touches, self.long_press_delay) {
            tracing::trace!(target: "understory_gesture::recognition", ?kind, "start recognizing");
            self.recognizers.push(r);
        }
    }

    /// Stop watching `gesture`. Unknown gestures are ignored.
    pub fn stop(&mut self, gesture: G) {
        if let Some(i) = self.recognizers.iter().position(|r| r.gesture == gesture) {
            let r = self.recognizers.remove(i);
            tracing::trace!(target: "understory_gesture::recognition", kind = ?r.kind, "stop recognizing");
        }
    }

    /// Returns `true` while a recognizer for `gesture` is attached.
    pub fn is_recognizing(&self, gesture: G) -> bool {
        self.recognizers.iter().any(|r| r.gesture == gesture)
    }

    /// Replace the set of touches that belong to `gesture`.
    pub fn set_touches(&mut self, gesture: G, touches: &[TouchId]) {
        if let Some(r) = self.recognizers.iter_mut().find(|r| r.gesture == gesture) {
            r.gesture_touches = touches.iter().copied().collect();
        }
    }

    /// Number of attached recognizers.
    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    /// Returns `true` if nothing is being recognized.
    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    /// Feed a press.
    pub fn touch_began(&mut self, sample: TouchSample, out: &mut Vec<Recognized<G>>) {
        for r in &mut self.recognizers {
            r.add_touch(sample);
        }
        if !self.touches.iter().any(|t| t.id == sample.id) {
            self.touches.push(sample);
        }
        self.idle(sample.time, out);
    }

    /// Feed a move. Gestures already past `Begin` report `Changed` right away.
    pub fn touch_changed(&mut self, sample: TouchSample, out: &mut Vec<Recognized<G>>) {
        for r in &mut self.recognizers {
            r.change_touch(sample);
        }
        for t in &mut self.touches {
            if t.id == sample.id {
                *t = sample;
            }
        }
        for r in &mut self.recognizers {
            if r.gesture_touches.contains(&sample.id) && r.internal == GestureState::Changed {
                r.set_external(GestureState::Changed);
                out.push(r.report(GestureState::Changed));
            }
        }
    }

    /// Feed a release.
    pub fn touch_ended(&mut self, sample: TouchSample, out: &mut Vec<Recognized<G>>) {
        for r in &mut self.recognizers {
            r.remove_touch(sample);
        }
        self.touches.retain(|t| t.id != sample.id);
        self.idle(sample.time, out);
    }

    /// Report at most one pending transition as of `now`.
    pub fn idle(&mut self, now: u64, out: &mut Vec<Recognized<G>>) {
        let watching = |kind: GestureType| self.recognizers.iter().any(|r| r.kind == kind);
        let swipe = watching(GestureType::Swipe);
        let zoom = watching(GestureType::Zoom);
        let rotate = watching(GestureType::Rotate);
        let long_press = watching(GestureType::LongPress);
        let double_tap = self
            .recognizers
            .iter()
            .any(|r| r.kind == GestureType::DoubleTap && r.internal != GestureState::Failed);
        let multi_touch = self.touches.len() > 1;

        for i in 0..self.recognizers.len() {
            let r = &mut self.recognizers[i];
            let kind = r.kind;
            let ignore_timing =
                kind == GestureType::SingleTap && !(swipe || zoom || rotate || long_press || double_tap);

            if !kind.is_continuous() && r.internal == GestureState::Changed {
                r.set_external(GestureState::Possible);
                out.push(r.report(GestureState::End));
                return;
            }

            if r.internal == GestureState::Begin && (ignore_timing || r.minimum_time_elapsed(now)) {
                if kind == GestureType::SingleTap && long_press {
                    continue;
                }
                if matches!(kind, GestureType::Swipe | GestureType::LongPress) && zoom && multi_touch {
                    continue;
                }
                r.set_external(if kind.is_continuous() {
                    GestureState::Changed
                } else {
                    GestureState::End
                });
                out.push(r.report(GestureState::Begin));
                tracing::trace!(target: "understory_gesture::recognition", ?kind, "recognized");
                return;
            }

            if r.internal == GestureState::End {
                if kind == GestureType::SingleTap && r.external == GestureState::Possible {
                    if !double_tap || now.saturating_sub(r.started) > MAX_DOUBLE_TAP_TIME {
                        let gesture = r.gesture;
                        // A released tap cancels any long press still waiting.
                        if let Some(lp) = self
                            .recognizers
                            .iter()
                            .position(|x| x.kind == GestureType::LongPress)
                        {
                            self.recognizers.remove(lp);
                        }
                        if let Some(r) = self.recognizers.iter_mut().find(|x| x.gesture == gesture) {
                            r.set_external(GestureState::Changed);
                            out.push(r.report(GestureState::Begin));
                        }
                        return;
                    }
                } else if r.external != GestureState::End {
                    r.set_external(GestureState::Possible);
                    out.push(r.report(GestureState::End));
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample(id: u64, x: f64, y: f64, time: u64) -> TouchSample {
        TouchSample::new(TouchId(id), Point::new(x, y), time)
    }

    fn states(out: &[Recognized<u32>]) -> Vec<(GestureType, GestureState)> {
        out.iter().map(|r| (r.kind, r.state)).collect()
    }

    #[test]
    fn lone_single_tap_fires_on_press() {
        let mut rec = GestureRecognition::new();
        rec.start(1_u32, GestureType::SingleTap, &[TouchId(1)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 5.0, 5.0, 0), &mut out);
        assert_eq!(states(&out), vec![(GestureType::SingleTap, GestureState::Begin)]);
        out.clear();
        rec.touch_ended(sample(1, 5.0, 5.0, 40), &mut out);
        rec.idle(60, &mut out);
        assert!(out.is_empty(), "a tap reports once: {out:?}");
    }

    #[test]
    fn single_tap_waits_for_release_when_long_press_competes() {
        let mut rec = GestureRecognition::new();
        rec.start(1_u32, GestureType::SingleTap, &[TouchId(1)]);
        rec.start(2, GestureType::LongPress, &[TouchId(1)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 5.0, 5.0, 0), &mut out);
        rec.idle(300, &mut out);
        assert!(out.is_empty(), "nothing before release or timeout: {out:?}");

        rec.touch_ended(sample(1, 5.0, 5.0, 350), &mut out);
        assert_eq!(states(&out), vec![(GestureType::SingleTap, GestureState::Begin)]);
        assert!(!rec.is_recognizing(2), "the long press is cancelled by the tap");

        out.clear();
        rec.idle(360, &mut out);
        assert_eq!(states(&out), vec![(GestureType::SingleTap, GestureState::End)]);
    }

    #[test]
    fn long_press_after_delay_then_end() {
        let mut rec = GestureRecognition::new();
        rec.set_long_press_delay(400);
        rec.start(3_u32, GestureType::LongPress, &[TouchId(1)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 0.0, 0.0, 100), &mut out);
        rec.idle(500, &mut out);
        assert!(out.is_empty(), "exactly the delay is not enough");
        rec.idle(501, &mut out);
        assert_eq!(states(&out), vec![(GestureType::LongPress, GestureState::Begin)]);
        out.clear();
        rec.touch_ended(sample(1, 0.0, 0.0, 900), &mut out);
        assert_eq!(states(&out), vec![(GestureType::LongPress, GestureState::End)]);
    }

    #[test]
    fn swipe_reports_velocity() {
        let mut rec = GestureRecognition::new();
        rec.start(4_u32, GestureType::Swipe, &[TouchId(1)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 0.0, 0.0, 0), &mut out);
        rec.touch_changed(sample(1, 5.0, 0.0, 10), &mut out);
        rec.touch_changed(sample(1, 20.0, 0.0, 20), &mut out);
        assert!(out.is_empty(), "begin is only reported from idle");
        rec.idle(21, &mut out);
        assert_eq!(states(&out), vec![(GestureType::Swipe, GestureState::Begin)]);

        out.clear();
        rec.touch_changed(sample(1, 30.0, 0.0, 30), &mut out);
        assert_eq!(states(&out), vec![(GestureType::Swipe, GestureState::Changed)]);
        assert_eq!(out[0].amount_x, 1000.0);
        assert_eq!(out[0].amount_y, 0.0);
        assert_eq!(out[0].position, Point::new(30.0, 0.0));

        out.clear();
        rec.touch_ended(sample(1, 40.0, 0.0, 40), &mut out);
        assert_eq!(states(&out), vec![(GestureType::Swipe, GestureState::End)]);
    }

    #[test]
    fn swipe_never_reported_fails_silently() {
        let mut rec = GestureRecognition::new();
        rec.start(4_u32, GestureType::Swipe, &[TouchId(1)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 0.0, 0.0, 0), &mut out);
        rec.touch_changed(sample(1, 3.0, 2.0, 10), &mut out);
        rec.touch_ended(sample(1, 3.0, 2.0, 20), &mut out);
        rec.idle(30, &mut out);
        assert!(out.is_empty(), "{out:?}");
    }

    #[test]
    fn double_tap_needs_two_close_presses() {
        let mut rec = GestureRecognition::new();
        rec.start(5_u32, GestureType::DoubleTap, &[TouchId(1)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 10.0, 10.0, 0), &mut out);
        rec.touch_ended(sample(1, 10.0, 10.0, 60), &mut out);
        assert!(out.is_empty());
        rec.touch_began(sample(2, 14.0, 8.0, 200), &mut out);
        assert!(out.is_empty());
        rec.touch_ended(sample(2, 14.0, 8.0, 250), &mut out);
        assert_eq!(states(&out), vec![(GestureType::DoubleTap, GestureState::Begin)]);
    }

    #[test]
    fn double_tap_fails_when_too_slow() {
        let mut rec = GestureRecognition::new();
        rec.start(5_u32, GestureType::DoubleTap, &[TouchId(1)]);
        rec.start(6, GestureType::SingleTap, &[TouchId(1)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 10.0, 10.0, 0), &mut out);
        rec.touch_ended(sample(1, 10.0, 10.0, 50), &mut out);
        assert!(out.is_empty(), "the tap waits for a possible second press");
        rec.touch_began(sample(2, 10.0, 10.0, 800), &mut out);
        // The late press fails the double tap, which releases the pending single tap.
        assert_eq!(states(&out), vec![(GestureType::SingleTap, GestureState::Begin)]);
    }

    #[test]
    fn zoom_scales_with_finger_distance() {
        let mut rec = GestureRecognition::new();
        rec.start(7_u32, GestureType::Zoom, &[TouchId(1), TouchId(2)]);
        let mut out = Vec::new();
        rec.touch_began(sample(1, 0.0, 0.0, 0), &mut out);
        rec.touch_began(sample(2, 100.0, 0.0, 5), &mut out);
        rec.touch_changed(sample(2, 102.0, 0.0, 10), &mut out);
        rec.idle(20, &mut out);
        assert!(out.is_empty(), "inside the margin");
        rec.touch_changed(sample(2, 150.0, 0.0, 30), &mut out);
        rec.idle(40, &mut out);
        assert_eq!(states(&out), vec![(GestureType::Zoom, GestureState::Begin)]);
        assert_eq!(out[0].amount_x, 1.5);
        assert_eq!(out[0].position, Point::new(75.0, 0.0));

        out.clear();
        rec.touch_ended(sample(2, 150.0, 0.0, 50), &mut out);
        assert_eq!(states(&out), vec![(GestureType::Zoom, GestureState::End)]);
        assert_eq!(out[0].amount_x, 1.5, "end keeps the last scale");
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut rec = GestureRecognition::new();
        rec.start(1_u32, GestureType::Swipe, &[]);
        rec.start(1, GestureType::Swipe, &[]);
        rec.start(2, GestureType::PenPrimary, &[]);
        assert_eq!(rec.len(), 1);
        assert!(!rec.is_recognizing(2));
        rec.stop(1);
        rec.stop(1);
        assert!(rec.is_empty());
    }
}

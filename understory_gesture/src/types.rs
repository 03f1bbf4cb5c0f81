// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture vocabulary shared by arbitration, recognition, and dispatch.

use kurbo::Point;

/// Identifier of one physical contact, stable from press (or hover enter) to release.
///
/// The value is platform supplied and opaque to this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TouchId(pub u64);

/// Kind of gesture a handler can ask for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GestureType {
    /// One finger moving; pans and flings.
    Swipe,
    /// Two fingers pinching.
    Zoom,
    /// Two fingers twisting.
    Rotate,
    /// One finger held in place.
    LongPress,
    /// One short press.
    SingleTap,
    /// Two short presses in quick succession.
    DoubleTap,
    /// Pen barrel button pressed while the pen is in range.
    PenPrimary,
}

impl GestureType {
    /// Continuous gestures report `Begin`, any number of `Changed`, then `End`.
    ///
    /// Non-continuous ones report a single `Begin` followed by `End`.
    pub const fn is_continuous(self) -> bool {
        matches!(self, Self::Swipe | Self::Zoom | Self::Rotate | Self::LongPress)
    }

    /// Returns `true` for [`SingleTap`](Self::SingleTap) and [`DoubleTap`](Self::DoubleTap).
    pub const fn is_tap(self) -> bool {
        matches!(self, Self::SingleTap | Self::DoubleTap)
    }

    /// Gestures that only make sense with two contacts.
    pub const fn is_multi_touch(self) -> bool {
        matches!(self, Self::Zoom | Self::Rotate)
    }
}

/// Recognition state of a gesture.
///
/// The order is meaningful: everything below [`End`](Self::End) is still in flight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GestureState {
    /// Not recognized yet; used for early feedback events.
    Possible,
    /// Recognized.
    Begin,
    /// Recognized and updating.
    Changed,
    /// Finished normally.
    End,
    /// Gave up.
    Failed,
}

bitflags::bitflags! {
    /// Direction constraints on a requested gesture.
    ///
    /// An empty set is the plain, unconstrained gesture.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Constraints: u8 {
        /// Only motion that is more horizontal than vertical.
        const HORIZONTAL = 0b0000_0001;
        /// Only motion that is more vertical than horizontal.
        const VERTICAL   = 0b0000_0010;
    }
}

impl Constraints {
    /// Returns `true` if motion by `(dx, dy)` satisfies these constraints.
    ///
    /// Exact diagonals satisfy neither direction. Both directions together accept any motion.
    pub fn matches(self, dx: f64, dy: f64) -> bool {
        if self.contains(Self::HORIZONTAL | Self::VERTICAL) {
            return true;
        }
        let (ax, ay) = (dx.max(-dx), dy.max(-dy));
        if self.contains(Self::HORIZONTAL) {
            ax > ay
        } else if self.contains(Self::VERTICAL) {
            ay > ax
        } else {
            true
        }
    }
}

bitflags::bitflags! {
    /// Side effects attached to a gesture request.
    ///
    /// These are peeled off during negotiation and applied to the gesture or contact;
    /// they never take part in arbitration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RequestFlags: u8 {
        /// The gesture owns its touches; a swipe marked this way turns into a zoom
        /// when a second finger lands.
        const EXCLUSIVE_TOUCH       = 0b0000_0001;
        /// The contact never opens a long-press context menu.
        const SUPPRESS_CONTEXT_MENU = 0b0000_0010;
    }
}

bitflags::bitflags! {
    /// Modifier and button state carried on input events.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyState: u16 {
        /// Shift held.
        const SHIFT      = 1 << 0;
        /// Command (or Control on non-Apple platforms) held.
        const COMMAND    = 1 << 1;
        /// Option / Alt held.
        const OPTION     = 1 << 2;
        /// Control held.
        const CONTROL    = 1 << 3;
        /// Primary button down.
        const LBUTTON    = 1 << 4;
        /// Secondary button down.
        const RBUTTON    = 1 << 5;
        /// Middle button down.
        const MBUTTON    = 1 << 6;
        /// Pen barrel button down.
        const PEN_BARREL = 1 << 7;
        /// Pen eraser end in use.
        const PEN_ERASER = 1 << 8;
    }
}

/// Arbitration priority. Higher wins.
///
/// The named levels cover the common cases, but any value is allowed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Fallbacks that should lose to anything else.
    pub const LOW: Self = Self(0);
    /// The default.
    pub const NORMAL: Self = Self(1);
    /// A control's primary axis.
    pub const HIGH: Self = Self(2);
    /// Handlers that must beat regular controls.
    pub const HIGHEST: Self = Self(3);
    /// Reserved for overlays that claim everything.
    pub const ULTIMATE: Self = Self(4);
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// A gesture a handler needs in order to act.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GestureRequest {
    /// Requested kind.
    pub kind: GestureType,
    /// Direction constraints; empty for the plain gesture.
    pub constraints: Constraints,
    /// Side effects applied on registration.
    pub flags: RequestFlags,
    /// Arbitration priority against other handlers asking for the same kind.
    pub priority: Priority,
}

impl GestureRequest {
    /// A plain request at [`Priority::NORMAL`].
    pub const fn new(kind: GestureType) -> Self {
        Self {
            kind,
            constraints: Constraints::empty(),
            flags: RequestFlags::empty(),
            priority: Priority::NORMAL,
        }
    }

    /// Restrict to horizontal motion.
    #[must_use]
    pub const fn horizontal(mut self) -> Self {
        self.constraints = Constraints::HORIZONTAL;
        self
    }

    /// Restrict to vertical motion.
    #[must_use]
    pub const fn vertical(mut self) -> Self {
        self.constraints = Constraints::VERTICAL;
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Add side-effect flags.
    #[must_use]
    pub const fn flags(mut self, flags: RequestFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }
}

/// A gesture transition delivered to handlers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureEvent {
    /// Gesture kind.
    pub kind: GestureType,
    /// Transition.
    pub state: GestureState,
    /// Gesture center in window coordinates.
    pub position: Point,
    /// Horizontal amount: velocity for swipes, scale for zoom, radians for rotate.
    pub amount_x: f64,
    /// Vertical amount; see [`amount_x`](Self::amount_x).
    pub amount_y: f64,
    /// Modifier state at the time of the transition.
    pub keys: KeyState,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl GestureEvent {
    /// Create an event with neutral amounts of `1.0`.
    pub fn new(kind: GestureType, state: GestureState, position: Point) -> Self {
        Self {
            kind,
            state,
            position,
            amount_x: 1.0,
            amount_y: 1.0,
            keys: KeyState::empty(),
            time: 0,
        }
    }

    /// Returns a copy with a different state.
    #[must_use]
    pub fn with_state(mut self, state: GestureState) -> Self {
        self.state = state;
        self
    }

    /// Returns `true` if both events would look identical to a handler.
    ///
    /// Timestamps are ignored.
    pub fn is_same_as(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.state == other.state
            && self.position == other.position
            && self.keys == other.keys
            && self.amount_x == other.amount_x
            && self.amount_y == other.amount_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraints_match_dominant_axis() {
        assert!(Constraints::HORIZONTAL.matches(-5.0, 2.0));
        assert!(!Constraints::HORIZONTAL.matches(2.0, -5.0));
        assert!(Constraints::VERTICAL.matches(0.5, -3.0));
        assert!(Constraints::empty().matches(0.0, 0.0));
        // Diagonals belong to neither direction.
        assert!(!Constraints::HORIZONTAL.matches(3.0, 3.0));
        assert!(!Constraints::VERTICAL.matches(3.0, -3.0));
    }

    #[test]
    fn both_directions_match_anything() {
        let both = Constraints::HORIZONTAL | Constraints::VERTICAL;
        assert!(both.matches(3.0, 3.0));
        assert!(both.matches(-5.0, 1.0));
        assert!(both.matches(0.0, 4.0));
    }

    #[test]
    fn request_builder_accumulates() {
        let r = GestureRequest::new(GestureType::Swipe)
            .vertical()
            .priority(Priority::HIGH)
            .flags(RequestFlags::EXCLUSIVE_TOUCH)
            .flags(RequestFlags::SUPPRESS_CONTEXT_MENU);
        assert_eq!(r.constraints, Constraints::VERTICAL);
        assert_eq!(r.priority, Priority::HIGH);
        assert_eq!(r.flags, RequestFlags::all());
    }

    #[test]
    fn same_event_ignores_time() {
        let mut a = GestureEvent::new(GestureType::Swipe, GestureState::Changed, Point::new(1.0, 2.0));
        let mut b = a;
        a.time = 10;
        b.time = 20;
        assert!(a.is_same_as(&b));
        b.amount_y = 0.5;
        assert!(!a.is_same_as(&b));
    }

    #[test]
    fn states_are_ordered() {
        assert!(GestureState::Changed < GestureState::End);
        assert!(GestureState::Possible < GestureState::Begin);
        assert!(GestureState::End < GestureState::Failed);
    }
}

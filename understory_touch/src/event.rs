// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inbound touch events and the synthetic mouse events used for legacy handlers.

use kurbo::Point;
use smallvec::SmallVec;
use understory_gesture::{KeyState, TouchId, TouchSample};

/// What happened to a contact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// Physical contact started.
    Begin,
    /// Contact moved.
    Move,
    /// Physical contact ended.
    End,
    /// A hovering pointer came into range.
    Enter,
    /// A hovering pointer moved.
    Hover,
    /// A hovering pointer went out of range.
    Leave,
    /// The platform took the contact away.
    Cancel,
}

impl TouchPhase {
    /// Returns `true` if the contact is over after this phase.
    pub const fn is_ending(self) -> bool {
        matches!(self, Self::End | Self::Leave | Self::Cancel)
    }

    /// Returns `true` for phases without physical contact.
    pub const fn is_hover(self) -> bool {
        matches!(self, Self::Enter | Self::Hover | Self::Leave)
    }
}

/// Device kind that produced an event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputDevice {
    /// Finger on a touch screen.
    #[default]
    Touch,
    /// Stylus.
    Pen,
    /// Mouse delivering touch-style events.
    Mouse,
}

/// Extra stylus data.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PenInfo {
    /// Normalized pressure in `0.0..=1.0`.
    pub pressure: f64,
    /// Tilt in degrees along x and y.
    pub tilt: (f64, f64),
}

/// One contact as reported by the platform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchInfo {
    /// Contact id.
    pub id: TouchId,
    /// Window position.
    pub position: Point,
    /// Timestamp in milliseconds.
    pub time: u64,
    /// Phase of this contact.
    pub phase: TouchPhase,
}

impl TouchInfo {
    /// Create a contact record.
    pub const fn new(id: TouchId, position: Point, time: u64, phase: TouchPhase) -> Self {
        Self {
            id,
            position,
            time,
            phase,
        }
    }

    /// Raw sample for gesture recognition.
    pub const fn sample(&self) -> TouchSample {
        TouchSample::new(self.id, self.position, self.time)
    }
}

/// Event-wide data accompanying single-contact deliveries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchEventData {
    /// Phase of the event.
    pub phase: TouchPhase,
    /// Modifier state.
    pub keys: KeyState,
    /// Producing device.
    pub device: InputDevice,
    /// Stylus data, if any.
    pub pen: Option<PenInfo>,
}

impl TouchEventData {
    /// Finger input with no modifiers.
    pub const fn new(phase: TouchPhase) -> Self {
        Self {
            phase,
            keys: KeyState::empty(),
            device: InputDevice::Touch,
            pen: None,
        }
    }
}

/// A touch event as seen by handlers.
///
/// Batch deliveries carry every active contact. When the event concerns one contact,
/// [`touch_id`](Self::touch_id) names it.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent {
    /// Phase of the event.
    pub phase: TouchPhase,
    /// All contacts in the snapshot.
    pub touches: SmallVec<[TouchInfo; 4]>,
    /// The contact this event is about, if any.
    pub touch_id: Option<TouchId>,
    /// Modifier state.
    pub keys: KeyState,
    /// Producing device.
    pub device: InputDevice,
    /// Stylus data, if any.
    pub pen: Option<PenInfo>,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl TouchEvent {
    /// A batch event over `touches`.
    ///
    /// The timestamp is the latest contact timestamp.
    pub fn batch(phase: TouchPhase, touches: impl IntoIterator<Item = TouchInfo>) -> Self {
        let touches: SmallVec<[TouchInfo; 4]> = touches.into_iter().collect();
        let time = touches.iter().map(|t| t.time).max().unwrap_or(0);
        Self {
            phase,
            touches,
            touch_id: None,
            keys: KeyState::empty(),
            device: InputDevice::Touch,
            pen: None,
            time,
        }
    }

    /// An event about a single contact.
    pub fn single(touch: TouchInfo, data: &TouchEventData) -> Self {
        let mut touches = SmallVec::new();
        touches.push(touch);
        Self {
            phase: data.phase,
            touches,
            touch_id: Some(touch.id),
            keys: data.keys,
            device: data.device,
            pen: data.pen,
            time: touch.time,
        }
    }

    /// Set modifier state.
    #[must_use]
    pub fn with_keys(mut self, keys: KeyState) -> Self {
        self.keys = keys;
        self
    }

    /// Set the producing device.
    #[must_use]
    pub fn with_device(mut self, device: InputDevice) -> Self {
        self.device = device;
        self
    }

    /// Look up a contact in the snapshot.
    pub fn touch(&self, id: TouchId) -> Option<&TouchInfo> {
        self.touches.iter().find(|t| t.id == id)
    }

    /// The contact this event is about.
    pub fn focused_touch(&self) -> Option<&TouchInfo> {
        self.touch_id.and_then(|id| self.touch(id))
    }

    /// A copy narrowed to one contact and phase.
    pub(crate) fn for_touch(&self, id: TouchId, phase: TouchPhase) -> Self {
        let mut event = self.clone();
        event.touch_id = Some(id);
        event.phase = phase;
        event
    }
}

/// Kind of a synthetic mouse event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Button pressed.
    Down,
    /// Pointer moved with the button held.
    Move,
    /// Button released.
    Up,
}

/// A mouse event synthesized from touch input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MouseEvent {
    /// Kind.
    pub kind: MouseEventKind,
    /// Position in the coordinates of the view that receives it.
    pub position: Point,
    /// Modifier and button state; always includes [`KeyState::LBUTTON`] while pressed.
    pub keys: KeyState,
    /// Timestamp in milliseconds.
    pub time: u64,
    /// Set by the receiver of a synthetic `Down` when it counts as a double click.
    pub double_clicked: bool,
}

impl MouseEvent {
    /// Create an event.
    pub fn new(kind: MouseEventKind, position: Point, keys: KeyState, time: u64) -> Self {
        let keys = match kind {
            MouseEventKind::Down | MouseEventKind::Move => keys | KeyState::LBUTTON,
            MouseEventKind::Up => keys,
        };
        Self {
            kind,
            position,
            keys,
            time,
            double_clicked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_classify() {
        assert!(TouchPhase::Leave.is_ending() && TouchPhase::Leave.is_hover());
        assert!(TouchPhase::Cancel.is_ending() && !TouchPhase::Cancel.is_hover());
        assert!(!TouchPhase::Move.is_ending() && !TouchPhase::Move.is_hover());
    }

    #[test]
    fn batch_takes_latest_time() {
        let e = TouchEvent::batch(
            TouchPhase::Move,
            [
                TouchInfo::new(TouchId(1), Point::ZERO, 30, TouchPhase::Move),
                TouchInfo::new(TouchId(2), Point::ZERO, 45, TouchPhase::Begin),
            ],
        );
        assert_eq!(e.time, 45);
        assert_eq!(e.touch(TouchId(2)).map(|t| t.phase), Some(TouchPhase::Begin));
        assert!(e.focused_touch().is_none());
        let one = e.for_touch(TouchId(1), TouchPhase::End);
        assert_eq!(one.focused_touch().map(|t| t.time), Some(30));
        assert_eq!(one.phase, TouchPhase::End);
    }

    #[test]
    fn pressed_mouse_events_carry_left_button() {
        let down = MouseEvent::new(MouseEventKind::Down, Point::ZERO, KeyState::SHIFT, 0);
        assert_eq!(down.keys, KeyState::SHIFT | KeyState::LBUTTON);
        let up = MouseEvent::new(MouseEventKind::Up, Point::ZERO, KeyState::empty(), 0);
        assert!(up.keys.is_empty());
    }
}

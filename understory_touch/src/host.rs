// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What the engine needs from the toolkit.
//!
//! The engine never owns views or windows. It reaches them through two capability traits:
//!
//! - [`ViewTree`]: the view hierarchy of one window, plus the factories that produce handlers
//!   for a view.
//! - [`WindowContext`]: window-level services such as popups, drag and drop, context menus,
//!   and notifications.
//!
//! [`TouchHost`] is implemented for anything that provides both.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt::Debug;

use kurbo::{Point, Rect};
use understory_gesture::{Constraints, GestureEvent, KeyState};

use crate::event::{MouseEvent, TouchEvent};
use crate::handler::{GestureSink, HandlerRef, MouseHandler, MouseSink};

/// The view hierarchy of one window.
///
/// Views are small copyable keys; the engine only stores them and compares them.
pub trait ViewTree {
    /// View key.
    type View: Copy + Eq + Debug;

    /// Root view of the window.
    fn root(&self) -> Self::View;

    /// Parent of `view`, `None` for the root.
    fn parent(&self, view: Self::View) -> Option<Self::View>;

    /// Number of children of `view`.
    fn child_count(&self, view: Self::View) -> usize;

    /// Child at `index`, in paint order (back to front).
    fn child(&self, view: Self::View, index: usize) -> Self::View;

    /// Frame of `view` in its parent's coordinates. The root's frame is in window coordinates.
    fn frame(&self, view: Self::View) -> Rect;

    /// Disabled views are skipped by hit testing.
    fn is_enabled(&self, view: Self::View) -> bool {
        let _ = view;
        true
    }

    /// Views that claim all touches inside them stop hit testing from descending.
    fn suppresses_child_touch(&self, view: Self::View) -> bool {
        let _ = view;
        false
    }

    /// Returns `false` once `view` has left the window.
    fn is_attached(&self, view: Self::View) -> bool;

    /// Touch handler offered by `view` for the contact in `event`.
    fn create_touch_handler(&mut self, view: Self::View, event: &TouchEvent) -> Option<HandlerRef>;

    /// Mouse handler offered by `view` for a synthetic mouse-down.
    ///
    /// The view may set [`MouseEvent::double_clicked`] to report that the press completed a
    /// double click it handled on its own.
    fn create_mouse_handler(
        &mut self,
        view: Self::View,
        event: &mut MouseEvent,
    ) -> Option<Box<dyn MouseHandler>> {
        let _ = (view, event);
        None
    }

    /// Raw mouse receiver for the root view, used when nothing else takes the contact.
    fn root_mouse_sink(&mut self) -> Option<Rc<dyn MouseSink>> {
        None
    }

    /// Receiver for double taps on controls that support double-tap-to-reset.
    fn double_tap_sink(&mut self, view: Self::View) -> Option<Rc<dyn GestureSink>> {
        let _ = view;
        None
    }

    /// Main axes of a control, used to rank swipes for mouse-driven controls.
    fn preferred_axes(&self, view: Self::View) -> Constraints {
        let _ = view;
        Constraints::empty()
    }

    /// Give keyboard focus to `view`.
    fn take_focus(&mut self, view: Self::View) {
        let _ = view;
    }

    /// Frame of `view` in window coordinates.
    fn window_rect(&self, view: Self::View) -> Rect {
        let mut rect = self.frame(view);
        let mut cursor = self.parent(view);
        while let Some(parent) = cursor {
            rect = rect + self.frame(parent).origin().to_vec2();
            cursor = self.parent(parent);
        }
        rect
    }

    /// Returns `true` if `view` is `ancestor` or one of its descendants.
    fn is_within(&self, ancestor: Self::View, view: Self::View) -> bool {
        let mut cursor = Some(view);
        while let Some(v) = cursor {
            if v == ancestor {
                return true;
            }
            cursor = self.parent(v);
        }
        false
    }
}

/// Kind of popup currently in front of the window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PopupKind {
    /// A modal dialog. Touches on the window are dropped while it is open.
    Dialog,
    /// A menu or selector that closes when touched outside.
    Popup,
}

/// An input event offered to a popup before the window sees it.
#[derive(Copy, Clone, Debug)]
pub enum ForeignEvent<'a> {
    /// Touch input.
    Touch(&'a TouchEvent),
    /// A resolved gesture.
    Gesture(&'a GestureEvent),
}

/// Snapshot of the running drag session.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragSessionInfo<V> {
    /// View the drag started from, if it belongs to this window.
    pub source: Option<V>,
    /// Current drag image position in window coordinates.
    pub position: Point,
    /// Returns `true` if releasing now would drop on a target.
    pub will_drop: bool,
}

/// What a gesture does to the running drag session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragStep {
    /// The drag started; show the drag image at the position.
    Update,
    /// The drag moved over the window.
    Over,
    /// The drag was released over a target.
    Drop,
    /// The drag left the window, either after a drop or because it was canceled.
    Leave {
        /// Returns `true` if the session was canceled rather than completed.
        canceled: bool,
    },
}

/// Window services used while resolving touches.
pub trait WindowContext<V> {
    /// Bounds of the whole virtual screen.
    fn screen_bounds(&self) -> Rect;

    /// Convert a window position to screen coordinates.
    fn window_to_screen(&self, point: Point) -> Point;

    /// Popup currently in front of this window, if any.
    fn other_popup(&self) -> Option<PopupKind> {
        None
    }

    /// Deactivate the popup in front of the window.
    fn deactivate_popup(&mut self) {}

    /// Offer `event` to the popup in front. Returns `true` if the popup consumed it.
    fn popup_swallows(&mut self, event: ForeignEvent<'_>) -> bool {
        let _ = event;
        false
    }

    /// Returns `true` while a text field is being edited anywhere in the application.
    fn is_editing(&self) -> bool {
        false
    }

    /// The running drag session, if any.
    fn active_drag(&self) -> Option<DragSessionInfo<V>> {
        None
    }

    /// Feed the running drag session.
    fn drag_step(&mut self, step: DragStep, position: Point, keys: KeyState) {
        let _ = (step, position, keys);
    }

    /// A gesture was delivered to the handler of `view`.
    fn gesture_processed(&mut self, event: &GestureEvent, view: Option<V>) {
        let _ = (event, view);
    }

    /// Open the context menu at a window position.
    fn popup_context_menu(&mut self, position: Point);

    /// Deliver a gesture to the root view directly. Returns `true` if handled.
    fn root_gesture(&mut self, event: &GestureEvent) -> bool {
        let _ = event;
        false
    }

    /// Move the logical mouse cursor to a screen position.
    fn set_last_mouse_position(&mut self, screen: Point) {
        let _ = screen;
    }
}

/// Everything the engine needs: a view tree plus its window services.
pub trait TouchHost: ViewTree + WindowContext<<Self as ViewTree>::View> {}

impl<T> TouchHost for T where T: ViewTree + WindowContext<<T as ViewTree>::View> {}

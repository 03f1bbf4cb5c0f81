// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_touch --heading-base-level=0

//! Understory Touch: touch dispatch and gesture resolution for view trees.
//!
//! ## Overview
//!
//! Every contact on the screen becomes a [`TouchItem`]. When it starts, the view tree is
//! hit-tested front to back and each view under the contact may offer a [`TouchHandler`].
//! Handlers that need gestures before they can act (a list wants vertical swipes, a slider
//! wants horizontal ones) register on per-kind [`Gesture`]s, where a
//! [`CandidateSet`](understory_gesture::CandidateSet) keeps one winner per swipe direction.
//! A [`GestureManager`] watches the raw contacts and reports transitions; the first
//! `Begin` of a gesture settles which handler owns the contacts.
//!
//! The engine guarantees that an accepted handler sees `begin` before any `trigger`, and
//! exactly one `finish` per `begin`, whether the contact ended, was canceled by the platform,
//! or was taken away because its view left the window.
//!
//! ## Hosts
//!
//! Views and windows stay in the toolkit. The engine reaches them through [`ViewTree`] and
//! [`WindowContext`], bundled as [`TouchHost`]. Every entry point of [`TouchInputState`] takes
//! the host as an argument, so the engine never holds references into the toolkit.
//!
//! Mouse-only controls are driven through [`MouseTouchHandler`], and the root view can fall
//! back to plain mouse events through [`RootTouchHandler`].
//!
//! ## Recognition
//!
//! [`BuiltinGestureManager`] is the portable recognizer pool from `understory_gesture`.
//! Platforms with native recognizers implement [`GestureManager`] over them instead.
//! [`TouchInputManager`] keeps one state per window and installs the builtin manager on a
//! window's first event if none was set.
//!
//! ```rust
//! use understory_touch::{Gesture, TouchConfig, TouchInputState};
//!
//! let mut state: TouchInputState<u32> =
//!     TouchInputState::with_config(TouchConfig::default().with_long_press_delay(650));
//! assert!(state.touches().is_empty());
//! assert!(!state.has_gesture_manager());
//! assert_eq!(state.config().long_press_delay_ms, 650);
//! let _: &[Gesture<u32>] = state.gestures();
//! ```
//!
//! ## Logging
//!
//! Decisions are reported through `tracing` under the `understory_touch::state`,
//! `understory_touch::deferred`, and `understory_touch::manager` targets.
//!
//! ## Features
//!
//! - `std` (default): enables `std` in dependencies.
//! - `libm`: `no_std` float math through `libm`.
//! - `serde`: `Serialize` and `Deserialize` for [`TouchConfig`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod deferred;
pub mod error;
pub mod event;
pub mod gesture;
pub mod handler;
pub mod host;
pub mod input_manager;
pub mod item;
pub mod manager;
pub mod state;

pub use config::{
    CONTEXT_MENU_DELAY_MS, CONTEXT_MENU_MAX_DISTANCE, CONTEXT_MENU_RETRY_MS, EDGE_BAND, EdgeBand,
    MOVE_RATE_LIMIT_MS, TouchConfig,
};
pub use deferred::DeferredCall;
pub use error::TouchError;
pub use event::{
    InputDevice, MouseEvent, MouseEventKind, PenInfo, TouchEvent, TouchEventData, TouchInfo,
    TouchPhase,
};
pub use gesture::{Gesture, GestureId, TouchIds};
pub use handler::{
    DoubleTapHandler, GestureSink, HandlerRef, MouseHandler, MouseSink, MouseTouchHandler,
    RootTouchHandler, TouchHandler,
};
pub use host::{
    DragSessionInfo, DragStep, ForeignEvent, PopupKind, TouchHost, ViewTree, WindowContext,
};
pub use input_manager::TouchInputManager;
pub use item::{ItemFlags, TouchCandidate, TouchItem};
pub use manager::{BuiltinGestureManager, GestureManager, GestureTarget, Recognition};
pub use state::TouchInputState;

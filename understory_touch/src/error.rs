// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the touch entry points.

use understory_gesture::TouchId;

/// Inconsistent input from the platform layer.
///
/// None of these leave the engine in a different state than before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TouchError {
    /// The window was never attached to the [`TouchInputManager`](crate::TouchInputManager).
    #[error("no touch input state is attached to this window")]
    UnknownWindow,
    /// An end or leave arrived for a contact that is not being tracked.
    #[error("touch {0:?} is not being tracked")]
    UnknownTouch(TouchId),
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables and fixed thresholds.

/// Hold time after which a released, motionless contact opens a context menu, in milliseconds.
pub const CONTEXT_MENU_DELAY_MS: u64 = 500;

/// Movement (per axis, in px) that rules out the long-press context menu.
pub const CONTEXT_MENU_MAX_DISTANCE: f64 = 5.0;

/// Retry delay for a context menu that was due while a drag was running, in milliseconds.
pub const CONTEXT_MENU_RETRY_MS: u64 = 100;

/// Handler moves closer together than this (with unchanged keys) are dropped, in milliseconds.
pub const MOVE_RATE_LIMIT_MS: u64 = 20;

/// Screen-edge band reserved for system gestures.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeBand {
    /// Left band width.
    pub left: f64,
    /// Top band height.
    pub top: f64,
    /// Right band width.
    pub right: f64,
    /// Bottom band height.
    pub bottom: f64,
}

/// Contacts starting inside this band are discarded.
pub const EDGE_BAND: EdgeBand = EdgeBand {
    left: 5.0,
    top: 0.0,
    right: 5.0,
    bottom: 5.0,
};

/// Process-wide touch behavior.
///
/// ```rust
/// use understory_touch::TouchConfig;
///
/// let config = TouchConfig::default().with_long_press_delay(650);
/// assert_eq!(config.long_press_delay_ms, 650);
/// assert!(config.long_press_context_menu);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TouchConfig {
    /// Hold time before a long press is recognized.
    pub long_press_delay_ms: u64,
    /// A long, motionless press opens the context menu on release.
    pub long_press_context_menu: bool,
    /// The pen barrel button sends a pen-primary gesture to the root.
    pub pen_barrel_gesture: bool,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            long_press_delay_ms: 500,
            long_press_context_menu: true,
            pen_barrel_gesture: true,
        }
    }
}

impl TouchConfig {
    /// Set [`long_press_delay_ms`](Self::long_press_delay_ms).
    #[must_use]
    pub fn with_long_press_delay(mut self, delay_ms: u64) -> Self {
        self.long_press_delay_ms = delay_ms;
        self
    }

    /// Set [`long_press_context_menu`](Self::long_press_context_menu).
    #[must_use]
    pub fn with_long_press_context_menu(mut self, enabled: bool) -> Self {
        self.long_press_context_menu = enabled;
        self
    }

    /// Set [`pen_barrel_gesture`](Self::pen_barrel_gesture).
    #[must_use]
    pub fn with_pen_barrel_gesture(mut self, enabled: bool) -> Self {
        self.pen_barrel_gesture = enabled;
        self
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-window touch states.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::config::TouchConfig;
use crate::error::TouchError;
use crate::event::TouchEvent;
use crate::host::TouchHost;
use crate::manager::{BuiltinGestureManager, GestureManager};
use crate::state::TouchInputState;

/// Owns one [`TouchInputState`] per window.
///
/// Windows are keyed by `W`, any copyable id the toolkit already has. A window without a
/// gesture manager gets a [`BuiltinGestureManager`] on its first event.
///
/// ```rust
/// use understory_touch::{TouchConfig, TouchInputManager};
///
/// let mut touch: TouchInputManager<u32, u32> = TouchInputManager::new(TouchConfig::default());
/// touch.attach(7);
/// assert!(touch.state(7).is_some());
/// assert!(touch.detach(7).is_some());
/// assert!(touch.state(7).is_none());
/// ```
pub struct TouchInputManager<W, V> {
    windows: HashMap<W, TouchInputState<V>>,
    config: TouchConfig,
}

impl<W: fmt::Debug, V> fmt::Debug for TouchInputManager<W, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchInputManager")
            .field("windows", &self.windows.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<W, V> TouchInputManager<W, V>
where
    W: Copy + Eq + Hash + fmt::Debug,
    V: Copy + Eq + fmt::Debug,
{
    /// Create a manager whose windows start with `config`.
    pub fn new(config: TouchConfig) -> Self {
        Self {
            windows: HashMap::new(),
            config,
        }
    }

    /// Shared configuration.
    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    /// Replace the configuration of every window.
    pub fn set_config(&mut self, config: TouchConfig) {
        self.config = config;
        for state in self.windows.values_mut() {
            state.set_config(config);
        }
    }

    /// Start tracking `window`. Attaching twice keeps the existing state.
    pub fn attach(&mut self, window: W) -> &mut TouchInputState<V> {
        let config = self.config;
        self.windows.entry(window).or_insert_with(|| {
            tracing::debug!(target: "understory_touch::manager", ?window, "attach window");
            TouchInputState::with_config(config)
        })
    }

    /// Stop tracking `window`, returning its state.
    pub fn detach(&mut self, window: W) -> Option<TouchInputState<V>> {
        let state = self.windows.remove(&window);
        if state.is_some() {
            tracing::debug!(target: "understory_touch::manager", ?window, "detach window");
        }
        state
    }

    /// State of `window`.
    pub fn state(&self, window: W) -> Option<&TouchInputState<V>> {
        self.windows.get(&window)
    }

    /// Mutable state of `window`.
    pub fn state_mut(&mut self, window: W) -> Option<&mut TouchInputState<V>> {
        self.windows.get_mut(&window)
    }

    /// Route a touch snapshot to the state of `window`.
    pub fn process_touches<H>(&mut self, window: W, host: &mut H, event: &TouchEvent) -> Result<(), TouchError>
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let Some(state) = self.windows.get_mut(&window) else {
            tracing::warn!(target: "understory_touch::manager", ?window, "touches for unknown window");
            return Err(TouchError::UnknownWindow);
        };
        if !state.has_gesture_manager() {
            state.set_gesture_manager(Some(Box::new(BuiltinGestureManager::new())));
        }
        state.process_touches(host, event);
        Ok(())
    }

    /// Install a platform gesture manager for `window`, returning the previous one.
    pub fn set_gesture_manager(
        &mut self,
        window: W,
        manager: Box<dyn GestureManager>,
    ) -> Result<Option<Box<dyn GestureManager>>, TouchError> {
        let state = self
            .windows
            .get_mut(&window)
            .ok_or(TouchError::UnknownWindow)?;
        Ok(state.set_gesture_manager(Some(manager)))
    }

    /// Returns `true` if `window` has a gesture manager installed.
    pub fn has_gesture_manager(&self, window: W) -> bool {
        self.windows
            .get(&window)
            .is_some_and(TouchInputState::has_gesture_manager)
    }

    /// Discard every contact of `window`, now or on its next
    /// [`run_deferred`](TouchInputState::run_deferred).
    pub fn discard_touches<H>(&mut self, window: W, host: &mut H, deferred: bool) -> Result<(), TouchError>
    where
        H: TouchHost<View = V> + ?Sized,
    {
        let state = self
            .windows
            .get_mut(&window)
            .ok_or(TouchError::UnknownWindow)?;
        state.discard_touches(host, deferred, false);
        Ok(())
    }

    /// Ids of the tracked windows, in no particular order.
    pub fn windows(&self) -> impl Iterator<Item = W> + '_ {
        self.windows.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect};
    use understory_gesture::TouchId;

    use crate::event::{TouchInfo, TouchPhase};
    use crate::handler::HandlerRef;
    use crate::host::{ViewTree, WindowContext};

    struct Empty;

    impl ViewTree for Empty {
        type View = u32;

        fn root(&self) -> u32 {
            0
        }

        fn parent(&self, _view: u32) -> Option<u32> {
            None
        }

        fn child_count(&self, _view: u32) -> usize {
            0
        }

        fn child(&self, _view: u32, _index: usize) -> u32 {
            0
        }

        fn frame(&self, _view: u32) -> Rect {
            Rect::new(0.0, 0.0, 640.0, 480.0)
        }

        fn is_attached(&self, _view: u32) -> bool {
            true
        }

        fn create_touch_handler(&mut self, _view: u32, _event: &TouchEvent) -> Option<HandlerRef> {
            None
        }
    }

    impl WindowContext<u32> for Empty {
        fn screen_bounds(&self) -> Rect {
            Rect::new(0.0, 0.0, 640.0, 480.0)
        }

        fn window_to_screen(&self, point: Point) -> Point {
            point
        }

        fn popup_context_menu(&mut self, _position: Point) {}
    }

    fn press() -> TouchEvent {
        let touch = TouchInfo::new(TouchId(1), Point::new(100.0, 100.0), 0, TouchPhase::Begin);
        TouchEvent::batch(TouchPhase::Begin, [touch])
    }

    #[test]
    fn unknown_window_is_rejected() {
        let mut touch: TouchInputManager<u32, u32> = TouchInputManager::new(TouchConfig::default());
        assert_eq!(
            touch.process_touches(3, &mut Empty, &press()),
            Err(TouchError::UnknownWindow)
        );
        assert!(touch.discard_touches(3, &mut Empty, false).is_err());
    }

    #[test]
    fn first_event_installs_builtin_manager() {
        let mut touch: TouchInputManager<u32, u32> = TouchInputManager::new(TouchConfig::default());
        touch.attach(1);
        assert!(!touch.has_gesture_manager(1));
        assert_eq!(touch.process_touches(1, &mut Empty, &press()), Ok(()));
        assert!(touch.has_gesture_manager(1));
        assert!(touch.state(1).is_some_and(|s| s.has_touch(TouchId(1))));

        assert_eq!(touch.discard_touches(1, &mut Empty, false), Ok(()));
        assert!(touch.state(1).is_some_and(|s| s.touches().is_empty()));
    }

    #[test]
    fn config_reaches_every_window() {
        let mut touch: TouchInputManager<u32, u32> = TouchInputManager::new(TouchConfig::default());
        touch.attach(1);
        touch.attach(2);
        touch.set_config(TouchConfig::default().with_long_press_context_menu(false));
        for w in [1, 2] {
            assert!(touch.state(w).is_some_and(|s| !s.config().long_press_context_menu));
        }
        touch.attach(3);
        assert_eq!(touch.windows().count(), 3);
        assert!(touch.state(3).is_some_and(|s| !s.config().long_press_context_menu));
    }
}

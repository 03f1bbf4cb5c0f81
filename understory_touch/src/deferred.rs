// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Calls the engine makes to itself on a later turn.
//!
//! Some work must not happen while the engine is in the middle of iterating its own
//! collections, and some must wait a little (a context menu that should not open during a
//! drag). Such work is posted here and run by
//! [`TouchInputState::run_deferred`](crate::TouchInputState::run_deferred).
//!
//! Calls run in posting order once due. Calls posted while the queue is draining wait for the
//! next drain, even with zero delay.

use alloc::collections::VecDeque;

use kurbo::Point;
use understory_gesture::GestureEvent;

use crate::gesture::GestureId;

/// Work for a later turn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DeferredCall {
    /// Discard every tracked contact.
    DiscardTouches,
    /// Deliver a gesture event again.
    ReplayGesture {
        /// Target gesture.
        gesture: GestureId,
        /// Event to deliver.
        event: GestureEvent,
    },
    /// Open the long-press context menu.
    PopupContextMenu {
        /// Window position.
        position: Point,
    },
}

#[derive(Clone, Debug)]
struct Entry {
    due: u64,
    call: DeferredCall,
}

/// FIFO of delayed calls.
#[derive(Clone, Debug, Default)]
pub(crate) struct DeferredQueue {
    entries: VecDeque<Entry>,
}

impl DeferredQueue {
    pub(crate) fn post(&mut self, call: DeferredCall, due: u64) {
        tracing::debug!(target: "understory_touch::deferred", ?call, due, "post");
        self.entries.push_back(Entry { due, call });
    }

    /// Remove and return the calls due at `now`, keeping the rest in order.
    pub(crate) fn take_due(&mut self, now: u64) -> VecDeque<DeferredCall> {
        let mut due = VecDeque::new();
        let mut later = VecDeque::new();
        for entry in self.entries.drain(..) {
            if entry.due <= now {
                due.push_back(entry.call);
            } else {
                later.push_back(entry);
            }
        }
        self.entries = later;
        due
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_calls_come_out_in_order() {
        let mut q = DeferredQueue::default();
        q.post(DeferredCall::DiscardTouches, 10);
        q.post(DeferredCall::PopupContextMenu { position: Point::ZERO }, 5);
        q.post(DeferredCall::PopupContextMenu { position: Point::new(1.0, 1.0) }, 30);

        let due = q.take_due(10);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0], DeferredCall::DiscardTouches);
        assert_eq!(q.len(), 1);
        assert!(q.take_due(29).is_empty());
        assert_eq!(q.take_due(30).len(), 1);
        assert!(q.is_empty());
    }
}

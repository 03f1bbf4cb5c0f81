// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: gesture vocabulary, candidate arbitration, and recognizers.
//!
//! ## Overview
//!
//! This crate holds the toolkit-agnostic half of touch gesture resolution.
//! It knows nothing about views, windows, or handlers; the dispatch engine in
//! `understory_touch` builds on it.
//!
//! - [`types`]: gesture kinds, states, direction constraints, priorities, requests and events.
//! - [`candidate`]: [`CandidateSet`], the per-gesture arbitration table.
//!   Competing handlers register the gesture kinds they need, optionally constrained to a
//!   direction, and the set keeps exactly one winner for every direction an event can take.
//! - [`recognition`]: [`GestureRecognition`], a pool of simple recognizers for swipe, zoom,
//!   rotate, long press, single tap, and double tap, driven by raw touch samples and an idle clock.
//!
//! ## Arbitration at a glance
//!
//! ```rust
//! use understory_gesture::{CandidateSet, Constraints, Priority};
//!
//! let mut set: CandidateSet<&str, u32> = CandidateSet::new();
//! // A scroll view wants any swipe.
//! assert!(set.add("scroll", 1, Constraints::empty(), Priority::NORMAL));
//! // A slider inside it wants horizontal swipes more.
//! assert!(set.add("slider", 2, Constraints::HORIZONTAL, Priority::HIGH));
//!
//! // Horizontal motion goes to the slider, vertical motion still scrolls.
//! assert_eq!(set.select(10.0, 1.0).map(|c| c.handler), Some("slider"));
//! assert_eq!(set.select(1.0, 10.0).map(|c| c.handler), Some("scroll"));
//! ```
//!
//! ## Time
//!
//! Timestamps are `u64` milliseconds from an arbitrary monotonic origin chosen by the caller.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod candidate;
pub mod recognition;
pub mod types;

pub use candidate::{Candidate, CandidateSet};
pub use recognition::{GestureRecognition, Recognized, TouchSample};
pub use types::{
    Constraints, GestureEvent, GestureRequest, GestureState, GestureType, KeyState, Priority,
    RequestFlags, TouchId,
};

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-gesture candidate arbitration.
//!
//! Several handlers under one finger may want the same gesture kind, possibly restricted
//! to one direction. A [`CandidateSet`] keeps a minimal, non-overlapping table of
//! `(constraints, handler)` entries so that whatever direction the gesture ends up taking,
//! exactly one entry applies.
//!
//! ## Registration rules
//!
//! [`CandidateSet::add`] walks the existing entries:
//!
//! - Same constraints: the higher priority keeps the slot. Ties keep the earlier entry.
//!   A replaced handler is remembered as the [alternative](CandidateSet::alternative).
//! - Existing entry is plain, new one is constrained and stronger: the plain entry is
//!   narrowed to the complementary direction and the new entry covers its own.
//! - New entry is plain, existing one is constrained: the new entry competes once per
//!   direction.
//! - Otherwise the entry is appended.
//!
//! ```rust
//! use understory_gesture::{CandidateSet, Constraints, Priority};
//!
//! let mut set: CandidateSet<char, ()> = CandidateSet::new();
//! set.add('a', (), Constraints::HORIZONTAL, Priority::NORMAL);
//! set.add('b', (), Constraints::VERTICAL, Priority::NORMAL);
//! // A stronger plain request overrides both directions.
//! assert!(set.add('c', (), Constraints::empty(), Priority::HIGH));
//! assert_eq!(set.single_handler(), Some(&'c'));
//! ```

use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::types::{Constraints, Priority};

/// One arbitration entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate<H, V> {
    /// Handler that would receive the gesture.
    pub handler: H,
    /// View the handler belongs to.
    pub view: V,
    /// Directions this entry covers; empty means all.
    pub constraints: Constraints,
    /// Priority the entry was registered with.
    pub priority: Priority,
}

impl<H, V> Candidate<H, V> {
    /// Returns `true` if this entry applies to motion by `(dx, dy)`.
    pub fn matches(&self, dx: f64, dy: f64) -> bool {
        self.constraints.matches(dx, dy)
    }
}

/// The candidate table of one gesture.
#[derive(Clone, Debug)]
pub struct CandidateSet<H, V> {
    entries: Vec<Candidate<H, V>>,
    alternative: Option<(H, V)>,
}

impl<H, V> Default for CandidateSet<H, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            alternative: None,
        }
    }
}

impl<H: Clone + PartialEq, V: Copy> CandidateSet<H, V> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `constraints` at `priority`.
    ///
    /// Returns `true` if the handler now covers at least one direction.
    pub fn add(&mut self, handler: H, view: V, constraints: Constraints, priority: Priority) -> bool {
        for i in 0..self.entries.len() {
            let existing = &self.entries[i];
            if existing.constraints == constraints {
                if priority <= existing.priority {
                    return false;
                }
                if self.alternative.is_none() && existing.handler != handler {
                    self.alternative = Some((existing.handler.clone(), existing.view));
                }
                self.entries.remove(i);
                self.entries.push(Candidate {
                    handler,
                    view,
                    constraints,
                    priority,
                });
                return true;
            } else if existing.constraints.is_empty() {
                if priority <= existing.priority {
                    return false;
                }
                let mut rest = self.entries.remove(i);
                rest.constraints |= constraints.complement();
                self.entries.push(rest);
                self.entries.push(Candidate {
                    handler,
                    view,
                    constraints,
                    priority,
                });
                return true;
            } else if constraints.is_empty() {
                let horizontal = self.add(handler.clone(), view, Constraints::HORIZONTAL, priority);
                let vertical = self.add(handler, view, Constraints::VERTICAL, priority);
                return horizontal || vertical;
            }
        }
        self.entries.push(Candidate {
            handler,
            view,
            constraints,
            priority,
        });
        true
    }

    /// Pick the entry for motion by `(dx, dy)`.
    ///
    /// Falls back to the first entry when no constrained entry matches (exact diagonals),
    /// so a non-empty set always yields a candidate.
    pub fn select(&self, dx: f64, dy: f64) -> Option<&Candidate<H, V>> {
        self.entries
            .iter()
            .find(|c| c.matches(dx, dy))
            .or_else(|| self.entries.first())
    }

    /// The handler of every entry, if they all agree.
    pub fn single_handler(&self) -> Option<&H> {
        let first = &self.entries.first()?.handler;
        self.entries
            .iter()
            .all(|c| c.handler == *first)
            .then_some(first)
    }

    /// Distinct handlers in registration order.
    pub fn handlers(&self) -> SmallVec<[H; 4]> {
        let mut out: SmallVec<[H; 4]> = SmallVec::new();
        for c in &self.entries {
            if !out.contains(&c.handler) {
                out.push(c.handler.clone());
            }
        }
        out
    }

    /// View registered together with `handler`.
    pub fn view_for(&self, handler: &H) -> Option<V> {
        self.entries
            .iter()
            .find(|c| c.handler == *handler)
            .map(|c| c.view)
    }

    /// Drop every entry of `handler`.
    pub fn remove_handler(&mut self, handler: &H) {
        self.entries.retain(|c| c.handler != *handler);
    }

    /// Handler displaced by a stronger registration for the exact same constraints.
    pub fn alternative(&self) -> Option<&H> {
        self.alternative.as_ref().map(|(handler, _)| handler)
    }

    /// Take the alternative handler and its view out of the set.
    pub fn take_alternative(&mut self) -> Option<(H, V)> {
        self.alternative.take()
    }

    /// All entries in arbitration order.
    pub fn entries(&self) -> &[Candidate<H, V>] {
        &self.entries
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const DIRECTIONS: [(f64, f64); 8] = [
        (5.0, 1.0),
        (-5.0, 1.0),
        (5.0, -1.0),
        (1.0, 5.0),
        (1.0, -5.0),
        (-1.0, -5.0),
        (3.0, 3.0),
        (0.0, 0.0),
    ];

    /// Every direction is served and no constrained direction is served twice.
    fn assert_covered(set: &CandidateSet<u8, ()>) {
        for (dx, dy) in DIRECTIONS {
            assert!(set.select(dx, dy).is_some(), "({dx}, {dy}) fell through");
            let constrained = set
                .entries()
                .iter()
                .filter(|c| !c.constraints.is_empty() && c.matches(dx, dy))
                .count();
            assert!(constrained <= 1, "({dx}, {dy}) matched {constrained} entries");
        }
    }

    #[test]
    fn exact_match_keeps_stronger_and_records_alternative() {
        let mut set = CandidateSet::new();
        assert!(set.add(1_u8, (), Constraints::VERTICAL, Priority::NORMAL));
        assert!(!set.add(2, (), Constraints::VERTICAL, Priority::NORMAL));
        assert!(set.add(3, (), Constraints::VERTICAL, Priority::HIGH));
        assert_eq!(set.len(), 1);
        assert_eq!(set.entries()[0].handler, 3);
        assert_eq!(set.alternative(), Some(&1));
        // The first displaced handler stays the alternative.
        assert!(set.add(4, (), Constraints::VERTICAL, Priority::HIGHEST));
        assert_eq!(set.alternative(), Some(&1));
        assert_eq!(set.take_alternative(), Some((1, ())));
        assert_eq!(set.alternative(), None);
    }

    #[test]
    fn replacing_with_same_handler_records_no_alternative() {
        let mut set = CandidateSet::new();
        set.add(1_u8, (), Constraints::empty(), Priority::LOW);
        set.add(1, (), Constraints::empty(), Priority::HIGH);
        assert_eq!(set.alternative(), None);
    }

    #[test]
    fn constrained_splits_plain() {
        let mut set = CandidateSet::new();
        set.add(1_u8, (), Constraints::empty(), Priority::NORMAL);
        assert!(set.add(2, (), Constraints::HORIZONTAL, Priority::HIGH));
        let shape: Vec<_> = set.entries().iter().map(|c| (c.handler, c.constraints)).collect();
        assert_eq!(shape, vec![(1, Constraints::VERTICAL), (2, Constraints::HORIZONTAL)]);
        assert_eq!(set.select(9.0, 1.0).map(|c| c.handler), Some(2));
        assert_eq!(set.select(1.0, 9.0).map(|c| c.handler), Some(1));
        assert_covered(&set);
    }

    #[test]
    fn weaker_constrained_cannot_split_plain() {
        let mut set = CandidateSet::new();
        set.add(1_u8, (), Constraints::empty(), Priority::HIGH);
        assert!(!set.add(2, (), Constraints::HORIZONTAL, Priority::HIGH));
        assert!(!set.add(2, (), Constraints::VERTICAL, Priority::LOW));
        assert_eq!(set.single_handler(), Some(&1));
    }

    #[test]
    fn plain_competes_per_direction() {
        let mut set = CandidateSet::new();
        set.add(1_u8, (), Constraints::HORIZONTAL, Priority::HIGH);
        // Beats nothing horizontally, but claims the free vertical direction.
        assert!(set.add(2, (), Constraints::empty(), Priority::NORMAL));
        assert_eq!(set.select(9.0, 0.0).map(|c| c.handler), Some(1));
        assert_eq!(set.select(0.0, 9.0).map(|c| c.handler), Some(2));
        assert_covered(&set);
    }

    #[test]
    fn plain_loses_everywhere() {
        let mut set = CandidateSet::new();
        set.add(1_u8, (), Constraints::HORIZONTAL, Priority::HIGH);
        set.add(1, (), Constraints::VERTICAL, Priority::HIGH);
        assert!(!set.add(2, (), Constraints::empty(), Priority::NORMAL));
        assert_eq!(set.handlers().as_slice(), &[1]);
    }

    #[test]
    fn ties_keep_first_registrant() {
        let mut set = CandidateSet::new();
        set.add(1_u8, (), Constraints::empty(), Priority::NORMAL);
        assert!(!set.add(2, (), Constraints::empty(), Priority::NORMAL));
        assert_eq!(set.single_handler(), Some(&1));
    }

    #[test]
    fn coverage_survives_mixed_sequences() {
        let sequences: [&[(u8, Constraints, Priority)]; 4] = [
            &[
                (1, Constraints::empty(), Priority::LOW),
                (2, Constraints::VERTICAL, Priority::NORMAL),
                (3, Constraints::empty(), Priority::HIGH),
            ],
            &[
                (1, Constraints::VERTICAL, Priority::NORMAL),
                (2, Constraints::empty(), Priority::LOW),
                (3, Constraints::HORIZONTAL, Priority::HIGHEST),
            ],
            &[
                (1, Constraints::empty(), Priority::NORMAL),
                (2, Constraints::HORIZONTAL, Priority::HIGH),
                (3, Constraints::VERTICAL, Priority::HIGH),
                (4, Constraints::empty(), Priority::NORMAL),
            ],
            &[(1, Constraints::HORIZONTAL, Priority::NORMAL), (2, Constraints::VERTICAL, Priority::NORMAL)],
        ];
        for seq in sequences {
            let mut set = CandidateSet::new();
            for &(h, c, p) in seq {
                set.add(h, (), c, p);
            }
            assert_covered(&set);
        }
    }

    #[test]
    fn diagonal_falls_back_to_first_entry() {
        let mut set = CandidateSet::new();
        set.add(1_u8, (), Constraints::empty(), Priority::NORMAL);
        set.add(2, (), Constraints::VERTICAL, Priority::HIGH);
        // Split leaves [1: horizontal, 2: vertical]; neither matches an exact diagonal.
        assert_eq!(set.select(4.0, 4.0).map(|c| c.handler), Some(1));
    }

    #[test]
    fn lookup_helpers() {
        let mut set = CandidateSet::new();
        set.add(1_u8, 10_u32, Constraints::HORIZONTAL, Priority::NORMAL);
        set.add(2, 20, Constraints::VERTICAL, Priority::NORMAL);
        assert_eq!(set.single_handler(), None);
        assert_eq!(set.handlers().as_slice(), &[1, 2]);
        assert_eq!(set.view_for(&2), Some(20));
        set.remove_handler(&1);
        assert_eq!(set.single_handler(), Some(&2));
        assert_eq!(set.view_for(&1), None);
    }
}

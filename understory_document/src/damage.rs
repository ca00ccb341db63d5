// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout change summary returned from commit.

use alloc::vec::Vec;
use kurbo::Rect;

use crate::NodeId;
use crate::document::ObserverId;

/// A batched set of layout changes derived from [`crate::Document::commit`].
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Commit counter after this commit.
    pub epoch: u64,
    /// Whether the viewport was resized or scrolled.
    pub viewport_changed: bool,
    /// Elements whose bounds changed.
    pub moved: Vec<NodeId>,
    /// Observers that must be notified of this commit.
    pub notified: Vec<ObserverId>,
    /// World-space rectangles that should be repainted (old and new bounds of moved elements).
    pub dirty_rects: Vec<Rect>,
}

impl Damage {
    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// Whether `observer` is notified by this commit.
    pub fn notifies(&self, observer: ObserverId) -> bool {
        self.notified.contains(&observer)
    }

    /// Fold a later commit into this one.
    pub fn extend(&mut self, later: Self) {
        self.epoch = self.epoch.max(later.epoch);
        self.viewport_changed |= later.viewport_changed;
        for id in later.moved {
            if !self.moved.contains(&id) {
                self.moved.push(id);
            }
        }
        for o in later.notified {
            if !self.notified.contains(&o) {
                self.notified.push(o);
            }
        }
        self.dirty_rects.extend(later.dirty_rects);
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        !self.viewport_changed && self.moved.is_empty()
    }
}

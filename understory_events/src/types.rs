// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch vocabulary: phases, outcomes, and dispatch entries.

use alloc::vec::Vec;

/// Propagation phase of a dispatch entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Document-level listeners and ancestors, before the target.
    Capture,
    /// The event target itself.
    Target,
    /// Ancestors of the target, innermost first.
    Bubble,
}

/// Result of a handler: keep propagating or stop.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Continue to the next entry.
    #[default]
    Continue,
    /// Stop propagation immediately.
    Stop,
}

/// One step of a dispatch sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dispatch<K> {
    /// Phase of this step.
    pub phase: Phase,
    /// Node (or listener) visited by this step.
    pub node: K,
}

impl<K> Dispatch<K> {
    /// A capture-phase entry.
    pub const fn capture(node: K) -> Self {
        Self {
            phase: Phase::Capture,
            node,
        }
    }

    /// A target-phase entry.
    pub const fn target(node: K) -> Self {
        Self {
            phase: Phase::Target,
            node,
        }
    }

    /// A bubble-phase entry.
    pub const fn bubble(node: K) -> Self {
        Self {
            phase: Phase::Bubble,
            node,
        }
    }
}

/// Build the target and bubble entries for a target path.
///
/// `path` runs from the target outwards (target first, root last). The
/// returned sequence has one target entry followed by bubble entries for the
/// remaining ancestors, innermost first. Capture entries are prepended by the
/// caller, who owns the document-level listeners.
pub fn target_and_bubble<K: Copy>(path: &[K]) -> Vec<Dispatch<K>> {
    let mut seq = Vec::with_capacity(path.len());
    let mut iter = path.iter();
    if let Some(&target) = iter.next() {
        seq.push(Dispatch::target(target));
    }
    seq.extend(iter.map(|&n| Dispatch::bubble(n)));
    seq
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn path_becomes_target_then_bubble() {
        let seq = target_and_bubble(&[3_u32, 2, 1]);
        assert_eq!(
            seq,
            vec![
                Dispatch::target(3),
                Dispatch::bubble(2),
                Dispatch::bubble(1)
            ]
        );
        assert!(target_and_bubble::<u32>(&[]).is_empty());
    }
}

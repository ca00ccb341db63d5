// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher helper: walk a dispatch sequence and honor stop outcomes.
//!
//! [`Outcome`] only controls propagation. "Default prevented" and
//! "propagation stopped by a listener" live on the event payload passed to
//! [`run`], so a later handler can see what an earlier one decided.
//!
//! ## Semantics
//!
//! - Entries are processed in order (capture, then target, then bubble).
//! - [`Outcome::Stop`] aborts propagation immediately; no later entry runs.
//! - Returns the entry where propagation stopped, or `None` if the sequence completed.
//!
//! ```
//! use understory_events::dispatcher;
//! use understory_events::{Dispatch, Outcome, Phase};
//!
//! let seq = vec![
//!     Dispatch::capture(0_u32),
//!     Dispatch::target(2),
//!     Dispatch::bubble(1),
//! ];
//!
//! let mut seen = Vec::new();
//! let stopped = dispatcher::run(&seq, &mut (), |d, _| {
//!     seen.push((d.phase, d.node));
//!     if d.phase == Phase::Target { Outcome::Stop } else { Outcome::Continue }
//! });
//!
//! assert_eq!(stopped, Some(&Dispatch::target(2)));
//! assert_eq!(seen, vec![(Phase::Capture, 0), (Phase::Target, 2)]);
//! ```

use crate::types::{Dispatch, Outcome};

/// Run a handler over a dispatch sequence and honor stop outcomes.
///
/// - [`Outcome::Continue`]: keep going.
/// - [`Outcome::Stop`]: abort propagation immediately (no later phases).
///
/// Returns `Some(d)` with the last visited entry if a handler stopped
/// propagation, `None` otherwise.
pub fn run<'a, K, E>(
    seq: &'a [Dispatch<K>],
    event: &mut E,
    mut handler: impl FnMut(&Dispatch<K>, &mut E) -> Outcome,
) -> Option<&'a Dispatch<K>> {
    for d in seq {
        match handler(d, event) {
            Outcome::Continue => {}
            Outcome::Stop => return Some(d),
        }
    }
    None
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document-level listener registry.
//!
//! The registry is shared by every mounted primitive. Each primitive arms its
//! own listeners and disarms them by id; nobody assumes exclusivity.
//! Listeners of one kind are delivered in registration order.
//!
//! Dispatch takes a [`ListenerRegistry::snapshot`] first, so handlers may arm
//! or disarm listeners while the snapshot is being walked. A listener disarmed
//! mid-dispatch must not be called afterwards: check
//! [`ListenerRegistry::is_armed`] before invoking each snapshot entry.
//!
//! ```
//! use understory_events::{EventKind, ListenerRegistry};
//!
//! let mut reg: ListenerRegistry<EventKind, &str> = ListenerRegistry::new();
//! let outer = reg.arm(EventKind::Key, "outer");
//! let inner = reg.arm(EventKind::Key, "inner");
//! reg.arm(EventKind::PointerDown, "pointer");
//!
//! let order: Vec<_> = reg.snapshot(EventKind::Key).into_iter().map(|(_, l)| l).collect();
//! assert_eq!(order, ["outer", "inner"]);
//!
//! assert_eq!(reg.disarm(inner), Some("inner"));
//! assert!(reg.is_armed(outer));
//! assert_eq!(reg.count(EventKind::Key), 1);
//! ```

use smallvec::SmallVec;

/// Identifier of an armed listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ListenerId(u64);

#[derive(Clone, Debug)]
struct Entry<K, L> {
    id: ListenerId,
    kind: K,
    listener: L,
}

/// Registry of listeners keyed by event kind, preserving registration order.
#[derive(Clone, Debug)]
pub struct ListenerRegistry<K, L> {
    entries: SmallVec<[Entry<K, L>; 8]>,
    next_id: u64,
}

impl<K, L> Default for ListenerRegistry<K, L> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
            next_id: 0,
        }
    }
}

impl<K: Copy + Eq + core::fmt::Debug, L> ListenerRegistry<K, L> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events of `kind`.
    pub fn arm(&mut self, kind: K, listener: L) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        tracing::trace!(?kind, ?id, "listener armed");
        self.entries.push(Entry { id, kind, listener });
        id
    }

    /// Unregister a listener. Returns it if it was armed.
    pub fn disarm(&mut self, id: ListenerId) -> Option<L> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(pos);
        tracing::trace!(kind = ?entry.kind, ?id, "listener disarmed");
        Some(entry.listener)
    }

    /// Whether `id` is armed.
    pub fn is_armed(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// The listener registered under `id`.
    pub fn get(&self, id: ListenerId) -> Option<&L> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.listener)
    }

    /// Number of armed listeners of `kind`.
    pub fn count(&self, kind: K) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Total number of armed listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listener is armed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Listeners of `kind` in registration order.
    pub fn iter(&self, kind: K) -> impl Iterator<Item = (ListenerId, &L)> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| (e.id, &e.listener))
    }

    /// Owned copy of the listeners of `kind`, in registration order.
    pub fn snapshot(&self, kind: K) -> SmallVec<[(ListenerId, L); 8]>
    where
        L: Clone,
    {
        self.iter(kind).map(|(id, l)| (id, l.clone())).collect()
    }
}

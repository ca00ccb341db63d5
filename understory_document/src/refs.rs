// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element references shared between a component and its host.
//!
//! A component that renders an element publishes the element's [`NodeId`]
//! through a [`RefTarget`]. The host may supply its own target too; both are
//! combined with [`merge_refs`] so every target sees the same value.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use crate::NodeId;

/// A shared, observable slot holding the element currently rendered for a part.
///
/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<NodeId>>>);

impl NodeRef {
    /// Create an empty reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// The referenced element, if mounted.
    pub fn get(&self) -> Option<NodeId> {
        self.0.get()
    }

    /// Point the reference at `node` (or clear it).
    pub fn set(&self, node: Option<NodeId>) {
        self.0.set(node);
    }

    /// Whether two handles share the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.get()).finish()
    }
}

/// Something that receives an element reference when a part mounts or unmounts.
#[derive(Clone)]
pub enum RefTarget {
    /// A shared slot.
    Slot(NodeRef),
    /// A callback invoked with the new value.
    Callback(Rc<dyn Fn(Option<NodeId>)>),
    /// Several targets, each receiving the same value in order.
    Many(Rc<[RefTarget]>),
}

impl RefTarget {
    /// Deliver `node` to the target.
    pub fn set(&self, node: Option<NodeId>) {
        match self {
            Self::Slot(slot) => slot.set(node),
            Self::Callback(cb) => cb(node),
            Self::Many(targets) => {
                for t in targets.iter() {
                    t.set(node);
                }
            }
        }
    }
}

impl From<NodeRef> for RefTarget {
    fn from(slot: NodeRef) -> Self {
        Self::Slot(slot)
    }
}

impl From<&NodeRef> for RefTarget {
    fn from(slot: &NodeRef) -> Self {
        Self::Slot(slot.clone())
    }
}

impl fmt::Debug for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => f.debug_tuple("Slot").field(slot).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Many(targets) => f.debug_tuple("Many").field(&targets.len()).finish(),
        }
    }
}

/// Combine reference targets into one that fans the value out to all of them.
///
/// `None` entries are skipped.
pub fn merge_refs(targets: impl IntoIterator<Item = Option<RefTarget>>) -> RefTarget {
    let targets: Vec<RefTarget> = targets.into_iter().flatten().collect();
    RefTarget::Many(targets.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    #[test]
    fn merged_targets_all_observe_the_same_value() {
        let ours = NodeRef::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let theirs = RefTarget::Callback(Rc::new(move |n| sink.borrow_mut().push(n)));

        let merged = merge_refs([Some(RefTarget::from(&ours)), None, Some(theirs)]);
        let id = NodeId::new(3, 1);
        merged.set(Some(id));
        merged.set(None);

        assert_eq!(ours.get(), None);
        assert_eq!(*seen.borrow(), [Some(id), None]);
    }

    #[test]
    fn clones_share_the_slot() {
        let a = NodeRef::new();
        let b = a.clone();
        a.set(Some(NodeId::new(1, 1)));
        assert_eq!(b.get(), Some(NodeId::new(1, 1)));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&NodeRef::new()));
    }
}

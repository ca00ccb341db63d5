// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State handles passed down through composition, and the errors raised when
//! a part is used outside its provider.

use alloc::rc::Rc;
use alloc::string::String;
use core::any::Any;
use core::borrow::Borrow;
use core::fmt;

/// A part was composed incorrectly.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// A part was built without its provider in scope.
    #[error("`{part}` must be used within `{provider}`")]
    MissingProvider {
        /// The part that was built.
        part: &'static str,
        /// The primitive that must provide it.
        provider: &'static str,
    },
    /// Two items of one primitive share an id.
    #[error("`{part}` with id `{id}` is already registered")]
    DuplicateItem {
        /// The part that was built.
        part: &'static str,
        /// The repeated id.
        id: ItemId,
    },
}

/// A primitive handle that parts can look up in a [`Scope`].
pub trait Provider: Clone + 'static {
    /// Name used in usage errors.
    const NAME: &'static str;
}

/// A persistent chain of provided handles.
///
/// Each [`Scope::provide`] returns a new scope that shadows outer handles of
/// the same type; the outer scope is unchanged. Clones are cheap.
#[derive(Clone, Default)]
pub struct Scope(Option<Rc<Frame>>);

struct Frame {
    value: Rc<dyn Any>,
    parent: Scope,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with `handle` innermost.
    pub fn provide<P: Provider>(&self, handle: P) -> Self {
        Self(Some(Rc::new(Frame {
            value: Rc::new(handle),
            parent: self.clone(),
        })))
    }

    /// The innermost handle of type `P`.
    pub fn lookup<P: Provider>(&self) -> Option<P> {
        let mut frame = self.0.as_deref();
        while let Some(f) = frame {
            if let Some(p) = f.value.downcast_ref::<P>() {
                return Some(p.clone());
            }
            frame = f.parent.0.as_deref();
        }
        None
    }

    /// The innermost handle of type `P`, or a usage error naming `part`.
    pub fn require<P: Provider>(&self, part: &'static str) -> Result<P, UsageError> {
        self.lookup().ok_or(UsageError::MissingProvider {
            part,
            provider: P::NAME,
        })
    }

    /// Number of provided handles.
    pub fn depth(&self) -> usize {
        let mut n = 0;
        let mut frame = self.0.as_deref();
        while let Some(f) = frame {
            n += 1;
            frame = f.parent.0.as_deref();
        }
        n
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("depth", &self.depth())
            .finish()
    }
}

/// Identity of an item within a primitive (accordion item, tab, option).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Rc<str>);

impl ItemId {
    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(Rc::from(s))
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(Rc::from(s))
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[derive(Clone, Debug, PartialEq)]
    struct Outer(u8);
    impl Provider for Outer {
        const NAME: &'static str = "Outer";
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Inner;
    impl Provider for Inner {
        const NAME: &'static str = "Inner";
    }

    #[test]
    fn innermost_handle_wins_and_outer_scope_is_untouched() {
        let a = Scope::new().provide(Outer(1));
        let b = a.provide(Inner).provide(Outer(2));
        assert_eq!(a.lookup::<Outer>(), Some(Outer(1)));
        assert_eq!(b.lookup::<Outer>(), Some(Outer(2)));
        assert_eq!(b.lookup::<Inner>(), Some(Inner));
        assert_eq!(a.lookup::<Inner>(), None);
        assert_eq!(b.depth(), 3);
    }

    #[test]
    fn missing_provider_names_both_sides() {
        let err = Scope::new().require::<Inner>("InnerPart").unwrap_err();
        assert_eq!(
            err,
            UsageError::MissingProvider {
                part: "InnerPart",
                provider: "Inner"
            }
        );
        assert_eq!(err.to_string(), "`InnerPart` must be used within `Inner`");
    }
}

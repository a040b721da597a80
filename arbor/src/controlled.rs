//! Controlled and uncontrolled key-set state.
//!
//! The tree always holds a canonical value for its expansion and selection
//! sets. When the embedder owns a set ([`Ownership::External`]) the tree never
//! writes it: every change is turned into a notification carrying the
//! proposed keys, and the embedder writes the value back when it accepts it.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Callback receiving the proposed key set after a change.
pub type ChangeHook<K> = Arc<dyn Fn(&HashSet<K>) + Send + Sync>;

/// State exposing its keys as a set.
pub trait KeySet {
    type Key: Clone + Eq + Hash;

    fn keys(&self) -> &HashSet<Self::Key>;

    /// Take over state that is not part of the key set from a proposed value
    /// whose keys were not written.
    fn adopt_bookkeeping(&mut self, _proposed: &Self) {}
}

/// Who owns the canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// The tree mutates the value directly.
    #[default]
    Internal,
    /// The embedder owns the value; changes only notify.
    External,
}

/// A pending change notification.
///
/// Emitted after the tree's state lock is released so hooks may call back
/// into the tree.
pub struct Change<K> {
    hook: ChangeHook<K>,
    keys: HashSet<K>,
}

impl<K> Change<K> {
    pub fn keys(&self) -> &HashSet<K> {
        &self.keys
    }

    pub fn emit(self) {
        (self.hook)(&self.keys);
    }
}

impl<K: fmt::Debug> fmt::Debug for Change<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change").field("keys", &self.keys).finish()
    }
}

/// Key-set state with an ownership flag.
pub struct Controlled<S: KeySet> {
    value: S,
    ownership: Ownership,
    on_change: Option<ChangeHook<S::Key>>,
}

impl<S: KeySet + Clone> Controlled<S> {
    /// Internally owned state, optionally observed by `on_change`.
    pub fn internal(value: S, on_change: Option<ChangeHook<S::Key>>) -> Self {
        Self {
            value,
            ownership: Ownership::Internal,
            on_change,
        }
    }

    /// Externally owned state. Changes are reported to `on_change` only.
    pub fn external(value: S, on_change: Option<ChangeHook<S::Key>>) -> Self {
        Self {
            value,
            ownership: Ownership::External,
            on_change,
        }
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_external(&self) -> bool {
        self.ownership == Ownership::External
    }

    pub fn get(&self) -> &S {
        &self.value
    }

    /// Direct access for state that is not part of the key set (timers,
    /// bookkeeping) and for embedder write-backs.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.value
    }

    /// Apply `f` to a working copy and route the result through the write path.
    ///
    /// Internal state takes the new value. External state keeps its keys and
    /// adopts only the non-key bookkeeping. Either way a changed key set
    /// produces a [`Change`] if a hook is installed.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> (R, Option<Change<S::Key>>) {
        let mut next = self.value.clone();
        let result = f(&mut next);

        let keys_changed = next.keys() != self.value.keys();
        let change = if keys_changed {
            self.on_change.as_ref().map(|hook| Change {
                hook: Arc::clone(hook),
                keys: next.keys().clone(),
            })
        } else {
            None
        };

        if self.ownership == Ownership::Internal || !keys_changed {
            self.value = next;
        } else {
            self.value.adopt_bookkeeping(&next);
        }
        (result, change)
    }

    /// Write a value supplied by the embedder.
    ///
    /// `f` applies `written` and any constraint on it. If the stored keys end
    /// up different from `written` the adjusted set is reported, so the
    /// embedder's copy can follow.
    pub fn write_back<R>(
        &mut self,
        written: &HashSet<S::Key>,
        f: impl FnOnce(&mut S) -> R,
    ) -> (R, Option<Change<S::Key>>) {
        let result = f(&mut self.value);
        let change = if written != self.value.keys() {
            self.on_change.as_ref().map(|hook| Change {
                hook: Arc::clone(hook),
                keys: self.value.keys().clone(),
            })
        } else {
            None
        };
        (result, change)
    }

    /// Apply `f` to the value regardless of ownership.
    ///
    /// Used for constraints the tree enforces on any value, such as clamping a
    /// selection to the current mode. A changed key set is still reported.
    pub fn enforce<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> (R, Option<Change<S::Key>>) {
        let before = self.value.keys().clone();
        let result = f(&mut self.value);
        let change = if &before != self.value.keys() {
            self.on_change.as_ref().map(|hook| Change {
                hook: Arc::clone(hook),
                keys: self.value.keys().clone(),
            })
        } else {
            None
        };
        (result, change)
    }
}

impl<S: KeySet + fmt::Debug> fmt::Debug for Controlled<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controlled")
            .field("value", &self.value)
            .field("ownership", &self.ownership)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

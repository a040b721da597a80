//! Expanded-node tracking with delayed collapse removal.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::controlled::KeySet;

/// Set of expanded node ids.
///
/// Collapsing removes the id from the set at once, so a following toggle sees
/// the node as collapsed. The collapsed subtree keeps its place in the
/// navigation order until the collapse delay has elapsed (see [`tick`]) or the
/// collapse is settled explicitly.
///
/// [`tick`]: ExpansionTracker::tick
#[derive(Debug, Clone)]
pub struct ExpansionTracker<Id> {
    expanded: HashSet<Id>,
    /// Collapsed ids whose subtree is still attached, with the collapse time.
    settling: HashMap<Id, Instant>,
    delay: Duration,
}

impl<Id: Clone + Eq + Hash> Default for ExpansionTracker<Id> {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl<Id: Clone + Eq + Hash> ExpansionTracker<Id> {
    pub fn new(delay: Duration) -> Self {
        Self {
            expanded: HashSet::new(),
            settling: HashMap::new(),
            delay,
        }
    }

    pub fn with_expanded(keys: impl IntoIterator<Item = Id>, delay: Duration) -> Self {
        Self {
            expanded: keys.into_iter().collect(),
            settling: HashMap::new(),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_expanded(&self, id: &Id) -> bool {
        self.expanded.contains(id)
    }

    /// Collapsed, but the subtree has not been detached yet.
    pub fn is_settling(&self, id: &Id) -> bool {
        self.settling.contains_key(id)
    }

    /// Whether the subtree of `id` belongs in the navigation order.
    pub fn shows_children(&self, id: &Id) -> bool {
        self.is_expanded(id) || self.is_settling(id)
    }

    pub fn has_pending(&self) -> bool {
        !self.settling.is_empty()
    }

    /// Expand a node. Returns true if it was not expanded before.
    pub fn expand(&mut self, id: Id) -> bool {
        self.settling.remove(&id);
        self.expanded.insert(id)
    }

    /// Collapse a node. Returns true if it was expanded.
    pub fn collapse(&mut self, id: &Id) -> bool {
        self.collapse_at(id, Instant::now())
    }

    pub fn collapse_at(&mut self, id: &Id, now: Instant) -> bool {
        if !self.expanded.remove(id) {
            return false;
        }
        if !self.delay.is_zero() {
            self.settling.insert(id.clone(), now);
        }
        true
    }

    /// Flip membership. Returns true if the node is now expanded.
    pub fn toggle(&mut self, id: &Id) -> bool {
        if self.is_expanded(id) {
            self.collapse(id);
            false
        } else {
            self.expand(id.clone());
            true
        }
    }

    /// Replace the expanded set, e.g. from an externally owned value.
    ///
    /// Ids dropped from the set start settling like a regular collapse.
    pub fn replace(&mut self, keys: HashSet<Id>) {
        let now = Instant::now();
        let removed: Vec<Id> = self
            .expanded
            .iter()
            .filter(|id| !keys.contains(*id))
            .cloned()
            .collect();
        for id in &removed {
            self.collapse_at(id, now);
        }
        for id in keys {
            self.expand(id);
        }
    }

    /// Detach subtrees whose collapse delay has elapsed.
    ///
    /// Returns true if anything settled.
    pub fn tick(&mut self, now: Instant) -> bool {
        let before = self.settling.len();
        let delay = self.delay;
        self.settling
            .retain(|_, started| now.saturating_duration_since(*started) < delay);
        before != self.settling.len()
    }

    /// Settle every pending collapse immediately.
    pub fn settle_all(&mut self) -> bool {
        let had_pending = self.has_pending();
        self.settling.clear();
        had_pending
    }

    /// Drop ids that no longer satisfy `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Id) -> bool) {
        self.expanded.retain(|id| keep(id));
        self.settling.retain(|id, _| keep(id));
    }
}

impl<Id: Clone + Eq + Hash> KeySet for ExpansionTracker<Id> {
    type Key = Id;

    fn keys(&self) -> &HashSet<Id> {
        &self.expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut expansion = ExpansionTracker::new(Duration::from_millis(100));
        assert!(expansion.toggle(&"a"));
        assert!(!expansion.toggle(&"a"));
        assert!(!expansion.is_expanded(&"a"));
        assert!(expansion.is_settling(&"a"));

        expansion.settle_all();
        assert!(!expansion.shows_children(&"a"));
    }

    #[test]
    fn test_tick_settles_after_delay() {
        let mut expansion = ExpansionTracker::with_expanded(["a"], Duration::from_millis(100));
        let start = Instant::now();
        expansion.collapse_at(&"a", start);

        assert!(!expansion.tick(start + Duration::from_millis(50)));
        assert!(expansion.shows_children(&"a"));
        assert!(expansion.tick(start + Duration::from_millis(100)));
        assert!(!expansion.shows_children(&"a"));
    }

    #[test]
    fn test_expand_cancels_settling() {
        let mut expansion = ExpansionTracker::with_expanded(["a"], Duration::from_secs(1));
        expansion.collapse(&"a");
        expansion.expand("a");
        assert!(expansion.is_expanded(&"a"));
        assert!(!expansion.has_pending());
    }

    #[test]
    fn test_zero_delay_detaches_immediately() {
        let mut expansion = ExpansionTracker::with_expanded(["a"], Duration::ZERO);
        expansion.collapse(&"a");
        assert!(!expansion.shows_children(&"a"));
    }
}

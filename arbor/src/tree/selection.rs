//! Selection engine for tree nodes.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use log::trace;

use crate::controlled::KeySet;
use crate::error::ParseSelectionModeError;

use super::item::TreeItem;
use super::registry::NodeRegistry;

/// Selection mode for the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// At most one node selected (radio-button style).
    #[default]
    Single,
    /// Any set of nodes, each toggled on its own (checkbox style).
    Multiple,
    /// Like `Multiple`, but toggling a node toggles its loaded subtree and a
    /// parent is selected exactly when all of its children are.
    MultipleRecursive,
}

impl SelectionMode {
    pub fn is_multiple(self) -> bool {
        !matches!(self, SelectionMode::Single)
    }
}

impl FromStr for SelectionMode {
    type Err = ParseSelectionModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multiple" | "multi" => Ok(Self::Multiple),
            "multiple-recursive" | "recursive" => Ok(Self::MultipleRecursive),
            other => Err(ParseSelectionModeError(other.to_string())),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::MultipleRecursive => "multiple-recursive",
        })
    }
}

/// Keys added and removed by one selection operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDelta<K> {
    pub added: Vec<K>,
    pub removed: Vec<K>,
}

impl<K> Default for SelectionDelta<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<K> SelectionDelta<K> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Append the changes of a later operation.
    pub fn extend(&mut self, later: SelectionDelta<K>) {
        self.added.extend(later.added);
        self.removed.extend(later.removed);
    }
}

/// Tracks selected nodes by id.
#[derive(Debug, Clone)]
pub struct Selection<K> {
    mode: SelectionMode,
    selected: HashSet<K>,
    /// Most recently toggled key; survives a single-mode clamp.
    last_toggled: Option<K>,
}

impl<K: Clone + Eq + Hash> Default for Selection<K> {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl<K: Clone + Eq + Hash> Selection<K> {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: HashSet::new(),
            last_toggled: None,
        }
    }

    /// Start from an initial set, clamped to the mode.
    pub fn with_keys(mode: SelectionMode, keys: impl IntoIterator<Item = K>) -> Self {
        let mut selection = Self::new(mode);
        selection.selected = keys.into_iter().collect();
        selection.clamp();
        selection
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch mode. Moving to `Single` clamps the current set.
    pub fn set_mode(&mut self, mode: SelectionMode) -> SelectionDelta<K> {
        self.mode = mode;
        self.clamp()
    }

    pub fn has(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    /// Toggle `key` according to the mode.
    ///
    /// Unknown keys are ignored.
    pub fn toggle<T>(&mut self, key: &K, registry: &NodeRegistry<T>) -> SelectionDelta<K>
    where
        T: TreeItem<Id = K>,
    {
        if !registry.contains(key) {
            return SelectionDelta::default();
        }
        self.last_toggled = Some(key.clone());

        let mut delta = SelectionDelta::default();
        match self.mode {
            SelectionMode::Single => {
                if self.selected.len() == 1 && self.selected.contains(key) {
                    self.remove(key, &mut delta);
                } else {
                    let had_key = self.selected.contains(key);
                    delta.removed = self.selected.drain().filter(|k| k != key).collect();
                    self.selected.insert(key.clone());
                    if !had_key {
                        delta.added.push(key.clone());
                    }
                }
            }
            SelectionMode::Multiple => {
                if !self.remove(key, &mut delta) {
                    self.insert(key.clone(), &mut delta);
                }
            }
            SelectionMode::MultipleRecursive => {
                if self.has(key) {
                    self.deselect_recursive(key, registry, &mut delta);
                } else {
                    self.select_recursive(key, registry, &mut delta);
                }
            }
        }
        trace!(
            "Selection toggle: +{} -{}",
            delta.added.len(),
            delta.removed.len()
        );
        delta
    }

    /// Primary activation of a node's label.
    ///
    /// In `Single` mode the node becomes the only selected node (activating it
    /// again keeps it selected). Multiple modes select through their
    /// checkboxes only, so nothing changes.
    pub fn select_link<T>(&mut self, key: &K, registry: &NodeRegistry<T>) -> SelectionDelta<K>
    where
        T: TreeItem<Id = K>,
    {
        let mut delta = SelectionDelta::default();
        if self.mode != SelectionMode::Single || !registry.contains(key) {
            return delta;
        }
        self.last_toggled = Some(key.clone());
        delta.removed = self.selected.drain().filter(|k| k != key).collect();
        self.insert(key.clone(), &mut delta);
        delta
    }

    fn insert(&mut self, key: K, delta: &mut SelectionDelta<K>) -> bool {
        if self.selected.insert(key.clone()) {
            delta.added.push(key);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, key: &K, delta: &mut SelectionDelta<K>) -> bool {
        if self.selected.remove(key) {
            delta.removed.push(key.clone());
            true
        } else {
            false
        }
    }

    fn select_recursive<T>(&mut self, key: &K, registry: &NodeRegistry<T>, delta: &mut SelectionDelta<K>)
    where
        T: TreeItem<Id = K>,
    {
        self.insert(key.clone(), delta);
        for descendant in registry.descendants(key) {
            self.insert(descendant, delta);
        }
        self.propagate_up(key, registry, delta);
    }

    fn deselect_recursive<T>(
        &mut self,
        key: &K,
        registry: &NodeRegistry<T>,
        delta: &mut SelectionDelta<K>,
    ) where
        T: TreeItem<Id = K>,
    {
        self.remove(key, delta);
        for descendant in registry.descendants(key) {
            self.remove(&descendant, delta);
        }
        for ancestor in registry.ancestors(key) {
            self.remove(&ancestor, delta);
        }
    }

    /// Select ancestors bottom-up while all of their children are selected.
    fn propagate_up<T>(&mut self, key: &K, registry: &NodeRegistry<T>, delta: &mut SelectionDelta<K>)
    where
        T: TreeItem<Id = K>,
    {
        for ancestor in registry.ancestors(key) {
            let children = registry
                .children_of(&ancestor)
                .map(|c| c.ids())
                .unwrap_or_default();
            let complete = !children.is_empty() && children.iter().all(|c| self.selected.contains(c));
            if !complete {
                break;
            }
            self.insert(ancestor, delta);
        }
    }

    /// Select every ancestor whose children are all selected.
    ///
    /// Seeded, written back or mode-switched sets are built without the
    /// recursive toggle, so they are closed bottom-up here. Other modes are
    /// unaffected.
    pub fn close_recursive<T>(&mut self, registry: &NodeRegistry<T>) -> SelectionDelta<K>
    where
        T: TreeItem<Id = K>,
    {
        let mut delta = SelectionDelta::default();
        if self.mode != SelectionMode::MultipleRecursive {
            return delta;
        }
        let seeds: Vec<K> = self.selected.iter().cloned().collect();
        for key in &seeds {
            self.propagate_up(key, registry, &mut delta);
        }
        delta
    }

    /// Re-apply recursive selection below `parent` after its children loaded.
    ///
    /// A selected parent selects its newly materialised subtree. Other modes
    /// are unaffected.
    pub fn apply_loaded<T>(&mut self, parent: &K, registry: &NodeRegistry<T>) -> SelectionDelta<K>
    where
        T: TreeItem<Id = K>,
    {
        let mut delta = SelectionDelta::default();
        if self.mode == SelectionMode::MultipleRecursive && self.has(parent) {
            for descendant in registry.descendants(parent) {
                self.insert(descendant, &mut delta);
            }
        }
        delta
    }

    /// Enforce single-mode cardinality, keeping the most recently toggled key.
    pub fn clamp(&mut self) -> SelectionDelta<K> {
        let mut delta = SelectionDelta::default();
        if self.mode != SelectionMode::Single || self.selected.len() <= 1 {
            return delta;
        }
        let keep = self
            .last_toggled
            .clone()
            .filter(|k| self.selected.contains(k))
            .or_else(|| self.selected.iter().next().cloned());
        delta.removed = self
            .selected
            .iter()
            .filter(|k| Some(*k) != keep.as_ref())
            .cloned()
            .collect();
        self.selected.retain(|k| Some(k) == keep.as_ref());
        delta
    }

    /// Replace the selected set, e.g. from an externally owned value.
    pub fn replace(&mut self, keys: HashSet<K>) -> SelectionDelta<K> {
        let previous = std::mem::replace(&mut self.selected, keys);
        self.clamp();
        SelectionDelta {
            added: self.selected.difference(&previous).cloned().collect(),
            removed: previous.difference(&self.selected).cloned().collect(),
        }
    }

    /// Drop keys that no longer satisfy `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.selected.retain(|k| keep(k));
        if self.last_toggled.as_ref().is_some_and(|k| !self.selected.contains(k)) {
            self.last_toggled = None;
        }
    }

    pub fn clear(&mut self) -> SelectionDelta<K> {
        SelectionDelta {
            added: Vec::new(),
            removed: self.selected.drain().collect(),
        }
    }
}

impl<K: Clone + Eq + Hash> KeySet for Selection<K> {
    type Key = K;

    fn keys(&self) -> &HashSet<K> {
        &self.selected
    }

    fn adopt_bookkeeping(&mut self, proposed: &Self) {
        self.last_toggled = proposed.last_toggled.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::item::{NodeKey, TreeNode};

    fn key(n: i64) -> NodeKey {
        NodeKey::Int(n)
    }

    /// 1 ─┬─ 2 ─┬─ 4
    ///    │     └─ 5
    ///    └─ 3
    fn registry() -> NodeRegistry<TreeNode> {
        NodeRegistry::from_items(
            vec![TreeNode::new(1, "root").with_children(vec![
                TreeNode::new(2, "a").with_children(vec![TreeNode::new(4, "a1"), TreeNode::new(5, "a2")]),
                TreeNode::new(3, "b").with_children(vec![]),
            ])],
            false,
        )
    }

    fn selected(selection: &Selection<NodeKey>) -> Vec<i64> {
        let mut keys: Vec<i64> = selection
            .iter()
            .map(|k| match k {
                NodeKey::Int(n) => *n,
                NodeKey::Text(_) => unreachable!(),
            })
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_single_mode_replaces_selection() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::Single);

        selection.toggle(&key(1), &registry);
        let delta = selection.toggle(&key(2), &registry);

        assert_eq!(selected(&selection), vec![2]);
        assert_eq!(delta.added, vec![key(2)]);
        assert_eq!(delta.removed, vec![key(1)]);

        selection.toggle(&key(2), &registry);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_multiple_mode_flips_only_target() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::Multiple);

        selection.toggle(&key(4), &registry);
        selection.toggle(&key(5), &registry);
        assert_eq!(selected(&selection), vec![4, 5]);

        selection.toggle(&key(4), &registry);
        assert_eq!(selected(&selection), vec![5]);
    }

    #[test]
    fn test_recursive_select_includes_descendants_and_complete_ancestors() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::MultipleRecursive);

        selection.toggle(&key(2), &registry);
        assert_eq!(selected(&selection), vec![2, 4, 5]);

        // 3 is a leaf sibling; selecting it completes the root
        selection.toggle(&key(3), &registry);
        assert_eq!(selected(&selection), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_recursive_children_select_parent_bottom_up() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::MultipleRecursive);

        selection.toggle(&key(4), &registry);
        assert_eq!(selected(&selection), vec![4]);
        selection.toggle(&key(5), &registry);
        assert_eq!(selected(&selection), vec![2, 4, 5]);
    }

    #[test]
    fn test_recursive_deselect_clears_ancestors() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::MultipleRecursive);

        selection.toggle(&key(1), &registry);
        assert_eq!(selected(&selection), vec![1, 2, 3, 4, 5]);

        selection.toggle(&key(5), &registry);
        assert_eq!(selected(&selection), vec![3, 4]);
    }

    #[test]
    fn test_childless_node_is_not_auto_selected() {
        let registry = NodeRegistry::from_items(
            vec![
                TreeNode::new(1, "empty").with_children(vec![]),
                TreeNode::new(2, "other"),
            ],
            false,
        );
        let mut selection = Selection::new(SelectionMode::MultipleRecursive);
        selection.toggle(&key(2), &registry);
        assert_eq!(selected(&selection), vec![2]);
    }

    #[test]
    fn test_select_link_only_selects_in_single_mode() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::Single);

        selection.select_link(&key(1), &registry);
        selection.select_link(&key(2), &registry);
        let delta = selection.select_link(&key(2), &registry);
        assert_eq!(selected(&selection), vec![2]);
        assert!(delta.is_empty());

        let mut selection = Selection::new(SelectionMode::Multiple);
        assert!(selection.select_link(&key(2), &registry).is_empty());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::Multiple);
        assert!(selection.toggle(&key(99), &registry).is_empty());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_clamp_keeps_last_toggled() {
        let registry = registry();
        let mut selection = Selection::new(SelectionMode::Multiple);
        selection.toggle(&key(3), &registry);
        selection.toggle(&key(4), &registry);

        let delta = selection.set_mode(SelectionMode::Single);

        assert_eq!(selected(&selection), vec![4]);
        assert_eq!(delta.removed, vec![key(3)]);
    }

    #[test]
    fn test_replace_reports_delta_after_clamp() {
        let mut selection = Selection::with_keys(SelectionMode::Multiple, [key(1)]);
        let delta = selection.replace(HashSet::from([key(2), key(3)]));
        assert_eq!(delta.removed, vec![key(1)]);
        assert_eq!(delta.added.len(), 2);
    }

    #[test]
    fn test_close_recursive_selects_complete_ancestors() {
        let registry = registry();
        let mut selection = Selection::with_keys(SelectionMode::MultipleRecursive, [key(4), key(5), key(3)]);

        let delta = selection.close_recursive(&registry);

        assert_eq!(selected(&selection), vec![1, 2, 3, 4, 5]);
        assert_eq!(delta.added.len(), 2);

        let mut flat = Selection::with_keys(SelectionMode::Multiple, [key(4), key(5)]);
        assert!(flat.close_recursive(&registry).is_empty());
        assert_eq!(selected(&flat), vec![4, 5]);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("multiple-recursive".parse::<SelectionMode>(), Ok(SelectionMode::MultipleRecursive));
        assert!("tree".parse::<SelectionMode>().is_err());
    }
}

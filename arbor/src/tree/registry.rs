//! Flat registry of tree nodes keyed by id.

use std::collections::{HashMap, HashSet};

use log::{trace, warn};

use super::item::TreeItem;

/// Loaded state of a node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children<Id> {
    /// Not fetched yet. Distinct from an empty list.
    Unloaded,
    /// Ordered child ids. Empty for a leaf.
    Loaded(Vec<Id>),
}

impl<Id> Children<Id> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Loaded child ids; empty while unloaded.
    pub fn ids(&self) -> &[Id] {
        match self {
            Self::Unloaded => &[],
            Self::Loaded(ids) => ids,
        }
    }

    /// Whether the node can be expanded: unloaded children count.
    pub fn may_have_children(&self) -> bool {
        match self {
            Self::Unloaded => true,
            Self::Loaded(ids) => !ids.is_empty(),
        }
    }
}

/// Registry entry for one node.
#[derive(Debug, Clone)]
pub struct NodeEntry<T: TreeItem> {
    pub item: T,
    pub parent: Option<T::Id>,
    pub children: Children<T::Id>,
    /// A child fetch is in flight.
    pub loading: bool,
}

/// Flat id → node mapping plus the ordered root list.
#[derive(Debug)]
pub struct NodeRegistry<T: TreeItem> {
    nodes: HashMap<T::Id, NodeEntry<T>>,
    roots: Vec<T::Id>,
    /// Nodes without supplied children start out unloaded.
    lazy: bool,
}

impl<T: TreeItem> Default for NodeRegistry<T> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<T: TreeItem> NodeRegistry<T> {
    pub fn new(lazy: bool) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            lazy,
        }
    }

    /// Build a registry from root items, registering every supplied subtree.
    pub fn from_items(items: Vec<T>, lazy: bool) -> Self {
        let mut registry = Self::new(lazy);
        let roots = items
            .into_iter()
            .map(|item| registry.insert(item, None))
            .collect();
        registry.roots = roots;
        registry
    }

    fn insert(&mut self, item: T, parent: Option<T::Id>) -> T::Id {
        let id = item.id();
        let children = match item.children() {
            Some(children) => Children::Loaded(
                children
                    .into_iter()
                    .map(|child| self.insert(child, Some(id.clone())))
                    .collect(),
            ),
            None if self.lazy => Children::Unloaded,
            None => Children::Loaded(Vec::new()),
        };
        let entry = NodeEntry {
            item,
            parent,
            children,
            loading: false,
        };
        if self.nodes.insert(id.clone(), entry).is_some() {
            warn!("Duplicate tree node id {:?}, keeping the last one", id);
        }
        id
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &T::Id) -> Option<&NodeEntry<T>> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &T::Id) -> Option<&mut NodeEntry<T>> {
        self.nodes.get_mut(id)
    }

    pub fn roots(&self) -> &[T::Id] {
        &self.roots
    }

    /// Children of `id`, or `None` if the node is not registered.
    pub fn children_of(&self, id: &T::Id) -> Option<&Children<T::Id>> {
        self.nodes.get(id).map(|entry| &entry.children)
    }

    pub fn parent_of(&self, id: &T::Id) -> Option<&T::Id> {
        self.nodes.get(id).and_then(|entry| entry.parent.as_ref())
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: &T::Id) -> Vec<T::Id> {
        let mut out = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            out.push(parent.clone());
            current = self.parent_of(parent);
        }
        out
    }

    /// Loaded descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: &T::Id) -> Vec<T::Id> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: &T::Id, out: &mut Vec<T::Id>) {
        if let Some(entry) = self.nodes.get(id) {
            for child in entry.children.ids() {
                out.push(child.clone());
                self.collect_descendants(child, out);
            }
        }
    }

    /// Merge freshly loaded children under `parent`.
    ///
    /// Children that are already registered under `parent` with a loaded
    /// subtree keep it; only their payload is refreshed. Children no longer
    /// listed are dropped along with their subtrees. Marks `parent` loaded.
    ///
    /// Returns the new child ids, or `None` if `parent` is unknown.
    pub fn set_children(&mut self, parent: &T::Id, items: Vec<T>) -> Option<Vec<T::Id>> {
        let previous = self.nodes.get(parent)?.children.ids().to_vec();

        let mut ids = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        for item in items {
            let id = item.id();
            if !seen.insert(id.clone()) {
                warn!("Duplicate child {:?} loaded under {:?}, skipping", id, parent);
                continue;
            }
            let existing = self.nodes.get(&id).map(|entry| {
                (
                    entry.parent.as_ref() == Some(parent),
                    entry.children.is_loaded(),
                )
            });
            match existing {
                Some((true, true)) => {
                    if let Some(entry) = self.nodes.get_mut(&id) {
                        entry.item = item;
                    }
                    ids.push(id);
                }
                Some((true, false)) => {
                    self.remove_subtree(&id);
                    ids.push(self.insert(item, Some(parent.clone())));
                }
                Some((false, _)) => {
                    warn!(
                        "Loaded child {:?} of {:?} is already registered elsewhere, skipping",
                        id, parent
                    );
                }
                None => {
                    if let Some(taken) = self.first_registered(&item) {
                        warn!(
                            "Loaded subtree {:?} of {:?} reuses registered id {:?}, skipping",
                            id, parent, taken
                        );
                        continue;
                    }
                    ids.push(self.insert(item, Some(parent.clone())));
                }
            }
        }

        let current: HashSet<&T::Id> = ids.iter().collect();
        let stale: Vec<T::Id> = previous
            .into_iter()
            .filter(|id| !current.contains(id))
            .collect();
        for id in &stale {
            self.remove_subtree(id);
        }

        let entry = self.nodes.get_mut(parent)?;
        entry.children = Children::Loaded(ids.clone());
        entry.loading = false;
        trace!("Registered {} children under {:?}", ids.len(), parent);
        Some(ids)
    }

    /// First id in the supplied subtree of `item` that is already registered.
    fn first_registered(&self, item: &T) -> Option<T::Id> {
        let id = item.id();
        if self.nodes.contains_key(&id) {
            return Some(id);
        }
        item.children()
            .unwrap_or_default()
            .iter()
            .find_map(|child| self.first_registered(child))
    }

    fn remove_subtree(&mut self, id: &T::Id) {
        if let Some(entry) = self.nodes.remove(id) {
            for child in entry.children.ids() {
                self.remove_subtree(child);
            }
        }
    }
}

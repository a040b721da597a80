//! Tree state handle.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use log::{debug, trace, warn};
use tokio::runtime::Handle;

use crate::controlled::{Change, Controlled, KeySet};
use crate::error::{LoadError, TreeError};
use crate::key::KeyCombo;

use super::config::{ErrorHook, TreeConfig};
use super::expansion::ExpansionTracker;
use super::item::TreeItem;
use super::loader::{LoadCoordinator, LoadHandle, LoadOutcome, LoadTicket, Loader};
use super::navigation::{FlatNode, NavAction, flatten, navigate};
use super::registry::{Children, NodeRegistry};
use super::render::{NodeRenderer, RowState};
use super::selection::{Selection, SelectionDelta, SelectionMode};

/// Result of routing an input event into the tree.
#[derive(Debug)]
pub enum KeyOutcome<Id> {
    /// The tree had nothing to do with the event.
    Ignored,
    /// The event changed (or was meant to change) the tree.
    Consumed,
    /// The event started loading the children of a node.
    Loading(LoadHandle<Id>),
}

impl<Id> KeyOutcome<Id> {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }

    /// The started load, if any.
    pub fn into_load(self) -> Option<LoadHandle<Id>> {
        match self {
            KeyOutcome::Loading(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Side effects collected during one transition and applied after the state
/// lock is released.
struct Effects<T: TreeItem> {
    dirty: bool,
    changes: Vec<Change<T::Id>>,
    load: Option<LoadTicket<T>>,
}

impl<T: TreeItem> Default for Effects<T> {
    fn default() -> Self {
        Self {
            dirty: false,
            changes: Vec::new(),
            load: None,
        }
    }
}

impl<T: TreeItem> Effects<T> {
    fn notify(&mut self, change: Option<Change<T::Id>>) {
        self.changes.extend(change);
    }
}

/// Internal state for the Tree.
struct TreeInner<T: TreeItem> {
    registry: NodeRegistry<T>,
    expansion: Controlled<ExpansionTracker<T::Id>>,
    selection: Controlled<Selection<T::Id>>,
    loads: LoadCoordinator<T::Id>,
    /// Flattened visible nodes (rebuilt after every transition).
    visible: Vec<FlatNode<T>>,
    focus: Option<T::Id>,
}

impl<T: TreeItem> TreeInner<T> {
    fn new(items: Vec<T>, config: TreeConfig<T::Id>, lazy: bool) -> Self {
        let delay = config.collapse_delay;
        let expansion = match config.expanded_keys {
            Some(keys) => Controlled::external(
                ExpansionTracker::with_expanded(keys, delay),
                config.on_expanded_change,
            ),
            None => Controlled::internal(
                ExpansionTracker::with_expanded(config.default_expanded_keys, delay),
                config.on_expanded_change,
            ),
        };
        let mode = config.selection_mode;
        let selection = match config.selected_keys {
            Some(keys) => {
                Controlled::external(Selection::with_keys(mode, keys), config.on_selection_change)
            }
            None => Controlled::internal(
                Selection::with_keys(mode, config.default_selected_keys),
                config.on_selection_change,
            ),
        };

        let registry = NodeRegistry::from_items(items, lazy);
        let mut selection = selection;
        selection.get_mut().close_recursive(&registry);

        let mut inner = Self {
            registry,
            expansion,
            selection,
            loads: LoadCoordinator::new(),
            visible: Vec::new(),
            focus: None,
        };
        inner.rebuild_visible();
        inner
    }

    /// Rebuild the flattened visible node list and clamp focus to it.
    fn rebuild_visible(&mut self) {
        self.visible = flatten(&self.registry, self.expansion.get());

        let Some(focus) = self.focus.take() else {
            return;
        };
        let is_visible = |id: &T::Id| self.visible.iter().any(|node| &node.id == id);
        self.focus = if is_visible(&focus) {
            Some(focus)
        } else {
            self.registry
                .ancestors(&focus)
                .into_iter()
                .find(|id| is_visible(id))
                .or_else(|| self.visible.first().map(|node| node.id.clone()))
        };
    }

    fn is_visible(&self, id: &T::Id) -> bool {
        self.visible.iter().any(|node| &node.id == id)
    }

    fn expand(&mut self, id: &T::Id, fx: &mut Effects<T>, can_load: bool) {
        let Some(entry) = self.registry.get(id) else {
            return;
        };
        let needs_load = !entry.children.is_loaded() && !entry.loading;

        let (expanded, change) = self.expansion.update(|e| e.expand(id.clone()));
        fx.notify(change);
        if expanded {
            trace!("Expanded {:?}", id);
        }
        if needs_load {
            self.begin_load(id, fx, can_load);
        }
        fx.dirty = true;
    }

    fn collapse(&mut self, id: &T::Id, fx: &mut Effects<T>) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        let (collapsed, change) = self.expansion.update(|e| e.collapse(id));
        fx.notify(change);
        if collapsed {
            trace!("Collapsed {:?}", id);
            fx.dirty = true;
        }
        collapsed
    }

    fn toggle_expand(&mut self, id: &T::Id, fx: &mut Effects<T>, can_load: bool) {
        if self.expansion.get().is_expanded(id) {
            self.collapse(id, fx);
        } else {
            self.expand(id, fx, can_load);
        }
    }

    fn begin_load(&mut self, id: &T::Id, fx: &mut Effects<T>, can_load: bool) {
        if !can_load {
            warn!("No loader or tokio runtime, children of {:?} stay unloaded", id);
            return;
        }
        match self.loads.begin(&mut self.registry, id) {
            Ok(ticket) => {
                fx.load = Some(ticket);
                fx.dirty = true;
            }
            Err(e) => debug!("Not loading: {}", e),
        }
    }

    fn toggle_select(&mut self, id: &T::Id, fx: &mut Effects<T>) -> SelectionDelta<T::Id> {
        // Selection is disabled while the node's children are loading
        if self.registry.get(id).is_some_and(|entry| entry.loading) {
            return SelectionDelta::default();
        }
        let registry = &self.registry;
        let (delta, change) = self.selection.update(|s| s.toggle(id, registry));
        fx.notify(change);
        fx.dirty |= !delta.is_empty();
        delta
    }

    fn select_link(&mut self, id: &T::Id, fx: &mut Effects<T>) -> SelectionDelta<T::Id> {
        let registry = &self.registry;
        let (delta, change) = self.selection.update(|s| s.select_link(id, registry));
        fx.notify(change);
        fx.dirty |= !delta.is_empty();
        delta
    }

    fn row_state(&self, node: &FlatNode<T>) -> RowState {
        RowState {
            depth: node.depth,
            expanded: node.is_expanded,
            selected: self.selection.get().has(&node.id),
            loading: node.is_loading,
            focused: self.focus.as_ref() == Some(&node.id),
            has_children: node.has_children,
        }
    }
}

/// Interaction state for a tree of `T` items.
///
/// `Tree<T>` manages hierarchical data with:
/// - Expand/collapse state per node, with delayed removal of collapsed rows
/// - Focus navigation over the visible rows
/// - Single, multiple and recursive selection by node ID
/// - Lazy loading of children through a [`Loader`]
///
/// The handle is cheap to clone; clones share state. Every action applies all
/// of its mutations under one write lock, so no intermediate state is ever
/// observable, and change hooks run after the lock is released.
///
/// # Example
///
/// ```
/// use arbor::key::{Key, KeyCombo};
/// use arbor::tree::{NodeKey, Tree, TreeNode};
///
/// let tree = Tree::with_items(vec![
///     TreeNode::new(1, "Root").with_children(vec![TreeNode::new(2, "Child")]),
/// ]);
///
/// tree.on_key(&KeyCombo::key(Key::Down));
/// tree.on_key(&KeyCombo::key(Key::Right));
/// assert_eq!(tree.visible_ids(), vec![NodeKey::Int(1), NodeKey::Int(2)]);
/// ```
pub struct Tree<T: TreeItem> {
    inner: Arc<RwLock<TreeInner<T>>>,
    loader: Option<Arc<dyn Loader<T>>>,
    on_load_error: Option<ErrorHook>,
    /// Dirty flag for re-render.
    dirty: Arc<AtomicBool>,
}

impl<T: TreeItem> Tree<T> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a tree with initial root items and the default configuration.
    pub fn with_items(items: Vec<T>) -> Self {
        Self::builder().items(items).build()
    }

    pub fn builder() -> TreeBuilder<T> {
        TreeBuilder::new()
    }

    /// Run one transition under the write lock.
    ///
    /// Rebuilds the visible list if anything changed, then (lock released)
    /// emits change notifications and spawns the requested load.
    fn transition<R>(
        &self,
        f: impl FnOnce(&mut TreeInner<T>, &mut Effects<T>) -> R,
    ) -> Option<(R, Option<LoadHandle<T::Id>>)> {
        let mut fx = Effects::default();
        let result = {
            let mut guard = self.inner.write().ok()?;
            let result = f(&mut *guard, &mut fx);
            if fx.dirty {
                guard.rebuild_visible();
            }
            result
        };

        if fx.dirty {
            self.dirty.store(true, Ordering::SeqCst);
        }
        for change in fx.changes {
            change.emit();
        }
        let handle = fx.load.map(|ticket| self.spawn_ticket(ticket));
        Some((result, handle))
    }

    fn read<R>(&self, f: impl FnOnce(&TreeInner<T>) -> R) -> Option<R> {
        self.inner.read().ok().map(|guard| f(&guard))
    }

    /// Whether a load started now could run to completion.
    fn can_load(&self) -> bool {
        self.loader.is_some() && Handle::try_current().is_ok()
    }

    // -------------------------------------------------------------------------
    // Item access
    // -------------------------------------------------------------------------

    /// Replace the root items.
    ///
    /// Internally owned expansion and selection keep the ids that still
    /// exist. Loads still in flight are discarded when they complete.
    pub fn set_items(&self, items: Vec<T>) {
        let lazy = self.loader.is_some();
        self.transition(|inner, fx| {
            inner.registry = NodeRegistry::from_items(items, lazy);
            inner.loads.reset();

            let registry = &inner.registry;
            if !inner.expansion.is_external() {
                inner.expansion.get_mut().retain(|id| registry.contains(id));
            }
            if !inner.selection.is_external() {
                inner.selection.get_mut().retain(|id| registry.contains(id));
            }
            let (_, change) = inner.selection.enforce(|s| s.close_recursive(registry));
            fx.notify(change);
            fx.dirty = true;
        });
    }

    /// Get a registered item by ID, whether visible or not.
    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.read(|inner| inner.registry.get(id).map(|entry| entry.item.clone()))
            .flatten()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.read(|inner| inner.registry.contains(id))
            .unwrap_or(false)
    }

    /// Children of a node, or `None` if it is not registered.
    pub fn children_of(&self, id: &T::Id) -> Option<Children<T::Id>> {
        self.read(|inner| inner.registry.children_of(id).cloned())
            .flatten()
    }

    pub fn parent_of(&self, id: &T::Id) -> Option<T::Id> {
        self.read(|inner| inner.registry.parent_of(id).cloned())
            .flatten()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.read(|inner| inner.registry.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self, id: &T::Id) -> bool {
        self.read(|inner| inner.registry.get(id).is_some_and(|entry| entry.loading))
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Expand/Collapse
    // -------------------------------------------------------------------------

    /// Expand a node, loading its children if they were never fetched.
    pub fn expand(&self, id: &T::Id) -> Option<LoadHandle<T::Id>> {
        let can_load = self.can_load();
        self.transition(|inner, fx| inner.expand(id, fx, can_load))
            .and_then(|(_, handle)| handle)
    }

    /// Collapse a node. Returns true if it was expanded.
    pub fn collapse(&self, id: &T::Id) -> bool {
        self.transition(|inner, fx| inner.collapse(id, fx))
            .is_some_and(|(collapsed, _)| collapsed)
    }

    /// Toggle expand/collapse for a node.
    pub fn toggle_expand(&self, id: &T::Id) -> Option<LoadHandle<T::Id>> {
        let can_load = self.can_load();
        self.transition(|inner, fx| inner.toggle_expand(id, fx, can_load))
            .and_then(|(_, handle)| handle)
    }

    /// Whether the node is in the expanded set.
    pub fn is_expanded(&self, id: &T::Id) -> bool {
        self.read(|inner| inner.expansion.get().is_expanded(id))
            .unwrap_or(false)
    }

    pub fn expanded_keys(&self) -> HashSet<T::Id> {
        self.read(|inner| inner.expansion.get().keys().clone())
            .unwrap_or_default()
    }

    /// Write the expanded set, e.g. an embedder accepting a proposed change.
    pub fn set_expanded_keys(&self, keys: impl IntoIterator<Item = T::Id>) {
        let keys: HashSet<T::Id> = keys.into_iter().collect();
        self.transition(|inner, fx| {
            inner.expansion.get_mut().replace(keys);
            fx.dirty = true;
        });
    }

    /// Detach collapsed subtrees whose collapse delay has elapsed.
    pub fn tick(&self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&self, now: Instant) -> bool {
        self.transition(|inner, fx| {
            let settled = inner.expansion.get_mut().tick(now);
            fx.dirty = settled;
            settled
        })
        .is_some_and(|(settled, _)| settled)
    }

    /// Detach every collapsed subtree now.
    pub fn settle(&self) -> bool {
        self.transition(|inner, fx| {
            let settled = inner.expansion.get_mut().settle_all();
            fx.dirty = settled;
            settled
        })
        .is_some_and(|(settled, _)| settled)
    }

    /// Whether a collapse is waiting for its delay.
    pub fn has_pending_collapse(&self) -> bool {
        self.read(|inner| inner.expansion.get().has_pending())
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn selection_mode(&self) -> SelectionMode {
        self.read(|inner| inner.selection.get().mode())
            .unwrap_or_default()
    }

    /// Switch the selection mode, clamping the selection when moving to single.
    pub fn set_selection_mode(&self, mode: SelectionMode) -> SelectionDelta<T::Id> {
        self.transition(|inner, fx| {
            let registry = &inner.registry;
            let (delta, change) = inner.selection.enforce(|s| {
                let mut delta = s.set_mode(mode);
                delta.extend(s.close_recursive(registry));
                delta
            });
            fx.notify(change);
            fx.dirty = true;
            delta
        })
        .map(|(delta, _)| delta)
        .unwrap_or_default()
    }

    /// Toggle selection of a node according to the selection mode.
    pub fn toggle_select(&self, id: &T::Id) -> SelectionDelta<T::Id> {
        self.transition(|inner, fx| inner.toggle_select(id, fx))
            .map(|(delta, _)| delta)
            .unwrap_or_default()
    }

    /// Primary activation of a node's label. See [`Selection::select_link`].
    pub fn select_link(&self, id: &T::Id) -> SelectionDelta<T::Id> {
        self.transition(|inner, fx| inner.select_link(id, fx))
            .map(|(delta, _)| delta)
            .unwrap_or_default()
    }

    pub fn is_selected(&self, id: &T::Id) -> bool {
        self.read(|inner| inner.selection.get().has(id))
            .unwrap_or(false)
    }

    pub fn selected_keys(&self) -> HashSet<T::Id> {
        self.read(|inner| inner.selection.get().keys().clone())
            .unwrap_or_default()
    }

    /// Selected items, in visible order first, then the rest.
    pub fn selected_items(&self) -> Vec<T> {
        self.read(|inner| {
            let selection = inner.selection.get();
            let mut items: Vec<T> = inner
                .visible
                .iter()
                .filter(|node| selection.has(&node.id))
                .map(|node| node.item.clone())
                .collect();
            items.extend(
                selection
                    .iter()
                    .filter(|id| !inner.is_visible(id))
                    .filter_map(|id| inner.registry.get(id))
                    .map(|entry| entry.item.clone()),
            );
            items
        })
        .unwrap_or_default()
    }

    /// Write the selected set, e.g. an embedder accepting a proposed change.
    ///
    /// Sets too large for single mode are clamped and recursive sets are
    /// closed over complete parents; an adjusted set is reported through
    /// `on_selection_change`.
    pub fn set_selected_keys(&self, keys: impl IntoIterator<Item = T::Id>) -> SelectionDelta<T::Id> {
        let keys: HashSet<T::Id> = keys.into_iter().collect();
        self.transition(|inner, fx| {
            let registry = &inner.registry;
            let (delta, change) = inner.selection.write_back(&keys, |s| {
                let mut delta = s.replace(keys.clone());
                delta.extend(s.close_recursive(registry));
                delta
            });
            fx.notify(change);
            fx.dirty = true;
            delta
        })
        .map(|(delta, _)| delta)
        .unwrap_or_default()
    }

    pub fn deselect_all(&self) -> SelectionDelta<T::Id> {
        self.transition(|inner, fx| {
            let (delta, change) = inner.selection.update(|s| s.clear());
            fx.notify(change);
            fx.dirty |= !delta.is_empty();
            delta
        })
        .map(|(delta, _)| delta)
        .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Focus and visible rows
    // -------------------------------------------------------------------------

    /// Focus a visible node. Returns false if it is not visible.
    pub fn focus(&self, id: &T::Id) -> bool {
        self.transition(|inner, fx| {
            if !inner.is_visible(id) {
                return false;
            }
            if inner.focus.as_ref() != Some(id) {
                inner.focus = Some(id.clone());
                fx.dirty = true;
            }
            true
        })
        .is_some_and(|(focused, _)| focused)
    }

    pub fn focused(&self) -> Option<T::Id> {
        self.read(|inner| inner.focus.clone()).flatten()
    }

    /// The flattened visible rows in navigation order.
    pub fn visible(&self) -> Vec<FlatNode<T>> {
        self.read(|inner| inner.visible.clone()).unwrap_or_default()
    }

    pub fn visible_ids(&self) -> Vec<T::Id> {
        self.read(|inner| inner.visible.iter().map(|node| node.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Render every visible row.
    ///
    /// Row states are captured first; the renderer runs without the state
    /// lock, so it may call back into the tree.
    pub fn render_with<R: NodeRenderer<T>>(&self, renderer: &R) -> Vec<R::Output> {
        let rows: Vec<(T, RowState)> = self
            .read(|inner| {
                inner
                    .visible
                    .iter()
                    .map(|node| (node.item.clone(), inner.row_state(node)))
                    .collect()
            })
            .unwrap_or_default();
        rows.iter()
            .map(|(item, state)| renderer.render(item, state))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Route a key press to the focused node.
    pub fn on_key(&self, key: &KeyCombo) -> KeyOutcome<T::Id> {
        let can_load = self.can_load();
        let result = self.transition(|inner, fx| {
            match navigate(&inner.visible, inner.focus.as_ref(), key) {
                NavAction::None => false,
                NavAction::Focus(id) => {
                    inner.focus = Some(id);
                    fx.dirty = true;
                    true
                }
                NavAction::Expand(id) => {
                    inner.expand(&id, fx, can_load);
                    true
                }
                NavAction::Collapse(id) => {
                    inner.collapse(&id, fx);
                    true
                }
                NavAction::Select(id) => {
                    inner.toggle_select(&id, fx);
                    true
                }
                NavAction::Activate(id) => {
                    inner.select_link(&id, fx);
                    true
                }
            }
        });
        Self::outcome(result)
    }

    /// A click on a node's row.
    ///
    /// Focuses the node, selects it in single mode and toggles its expansion
    /// if it has (or may load) children.
    pub fn click(&self, id: &T::Id) -> KeyOutcome<T::Id> {
        let can_load = self.can_load();
        let result = self.transition(|inner, fx| {
            let Some(entry) = inner.registry.get(id) else {
                return false;
            };
            let expandable = entry.children.may_have_children();

            inner.focus = Some(id.clone());
            fx.dirty = true;
            inner.select_link(id, fx);
            if expandable {
                inner.toggle_expand(id, fx, can_load);
            }
            true
        });
        Self::outcome(result)
    }

    fn outcome(result: Option<(bool, Option<LoadHandle<T::Id>>)>) -> KeyOutcome<T::Id> {
        match result {
            Some((_, Some(handle))) => KeyOutcome::Loading(handle),
            Some((true, None)) => KeyOutcome::Consumed,
            _ => KeyOutcome::Ignored,
        }
    }

    // -------------------------------------------------------------------------
    // Lazy loading
    // -------------------------------------------------------------------------

    /// Load the children of a node and merge them into the tree.
    ///
    /// The loader runs without the state lock held.
    pub async fn load(&self, id: &T::Id) -> Result<LoadOutcome<T::Id>, TreeError> {
        let loader = self.loader.clone().ok_or(TreeError::NoLoader)?;
        let ticket = {
            let mut guard = self.inner.write().map_err(|_| TreeError::Poisoned)?;
            let inner = &mut *guard;
            let ticket = inner.loads.begin(&mut inner.registry, id)?;
            inner.rebuild_visible();
            ticket
        };
        self.dirty.store(true, Ordering::SeqCst);

        let result = loader.load(&ticket.item).await;
        self.merge(ticket, result)
    }

    /// Start loading the children of a node on the current tokio runtime.
    ///
    /// Returns `None` if no load was started: no loader, no runtime, or the
    /// node is unknown, loading or loaded already.
    pub fn spawn_load(&self, id: &T::Id) -> Option<LoadHandle<T::Id>> {
        let can_load = self.can_load();
        self.transition(|inner, fx| inner.begin_load(id, fx, can_load))
            .and_then(|(_, handle)| handle)
    }

    fn spawn_ticket(&self, ticket: LoadTicket<T>) -> LoadHandle<T::Id> {
        let tree = self.clone();
        let id = ticket.id.clone();
        let task = tokio::spawn(async move {
            let result = match &tree.loader {
                Some(loader) => loader.load(&ticket.item).await,
                None => Err(LoadError::new("no loader configured")),
            };
            let merged = tree.merge(ticket, result);
            if let Err(e) = &merged
                && !matches!(e, TreeError::Superseded(_))
                && let Some(hook) = &tree.on_load_error
            {
                hook(e);
            }
            merged
        });
        LoadHandle::new(id, task)
    }

    /// Commit a finished load.
    ///
    /// The node counts as expanded if it is in the expanded set now,
    /// whatever happened to it while the loader ran.
    fn merge(
        &self,
        ticket: LoadTicket<T>,
        result: Result<Vec<T>, LoadError>,
    ) -> Result<LoadOutcome<T::Id>, TreeError> {
        let mut changes = Vec::new();
        let outcome = {
            let mut guard = self.inner.write().map_err(|_| TreeError::Poisoned)?;
            let inner = &mut *guard;
            let id = ticket.id.clone();
            let outcome = inner
                .loads
                .finish(ticket, result, &mut inner.registry)
                .map(|children| {
                    let registry = &inner.registry;
                    let (selection, change) =
                        inner.selection.update(|s| s.apply_loaded(&id, registry));
                    changes.extend(change);
                    LoadOutcome {
                        expanded: inner.expansion.get().is_expanded(&id),
                        id,
                        children,
                        selection,
                    }
                });
            inner.rebuild_visible();
            outcome
        };

        self.dirty.store(true, Ordering::SeqCst);
        for change in changes {
            change.emit();
        }
        outcome
    }

    // -------------------------------------------------------------------------
    // Dirty flag
    // -------------------------------------------------------------------------

    /// Whether the tree changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<T: TreeItem> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            loader: self.loader.clone(),
            on_load_error: self.on_load_error.clone(),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<T: TreeItem> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TreeItem> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Tree");
        if let Ok(inner) = self.inner.read() {
            s.field("nodes", &inner.registry.len())
                .field("visible", &inner.visible.len())
                .field("focus", &inner.focus)
                .field("loading", &inner.loads.in_flight());
        }
        s.field("lazy", &self.loader.is_some())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

/// Builder for a [`Tree`] with items, configuration and a loader.
pub struct TreeBuilder<T: TreeItem> {
    items: Vec<T>,
    config: TreeConfig<T::Id>,
    loader: Option<Arc<dyn Loader<T>>>,
}

impl<T: TreeItem> Default for TreeBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TreeItem> TreeBuilder<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            config: TreeConfig::default(),
            loader: None,
        }
    }

    /// Root items.
    pub fn items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    pub fn config(mut self, config: TreeConfig<T::Id>) -> Self {
        self.config = config;
        self
    }

    /// Loader for children not supplied with the items. With a loader, a
    /// node whose `children()` is `None` starts out unloaded.
    pub fn loader(mut self, loader: impl Loader<T> + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn build(mut self) -> Tree<T> {
        let on_load_error = self.config.on_load_error.take();
        let inner = TreeInner::new(self.items, self.config, self.loader.is_some());
        Tree {
            inner: Arc::new(RwLock::new(inner)),
            loader: self.loader,
            on_load_error,
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }
}

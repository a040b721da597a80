//! Flattened visible order and keyboard navigation.

use crate::key::{Key, KeyCombo};

use super::expansion::ExpansionTracker;
use super::item::TreeItem;
use super::registry::{Children, NodeRegistry};

/// A visible node in the flattened tree.
#[derive(Debug, Clone)]
pub struct FlatNode<T: TreeItem> {
    pub id: T::Id,
    /// The item itself.
    pub item: T,
    pub parent: Option<T::Id>,
    /// Depth in tree (0 = root).
    pub depth: u16,
    /// Whether this node has, or may load, children.
    pub has_children: bool,
    /// Whether this node is currently expanded (loading counts).
    pub is_expanded: bool,
    /// Whether a child fetch is in flight.
    pub is_loading: bool,
}

/// Pre-order listing of every node whose ancestors are all expanded.
///
/// A collapsed node whose collapse is still settling keeps its subtree in the
/// listing.
pub fn flatten<T: TreeItem>(
    registry: &NodeRegistry<T>,
    expansion: &ExpansionTracker<T::Id>,
) -> Vec<FlatNode<T>> {
    let mut out = Vec::with_capacity(registry.roots().len());
    collect_visible(registry, expansion, registry.roots(), 0, &mut out);
    out
}

fn collect_visible<T: TreeItem>(
    registry: &NodeRegistry<T>,
    expansion: &ExpansionTracker<T::Id>,
    ids: &[T::Id],
    depth: u16,
    out: &mut Vec<FlatNode<T>>,
) {
    for id in ids {
        let Some(entry) = registry.get(id) else {
            continue;
        };
        out.push(FlatNode {
            id: id.clone(),
            item: entry.item.clone(),
            parent: entry.parent.clone(),
            depth,
            has_children: entry.children.may_have_children(),
            // An unloaded node only counts as expanded while its fetch runs
            is_expanded: expansion.is_expanded(id) && (entry.children.is_loaded() || entry.loading),
            is_loading: entry.loading,
        });

        if expansion.shows_children(id)
            && let Children::Loaded(children) = &entry.children
        {
            collect_visible(registry, expansion, children, depth + 1, out);
        }
    }
}

/// What a key press asks the tree to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction<Id> {
    /// Move focus to this node.
    Focus(Id),
    /// Expand this node, loading its children if needed.
    Expand(Id),
    Collapse(Id),
    /// Toggle selection of this node.
    Select(Id),
    /// Primary activation, like clicking the node's label.
    Activate(Id),
    /// Nothing to do (boundary, lookup miss, unhandled key).
    None,
}

/// Compute the transition for `key` with focus on `focus`.
///
/// Keys held with ctrl or alt are left to the embedder.
pub fn navigate<T: TreeItem>(
    visible: &[FlatNode<T>],
    focus: Option<&T::Id>,
    key: &KeyCombo,
) -> NavAction<T::Id> {
    if key.modifiers.has_command() || visible.is_empty() {
        return NavAction::None;
    }

    let index = focus.and_then(|id| visible.iter().position(|node| &node.id == id));
    let Some(index) = index else {
        // Nothing focused yet: the first movement lands on the first row
        return match key.key {
            Key::Down | Key::Up | Key::Home => NavAction::Focus(visible[0].id.clone()),
            Key::End => NavAction::Focus(visible[visible.len() - 1].id.clone()),
            _ => NavAction::None,
        };
    };
    let node = &visible[index];

    match key.key {
        Key::Right if node.is_expanded => match visible.get(index + 1) {
            Some(next) if next.parent.as_ref() == Some(&node.id) => NavAction::Focus(next.id.clone()),
            _ => NavAction::None,
        },
        Key::Right if node.has_children => NavAction::Expand(node.id.clone()),
        Key::Left if node.is_expanded => NavAction::Collapse(node.id.clone()),
        Key::Left => match &node.parent {
            Some(parent) => NavAction::Focus(parent.clone()),
            None => NavAction::None,
        },
        Key::Down => match visible.get(index + 1) {
            Some(next) => NavAction::Focus(next.id.clone()),
            None => NavAction::None,
        },
        Key::Up if index > 0 => NavAction::Focus(visible[index - 1].id.clone()),
        Key::Home if index > 0 => NavAction::Focus(visible[0].id.clone()),
        Key::End if index + 1 < visible.len() => {
            NavAction::Focus(visible[visible.len() - 1].id.clone())
        }
        Key::Space => NavAction::Select(node.id.clone()),
        Key::Enter => NavAction::Activate(node.id.clone()),
        _ => NavAction::None,
    }
}

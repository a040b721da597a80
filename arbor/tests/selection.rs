use std::collections::HashSet;
use std::time::Duration;

use arbor::tree::{NodeKey, SelectionMode, Tree, TreeConfig, TreeNode};

fn key(n: i64) -> NodeKey {
    NodeKey::Int(n)
}

fn keys(ids: &[i64]) -> HashSet<NodeKey> {
    ids.iter().map(|n| key(*n)).collect()
}

/// Root(1) ─┬─ A(2) ─┬─ A1(4)
///          │        └─ A2(5)
///          └─ B(3)
fn tree(mode: SelectionMode) -> Tree<TreeNode> {
    Tree::builder()
        .items(vec![TreeNode::new(1, "Root").with_children(vec![
            TreeNode::new(2, "A").with_children(vec![TreeNode::new(4, "A1"), TreeNode::new(5, "A2")]),
            TreeNode::new(3, "B"),
        ])])
        .config(
            TreeConfig::new()
                .with_selection_mode(mode)
                .with_default_expanded_keys([key(1)])
                .with_collapse_delay(Duration::ZERO),
        )
        .build()
}

// ============================================================================
// Single
// ============================================================================

#[test]
fn test_single_selection_is_exclusive() {
    let tree = tree(SelectionMode::Single);
    for n in [1, 2, 2, 4, 3, 3, 5, 1, 4] {
        tree.toggle_select(&key(n));
        assert!(tree.selected_keys().len() <= 1);
    }
    assert_eq!(tree.selected_keys(), keys(&[4]));
}

#[test]
fn test_single_toggle_of_sole_member_clears() {
    let tree = tree(SelectionMode::Single);
    tree.toggle_select(&key(2));
    let delta = tree.toggle_select(&key(2));
    assert_eq!(delta.removed, vec![key(2)]);
    assert!(tree.selected_keys().is_empty());
}

#[test]
fn test_clicking_item_link_selects_it() {
    let tree = tree(SelectionMode::Single);

    tree.click(&key(1));
    assert!(tree.is_selected(&key(1)));

    tree.click(&key(2));
    assert!(tree.is_selected(&key(2)));
    assert!(!tree.is_selected(&key(1)));
}

#[test]
fn test_switching_to_single_clamps() {
    let tree = tree(SelectionMode::Multiple);
    tree.toggle_select(&key(3));
    tree.toggle_select(&key(4));

    let delta = tree.set_selection_mode(SelectionMode::Single);

    assert_eq!(tree.selection_mode(), SelectionMode::Single);
    assert_eq!(tree.selected_keys(), keys(&[4]));
    assert_eq!(delta.removed, vec![key(3)]);
}

// ============================================================================
// Multiple
// ============================================================================

#[test]
fn test_multiple_selection_keeps_every_toggled_node() {
    let tree = tree(SelectionMode::Multiple);
    tree.toggle_select(&key(1));
    tree.toggle_select(&key(2));
    assert_eq!(tree.selected_keys(), keys(&[1, 2]));

    // No propagation in plain multiple mode
    tree.toggle_select(&key(4));
    tree.toggle_select(&key(5));
    assert_eq!(tree.selected_keys(), keys(&[1, 2, 4, 5]));
}

#[test]
fn test_link_click_does_not_select_in_multiple_mode() {
    let tree = tree(SelectionMode::Multiple);
    tree.click(&key(3));
    assert!(tree.selected_keys().is_empty());
    assert_eq!(tree.focused(), Some(key(3)));
}

#[test]
fn test_deselect_all() {
    let tree = tree(SelectionMode::Multiple);
    tree.toggle_select(&key(1));
    tree.toggle_select(&key(3));
    let delta = tree.deselect_all();
    assert_eq!(delta.removed.len(), 2);
    assert!(tree.selected_keys().is_empty());
}

// ============================================================================
// Multiple recursive
// ============================================================================

#[test]
fn test_recursive_root_and_single_child() {
    let tree = Tree::builder()
        .items(vec![TreeNode::new(1, "Root").with_children(vec![TreeNode::new(2, "Item")])])
        .config(TreeConfig::new().with_selection_mode(SelectionMode::MultipleRecursive))
        .build();

    tree.toggle_select(&key(1));
    assert_eq!(tree.selected_keys(), keys(&[1, 2]));

    tree.toggle_select(&key(2));
    assert!(tree.selected_keys().is_empty());
}

#[test]
fn test_recursive_parent_follows_children() {
    let tree = tree(SelectionMode::MultipleRecursive);

    tree.toggle_select(&key(4));
    assert_eq!(tree.selected_keys(), keys(&[4]));

    tree.toggle_select(&key(5));
    assert_eq!(tree.selected_keys(), keys(&[2, 4, 5]));

    tree.toggle_select(&key(3));
    assert_eq!(tree.selected_keys(), keys(&[1, 2, 3, 4, 5]));
}

#[test]
fn test_recursive_deselect_removes_ancestors() {
    let tree = tree(SelectionMode::MultipleRecursive);
    tree.toggle_select(&key(1));

    let delta = tree.toggle_select(&key(4));

    assert_eq!(tree.selected_keys(), keys(&[3, 5]));
    assert!(delta.removed.contains(&key(1)));
    assert!(delta.removed.contains(&key(2)));
}

#[test]
fn test_recursive_seeded_selection_is_closed() {
    let tree = Tree::builder()
        .items(vec![TreeNode::new(1, "Root").with_children(vec![
            TreeNode::new(2, "A"),
            TreeNode::new(3, "B"),
        ])])
        .config(
            TreeConfig::new()
                .with_selection_mode(SelectionMode::MultipleRecursive)
                .with_default_selected_keys([key(2), key(3)]),
        )
        .build();
    assert_eq!(tree.selected_keys(), keys(&[1, 2, 3]));

    tree.toggle_select(&key(3));
    assert_eq!(tree.selected_keys(), keys(&[2]));

    tree.toggle_select(&key(3));
    assert_eq!(tree.selected_keys(), keys(&[1, 2, 3]));
}

#[test]
fn test_switching_to_recursive_closes_selection() {
    let tree = tree(SelectionMode::Multiple);
    tree.toggle_select(&key(4));
    tree.toggle_select(&key(5));
    tree.toggle_select(&key(3));
    assert_eq!(tree.selected_keys(), keys(&[3, 4, 5]));

    let delta = tree.set_selection_mode(SelectionMode::MultipleRecursive);

    assert_eq!(tree.selected_keys(), keys(&[1, 2, 3, 4, 5]));
    assert_eq!(delta.added.len(), 2);
}

#[test]
fn test_recursive_selection_reaches_hidden_descendants() {
    // A(2) is collapsed, its children are still selected
    let tree = tree(SelectionMode::MultipleRecursive);
    assert!(!tree.is_expanded(&key(2)));

    tree.toggle_select(&key(2));
    assert!(tree.is_selected(&key(4)));
    assert!(tree.is_selected(&key(5)));
}

#[test]
fn test_selected_items_in_visible_order() {
    let tree = tree(SelectionMode::Multiple);
    tree.toggle_select(&key(5));
    tree.toggle_select(&key(3));
    tree.toggle_select(&key(1));

    let names: Vec<String> = tree.selected_items().into_iter().map(|n| n.name).collect();
    // Visible rows first (Root, B), then hidden A2
    assert_eq!(names, vec!["Root", "B", "A2"]);
}

#[test]
fn test_unknown_ids_are_ignored() {
    let tree = tree(SelectionMode::MultipleRecursive);
    assert!(tree.toggle_select(&key(99)).is_empty());
    assert!(tree.select_link(&NodeKey::from("nope")).is_empty());
    assert!(tree.selected_keys().is_empty());
}

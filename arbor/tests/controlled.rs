use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arbor::tree::{NodeKey, SelectionMode, Tree, TreeConfig, TreeNode};

fn key(n: i64) -> NodeKey {
    NodeKey::Int(n)
}

type Seen = Arc<Mutex<Vec<HashSet<NodeKey>>>>;

fn items() -> Vec<TreeNode> {
    vec![TreeNode::new(1, "Root").with_children(vec![
        TreeNode::new(2, "A"),
        TreeNode::new(3, "B"),
    ])]
}

fn recorder() -> (Seen, impl Fn(&HashSet<NodeKey>) + Send + Sync + 'static) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |keys: &HashSet<NodeKey>| sink.lock().unwrap().push(keys.clone()))
}

// ============================================================================
// Expansion
// ============================================================================

#[test]
fn test_controlled_expansion_only_notifies() {
    let (seen, hook) = recorder();
    let tree = Tree::builder()
        .items(items())
        .config(
            TreeConfig::new()
                .with_expanded_keys(Vec::<NodeKey>::new())
                .with_on_expanded_change(hook)
                .with_collapse_delay(Duration::ZERO),
        )
        .build();

    tree.toggle_expand(&key(1));

    assert_eq!(seen.lock().unwrap().as_slice(), &[HashSet::from([key(1)])]);
    assert!(!tree.is_expanded(&key(1)));
    assert_eq!(tree.visible_ids(), vec![key(1)]);

    // The embedder accepts the change
    tree.set_expanded_keys([key(1)]);
    assert_eq!(tree.visible_ids(), vec![key(1), key(2), key(3)]);
}

#[test]
fn test_uncontrolled_expansion_is_observed() {
    let (seen, hook) = recorder();
    let tree = Tree::builder()
        .items(items())
        .config(TreeConfig::new().with_on_expanded_change(hook))
        .build();

    tree.expand(&key(1));
    tree.expand(&key(1));

    assert!(tree.is_expanded(&key(1)));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_hook_may_write_back_into_tree() {
    let handle: Arc<Mutex<Option<Tree<TreeNode>>>> = Arc::new(Mutex::new(None));
    let writer = Arc::clone(&handle);
    let tree = Tree::builder()
        .items(items())
        .config(
            TreeConfig::new()
                .with_expanded_keys(Vec::<NodeKey>::new())
                .with_on_expanded_change(move |keys: &HashSet<NodeKey>| {
                    if let Some(tree) = writer.lock().unwrap().as_ref() {
                        tree.set_expanded_keys(keys.iter().cloned());
                    }
                }),
        )
        .build();
    *handle.lock().unwrap() = Some(tree.clone());

    tree.toggle_expand(&key(1));

    assert!(tree.is_expanded(&key(1)));
    assert_eq!(tree.visible_ids().len(), 3);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_controlled_selection_only_notifies() {
    let (seen, hook) = recorder();
    let tree = Tree::builder()
        .items(items())
        .config(
            TreeConfig::new()
                .with_selection_mode(SelectionMode::Multiple)
                .with_selected_keys([key(2)])
                .with_on_selection_change(hook),
        )
        .build();

    tree.toggle_select(&key(3));

    assert_eq!(seen.lock().unwrap()[0], HashSet::from([key(2), key(3)]));
    assert_eq!(tree.selected_keys(), HashSet::from([key(2)]));
}

#[test]
fn test_single_mode_clamps_external_input() {
    let (seen, hook) = recorder();
    let tree = Tree::builder()
        .items(vec![TreeNode::new(1, "Root").with_children(
            (2..=5_i64).map(|n| TreeNode::new(n, format!("Item {n}"))).collect(),
        )])
        .config(
            TreeConfig::new()
                .with_selected_keys(Vec::<NodeKey>::new())
                .with_on_selection_change(hook),
        )
        .build();

    tree.toggle_select(&key(5));
    assert!(tree.selected_keys().is_empty());

    // The embedder writes back more than single mode allows
    tree.set_selected_keys([key(2), key(3), key(4), key(5)]);

    assert_eq!(tree.selected_keys(), HashSet::from([key(5)]));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], HashSet::from([key(5)]));
}

#[test]
fn test_accepted_selection_is_not_reported_again() {
    let (seen, hook) = recorder();
    let tree = Tree::builder()
        .items(items())
        .config(
            TreeConfig::new()
                .with_selection_mode(SelectionMode::Multiple)
                .with_selected_keys(Vec::<NodeKey>::new())
                .with_on_selection_change(hook),
        )
        .build();

    tree.toggle_select(&key(2));
    tree.set_selected_keys([key(2)]);

    assert_eq!(tree.selected_keys(), HashSet::from([key(2)]));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_written_recursive_selection_is_closed() {
    let (seen, hook) = recorder();
    let tree = Tree::builder()
        .items(items())
        .config(
            TreeConfig::new()
                .with_selection_mode(SelectionMode::MultipleRecursive)
                .with_selected_keys(Vec::<NodeKey>::new())
                .with_on_selection_change(hook),
        )
        .build();

    tree.set_selected_keys([key(2), key(3)]);

    assert_eq!(tree.selected_keys(), HashSet::from([key(1), key(2), key(3)]));
    assert_eq!(seen.lock().unwrap()[0], HashSet::from([key(1), key(2), key(3)]));
}

#[test]
fn test_default_selected_keys() {
    let tree = Tree::builder()
        .items(items())
        .config(
            TreeConfig::new()
                .with_selection_mode(SelectionMode::Multiple)
                .with_default_selected_keys([key(2), key(3)]),
        )
        .build();

    tree.toggle_select(&key(2));
    assert_eq!(tree.selected_keys(), HashSet::from([key(3)]));
}

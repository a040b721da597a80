//! Tree configuration

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::controlled::ChangeHook;
use crate::error::TreeError;

use super::selection::SelectionMode;

/// Callback receiving failures of spawned loads.
pub type ErrorHook = Arc<dyn Fn(&TreeError) + Send + Sync>;

/// Default time a collapsed subtree stays in the navigation order.
pub const DEFAULT_COLLAPSE_DELAY: Duration = Duration::from_millis(250);

/// Configuration for a [`Tree`](super::Tree).
///
/// Expansion and selection are each either uncontrolled (seeded from the
/// `default_*` keys and owned by the tree) or controlled (set through
/// `with_expanded_keys` / `with_selected_keys` and owned by the embedder, who
/// receives every proposed change through the matching hook).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use arbor::tree::{NodeKey, SelectionMode, TreeConfig};
///
/// let config = TreeConfig::<NodeKey>::default()
///     .with_selection_mode(SelectionMode::MultipleRecursive)
///     .with_default_expanded_keys([NodeKey::Int(1)])
///     .with_collapse_delay(Duration::ZERO);
/// ```
pub struct TreeConfig<K> {
    pub selection_mode: SelectionMode,

    /// Initially expanded keys when expansion is uncontrolled.
    pub default_expanded_keys: HashSet<K>,

    /// Externally owned expanded keys. `Some` makes expansion controlled.
    pub expanded_keys: Option<HashSet<K>>,

    pub on_expanded_change: Option<ChangeHook<K>>,

    /// Initially selected keys when selection is uncontrolled.
    pub default_selected_keys: HashSet<K>,

    /// Externally owned selected keys. `Some` makes selection controlled.
    pub selected_keys: Option<HashSet<K>>,

    pub on_selection_change: Option<ChangeHook<K>>,

    /// How long a collapsed subtree stays in the navigation order.
    ///
    /// Default: 250 milliseconds
    pub collapse_delay: Duration,

    /// Receives failures of loads started by user actions.
    pub on_load_error: Option<ErrorHook>,
}

impl<K> Default for TreeConfig<K> {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::default(),
            default_expanded_keys: HashSet::new(),
            expanded_keys: None,
            on_expanded_change: None,
            default_selected_keys: HashSet::new(),
            selected_keys: None,
            on_selection_change: None,
            collapse_delay: DEFAULT_COLLAPSE_DELAY,
            on_load_error: None,
        }
    }
}

impl<K: Clone + Eq + Hash> TreeConfig<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Sets the initially expanded keys.
    pub fn with_default_expanded_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.default_expanded_keys = keys.into_iter().collect();
        self
    }

    /// Hands ownership of the expanded keys to the embedder.
    pub fn with_expanded_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.expanded_keys = Some(keys.into_iter().collect());
        self
    }

    pub fn with_on_expanded_change(
        mut self,
        hook: impl Fn(&HashSet<K>) + Send + Sync + 'static,
    ) -> Self {
        self.on_expanded_change = Some(Arc::new(hook));
        self
    }

    /// Sets the initially selected keys.
    pub fn with_default_selected_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.default_selected_keys = keys.into_iter().collect();
        self
    }

    /// Hands ownership of the selected keys to the embedder.
    pub fn with_selected_keys(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.selected_keys = Some(keys.into_iter().collect());
        self
    }

    pub fn with_on_selection_change(
        mut self,
        hook: impl Fn(&HashSet<K>) + Send + Sync + 'static,
    ) -> Self {
        self.on_selection_change = Some(Arc::new(hook));
        self
    }

    /// Sets the collapse delay. `Duration::ZERO` detaches subtrees at once.
    pub fn with_collapse_delay(mut self, delay: Duration) -> Self {
        self.collapse_delay = delay;
        self
    }

    pub fn with_on_load_error(mut self, hook: impl Fn(&TreeError) + Send + Sync + 'static) -> Self {
        self.on_load_error = Some(Arc::new(hook));
        self
    }

    pub fn is_expansion_controlled(&self) -> bool {
        self.expanded_keys.is_some()
    }

    pub fn is_selection_controlled(&self) -> bool {
        self.selected_keys.is_some()
    }
}

impl<K: fmt::Debug> fmt::Debug for TreeConfig<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeConfig")
            .field("selection_mode", &self.selection_mode)
            .field("default_expanded_keys", &self.default_expanded_keys)
            .field("expanded_keys", &self.expanded_keys)
            .field("default_selected_keys", &self.default_selected_keys)
            .field("selected_keys", &self.selected_keys)
            .field("collapse_delay", &self.collapse_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_uncontrolled() {
        let config = TreeConfig::<u32>::default();
        assert_eq!(config.selection_mode, SelectionMode::Single);
        assert_eq!(config.collapse_delay, DEFAULT_COLLAPSE_DELAY);
        assert!(!config.is_expansion_controlled());
        assert!(!config.is_selection_controlled());
    }

    #[test]
    fn test_controlled_keys() {
        let config = TreeConfig::new()
            .with_expanded_keys([1u32, 2])
            .with_on_expanded_change(|_| {});
        assert!(config.is_expansion_controlled());
        assert!(config.on_expanded_change.is_some());
        assert_eq!(config.expanded_keys, Some(HashSet::from([1, 2])));
    }
}

//! Tree interaction state.
//!
//! The tree owns expand/collapse state, focus, selection and lazy loading of
//! hierarchical data. It does not draw anything: front-ends read the visible
//! rows (or pass a [`NodeRenderer`]) and route input back through
//! [`Tree::on_key`] and [`Tree::click`].
//!
//! # Example
//!
//! ```
//! use arbor::tree::{loader_fn, NodeKey, SelectionMode, Tree, TreeConfig, TreeNode};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), arbor::error::TreeError> {
//! let tree = Tree::builder()
//!     .items(vec![TreeNode::new(1, "Root")])
//!     .config(TreeConfig::new().with_selection_mode(SelectionMode::Multiple))
//!     .loader(loader_fn(|node: TreeNode| async move {
//!         Ok::<_, arbor::error::LoadError>(vec![TreeNode::new(format!("{}-a", node.id).as_str(), "a")])
//!     }))
//!     .build();
//!
//! if let Some(load) = tree.toggle_expand(&NodeKey::Int(1)) {
//!     load.await?;
//! }
//! assert_eq!(tree.visible().len(), 2);
//! # Ok(())
//! # }
//! ```

mod config;
mod expansion;
mod item;
mod loader;
mod navigation;
mod registry;
mod render;
mod selection;
mod state;

pub use config::{DEFAULT_COLLAPSE_DELAY, ErrorHook, TreeConfig};
pub use expansion::ExpansionTracker;
pub use item::{NodeKey, TreeItem, TreeNode};
pub use loader::{
    FnLoader, LoadCoordinator, LoadHandle, LoadOutcome, LoadTicket, Loader, loader_fn,
};
pub use navigation::{FlatNode, NavAction, flatten, navigate};
pub use registry::{Children, NodeEntry, NodeRegistry};
pub use render::{NodeRenderer, RowState};
pub use selection::{Selection, SelectionDelta, SelectionMode};
pub use state::{KeyOutcome, Tree, TreeBuilder};

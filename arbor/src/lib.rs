pub mod controlled;
pub mod error;
pub mod key;
pub mod popover;
pub mod tree;

pub mod prelude {
    pub use crate::controlled::{ChangeHook, Ownership};
    pub use crate::error::{LoadError, TreeError};
    pub use crate::key::{Key, KeyCombo, Modifiers, convert_key_event};
    pub use crate::popover::{Boundary, Popover};
    pub use crate::tree::{
        Children, FlatNode, KeyOutcome, LoadHandle, LoadOutcome, Loader, NodeKey, NodeRenderer,
        RowState, SelectionDelta, SelectionMode, Tree, TreeBuilder, TreeConfig, TreeItem,
        TreeNode, loader_fn,
    };
}

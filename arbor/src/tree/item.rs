//! TreeItem trait for items that can be displayed in a Tree.

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trait for items that can be displayed in a Tree.
///
/// Implement this trait to define hierarchical data for the tree.
///
/// # Example
///
/// ```
/// use arbor::tree::TreeItem;
///
/// #[derive(Clone, Debug)]
/// struct FileNode {
///     path: String,
///     children: Option<Vec<FileNode>>,
/// }
///
/// impl TreeItem for FileNode {
///     type Id = String;
///
///     fn id(&self) -> String {
///         self.path.clone()
///     }
///
///     fn children(&self) -> Option<Vec<Self>> {
///         self.children.clone()
///     }
/// }
/// ```
pub trait TreeItem: Send + Sync + Clone + 'static {
    /// Identity type of a node.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Unique, stable identifier for this node.
    ///
    /// This ID must be unique across the entire tree and stable across
    /// updates to maintain expand/collapse and selection state.
    fn id(&self) -> Self::Id;

    /// Child items, or `None` when the children were not supplied.
    ///
    /// `Some(vec![])` is a leaf. `None` is a leaf too, unless the tree has a
    /// loader, in which case the children are fetched on demand.
    fn children(&self) -> Option<Vec<Self>>;
}

/// Identity of a [`TreeNode`]: records may use numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(n) => write!(f, "{n}"),
            NodeKey::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for NodeKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(NodeKey::Int)
            .unwrap_or_else(|_| NodeKey::Text(s.to_string())))
    }
}

impl From<i64> for NodeKey {
    fn from(n: i64) -> Self {
        NodeKey::Int(n)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey::Text(s.to_string())
    }
}

/// A plain `{id, name, children?}` record.
///
/// Deserializes from JSON such as
/// `{"id": 1, "name": "Root", "children": [{"id": 2, "name": "Item"}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeKey,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// A node whose children are not supplied.
    pub fn new(id: impl Into<NodeKey>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: None,
        }
    }

    /// Attach children.
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = Some(children);
        self
    }
}

impl TreeItem for TreeNode {
    type Id = NodeKey;

    fn id(&self) -> NodeKey {
        self.id.clone()
    }

    fn children(&self) -> Option<Vec<Self>> {
        self.children.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_node_from_json() {
        let json = r#"[{"id": 1, "name": "Root", "children": [{"id": "a", "name": "Item"}]}]"#;
        let nodes: Vec<TreeNode> = serde_json::from_str(json).unwrap();

        assert_eq!(nodes[0].id, NodeKey::Int(1));
        let children = nodes[0].children().unwrap();
        assert_eq!(children[0].id(), NodeKey::Text("a".to_string()));
        assert!(children[0].children().is_none());
    }

    #[test]
    fn test_node_key_parse() {
        assert_eq!("42".parse::<NodeKey>(), Ok(NodeKey::Int(42)));
        assert_eq!("1.2".parse::<NodeKey>(), Ok(NodeKey::Text("1.2".to_string())));
    }
}

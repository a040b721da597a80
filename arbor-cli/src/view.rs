//! Plain-text rows.

use arbor::tree::{NodeRenderer, RowState, SelectionMode, Tree, TreeNode};

/// Renders one row per visible node:
///
/// ```text
/// > ▾ [x] Root
///     ▸ [ ] Child
/// ```
pub struct TextRenderer {
    /// Draw checkboxes (multiple selection modes).
    pub checkboxes: bool,
}

impl TextRenderer {
    pub fn for_mode(mode: SelectionMode) -> Self {
        Self {
            checkboxes: mode.is_multiple(),
        }
    }
}

impl NodeRenderer<TreeNode> for TextRenderer {
    type Output = String;

    fn render(&self, item: &TreeNode, state: &RowState) -> String {
        let cursor = if state.focused { '>' } else { ' ' };
        let indent = "  ".repeat(state.depth as usize);
        let expander = match (state.loading, state.has_children, state.expanded) {
            (true, _, _) => '…',
            (false, false, _) => ' ',
            (false, true, true) => '▾',
            (false, true, false) => '▸',
        };
        let mark = match (self.checkboxes, state.selected) {
            (true, true) => "[x] ",
            (true, false) => "[ ] ",
            (false, true) => "* ",
            (false, false) => "",
        };
        format!("{cursor} {indent}{expander} {mark}{}", item.name)
    }
}

/// The whole visible tree, one line per row.
pub fn render(tree: &Tree<TreeNode>) -> Vec<String> {
    tree.render_with(&TextRenderer::for_mode(tree.selection_mode()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_markers() {
        let renderer = TextRenderer { checkboxes: true };
        let state = RowState {
            depth: 1,
            expanded: false,
            selected: true,
            loading: false,
            focused: true,
            has_children: true,
        };
        assert_eq!(renderer.render(&TreeNode::new(1, "Docs"), &state), ">   ▸ [x] Docs");
    }

    #[test]
    fn test_render_tree() {
        let tree = Tree::with_items(vec![
            TreeNode::new(1, "Root").with_children(vec![TreeNode::new(2, "Item")]),
        ]);
        tree.toggle_expand(&arbor::tree::NodeKey::Int(1));
        tree.select_link(&arbor::tree::NodeKey::Int(2));

        assert_eq!(render(&tree), vec!["  ▾ Root", "      * Item"]);
    }
}

//! Rendering seam.
//!
//! The tree never draws anything. Front-ends pass a [`NodeRenderer`] to
//! [`Tree::render_with`](super::Tree::render_with) and receive one output per
//! visible row.

use super::item::TreeItem;

/// Interaction state of one visible row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowState {
    /// Depth in tree (0 = root).
    pub depth: u16,
    pub expanded: bool,
    pub selected: bool,
    /// A child fetch is in flight.
    pub loading: bool,
    pub focused: bool,
    /// Whether an expand affordance should be shown.
    pub has_children: bool,
}

/// Turns an item and its row state into the front-end's output.
pub trait NodeRenderer<T: TreeItem> {
    type Output;

    fn render(&self, item: &T, state: &RowState) -> Self::Output;
}

impl<T, F, O> NodeRenderer<T> for F
where
    T: TreeItem,
    F: Fn(&T, &RowState) -> O,
{
    type Output = O;

    fn render(&self, item: &T, state: &RowState) -> O {
        self(item, state)
    }
}

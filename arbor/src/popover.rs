//! Dismissable popover state.
//!
//! A popover (a date picker's calendar, a drop-down menu) is open while its
//! expanded flag is set and closes when focus lands outside every region the
//! host registers as belonging to it. The host reports focus changes through
//! [`Popover::on_focus`], passing the regions as [`Boundary`] values; there is
//! no global listener.

use std::fmt;
use std::sync::Arc;

use log::trace;

use crate::controlled::Ownership;

/// A region of the host's UI that a focus target may belong to.
///
/// `N` is whatever the host uses to identify focus targets (element ids,
/// widget paths, screen coordinates).
pub trait Boundary<N: ?Sized> {
    fn contains(&self, target: &N) -> bool;
}

impl<N: ?Sized, F> Boundary<N> for F
where
    F: Fn(&N) -> bool,
{
    fn contains(&self, target: &N) -> bool {
        self(target)
    }
}

/// Callback receiving the proposed expanded flag.
pub type ExpandedHook = Arc<dyn Fn(bool) + Send + Sync>;

/// Expanded flag of a popover, controlled or uncontrolled.
pub struct Popover {
    expanded: bool,
    ownership: Ownership,
    on_expanded_change: Option<ExpandedHook>,
}

impl Default for Popover {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Popover {
    /// Uncontrolled popover starting in `initial_expanded`.
    pub fn new(initial_expanded: bool) -> Self {
        Self {
            expanded: initial_expanded,
            ownership: Ownership::Internal,
            on_expanded_change: None,
        }
    }

    /// Controlled popover. Its flag only changes through [`sync`](Self::sync).
    pub fn controlled(expanded: bool) -> Self {
        Self {
            expanded,
            ownership: Ownership::External,
            on_expanded_change: None,
        }
    }

    pub fn with_on_expanded_change(mut self, hook: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_expanded_change = Some(Arc::new(hook));
        self
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Request a new expanded flag. Returns true if the request was a change.
    ///
    /// Uncontrolled popovers apply it; controlled ones only notify.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        if expanded == self.expanded {
            return false;
        }
        if self.ownership == Ownership::Internal {
            self.expanded = expanded;
        }
        if let Some(hook) = &self.on_expanded_change {
            hook(expanded);
        }
        true
    }

    /// Flip the flag, as the trigger button does.
    pub fn toggle(&mut self) -> bool {
        self.set_expanded(!self.expanded)
    }

    /// Write the flag from its owner. Never notifies.
    pub fn sync(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    /// Focus moved to `target`.
    ///
    /// Closes the popover if the target lies outside every boundary. Returns
    /// true if a close was requested.
    pub fn on_focus<N: ?Sized>(&mut self, target: &N, boundaries: &[&dyn Boundary<N>]) -> bool {
        if !self.expanded || boundaries.iter().any(|b| b.contains(target)) {
            return false;
        }
        trace!("Focus moved outside the popover, closing");
        self.set_expanded(false)
    }
}

impl fmt::Debug for Popover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popover")
            .field("expanded", &self.expanded)
            .field("ownership", &self.ownership)
            .field("on_expanded_change", &self.on_expanded_change.is_some())
            .finish()
    }
}

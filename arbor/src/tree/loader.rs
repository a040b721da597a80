//! Lazy loading of child nodes.
//!
//! Each node moves `Unloaded → Loading → Loaded`, or back to `Unloaded` when
//! the loader fails so a later trigger can retry. At most one load per node is
//! in flight; the coordinator hands out a [`LoadTicket`] for each accepted
//! load and refuses further triggers until that ticket is finished.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::error::{LoadError, TreeError};

use super::item::TreeItem;
use super::registry::NodeRegistry;
use super::selection::SelectionDelta;

/// Fetches the children of a node on demand.
#[async_trait]
pub trait Loader<T: TreeItem>: Send + Sync {
    async fn load(&self, item: &T) -> Result<Vec<T>, LoadError>;
}

/// [`Loader`] backed by an async closure. See [`loader_fn`].
pub struct FnLoader<F>(F);

#[async_trait]
impl<T, F, Fut> Loader<T> for FnLoader<F>
where
    T: TreeItem,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, LoadError>> + Send,
{
    async fn load(&self, item: &T) -> Result<Vec<T>, LoadError> {
        (self.0)(item.clone()).await
    }
}

/// Build a loader from an async closure receiving the node's item.
///
/// ```
/// use arbor::error::LoadError;
/// use arbor::tree::{loader_fn, TreeNode};
///
/// let loader = loader_fn(|node: TreeNode| async move {
///     Ok::<_, LoadError>(vec![TreeNode::new(format!("{}/child", node.id).as_str(), "child")])
/// });
/// # let _ = loader;
/// ```
pub fn loader_fn<T, F, Fut>(f: F) -> FnLoader<F>
where
    T: TreeItem,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, LoadError>> + Send,
{
    FnLoader(f)
}

/// An accepted load, carrying what the loader needs.
#[derive(Debug, Clone)]
pub struct LoadTicket<T: TreeItem> {
    pub id: T::Id,
    pub item: T,
    generation: u64,
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome<Id> {
    pub id: Id,
    /// Ids of the merged children, in order.
    pub children: Vec<Id>,
    /// Whether the node is expanded at merge time.
    pub expanded: bool,
    /// Nodes selected because their parent was selected in recursive mode.
    pub selection: SelectionDelta<Id>,
}

/// Tracks in-flight loads per node.
#[derive(Debug)]
pub struct LoadCoordinator<Id> {
    in_flight: HashMap<Id, u64>,
    next_generation: u64,
}

impl<Id: Clone + Eq + Hash + Debug> Default for LoadCoordinator<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Clone + Eq + Hash + Debug> LoadCoordinator<Id> {
    pub fn new() -> Self {
        Self {
            in_flight: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn is_loading(&self, id: &Id) -> bool {
        self.in_flight.contains_key(id)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Move `id` from `Unloaded` to `Loading`.
    ///
    /// Fails without side effects when the node is unknown, already loading
    /// or already loaded.
    pub fn begin<T>(&mut self, registry: &mut NodeRegistry<T>, id: &Id) -> Result<LoadTicket<T>, TreeError>
    where
        T: TreeItem<Id = Id>,
    {
        let entry = registry
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(format!("{id:?}")))?;
        if entry.loading || self.in_flight.contains_key(id) {
            return Err(TreeError::AlreadyLoading(format!("{id:?}")));
        }
        if entry.children.is_loaded() {
            return Err(TreeError::AlreadyLoaded(format!("{id:?}")));
        }

        entry.loading = true;
        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight.insert(id.clone(), generation);
        debug!("Loading children of {:?}", id);

        Ok(LoadTicket {
            id: id.clone(),
            item: entry.item.clone(),
            generation,
        })
    }

    /// Merge the loader's result for `ticket` into the registry.
    ///
    /// Success commits the children and marks the node loaded. Failure puts
    /// the node back to `Unloaded` without committing anything. A ticket
    /// issued before [`reset`](Self::reset) is rejected as superseded.
    pub fn finish<T>(
        &mut self,
        ticket: LoadTicket<T>,
        result: Result<Vec<T>, LoadError>,
        registry: &mut NodeRegistry<T>,
    ) -> Result<Vec<Id>, TreeError>
    where
        T: TreeItem<Id = Id>,
    {
        let id = ticket.id;
        if self.in_flight.get(&id) != Some(&ticket.generation) {
            debug!("Dropping superseded load of {:?}", id);
            return Err(TreeError::Superseded(format!("{id:?}")));
        }
        self.in_flight.remove(&id);

        match result {
            Ok(items) => {
                let children = registry
                    .set_children(&id, items)
                    .ok_or_else(|| TreeError::NotFound(format!("{id:?}")))?;
                debug!("Loaded {} children of {:?}", children.len(), id);
                Ok(children)
            }
            Err(source) => {
                if let Some(entry) = registry.get_mut(&id) {
                    entry.loading = false;
                }
                warn!("Loading children of {:?} failed: {}", id, source);
                Err(TreeError::Load {
                    id: format!("{id:?}"),
                    source,
                })
            }
        }
    }

    /// Forget every in-flight load, e.g. after the items were replaced.
    pub fn reset(&mut self) {
        self.in_flight.clear();
    }
}

/// A load running on the tokio runtime.
///
/// Await it (it is a future) or call [`join`](Self::join) to observe the
/// merge result. Dropping it does not cancel the load.
#[derive(Debug)]
pub struct LoadHandle<Id> {
    id: Id,
    task: JoinHandle<Result<LoadOutcome<Id>, TreeError>>,
}

impl<Id> LoadHandle<Id> {
    pub(crate) fn new(id: Id, task: JoinHandle<Result<LoadOutcome<Id>, TreeError>>) -> Self {
        Self { id, task }
    }

    /// Node being loaded.
    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<LoadOutcome<Id>, TreeError> {
        self.await
    }
}

impl<Id> Unpin for LoadHandle<Id> {}

impl<Id> Future for LoadHandle<Id> {
    type Output = Result<LoadOutcome<Id>, TreeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.task
            .poll_unpin(cx)
            .map(|joined| joined.unwrap_or_else(|e| Err(TreeError::Join(e.to_string()))))
    }
}

//! Simulated remote data source.

use std::collections::HashSet;
use std::time::Duration;

use arbor::error::LoadError;
use arbor::tree::{Loader, NodeKey, TreeNode};
use async_trait::async_trait;
use log::debug;

/// Answers every node with a few generated children after a fixed latency.
///
/// Generated children have no children of their own, so they load lazily
/// too.
pub struct SimulatedLoader {
    latency: Duration,
    fanout: usize,
    failing: HashSet<NodeKey>,
}

impl SimulatedLoader {
    pub fn new(latency: Duration, fanout: usize) -> Self {
        Self {
            latency,
            fanout,
            failing: HashSet::new(),
        }
    }

    /// Make loads of these nodes fail.
    pub fn with_failing(mut self, ids: impl IntoIterator<Item = NodeKey>) -> Self {
        self.failing.extend(ids);
        self
    }
}

#[async_trait]
impl Loader<TreeNode> for SimulatedLoader {
    async fn load(&self, item: &TreeNode) -> Result<Vec<TreeNode>, LoadError> {
        debug!("Fetching children of {} ({:?} latency)", item.id, self.latency);
        tokio::time::sleep(self.latency).await;

        if self.failing.contains(&item.id) {
            return Err(LoadError::new(format!("{} is unavailable", item.name)));
        }
        Ok((1..=self.fanout)
            .map(|n| {
                TreeNode::new(
                    NodeKey::Text(format!("{}.{}", item.id, n)),
                    format!("{} {}", item.name, n),
                )
            })
            .collect())
    }
}

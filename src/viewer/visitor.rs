//! Object graph traversal
//!
//! A [`Visitor`] walks the objects reachable from a root and writes them into
//! a [`GraphCollector`]. [`GraphVisitor`] is the default implementation: it
//! discovers children through a [`Queryer`] and links every child to the
//! parent it was reached from.

use super::dash::Queryer;
use super::error::{ViewerError, ViewerResult};
use super::graph::GraphCollector;
use super::key::key_from_object;
use async_trait::async_trait;
use kube::core::DynamicObject;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Capability invoked over the objects reachable from a root
#[async_trait]
pub trait Visitor: Send + Sync {
    async fn visit(
        &self,
        ctx: &CancellationToken,
        object: &DynamicObject,
        collector: &GraphCollector,
    ) -> ViewerResult<()>;
}

/// Visitor that builds the relationship graph from queryer children
pub struct GraphVisitor {
    queryer: Arc<dyn Queryer>,
}

impl GraphVisitor {
    pub fn new(queryer: Arc<dyn Queryer>) -> Self {
        Self { queryer }
    }
}

#[async_trait]
impl Visitor for GraphVisitor {
    /// Depth-first walk in queryer order
    ///
    /// A failed child lookup abandons that branch only. The first such error
    /// is returned once the remaining branches are done; nodes recorded so
    /// far stay in the collector.
    async fn visit(
        &self,
        ctx: &CancellationToken,
        object: &DynamicObject,
        collector: &GraphCollector,
    ) -> ViewerResult<()> {
        let mut first_error: Option<ViewerError> = None;
        let mut pending: Vec<(Option<String>, DynamicObject)> = vec![(None, object.clone())];

        while let Some((parent, current)) = pending.pop() {
            if ctx.is_cancelled() {
                return Err(ViewerError::Cancelled);
            }

            let key = match key_from_object(&current) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("Skipping object without identity: {}", e);
                    first_error.get_or_insert(e);
                    continue;
                }
            };

            let recorded = collector.record(&key, &current).await;
            if let Some(parent) = parent {
                collector.link(&parent, recorded.id()).await;
            }

            // Already expanded through another path (or a cycle)
            if !recorded.is_new() {
                continue;
            }

            let children = tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(ViewerError::Cancelled),
                result = self.queryer.children(ctx, &current) => result,
            };

            match children {
                Ok(children) => {
                    tracing::debug!("{} has {} children", key, children.len());
                    let id = recorded.id().to_string();
                    for child in children.into_iter().rev() {
                        pending.push((Some(id.clone()), child));
                    }
                }
                Err(source) => {
                    tracing::warn!("Failed to fetch children of {}: {:#}", key, source);
                    first_error.get_or_insert(ViewerError::ChildLookup {
                        key: key.to_string(),
                        source,
                    });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

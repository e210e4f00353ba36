//! Resource viewer: one traversal session over an object graph

use super::dash::{Dash, Queryer};
use super::error::{ViewerError, ViewerResult};
use super::graph::{GraphCollector, ResourceViewerComponent};
use super::key::{ObjectKey, key_from_object};
use super::visitor::{GraphVisitor, Visitor};
use kube::core::DynamicObject;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builds the relationship graph of a single root object
///
/// Cloning is cheap; clones share the same graph.
#[derive(Clone)]
pub struct ResourceViewer {
    dash: Arc<dyn Dash>,
    visitor: Arc<dyn Visitor>,
    collector: GraphCollector,
}

/// Builder for [`ResourceViewer`]
pub struct ResourceViewerBuilder {
    dash: Arc<dyn Dash>,
    queryer: Option<Arc<dyn Queryer>>,
    visitor: Option<Arc<dyn Visitor>>,
}

impl ResourceViewerBuilder {
    /// Queryer for the default [`GraphVisitor`]
    pub fn queryer(mut self, queryer: Arc<dyn Queryer>) -> Self {
        self.queryer = Some(queryer);
        self
    }

    /// Replace the default visitor
    pub fn visitor(mut self, visitor: Arc<dyn Visitor>) -> Self {
        self.visitor = Some(visitor);
        self
    }

    pub fn build(self) -> ViewerResult<ResourceViewer> {
        let visitor = match (self.visitor, self.queryer) {
            (Some(visitor), _) => visitor,
            (None, Some(queryer)) => Arc::new(GraphVisitor::new(queryer)) as Arc<dyn Visitor>,
            (None, None) => {
                return Err(ViewerError::Configuration(
                    "resource viewer needs a visitor or a queryer".to_string(),
                ));
            }
        };

        Ok(ResourceViewer {
            dash: self.dash,
            visitor,
            collector: GraphCollector::new(),
        })
    }
}

impl ResourceViewer {
    pub fn builder(dash: Arc<dyn Dash>) -> ResourceViewerBuilder {
        ResourceViewerBuilder {
            dash,
            queryer: None,
            visitor: None,
        }
    }

    /// Insert the placeholder root for `object` unless a root already exists
    pub async fn seed(
        &self,
        ctx: &CancellationToken,
        key: &ObjectKey,
        object: &DynamicObject,
    ) -> ViewerResult<()> {
        if self.collector.root().await.key().is_some() {
            return Ok(());
        }

        let path = self
            .dash
            .object_path(ctx, &key.namespace, &key.api_version, &key.kind, &key.name)
            .await
            .map_err(|source| ViewerError::ObjectPath {
                key: key.to_string(),
                source,
            })?;

        if self.collector.seed_root(key, object, Some(path)).await {
            tracing::debug!("Seeded placeholder root for {}", key);
        }
        Ok(())
    }

    /// Visit `object` and return the resulting graph
    ///
    /// On error the partially built graph stays available through
    /// [`ResourceViewer::component`] but should not be treated as complete.
    pub async fn visit(
        &self,
        ctx: &CancellationToken,
        object: &DynamicObject,
    ) -> ViewerResult<ResourceViewerComponent> {
        let key = key_from_object(object)?;
        self.seed(ctx, &key, object).await?;

        self.visitor.visit(ctx, object, &self.collector).await?;

        Ok(self.component().await)
    }

    pub async fn component(&self) -> ResourceViewerComponent {
        self.collector.component().await
    }
}

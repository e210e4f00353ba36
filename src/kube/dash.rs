//! Dash wiring for a live cluster

use crate::models::WorkloadKind;
use crate::viewer::{Dash, ObjectStore};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const OVERVIEW_ROOT: &str = "/overview";
const WORKLOADS_SECTION: &str = "workloads";
const CUSTOM_RESOURCES_SECTION: &str = "custom-resources";

/// Dash handing out a cluster object store and overview paths
#[derive(Clone)]
pub struct KubeDash {
    store: Arc<dyn ObjectStore>,
}

impl KubeDash {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Dash for KubeDash {
    fn object_store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    async fn object_path(
        &self,
        _ctx: &CancellationToken,
        namespace: &str,
        api_version: &str,
        kind: &str,
        name: &str,
    ) -> Result<String> {
        if name.is_empty() {
            anyhow::bail!("Cannot build a path for an unnamed {} ({})", kind, api_version);
        }
        Ok(object_path(namespace, kind, name))
    }
}

/// Overview path of an object
///
/// Workloads live under `workloads/<plural>`, everything else under
/// `custom-resources/<lowercase kind>`. Cluster-scoped objects (empty
/// namespace) drop the namespace segment.
pub fn object_path(namespace: &str, kind: &str, name: &str) -> String {
    let (section, plural) = match WorkloadKind::parse_optional(kind) {
        Some(workload) => (WORKLOADS_SECTION, workload.plural().to_string()),
        None => (CUSTOM_RESOURCES_SECTION, kind.to_lowercase()),
    };

    if namespace.is_empty() {
        format!("{}/{}/{}/{}", OVERVIEW_ROOT, section, plural, name)
    } else {
        format!(
            "{}/namespace/{}/{}/{}/{}",
            OVERVIEW_ROOT, namespace, section, plural, name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::dash::MockObjectStore;

    #[test]
    fn test_workload_path() {
        assert_eq!(
            object_path("default", "Deployment", "web"),
            "/overview/namespace/default/workloads/deployments/web"
        );
        assert_eq!(
            object_path("prod", "ReplicaSet", "web-7f9c"),
            "/overview/namespace/prod/workloads/replica-sets/web-7f9c"
        );
    }

    #[test]
    fn test_custom_resource_path() {
        assert_eq!(
            object_path("flux-system", "Kustomization", "apps"),
            "/overview/namespace/flux-system/custom-resources/kustomization/apps"
        );
    }

    #[test]
    fn test_cluster_scoped_path() {
        assert_eq!(
            object_path("", "ClusterRole", "admin"),
            "/overview/custom-resources/clusterrole/admin"
        );
    }

    #[tokio::test]
    async fn test_dash_rejects_unnamed_object() {
        let dash = KubeDash::new(Arc::new(MockObjectStore::new()));
        let ctx = CancellationToken::new();

        let path = dash
            .object_path(&ctx, "default", "apps/v1", "Deployment", "web")
            .await
            .unwrap();
        assert_eq!(path, "/overview/namespace/default/workloads/deployments/web");

        assert!(
            dash.object_path(&ctx, "default", "apps/v1", "Deployment", "")
                .await
                .is_err()
        );
    }
}

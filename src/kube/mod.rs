//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides the
//! cluster-backed collaborators of the resource viewer.

pub mod dash;
pub mod queryer;
pub mod store;

pub use dash::KubeDash;
pub use queryer::OwnerQueryer;
pub use store::KubeObjectStore;

use anyhow::{Context, Result};
use kube::Client;
use kube::config::Kubeconfig;

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    Client::try_default()
        .await
        .context("Failed to create Kubernetes client")
}

/// Get the current Kubernetes context name
pub fn current_context() -> String {
    Kubeconfig::read()
        .ok()
        .and_then(|config| config.current_context)
        .unwrap_or_else(|| "default".to_string())
}

/// Split an API version into group and version (`"v1"` has an empty group)
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    api_version.split_once('/').unwrap_or(("", api_version))
}

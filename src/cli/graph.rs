//! `graph` command: render the resource graph of one cluster object

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, OutputFormat};
use crate::kube::{self as cluster, KubeDash, KubeObjectStore, OwnerQueryer};
use crate::models::WorkloadKind;
use crate::viewer::{ComponentCache, ObjectKey, ObjectStore, ResourceViewerComponent};

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Object kind (e.g., "Deployment", "deploy", "Kustomization")
    pub kind: String,

    /// Object name
    pub name: String,

    /// Namespace, defaults to `defaultNamespace` from the config
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// API version, required for kinds other than built-in workloads
    #[arg(long)]
    pub api_version: Option<String>,

    /// Output format, defaults to `graph.output` from the config
    #[arg(long, short = 'o')]
    pub output: Option<OutputFormat>,

    /// Print the placeholder graph without waiting for resolution
    #[arg(long)]
    pub no_wait: bool,
}

/// Canonical kind and API version for a kind given on the command line
pub fn resolve_kind(kind: &str, api_version: Option<&str>) -> Result<(String, String)> {
    match (WorkloadKind::from_str_case_insensitive(kind), api_version) {
        (Some(workload), None) => Ok((
            workload.as_str().to_string(),
            workload.api_version().to_string(),
        )),
        (Some(workload), Some(version)) => {
            Ok((workload.as_str().to_string(), version.to_string()))
        }
        (None, Some(version)) => Ok((kind.to_string(), version.to_string())),
        (None, None) => Err(anyhow::anyhow!(
            "Unknown kind '{}': pass --api-version to look it up",
            kind
        )),
    }
}

/// Serialize a component in the requested format
pub fn render(component: &ResourceViewerComponent, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(component).context("Failed to serialize component")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(component).context("Failed to serialize component")
        }
    }
}

/// Handle the graph command
pub async fn handle_graph_command(args: GraphArgs, config: &Config) -> Result<()> {
    let (kind, api_version) = resolve_kind(&args.kind, args.api_version.as_deref())?;
    let namespace = args
        .namespace
        .unwrap_or_else(|| config.default_namespace.clone());
    let format = args.output.unwrap_or(config.graph.output);

    tracing::debug!("Initializing Kubernetes client");
    let client = cluster::create_client().await?;
    tracing::debug!("Using context {}", cluster::current_context());

    let store: Arc<dyn ObjectStore> = Arc::new(KubeObjectStore::new(client));
    let dash = Arc::new(KubeDash::new(Arc::clone(&store)));
    let cache = ComponentCache::with_capacity(dash, config.cache.capacity)?;
    cache
        .set_queryer(Arc::new(OwnerQueryer::new(Arc::clone(&store))))
        .await;

    let ctx = CancellationToken::new();
    let key = ObjectKey::new(api_version, kind, namespace, args.name);
    let object = store
        .get(&ctx, &key)
        .await?
        .with_context(|| format!("{} not found", key))?;

    let (mut component, resolution) = cache.get_with_resolution(&ctx, &object).await?;

    if let Some(resolution) = resolution.filter(|_| !args.no_wait) {
        let timeout = Duration::from_secs(config.graph.resolve_timeout_seconds);
        match tokio::time::timeout(timeout, resolution.wait()).await {
            Ok(Ok(resolved)) => {
                if let Some(resolved_component) = cache.cached(&resolved).await {
                    component = resolved_component;
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Resolution of {} failed: {}", key, e);
                eprintln!("Graph resolution failed, showing placeholder: {}", e);
            }
            Err(_) => {
                ctx.cancel();
                eprintln!(
                    "Graph resolution timed out after {}s, showing placeholder",
                    timeout.as_secs()
                );
            }
        }
    }

    println!("{}", render(&component, format)?);
    Ok(())
}

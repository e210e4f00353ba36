//! resview - render the resource graph of a Kubernetes object
//!
//! Walks an object's owned children through owner references and prints the
//! resulting graph as a resource viewer component.

use anyhow::Result;
use clap::{Parser, Subcommand};
use resview::cli::{
    ConfigSubcommand, GraphArgs, handle_config_command, handle_graph_command, init_logging,
};
use resview::config::ConfigLoader;

/// resview - render the resource graph of a Kubernetes object
#[derive(Parser, Debug)]
#[command(name = "resview")]
#[command(about = "Render the resource graph of a Kubernetes object", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resource graph of an object
    Graph(GraphArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging if debug flag is set
    let log_file = init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    match args.command {
        Command::Config { subcommand } => handle_config_command(subcommand).await,
        Command::Graph(graph) => {
            let config = ConfigLoader::load().unwrap_or_else(|e| {
                tracing::warn!("Failed to load configuration: {}, using defaults", e);
                ConfigLoader::load_defaults()
            });
            tracing::debug!(
                "Configuration loaded: defaultNamespace={}, cache.capacity={}",
                config.default_namespace,
                config.cache.capacity
            );
            handle_graph_command(graph, &config).await
        }
    }
}

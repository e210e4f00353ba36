//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod graph;
mod logging;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use graph::{GraphArgs, handle_graph_command, render, resolve_kind};
pub use logging::*;

//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Hierarchical tree builder: flat parent-referencing records in, sorted forest out
#[derive(Parser, Debug)]
#[command(name = "rstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a forest from a JSON array of records
    Build {
        /// JSON file containing an array of record objects
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Parent id marking a root, as JSON (`0`, `"root"`); bare text is a string
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        root: String,

        /// Maximum nesting depth (0 = roots only)
        #[arg(short, long, allow_negative_numbers = true)]
        max_depth: Option<i64>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Only print the subtree of this node id (JSON, like --root)
        #[arg(long)]
        node: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}

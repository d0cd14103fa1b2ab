//! Command-line interface definition.

use clap::{ColorChoice, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "papermill", version, about = "Content compilation and caching pipeline")]
pub struct Cli {
    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to the site configuration file
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = "papermill.toml",
        value_hint = ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile changed documents and refresh derived outputs
    #[command(visible_alias = "b")]
    Build {
        /// Recompile everything, ignoring the manifest
        #[arg(short, long)]
        force: bool,
    },

    /// Serve the cache and recompile documents as they change
    #[command(visible_alias = "w")]
    Watch,
}

mod build;
mod cache;
mod cli;
mod compile;
mod config;
mod content;
mod logger;
mod search;
mod store;
mod utils;
mod watch;

use clap::{ColorChoice, Parser};
use cli::args::{Cli, Commands};
use config::SiteConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli.config)?;

    match cli.command {
        Commands::Build { force } => cli::build::run(&config, force),
        Commands::Watch => cli::watch::run(config),
    }
}

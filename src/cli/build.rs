//! `build` subcommand.

use crate::build;
use crate::config::SiteConfig;
use crate::log;
use std::time::Instant;

/// Run one build. Per-document failures are reported and counted but do
/// not fail the command.
pub fn run(config: &SiteConfig, force: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let report = build::run(config, force)?;

    log!(
        "build";
        "{} compiled, {} unchanged, {} failed, {} swept in {}ms",
        report.compiled,
        report.skipped,
        report.failed,
        report.deleted,
        started.elapsed().as_millis()
    );

    Ok(())
}

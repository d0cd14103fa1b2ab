//! Command-line entry points.

pub mod args;
pub mod build;
pub mod watch;

//! External trending rankings.

use std::time::Duration;

/// How often the trending ordering is refreshed from its source.
pub const TRENDING_REFRESH: Duration = Duration::from_secs(5 * 60);

/// How many ranked slugs a refresh asks for.
pub const TRENDING_LIMIT: usize = 10;

/// A source of popularity rankings, typically an analytics backend.
///
/// Implementations may block; refreshes run off the hot path. An `Err`
/// leaves the previous ordering in place.
pub trait TrendingSource: Send + Sync {
    /// Up to `n` slugs, most popular first.
    fn trending_slugs(&self, n: usize) -> anyhow::Result<Vec<String>>;
}

/// Source used when no analytics backend is configured. Always returns
/// no ranking, which keeps the tag-count fallback active.
pub struct NoAnalytics;

impl TrendingSource for NoAnalytics {
    fn trending_slugs(&self, _n: usize) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

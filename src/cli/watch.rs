//! `watch` subcommand: long-running cache service with live updates.

use crate::cache::ContentCache;
use crate::cache::trending::{NoAnalytics, TRENDING_LIMIT, TRENDING_REFRESH, TrendingSource};
use crate::config::SiteConfig;
use crate::{debug, log, search, watch};
use crossbeam::channel::{bounded, tick};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn run(config: SiteConfig) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let cache = Arc::new(ContentCache::new());

    let summary = cache.load(&config)?;
    log!(
        "cache";
        "loaded {} documents, {} tags ({})",
        summary.loaded,
        cache.tag_counts().len(),
        if summary.from_store { "from artifacts" } else { "compiled from source" }
    );
    if let Some(newest) = cache.latest(1, None).into_iter().next() {
        debug!("cache"; "newest document: {}", newest.slug);
    }

    {
        let artifacts = cache.all();
        let refs = artifacts.iter().map(Arc::as_ref);
        search::write_index(refs, &config.search_index_path())?;
    }

    let trending: Arc<dyn TrendingSource> = Arc::new(NoAnalytics);
    cache.refresh_trending(trending.as_ref(), TRENDING_LIMIT);

    let running = Arc::new(AtomicBool::new(true));
    let refresher = spawn_trending_refresher(
        Arc::clone(&cache),
        Arc::clone(&trending),
        Arc::clone(&running),
    );

    let _watcher = watch::start(Arc::clone(&cache), Arc::clone(&config));

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        shutdown_tx.try_send(()).ok();
    })?;

    shutdown_rx.recv().ok();
    running.store(false, Ordering::SeqCst);
    log!("watch"; "shutting down");
    drop(refresher);

    Ok(())
}

/// Periodically re-rank trending in the background. Failures inside a
/// refresh keep the previous ordering.
fn spawn_trending_refresher(
    cache: Arc<ContentCache>,
    source: Arc<dyn TrendingSource>,
    running: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let ticker = tick(TRENDING_REFRESH);
        while running.load(Ordering::SeqCst) {
            if ticker.recv().is_err() {
                return;
            }
            cache.refresh_trending(source.as_ref(), TRENDING_LIMIT);
        }
    })
}

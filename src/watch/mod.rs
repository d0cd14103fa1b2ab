//! Live updates: watch the document tree and keep the cache current.
//!
//! Edits are debounced and recompile one document; removals apply
//! immediately. Either way the search index is regenerated from the
//! full cached set afterwards, so it never describes a partial state.
//! The artifact store and manifest are the build's concern and are not
//! touched here. If the OS watcher cannot start, the service runs on
//! without live updates.

pub mod debouncer;

use crate::cache::ContentCache;
use crate::compile;
use crate::config::SiteConfig;
use crate::content::scan::DOC_EXTENSION;
use crate::content::slug::derive_slug;
use crate::logger::{status_error, status_success};
use crate::{debug, log, search};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use debouncer::Debouncer;
use notify::event::{EventKind, ModifyKind};
use notify::{RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

/// Handle keeping the watcher and its thread alive.
pub struct WatchHandle {
    _watcher: notify::RecommendedWatcher,
    _thread: JoinHandle<()>,
}

/// Start watching the configured document tree.
///
/// Returns `None` when the watcher cannot start; live updates are then
/// disabled but nothing else stops working.
pub fn start(cache: Arc<ContentCache>, config: Arc<SiteConfig>) -> Option<WatchHandle> {
    let root = config.content.dir.clone();
    if !root.is_dir() {
        log!("watch"; "document root {} missing, live updates disabled", root.display());
        return None;
    }

    let (tx, rx) = channel::unbounded();
    let mut watcher = match notify::recommended_watcher(move |event| {
        tx.send(event).ok();
    }) {
        Ok(watcher) => watcher,
        Err(e) => {
            log!("error"; "cannot create file watcher, live updates disabled: {e}");
            return None;
        }
    };
    if let Err(e) = watcher.watch(&root, RecursiveMode::Recursive) {
        log!("error"; "cannot watch {}, live updates disabled: {e}", root.display());
        return None;
    }

    log!("watch"; "watching {} for changes", root.display());
    let thread = std::thread::spawn(move || event_loop(&rx, &cache, &config));

    Some(WatchHandle {
        _watcher: watcher,
        _thread: thread,
    })
}

fn event_loop(
    rx: &Receiver<notify::Result<notify::Event>>,
    cache: &ContentCache,
    config: &SiteConfig,
) {
    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.sleep_duration()) {
            Ok(Ok(event)) => handle_event(event, &mut debouncer, cache, config),
            Ok(Err(e)) => debug!("watch"; "watcher error: {e}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }

        if let Some(path) = debouncer.take_if_ready() {
            recompile(&path, cache, config);
        }
    }
}

fn handle_event(
    event: notify::Event,
    debouncer: &mut Debouncer,
    cache: &ContentCache,
    config: &SiteConfig,
) {
    // Attribute-only churn carries no content change
    if matches!(event.kind, EventKind::Modify(ModifyKind::Metadata(_))) {
        return;
    }

    for path in event.paths {
        if !is_document(&path) || is_temp_file(&path) {
            continue;
        }

        match event.kind {
            // Removals bypass the debounce: there is nothing to coalesce
            EventKind::Remove(_) => handle_removal(&path, cache, config),
            EventKind::Create(_) | EventKind::Modify(_) => {
                debug!("watch"; "pending change: {}", path.display());
                debouncer.note(path);
            }
            _ => {}
        }
    }
}

fn recompile(path: &Path, cache: &ContentCache, config: &SiteConfig) {
    // A rename may land here after the target disappeared
    if !path.exists() {
        handle_removal(path, cache, config);
        return;
    }

    let started = Instant::now();
    match compile::compile(path, config) {
        Ok(artifact) => {
            let slug = artifact.slug.clone();
            cache.insert(artifact);
            write_search(cache, config);
            status_success(&format!(
                "recompiled `{slug}` in {}ms",
                started.elapsed().as_millis()
            ));
        }
        // The last good artifact stays served
        Err(e) => status_error("recompile failed", &e.to_string()),
    }
}

fn handle_removal(path: &Path, cache: &ContentCache, config: &SiteConfig) {
    let slug = derive_slug(path);
    if !cache.remove(&slug) {
        return;
    }
    write_search(cache, config);
    status_success(&format!("removed `{slug}`"));
}

fn write_search(cache: &ContentCache, config: &SiteConfig) {
    let artifacts = cache.all();
    let refs = artifacts.iter().map(Arc::as_ref);
    if let Err(e) = search::write_index(refs, &config.search_index_path()) {
        log!("error"; "cannot write search index: {e}");
    }
}

fn is_document(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(DOC_EXTENSION)
}

/// Editor backup and swap files that happen to end in the document
/// extension, plus dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
        return true;
    };
    if name.starts_with('.') || name.ends_with('~') {
        return true;
    }
    ["bck", "bak", "backup", "swp", "swo", "tmp"]
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
}

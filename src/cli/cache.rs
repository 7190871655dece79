//! Cache management commands

use serde::Serialize;

use crate::cache::CacheStorage;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::output;

#[derive(Debug, Serialize)]
struct StatusReport {
    path: String,
    total_entries: usize,
    valid_entries: usize,
    expired_entries: usize,
    total_size_bytes: usize,
    total_size_human: String,
}

#[derive(Debug, Serialize)]
struct RemovalReport {
    path: String,
    entries_removed: usize,
}

#[derive(Debug, Serialize)]
struct PathReport {
    path: String,
}

fn open(config: &Config) -> Result<CacheStorage> {
    let dir = config.cache_dir.clone().ok_or(CacheError::NoCacheDir)?;
    Ok(CacheStorage::at(dir))
}

/// Show cache status/statistics
pub fn status(config: &Config) -> Result<()> {
    let cache = open(config)?;
    let stats = cache.stats()?;

    output::print(&StatusReport {
        path: cache.dir().display().to_string(),
        total_entries: stats.total_entries,
        valid_entries: stats.valid_entries,
        expired_entries: stats.expired_entries,
        total_size_bytes: stats.total_size_bytes,
        total_size_human: format_size(stats.total_size_bytes),
    })
}

/// Clear all cache entries
pub fn clear(config: &Config) -> Result<()> {
    let cache = open(config)?;
    let stats = cache.clear_all()?;
    log::debug!("Removed {} cache entries", stats.entries_removed);

    output::print(&RemovalReport {
        path: cache.dir().display().to_string(),
        entries_removed: stats.entries_removed,
    })
}

/// Remove expired entries only
pub fn prune(config: &Config) -> Result<()> {
    let cache = open(config)?;
    let stats = cache.prune_expired()?;
    log::debug!("Pruned {} expired cache entries", stats.entries_removed);

    output::print(&RemovalReport {
        path: cache.dir().display().to_string(),
        entries_removed: stats.entries_removed,
    })
}

/// Show cache path
pub fn path(config: &Config) -> Result<()> {
    let cache = open(config)?;
    output::print(&PathReport {
        path: cache.dir().display().to_string(),
    })
}

/// Format bytes as human-readable size
fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

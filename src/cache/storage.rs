//! File-based cache storage
//!
//! One JSON file per key under the cache directory. Writes go to a temporary
//! file in the same directory and are renamed into place, so a concurrent
//! reader (in this or another process) sees either the old entry or the new one.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{CacheKey, TtlClass};
use crate::error::CacheError;

/// Entry format version - entries with another version are ignored
const FORMAT_VERSION: u32 = 1;

type Result<T> = std::result::Result<T, CacheError>;

/// A stored payload with the metadata needed to decide whether it is still usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub version: u32,
    pub key: String,
    pub stored_at: DateTime<Utc>,
    pub ttl_class: TtlClass,
    pub payload: T,
}

impl<T> CacheEntry<T> {
    /// An entry is expired once its age exceeds the TTL of its class.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        match chrono::Duration::from_std(self.ttl_class.ttl()) {
            Ok(ttl) => age > ttl,
            Err(_) => false,
        }
    }
}

/// Directory-backed cache storage.
///
/// Opening does no I/O; the directory is created on first write.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    dir: PathBuf,
}

impl CacheStorage {
    /// Use `dir` as the cache location.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Get a cached entry if present and not expired.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<CacheEntry<T>>> {
        self.get_at(key, Utc::now())
    }

    /// Get a cached entry as seen at time `now`.
    pub fn get_at<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry<T>>> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        if entry.version != FORMAT_VERSION || entry.key != key.as_str() {
            log::debug!("Ignoring cache entry {} from another format", path.display());
            return Ok(None);
        }

        if entry.is_expired_at(now) {
            log::debug!(
                "Cache entry {} expired ({:?} class)",
                key,
                entry.ttl_class
            );
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Store a payload, replacing any previous entry for the key.
    pub fn put<T: Serialize>(&self, key: &CacheKey, payload: &T, ttl_class: TtlClass) -> Result<()> {
        self.put_at(key, payload, ttl_class, Utc::now())
    }

    /// Store a payload with an explicit storage timestamp.
    pub fn put_at<T: Serialize>(
        &self,
        key: &CacheKey,
        payload: &T,
        ttl_class: TtlClass,
        stored_at: DateTime<Utc>,
    ) -> Result<()> {
        let entry = CacheEntry {
            version: FORMAT_VERSION,
            key: key.as_str().to_string(),
            stored_at,
            ttl_class,
            payload,
        };
        let json = serde_json::to_vec(&entry).map_err(|e| CacheError::Serialize(e.to_string()))?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| CacheError::Io(format!("Failed to create temp file: {}", e)))?;
        tmp.write_all(&json)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| CacheError::Io(format!("Failed to write cache entry: {}", e)))?;
        tmp.persist(self.entry_path(key))
            .map_err(|e| CacheError::Io(format!("Failed to replace cache entry: {}", e.error)))?;

        Ok(())
    }

    /// Collect statistics over the entries in this cache's namespace.
    pub fn stats(&self) -> Result<CacheStats> {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        for (path, size) in self.entry_files()? {
            stats.total_entries += 1;
            stats.total_size_bytes += size;
            match read_header(&path) {
                Some(entry) if !entry.is_expired_at(now) => stats.valid_entries += 1,
                _ => stats.expired_entries += 1,
            }
        }
        Ok(stats)
    }

    /// Remove every entry in this cache's namespace.
    pub fn clear_all(&self) -> Result<ClearStats> {
        let mut removed = 0;
        for (path, _) in self.entry_files()? {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(ClearStats {
            entries_removed: removed,
        })
    }

    /// Remove expired or unreadable entries.
    pub fn prune_expired(&self) -> Result<ClearStats> {
        self.prune_expired_at(Utc::now())
    }

    pub fn prune_expired_at(&self, now: DateTime<Utc>) -> Result<ClearStats> {
        let mut removed = 0;
        for (path, _) in self.entry_files()? {
            let stale = read_header(&path).is_none_or(|entry| entry.is_expired_at(now));
            if stale {
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
                }
            }
        }
        Ok(ClearStats {
            entries_removed: removed,
        })
    }

    /// Files named `<key>.json` in the cache directory, with their sizes.
    fn entry_files(&self) -> Result<Vec<(PathBuf, usize)>> {
        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::Io(format!("Failed to list cache dir: {}", e))),
        };

        let mut files = Vec::new();
        for item in dir.flatten() {
            let path = item.path();
            let is_entry = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(".json"))
                .is_some_and(CacheKey::is_key);
            if !is_entry {
                continue;
            }
            let size = item.metadata().map(|m| m.len() as usize).unwrap_or(0);
            files.push((path, size));
        }
        Ok(files)
    }
}

/// Read an entry's metadata without decoding its payload.
fn read_header(path: &Path) -> Option<CacheEntry<IgnoredAny>> {
    let bytes = fs::read(path).ok()?;
    let entry: CacheEntry<IgnoredAny> = serde_json::from_slice(&bytes).ok()?;
    (entry.version == FORMAT_VERSION).then_some(entry)
}

/// Statistics about cache clear operation
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// Statistics about cache state
#[derive(Debug, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fingerprint;
    use crate::models::RequestDescriptor;
    use tempfile::TempDir;

    fn test_storage() -> (CacheStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::at(dir.path().join("cache"));
        (storage, dir)
    }

    fn key(id: &str) -> CacheKey {
        fingerprint(&RequestDescriptor::tweet(id).unwrap())
    }

    #[test]
    fn test_put_get_roundtrip() {
        let (storage, _dir) = test_storage();
        let payload = vec!["a".to_string(), "b".to_string()];

        storage.put(&key("1"), &payload, TtlClass::Search).unwrap();

        let entry = storage.get::<Vec<String>>(&key("1")).unwrap().unwrap();
        assert_eq!(entry.payload, payload);
        assert_eq!(entry.ttl_class, TtlClass::Search);
    }

    #[test]
    fn test_directory_created_lazily() {
        let (storage, _dir) = test_storage();
        assert!(!storage.dir().exists());
        assert!(storage.get::<String>(&key("1")).unwrap().is_none());
        assert!(!storage.dir().exists());

        storage.put(&key("1"), &"x", TtlClass::Default).unwrap();
        assert!(storage.dir().exists());
    }

    #[test]
    fn test_expiration_by_class() {
        let (storage, _dir) = test_storage();
        let stored = Utc::now();
        storage
            .put_at(&key("1"), &"search", TtlClass::Search, stored)
            .unwrap();
        storage
            .put_at(&key("2"), &"default", TtlClass::Default, stored)
            .unwrap();

        let later = stored + chrono::Duration::minutes(5);
        // Default class (60s) is gone, search class (15 min) still valid
        assert!(storage.get_at::<String>(&key("2"), later).unwrap().is_none());
        assert!(storage.get_at::<String>(&key("1"), later).unwrap().is_some());

        let much_later = stored + chrono::Duration::minutes(16);
        assert!(
            storage
                .get_at::<String>(&key("1"), much_later)
                .unwrap()
                .is_none()
        );
        // Expired entries are not deleted by reads
        assert!(storage.entry_path(&key("1")).exists());
    }

    #[test]
    fn test_put_overwrites() {
        let (storage, _dir) = test_storage();
        storage.put(&key("1"), &"old", TtlClass::Default).unwrap();
        storage.put(&key("1"), &"new", TtlClass::Default).unwrap();

        let entry = storage.get::<String>(&key("1")).unwrap().unwrap();
        assert_eq!(entry.payload, "new");
        assert_eq!(storage.stats().unwrap().total_entries, 1);
    }

    #[test]
    fn test_corrupt_entry_is_absent() {
        let (storage, _dir) = test_storage();
        fs::create_dir_all(storage.dir()).unwrap();
        fs::write(storage.entry_path(&key("1")), b"{not json").unwrap();

        assert!(storage.get::<String>(&key("1")).unwrap().is_none());
    }

    #[test]
    fn test_unusable_directory_reports_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let storage = CacheStorage::at(&blocker);

        assert!(storage.get::<String>(&key("1")).is_err());
        assert!(storage.put(&key("1"), &"x", TtlClass::Default).is_err());
    }

    #[test]
    fn test_stats_and_prune() {
        let (storage, _dir) = test_storage();
        let now = Utc::now();
        storage
            .put_at(&key("1"), &"fresh", TtlClass::Search, now)
            .unwrap();
        storage
            .put_at(
                &key("2"),
                &"stale",
                TtlClass::Default,
                now - chrono::Duration::minutes(10),
            )
            .unwrap();
        // Foreign files in the directory are left alone
        fs::write(storage.dir().join("notes.txt"), b"keep me").unwrap();

        let stats = storage.stats_at(now).unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);
        assert!(stats.total_size_bytes > 0);

        let pruned = storage.prune_expired_at(now).unwrap();
        assert_eq!(pruned.entries_removed, 1);
        assert!(storage.get_at::<String>(&key("1"), now).unwrap().is_some());
        assert!(storage.dir().join("notes.txt").exists());
    }

    #[test]
    fn test_clear_all() {
        let (storage, _dir) = test_storage();
        storage.put(&key("1"), &"d1", TtlClass::Default).unwrap();
        storage.put(&key("2"), &"d2", TtlClass::Default).unwrap();

        let stats = storage.clear_all().unwrap();
        assert_eq!(stats.entries_removed, 2);

        assert!(storage.get::<String>(&key("1")).unwrap().is_none());
        assert!(storage.get::<String>(&key("2")).unwrap().is_none());
    }

    #[test]
    fn test_stats_on_missing_dir() {
        let (storage, _dir) = test_storage();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_entries, 0);
    }
}

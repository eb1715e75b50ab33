use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Result;

use super::loader::Upload;
use super::model::Table;

// ---------------------------------------------------------------------------
// Load cache
// ---------------------------------------------------------------------------

/// What a cached entry was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Path(PathBuf),
    Upload { name: String, digest: blake3::Hash },
}

/// File identity at load time. A path entry is stale once this changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(FileStamp {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct Entry {
    stamp: Option<FileStamp>,
    table: Arc<Table>,
}

/// Parsed tables keyed by where they came from.
///
/// * Path entries are reused while the file's modification time and length
///   are unchanged, and re-read otherwise.
/// * Upload entries are keyed by file name and a BLAKE3 hash of the contents.
///
/// Entries are only ever replaced under the same key; there is no eviction.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<CacheKey, Entry>,
    hits: u64,
    misses: u64,
}

impl LoadCache {
    /// Return the cached table for `path`, or call `load` and remember it.
    pub fn load_path<F>(&mut self, path: &Path, load: F) -> Result<Arc<Table>>
    where
        F: FnOnce(&Path) -> Result<Table>,
    {
        let key = CacheKey::Path(path.to_path_buf());
        let stamp = FileStamp::of(path);
        if let Some(entry) = self.entries.get(&key) {
            if stamp.is_some() && entry.stamp == stamp {
                self.hits += 1;
                log::debug!("cache hit: {}", path.display());
                return Ok(entry.table.clone());
            }
            log::debug!("cache stale: {}", path.display());
        }

        self.misses += 1;
        let table = Arc::new(load(path)?);
        self.entries.insert(
            key,
            Entry {
                stamp,
                table: table.clone(),
            },
        );
        Ok(table)
    }

    /// Return the cached table for identical upload contents, or parse them.
    pub fn load_upload<F>(&mut self, upload: &Upload, parse: F) -> Result<Arc<Table>>
    where
        F: FnOnce(&Upload) -> Result<Table>,
    {
        let key = CacheKey::Upload {
            name: upload.name.clone(),
            digest: blake3::hash(&upload.bytes),
        };
        if let Some(entry) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("cache hit: upload {}", upload.name);
            return Ok(entry.table.clone());
        }

        self.misses += 1;
        let table = Arc::new(parse(upload)?);
        log::info!("Parsed upload {} ({} rows)", upload.name, table.len());
        self.entries.insert(
            key,
            Entry {
                stamp: None,
                table: table.clone(),
            },
        );
        Ok(table)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::entity::{Entity, EntityKey, Filter};
use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryEntityStore;
use crate::traits::EntityStore;

/// Durable entity store backed by a single JSON snapshot file.
///
/// Reads are served from memory. Every mutation is applied to a copy of the
/// map, the copy is written to a temporary file in the same directory, synced,
/// and renamed over the target, and only then installed in memory. A failed
/// write leaves both the file and the in-memory state as they were.
///
/// Only one store may have a given snapshot open at a time: `open` takes an
/// exclusive lock on a `<path>.lock` file next to the snapshot and holds it
/// until the store is dropped. A second opener, in this process or another,
/// gets [`StoreError::Locked`].
///
/// On-disk format: a JSON array of [`Entity`] records ordered by key.
pub struct FileEntityStore {
    path: PathBuf,
    inner: InMemoryEntityStore,
    /// Held open for the lifetime of the store; dropping it releases the lock.
    _lock: File,
}

impl FileEntityStore {
    /// Open (or create) the snapshot file at `path`.
    ///
    /// A missing or empty file opens as an empty store. Parent directories
    /// are created as needed; nothing is written until the first mutation.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = non_empty_parent(&path) {
            fs::create_dir_all(parent)?;
        }

        let lock_path = lock_path(&path);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        FileExt::try_lock_exclusive(&lock).map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                StoreError::Locked { path: path.clone() }
            } else {
                StoreError::Io(e)
            }
        })?;

        let entities: Vec<Entity> = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entities = entities.len(), "opened entity file");

        Ok(Self {
            path,
            inner: InMemoryEntityStore::from_entities(entities),
            _lock: lock,
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_snapshot(&self, map: &BTreeMap<EntityKey, Entity>) -> StoreResult<()> {
        let snapshot: Vec<&Entity> = map.values().collect();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let dir = non_empty_parent(&self.path).unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.path.display(), entities = snapshot.len(), "flushed entity file");
        Ok(())
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// `<path>.lock`, next to the snapshot. The snapshot itself is replaced by
/// rename on every write, so it cannot carry the lock.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

impl EntityStore for FileEntityStore {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>> {
        self.inner.get(key)
    }

    fn put(&self, entity: &Entity) -> StoreResult<()> {
        self.inner.transact(
            |map| {
                map.insert(entity.key.clone(), entity.clone());
            },
            |next| self.write_snapshot(next),
        )
    }

    fn delete(&self, key: &EntityKey) -> StoreResult<bool> {
        if self.inner.get(key)?.is_none() {
            return Ok(false);
        }
        self.inner
            .transact(|map| map.remove(key).is_some(), |next| self.write_snapshot(next))
    }

    fn query(&self, kind: &str, filter: &Filter) -> StoreResult<Vec<Entity>> {
        self.inner.query(kind, filter)
    }

    fn count(&self, kind: &str, filter: &Filter) -> StoreResult<usize> {
        self.inner.count(kind, filter)
    }

    fn delete_batch(&self, keys: &[EntityKey]) -> StoreResult<()> {
        self.inner.transact(
            |map| {
                for key in keys {
                    map.remove(key);
                }
            },
            |next| self.write_snapshot(next),
        )
    }
}

impl std::fmt::Debug for FileEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEntityStore")
            .field("path", &self.path)
            .field("entity_count", &self.inner.len())
            .finish()
    }
}

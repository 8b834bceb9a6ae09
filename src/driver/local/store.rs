//! # Local Filesystem Store

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;

use super::resolver::PathResolver;
use super::walk;
use crate::driver::backend::{
    AbsolutePathAware, DirectoryAware, ListDepth, SizeAware, StorageDriver, Touchable,
    WriteOutcome,
};
use crate::driver::clock::{Clock, SystemClock};
use crate::driver::config::StorageConfig;
use crate::driver::errors::{StorageError, StorageResult};
use crate::driver::sharding::shard_key;

/// Storage driver backed by a directory on the local filesystem.
///
/// Keys map directly to relative paths under the root. Checking operations
/// (`exists`, `is_directory`, `size`, `modified_time`) report absence instead
/// of failing; only a key that escapes the root is an error for them.
#[derive(Debug)]
pub struct LocalStore {
    resolver: PathResolver,
    public_url_prefix: String,
    date_folder_sharding: bool,
    clock: Box<dyn Clock>,
    recent_key: RwLock<Option<String>>,
}

impl LocalStore {
    /// Create a store from a validated config
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create a store whose date sharding reads "today" from `clock`
    pub fn with_clock(config: StorageConfig, clock: Box<dyn Clock>) -> StorageResult<Self> {
        config.validate()?;

        let resolver =
            PathResolver::new(&config.root_directory, config.create_missing_directories)?;
        info!(
            "opened local store at {} (sharding: {}, create: {})",
            resolver.root().display(),
            config.date_folder_sharding,
            config.create_missing_directories
        );

        Ok(Self {
            resolver,
            public_url_prefix: config.public_url_prefix,
            date_folder_sharding: config.date_folder_sharding,
            clock,
            recent_key: RwLock::new(None),
        })
    }

    /// Create a store from a loosely typed JSON config
    pub fn from_value(value: Value) -> StorageResult<Self> {
        Self::new(StorageConfig::from_value(value)?)
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Normalized key a write of `key` would be stored under
    pub fn effective_key(&self, key: &str) -> StorageResult<String> {
        let key = self.resolver.normalize_key(key)?;
        if self.date_folder_sharding {
            Ok(shard_key(&key, self.clock.today()))
        } else {
            Ok(key)
        }
    }

    /// Like [`StorageDriver::delete`] but reports why nothing was removed
    pub fn try_delete(&self, key: &str) -> StorageResult<()> {
        let path = self.locate_entry(key)?;
        let meta =
            fs::symlink_metadata(&path).map_err(|_| StorageError::NotFound(key.to_string()))?;

        let removed = if meta.is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| StorageError::write(key, e))?;

        info!("deleted {}", path.display());
        Ok(())
    }

    fn remember(&self, key: &str) {
        if let Ok(mut recent) = self.recent_key.write() {
            *recent = Some(key.to_string());
        }
    }

    /// Resolve for inspection: never creates directories
    fn locate(&self, key: &str) -> StorageResult<PathBuf> {
        self.remember(key);
        self.resolver.resolve_with(key, false)
    }

    /// Resolve without following a symlink in the final component
    fn locate_entry(&self, key: &str) -> StorageResult<PathBuf> {
        self.remember(key);
        self.resolver.resolve_entry(key)
    }

    /// Resolve for mutation: honours `create_missing_directories`
    fn locate_for_write(&self, key: &str) -> StorageResult<PathBuf> {
        self.remember(key);
        self.resolver.resolve(key)
    }
}

impl StorageDriver for LocalStore {
    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.locate(key)?.exists())
    }

    fn modified_time(&self, key: &str) -> StorageResult<Option<DateTime<Utc>>> {
        let path = self.locate(key)?;
        Ok(fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from))
    }

    fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.locate(key)?;
        fs::read(&path).map_err(|e| StorageError::read(key, e))
    }

    fn write(&self, key: &str, data: &[u8], append: bool) -> StorageResult<WriteOutcome> {
        self.remember(key);
        let key = self.effective_key(key)?;
        let path = self.locate_for_write(&key)?;

        if let Some(parent) = path.parent() {
            PathResolver::ensure_directory_exists(parent, true)?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let mut file = options
            .open(&path)
            .map_err(|e| StorageError::write(&key, e))?;
        file.write_all(data)
            .map_err(|e| StorageError::write(&key, e))?;

        info!(
            "wrote {} bytes to {} (append: {})",
            data.len(),
            path.display(),
            append
        );
        Ok(WriteOutcome {
            key,
            bytes_written: data.len(),
        })
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        match self.try_delete(key) {
            Ok(()) => Ok(true),
            Err(e @ StorageError::PathOutOfRoot { .. }) => Err(e),
            Err(e) => {
                warn!("delete of {:?} failed: {}", key, e);
                Ok(false)
            }
        }
    }

    fn rename(&self, source: &str, target: &str) -> StorageResult<()> {
        let source_path = self.locate_entry(source)?;
        if fs::symlink_metadata(&source_path).is_err() {
            return Err(StorageError::NotFound(source.to_string()));
        }

        let target_path = self.resolver.resolve(target)?;
        if let Some(parent) = target_path.parent() {
            PathResolver::ensure_directory_exists(parent, true)?;
        }

        fs::rename(&source_path, &target_path).map_err(|e| StorageError::write(source, e))?;

        info!(
            "renamed {} to {}",
            source_path.display(),
            target_path.display()
        );
        Ok(())
    }

    fn list(&self, key: &str, depth: ListDepth) -> StorageResult<Vec<String>> {
        let dir = self.locate(key)?;
        if !dir.is_dir() {
            debug!("list of {:?}: not a directory", key);
            return Ok(Vec::new());
        }

        let paths = match depth {
            ListDepth::Shallow => walk::read_children(&dir).unwrap_or_else(|e| {
                warn!("cannot list {}: {}", dir.display(), e);
                Vec::new()
            }),
            ListDepth::Unbounded => walk::collect_leaves(&dir, None),
            ListDepth::Limited(max) => walk::collect_leaves(&dir, Some(max)),
        };

        let mut keys = paths
            .iter()
            .map(|path| self.resolver.key_from_path(path))
            .collect::<StorageResult<Vec<_>>>()?;
        keys.sort();
        keys.dedup();

        Ok(keys)
    }

    fn url(&self, key: &str) -> String {
        self.remember(key);
        let key = key.replace('\\', "/");
        format!("{}/{}", self.public_url_prefix, key.trim_start_matches('/'))
    }

    fn recent_key(&self) -> Option<String> {
        self.recent_key.read().ok().and_then(|recent| recent.clone())
    }

    fn date_folder_sharding(&self) -> bool {
        self.date_folder_sharding
    }

    fn as_directory_aware(&self) -> Option<&dyn DirectoryAware> {
        Some(self)
    }

    fn as_size_aware(&self) -> Option<&dyn SizeAware> {
        Some(self)
    }

    fn as_absolute_path_aware(&self) -> Option<&dyn AbsolutePathAware> {
        Some(self)
    }

    fn as_touchable(&self) -> Option<&dyn Touchable> {
        Some(self)
    }
}

impl DirectoryAware for LocalStore {
    fn is_directory(&self, key: &str) -> StorageResult<bool> {
        self.locate_entry(key)?;
        // A final symlink leading out of the root is an entry, not a directory
        Ok(self
            .resolver
            .resolve_with(key, false)
            .map(|path| path.is_dir())
            .unwrap_or(false))
    }
}

impl SizeAware for LocalStore {
    fn size(&self, key: &str) -> StorageResult<Option<u64>> {
        let path = self.locate(key)?;
        Ok(fs::metadata(&path).ok().map(|meta| meta.len()))
    }
}

impl AbsolutePathAware for LocalStore {
    fn absolute_path(&self, key: &str) -> StorageResult<PathBuf> {
        self.locate_for_write(key)
    }
}

impl Touchable for LocalStore {
    fn touch(&self, key: &str) -> StorageResult<()> {
        let path = self.locate_for_write(key)?;

        let file = if path.is_dir() {
            File::open(&path)
        } else {
            OpenOptions::new().create(true).append(true).open(&path)
        }
        .map_err(|e| StorageError::write(key, e))?;

        file.set_modified(SystemTime::now())
            .map_err(|e| StorageError::write(key, e))?;

        debug!("touched {}", path.display());
        Ok(())
    }
}

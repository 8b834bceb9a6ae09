//! # Storage Driver Traits
//!
//! `StorageDriver` is the contract every backend implements. Optional
//! capabilities live in their own traits; a backend exposes the ones it
//! supports through the `as_*` views, and callers can ask with `supports`.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::errors::StorageResult;

/// How deep a listing descends below the listed key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListDepth {
    /// Immediate children only, directories included
    #[default]
    Shallow,
    /// Every leaf at any depth
    Unbounded,
    /// Leaves at most this many levels below the immediate children
    Limited(usize),
}

impl From<bool> for ListDepth {
    fn from(recursive: bool) -> Self {
        if recursive {
            ListDepth::Unbounded
        } else {
            ListDepth::Shallow
        }
    }
}

impl From<usize> for ListDepth {
    /// A depth of zero means "not recursive"
    fn from(depth: usize) -> Self {
        match depth {
            0 => ListDepth::Shallow,
            n => ListDepth::Limited(n),
        }
    }
}

/// Result of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Key the bytes were stored under, after date sharding
    pub key: String,
    pub bytes_written: usize,
}

/// Optional driver capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DirectoryAware,
    SizeAware,
    AbsolutePath,
    Touchable,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::DirectoryAware,
        Capability::SizeAware,
        Capability::AbsolutePath,
        Capability::Touchable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::DirectoryAware => "directory_aware",
            Capability::SizeAware => "size_aware",
            Capability::AbsolutePath => "absolute_path",
            Capability::Touchable => "touchable",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend trait for key-addressed byte storage
pub trait StorageDriver: Send + Sync + fmt::Debug {
    /// Whether anything is stored at `key`
    fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Last modification time, `None` if nothing is stored at `key`
    fn modified_time(&self, key: &str) -> StorageResult<Option<DateTime<Utc>>>;

    /// Full contents stored at `key`
    fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Store `data` at `key`, replacing or appending to existing contents
    fn write(&self, key: &str, data: &[u8], append: bool) -> StorageResult<WriteOutcome>;

    /// Best-effort removal; `Ok(false)` when nothing was removed
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Move whatever is stored at `source` to `target`
    fn rename(&self, source: &str, target: &str) -> StorageResult<()>;

    /// Keys under `key` (`""` for the whole store), sorted ascending
    fn list(&self, key: &str, depth: ListDepth) -> StorageResult<Vec<String>>;

    /// Public URL for `key`
    fn url(&self, key: &str) -> String;

    /// Key passed to the most recent operation
    fn recent_key(&self) -> Option<String>;

    /// Whether written keys are sharded into date folders
    fn date_folder_sharding(&self) -> bool {
        false
    }

    fn as_directory_aware(&self) -> Option<&dyn DirectoryAware> {
        None
    }

    fn as_size_aware(&self) -> Option<&dyn SizeAware> {
        None
    }

    fn as_absolute_path_aware(&self) -> Option<&dyn AbsolutePathAware> {
        None
    }

    fn as_touchable(&self) -> Option<&dyn Touchable> {
        None
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::DirectoryAware => self.as_directory_aware().is_some(),
            Capability::SizeAware => self.as_size_aware().is_some(),
            Capability::AbsolutePath => self.as_absolute_path_aware().is_some(),
            Capability::Touchable => self.as_touchable().is_some(),
        }
    }

    fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.supports(*c))
            .collect()
    }
}

/// Backends that distinguish directories from files
pub trait DirectoryAware {
    fn is_directory(&self, key: &str) -> StorageResult<bool>;
}

/// Backends that can report stored size
pub trait SizeAware {
    /// Size in bytes, `None` if nothing is stored at `key`
    fn size(&self, key: &str) -> StorageResult<Option<u64>>;
}

/// Backends whose keys map to local filesystem paths
pub trait AbsolutePathAware {
    fn absolute_path(&self, key: &str) -> StorageResult<PathBuf>;
}

/// Backends that can bump modification times
pub trait Touchable {
    /// Update the modification time, creating an empty item if absent
    fn touch(&self, key: &str) -> StorageResult<()>;
}

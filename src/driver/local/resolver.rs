//! # Path Resolution
//!
//! Maps logical keys to physical paths under a storage root and back.
//!
//! Keys are `/`-separated. Leading, trailing and repeated separators are
//! ignored, `.` segments are dropped and `..` segments are applied lexically.
//! A key whose `..` segments climb above the root is rejected, as is any key
//! whose resolved path (after following symlinks that already exist on disk)
//! lands outside the root.

use std::fs::{self, DirBuilder};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use log::debug;

use crate::driver::errors::{StorageError, StorageResult};

#[cfg(unix)]
use std::os::unix::fs::DirBuilderExt;

/// Permissions for directories created on demand (the umask still applies)
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o777;

/// Symlinks followed while checking one path before it counts as escaping
const MAX_LINK_HOPS: usize = 40;

fn is_key_separator(c: char) -> bool {
    c == '/' || std::path::is_separator(c)
}

/// Collapse `.` and `..` components without touching the filesystem
fn lexically_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Bidirectional key/path mapping scoped to one root
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    /// Set once the root exists on disk
    canonical_root: OnceLock<PathBuf>,
    create_missing: bool,
}

impl PathResolver {
    /// Create a resolver for `raw_root`
    pub fn new(raw_root: &str, create_missing: bool) -> StorageResult<Self> {
        let resolver = Self {
            root: Self::normalize_root(raw_root)?,
            canonical_root: OnceLock::new(),
            create_missing,
        };
        resolver.canonical_root();

        Ok(resolver)
    }

    /// The normalized root every resolved path lives under
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn creates_missing_directories(&self) -> bool {
        self.create_missing
    }

    /// Normalize a configured root directory.
    ///
    /// Relative roots are anchored at the current directory, redundant
    /// separators and `.`/`..` components are collapsed and the trailing
    /// separator is dropped. A root that already exists is canonicalized so
    /// symlinked roots compare correctly against canonical paths.
    pub fn normalize_root(raw: &str) -> StorageResult<PathBuf> {
        if raw.trim().is_empty() {
            return Err(StorageError::InvalidConfig(
                "root directory cannot be empty".into(),
            ));
        }

        let raw = Path::new(raw);
        let absolute = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| StorageError::InvalidConfig(format!("no current directory: {}", e)))?
                .join(raw)
        };

        let mut root = lexically_normalize(&absolute);
        if root.exists() {
            root = fs::canonicalize(&root).map_err(|e| {
                StorageError::InvalidConfig(format!("cannot resolve {}: {}", root.display(), e))
            })?;
        }

        Ok(root)
    }

    /// Normalize a key into its canonical `/`-joined form.
    ///
    /// `""` (or a key made only of separators) normalizes to `""`, the root.
    pub fn normalize_key(&self, key: &str) -> StorageResult<String> {
        Ok(self.key_segments(key)?.join("/"))
    }

    fn key_segments<'k>(&self, key: &'k str) -> StorageResult<Vec<&'k str>> {
        let mut segments: Vec<&str> = Vec::new();

        for segment in key.split(is_key_separator) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(self.out_of_root(key, &self.root.join(key)));
                    }
                }
                name => segments.push(name),
            }
        }

        Ok(segments)
    }

    /// Physical path for `key` without touching the filesystem
    pub fn build_path(&self, key: &str) -> StorageResult<PathBuf> {
        let mut path = self.root.clone();
        for segment in self.key_segments(key)? {
            path.push(segment);
        }

        // A segment such as a drive prefix can replace the whole path
        if !path.starts_with(&self.root) {
            return Err(self.out_of_root(key, &path));
        }

        Ok(path)
    }

    /// Resolve `key` using the configured create-missing behaviour
    pub fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        self.resolve_with(key, self.create_missing)
    }

    /// Resolve `key` to a contained physical path.
    ///
    /// When `create_missing` is set the parent directory chain of the
    /// resolved path is created (the root itself when `key` is empty).
    pub fn resolve_with(&self, key: &str, create_missing: bool) -> StorageResult<PathBuf> {
        let path = self.build_path(key)?;
        self.check_physical_containment(key, &path)?;

        if create_missing {
            let dir = if path == self.root {
                path.as_path()
            } else {
                path.parent().unwrap_or(&self.root)
            };
            Self::ensure_directory_exists(dir, true)?;
        }

        debug!("resolved key {:?} to {}", key, path.display());
        Ok(path)
    }

    /// Resolve `key` to the directory entry it names without following it.
    ///
    /// Every ancestor is checked like [`resolve`](Self::resolve), but the final
    /// component may be a symlink pointing anywhere: callers inspect or remove
    /// the link itself. Never creates directories.
    pub fn resolve_entry(&self, key: &str) -> StorageResult<PathBuf> {
        let path = self.build_path(key)?;
        match path.parent() {
            Some(parent) if path != self.root => self.check_physical_containment(key, parent)?,
            _ => self.check_physical_containment(key, &path)?,
        }

        Ok(path)
    }

    /// Canonical form of the root, cached once the root exists
    fn canonical_root(&self) -> &Path {
        if let Some(canonical) = self.canonical_root.get() {
            return canonical;
        }

        match fs::canonicalize(&self.root) {
            Ok(canonical) => self.canonical_root.get_or_init(|| canonical).as_path(),
            Err(_) => self.root.as_path(),
        }
    }

    fn is_under_root(&self, path: &Path) -> bool {
        path.starts_with(&self.root) || path.starts_with(self.canonical_root())
    }

    fn check_physical_containment(&self, key: &str, path: &Path) -> StorageResult<()> {
        self.physical_landing(path, 0)
            .map_err(|escaped| self.out_of_root(key, &escaped))
    }

    /// Follow the symlinks along `path` as the OS would when opening it.
    ///
    /// The deepest existing ancestor must canonicalize under the root. A
    /// dangling symlink is followed through its target, so creating a file
    /// through it cannot land outside. `Err` carries where the path escapes to.
    fn physical_landing(&self, path: &Path, hops: usize) -> Result<(), PathBuf> {
        if !self.is_under_root(path) {
            return Err(path.to_path_buf());
        }

        for ancestor in path.ancestors() {
            if !self.is_under_root(ancestor) {
                break;
            }

            let Ok(meta) = fs::symlink_metadata(ancestor) else {
                continue;
            };

            if let Ok(canonical) = fs::canonicalize(ancestor) {
                return if self.is_under_root(&canonical) {
                    Ok(())
                } else {
                    Err(canonical)
                };
            }

            if meta.file_type().is_symlink() {
                if hops >= MAX_LINK_HOPS {
                    return Err(ancestor.to_path_buf());
                }

                let target = fs::read_link(ancestor).map_err(|_| ancestor.to_path_buf())?;
                let base = ancestor.parent().unwrap_or(&self.root);
                let base = fs::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());

                let mut landed = lexically_normalize(&base.join(target));
                if let Ok(tail) = path.strip_prefix(ancestor) {
                    if !tail.as_os_str().is_empty() {
                        landed.push(tail);
                    }
                }
                return self.physical_landing(&landed, hops + 1);
            }
        }

        Ok(())
    }

    /// Inverse of [`resolve`](Self::resolve): the key for a path under the root
    pub fn key_from_path(&self, path: &Path) -> StorageResult<String> {
        let relative = match path.strip_prefix(&self.root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                path.strip_prefix(self.canonical_root())
                    .map(Path::to_path_buf)
                    .map_err(|_| self.out_of_root(&path.to_string_lossy(), path))?
            }
        };

        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        Ok(segments.join("/"))
    }

    /// Create `dir` unless it already exists. Idempotent.
    pub fn ensure_directory_exists(dir: &Path, recursive: bool) -> StorageResult<()> {
        if dir.is_dir() {
            return Ok(());
        }

        let failure = |reason: String| StorageError::DirectoryCreationFailure {
            path: dir.display().to_string(),
            reason,
        };

        if dir.exists() {
            return Err(failure("a non-directory already exists at this path".into()));
        }

        let mut builder = DirBuilder::new();
        builder.recursive(recursive);
        #[cfg(unix)]
        builder.mode(DIRECTORY_MODE);

        match builder.create(dir) {
            Ok(()) => {
                debug!("created directory {}", dir.display());
                Ok(())
            }
            // Lost a race with another creator
            Err(_) if dir.is_dir() => Ok(()),
            Err(e) => Err(failure(e.to_string())),
        }
    }

    fn out_of_root(&self, key: &str, path: &Path) -> StorageError {
        StorageError::PathOutOfRoot {
            key: key.to_string(),
            path: path.display().to_string(),
            root: self.root.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver(temp: &TempDir, create: bool) -> PathResolver {
        PathResolver::new(temp.path().to_str().unwrap(), create).unwrap()
    }

    #[test]
    fn test_normalize_root_collapses_components() {
        let temp = TempDir::new().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();
        let messy = format!("{}//./sub/..//", temp.path().display());

        assert_eq!(PathResolver::normalize_root(&messy).unwrap(), canonical);
    }

    #[test]
    fn test_normalize_root_missing_directory() {
        let root = PathResolver::normalize_root("/definitely/not/here/./x/../y/").unwrap();
        assert_eq!(root, PathBuf::from("/definitely/not/here/y"));
    }

    #[test]
    fn test_normalize_root_relative_is_absolute() {
        let root = PathResolver::normalize_root("some-relative-store-dir").unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("some-relative-store-dir"));
    }

    #[test]
    fn test_empty_root_rejected() {
        assert!(matches!(
            PathResolver::normalize_root(""),
            Err(StorageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_key_is_root() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, false);
        assert_eq!(resolver.resolve("").unwrap(), resolver.root());
        assert_eq!(resolver.resolve("///").unwrap(), resolver.root());
    }

    #[test]
    fn test_separators_are_trimmed() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, false);
        let expected = resolver.root().join("a").join("b.txt");

        assert_eq!(resolver.resolve("a/b.txt").unwrap(), expected);
        assert_eq!(resolver.resolve("/a//b.txt/").unwrap(), expected);
        assert_eq!(resolver.resolve("./a/./b.txt").unwrap(), expected);
        assert_eq!(resolver.resolve("a/x/../b.txt").unwrap(), expected);
    }

    #[test]
    fn test_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, false);

        for key in ["../../etc/passwd", "..", "a/../../b", "/../x"] {
            let err = resolver.resolve(key).unwrap_err();
            assert!(
                matches!(err, StorageError::PathOutOfRoot { .. }),
                "{key} should be out of root, got {err}"
            );
            assert_eq!(err.key(), Some(key));
        }
    }

    #[test]
    fn test_absolute_key_stays_inside_root() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, false);

        let path = resolver.resolve("/etc/passwd").unwrap();
        assert_eq!(path, resolver.root().join("etc").join("passwd"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outside = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();
        let resolver = resolver(&temp, true);

        let err = resolver.resolve("link/secret.txt").unwrap_err();
        assert!(matches!(err, StorageError::PathOutOfRoot { .. }));
        assert!(!outside.path().join("secret.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_escape_rejected() {
        let outside = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let target = outside.path().join("planted.txt");
        std::os::unix::fs::symlink(&target, temp.path().join("link")).unwrap();
        std::os::unix::fs::symlink("../../../../../../../../tmp/nowhere", temp.path().join("rel"))
            .unwrap();
        let resolver = resolver(&temp, true);

        for key in ["link", "rel", "rel/deeper"] {
            let err = resolver.resolve(key).unwrap_err();
            assert!(matches!(err, StorageError::PathOutOfRoot { .. }), "{key}");
        }
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_inside_root_allowed() {
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink("later/file.txt", temp.path().join("link")).unwrap();
        let resolver = resolver(&temp, false);

        assert_eq!(resolver.resolve("link").unwrap(), resolver.root().join("link"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_rejected() {
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(temp.path().join("b"), temp.path().join("a")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("a"), temp.path().join("b")).unwrap();
        let resolver = resolver(&temp, false);

        assert!(matches!(
            resolver.resolve("a"),
            Err(StorageError::PathOutOfRoot { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_entry_does_not_follow_leaf() {
        let outside = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();
        let resolver = resolver(&temp, false);

        assert!(resolver.resolve("link").is_err());
        assert_eq!(resolver.resolve_entry("link").unwrap(), resolver.root().join("link"));
        assert!(resolver.resolve_entry("link/inner").is_err());
        assert!(resolver.resolve_entry("../x").is_err());
    }

    #[test]
    fn test_create_missing_parents() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, true);

        let path = resolver.resolve("x/y/z.bin").unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn test_no_creation_without_flag() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, false);

        resolver.resolve("x/y/z.bin").unwrap();
        assert!(!temp.path().join("x").exists());
    }

    #[test]
    fn test_key_from_path_round_trip() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, false);

        for key in ["a", "a/b.txt", "/deep/er/still/file", "x/./y/../z/", ""] {
            let path = resolver.resolve(key).unwrap();
            assert_eq!(
                resolver.key_from_path(&path).unwrap(),
                resolver.normalize_key(key).unwrap()
            );
        }
    }

    #[test]
    fn test_key_from_foreign_path() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(&temp, false);

        let err = resolver.key_from_path(Path::new("/elsewhere/file")).unwrap_err();
        assert!(matches!(err, StorageError::PathOutOfRoot { .. }));
    }

    #[test]
    fn test_ensure_directory_exists() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("one/two/three");

        assert!(PathResolver::ensure_directory_exists(&dir, false).is_err());
        PathResolver::ensure_directory_exists(&dir, true).unwrap();
        assert!(dir.is_dir());
        // Idempotent
        PathResolver::ensure_directory_exists(&dir, true).unwrap();

        let file = temp.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            PathResolver::ensure_directory_exists(&file, true),
            Err(StorageError::DirectoryCreationFailure { .. })
        ));
    }
}

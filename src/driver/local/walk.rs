//! # Directory Enumeration
//!
//! Non-recursive listing returns every entry. Recursive listing returns
//! leaves only: directories are descended into but not reported, and
//! symlinks are reported as leaves without being followed. A branch that
//! cannot be read contributes no entries instead of failing the walk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

/// Immediate entries of `dir` (files and directories)
pub fn read_children(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        children.push(entry?.path());
    }
    Ok(children)
}

/// Non-directory entries under `dir`, at most `max_depth` levels below it.
///
/// Depth 0 means immediate children; `None` is unbounded.
pub fn collect_leaves(dir: &Path, max_depth: Option<usize>) -> Vec<PathBuf> {
    let mut leaves = Vec::new();
    walk(dir, 0, max_depth, &mut leaves);
    leaves
}

fn walk(dir: &Path, depth: usize, max_depth: Option<usize>, leaves: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        // DirEntry::file_type does not follow symlinks
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            leaves.push(entry.path());
        } else if max_depth.map_or(true, |max| depth < max) {
            walk(&entry.path(), depth + 1, max_depth, leaves);
        }
    }
}

//! Directory-tree abstraction the discoverer walks.
//!
//! Template discovery needs three things from wherever templates live:
//!
//! 1. A full recursive walk yielding each path with an is-directory flag
//! 2. The immediate child files of a directory (to expand include directories)
//! 3. The text of a file
//!
//! [`SourceTree`] captures exactly that. Two implementations are provided:
//!
//! | Type | Backing | Typical use |
//! |------|---------|-------------|
//! | [`DirTree`] | The real filesystem | Development, server deployments |
//! | [`MemoryTree`] | `(path, content)` pairs | Embedded templates, tests |
//!
//! Paths handed to and returned from a tree are relative to the tree's own base
//! (the working directory for [`DirTree`]). Walks are deterministic: children are
//! visited in lexical order.

mod dir;
mod memory;

use std::io;
use std::path::{Path, PathBuf};

pub use dir::DirTree;
pub use memory::MemoryTree;

/// A walk that stopped at an unreadable entry.
#[derive(Debug, thiserror::Error)]
#[error("cannot walk {}: {source}", path.display())]
pub struct WalkError {
    /// The entry that failed, not necessarily the walk root.
    pub path: PathBuf,
    /// The underlying failure.
    #[source]
    pub source: io::Error,
}

impl WalkError {
    /// Attaches `path` to an I/O failure.
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// One entry visited by [`SourceTree::walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path of the entry, including the walk root as prefix.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl TreeEntry {
    /// Creates a file entry.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    /// Creates a directory entry.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// A tree of template files.
pub trait SourceTree {
    /// Visits `root` and every entry below it, depth first.
    ///
    /// The root itself is the first entry. Fails on the first entry that cannot
    /// be read, reporting that entry's path.
    fn walk(&self, root: &Path) -> Result<Vec<TreeEntry>, WalkError>;

    /// Lists the files directly inside `dir`, sorted by name.
    ///
    /// Subdirectories are not included.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reads a file's content.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

impl<T: SourceTree + ?Sized> SourceTree for &T {
    fn walk(&self, root: &Path) -> Result<Vec<TreeEntry>, WalkError> {
        (**self).walk(root)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        (**self).list_files(dir)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

//! In-memory tree for embedded templates and tests.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::{SourceTree, TreeEntry, WalkError};

/// A [`SourceTree`] holding file contents in memory.
///
/// Directories are implied by the files below them, so an empty directory cannot
/// be represented (it would contribute nothing to a build anyway).
///
/// ```rust
/// use strata::MemoryTree;
///
/// let tree = MemoryTree::from_entries(&[
///     ("templates/layout.html", "<main>{% block content %}{% endblock %}</main>"),
///     ("templates/profile/view.html", "{% block content %}view{% endblock %}"),
/// ]);
/// assert_eq!(tree.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree from `(path, content)` pairs.
    ///
    /// This is the shape produced by `include_str!`-based embedding. Later
    /// entries replace earlier ones with the same path.
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        let mut tree = Self::new();
        for (path, content) in entries {
            tree.insert(*path, *content);
        }
        tree
    }

    /// Adds or replaces a file. `path` uses `/` separators.
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Returns the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the tree holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files under `root` as paths relative to it.
    fn relative_files<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = &'a Path> + 'a {
        let root = normalize(root);
        self.files.keys().filter_map(move |path| {
            if root.as_os_str().is_empty() {
                Some(path.as_path())
            } else {
                path.strip_prefix(&root).ok()
            }
        })
    }
}

impl SourceTree for MemoryTree {
    fn walk(&self, root: &Path) -> Result<Vec<TreeEntry>, WalkError> {
        // Component-wise ordering of paths is a depth-first, lexical pre-order.
        let mut entries: BTreeMap<PathBuf, bool> = BTreeMap::new();
        let mut found = false;

        for relative in self.relative_files(root) {
            found = true;
            if relative.as_os_str().is_empty() {
                // `root` names a file rather than a directory.
                entries.insert(PathBuf::new(), false);
                continue;
            }
            entries.insert(PathBuf::new(), true);
            let mut dir = PathBuf::new();
            let mut components = relative.components().peekable();
            while let Some(component) = components.next() {
                dir.push(component);
                let is_dir = components.peek().is_some();
                entries.entry(dir.clone()).or_insert(is_dir);
            }
        }

        if !found {
            return Err(WalkError::new(root, not_found(root)));
        }

        Ok(entries
            .into_iter()
            .map(|(relative, is_dir)| TreeEntry {
                path: if relative.as_os_str().is_empty() {
                    root.to_path_buf()
                } else {
                    root.join(relative)
                },
                is_dir,
            })
            .collect())
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut found = false;
        let mut files = Vec::new();
        for relative in self.relative_files(dir) {
            found = true;
            let mut components = relative.components();
            if let (Some(name), None) = (components.next(), components.next()) {
                files.push(dir.join(name));
            }
        }
        if !found {
            return Err(not_found(dir));
        }
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }
}

/// Drops `.` components so `./t/a.html` and `t/a.html` name the same file.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

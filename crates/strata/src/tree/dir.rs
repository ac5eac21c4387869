//! Filesystem-backed tree.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{SourceTree, TreeEntry, WalkError};

/// A [`SourceTree`] over the real filesystem.
///
/// Paths are resolved against `base`. [`DirTree::cwd`] uses the process working
/// directory, so `"templates"` means `./templates`; paths in entries and errors are
/// reported exactly as joined, without canonicalization.
///
/// ```rust,ignore
/// let tree = DirTree::new("/srv/app");
/// let registry = Registry::build(&tree, "templates", &Config::default())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirTree {
    base: PathBuf,
}

impl DirTree {
    /// Creates a tree rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Creates a tree rooted at the process working directory.
    pub fn cwd() -> Self {
        Self::default()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if self.base.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }

    fn walk_recursive(
        &self,
        current: &Path,
        entries: &mut Vec<TreeEntry>,
    ) -> Result<(), WalkError> {
        let children = sorted_children(&self.resolve(current)).map_err(|(name, e)| {
            let path = match name {
                Some(name) => current.join(name),
                None => current.to_path_buf(),
            };
            WalkError::new(path, e)
        })?;
        for (name, is_dir) in children {
            let path = current.join(name);
            if is_dir {
                entries.push(TreeEntry::dir(path.clone()));
                self.walk_recursive(&path, entries)?;
            } else {
                entries.push(TreeEntry::file(path));
            }
        }
        Ok(())
    }
}

impl SourceTree for DirTree {
    fn walk(&self, root: &Path) -> Result<Vec<TreeEntry>, WalkError> {
        let metadata = fs::metadata(self.resolve(root)).map_err(|e| WalkError::new(root, e))?;
        if !metadata.is_dir() {
            return Ok(vec![TreeEntry::file(root)]);
        }

        let mut entries = vec![TreeEntry::dir(root)];
        self.walk_recursive(root, &mut entries)?;
        Ok(entries)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(sorted_children(&self.resolve(dir))
            .map_err(|(_, e)| e)?
            .into_iter()
            .filter(|(_, is_dir)| !is_dir)
            .map(|(name, _)| dir.join(name))
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }
}

/// Reads a directory's children as `(file name, is_dir)`, sorted by name.
///
/// On failure the name of the offending child is returned alongside the error,
/// or `None` if `dir` itself could not be listed.
fn sorted_children(
    dir: &Path,
) -> Result<Vec<(OsString, bool)>, (Option<OsString>, io::Error)> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| (None, e))? {
        let entry = entry.map_err(|e| (None, e))?;
        // Follows symlinks, so a linked directory is walked like a real one.
        let metadata =
            fs::metadata(entry.path()).map_err(|e| (Some(entry.file_name()), e))?;
        children.push((entry.file_name(), metadata.is_dir()));
    }
    children.sort();
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, relative_path: &str, content: &str) {
        let full_path = dir.join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = fs::File::create(&full_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_walk_is_lexical_and_depth_first() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "t/b.html", "");
        create_file(temp_dir.path(), "t/a/x.html", "");
        create_file(temp_dir.path(), "t/c.html", "");

        let tree = DirTree::new(temp_dir.path());
        let entries = tree.walk(Path::new("t")).unwrap();

        assert_eq!(
            entries,
            vec![
                TreeEntry::dir("t"),
                TreeEntry::dir("t/a"),
                TreeEntry::file("t/a/x.html"),
                TreeEntry::file("t/b.html"),
                TreeEntry::file("t/c.html"),
            ]
        );
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let tree = DirTree::new(temp_dir.path());
        let err = tree.walk(Path::new("nope")).unwrap_err();
        assert_eq!(err.path, PathBuf::from("nope"));
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_reports_failing_entry_not_root() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "t/a.html", "");
        fs::create_dir_all(temp_dir.path().join("t/sub")).unwrap();
        // A self-referencing link cannot be resolved.
        std::os::unix::fs::symlink("loop", temp_dir.path().join("t/sub/loop")).unwrap();

        let tree = DirTree::new(temp_dir.path());
        let err = tree.walk(Path::new("t")).unwrap_err();
        assert_eq!(err.path, PathBuf::from("t/sub/loop"));
    }

    #[test]
    fn test_list_files_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "includes/footer.html", "");
        create_file(temp_dir.path(), "includes/header.html", "");
        create_file(temp_dir.path(), "includes/nested/deep.html", "");

        let tree = DirTree::new(temp_dir.path());
        let files = tree.list_files(Path::new("includes")).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("includes/footer.html"),
                PathBuf::from("includes/header.html"),
            ]
        );
    }

    #[test]
    fn test_read_to_string_resolves_against_base() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "t/view.html", "view");

        let tree = DirTree::new(temp_dir.path());
        assert_eq!(tree.read_to_string(Path::new("t/view.html")).unwrap(), "view");
    }
}

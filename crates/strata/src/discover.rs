//! Template discovery: classification and composition planning.
//!
//! A scan walks the tree once and sorts every entry into one of four buckets
//! ([`EntryKind`]). From those buckets it assembles one [`CompositionPlan`] per
//! leaf template, listing what must be compiled together with it.
//!
//! # Directory Convention
//!
//! ```text
//! templates/
//! ├── layout.html            Layout for everything below templates/
//! ├── includes/              Partials for everything below templates/
//! │   ├── header.html
//! │   └── footer.html
//! └── profile/
//!     ├── layout.html        Layout for profile/, applied after the root one
//!     ├── view.html          Leaf: "profile/view"
//!     └── edit.html          Leaf: "profile/edit"
//! ```
//!
//! A layout or include directory applies to every leaf at or below the directory
//! that contains it. Both are ordered shallow to deep, so a deeper layout's blocks
//! and a deeper include directory's partials override shallower ones.
//!
//! # Ordering
//!
//! Layouts and include directories are sorted by the length of their path, which
//! stands in for nesting depth. Every layout that applies to a given leaf lies on
//! that leaf's ancestor chain, and an ancestor's path is always a strict prefix of
//! a descendant's, so the length order equals the depth order for every plan.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use crate::error::BuildError;
use crate::tree::SourceTree;

/// Classification of one entry visited during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory of partials.
    IncludeDir,
    /// A layout file.
    Layout,
    /// A leaf template, addressable by identifier.
    PlainTemplate,
    /// Anything else: ordinary directories and files directly inside an include
    /// directory.
    Ignored,
}

/// Classifies an entry purely from its path and kind.
///
/// The rules, first match wins:
///
/// 1. A directory named `include_dir_name` is an [`EntryKind::IncludeDir`].
/// 2. Any other directory is [`EntryKind::Ignored`].
/// 3. A file whose parent directory is named `include_dir_name` is
///    [`EntryKind::Ignored`]; it is only reached by expanding the include directory.
/// 4. A file named `layout_filename` is an [`EntryKind::Layout`].
/// 5. Any other file is an [`EntryKind::PlainTemplate`].
///
/// Only direct children of an include directory are excluded: a file in
/// `includes/sub/` is a plain template.
pub fn classify(
    path: &Path,
    is_dir: bool,
    include_dir_name: &str,
    layout_filename: &str,
) -> EntryKind {
    if is_dir {
        return if file_name_is(path, include_dir_name) {
            EntryKind::IncludeDir
        } else {
            EntryKind::Ignored
        };
    }

    if path.parent().is_some_and(|p| file_name_is(p, include_dir_name)) {
        EntryKind::Ignored
    } else if file_name_is(path, layout_filename) {
        EntryKind::Layout
    } else {
        EntryKind::PlainTemplate
    }
}

fn file_name_is(path: &Path, name: &str) -> bool {
    path.file_name().is_some_and(|n| n == name)
}

/// The ordered recipe for compiling one leaf template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionPlan {
    /// The identifier the compiled template is registered under.
    pub identifier: String,
    /// Include directories whose partials are compiled in, shallow to deep.
    pub include_dirs: Vec<PathBuf>,
    /// Layout files compiled before the leaf, shallow to deep.
    pub layout_files: Vec<PathBuf>,
    /// The leaf template itself.
    pub leaf_file: PathBuf,
}

impl CompositionPlan {
    /// The layout chain followed by the leaf, in compile order.
    pub fn chain(&self) -> Vec<PathBuf> {
        let mut files = self.layout_files.clone();
        files.push(self.leaf_file.clone());
        files
    }
}

/// Walks `root` in `tree` and returns one plan per leaf template, in walk order.
///
/// # Errors
///
/// Returns [`BuildError::Discovery`] carrying the failing entry's path if the
/// walk fails, or carrying `root` if `root` is not a directory.
pub fn scan<T: SourceTree + ?Sized>(
    tree: &T,
    root: impl AsRef<Path>,
    include_dir_name: &str,
    layout_filename: &str,
) -> Result<Vec<CompositionPlan>, BuildError> {
    let root = root.as_ref();
    let entries = tree
        .walk(root)
        .map_err(|e| BuildError::discovery(e.path, e.source))?;
    if entries.first().is_some_and(|entry| !entry.is_dir) {
        return Err(BuildError::discovery(
            root,
            io::Error::new(io::ErrorKind::NotADirectory, "scan root is not a directory"),
        ));
    }

    let mut include_dirs = Vec::new();
    let mut layouts = Vec::new();
    let mut templates = Vec::new();

    for entry in entries {
        let kind = classify(&entry.path, entry.is_dir, include_dir_name, layout_filename);
        trace!(path = %entry.path.display(), ?kind, "classified entry");
        match kind {
            EntryKind::IncludeDir => include_dirs.push(entry.path),
            EntryKind::Layout => layouts.push(entry.path),
            EntryKind::PlainTemplate => templates.push(entry.path),
            EntryKind::Ignored => {}
        }
    }

    // `sort_by_key` is stable, so equal lengths keep walk order.
    layouts.sort_by_key(|p| p.as_os_str().len());
    include_dirs.sort_by_key(|p| p.as_os_str().len());

    debug!(
        root = %root.display(),
        include_dirs = include_dirs.len(),
        layouts = layouts.len(),
        templates = templates.len(),
        "scanned template tree"
    );

    let plans = templates
        .into_iter()
        .map(|leaf| CompositionPlan {
            identifier: identifier(root, &leaf),
            include_dirs: applicable(&include_dirs, &leaf),
            layout_files: applicable(&layouts, &leaf),
            leaf_file: leaf,
        })
        .collect();

    Ok(plans)
}

/// Entries whose containing directory is an ancestor of `leaf`, in given order.
///
/// Ancestry is tested per path component, so `prof/layout.html` does not apply to
/// `profile/view.html`.
fn applicable(candidates: &[PathBuf], leaf: &Path) -> Vec<PathBuf> {
    candidates
        .iter()
        .filter(|candidate| {
            candidate
                .parent()
                .is_some_and(|scope| leaf.starts_with(scope))
        })
        .cloned()
        .collect()
}

/// Derives the public identifier of a leaf template.
///
/// The scan root and the file extension are stripped and the remaining
/// components are joined with `/` on every platform:
/// `templates/profile/view.html` under `templates` becomes `profile/view`.
pub fn identifier(root: &Path, leaf: &Path) -> String {
    let relative = leaf.strip_prefix(root).unwrap_or(leaf);
    let relative = relative.with_extension("");

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

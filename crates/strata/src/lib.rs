//! # Strata - Hierarchical Template Composition
//!
//! `strata` turns a directory of templates into a set of ready-to-render
//! templates, each automatically combined with the layouts and partials that
//! apply to its place in the hierarchy.
//!
//! ## Directory Convention
//!
//! ```text
//! templates/
//! ├── layout.html           wraps every template below templates/
//! ├── includes/
//! │   ├── header.html       partial, {% include "header.html" %}
//! │   └── footer.html
//! └── profile/
//!     ├── layout.html       wraps profile/*, nested inside the root layout
//!     ├── view.html         → "profile/view"
//!     └── edit.html         → "profile/edit"
//! ```
//!
//! - **Layouts** (`layout.html` by default) apply to every template at or below
//!   their directory, outermost first. Deeper layouts and the template itself
//!   override `{% block %}`s of shallower ones.
//! - **Include directories** (`includes` by default) provide partials to every
//!   template below their parent directory. Deeper partials replace shallower
//!   ones with the same file name.
//! - Every other file is a **leaf template**, addressable by its path relative to
//!   the root without extension, always with `/` separators.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata::{Config, MemoryTree, Registry};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Profile { name: String }
//!
//! let tree = MemoryTree::from_entries(&[
//!     ("templates/layout.html", "<main>{% block content %}{% endblock %}</main>"),
//!     ("templates/profile/layout.html", "{% block content %}<h1>Profile</h1>{% block body %}{% endblock %}{% endblock %}"),
//!     ("templates/profile/view.html", "{% block body %}{{ name }}{% endblock %}"),
//! ]);
//!
//! let registry = Registry::build(&tree, "templates", &Config::default()).unwrap();
//! let html = registry.render("profile/view", &Profile { name: "Doe".into() }).unwrap();
//! assert_eq!(html, "<main><h1>Profile</h1>Doe</main>");
//! ```
//!
//! For templates on disk use [`DirTree`], or the [`Templates`] wrapper whose
//! [`parse_dir`](Templates::parse_dir) reads relative to the working directory.
//!
//! ## Key Types
//!
//! - [`Registry`]: compiled templates by identifier; build once, execute anywhere
//! - [`Config`]: layout file name, include directory name, functions
//! - [`SourceTree`]: where templates are read from ([`DirTree`], [`MemoryTree`])
//! - [`TemplateEngine`]: the compile step, [`MiniJinjaEngine`] by default
//! - [`discover`]: the classification and planning step on its own

pub mod config;
pub mod discover;
pub mod engine;
mod error;
pub mod registry;
pub mod templates;
pub mod tree;

pub use config::{CollisionPolicy, Config, DEFAULT_INCLUDE_DIR_NAME, DEFAULT_LAYOUT_FILENAME};
pub use discover::{classify, scan, CompositionPlan, EntryKind};
pub use engine::{
    CompiledTemplate, FunctionTable, MiniJinjaEngine, Source, TemplateEngine, UnitBuilder,
};
pub use error::{BuildError, EngineError, ExecuteError};
pub use registry::Registry;
pub use templates::Templates;
pub use tree::{DirTree, MemoryTree, SourceTree, TreeEntry, WalkError};

// Data passed to templates is converted into this type.
pub use minijinja::Value;

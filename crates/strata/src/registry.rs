//! Compiled template registry.
//!
//! [`Registry::build`] turns a template tree into a map from identifier to
//! compiled template in one pass:
//!
//! 1. **Discovery**: [`scan`](crate::discover::scan) yields a
//!    [`CompositionPlan`] per leaf template
//! 2. **Composition**: each plan is compiled by the engine into one unit:
//!    every include directory's files (shallow to deep), then the layout chain
//!    and the leaf
//! 3. **Storage**: the unit is stored under the plan's identifier
//!
//! A build either succeeds completely or returns the first error; no partially
//! built registry is ever exposed. Once built, a registry is immutable and can be
//! shared between threads; [`Registry::execute`] only reads.
//!
//! ```rust
//! use strata::{Config, MemoryTree, Registry};
//!
//! let tree = MemoryTree::from_entries(&[
//!     ("templates/layout.html", "{% include \"header.html\" %} {% block content %}{% endblock %}"),
//!     ("templates/includes/header.html", "header"),
//!     ("templates/profile/view.html", "{% block content %}{{ name }}{% endblock %}"),
//! ]);
//!
//! let registry = Registry::build(&tree, "templates", &Config::default()).unwrap();
//! let output = registry
//!     .render("profile/view", &serde_json::json!({ "name": "view" }))
//!     .unwrap();
//! assert_eq!(output, "header view");
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use minijinja::Value;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CollisionPolicy, Config};
use crate::discover::{scan, CompositionPlan};
use crate::engine::{CompiledTemplate, MiniJinjaEngine, Source, TemplateEngine};
use crate::error::{BuildError, ExecuteError};
use crate::tree::SourceTree;

/// A set of compiled templates addressable by identifier.
pub struct Registry {
    templates: HashMap<String, Box<dyn CompiledTemplate>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("templates", &self.names())
            .finish()
    }
}

impl Registry {
    /// Builds a registry from `dir` inside `tree` with the MiniJinja engine.
    ///
    /// # Errors
    ///
    /// - [`BuildError::Discovery`] if the tree cannot be walked or a file read
    /// - [`BuildError::Compile`] if the engine rejects a template
    /// - [`BuildError::Collision`] under [`CollisionPolicy::Reject`]
    pub fn build<T: SourceTree + ?Sized>(
        tree: &T,
        dir: impl AsRef<Path>,
        config: &Config,
    ) -> Result<Self, BuildError> {
        Self::build_with_engine(tree, dir, config, &MiniJinjaEngine::new())
    }

    /// Builds a registry with a custom engine.
    pub fn build_with_engine<T: SourceTree + ?Sized>(
        tree: &T,
        dir: impl AsRef<Path>,
        config: &Config,
        engine: &dyn TemplateEngine,
    ) -> Result<Self, BuildError> {
        let dir = dir.as_ref();
        let plans = scan(tree, dir, &config.include_dir_name, &config.layout_filename)?;

        let mut templates = HashMap::with_capacity(plans.len());
        let mut leaves: HashMap<String, PathBuf> = HashMap::with_capacity(plans.len());

        for plan in plans {
            match leaves.entry(plan.identifier.clone()) {
                Entry::Occupied(mut existing) => match config.collisions {
                    CollisionPolicy::Reject => {
                        return Err(BuildError::Collision {
                            identifier: plan.identifier,
                            first: existing.get().clone(),
                            second: plan.leaf_file,
                        });
                    }
                    CollisionPolicy::LastWins => {
                        warn!(
                            identifier = %plan.identifier,
                            replaced = %existing.get().display(),
                            by = %plan.leaf_file.display(),
                            "template identifier collision, last one wins"
                        );
                        existing.insert(plan.leaf_file.clone());
                    }
                },
                Entry::Vacant(slot) => {
                    slot.insert(plan.leaf_file.clone());
                }
            }

            let unit = compile(tree, &plan, config, engine)?;
            debug!(
                identifier = %plan.identifier,
                includes = plan.include_dirs.len(),
                layouts = plan.layout_files.len(),
                "compiled template"
            );
            templates.insert(plan.identifier, unit);
        }

        Ok(Self { templates })
    }

    /// Executes the template `name` with `data`, writing the output to `sink`.
    ///
    /// # Errors
    ///
    /// - [`ExecuteError::NotFound`] if no template was built under `name`; nothing
    ///   is written to `sink`
    /// - [`ExecuteError::Render`] if rendering fails; output produced before the
    ///   failure may already have been written
    pub fn execute<W, S>(&self, name: &str, sink: &mut W, data: &S) -> Result<(), ExecuteError>
    where
        W: Write + ?Sized,
        S: Serialize + ?Sized,
    {
        let template = self.templates.get(name).ok_or_else(|| ExecuteError::NotFound {
            name: name.to_string(),
        })?;

        let mut sink = sink;
        template
            .render_to(Value::from_serialize(data), &mut sink)
            .map_err(|source| ExecuteError::Render {
                name: name.to_string(),
                source,
            })
    }

    /// Executes the template `name` into a string.
    pub fn render<S: Serialize + ?Sized>(&self, name: &str, data: &S) -> Result<String, ExecuteError> {
        let mut out = Vec::new();
        self.execute(name, &mut out, data)?;
        String::from_utf8(out).map_err(|e| ExecuteError::Render {
            name: name.to_string(),
            source: e.into(),
        })
    }

    /// Returns true if a template was built under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Returns the number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the registry holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns all identifiers, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Compiles one plan: a fresh unit, each include directory's files, then the chain.
fn compile<T: SourceTree + ?Sized>(
    tree: &T,
    plan: &CompositionPlan,
    config: &Config,
    engine: &dyn TemplateEngine,
) -> Result<Box<dyn CompiledTemplate>, BuildError> {
    let mut unit = engine.unit(&plan.identifier, &config.functions);

    for include_dir in &plan.include_dirs {
        let files = tree
            .list_files(include_dir)
            .map_err(|e| BuildError::discovery(include_dir, e))?;
        let sources = read_sources(tree, &files)?;
        unit.add_partials(&sources)
            .map_err(|e| BuildError::compile(files, e))?;
    }

    let chain = plan.chain();
    let sources = read_sources(tree, &chain)?;
    unit.add_chain(&sources)
        .map_err(|e| BuildError::compile(chain.clone(), e))?;

    unit.finish().map_err(|e| BuildError::compile(chain, e))
}

fn read_sources<T: SourceTree + ?Sized>(
    tree: &T,
    paths: &[PathBuf],
) -> Result<Vec<Source>, BuildError> {
    paths
        .iter()
        .map(|path| {
            tree.read_to_string(path)
                .map(|text| Source::new(path, text))
                .map_err(|e| BuildError::discovery(path, e))
        })
        .collect()
}

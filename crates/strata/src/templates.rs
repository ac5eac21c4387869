//! Rebuildable template set.
//!
//! [`Templates`] pairs a [`Config`] with the most recently built [`Registry`].
//! It is the convenient entry point for applications that parse a directory at
//! startup and may parse it again later (e.g. after templates changed on disk):
//!
//! ```rust,ignore
//! let mut templates = Templates::new();
//! templates.parse_dir("templates")?;
//! templates.execute("profile/view", &mut std::io::stdout(), &params)?;
//! ```
//!
//! A failed parse leaves the previously built registry untouched.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::error::{BuildError, ExecuteError};
use crate::registry::Registry;
use crate::tree::{DirTree, SourceTree};

/// A configuration plus the registry last built with it.
#[derive(Debug, Default)]
pub struct Templates {
    config: Config,
    registry: Option<Registry>,
}

impl Templates {
    /// Creates an empty set with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            registry: None,
        }
    }

    /// The configuration used for parsing.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses `dir`, relative to the working directory, from the filesystem.
    pub fn parse_dir(&mut self, dir: impl AsRef<Path>) -> Result<(), BuildError> {
        self.parse_tree(&DirTree::cwd(), dir)
    }

    /// Parses `dir` inside `tree`.
    ///
    /// On success the new registry replaces the previous one.
    pub fn parse_tree<T: SourceTree + ?Sized>(
        &mut self,
        tree: &T,
        dir: impl AsRef<Path>,
    ) -> Result<(), BuildError> {
        let registry = Registry::build(tree, dir, &self.config)?;
        self.registry = Some(registry);
        Ok(())
    }

    /// The current registry, if a parse has succeeded.
    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    /// Executes `name` with `data` into `sink`.
    ///
    /// Before the first successful parse every name is [`ExecuteError::NotFound`].
    pub fn execute<W, S>(&self, name: &str, sink: &mut W, data: &S) -> Result<(), ExecuteError>
    where
        W: Write + ?Sized,
        S: Serialize + ?Sized,
    {
        match &self.registry {
            Some(registry) => registry.execute(name, sink, data),
            None => Err(ExecuteError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Executes `name` with `data` into a string.
    pub fn render<S: Serialize + ?Sized>(&self, name: &str, data: &S) -> Result<String, ExecuteError> {
        match &self.registry {
            Some(registry) => registry.render(name, data),
            None => Err(ExecuteError::NotFound {
                name: name.to_string(),
            }),
        }
    }
}

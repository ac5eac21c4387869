//! Build configuration.
//!
//! [`Config`] names the files and directories that carry meaning in a template
//! tree and holds the function table handed to the engine. It is passed to every
//! build explicitly; there is no process-wide default beyond [`Config::default`].
//!
//! | Setting | Default | Meaning |
//! |---------|---------|---------|
//! | `layout_filename` | `"layout.html"` | File name of layout templates |
//! | `include_dir_name` | `"includes"` | Directory name holding partials |
//! | `functions` | empty | Functions callable from every template |
//! | `collisions` | [`CollisionPolicy::LastWins`] | What to do when two leaves share an identifier |
//!
//! ```rust
//! use strata::{CollisionPolicy, Config};
//!
//! let config = Config::new()
//!     .layout_filename("base.html")
//!     .include_dir_name("partials")
//!     .collisions(CollisionPolicy::Reject);
//! assert_eq!(config.layout_filename, "base.html");
//! ```

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::Value;

use crate::engine::FunctionTable;

/// Default file name of layout templates.
pub const DEFAULT_LAYOUT_FILENAME: &str = "layout.html";

/// Default name of include directories.
pub const DEFAULT_INCLUDE_DIR_NAME: &str = "includes";

/// How a build treats two leaf templates deriving the same identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The leaf visited last replaces the earlier one, with a warning logged.
    #[default]
    LastWins,
    /// The build fails with [`BuildError::Collision`](crate::BuildError::Collision).
    Reject,
}

/// Configuration for building a registry.
#[derive(Debug, Clone)]
pub struct Config {
    /// File name that marks a layout template.
    pub layout_filename: String,
    /// Directory name that marks an include directory.
    pub include_dir_name: String,
    /// Functions available to every template.
    pub functions: FunctionTable,
    /// Identifier collision handling.
    pub collisions: CollisionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout_filename: DEFAULT_LAYOUT_FILENAME.to_string(),
            include_dir_name: DEFAULT_INCLUDE_DIR_NAME.to_string(),
            functions: FunctionTable::new(),
            collisions: CollisionPolicy::default(),
        }
    }
}

impl Config {
    /// Creates a configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the layout file name.
    pub fn layout_filename(mut self, name: impl Into<String>) -> Self {
        self.layout_filename = name.into();
        self
    }

    /// Sets the include directory name.
    pub fn include_dir_name(mut self, name: impl Into<String>) -> Self {
        self.include_dir_name = name.into();
        self
    }

    /// Replaces the function table.
    pub fn functions(mut self, functions: FunctionTable) -> Self {
        self.functions = functions;
        self
    }

    /// Adds one function to the table.
    pub fn function<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.functions.add_function::<F, Rv, Args>(name, f);
        self
    }

    /// Adds a global value to the table.
    pub fn global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.functions.insert(name, value.into());
        self
    }

    /// Sets the collision policy.
    pub fn collisions(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }
}

//! Error types for building and executing a template registry.
//!
//! Building and executing fail in different ways, so they get different types:
//!
//! - [`BuildError`] is returned by [`Registry::build`](crate::Registry::build).
//!   Any variant means no registry was produced.
//! - [`ExecuteError`] is returned by [`Registry::execute`](crate::Registry::execute).
//!   Both variants are recoverable; the registry is never modified.
//!
//! Every variant carries the path(s) or identifier that caused it, so callers can
//! report the failure without extra bookkeeping and branch on the kind, e.g. to
//! answer [`ExecuteError::NotFound`] with a 404 page.

use std::io;
use std::path::PathBuf;

/// Error reported by a [`TemplateEngine`](crate::TemplateEngine) implementation.
///
/// The engine is a black box to the registry, so its errors are carried opaquely.
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while discovering and compiling a template tree.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Walking the tree, listing an include directory or reading a file failed.
    #[error("error while reading \"{}\": {source}", path.display())]
    Discovery {
        /// The path whose traversal or read failed.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The engine rejected the sources of one compile step.
    #[error("error while parsing {}: {source}", display_paths(paths))]
    Compile {
        /// Every path passed to the failing compile step, in compile order.
        paths: Vec<PathBuf>,
        #[source]
        source: EngineError,
    },

    /// Two leaf templates derive the same identifier.
    ///
    /// Only raised under [`CollisionPolicy::Reject`](crate::CollisionPolicy::Reject).
    #[error(
        "templates \"{}\" and \"{}\" both resolve to identifier \"{identifier}\"",
        first.display(),
        second.display()
    )]
    Collision {
        /// The shared identifier.
        identifier: String,
        /// The leaf that claimed the identifier first.
        first: PathBuf,
        /// The leaf that collided with it.
        second: PathBuf,
    },
}

impl BuildError {
    /// Create a discovery error for `path`.
    pub fn discovery(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Discovery {
            path: path.into(),
            source,
        }
    }

    /// Create a compile error for the sources of one compile step.
    pub fn compile(paths: Vec<PathBuf>, source: EngineError) -> Self {
        Self::Compile { paths, source }
    }
}

/// Errors that can occur while executing a template from a built registry.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// No template was built under the requested identifier.
    #[error("template not found: {name}")]
    NotFound {
        /// The identifier that was requested.
        name: String,
    },

    /// The engine failed while rendering the template with the given data.
    #[error("error executing template \"{name}\": {source}")]
    Render {
        /// The identifier of the template being rendered.
        name: String,
        #[source]
        source: EngineError,
    },
}

impl ExecuteError {
    /// Returns true if the template did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    let joined: Vec<String> = paths
        .iter()
        .map(|p| format!("\"{}\"", p.display()))
        .collect();
    format!("[{}]", joined.join(", "))
}

//! Template engine abstraction.
//!
//! The registry never looks inside a template. It hands ordered sources to a
//! [`TemplateEngine`] and keeps whatever executable unit comes back. Compilation
//! happens in steps, mirroring the composition plan:
//!
//! 1. [`TemplateEngine::unit`] starts a fresh unit seeded with the function table
//! 2. [`UnitBuilder::add_partials`] is called once per include directory, shallow
//!    to deep
//! 3. [`UnitBuilder::add_chain`] is called once with the layouts and the leaf
//! 4. [`UnitBuilder::finish`] yields the [`CompiledTemplate`]
//!
//! The default implementation is [`MiniJinjaEngine`].
//!
//! # MiniJinja Composition
//!
//! Partials are registered under their file name, so a template pulls one in with
//! `{% include "header.html" %}`. A deeper include directory registering the same
//! file name replaces the shallower partial.
//!
//! The chain is linked with Jinja inheritance: each source after the first is
//! compiled as if it began with `{% extends "<previous source>" %}`. Rendering the
//! leaf therefore starts at the outermost layout, and every `{% block %}` resolves
//! to its deepest definition:
//!
//! ```text
//! layout.html          header {% block content %}{% endblock %} footer
//! profile/layout.html  {% block content %}profile {% block body %}{% endblock %}{% endblock %}
//! profile/view.html    {% block body %}view{% endblock %}
//!
//! render profile/view  →  header profile view footer
//! ```
//!
//! Chain sources must not declare `{% extends %}` themselves, and content outside
//! of blocks in any source but the first is not rendered.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use minijinja::functions::Function;
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::{Environment, Value};

use crate::error::EngineError;

/// One template source handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// The source's path with `/` separators.
    pub name: String,
    /// The template text.
    pub text: String,
}

impl Source {
    /// Creates a source from a path and its text.
    pub fn new(path: &Path, text: impl Into<String>) -> Self {
        Self {
            name: path
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/"),
            text: text.into(),
        }
    }

    /// The last component of the name (`header.html` for `t/includes/header.html`).
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Named functions made available to every compiled template.
///
/// Functions are stored as engine values; [`add_function`](Self::add_function)
/// accepts anything MiniJinja can call.
///
/// ```rust
/// use strata::FunctionTable;
///
/// let functions = FunctionTable::new()
///     .with_function("uppercase", |s: String| s.to_uppercase());
/// assert!(functions.contains("uppercase"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: BTreeMap<String, Value>,
}

impl FunctionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function under `name`, replacing any previous entry.
    pub fn add_function<F, Rv, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.functions.insert(name.into(), Value::from_function::<F, Rv, Args>(f));
    }

    /// Builder-style [`add_function`](Self::add_function).
    pub fn with_function<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Function<Rv, Args>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.add_function::<F, Rv, Args>(name, f);
        self
    }

    /// Registers an arbitrary value, e.g. one built with [`Value::from_object`].
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.functions.insert(name.into(), value);
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A template engine that compiles ordered sources into executable units.
pub trait TemplateEngine: Send + Sync {
    /// Starts a new unit named `name` with `functions` available to its templates.
    fn unit(&self, name: &str, functions: &FunctionTable) -> Box<dyn UnitBuilder>;
}

/// A unit under construction.
pub trait UnitBuilder {
    /// Compiles a set of partials, overriding same-named partials added earlier.
    fn add_partials(&mut self, sources: &[Source]) -> Result<(), EngineError>;

    /// Compiles the layout chain followed by the leaf.
    ///
    /// Blocks defined later in `sources` override blocks defined earlier. The
    /// last source is the entry point of the finished unit.
    fn add_chain(&mut self, sources: &[Source]) -> Result<(), EngineError>;

    /// Finishes the unit.
    fn finish(self: Box<Self>) -> Result<Box<dyn CompiledTemplate>, EngineError>;
}

/// An executable template unit.
///
/// Units are shared between threads; each render gets its own sink.
pub trait CompiledTemplate: Send + Sync {
    /// Renders `data` into `sink`.
    fn render_to(&self, data: Value, sink: &mut dyn Write) -> Result<(), EngineError>;
}

/// MiniJinja-based template engine.
///
/// Each unit owns its own [`Environment`], so partials and blocks of one leaf
/// never leak into another. MiniJinja's default auto-escaping applies: sources
/// named `*.html`, `*.htm` or `*.xml` escape interpolated values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniJinjaEngine;

impl MiniJinjaEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn unit(&self, name: &str, functions: &FunctionTable) -> Box<dyn UnitBuilder> {
        let mut env = Environment::new();
        for (fn_name, value) in functions.iter() {
            env.add_global(fn_name.to_string(), value.clone());
        }
        Box::new(MiniJinjaUnitBuilder {
            name: name.to_string(),
            env,
            entry: None,
        })
    }
}

struct MiniJinjaUnitBuilder {
    name: String,
    env: Environment<'static>,
    entry: Option<String>,
}

impl UnitBuilder for MiniJinjaUnitBuilder {
    fn add_partials(&mut self, sources: &[Source]) -> Result<(), EngineError> {
        for source in sources {
            self.env
                .add_template_owned(source.file_name().to_string(), source.text.clone())?;
        }
        Ok(())
    }

    fn add_chain(&mut self, sources: &[Source]) -> Result<(), EngineError> {
        let mut parent: Option<&str> = None;
        for source in sources {
            let text = match parent {
                Some(parent) => format!("{{% extends {} %}}{}", quote(parent), source.text),
                None => source.text.clone(),
            };
            self.env.add_template_owned(source.name.clone(), text)?;
            parent = Some(&source.name);
        }
        if let Some(last) = sources.last() {
            self.entry = Some(last.name.clone());
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Box<dyn CompiledTemplate>, EngineError> {
        let MiniJinjaUnitBuilder { name, env, entry } = *self;
        let entry = entry.ok_or_else(|| format!("unit \"{name}\" has no template to execute"))?;
        Ok(Box::new(MiniJinjaUnit { env, entry }))
    }
}

struct MiniJinjaUnit {
    env: Environment<'static>,
    entry: String,
}

impl CompiledTemplate for MiniJinjaUnit {
    fn render_to(&self, data: Value, sink: &mut dyn Write) -> Result<(), EngineError> {
        let template = self.env.get_template(&self.entry)?;
        template.render_captured_to(data, sink)?;
        Ok(())
    }
}

/// Quotes a template name as a Jinja string literal.
fn quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

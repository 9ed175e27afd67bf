//! [`Engine`] and [`Template`] — the public rendering facade.
//!
//! The engine owns every parsed template, keyed by normalised name. Inline
//! templates registered through [`Engine::new_template`] and files loaded
//! through [`Engine::load_by_name`] share the same cache, so `extends`,
//! `include` and `create` see both. A file is parsed at most once per engine.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use stencil_core::Context;

use crate::config::EngineConfig;
use crate::error::{io_err, RenderError};
use crate::node::ParsedTemplate;
use crate::parser;
use crate::render::Renderer;
use crate::writer::WriteResult;

// ---------------------------------------------------------------------------
// Template name helpers
// ---------------------------------------------------------------------------

fn normalize_template_name(name: &str) -> String {
    let name = name.trim().replace('\\', "/");
    let mut rest = name.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Creates contexts and templates, and caches every parsed template.
///
/// Not thread-safe: one engine belongs to one rendering thread.
pub struct Engine {
    config: EngineConfig,
    templates: RefCell<HashMap<String, Rc<ParsedTemplate>>>,
}

impl Engine {
    /// An engine with [`EngineConfig::default`].
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            config,
            templates: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A fresh context with one empty base scope, the configured output
    /// directory and the configured escaper.
    pub fn create_context(&self) -> Context {
        let mut ctx = Context::new();
        if let Some(dir) = &self.config.output_dir {
            ctx.set_output_directory(dir.clone());
        }
        ctx.set_escape_intf(self.config.escape.escaper());
        ctx
    }

    /// Parse `data` and register it as `name`, replacing any template
    /// already cached under that name. The filesystem is not touched.
    pub fn new_template(&self, name: &str, data: &str) -> Result<Template<'_>, RenderError> {
        let key = normalize_template_name(name);
        let parsed = Rc::new(parser::parse(&key, data)?);
        tracing::debug!(template = %key, child = parsed.is_child(), "registered inline template");
        self.templates.borrow_mut().insert(key, parsed.clone());
        Ok(Template {
            engine: self,
            parsed,
        })
    }

    /// The template called `name`: from the cache when already known,
    /// otherwise read from disk (relative to `template_dir`) and cached.
    pub fn load_by_name(&self, name: &str) -> Result<Template<'_>, RenderError> {
        Ok(Template {
            engine: self,
            parsed: self.load_parsed(name)?,
        })
    }

    /// Whether `name` is already parsed and cached.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.templates
            .borrow()
            .contains_key(&normalize_template_name(name))
    }

    /// Filesystem location `name` would be loaded from.
    pub fn template_path(&self, name: &str) -> PathBuf {
        let name = normalize_template_name(name);
        match &self.config.template_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    pub(crate) fn load_parsed(&self, name: &str) -> Result<Rc<ParsedTemplate>, RenderError> {
        let key = normalize_template_name(name);
        if let Some(parsed) = self.templates.borrow().get(&key) {
            tracing::debug!(template = %key, "template cache hit");
            return Ok(parsed.clone());
        }

        let path = self.template_path(&key);
        if !path.is_file() {
            return Err(RenderError::TemplateNotFound { name: key, path });
        }
        let source = read_source(&path)?;
        let parsed = Rc::new(parser::parse(&key, &source)?);
        tracing::debug!(template = %key, path = %path.display(), "loaded template");
        self.templates.borrow_mut().insert(key, parsed.clone());
        Ok(parsed)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn read_source(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|e| io_err(path, e))
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A parsed template bound to the engine that produced it.
///
/// The borrow of the engine keeps it alive for as long as templates it
/// resolves through `extends`/`include`/`create` may be needed.
pub struct Template<'e> {
    engine: &'e Engine,
    parsed: Rc<ParsedTemplate>,
}

impl Template<'_> {
    pub fn name(&self) -> &str {
        &self.parsed.name
    }

    /// Render into `out`.
    ///
    /// Output is written incrementally: on error, whatever was produced
    /// before the failing node stays in `out`. Returns the outcome of every
    /// `create` tag reached, nested ones included.
    pub fn render(
        &self,
        out: &mut dyn fmt::Write,
        ctx: &mut Context,
    ) -> Result<Vec<WriteResult>, RenderError> {
        let mut renderer = Renderer::new(self.engine);
        renderer.render_template(&self.parsed, out, ctx)?;
        Ok(renderer.into_writes())
    }

    /// Render into a new string, discarding the `create` report.
    pub fn render_to_string(&self, ctx: &mut Context) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render(&mut out, ctx)?;
        Ok(out)
    }
}

impl fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.parsed.name)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

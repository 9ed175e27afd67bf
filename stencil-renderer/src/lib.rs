//! # stencil-renderer
//!
//! Parser and tree-walking renderer for the stencil template language:
//! `{{ path|filter:arg }}` variables, `{% tag %}` control tags and
//! `{# comment #}` comments.
//!
//! Supported tags: `for … empty … endfor`, `if … else … endif`,
//! `block … endblock`, `extends`, `include`, and `create 'file' from 'template'`,
//! which renders a template into a new file under the context's output
//! directory. Supported filters: `default`, `length`, `add`.
//!
//! ## Usage
//!
//! ```rust
//! use stencil_renderer::Engine;
//!
//! let engine = Engine::new();
//! engine
//!     .new_template("base", "<h1>{% block title %}Untitled{% endblock %}</h1>")
//!     .unwrap();
//! let page = engine
//!     .new_template("page", "{% extends 'base' %}{% block title %}{{ name }}{% endblock %}")
//!     .unwrap();
//!
//! let mut ctx = engine.create_context();
//! ctx.set("name", "Overview");
//! assert_eq!(page.render_to_string(&mut ctx).unwrap(), "<h1>Overview</h1>");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod writer;

mod filters;
mod lexer;
mod node;
mod parser;
mod render;

pub use config::EngineConfig;
pub use engine::{Engine, Template};
pub use error::RenderError;
pub use writer::WriteResult;

pub use stencil_core::{
    Context, EscapeMode, Escaper, HtmlEscaper, ListIntf, ListIterator, StructIntf, TemplateList,
    TemplateStruct, Value, ValueKind,
};

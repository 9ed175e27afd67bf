//! Error types for stencil-renderer.

use std::path::PathBuf;

use thiserror::Error;

use stencil_core::ContextError;

/// Structural errors that abort loading or rendering a template.
///
/// Data-access problems (missing fields, wrong kinds, out-of-range indices)
/// never surface here; they degrade to empty values during rendering.
/// Failed `create` writes are reported as
/// [`WriteResult::Failed`](crate::WriteResult::Failed) instead.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Malformed template source.
    #[error("parse error in template '{template}' at line {line}: {message}")]
    Parse {
        template: String,
        line: usize,
        message: String,
    },

    /// A template named by `extends`/`include`/`create` or `load_by_name`
    /// is neither registered nor present on disk.
    #[error("template '{name}' not found at {}", .path.display())]
    TemplateNotFound { name: String, path: PathBuf },

    /// A template reached itself through `extends`/`include`/`create`.
    #[error("template recursion detected: {chain}")]
    Cycle { chain: String },

    /// Nested renders went deeper than the configured limit.
    #[error("template nesting exceeds {limit} levels at '{template}'")]
    DepthExceeded { limit: usize, template: String },

    /// Filesystem error while reading a template.
    #[error("template io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Engine configuration file could not be read or parsed.
    #[error("failed to parse engine config at {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The output sink refused a write.
    #[error("failed to write rendered output")]
    Output(#[from] std::fmt::Error),

    /// Unbalanced scope handling.
    #[error("scope error: {0}")]
    Context(#[from] ContextError),
}

/// Convenience constructor for [`RenderError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

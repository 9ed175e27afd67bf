//! Error types for stencil-core.

use thiserror::Error;

/// Errors raised by [`Context`](crate::Context) scope manipulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// `pop()` was called while only the base scope remained.
    #[error("cannot pop the base scope of a template context")]
    BaseScope,
}

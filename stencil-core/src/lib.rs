//! Stencil core library — value model, data capabilities, scope stack.
//!
//! Public API surface:
//! - [`value`] — [`Value`], the closed variant every template expression yields
//! - [`list`] — [`ListIntf`] capability, cursor, default [`TemplateList`]
//! - [`object`] — [`StructIntf`] capability, default [`TemplateStruct`]
//! - [`escape`] — [`Escaper`] capability and the shipped [`HtmlEscaper`]
//! - [`context`] — [`Context`], the stack of name → value dictionaries
//! - [`data`] — conversion of `serde_json` documents into values
//! - [`error`] — [`ContextError`]

pub mod context;
pub mod data;
pub mod error;
pub mod escape;
pub mod list;
pub mod object;
pub mod value;

pub use context::Context;
pub use error::ContextError;
pub use escape::{EscapeMode, Escaper, HtmlEscaper};
pub use list::{IndexIterator, ListIntf, ListIterator, TemplateList};
pub use object::{StructIntf, TemplateStruct};
pub use value::{Function, Value, ValueKind};

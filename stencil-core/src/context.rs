//! Scoped evaluation context.
//!
//! A [`Context`] is a stack of dictionaries. Lookups search from the most
//! recently pushed scope down to the base scope; writes always land in the
//! top scope. The base scope can never be popped.
//!
//! The output directory (used by `create`) and the escaper are per-context
//! settings and are not affected by push/pop.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::ContextError;
use crate::escape::Escaper;
use crate::value::Value;

pub struct Context {
    scopes: Vec<HashMap<String, Value>>,
    output_dir: Option<PathBuf>,
    escaper: Option<Rc<dyn Escaper>>,
}

impl Context {
    /// A context holding only the (empty) base scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            output_dir: None,
            escaper: None,
        }
    }

    /// Push a new, empty scope.
    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the top scope. Fails when only the base scope is left.
    pub fn pop(&mut self) -> Result<(), ContextError> {
        if self.scopes.len() <= 1 {
            return Err(ContextError::BaseScope);
        }
        self.scopes.pop();
        Ok(())
    }

    /// Number of scopes, base scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Set `name` in the top scope, replacing an existing entry there.
    pub fn set(&mut self, name: impl Into<String>, v: impl Into<Value>) {
        if let Some(top) = self.scopes.last_mut() {
            top.insert(name.into(), v.into());
        }
    }

    /// Snapshot of the innermost binding of `name`, or the absent value.
    pub fn get(&self, name: &str) -> Value {
        self.get_ref(name).cloned().unwrap_or_default()
    }

    /// Borrow the innermost binding of `name`, or `None` when unbound.
    pub fn get_ref(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Directory that files produced by `create` are written under.
    pub fn set_output_directory(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = Some(dir.into());
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Install (or with `None`, remove) the escaper applied to non-raw output.
    pub fn set_escape_intf(&mut self, escaper: Option<Rc<dyn Escaper>>) {
        self.escaper = escaper;
    }

    pub fn escaper(&self) -> Option<&dyn Escaper> {
        self.escaper.as_deref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scopes", &self.scopes)
            .field("output_dir", &self.output_dir)
            .field("escaper", &self.escaper.is_some())
            .finish()
    }
}

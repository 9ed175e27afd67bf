//! Struct capability and its default implementation.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::value::Value;

/// Named-field lookup. Unknown fields resolve to the absent value.
pub trait StructIntf {
    fn get(&self, name: &str) -> Value;
}

/// Default struct: a dictionary of field values.
///
/// Like [`TemplateList`](crate::TemplateList), fields can be set through a
/// shared reference after the struct has been wrapped in a [`Value`].
#[derive(Debug, Default)]
pub struct TemplateStruct {
    fields: RefCell<HashMap<String, Value>>,
}

impl TemplateStruct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set field `name`, replacing any previous value.
    pub fn set(&self, name: impl Into<String>, v: impl Into<Value>) {
        self.fields.borrow_mut().insert(name.into(), v.into());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(self, name: impl Into<String>, v: impl Into<Value>) -> Self {
        self.set(name, v);
        self
    }
}

impl StructIntf for TemplateStruct {
    fn get(&self, name: &str) -> Value {
        self.fields.borrow().get(name).cloned().unwrap_or_default()
    }
}

impl StructIntf for HashMap<String, Value> {
    fn get(&self, name: &str) -> Value {
        HashMap::get(self, name).cloned().unwrap_or_default()
    }
}

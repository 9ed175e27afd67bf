//! Conversion of `serde_json` documents into template values.
//!
//! Lets hosts (and the CLI) feed JSON or YAML data into a [`Context`](crate::Context)
//! without writing [`ListIntf`](crate::ListIntf)/[`StructIntf`](crate::StructIntf)
//! adapters by hand.

use std::rc::Rc;

use serde_json::Value as Json;

use crate::list::TemplateList;
use crate::object::TemplateStruct;
use crate::value::Value;

impl Value {
    /// Convert a JSON document.
    ///
    /// Arrays become [`TemplateList`]s and objects become [`TemplateStruct`]s.
    /// Floats are kept as their decimal text, since the value model has no
    /// float kind.
    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Null => Value::none(),
            Json::Bool(b) => Value::from(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::from(n.to_string()),
            },
            Json::String(s) => Value::from(s.as_str()),
            Json::Array(items) => {
                let list: TemplateList = items.iter().map(Value::from_json).collect();
                Value::from_list(Rc::new(list))
            }
            Json::Object(map) => {
                let s = TemplateStruct::new();
                for (k, v) in map {
                    s.set(k.as_str(), Value::from_json(v));
                }
                Value::from_struct(Rc::new(s))
            }
        }
    }
}

//! The template value model.
//!
//! A [`Value`] holds exactly one payload out of a closed set of kinds. Struct
//! and list payloads are shared handles (`Rc`) onto host-owned data: cloning a
//! value never copies the referenced object, so mutation through a
//! [`TemplateList`](crate::TemplateList) or [`TemplateStruct`](crate::TemplateStruct)
//! is visible through every value that reaches it.
//!
//! Accessors never fail. Asking a value for a representation its kind does not
//! carry yields the kind-appropriate zero (`false`, `0`, `""`, `None`).

use std::fmt;
use std::rc::Rc;

use crate::list::ListIntf;
use crate::object::StructIntf;

/// Signature of a callable value: ordered arguments in, text out.
///
/// Host state the callable needs is captured by the closure.
pub type Function = Rc<dyn Fn(&[Value]) -> String>;

// ---------------------------------------------------------------------------
// ValueKind
// ---------------------------------------------------------------------------

/// The kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Bool,
    Integer,
    String,
    Struct,
    List,
    Function,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::None => write!(f, "none"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Struct => write!(f, "struct"),
            ValueKind::List => write!(f, "list"),
            ValueKind::Function => write!(f, "function"),
        }
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
enum Payload {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Text(String),
    Struct(Rc<dyn StructIntf>),
    List(Rc<dyn ListIntf>),
    Function(Function),
}

/// A single template value plus its `raw` output flag.
///
/// When `raw` is set the renderer writes the value's text as-is, bypassing
/// the context's escaper.
#[derive(Clone, Default)]
pub struct Value {
    payload: Payload,
    raw: bool,
}

impl Value {
    /// The absent value (kind [`ValueKind::None`]).
    pub fn none() -> Self {
        Self::default()
    }

    /// Wrap a shared struct object. Only the handle is stored.
    pub fn from_struct(s: Rc<dyn StructIntf>) -> Self {
        Self {
            payload: Payload::Struct(s),
            raw: false,
        }
    }

    /// Wrap a shared list object. Only the handle is stored.
    pub fn from_list(l: Rc<dyn ListIntf>) -> Self {
        Self {
            payload: Payload::List(l),
            raw: false,
        }
    }

    /// Build a callable value.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> String + 'static,
    {
        Self {
            payload: Payload::Function(Rc::new(f)),
            raw: false,
        }
    }

    /// Returns the kind tag of the stored payload.
    pub fn kind(&self) -> ValueKind {
        match self.payload {
            Payload::None => ValueKind::None,
            Payload::Bool(_) => ValueKind::Bool,
            Payload::Int(_) => ValueKind::Integer,
            Payload::Text(_) => ValueKind::String,
            Payload::Struct(_) => ValueKind::Struct,
            Payload::List(_) => ValueKind::List,
            Payload::Function(_) => ValueKind::Function,
        }
    }

    /// `false` only for the absent value.
    pub fn is_valid(&self) -> bool {
        !matches!(self.payload, Payload::None)
    }

    /// Template truthiness.
    ///
    /// Absent, `false`, `0`, empty text and empty lists are false; every
    /// other value (including any struct or callable) is true.
    pub fn to_bool(&self) -> bool {
        match &self.payload {
            Payload::None => false,
            Payload::Bool(b) => *b,
            Payload::Int(v) => *v != 0,
            Payload::Text(s) => !s.is_empty(),
            Payload::Struct(_) => true,
            Payload::List(l) => l.count() > 0,
            Payload::Function(_) => true,
        }
    }

    /// Integer form: booleans map to 0/1, text is parsed (0 when it is not an
    /// integer), every other kind yields 0.
    pub fn to_int(&self) -> i64 {
        match &self.payload {
            Payload::Bool(b) => i64::from(*b),
            Payload::Int(v) => *v,
            Payload::Text(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Strict integer form: `Some` only for integers and text that parses as
    /// one.
    pub fn as_int(&self) -> Option<i64> {
        match &self.payload {
            Payload::Int(v) => Some(*v),
            Payload::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Borrow the text payload without conversion.
    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The list handle, or `None` when this is not a list.
    pub fn to_list(&self) -> Option<&Rc<dyn ListIntf>> {
        match &self.payload {
            Payload::List(l) => Some(l),
            _ => None,
        }
    }

    /// The struct handle, or `None` when this is not a struct.
    pub fn to_struct(&self) -> Option<&Rc<dyn StructIntf>> {
        match &self.payload {
            Payload::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Invoke a callable with `args`. Any other kind returns empty text.
    pub fn call(&self, args: &[Value]) -> String {
        match &self.payload {
            Payload::Function(f) => f(args),
            _ => String::new(),
        }
    }

    /// Mark whether the value is written without escaping.
    pub fn set_raw(&mut self, raw: bool) {
        self.raw = raw;
    }

    /// Builder form of [`set_raw`](Self::set_raw).
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn raw(&self) -> bool {
        self.raw
    }
}

/// Textual form used for output: `true`/`false`, decimal integers, the text
/// itself; struct, list, callable and absent values render empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Bool(b) => write!(f, "{b}"),
            Payload::Int(v) => write!(f, "{v}"),
            Payload::Text(s) => f.write_str(s),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::None => write!(f, "None")?,
            Payload::Bool(b) => write!(f, "Bool({b})")?,
            Payload::Int(v) => write!(f, "Integer({v})")?,
            Payload::Text(s) => write!(f, "String({s:?})")?,
            Payload::Struct(_) => write!(f, "Struct(..)")?,
            Payload::List(l) => write!(f, "List(count={})", l.count())?,
            Payload::Function(_) => write!(f, "Function(..)")?,
        }
        if self.raw {
            write!(f, " [raw]")?;
        }
        Ok(())
    }
}

/// Scalars compare by payload; struct and list values compare by identity of
/// the referenced object; callables and absent values never compare equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.payload, &other.payload) {
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Text(a), Payload::Text(b)) => a == b,
            (Payload::Struct(a), Payload::Struct(b)) => Rc::ptr_eq(a, b),
            (Payload::List(a), Payload::List(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self {
            payload: Payload::Bool(b),
            raw: false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self {
            payload: Payload::Int(v),
            raw: false,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::from(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::from(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self {
            payload: Payload::Text(s),
            raw: false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TemplateList, TemplateStruct};
    use rstest::rstest;
    use std::cell::Cell;

    #[rstest]
    #[case(Value::from(true), ValueKind::Bool)]
    #[case(Value::from(42), ValueKind::Integer)]
    #[case(Value::from("hi"), ValueKind::String)]
    #[case(Value::none(), ValueKind::None)]
    fn scalar_kinds(#[case] v: Value, #[case] kind: ValueKind) {
        assert_eq!(v.kind(), kind);
        assert!(v.to_list().is_none());
        assert!(v.to_struct().is_none());
        assert_eq!(v.call(&[]), "");
    }

    #[test]
    fn accessors_reflect_constructed_scalar() {
        let b = Value::from(true);
        assert!(b.to_bool());
        assert_eq!(b.to_string(), "true");

        let i = Value::from(7);
        assert_eq!(i.to_int(), 7);
        assert_eq!(i.to_string(), "7");

        let s = Value::from("text");
        assert_eq!(s.as_str(), Some("text"));
        assert_eq!(s.to_int(), 0, "non-numeric text has integer form 0");
    }

    #[rstest]
    #[case(Value::none(), false)]
    #[case(Value::from(0), false)]
    #[case(Value::from(""), false)]
    #[case(Value::from(false), false)]
    #[case(Value::from(-1), true)]
    #[case(Value::from("hi"), true)]
    fn truthiness(#[case] v: Value, #[case] expected: bool) {
        assert_eq!(v.to_bool(), expected);
    }

    #[test]
    fn empty_list_is_falsy_and_struct_is_truthy() {
        let list = Value::from_list(Rc::new(TemplateList::new()));
        assert!(!list.to_bool());
        let s = Value::from_struct(Rc::new(TemplateStruct::new()));
        assert!(s.to_bool());
        assert_eq!(s.to_string(), "");
    }

    #[test]
    fn absent_is_not_valid() {
        assert!(!Value::none().is_valid());
        assert!(Value::from(0).is_valid());
    }

    #[test]
    fn call_passes_args_and_captured_state() {
        let prefix = String::from("hello ");
        let f = Value::function(move |args| {
            let names: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            format!("{prefix}{}", names.join(","))
        });
        assert_eq!(f.kind(), ValueKind::Function);
        assert_eq!(f.call(&[Value::from("a"), Value::from(2)]), "hello a,2");
    }

    #[test]
    fn clone_shares_referenced_list() {
        let list = Rc::new(TemplateList::new());
        let v = Value::from_list(list.clone());
        let copy = v.clone();
        list.append(Value::from(1));
        assert_eq!(copy.to_list().map(|l| l.count()), Some(1));
        assert_eq!(v, copy, "list values compare by identity");
    }

    #[test]
    fn callable_is_not_invoked_by_clone() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let f = Value::function(move |_| {
            counter.set(counter.get() + 1);
            String::new()
        });
        let _copy = f.clone();
        assert_eq!(calls.get(), 0);
        f.call(&[]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn raw_flag_round_trips() {
        let mut v = Value::from("<b>");
        assert!(!v.raw());
        v.set_raw(true);
        assert!(v.raw());
        assert!(!Value::from("x").with_raw(false).raw());
    }

    #[test]
    fn scalar_equality() {
        assert_eq!(Value::from(3), Value::from(3));
        assert_ne!(Value::from(3), Value::from("3"));
        assert_ne!(Value::none(), Value::none());
    }
}

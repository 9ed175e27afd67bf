//! Built-in filters: `default`, `length`, `add`.

use stencil_core::Value;

use crate::node::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Filter {
    /// `default:ARG` — ARG when the value is absent or empty text.
    Default,
    /// `length` — element count of a list, character count of text, else 0.
    Length,
    /// `add:ARG` — integer sum when both sides are integers, else concatenation.
    Add,
}

impl Filter {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Filter::Default),
            "length" => Some(Filter::Length),
            "add" => Some(Filter::Add),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Filter::Default => "default",
            Filter::Length => "length",
            Filter::Add => "add",
        }
    }

    /// `true` when the filter must be written as `name:ARG`; `false` when it
    /// takes no argument at all.
    pub(crate) fn takes_arg(self) -> bool {
        !matches!(self, Filter::Length)
    }

    /// Apply to `v`. The parser guarantees `arg` is present exactly when
    /// [`takes_arg`](Self::takes_arg) says so; a missing one acts as empty text.
    pub(crate) fn apply(self, v: Value, arg: Option<&Literal>) -> Value {
        let arg = arg.map(Literal::to_value).unwrap_or_else(|| Value::from(""));
        match self {
            Filter::Default => {
                let empty = !v.is_valid() || v.as_str().is_some_and(str::is_empty);
                if empty {
                    arg
                } else {
                    v
                }
            }
            Filter::Length => match (v.to_list(), v.as_str()) {
                (Some(list), _) => Value::from(list.count()),
                (None, Some(s)) => Value::from(s.chars().count()),
                _ => Value::from(0),
            },
            Filter::Add => match (v.as_int(), arg.as_int()) {
                (Some(a), Some(b)) => Value::from(a.saturating_add(b)),
                _ => Value::from(format!("{v}{arg}")).with_raw(v.raw()),
            },
        }
    }
}

//! Parsed template tree.

use std::collections::HashMap;
use std::rc::Rc;

use stencil_core::Value;

use crate::filters::Filter;

/// A string or integer literal written in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Literal {
    Text(String),
    Int(i64),
}

impl Literal {
    /// Template-authored literals are never escaped.
    pub(crate) fn to_value(&self) -> Value {
        match self {
            Literal::Text(s) => Value::from(s.as_str()),
            Literal::Int(i) => Value::from(*i),
        }
        .with_raw(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operand {
    Literal(Literal),
    /// Dot-separated lookup; the first segment is a context name.
    Path(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FilterCall {
    pub filter: Filter,
    pub arg: Option<Literal>,
}

/// An operand followed by a left-to-right filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expr {
    pub operand: Operand,
    pub filters: Vec<FilterCall>,
}

#[derive(Debug)]
pub(crate) struct ForNode {
    pub var: String,
    pub list: Expr,
    pub reversed: bool,
    pub body: Vec<Node>,
    pub empty: Vec<Node>,
}

#[derive(Debug)]
pub(crate) struct IfNode {
    pub cond: Expr,
    pub negate: bool,
    pub then_branch: Vec<Node>,
    pub else_branch: Vec<Node>,
}

#[derive(Debug)]
pub(crate) struct BlockNode {
    pub name: String,
    pub body: Rc<[Node]>,
}

#[derive(Debug)]
pub(crate) struct CreateNode {
    pub file: Expr,
    pub template: Expr,
    pub line: usize,
}

#[derive(Debug)]
pub(crate) enum Node {
    Text(String),
    Var(Expr),
    For(ForNode),
    If(IfNode),
    Block(BlockNode),
    Extends { parent: Expr, line: usize },
    Include { template: Expr, line: usize },
    Create(CreateNode),
}

/// Every block a template defines, at any nesting depth, keyed by name.
pub(crate) type BlockMap = HashMap<String, Rc<[Node]>>;

/// Result of parsing one template source.
#[derive(Debug)]
pub(crate) struct ParsedTemplate {
    pub name: String,
    pub nodes: Vec<Node>,
    pub blocks: BlockMap,
}

impl ParsedTemplate {
    /// Whether the template starts with `extends`.
    pub(crate) fn is_child(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::Extends { .. }))
    }
}

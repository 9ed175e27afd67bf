//! Tree-walking renderer.
//!
//! One [`Renderer`] lives for a single top-level `Template::render` call and
//! carries the state nested renders share:
//!
//! - `stack` — names of templates currently being rendered; meeting a name
//!   already on it is a cycle.
//! - `overrides` — templates whose blocks override the one being rendered,
//!   most-derived first. `extends` appends to it; `include` and `create`
//!   render with a fresh chain.
//! - `writes` — outcome of every `create` reached.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use stencil_core::{Context, TemplateStruct, Value};

use crate::engine::Engine;
use crate::error::RenderError;
use crate::node::{CreateNode, Expr, ForNode, Node, Operand, ParsedTemplate};
use crate::writer::{self, WriteResult};

pub(crate) struct Renderer<'e> {
    engine: &'e Engine,
    stack: Vec<String>,
    overrides: Vec<Rc<ParsedTemplate>>,
    writes: Vec<WriteResult>,
}

impl<'e> Renderer<'e> {
    pub(crate) fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            stack: Vec::new(),
            overrides: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub(crate) fn into_writes(self) -> Vec<WriteResult> {
        self.writes
    }

    pub(crate) fn render_template(
        &mut self,
        tpl: &Rc<ParsedTemplate>,
        out: &mut dyn fmt::Write,
        ctx: &mut Context,
    ) -> Result<(), RenderError> {
        if self.stack.iter().any(|n| *n == tpl.name) {
            let mut chain = self.stack.clone();
            chain.push(tpl.name.clone());
            return Err(RenderError::Cycle {
                chain: chain.join(" -> "),
            });
        }
        let limit = self.engine.config().max_depth;
        if self.stack.len() >= limit {
            return Err(RenderError::DepthExceeded {
                limit,
                template: tpl.name.clone(),
            });
        }

        self.stack.push(tpl.name.clone());
        let result = self.render_nodes(tpl, &tpl.nodes, out, ctx);
        self.stack.pop();
        result
    }

    fn render_nodes(
        &mut self,
        tpl: &Rc<ParsedTemplate>,
        nodes: &[Node],
        out: &mut dyn fmt::Write,
        ctx: &mut Context,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.write_str(text)?,
                Node::Var(expr) => {
                    let v = eval(expr, ctx);
                    let text = v.to_string();
                    match ctx.escaper() {
                        Some(escaper) if !v.raw() => out.write_str(&escaper.escape(&text))?,
                        _ => out.write_str(&text)?,
                    }
                }
                Node::For(f) => self.render_for(tpl, f, out, ctx)?,
                Node::If(i) => {
                    let truth = eval(&i.cond, ctx).to_bool() != i.negate;
                    let branch = if truth { &i.then_branch } else { &i.else_branch };
                    self.render_nodes(tpl, branch, out, ctx)?;
                }
                Node::Block(b) => {
                    let owner = self
                        .overrides
                        .iter()
                        .find_map(|t| t.blocks.get(&b.name).map(|body| (t.clone(), body.clone())));
                    match owner {
                        Some((owner, body)) => self.render_nodes(&owner, &body, out, ctx)?,
                        None => self.render_nodes(tpl, &b.body, out, ctx)?,
                    }
                }
                Node::Extends { parent, line } => {
                    let parent = self.resolve(parent, ctx, tpl, *line)?;
                    self.overrides.push(tpl.clone());
                    let result = self.render_template(&parent, out, ctx);
                    self.overrides.pop();
                    // Whatever follows `extends` only matters through its blocks.
                    return result;
                }
                Node::Include { template, line } => {
                    let included = self.resolve(template, ctx, tpl, *line)?;
                    let saved = std::mem::take(&mut self.overrides);
                    let result = self.render_template(&included, out, ctx);
                    self.overrides = saved;
                    result?;
                }
                Node::Create(c) => self.render_create(tpl, c, ctx)?,
            }
        }
        Ok(())
    }

    fn render_for(
        &mut self,
        tpl: &Rc<ParsedTemplate>,
        f: &ForNode,
        out: &mut dyn fmt::Write,
        ctx: &mut Context,
    ) -> Result<(), RenderError> {
        let value = eval(&f.list, ctx);
        let list = match value.to_list() {
            Some(list) if list.count() > 0 => list.clone(),
            _ => return self.render_nodes(tpl, &f.empty, out, ctx),
        };

        let metadata = self.engine.config().loop_metadata;
        let mut cursor = list.create_iterator();
        if f.reversed {
            cursor.to_last();
        }

        ctx.push();
        let mut index = 0;
        let mut result = Ok(());
        while let Some(item) = cursor.current() {
            ctx.set(f.var.as_str(), item);
            if metadata {
                // The list may grow or shrink while the body runs.
                ctx.set("forloop", loop_info(index, list.count()));
            }
            result = self.render_nodes(tpl, &f.body, out, ctx);
            if result.is_err() {
                break;
            }
            if f.reversed {
                cursor.to_prev();
            } else {
                cursor.to_next();
            }
            index += 1;
        }
        ctx.pop()?;
        result
    }

    fn render_create(
        &mut self,
        tpl: &Rc<ParsedTemplate>,
        c: &CreateNode,
        ctx: &mut Context,
    ) -> Result<(), RenderError> {
        let file = eval(&c.file, ctx).to_string();
        let source = self.resolve(&c.template, ctx, tpl, c.line)?;

        let mut buf = String::new();
        let saved = std::mem::take(&mut self.overrides);
        let result = self.render_template(&source, &mut buf, ctx);
        self.overrides = saved;
        result?;

        let path = match ctx.output_directory() {
            Some(dir) => dir.join(&file),
            None => PathBuf::from(&file),
        };
        let outcome = if file.is_empty() {
            tracing::warn!(template = %tpl.name, line = c.line, "create: empty file name");
            WriteResult::Failed {
                path,
                reason: format!("empty file name in '{}' at line {}", tpl.name, c.line),
            }
        } else {
            writer::write_file(&path, &buf)
        };
        self.writes.push(outcome);
        Ok(())
    }

    fn resolve(
        &self,
        expr: &Expr,
        ctx: &Context,
        from: &ParsedTemplate,
        line: usize,
    ) -> Result<Rc<ParsedTemplate>, RenderError> {
        let name = eval(expr, ctx).to_string();
        tracing::debug!(template = %name, from = %from.name, line, "resolving template");
        self.engine.load_parsed(&name)
    }
}

/// Evaluate an expression: resolve the operand, then apply filters in order.
pub(crate) fn eval(expr: &Expr, ctx: &Context) -> Value {
    let mut v = match &expr.operand {
        Operand::Literal(lit) => lit.to_value(),
        Operand::Path(path) => resolve_path(path, ctx),
    };
    for call in &expr.filters {
        v = call.filter.apply(v, call.arg.as_ref());
    }
    v
}

/// Walk a dot path. Stops at the absent value as soon as a segment cannot be
/// looked up; callables met along the way are invoked without arguments.
fn resolve_path(path: &[String], ctx: &Context) -> Value {
    let Some((first, rest)) = path.split_first() else {
        return Value::none();
    };
    let mut v = invoke(ctx.get(first));
    for segment in rest {
        let next = if let Some(s) = v.to_struct() {
            s.get(segment)
        } else if let Some(list) = v.to_list() {
            match segment.parse::<usize>() {
                Ok(i) if i < list.count() => list.at(i),
                _ => Value::none(),
            }
        } else {
            return Value::none();
        };
        v = invoke(next);
    }
    v
}

fn invoke(v: Value) -> Value {
    if v.kind() == stencil_core::ValueKind::Function {
        Value::from(v.call(&[]))
    } else {
        v
    }
}

fn loop_info(index: usize, total: usize) -> Value {
    let info = TemplateStruct::new()
        .with("counter", index + 1)
        .with("counter0", index)
        .with("revcounter", total.saturating_sub(index))
        .with("revcounter0", total.saturating_sub(index + 1))
        .with("first", index == 0)
        .with("last", index + 1 >= total);
    Value::from_struct(Rc::new(info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::TemplateList;

    fn ctx_with_user() -> Context {
        let mut ctx = Context::new();
        let user = TemplateStruct::new()
            .with("name", "ada")
            .with("langs", Value::from_list(Rc::new(["c", "rust"].into_iter().collect::<TemplateList>())))
            .with("greet", Value::function(|_| "hi".to_string()));
        ctx.set("user", Value::from_struct(Rc::new(user)));
        ctx
    }

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    #[test]
    fn resolves_struct_fields_and_list_indices() {
        let ctx = ctx_with_user();
        assert_eq!(resolve_path(&path("user.name"), &ctx).to_string(), "ada");
        assert_eq!(resolve_path(&path("user.langs.1"), &ctx).to_string(), "rust");
        assert!(!resolve_path(&path("user.langs.9"), &ctx).is_valid());
    }

    #[test]
    fn short_circuits_on_non_struct_segment() {
        let ctx = ctx_with_user();
        assert!(!resolve_path(&path("user.name.len"), &ctx).is_valid());
        assert!(!resolve_path(&path("nobody.name"), &ctx).is_valid());
    }

    #[test]
    fn callables_are_invoked_during_lookup() {
        let ctx = ctx_with_user();
        assert_eq!(resolve_path(&path("user.greet"), &ctx).to_string(), "hi");
    }

    #[test]
    fn loop_info_fields() {
        let v = loop_info(2, 3);
        let s = v.to_struct().unwrap();
        assert_eq!(s.get("counter").to_int(), 3);
        assert_eq!(s.get("revcounter0").to_int(), 0);
        assert!(s.get("last").to_bool());
        assert!(!s.get("first").to_bool());
    }

    #[test]
    fn loop_info_past_a_shrunk_list_does_not_underflow() {
        let v = loop_info(4, 2);
        let s = v.to_struct().unwrap();
        assert_eq!(s.get("revcounter").to_int(), 0);
        assert_eq!(s.get("revcounter0").to_int(), 0);
        assert!(s.get("last").to_bool());
    }
}

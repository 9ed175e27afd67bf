//! Token stream → [`ParsedTemplate`].
//!
//! # Grammar
//!
//! ```text
//! expr    := operand ('|' IDENT (':' literal)?)*
//! operand := literal | IDENT ('.' (IDENT | DIGITS))*
//! literal := '…' | "…" | '-'? DIGITS
//!
//! {% for NAME in expr [reversed] %} … [{% empty %} …] {% endfor %}
//! {% if [not] expr %} … [{% else %} …] {% endif %}
//! {% block NAME %} … {% endblock [NAME] %}
//! {% extends expr %}              (first tag only)
//! {% include expr %}
//! {% create expr from expr %}
//! ```
//!
//! Every violation is fatal and carries the 1-based line of the offending tag.

use std::rc::Rc;

use crate::error::RenderError;
use crate::filters::Filter;
use crate::lexer::{tokenize, SyntaxError, Token, TokenKind};
use crate::node::{
    BlockMap, BlockNode, CreateNode, Expr, FilterCall, ForNode, IfNode, Literal, Node, Operand,
    ParsedTemplate,
};

/// Parse `source` as the template `name`.
pub(crate) fn parse(name: &str, source: &str) -> Result<ParsedTemplate, RenderError> {
    parse_inner(name, source).map_err(|e| RenderError::Parse {
        template: name.to_string(),
        line: e.line,
        message: e.message,
    })
}

fn parse_inner(name: &str, source: &str) -> Result<ParsedTemplate, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        seen_content: false,
        blocks: BlockMap::new(),
    };
    let (nodes, end) = parser.parse_nodes(&[])?;
    debug_assert!(end.is_none());
    Ok(ParsedTemplate {
        name: name.to_string(),
        nodes,
        blocks: parser.blocks,
    })
}

// ---------------------------------------------------------------------------
// Expression scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Int(i64),
    Str(String),
    Dot,
    Pipe,
    Colon,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Ident(s) => format!("'{s}'"),
            Tok::Int(i) => format!("'{i}'"),
            Tok::Str(s) => format!("string '{s}'"),
            Tok::Dot => "'.'".to_string(),
            Tok::Pipe => "'|'".to_string(),
            Tok::Colon => "':'".to_string(),
        }
    }
}

fn scan(src: &str, line: usize) -> Result<Vec<Tok>, SyntaxError> {
    let mut toks = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                toks.push(Tok::Dot);
            }
            '|' => {
                chars.next();
                toks.push(Tok::Pipe);
            }
            ':' => {
                chars.next();
                toks.push(Tok::Colon);
            }
            '\'' | '"' => {
                chars.next();
                let quote = c;
                let start = i + 1;
                let mut end = None;
                for (j, d) in chars.by_ref() {
                    if d == quote {
                        end = Some(j);
                        break;
                    }
                }
                let Some(end) = end else {
                    return Err(SyntaxError::new(line, "unterminated string literal"));
                };
                toks.push(Tok::Str(src[start..end].to_string()));
            }
            c if c == '-' || c.is_ascii_digit() => {
                chars.next();
                let mut end = i + c.len_utf8();
                while let Some(&(j, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = j + 1;
                    chars.next();
                }
                let text = &src[i..end];
                let value = text
                    .parse()
                    .map_err(|_| SyntaxError::new(line, format!("invalid integer '{text}'")))?;
                toks.push(Tok::Int(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                chars.next();
                let mut end = i + c.len_utf8();
                while let Some(&(j, d)) = chars.peek() {
                    if !(d.is_alphanumeric() || d == '_') {
                        break;
                    }
                    end = j + d.len_utf8();
                    chars.next();
                }
                toks.push(Tok::Ident(src[i..end].to_string()));
            }
            other => {
                return Err(SyntaxError::new(
                    line,
                    format!("unexpected character '{other}'"),
                ))
            }
        }
    }
    Ok(toks)
}

/// Cursor over the scanned contents of one `{{ }}` or `{% %}`.
struct Args {
    toks: Vec<Tok>,
    pos: usize,
    line: usize,
}

impl Args {
    fn new(src: &str, line: usize) -> Result<Self, SyntaxError> {
        Ok(Self {
            toks: scan(src, line)?,
            pos: 0,
            line,
        })
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let t = self.toks.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn err(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.line, message)
    }

    fn ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.next() {
            Some(Tok::Ident(s)) => Ok(s),
            Some(t) => Err(self.err(format!("expected {what}, found {}", t.describe()))),
            None => Err(self.err(format!("expected {what}"))),
        }
    }

    fn keyword(&mut self, kw: &str) -> Result<(), SyntaxError> {
        match self.next() {
            Some(Tok::Ident(s)) if s == kw => Ok(()),
            Some(t) => Err(self.err(format!("expected '{kw}', found {}", t.describe()))),
            None => Err(self.err(format!("expected '{kw}'"))),
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Ident(s)) if s == kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a leading `not` when an operand follows it. A bare `not` or
    /// `not|filter` is the variable named `not`.
    fn negation(&mut self) -> bool {
        let operand_follows = matches!(
            self.toks.get(self.pos + 1),
            Some(Tok::Ident(_) | Tok::Int(_) | Tok::Str(_))
        );
        operand_follows && self.eat_keyword("not")
    }

    fn end(&self, tag: &str) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(self.err(format!("unexpected {} in '{tag}'", t.describe()))),
        }
    }

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        let operand = match self.next() {
            Some(Tok::Str(s)) => Operand::Literal(Literal::Text(s)),
            Some(Tok::Int(i)) => Operand::Literal(Literal::Int(i)),
            Some(Tok::Ident(first)) => {
                let mut path = vec![first];
                while self.peek() == Some(&Tok::Dot) {
                    self.pos += 1;
                    match self.next() {
                        Some(Tok::Ident(s)) => path.push(s),
                        Some(Tok::Int(i)) if i >= 0 => path.push(i.to_string()),
                        _ => return Err(self.err("expected a field name after '.'")),
                    }
                }
                Operand::Path(path)
            }
            Some(t) => return Err(self.err(format!("expected an expression, found {}", t.describe()))),
            None => return Err(self.err("expected an expression")),
        };

        let mut filters = Vec::new();
        while self.peek() == Some(&Tok::Pipe) {
            self.pos += 1;
            let name = self.ident("a filter name")?;
            let filter = Filter::from_name(&name)
                .ok_or_else(|| self.err(format!("unknown filter '{name}'")))?;
            let arg = if self.peek() == Some(&Tok::Colon) {
                self.pos += 1;
                match self.next() {
                    Some(Tok::Str(s)) => Some(Literal::Text(s)),
                    Some(Tok::Int(i)) => Some(Literal::Int(i)),
                    _ => {
                        return Err(self.err(format!(
                            "argument of filter '{name}' must be a string or integer literal"
                        )))
                    }
                }
            } else {
                None
            };
            match (filter.takes_arg(), arg.is_some()) {
                (true, false) => {
                    return Err(self.err(format!(
                        "filter '{}' requires an argument",
                        filter.name()
                    )))
                }
                (false, true) => {
                    return Err(self.err(format!("filter '{}' takes no argument", filter.name())))
                }
                _ => {}
            }
            filters.push(FilterCall { filter, arg });
        }

        Ok(Expr { operand, filters })
    }
}

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

const END_TAGS: &[&str] = &["empty", "endfor", "else", "endif", "endblock"];

/// Deepest allowed nesting of `for`/`if`/`block` bodies.
const MAX_NESTING: usize = 256;

/// The tag that terminated a nested node list.
struct End<'s> {
    name: &'s str,
    rest: &'s str,
    line: usize,
}

struct Parser<'s> {
    tokens: Vec<Token<'s>>,
    pos: usize,
    depth: usize,
    /// Set once a variable or tag has been seen; `extends` is rejected
    /// afterwards. Plain text does not count.
    seen_content: bool,
    blocks: BlockMap,
}

fn split_tag(content: &str) -> (&str, &str) {
    match content.find(char::is_whitespace) {
        Some(i) => (&content[..i], content[i..].trim()),
        None => (content, ""),
    }
}

impl<'s> Parser<'s> {
    /// Parse nodes until one of `until` is met (returned) or input ends
    /// (`None`; only legal when `until` is empty).
    fn parse_nodes(&mut self, until: &[&str]) -> Result<(Vec<Node>, Option<End<'s>>), SyntaxError> {
        let mut nodes = Vec::new();
        while let Some(tok) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            match tok.kind {
                TokenKind::Text => nodes.push(Node::Text(tok.content.to_string())),
                TokenKind::Variable => {
                    self.seen_content = true;
                    if tok.content.is_empty() {
                        return Err(SyntaxError::new(tok.line, "empty variable tag"));
                    }
                    let mut args = Args::new(tok.content, tok.line)?;
                    let expr = args.expr()?;
                    args.end("{{ }}")?;
                    nodes.push(Node::Var(expr));
                }
                TokenKind::Tag => {
                    let (name, rest) = split_tag(tok.content);
                    if until.contains(&name) {
                        return Ok((
                            nodes,
                            Some(End {
                                name,
                                rest,
                                line: tok.line,
                            }),
                        ));
                    }
                    if END_TAGS.contains(&name) {
                        return Err(SyntaxError::new(
                            tok.line,
                            format!("unexpected '{{% {name} %}}'"),
                        ));
                    }
                    let node = self.parse_tag(name, rest, tok.line)?;
                    self.seen_content = true;
                    nodes.push(node);
                }
            }
        }
        Ok((nodes, None))
    }

    /// Like [`parse_nodes`](Self::parse_nodes) but input ending first is an error.
    fn parse_body(
        &mut self,
        until: &[&str],
        opener: &str,
        line: usize,
    ) -> Result<(Vec<Node>, End<'s>), SyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::new(
                line,
                format!("'{{% {opener} %}}' nested deeper than {MAX_NESTING} levels"),
            ));
        }
        self.depth += 1;
        let (nodes, end) = self.parse_nodes(until)?;
        self.depth -= 1;
        match end {
            Some(end) => Ok((nodes, end)),
            None => Err(SyntaxError::new(
                line,
                format!("unclosed '{{% {opener} %}}' (expected '{{% {} %}}')", until[until.len() - 1]),
            )),
        }
    }

    fn parse_tag(&mut self, name: &str, rest: &str, line: usize) -> Result<Node, SyntaxError> {
        match name {
            "for" => self.parse_for(rest, line),
            "if" => self.parse_if(rest, line),
            "block" => self.parse_block(rest, line),
            "extends" => {
                if self.seen_content || self.depth > 0 {
                    return Err(SyntaxError::new(
                        line,
                        "'extends' must be the first tag in the template",
                    ));
                }
                let mut args = Args::new(rest, line)?;
                let parent = args.expr()?;
                args.end("extends")?;
                Ok(Node::Extends { parent, line })
            }
            "include" => {
                let mut args = Args::new(rest, line)?;
                let template = args.expr()?;
                args.end("include")?;
                Ok(Node::Include { template, line })
            }
            "create" => {
                let mut args = Args::new(rest, line)?;
                let file = args.expr()?;
                args.keyword("from")?;
                let template = args.expr()?;
                args.end("create")?;
                Ok(Node::Create(CreateNode {
                    file,
                    template,
                    line,
                }))
            }
            "" => Err(SyntaxError::new(line, "empty tag")),
            other => Err(SyntaxError::new(line, format!("unknown tag '{other}'"))),
        }
    }

    fn parse_for(&mut self, rest: &str, line: usize) -> Result<Node, SyntaxError> {
        let mut args = Args::new(rest, line)?;
        let var = args.ident("a loop variable")?;
        args.keyword("in")?;
        let list = args.expr()?;
        let reversed = args.eat_keyword("reversed");
        args.end("for")?;

        let (body, end) = self.parse_body(&["empty", "endfor"], "for", line)?;
        let empty = if end.name == "empty" {
            no_args(&end)?;
            let (empty, end) = self.parse_body(&["endfor"], "for", line)?;
            no_args(&end)?;
            empty
        } else {
            no_args(&end)?;
            Vec::new()
        };

        Ok(Node::For(ForNode {
            var,
            list,
            reversed,
            body,
            empty,
        }))
    }

    fn parse_if(&mut self, rest: &str, line: usize) -> Result<Node, SyntaxError> {
        let mut args = Args::new(rest, line)?;
        let negate = args.negation();
        let cond = args.expr()?;
        args.end("if")?;

        let (then_branch, end) = self.parse_body(&["else", "endif"], "if", line)?;
        let else_branch = if end.name == "else" {
            no_args(&end)?;
            let (else_branch, end) = self.parse_body(&["endif"], "if", line)?;
            no_args(&end)?;
            else_branch
        } else {
            no_args(&end)?;
            Vec::new()
        };

        Ok(Node::If(IfNode {
            cond,
            negate,
            then_branch,
            else_branch,
        }))
    }

    fn parse_block(&mut self, rest: &str, line: usize) -> Result<Node, SyntaxError> {
        let mut args = Args::new(rest, line)?;
        let name = args.ident("a block name")?;
        args.end("block")?;

        let (body, end) = self.parse_body(&["endblock"], "block", line)?;
        if !end.rest.is_empty() {
            let mut end_args = Args::new(end.rest, end.line)?;
            let end_name = end_args.ident("a block name")?;
            end_args.end("endblock")?;
            if end_name != name {
                return Err(SyntaxError::new(
                    end.line,
                    format!("'endblock {end_name}' does not match 'block {name}'"),
                ));
            }
        }

        let body: Rc<[Node]> = Rc::from(body);
        if self.blocks.insert(name.clone(), body.clone()).is_some() {
            return Err(SyntaxError::new(
                line,
                format!("block '{name}' defined more than once"),
            ));
        }
        Ok(Node::Block(BlockNode { name, body }))
    }
}

fn no_args(end: &End<'_>) -> Result<(), SyntaxError> {
    if end.rest.is_empty() {
        Ok(())
    } else {
        Err(SyntaxError::new(
            end.line,
            format!("'{}' takes no arguments", end.name),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

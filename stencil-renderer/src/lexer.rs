//! Template source → flat token stream.
//!
//! Text outside delimiters is kept verbatim. `{{ }}` and `{% %}` contents are
//! trimmed; `{# #}` comments are dropped entirely. Every token records the
//! 1-based line its opening delimiter sits on.

/// A lexical or grammatical error, before it is tied to a template name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Text,
    Variable,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'s> {
    pub kind: TokenKind,
    pub content: &'s str,
    pub line: usize,
}

/// Split `src` into tokens.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut rest = src;

    while !rest.is_empty() {
        let Some((start, open)) = find_opener(rest) else {
            tokens.push(Token {
                kind: TokenKind::Text,
                content: rest,
                line,
            });
            break;
        };

        if start > 0 {
            let text = &rest[..start];
            tokens.push(Token {
                kind: TokenKind::Text,
                content: text,
                line,
            });
            line += count_lines(text);
        }

        let close = match open {
            '{' => "}}",
            '%' => "%}",
            _ => "#}",
        };
        let body_start = start + 2;
        let body_src = &rest[body_start..];
        let found = if open == '#' {
            body_src.find(close)
        } else {
            find_closer(body_src, close)
        };
        let Some(len) = found else {
            return Err(SyntaxError::new(
                line,
                format!("unclosed '{{{open}' (expected '{close}')"),
            ));
        };
        let body = &rest[body_start..body_start + len];
        match open {
            '{' => tokens.push(Token {
                kind: TokenKind::Variable,
                content: body.trim(),
                line,
            }),
            '%' => tokens.push(Token {
                kind: TokenKind::Tag,
                content: body.trim(),
                line,
            }),
            _ => {}
        }
        line += count_lines(body);
        rest = &rest[body_start + len + close.len()..];
    }

    Ok(tokens)
}

/// Byte offset and kind char (`{`, `%` or `#`) of the next opening delimiter.
fn find_opener(s: &str) -> Option<(usize, char)> {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(i) = s[from..].find('{') {
        let at = from + i;
        match bytes.get(at + 1) {
            Some(b'{') => return Some((at, '{')),
            Some(b'%') => return Some((at, '%')),
            Some(b'#') => return Some((at, '#')),
            _ => from = at + 1,
        }
    }
    None
}

/// Offset of `close` in `s`, skipping quoted string literals. A quote that
/// never closes is left for the expression scanner to report.
fn find_closer(s: &str, close: &str) -> Option<usize> {
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if rest.starts_with(close) {
            return Some(i);
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        if c == '\'' || c == '"' {
            match rest[1..].find(c) {
                Some(end) => {
                    i += end + 2;
                    continue;
                }
                None => return rest.find(close).map(|at| i + at),
            }
        }
        i += c.len_utf8();
    }
    None
}

fn count_lines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

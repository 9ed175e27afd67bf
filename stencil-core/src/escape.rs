//! Output escaping capability.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Turns raw expression output into output-safe text.
pub trait Escaper {
    fn escape(&self, input: &str) -> String;
}

/// Escapes the five HTML-significant characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl Escaper for HtmlEscaper {
    fn escape(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }
}

/// Escaper selection as it appears in configuration files and on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    #[default]
    None,
    Html,
}

impl EscapeMode {
    /// The escaper to install on a context, if any.
    pub fn escaper(self) -> Option<Rc<dyn Escaper>> {
        match self {
            EscapeMode::None => None,
            EscapeMode::Html => Some(Rc::new(HtmlEscaper)),
        }
    }
}

impl fmt::Display for EscapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapeMode::None => write!(f, "none"),
            EscapeMode::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for EscapeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown escape mode '{other}'; expected: none, html")),
        }
    }
}

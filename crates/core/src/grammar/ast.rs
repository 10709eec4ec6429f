use serde::{Deserialize, Serialize};
use sfz_lint_diagnostics::Span;

/// A parsed SFZ file: the flat sequence of nodes in document order.
///
/// The end of `nodes` marks the end of input; the document builder consumes
/// the nodes one by one and finishes when the vector is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ParseTree {
    /// Ordered list of nodes found in the input.
    pub nodes: Vec<Node>,
}

/// A piece of source text with its location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Source text exactly as written (quotes and `$` sigils included).
    pub text: String,
    /// Byte span of `text` in the input.
    pub span: Span,
}

impl Token {
    /// Create a token from text and span.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// A node in the SFZ parse tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A section header (`<region>`); `name` holds the text between the brackets.
    Header {
        /// Header name token.
        name: Token,
    },
    /// An opcode assignment (`key=value`).
    Opcode {
        /// Opcode name token.
        name: Token,
        /// Raw value token, unresolved.
        value: Token,
    },
    /// A `#define $NAME value` directive.
    Define {
        /// Variable name token, `$` included.
        name: Token,
        /// Raw value token.
        value: Token,
    },
    /// An `#include "path"` directive.
    Include {
        /// Raw path token, quotes included.
        path: Token,
    },
}

impl Node {
    /// Span of the whole construct, from its first token to its last.
    pub fn span(&self) -> Span {
        match self {
            Node::Header { name } => name.span,
            Node::Opcode { name, value } | Node::Define { name, value } => {
                Span::new(name.span.start, value.span.end)
            }
            Node::Include { path } => path.span,
        }
    }
}

//! SFZ renderer: writes a [`Document`] back out as SFZ text.
//!
//! Output order: `#include "path"` lines, then each header as `<kind>`
//! followed by one `opcode=value` line per stored opcode. Values are written
//! in their resolved form; a string is quoted only when its bare text would
//! not parse back to the same string.

use crate::document::Document;
use crate::grammar::ast::Node;
use crate::grammar::parser::parse_str;
use crate::literal::{Value, resolve};
use crate::macros::MacroEnv;

/// Line limit used by `Display for Document`.
pub const DEFAULT_CUTOFF: usize = 20;

/// Configuration for the SFZ renderer.
#[derive(Debug, Clone, Default)]
pub struct EmitConfig {
    /// Stop after this many lines and append a `...` line. `None` renders
    /// everything.
    pub cutoff: Option<usize>,
}

/// Render a document as SFZ text.
pub fn emit_sfz(doc: &Document, config: &EmitConfig) -> String {
    let lines = doc
        .includes
        .iter()
        .map(|path| format!("#include \"{path}\""))
        .chain(doc.headers.iter().flat_map(|header| {
            std::iter::once(format!("<{}>", header.kind)).chain(
                header
                    .iter()
                    .map(|(opcode, value)| format!("{opcode}={}", render_value(value))),
            )
        }));

    let mut out = String::new();
    let mut written = 0usize;
    for line in lines {
        if config.cutoff.is_some_and(|limit| written == limit) {
            out.push_str("...\n");
            return out;
        }
        out.push_str(&line);
        out.push('\n');
        written += 1;
    }
    out
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Str(s) => render_str(s),
        other => other.to_string(),
    }
}

/// Bare text if it reads back unchanged, else the quoted form if that does.
/// Text that survives neither (an odd number of `"`) is written bare.
fn render_str(s: &str) -> String {
    if reads_back(s, s) {
        return s.to_string();
    }
    let quoted = format!("\"{s}\"");
    if reads_back(&quoted, s) {
        quoted
    } else {
        s.to_string()
    }
}

/// Whether `text` written as an opcode value parses and resolves to `Str(expected)`.
fn reads_back(text: &str, expected: &str) -> bool {
    let Ok(tree) = parse_str(&format!("x={text}")) else {
        return false;
    };
    match tree.nodes.as_slice() {
        [Node::Opcode { value, .. }] => matches!(
            resolve(&value.text, &MacroEnv::default()),
            Ok(Value::Str(t)) if t == expected
        ),
        _ => false,
    }
}

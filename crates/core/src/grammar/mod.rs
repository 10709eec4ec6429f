/// SFZ parse tree types.
pub mod ast;
/// Re-exports from the diagnostics crate.
pub mod diag {
    pub use sfz_lint_diagnostics::{Diagnostic, Severity, Span, codes};
}
/// Renders a document back to SFZ text.
pub mod emit;
/// Tokenizer over borrowed input.
pub mod lexer;
/// Token stream to parse tree.
pub mod parser;

//! SFZ lint core library.
//!
//! Parses SFZ instrument files, resolves opcode values, and validates them
//! against a versioned opcode registry while building a [`Document`]. The
//! main entry points are [`parse_str`] for parsing, [`validate_str`] for
//! parse-and-validate, and [`emit_sfz`] for rendering a document back to
//! text.

#![warn(missing_docs)]

/// Shorthand for building a `BTreeMap<String, String>` diagnostic context.
///
/// ```ignore
/// ctx!("token" => text, "opcode" => name)
/// ```
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        ::std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// The parsed document model.
pub mod document;
/// SFZ grammar: lexer, parser, parse tree, renderer.
pub mod grammar;
/// Value resolution: quoted strings, `$variables`, numbers, note names.
pub mod literal;
/// `#define` / `#include` environment.
pub mod macros;
/// Opcode registry, validator rules and version sets.
pub mod registry;
/// Document builder and validation entry points.
pub mod validate;

use thiserror::Error;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Parser
pub use grammar::ast::{Node, ParseTree, Token};
pub use grammar::parser::{ParseError, parse_str};

// Emitter
pub use grammar::emit::{EmitConfig, emit_sfz};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, Severity, Span, codes};

// Model
pub use document::{Document, Header};
pub use literal::{Note, Value, resolve};
pub use macros::MacroEnv;

// Registry
pub use registry::{Registry, Rule, SpecEntry, VersionSet};

// Validator
pub use validate::{
    DiagnosticSink, DocumentBuilder, FnSink, ValidationResult, build_document, validate_tree,
};

// Configuration
pub use sfz_lint_config::{ConfigError, LintConfig};
pub use sfz_lint_spec_tables::SpecError;

/// Failures that prevent a document from being produced at all.
#[derive(Debug, Error)]
pub enum LintError {
    /// The input could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The opcode registry could not be built from the syntax data.
    #[error("opcode registry unavailable")]
    Spec(#[from] &'static SpecError),

    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Parse and validate SFZ text against the process-wide registry.
///
/// ```
/// use sfz_lint_core::{LintConfig, codes, validate_str};
///
/// let result = validate_str("<region>\nvolume=-200\n", &LintConfig::default()).unwrap();
/// assert!(!result.ok);
/// assert_eq!(result.issues[0].id, codes::OUT_OF_RANGE);
/// assert_eq!(result.document.headers[0].get("volume").unwrap(), &-200);
/// ```
pub fn validate_str(input: &str, config: &LintConfig) -> Result<ValidationResult, LintError> {
    let tree = parse_str(input)?;
    let registry = Registry::global()?;
    Ok(validate_tree(&tree, registry, config))
}

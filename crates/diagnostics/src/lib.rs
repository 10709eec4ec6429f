//! Diagnostics for sfz-lint.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], and [`LineIndex`] used to
//! report errors and warnings from the parser and the document builder.
//! Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants generated from the diagnostic catalogue.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

// ── LineIndex ────────────────────────────────────────────────────────────

/// Byte offset to `(line, column)` lookup for one source text.
///
/// Both coordinates are 0-based; columns count bytes.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first byte of every line, starting with 0.
    starts: Vec<usize>,
}

impl LineIndex {
    /// Index the line breaks of `text`.
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(at, _)| at + 1))
            .collect();
        Self { starts }
    }

    /// Line and column of `offset`.
    ///
    /// Offsets past the end land on the last line with an unclamped column.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        // Number of lines starting at or before `offset`, minus one.
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        (line, offset - self.starts[line])
    }

    /// Number of lines; empty input has one.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document violates the format or the opcode specification.
    Error,
    /// The document is readable but likely not what the author meant.
    Warn,
}

impl Severity {
    /// Single-letter tag used by the one-line output format (`E` / `W`).
    pub fn letter(self) -> char {
        match self {
            Severity::Error => 'E',
            Severity::Warn => 'W',
        }
    }
}

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Span from `start` up to (not including) `end`.
    ///
    /// # Panics
    ///
    /// If `end` lies before `start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "inverted span {start}..{end}");
        Self { start, end }
    }

    /// Zero-width span at `at`.
    pub fn empty(at: usize) -> Self {
        Self::new(at, at)
    }

    /// Width in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// `true` for a zero-width span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A diagnostic message produced by the parser or the document builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g., `"SFZ1103"`).
    pub id: Cow<'static, str>,
    /// Error or warning.
    pub severity: Severity,
    /// One-line message for people.
    pub message: String,
    /// Byte span of the offending token, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling (`token`, `opcode`, `min`, ...).
    ///
    /// `BTreeMap` keeps serialized key order deterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Diagnostic without context.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Error-level diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Warning-level diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Attach context metadata (builder pattern). Existing keys are replaced.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        match &mut self.context {
            Some(existing) => existing.extend(ctx),
            None => self.context = Some(ctx),
        }
        self
    }

    /// Source text of the offending token, if recorded in the context.
    pub fn token(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.get("token"))
            .map(String::as_str)
    }

    /// Returns `true` for error-level diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Long-form explanation of [`Diagnostic::id`].
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Catalogue description for `id`, or `None` for an unknown code.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the catalogue severity for a diagnostic code, if known.
pub fn severity_for_code(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── LineIndex ────────────────────────────────────────────────────────

    #[test]
    fn line_index_two_lines() {
        let idx = LineIndex::new("<region>\nkey=60");
        assert_eq!(idx.line_count(), 2);
        assert_eq!(idx.line_col(0), (0, 0));
        assert_eq!(idx.line_col(8), (0, 8)); // '\n'
        assert_eq!(idx.line_col(9), (1, 0)); // 'k'
        assert_eq!(idx.line_col(13), (1, 4)); // '6'
    }

    #[test]
    fn line_index_empty_input() {
        let idx = LineIndex::new("");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_col(0), (0, 0));
    }

    #[test]
    fn line_index_trailing_newline() {
        let idx = LineIndex::new("a\n");
        assert_eq!(idx.line_count(), 2);
        assert_eq!(idx.line_col(2), (1, 0));
    }

    #[test]
    fn line_index_multibyte_utf8() {
        // 'é' is 2 bytes in UTF-8
        let idx = LineIndex::new("é\nb");
        assert_eq!(idx.line_col(2), (0, 2));
        assert_eq!(idx.line_col(3), (1, 0));
    }

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_empty() {
        let s = Span::empty(7);
        assert_eq!((s.start, s.end), (7, 7));
        assert!(s.is_empty());
        assert_eq!(Span::new(2, 9).len(), 7);
    }

    #[test]
    #[should_panic(expected = "inverted span 5..3")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    // ── Severity ────────────────────────────────────────────────────────

    #[test]
    fn severity_display_and_letter() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warn.to_string(), "warn");
        assert_eq!(Severity::Error.letter(), 'E');
        assert_eq!(Severity::Warn.letter(), 'W');
    }

    // ── Diagnostic ──────────────────────────────────────────────────────

    #[test]
    fn diagnostic_constructors() {
        let e = Diagnostic::error(codes::OUT_OF_RANGE, "out of range", None);
        assert_eq!(e.id, "SFZ1103");
        assert!(e.is_error());
        let w = Diagnostic::warn(codes::DUPLICATE_OPCODE, "dup", Some(Span::new(0, 6)));
        assert_eq!(w.severity, Severity::Warn);
        assert_eq!(w.span, Some(Span::new(0, 6)));
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(codes::OPCODE_OUTSIDE_HEADER, "opcode outside of header", None);
        assert_eq!(d.to_string(), "error[SFZ1001]: opcode outside of header");
    }

    #[test]
    fn with_context_merges() {
        let d = Diagnostic::warn(codes::DUPLICATE_OPCODE, "dup", None)
            .with_context(BTreeMap::from([("token".into(), "volume".into())]))
            .with_context(BTreeMap::from([("opcode".into(), "volume".into())]));
        assert_eq!(d.token(), Some("volume"));
        assert_eq!(d.context.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn explain_known_and_unknown() {
        assert!(explain(codes::UNDEFINED_VARIABLE).unwrap().contains("#define"));
        assert!(explain("SFZ9999").is_none());
    }

    #[test]
    fn catalogue_severities() {
        assert_eq!(severity_for_code(codes::OUT_OF_RANGE), Some(Severity::Error));
        assert_eq!(severity_for_code(codes::DEPRECATED_ALIAS), Some(Severity::Warn));
        assert_eq!(severity_for_code("nope"), None);
    }

    #[test]
    fn all_codes_have_explanations() {
        let all = [
            codes::PARSER_UNEXPECTED_TEXT,
            codes::PARSER_UNTERMINATED_HEADER,
            codes::PARSER_EMPTY_HEADER,
            codes::PARSER_MISSING_VALUE,
            codes::PARSER_MALFORMED_DIRECTIVE,
            codes::PARSER_UNKNOWN_DIRECTIVE,
            codes::PARSER_UNTERMINATED_QUOTE,
            codes::PARSER_UNTERMINATED_COMMENT,
            codes::OPCODE_OUTSIDE_HEADER,
            codes::UNDEFINED_VARIABLE,
            codes::REPEATED_SINGLE_HEADER,
            codes::WRONG_TYPE,
            codes::BELOW_MINIMUM,
            codes::OUT_OF_RANGE,
            codes::INVALID_CHOICE,
            codes::INVALID_OPCODE_INDEX,
            codes::DUPLICATE_OPCODE,
            codes::HEADER_VERSION_MISMATCH,
            codes::OPCODE_VERSION_MISMATCH,
            codes::DEPRECATED_ALIAS,
            codes::UNDOCUMENTED_CC_ALIAS,
            codes::UNKNOWN_OPCODE,
            codes::UNKNOWN_HEADER,
        ];
        for code in &all {
            assert!(explain(code).is_some(), "{code} has no explain() entry");
            assert!(severity_for_code(code).is_some(), "{code} has no severity");
        }
    }

    #[test]
    fn diagnostic_serde_roundtrip_omits_empty_fields() {
        let d = Diagnostic::error(codes::WRONG_TYPE, "wrong type", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "{json}");
        assert!(!json.contains("context"), "{json}");
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}

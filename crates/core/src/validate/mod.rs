//! Document builder: turns a parse tree into a [`Document`] while checking
//! every header and opcode against the registry.

mod sink;

pub use sink::{DiagnosticSink, FnSink};

use crate::document::{Document, Header};
use crate::grammar::ast::{Node, ParseTree, Token};
use crate::grammar::diag::{Diagnostic, Severity, codes};
use crate::literal::{Value, resolve};
use crate::macros::MacroEnv;
use crate::registry::{CheckContext, Registry, SpecEntry, VersionSet};
use serde::Serialize;
use sfz_lint_config::LintConfig;
use sfz_lint_spec_tables::header_meta;

/// Result of validating one SFZ document.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// `true` if no errors were reported (warnings are allowed).
    pub ok: bool,
    /// All diagnostics, in document order.
    pub issues: Vec<Diagnostic>,
    /// The document built from the input.
    pub document: Document,
}

impl ValidationResult {
    fn new(document: Document, issues: Vec<Diagnostic>) -> Self {
        Self {
            ok: !issues.iter().any(Diagnostic::is_error),
            issues,
            document,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoHeader,
    InHeader(usize),
}

/// Incremental builder driven by parse-tree nodes in document order.
///
/// Every problem goes to the sink; nothing aborts the build. Call
/// [`DocumentBuilder::finish`] at end of input.
pub struct DocumentBuilder<'r, S> {
    registry: &'r Registry,
    versions: VersionSet,
    warn_unknown: bool,
    sink: S,
    headers: Vec<Header>,
    env: MacroEnv,
    state: State,
}

impl<'r, S: DiagnosticSink> DocumentBuilder<'r, S> {
    /// Start an empty document.
    pub fn new(registry: &'r Registry, config: &LintConfig, sink: S) -> Self {
        Self {
            registry,
            versions: VersionSet::new(config.versions().iter().copied()),
            warn_unknown: config.warn_unknown_opcodes,
            sink,
            headers: Vec::new(),
            env: MacroEnv::default(),
            state: State::NoHeader,
        }
    }

    /// Consume one node.
    pub fn push(&mut self, node: &Node) {
        match node {
            Node::Header { name } => self.header(name),
            Node::Opcode { name, value } => self.opcode(name, value),
            Node::Define { name, value } => self.define(name, value),
            Node::Include { path } => self.include(path),
        }
    }

    /// Open a new header.
    pub fn header(&mut self, name: &Token) {
        let header = Header::new(name.text.as_str(), name.span);
        match header_meta(&header.kind) {
            None => self.report(
                Severity::Warn,
                codes::UNKNOWN_HEADER,
                format!("unknown header <{}>", header.kind),
                name,
            ),
            Some(meta) if meta.single && self.headers.iter().any(|h| h.kind == header.kind) => {
                self.report(
                    Severity::Error,
                    codes::REPEATED_SINGLE_HEADER,
                    format!("<{}> may appear only once", header.kind),
                    name,
                )
            }
            Some(_) => {}
        }
        if !self.versions.accepts_header(header.version) {
            let declared = header.version.map_or("unknown", |v| v.as_str());
            self.report(
                Severity::Warn,
                codes::HEADER_VERSION_MISMATCH,
                format!("<{}> is {declared}, not in {}", header.kind, self.versions),
                name,
            );
        }
        self.headers.push(header);
        self.state = State::InHeader(self.headers.len() - 1);
    }

    /// Assign an opcode in the current header.
    pub fn opcode(&mut self, name: &Token, value: &Token) {
        let State::InHeader(idx) = self.state else {
            self.report(
                Severity::Error,
                codes::OPCODE_OUTSIDE_HEADER,
                format!("opcode outside of header ({})", name.text),
                name,
            );
            return;
        };

        if self.headers[idx].contains(&name.text) {
            let kind = self.headers[idx].kind.clone();
            self.report(
                Severity::Warn,
                codes::DUPLICATE_OPCODE,
                format!("duplicate opcode {} in <{kind}>", name.text),
                name,
            );
        }

        // An unresolved `$variable` is kept as text and still validated.
        let resolved = resolve(&value.text, &self.env).unwrap_or_else(|e| {
            self.report(Severity::Error, codes::UNDEFINED_VARIABLE, e.to_string(), value);
            Value::Str(value.text.clone())
        });

        self.check_opcode(name, value, &resolved);
        self.headers[idx].insert(name.text.as_str(), resolved);
    }

    fn check_opcode(&mut self, name: &Token, value: &Token, resolved: &Value) {
        let registry = self.registry;
        let resolution = match registry.resolve_name(&name.text) {
            Ok(r) => r,
            Err(e) => {
                self.report(Severity::Error, codes::INVALID_OPCODE_INDEX, e.to_string(), name);
                return;
            }
        };
        let Some(entry) = resolution.entry else {
            if self.warn_unknown {
                self.report(
                    Severity::Warn,
                    codes::UNKNOWN_OPCODE,
                    format!("unknown opcode {}", name.text),
                    name,
                );
            }
            return;
        };
        if let Some(alt) = &resolution.cc_alias {
            self.report(
                Severity::Warn,
                codes::UNDOCUMENTED_CC_ALIAS,
                format!("{} is an undocumented spelling of {alt}", name.text),
                name,
            );
        }
        if !self.versions.accepts_opcode(entry.version) {
            self.report(
                Severity::Warn,
                codes::OPCODE_VERSION_MISMATCH,
                format!("{} is {}, not in {}", name.text, entry.version, self.versions),
                name,
            );
        }
        self.run_rule(entry, name, value, resolved);
        if let Some(canonical) = &entry.alias_of {
            self.report(
                Severity::Warn,
                codes::DEPRECATED_ALIAS,
                format!("{} is a deprecated alias of {canonical}", name.text),
                name,
            );
        }
    }

    fn run_rule(&mut self, entry: &SpecEntry, name: &Token, value: &Token, resolved: &Value) {
        let ctx = CheckContext {
            registry: self.registry,
            versions: &self.versions,
            opcode: &name.text,
        };
        for finding in entry.check(resolved, &ctx) {
            let diag =
                Diagnostic::new(finding.code, finding.severity, finding.message, Some(value.span))
                    .with_context(ctx!("token" => value.text.clone(), "opcode" => name.text.clone()));
            self.sink.report(diag);
        }
    }

    /// Record a `#define`. No header is required.
    pub fn define(&mut self, name: &Token, value: &Token) {
        if let Err(e) = self.env.define(&name.text, &value.text) {
            self.report(Severity::Error, codes::UNDEFINED_VARIABLE, e.to_string(), value);
        }
    }

    /// Record an `#include`. No header is required.
    pub fn include(&mut self, path: &Token) {
        if let Err(e) = self.env.include(&path.text) {
            self.report(Severity::Error, codes::UNDEFINED_VARIABLE, e.to_string(), path);
        }
    }

    fn report(&mut self, severity: Severity, code: &'static str, message: String, token: &Token) {
        self.sink.report(
            Diagnostic::new(code, severity, message, Some(token.span))
                .with_context(ctx!("token" => token.text.clone())),
        );
    }

    /// End of input: hand back the document and the sink.
    pub fn finish(self) -> (Document, S) {
        let (defines, includes) = self.env.into_parts();
        let document = Document {
            headers: self.headers,
            defines,
            includes,
        };
        (document, self.sink)
    }
}

/// Build a document from a parse tree, reporting into `sink`.
pub fn build_document<S: DiagnosticSink>(
    tree: &ParseTree,
    registry: &Registry,
    config: &LintConfig,
    sink: S,
) -> (Document, S) {
    let mut builder = DocumentBuilder::new(registry, config, sink);
    for node in &tree.nodes {
        builder.push(node);
    }
    builder.finish()
}

/// Build a document and collect its diagnostics.
pub fn validate_tree(
    tree: &ParseTree,
    registry: &Registry,
    config: &LintConfig,
) -> ValidationResult {
    let (document, issues) = build_document(tree, registry, config, Vec::new());
    ValidationResult::new(document, issues)
}

//! Shared test helpers for `sfz_lint_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::LazyLock;
use sfz_lint_core::{
    Diagnostic, LintConfig, Registry, ValidationResult, parse_str, validate_tree,
};
use sfz_lint_spec_tables::{SyntaxSpec, VersionTag};

/// Registry built once per test binary from the embedded syntax data.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let spec = SyntaxSpec::embedded().unwrap_or_else(|e| panic!("embedded syntax data: {e}"));
    Registry::build(&spec).unwrap_or_else(|e| panic!("registry build: {e}"))
});

/// Parse and validate with no version restriction.
pub fn lint(input: &str) -> ValidationResult {
    lint_with(input, &LintConfig::default())
}

/// Parse and validate with the given allowed versions.
#[allow(dead_code)]
pub fn lint_versions(input: &str, versions: &[VersionTag]) -> ValidationResult {
    let config = LintConfig {
        spec_versions: Some(versions.to_vec()),
        ..Default::default()
    };
    lint_with(input, &config)
}

/// Parse and validate with an explicit config.
pub fn lint_with(input: &str, config: &LintConfig) -> ValidationResult {
    let tree = parse_str(input).unwrap_or_else(|e| panic!("parse failed for {input:?}: {e}"));
    validate_tree(&tree, &REGISTRY, config)
}

/// Diagnostic codes in report order.
#[allow(dead_code)]
pub fn ids(result: &ValidationResult) -> Vec<&str> {
    result.issues.iter().map(|d| d.id.as_ref()).collect()
}

/// Find the first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], id: &str) -> Option<&'a Diagnostic> {
    issues.iter().find(|d| d.id == id)
}

/// Count diagnostics with the given code.
#[allow(dead_code)]
pub fn count(result: &ValidationResult, id: &str) -> usize {
    result.issues.iter().filter(|d| d.id == id).count()
}

//! Validator rules attached to registry entries.

use super::{Registry, VersionSet, opcode_name};
use crate::literal::Value;
use sfz_lint_diagnostics::{Severity, codes};
use sfz_lint_spec_tables::VersionTag;
use std::fmt;

/// How an opcode's value is checked once its type is known to fit.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Any value.
    Any,
    /// Numeric and at least the bound.
    Minimum(f64),
    /// Numeric and within `[low, high]`.
    Range(f64, f64),
    /// Text form is one of the options (case-sensitive).
    Choice(Vec<String>),
    /// Validate as the named canonical opcode.
    Alias(String),
    /// Bounds that depend on the allowed versions.
    Versioned {
        /// Rule used when no override applies.
        default: Box<Rule>,
        /// Per-version replacements.
        overrides: Vec<(VersionTag, Rule)>,
    },
}

/// One problem found by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Severity to report with.
    pub severity: Severity,
    /// Diagnostic code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl Finding {
    pub(crate) fn error(code: &'static str, message: String) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message,
        }
    }
}

/// What a rule needs besides the value.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// Registry for alias delegation.
    pub registry: &'a Registry,
    /// Allowed versions for version-dependent rules.
    pub versions: &'a VersionSet,
    /// Opcode name as written, for messages.
    pub opcode: &'a str,
}

impl Rule {
    /// Check `value`. An empty result means the value is fine.
    pub fn check(&self, value: &Value, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let opcode = ctx.opcode;
        match self {
            Rule::Any => Vec::new(),
            Rule::Minimum(min) => match value.as_f64() {
                None => vec![not_comparable(value, &format!("minimum {}", trim_f64(*min)), opcode)],
                Some(x) if x < *min => vec![Finding::error(
                    codes::BELOW_MINIMUM,
                    format!("{value} less than minimum of {} ({opcode})", trim_f64(*min)),
                )],
                Some(_) => Vec::new(),
            },
            Rule::Range(low, high) => match value.as_f64() {
                None => vec![not_comparable(
                    value,
                    &format!("{}, {}", trim_f64(*low), trim_f64(*high)),
                    opcode,
                )],
                Some(x) if x < *low || x > *high => vec![Finding::error(
                    codes::OUT_OF_RANGE,
                    format!(
                        "{value} not in range {} to {} ({opcode})",
                        trim_f64(*low),
                        trim_f64(*high)
                    ),
                )],
                Some(_) => Vec::new(),
            },
            Rule::Choice(options) => {
                let text = value.to_string();
                let is_option = |candidate: &str| options.iter().any(|o| o == candidate);
                let normalized_matches = || {
                    opcode_name::normalize(&text).is_ok_and(|n| is_option(&n.name))
                };
                if is_option(&text) || normalized_matches() {
                    Vec::new()
                } else {
                    vec![Finding::error(
                        codes::INVALID_CHOICE,
                        format!("{text} not one of [{}] ({opcode})", options.join(", ")),
                    )]
                }
            }
            Rule::Alias(canonical) => ctx
                .registry
                .lookup(canonical)
                .map(|entry| entry.check(value, ctx))
                .unwrap_or_default(),
            Rule::Versioned { .. } => self.select(ctx.versions).check(value, ctx),
        }
    }

    /// The rule that applies under `versions`: for [`Rule::Versioned`], the
    /// override for the most specific acceptable tag, else the default.
    pub fn select(&self, versions: &VersionSet) -> &Rule {
        match self {
            Rule::Versioned { default, overrides } => overrides
                .iter()
                .filter(|(tag, _)| versions.accepts_opcode(*tag))
                .max_by_key(|(tag, _)| tag.hierarchy().len())
                .map_or(default.as_ref(), |(_, rule)| rule),
            other => other,
        }
    }
}

fn not_comparable(value: &Value, bounds: &str, opcode: &str) -> Finding {
    Finding::error(
        codes::WRONG_TYPE,
        format!("cannot compare {value} with {bounds} ({opcode})"),
    )
}

/// Format a bound without trailing zeros (`100`, `0.001`).
pub(crate) fn trim_f64(n: f64) -> String {
    let s = format!("{n:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" { "0".to_string() } else { s.to_string() }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Any => f.write_str("any"),
            Rule::Minimum(min) => write!(f, ">= {}", trim_f64(*min)),
            Rule::Range(low, high) => write!(f, "{}..={}", trim_f64(*low), trim_f64(*high)),
            Rule::Choice(options) => write!(f, "one of [{}]", options.join(", ")),
            Rule::Alias(canonical) => write!(f, "alias of {canonical}"),
            Rule::Versioned { default, overrides } => {
                write!(f, "{default}")?;
                for (tag, rule) in overrides {
                    write!(f, "; {tag}: {rule}")?;
                }
                Ok(())
            }
        }
    }
}

//! Diagnostic rendering for the terminal.
//!
//! Converts [`Diagnostic`]s into ariadne [`Report`]s for coloured,
//! source-annotated output, into JSON for tooling, or into the one-line
//! `path:line:col:S message` form that editors and grep understand.

use std::io::{self, IsTerminal};
use std::path::Path;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use sfz_lint_diagnostics::{Diagnostic, LineIndex, Severity};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for diagnostic rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
    /// One line per diagnostic.
    Short,
}

impl Format {
    /// Use the explicit choice, else pretty for terminals and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            Some("short") => Format::Short,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    diag.context.as_ref().filter(|ctx| !ctx.is_empty()).map(|ctx| {
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ")
    })
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics with source context to stderr.
pub(crate) fn render_diagnostics_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let Some(span) = diag.span else {
            eprintln!("{}[{}]: {}", diag.severity, diag.id, diag.message);
            if let Some(note) = context_note(diag) {
                eprintln!("  = note: {note}");
            }
            continue;
        };

        // Clamp to the source; a span may point one past the end of input.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let label = context_note(diag).unwrap_or_else(|| diag.message.clone());
        let mut builder = Report::build(report_kind(diag.severity), (filename, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(label)
                    .with_color(severity_color(diag.severity)),
            );
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

// ── Short rendering ─────────────────────────────────────────────────────

/// Format one diagnostic as `path:line:col:S message` (1-based positions).
///
/// With `no_path`, only the file name is printed.
pub(crate) fn short_line(
    source: &str,
    path: &str,
    diag: &Diagnostic,
    index: &LineIndex,
    no_path: bool,
) -> String {
    let shown = if no_path {
        Path::new(path)
            .file_name()
            .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned())
    } else {
        path.to_string()
    };
    let offset = diag.span.map_or(0, |s| s.start.min(source.len()));
    let (line, col) = index.line_col(offset);
    format!(
        "{shown}:{}:{}:{} {}",
        line + 1,
        col + 1,
        diag.severity.letter(),
        diag.message
    )
}

/// Print diagnostics in short form to stdout.
pub(crate) fn render_diagnostics_short(
    source: &str,
    path: &str,
    diagnostics: &[Diagnostic],
    no_path: bool,
) {
    let index = LineIndex::new(source);
    for diag in diagnostics {
        println!("{}", short_line(source, path, diag, &index, no_path));
    }
}

// ── Summary line ────────────────────────────────────────────────────────

/// Print a coloured summary line to stderr, e.g. `2 errors, 1 warning`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    use ariadne::Fmt;

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    if errors + warnings == 0 {
        return;
    }

    let mut parts = Vec::new();
    if errors > 0 {
        let s = if errors == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{errors} error{s}").fg(Color::Red)));
    }
    if warnings > 0 {
        let s = if warnings == 1 { "" } else { "s" };
        parts.push(format!("{}", format!("{warnings} warning{s}").fg(Color::Yellow)));
    }
    eprintln!("{}", parts.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfz_lint_diagnostics::{Span, codes};

    #[test]
    fn short_line_is_one_based() {
        let source = "<region>\nvolume=-200\n";
        let diag = Diagnostic::error(
            codes::OUT_OF_RANGE,
            "-200 not in range -144 to 6 (volume)",
            Some(Span::new(16, 20)),
        );
        let index = LineIndex::new(source);
        assert_eq!(
            short_line(source, "kit/piano.sfz", &diag, &index, false),
            "kit/piano.sfz:2:8:E -200 not in range -144 to 6 (volume)"
        );
        assert_eq!(
            short_line(source, "kit/piano.sfz", &diag, &index, true),
            "piano.sfz:2:8:E -200 not in range -144 to 6 (volume)"
        );
    }

    #[test]
    fn short_line_without_span_points_at_start() {
        let diag = Diagnostic::warn(codes::UNKNOWN_HEADER, "unknown header <x>", None);
        let index = LineIndex::new("");
        assert_eq!(short_line("", "a.sfz", &diag, &index, false), "a.sfz:1:1:W unknown header <x>");
    }
}

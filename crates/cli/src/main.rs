mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sfz_lint_config::{LintConfig, load_config_from_str};
use sfz_lint_core::{
    Diagnostic, EmitConfig, LintError, Registry, ValidationResult, VersionSet, emit_sfz,
    validate_str,
};
use sfz_lint_diagnostics as diag;
use sfz_lint_spec_tables::VersionTag;
use walkdir::WalkDir;

use crate::render::{
    Format, print_summary, render_diagnostics_pretty, render_diagnostics_short,
};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sfzlint",
    version,
    about = "sfz-lint: parse, validate, and render SFZ instrument files"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON, "short" for one `path:line:col:S message` line
    /// per diagnostic. Defaults to "pretty" when stdout is a TTY, "json"
    /// otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json", "short"])]
    output: Option<String>,

    /// In short output, print only the file name instead of the full path.
    #[arg(long, global = true)]
    no_path: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Options shared by every command that validates a document.
#[derive(Args, Debug, Clone, Default)]
struct LintOpts {
    /// Allowed spec version (repeatable): v1, v2, aria, linuxsampler,
    /// cakewalk. Replaces the list from `--config`.
    #[arg(long = "spec-version", value_name = "TAG")]
    spec_versions: Vec<VersionTag>,

    /// Path to a JSON lint configuration.
    #[arg(long)]
    config: Option<String>,

    /// Warn about opcodes the registry does not know.
    #[arg(long)]
    warn_unknown: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Lint an SFZ file, or every `.sfz` file under a directory.
    Lint {
        path: String,
        #[command(flatten)]
        opts: LintOpts,
    },

    /// Parse and validate a file, then print the document model as JSON.
    Parse {
        file: String,
        #[command(flatten)]
        opts: LintOpts,
    },

    /// Render the validated document back to SFZ text.
    Render {
        file: String,
        #[command(flatten)]
        opts: LintOpts,
        /// Stop after this many lines (overrides `render_cutoff`).
        #[arg(long)]
        cutoff: Option<usize>,
    },

    /// List the opcodes the registry knows.
    Opcodes {
        /// Only opcodes usable under this spec version.
        #[arg(long = "spec-version", value_name = "TAG")]
        version: Option<VersionTag>,
    },

    /// Explain a diagnostic ID (e.g. SFZ1103).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Lint { path, opts } => cmd_lint(&path, &opts, format, cli.no_path)?,
        Cmd::Parse { file, opts } => cmd_parse(&file, &opts, format, cli.no_path)?,
        Cmd::Render { file, opts, cutoff } => {
            cmd_render(&file, &opts, cutoff, format, cli.no_path)?
        }
        Cmd::Opcodes { version } => cmd_opcodes(version, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

/// Lint outcome for one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    ok: bool,
    issues: Vec<Diagnostic>,
    #[serde(skip)]
    source: String,
}

fn cmd_lint(path: &str, opts: &LintOpts, format: Format, no_path: bool) -> Result<()> {
    let config = load_config(opts, None)?;
    let files = collect_sfz_files(Path::new(path))?;
    if files.is_empty() {
        bail!("no .sfz files found under {path}");
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let issues = match validate_str(&source, &config) {
            Ok(result) => result.issues,
            // A parse failure is this file's problem, not the run's.
            Err(LintError::Parse(e)) => vec![e.to_diagnostic()],
            Err(e) => return Err(e.into()),
        };
        reports.push(FileReport {
            file: file.display().to_string(),
            ok: !issues.iter().any(Diagnostic::is_error),
            issues,
            source,
        });
    }

    let ok = reports.iter().all(|r| r.ok);
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "files": reports,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Short => {
            for r in &reports {
                render_diagnostics_short(&r.source, &r.file, &r.issues, no_path);
            }
        }
        Format::Pretty => {
            let mut all = Vec::new();
            for r in &reports {
                render_diagnostics_pretty(&r.source, &r.file, &r.issues);
                all.extend(r.issues.iter().cloned());
            }
            print_summary(&all);
            if ok {
                let s = if reports.len() == 1 { "" } else { "s" };
                eprintln!("lint ok ({} file{s})", reports.len());
            }
        }
    }

    if !ok {
        process::exit(1);
    }
    Ok(())
}

fn cmd_parse(file: &str, opts: &LintOpts, format: Format, no_path: bool) -> Result<()> {
    let config = load_config(opts, None)?;
    let source = fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    let result = validate_or_report(&source, file, &config, format, no_path)?;

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": result.ok,
                "document": result.document,
                "issues": result.issues,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty | Format::Short => {
            // Document to stdout, diagnostics to stderr.
            println!("{}", serde_json::to_string_pretty(&result.document)?);
            report_to_stderr(&source, file, &result.issues, format, no_path);
        }
    }

    exit_on_errors(&result.issues);
    Ok(())
}

fn cmd_render(
    file: &str,
    opts: &LintOpts,
    cutoff: Option<usize>,
    format: Format,
    no_path: bool,
) -> Result<()> {
    let config = load_config(opts, cutoff)?;
    let source = fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    let result = validate_or_report(&source, file, &config, format, no_path)?;
    let text = emit_sfz(
        &result.document,
        &EmitConfig {
            cutoff: config.render_cutoff,
        },
    );

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": result.ok,
                "text": text,
                "issues": result.issues,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty | Format::Short => {
            print!("{text}");
            report_to_stderr(&source, file, &result.issues, format, no_path);
        }
    }
    Ok(())
}

fn cmd_opcodes(version: Option<VersionTag>, format: Format) -> Result<()> {
    let registry = Registry::global().context("opcode registry unavailable")?;
    let filter = VersionSet::new(version);
    let entries: Vec<_> = registry
        .iter()
        .filter(|e| filter.accepts_opcode(e.version))
        .collect();

    match format {
        Format::Json => {
            let out: Vec<_> = entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "name": e.name,
                        "version": e.version,
                        "type": e.value_type,
                        "rule": e.rule.to_string(),
                        "alias_of": e.alias_of,
                        "modulates": e.modulation.as_ref().map(|m| &m.target),
                        "modulation_kind": e.modulation.as_ref().map(|m| &m.kind),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty | Format::Short => {
            for e in &entries {
                let type_name = e.value_type.map_or_else(|| "-".to_string(), |t| t.to_string());
                let mut line = format!("{}\t{}\t{}\t{}", e.name, e.version, type_name, e.rule);
                if let Some(m) = &e.modulation {
                    line.push_str(&format!("\tmodulates {} ({})", m.target, m.kind));
                }
                println!("{line}");
            }
            eprintln!("{} opcodes", entries.len());
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "severity": diag::severity_for_code(id),
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty | Format::Short => {
            // The explanation is this command's output, so stdout.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read `--config` (if any) and overlay the command-line flags.
fn load_config(opts: &LintOpts, cutoff: Option<usize>) -> Result<LintConfig> {
    let base = match &opts.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{path}'"))?;
            load_config_from_str(&text).with_context(|| format!("invalid config '{path}'"))?
        }
        None => LintConfig::default(),
    };
    if cutoff == Some(0) {
        bail!("--cutoff must be > 0");
    }
    Ok(base.merge_overrides(&opts.spec_versions, opts.warn_unknown, cutoff))
}

/// `path` itself if it is a file, else every `.sfz` file below it in name
/// order.
fn collect_sfz_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
        let is_sfz = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sfz"));
        if entry.file_type().is_file() && is_sfz {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Validate, or report the parse failure and exit 1.
fn validate_or_report(
    source: &str,
    file: &str,
    config: &LintConfig,
    format: Format,
    no_path: bool,
) -> Result<ValidationResult> {
    match validate_str(source, config) {
        Ok(result) => Ok(result),
        Err(LintError::Parse(e)) => {
            let issues = [e.to_diagnostic()];
            match format {
                Format::Json => {
                    let out = serde_json::json!({ "ok": false, "issues": issues });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Pretty | Format::Short => {
                    report_to_stderr(source, file, &issues, format, no_path)
                }
            }
            process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Diagnostics for commands whose stdout carries data.
fn report_to_stderr(
    source: &str,
    file: &str,
    issues: &[Diagnostic],
    format: Format,
    no_path: bool,
) {
    match format {
        Format::Short => {
            let index = diag::LineIndex::new(source);
            for d in issues {
                eprintln!("{}", render::short_line(source, file, d, &index, no_path));
            }
        }
        _ => {
            render_diagnostics_pretty(source, file, issues);
            print_summary(issues);
        }
    }
}

/// Exit with code 1 if any diagnostic is an error.
/// Warnings do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics.iter().any(Diagnostic::is_error) {
        process::exit(1);
    }
}

//! Generates the diagnostic tables from `spec/diagnostics.jsonc`.
//!
//! Three files land in `OUT_DIR`:
//! - `generated_codes.rs`: one `pub const` per catalogue entry
//! - `generated_explain.rs`: `match` from ID to long description
//! - `generated_severity.rs`: `match` from ID to default severity

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sfz_lint_jsonc_strip::strip_jsonc;

const CATALOGUE: &str = "spec/diagnostics.jsonc";

#[derive(Deserialize)]
struct Catalogue {
    diagnostics: Vec<Entry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    id: String,
    const_name: String,
    severity: String,
    summary: String,
    description: String,
}

impl Entry {
    fn severity_path(&self) -> &'static str {
        match self.severity.as_str() {
            "error" => "Severity::Error",
            "warn" => "Severity::Warn",
            other => panic!("{}: unknown severity '{other}'", self.id),
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed={CATALOGUE}");

    let raw = fs::read_to_string(CATALOGUE).unwrap_or_else(|e| panic!("reading {CATALOGUE}: {e}"));
    let catalogue: Catalogue = serde_json::from_str(&strip_jsonc(&raw))
        .unwrap_or_else(|e| panic!("parsing {CATALOGUE}: {e}"));
    check(&catalogue.diagnostics);

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    write(&out, "generated_codes.rs", &render_codes(&catalogue.diagnostics));
    write(
        &out,
        "generated_explain.rs",
        &render_match(&catalogue.diagnostics, |e| {
            format!("Some(\"{}\")", e.description.escape_default())
        }),
    );
    write(
        &out,
        "generated_severity.rs",
        &render_match(&catalogue.diagnostics, |e| format!("Some({})", e.severity_path())),
    );
}

/// IDs look like `SFZ0000`; IDs and constant names are unique.
fn check(entries: &[Entry]) {
    let mut ids = BTreeSet::new();
    let mut names = BTreeSet::new();
    for e in entries {
        let digits = e.id.strip_prefix("SFZ").unwrap_or_default();
        assert!(
            digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()),
            "malformed diagnostic id '{}'",
            e.id
        );
        let screaming = e.const_name.starts_with(|c: char| c.is_ascii_uppercase())
            && e.const_name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        assert!(screaming, "{}: constName '{}' is not SCREAMING_SNAKE_CASE", e.id, e.const_name);
        assert!(ids.insert(e.id.as_str()), "duplicate id {}", e.id);
        assert!(names.insert(e.const_name.as_str()), "duplicate constName {}", e.const_name);
        e.severity_path();
    }
}

fn render_codes(entries: &[Entry]) -> String {
    let mut out = format!("// Generated from {CATALOGUE}. Do not edit.\n");
    for e in entries {
        out.push_str(&format!(
            "\n/// {}\npub const {}: &str = \"{}\";\n",
            e.summary, e.const_name, e.id
        ));
    }
    out
}

fn render_match(entries: &[Entry], arm: impl Fn(&Entry) -> String) -> String {
    let mut out = String::from("match id {\n");
    for e in entries {
        out.push_str(&format!("    \"{}\" => {},\n", e.id, arm(e)));
    }
    out.push_str("    _ => None,\n}\n");
    out
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap_or_else(|e| panic!("writing {name}: {e}"));
}

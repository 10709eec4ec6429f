//! Rendering a document and parsing the output must reproduce the same
//! header/opcode structure with value-equal values.

mod common;

use common::lint;
use sfz_lint_core::{Document, EmitConfig, Value, emit_sfz};

fn structure(doc: &Document) -> Vec<(String, Vec<(String, Value)>)> {
    doc.headers
        .iter()
        .map(|h| {
            (
                h.kind.clone(),
                h.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            )
        })
        .collect()
}

fn assert_round_trip(input: &str) {
    let first = lint(input).document;
    let text = emit_sfz(&first, &EmitConfig::default());
    let second = lint(&text).document;
    assert_eq!(structure(&first), structure(&second), "rendered:\n{text}");
    assert_eq!(first.includes, second.includes, "rendered:\n{text}");
}

#[test]
fn simple_instrument() {
    assert_round_trip(
        "<control>\ndefault_path=samples/\n<global>\nvolume=-3\n<group>\nlovel=1 hivel=64\n<region>\nsample=kick.wav key=36\n",
    );
}

#[test]
fn notes_floats_and_spaces() {
    assert_round_trip("<region>\nlokey=c#3 hikey=Db4 pitch_keycenter=c4\nvolume=-6.0 pan=0.25\nsample=out of my head.wav\n");
}

#[test]
fn strings_that_look_like_other_things() {
    assert_round_trip(
        "<region>\nsample=\"60\"\nlabel_cc1=\"c4\"\nlabel_cc2=\"$NOT_A_VAR\"\nlabel_cc3=\"  padded  \"\nlabel_cc4=\"a=b\"\nlabel_cc5=\"\"\n",
    );
}

#[test]
fn inner_quotes_keep_a_leading_sigil_literal() {
    let input = "<region>\nsample=\"$X\" \"c4\"\n";
    let first = lint(input);
    assert!(first.issues.is_empty(), "{:?}", first.issues);
    let text = emit_sfz(&first.document, &EmitConfig::default());
    assert_eq!(text, "<region>\nsample=\"$X\" \"c4\"\n");
    let second = lint(&text);
    assert!(second.issues.is_empty(), "{:?}", second.issues);
    assert_round_trip(input);
}

#[test]
fn macros_are_expanded_in_output() {
    let input = "#define $KEY 48\n#include \"shared.sfz\"\n<region>\nkey=$KEY\n";
    let doc = lint(input).document;
    let text = emit_sfz(&doc, &EmitConfig::default());
    assert_eq!(text, "#include \"shared.sfz\"\n<region>\nkey=48\n");
    assert_round_trip(input);
}

#[test]
fn duplicates_collapse_to_last_value() {
    let doc = lint("<region>\nvolume=1\npan=3\nvolume=2\n").document;
    let text = emit_sfz(&doc, &EmitConfig::default());
    assert_eq!(text, "<region>\nvolume=2\npan=3\n");
}

#[test]
fn display_truncates_long_documents() {
    let mut input = String::from("<group>\n");
    for i in 0..30 {
        input.push_str(&format!("<region>\nkey={i}\n"));
    }
    let doc = lint(&input).document;
    let shown = doc.to_string();
    assert_eq!(shown.lines().count(), 21);
    assert!(shown.ends_with("...\n"));
    let full = emit_sfz(&doc, &EmitConfig::default());
    assert_eq!(full.lines().count(), 61);
}

//! The document model produced by the builder.

use crate::grammar::emit::{DEFAULT_CUTOFF, EmitConfig, emit_sfz};
use crate::literal::Value;
use serde::{Serialize, Serializer};
use sfz_lint_diagnostics::Span;
use sfz_lint_spec_tables::{VersionTag, header_meta};
use std::collections::BTreeMap;
use std::fmt;

/// One section of an SFZ file and the opcodes assigned under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    /// Header name without brackets (`region`, `group`, ...).
    pub kind: String,
    /// Version that introduced this header kind; `None` for unknown kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionTag>,
    /// Span of the header name in the source.
    pub span: Span,
    #[serde(serialize_with = "serialize_ordered")]
    opcodes: Vec<(String, Value)>,
}

impl Header {
    /// Open an empty header; the version comes from the header table.
    pub fn new(kind: impl Into<String>, span: Span) -> Self {
        let kind = kind.into();
        Self {
            version: header_meta(&kind).map(|m| m.version),
            kind,
            span,
            opcodes: Vec::new(),
        }
    }

    /// Value of an opcode, if assigned.
    pub fn get(&self, opcode: &str) -> Option<&Value> {
        self.opcodes.iter().find(|(k, _)| k == opcode).map(|(_, v)| v)
    }

    /// Whether `opcode` has been assigned.
    pub fn contains(&self, opcode: &str) -> bool {
        self.get(opcode).is_some()
    }

    /// Assign an opcode. An existing assignment is replaced in place and
    /// its old value returned.
    pub fn insert(&mut self, opcode: impl Into<String>, value: Value) -> Option<Value> {
        let opcode = opcode.into();
        match self.opcodes.iter_mut().find(|(k, _)| *k == opcode) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.opcodes.push((opcode, value));
                None
            }
        }
    }

    /// Opcodes in first-assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.opcodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct opcodes.
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    /// Whether no opcodes are assigned.
    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }
}

fn serialize_ordered<S: Serializer>(opcodes: &[(String, Value)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(opcodes.iter().map(|(k, v)| (k, v)))
}

/// A validated SFZ document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Headers in source order.
    pub headers: Vec<Header>,
    /// `#define` bindings by bare name.
    pub defines: BTreeMap<String, Value>,
    /// `#include` paths in encounter order.
    pub includes: Vec<String>,
}

impl Document {
    /// The `<region>` headers.
    pub fn regions(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter().filter(|h| h.kind == "region")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit_sfz(
            self,
            &EmitConfig {
                cutoff: Some(DEFAULT_CUTOFF),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut h = Header::new("region", Span::default());
        assert!(h.insert("volume", Value::Int(1)).is_none());
        h.insert("pan", Value::Int(0));
        let old = h.insert("volume", Value::Int(2));
        assert_eq!(old, Some(Value::Int(1)));
        let keys: Vec<_> = h.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["volume", "pan"]);
        assert_eq!(h.get("volume"), Some(&Value::Int(2)));
    }

    #[test]
    fn header_version_from_table() {
        assert_eq!(Header::new("master", Span::default()).version, Some(VersionTag::Aria));
        assert_eq!(Header::new("bogus", Span::default()).version, None);
    }

    #[test]
    fn serializes_opcodes_as_ordered_object() {
        let mut h = Header::new("group", Span::new(1, 6));
        h.insert("zeta", Value::Int(1));
        h.insert("alpha", Value::Str("x".into()));
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.contains(r#""opcodes":{"zeta":1,"alpha":"x"}"#), "{json}");
        assert!(json.contains(r#""version":"v1""#), "{json}");
    }

    #[test]
    fn regions_filters_kind() {
        let doc = Document {
            headers: vec![
                Header::new("group", Span::default()),
                Header::new("region", Span::default()),
                Header::new("region", Span::default()),
            ],
            ..Default::default()
        };
        assert_eq!(doc.regions().count(), 2);
    }
}

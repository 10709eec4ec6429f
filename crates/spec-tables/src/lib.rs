//! SFZ opcode specification tables.
//!
//! Defines the declarative records that describe every opcode the linter
//! knows about: nested categories of opcode definitions, each with the spec
//! version that introduced it, optional value metadata (type, bounds, or an
//! option list), alias names, and modulation variants. The records are
//! deserialized from `data/syntax.jsonc` and consumed by the registry in
//! `sfz_lint_core`, which turns them into validators.

#![warn(missing_docs)]

mod headers;
mod version;

pub use headers::{HEADERS, HeaderMeta, header_meta};
pub use version::{UnknownVersion, VersionTag};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Opcode syntax data shipped with the crate.
pub const EMBEDDED_SYNTAX: &str = include_str!("../data/syntax.jsonc");

/// Errors raised while loading specification data or deriving validators
/// from it. All of them mean the data itself is malformed.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The JSONC text did not match the record schema.
    #[error("invalid syntax data: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A numeric bound declares a `min` that is not a number.
    #[error("opcode '{opcode}' declares a non-numeric minimum: {value}")]
    NonNumericMinimum {
        /// Opcode whose metadata is malformed.
        opcode: String,
        /// The offending `min` value as written in the data.
        value: String,
    },
}

/// Expected value type of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Whole numbers (note names count as integers).
    Integer,
    /// Any number, integer or real.
    Float,
    /// Free text.
    String,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Integer => write!(f, "integer"),
            ValueType::Float => write!(f, "integer or float"),
            ValueType::String => write!(f, "string"),
        }
    }
}

/// Top-level container for the opcode syntax data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxSpec {
    /// Root categories, in document order.
    pub categories: Vec<Category>,
}

impl SyntaxSpec {
    /// Parse syntax data from JSONC text (comments and trailing commas allowed).
    pub fn from_jsonc(text: &str) -> Result<Self, SpecError> {
        let stripped = sfz_lint_jsonc_strip::strip_jsonc(text);
        Ok(serde_json::from_str(&stripped)?)
    }

    /// Parse the syntax data embedded in this crate.
    pub fn embedded() -> Result<Self, SpecError> {
        Self::from_jsonc(EMBEDDED_SYNTAX)
    }

    /// Total number of opcode definitions, nested categories and modulation
    /// variants included. Aliases are not counted.
    pub fn opcode_count(&self) -> usize {
        fn count_category(c: &Category) -> usize {
            c.opcodes.iter().map(count_opcode).sum::<usize>()
                + c.types.iter().map(count_category).sum::<usize>()
        }
        fn count_opcode(o: &OpcodeDef) -> usize {
            1 + o
                .modulation
                .values()
                .map(|m| match m {
                    ModulationSet::Variants(v) => v.iter().map(count_opcode).sum(),
                    ModulationSet::Supported(_) => 0,
                })
                .sum::<usize>()
        }
        self.categories.iter().map(count_category).sum()
    }
}

/// A named group of opcodes, possibly with nested sub-categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category name (e.g., `"Sound Source"`).
    pub name: String,
    /// Opcodes declared directly in this category.
    #[serde(default)]
    pub opcodes: Vec<OpcodeDef>,
    /// Nested sub-categories.
    #[serde(default)]
    pub types: Vec<Category>,
}

/// Declaration of a single opcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpcodeDef {
    /// Opcode name; numeric indices are written as `N`, `X`, `Y`.
    pub name: String,
    /// Spec version that introduced the opcode.
    pub version: VersionTag,
    /// Value metadata; absent means any value is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueMeta>,
    /// Alternate names that forward to this opcode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<AliasDef>,
    /// Modulation variants keyed by modulation kind (e.g., `"midi_cc"`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modulation: BTreeMap<String, ModulationSet>,
}

/// Value constraints for an opcode.
///
/// `min` and `max` stay as raw JSON values: the data sometimes writes a
/// symbolic upper bound such as `"SampleRate / 2"`, and the registry decides
/// what a non-numeric bound means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueMeta {
    /// Expected value type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<ValueType>,
    /// Lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,
    /// Upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,
    /// Default value, for documentation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Unit label, for documentation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Enumerated options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionDef>>,
}

/// One allowed keyword of an enumerated opcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDef {
    /// The keyword as written in SFZ files.
    pub name: String,
}

/// An alternate opcode name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasDef {
    /// The alias name.
    pub name: String,
    /// Spec version that introduced the alias.
    pub version: VersionTag,
}

/// Modulation data for one modulation kind.
///
/// Some kinds only mark that modulation is supported (`"envelope": true`);
/// only the variant lists produce opcodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModulationSet {
    /// Opcodes that modulate the parent opcode.
    Variants(Vec<OpcodeDef>),
    /// Support marker without opcode definitions.
    Supported(bool),
}

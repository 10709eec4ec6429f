//! The opcode specification registry.
//!
//! Flattens the declarative [`SyntaxSpec`] into a name → [`SpecEntry`] map:
//! every opcode, every alias, and every modulation variant gets its own
//! entry, with a [`Rule`] derived from the value metadata. Hand-written
//! overrides are layered on top.

/// Opcode-name normalization (`eq3_bwcc25` → `eqN_bwccX`).
pub mod opcode_name;
/// Validator rules.
pub mod rules;
/// Allowed-version sets.
pub mod version;

pub use opcode_name::{InvalidIndex, NormalizedName};
pub use rules::{CheckContext, Finding, Rule};
pub use version::VersionSet;

use crate::literal::Value;
use serde_json::Value as JsonValue;
use sfz_lint_diagnostics::codes;
use sfz_lint_spec_tables::{ModulationSet, OpcodeDef, SpecError, SyntaxSpec, ValueType, VersionTag};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// What a modulation entry modulates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modulation {
    /// Canonical opcode being modulated.
    pub target: String,
    /// Modulation kind from the syntax data (`midi_cc`, ...).
    pub kind: String,
}

/// Everything the validator knows about one opcode name.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecEntry {
    /// Registry name (with `N`/`X`/`Y` placeholders).
    pub name: String,
    /// Version that introduced the name.
    pub version: VersionTag,
    /// Expected value type; `None` skips the type check.
    pub value_type: Option<ValueType>,
    /// Value rule.
    pub rule: Rule,
    /// For aliases, the canonical opcode.
    pub alias_of: Option<String>,
    /// For modulation variants, what they modulate.
    pub modulation: Option<Modulation>,
}

impl SpecEntry {
    fn new(name: &str, version: VersionTag, value_type: Option<ValueType>, rule: Rule) -> Self {
        Self {
            name: name.to_string(),
            version,
            value_type,
            rule,
            alias_of: None,
            modulation: None,
        }
    }

    /// Type check, then the rule. A type mismatch suppresses the rule.
    pub fn check(&self, value: &Value, ctx: &CheckContext<'_>) -> Vec<Finding> {
        if let Some(expected) = self.value_type
            && !type_accepts(expected, value)
        {
            return vec![Finding::error(
                codes::WRONG_TYPE,
                format!("expected {expected} got {value} ({})", ctx.opcode),
            )];
        }
        self.rule.check(value, ctx)
    }
}

fn type_accepts(expected: ValueType, value: &Value) -> bool {
    match expected {
        ValueType::Integer => matches!(value, Value::Int(_) | Value::Note(_)),
        ValueType::Float => !value.is_str(),
        ValueType::String => value.is_str(),
    }
}

/// How an opcode name as written maps onto the registry.
#[derive(Debug, Clone)]
pub struct Resolution<'r> {
    /// The matching entry, if any.
    pub entry: Option<&'r SpecEntry>,
    /// The normalized name (equal to the written name when it matched
    /// directly).
    pub normalized: String,
    /// Set when the entry was found only through an alternative CC spelling;
    /// holds the spelling that matched.
    pub cc_alias: Option<String>,
}

/// Name → entry map for every known opcode.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, SpecEntry>,
}

static GLOBAL: OnceLock<Result<Registry, SpecError>> = OnceLock::new();

impl Registry {
    /// Build from syntax data and apply [`default_overrides`].
    pub fn build(spec: &SyntaxSpec) -> Result<Self, SpecError> {
        Ok(Self::from_spec(spec)?.with_overrides(default_overrides()))
    }

    /// Build from syntax data alone. A non-numeric `min` aborts construction.
    pub fn from_spec(spec: &SyntaxSpec) -> Result<Self, SpecError> {
        let mut registry = Registry::default();
        let mut stack: Vec<&sfz_lint_spec_tables::Category> =
            spec.categories.iter().rev().collect();
        while let Some(category) = stack.pop() {
            for def in &category.opcodes {
                registry.add_opcode(def, None)?;
            }
            stack.extend(category.types.iter().rev());
        }
        Ok(registry)
    }

    /// Replace or add entries.
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = SpecEntry>) -> Self {
        for entry in overrides {
            self.entries.insert(entry.name.clone(), entry);
        }
        self
    }

    /// The process-wide registry built from the embedded syntax data.
    ///
    /// Built on first use; later calls return the same instance (or the same
    /// construction error).
    pub fn global() -> Result<&'static Registry, &'static SpecError> {
        GLOBAL
            .get_or_init(|| SyntaxSpec::embedded().and_then(|spec| Registry::build(&spec)))
            .as_ref()
    }

    fn add_opcode(
        &mut self,
        def: &OpcodeDef,
        modulation: Option<Modulation>,
    ) -> Result<(), SpecError> {
        let (value_type, rule) = derive_rule(def)?;
        let mut entry = SpecEntry::new(&def.name, def.version, value_type, rule);
        entry.modulation = modulation;
        self.entries.insert(def.name.clone(), entry);

        for alias in &def.alias {
            let rule = Rule::Alias(def.name.clone());
            let mut entry = SpecEntry::new(&alias.name, alias.version, None, rule);
            entry.alias_of = Some(def.name.clone());
            self.entries.insert(alias.name.clone(), entry);
        }

        for (kind, set) in &def.modulation {
            // Checkmark-only kinds carry no opcodes.
            let ModulationSet::Variants(variants) = set else { continue };
            for variant in variants {
                self.add_opcode(
                    variant,
                    Some(Modulation {
                        target: def.name.clone(),
                        kind: kind.clone(),
                    }),
                )?;
            }
        }
        Ok(())
    }

    /// Exact lookup by registry name.
    pub fn lookup(&self, name: &str) -> Option<&SpecEntry> {
        self.entries.get(name)
    }

    /// Map a written opcode name to an entry: exact name, then the
    /// normalized name, then alternative CC spellings of the normalized name.
    pub fn resolve_name(&self, raw: &str) -> Result<Resolution<'_>, InvalidIndex> {
        if let Some(entry) = self.lookup(raw) {
            return Ok(Resolution {
                entry: Some(entry),
                normalized: raw.to_string(),
                cc_alias: None,
            });
        }
        let normalized = opcode_name::normalize(raw)?.name;
        if let Some(entry) = self.lookup(&normalized) {
            return Ok(Resolution {
                entry: Some(entry),
                normalized,
                cc_alias: None,
            });
        }
        for alt in opcode_name::cc_alternatives(&normalized) {
            if let Some(entry) = self.lookup(&alt) {
                return Ok(Resolution {
                    entry: Some(entry),
                    normalized,
                    cc_alias: Some(alt),
                });
            }
        }
        Ok(Resolution {
            entry: None,
            normalized,
            cc_alias: None,
        })
    }

    /// All entries, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &SpecEntry> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entries whose syntax data is known to be incomplete.
///
/// `tune` allows ±2400 cents under ARIA but only ±100 in SFZ v1. `type` is
/// the ARIA effect type, a free string.
pub fn default_overrides() -> Vec<SpecEntry> {
    vec![
        SpecEntry::new(
            "tune",
            VersionTag::V1,
            Some(ValueType::Integer),
            Rule::Versioned {
                default: Box::new(Rule::Range(-100.0, 100.0)),
                overrides: vec![(VersionTag::Aria, Rule::Range(-2400.0, 2400.0))],
            },
        ),
        SpecEntry::new("type", VersionTag::Aria, Some(ValueType::String), Rule::Any),
    ]
}

fn derive_rule(def: &OpcodeDef) -> Result<(Option<ValueType>, Rule), SpecError> {
    let Some(meta) = &def.value else {
        return Ok((None, Rule::Any));
    };
    let rule = if let Some(min) = &meta.min {
        let low = min.as_f64().ok_or_else(|| SpecError::NonNumericMinimum {
            opcode: def.name.clone(),
            value: min.to_string(),
        })?;
        // A symbolic maximum ("SampleRate / 2") leaves only the lower bound.
        match meta.max.as_ref().and_then(JsonValue::as_f64) {
            Some(high) => Rule::Range(low, high),
            None => Rule::Minimum(low),
        }
    } else if let Some(options) = &meta.options {
        Rule::Choice(options.iter().map(|o| o.name.clone()).collect())
    } else {
        Rule::Any
    };
    Ok((meta.type_name, rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: &str) -> SyntaxSpec {
        SyntaxSpec::from_jsonc(json).unwrap()
    }

    #[test]
    fn derives_rules_from_metadata() {
        let registry = Registry::from_spec(&spec(
            r#"{ "categories": [ { "name": "c", "opcodes": [
                { "name": "ranged", "version": "SFZ v1", "value": { "type_name": "float", "min": 0, "max": 1 } },
                { "name": "floor", "version": "SFZ v1", "value": { "type_name": "float", "min": 0 } },
                { "name": "symbolic", "version": "SFZ v1", "value": { "min": 0, "max": "SampleRate / 2" } },
                { "name": "picked", "version": "SFZ v2", "value": { "options": [ { "name": "a" }, { "name": "b" } ] } },
                { "name": "ceiling_only", "version": "SFZ v1", "value": { "max": 5 } },
                { "name": "bare", "version": "ARIA" }
            ] } ] }"#,
        ))
        .unwrap();
        assert_eq!(registry.lookup("ranged").unwrap().rule, Rule::Range(0.0, 1.0));
        assert_eq!(registry.lookup("floor").unwrap().rule, Rule::Minimum(0.0));
        assert_eq!(registry.lookup("symbolic").unwrap().rule, Rule::Minimum(0.0));
        assert_eq!(
            registry.lookup("picked").unwrap().rule,
            Rule::Choice(vec!["a".into(), "b".into()])
        );
        assert_eq!(registry.lookup("ceiling_only").unwrap().rule, Rule::Any);
        let bare = registry.lookup("bare").unwrap();
        assert_eq!(bare.rule, Rule::Any);
        assert_eq!(bare.version, VersionTag::Aria);
        assert_eq!(bare.value_type, None);
    }

    #[test]
    fn non_numeric_minimum_is_fatal() {
        let err = Registry::from_spec(&spec(
            r#"{ "categories": [ { "name": "c", "opcodes": [
                { "name": "broken", "version": "SFZ v1", "value": { "min": "zero", "max": 1 } }
            ] } ] }"#,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            SpecError::NonNumericMinimum { ref opcode, .. } if opcode == "broken"
        ));
    }

    #[test]
    fn aliases_and_modulations_get_entries() {
        let registry = Registry::from_spec(&spec(
            r#"{ "categories": [ { "name": "c", "types": [ { "name": "nested", "opcodes": [
                { "name": "cutoff", "version": "SFZ v1",
                  "alias": [ { "name": "fil_cutoff", "version": "ARIA" } ],
                  "modulation": {
                    "midi_cc": [ { "name": "cutoff_ccN", "version": "SFZ v1",
                                   "alias": [ { "name": "cutoff_onccN", "version": "SFZ v2" } ] } ],
                    "envelope": true
                  } }
            ] } ] } ] }"#,
        ))
        .unwrap();
        assert_eq!(registry.len(), 4);
        let alias = registry.lookup("fil_cutoff").unwrap();
        assert_eq!(alias.rule, Rule::Alias("cutoff".into()));
        assert_eq!(alias.alias_of.as_deref(), Some("cutoff"));
        assert_eq!(alias.version, VersionTag::Aria);
        let cc = registry.lookup("cutoff_ccN").unwrap();
        assert_eq!(
            cc.modulation,
            Some(Modulation {
                target: "cutoff".into(),
                kind: "midi_cc".into()
            })
        );
        assert_eq!(
            registry.lookup("cutoff_onccN").unwrap().rule,
            Rule::Alias("cutoff_ccN".into())
        );
    }

    #[test]
    fn overrides_take_precedence() {
        let registry = Registry::build(&spec(
            r#"{ "categories": [ { "name": "c", "opcodes": [
                { "name": "tune", "version": "SFZ v1", "value": { "type_name": "integer", "min": -100, "max": 100 } }
            ] } ] }"#,
        ))
        .unwrap();
        assert!(matches!(registry.lookup("tune").unwrap().rule, Rule::Versioned { .. }));
        assert_eq!(registry.lookup("type").unwrap().version, VersionTag::Aria);
    }

    #[test]
    fn resolve_name_stages() {
        let registry = Registry::global().unwrap();
        let direct = registry.resolve_name("volume").unwrap();
        assert_eq!(direct.entry.unwrap().name, "volume");
        assert!(direct.cc_alias.is_none());

        let indexed = registry.resolve_name("eq3_bwcc25").unwrap();
        assert_eq!(indexed.normalized, "eqN_bwccX");
        assert!(indexed.entry.is_some());

        let cc = registry.resolve_name("amplitude_cc7").unwrap();
        assert_eq!(cc.normalized, "amplitude_ccN");
        assert_eq!(cc.cc_alias.as_deref(), Some("amplitude_onccN"));

        let unknown = registry.resolve_name("frobnicate").unwrap();
        assert!(unknown.entry.is_none());

        assert!(registry.resolve_name("a1_b2_c3_d4").is_err());
    }

    #[test]
    fn global_is_built_once() {
        let a = Registry::global().unwrap();
        let b = Registry::global().unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(a.len() > 100);
    }
}

//! Integrity checks on the registry built from the embedded syntax data.

mod common;

use common::REGISTRY;
use sfz_lint_core::registry::opcode_name;
use sfz_lint_core::{Registry, Rule, VersionSet};
use sfz_lint_spec_tables::{ValueType, VersionTag};

#[test]
fn global_registry_matches_a_fresh_build() {
    let global = Registry::global().unwrap();
    assert_eq!(global.len(), REGISTRY.len());
    assert!(global.iter().map(|e| &e.name).eq(REGISTRY.iter().map(|e| &e.name)));
}

#[test]
fn every_alias_points_at_a_known_entry() {
    for entry in REGISTRY.iter() {
        if let Rule::Alias(target) = &entry.rule {
            let canonical = REGISTRY
                .lookup(target)
                .unwrap_or_else(|| panic!("{} aliases unknown {target}", entry.name));
            assert!(!matches!(canonical.rule, Rule::Alias(_)), "{} chains aliases", entry.name);
            assert_eq!(entry.alias_of.as_deref(), Some(target.as_str()));
        }
    }
}

#[test]
fn every_modulation_targets_a_known_entry() {
    for entry in REGISTRY.iter() {
        if let Some(m) = &entry.modulation {
            assert!(
                REGISTRY.lookup(&m.target).is_some(),
                "{} modulates unknown {}",
                entry.name,
                m.target
            );
        }
    }
}

#[test]
fn registry_names_are_already_normalized() {
    // A registered name must map to itself, otherwise it could never be
    // reached from a concrete opcode.
    for entry in REGISTRY.iter() {
        let n = opcode_name::normalize(&entry.name)
            .unwrap_or_else(|e| panic!("{}: {e}", entry.name));
        assert!(
            n.name == entry.name || REGISTRY.lookup(&n.name).is_some(),
            "{} normalizes to unregistered {}",
            entry.name,
            n.name
        );
    }
}

#[test]
fn overrides_replace_derived_entries() {
    let tune = REGISTRY.lookup("tune").unwrap();
    assert_eq!(tune.value_type, Some(ValueType::Integer));
    assert_eq!(tune.rule.select(&VersionSet::new([VersionTag::V1])), &Rule::Range(-100.0, 100.0));
    assert_eq!(
        tune.rule.select(&VersionSet::new([VersionTag::Aria])),
        &Rule::Range(-2400.0, 2400.0)
    );
    let effect_type = REGISTRY.lookup("type").unwrap();
    assert_eq!(effect_type.version, VersionTag::Aria);
    assert_eq!(effect_type.rule, Rule::Any);
}

#[test]
fn symbolic_maximum_becomes_minimum_rule() {
    assert_eq!(REGISTRY.lookup("cutoff").unwrap().rule, Rule::Minimum(0.0));
}

#[test]
fn every_version_tag_is_used() {
    for tag in VersionTag::ALL {
        assert!(REGISTRY.iter().any(|e| e.version == tag), "no opcode tagged {tag}");
    }
}

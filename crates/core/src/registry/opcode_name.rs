//! Opcode-name normalization.
//!
//! Concrete names carry numeric indices (`eq3_bwcc25`); the registry stores
//! them with placeholders (`eqN_bwccX`). Variables and hints fold further:
//! `var02_cutoff` → `varNN_target`, `hint_ram_based` → `hint_*`.

use regex_lite::Regex;
use std::sync::LazyLock;

static INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]*)(\d+)").expect("index pattern is valid"));

/// Placeholders substituted for numeric fragments, in order.
const PLACEHOLDERS: [char; 3] = ['N', 'X', 'Y'];

/// Fragments whose digit is part of the opcode name, not an index.
const FIXED_FRAGMENTS: [&str; 4] = ["vel2", "cutoff2", "resonance2", "wave2"];

/// Spellings players accept interchangeably for MIDI CC modulation.
/// Order matters: the first spelling found in a name is the one replaced.
const CC_SPELLINGS: [&str; 3] = ["_oncc", "_cc", "cc"];

/// Result of normalizing a concrete opcode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    /// Registry form of the name (`eqN_bwccX`, `varNN_target`, `hint_*`).
    pub name: String,
    /// Numeric indices by placeholder, in order of appearance.
    pub indices: Vec<(char, u64)>,
    /// For variables and hints, the remainder the name points at
    /// (`cutoff` for `var02_cutoff`).
    pub target: Option<String>,
}

/// More numeric fragments than there are placeholders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{raw} is not a valid opcode: unexpected number at {fragment}")]
pub struct InvalidIndex {
    /// The name as written.
    pub raw: String,
    /// The surplus fragment.
    pub fragment: String,
}

/// Replace numeric fragments with placeholders and fold variable and hint
/// names.
pub fn normalize(raw: &str) -> Result<NormalizedName, InvalidIndex> {
    let mut name = String::with_capacity(raw.len());
    let mut indices = Vec::new();
    let mut last = 0;
    for caps in INDEX_RE.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        name.push_str(&raw[last..whole.start()]);
        last = whole.end();
        if FIXED_FRAGMENTS.contains(&whole.as_str()) {
            name.push_str(whole.as_str());
            continue;
        }
        let Some(&placeholder) = PLACEHOLDERS.get(indices.len()) else {
            return Err(InvalidIndex {
                raw: raw.to_string(),
                fragment: whole.as_str().to_string(),
            });
        };
        name.push_str(&caps[1]);
        name.push(placeholder);
        indices.push((placeholder, caps[2].parse().unwrap_or(u64::MAX)));
    }
    name.push_str(&raw[last..]);

    let mut target = None;
    if name.starts_with("varN") {
        // Four variable opcodes keep their own registry names.
        if matches!(name.get(..8), Some("varN_mod" | "varN_onc" | "varN_cur")) {
            name = format!("varNN{}", &name[4..]);
        } else {
            target = Some(name.get(5..).unwrap_or_default().replace('X', "N"));
            name = "varNN_target".to_string();
        }
    } else if let Some(rest) = name.strip_prefix("hint_") {
        target = Some(rest.to_string());
        name = "hint_*".to_string();
    }

    Ok(NormalizedName {
        name,
        indices,
        target,
    })
}

/// Alternative CC spellings of `name`, in the order they should be tried.
pub fn cc_alternatives(name: &str) -> Vec<String> {
    let Some(found) = CC_SPELLINGS.iter().find(|s| name.contains(*s)) else {
        return Vec::new();
    };
    CC_SPELLINGS
        .iter()
        .filter(|alt| *alt != found)
        .map(|alt| name.replace(found, alt))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_become_placeholders() {
        let n = normalize("eq3_bwcc25").unwrap();
        assert_eq!(n.name, "eqN_bwccX");
        assert_eq!(n.indices, vec![('N', 3), ('X', 25)]);
        assert_eq!(normalize("amp_velcurve_64").unwrap().name, "amp_velcurve_N");
    }

    #[test]
    fn fixed_fragments_are_kept() {
        assert_eq!(normalize("ampeg_vel2sustain").unwrap().name, "ampeg_vel2sustain");
        assert_eq!(normalize("cutoff2").unwrap().name, "cutoff2");
        assert_eq!(normalize("lfo1_wave2").unwrap().name, "lfoN_wave2");
        assert_eq!(normalize("eq2_vel2gain").unwrap().name, "eqN_vel2gain");
    }

    #[test]
    fn plain_names_are_unchanged() {
        let n = normalize("volume").unwrap();
        assert_eq!(n.name, "volume");
        assert!(n.indices.is_empty());
    }

    #[test]
    fn too_many_indices() {
        let err = normalize("a1_b2_c3_d4").unwrap_err();
        assert_eq!(err.fragment, "d4");
        assert!(err.to_string().contains("not a valid opcode"));
    }

    #[test]
    fn variables_fold_to_target() {
        let n = normalize("var02_cutoff").unwrap();
        assert_eq!(n.name, "varNN_target");
        assert_eq!(n.target.as_deref(), Some("cutoff"));
        assert_eq!(normalize("var01_eq2_gain").unwrap().target.as_deref(), Some("eqN_gain"));
        assert_eq!(normalize("var01_mod").unwrap().name, "varNN_mod");
        assert_eq!(normalize("var01_oncc7").unwrap().name, "varNN_onccX");
        assert_eq!(normalize("var01_curvecc7").unwrap().name, "varNN_curveccX");
    }

    #[test]
    fn hints_fold() {
        let n = normalize("hint_ram_based").unwrap();
        assert_eq!(n.name, "hint_*");
        assert_eq!(n.target.as_deref(), Some("ram_based"));
    }

    #[test]
    fn cc_spelling_alternatives() {
        assert_eq!(
            cc_alternatives("amplitude_ccN"),
            vec!["amplitude_onccN".to_string(), "amplitudeccN".to_string()]
        );
        assert_eq!(
            cc_alternatives("pan_onccN"),
            vec!["pan_ccN".to_string(), "panccN".to_string()]
        );
        assert_eq!(
            cc_alternatives("ampeg_attackccN"),
            vec!["ampeg_attack_onccN".to_string(), "ampeg_attack_ccN".to_string()]
        );
        assert!(cc_alternatives("volume").is_empty());
    }
}

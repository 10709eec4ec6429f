//! Lint configuration for sfz-lint.

use sfz_lint_spec_tables::VersionTag;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a lint configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON deserialization failed.
    #[error("invalid config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is not acceptable.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Settings that steer a lint run.
///
/// Every field is optional in the JSON form; an empty object is the default
/// configuration (all versions allowed, unknown opcodes silent).
///
/// # Example
/// ```
/// use sfz_lint_config::{LintConfig, load_config_from_str};
/// use sfz_lint_spec_tables::VersionTag;
///
/// let cfg = load_config_from_str(r#"{ "spec_versions": ["v1", "aria"] }"#).unwrap();
/// assert_eq!(cfg.spec_versions, Some(vec![VersionTag::V1, VersionTag::Aria]));
/// assert!(!cfg.warn_unknown_opcodes);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Allowed spec versions. `None` or an empty list means unrestricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_versions: Option<Vec<VersionTag>>,
    /// Report opcodes missing from the registry as warnings.
    pub warn_unknown_opcodes: bool,
    /// Line limit for rendered documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_cutoff: Option<usize>,
}

impl LintConfig {
    /// The allowed versions as a slice (empty when unrestricted).
    pub fn versions(&self) -> &[VersionTag] {
        self.spec_versions.as_deref().unwrap_or(&[])
    }

    /// Overlay command-line choices on top of file values.
    ///
    /// A non-empty `versions` replaces the configured list; `warn_unknown`
    /// can only switch the check on.
    pub fn merge_overrides(
        mut self,
        versions: &[VersionTag],
        warn_unknown: bool,
        cutoff: Option<usize>,
    ) -> Self {
        if !versions.is_empty() {
            self.spec_versions = Some(versions.to_vec());
        }
        self.warn_unknown_opcodes |= warn_unknown;
        if cutoff.is_some() {
            self.render_cutoff = cutoff;
        }
        self
    }
}

/// Load and validate a [`LintConfig`] from a JSON string.
///
/// Performs structural validation after deserialization:
/// - `spec_versions` must not name the same tag twice
/// - `render_cutoff` must be > 0 (if present)
pub fn load_config_from_str(s: &str) -> Result<LintConfig, ConfigError> {
    let config: LintConfig = serde_json::from_str(s)?;

    if let Some(ref versions) = config.spec_versions {
        for (i, tag) in versions.iter().enumerate() {
            if versions[..i].contains(tag) {
                return Err(ConfigError::InvalidField {
                    field: "spec_versions".into(),
                    reason: format!("'{tag}' is listed more than once"),
                });
            }
        }
    }

    if let Some(cutoff) = config.render_cutoff
        && cutoff == 0
    {
        return Err(ConfigError::InvalidField {
            field: "render_cutoff".into(),
            reason: "must be > 0".into(),
        });
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_full_config() {
        let json = r#"{
            "spec_versions": ["v2", "ARIA"],
            "warn_unknown_opcodes": true,
            "render_cutoff": 40
        }"#;
        let cfg = load_config_from_str(json).unwrap();
        assert_eq!(cfg.versions(), &[VersionTag::V2, VersionTag::Aria]);
        assert!(cfg.warn_unknown_opcodes);
        assert_eq!(cfg.render_cutoff, Some(40));
    }

    #[test]
    fn empty_object_is_default() {
        let cfg = load_config_from_str("{}").unwrap();
        assert_eq!(cfg, LintConfig::default());
        assert!(cfg.versions().is_empty());
    }

    #[test]
    fn unknown_version_rejected() {
        let err = load_config_from_str(r#"{ "spec_versions": ["v7"] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
        assert!(err.to_string().contains("v7"), "{err}");
    }

    #[test]
    fn duplicate_version_rejected() {
        let err = load_config_from_str(r#"{ "spec_versions": ["v1", "SFZ v1"] }"#).unwrap_err();
        assert!(
            err.to_string().contains("spec_versions"),
            "error should mention spec_versions: {err}"
        );
    }

    #[test]
    fn zero_cutoff_rejected() {
        let err = load_config_from_str(r#"{ "render_cutoff": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("render_cutoff"), "{err}");
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(load_config_from_str(r#"{ "dpi": 203 }"#).is_err());
    }

    #[test]
    fn overrides_replace_versions_and_enable_checks() {
        let cfg = LintConfig {
            spec_versions: Some(vec![VersionTag::V1]),
            warn_unknown_opcodes: false,
            render_cutoff: Some(10),
        }
        .merge_overrides(&[VersionTag::Aria], true, None);
        assert_eq!(cfg.versions(), &[VersionTag::Aria]);
        assert!(cfg.warn_unknown_opcodes);
        assert_eq!(cfg.render_cutoff, Some(10));

        let untouched = LintConfig::default().merge_overrides(&[], false, Some(5));
        assert!(untouched.spec_versions.is_none());
        assert_eq!(untouched.render_cutoff, Some(5));
    }
}

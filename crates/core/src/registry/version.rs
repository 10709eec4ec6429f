//! Version compatibility: which spec versions a lint run accepts.

use sfz_lint_spec_tables::VersionTag;
use std::fmt;

/// The allowed spec versions for a lint run.
///
/// An empty set means no restriction was configured and every tag is
/// acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet {
    allowed: Vec<VersionTag>,
}

impl VersionSet {
    /// Build a set from the given tags; duplicates are dropped.
    pub fn new(tags: impl IntoIterator<Item = VersionTag>) -> Self {
        let mut allowed = Vec::new();
        for tag in tags {
            if !allowed.contains(&tag) {
                allowed.push(tag);
            }
        }
        Self { allowed }
    }

    /// A set that accepts everything.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Whether no restriction is configured.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty()
    }

    /// The configured tags, in configuration order.
    pub fn tags(&self) -> &[VersionTag] {
        &self.allowed
    }

    /// Headers must be introduced by one of the allowed tags directly.
    /// Unknown header kinds (`None`) are never flagged here.
    pub fn accepts_header(&self, declared: Option<VersionTag>) -> bool {
        match declared {
            Some(tag) => self.is_unrestricted() || self.allowed.contains(&tag),
            None => true,
        }
    }

    /// Opcodes are acceptable when their tag is reachable from the hierarchy
    /// of any allowed tag: a `v1` opcode is fine under `aria`, an `aria`
    /// opcode is not fine under `v1`.
    pub fn accepts_opcode(&self, declared: VersionTag) -> bool {
        self.is_unrestricted() || self.allowed.iter().any(|a| a.includes(declared))
    }
}

impl fmt::Display for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unrestricted() {
            return f.write_str("any version");
        }
        let tags: Vec<&str> = self.allowed.iter().map(|t| t.as_str()).collect();
        write!(f, "[{}]", tags.join(", "))
    }
}

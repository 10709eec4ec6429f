//! Known SFZ section headers.

use crate::VersionTag;

/// Static metadata for a header kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMeta {
    /// Header name without brackets (e.g., `"region"`).
    pub name: &'static str,
    /// Spec version that introduced the header.
    pub version: VersionTag,
    /// Whether the header may appear at most once per file.
    pub single: bool,
}

/// All headers known to the tracked spec versions.
pub const HEADERS: &[HeaderMeta] = &[
    HeaderMeta {
        name: "region",
        version: VersionTag::V1,
        single: false,
    },
    HeaderMeta {
        name: "group",
        version: VersionTag::V1,
        single: false,
    },
    HeaderMeta {
        name: "control",
        version: VersionTag::V2,
        single: true,
    },
    HeaderMeta {
        name: "global",
        version: VersionTag::V2,
        single: true,
    },
    HeaderMeta {
        name: "curve",
        version: VersionTag::V2,
        single: false,
    },
    HeaderMeta {
        name: "effect",
        version: VersionTag::V2,
        single: true,
    },
    HeaderMeta {
        name: "master",
        version: VersionTag::Aria,
        single: false,
    },
    HeaderMeta {
        name: "midi",
        version: VersionTag::Aria,
        single: true,
    },
];

/// Look up a header by name.
pub fn header_meta(name: &str) -> Option<&'static HeaderMeta> {
    HEADERS.iter().find(|h| h.name == name)
}

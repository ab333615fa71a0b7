//! C2 (part 4): the `version_cls` choice — normalizing PEP 440 canonicalization
//! vs. a non-normalizing wrapper that preserves the tag's original casing and
//! prefixes for rendering, per spec §3/§4.2.

use crate::error::Result;
use crate::pep440::Pep440Version;
use std::fmt;
use std::str::FromStr;

/// Which version type a [`crate::config::Configuration`] is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCls {
    /// Apply PEP 440 canonicalization (the default).
    Normalizing,
    /// Preserve the original captured text verbatim for `Display`, while
    /// still exposing PEP 440 structure for scheme bumping.
    NonNormalizing,
}

impl Default for VersionCls {
    fn default() -> Self {
        VersionCls::Normalizing
    }
}

/// A version value produced by parsing a tag's captured body, tagged with
/// which `version_cls` produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionValue {
    Normalized(Pep440Version),
    Raw { raw: String, parsed: Pep440Version },
}

impl VersionValue {
    /// Parse `body` (the regex-captured substring of a tag) according to
    /// `cls`. An empty `body` is only legal for preformatted callers — see
    /// [`crate::tag::parse_tag`].
    pub fn parse(body: &str, cls: VersionCls) -> Result<Self> {
        let parsed: Pep440Version = body.parse()?;
        Ok(match cls {
            VersionCls::Normalizing => VersionValue::Normalized(parsed),
            VersionCls::NonNormalizing => VersionValue::Raw {
                raw: body.to_string(),
                parsed,
            },
        })
    }

    pub fn as_pep440(&self) -> &Pep440Version {
        match self {
            VersionValue::Normalized(v) => v,
            VersionValue::Raw { parsed, .. } => parsed,
        }
    }

    pub fn is_plain_release(&self) -> bool {
        self.as_pep440().is_plain_release()
    }

    /// Strip the local segment (spec §8 boundary: local segments are
    /// stripped before guessing a next version).
    pub fn without_local(&self) -> Pep440Version {
        self.as_pep440().without_local()
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionValue::Normalized(v) => write!(f, "{v}"),
            VersionValue::Raw { raw, .. } => write!(f, "{raw}"),
        }
    }
}

impl FromStr for VersionValue {
    type Err = crate::error::ScmError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        VersionValue::parse(s, VersionCls::Normalizing)
    }
}

//! C2: extracting a version substring from a tag string.

use crate::error::{Result, ScmError};
use crate::version_value::{VersionCls, VersionValue};
use regex::Regex;

/// Default tag regex (spec §4.2/§6): an optional project prefix of word
/// characters and separators, an optional leading `v`/`V` (folded into the
/// captured body, since PEP 440 itself permits it), the version body, and a
/// trailing `+...` build-metadata segment that is discarded.
pub const DEFAULT_TAG_REGEX: &str = r"(?x)
    ^(?:[[:word:]-]+-)?
    (?P<version>
        [vV]?[0-9][^+]*
    )
    (?:\+.*)?$
";

/// Parse a tag string into a [`VersionValue`] using `regex` and `cls`.
///
/// `regex` must expose the version body either as a named group `version`
/// or as the sole unnamed group (spec §3 invariant).
pub fn parse_tag(tag: &str, regex: &Regex, cls: VersionCls) -> Result<VersionValue> {
    let captures = regex
        .captures(tag)
        .ok_or_else(|| ScmError::TagParse(tag.to_string()))?;

    let body = if let Some(m) = captures.name("version") {
        m.as_str()
    } else if captures.len() == 2 {
        captures
            .get(1)
            .ok_or_else(|| ScmError::TagParse(tag.to_string()))?
            .as_str()
    } else {
        return Err(ScmError::Configuration(
            "tag_regex must expose a `version` named group or a single unnamed group".into(),
        ));
    };

    if body.is_empty() {
        return Err(ScmError::TagParse(tag.to_string()));
    }

    VersionValue::parse(body, cls)
}

/// Compile the configured tag regex, surfacing compile failures as
/// [`ScmError::Configuration`] (spec §3 invariant: `tag_regex must compile`).
pub fn compile_tag_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ScmError::Configuration(format!("invalid tag_regex: {e}")))
}

//! C2 (part 2): parsing a bare version body into a [`Pep440Version`].
//!
//! Grounded on the nearest-relative crate's own `pep440::parser`, which
//! anchors an almost identical regex over epoch/release/pre/post/dev/local
//! groups and feeds captures into a builder.

use super::core::{LocalSegment, Pep440Version, PreReleaseLabel};
use crate::error::ScmError;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static PEP440_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?ix)
        ^
        v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?P<pre>
            [-_.]?
            (?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)
            [-_.]?
            (?P<pre_n>[0-9]+)?
        )?
        (?P<post>
            (?:-(?P<post_n1>[0-9]+))
            |
            (?:[-_.]?(?:post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)
        )?
        (?P<dev>
            [-_.]?dev[-_.]?(?P<dev_n>[0-9]+)?
        )?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $
        "#,
    )
    .expect("PEP 440 body regex is a compile-time constant")
});

fn normalize_pre_label(label: &str) -> PreReleaseLabel {
    match label.to_ascii_lowercase().as_str() {
        "alpha" | "a" => PreReleaseLabel::Alpha,
        "beta" | "b" => PreReleaseLabel::Beta,
        _ => PreReleaseLabel::Rc, // rc | c | preview | pre
    }
}

pub fn parse_local_segments(raw: &str) -> Vec<LocalSegment> {
    raw.split(['-', '_', '.'])
        .map(|part| {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                LocalSegment::Integer(part.parse().unwrap_or(0))
            } else {
                LocalSegment::String(part.to_ascii_lowercase())
            }
        })
        .collect()
}

impl FromStr for Pep440Version {
    type Err = ScmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = PEP440_BODY
            .captures(s)
            .ok_or_else(|| ScmError::TagParse(s.to_string()))?;

        let epoch = captures
            .name("epoch")
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0);

        let release = captures
            .name("release")
            .ok_or_else(|| ScmError::TagParse(s.to_string()))?
            .as_str()
            .split('.')
            .map(|x| x.parse().unwrap_or(0))
            .collect();

        let pre = captures.name("pre_l").map(|label| {
            let number = captures.name("pre_n").and_then(|m| m.as_str().parse().ok());
            (normalize_pre_label(label.as_str()), number)
        });

        let post = captures.name("post").map(|_| {
            captures
                .name("post_n1")
                .or_else(|| captures.name("post_n2"))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        });

        let dev = captures
            .name("dev")
            .map(|_| captures.name("dev_n").and_then(|m| m.as_str().parse().ok()).unwrap_or(0));

        let local = captures.name("local").map(|m| parse_local_segments(m.as_str()));

        Ok(Pep440Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

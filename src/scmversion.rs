//! C12: the structured inference result and its pure rendering helpers.

use crate::config::Configuration;
use crate::version_value::VersionValue;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// The tag carried by an [`ScmVersion`] — either a parsed version value or,
/// for preformatted paths (pretend-version, archive, fallback, PKG-INFO), a
/// bare string emitted as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Parsed(VersionValue),
    Preformatted(String),
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Parsed(v) => write!(f, "{v}"),
            Tag::Preformatted(s) => write!(f, "{s}"),
        }
    }
}

/// The structured result of VCS discovery and parsing (spec §3).
#[derive(Debug, Clone)]
pub struct ScmVersion {
    pub tag: Tag,
    pub distance: u64,
    /// Short hash prefixed by `g` (Git) or `h` (Mercurial); absent when
    /// there is no commit yet.
    pub node: Option<String>,
    pub dirty: bool,
    /// Set when no real tag could be found at all (an empty repository, or
    /// a repo with commits but no matching tag yet) — distinct from
    /// "clean at tag zero" because there is no release to consider final.
    pub untagged: bool,
    pub branch: Option<String>,
    pub node_date: Option<NaiveDate>,
    /// Build timestamp used by local schemes.
    pub time: DateTime<Utc>,
    /// When true, schemes are bypassed and `str(tag)` is emitted verbatim.
    pub preformatted: bool,
    pub config: Arc<Configuration>,
}

impl ScmVersion {
    pub fn new(tag: Tag, config: Arc<Configuration>, time: DateTime<Utc>) -> Self {
        Self {
            tag,
            distance: 0,
            node: None,
            dirty: false,
            untagged: false,
            branch: None,
            node_date: None,
            time,
            preformatted: false,
            config,
        }
    }

    /// `distance = 0 ∧ ¬dirty` — the tag alone is the final version. Never
    /// true for an untagged checkout: there is no real release to treat as
    /// final, however small `distance` happens to be.
    pub fn is_clean(&self) -> bool {
        self.distance == 0 && !self.dirty && !self.untagged
    }

    pub fn with_distance(mut self, distance: u64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_untagged(mut self, untagged: bool) -> Self {
        self.untagged = untagged;
        self
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_node_date(mut self, date: NaiveDate) -> Self {
        self.node_date = Some(date);
        self
    }

    pub fn preformatted(mut self) -> Self {
        self.preformatted = true;
        self
    }

    /// Expand `{tag}`, `{distance}`, `{node}`, `{branch}`, `{dirty}` inside
    /// `template` (spec §4.12 `format_with`). Unknown placeholders are left
    /// untouched.
    pub fn format_with(&self, template: &str) -> String {
        template
            .replace("{tag}", &self.tag.to_string())
            .replace("{distance}", &self.distance.to_string())
            .replace("{node}", self.node.as_deref().unwrap_or(""))
            .replace("{branch}", self.branch.as_deref().unwrap_or(""))
            .replace("{dirty}", if self.dirty { "true" } else { "false" })
    }

    /// `format_choice` (spec §4.12): pick by `dirty ∨ distance>0`.
    pub fn format_choice<'a>(&self, clean: &'a str, dirty_or_distance: &'a str) -> &'a str {
        if self.dirty || self.distance > 0 {
            dirty_or_distance
        } else {
            clean
        }
    }

    /// Compose a next-version template with a guess function (spec §4.12
    /// `format_next_version`): apply `guess` to the tag's `Pep440Version`,
    /// then expand `template` against the guessed release plus this
    /// version's dynamic fields.
    pub fn format_next_version(
        &self,
        guess: impl Fn(&crate::pep440::Pep440Version) -> crate::pep440::Pep440Version,
        template: &str,
    ) -> String {
        let base = match &self.tag {
            Tag::Parsed(v) => v.as_pep440().clone(),
            Tag::Preformatted(_) => crate::pep440::Pep440Version::new(vec![0, 0]),
        };
        let next = guess(&base);
        template
            .replace("{next_version}", &next.to_string())
            .replace("{distance}", &self.distance.to_string())
            .replace("{node}", self.node.as_deref().unwrap_or(""))
            .replace("{branch}", self.branch.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::pep440::Pep440Version;

    fn version(distance: u64, dirty: bool) -> ScmVersion {
        let tag = Tag::Parsed(VersionValue::Normalized(Pep440Version::new(vec![1, 2, 3])));
        ScmVersion::new(tag, Arc::new(Configuration::defaults()), Utc::now())
            .with_distance(distance)
            .with_dirty(dirty)
            .with_node("gabcdefg")
            .with_branch("main")
    }

    #[test]
    fn is_clean_requires_zero_distance_and_not_dirty() {
        assert!(version(0, false).is_clean());
        assert!(!version(1, false).is_clean());
        assert!(!version(0, true).is_clean());
    }

    #[test]
    fn format_with_expands_known_placeholders() {
        let v = version(3, true);
        assert_eq!(
            v.format_with("{tag}+{distance}.{node}.{branch}/{dirty}"),
            "1.2.3+3.gabcdefg.main/true"
        );
    }

    #[test]
    fn format_choice_picks_by_dirty_or_distance() {
        assert_eq!(version(0, false).format_choice("clean", "dirty"), "clean");
        assert_eq!(version(1, false).format_choice("clean", "dirty"), "dirty");
        assert_eq!(version(0, true).format_choice("clean", "dirty"), "dirty");
    }
}

//! C4: VCS backends sharing a `detect`/`parse`/`list_files` contract.

pub mod git;
pub mod hg;
pub mod hg_git;

use crate::config::Configuration;
use crate::error::Result;
use crate::scmversion::ScmVersion;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The sentinel tag used once a repository exists but has never been
/// tagged, or has no commits at all (spec §4.4).
pub const PRE_TAG_SENTINEL: &str = "0.0";

/// A detected VCS kind at a given directory, returned by root discovery
/// (C5) and dispatched by the orchestrator (C10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Git,
    Mercurial,
    HgGit,
}

impl Backend {
    /// Try each backend's marker at `path`, preferring the hg-git bridge
    /// over plain Mercurial when both apply (spec §4.4).
    pub fn detect(path: &Path) -> Option<Backend> {
        if hg_git::HgGit::detect(path) {
            Some(Backend::HgGit)
        } else if git::Git::detect(path) {
            Some(Backend::Git)
        } else if hg::Mercurial::detect(path) {
            Some(Backend::Mercurial)
        } else {
            None
        }
    }

    pub fn parse(self, root: &Path, config: Arc<Configuration>) -> Result<Option<ScmVersion>> {
        match self {
            Backend::Git => git::Git::parse(root, config),
            Backend::Mercurial => hg::Mercurial::parse(root, config),
            Backend::HgGit => hg_git::HgGit::parse(root, config),
        }
    }

    pub fn list_files(self, root: &Path) -> Result<Vec<PathBuf>> {
        match self {
            Backend::Git => git::Git::list_files(root),
            Backend::Mercurial => hg::Mercurial::list_files(root),
            Backend::HgGit => hg_git::HgGit::list_files(root),
        }
    }
}

/// A `<tag>-<distance>-g<hash>[-dirty]` describe result, shared by the
/// Git backend and the archival reader's `describe-name` parsing.
pub(crate) struct DescribeMatch {
    pub tag: String,
    pub distance: u64,
    pub hash: String,
    pub dirty: bool,
}

pub(crate) fn parse_describe_output(output: &str) -> Option<DescribeMatch> {
    let dirty = output.ends_with("-dirty");
    let body = output.strip_suffix("-dirty").unwrap_or(output);

    let mut rest = body;
    let hash_sep = rest.rfind("-g")?;
    let hash = rest[hash_sep + 2..].to_string();
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    rest = &rest[..hash_sep];

    let distance_sep = rest.rfind('-')?;
    let distance: u64 = rest[distance_sep + 1..].parse().ok()?;
    let tag = rest[..distance_sep].to_string();
    if tag.is_empty() {
        return None;
    }

    Some(DescribeMatch {
        tag,
        distance,
        hash,
        dirty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_describe_output() {
        let m = parse_describe_output("v1.2.3-5-gdeadbee").unwrap();
        assert_eq!(m.tag, "v1.2.3");
        assert_eq!(m.distance, 5);
        assert_eq!(m.hash, "deadbee");
        assert!(!m.dirty);
    }

    #[test]
    fn parses_dirty_describe_output() {
        let m = parse_describe_output("v1.2.3-5-gdeadbee-dirty").unwrap();
        assert!(m.dirty);
    }

    #[test]
    fn rejects_output_with_no_distance_hash_suffix() {
        assert!(parse_describe_output("v1.2.3").is_none());
    }
}

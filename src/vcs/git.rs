//! Git backend (spec §4.4).

use super::{parse_describe_output, PRE_TAG_SENTINEL};
use crate::config::{Configuration, GitPreParse};
use crate::error::{Result, ScmError};
use crate::process;
use crate::scmversion::{ScmVersion, Tag};
use crate::timesource::build_time;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Git;

impl Git {
    pub fn detect(path: &Path) -> bool {
        path.join(".git").exists()
    }

    /// Resolve the real work-tree root via `git rev-parse --show-toplevel`,
    /// so a detection hit anywhere under a checkout still parses from the
    /// top (spec §4.4).
    pub(crate) fn real_root(path: &Path) -> Result<PathBuf> {
        let out = process::run(&["git", "rev-parse", "--show-toplevel"], path)?;
        if out.success() && !out.stdout.is_empty() {
            Ok(PathBuf::from(out.stdout.trim()))
        } else {
            Ok(path.to_path_buf())
        }
    }

    fn pre_parse(root: &Path, config: &Configuration) -> Result<()> {
        match config.git_pre_parse {
            GitPreParse::WarnOnShallow => {
                if is_shallow(root) {
                    crate::logging::warn_once(
                        "git-shallow",
                        "shallow git repository detected; distance may be inaccurate",
                    );
                }
            }
            GitPreParse::FailOnShallow => {
                if is_shallow(root) {
                    return Err(ScmError::RepoShallow(root.display().to_string()));
                }
            }
            GitPreParse::FetchOnShallow => {
                if is_shallow(root) {
                    let out = process::run(&["git", "fetch", "--unshallow"], root)?;
                    if !out.success() {
                        return Err(ScmError::RepoShallow(format!(
                            "unshallow fetch failed: {}",
                            out.stderr
                        )));
                    }
                }
            }
            GitPreParse::FailOnMissingSubmodules => {
                check_submodules(root)?;
            }
        }
        Ok(())
    }

    pub fn parse(root: &Path, config: Arc<Configuration>) -> Result<Option<ScmVersion>> {
        let root = Self::real_root(root)?;
        Self::pre_parse(&root, &config)?;

        let dirty = is_dirty(&root)?;

        let describe_argv: Vec<&str> = config
            .git_describe_command
            .iter()
            .map(String::as_str)
            .collect();
        let describe = process::run(&describe_argv, &root)?;

        let version = if describe.success() {
            match parse_describe_output(describe.stdout.trim()) {
                Some(m) => {
                    let tag_regex = config.tag_regex()?;
                    let tag = crate::tag::parse_tag(&m.tag, &tag_regex, config.version_cls)?;
                    Some(
                        ScmVersion::new(Tag::Parsed(tag), config.clone(), build_time())
                            .with_distance(m.distance)
                            .with_node(format!("g{}", m.hash))
                            .with_dirty(dirty || m.dirty),
                    )
                }
                None => None,
            }
        } else {
            None
        };

        let mut version = match version {
            Some(v) => v,
            None => Self::no_tag_fallback(&root, config.clone(), dirty)?,
        };

        if let Some(branch) = current_branch(&root) {
            version = version.with_branch(branch);
        }
        if let Some(date) = node_date(&root) {
            version = version.with_node_date(date.date_naive());
        }

        Ok(Some(version))
    }

    fn no_tag_fallback(
        root: &Path,
        config: Arc<Configuration>,
        dirty: bool,
    ) -> Result<ScmVersion> {
        let count_out = process::run(&["git", "rev-list", "--count", "HEAD"], root)?;
        if !count_out.success() {
            // No commits at all.
            let tag = crate::version_value::VersionValue::parse(
                PRE_TAG_SENTINEL,
                config.version_cls,
            )?;
            return Ok(ScmVersion::new(Tag::Parsed(tag), config, build_time())
                .with_dirty(dirty)
                .with_untagged(true));
        }

        let distance: u64 = count_out.stdout.trim().parse().unwrap_or(0);
        let short_out = process::run(&["git", "rev-parse", "--short", "HEAD"], root)?;
        let tag = crate::version_value::VersionValue::parse(PRE_TAG_SENTINEL, config.version_cls)?;

        let mut version = ScmVersion::new(Tag::Parsed(tag), config, build_time())
            .with_distance(distance)
            .with_dirty(dirty)
            .with_untagged(true);
        if short_out.success() && !short_out.stdout.is_empty() {
            version = version.with_node(format!("g{}", short_out.stdout.trim()));
        }
        Ok(version)
    }

    pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
        let out = process::run(&["git", "ls-files"], root)?;
        Ok(out
            .stdout
            .lines()
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}

fn is_shallow(root: &Path) -> bool {
    root.join(".git").join("shallow").exists()
}

fn check_submodules(root: &Path) -> Result<()> {
    let gitmodules = root.join(".gitmodules");
    if !gitmodules.exists() {
        return Ok(());
    }
    let text = std::fs::read_to_string(&gitmodules)?;
    for line in text.lines() {
        let line = line.trim();
        if let Some(path) = line.strip_prefix("path = ") {
            let submodule_path = root.join(path.trim());
            let populated = submodule_path
                .read_dir()
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false);
            if !populated {
                return Err(ScmError::SubmoduleMissing(path.trim().to_string()));
            }
        }
    }
    Ok(())
}

/// Dirty check robust against mtime-only touches (spec §4.4): a file
/// `git status --porcelain` calls modified because only its mtime changed
/// must not count, so the final verdict re-confirms with `git diff --quiet`.
fn is_dirty(root: &Path) -> Result<bool> {
    let status = process::run(&["git", "status", "--porcelain"], root)?;
    let has_untracked = status.stdout.lines().any(|l| l.starts_with("??"));
    if has_untracked {
        return Ok(true);
    }
    if status.stdout.trim().is_empty() {
        return Ok(false);
    }

    let worktree_diff = process::run(&["git", "diff", "--quiet"], root)?;
    let staged_diff = process::run(&["git", "diff", "--cached", "--quiet"], root)?;
    Ok(!worktree_diff.success() || !staged_diff.success())
}

fn current_branch(root: &Path) -> Option<String> {
    let out = process::run(&["git", "rev-parse", "--abbrev-ref", "HEAD"], root).ok()?;
    if out.success() && out.stdout != "HEAD" && !out.stdout.is_empty() {
        Some(out.stdout)
    } else {
        None
    }
}

fn node_date(root: &Path) -> Option<DateTime<Utc>> {
    let out = process::run(&["git", "log", "-1", "--format=%cI"], root).ok()?;
    if out.success() {
        DateTime::parse_from_rfc3339(out.stdout.trim())
            .ok()
            .map(|d| d.with_timezone(&Utc))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_requires_dot_git_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!Git::detect(dir.path()));
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(Git::detect(dir.path()));
    }

    #[test]
    fn current_branch_ignores_detached_head() {
        let dir = tempfile::tempdir().unwrap();
        // outside any repository, `git rev-parse` fails entirely
        assert!(current_branch(dir.path()).is_none());
    }
}

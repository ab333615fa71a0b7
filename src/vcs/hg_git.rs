//! hg-git bridge (spec §4.4): when Mercurial's `hg-git` extension manages a
//! shadow Git repository, prefer reading that Git metadata directly rather
//! than going through `hg log`.

use super::{parse_describe_output, PRE_TAG_SENTINEL};
use crate::config::Configuration;
use crate::error::Result;
use crate::process;
use crate::scmversion::{ScmVersion, Tag};
use crate::timesource::build_time;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct HgGit;

impl HgGit {
    pub fn detect(path: &Path) -> bool {
        let hg_dir = path.join(".hg");
        if !hg_dir.exists() {
            return false;
        }
        if hg_dir.join("git-mapfile").exists() {
            return true;
        }
        bookmarks_reference_git(&hg_dir.join("bookmarks"))
    }

    pub fn parse(root: &Path, config: Arc<Configuration>) -> Result<Option<ScmVersion>> {
        let git_dir = root.join(".hg").join("git");
        if !git_dir.exists() {
            return super::hg::Mercurial::parse(root, config);
        }

        let envs = [
            ("GIT_DIR", git_dir.to_string_lossy().to_string()),
            ("GIT_WORK_TREE", root.to_string_lossy().to_string()),
        ];
        let env_refs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let describe_argv: Vec<&str> = config
            .git_describe_command
            .iter()
            .map(String::as_str)
            .collect();
        let describe = process::run_with_env(&describe_argv, root, &env_refs)?;

        if describe.success() {
            if let Some(m) = parse_describe_output(describe.stdout.trim()) {
                let tag_regex = config.tag_regex()?;
                let tag = crate::tag::parse_tag(&m.tag, &tag_regex, config.version_cls)?;
                let version = ScmVersion::new(Tag::Parsed(tag), config, build_time())
                    .with_distance(m.distance)
                    .with_node(format!("g{}", m.hash))
                    .with_dirty(m.dirty);
                return Ok(Some(version));
            }
        }

        // No Git tags reachable through the bridge: fall through to the
        // pure Mercurial view, which still sees the same history.
        super::hg::Mercurial::parse(root, config)
    }

    pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
        super::hg::Mercurial::list_files(root)
    }
}

fn bookmarks_reference_git(bookmarks_path: &Path) -> bool {
    std::fs::read_to_string(bookmarks_path)
        .map(|text| {
            text.lines()
                .any(|l| l.contains("refs/heads/") || l.contains("refs/tags/"))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_false_without_hg_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!HgGit::detect(dir.path()));
    }

    #[test]
    fn detect_true_with_git_mapfile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".hg")).unwrap();
        std::fs::write(dir.path().join(".hg").join("git-mapfile"), "").unwrap();
        assert!(HgGit::detect(dir.path()));
    }

    #[test]
    fn detect_true_with_bookmarks_referencing_git_refs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".hg")).unwrap();
        std::fs::write(
            dir.path().join(".hg").join("bookmarks"),
            "deadbeef refs/heads/main\n",
        )
        .unwrap();
        assert!(HgGit::detect(dir.path()));
    }

    #[test]
    fn detect_false_with_unrelated_bookmarks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".hg")).unwrap();
        std::fs::write(dir.path().join(".hg").join("bookmarks"), "deadbeef local-only\n").unwrap();
        assert!(!HgGit::detect(dir.path()));
    }
}

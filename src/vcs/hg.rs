//! Mercurial backend (spec §4.4).

use super::PRE_TAG_SENTINEL;
use crate::config::Configuration;
use crate::error::Result;
use crate::process;
use crate::scmversion::{ScmVersion, Tag};
use crate::timesource::build_time;
use crate::version_value::VersionValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FIELD_SEP: &str = "\x1f";

pub struct Mercurial;

impl Mercurial {
    pub fn detect(path: &Path) -> bool {
        path.join(".hg").exists()
    }

    pub fn parse(root: &Path, config: Arc<Configuration>) -> Result<Option<ScmVersion>> {
        let template = format!(
            "{{latesttag}}{sep}{{latesttagdistance}}{sep}{{node|short}}{sep}{{branch}}",
            sep = FIELD_SEP
        );
        let hg = config.hg_command.as_str();
        let out = process::run(&[hg, "log", "-r", ".", "--template", &template], root)?;
        if !out.success() {
            return Ok(None);
        }

        let fields: Vec<&str> = out.stdout.split(FIELD_SEP).collect();
        let [latesttag, distance, node, branch] = fields[..] else {
            return Ok(None);
        };

        let dirty = is_dirty(root, hg)?;

        // `latesttagdistance` already counts from the nearest ancestor tag,
        // including when the current commit is itself the tagging commit.
        let distance: u64 = distance.parse().unwrap_or(0);

        let untagged = latesttag.is_empty() || latesttag == "null";
        let tag = if untagged {
            VersionValue::parse(PRE_TAG_SENTINEL, config.version_cls)?
        } else {
            let tag_regex = config.tag_regex()?;
            crate::tag::parse_tag(latesttag, &tag_regex, config.version_cls)?
        };

        let mut version = ScmVersion::new(Tag::Parsed(tag), config, build_time())
            .with_distance(distance)
            .with_dirty(dirty)
            .with_untagged(untagged)
            .with_node(format!("h{node}"));
        if !branch.is_empty() {
            version = version.with_branch(branch.to_string());
        }

        Ok(Some(version))
    }

    pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
        let out = process::run(&["hg", "status", "-madc", "-n"], root)?;
        Ok(out
            .stdout
            .lines()
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}

fn is_dirty(root: &Path, hg: &str) -> Result<bool> {
    let out = process::run(&[hg, "status"], root)?;
    Ok(!out.stdout.trim().is_empty())
}

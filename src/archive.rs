//! C3: archival substitution file readers (`.git_archival.txt`,
//! `.hg_archival.txt`), letting an exported archive synthesize an
//! [`ScmVersion`] without a live VCS.

use crate::config::Configuration;
use crate::scmversion::{ScmVersion, Tag};
use crate::version_value::VersionValue;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const GIT_ARCHIVAL_FILENAME: &str = ".git_archival.txt";
const HG_ARCHIVAL_FILENAME: &str = ".hg_archival.txt";

/// `<tag>-<distance>-g<short_hash>`, the shape `git describe --tags` emits
/// and the shape a hosting provider expands `describe-name:` to.
fn describe_name_pattern() -> Regex {
    Regex::new(r"^(?P<tag>.+)-(?P<distance>\d+)-g(?P<hash>[0-9a-f]+)$").unwrap()
}

/// RFC-822-ish key/value parse shared by both archival formats: `key: value`
/// per line, blank lines and anything before the first `:` ignored.
fn parse_keyvalue(text: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

fn looks_unexpanded(value: &str) -> bool {
    value.starts_with("$Format:") || value.contains("$Format:")
}

/// Try `.git_archival.txt`, then `.hg_archival.txt`, at `root`. Returns
/// `None` when neither is present or the present one carries only
/// unexpanded placeholders (spec §4.3: "treat the file as absent").
pub fn read_archive(root: &Path, config: Arc<Configuration>) -> crate::error::Result<Option<ScmVersion>> {
    let git_path = root.join(GIT_ARCHIVAL_FILENAME);
    if git_path.exists() {
        let text = std::fs::read_to_string(&git_path)?;
        return Ok(parse_git_archival(&text, config));
    }
    let hg_path = root.join(HG_ARCHIVAL_FILENAME);
    if hg_path.exists() {
        let text = std::fs::read_to_string(&hg_path)?;
        return Ok(parse_hg_archival(&text, config));
    }
    Ok(None)
}

/// Parse `.git_archival.txt` content (spec §4.3).
pub fn parse_git_archival(text: &str, config: Arc<Configuration>) -> Option<ScmVersion> {
    let fields = parse_keyvalue(text);

    let node_date = fields
        .get("node-date")
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc).date_naive());

    let describe_name = fields.get("describe-name").filter(|v| !looks_unexpanded(v));

    if let Some(name) = describe_name {
        if let Some(caps) = describe_name_pattern().captures(name) {
            let tag_regex = config.tag_regex().ok()?;
            let tag_str = &caps["tag"];
            let tag = crate::tag::parse_tag(tag_str, &tag_regex, config.version_cls).ok()?;
            let distance: u64 = caps["distance"].parse().ok()?;
            let hash = &caps["hash"];

            let mut version = ScmVersion::new(Tag::Parsed(tag), config, time_now())
                .with_distance(distance)
                .with_node(format!("g{hash}"));
            if let Some(date) = node_date {
                version = version.with_node_date(date);
            }
            return Some(version);
        }
    }

    // No usable describe-name: fall back to ref-names carrying a version
    // tag directly, with distance 0.
    if let Some(refs) = fields.get("ref-names").filter(|v| !looks_unexpanded(v)) {
        let tag_regex = config.tag_regex().ok()?;
        for candidate in refs.split(',').map(str::trim) {
            let candidate = candidate
                .strip_prefix("tag: ")
                .unwrap_or(candidate);
            if let Ok(tag) = crate::tag::parse_tag(candidate, &tag_regex, config.version_cls) {
                let mut version = ScmVersion::new(Tag::Parsed(tag), config, time_now());
                if let Some(date) = node_date {
                    version = version.with_node_date(date);
                }
                if let Some(node) = fields.get("node").filter(|v| !looks_unexpanded(v)) {
                    version = version.with_node(format!("g{}", &node[..node.len().min(7)]));
                }
                return Some(version);
            }
        }
    }

    crate::logging::warn_once(
        "git-archival-unexpanded",
        &format!("{GIT_ARCHIVAL_FILENAME} present but carries no usable substituted keys"),
    );
    None
}

/// Parse `.hg_archival.txt` content (spec §4.3).
pub fn parse_hg_archival(text: &str, config: Arc<Configuration>) -> Option<ScmVersion> {
    let fields = parse_keyvalue(text);

    let tag_str = fields
        .get("tag")
        .or_else(|| fields.get("latesttag"))
        .filter(|v| !looks_unexpanded(v));

    let tag_regex = config.tag_regex().ok()?;
    let (tag, distance, untagged) = match tag_str {
        Some(t) if t != "null" => {
            let distance = fields
                .get("latesttagdistance")
                .and_then(|d| d.parse::<u64>().ok())
                .unwrap_or(0);
            (
                crate::tag::parse_tag(t, &tag_regex, config.version_cls).ok()?,
                distance,
                false,
            )
        }
        _ => (
            VersionValue::parse("0.0", crate::version_value::VersionCls::Normalizing).ok()?,
            0,
            true,
        ),
    };

    let mut version = ScmVersion::new(Tag::Parsed(tag), config, time_now())
        .with_distance(distance)
        .with_untagged(untagged);
    if let Some(node) = fields.get("node").filter(|v| !looks_unexpanded(v)) {
        version = version.with_node(format!("h{}", &node[..node.len().min(12)]));
    }
    if let Some(branch) = fields.get("branch") {
        version = version.with_branch(branch.clone());
    }
    Some(version)
}

fn time_now() -> DateTime<Utc> {
    crate::timesource::build_time()
}

//! C7: environment override reader.
//!
//! Three classes of variables, each in a generic and a per-dist form, with
//! the per-dist variant winning (spec §4.7). The tool-name prefix is
//! resolved through [`crate::context::tool_prefix`] so an embedder can
//! register an alternative prefix ahead of the default.

use crate::dist_name::env_suffix;
use crate::error::{Result, ScmError};
use std::collections::BTreeMap;

/// A typed, schema-validated metadata/override overlay (spec §4.7 schema:
/// `distance:int, node:str, dirty:bool, branch:str, node_date:date,
/// time:datetime, preformatted:bool, tag:str`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataOverlay {
    pub tag: Option<String>,
    pub distance: Option<u64>,
    pub node: Option<String>,
    pub dirty: Option<bool>,
    pub branch: Option<String>,
    pub node_date: Option<chrono::NaiveDate>,
    pub time: Option<chrono::DateTime<chrono::Utc>>,
    pub preformatted: Option<bool>,
    /// Keys present in the source table but not part of the schema;
    /// surfaced as warnings and discarded (spec §4.7).
    pub unknown_keys: Vec<String>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn prefixed(suffix: &str) -> String {
    format!("{}_{}", crate::context::tool_prefix(), suffix)
}

/// Read a pretend-version override: the per-dist form wins over the
/// generic form.
pub fn read_pretend_version(dist_name: &str) -> Option<String> {
    let per_dist = prefixed(&format!("PRETEND_VERSION_FOR_{}", env_suffix(dist_name)));
    env_var(&per_dist).or_else(|| env_var(&prefixed("PRETEND_VERSION")))
}

/// Read and schema-validate a pretend-metadata overlay.
pub fn read_pretend_metadata(dist_name: &str) -> Result<Option<MetadataOverlay>> {
    let per_dist = prefixed(&format!("PRETEND_METADATA_FOR_{}", env_suffix(dist_name)));
    let raw = env_var(&per_dist).or_else(|| env_var(&prefixed("PRETEND_METADATA")));
    raw.map(|raw| parse_inline_table(&raw)).transpose()
}

/// Read a per-dist configuration override inline table. Unlike pretend
/// metadata, there is no generic (non-per-dist) form (spec §4.7 table).
pub fn read_config_overrides(dist_name: &str) -> Result<Option<toml::value::Table>> {
    let key = prefixed(&format!("OVERRIDES_FOR_{}", env_suffix(dist_name)));
    match env_var(&key) {
        Some(raw) => Ok(Some(parse_table(&raw)?)),
        None => {
            fuzzy_suffix_hint(&format!("OVERRIDES_FOR_{}", env_suffix(dist_name)), dist_name);
            Ok(None)
        }
    }
}

fn parse_table(raw: &str) -> Result<toml::value::Table> {
    let wrapped = format!("value = {raw}");
    let doc: toml::Table = toml::from_str(&wrapped)
        .map_err(|e| ScmError::OverrideDecode(format!("invalid inline table `{raw}`: {e}")))?;
    match doc.get("value") {
        Some(toml::Value::Table(table)) => Ok(table.clone()),
        _ => Err(ScmError::OverrideDecode(format!(
            "expected an inline table, got `{raw}`"
        ))),
    }
}

fn parse_inline_table(raw: &str) -> Result<MetadataOverlay> {
    let table = parse_table(raw)?;
    let mut overlay = MetadataOverlay::default();

    const SCHEMA_KEYS: &[&str] = &[
        "tag",
        "distance",
        "node",
        "dirty",
        "branch",
        "node_date",
        "time",
        "preformatted",
    ];

    for (key, value) in &table {
        if !SCHEMA_KEYS.contains(&key.as_str()) {
            overlay.unknown_keys.push(key.clone());
            continue;
        }
        match key.as_str() {
            "tag" => overlay.tag = Some(expect_string(key, value)?),
            "distance" => overlay.distance = Some(expect_int(key, value)?),
            "node" => overlay.node = Some(expect_string(key, value)?),
            "dirty" => overlay.dirty = Some(expect_bool(key, value)?),
            "branch" => overlay.branch = Some(expect_string(key, value)?),
            "preformatted" => overlay.preformatted = Some(expect_bool(key, value)?),
            "node_date" => {
                let s = expect_string_or_date(key, value)?;
                overlay.node_date = Some(
                    chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
                        ScmError::OverrideDecode(format!("invalid node_date `{s}`: {e}"))
                    })?,
                );
            }
            "time" => {
                let s = expect_string_or_date(key, value)?;
                overlay.time = Some(
                    chrono::DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt.with_timezone(&chrono::Utc))
                        .map_err(|e| {
                            ScmError::OverrideDecode(format!("invalid time `{s}`: {e}"))
                        })?,
                );
            }
            _ => unreachable!(),
        }
    }

    for unknown in &overlay.unknown_keys {
        crate::logging::warn_once(
            &format!("unknown-override-key:{unknown}"),
            &format!("ignoring unknown override key `{unknown}`"),
        );
    }

    Ok(overlay)
}

fn expect_string(key: &str, value: &toml::Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ScmError::OverrideDecode(format!("`{key}` must be a string")))
}

fn expect_string_or_date(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Datetime(dt) => Ok(dt.to_string()),
        _ => Err(ScmError::OverrideDecode(format!(
            "`{key}` must be a date/datetime string"
        ))),
    }
}

fn expect_int(key: &str, value: &toml::Value) -> Result<u64> {
    value
        .as_integer()
        .filter(|n| *n >= 0)
        .map(|n| n as u64)
        .ok_or_else(|| {
            ScmError::OverrideDecode(format!(
                "`{key}` must be an unsigned integer, not a string or float (PEP 440 \
                 derivatives reject mixed types such as distance=\"3\")"
            ))
        })
}

fn expect_bool(key: &str, value: &toml::Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| ScmError::OverrideDecode(format!("`{key}` must be a boolean")))
}

/// If an env var with the right prefix exists under a near-match suffix
/// (e.g. the dist name was mistyped or mis-normalized), emit a one-shot
/// diagnostic naming the expected variable (spec §4.7).
fn fuzzy_suffix_hint(expected_suffix: &str, dist_name: &str) {
    let prefix = crate::context::tool_prefix();
    let full_prefix = format!("{prefix}_OVERRIDES_FOR_");
    let candidates: BTreeMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with(&full_prefix) && k != &format!("{prefix}_{expected_suffix}"))
        .collect();
    for (name, _) in candidates {
        let got_suffix = name.trim_start_matches(&full_prefix);
        if levenshtein_close(got_suffix, expected_suffix.trim_start_matches("OVERRIDES_FOR_")) {
            crate::logging::warn_once(
                &format!("fuzzy-override:{name}"),
                &format!(
                    "found `{name}` which looks like it was meant for dist `{dist_name}`; \
                     expected `{prefix}_{expected_suffix}`"
                ),
            );
        }
    }
}

fn levenshtein_close(a: &str, b: &str) -> bool {
    if a == b {
        return false;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > 2 {
        return false;
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut cur = vec![i];
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            cur.push((prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost));
        }
        prev = cur;
    }
    *prev.last().unwrap() <= 2
}

//! Local version schemes (spec §4.9): `(ScmVersion) -> str`.

use crate::error::{Result, ScmError};
use crate::scmversion::ScmVersion;

pub fn render(name: &str, version: &ScmVersion) -> Result<String> {
    match name {
        "node-and-date" => Ok(node_and_date(version)),
        "node-and-timestamp" => Ok(node_and_timestamp(version)),
        "dirty-tag" => Ok(dirty_tag(version)),
        "no-local-version" => Ok(String::new()),
        other => Err(ScmError::Configuration(format!(
            "unknown local_scheme `{other}`"
        ))),
    }
}

fn build_date_stamp(version: &ScmVersion) -> String {
    version
        .node_date
        .unwrap_or_else(|| version.time.date_naive())
        .format("%Y%m%d")
        .to_string()
}

fn build_timestamp_stamp(version: &ScmVersion) -> String {
    version.time.format("%Y%m%d%H%M%S").to_string()
}

fn node_and_date(version: &ScmVersion) -> String {
    match (version.distance > 0, version.dirty) {
        (false, false) => String::new(),
        (false, true) => format!("+d{}", build_date_stamp(version)),
        (true, false) => format!("+{}", version.node.as_deref().unwrap_or("")),
        (true, true) => format!(
            "+{}.d{}",
            version.node.as_deref().unwrap_or(""),
            build_date_stamp(version)
        ),
    }
}

fn node_and_timestamp(version: &ScmVersion) -> String {
    match (version.distance > 0, version.dirty) {
        (false, false) => String::new(),
        (false, true) => format!("+d{}", build_timestamp_stamp(version)),
        (true, false) => format!("+{}", version.node.as_deref().unwrap_or("")),
        (true, true) => format!(
            "+{}.d{}",
            version.node.as_deref().unwrap_or(""),
            build_timestamp_stamp(version)
        ),
    }
}

fn dirty_tag(version: &ScmVersion) -> String {
    if version.dirty {
        "+dirty".to_string()
    } else {
        String::new()
    }
}

//! C11: fallback readers tried after live VCS discovery fails.

use crate::config::Configuration;
use crate::error::Result;
use std::path::Path;

/// Read `PKG-INFO`'s `Version:` header (spec §4.11): a minimal RFC-822
/// reader that scans lines until the first blank line.
pub fn read_pkg_info_version(root: &Path) -> Result<Option<String>> {
    let path = root.join("PKG-INFO");
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;

    let mut version = None;
    for line in text.lines() {
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Version:") {
            version = Some(value.trim().to_string());
        }
    }
    Ok(version)
}

/// If `parentdir_prefix_version` is configured and the absolute root's
/// directory basename starts with it, return the remainder (spec §4.10
/// stage 5 — the caller applies `tag_regex` to it).
pub fn parentdir_prefix_remainder(config: &Configuration) -> Option<String> {
    let prefix = config.parentdir_prefix_version.as_deref()?;
    let basename = config.absolute_root().file_name()?.to_string_lossy().to_string();
    basename.strip_prefix(prefix).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_version_header_before_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("PKG-INFO"),
            "Metadata-Version: 2.1\nName: demo\nVersion: 1.2.3\n\nSome long description.\n",
        )
        .unwrap();
        assert_eq!(
            read_pkg_info_version(dir.path()).unwrap(),
            Some("1.2.3".to_string())
        );
    }

    #[test]
    fn ignores_header_like_lines_after_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("PKG-INFO"),
            "Name: demo\n\nVersion: 9.9.9 (mentioned in the body, not a header)\n",
        )
        .unwrap();
        assert_eq!(read_pkg_info_version(dir.path()).unwrap(), None);
    }

    #[test]
    fn missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_pkg_info_version(dir.path()).unwrap(), None);
    }

    #[test]
    fn parentdir_prefix_strips_configured_prefix() {
        let config = Configuration {
            root: std::path::PathBuf::from("myproject-1.2.3"),
            parentdir_prefix_version: Some("myproject-".to_string()),
            ..Configuration::defaults()
        };
        assert_eq!(
            parentdir_prefix_remainder(&config),
            Some("1.2.3".to_string())
        );
    }

    #[test]
    fn parentdir_prefix_none_when_basename_does_not_match() {
        let config = Configuration {
            root: std::path::PathBuf::from("unrelated-dir"),
            parentdir_prefix_version: Some("myproject-".to_string()),
            ..Configuration::defaults()
        };
        assert_eq!(parentdir_prefix_remainder(&config), None);
    }
}

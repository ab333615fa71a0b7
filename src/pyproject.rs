//! C6: pyproject.toml reader.

use crate::error::{Result, ScmError};
use std::path::Path;

/// The tool section names tried, in precedence order (primary wins, aliases
/// fill gaps the primary section leaves unset).
pub const TOOL_SECTION_NAMES: &[&str] = &["setuptools_scm", "scm-version-core"];

#[derive(Debug, Clone, Default)]
pub struct PyprojectPayload {
    pub section_present: bool,
    pub project_present: bool,
    pub project_name: Option<String>,
    pub section: toml::value::Table,
}

/// Parse `pyproject.toml` bytes. Missing file is not an error at this
/// layer — callers treat an absent anchor file as "no pyproject config".
pub fn read_pyproject_bytes(bytes: &str) -> Result<PyprojectPayload> {
    let doc: toml::Table = toml::from_str(bytes)
        .map_err(|e| ScmError::Configuration(format!("invalid pyproject.toml: {e}")))?;

    let project = doc.get("project").and_then(|v| v.as_table());
    let project_name = project
        .and_then(|p| p.get("name"))
        .and_then(|v| v.as_str())
        .map(crate::dist_name::canonicalize);

    let tool = doc.get("tool").and_then(|v| v.as_table());
    let mut section = toml::value::Table::new();
    let mut section_present = false;
    for name in TOOL_SECTION_NAMES {
        if let Some(candidate) = tool.and_then(|t| t.get(*name)).and_then(|v| v.as_table()) {
            section_present = true;
            for (key, value) in candidate {
                section.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }

    Ok(PyprojectPayload {
        section_present,
        project_present: project.is_some(),
        project_name,
        section,
    })
}

/// Read and parse the anchor file at `path`, if it exists.
pub fn read_pyproject_file(path: &Path) -> Result<Option<PyprojectPayload>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read_to_string(path)?;
    read_pyproject_bytes(&bytes).map(Some)
}

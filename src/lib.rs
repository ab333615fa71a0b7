//! Infer a PEP 440 package version, and the structured metadata behind it,
//! from a Git or Mercurial checkout, an exported archive, or a distribution
//! source tree.
//!
//! The entry point is [`infer_version`]; [`ConfigOverrides`] is the
//! call-site configuration overlay, and [`ScmVersion`] is the structured
//! result behind the rendered string.

pub mod archive;
pub mod config;
pub mod context;
pub mod dist_name;
pub mod env_override;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod orchestrator;
pub mod pep440;
pub mod process;
pub mod pyproject;
pub mod root;
pub mod scheme;
pub mod scmversion;
pub mod tag;
pub mod timesource;
pub mod vcs;
pub mod version_value;

pub use config::{ConfigOverrides, Configuration, GitPreParse};
pub use error::{Result, ScmError};
pub use orchestrator::{infer, ParseOverride};
pub use pep440::Pep440Version;
pub use scmversion::{ScmVersion, Tag};
pub use version_value::{VersionCls, VersionValue};

use std::path::Path;

/// Infer the version for the project rooted at `working_dir`, applying
/// `overrides` on top of any `pyproject.toml` found there.
///
/// This is the convenience entry point; [`orchestrator::infer`] exposes the
/// `parse_override` hook for embedders that need it.
pub fn infer_version(working_dir: &Path, overrides: &ConfigOverrides) -> Result<String> {
    orchestrator::infer(working_dir, overrides, None).map(|(rendered, _)| rendered)
}

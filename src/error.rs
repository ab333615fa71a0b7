use std::io;

/// Main error type for the scm-version-core library.
///
/// Only the kinds in spec §7 that are *non-recoverable* at their stage are
/// represented here; per-stage "not present" outcomes in the orchestrator
/// are plain `Option`/`bool`, not errors.
#[derive(Debug)]
pub enum ScmError {
    /// Regex failed to compile, an unknown scheme name was configured, or
    /// the version type could not be resolved.
    Configuration(String),
    /// Shallow clone detected under `pre_parse = fail_on_shallow`.
    RepoShallow(String),
    /// A declared submodule is not populated under
    /// `pre_parse = fail_on_missing_submodules`.
    SubmoduleMissing(String),
    /// Non-zero exit, timeout, or decoding failure from a VCS invocation.
    VcsCommand(String),
    /// A tag string did not match `tag_regex` or its captured body failed
    /// to parse as the configured version type.
    TagParse(String),
    /// All stages in the orchestrator failed and no fallback was configured.
    NoVersionInferred(String),
    /// A TOML inline table could not be parsed or failed schema validation.
    OverrideDecode(String),
    /// Underlying I/O failure reading a config/archive/metadata file.
    Io(io::Error),
}

impl std::fmt::Display for ScmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScmError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ScmError::RepoShallow(msg) => write!(f, "shallow repository: {msg}"),
            ScmError::SubmoduleMissing(msg) => write!(f, "missing submodule: {msg}"),
            ScmError::VcsCommand(msg) => write!(f, "vcs command failed: {msg}"),
            ScmError::TagParse(msg) => write!(f, "could not parse tag: {msg}"),
            ScmError::NoVersionInferred(msg) => write!(f, "no version could be inferred: {msg}"),
            ScmError::OverrideDecode(msg) => write!(f, "could not decode override: {msg}"),
            ScmError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ScmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScmError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ScmError {
    fn from(err: io::Error) -> Self {
        ScmError::Io(err)
    }
}

impl PartialEq for ScmError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScmError::Configuration(a), ScmError::Configuration(b)) => a == b,
            (ScmError::RepoShallow(a), ScmError::RepoShallow(b)) => a == b,
            (ScmError::SubmoduleMissing(a), ScmError::SubmoduleMissing(b)) => a == b,
            (ScmError::VcsCommand(a), ScmError::VcsCommand(b)) => a == b,
            (ScmError::TagParse(a), ScmError::TagParse(b)) => a == b,
            (ScmError::NoVersionInferred(a), ScmError::NoVersionInferred(b)) => a == b,
            (ScmError::OverrideDecode(a), ScmError::OverrideDecode(b)) => a == b,
            (ScmError::Io(a), ScmError::Io(b)) => {
                a.kind() == b.kind() && a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScmError>;

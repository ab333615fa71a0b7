//! C8: configuration data model and resolver.

use crate::dist_name::canonicalize;
use crate::error::{Result, ScmError};
use crate::tag::{compile_tag_regex, DEFAULT_TAG_REGEX};
use crate::version_value::VersionCls;
use regex::Regex;
use std::path::PathBuf;

/// `scm.git.pre_parse` (spec §3/§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitPreParse {
    WarnOnShallow,
    FailOnShallow,
    FetchOnShallow,
    FailOnMissingSubmodules,
}

impl Default for GitPreParse {
    fn default() -> Self {
        GitPreParse::WarnOnShallow
    }
}

impl GitPreParse {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "warn_on_shallow" => Some(Self::WarnOnShallow),
            "fail_on_shallow" => Some(Self::FailOnShallow),
            "fetch_on_shallow" => Some(Self::FetchOnShallow),
            "fail_on_missing_submodules" => Some(Self::FailOnMissingSubmodules),
            _ => None,
        }
    }
}

/// The frozen configuration behind an inference call (spec §3).
///
/// Immutable after [`Configuration::resolve`] returns: every `Option` field
/// that survives resolution has already had its "not set vs. set to X"
/// ambiguity collapsed, per spec §9 ("never rely on sentinel defaults to
/// distinguish user intent from absence").
#[derive(Debug, Clone)]
pub struct Configuration {
    pub root: PathBuf,
    pub relative_to: Option<PathBuf>,
    pub fallback_root: PathBuf,
    pub fallback_version: Option<String>,

    pub tag_regex_pattern: String,
    tag_regex_compiled: Option<Regex>,

    pub parentdir_prefix_version: Option<String>,

    pub version_scheme: Vec<String>,
    pub local_scheme: String,
    pub normalize: bool,
    pub version_cls: VersionCls,

    pub write_to: Option<String>,
    pub version_file: Option<String>,
    pub version_file_template: Option<String>,
    /// Set when both `write_to` and `version_file` were configured (spec
    /// §4.8: "keep both but flag `write_to` as deprecated").
    pub write_to_is_deprecated_alias: bool,

    pub search_parent_directories: bool,
    pub git_describe_command: Vec<String>,
    pub git_pre_parse: GitPreParse,
    pub hg_command: String,

    pub dist_name: String,
}

/// A call-site overlay: every field optional, overlaid only where present
/// (spec §4.8 step 3, §9).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub relative_to: Option<PathBuf>,
    pub fallback_root: Option<PathBuf>,
    pub fallback_version: Option<String>,
    pub tag_regex_pattern: Option<String>,
    pub parentdir_prefix_version: Option<String>,
    pub version_scheme: Option<Vec<String>>,
    pub local_scheme: Option<String>,
    pub normalize: Option<bool>,
    pub version_cls: Option<VersionCls>,
    pub write_to: Option<String>,
    pub version_file: Option<String>,
    pub version_file_template: Option<String>,
    pub search_parent_directories: Option<bool>,
    pub git_describe_command: Option<Vec<String>>,
    pub git_pre_parse: Option<GitPreParse>,
    pub hg_command: Option<String>,
    pub dist_name: Option<String>,
}

pub const DEFAULT_VERSION_SCHEME: &str = "guess-next-dev";
pub const DEFAULT_LOCAL_SCHEME: &str = "node-and-date";
pub const DEFAULT_DESCRIBE_COMMAND: &[&str] =
    &["git", "describe", "--dirty", "--tags", "--long", "--match", "*[0-9]*"];

impl Configuration {
    /// Hard-coded defaults (spec §4.8 step 1).
    pub fn defaults() -> Self {
        Self {
            root: PathBuf::from("."),
            relative_to: None,
            fallback_root: PathBuf::from("."),
            fallback_version: None,
            tag_regex_pattern: DEFAULT_TAG_REGEX.to_string(),
            tag_regex_compiled: None,
            parentdir_prefix_version: None,
            version_scheme: vec![DEFAULT_VERSION_SCHEME.to_string()],
            local_scheme: DEFAULT_LOCAL_SCHEME.to_string(),
            normalize: true,
            version_cls: VersionCls::Normalizing,
            write_to: None,
            version_file: None,
            version_file_template: None,
            write_to_is_deprecated_alias: false,
            search_parent_directories: true,
            git_describe_command: DEFAULT_DESCRIBE_COMMAND
                .iter()
                .map(|s| s.to_string())
                .collect(),
            git_pre_parse: GitPreParse::default(),
            hg_command: "hg".to_string(),
            dist_name: String::new(),
        }
    }

    pub fn tag_regex(&self) -> Result<Regex> {
        match &self.tag_regex_compiled {
            Some(r) => Ok(r.clone()),
            None => compile_tag_regex(&self.tag_regex_pattern),
        }
    }

    /// The absolute root: `normpath(relative_to_parent / root)` (spec §3
    /// invariant).
    pub fn absolute_root(&self) -> PathBuf {
        let base = match &self.relative_to {
            Some(anchor) => anchor
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        normalize_path(&base.join(&self.root))
    }

    fn overlay_pyproject(&mut self, section: &toml::value::Table) {
        macro_rules! str_field {
            ($key:literal, $field:ident) => {
                if let Some(v) = section.get($key).and_then(|v| v.as_str()) {
                    self.$field = v.to_string();
                }
            };
        }
        macro_rules! opt_str_field {
            ($key:literal, $field:ident) => {
                if let Some(v) = section.get($key).and_then(|v| v.as_str()) {
                    self.$field = Some(v.to_string());
                }
            };
        }
        macro_rules! bool_field {
            ($key:literal, $field:ident) => {
                if let Some(v) = section.get($key).and_then(|v| v.as_bool()) {
                    self.$field = v;
                }
            };
        }

        str_field!("local_scheme", local_scheme);
        bool_field!("normalize", normalize);
        bool_field!("search_parent_directories", search_parent_directories);
        opt_str_field!("fallback_version", fallback_version);
        opt_str_field!("parentdir_prefix_version", parentdir_prefix_version);
        opt_str_field!("write_to", write_to);
        opt_str_field!("version_file", version_file);
        opt_str_field!("version_file_template", version_file_template);

        if let Some(v) = section.get("tag_regex").and_then(|v| v.as_str()) {
            self.tag_regex_pattern = v.to_string();
        }
        if let Some(v) = section.get("root").and_then(|v| v.as_str()) {
            self.root = PathBuf::from(v);
        }
        if let Some(v) = section.get("version_scheme") {
            if let Some(name) = v.as_str() {
                self.version_scheme = vec![name.to_string()];
            } else if let Some(list) = v.as_array() {
                self.version_scheme = list
                    .iter()
                    .filter_map(|x| x.as_str().map(str::to_string))
                    .collect();
            }
        }

        if let Some(scm) = section.get("scm").and_then(|v| v.as_table()) {
            if let Some(git) = scm.get("git").and_then(|v| v.as_table()) {
                if let Some(cmd) = git.get("describe_command") {
                    if let Some(s) = cmd.as_str() {
                        self.git_describe_command =
                            s.split_whitespace().map(str::to_string).collect();
                    } else if let Some(list) = cmd.as_array() {
                        self.git_describe_command = list
                            .iter()
                            .filter_map(|x| x.as_str().map(str::to_string))
                            .collect();
                    }
                }
                if let Some(pp) = git.get("pre_parse").and_then(|v| v.as_str()) {
                    if let Some(parsed) = GitPreParse::parse(pp) {
                        self.git_pre_parse = parsed;
                    }
                }
            }
            if let Some(hg) = scm.get("hg").and_then(|v| v.as_table()) {
                if let Some(cmd) = hg.get("hg_command").and_then(|v| v.as_str()) {
                    self.hg_command = cmd.to_string();
                }
            }
        }

        if self.write_to.is_some() && self.version_file.is_some() {
            self.write_to_is_deprecated_alias = true;
        }
    }

    fn overlay_call_site(&mut self, overrides: &ConfigOverrides) {
        macro_rules! apply {
            ($field:ident) => {
                if let Some(v) = overrides.$field.clone() {
                    self.$field = v;
                }
            };
        }
        apply!(root);
        apply!(relative_to);
        apply!(fallback_root);
        apply!(fallback_version);
        apply!(tag_regex_pattern);
        apply!(parentdir_prefix_version);
        apply!(version_scheme);
        apply!(local_scheme);
        apply!(normalize);
        apply!(version_cls);
        apply!(write_to);
        apply!(version_file);
        apply!(version_file_template);
        apply!(search_parent_directories);
        apply!(git_describe_command);
        apply!(git_pre_parse);
        apply!(hg_command);
        apply!(dist_name);

        if overrides.write_to.is_some() && self.version_file.is_some() {
            self.write_to_is_deprecated_alias = true;
        }
    }

    fn overlay_env(&mut self, table: &toml::value::Table) {
        if let Some(v) = table.get("local_scheme").and_then(|v| v.as_str()) {
            self.local_scheme = v.to_string();
        }
        if let Some(v) = table.get("version_scheme").and_then(|v| v.as_str()) {
            self.version_scheme = vec![v.to_string()];
        }
        if let Some(v) = table.get("fallback_version").and_then(|v| v.as_str()) {
            self.fallback_version = Some(v.to_string());
        }
        if let Some(v) = table.get("normalize").and_then(|v| v.as_bool()) {
            self.normalize = v;
        }
        if let Some(v) = table.get("tag_regex").and_then(|v| v.as_str()) {
            self.tag_regex_pattern = v.to_string();
        }
    }

    /// The full resolution algorithm (spec §4.8): defaults → pyproject →
    /// call-site overrides → per-dist env overrides → freeze.
    pub fn resolve(
        pyproject: Option<&crate::pyproject::PyprojectPayload>,
        overrides: &ConfigOverrides,
        project_dist_name: Option<&str>,
    ) -> Result<Configuration> {
        let mut config = Configuration::defaults();

        if let Some(name) = project_dist_name {
            config.dist_name = canonicalize(name);
        }
        if let Some(payload) = pyproject {
            config.overlay_pyproject(&payload.section);
            if config.dist_name.is_empty() {
                if let Some(name) = &payload.project_name {
                    config.dist_name = name.clone();
                }
            }
        }

        config.overlay_call_site(overrides);

        if !config.dist_name.is_empty() {
            if let Some(env_overrides) = crate::env_override::read_config_overrides(&config.dist_name)? {
                config.overlay_env(&env_overrides);
            }
        }

        // `<prefix>_HG_COMMAND` (spec §4.7): a global override, not scoped
        // to a dist name, mirroring `git_describe_command`'s purpose for
        // the Mercurial backend.
        if let Ok(cmd) = std::env::var(format!("{}_HG_COMMAND", crate::context::tool_prefix())) {
            if !cmd.is_empty() {
                config.hg_command = cmd;
            }
        }

        config.tag_regex_compiled = Some(config.tag_regex()?);

        if config.version_scheme.is_empty() {
            return Err(ScmError::Configuration(
                "version_scheme must name at least one registered scheme".into(),
            ));
        }

        Ok(config)
    }
}

/// A minimal `normpath`: collapse `.`/`..` components lexically, without
/// touching the filesystem (matches spec's `normpath` requirement for
/// `absolute_root`, which must work even against paths that don't exist
/// yet, e.g. in an archive).
fn normalize_path(path: &std::path::Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyproject::read_pyproject_bytes;

    #[test]
    fn defaults_match_spec() {
        let config = Configuration::defaults();
        assert_eq!(config.version_scheme, vec!["guess-next-dev".to_string()]);
        assert_eq!(config.local_scheme, "node-and-date");
        assert!(config.normalize);
        assert_eq!(config.version_cls, VersionCls::Normalizing);
        assert_eq!(config.git_pre_parse, GitPreParse::WarnOnShallow);
        assert!(config.search_parent_directories);
        assert_eq!(config.hg_command, "hg");
    }

    #[test]
    #[serial_test::serial]
    fn hg_command_env_override_is_global_not_per_dist() {
        unsafe {
            std::env::set_var("SCM_VERSION_HG_COMMAND", "hg.exe");
        }
        let config =
            Configuration::resolve(None, &ConfigOverrides::default(), None).unwrap();
        assert_eq!(config.hg_command, "hg.exe");
        unsafe {
            std::env::remove_var("SCM_VERSION_HG_COMMAND");
        }
    }

    #[test]
    fn pyproject_overlays_only_present_keys() {
        let payload = read_pyproject_bytes(
            r#"
            [tool.setuptools_scm]
            local_scheme = "no-local-version"
            "#,
        )
        .unwrap();
        let config = Configuration::resolve(Some(&payload), &ConfigOverrides::default(), None)
            .unwrap();
        assert_eq!(config.local_scheme, "no-local-version");
        // untouched field keeps its default
        assert_eq!(config.version_scheme, vec!["guess-next-dev".to_string()]);
    }

    #[test]
    fn call_site_overrides_beat_pyproject() {
        let payload = read_pyproject_bytes(
            r#"
            [tool.setuptools_scm]
            local_scheme = "no-local-version"
            "#,
        )
        .unwrap();
        let overrides = ConfigOverrides {
            local_scheme: Some("dirty-tag".to_string()),
            ..Default::default()
        };
        let config = Configuration::resolve(Some(&payload), &overrides, None).unwrap();
        assert_eq!(config.local_scheme, "dirty-tag");
    }

    #[test]
    fn deprecated_write_to_flagged_when_both_set() {
        let overrides = ConfigOverrides {
            write_to: Some("VERSION".to_string()),
            version_file: Some("src/_version.py".to_string()),
            ..Default::default()
        };
        let config = Configuration::resolve(None, &overrides, None).unwrap();
        assert!(config.write_to_is_deprecated_alias);
    }

    #[test]
    fn invalid_tag_regex_is_a_configuration_error() {
        let overrides = ConfigOverrides {
            tag_regex_pattern: Some("(unterminated".to_string()),
            ..Default::default()
        };
        let result = Configuration::resolve(None, &overrides, None);
        assert!(matches!(result, Err(ScmError::Configuration(_))));
    }

    #[test]
    fn empty_version_scheme_list_is_a_configuration_error() {
        let overrides = ConfigOverrides {
            version_scheme: Some(vec![]),
            ..Default::default()
        };
        let result = Configuration::resolve(None, &overrides, None);
        assert!(matches!(result, Err(ScmError::Configuration(_))));
    }

    #[test]
    fn normalize_path_collapses_parent_dir_components() {
        let p = normalize_path(std::path::Path::new("/a/b/../c/./d"));
        assert_eq!(p, PathBuf::from("/a/c/d"));
    }
}

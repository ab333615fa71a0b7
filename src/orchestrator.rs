//! C10: the top-level inference pipeline.

use crate::config::{Configuration, ConfigOverrides};
use crate::error::{Result, ScmError};
use crate::scmversion::{ScmVersion, Tag};
use crate::version_value::VersionValue;
use std::path::Path;
use std::sync::Arc;

/// An externally supplied parse override (spec §4.10 stage 2) — a build
/// backend may hand in a pre-resolved version for cases this crate cannot
/// see on its own (e.g. a CI-injected tag).
pub type ParseOverride<'a> = &'a dyn Fn(&Path, &Configuration) -> Result<Option<ScmVersion>>;

/// Run the full inference pipeline (spec §4.10) starting from
/// `working_dir`, returning the rendered version string alongside the
/// `ScmVersion` that produced it.
pub fn infer(
    working_dir: &Path,
    overrides: &ConfigOverrides,
    parse_override: Option<ParseOverride>,
) -> Result<(String, ScmVersion)> {
    crate::logging::reset_warnings();

    let pyproject_path = working_dir.join("pyproject.toml");
    let pyproject = crate::pyproject::read_pyproject_file(&pyproject_path)?;

    let dist_name_hint = overrides
        .dist_name
        .clone()
        .or_else(|| pyproject.as_ref().and_then(|p| p.project_name.clone()));

    // `relative_to` anchors `root` (spec §3 `absolute_root`); absent an
    // explicit override, anchor to the pyproject.toml this call read, so
    // `root` resolves relative to the caller's working directory rather
    // than the process's ambient cwd.
    let mut effective_overrides = overrides.clone();
    if effective_overrides.relative_to.is_none() {
        effective_overrides.relative_to = Some(pyproject_path.clone());
    }

    let config = Arc::new(Configuration::resolve(
        pyproject.as_ref(),
        &effective_overrides,
        dist_name_hint.as_deref(),
    )?);

    let mut attempted = Vec::new();

    // Stage 1: pretend version. The generic form applies regardless of
    // whether a dist name was resolved; the per-dist form additionally
    // requires one.
    if let Some(pretend) = crate::env_override::read_pretend_version(&config.dist_name) {
        let mut version =
            ScmVersion::new(Tag::Preformatted(pretend), config.clone(), crate::timesource::build_time())
                .preformatted();
        if let Some(overlay) = crate::env_override::read_pretend_metadata(&config.dist_name)? {
            version = apply_metadata_overlay(version, overlay);
        }
        return render_and_validate(version);
    }
    attempted.push("pretend-version: no PRETEND_VERSION env var set".to_string());

    // Stage 2: configured parse override.
    if let Some(handle) = parse_override {
        match handle(working_dir, &config) {
            Ok(Some(version)) => return render_and_validate(version),
            Ok(None) => attempted.push("parse-override: returned no version".to_string()),
            Err(e) => return Err(e),
        }
    }

    // Stage 3: archive file.
    match crate::archive::read_archive(working_dir, config.clone()) {
        Ok(Some(version)) => return render_and_validate(version),
        Ok(None) => attempted.push("archive: no archival substitution file present".to_string()),
        Err(e) => attempted.push(format!("archive: {e}")),
    }

    // Stage 4: live VCS.
    let root = config.absolute_root();
    match crate::root::discover(&root, config.search_parent_directories) {
        Some((vcs_root, backend)) => match backend.parse(&vcs_root, config.clone()) {
            Ok(Some(version)) => return render_and_validate(version),
            Ok(None) => attempted.push("vcs: backend detected but produced no version".to_string()),
            // A backend that detected its marker and then failed its
            // describe/log invocation is non-recoverable (spec §4.10):
            // unlike "no marker found", this propagates immediately.
            Err(e) => return Err(e),
        },
        None => attempted.push("vcs: no recognized repository found".to_string()),
    }

    // Stage 5: parent-directory prefix.
    if let Some(remainder) = crate::fallback::parentdir_prefix_remainder(&config) {
        let tag_regex = config.tag_regex()?;
        if let Ok(tag) = crate::tag::parse_tag(&remainder, &tag_regex, config.version_cls) {
            let version =
                ScmVersion::new(Tag::Parsed(tag), config.clone(), crate::timesource::build_time())
                    .preformatted();
            return render_and_validate(version);
        }
        attempted.push(format!(
            "parentdir-prefix: remainder `{remainder}` did not match tag_regex"
        ));
    } else {
        attempted.push("parentdir-prefix: not configured or directory name did not match".to_string());
    }

    // Stage 6: PKG-INFO.
    match crate::fallback::read_pkg_info_version(&root) {
        Ok(Some(version_str)) => {
            let version = ScmVersion::new(
                Tag::Preformatted(version_str),
                config.clone(),
                crate::timesource::build_time(),
            )
            .preformatted();
            return render_and_validate(version);
        }
        Ok(None) => attempted.push("pkg-info: no PKG-INFO file present".to_string()),
        Err(e) => attempted.push(format!("pkg-info: {e}")),
    }

    // Stage 7: configured fallback version.
    if let Some(fallback) = &config.fallback_version {
        let version = ScmVersion::new(
            Tag::Preformatted(fallback.clone()),
            config.clone(),
            crate::timesource::build_time(),
        )
        .preformatted();
        return render_and_validate(version);
    }
    attempted.push("fallback-version: not configured".to_string());

    Err(ScmError::NoVersionInferred(format!(
        "no version could be inferred for `{}`; attempted stages:\n  - {}",
        if config.dist_name.is_empty() {
            "<unknown dist>"
        } else {
            &config.dist_name
        },
        attempted.join("\n  - ")
    )))
}

fn apply_metadata_overlay(
    mut version: ScmVersion,
    overlay: crate::env_override::MetadataOverlay,
) -> ScmVersion {
    if let Some(tag) = overlay.tag {
        version.tag = Tag::Preformatted(tag);
    }
    if let Some(distance) = overlay.distance {
        version = version.with_distance(distance);
    }
    if let Some(node) = overlay.node {
        version = version.with_node(node);
    }
    if let Some(dirty) = overlay.dirty {
        version = version.with_dirty(dirty);
    }
    if let Some(branch) = overlay.branch {
        version = version.with_branch(branch);
    }
    if let Some(node_date) = overlay.node_date {
        version = version.with_node_date(node_date);
    }
    if let Some(time) = overlay.time {
        version.time = time;
    }
    if let Some(preformatted) = overlay.preformatted {
        version.preformatted = preformatted;
    }
    version
}

/// Render and, unless preformatted, validate the rendered string by
/// reparsing it through the configured version type (spec §4.10: "the
/// final string is then validated by constructing the configured version
/// type over it").
fn render_and_validate(version: ScmVersion) -> Result<(String, ScmVersion)> {
    let rendered = crate::scheme::render(&version)?;
    if !version.preformatted {
        VersionValue::parse(&rendered, version.config.version_cls)?;
    }
    Ok((rendered, version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn pretend_version_short_circuits_everything_else() {
        let dir = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var("SCM_VERSION_PRETEND_VERSION", "7.7.7");
        }
        let (rendered, version) = infer(dir.path(), &ConfigOverrides::default(), None).unwrap();
        assert_eq!(rendered, "7.7.7");
        assert!(version.preformatted);
        unsafe {
            std::env::remove_var("SCM_VERSION_PRETEND_VERSION");
        }
    }

    #[test]
    #[serial]
    fn fallback_version_used_when_nothing_else_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = ConfigOverrides {
            fallback_version: Some("0.0.1.dev0".to_string()),
            ..Default::default()
        };
        let (rendered, _) = infer(dir.path(), &overrides, None).unwrap();
        assert_eq!(rendered, "0.0.1.dev0");
    }

    #[test]
    #[serial]
    fn no_stage_resolves_is_a_descriptive_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = infer(dir.path(), &ConfigOverrides::default(), None);
        assert!(matches!(result, Err(ScmError::NoVersionInferred(_))));
    }

    #[test]
    #[serial]
    fn parse_override_short_circuits_remaining_stages() {
        let dir = tempfile::tempdir().unwrap();
        let handle = |_: &Path, config: &Configuration| {
            let tag =
                VersionValue::parse("4.5.6", crate::version_value::VersionCls::Normalizing)?;
            Ok(Some(
                ScmVersion::new(Tag::Parsed(tag), Arc::new(config.clone()), crate::timesource::build_time())
                    .preformatted(),
            ))
        };
        let (rendered, _) = infer(dir.path(), &ConfigOverrides::default(), Some(&handle)).unwrap();
        assert_eq!(rendered, "4.5.6");
    }

    #[test]
    #[serial]
    fn pkg_info_is_used_when_present_and_no_vcs_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("PKG-INFO"), "Name: demo\nVersion: 3.3.3\n\n").unwrap();
        let (rendered, _) = infer(dir.path(), &ConfigOverrides::default(), None).unwrap();
        assert_eq!(rendered, "3.3.3");
    }
}

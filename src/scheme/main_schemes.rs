//! Main version schemes (spec §4.9): `(ScmVersion) -> str`.

use crate::error::{Result, ScmError};
use crate::pep440::Pep440Version;
use crate::scmversion::{ScmVersion, Tag};
use regex::Regex;

/// Render `version` under the named main scheme. `Ok(None)` means the
/// scheme declined to produce an opinion (only `towncrier-fragments` does
/// this, when no changelog fragments are present) and the caller should try
/// the next configured scheme name.
pub fn render(name: &str, version: &ScmVersion) -> Result<Option<String>> {
    match name {
        "guess-next-dev" => Ok(Some(guess_next_dev(version))),
        "no-guess-dev" => Ok(Some(no_guess_dev(version))),
        "post-release" => Ok(Some(post_release(version))),
        "only-version" => Ok(Some(only_version(version))),
        "semver-pep440" | "python-simplified-semver" => Ok(Some(semver_pep440(version))),
        "semver-pep440-release-branch" | "release-branch-semver" => {
            Ok(Some(semver_pep440_release_branch(version)))
        }
        "calver-by-date" => Ok(Some(calver_by_date(version))),
        "towncrier-fragments" => Ok(towncrier_fragments(version)),
        other => Err(ScmError::Configuration(format!(
            "unknown version_scheme `{other}`"
        ))),
    }
}

fn next_release(version: &ScmVersion) -> Pep440Version {
    let base = match &version.tag {
        Tag::Parsed(v) => v.without_local(),
        Tag::Preformatted(_) => Pep440Version::new(vec![0, 0]),
    };
    // An untagged checkout has no real release to bump from (spec §8
    // boundary: an empty repo renders `0.0.dev0`, not `0.1.dev0`).
    if version.untagged {
        base
    } else {
        base.bump_release(0)
    }
}

fn tag_string(version: &ScmVersion) -> String {
    version.tag.to_string()
}

fn guess_next_dev(version: &ScmVersion) -> String {
    if version.is_clean() {
        return tag_string(version);
    }
    format!("{}.dev{}", next_release(version), version.distance)
}

fn no_guess_dev(version: &ScmVersion) -> String {
    if version.is_clean() {
        return tag_string(version);
    }
    format!("{}.post1.dev{}", tag_string(version), version.distance)
}

fn post_release(version: &ScmVersion) -> String {
    if version.is_clean() {
        return tag_string(version);
    }
    format!("{}.post{}", tag_string(version), version.distance)
}

fn only_version(version: &ScmVersion) -> String {
    tag_string(version)
}

/// Bump degree inferred from a branch name heuristic shared by both semver
/// schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BumpDegree {
    Major,
    Minor,
    Patch,
}

fn feature_like(branch: &str) -> bool {
    let re = Regex::new(r"(?i)^(feature|feat)[/-]").unwrap();
    re.is_match(branch)
}

fn bugfix_like(branch: &str) -> bool {
    let re = Regex::new(r"(?i)^(bugfix|fix|hotfix)[/-]").unwrap();
    re.is_match(branch)
}

fn release_branch_like(branch: &str) -> Option<u64> {
    let re = Regex::new(r"(?i)^(release|stable)[/-](?:v)?(\d+)").unwrap();
    re.captures(branch)
        .and_then(|c| c.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

fn bump_by_degree(version: &ScmVersion, degree: BumpDegree) -> Pep440Version {
    let base = match &version.tag {
        Tag::Parsed(v) => v.without_local(),
        Tag::Preformatted(_) => Pep440Version::new(vec![0, 0, 0]),
    };
    if version.untagged {
        return base;
    }
    match degree {
        BumpDegree::Major => base.bump_release(2.min(base.release.len().saturating_sub(1))),
        BumpDegree::Minor => base.bump_release(1.min(base.release.len().saturating_sub(1))),
        BumpDegree::Patch => base.bump_release(0),
    }
}

fn semver_pep440(version: &ScmVersion) -> String {
    if version.is_clean() {
        return tag_string(version);
    }
    let degree = match version.branch.as_deref() {
        Some(b) if feature_like(b) => BumpDegree::Minor,
        Some(b) if bugfix_like(b) => BumpDegree::Patch,
        _ => BumpDegree::Patch,
    };
    format!("{}.dev{}", bump_by_degree(version, degree), version.distance)
}

fn semver_pep440_release_branch(version: &ScmVersion) -> String {
    if version.is_clean() {
        return tag_string(version);
    }
    let current_major = match &version.tag {
        Tag::Parsed(v) => v.as_pep440().release.first().copied().unwrap_or(0),
        Tag::Preformatted(_) => 0,
    };
    let degree = match version.branch.as_deref().and_then(release_branch_like) {
        // major_on_zero: while the current major is 0, a release-branch
        // bump still only advances minor (spec §4.9).
        Some(_) if current_major == 0 => BumpDegree::Minor,
        Some(_) => BumpDegree::Major,
        None => BumpDegree::Patch,
    };
    format!("{}.dev{}", bump_by_degree(version, degree), version.distance)
}

fn calver_by_date(version: &ScmVersion) -> String {
    if version.is_clean() {
        return tag_string(version);
    }
    let date = version.node_date.unwrap_or_else(|| version.time.date_naive());
    let stamp = date.format("%Y.%m.%d");
    format!("{stamp}.dev{}", version.distance)
}

/// Inspect `changelog.d/*.{major,minor,patch}.md` fragments under the
/// configured root to pick a bump degree, then delegate to `guess-next-dev`
/// semantics. Returns `None` (defer to the next configured scheme) when no
/// fragments directory exists.
fn towncrier_fragments(version: &ScmVersion) -> Option<String> {
    let root = version.config.absolute_root();
    let dir = root.join("changelog.d");
    let entries = std::fs::read_dir(&dir).ok()?;

    let mut degree = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.contains(".major.") {
            degree = Some(BumpDegree::Major);
            break;
        } else if name.contains(".minor.") && degree != Some(BumpDegree::Major) {
            degree = Some(BumpDegree::Minor);
        } else if name.contains(".patch.") && degree.is_none() {
            degree = Some(BumpDegree::Patch);
        }
    }

    let degree = degree?;
    if version.is_clean() {
        return Some(tag_string(version));
    }
    Some(format!(
        "{}.dev{}",
        bump_by_degree(version, degree),
        version.distance
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::pep440::Pep440Version;
    use crate::version_value::VersionValue;
    use chrono::Utc;
    use std::sync::Arc;

    fn version(tag: &str, distance: u64, dirty: bool, branch: Option<&str>) -> ScmVersion {
        let parsed = VersionValue::parse(tag, crate::version_value::VersionCls::Normalizing).unwrap();
        let mut v = ScmVersion::new(
            Tag::Parsed(parsed),
            Arc::new(Configuration::defaults()),
            Utc::now(),
        )
        .with_distance(distance)
        .with_dirty(dirty)
        .with_node("gabcdefg");
        if let Some(b) = branch {
            v = v.with_branch(b);
        }
        v
    }

    #[test]
    fn guess_next_dev_clean_emits_tag() {
        let v = version("1.2.3", 0, false, None);
        assert_eq!(render("guess-next-dev", &v).unwrap().unwrap(), "1.2.3");
    }

    #[test]
    fn guess_next_dev_distance_bumps_and_appends_dev() {
        let v = version("1.2.3", 5, false, None);
        assert_eq!(
            render("guess-next-dev", &v).unwrap().unwrap(),
            "1.2.4.dev5"
        );
    }

    #[test]
    fn guess_next_dev_untagged_checkout_does_not_bump_sentinel() {
        let v = version("0.0", 0, false, None).with_untagged(true);
        assert_eq!(render("guess-next-dev", &v).unwrap().unwrap(), "0.0.dev0");
    }

    #[test]
    fn guess_next_dev_short_tag_hazard_matches_spec_example() {
        let v = version("2.0", 3, false, None);
        assert_eq!(render("guess-next-dev", &v).unwrap().unwrap(), "2.1.dev3");
    }

    #[test]
    fn no_guess_dev_uses_post1_dev_suffix() {
        let v = version("1.2.3", 5, false, None);
        assert_eq!(
            render("no-guess-dev", &v).unwrap().unwrap(),
            "1.2.3.post1.dev5"
        );
    }

    #[test]
    fn post_release_appends_post_distance() {
        let v = version("1.2.3", 2, false, None);
        assert_eq!(render("post-release", &v).unwrap().unwrap(), "1.2.3.post2");
    }

    #[test]
    fn only_version_ignores_distance_and_dirty() {
        let v = version("1.2.3", 9, true, None);
        assert_eq!(render("only-version", &v).unwrap().unwrap(), "1.2.3");
    }

    #[test]
    fn semver_pep440_minor_bumps_on_feature_branch() {
        let v = version("1.2.3", 1, false, Some("feature/new-thing"));
        assert_eq!(
            render("semver-pep440", &v).unwrap().unwrap(),
            "1.3.0.dev1"
        );
    }

    #[test]
    fn semver_pep440_patch_bumps_on_bugfix_branch() {
        let v = version("1.2.3", 1, false, Some("bugfix/oops"));
        assert_eq!(
            render("semver-pep440", &v).unwrap().unwrap(),
            "1.2.4.dev1"
        );
    }

    #[test]
    fn release_branch_scheme_bumps_minor_while_major_is_zero() {
        let v = version("0.5.0", 1, false, Some("release/1.0"));
        assert_eq!(
            render("semver-pep440-release-branch", &v).unwrap().unwrap(),
            "0.6.0.dev1"
        );
    }

    #[test]
    fn release_branch_scheme_bumps_major_once_past_zero() {
        let v = version("1.5.0", 1, false, Some("release/2.0"));
        assert_eq!(
            render("semver-pep440-release-branch", &v).unwrap().unwrap(),
            "2.0.0.dev1"
        );
    }

    #[test]
    fn calver_by_date_uses_node_date() {
        let mut v = version("1.2.3", 1, false, None);
        v.node_date = Some(chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(
            render("calver-by-date", &v).unwrap().unwrap(),
            "2024.03.09.dev1"
        );
    }

    #[test]
    fn unknown_scheme_name_is_a_configuration_error() {
        let v = version("1.2.3", 0, false, None);
        assert!(matches!(render("nonexistent", &v), Err(ScmError::Configuration(_))));
    }

    #[test]
    fn towncrier_fragments_defers_without_changelog_dir() {
        let v = version("1.2.3", 1, false, None);
        assert_eq!(render("towncrier-fragments", &v).unwrap(), None);
    }
}

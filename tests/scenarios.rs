//! End-to-end pipeline scenarios (spec §8 S1-S7; S8 is covered by
//! `archive::tests`). Shells out to the real `git` binary against a
//! `tempfile::TempDir`, matching the library's own backend tests.

use scm_version_core::{infer_version, ConfigOverrides};
use serial_test::serial;
use std::path::Path;
use std::process::Command;

fn git(dir: &Path, args: &[&str]) {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("git must be on PATH for these tests");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
}

fn commit(dir: &Path, file: &str, contents: &str, message: &str) {
    std::fs::write(dir.join(file), contents).unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", message]);
}

fn short_head(dir: &Path) -> String {
    let out = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(dir)
        .output()
        .unwrap();
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

#[test]
#[serial]
fn s1_clean_checkout_at_tag_renders_bare_tag() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    commit(dir.path(), "a.txt", "1", "initial");
    git(dir.path(), &["tag", "v1.2.3"]);

    let version = infer_version(dir.path(), &ConfigOverrides::default()).unwrap();
    assert_eq!(version, "1.2.3");
}

#[test]
#[serial]
fn s2_one_commit_past_tag_guesses_next_dev() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    commit(dir.path(), "a.txt", "1", "initial");
    git(dir.path(), &["tag", "v1.2.3"]);
    commit(dir.path(), "b.txt", "2", "second");
    let hash = short_head(dir.path());

    let version = infer_version(dir.path(), &ConfigOverrides::default()).unwrap();
    assert_eq!(version, format!("1.2.4.dev1+g{hash}"));
}

#[test]
#[serial]
fn s3_dirty_worktree_appends_date_from_source_date_epoch() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    commit(dir.path(), "a.txt", "1", "initial");
    git(dir.path(), &["tag", "v1.2.3"]);
    commit(dir.path(), "b.txt", "2", "second");
    let hash = short_head(dir.path());
    std::fs::write(dir.path().join("a.txt"), "changed content").unwrap();

    unsafe {
        std::env::set_var("SOURCE_DATE_EPOCH", "1704067200");
    }
    let version = infer_version(dir.path(), &ConfigOverrides::default()).unwrap();
    unsafe {
        std::env::remove_var("SOURCE_DATE_EPOCH");
    }
    assert_eq!(version, format!("1.2.4.dev1+g{hash}.d20240101"));
}

#[test]
#[serial]
fn s4_no_local_version_scheme_suppresses_local_segment() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    commit(dir.path(), "a.txt", "1", "initial");
    git(dir.path(), &["tag", "v1.2.3"]);

    let overrides = ConfigOverrides {
        local_scheme: Some("no-local-version".to_string()),
        ..Default::default()
    };
    let version = infer_version(dir.path(), &overrides).unwrap();
    assert_eq!(version, "1.2.3");
}

#[test]
#[serial]
fn s5_pretend_version_for_dist_wins_with_no_repo_present() {
    let dir = tempfile::tempdir().unwrap();
    unsafe {
        std::env::set_var("SCM_VERSION_PRETEND_VERSION_FOR_MY_PKG", "9.9.9");
    }
    let overrides = ConfigOverrides {
        dist_name: Some("my-pkg".to_string()),
        ..Default::default()
    };
    let version = infer_version(dir.path(), &overrides).unwrap();
    unsafe {
        std::env::remove_var("SCM_VERSION_PRETEND_VERSION_FOR_MY_PKG");
    }
    assert_eq!(version, "9.9.9");
}

#[test]
#[serial]
fn s7_parentdir_prefix_extracts_version_with_no_repository() {
    let parent = tempfile::tempdir().unwrap();
    let project_dir = parent.path().join("myproj-1.4.0");
    std::fs::create_dir(&project_dir).unwrap();

    let overrides = ConfigOverrides {
        parentdir_prefix_version: Some("myproj-".to_string()),
        ..Default::default()
    };
    let version = infer_version(&project_dir, &overrides).unwrap();
    assert_eq!(version, "1.4.0");
}

#[test]
#[serial]
fn boundary_empty_repository_with_no_commits_does_not_crash() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());

    let version = infer_version(dir.path(), &ConfigOverrides::default()).unwrap();
    assert_eq!(version, "0.0.dev0");
}

#[test]
#[serial]
fn boundary_short_tag_v2_0_yields_documented_hazard() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    commit(dir.path(), "a.txt", "1", "initial");
    git(dir.path(), &["tag", "v2.0"]);
    commit(dir.path(), "b.txt", "2", "second");
    commit(dir.path(), "c.txt", "3", "third");
    commit(dir.path(), "d.txt", "4", "fourth");
    let hash = short_head(dir.path());

    let version = infer_version(dir.path(), &ConfigOverrides::default()).unwrap();
    assert_eq!(version, format!("2.1.dev3+g{hash}"));
}

#[test]
#[serial]
fn boundary_tag_with_local_segment_is_stripped_before_guessing() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    commit(dir.path(), "a.txt", "1", "initial");
    git(dir.path(), &["tag", "v1.2.3+foo"]);
    commit(dir.path(), "b.txt", "2", "second");
    let hash = short_head(dir.path());

    let version = infer_version(dir.path(), &ConfigOverrides::default()).unwrap();
    assert_eq!(version, format!("1.2.4.dev1+g{hash}"));
}

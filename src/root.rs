//! C5: root discovery — walk ancestors looking for a VCS marker.

use crate::vcs::Backend;
use std::path::{Path, PathBuf};

/// `<prefix>_IGNORE_VCS_ROOTS`: an OS-pathsep-separated list of directories
/// to skip over during the ancestor walk (spec §4.7/§4.5).
fn ignored_roots() -> Vec<PathBuf> {
    let var = format!("{}_IGNORE_VCS_ROOTS", crate::context::tool_prefix());
    std::env::var(&var)
        .ok()
        .map(|raw| {
            std::env::split_paths(&raw)
                .map(|p| p.to_path_buf())
                .collect()
        })
        .unwrap_or_default()
}

/// Discover the nearest ancestor of `start` (inclusive) carrying a
/// recognized VCS marker, honoring the ignore list and
/// `search_parent_directories` (spec §4.5).
pub fn discover(start: &Path, search_parent_directories: bool) -> Option<(PathBuf, Backend)> {
    let ignored = ignored_roots();
    let mut current = Some(start.to_path_buf());

    while let Some(dir) = current {
        if !ignored.contains(&dir) {
            if let Some(backend) = Backend::detect(&dir) {
                return Some((dir, backend));
            }
        }
        if !search_parent_directories {
            break;
        }
        current = dir.parent().map(Path::to_path_buf);
    }
    None
}

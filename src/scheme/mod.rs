//! C9: version scheme registry and composition.

pub mod local_schemes;
pub mod main_schemes;

use crate::error::{Result, ScmError};
use crate::scmversion::ScmVersion;

/// Render the final version string for `version`: if preformatted, emit
/// `str(tag)` directly and skip both schemes; otherwise try each configured
/// main scheme in order (first non-`None` wins) and append the configured
/// local scheme, omitting the `+` separator when the local part is empty
/// (spec §4.9).
pub fn render(version: &ScmVersion) -> Result<String> {
    if version.preformatted {
        return Ok(version.tag.to_string());
    }

    let main = render_main(&version.config.version_scheme, version)?;
    let local = local_schemes::render(&version.config.local_scheme, version)?;

    Ok(if local.is_empty() {
        main
    } else {
        format!("{main}{local}")
    })
}

fn render_main(names: &[String], version: &ScmVersion) -> Result<String> {
    for name in names {
        if let Some(rendered) = main_schemes::render(name, version)? {
            return Ok(rendered);
        }
    }
    Err(ScmError::NoVersionInferred(format!(
        "no configured main scheme produced a version (tried {names:?})"
    )))
}

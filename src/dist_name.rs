//! PEP 503 name normalization, used both for the `dist_name` configuration
//! field and for deriving the per-distribution environment variable suffix
//! (spec §4.7).

/// Canonical PEP 503 form: lowercase, runs of `-`, `_`, `.` collapsed to a
/// single `-`.
pub fn canonicalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for ch in name.chars() {
        if ch == '-' || ch == '_' || ch == '.' {
            if !last_was_sep && !out.is_empty() {
                out.push('-');
            }
            last_was_sep = true;
        } else {
            out.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        }
    }
    out.trim_end_matches('-').to_string()
}

/// The `<DIST>` suffix used in per-dist environment variable names: the
/// canonical name with `[._-]` runs replaced by a single `_` and
/// upper-cased.
pub fn env_suffix(name: &str) -> String {
    canonicalize(name).replace('-', "_").to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("my-pkg", "my-pkg")]
    #[case("My_Pkg", "my-pkg")]
    #[case("my...pkg--name", "my-pkg-name")]
    #[case("My.Package_Name", "my-package-name")]
    fn canonicalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonicalize(input), expected);
    }

    #[rstest]
    #[case("my-pkg", "MY_PKG")]
    #[case("My.Package_Name", "MY_PACKAGE_NAME")]
    fn derives_env_suffix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(env_suffix(input), expected);
    }
}

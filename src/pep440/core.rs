//! C2 (part 1): the PEP 440 version value type.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreReleaseLabel {
    Alpha,
    Beta,
    Rc,
}

impl PreReleaseLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            PreReleaseLabel::Alpha => "a",
            PreReleaseLabel::Beta => "b",
            PreReleaseLabel::Rc => "rc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSegment {
    String(String),
    Integer(u64),
}

impl std::fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalSegment::String(s) => write!(f, "{s}"),
            LocalSegment::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// A normalized PEP 440 version: `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pep440Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreReleaseLabel, Option<u64>)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Option<Vec<LocalSegment>>,
}

impl Pep440Version {
    pub fn new(release: Vec<u64>) -> Self {
        Self {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// True when the version carries no pre/post/dev/local qualifiers —
    /// i.e. it is a bare release, the only shape `guess-next-dev` may bump.
    pub fn is_plain_release(&self) -> bool {
        self.pre.is_none() && self.post.is_none() && self.dev.is_none() && self.local.is_none()
    }

    /// Drop the local segment, per the "tag with local segment" boundary
    /// behavior in spec §8: the local part is stripped when guessing next
    /// versions.
    pub fn without_local(&self) -> Self {
        Self {
            local: None,
            ..self.clone()
        }
    }

    /// The next version per `guess-next-dev`/`semver-pep440` families: bump
    /// the last release segment by one, drop pre/post/dev/local.
    pub fn bump_release(&self, index_from_end: usize) -> Self {
        let mut release = self.release.clone();
        if release.is_empty() {
            release.push(0);
        }
        let len = release.len();
        let idx = len.saturating_sub(1 + index_from_end.min(len - 1));
        release[idx] += 1;
        for slot in release.iter_mut().skip(idx + 1) {
            *slot = 0;
        }
        Self {
            epoch: self.epoch,
            release,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_release_is_clean() {
        let v = Pep440Version::new(vec![1, 2, 3]);
        assert!(v.is_plain_release());
    }

    #[test]
    fn with_local_is_not_plain() {
        let mut v = Pep440Version::new(vec![1, 2, 3]);
        v.local = Some(vec![LocalSegment::String("gabcdefg".into())]);
        assert!(!v.is_plain_release());
        assert!(v.without_local().is_plain_release());
    }

    #[test]
    fn bump_release_increments_last_segment() {
        let v = Pep440Version::new(vec![1, 2, 3]);
        let bumped = v.bump_release(0);
        assert_eq!(bumped.release, vec![1, 2, 4]);
    }

    #[test]
    fn bump_release_on_short_tag_pads_with_zero() {
        // "v2.0" has no patch segment; guessing the next version from it
        // still bumps the *last* segment, which is the documented hazard
        // from spec §8 ("Tag v2.0 ... yields 2.1.devN").
        let v = Pep440Version::new(vec![2, 0]);
        let bumped = v.bump_release(0);
        assert_eq!(bumped.release, vec![2, 1]);
    }
}

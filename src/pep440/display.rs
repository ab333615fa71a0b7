//! C2 (part 3): canonical PEP 440 rendering.

use super::core::Pep440Version;
use std::fmt;

impl fmt::Display for Pep440Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}!", self.epoch)?;
        }

        let release = self
            .release
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{release}")?;

        if let Some((label, number)) = &self.pre {
            write!(f, "{}", label.as_str())?;
            if let Some(n) = number {
                write!(f, "{n}")?;
            }
        }

        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }

        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }

        if let Some(local) = &self.local {
            let rendered = local
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".");
            write!(f, "+{rendered}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pep440::core::{LocalSegment, PreReleaseLabel};

    #[test]
    fn renders_plain_release() {
        assert_eq!(Pep440Version::new(vec![1, 2, 3]).to_string(), "1.2.3");
    }

    #[test]
    fn renders_epoch() {
        let mut v = Pep440Version::new(vec![1, 0, 0]);
        v.epoch = 2;
        assert_eq!(v.to_string(), "2!1.0.0");
    }

    #[test]
    fn renders_dev_with_local() {
        let mut v = Pep440Version::new(vec![1, 2, 4]);
        v.dev = Some(1);
        v.local = Some(vec![LocalSegment::String("gabcdefg".into())]);
        assert_eq!(v.to_string(), "1.2.4.dev1+gabcdefg");
    }

    #[test]
    fn renders_pre_post_dev() {
        let mut v = Pep440Version::new(vec![1, 0, 0]);
        v.pre = Some((PreReleaseLabel::Rc, Some(1)));
        v.post = Some(2);
        v.dev = Some(3);
        assert_eq!(v.to_string(), "1.0.0rc1.post2.dev3");
    }
}

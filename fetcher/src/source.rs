use std::path::Path;

use crate::errors::FetcherError;

const FILE_SCHEME: &str = "file://";
const REMOTE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// An image source classified by scheme. The remote variant keeps the full
/// URL, the local variant the path after `file://`.
#[derive(Debug, PartialEq, Eq)]
pub enum Source<'a> {
    Local(&'a Path),
    Remote(&'a str),
}

impl<'a> Source<'a> {
    pub fn parse(source: &'a str) -> Result<Self, FetcherError> {
        if let Some(path) = source.strip_prefix(FILE_SCHEME) {
            return Ok(Self::Local(Path::new(path)));
        }

        if REMOTE_SCHEMES
            .iter()
            .any(|scheme| source.starts_with(scheme))
        {
            return Ok(Self::Remote(source));
        }

        Err(FetcherError::UnsupportedScheme(source.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_sources() {
        assert_eq!(
            Source::parse("file:///etc/hostname").unwrap(),
            Source::Local(Path::new("/etc/hostname"))
        );
        assert_eq!(
            Source::parse("https://example.com/a.png").unwrap(),
            Source::Remote("https://example.com/a.png")
        );
        assert_eq!(
            Source::parse("http://example.com/a.png").unwrap(),
            Source::Remote("http://example.com/a.png")
        );
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            Source::parse("ftp://example.com/a.png"),
            Err(FetcherError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            Source::parse("/etc/hostname"),
            Err(FetcherError::UnsupportedScheme(_))
        ));
    }
}

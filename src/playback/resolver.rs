use crate::types::experience::{ResolverConfig, SOURCE_REF_PLACEHOLDER};
use crate::types::track::Track;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    EmptyReference { title: String },
    Unresolvable { reference: String, reason: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::EmptyReference { title } => {
                write!(f, "track {title:?} has no source reference")
            }
            ResolveError::Unresolvable { reference, reason } => {
                write!(f, "cannot resolve {reference:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Turns a track's opaque source reference into a streamable URL.
pub trait SourceResolver {
    fn resolve(&self, track: &Track) -> Result<String, ResolveError>;
}

pub fn resolver_from_config(config: &ResolverConfig, base_dir: &Path) -> Box<dyn SourceResolver> {
    match config {
        ResolverConfig::Direct => Box::new(DirectResolver::new(base_dir)),
        ResolverConfig::Proxy { template } => Box::new(ProxyResolver::new(template)),
    }
}

/// URIs pass through; local paths become `file://` URIs.
pub struct DirectResolver {
    base_dir: PathBuf,
}

impl DirectResolver {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }
}

impl SourceResolver for DirectResolver {
    fn resolve(&self, track: &Track) -> Result<String, ResolveError> {
        let reference = track.source_reference.trim();
        if reference.is_empty() {
            return Err(ResolveError::EmptyReference {
                title: track.title.clone(),
            });
        }
        if reference.contains("://") {
            return Ok(reference.to_string());
        }
        let path = if Path::new(reference).is_absolute() {
            PathBuf::from(reference)
        } else {
            self.base_dir.join(reference)
        };
        if !path.exists() {
            return Err(ResolveError::Unresolvable {
                reference: reference.to_string(),
                reason: format!("{} does not exist", path.display()),
            });
        }
        path_to_file_uri(&path).ok_or_else(|| ResolveError::Unresolvable {
            reference: reference.to_string(),
            reason: format!("{} is not a valid file path", path.display()),
        })
    }
}

/// Routes opaque identifiers through an external proxy endpoint,
/// e.g. `https://host/api/audio?file_id={ref}`.
pub struct ProxyResolver {
    template: String,
}

impl ProxyResolver {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }
}

impl SourceResolver for ProxyResolver {
    fn resolve(&self, track: &Track) -> Result<String, ResolveError> {
        let reference = track.source_reference.trim();
        if reference.is_empty() {
            return Err(ResolveError::EmptyReference {
                title: track.title.clone(),
            });
        }
        if !self.template.contains(SOURCE_REF_PLACEHOLDER) {
            return Err(ResolveError::Unresolvable {
                reference: reference.to_string(),
                reason: "proxy template has no placeholder".to_string(),
            });
        }
        Ok(self
            .template
            .replace(SOURCE_REF_PLACEHOLDER, &urlencoding::encode(reference)))
    }
}

/// `file://` URI for a local path, relative paths taken from the working
/// directory. Reserved characters such as spaces and `#` are escaped.
pub fn path_to_file_uri(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).ok()?;
    Url::from_file_path(absolute).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(source: &str) -> Track {
        Track::new("Daddy's Home", "Shep & The Limelites", "", source)
    }

    #[test]
    fn test_direct_passes_uris_through() {
        let r = DirectResolver::new(Path::new("/nowhere"));
        assert_eq!(
            r.resolve(&track("https://cdn.example/a.mp3")).unwrap(),
            "https://cdn.example/a.mp3"
        );
    }

    #[test]
    fn test_direct_resolves_relative_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("song.mp3"), b"id3").unwrap();
        let r = DirectResolver::new(dir.path());
        let url = r.resolve(&track("song.mp3")).unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("song.mp3"));
    }

    #[test]
    fn test_direct_escapes_reserved_characters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my song#1.mp3"), b"id3").unwrap();
        let r = DirectResolver::new(dir.path());
        let uri = r.resolve(&track("my song#1.mp3")).unwrap();
        assert!(uri.ends_with("/my%20song%231.mp3"), "{uri}");
        let parsed = Url::parse(&uri).unwrap();
        assert!(parsed.fragment().is_none());
        assert_eq!(
            parsed.to_file_path().unwrap(),
            std::path::absolute(dir.path().join("my song#1.mp3")).unwrap()
        );
    }

    #[test]
    fn test_direct_missing_file_is_unresolvable() {
        let dir = tempfile::tempdir().unwrap();
        let r = DirectResolver::new(dir.path());
        assert!(matches!(
            r.resolve(&track("missing.mp3")),
            Err(ResolveError::Unresolvable { .. })
        ));
    }

    #[test]
    fn test_empty_reference() {
        let r = ProxyResolver::new("http://localhost/audio?file_id={ref}");
        assert!(matches!(
            r.resolve(&track("  ")),
            Err(ResolveError::EmptyReference { .. })
        ));
    }

    #[test]
    fn test_proxy_encodes_reference() {
        let r = ProxyResolver::new("http://localhost/audio?file_id={ref}");
        let url = r.resolve(&track("CQA+b/c=")).unwrap();
        assert_eq!(url, "http://localhost/audio?file_id=CQA%2Bb%2Fc%3D");
    }
}

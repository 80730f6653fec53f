//! Backend target resolution and upstream URL construction.
//!
//! # Responsibilities
//! - Parse the configured backend URL once into origin + base path
//! - Join incoming path segments and query onto that target
//!
//! # Design Decisions
//! - Parse failures yield an empty descriptor instead of an error; callers
//!   treat an empty origin as a hard misconfiguration (fail closed)
//! - Segments are joined verbatim: no decoding, no `..` normalization

use url::{Origin, Url};

/// Resolved origin and base path of the backend API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendTarget {
    origin: String,
    base_path: String,
}

impl BackendTarget {
    /// Resolve the configured backend URL.
    ///
    /// The origin is `scheme://host[:port]` (default ports omitted) and the base
    /// path is the URL path with trailing slashes stripped. Empty, relative or
    /// otherwise unparsable input produces an empty descriptor.
    pub fn resolve(configured_url: &str) -> Self {
        let trimmed = configured_url.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(url = %trimmed, error = %e, "Backend URL did not parse");
                return Self::default();
            }
        };

        match url.origin() {
            Origin::Tuple(..) => Self {
                origin: url.origin().ascii_serialization(),
                base_path: url.path().trim_end_matches('/').to_string(),
            },
            Origin::Opaque(_) => Self::default(),
        }
    }

    /// Origin of the backend, empty when forwarding is disabled.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Base path prefix without a trailing slash (possibly empty).
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Whether the descriptor points at a usable backend.
    pub fn is_configured(&self) -> bool {
        !self.origin.is_empty()
    }

    /// Build the upstream URL for the given path segments and raw query.
    ///
    /// A `?` is appended only when `query` is non-empty.
    pub fn build_url<S: AsRef<str>>(&self, segments: &[S], query: &str) -> String {
        let joined = segments
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("/");

        let mut target = format!("{}{}/{}", self.origin, self.base_path, joined);
        if !query.is_empty() {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

/// Split the raw path that follows a mount prefix into segments.
///
/// `"/a/b"` yields `["a", "b"]`; an empty remainder yields no segments.
pub fn trailing_segments(rest: &str) -> Vec<String> {
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_origin_and_base_path() {
        let target = BackendTarget::resolve("http://api.example.com:9000/v1/");
        assert_eq!(target.origin(), "http://api.example.com:9000");
        assert_eq!(target.base_path(), "/v1");
        assert!(target.is_configured());
    }

    #[test]
    fn test_resolve_strips_every_trailing_slash() {
        let target = BackendTarget::resolve("https://api.example.com/api//");
        assert_eq!(target.origin(), "https://api.example.com");
        assert_eq!(target.base_path(), "/api");
    }

    #[test]
    fn test_resolve_without_path_has_empty_base() {
        let target = BackendTarget::resolve("http://127.0.0.1:3000");
        assert_eq!(target.origin(), "http://127.0.0.1:3000");
        assert_eq!(target.base_path(), "");
    }

    #[test]
    fn test_default_port_is_omitted_from_origin() {
        let target = BackendTarget::resolve("https://api.example.com:443/x");
        assert_eq!(target.origin(), "https://api.example.com");
    }

    #[test]
    fn test_malformed_urls_fail_closed() {
        for input in ["", "   ", "not a url", "/relative/path", "mailto:ops@example.com"] {
            let target = BackendTarget::resolve(input);
            assert_eq!(target, BackendTarget::default(), "input {:?}", input);
            assert!(!target.is_configured());
        }
    }

    #[test]
    fn test_build_url_with_query() {
        let target = BackendTarget::resolve("http://h/api");
        assert_eq!(target.build_url(&["a", "b"], "x=1"), "http://h/api/a/b?x=1");
    }

    #[test]
    fn test_build_url_without_query_has_no_question_mark() {
        let target = BackendTarget::resolve("http://h/api");
        assert_eq!(target.build_url(&["a"], ""), "http://h/api/a");
    }

    #[test]
    fn test_build_url_keeps_segments_verbatim() {
        let target = BackendTarget::resolve("http://h");
        assert_eq!(
            target.build_url(&["..", "users%2F1", ""], ""),
            "http://h/../users%2F1/"
        );
    }

    #[test]
    fn test_trailing_segments() {
        assert_eq!(trailing_segments("/a/b"), vec!["a", "b"]);
        assert_eq!(trailing_segments("a"), vec!["a"]);
        assert_eq!(trailing_segments("/a/"), vec!["a", ""]);
        assert!(trailing_segments("").is_empty());
        assert!(trailing_segments("/").is_empty());
    }
}

//! URL parsing, absolutization, and origin classification.
//!
//! Built on the `url` crate, which implements RFC 3986 reference resolution
//! (dot-segment removal, authority/path/query/fragment merging). Inputs are
//! trimmed before parsing. Relative references are accepted wherever a base
//! is available to resolve them against.

use url::Url;

use crate::error::UrlError;

/// Parsed components of an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Lowercased scheme, without the trailing colon.
    pub scheme: String,
    /// Lowercased hostname, if the URL has an authority.
    pub host: Option<String>,
    /// Explicit port, if one appears in the URL.
    pub port: Option<u16>,
    /// Path component.
    pub path: String,
    /// Query string, without the leading `?`.
    pub query: Option<String>,
    /// Fragment, without the leading `#`.
    pub fragment: Option<String>,
}

impl UrlParts {
    /// The port used for origin comparison: the explicit port, or the
    /// scheme's registered default (80 for http, 443 for https).
    pub fn effective_port(&self) -> Option<u16> {
        self.port
            .or_else(|| match self.scheme.as_str() {
                "http" | "ws" => Some(80),
                "https" | "wss" => Some(443),
                _ => None,
            })
    }
}

fn parse_url(input: &str) -> Result<Url, UrlError> {
    Url::parse(input.trim()).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => {
            UrlError::RelativeWithoutBase(input.trim().to_string())
        }
        other => UrlError::Parse(other),
    })
}

/// Parse an absolute URL into its components.
///
/// Relative references fail with `UrlError::RelativeWithoutBase`; resolve
/// them through [`absolutize`] first.
pub fn parse(input: &str) -> Result<UrlParts, UrlError> {
    let url = parse_url(input)?;
    Ok(UrlParts {
        scheme: url.scheme().to_string(),
        host: url.host_str().map(str::to_string),
        port: url.port(),
        path: url.path().to_string(),
        query: url.query().map(str::to_string),
        fragment: url.fragment().map(str::to_string),
    })
}

/// Resolve `href` against `base` per RFC 3986 §5.
///
/// Handles href with its own scheme, protocol-relative (`//host/path`),
/// absolute-path (`/path`), and relative-path forms. Idempotent under
/// repeated resolution against the same base.
pub fn absolutize(base: &str, href: &str) -> Result<String, UrlError> {
    let base = parse_url(base)?;
    let resolved = base.join(href.trim())?;
    Ok(resolved.into())
}

/// Classify a URL as same-origin with the given location.
///
/// A relative candidate is absolutized against `location` before
/// comparison. Two URLs are same-origin iff scheme, hostname, and effective
/// port all match; the effective port is the explicit port or the scheme's
/// registered default (80 for http, 443 for https).
pub fn is_same_origin(candidate: &str, location: &str) -> Result<bool, UrlError> {
    let location = parse_url(location)?;
    let candidate = Url::options()
        .base_url(Some(&location))
        .parse(candidate.trim())?;

    Ok(candidate.scheme() == location.scheme()
        && candidate.host_str() == location.host_str()
        && candidate.port_or_known_default() == location.port_or_known_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Parse Tests ===

    #[test]
    fn test_parse_components() {
        let parts = parse("https://user:pw@host.example:8443/a/b?x=1#frag").unwrap();

        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.host.as_deref(), Some("host.example"));
        assert_eq!(parts.port, Some(8443));
        assert_eq!(parts.path, "/a/b");
        assert_eq!(parts.query.as_deref(), Some("x=1"));
        assert_eq!(parts.fragment.as_deref(), Some("frag"));
    }

    #[test]
    fn test_parse_trims_and_lowercases() {
        let parts = parse("  HTTP://Host.Example/Path  ").unwrap();

        assert_eq!(parts.scheme, "http");
        assert_eq!(parts.host.as_deref(), Some("host.example"));
        assert_eq!(parts.path, "/Path");
    }

    #[test]
    fn test_parse_relative_requires_base() {
        assert!(matches!(
            parse("/relative/path"),
            Err(UrlError::RelativeWithoutBase(_))
        ));
    }

    #[test]
    fn test_effective_port_defaults() {
        assert_eq!(parse("http://h/").unwrap().effective_port(), Some(80));
        assert_eq!(parse("https://h/").unwrap().effective_port(), Some(443));
        assert_eq!(parse("http://h:81/").unwrap().effective_port(), Some(81));
    }

    // === Absolutize Tests ===

    #[test]
    fn test_absolutize_own_scheme_href() {
        let out = absolutize("http://a.example/x/y", "https://b.example/z").unwrap();
        assert_eq!(out, "https://b.example/z");
    }

    #[test]
    fn test_absolutize_protocol_relative() {
        let out = absolutize("https://a.example/x/y", "//b.example/z").unwrap();
        assert_eq!(out, "https://b.example/z");
    }

    #[test]
    fn test_absolutize_absolute_path() {
        let out = absolutize("http://a.example/x/y?q=1", "/z").unwrap();
        assert_eq!(out, "http://a.example/z");
    }

    #[test]
    fn test_absolutize_relative_path_with_dot_segments() {
        let out = absolutize("http://a.example/x/y/z", "../w").unwrap();
        assert_eq!(out, "http://a.example/x/w");

        let out = absolutize("http://a.example/x/y/z", "./w").unwrap();
        assert_eq!(out, "http://a.example/x/y/w");
    }

    #[test]
    fn test_absolutize_idempotent() {
        let base = "http://a.example/x/y";
        for href in ["../w?q=2#f", "/z", "//b.example/p", "https://c.example/"] {
            let once = absolutize(base, href).unwrap();
            let twice = absolutize(base, &once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_absolutize_rejects_garbage_base() {
        assert!(absolutize("not a url", "/x").is_err());
    }

    // === Same-Origin Tests ===

    #[test]
    fn test_same_origin_reflexive() {
        for u in [
            "http://h.example/",
            "https://h.example:8443/a?b=c",
            "http://h.example:81/x",
        ] {
            assert!(is_same_origin(u, u).unwrap());
        }
    }

    #[test]
    fn test_same_origin_default_ports() {
        assert!(is_same_origin("http://h.example:80/a", "http://h.example/b").unwrap());
        assert!(is_same_origin("https://h.example:443/a", "https://h.example/b").unwrap());
        assert!(!is_same_origin("http://h.example:8080/a", "http://h.example/b").unwrap());
    }

    #[test]
    fn test_same_origin_scheme_and_host_must_match() {
        assert!(!is_same_origin("https://h.example/", "http://h.example/").unwrap());
        assert!(!is_same_origin("http://other.example/", "http://h.example/").unwrap());
    }

    #[test]
    fn test_same_origin_relative_candidate() {
        assert!(is_same_origin("/api/manifest", "http://h.example/page").unwrap());
        assert!(is_same_origin("manifest", "http://h.example/dir/page").unwrap());
    }

    #[test]
    fn test_same_origin_case_insensitive_host() {
        assert!(is_same_origin("HTTP://H.EXAMPLE/x", "http://h.example/").unwrap());
    }
}

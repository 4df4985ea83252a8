//! Trusted-referer policy for file retrieval.
//!
//! Requests embedded by the relay's own administrative pages skip access
//! logging and rating checks. Trust is decided on the parsed `Referer`: its
//! origin must equal the request origin and its path must sit under one of
//! the configured prefixes.

use url::Url;

#[derive(Debug, Clone)]
pub struct TrustedReferers {
    prefixes: Vec<String>,
}

impl TrustedReferers {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .filter_map(|p| {
                let p = p.as_ref().trim();
                let p = p.trim_end_matches('/');
                if p.is_empty() {
                    None
                } else if p.starts_with('/') {
                    Some(p.to_string())
                } else {
                    Some(format!("/{p}"))
                }
            })
            .collect();
        Self { prefixes }
    }

    /// Whether `referer` points at a trusted page of `request_origin`.
    pub fn is_trusted(&self, referer: Option<&str>, request_origin: &str) -> bool {
        let Some(referer) = referer.map(str::trim).filter(|r| !r.is_empty()) else {
            return false;
        };
        let (Ok(referer), Ok(origin)) = (Url::parse(referer), Url::parse(request_origin)) else {
            return false;
        };
        if referer.origin() != origin.origin() {
            return false;
        }

        let path = referer.path();
        self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://img.example.com";

    fn defaults() -> TrustedReferers {
        TrustedReferers::new(["/admin", "/list", "/block-img.html"])
    }

    #[test]
    fn same_origin_admin_pages_are_trusted() {
        let trusted = defaults();
        assert!(trusted.is_trusted(Some("https://img.example.com/admin"), ORIGIN));
        assert!(trusted.is_trusted(Some("https://img.example.com/admin/"), ORIGIN));
        assert!(trusted.is_trusted(Some("https://img.example.com/admin?page=2"), ORIGIN));
        assert!(trusted.is_trusted(Some("https://img.example.com/list#top"), ORIGIN));
        assert!(trusted.is_trusted(Some("https://img.example.com/block-img.html"), ORIGIN));
    }

    #[test]
    fn lookalike_paths_are_not_trusted() {
        let trusted = defaults();
        assert!(!trusted.is_trusted(Some("https://img.example.com/administrator"), ORIGIN));
        assert!(!trusted.is_trusted(Some("https://img.example.com/"), ORIGIN));
        assert!(!trusted.is_trusted(Some("https://img.example.com/x/admin"), ORIGIN));
    }

    #[test]
    fn foreign_origins_are_not_trusted() {
        let trusted = defaults();
        assert!(!trusted.is_trusted(Some("https://evil.example.net/admin"), ORIGIN));
        assert!(!trusted.is_trusted(Some("http://img.example.com/admin"), ORIGIN));
        assert!(!trusted.is_trusted(Some("https://img.example.com.evil.net/admin"), ORIGIN));
    }

    #[test]
    fn missing_or_garbage_referers_are_not_trusted() {
        let trusted = defaults();
        assert!(!trusted.is_trusted(None, ORIGIN));
        assert!(!trusted.is_trusted(Some(""), ORIGIN));
        assert!(!trusted.is_trusted(Some("/admin"), ORIGIN));
    }

    #[test]
    fn prefixes_are_normalized() {
        let trusted = TrustedReferers::new(["gallery/", "  ", "/"]);
        assert!(trusted.is_trusted(Some("https://img.example.com/gallery"), ORIGIN));
        assert!(!trusted.is_trusted(Some("https://img.example.com/other"), ORIGIN));
    }
}

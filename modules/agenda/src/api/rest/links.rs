//! Absolute URLs for hyperlinked renderings.

use axum::http::{header, HeaderMap, Uri};
use once_cell::sync::Lazy;
use regex::Regex;

// Domain name or bracketed IPv6 literal, optional port.
static HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9.-]+|\[[a-f0-9]*:[a-f0-9.:]+\])(:[0-9]+)?$")
        .expect("Invalid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Invalid HTTP_HOST header: {host:?}")]
    Invalid { host: String },
    #[error(
        "Invalid HTTP_HOST header: {host:?}. You may need to add {domain:?} to allowed_hosts."
    )]
    NotAllowed { host: String, domain: String },
}

#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    public_base_url: Option<String>,
    /// Empty accepts any well-formed host.
    allowed_hosts: Vec<String>,
}

impl LinkBuilder {
    pub fn new(public_base_url: Option<String>) -> Self {
        let public_base_url = public_base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        Self {
            public_base_url,
            allowed_hosts: Vec::new(),
        }
    }

    /// Entries are exact names, `.example.com` for a domain and its
    /// subdomains, or `*`.
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts.into_iter().map(|h| h.to_ascii_lowercase()).collect();
        self
    }

    /// Scheme and authority for links in a response to a request for `uri`
    /// carrying `headers`.
    ///
    /// The `Host` header wins over the URI authority (HTTP/2 sends only the
    /// latter). Empty when neither a base URL is configured nor a host is
    /// known, which makes links relative.
    pub fn base(&self, headers: &HeaderMap, uri: &Uri) -> Result<String, HostError> {
        if let Some(base) = &self.public_base_url {
            return Ok(base.clone());
        }
        let host = match headers.get(header::HOST) {
            Some(v) => v.to_str().map_err(|_| HostError::Invalid {
                host: String::from_utf8_lossy(v.as_bytes()).into_owned(),
            })?,
            None => match uri.authority() {
                Some(a) => a.as_str(),
                None => return Ok(String::new()),
            },
        };
        let host = self.checked_host(host)?;
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .or_else(|| uri.scheme_str().map(str::to_ascii_lowercase));
        let scheme = match scheme.as_deref() {
            Some("https") => "https",
            _ => "http",
        };
        Ok(format!("{scheme}://{host}"))
    }

    fn checked_host(&self, raw: &str) -> Result<String, HostError> {
        let host = raw.to_ascii_lowercase();
        let Some(caps) = HOST_RE.captures(&host) else {
            return Err(HostError::Invalid { host: raw.into() });
        };
        let domain = caps
            .get(1)
            .map_or("", |m| m.as_str())
            .trim_end_matches('.');
        if domain.is_empty() {
            return Err(HostError::Invalid { host: raw.into() });
        }
        let allowed = self.allowed_hosts.is_empty()
            || self.allowed_hosts.iter().any(|p| host_matches(p, domain));
        if allowed {
            Ok(host)
        } else {
            Err(HostError::NotAllowed {
                host: raw.into(),
                domain: domain.into(),
            })
        }
    }

    pub fn person_detail(base: &str, pk: i32) -> String {
        format!("{base}/api/persona/detail/{pk}")
    }
}

fn host_matches(pattern: &str, domain: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_prefix('.') {
        Some(suffix) => domain == suffix || domain.ends_with(pattern),
        None => domain == pattern,
    }
}

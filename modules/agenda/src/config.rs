use serde::{Deserialize, Serialize};

/// `modules.agenda` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgendaConfig {
    /// Scheme and authority used for hyperlinks, e.g. `https://agenda.example.com`.
    /// When unset the request's `Host` header is used.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Hosts accepted when links are built from the request. Entries are exact
    /// names, `.example.com` for a domain and its subdomains, or `*`. Empty
    /// accepts any well-formed host.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    #[serde(default = "default_max_search_keyword_length")]
    pub max_search_keyword_length: usize,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            public_base_url: None,
            allowed_hosts: Vec::new(),
            max_search_keyword_length: default_max_search_keyword_length(),
        }
    }
}

fn default_max_search_keyword_length() -> usize {
    100
}

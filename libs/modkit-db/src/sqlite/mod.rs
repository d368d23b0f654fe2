//! SQLite-specific helpers: DSN cleaning, PRAGMA parsing and path preparation.

mod path;
mod pragmas;

pub(crate) use path::prepare_sqlite_path;
pub(crate) use pragmas::Pragmas;

use std::collections::HashMap;

/// Query keys that configure PRAGMAs and must not reach sqlx.
const PRAGMA_KEYS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

/// Split a SQLite DSN into a sqlx-compatible DSN and the PRAGMA pairs it carried.
///
/// Keys are matched case-insensitively and returned lowercase. A DSN that is not
/// a parseable URL is returned unchanged with no pairs.
pub(crate) fn extract_sqlite_pragmas(dsn: &str) -> (String, HashMap<String, String>) {
    let Ok(mut url) = url::Url::parse(dsn) else {
        return (dsn.to_string(), HashMap::new());
    };

    let mut extracted = HashMap::new();
    let mut remaining = Vec::new();
    for (key, value) in url.query_pairs() {
        let lower = key.to_lowercase();
        if PRAGMA_KEYS.contains(&lower.as_str()) {
            extracted.insert(lower, value.into_owned());
        } else {
            remaining.push(format!("{key}={value}"));
        }
    }

    if extracted.is_empty() {
        return (dsn.to_string(), extracted);
    }

    url.set_query(None);
    if !remaining.is_empty() {
        url.set_query(Some(&remaining.join("&")));
    }
    (url.to_string(), extracted)
}

/// True for `sqlite::memory:`-style DSNs and shared-cache `mode=memory` URIs.
pub(crate) fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

//! SQLite PRAGMA parameters with typed values.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JournalMode {
    Delete,
    Wal,
    Memory,
    Truncate,
    Persist,
    Off,
}

impl JournalMode {
    fn as_sql(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Wal => "WAL",
            JournalMode::Memory => "MEMORY",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Off => "OFF",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DELETE" => Some(JournalMode::Delete),
            "WAL" => Some(JournalMode::Wal),
            "MEMORY" => Some(JournalMode::Memory),
            "TRUNCATE" => Some(JournalMode::Truncate),
            "PERSIST" => Some(JournalMode::Persist),
            "OFF" => Some(JournalMode::Off),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SyncMode {
    Off,
    Normal,
    Full,
    Extra,
}

impl SyncMode {
    fn as_sql(self) -> &'static str {
        match self {
            SyncMode::Off => "OFF",
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
            SyncMode::Extra => "EXTRA",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OFF" => Some(SyncMode::Off),
            "NORMAL" => Some(SyncMode::Normal),
            "FULL" => Some(SyncMode::Full),
            "EXTRA" => Some(SyncMode::Extra),
            _ => None,
        }
    }
}

/// Parsed PRAGMA parameters taken from a DSN query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pragmas {
    pub journal_mode: Option<JournalMode>,
    pub synchronous: Option<SyncMode>,
    pub busy_timeout_ms: Option<i64>,
    /// Shorthand `wal=true|false|1|0`; `journal_mode` wins when both are set.
    pub wal_toggle: Option<bool>,
}

impl Pragmas {
    /// Invalid values are logged and skipped.
    pub(crate) fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        let mut pragmas = Pragmas::default();

        for (key, value) in pairs {
            match key.to_lowercase().as_str() {
                "journal_mode" => match JournalMode::parse(value) {
                    Some(mode) => pragmas.journal_mode = Some(mode),
                    None => tracing::warn!("Invalid 'journal_mode' PRAGMA value '{}', ignoring", value),
                },
                "synchronous" => match SyncMode::parse(value) {
                    Some(mode) => pragmas.synchronous = Some(mode),
                    None => tracing::warn!("Invalid 'synchronous' PRAGMA value '{}', ignoring", value),
                },
                "busy_timeout" => match value.parse::<i64>() {
                    Ok(ms) if ms >= 0 => pragmas.busy_timeout_ms = Some(ms),
                    _ => tracing::warn!("Invalid 'busy_timeout' PRAGMA value '{}', ignoring", value),
                },
                "wal" => match value.to_lowercase().as_str() {
                    "true" | "1" => pragmas.wal_toggle = Some(true),
                    "false" | "0" => pragmas.wal_toggle = Some(false),
                    _ => tracing::warn!("Invalid 'wal' PRAGMA value '{}', ignoring", value),
                },
                _ => tracing::debug!("Unknown SQLite PRAGMA parameter: {}", key),
            }
        }

        pragmas
    }

    /// Statements to run on every new connection.
    ///
    /// In-memory databases default to `DELETE` journaling and skip `busy_timeout`.
    pub(crate) fn statements(&self, in_memory: bool, default_busy_ms: i64) -> Vec<String> {
        let journal = self
            .journal_mode
            .or(self.wal_toggle.map(|on| if on { JournalMode::Wal } else { JournalMode::Delete }))
            .unwrap_or(if in_memory { JournalMode::Delete } else { JournalMode::Wal });
        let sync = self.synchronous.unwrap_or(SyncMode::Normal);

        let mut out = vec![
            format!("PRAGMA journal_mode = {}", journal.as_sql()),
            format!("PRAGMA synchronous = {}", sync.as_sql()),
            "PRAGMA foreign_keys = ON".to_string(),
        ];
        if !in_memory {
            let busy = self.busy_timeout_ms.unwrap_or(default_busy_ms);
            out.push(format!("PRAGMA busy_timeout = {busy}"));
        }
        out
    }
}

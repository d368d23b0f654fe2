use std::io;
use std::path::PathBuf;

use super::is_memory_dsn;

/// Ensure the parent directory of a file-backed SQLite DSN exists.
///
/// Memory databases and DSNs without a usable path are left alone.
pub(crate) fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> io::Result<()> {
    if !create_dirs || is_memory_dsn(dsn) {
        return Ok(());
    }

    if let Some(parent) = file_path_from_dsn(dsn).as_deref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Extract the database file path from `sqlite:///abs`, `sqlite://rel` or `sqlite:rel`.
fn file_path_from_dsn(dsn: &str) -> Option<PathBuf> {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;

    if rest.starts_with("file:") {
        return None;
    }

    let path = rest.split_once('?').map_or(rest, |(p, _)| p);
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_paths_are_extracted() {
        assert_eq!(
            file_path_from_dsn("sqlite:///abs/agenda.db?wal=true"),
            Some(PathBuf::from("/abs/agenda.db"))
        );
        assert_eq!(
            file_path_from_dsn("sqlite://database/agenda.db"),
            Some(PathBuf::from("database/agenda.db"))
        );
        assert_eq!(
            file_path_from_dsn("sqlite:agenda.db"),
            Some(PathBuf::from("agenda.db"))
        );
        assert_eq!(file_path_from_dsn("sqlite:file:memdb?mode=memory"), None);
        assert_eq!(file_path_from_dsn("postgres://localhost/agenda"), None);
    }

    #[test]
    fn parent_dirs_are_created() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("nested").join("dir").join("agenda.db");
        let dsn = format!("sqlite://{}", db.to_string_lossy().replace('\\', "/"));

        prepare_sqlite_path(&dsn, true).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }

    #[test]
    fn memory_dsn_is_ignored() {
        prepare_sqlite_path("sqlite::memory:", true).unwrap();
    }
}

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Resolve the server home directory into an absolute path.
///
/// - `Some(path)`: `~` and `~/...` are expanded against the user's home; relative
///   paths are joined with the current working directory.
/// - `None`: platform default `<user home>/<default_subdir>`
///   (`%APPDATA%` on Windows, `$HOME` elsewhere).
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        Some(raw) => expand_user_path(raw.trim())?,
        None => platform_base_dir()?.join(default_subdir),
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home_dir '{}'", absolute.display()))?;
    }

    Ok(absolute)
}

fn expand_user_path(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("user home directory is not available"))
}

#[cfg(target_os = "windows")]
fn platform_base_dir() -> Result<PathBuf> {
    if let Some(appdata) = std::env::var_os("APPDATA") {
        return Ok(PathBuf::from(appdata));
    }
    dirs::config_dir().ok_or_else(|| anyhow!("APPDATA is not set"))
}

#[cfg(not(target_os = "windows"))]
fn platform_base_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home));
    }
    user_home()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested").join("home");
        let out = resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true)
            .unwrap();
        assert_eq!(out, target);
        assert!(out.is_dir());
    }

    #[test]
    fn tilde_is_expanded() {
        let out = resolve_home_dir(Some("~/.agenda_tilde_test".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(!out.to_string_lossy().starts_with('~'));
        assert!(out.ends_with(".agenda_tilde_test"));
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let out = resolve_home_dir(Some("relative/home".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("relative/home"));
    }
}

//! The `agenda-server` binary driven through its command line.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::sleep;
use std::time::Duration;

use tempfile::TempDir;

fn agenda_server(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agenda-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute agenda-server")
}

/// Write a config rooted in `dir` with the given extra YAML appended.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("agenda.yaml");
    let home = dir.to_string_lossy().replace('\\', "/");
    let content = format!(
        r#"
server:
  home_dir: "{home}"
  host: "127.0.0.1"
  port: 0

logging:
  default:
    console_level: info
    file: ""
{extra}"#
    );
    std::fs::write(&path, content).expect("Failed to write config file");
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_subcommands_and_flags() {
    let output = agenda_server(&["--help"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("agenda-server"));
    for needle in ["run", "check", "--config", "--port", "--mock", "--print-config"] {
        assert!(out.contains(needle), "help should mention {needle}: {out}");
    }
}

#[test]
fn version_is_printed() {
    let output = agenda_server(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_fails() {
    let output = agenda_server(&["invalid-command"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid-command"));
}

#[test]
fn missing_config_file_fails() {
    for flag in ["--config", "-c"] {
        let output = agenda_server(&[flag, "/nonexistent/agenda.yaml", "check"]);
        assert!(!output.status.success());
        assert!(
            stderr(&output).contains("config file not found"),
            "{}",
            stderr(&output)
        );
    }
}

#[test]
fn invalid_yaml_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "server: [unclosed").unwrap();

    let output = agenda_server(&["--config", path.to_str().unwrap(), "check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load config"), "{}", stderr(&output));
}

#[test]
fn unknown_top_level_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "unexpected: true\n");

    let output = agenda_server(&["--config", path.to_str().unwrap(), "check"]);
    assert!(!output.status.success());
}

#[test]
fn check_reports_database_and_modules() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "database:\n  url: \"sqlite://database/agenda.db\"\n");

    let output = agenda_server(&["--config", path.to_str().unwrap(), "check"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Configuration is valid"));
    assert!(out.contains("database/agenda.db"));
    for module in ["api_ingress", "todos", "agenda", "users"] {
        assert!(out.contains(module), "check should list {module}: {out}");
    }
}

#[test]
fn mock_ignores_the_configured_database() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "database:\n  url: \"postgresql://localhost/nonexistent\"\n",
    );

    let output = agenda_server(&["--config", path.to_str().unwrap(), "--mock", "check"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("sqlite::memory:"));
}

#[test]
fn print_config_applies_port_override() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "");

    let output = agenda_server(&["--config", path.to_str().unwrap(), "-p", "9123", "--print-config"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("port: 9123"));
}

#[test]
fn run_with_mock_database_keeps_serving() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "");

    let mut child = Command::new(env!("CARGO_BIN_EXE_agenda-server"))
        .args(["--config", path.to_str().unwrap(), "--mock", "run"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn agenda-server");

    sleep(Duration::from_secs(3));
    let status = child.try_wait().expect("Failed to poll agenda-server");
    let _ = child.kill();
    let output = child.wait_with_output().unwrap();
    assert!(
        status.is_none(),
        "server exited early: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

//! Shared E2E test helpers for `edgeperm` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Variables that would leak the developer's environment into a test run.
const ENV_OVERRIDES: &[&str] = &[
    "EDGEPERM_DEBUG",
    "EDGEPERM_AUDIT_LOG_ALLOWED",
    "EDGEPERM_IMMUTABLE_FIELDS",
    "EDGEPERM_LOG_LEVEL",
    "RUST_LOG",
];

/// Build a Command for the `edgeperm` binary isolated in a tempdir.
///
/// The global config points at a file that does not exist and the project
/// root is the tempdir, so only what the test writes there is loaded.
/// Returns (command, _guard); keep the guard alive for the whole test.
pub fn edgeperm_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp project dir");
    let cmd = edgeperm_cmd_in(tmp.path());
    (cmd, tmp)
}

/// Build a Command rooted at an existing project directory.
pub fn edgeperm_cmd_in(project: &Path) -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("edgeperm");
    cmd.timeout(TIMEOUT_BASIC);
    for var in ENV_OVERRIDES {
        cmd.env_remove(var);
    }
    let global = project.join("no-global-config.toml");
    cmd.args([
        "-C",
        project.to_str().expect("valid utf8"),
        "--config",
        global.to_str().expect("valid utf8"),
    ]);
    cmd
}

/// Write `.edgeperm/config.toml` under `project`.
pub fn write_project_config(project: &Path, content: &str) {
    let dir = project.join(".edgeperm");
    std::fs::create_dir_all(&dir).expect("create .edgeperm dir");
    std::fs::write(dir.join("config.toml"), content).expect("write project config");
}

#![allow(deprecated)]

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// Isolated working directory and home for one CLI invocation.
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// `rune` with a clean environment rooted in the temp directory.
    pub fn rune(&self) -> Command {
        let mut cmd = Command::cargo_bin("rune").unwrap();
        cmd.env_clear()
            .current_dir(self.path())
            .env("HOME", self.path())
            .env("NO_COLOR", "1")
            .env("RUNEFLOW_LOG", "info");
        cmd
    }
}

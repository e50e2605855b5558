//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a latchkey command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the temporary home directory
    /// - LATCHKEY_SERVER set when the test has a server
    /// - colors off and no inherited latchkey variables
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("latchkey").expect("failed to find latchkey binary");
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("LATCHKEY_HOME");
        cmd.env_remove("LATCHKEY_LOG");
        match &self.server {
            Some(uri) => cmd.env("LATCHKEY_SERVER", uri),
            None => cmd.env_remove("LATCHKEY_SERVER"),
        };
        cmd
    }

    /// Shortcut for `latchkey status`.
    pub fn status(&self) -> Output {
        self.cmd()
            .arg("status")
            .output()
            .expect("failed to run latchkey status")
    }

    /// Shortcut for `latchkey logout`.
    pub fn logout(&self) -> Output {
        self.cmd()
            .arg("logout")
            .output()
            .expect("failed to run latchkey logout")
    }

    /// Run `latchkey session` with `lines` piped to stdin.
    pub fn session(&self, lines: &[&str]) -> Output {
        let mut input = lines.join("\n");
        input.push('\n');
        self.cmd()
            .arg("session")
            .write_stdin(input)
            .output()
            .expect("failed to run latchkey session")
    }

    /// Shortcut for `latchkey config`.
    pub fn config(&self) -> Output {
        self.cmd()
            .arg("config")
            .output()
            .expect("failed to run latchkey config")
    }

    /// Shortcut for `latchkey config --init`.
    pub fn config_init(&self, force: bool) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["config", "--init"]);
        if force {
            cmd.arg("--force");
        }
        cmd.output().expect("failed to run latchkey config --init")
    }
}

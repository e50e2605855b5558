//! Test support utilities for latchkey integration tests.
//!
//! Provides an isolated home directory per test and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod server;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated home directory.
///
/// No process-global state is mutated; child processes get `HOME` and
/// the server URL through their own environment, so tests can run in
/// parallel.
pub struct Test {
    /// Temporary home directory
    pub home: TempDir,
    /// Server URL passed as `LATCHKEY_SERVER`
    pub server: Option<String>,
}

impl Test {
    /// Create a new environment with no config and no session.
    pub fn new() -> Self {
        let home = TempDir::new().expect("failed to create temp home");
        Self { home, server: None }
    }

    /// Create an environment pointed at `uri`.
    pub fn with_server(uri: &str) -> Self {
        let mut t = Self::new();
        t.server = Some(uri.to_string());
        t
    }

    /// `~/.latchkey` inside the temp home.
    pub fn latchkey_dir(&self) -> PathBuf {
        self.home.path().join(".latchkey")
    }

    pub fn session_file(&self) -> PathBuf {
        self.latchkey_dir().join("session.toml")
    }

    pub fn config_file(&self) -> PathBuf {
        self.latchkey_dir().join("config.toml")
    }

    /// Leave a token behind as an earlier process would.
    pub fn write_stale_session(&self, token: &str) {
        fs::create_dir_all(self.latchkey_dir()).unwrap();
        fs::write(
            self.session_file(),
            format!("token = \"{token}\"\nuser_id = \"1\"\n"),
        )
        .unwrap();
    }

    /// Write `config.toml` verbatim.
    pub fn write_config(&self, contents: &str) {
        fs::create_dir_all(self.latchkey_dir()).unwrap();
        fs::write(self.config_file(), contents).unwrap();
    }
}

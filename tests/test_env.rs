// Isolated environment for running the dubsim binary in tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

/// Variables the binary reads that must not leak in from the developer's shell
const INHERITED_VARS: [&str; 13] = [
    "DUBSIM_API_URL",
    "DUBSIM_DELAY_MS",
    "RUST_LOG",
    "AWS_PROFILE",
    "AWS_REGION",
    "AWS_DEFAULT_REGION",
    "AWS_S3_BUCKET",
    "AWS_ENDPOINT_URL",
    "AWS_ENDPOINT_URL_S3",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_CONFIG_FILE",
];

/// Temporary HOME plus a scrubbed environment for each spawned command
pub struct TestEnv {
    home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Write `~/.dubsim/rc` inside the temporary HOME
    pub fn write_rc(&self, content: &str) {
        let config_dir = self.home().join(".dubsim");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("rc"), content).unwrap();
    }

    /// `dubsim` with HOME pointed at the temp dir, no inherited config and no color
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("dubsim").unwrap();
        cmd.env("HOME", self.home())
            .env("NO_COLOR", "1")
            .env("AWS_EC2_METADATA_DISABLED", "true")
            .env("AWS_SHARED_CREDENTIALS_FILE", self.home().join(".aws").join("credentials"));
        for var in INHERITED_VARS {
            cmd.env_remove(var);
        }
        cmd
    }
}

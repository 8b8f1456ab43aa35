#![allow(deprecated)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const DEV1: &str = r#"
project "sandbox"

environment "dev1" {
    login-name "ubuntu"
    hostname "1.2.3.4"
    tags {
        env "prod"
    }
}
"#;

pub struct TestProject {
    pub root: TempDir,
    /// グローバル設定を隔離するためのディレクトリ
    pub config_home: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            config_home: tempfile::tempdir().unwrap(),
        }
    }

    pub fn write_flow_kdl(&self, content: &str) {
        let path = self.root.path().join("envflow.kdl");
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_state(&self, content: &str) {
        let dir = self.root.path().join(".envflow");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("state.json"), content).unwrap();
    }

    #[allow(dead_code)]
    pub fn read_state(&self) -> serde_json::Value {
        let path = self.root.path().join(".envflow").join("state.json");
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// プロジェクトディレクトリで envflow を実行するコマンド
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("envflow").unwrap();
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env_remove("ENVFLOW_CONFIG_PATH")
            .env_remove("ENVFLOW_CLOUD9_ENDPOINT")
            .env_remove("AWS_REGION")
            .env_remove("AWS_DEFAULT_REGION");
        cmd
    }
}

//! Test harness for codebind integration tests

use std::path::Path;
use std::process::Command;

pub use codebind::test_utils::{TestProject, full_header};

pub fn run_codebind(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = env!("CARGO_BIN_EXE_codebind");
    let output = Command::new(binary)
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run codebind");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

/// `codebind` as an `assert_cmd` command rooted at `dir`.
pub fn codebind(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("codebind").expect("codebind binary not built");
    cmd.current_dir(dir).env("NO_COLOR", "1");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_creates_temp_dir() {
        let project = TestProject::new();
        assert!(project.path().exists());
    }

    #[test]
    fn test_harness_add_file() {
        let project = TestProject::new();
        let file_path = project.add_file("src/main.go", &full_header("//", Some(1), "main.go", "core"));
        assert!(file_path.exists());
        assert!(project.read("src/main.go").contains("// [1] File: main.go"));
    }
}

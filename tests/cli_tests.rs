//! Integration tests for CLI wiring.
//!
//! These tests validate that the CLI is a thin adapter over the library
//! with JSON output on success and a JSON error payload on failure.

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use std::fs;
    use std::path::PathBuf;
    use std::process::Command;
    use tempfile::TempDir;

    /// Get the path to the fnscan binary.
    fn get_fnscan_binary() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_fnscan"))
    }

    fn mixed_workspace() -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp workspace");
        fs::write(
            dir.path().join("a.js"),
            "function greet(name) {\n  const prefix = 'Hello, ';\n  const message = prefix + name;\n  return message;\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.py"),
            "def total(values):\n    result = sum(values)\n    return result\n",
        )
        .unwrap();
        fs::write(dir.path().join("c.txt"), "notes\n").unwrap();
        dir
    }

    #[test]
    fn test_cli_scan_prints_json() {
        let workspace = mixed_workspace();

        let output = Command::new(get_fnscan_binary())
            .arg("scan")
            .arg(workspace.path())
            .output()
            .expect("Failed to run fnscan");

        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
        let filenames: Vec<&str> = json["filenames"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(filenames, vec!["./a.js", "./b.py", "./c.txt"]);

        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        let languages: Vec<&str> = records
            .iter()
            .map(|r| r["language"].as_str().unwrap())
            .collect();
        assert!(languages.contains(&"javascript"));
        assert!(languages.contains(&"python"));
        assert_eq!(json["stats"]["unsupported_files"], 1);
    }

    #[test]
    fn test_cli_min_lines_flag() {
        let workspace = mixed_workspace();

        let output = Command::new(get_fnscan_binary())
            .args(["scan", "--min-lines", "4"])
            .arg(workspace.path())
            .output()
            .expect("Failed to run fnscan");
        assert!(output.status.success());

        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "greet");
    }

    #[test]
    fn test_cli_missing_root_reports_error() {
        let workspace = TempDir::new().unwrap();

        let output = Command::new(get_fnscan_binary())
            .arg("scan")
            .arg(workspace.path().join("does-not-exist"))
            .output()
            .expect("Failed to run fnscan");

        assert_eq!(output.status.code(), Some(1));
        let payload: Value = serde_json::from_slice(&output.stderr).expect("stderr is JSON");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_kind"], "io");
    }

    #[test]
    fn test_cli_invalid_config_reports_error() {
        let workspace = mixed_workspace();
        let config = workspace.path().join("fnscan.json");
        fs::write(&config, r#"{"min_lines": 0}"#).unwrap();

        let output = Command::new(get_fnscan_binary())
            .arg("scan")
            .arg("--config")
            .arg(&config)
            .arg(workspace.path())
            .output()
            .expect("Failed to run fnscan");

        assert_eq!(output.status.code(), Some(1));
        let payload: Value = serde_json::from_slice(&output.stderr).unwrap();
        assert_eq!(payload["error_kind"], "config");
    }

    #[test]
    fn test_cli_languages_lists_every_tag() {
        let output = Command::new(get_fnscan_binary())
            .arg("languages")
            .output()
            .expect("Failed to run fnscan");
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        for tag in ["rust", "python", "javascript", "typescript", "c", "cpp", "java", "csharp"] {
            assert!(
                stdout.lines().any(|line| line.split_whitespace().next() == Some(tag)),
                "missing {} in:\n{}",
                tag,
                stdout
            );
        }
        assert!(stdout.contains("external-tool"));
        assert!(stdout.contains("grammar"));
    }
}

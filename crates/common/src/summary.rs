//! Run summary written by `--jsonOut`

use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::types::RunSummary;

/// Expand `~` and `$VAR`/`${VAR}` in a user-supplied path.
///
/// Unset variables are left as written.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full_with_context_no_errors(
        raw,
        || std::env::var("HOME").ok(),
        |name| std::env::var(name).ok(),
    );
    PathBuf::from(expanded.into_owned())
}

/// Write `summary` as indented JSON to the expanded `raw_path`
pub fn write_summary(raw_path: &str, summary: &RunSummary<'_>) -> Result<PathBuf> {
    let path = expand_path(raw_path);
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json)?;
    info!("wrote run summary to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadtestConfig;
    use crate::types::TestStatus;
    use serde_json::json;

    #[test]
    fn test_unknown_variable_is_kept() {
        let path = expand_path("out/$LOADTEST_SUMMARY_SURELY_UNSET_VAR/x.json");
        assert_eq!(
            path,
            PathBuf::from("out/$LOADTEST_SUMMARY_SURELY_UNSET_VAR/x.json")
        );
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let Ok(home) = std::env::var("HOME") else {
            return;
        };
        assert_eq!(expand_path("~/run.json"), PathBuf::from(home).join("run.json"));
    }

    #[test]
    fn test_written_summary_excludes_token() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.json");
        let config = LoadtestConfig {
            victim_host_url: "http://victim.example".to_string(),
            auth_token: "very-secret-token-value".to_string(),
            json_out: Some(out.display().to_string()),
            ..Default::default()
        };
        let status = TestStatus::from_json(json!({"state": "stopped", "stdout": "ok"}), "u").unwrap();

        let written = write_summary(&out.display().to_string(), &RunSummary::new(&config, &status)).unwrap();
        let text = std::fs::read_to_string(written).unwrap();

        assert!(!text.contains("very-secret-token-value"));
        assert!(text.contains("\n  \"args\": {"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["result"]["state"], "stopped");
        assert_eq!(value["args"]["victimHostUrl"], "http://victim.example");
    }
}

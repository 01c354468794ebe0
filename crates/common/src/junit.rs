//! JUnit report placement and pass/fail verdict
//!
//! The verdict is a plain substring test over the report text, not an XML
//! parse. A `<failure` that only appears inside `<system-out>` still fails
//! the run.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::artifacts::RESULTS_XML;
use crate::error::Result;

/// Report location relative to the data directory
pub const REPORT_DIR: &str = "test-results/loadtest";
pub const REPORT_FILE: &str = "results.xml";

/// Pass/fail reading of a results document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub has_testcase: bool,
    pub has_error: bool,
    pub has_failure: bool,
}

impl Verdict {
    pub fn from_xml(xml: &str) -> Self {
        Self {
            has_testcase: xml.contains("<testcase"),
            has_error: xml.contains("<error"),
            has_failure: xml.contains("<failure"),
        }
    }

    pub fn passed(&self) -> bool {
        self.has_testcase && !self.has_error && !self.has_failure
    }

    pub fn exit_code(&self) -> u8 {
        exit_code(Some(*self))
    }
}

/// Process exit status; a run with no report never passes
pub fn exit_code(verdict: Option<Verdict>) -> u8 {
    match verdict {
        Some(v) if v.passed() => 0,
        _ => 1,
    }
}

/// Move a downloaded `testResults.xml` to `test-results/loadtest/results.xml`.
///
/// Returns `None` when there is nothing to move.
pub fn relocate_results(data_dir: &Path) -> Result<Option<PathBuf>> {
    let downloaded = data_dir.join(RESULTS_XML);
    if !downloaded.is_file() {
        return Ok(None);
    }

    let report_dir = data_dir.join(REPORT_DIR);
    std::fs::create_dir_all(&report_dir)?;
    let report = report_dir.join(REPORT_FILE);
    std::fs::rename(&downloaded, &report)?;
    info!("moved {} to {}", downloaded.display(), report.display());
    Ok(Some(report))
}

/// Relocate the report, if any, and read its verdict
pub fn evaluate(data_dir: &Path) -> Result<Option<Verdict>> {
    let Some(report) = relocate_results(data_dir)? else {
        return Ok(None);
    };
    let xml = std::fs::read_to_string(&report)?;
    let verdict = Verdict::from_xml(&xml);
    info!(
        "junit verdict: testcase={} error={} failure={}",
        verdict.has_testcase, verdict.has_error, verdict.has_failure
    );
    Ok(Some(verdict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_not_element() {
        let xml = r#"<testsuite><testcase name="x"><system-out>no <failure here</system-out></testcase></testsuite>"#;
        assert!(!Verdict::from_xml(xml).passed());

        let xml = "<testcaseX/>";
        assert!(Verdict::from_xml(xml).passed());
    }

    #[test]
    fn test_no_report_exits_nonzero() {
        assert_eq!(exit_code(None), 1);
    }

    #[test]
    fn test_relocate_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(relocate_results(dir.path()).unwrap().is_none());
        assert!(!dir.path().join(REPORT_DIR).exists());
    }

    #[test]
    fn test_relocate_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RESULTS_XML), "<testcase/>").unwrap();

        let report = relocate_results(dir.path()).unwrap().unwrap();
        assert_eq!(report, dir.path().join("test-results/loadtest/results.xml"));
        assert!(!dir.path().join(RESULTS_XML).exists());
        assert_eq!(std::fs::read_to_string(report).unwrap(), "<testcase/>");
    }

    #[test]
    fn test_relocate_overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let report_dir = dir.path().join(REPORT_DIR);
        std::fs::create_dir_all(&report_dir).unwrap();
        std::fs::write(report_dir.join(REPORT_FILE), "<failure/>").unwrap();
        std::fs::write(dir.path().join(RESULTS_XML), "<testcase/>").unwrap();

        assert!(evaluate(dir.path()).unwrap().unwrap().passed());
    }
}

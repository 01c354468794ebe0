//! Console output for CLI

use colored::Colorize;

use loadtest_common::{ArtifactOutcome, TestId, TestStatus};

/// Print the service's stdout for a finished test, or note its absence
pub fn print_stdout_report(id: &TestId, status: &TestStatus) {
    match status.stdout.as_deref() {
        Some(stdout) => {
            println!("{} {}", ">>stdout from".bold(), id);
            println!("{}", stdout);
        }
        None => {
            println!("{} {}", ">>NO stdout from".yellow().bold(), id);
        }
    }
}

/// One line per file that could not be fetched
pub fn print_artifact_failures(outcome: &ArtifactOutcome) {
    for (name, err) in &outcome.failed {
        print_warning(&format!("{} not downloaded: {}", name, err));
    }
}

/// Final pass/fail line
pub fn print_verdict(exit_code: u8) {
    if exit_code == 0 {
        print_success("Load test passed");
    } else {
        print_error("Load test did not pass");
    }
}

pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

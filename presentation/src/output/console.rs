//! Console output formatter for sync reports

use colored::Colorize;
use harvest_application::SyncReport;

/// Formats sync reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the report as a human-readable summary
    pub fn format(report: &SyncReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "Synced:".cyan().bold(),
            report.repo
        ));

        output.push_str(&format!(
            "  {} {} pages ({} files, {} issues, {} pull requests)\n",
            "stored".green().bold(),
            report.processed,
            report.files,
            report.issues,
            report.pull_requests
        ));

        if report.skipped.is_empty() {
            output.push_str(&format!("  {} 0 items\n", "skipped".bold()));
        } else {
            output.push_str(&format!(
                "  {} {} items\n",
                "skipped".yellow().bold(),
                report.skipped.len()
            ));
            for skip in &report.skipped {
                output.push_str(&format!("    {} {}\n", "-".yellow(), skip));
            }
        }

        output
    }

    /// Format the report as JSON
    pub fn format_json(report: &SyncReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!("{{\"error\": \"report serialization failed: {}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> SyncReport {
        SyncReport {
            repo: "acme/widgets".to_string(),
            processed: 6,
            files: 4,
            issues: 2,
            pull_requests: 0,
            skipped: vec!["issue #3: no response received".to_string()],
        }
    }

    #[test]
    fn summary_includes_counts_and_skips() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&sample_report());

        assert!(text.contains("acme/widgets"));
        assert!(text.contains("6 pages"));
        assert!(text.contains("issue #3"));
    }

    #[test]
    fn json_output_round_trips() {
        let json = ConsoleFormatter::format_json(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["processed"], 6);
        assert_eq!(value["skipped"][0], "issue #3: no response received");
    }
}

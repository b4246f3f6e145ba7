use console::style;

use crate::scenarios::summary::{FindingKind, ScenarioSummary};
use crate::utils::formatting::format_duration;

/// Counts table printed at the end of a scenario.
pub fn format_summary(summary: &ScenarioSummary, elapsed_ms: u64) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{}\n",
        style(format!("{} scenario summary", summary.scenario)).white().bold()
    ));
    out.push_str(&format!("  Attempted: {}\n", summary.attempted));
    out.push_str(&format!("  Succeeded: {}\n", style(summary.succeeded).green()));
    let executed = if summary.executed > 0 {
        style(summary.executed).red().bold()
    } else {
        style(summary.executed).dim()
    };
    out.push_str(&format!("  Executed:  {}\n", executed));
    out.push_str(&format!("  Duration:  {}\n", format_duration(elapsed_ms)));
    if summary.interrupted {
        out.push_str(&format!("  {}\n", style("Interrupted: results are partial").yellow()));
    }
    out
}

/// Confirmed findings, most severe first: executions, reachable files,
/// accepted uploads, then directories.
pub fn format_findings(summary: &ScenarioSummary) -> String {
    const ORDER: &[FindingKind] = &[
        FindingKind::CodeExecuted,
        FindingKind::FileReachable,
        FindingKind::UploadAccepted,
        FindingKind::DirectoryAccessible,
        FindingKind::DirectoryProtected,
    ];

    let mut out = String::new();
    for kind in ORDER {
        let mut findings = summary.findings_of(*kind);
        if findings.is_empty() {
            continue;
        }
        findings.sort_by(|a, b| a.url.cmp(&b.url));
        out.push_str(&format!("\n  {} ({})\n", style(kind.as_str()).bold(), findings.len()));
        for finding in findings {
            out.push_str(&format!("    {} [{}]\n", finding.url, finding.technique));
            if let Some(evidence) = &finding.evidence {
                out.push_str(&format!("      {}\n", style(evidence).dim()));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::summary::Finding;

    #[test]
    fn test_format_summary_counts() {
        console::set_colors_enabled(false);
        let mut summary = ScenarioSummary::new("basic");
        summary.attempted = 3;
        summary.succeeded = 1;
        let text = format_summary(&summary, 1500);
        assert!(text.contains("basic scenario summary"));
        assert!(text.contains("Attempted: 3"));
        assert!(text.contains("Succeeded: 1"));
        assert!(text.contains("1.5s"));
    }

    #[test]
    fn test_format_findings_orders_executions_first() {
        console::set_colors_enabled(false);
        let mut summary = ScenarioSummary::new("basic");
        summary.findings.push(Finding {
            kind: FindingKind::UploadAccepted,
            technique: "basic upload".into(),
            url: "http://t/upload.php".into(),
            evidence: None,
        });
        summary.findings.push(Finding {
            kind: FindingKind::CodeExecuted,
            technique: "basic upload".into(),
            url: "http://t/uploads/test.php".into(),
            evidence: Some("PHP Version: 8".into()),
        });
        let text = format_findings(&summary);
        let executed = text.find("code executed").unwrap();
        let accepted = text.find("upload accepted").unwrap();
        assert!(executed < accepted);
        assert!(text.contains("PHP Version: 8"));
    }
}

use std::collections::BTreeSet;

use serde::Serialize;

use crate::discovery::{DiscoveryResult, FileHit};
use crate::probe::UploadResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    UploadAccepted,
    FileReachable,
    CodeExecuted,
    DirectoryAccessible,
    DirectoryProtected,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::UploadAccepted => "upload accepted",
            FindingKind::FileReachable => "file reachable",
            FindingKind::CodeExecuted => "code executed",
            FindingKind::DirectoryAccessible => "directory accessible",
            FindingKind::DirectoryProtected => "directory protected",
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub technique: String,
    pub url: String,
    pub evidence: Option<String>,
}

/// One upload and the technique that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub technique: String,
    pub result: UploadResult,
}

/// Aggregate outcome of one scenario run.
///
/// `executed` counts distinct filenames confirmed to run server-side, so an
/// upload found executing in two directories counts once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub executed: usize,
    pub findings: Vec<Finding>,
    pub uploads: Vec<Attempt>,
    pub interrupted: bool,
    #[serde(skip)]
    executed_names: BTreeSet<String>,
}

impl ScenarioSummary {
    pub fn new(scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            ..Default::default()
        }
    }

    /// An upload that never produced a response.
    pub fn record_failed_attempt(&mut self) {
        self.attempted += 1;
    }

    pub fn record_upload(&mut self, technique: &str, endpoint: &str, result: &UploadResult) {
        self.attempted += 1;
        if result.success {
            self.succeeded += 1;
            self.findings.push(Finding {
                kind: FindingKind::UploadAccepted,
                technique: technique.to_string(),
                url: endpoint.to_string(),
                evidence: Some(format!(
                    "{} accepted as {} (HTTP {})",
                    result.original_filename, result.filename, result.status_code
                )),
            });
        }
        self.uploads.push(Attempt {
            technique: technique.to_string(),
            result: result.clone(),
        });
    }

    /// Accepted uploads, in the order they were made.
    pub fn accepted_uploads(&self) -> Vec<Attempt> {
        self.accepted_since(0)
    }

    /// Accepted uploads among those recorded from position `start` on.
    pub fn accepted_since(&self, start: usize) -> Vec<Attempt> {
        self.uploads
            .iter()
            .skip(start)
            .filter(|a| a.result.success)
            .cloned()
            .collect()
    }

    /// Record fetch hits for uploaded or hunted files.
    pub fn record_hits(&mut self, technique: &str, hits: &[FileHit]) {
        for hit in hits {
            let kind = if hit.executed {
                self.executed_names.insert(hit.filename.clone());
                FindingKind::CodeExecuted
            } else {
                FindingKind::FileReachable
            };
            self.findings.push(Finding {
                kind,
                technique: technique.to_string(),
                url: hit.url.clone(),
                evidence: hit.evidence.clone(),
            });
        }
        self.executed = self.executed_names.len();
    }

    pub fn record_directories<'a>(&mut self, technique: &str, results: impl IntoIterator<Item = &'a DiscoveryResult>) {
        for result in results {
            let kind = if result.accessible {
                FindingKind::DirectoryAccessible
            } else {
                FindingKind::DirectoryProtected
            };
            self.findings.push(Finding {
                kind,
                technique: technique.to_string(),
                url: result.url.clone(),
                evidence: Some(format!("HTTP {}", result.status_code)),
            });
        }
    }

    pub fn findings_of(&self, kind: FindingKind) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.kind == kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(success: bool) -> UploadResult {
        UploadResult {
            filename: "test_1_0.php".into(),
            original_filename: "test.php".into(),
            content_type: None,
            field_name: "file".into(),
            status_code: if success { 200 } else { 403 },
            response_length: 0,
            location: None,
            response_excerpt: String::new(),
            success,
            tested_extension: None,
        }
    }

    fn hit(dir: &str, executed: bool) -> FileHit {
        FileHit {
            directory: dir.into(),
            filename: "test_1_0.php".into(),
            url: format!("http://t/{}test_1_0.php", dir),
            status_code: 200,
            content_length: 10,
            content_type: "text/html".into(),
            executed,
            evidence: executed.then(|| "PHP Version: 8".to_string()),
        }
    }

    #[test]
    fn test_record_upload_counts() {
        let mut summary = ScenarioSummary::new("basic");
        summary.record_upload("basic upload", "http://t/up", &upload(true));
        summary.record_upload("basic upload", "http://t/up", &upload(false));
        summary.record_failed_attempt();
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.accepted_uploads().len(), 1);
        assert_eq!(summary.findings_of(FindingKind::UploadAccepted).len(), 1);
    }

    #[test]
    fn test_executed_counts_distinct_files() {
        let mut summary = ScenarioSummary::new("basic");
        summary.record_hits("basic upload", &[hit("uploads/", true), hit("", true), hit("files/", false)]);
        assert_eq!(summary.executed, 1);
        assert_eq!(summary.findings_of(FindingKind::CodeExecuted).len(), 2);
        assert_eq!(summary.findings_of(FindingKind::FileReachable).len(), 1);
    }
}

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::Migr8Error;
use crate::scenarios::summary::ScenarioSummary;

/// JSON report written with `--output`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub run_id: Uuid,
    pub tool_version: String,
    pub build: Option<String>,
    pub scenario: String,
    pub upload_url: Option<String>,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: ScenarioSummary,
}

impl ScanReport {
    pub fn new(
        upload_url: Option<String>,
        base_url: String,
        started_at: DateTime<Utc>,
        summary: ScenarioSummary,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            build: option_env!("GIT_HASH")
                .or(option_env!("BUILD_TIMESTAMP"))
                .map(str::to_string),
            scenario: summary.scenario.clone(),
            upload_url,
            base_url,
            started_at,
            finished_at: Utc::now(),
            summary,
        }
    }
}

/// Write the report through a temporary sibling so readers never see a
/// half-written file.
pub async fn write_report(path: &Path, report: &ScanReport) -> Result<(), Migr8Error> {
    let json = serde_json::to_string_pretty(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

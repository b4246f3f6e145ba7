use tracing::debug;

use super::context::ScenarioContext;
use super::summary::ScenarioSummary;
use crate::discovery::{DiscoveryEngine, FileHit};
use crate::errors::Migr8Error;
use crate::probe::{UploadProbe, UploadRequest, UploadResult};
use crate::utils::formatting::format_bytes;

/// Upload once and fold the outcome into `summary`.
///
/// A non-fatal failure (network, timeout, bad request) counts as an attempt
/// and yields `Ok(None)`; a fatal one ends the scenario.
pub(crate) async fn attempt_upload(
    ctx: &ScenarioContext,
    probe: &UploadProbe,
    technique: &str,
    request: &UploadRequest,
    summary: &mut ScenarioSummary,
) -> Result<Option<UploadResult>, Migr8Error> {
    let endpoint = ctx.upload_endpoint()?;
    ctx.reporter.info(format!("Testing: {}", technique));

    match probe.upload(endpoint, request).await {
        Ok(result) => {
            report_upload(ctx, technique, &result);
            summary.record_upload(technique, endpoint, &result);
            Ok(Some(result))
        }
        Err(e) => {
            let class = e.classify();
            debug!(technique, error_type = class.error_type, error = %e, "Upload request failed");
            if class.fatal {
                return Err(e);
            }
            ctx.reporter.error(format!("{}: request failed ({})", technique, e));
            summary.record_failed_attempt();
            Ok(None)
        }
    }
}

pub(crate) fn report_upload(ctx: &ScenarioContext, technique: &str, result: &UploadResult) {
    if result.success {
        ctx.reporter.success(format!(
            "{}: accepted {} (HTTP {}, {})",
            technique,
            result.filename,
            result.status_code,
            format_bytes(result.response_length)
        ));
    } else {
        ctx.reporter.error(format!(
            "{}: rejected {} (HTTP {}, {})",
            technique,
            result.filename,
            result.status_code,
            format_bytes(result.response_length)
        ));
    }
}

pub(crate) fn report_hits(ctx: &ScenarioContext, hits: &[FileHit]) {
    for hit in hits {
        if hit.executed {
            ctx.reporter.success(format!("Code execution confirmed: {}", hit.url));
            if let Some(evidence) = &hit.evidence {
                ctx.reporter.info(format!("Evidence: {}", evidence));
            }
        } else {
            ctx.reporter.warning(format!("File reachable but not executed: {}", hit.url));
        }
    }
}

/// Look for every upload accepted since position `start` in `directories`.
/// Each upload has already completed, so its file can be searched for.
pub(crate) async fn verify_uploads(
    ctx: &ScenarioContext,
    engine: &DiscoveryEngine,
    directories: &[String],
    start: usize,
    summary: &mut ScenarioSummary,
) -> Result<(), Migr8Error> {
    for attempt in summary.accepted_since(start) {
        if ctx.is_cancelled() {
            summary.interrupted = true;
            break;
        }
        ctx.reporter.info(format!("Looking for {} in {} directories", attempt.result.filename, directories.len()));
        let hits = engine
            .find_files(ctx.base_url(), directories, std::slice::from_ref(&attempt.result.filename))
            .await?;
        if hits.is_empty() {
            ctx.reporter.info(format!("{} not found in any checked directory", attempt.result.filename));
        }
        report_hits(ctx, &hits);
        summary.record_hits(&attempt.technique, &hits);
    }
    Ok(())
}

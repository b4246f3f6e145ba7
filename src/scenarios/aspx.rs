use async_trait::async_trait;
use tracing::info;

use super::context::ScenarioContext;
use super::summary::ScenarioSummary;
use super::verify::{attempt_upload, report_upload, verify_uploads};
use super::{Scenario, ScenarioKind};
use crate::classify::{ExecutionRules, UploadRules};
use crate::errors::Migr8Error;
use crate::payloads::bypasses::{ASPX_EXTENSIONS, ASPX_UPLOAD_DIRS};
use crate::payloads::Payload;
use crate::probe::UploadRequest;

/// The three ASPX upload attempts: as text, as a binary blob, and renamed to
/// `.txt`. Returns `(technique, filename, content type)`.
fn attempts(stem: &str, ext: &str, ctx: &ScenarioContext) -> Vec<(&'static str, String, &'static str)> {
    let ext = if ext.is_empty() { ".aspx" } else { ext };
    vec![
        ("ASPX as text/plain", ctx.names.unique_with_extension(stem, ext), "text/plain"),
        ("ASPX as octet-stream", ctx.names.unique_with_extension(stem, ext), "application/octet-stream"),
        ("ASPX disguised as .txt", ctx.names.unique_with_extension(stem, ".txt"), "text/plain"),
    ]
}

pub struct AspxScenario;

#[async_trait]
impl Scenario for AspxScenario {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Aspx
    }

    async fn run(&self, ctx: &ScenarioContext) -> Result<ScenarioSummary, Migr8Error> {
        let endpoint = ctx.upload_endpoint()?;
        let payload = ctx.payload_or(Payload::bundled_aspx()).await?;
        let mut summary = ScenarioSummary::new(self.kind().as_str());

        info!(endpoint, payload = %payload.name, "Starting ASPX upload testing");
        ctx.reporter.section("ASPX upload");

        let probe = ctx.upload_probe(UploadRules::aspx());
        let field = ctx.field_for(endpoint).await;
        let (stem, ext) = payload.split_name();

        for (i, (technique, filename, content_type)) in attempts(stem, ext, ctx).into_iter().enumerate() {
            if ctx.is_cancelled() {
                summary.interrupted = true;
                return Ok(summary);
            }
            if i > 0 {
                ctx.pace().await;
            }
            let request = UploadRequest {
                filename,
                original_filename: payload.name.clone(),
                content: payload.content.clone(),
                content_type: Some(content_type.to_string()),
                field_name: field.clone(),
            };
            attempt_upload(ctx, &probe, technique, &request, &mut summary).await?;
        }

        let engine = ctx.engine(ExecutionRules::aspx_probe());
        let directories = ctx.upload_dirs(ASPX_UPLOAD_DIRS);

        if summary.succeeded > 0 {
            ctx.reporter.section("ASPX execution check");
            verify_uploads(ctx, &engine, &directories, 0, &mut summary).await?;
        }

        if ctx.is_cancelled() {
            summary.interrupted = true;
            return Ok(summary);
        }

        ctx.reporter.section("ASPX extension variants");
        let variants_start = summary.uploads.len();
        let results = probe
            .upload_extension_variants(endpoint, &payload, ASPX_EXTENSIONS, &field, &ctx.names, ctx.config.delay)
            .await;
        for result in &results {
            let technique = format!("extension {}", result.tested_extension.as_deref().unwrap_or("?"));
            report_upload(ctx, &technique, result);
            summary.record_upload(&technique, endpoint, result);
        }

        let accepted: Vec<&str> = results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.tested_extension.as_deref())
            .collect();
        if !accepted.is_empty() {
            ctx.reporter.success(format!("Accepted extensions: {}", accepted.join(", ")));
            verify_uploads(ctx, &engine, &directories, variants_start, &mut summary).await?;
        }

        summary.interrupted |= ctx.is_cancelled();
        Ok(summary)
    }
}

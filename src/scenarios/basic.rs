use async_trait::async_trait;
use tracing::{debug, info};

use super::context::ScenarioContext;
use super::summary::ScenarioSummary;
use super::verify::{attempt_upload, report_upload, verify_uploads};
use super::{Scenario, ScenarioKind};
use crate::classify::{ExecutionRules, UploadRules};
use crate::errors::Migr8Error;
use crate::payloads::bypasses::{COMMON_UPLOAD_DIRS, PHP_BYPASS_EXTENSIONS};
use crate::payloads::Payload;
use crate::probe::UploadRequest;
use crate::recon::{analyze_headers, HeaderAnalysis};

/// Header fingerprint, one upload, then a search for the uploaded file.
pub struct BasicScenario;

#[async_trait]
impl Scenario for BasicScenario {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Basic
    }

    async fn run(&self, ctx: &ScenarioContext) -> Result<ScenarioSummary, Migr8Error> {
        let endpoint = ctx.upload_endpoint()?;
        let payload = ctx.payload_or(Payload::bundled_php()).await?;
        let mut summary = ScenarioSummary::new(self.kind().as_str());

        info!(endpoint, payload = %payload.name, "Starting basic upload test");

        ctx.reporter.section("Step 1: Header analysis");
        match analyze_headers(&ctx.client, endpoint).await {
            Ok(analysis) => report_headers(ctx, &analysis),
            Err(e) => {
                debug!(error = %e, "Header analysis failed");
                ctx.reporter.warning(format!("Header analysis failed: {}", e));
            }
        }

        ctx.reporter.section("Step 2: Upload");
        let probe = ctx.upload_probe(UploadRules::generic());
        let field = ctx.field_for(endpoint).await;
        let request = UploadRequest {
            filename: ctx.names.unique(&payload.name),
            original_filename: payload.name.clone(),
            content: payload.content.clone(),
            content_type: None,
            field_name: field.clone(),
        };
        attempt_upload(ctx, &probe, "basic upload", &request, &mut summary).await?;

        if ctx.config.extension_variants && !ctx.is_cancelled() {
            ctx.reporter.section("Step 2b: Extension variants");
            let results = probe
                .upload_extension_variants(endpoint, &payload, PHP_BYPASS_EXTENSIONS, &field, &ctx.names, ctx.config.delay)
                .await;
            for result in &results {
                let technique = format!("extension {}", result.tested_extension.as_deref().unwrap_or("?"));
                report_upload(ctx, &technique, result);
                summary.record_upload(&technique, endpoint, result);
            }
        }

        if summary.succeeded == 0 {
            ctx.reporter.error("No upload was accepted, skipping execution check");
            summary.interrupted = ctx.is_cancelled();
            return Ok(summary);
        }

        ctx.reporter.section("Step 3: Execution check");
        let engine = ctx.engine(ExecutionRules::default());
        let directories = ctx.upload_dirs(COMMON_UPLOAD_DIRS);
        verify_uploads(ctx, &engine, &directories, 0, &mut summary).await?;

        summary.interrupted |= ctx.is_cancelled();
        Ok(summary)
    }
}

fn report_headers(ctx: &ScenarioContext, analysis: &HeaderAnalysis) {
    let server = &analysis.server_info;
    if let Some(web_server) = &server.web_server {
        ctx.reporter.info(format!("Web server: {}", web_server));
    }
    if let Some(language) = &server.language {
        ctx.reporter.info(format!("Language: {}", language));
    }
    ctx.reporter.info(format!(
        "Security headers: {}/{} properly configured",
        analysis.secure_header_count(),
        analysis.security_headers.len()
    ));
    if analysis.restrictions.csrf_protection {
        ctx.reporter.warning("CSRF protection header present, uploads may need a token");
    }
    if analysis.restrictions.authentication_required {
        ctx.reporter.warning("Endpoint asks for authentication");
    }
    for issue in &analysis.issues {
        ctx.reporter.warning(format!("[{}] {}", issue.severity, issue.description));
    }
}

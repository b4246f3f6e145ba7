use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::filename::FilenameGenerator;
use crate::classify::{classify_upload, UploadRules};
use crate::errors::Migr8Error;
use crate::http::ProbeClient;
use crate::payloads::Payload;
use crate::utils::truncation::{excerpt, MAX_EXCERPT_CHARS};

/// Companion form fields sent with every upload, mimicking a browser submit.
const COMPANION_FIELDS: &[(&str, &str)] = &[
    ("submit", "Upload"),
    ("action", "upload"),
    ("MAX_FILE_SIZE", "10485760"),
];

#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name sent in the multipart part.
    pub filename: String,
    /// Name of the payload the upload was derived from.
    pub original_filename: String,
    pub content: Vec<u8>,
    /// Declared MIME type of the part; omitted when `None`.
    pub content_type: Option<String>,
    pub field_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub filename: String,
    pub original_filename: String,
    pub content_type: Option<String>,
    pub field_name: String,
    pub status_code: u16,
    pub response_length: usize,
    pub location: Option<String>,
    pub response_excerpt: String,
    pub success: bool,
    pub tested_extension: Option<String>,
}

/// Submits multipart uploads and classifies the answers.
#[derive(Debug, Clone)]
pub struct UploadProbe {
    client: ProbeClient,
    rules: UploadRules,
}

impl UploadProbe {
    pub fn new(client: ProbeClient, rules: UploadRules) -> Self {
        Self { client, rules }
    }

    pub fn rules(&self) -> &UploadRules {
        &self.rules
    }

    /// One multipart POST. Never retried; a transport failure is an `Err`.
    pub async fn upload(&self, endpoint: &str, request: &UploadRequest) -> Result<UploadResult, Migr8Error> {
        let mut part = Part::bytes(request.content.clone()).file_name(request.filename.clone());
        if let Some(content_type) = &request.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                Migr8Error::Http(format!("Invalid content type '{}': {}", content_type, e))
            })?;
        }

        let form = COMPANION_FIELDS
            .iter()
            .fold(Form::new().part(request.field_name.clone(), part), |form, (name, value)| {
                form.text(*name, *value)
            });

        debug!(
            endpoint,
            filename = %request.filename,
            content_type = ?request.content_type,
            field = %request.field_name,
            "Uploading"
        );

        let response = self.client.post_multipart(endpoint, form).await?;
        let success = classify_upload(response.status, &response.body, &self.rules);

        Ok(UploadResult {
            filename: request.filename.clone(),
            original_filename: request.original_filename.clone(),
            content_type: request.content_type.clone(),
            field_name: request.field_name.clone(),
            status_code: response.status,
            response_length: response.content_length,
            location: response.location().map(|l| l.to_string()),
            response_excerpt: excerpt(&response.body, MAX_EXCERPT_CHARS),
            success,
            tested_extension: None,
        })
    }

    /// Upload `payload` once per extension, each time through a scratch file
    /// carrying that extension, pausing `delay` between uploads. Failed
    /// variants are logged and skipped.
    pub async fn upload_extension_variants(
        &self,
        endpoint: &str,
        payload: &Payload,
        extensions: &[&str],
        field_name: &str,
        names: &FilenameGenerator,
        delay: Duration,
    ) -> Vec<UploadResult> {
        let (stem, _) = payload.split_name();
        let mut results = Vec::with_capacity(extensions.len());

        for (i, ext) in extensions.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.upload_variant(endpoint, payload, stem, ext, field_name, names).await {
                Ok(result) => {
                    info!(extension = %ext, status = result.status_code, success = result.success, "Extension variant tested");
                    results.push(result);
                }
                Err(e) => warn!(extension = %ext, error = %e, "Extension variant failed"),
            }
        }

        results
    }

    async fn upload_variant(
        &self,
        endpoint: &str,
        payload: &Payload,
        stem: &str,
        ext: &str,
        field_name: &str,
        names: &FilenameGenerator,
    ) -> Result<UploadResult, Migr8Error> {
        // Removed with the directory when `scratch` drops, on every exit path
        let scratch = tempfile::Builder::new().prefix("migr8-").tempdir()?;
        let path = scratch.path().join(format!("{}{}", stem, ext));
        tokio::fs::write(&path, &payload.content).await?;

        let variant = Payload::from_file(&path).await?;
        let request = UploadRequest {
            filename: names.unique_with_extension(stem, ext),
            original_filename: variant.name,
            content: variant.content,
            content_type: None,
            field_name: field_name.to_string(),
        };

        let mut result = self.upload(endpoint, &request).await?;
        result.tested_extension = Some(ext.to_string());
        Ok(result)
    }
}

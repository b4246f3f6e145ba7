use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::classify::{ExecutionRules, IndicatorRules, UploadRules};
use crate::discovery::{DiscoveryEngine, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH};
use crate::errors::Migr8Error;
use crate::http::{ClientOptions, ProbeClient};
use crate::payloads::bypasses::owned;
use crate::payloads::Payload;
use crate::probe::{detect_upload_field, FilenameGenerator, UploadProbe};
use crate::reporting::Reporter;

pub const DEFAULT_DELAY_MS: u64 = 500;

/// Where uploads go and where their results are looked for. Fixed per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub upload_url: Option<String>,
    pub base_url: String,
}

/// Effective run settings after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub target: ProbeTarget,
    pub payload: Option<PathBuf>,
    pub wordlist: Option<PathBuf>,
    pub client: ClientOptions,
    pub concurrency: usize,
    /// Pause between sequential upload techniques.
    pub delay: Duration,
    pub max_depth: usize,
    pub field_name: Option<String>,
    /// Replaces each scenario's built-in upload directory list.
    pub upload_dirs: Option<Vec<String>>,
    pub rules: IndicatorRules,
    /// Also sweep PHP-family extensions in the basic scenario.
    pub extension_variants: bool,
    pub progress: bool,
}

impl ScenarioConfig {
    pub fn new(target: ProbeTarget) -> Self {
        Self {
            target,
            payload: None,
            wordlist: None,
            client: ClientOptions::default(),
            concurrency: DEFAULT_CONCURRENCY,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            max_depth: DEFAULT_MAX_DEPTH,
            field_name: None,
            upload_dirs: None,
            rules: IndicatorRules::default(),
            extension_variants: false,
            progress: false,
        }
    }
}

/// Everything a scenario needs for one run.
pub struct ScenarioContext {
    pub config: ScenarioConfig,
    pub client: ProbeClient,
    pub names: FilenameGenerator,
    pub reporter: Reporter,
    cancel: CancellationToken,
}

impl ScenarioContext {
    pub fn new(config: ScenarioConfig, reporter: Reporter, cancel: CancellationToken) -> Result<Self, Migr8Error> {
        let client = ProbeClient::new(config.client.clone())?;
        Ok(Self {
            config,
            client,
            names: FilenameGenerator::new(),
            reporter,
            cancel,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.target.base_url
    }

    pub fn upload_endpoint(&self) -> Result<&str, Migr8Error> {
        self.config
            .target
            .upload_url
            .as_deref()
            .ok_or_else(|| Migr8Error::Config("This scenario needs an upload endpoint (--target)".into()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Discovery engine using `rules` unless the config overrides them.
    pub fn engine(&self, rules: ExecutionRules) -> DiscoveryEngine {
        DiscoveryEngine::new(self.client.clone(), self.config.concurrency)
            .with_execution_rules(self.config.rules.execution_or(rules))
            .with_cancel_token(self.cancel.clone())
            .with_progress(self.config.progress)
    }

    /// Upload probe using `rules` unless the config overrides them.
    pub fn upload_probe(&self, rules: UploadRules) -> UploadProbe {
        UploadProbe::new(self.client.clone(), self.config.rules.upload_or(rules))
    }

    pub fn upload_dirs(&self, default: &[&str]) -> Vec<String> {
        self.config.upload_dirs.clone().unwrap_or_else(|| owned(default))
    }

    /// The operator payload, or `fallback` when none was given.
    pub async fn payload_or(&self, fallback: Payload) -> Result<Payload, Migr8Error> {
        match &self.config.payload {
            Some(path) => Payload::from_file(path).await,
            None => Ok(fallback),
        }
    }

    pub async fn field_for(&self, endpoint: &str) -> String {
        match &self.config.field_name {
            Some(field) => field.clone(),
            None => detect_upload_field(&self.client, endpoint).await,
        }
    }

    /// Sleep the inter-technique delay, waking early on cancellation.
    pub async fn pace(&self) {
        if self.config.delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.config.delay) => {}
            _ = self.cancel.cancelled() => {}
        }
    }
}

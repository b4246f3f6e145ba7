//! Named workflows composing uploads, classification and discovery.

pub mod aspx;
pub mod basic;
pub mod bruteforce;
pub mod content_type;
pub mod context;
pub mod htaccess;
pub mod recursive;
pub mod registry;
pub mod summary;
mod verify;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::Migr8Error;

pub use context::{ProbeTarget, ScenarioConfig, ScenarioContext, DEFAULT_DELAY_MS};
pub use registry::create_scenario;
pub use summary::{Finding, FindingKind, ScenarioSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Upload a payload and look for it in common upload directories
    Basic,
    /// ASP.NET payloads, upload variants and extension sweep
    Aspx,
    /// .htaccess handler overrides with rogue-extension companions
    Htaccess,
    /// Wordlist sweep for directories or a known filename
    Bruteforce,
    /// Spoofed MIME types and PDF disguises
    ContentType,
    /// Recursive directory discovery followed by a file hunt
    Recursive,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Basic => "basic",
            ScenarioKind::Aspx => "aspx",
            ScenarioKind::Htaccess => "htaccess",
            ScenarioKind::Bruteforce => "bruteforce",
            ScenarioKind::ContentType => "content-type",
            ScenarioKind::Recursive => "recursive",
        }
    }

    /// Whether the scenario uploads and therefore needs an upload endpoint.
    pub fn requires_upload_endpoint(&self) -> bool {
        matches!(
            self,
            ScenarioKind::Basic | ScenarioKind::Aspx | ScenarioKind::Htaccess | ScenarioKind::ContentType
        )
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[async_trait]
pub trait Scenario: Send + Sync {
    fn kind(&self) -> ScenarioKind;

    /// Run every technique of the scenario. Individual technique failures are
    /// reported and skipped; only setup errors end the run.
    async fn run(&self, ctx: &ScenarioContext) -> Result<ScenarioSummary, Migr8Error>;
}

use async_trait::async_trait;
use tracing::info;

use super::context::ScenarioContext;
use super::summary::ScenarioSummary;
use super::verify::report_hits;
use super::{Scenario, ScenarioKind};
use crate::classify::ExecutionRules;
use crate::discovery::load_wordlist;
use crate::errors::Migr8Error;
use crate::payloads::bypasses::{owned, DEFAULT_SHELL_NAMES};
use crate::payloads::Payload;

/// Recursive directory discovery, then a hunt for the payload (or common
/// shell names) inside everything found.
pub struct RecursiveScenario;

#[async_trait]
impl Scenario for RecursiveScenario {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Recursive
    }

    async fn run(&self, ctx: &ScenarioContext) -> Result<ScenarioSummary, Migr8Error> {
        let wordlist = load_wordlist(ctx.config.wordlist.as_deref()).await?;
        let filenames = match &ctx.config.payload {
            Some(path) => vec![Payload::from_file(path).await?.name],
            None => owned(DEFAULT_SHELL_NAMES),
        };
        let max_depth = ctx.config.max_depth;

        info!(candidates = wordlist.len(), max_depth, filenames = ?filenames, "Starting smart enumeration");
        ctx.reporter.section("Recursive enumeration");
        ctx.reporter.warning(format!(
            "Up to {} levels over {} candidates; request count grows with each level",
            max_depth,
            wordlist.len()
        ));

        let engine = ctx.engine(ExecutionRules::default());
        let result = engine
            .smart_enumeration(ctx.base_url(), &filenames, &wordlist, max_depth)
            .await?;

        let mut summary = ScenarioSummary::new(self.kind().as_str());
        let accessible = result.enumeration.accessible();
        for dir in &accessible {
            ctx.reporter.success(format!("Accessible: {} (HTTP {})", dir.url, dir.status_code));
        }
        for dir in result.enumeration.protected() {
            ctx.reporter.warning(format!("Protected: {}", dir.url));
        }
        summary.record_directories("recursive enumeration", result.enumeration.all_paths());

        ctx.reporter.info(format!(
            "Searched {} directories for {} filenames",
            result.searched_directories.len(),
            filenames.len()
        ));
        report_hits(ctx, &result.files);
        summary.record_hits("smart enumeration", &result.files);

        summary.attempted = wordlist.len();
        summary.succeeded = accessible.len() + result.files.len();
        summary.interrupted = ctx.is_cancelled() || result.enumeration.interrupted;
        Ok(summary)
    }
}

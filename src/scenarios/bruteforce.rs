use async_trait::async_trait;
use tracing::info;

use super::context::ScenarioContext;
use super::summary::ScenarioSummary;
use super::verify::report_hits;
use super::{Scenario, ScenarioKind};
use crate::classify::ExecutionRules;
use crate::discovery::load_wordlist;
use crate::errors::Migr8Error;
use crate::payloads::Payload;

/// With a payload: look for its basename in every wordlist directory.
/// Without: a plain directory sweep.
pub struct BruteforceScenario;

#[async_trait]
impl Scenario for BruteforceScenario {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Bruteforce
    }

    async fn run(&self, ctx: &ScenarioContext) -> Result<ScenarioSummary, Migr8Error> {
        let wordlist = load_wordlist(ctx.config.wordlist.as_deref()).await?;
        let engine = ctx.engine(ExecutionRules::default());
        let mut summary = ScenarioSummary::new(self.kind().as_str());

        match &ctx.config.payload {
            Some(path) => {
                let payload = Payload::from_file(path).await?;
                info!(filename = %payload.name, directories = wordlist.len(), "Searching for uploaded file");
                ctx.reporter.section(&format!("Searching for {}", payload.name));

                let mut directories = vec![String::new()];
                directories.extend(wordlist.iter().cloned());

                let hits = engine
                    .find_files(ctx.base_url(), &directories, std::slice::from_ref(&payload.name))
                    .await?;
                summary.attempted = directories.len();
                summary.succeeded = hits.len();
                report_hits(ctx, &hits);
                summary.record_hits("path bruteforce", &hits);

                if hits.is_empty() {
                    ctx.reporter.error(format!("{} not found in any directory", payload.name));
                }
            }
            None => {
                info!(candidates = wordlist.len(), "Directory sweep");
                ctx.reporter.section("Directory bruteforce");

                let report = engine
                    .enumerate_directories(ctx.base_url(), &wordlist, false, ctx.config.max_depth)
                    .await?;
                summary.attempted = wordlist.len();
                summary.succeeded = report.accessible().len();

                for dir in report.accessible() {
                    ctx.reporter.success(format!("Accessible: {} (HTTP {})", dir.url, dir.status_code));
                }
                for dir in report.protected() {
                    ctx.reporter.warning(format!("Protected: {}", dir.url));
                }
                summary.record_directories("directory bruteforce", report.all_paths());
            }
        }

        summary.interrupted = ctx.is_cancelled();
        Ok(summary)
    }
}

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::results::{DiscoveryResult, EnumerationReport, FileHit, RecursiveResult, SmartEnumeration};
use super::sink::ResultSink;
use super::wordlist::{dedup_candidates, normalize_segment};
use crate::classify::{matched_execution_indicator, ExecutionRules};
use crate::errors::Migr8Error;
use crate::http::ProbeClient;
use crate::utils::truncation::evidence_snippet;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Recursive sweeps above this many candidates get a cost warning.
const LARGE_RECURSION_WORDLIST: usize = 50;

#[derive(Debug, Clone)]
pub struct DiscoveryEngine {
    client: ProbeClient,
    concurrency: usize,
    execution_rules: Arc<ExecutionRules>,
    cancel: CancellationToken,
    progress: bool,
}

impl DiscoveryEngine {
    pub fn new(client: ProbeClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            execution_rules: Arc::new(ExecutionRules::default()),
            cancel: CancellationToken::new(),
            progress: false,
        }
    }

    pub fn with_execution_rules(mut self, rules: ExecutionRules) -> Self {
        self.execution_rules = Arc::new(rules);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Probe every distinct candidate directory under `base_url` once.
    ///
    /// Redirects are not followed so 301/302 count as accessible. Results come
    /// back in completion order.
    pub async fn sweep(&self, base_url: &str, candidates: &[String]) -> Result<Vec<DiscoveryResult>, Migr8Error> {
        let base = parse_base(base_url)?;
        let targets: Vec<(String, Url)> = dedup_candidates(candidates)
            .into_iter()
            .filter_map(|candidate| {
                let url = join_dir(&base, &candidate)?;
                Some((candidate, url))
            })
            .collect();

        debug!(base = %base, candidates = targets.len(), concurrency = self.concurrency, "Directory sweep");

        let sink = ResultSink::new();
        let bar = self.progress_bar(targets.len() as u64, "directories");

        let probes = stream::iter(targets)
            .map(|(candidate, url)| {
                let client = self.client.clone();
                let sink = sink.clone();
                let bar = bar.clone();
                async move {
                    match client.get_no_redirect(url.as_str()).await {
                        Ok(response) => {
                            if let Some(result) = DiscoveryResult::from_response(&candidate, url.as_str(), &response) {
                                if result.accessible {
                                    info!(url = %result.url, status = result.status_code, "Accessible directory");
                                } else {
                                    info!(url = %result.url, "Protected directory");
                                }
                                sink.push(result).await;
                            }
                        }
                        Err(e) => debug!(url = %url, error = %e, "Directory probe failed"),
                    }
                    bar.inc(1);
                }
            })
            .buffer_unordered(self.concurrency);

        self.drive(probes).await;
        bar.finish_and_clear();

        Ok(sink.drain().await)
    }

    /// Sweep `dir_url` and descend into its accessible entries.
    ///
    /// Returns `None` once `current_depth` reaches `max_depth`. Protected
    /// entries are reported but never entered.
    pub fn recurse<'a>(
        &'a self,
        dir_url: &'a str,
        candidates: &'a [String],
        max_depth: usize,
        current_depth: usize,
    ) -> BoxFuture<'a, Result<Option<RecursiveResult>, Migr8Error>> {
        Box::pin(async move {
            if current_depth >= max_depth || self.is_cancelled() {
                return Ok(None);
            }

            info!(depth = current_depth + 1, url = %dir_url, "Recursive enumeration");
            let found_paths = self.sweep(dir_url, candidates).await?;

            let mut children = Vec::new();
            for entry in found_paths.iter().filter(|r| r.accessible) {
                if let Some(child) = self.recurse(&entry.url, candidates, max_depth, current_depth + 1).await? {
                    children.push(child);
                }
            }

            Ok(Some(RecursiveResult {
                base_url: dir_url.to_string(),
                depth: current_depth + 1,
                found_paths,
                children,
            }))
        })
    }

    /// Probe every directory × filename pair from a single bounded queue.
    ///
    /// A hit is an HTTP 200 on the file URL; each hit carries the execution
    /// verdict for its filename.
    pub async fn find_files(
        &self,
        base_url: &str,
        directories: &[String],
        filenames: &[String],
    ) -> Result<Vec<FileHit>, Migr8Error> {
        let base = parse_base(base_url)?;

        let mut targets = Vec::with_capacity(directories.len() * filenames.len());
        for directory in directories {
            for filename in filenames {
                match join_file(&base, directory, filename) {
                    Some(url) => targets.push((directory.clone(), filename.clone(), url)),
                    None => debug!(directory = %directory, filename = %filename, "Unjoinable file path"),
                }
            }
        }

        info!(combinations = targets.len(), "Testing directory/file combinations");

        let sink = ResultSink::new();
        let bar = self.progress_bar(targets.len() as u64, "files");

        let probes = stream::iter(targets)
            .map(|(directory, filename, url)| {
                let client = self.client.clone();
                let rules = Arc::clone(&self.execution_rules);
                let sink = sink.clone();
                let bar = bar.clone();
                async move {
                    match client.get(url.as_str()).await {
                        Ok(response) if response.status == 200 => {
                            let indicator = matched_execution_indicator(
                                response.status,
                                &response.body,
                                response.content_type(),
                                &filename,
                                &rules,
                            );
                            let hit = FileHit {
                                directory,
                                filename,
                                url: url.to_string(),
                                status_code: response.status,
                                content_length: response.content_length,
                                content_type: response.content_type().to_string(),
                                executed: indicator.is_some(),
                                evidence: indicator.map(|i| evidence_snippet(&response.body, i)),
                            };
                            if hit.executed {
                                warn!(url = %hit.url, "Uploaded file executed");
                            } else {
                                info!(url = %hit.url, "File reachable");
                            }
                            sink.push(hit).await;
                        }
                        Ok(response) => debug!(url = %url, status = response.status, "File not found"),
                        Err(e) => debug!(url = %url, error = %e, "File probe failed"),
                    }
                    bar.inc(1);
                }
            })
            .buffer_unordered(self.concurrency);

        self.drive(probes).await;
        bar.finish_and_clear();

        Ok(sink.drain().await)
    }

    /// Sweep the base URL, then optionally recurse into each accessible
    /// directory. The top-level sweep counts as the first of `max_depth` levels.
    pub async fn enumerate_directories(
        &self,
        base_url: &str,
        candidates: &[String],
        recursive: bool,
        max_depth: usize,
    ) -> Result<EnumerationReport, Migr8Error> {
        if recursive && candidates.len() > LARGE_RECURSION_WORDLIST {
            warn!(
                candidates = candidates.len(),
                max_depth,
                "Recursive enumeration grows as candidates^depth; this may take a while"
            );
        }

        let directories = self.sweep(base_url, candidates).await?;

        let mut recursive_results = Vec::new();
        if recursive {
            for dir in directories.iter().filter(|r| r.accessible) {
                if let Some(tree) = self.recurse(&dir.url, candidates, max_depth, 1).await? {
                    recursive_results.push(tree);
                }
            }
        }

        Ok(EnumerationReport {
            base_url: base_url.to_string(),
            directories,
            recursive: recursive_results,
            interrupted: self.is_cancelled(),
        })
    }

    /// Recursive directory discovery, then a file hunt inside the web root and
    /// every accessible directory found.
    pub async fn smart_enumeration(
        &self,
        base_url: &str,
        filenames: &[String],
        candidates: &[String],
        max_depth: usize,
    ) -> Result<SmartEnumeration, Migr8Error> {
        let enumeration = self.enumerate_directories(base_url, candidates, true, max_depth).await?;

        let base = parse_base(base_url)?;
        let mut searched_directories = vec![String::new()];
        for entry in enumeration.accessible() {
            if let Some(relative) = relative_dir(&base, &entry.url) {
                if !searched_directories.contains(&relative) {
                    searched_directories.push(relative);
                }
            }
        }

        let files = if self.is_cancelled() {
            Vec::new()
        } else {
            info!(directories = searched_directories.len(), filenames = filenames.len(), "Searching discovered directories");
            self.find_files(base_url, &searched_directories, filenames).await?
        };

        Ok(SmartEnumeration {
            enumeration,
            searched_directories,
            files,
        })
    }

    /// Pull the probe stream to completion or until cancelled. In-flight
    /// probes are dropped on cancellation.
    async fn drive<S>(&self, probes: S) -> bool
    where
        S: Stream<Item = ()>,
    {
        let mut probes = std::pin::pin!(probes);
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Discovery interrupted, keeping partial results");
                    return true;
                }
                next = probes.next() => {
                    if next.is_none() {
                        return false;
                    }
                }
            }
        }
    }

    fn progress_bar(&self, len: u64, label: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:30.cyan/dark_gray} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_message(label.to_string());
        bar
    }
}

/// Parse a base URL, insisting on http(s) with a host, and end its path with `/`.
pub fn parse_base(base_url: &str) -> Result<Url, Migr8Error> {
    let mut url = Url::parse(base_url.trim())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Migr8Error::InvalidTarget(format!("Not an http(s) URL: {}", base_url)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// `base/segment/`, or the base itself for an empty segment.
pub fn join_dir(base: &Url, segment: &str) -> Option<Url> {
    let segment = normalize_segment(segment);
    if segment.is_empty() {
        return Some(base.clone());
    }
    // "./" keeps a colon in the segment from reading as a scheme
    base.join(&format!("./{}/", segment)).ok()
}

/// `base/directory/filename`, or `base/filename` for an empty directory.
pub fn join_file(base: &Url, directory: &str, filename: &str) -> Option<Url> {
    let directory = normalize_segment(directory);
    let relative = if directory.is_empty() {
        format!("./{}", filename)
    } else {
        format!("./{}/{}", directory, filename)
    };
    base.join(&relative).ok()
}

/// Path of `url` below `base`, without surrounding slashes.
fn relative_dir(base: &Url, url: &str) -> Option<String> {
    url.strip_prefix(base.as_str())
        .map(|rest| rest.trim_matches('/').to_string())
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_adds_trailing_slash() {
        let base = parse_base("http://example.com/app").unwrap();
        assert_eq!(base.as_str(), "http://example.com/app/");
    }

    #[test]
    fn test_parse_base_rejects_non_http() {
        assert!(matches!(parse_base("ftp://example.com"), Err(Migr8Error::InvalidTarget(_))));
        assert!(matches!(parse_base("not a url"), Err(Migr8Error::InvalidTarget(_))));
    }

    #[test]
    fn test_join_dir() {
        let base = parse_base("http://example.com/app/").unwrap();
        assert_eq!(join_dir(&base, "uploads").unwrap().as_str(), "http://example.com/app/uploads/");
        assert_eq!(join_dir(&base, "/uploads/").unwrap().as_str(), "http://example.com/app/uploads/");
        assert_eq!(join_dir(&base, "").unwrap().as_str(), "http://example.com/app/");
        assert_eq!(join_dir(&base, "a:b").unwrap().as_str(), "http://example.com/app/a:b/");
    }

    #[test]
    fn test_join_file() {
        let base = parse_base("http://example.com").unwrap();
        assert_eq!(
            join_file(&base, "uploads/", "test.php").unwrap().as_str(),
            "http://example.com/uploads/test.php"
        );
        assert_eq!(join_file(&base, "", "test.php").unwrap().as_str(), "http://example.com/test.php");
    }

    #[test]
    fn test_relative_dir() {
        let base = parse_base("http://example.com/app/").unwrap();
        assert_eq!(relative_dir(&base, "http://example.com/app/uploads/2024/"), Some("uploads/2024".to_string()));
        assert_eq!(relative_dir(&base, "http://example.com/app/"), None);
        assert_eq!(relative_dir(&base, "http://other.com/x/"), None);
    }
}

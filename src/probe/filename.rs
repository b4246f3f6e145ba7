use std::sync::atomic::{AtomicU64, Ordering};

use crate::payloads::split_extension;

/// Generates test filenames that never repeat within a run.
///
/// Names look like `{stem}_{run token}_{sequence}{ext}`: the run token is the
/// start time in milliseconds and the sequence increases on every call, so two
/// uploads in the same second still differ.
#[derive(Debug)]
pub struct FilenameGenerator {
    run_token: i64,
    sequence: AtomicU64,
}

impl FilenameGenerator {
    pub fn new() -> Self {
        Self::with_token(chrono::Utc::now().timestamp_millis())
    }

    pub fn with_token(run_token: i64) -> Self {
        Self {
            run_token,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn run_token(&self) -> i64 {
        self.run_token
    }

    /// Unique name keeping the original's final extension.
    pub fn unique(&self, original: &str) -> String {
        let (stem, ext) = split_extension(original);
        self.unique_with_extension(stem, ext)
    }

    /// Unique name with an explicit, possibly multi-dot, extension.
    pub fn unique_with_extension(&self, stem: &str, ext: &str) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}_{}{}", stem, self.run_token, seq, ext)
    }
}

impl Default for FilenameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

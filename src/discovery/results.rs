use serde::Serialize;

use crate::http::ProbeResponse;

/// How a directory answered a sweep probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    Accessible,
    Protected,
}

impl PathStatus {
    /// 200/301/302 are accessible, 403 is protected, anything else is noise.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200 | 301 | 302 => Some(PathStatus::Accessible),
            403 => Some(PathStatus::Protected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiscoveryResult {
    pub path: String,
    pub url: String,
    pub status_code: u16,
    pub content_length: usize,
    pub content_type: String,
    pub accessible: bool,
    pub protected: bool,
}

impl DiscoveryResult {
    pub fn from_response(path: &str, url: &str, response: &ProbeResponse) -> Option<Self> {
        let status = PathStatus::from_status(response.status)?;
        Some(Self {
            path: path.to_string(),
            url: url.to_string(),
            status_code: response.status,
            content_length: response.content_length,
            content_type: response.content_type().to_string(),
            accessible: status == PathStatus::Accessible,
            protected: status == PathStatus::Protected,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHit {
    pub directory: String,
    pub filename: String,
    pub url: String,
    pub status_code: u16,
    pub content_length: usize,
    pub content_type: String,
    pub executed: bool,
    /// Text around the matched execution indicator.
    pub evidence: Option<String>,
}

/// One level of recursive enumeration and everything found below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecursiveResult {
    pub base_url: String,
    pub depth: usize,
    pub found_paths: Vec<DiscoveryResult>,
    pub children: Vec<RecursiveResult>,
}

impl RecursiveResult {
    /// Every result in this subtree, depth first.
    pub fn all_paths(&self) -> Vec<&DiscoveryResult> {
        let mut paths: Vec<&DiscoveryResult> = self.found_paths.iter().collect();
        for child in &self.children {
            paths.extend(child.all_paths());
        }
        paths
    }

    pub fn deepest(&self) -> usize {
        self.children
            .iter()
            .map(RecursiveResult::deepest)
            .max()
            .unwrap_or(self.depth)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnumerationReport {
    pub base_url: String,
    pub directories: Vec<DiscoveryResult>,
    pub recursive: Vec<RecursiveResult>,
    pub interrupted: bool,
}

impl EnumerationReport {
    /// Top-level and recursive results together.
    pub fn all_paths(&self) -> Vec<&DiscoveryResult> {
        let mut paths: Vec<&DiscoveryResult> = self.directories.iter().collect();
        for tree in &self.recursive {
            paths.extend(tree.all_paths());
        }
        paths
    }

    pub fn accessible(&self) -> Vec<&DiscoveryResult> {
        self.all_paths().into_iter().filter(|r| r.accessible).collect()
    }

    pub fn protected(&self) -> Vec<&DiscoveryResult> {
        self.all_paths().into_iter().filter(|r| r.protected).collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SmartEnumeration {
    pub enumeration: EnumerationReport,
    /// Directories searched for files, relative to the base URL.
    pub searched_directories: Vec<String>,
    pub files: Vec<FileHit>,
}

impl SmartEnumeration {
    pub fn executed(&self) -> Vec<&FileHit> {
        self.files.iter().filter(|f| f.executed).collect()
    }
}

use serde::{Deserialize, Serialize};

use crate::classify::IndicatorRules;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Migr8Config {
    pub http: Option<HttpConfig>,
    pub rules: Option<IndicatorRules>,
    pub paths: Option<PathsConfig>,
    pub discovery: Option<DiscoveryConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub delay_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub accept_invalid_certs: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PathsConfig {
    /// Directories searched for a file after it was uploaded.
    pub upload_dirs: Option<Vec<String>>,
    /// Multipart field name; detected from the form when absent.
    pub field_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DiscoveryConfig {
    pub max_depth: Option<usize>,
}

impl Migr8Config {
    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn paths(&self) -> PathsConfig {
        self.paths.clone().unwrap_or_default()
    }

    pub fn discovery(&self) -> DiscoveryConfig {
        self.discovery.clone().unwrap_or_default()
    }

    pub fn rules(&self) -> IndicatorRules {
        self.rules.clone().unwrap_or_default()
    }
}

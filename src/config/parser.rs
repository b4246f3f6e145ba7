use std::path::Path;
use crate::errors::Migr8Error;
use super::types::Migr8Config;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<Migr8Config, Migr8Error> {
    if !path.exists() {
        return Err(Migr8Error::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(Migr8Error::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parse configuration text that has already been read.
pub fn parse_config_str(content: &str) -> Result<Migr8Config, Migr8Error> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(Migr8Config::default());
    }

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: Migr8Config = serde_yaml::from_value(yaml)?;

    // Semantic conflict detection
    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), Migr8Error> {
    // Convert YAML value to JSON for schema validation
    let json_str = serde_json::to_string(yaml)
        .map_err(|e| Migr8Error::Config(format!("Config conversion error: {}", e)))?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| Migr8Error::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| Migr8Error::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        let messages: Vec<String> = errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();
        // Advisory: typed deserialization and conflict checks decide validity
        for msg in &messages {
            warn!(validation_error = %msg, "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
fn validate_conflicts(config: &Migr8Config) -> Result<(), Migr8Error> {
    if let Some(http) = &config.http {
        if http.concurrency == Some(0) {
            return Err(Migr8Error::Config("http.concurrency must be at least 1".into()));
        }
        if http.timeout_secs == Some(0) {
            return Err(Migr8Error::Config("http.timeout_secs must be at least 1".into()));
        }
    }

    if let Some(discovery) = &config.discovery {
        if discovery.max_depth == Some(0) {
            return Err(Migr8Error::Config("discovery.max_depth must be at least 1".into()));
        }
    }

    if let Some(upload) = config.rules.as_ref().and_then(|r| r.upload.as_ref()) {
        if let Some(keyword) = upload.overlapping_keywords().first() {
            return Err(Migr8Error::Config(format!(
                "Conflicting rules: keyword '{}' appears in both success and failure lists",
                keyword
            )));
        }
        if upload.accepted_statuses.is_empty() {
            return Err(Migr8Error::Config("rules.upload.accepted_statuses is empty".into()));
        }
    }

    if let Some(execution) = config.rules.as_ref().and_then(|r| r.execution.as_ref()) {
        for set in &execution.by_extension {
            if set.indicators.is_empty() {
                warn!(extensions = ?set.extensions, "Execution indicator set has no indicators");
            }
        }
    }

    if let Some(dirs) = config.paths.as_ref().and_then(|p| p.upload_dirs.as_ref()) {
        for dir in dirs {
            if dir.split('/').any(|segment| segment == "..") {
                return Err(Migr8Error::Config(format!(
                    "Upload directory '{}' escapes the base URL",
                    dir
                )));
            }
        }
    }

    Ok(())
}

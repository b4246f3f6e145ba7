use thiserror::Error;

#[derive(Debug, Error)]
pub enum Migr8Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Wordlist error: {0}")]
    Wordlist(String),

    #[error("Payload error: {0}")]
    Payload(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<reqwest::Error> for Migr8Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Migr8Error::Timeout(e.to_string())
        } else if e.is_builder() {
            Migr8Error::Http(e.to_string())
        } else {
            Migr8Error::Network(e.to_string())
        }
    }
}

impl From<url::ParseError> for Migr8Error {
    fn from(e: url::ParseError) -> Self {
        Migr8Error::InvalidTarget(e.to_string())
    }
}

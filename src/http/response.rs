use std::collections::HashMap;

use crate::errors::Migr8Error;

/// A fully read HTTP response, detached from the connection.
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub url: String,
    pub status: u16,
    /// Header names are lower-cased; repeated headers are joined with ", ".
    pub headers: HashMap<String, String>,
    pub body: String,
    pub content_length: usize,
}

impl ProbeResponse {
    pub async fn read(response: reqwest::Response) -> Result<Self, Migr8Error> {
        let url = response.url().to_string();
        let status = response.status().as_u16();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).to_string();
            headers
                .entry(name.as_str().to_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let bytes = response.bytes().await?;
        Ok(Self {
            url,
            status,
            headers,
            content_length: bytes.len(),
            body: String::from_utf8_lossy(&bytes).to_string(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}

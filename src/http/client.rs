use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::{cookie::Jar, multipart::Form, redirect::Policy, Client};
use tracing::debug;

use super::response::ProbeResponse;
use crate::errors::Migr8Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Browser identities rotated per client.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

/// HTTP client shared by every probe in a run.
///
/// Holds two underlying clients because directory sweeps must see 301/302
/// answers while upload and file fetches follow redirects. Both share one
/// cookie jar, so a session picked up during an upload rides along on later
/// sweeps.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    follow: Client,
    no_redirect: Client,
    timeout: Duration,
    user_agent: String,
}

impl ProbeClient {
    pub fn new(options: ClientOptions) -> Result<Self, Migr8Error> {
        let user_agent = options.user_agent.clone().unwrap_or_else(random_user_agent);
        let jar = Arc::new(Jar::default());

        let build = |policy: Policy| {
            Client::builder()
                .timeout(options.timeout)
                .user_agent(user_agent.clone())
                .cookie_provider(Arc::clone(&jar))
                .danger_accept_invalid_certs(options.accept_invalid_certs)
                .redirect(policy)
                .build()
                .map_err(|e| Migr8Error::Http(format!("Failed to build HTTP client: {}", e)))
        };

        let follow = build(Policy::limited(MAX_REDIRECTS))?;
        let no_redirect = build(Policy::none())?;

        debug!(user_agent = %user_agent, timeout_secs = options.timeout.as_secs(), "HTTP client ready");

        Ok(Self {
            follow,
            no_redirect,
            timeout: options.timeout,
            user_agent,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub async fn get(&self, url: &str) -> Result<ProbeResponse, Migr8Error> {
        let response = self.follow.get(url).send().await?;
        ProbeResponse::read(response).await
    }

    /// GET that reports redirects instead of following them.
    pub async fn get_no_redirect(&self, url: &str) -> Result<ProbeResponse, Migr8Error> {
        let response = self.no_redirect.get(url).send().await?;
        ProbeResponse::read(response).await
    }

    pub async fn head(&self, url: &str) -> Result<ProbeResponse, Migr8Error> {
        let response = self.follow.head(url).send().await?;
        ProbeResponse::read(response).await
    }

    pub async fn post_multipart(&self, url: &str, form: Form) -> Result<ProbeResponse, Migr8Error> {
        let response = self.follow.post(url).multipart(form).send().await?;
        ProbeResponse::read(response).await
    }
}

fn random_user_agent() -> String {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .unwrap_or(&USER_AGENTS[0])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_user_agent_from_list() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua.as_str()));
    }

    #[test]
    fn test_explicit_user_agent_kept() {
        let client = ProbeClient::new(ClientOptions {
            user_agent: Some("migr8-test".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.user_agent(), "migr8-test");
        assert_eq!(client.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::Migr8Error;
use crate::http::ProbeClient;

const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-frame-options", "X-Frame-Options"),
    ("x-content-type-options", "X-Content-Type-Options"),
    ("x-xss-protection", "X-XSS-Protection"),
    ("content-security-policy", "Content-Security-Policy"),
    ("strict-transport-security", "Strict-Transport-Security"),
    ("referrer-policy", "Referrer-Policy"),
];

const CSRF_HEADERS: &[&str] = &["x-csrf-token", "x-xsrf-token", "csrf-token"];
const AUTH_HEADERS: &[&str] = &["www-authenticate", "authorization"];

#[derive(Debug, Clone, Serialize)]
pub struct SecurityHeader {
    pub name: String,
    pub present: bool,
    pub value: Option<String>,
    pub secure: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerInfo {
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub web_server: Option<String>,
    pub language: Option<String>,
    pub framework: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadRestrictions {
    pub csrf_protection: bool,
    pub authentication_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueSeverity {
    Low,
    Medium,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueSeverity::Low => write!(f, "Low"),
            IssueSeverity::Medium => write!(f, "Medium"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderIssue {
    pub kind: String,
    pub description: String,
    pub severity: IssueSeverity,
}

/// Server fingerprint and header hygiene of one URL.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderAnalysis {
    pub url: String,
    pub status_code: u16,
    pub security_headers: Vec<SecurityHeader>,
    pub server_info: ServerInfo,
    pub restrictions: UploadRestrictions,
    pub issues: Vec<HeaderIssue>,
    pub recommendations: Vec<String>,
}

impl HeaderAnalysis {
    /// Analyze lower-cased response headers. Pure.
    pub fn from_headers(url: &str, status_code: u16, headers: &HashMap<String, String>) -> Self {
        let security_headers = security_headers(headers);
        let server_info = server_info(headers);
        let restrictions = UploadRestrictions {
            csrf_protection: CSRF_HEADERS.iter().any(|h| headers.contains_key(*h)),
            authentication_required: AUTH_HEADERS.iter().any(|h| headers.contains_key(*h)),
        };
        let issues = issues(headers);
        let recommendations = recommendations(&security_headers, &server_info);

        Self {
            url: url.to_string(),
            status_code,
            security_headers,
            server_info,
            restrictions,
            issues,
            recommendations,
        }
    }

    pub fn secure_header_count(&self) -> usize {
        self.security_headers.iter().filter(|h| h.present && h.secure).count()
    }

    pub fn is_apache(&self) -> bool {
        self.server_info.web_server.as_deref() == Some("Apache")
    }
}

/// HEAD the URL, retrying with GET when HEAD is refused, and analyze the answer.
pub async fn analyze_headers(client: &ProbeClient, url: &str) -> Result<HeaderAnalysis, Migr8Error> {
    info!(url, "Analyzing headers");

    let head = client.head(url).await?;
    let response = if head.status >= 400 { client.get(url).await? } else { head };

    let analysis = HeaderAnalysis::from_headers(url, response.status, &response.headers);

    if let Some(server) = &analysis.server_info.web_server {
        info!(web_server = %server, "Server fingerprint");
    }
    if let Some(language) = &analysis.server_info.language {
        info!(language = %language, "Language fingerprint");
    }
    info!(
        secure = analysis.secure_header_count(),
        total = analysis.security_headers.len(),
        "Security headers properly configured"
    );
    if !analysis.issues.is_empty() {
        warn!(count = analysis.issues.len(), "Header issues found");
    }

    Ok(analysis)
}

fn security_headers(headers: &HashMap<String, String>) -> Vec<SecurityHeader> {
    SECURITY_HEADERS
        .iter()
        .map(|(key, name)| {
            let value = headers.get(*key).cloned();
            let secure = match (*key, value.as_deref()) {
                (_, None) => false,
                ("x-frame-options", Some(v)) => matches!(v.trim().to_lowercase().as_str(), "deny" | "sameorigin"),
                ("x-content-type-options", Some(v)) => v.to_lowercase().contains("nosniff"),
                ("x-xss-protection", Some(v)) => v.contains('1'),
                (_, Some(_)) => true,
            };
            SecurityHeader {
                name: name.to_string(),
                present: value.is_some(),
                value,
                secure,
            }
        })
        .collect()
}

fn server_info(headers: &HashMap<String, String>) -> ServerInfo {
    let mut info = ServerInfo {
        server: headers.get("server").cloned(),
        powered_by: headers.get("x-powered-by").cloned(),
        ..Default::default()
    };

    if let Some(server) = &info.server {
        let server = server.to_lowercase();
        info.web_server = if server.contains("apache") {
            Some("Apache".into())
        } else if server.contains("nginx") {
            Some("Nginx".into())
        } else if server.contains("iis") || server.contains("microsoft") {
            Some("IIS".into())
        } else if server.contains("cloudflare") {
            Some("Cloudflare".into())
        } else {
            None
        };
    }

    if let Some(powered_by) = &info.powered_by {
        let powered_by = powered_by.to_lowercase();
        if powered_by.contains("php") {
            info.language = Some("PHP".into());
        } else if powered_by.contains("asp.net") {
            info.language = Some("ASP.NET".into());
            info.framework = Some("ASP.NET".into());
        } else if powered_by.contains("express") {
            info.language = Some("Node.js".into());
            info.framework = Some("Express.js".into());
        }
    }

    // Technology hints elsewhere, e.g. X-AspNet-Version or a PHPSESSID cookie
    for (name, value) in headers {
        let value = value.to_lowercase();
        if value.contains("php") {
            info.language = Some("PHP".into());
        } else if name.contains("aspnet") || value.contains("asp.net") {
            info.language = Some("ASP.NET".into());
            info.framework = Some("ASP.NET".into());
        }
    }

    info
}

fn issues(headers: &HashMap<String, String>) -> Vec<HeaderIssue> {
    let missing = |kind: &str, description: &str, severity| HeaderIssue {
        kind: kind.to_string(),
        description: description.to_string(),
        severity,
    };

    let mut issues = Vec::new();
    if !headers.contains_key("x-frame-options") {
        issues.push(missing(
            "Missing Security Header",
            "X-Frame-Options header missing - clickjacking possible",
            IssueSeverity::Medium,
        ));
    }
    if !headers.contains_key("x-content-type-options") {
        issues.push(missing(
            "Missing Security Header",
            "X-Content-Type-Options header missing - MIME type sniffing possible",
            IssueSeverity::Low,
        ));
    }
    if !headers.contains_key("content-security-policy") {
        issues.push(missing(
            "Missing Security Header",
            "Content-Security-Policy header missing - XSS protection reduced",
            IssueSeverity::Medium,
        ));
    }
    if let Some(server) = headers.get("server") {
        issues.push(HeaderIssue {
            kind: "Information Disclosure".into(),
            description: format!("Server version disclosed: {}", server),
            severity: IssueSeverity::Low,
        });
    }
    if let Some(powered_by) = headers.get("x-powered-by") {
        issues.push(HeaderIssue {
            kind: "Information Disclosure".into(),
            description: format!("Technology stack disclosed: {}", powered_by),
            severity: IssueSeverity::Low,
        });
    }
    issues
}

fn recommendations(security_headers: &[SecurityHeader], server_info: &ServerInfo) -> Vec<String> {
    let mut recommendations: Vec<String> = security_headers
        .iter()
        .filter_map(|h| {
            if !h.present {
                Some(format!("Add {} header", h.name))
            } else if !h.secure {
                Some(format!("Improve {} header configuration", h.name))
            } else {
                None
            }
        })
        .collect();

    if server_info.powered_by.is_some() {
        recommendations.push("Remove X-Powered-By header to reduce information disclosure".into());
    }
    if server_info.server.is_some() {
        recommendations.push("Consider hiding server version information".into());
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_apache_php_fingerprint() {
        let h = headers(&[("server", "Apache/2.4.41 (Ubuntu)"), ("x-powered-by", "PHP/7.4.3")]);
        let analysis = HeaderAnalysis::from_headers("http://t/", 200, &h);
        assert!(analysis.is_apache());
        assert_eq!(analysis.server_info.language.as_deref(), Some("PHP"));
        assert!(analysis.issues.iter().any(|i| i.description.contains("Apache/2.4.41")));
    }

    #[test]
    fn test_iis_aspnet_fingerprint() {
        let h = headers(&[("server", "Microsoft-IIS/10.0"), ("x-aspnet-version", "4.0.30319")]);
        let analysis = HeaderAnalysis::from_headers("http://t/", 200, &h);
        assert_eq!(analysis.server_info.web_server.as_deref(), Some("IIS"));
        assert_eq!(analysis.server_info.framework.as_deref(), Some("ASP.NET"));
    }

    #[test]
    fn test_security_header_correctness() {
        let h = headers(&[
            ("x-frame-options", "ALLOW-FROM https://x"),
            ("x-content-type-options", "nosniff"),
            ("content-security-policy", "default-src 'self'"),
        ]);
        let analysis = HeaderAnalysis::from_headers("http://t/", 200, &h);
        assert_eq!(analysis.secure_header_count(), 2);
        assert!(analysis
            .recommendations
            .contains(&"Improve X-Frame-Options header configuration".to_string()));
        assert!(analysis.recommendations.contains(&"Add Referrer-Policy header".to_string()));
        assert!(!analysis.issues.iter().any(|i| i.severity == IssueSeverity::Medium && i.description.contains("Content-Security-Policy")));
    }

    #[test]
    fn test_restriction_hints() {
        let h = headers(&[("x-csrf-token", "abc"), ("www-authenticate", "Basic")]);
        let analysis = HeaderAnalysis::from_headers("http://t/", 401, &h);
        assert!(analysis.restrictions.csrf_protection);
        assert!(analysis.restrictions.authentication_required);
    }

    #[test]
    fn test_bare_response_has_missing_header_issues() {
        let analysis = HeaderAnalysis::from_headers("http://t/", 200, &HashMap::new());
        assert_eq!(analysis.issues.len(), 3);
        assert_eq!(analysis.secure_header_count(), 0);
    }
}

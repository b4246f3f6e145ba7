use serde::{Deserialize, Serialize};

/// Status codes an upload handler answers with when it accepted the file.
pub const ACCEPTED_UPLOAD_STATUSES: &[u16] = &[200, 201, 302];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_error_token() -> String {
    "error".to_string()
}

fn default_accepted_statuses() -> Vec<u16> {
    ACCEPTED_UPLOAD_STATUSES.to_vec()
}

/// Keywords deciding whether an upload response means "accepted".
///
/// An empty `error_token` turns off the permissive fallback, so only an
/// explicit success keyword counts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UploadRules {
    #[serde(default)]
    pub success: Vec<String>,
    #[serde(default)]
    pub failure: Vec<String>,
    #[serde(default = "default_error_token")]
    pub error_token: String,
    #[serde(default = "default_accepted_statuses")]
    pub accepted_statuses: Vec<u16>,
}

impl UploadRules {
    pub fn generic() -> Self {
        Self {
            success: strings(&[
                "upload successful",
                "file uploaded",
                "upload complete",
                "successfully uploaded",
                "file saved",
                "upload ok",
            ]),
            failure: strings(&[
                "upload failed",
                "error",
                "invalid file",
                "not allowed",
                "forbidden",
                "access denied",
                "file type not supported",
            ]),
            error_token: default_error_token(),
            accepted_statuses: default_accepted_statuses(),
        }
    }

    pub fn content_type() -> Self {
        Self {
            success: strings(&[
                "upload successful",
                "file uploaded",
                "upload complete",
                "successfully uploaded",
                "file saved",
            ]),
            failure: strings(&[
                "invalid file type",
                "file type not allowed",
                "content type not supported",
                "only pdf files allowed",
                "invalid content type",
            ]),
            error_token: default_error_token(),
            accepted_statuses: default_accepted_statuses(),
        }
    }

    pub fn aspx() -> Self {
        Self {
            failure: strings(&[
                "aspx not allowed",
                "invalid file type",
                "dangerous file",
                "script files not permitted",
                "executable files blocked",
            ]),
            ..Self::content_type()
        }
    }

    pub fn htaccess() -> Self {
        Self {
            failure: strings(&[
                "htaccess not allowed",
                "system files blocked",
                "dangerous file",
                "configuration files not permitted",
            ]),
            ..Self::content_type()
        }
    }

    /// Keywords that appear in both lists, compared case-insensitively.
    pub fn overlapping_keywords(&self) -> Vec<String> {
        let failure: Vec<String> = self.failure.iter().map(|f| f.to_lowercase()).collect();
        self.success
            .iter()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty() && failure.contains(s))
            .collect()
    }
}

impl Default for UploadRules {
    fn default() -> Self {
        Self::generic()
    }
}

/// Execution indicators for files whose name ends in one of `extensions`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndicatorSet {
    pub extensions: Vec<String>,
    pub indicators: Vec<String>,
}

impl IndicatorSet {
    pub fn matches(&self, filename_lower: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| !ext.is_empty() && filename_lower.ends_with(&ext.to_lowercase()))
    }
}

/// Keywords deciding whether a fetched file ran server-side.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExecutionRules {
    #[serde(default)]
    pub by_extension: Vec<IndicatorSet>,
    /// Applied to `text/html` responses when no extension set matches.
    #[serde(default)]
    pub html_fallback: Vec<String>,
}

impl ExecutionRules {
    pub fn php_indicators() -> IndicatorSet {
        IndicatorSet {
            extensions: strings(&[".php", ".php3", ".php4", ".php5", ".php7", ".phtml", ".phar"]),
            indicators: strings(&[
                "php version",
                "server_software",
                "migr8 php test",
                "current time:",
                "upload directory:",
            ]),
        }
    }

    pub fn aspx_indicators() -> IndicatorSet {
        IndicatorSet {
            extensions: strings(&[".aspx", ".asp", ".asa", ".asax", ".ascx", ".ashx", ".asmx"]),
            indicators: strings(&[
                "aspx upload test",
                ".net framework",
                "migr8 aspx test",
                "server software:",
                "current time:",
            ]),
        }
    }

    /// Indicators for the companion files served through an `.htaccess` mapping.
    pub fn rogue_indicators() -> IndicatorSet {
        IndicatorSet {
            extensions: strings(&[".evil", ".rogue", ".bad", ".pwn"]),
            indicators: strings(&[
                "migr8 .htaccess bypass successful",
                ".htaccess bypass test successful",
                "execution confirmed via .htaccess bypass",
                "current time:",
                "php version:",
                "server:",
            ]),
        }
    }

    /// Broader ASP.NET markers used when hunting for uploaded `.aspx` pages.
    pub fn aspx_probe() -> Self {
        let mut aspx = Self::aspx_indicators();
        aspx.indicators.extend(strings(&["server:", "aspx execution successful"]));
        Self {
            by_extension: vec![aspx, Self::php_indicators()],
            ..Self::default()
        }
    }

    pub fn set_for(&self, filename: &str) -> Option<&IndicatorSet> {
        let lower = filename.to_lowercase();
        self.by_extension.iter().find(|set| set.matches(&lower))
    }
}

impl Default for ExecutionRules {
    fn default() -> Self {
        Self {
            by_extension: vec![
                Self::php_indicators(),
                Self::aspx_indicators(),
                Self::rogue_indicators(),
            ],
            html_fallback: strings(&[
                "migr8",
                "upload test",
                "execution successful",
                "server:",
                "framework:",
                "current time:",
            ]),
        }
    }
}

/// Operator overrides for the built-in rule sets, as read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IndicatorRules {
    pub upload: Option<UploadRules>,
    pub execution: Option<ExecutionRules>,
}

impl IndicatorRules {
    pub fn upload_or(&self, default: UploadRules) -> UploadRules {
        self.upload.clone().unwrap_or(default)
    }

    pub fn execution_or(&self, default: ExecutionRules) -> ExecutionRules {
        self.execution.clone().unwrap_or(default)
    }
}

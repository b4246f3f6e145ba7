pub mod headers;

pub use headers::{analyze_headers, HeaderAnalysis, HeaderIssue, IssueSeverity, SecurityHeader, ServerInfo, UploadRestrictions};

//! Probe payloads: operator files and the bundled defaults.

pub mod bypasses;

use std::path::Path;

use crate::errors::Migr8Error;

const PHP_PAYLOAD: &[u8] = include_bytes!("../../payloads/test.php");
const ASPX_PAYLOAD: &[u8] = include_bytes!("../../payloads/test.aspx");
const HTACCESS_COMPANION_PAYLOAD: &[u8] = include_bytes!("../../payloads/htaccess_companion.php");

/// File content plus the name it is uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub name: String,
    pub content: Vec<u8>,
}

impl Payload {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read an operator payload: its bytes and its basename.
    pub async fn from_file(path: &Path) -> Result<Self, Migr8Error> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Migr8Error::Payload(format!("Not a file path: {}", path.display())))?;

        let content = tokio::fs::read(path).await.map_err(|e| {
            Migr8Error::Payload(format!("Cannot read payload {}: {}", path.display(), e))
        })?;

        Ok(Self { name, content })
    }

    pub fn bundled_php() -> Self {
        Self::new("test.php", PHP_PAYLOAD)
    }

    pub fn bundled_aspx() -> Self {
        Self::new("test.aspx", ASPX_PAYLOAD)
    }

    pub fn htaccess_companion() -> Self {
        Self::new("payload.php", HTACCESS_COMPANION_PAYLOAD)
    }

    /// Name without its final extension, as `(stem, ".ext")`.
    pub fn split_name(&self) -> (&str, &str) {
        split_extension(&self.name)
    }

    pub fn is_php(&self) -> bool {
        self.split_name().1.eq_ignore_ascii_case(".php")
    }
}

/// Split a filename at its last dot. A leading dot belongs to the stem, so
/// `.htaccess` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && !name[..idx].ends_with('/') => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("test.php"), ("test", ".php"));
        assert_eq!(split_extension("a.pdf.php"), ("a.pdf", ".php"));
        assert_eq!(split_extension(".htaccess"), (".htaccess", ""));
        assert_eq!(split_extension("README"), ("README", ""));
    }

    #[test]
    fn test_bundled_payloads() {
        assert!(Payload::bundled_php().is_php());
        assert!(!Payload::bundled_aspx().is_php());
        let php = String::from_utf8(Payload::bundled_php().content).unwrap();
        assert!(php.contains("phpversion()"));
    }

    #[tokio::test]
    async fn test_from_file_reads_basename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.phtml");
        tokio::fs::write(&path, b"<?php echo 1; ?>").await.unwrap();
        let payload = Payload::from_file(&path).await.unwrap();
        assert_eq!(payload.name, "shell.phtml");
        assert_eq!(payload.content, b"<?php echo 1; ?>");
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let result = Payload::from_file(Path::new("/nonexistent/x.php")).await;
        assert!(matches!(result, Err(Migr8Error::Payload(_))));
    }
}

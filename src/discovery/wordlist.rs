use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::errors::Migr8Error;

/// Common upload directory names compiled into the binary.
pub const DEFAULT_WORDLIST: &str = include_str!("../../wordlists/common_dirs.txt");

/// One segment per line; blank lines and `#` comments are skipped.
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Load the operator wordlist, or the bundled one when no path is given.
pub async fn load_wordlist(path: Option<&Path>) -> Result<Vec<String>, Migr8Error> {
    let (source, content) = match path {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                Migr8Error::Wordlist(format!("Cannot read wordlist {}: {}", path.display(), e))
            })?;
            (path.display().to_string(), content)
        }
        None => ("built-in".to_string(), DEFAULT_WORDLIST.to_string()),
    };

    let entries = parse_wordlist(&content);
    if entries.is_empty() {
        return Err(Migr8Error::Wordlist(format!("Wordlist {} has no entries", source)));
    }

    info!(source = %source, entries = entries.len(), "Loaded wordlist");
    Ok(entries)
}

/// Normalized directory segment: no surrounding whitespace or slashes.
pub fn normalize_segment(segment: &str) -> &str {
    segment.trim().trim_matches('/')
}

/// Drop candidates that resolve to the same directory, keeping first-seen order.
pub fn dedup_candidates(candidates: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|c| seen.insert(normalize_segment(c).to_string()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wordlist_skips_comments_and_blanks() {
        let entries = parse_wordlist("# header\n\nuploads\n  files/  \n#tmp\n");
        assert_eq!(entries, vec!["uploads".to_string(), "files/".to_string()]);
    }

    #[test]
    fn test_default_wordlist_not_empty() {
        let entries = parse_wordlist(DEFAULT_WORDLIST);
        assert!(entries.contains(&"uploads".to_string()));
        assert!(entries.iter().all(|e| !e.starts_with('#')));
    }

    #[test]
    fn test_dedup_candidates_by_normalized_segment() {
        let candidates = vec!["uploads".to_string(), "uploads/".to_string(), "files".to_string(), "uploads".to_string()];
        assert_eq!(dedup_candidates(&candidates), vec!["uploads".to_string(), "files".to_string()]);
    }

    #[tokio::test]
    async fn test_load_missing_wordlist() {
        let result = load_wordlist(Some(Path::new("/nonexistent/words.txt"))).await;
        assert!(matches!(result, Err(Migr8Error::Wordlist(_))));
    }

    #[tokio::test]
    async fn test_load_empty_wordlist() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "# only comments\n\n").unwrap();
        let result = load_wordlist(Some(file.path())).await;
        assert!(matches!(result, Err(Migr8Error::Wordlist(_))));
    }

    #[tokio::test]
    async fn test_load_builtin_wordlist() {
        let entries = load_wordlist(None).await.unwrap();
        assert!(!entries.is_empty());
    }
}

use regex::Regex;
use tracing::debug;

use crate::http::ProbeClient;
use crate::payloads::bypasses::UPLOAD_FIELD_NAMES;

const DEFAULT_FIELD: &str = "file";

/// Guess the multipart field name from the upload page.
///
/// Falls back to `file` when the page cannot be fetched or names none of the
/// usual fields.
pub async fn detect_upload_field(client: &ProbeClient, endpoint: &str) -> String {
    match client.get(endpoint).await {
        Ok(response) => field_from_html(&response.body).unwrap_or_else(|| DEFAULT_FIELD.to_string()),
        Err(e) => {
            debug!(endpoint, error = %e, "Field detection failed, using default");
            DEFAULT_FIELD.to_string()
        }
    }
}

/// First known upload field named in the markup, in table order.
pub fn field_from_html(html: &str) -> Option<String> {
    let content = html.to_lowercase();
    UPLOAD_FIELD_NAMES
        .iter()
        .find(|field| {
            let pattern = format!(r#"name\s*=\s*["']{}["']"#, regex::escape(field));
            Regex::new(&pattern)
                .map(|re| re.is_match(&content))
                .unwrap_or(false)
        })
        .map(|field| field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_html_double_quotes() {
        let html = r#"<form><input type="file" name="userfile"></form>"#;
        assert_eq!(field_from_html(html), Some("userfile".to_string()));
    }

    #[test]
    fn test_field_from_html_single_quotes_and_array() {
        let html = "<input type='file' name = 'files[]'>";
        assert_eq!(field_from_html(html), Some("files[]".to_string()));
    }

    #[test]
    fn test_field_from_html_none() {
        assert_eq!(field_from_html("<input name=\"username\">"), None);
    }
}

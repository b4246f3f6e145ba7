use super::find_any;
use super::rules::ExecutionRules;

/// The indicator that marks `body` as executed output, if any.
pub fn matched_execution_indicator<'a>(
    status: u16,
    body: &str,
    content_type: &str,
    filename: &str,
    rules: &'a ExecutionRules,
) -> Option<&'a str> {
    if status != 200 {
        return None;
    }

    let content = body.to_lowercase();
    if let Some(set) = rules.set_for(filename) {
        return find_any(&content, &set.indicators);
    }

    if content_type.trim().to_lowercase().starts_with("text/html") {
        return find_any(&content, &rules.html_fallback);
    }

    None
}

/// Decide whether a fetched upload ran server-side. Advisory only.
pub fn classify_execution(
    status: u16,
    body: &str,
    content_type: &str,
    filename: &str,
    rules: &ExecutionRules,
) -> bool {
    matched_execution_indicator(status, body, content_type, filename, rules).is_some()
}

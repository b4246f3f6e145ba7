use super::contains_any;
use super::rules::UploadRules;

/// Decide whether an upload response means the file was accepted.
///
/// Accepted status, no failure keyword, and either a success keyword or no
/// generic error token at all. A bare 200 with a neutral body counts as
/// accepted; false positives are weeded out by the execution check later.
pub fn classify_upload(status: u16, body: &str, rules: &UploadRules) -> bool {
    if !rules.accepted_statuses.contains(&status) {
        return false;
    }

    let content = body.to_lowercase();
    if contains_any(&content, &rules.failure) {
        return false;
    }

    if contains_any(&content, &rules.success) {
        return true;
    }

    let token = rules.error_token.to_lowercase();
    !token.is_empty() && !content.contains(&token)
}

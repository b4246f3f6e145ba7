/// Response excerpts kept on upload results.
pub const MAX_EXCERPT_CHARS: usize = 500;
const MAX_EVIDENCE_CHARS: usize = 120;

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// A short single-line window of `body` around the first case-insensitive
/// occurrence of `needle`.
pub fn evidence_snippet(body: &str, needle: &str) -> String {
    let lower = body.to_lowercase();
    let start = if lower.len() == body.len() {
        lower.find(&needle.to_lowercase()).unwrap_or(0)
    } else {
        // Lower-casing changed byte offsets; fall back to the head of the body
        0
    };

    let mut from = start.saturating_sub(MAX_EVIDENCE_CHARS / 4);
    while !body.is_char_boundary(from) {
        from -= 1;
    }

    let snippet = excerpt(&body[from..], MAX_EVIDENCE_CHARS);
    snippet.split_whitespace().collect::<Vec<_>>().join(" ")
}

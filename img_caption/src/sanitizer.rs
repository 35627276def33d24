//! Filesystem-safe names from free text.

/// Maximum length of a sanitized name, in characters.
pub const MAX_NAME_CHARS: usize = 200;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Normalizes `text` into a file name (no extension).
///
/// Invalid characters become `-`, runs of whitespace and `-` collapse to one `-`,
/// leading/trailing dots and spaces are trimmed and the result is capped at
/// [`MAX_NAME_CHARS`]. May return an empty string.
pub fn sanitize(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        let c = if INVALID_CHARS.contains(&c) { '-' } else { c };
        if c == '-' || c.is_whitespace() {
            if !in_run {
                collapsed.push('-');
                in_run = true;
            }
        } else {
            collapsed.push(c);
            in_run = false;
        }
    }

    let trimmed = trim_dots_and_spaces(&collapsed);
    if trimmed.chars().count() <= MAX_NAME_CHARS {
        return trimmed.to_string();
    }

    // a cut can expose a trailing dot
    let truncated: String = trimmed.chars().take(MAX_NAME_CHARS).collect();
    trim_dots_and_spaces(&truncated).to_string()
}

fn trim_dots_and_spaces(s: &str) -> &str {
    s.trim_matches(|c| c == '.' || c == ' ')
}

/// Cleans a model reply into a hyphenated slug: surrounding quotes stripped,
/// anything outside alphanumerics, `_` and `-` replaced by `-`, repeated `-`
/// collapsed and trimmed. Falls back to `untitled`.
pub fn slugify_reply(reply: &str) -> String {
    let unquoted = reply.trim().trim_matches(|c| c == '"' || c == '\'');

    let mut slug = String::with_capacity(unquoted.len());
    for c in unquoted.chars() {
        let c = if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '-' };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}

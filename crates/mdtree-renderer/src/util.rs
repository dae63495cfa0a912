//! Shared utility functions for markdown rendering.

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an attribute value, leaving existing character references intact.
///
/// `&amp;`, `&#109;` and `&#x6d;` pass through unchanged; any other `&` is
/// escaped. Mangled `mailto:` hrefs rely on this.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '&' if starts_char_reference(&s[i + 1..]) => result.push('&'),
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Whether `s` (the text after an `&`) starts with `#?\w+;`.
fn starts_char_reference(s: &str) -> bool {
    let body = s.strip_prefix('#').unwrap_or(s);
    let word_len = body.bytes().take_while(|&b| b.is_ascii_alphanumeric() || b == b'_').count();
    word_len > 0 && body[word_len..].starts_with(';')
}

/// Build a heading anchor id from raw heading text.
///
/// Lowercases the text and replaces every maximal run of non-word characters
/// (anything but ASCII letters, digits and `_`) with a single hyphen. Leading
/// and trailing hyphens are kept.
///
/// # Examples
///
/// ```
/// use mdtree_renderer::heading_id;
///
/// assert_eq!(heading_id("Hello World", ""), "hello-world");
/// assert_eq!(heading_id("API: v2", "doc-"), "doc-api-v2");
/// ```
#[must_use]
pub fn heading_id(raw: &str, prefix: &str) -> String {
    let mut id = String::with_capacity(prefix.len() + raw.len());
    id.push_str(prefix);
    let mut in_gap = false;
    for c in raw.to_lowercase().chars() {
        if is_word_char(c) {
            id.push(c);
            in_gap = false;
        } else if !in_gap {
            id.push('-');
            in_gap = true;
        }
    }
    id
}

/// ASCII word character (`[A-Za-z0-9_]`).
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length in bytes of the first character of `s` (0 when empty).
pub(crate) fn first_char_len(s: &str) -> usize {
    s.chars().next().map_or(0, char::len_utf8)
}

//! Href sanitization for sanitize mode.
//!
//! An href is decoded (character references, then percent escapes), stripped
//! down to word characters and colons, and lowercased. The result must not
//! start with a script scheme. Anything that fails to decode is rejected too.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::util::is_word_char;

static CHAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([#\w]+);").expect("invalid char ref regex"));

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

/// Reason an href was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnsafeHref {
    #[error("malformed escape sequence")]
    Malformed,
    #[error("script scheme")]
    ScriptScheme,
}

/// Check an href against the sanitize policy.
///
/// # Examples
///
/// ```
/// use mdtree_renderer::{UnsafeHref, check_href};
///
/// assert_eq!(check_href("https://example.com"), Ok(()));
/// assert_eq!(check_href("java&#115;cript:alert(1)"), Err(UnsafeHref::ScriptScheme));
/// assert_eq!(check_href("%E0%A4%A"), Err(UnsafeHref::Malformed));
/// ```
pub fn check_href(href: &str) -> Result<(), UnsafeHref> {
    let decoded = decode(href).ok_or(UnsafeHref::Malformed)?;
    let scheme: String = decoded
        .chars()
        .filter(|&c| is_word_char(c) || c == ':')
        .collect::<String>()
        .to_lowercase();
    if UNSAFE_SCHEMES.iter().any(|s| scheme.starts_with(s)) {
        return Err(UnsafeHref::ScriptScheme);
    }
    Ok(())
}

fn decode(href: &str) -> Option<String> {
    let unescaped = unescape(href)?;
    if !percent_escapes_well_formed(&unescaped) {
        return None;
    }
    percent_decode_str(&unescaped)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Decode `&colon;` and numeric character references. Other named
/// references are dropped.
fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in CHAR_REF.captures_iter(s) {
        let whole = caps.get(0)?;
        out.push_str(&s[last..whole.start()]);
        let name = caps[1].to_lowercase();
        if name == "colon" {
            out.push(':');
        } else if let Some(number) = name.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            out.push(char::from_u32(code)?);
        }
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Some(out)
}

/// Every `%` is followed by two hex digits.
fn percent_escapes_well_formed(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

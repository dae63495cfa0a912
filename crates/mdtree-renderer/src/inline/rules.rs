//! Inline rules.
//!
//! Each matcher inspects the start of the remaining span text. Rules that
//! need lookaround or backreferences are scanned by hand.

use std::sync::LazyLock;

use regex::Regex;

use crate::util::is_word_char;

static AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^ >]+(@|:/)[^ >]+)>").expect("invalid autolink regex"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^https?://[^\s<]+[^<.,:;"')\]\s]"#).expect("invalid url regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:<!--[\s\S]*?-->|</?\w+(?:"[^"]*"|'[^']*'|[^'">])*?>)"#)
        .expect("invalid tag regex")
});
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(!?)\[((?:\[[^\]]*\]|[^\[\]])*)\]\(\s*<?([\s\S]*?)>?(?:\s+['"]([\s\S]*?)['"])?\s*\)"#,
    )
    .expect("invalid link regex")
});
static REFLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(!?)\[((?:\[[^\]]*\]|[^\[\]])*)\]\s*\[([^\]]*)\]").expect("invalid reflink regex")
});
static NOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(!?)\[((?:\[[^\]]*\]|[^\[\]])*)\]").expect("invalid nolink regex")
});

/// `<scheme:/...>` or `<user@host>`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Autolink<'a> {
    pub body: &'a str,
    pub email: bool,
}

/// `[text](href "title")` or `![alt](src "title")`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct InlineLink<'a> {
    pub image: bool,
    pub text: &'a str,
    pub href: &'a str,
    pub title: Option<&'a str>,
    pub len: usize,
}

/// `[text][label]`, `[text][]` or `[text]`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RefLink<'a> {
    pub image: bool,
    pub text: &'a str,
    pub label: &'a str,
    pub len: usize,
}

/// Backslash escape. Returns the escaped character.
pub(crate) fn escape(src: &str, gfm: bool) -> Option<char> {
    let c = src.strip_prefix('\\')?.chars().next()?;
    let escapable = matches!(
        c,
        '\\' | '`' | '*' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '.' | '!' | '_' | '>'
    ) || (gfm && matches!(c, '~' | '|'));
    escapable.then_some(c)
}

pub(crate) fn autolink(src: &str) -> Option<(Autolink<'_>, usize)> {
    let caps = AUTOLINK.captures(src)?;
    let body = caps.get(1)?.as_str();
    Some((
        Autolink {
            body,
            email: &caps[2] == "@",
        },
        caps[0].len(),
    ))
}

/// Bare `http(s)://` URL, trailing punctuation excluded.
pub(crate) fn url(src: &str) -> Option<&str> {
    URL.find(src).map(|m| m.as_str())
}

/// Raw HTML tag or comment.
pub(crate) fn tag(src: &str) -> Option<&str> {
    TAG.find(src).map(|m| m.as_str())
}

pub(crate) fn link(src: &str) -> Option<InlineLink<'_>> {
    let caps = LINK.captures(src)?;
    Some(InlineLink {
        image: !caps[1].is_empty(),
        text: caps.get(2)?.as_str(),
        href: caps.get(3)?.as_str(),
        title: caps.get(4).map(|m| m.as_str()),
        len: caps[0].len(),
    })
}

/// Reference link; an empty label means the text is the label.
pub(crate) fn reflink(src: &str) -> Option<RefLink<'_>> {
    if let Some(caps) = REFLINK.captures(src) {
        let text = caps.get(2)?.as_str();
        let label = caps.get(3)?.as_str();
        return Some(RefLink {
            image: !caps[1].is_empty(),
            text,
            label: if label.is_empty() { text } else { label },
            len: caps[0].len(),
        });
    }
    let caps = NOLINK.captures(src)?;
    let text = caps.get(2)?.as_str();
    Some(RefLink {
        image: !caps[1].is_empty(),
        text,
        label: text,
        len: caps[0].len(),
    })
}

/// `**x**` or `__x__`. Returns the body.
pub(crate) fn strong(src: &str) -> Option<(&str, usize)> {
    let delim = *src.as_bytes().first()?;
    if !matches!(delim, b'*' | b'_') || src.as_bytes().get(1) != Some(&delim) {
        return None;
    }
    let bytes = src.as_bytes();
    let mut j = 3;
    while j + 2 <= bytes.len() {
        if bytes[j] == delim && bytes[j + 1] == delim && bytes.get(j + 2) != Some(&delim) {
            return Some((&src[2..j], j + 2));
        }
        j += 1;
    }
    None
}

/// `*x*` or `_x_`. Returns the body.
pub(crate) fn em(src: &str) -> Option<(&str, usize)> {
    match src.as_bytes().first()? {
        b'*' => star_em(src).or_else(|| star_em_single(src)),
        b'_' => underscore_em(src),
        _ => None,
    }
}

/// Star emphasis treating `**` inside the body as a unit.
fn star_em(src: &str) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if i >= 2 && bytes[i] == b'*' && bytes.get(i + 1) != Some(&b'*') {
            return Some((&src[1..i], i + 1));
        }
        i += if src[i..].starts_with("**") {
            2
        } else {
            char_len_at(src, i)
        };
    }
    None
}

/// Star emphasis closed by the first lone `*`.
fn star_em_single(src: &str) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    (2..bytes.len())
        .find(|&i| bytes[i] == b'*' && bytes.get(i + 1) != Some(&b'*'))
        .map(|i| (&src[1..i], i + 1))
}

/// Underscore emphasis: body of non-underscores or doubled underscores,
/// closing `_` at a word boundary.
fn underscore_em(src: &str) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'_' {
            if i >= 2 && boundary_at(src, i + 1) {
                return Some((&src[1..i], i + 1));
            }
            if bytes.get(i + 1) != Some(&b'_') {
                return None;
            }
            i += 2;
        } else {
            i += char_len_at(src, i);
        }
    }
    None
}

fn boundary_at(src: &str, i: usize) -> bool {
    src[i..].chars().next().is_none_or(|c| !is_word_char(c))
}

fn char_len_at(src: &str, i: usize) -> usize {
    src[i..].chars().next().map_or(1, char::len_utf8)
}

/// Code span delimited by backtick runs of equal length. Returns the trimmed body.
pub(crate) fn code(src: &str) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let open = bytes.iter().take_while(|&&b| b == b'`').count();
    if open == 0 {
        return None;
    }
    let mut i = open;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            if run == open && i > open {
                let inner = &src[open..i];
                let trimmed = inner.trim();
                let body = if trimmed.is_empty() { inner } else { trimmed };
                return Some((body, i + run));
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// Hard line break. With `breaks`, any newline followed by more content.
pub(crate) fn br(src: &str, breaks: bool) -> Option<usize> {
    let spaces = src.bytes().take_while(|&b| b == b' ').count();
    let min = if breaks { 0 } else { 2 };
    if spaces < min || src.as_bytes().get(spaces) != Some(&b'\n') {
        return None;
    }
    let end = spaces + 1;
    (!src[end..].trim().is_empty()).then_some(end)
}

/// `~~x~~` with non-space first and last body characters. Returns the body.
pub(crate) fn del(src: &str) -> Option<(&str, usize)> {
    let rest = src.strip_prefix("~~")?;
    let first = rest.chars().next()?;
    if first.is_whitespace() {
        return None;
    }
    let mut search = first.len_utf8();
    while let Some(k) = rest[search..].find("~~") {
        let j = search + k;
        if rest[..j].chars().next_back().is_some_and(|c| !c.is_whitespace()) {
            return Some((&rest[..j], j + 4));
        }
        search = j + 1;
    }
    None
}

/// Plain text up to the next character that may start another rule.
/// Always consumes at least one character of non-empty input.
pub(crate) fn text(src: &str, gfm: bool, breaks: bool) -> Option<usize> {
    if src.is_empty() {
        return None;
    }
    for (i, c) in src.char_indices().skip(1) {
        let rest = &src[i..];
        let stop = match c {
            '\\' | '<' | '!' | '[' | '_' | '*' | '`' => true,
            '~' => gfm,
            'h' => gfm && (rest.starts_with("http://") || rest.starts_with("https://")),
            ' ' => spaces_then_newline(rest, if breaks { 1 } else { 2 }),
            '\n' => breaks,
            _ => false,
        };
        if stop {
            return Some(i);
        }
    }
    Some(src.len())
}

fn spaces_then_newline(s: &str, min: usize) -> bool {
    let spaces = s.bytes().take_while(|&b| b == b' ').count();
    spaces >= min && s.as_bytes().get(spaces) == Some(&b'\n')
}

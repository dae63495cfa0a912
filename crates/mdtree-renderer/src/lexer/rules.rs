//! Block-level rules.
//!
//! Each rule looks at the start of the remaining text and, on a match, returns
//! the extracted value together with the number of bytes consumed.

use std::sync::LazyLock;

use regex::Regex;

use crate::token::{Alignment, Link};

static NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\n+").expect("invalid newline regex"));
static INDENTED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( {4}[^\n]+\n*)+").expect("invalid indented code regex"));
static CODE_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {4}").expect("invalid code indent regex"));
static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *(`{3,}|~{3,})[ .]*(\S+)? *$").expect("invalid fence open regex")
});
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *(#{1,6}) *([^\n]+?) *#* *(?:\n+|$)").expect("invalid heading regex")
});
static GFM_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *(#{1,6}) +([^\n]+?) *#* *(?:\n+|$)").expect("invalid gfm heading regex")
});
static SETEXT_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\n]+)\n *(=|-){2,} *(?:\n+|$)").expect("invalid setext heading regex")
});
static HR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( *[-*_]){3,} *(?:\n+|$)").expect("invalid hr regex"));
static BLOCKQUOTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *>[^\n]").expect("invalid blockquote line regex"));
static BLOCKQUOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ *> ?").expect("invalid blockquote prefix regex"));
static DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ *\[([^\]]+)\]: *<?([^\s>]+)>?(?: +["(]([^\n]+)[")])? *(?:\n+|$)"#)
        .expect("invalid def regex")
});
static NPTABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *(\S.*\|.*)\n *([-:]+ *\|[-| :]*)\n((?:.*\|.*(?:\n|$))*)\n*")
        .expect("invalid nptable regex")
});
static TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *\|(.+)\n *\|( *[-:]+[-| :]*)\n((?: *\|.*(?:\n|$))*)\n*")
        .expect("invalid table regex")
});
static HTML_TAG_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *<(/?)([A-Za-z][A-Za-z0-9-]*)(?:\s|/?>|$)")
        .expect("invalid html tag start regex")
});
static LIST_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(?:[*+-]|\d+\.) ").expect("invalid list bullet regex"));
static TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\n]+").expect("invalid text regex"));

/// Elements that never start an HTML block.
const INLINE_TAGS: &[&str] = &[
    "a", "em", "strong", "small", "s", "cite", "q", "dfn", "abbr", "data", "time", "code", "var",
    "samp", "kbd", "sub", "sup", "i", "b", "u", "mark", "ruby", "rt", "rp", "bdi", "bdo", "span",
    "br", "wbr", "ins", "del", "img",
];

/// HTML blocks whose content is never span-processed.
const PRE_TAGS: &[&str] = &["pre", "script", "style"];

/// Parsed table parts.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TableParts {
    pub header: Vec<String>,
    pub align: Vec<Option<Alignment>>,
    pub cells: Vec<Vec<String>>,
}

/// Byte index of the end of the line starting at `start` (excluding `\n`).
pub(crate) fn line_end(src: &str, start: usize) -> usize {
    src[start..].find('\n').map_or(src.len(), |i| start + i)
}

/// Number of consecutive `\n` bytes starting at `start`.
pub(crate) fn newline_run(src: &str, start: usize) -> usize {
    src.as_bytes()[start..]
        .iter()
        .take_while(|&&b| b == b'\n')
        .count()
}

/// One or more newlines. Returns the count.
pub(crate) fn newline(src: &str) -> Option<usize> {
    NEWLINE.find(src).map(|m| m.end())
}

/// Code indented by four spaces.
pub(crate) fn indented_code(src: &str, pedantic: bool) -> Option<(String, usize)> {
    let m = INDENTED_CODE.find(src)?;
    let text = CODE_INDENT.replace_all(m.as_str(), "");
    let text = if pedantic {
        text.into_owned()
    } else {
        text.trim_end_matches('\n').to_owned()
    };
    Some((text, m.end()))
}

/// Fenced code block. Returns `(lang, text)`.
///
/// The closing fence must use the same character and be at least as long as
/// the opening one. An unclosed fence is not a code block.
pub(crate) fn fence(src: &str) -> Option<((Option<String>, String), usize)> {
    let first_end = line_end(src, 0);
    let caps = FENCE_OPEN.captures(&src[..first_end])?;
    let marker = caps.get(1)?.as_str();
    let marker_char = marker.chars().next()?;
    let lang = caps.get(2).map(|m| m.as_str().to_owned());

    let mut content_lines = Vec::new();
    let mut pos = first_end;
    while pos < src.len() {
        let start = pos + 1;
        let end = line_end(src, start);
        let line = &src[start..end];
        let trimmed = line.trim();
        if trimmed.len() >= marker.len() && trimmed.chars().all(|c| c == marker_char) {
            let text = content_lines.join("\n").trim_end().to_owned();
            let consumed = end + newline_run(src, end);
            return Some(((lang, text), consumed));
        }
        content_lines.push(line);
        pos = end;
    }
    None
}

/// ATX heading. Returns `(depth, text)`.
pub(crate) fn heading(src: &str, gfm: bool) -> Option<((u8, String), usize)> {
    let re = if gfm { &GFM_HEADING } else { &HEADING };
    let caps = re.captures(src)?;
    let depth = u8::try_from(caps[1].len()).ok()?;
    Some(((depth, caps[2].to_owned()), caps[0].len()))
}

/// Setext heading. Returns `(depth, text)`.
pub(crate) fn setext_heading(src: &str) -> Option<((u8, String), usize)> {
    let caps = SETEXT_HEADING.captures(src)?;
    let depth = if &caps[2] == "=" { 1 } else { 2 };
    Some(((depth, caps[1].to_owned()), caps[0].len()))
}

/// Thematic break.
pub(crate) fn hr(src: &str) -> Option<usize> {
    HR.find(src).map(|m| m.end())
}

/// Blockquote. Returns the content with `>` prefixes stripped.
///
/// A quote is a `>` line followed by lazy continuation lines, then blank
/// lines; it extends as long as another `>` line follows.
pub(crate) fn blockquote(src: &str) -> Option<(String, usize)> {
    if !BLOCKQUOTE_LINE.is_match(src) {
        return None;
    }

    let mut pos = 0;
    while pos < src.len() && BLOCKQUOTE_LINE.is_match(&src[pos..]) {
        pos = line_end(src, pos);
        // Lazy continuation: non-blank lines that are not link definitions.
        while pos < src.len() {
            let next = pos + 1;
            let next_end = line_end(src, next);
            if next == next_end || DEF.is_match(&src[next..]) {
                break;
            }
            pos = next_end;
        }
        pos += newline_run(src, pos);
    }

    let inner = BLOCKQUOTE_PREFIX.replace_all(&src[..pos], "");
    Some((inner.into_owned(), pos))
}

/// Block HTML. Returns `(pre, text)`.
///
/// Starts with a comment or a non-inline tag and runs to the next blank
/// line. An opening tag whose closing tag appears later extends the block at
/// least through the closing tag's line.
pub(crate) fn html(src: &str) -> Option<((bool, String), usize)> {
    let trimmed = src.trim_start_matches(' ');
    let mut pos = if trimmed.starts_with("<!--") {
        let close = src.find("-->")?;
        line_end(src, close + 3)
    } else {
        let caps = HTML_TAG_START.captures(src)?;
        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();
        if INLINE_TAGS.contains(&tag.as_str()) {
            return None;
        }
        let first_end = line_end(src, 0);
        let close_tag = format!("</{tag}>");
        match src.to_ascii_lowercase().find(&close_tag) {
            Some(close) if !closing => line_end(src, close),
            _ => first_end,
        }
    };

    // Extend through following non-blank lines.
    while pos < src.len() {
        let next = pos + 1;
        let next_end = line_end(src, next);
        if next == next_end {
            break;
        }
        pos = next_end;
    }

    let text = src[..pos].to_owned();
    let pre = HTML_TAG_START
        .captures(&text)
        .is_some_and(|c| c[1].is_empty() && PRE_TAGS.contains(&c[2].to_ascii_lowercase().as_str()));
    Some(((pre, text), pos + newline_run(src, pos)))
}

/// Whether `src` starts with an opening block-level tag.
fn opens_html_block(src: &str) -> bool {
    HTML_TAG_START.captures(src).is_some_and(|c| {
        c[1].is_empty() && !INLINE_TAGS.contains(&c[2].to_ascii_lowercase().as_str())
    })
}

/// Link reference definition. Returns `(label, link)`.
pub(crate) fn def(src: &str) -> Option<((String, Link), usize)> {
    let caps = DEF.captures(src)?;
    let link = Link {
        href: caps[2].to_owned(),
        title: caps.get(3).map(|m| m.as_str().to_owned()),
    };
    Some(((caps[1].to_owned(), link), caps[0].len()))
}

/// Table without leading pipes.
pub(crate) fn nptable(src: &str) -> Option<(TableParts, usize)> {
    let caps = NPTABLE.captures(src)?;
    let parts = table_parts(&caps[1], &caps[2], &caps[3]);
    Some((parts, caps[0].len()))
}

/// Table with leading pipes.
pub(crate) fn table(src: &str) -> Option<(TableParts, usize)> {
    let caps = TABLE.captures(src)?;
    let parts = table_parts(&caps[1], &caps[2], &caps[3]);
    Some((parts, caps[0].len()))
}

fn table_parts(header: &str, align: &str, rows: &str) -> TableParts {
    TableParts {
        header: split_cells(header),
        align: split_cells(align)
            .iter()
            .map(|cell| parse_alignment(cell))
            .collect(),
        cells: rows
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(split_cells)
            .collect(),
    }
}

/// Split a table row into trimmed cells, ignoring outer pipes.
pub(crate) fn split_cells(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| cell.trim().to_owned()).collect()
}

fn parse_alignment(cell: &str) -> Option<Alignment> {
    let starts = cell.starts_with(':');
    let ends = cell.ends_with(':') && cell.len() > 1;
    match (starts, ends) {
        (true, true) => Some(Alignment::Center),
        (false, true) => Some(Alignment::Right),
        (true, false) => Some(Alignment::Left),
        (false, false) => None,
    }
}

/// Whether the list rule can start at `src`.
pub(crate) fn starts_list(src: &str) -> bool {
    LIST_BULLET
        .find(src)
        .is_some_and(|m| m.end() < src.len())
}

/// Paragraph (top level only). Returns the text without its trailing newline.
pub(crate) fn paragraph(src: &str, gfm: bool) -> Option<(String, usize)> {
    let first_end = line_end(src, 0);
    if first_end == 0 {
        return None;
    }

    let mut end = first_end;
    while end < src.len() {
        let next = end + 1;
        let next_end = line_end(src, next);
        if next == next_end || interrupts_paragraph(&src[next..], gfm) {
            break;
        }
        end = next_end;
    }

    Some((src[..end].to_owned(), end + newline_run(src, end)))
}

/// Whether a line starts a block that ends the current paragraph.
fn interrupts_paragraph(src: &str, gfm: bool) -> bool {
    hr(src).is_some()
        || heading(src, gfm).is_some()
        || setext_heading(src).is_some()
        || BLOCKQUOTE_LINE.is_match(src)
        || (src.starts_with('<') && opens_html_block(src))
        || DEF.is_match(src)
        || (gfm && (fence(src).is_some() || starts_list(src)))
}

/// Single line of text (inside list items).
pub(crate) fn text(src: &str) -> Option<(String, usize)> {
    let m = TEXT.find(src)?;
    Some((m.as_str().to_owned(), m.end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_newline() {
        assert_eq!(newline("\n\nabc"), Some(2));
        assert_eq!(newline("abc"), None);
    }

    #[test]
    fn test_indented_code_strips_indent() {
        let (text, consumed) = indented_code("    a\n      b\n\nnext", false).unwrap();
        assert_eq!(text, "a\n  b");
        assert_eq!(consumed, 15);
    }

    #[test]
    fn test_indented_code_pedantic_keeps_newlines() {
        let (text, _) = indented_code("    a\n\n", true).unwrap();
        assert_eq!(text, "a\n\n");
    }

    #[test]
    fn test_fence_with_lang() {
        let src = "```rust\nfn main() {}\n```\n\nafter";
        let ((lang, text), consumed) = fence(src).unwrap();
        assert_eq!(lang.as_deref(), Some("rust"));
        assert_eq!(text, "fn main() {}");
        assert_eq!(&src[consumed..], "after");
    }

    #[test]
    fn test_fence_tilde_and_longer_close() {
        let ((lang, text), _) = fence("~~~\na\n~~~~").unwrap();
        assert_eq!(lang, None);
        assert_eq!(text, "a");
    }

    #[test]
    fn test_fence_requires_same_character() {
        assert!(fence("```\na\n~~~").is_none());
    }

    #[test]
    fn test_unclosed_fence_is_not_code() {
        assert!(fence("```\nnever closed").is_none());
    }

    #[test]
    fn test_heading_gfm_requires_space() {
        assert_eq!(
            heading("## Title ##\n", true),
            Some(((2, "Title".to_owned()), 12))
        );
        assert!(heading("#5 bolt", true).is_none());
        assert_eq!(heading("#5 bolt", false).map(|h| h.0), Some((1, "5 bolt".to_owned())));
    }

    #[test]
    fn test_setext_heading() {
        assert_eq!(setext_heading("Title\n===\n").map(|h| h.0), Some((1, "Title".to_owned())));
        assert_eq!(setext_heading("Title\n---").map(|h| h.0), Some((2, "Title".to_owned())));
    }

    #[test]
    fn test_hr() {
        assert_eq!(hr("---\n"), Some(4));
        assert_eq!(hr("* * *"), Some(5));
        assert!(hr("--").is_none());
    }

    #[test]
    fn test_blockquote_strips_prefix_and_takes_lazy_lines() {
        let (inner, consumed) = blockquote("> a\nb\n\n> c\n\nafter").unwrap();
        assert_eq!(inner, "a\nb\n\nc\n\n");
        assert_eq!(consumed, 12);
    }

    #[test]
    fn test_blockquote_stops_at_definition() {
        let (inner, consumed) = blockquote("> a\n[x]: /url").unwrap();
        assert_eq!(inner, "a\n");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_html_block() {
        let ((pre, text), consumed) = html("<div>\nhi\n</div>\n\nafter").unwrap();
        assert!(!pre);
        assert_eq!(text, "<div>\nhi\n</div>");
        assert_eq!(consumed, 17);
    }

    #[test]
    fn test_html_block_spans_blank_lines_to_closing_tag() {
        let ((_, text), _) = html("<div>\n\ninner\n\n</div>\n\nafter").unwrap();
        assert_eq!(text, "<div>\n\ninner\n\n</div>");
    }

    #[test]
    fn test_html_pre_block() {
        let ((pre, _), _) = html("<pre>\n  x\n</pre>").unwrap();
        assert!(pre);
    }

    #[test]
    fn test_html_comment() {
        let ((pre, text), _) = html("<!-- note -->\n").unwrap();
        assert!(!pre);
        assert_eq!(text, "<!-- note -->");
    }

    #[test]
    fn test_inline_tag_is_not_block_html() {
        assert!(html("<span>x</span>").is_none());
        assert!(html("<http://example.com>").is_none());
    }

    #[test]
    fn test_def() {
        let ((label, link), _) = def("[Foo]: http://x.com \"Title\"\n").unwrap();
        assert_eq!(label, "Foo");
        assert_eq!(link.href, "http://x.com");
        assert_eq!(link.title.as_deref(), Some("Title"));

        let ((_, link), _) = def("[bar]: <http://y.com>").unwrap();
        assert_eq!(link.href, "http://y.com");
        assert_eq!(link.title, None);
    }

    #[test]
    fn test_nptable() {
        let (parts, _) = nptable("a | b\n:-- | --:\n1 | 2\n3 | 4\n").unwrap();
        assert_eq!(parts.header, vec!["a", "b"]);
        assert_eq!(parts.align, vec![Some(Alignment::Left), Some(Alignment::Right)]);
        assert_eq!(parts.cells, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_table_with_pipes() {
        let (parts, consumed) = table("| a | b |\n|:-:|---|\n| 1 | 2 |\n\nafter").unwrap();
        assert_eq!(parts.header, vec!["a", "b"]);
        assert_eq!(parts.align, vec![Some(Alignment::Center), None]);
        assert_eq!(parts.cells, vec![vec!["1", "2"]]);
        assert_eq!(consumed, 31);
    }

    #[test]
    fn test_split_cells() {
        assert_eq!(split_cells("| a |  b|"), vec!["a", "b"]);
        assert_eq!(split_cells("a|b|c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_paragraph_runs_to_blank_line() {
        let (text, consumed) = paragraph("one\ntwo\n\nthree", true).unwrap();
        assert_eq!(text, "one\ntwo");
        assert_eq!(consumed, 9);
    }

    #[test]
    fn test_paragraph_interrupted_by_blocks() {
        assert_eq!(paragraph("a\n# h", true).unwrap().0, "a");
        assert_eq!(paragraph("a\n> q", true).unwrap().0, "a");
        assert_eq!(paragraph("a\n***", true).unwrap().0, "a");
        assert_eq!(paragraph("a\n- item", true).unwrap().0, "a");
        assert_eq!(paragraph("a\n- item", false).unwrap().0, "a\n- item");
        assert_eq!(paragraph("a\n<div>", true).unwrap().0, "a");
    }

    #[test]
    fn test_text_single_line() {
        assert_eq!(text("a\nb"), Some(("a".to_owned(), 1)));
    }
}

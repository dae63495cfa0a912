//! List rule.
//!
//! A list runs from its first bullet until a thematic break, a link
//! definition, two blank lines, or a blank line followed by something that is
//! neither indented nor another bullet at the list's indentation.

use std::sync::LazyLock;

use regex::Regex;

use super::rules::{def, line_end, newline_run};

static LIST_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( *)([*+-]|\d+\.) ").expect("invalid list start regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[*+-]|\d+\.) ").expect("invalid bullet regex"));
static ITEM_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(?:[*+-]|\d+\.) +").expect("invalid item bullet regex"));
static LIST_HR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*_] *){3,}(?:\n|$)").expect("invalid list hr regex"));

/// A matched list.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// One list item with its bullet removed and its content outdented.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ListItem {
    pub text: String,
    pub loose: bool,
}

pub(crate) fn list(src: &str, pedantic: bool) -> Option<(List, usize)> {
    let caps = LIST_START.captures(src)?;
    let bullet_end = caps.get(0)?.end();
    if bullet_end >= src.len() {
        return None;
    }
    let indent = caps.get(1)?.as_str();
    let ordered = caps[2].len() > 1;

    let consumed = list_end(src, indent, bullet_end);
    let body = &src[..consumed];

    let raw_items = split_items(body, indent);
    let last = raw_items.len().saturating_sub(1);
    let mut next = false;
    let items = raw_items
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let text = item_text(raw, pedantic);
            let mut loose = next || has_inner_blank_line(&text);
            if i != last {
                next = text.ends_with('\n');
                loose = loose || next;
            }
            ListItem { text, loose }
        })
        .collect();

    Some((List { ordered, items }, consumed))
}

/// Byte offset where the list ends, trailing blank lines included.
fn list_end(src: &str, indent: &str, bullet_end: usize) -> usize {
    let mut pos = line_end(src, 0);
    if pos == bullet_end {
        pos = line_end(src, pos + 1);
    }

    while pos < src.len() {
        if src[pos..].trim().is_empty() {
            return src.len();
        }
        let run = newline_run(src, pos);
        let next = &src[pos + run..];
        let after_indent = next.strip_prefix(indent).unwrap_or(next);
        if LIST_HR.is_match(after_indent) || LIST_HR.is_match(next) || def(next).is_some() {
            return pos + run;
        }
        if run >= 3 || (run == 2 && !next.starts_with(' ') && !starts_item(next, indent)) {
            return pos + run;
        }
        pos = line_end(src, pos + run);
    }
    src.len()
}

fn starts_item(line: &str, indent: &str) -> bool {
    line.strip_prefix(indent)
        .is_some_and(|rest| BULLET.is_match(rest))
}

/// Split the list body at bullets with exactly the list's indentation.
fn split_items<'a>(body: &'a str, indent: &str) -> Vec<String> {
    let mut items: Vec<Vec<&'a str>> = Vec::new();
    for line in body.split('\n') {
        match items.last_mut() {
            Some(current) if !starts_item(line, indent) => current.push(line),
            _ => items.push(vec![line]),
        }
    }
    items.into_iter().map(|lines| lines.join("\n")).collect()
}

/// Remove the bullet and outdent continuation lines by the bullet width.
fn item_text(raw: &str, pedantic: bool) -> String {
    let text = ITEM_BULLET.replace(raw, "");
    if !text.contains("\n ") {
        return text.into_owned();
    }
    let width = if pedantic { 4 } else { raw.len() - text.len() };
    text.split('\n')
        .map(|line| {
            let spaces = line.bytes().take(width).take_while(|&b| b == b' ').count();
            &line[spaces..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A blank line followed by more content.
fn has_inner_blank_line(text: &str) -> bool {
    text.find("\n\n")
        .is_some_and(|i| !text[i + 2..].trim().is_empty())
}

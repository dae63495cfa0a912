//! Block lexer.
//!
//! Turns markdown source into a flat [`BlockToken`] stream plus the table of
//! link reference definitions. Rules are tried in a fixed order at the start
//! of the remaining text; the first match wins and its bytes are consumed.
//! Container rules (blockquotes and lists) recurse on their stripped content.

mod list;
mod rules;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MAX_NESTING, RenderError};
use crate::options::Options;
use crate::token::{BlockToken, LexOutput, LinkTable};

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ +$").expect("invalid blank line regex"));

/// Block lexer bound to a set of options.
pub struct BlockLexer<'a> {
    options: &'a Options,
    tokens: Vec<BlockToken>,
    links: LinkTable,
}

impl<'a> BlockLexer<'a> {
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            tokens: Vec::new(),
            links: LinkTable::new(),
        }
    }

    /// Tokenize a document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::BlockStall`] if no rule matches the remaining text
    /// and [`RenderError::TooDeep`] past [`MAX_NESTING`] nested containers.
    pub fn lex(mut self, src: &str) -> Result<LexOutput, RenderError> {
        let src = normalize(src);
        self.token(&src, true, false, 0)?;
        tracing::debug!(
            tokens = self.tokens.len(),
            links = self.links.len(),
            "Lexed document"
        );
        Ok(LexOutput {
            tokens: self.tokens,
            links: self.links,
        })
    }

    /// Tokenize `src`, nested `nesting` containers deep.
    fn token(&mut self, src: &str, top: bool, bq: bool, nesting: usize) -> Result<(), RenderError> {
        if nesting > MAX_NESTING {
            return Err(RenderError::TooDeep { limit: MAX_NESTING });
        }
        let src = BLANK_LINE.replace_all(src, "");
        let mut rest: &str = &src;
        while !rest.is_empty() {
            let consumed = self.step(rest, top, bq, nesting)?;
            if consumed == 0 {
                return Err(RenderError::BlockStall {
                    byte: rest.as_bytes()[0],
                });
            }
            rest = &rest[consumed..];
        }
        Ok(())
    }

    /// Apply the first matching rule and return the bytes it consumed.
    fn step(
        &mut self,
        src: &str,
        top: bool,
        bq: bool,
        nesting: usize,
    ) -> Result<usize, RenderError> {
        let gfm = self.options.gfm;
        let tables = gfm && self.options.tables;

        if let Some(n) = rules::newline(src) {
            if n > 1 {
                self.tokens.push(BlockToken::Space);
            }
            return Ok(n);
        }

        if let Some((text, n)) = rules::indented_code(src, self.options.pedantic) {
            self.tokens.push(BlockToken::Code {
                lang: None,
                text,
                escaped: false,
            });
            return Ok(n);
        }

        if gfm && let Some(((lang, text), n)) = rules::fence(src) {
            self.tokens.push(BlockToken::Code {
                lang,
                text,
                escaped: false,
            });
            return Ok(n);
        }

        if let Some(((depth, text), n)) = rules::heading(src, gfm) {
            self.tokens.push(BlockToken::Heading { depth, text });
            return Ok(n);
        }

        if top && tables && let Some((parts, n)) = rules::nptable(src) {
            self.tokens.push(BlockToken::Table {
                header: parts.header,
                align: parts.align,
                cells: parts.cells,
            });
            return Ok(n);
        }

        if let Some(((depth, text), n)) = rules::setext_heading(src) {
            self.tokens.push(BlockToken::Heading { depth, text });
            return Ok(n);
        }

        if let Some(n) = rules::hr(src) {
            self.tokens.push(BlockToken::Hr);
            return Ok(n);
        }

        if let Some((inner, n)) = rules::blockquote(src) {
            self.tokens.push(BlockToken::BlockquoteStart);
            self.token(&inner, top, true, nesting + 1)?;
            self.tokens.push(BlockToken::BlockquoteEnd);
            return Ok(n);
        }

        if let Some((list, n)) = list::list(src, self.options.pedantic) {
            self.tokens.push(BlockToken::ListStart {
                ordered: list.ordered,
            });
            for item in list.items {
                self.tokens.push(if item.loose {
                    BlockToken::LooseItemStart
                } else {
                    BlockToken::ListItemStart
                });
                self.token(&item.text, false, bq, nesting + 2)?;
                self.tokens.push(BlockToken::ListItemEnd);
            }
            self.tokens.push(BlockToken::ListEnd);
            return Ok(n);
        }

        if let Some(((pre, text), n)) = rules::html(src) {
            self.tokens.push(if self.options.sanitize {
                BlockToken::Paragraph { text }
            } else {
                BlockToken::Html { pre, text }
            });
            return Ok(n);
        }

        if top && !bq && let Some(((label, link), n)) = rules::def(src) {
            self.links.insert(&label, link);
            return Ok(n);
        }

        if top && tables && let Some((parts, n)) = rules::table(src) {
            self.tokens.push(BlockToken::Table {
                header: parts.header,
                align: parts.align,
                cells: parts.cells,
            });
            return Ok(n);
        }

        if top && let Some((text, n)) = rules::paragraph(src, gfm) {
            self.tokens.push(BlockToken::Paragraph { text });
            return Ok(n);
        }

        if let Some((text, n)) = rules::text(src) {
            self.tokens.push(BlockToken::Text { text });
            return Ok(n);
        }

        Err(RenderError::BlockStall {
            byte: src.as_bytes()[0],
        })
    }
}

/// Normalize line endings, tabs and non-breaking spaces.
#[must_use]
pub fn normalize(src: &str) -> String {
    src.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "    ")
        .replace('\u{a0}', " ")
        .replace('\u{2424}', "\n")
}

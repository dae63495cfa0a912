//! Block parser: assembles the node tree from a token stream.
//!
//! Recursive descent over a cursor into the token slice. Container tokens
//! (blockquotes, lists, list items) recurse until their end token; span-bearing
//! tokens go through the [`InlineProcessor`]; every node is built by the
//! [`Renderer`].

use crate::backend::{CellFlags, Renderer};
use crate::error::{MAX_NESTING, RenderError};
use crate::inline::InlineProcessor;
use crate::node::{Key, Node};
use crate::options::Options;
use crate::token::{Alignment, BlockToken, LinkTable};

/// Parse session over one token stream.
///
/// Created per document and consumed by [`parse`](Self::parse).
pub struct Parser<'a, R: Renderer> {
    tokens: &'a [BlockToken],
    pos: usize,
    inline: InlineProcessor<'a, R>,
    renderer: &'a R,
    options: &'a Options,
}

impl<'a, R: Renderer> Parser<'a, R> {
    pub fn new(
        tokens: &'a [BlockToken],
        links: &'a LinkTable,
        renderer: &'a R,
        options: &'a Options,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            inline: InlineProcessor::new(renderer, links, options),
            renderer,
            options,
        }
    }

    /// Parse all tokens into top-level nodes.
    ///
    /// Space tokens produce nothing. Each top-level node is keyed with its
    /// index in the result.
    ///
    /// # Errors
    ///
    /// Returns an error on a stray end token, an unclosed container, or an
    /// inline rule that failed to consume input.
    pub fn parse(mut self) -> Result<Vec<Node>, RenderError> {
        let mut out = Vec::new();
        while let Some(token) = self.next() {
            out.extend(self.tok(token, 0)?);
        }
        tracing::debug!(tokens = self.tokens.len(), nodes = out.len(), "Parsed document");
        Ok((0..).zip(out).map(|(key, node): (Key, Node)| node.with_key(key)).collect())
    }

    fn next(&mut self) -> Option<&'a BlockToken> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'a BlockToken> {
        self.tokens.get(self.pos)
    }

    /// Next token inside a container, or `None` once its end token is consumed.
    fn next_in(&mut self, end: &'static str) -> Result<Option<&'a BlockToken>, RenderError> {
        let token = self.next().ok_or(RenderError::MissingEnd { expected: end })?;
        Ok((token.kind() != end).then_some(token))
    }

    /// Dispatch one token found `nesting` containers deep. Returns `None` for
    /// tokens that produce no node.
    fn tok(&mut self, token: &'a BlockToken, nesting: usize) -> Result<Option<Node>, RenderError> {
        tracing::trace!(kind = token.kind(), pos = self.pos, "Dispatching token");
        let node = match token {
            BlockToken::Space => return Ok(None),
            BlockToken::Hr => self.renderer.hr(),
            BlockToken::Heading { depth, text } => {
                let children = self.inline.output(text)?;
                self.renderer.heading(children, *depth, text)
            }
            BlockToken::Code {
                lang,
                text,
                escaped,
            } => self.renderer.code(text, lang.as_deref(), *escaped),
            BlockToken::Table {
                header,
                align,
                cells,
            } => self.table(header, align, cells)?,
            BlockToken::BlockquoteStart => {
                let inner = enter(nesting)?;
                let mut body = Vec::new();
                while let Some(token) = self.next_in("blockquote_end")? {
                    body.extend(self.tok(token, inner)?);
                }
                self.renderer.blockquote(body)
            }
            BlockToken::ListStart { ordered } => {
                let inner = enter(nesting)?;
                let mut body: Vec<Node> = Vec::new();
                while let Some(token) = self.next_in("list_end")? {
                    if let Some(node) = self.tok(token, inner)? {
                        let key = body.len() as Key;
                        body.push(node.with_key(key));
                    }
                }
                self.renderer.list(body, *ordered)
            }
            BlockToken::ListItemStart => {
                let inner = enter(nesting)?;
                let mut body = Vec::new();
                while let Some(token) = self.next_in("list_item_end")? {
                    match token {
                        BlockToken::Text { text } => body.extend(self.parse_text(text)?),
                        _ => body.extend(self.tok(token, inner)?),
                    }
                }
                self.renderer.list_item(body)
            }
            BlockToken::LooseItemStart => {
                let inner = enter(nesting)?;
                let mut body = Vec::new();
                while let Some(token) = self.next_in("list_item_end")? {
                    body.extend(self.tok(token, inner)?);
                }
                self.renderer.list_item(body)
            }
            BlockToken::Html { pre, text } => {
                let children = if *pre || self.options.pedantic {
                    vec![self.renderer.raw_html(text)]
                } else {
                    self.inline.output(text)?
                };
                self.renderer.html(children)
            }
            BlockToken::Paragraph { text } => {
                let children = self.inline.output(text)?;
                self.renderer.paragraph(children)
            }
            BlockToken::Text { text } => {
                let children = self.parse_text(text)?;
                self.renderer.paragraph(children)
            }
            BlockToken::BlockquoteEnd | BlockToken::ListEnd | BlockToken::ListItemEnd => {
                return Err(RenderError::UnexpectedToken { kind: token.kind() });
            }
        };
        Ok(Some(node))
    }

    /// Join a run of consecutive text tokens and span-process it as one.
    fn parse_text(&mut self, first: &str) -> Result<Vec<Node>, RenderError> {
        let mut body = first.to_owned();
        while let Some(BlockToken::Text { text }) = self.peek() {
            body.push('\n');
            body.push_str(text);
            self.pos += 1;
        }
        self.inline.output(&body)
    }

    fn table(
        &mut self,
        header: &[String],
        align: &[Option<Alignment>],
        cells: &[Vec<String>],
    ) -> Result<Node, RenderError> {
        let flags = |header: bool, column: usize| CellFlags {
            header,
            align: align.get(column).copied().flatten(),
        };

        let mut head = Vec::with_capacity(header.len());
        for (column, text) in header.iter().enumerate() {
            let children = self.inline.output(text)?;
            head.push(self.renderer.table_cell(children, flags(true, column)));
        }

        let mut body = Vec::with_capacity(cells.len());
        for row in cells {
            let mut rendered = Vec::with_capacity(row.len());
            for (column, text) in row.iter().enumerate() {
                let children = self.inline.output(text)?;
                rendered.push(self.renderer.table_cell(children, flags(false, column)));
            }
            body.push(self.renderer.table_row(rendered));
        }

        Ok(self
            .renderer
            .table(vec![self.renderer.table_row(head)], body))
    }
}

/// Nesting level for the children of a container opened at `nesting`.
fn enter(nesting: usize) -> Result<usize, RenderError> {
    if nesting == MAX_NESTING {
        return Err(RenderError::TooDeep { limit: MAX_NESTING });
    }
    Ok(nesting + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyGenerator;
    use crate::lexer::BlockLexer;
    use crate::node_renderer::NodeRenderer;
    use pretty_assertions::assert_eq;

    fn options() -> Options {
        Options::new()
            .with_keys(KeyGenerator::isolated())
            .with_mangle_seed(3)
    }

    fn parse_tokens(tokens: &[BlockToken]) -> Result<Vec<Node>, RenderError> {
        let options = options();
        let renderer = NodeRenderer::new(&options);
        let links = LinkTable::new();
        Parser::new(tokens, &links, &renderer, &options).parse()
    }

    fn render_with(src: &str, options: &Options) -> Vec<Node> {
        let lexed = BlockLexer::new(options).lex(src).unwrap();
        let renderer = NodeRenderer::new(options);
        Parser::new(&lexed.tokens, &lexed.links, &renderer, options)
            .parse()
            .unwrap()
    }

    fn render(src: &str) -> Vec<Node> {
        render_with(src, &options())
    }

    fn html(src: &str) -> String {
        Node::sequence_to_html(&render(src))
    }

    fn text(text: &str) -> BlockToken {
        BlockToken::Text {
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_plain_text_is_single_paragraph() {
        for input in ["hello", "just some words", "line one\nline two", "a, b; c?"] {
            let nodes = render(input);
            assert_eq!(nodes.len(), 1, "{input}");
            assert_eq!(nodes[0].tag(), Some("p"));
            assert_eq!(nodes[0].children(), &[Node::text(input)], "{input}");
        }
    }

    #[test]
    fn test_top_level_keys_are_indexes() {
        let nodes = render("# A\n\npara\n\n---\n\n- x\n\n> q\n\n    code");
        let keys: Vec<_> = nodes.iter().map(Node::key).collect();
        assert_eq!(keys, vec![Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn test_heading_example() {
        let nodes = render("# Hello World");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag(), Some("h1"));
        assert_eq!(nodes[0].attr("id"), Some("hello-world"));
    }

    #[test]
    fn test_strong_and_em_example() {
        let nodes = render("**bold** and *em*");
        let children = nodes[0].children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].tag(), Some("strong"));
        assert_eq!(children[0].children(), &[Node::text("bold")]);
        assert_eq!(children[1], Node::text(" and "));
        assert_eq!(children[2].tag(), Some("em"));
        assert_eq!(children[2].children(), &[Node::text("em")]);
    }

    #[test]
    fn test_sanitize_example() {
        let options = options().with_sanitize(true);
        let nodes = render_with("[x](javascript:alert(1))", &options);
        let anchor = &nodes[0].children()[0];
        assert_eq!(anchor.tag(), Some("a"));
        assert_eq!(anchor.attr("href"), None);
        assert!(anchor.children().is_empty());
    }

    #[test]
    fn test_ordered_list_example() {
        let nodes = render("1. a\n2. b");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag(), Some("ol"));
        let items = nodes[0].children();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key(), Some(0));
        assert_eq!(items[1].key(), Some(1));
        assert_eq!(items[0].children(), &[Node::text("a")]);
    }

    #[test]
    fn test_reference_matches_inline_link() {
        let reference = render("[text][label]\n\n[label]: /href \"Title\"");
        let inline = render("[text](/href \"Title\")");
        assert_eq!(reference[0].children(), inline[0].children());
        assert_eq!(
            inline[0].children()[0].to_html(),
            r#"<a href="/href" title="Title">text</a>"#
        );
    }

    #[test]
    fn test_undefined_reference_is_literal() {
        let nodes = render("[text][undefined-label]");
        assert_eq!(nodes[0].children(), &[Node::text("[text][undefined-label]")]);
    }

    #[test]
    fn test_tight_and_loose_items() {
        assert_eq!(html("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(html("- a\n\n- b"), "<ul><li><p>a</p></li><li><p>b</p></li></ul>");
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(html("- a\n  - b"), "<ul><li>a<ul><li>b</li></ul></li></ul>");
    }

    #[test]
    fn test_consecutive_text_tokens_join_with_newline() {
        let tokens = [
            BlockToken::ListStart { ordered: false },
            BlockToken::ListItemStart,
            text("a"),
            text("b"),
            BlockToken::ListItemEnd,
            BlockToken::ListEnd,
        ];
        let nodes = parse_tokens(&tokens).unwrap();
        assert_eq!(nodes[0].children()[0].children(), &[Node::text("a\nb")]);
    }

    #[test]
    fn test_top_level_text_becomes_paragraph() {
        let nodes = parse_tokens(&[text("a"), text("b")]).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].to_html(), "<p>a\nb</p>");
    }

    #[test]
    fn test_blockquote_nesting() {
        assert_eq!(
            html("> a\n>\n> > b"),
            "<blockquote><p>a</p><blockquote><p>b</p></blockquote></blockquote>"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            html("| A | B |\n|:-:|--:|\n| 1 | *2* |"),
            "<table><thead><tr><th style=\"text-align:center\">A</th>\
             <th style=\"text-align:right\">B</th></tr></thead>\
             <tbody><tr><td style=\"text-align:center\">1</td>\
             <td style=\"text-align:right\"><em>2</em></td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_code_block_keeps_text() {
        assert_eq!(
            html("```js\nlet a = 1 < 2;\n```"),
            r#"<pre><code class="lang-js">let a = 1 &lt; 2;</code></pre>"#
        );
    }

    #[test]
    fn test_html_block_is_span_processed() {
        let nodes = parse_tokens(&[BlockToken::Html {
            pre: false,
            text: "<div>*a*</div>".to_owned(),
        }])
        .unwrap();
        assert_eq!(nodes[0].to_html(), "<div><em>a</em></div>");
        assert_eq!(nodes[0].key(), Some(0));
    }

    #[test]
    fn test_pre_html_block_is_raw() {
        let nodes = parse_tokens(&[BlockToken::Html {
            pre: true,
            text: "<pre>*a*</pre>".to_owned(),
        }])
        .unwrap();
        assert_eq!(nodes[0].to_html(), "<pre>*a*</pre>");
    }

    #[test]
    fn test_space_tokens_produce_nothing() {
        let nodes = parse_tokens(&[
            BlockToken::Space,
            BlockToken::Hr,
            BlockToken::Space,
            BlockToken::Hr,
        ])
        .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].key(), Some(1));
    }

    #[test]
    fn test_unclosed_containers_fail() {
        assert_eq!(
            parse_tokens(&[BlockToken::BlockquoteStart, BlockToken::Hr]),
            Err(RenderError::MissingEnd {
                expected: "blockquote_end"
            })
        );
        assert_eq!(
            parse_tokens(&[BlockToken::ListStart { ordered: true }]),
            Err(RenderError::MissingEnd {
                expected: "list_end"
            })
        );
        assert_eq!(
            parse_tokens(&[
                BlockToken::ListStart { ordered: false },
                BlockToken::ListItemStart,
                text("a"),
            ]),
            Err(RenderError::MissingEnd {
                expected: "list_item_end"
            })
        );
    }

    #[test]
    fn test_stray_end_token_fails() {
        assert_eq!(
            parse_tokens(&[BlockToken::Hr, BlockToken::ListEnd]),
            Err(RenderError::UnexpectedToken { kind: "list_end" })
        );
        assert_eq!(
            parse_tokens(&[BlockToken::BlockquoteStart, BlockToken::ListItemEnd]),
            Err(RenderError::UnexpectedToken {
                kind: "list_item_end"
            })
        );
    }

    fn nested_blockquotes(levels: usize) -> Vec<BlockToken> {
        let mut tokens = vec![BlockToken::BlockquoteStart; levels];
        tokens.push(BlockToken::Hr);
        tokens.extend(vec![BlockToken::BlockquoteEnd; levels]);
        tokens
    }

    fn on_large_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        std::thread::Builder::new()
            .stack_size(64 << 20)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_container_nesting_is_limited() {
        let (at_limit, past_limit) = on_large_stack(|| {
            (
                parse_tokens(&nested_blockquotes(MAX_NESTING)),
                parse_tokens(&nested_blockquotes(MAX_NESTING + 1)),
            )
        });
        assert_eq!(at_limit.unwrap().len(), 1);
        assert_eq!(past_limit, Err(RenderError::TooDeep { limit: MAX_NESTING }));
    }

    #[test]
    fn test_unterminated_list_starts_hit_nesting_limit() {
        let tokens = vec![BlockToken::ListStart { ordered: false }; 10_000];
        let result = on_large_stack(move || parse_tokens(&tokens));
        assert_eq!(result, Err(RenderError::TooDeep { limit: MAX_NESTING }));
    }

    #[test]
    fn test_counter_keys_survive_across_renders() {
        let options = options();
        render_with("*a*", &options);
        let before = options.keys.last_key();
        render_with("*b*", &options);
        assert!(options.keys.last_key() > before);
    }
}

//! Markdown renderer with a pluggable node strategy.

use crate::backend::Renderer;
use crate::error::RenderError;
use crate::lexer::BlockLexer;
use crate::node::Node;
use crate::node_renderer::NodeRenderer;
use crate::options::Options;
use crate::parser::Parser;
use crate::token::{BlockToken, LexOutput, LinkTable};

/// Markdown renderer with a pluggable [`Renderer`] strategy.
///
/// Runs the whole pipeline: block lexing, block parsing, span processing and
/// node construction. Each call builds a fresh parse session; nothing but the
/// key counter carries over between calls.
///
/// # Example
///
/// ```
/// use mdtree_renderer::{MarkdownRenderer, Options};
///
/// let renderer = MarkdownRenderer::new(Options::new().with_header_prefix("doc-"));
/// let nodes = renderer.render_markdown("# Hello\n\n**Bold** text").unwrap();
/// assert_eq!(nodes[0].attr("id"), Some("doc-hello"));
/// ```
#[derive(Debug)]
pub struct MarkdownRenderer<R: Renderer = NodeRenderer> {
    renderer: R,
    options: Options,
}

impl MarkdownRenderer<NodeRenderer> {
    /// Create a renderer using [`NodeRenderer`].
    #[must_use]
    pub fn new(options: Options) -> Self {
        let renderer = NodeRenderer::new(&options);
        Self { renderer, options }
    }
}

impl Default for MarkdownRenderer<NodeRenderer> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl<R: Renderer> MarkdownRenderer<R> {
    /// Create a renderer with a custom node strategy.
    #[must_use]
    pub fn with_renderer(options: Options, renderer: R) -> Self {
        Self { renderer, options }
    }

    /// Options used for lexing and span processing.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The node strategy.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Tokenize markdown without rendering it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::BlockStall`] if the lexer cannot make progress.
    pub fn lex(&self, markdown: &str) -> Result<LexOutput, RenderError> {
        BlockLexer::new(&self.options).lex(markdown)
    }

    /// Render markdown text into top-level nodes.
    ///
    /// # Errors
    ///
    /// Returns an error only on internal-consistency failures; unresolved
    /// references and unsafe hrefs degrade instead.
    pub fn render_markdown(&self, markdown: &str) -> Result<Vec<Node>, RenderError> {
        let LexOutput { tokens, links } = self.lex(markdown)?;
        self.render_tokens(&tokens, &links)
    }

    /// Render a token stream produced elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error on stray end tokens, unclosed containers, or span
    /// text no inline rule can consume.
    pub fn render_tokens(
        &self,
        tokens: &[BlockToken],
        links: &LinkTable,
    ) -> Result<Vec<Node>, RenderError> {
        Parser::new(tokens, links, &self.renderer, &self.options).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CellFlags;
    use crate::error::MAX_NESTING;
    use crate::key::KeyGenerator;
    use crate::node::Element;
    use crate::token::Link;
    use pretty_assertions::assert_eq;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new(
            Options::new()
                .with_keys(KeyGenerator::isolated())
                .with_mangle_seed(11),
        )
    }

    fn html(markdown: &str) -> String {
        Node::sequence_to_html(&renderer().render_markdown(markdown).unwrap())
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(html("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_document() {
        assert_eq!(
            html("# Title\n\nSome *text* with `code`.\n\n> quoted\n\n***"),
            "<h1 id=\"title\">Title</h1>\
             <p>Some <em>text</em> with <code>code</code>.</p>\
             <blockquote><p>quoted</p></blockquote>\
             <hr>"
        );
    }

    #[test]
    fn test_strikethrough_needs_gfm() {
        assert_eq!(html("~~gone~~"), "<p><del>gone</del></p>");
        let plain = MarkdownRenderer::new(Options::new().with_gfm(false));
        let nodes = plain.render_markdown("~~gone~~").unwrap();
        assert_eq!(nodes[0].text_content(), "~~gone~~");
    }

    #[test]
    fn test_raw_html_escaped_when_sanitized() {
        let r = MarkdownRenderer::new(Options::new().with_sanitize(true));
        let nodes = r.render_markdown("a <script>x</script>").unwrap();
        assert_eq!(
            Node::sequence_to_html(&nodes),
            "<p>a &lt;script&gt;x&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_render_tokens_with_external_links() {
        let mut links = LinkTable::new();
        links.insert(
            "home",
            Link {
                href: "/".to_owned(),
                title: None,
            },
        );
        let tokens = [BlockToken::Paragraph {
            text: "[Home]".to_owned(),
        }];
        let nodes = renderer().render_tokens(&tokens, &links).unwrap();
        assert_eq!(nodes[0].to_html(), r#"<p><a href="/">Home</a></p>"#);
    }

    #[test]
    fn test_lex_exposes_tokens() {
        let lexed = renderer().lex("[a]: /x\n\n---").unwrap();
        assert_eq!(lexed.tokens, vec![BlockToken::Hr]);
        assert_eq!(lexed.links.len(), 1);
    }

    #[test]
    fn test_renders_are_independent() {
        let r = renderer();
        let first = r.render_markdown("[a]\n\n[a]: /x").unwrap();
        let second = r.render_markdown("[a]").unwrap();
        assert_eq!(first[0].children()[0].tag(), Some("a"));
        assert_eq!(second[0].children(), &[Node::text("[a]")]);
    }

    #[test]
    fn test_deeply_nested_input_fails_cleanly() {
        let results = std::thread::Builder::new()
            .stack_size(64 << 20)
            .spawn(|| {
                ["1. ", "> ", "* "].map(|prefix| {
                    renderer().render_markdown(&format!("{}a", prefix.repeat(10_000)))
                })
            })
            .unwrap()
            .join()
            .unwrap();
        for result in results {
            assert_eq!(result, Err(RenderError::TooDeep { limit: MAX_NESTING }));
        }
    }

    #[test]
    fn test_reasonable_nesting_renders() {
        let nodes = renderer().render_markdown(&format!("{}a", "- ".repeat(20))).unwrap();
        let mut node = &nodes[0];
        let mut lists = 1;
        while let Some(child) = node.children().first().and_then(|item| item.children().first()) {
            if child.tag() != Some("ul") {
                assert_eq!(child, &Node::text("a"));
                break;
            }
            lists += 1;
            node = child;
        }
        assert_eq!(lists, 20);
    }

    /// Renders every construct as a bare `span` with its kind as class.
    struct SpanRenderer;

    fn span(kind: &str, children: Vec<Node>) -> Node {
        Element::new("span")
            .with_attr("class", kind)
            .with_children(children)
            .into()
    }

    impl Renderer for SpanRenderer {
        fn code(&self, code: &str, _: Option<&str>, _: bool) -> Node {
            span("code", vec![Node::text(code)])
        }
        fn blockquote(&self, children: Vec<Node>) -> Node {
            span("blockquote", children)
        }
        fn html(&self, children: Vec<Node>) -> Node {
            span("html", children)
        }
        fn heading(&self, children: Vec<Node>, _: u8, _: &str) -> Node {
            span("heading", children)
        }
        fn hr(&self) -> Node {
            span("hr", vec![])
        }
        fn list(&self, children: Vec<Node>, _: bool) -> Node {
            span("list", children)
        }
        fn list_item(&self, children: Vec<Node>) -> Node {
            span("item", children)
        }
        fn paragraph(&self, children: Vec<Node>) -> Node {
            span("p", children)
        }
        fn table(&self, header: Vec<Node>, body: Vec<Node>) -> Node {
            span("table", header.into_iter().chain(body).collect())
        }
        fn table_row(&self, cells: Vec<Node>) -> Node {
            span("row", cells)
        }
        fn table_cell(&self, children: Vec<Node>, _: CellFlags) -> Node {
            span("cell", children)
        }
        fn strong(&self, children: Vec<Node>) -> Node {
            span("strong", children)
        }
        fn em(&self, children: Vec<Node>) -> Node {
            span("em", children)
        }
        fn codespan(&self, text: &str) -> Node {
            span("codespan", vec![Node::text(text)])
        }
        fn br(&self) -> Node {
            span("br", vec![])
        }
        fn del(&self, children: Vec<Node>) -> Node {
            span("del", children)
        }
        fn link(&self, _: &str, _: Option<&str>, children: Vec<Node>) -> Node {
            span("link", children)
        }
        fn image(&self, _: &str, _: Option<&str>, alt: &str) -> Node {
            span("image", vec![Node::text(alt)])
        }
    }

    #[test]
    fn test_custom_renderer() {
        let r = MarkdownRenderer::with_renderer(Options::new(), SpanRenderer);
        let nodes = r.render_markdown("# *Hi*\n\n- [a](/a)").unwrap();
        assert_eq!(
            Node::sequence_to_html(&nodes),
            "<span class=\"heading\"><span class=\"em\">Hi</span></span>\
             <span class=\"list\"><span class=\"item\"><span class=\"link\">a</span></span></span>"
        );
        assert_eq!(nodes[1].key(), Some(1));
    }
}

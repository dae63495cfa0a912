//! Default renderer strategy.
//!
//! Builds HTML-shaped [`Node`] trees: one element per markdown construct,
//! tag names as in HTML5.

use crate::backend::{CellFlags, Renderer};
use crate::key::KeyGenerator;
use crate::node::{Element, Node};
use crate::options::{Highlighter, Options, TextPreprocessor};
use crate::sanitize::check_href;
use crate::util::heading_id;

/// Node renderer.
///
/// Owns the sanitize policy, the key generator handle and the optional
/// hooks (text preprocessor, highlighter). Paragraph, strong, emphasis and
/// list-item nodes get a fresh key on every call.
#[derive(Clone)]
pub struct NodeRenderer {
    sanitize: bool,
    header_prefix: String,
    lang_prefix: String,
    keys: KeyGenerator,
    text_preprocessor: Option<TextPreprocessor>,
    highlight: Option<Highlighter>,
    interpolations: Option<serde_json::Value>,
}

impl NodeRenderer {
    /// Create a renderer from options.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            sanitize: options.sanitize,
            header_prefix: options.header_prefix.clone(),
            lang_prefix: options.lang_prefix.clone(),
            keys: options.keys.clone(),
            text_preprocessor: options.text_preprocessor.clone(),
            highlight: options.highlight.clone(),
            interpolations: options.interpolations.clone(),
        }
    }

    /// Opaque interpolations value from the options.
    #[must_use]
    pub fn interpolations(&self) -> Option<&serde_json::Value> {
        self.interpolations.as_ref()
    }

    /// Key generator used for paragraph, strong, emphasis and list-item nodes.
    #[must_use]
    pub fn keys(&self) -> &KeyGenerator {
        &self.keys
    }

    /// Run plain-text children through the preprocessor.
    ///
    /// Applies when every child is a text node, so an empty list is passed
    /// through as `""`; markup-bearing children pass through unchanged.
    fn normalize_text(&self, children: Vec<Node>) -> Vec<Node> {
        let Some(preprocess) = &self.text_preprocessor else {
            return children;
        };
        if !children.iter().all(|c| matches!(c, Node::Text(_))) {
            return children;
        }
        let joined = children
            .iter()
            .filter_map(Node::as_text)
            .collect::<Vec<_>>()
            .join(" ");
        preprocess(&joined)
    }

    fn keyed(&self, tag: &str, children: Vec<Node>) -> Node {
        Element::new(tag)
            .with_key(self.keys.next_key())
            .with_children(self.normalize_text(children))
            .into()
    }
}

impl std::fmt::Debug for NodeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRenderer")
            .field("sanitize", &self.sanitize)
            .field("header_prefix", &self.header_prefix)
            .field("lang_prefix", &self.lang_prefix)
            .finish_non_exhaustive()
    }
}

fn wrap(tag: &str, children: Vec<Node>) -> Node {
    Element::new(tag).with_children(children).into()
}

impl Renderer for NodeRenderer {
    fn code(&self, code: &str, lang: Option<&str>, escaped: bool) -> Node {
        let highlighted = self
            .highlight
            .as_ref()
            .and_then(|highlight| highlight(code, lang))
            .filter(|out| out != code);
        let body = match highlighted {
            Some(markup) => Node::Html(markup),
            None if escaped => Node::html(code),
            None => Node::text(code),
        };

        let mut inner = Element::new("code").with_children(vec![body]);
        if let Some(lang) = lang {
            inner = inner.with_attr("class", format!("{}{lang}", self.lang_prefix));
        }
        wrap("pre", vec![inner.into()])
    }

    fn blockquote(&self, children: Vec<Node>) -> Node {
        wrap("blockquote", children)
    }

    fn html(&self, children: Vec<Node>) -> Node {
        Node::fragment(children)
    }

    fn heading(&self, children: Vec<Node>, level: u8, raw: &str) -> Node {
        let level = level.clamp(1, 6);
        Element::new(format!("h{level}"))
            .with_attr("id", heading_id(raw, &self.header_prefix))
            .with_children(children)
            .into()
    }

    fn hr(&self) -> Node {
        Element::new("hr").into()
    }

    fn list(&self, children: Vec<Node>, ordered: bool) -> Node {
        wrap(if ordered { "ol" } else { "ul" }, children)
    }

    fn list_item(&self, children: Vec<Node>) -> Node {
        self.keyed("li", children)
    }

    fn paragraph(&self, children: Vec<Node>) -> Node {
        self.keyed("p", children)
    }

    fn table(&self, header: Vec<Node>, body: Vec<Node>) -> Node {
        wrap("table", vec![wrap("thead", header), wrap("tbody", body)])
    }

    fn table_row(&self, cells: Vec<Node>) -> Node {
        wrap("tr", cells)
    }

    fn table_cell(&self, children: Vec<Node>, flags: CellFlags) -> Node {
        let mut cell = Element::new(if flags.header { "th" } else { "td" });
        if let Some(align) = flags.align {
            cell = cell.with_attr("style", format!("text-align:{}", align.as_str()));
        }
        cell.with_children(children).into()
    }

    fn strong(&self, children: Vec<Node>) -> Node {
        self.keyed("strong", children)
    }

    fn em(&self, children: Vec<Node>) -> Node {
        self.keyed("em", children)
    }

    fn codespan(&self, text: &str) -> Node {
        wrap("code", vec![Node::text(text)])
    }

    fn br(&self) -> Node {
        Element::new("br").into()
    }

    fn del(&self, children: Vec<Node>) -> Node {
        wrap("del", children)
    }

    fn link(&self, href: &str, title: Option<&str>, children: Vec<Node>) -> Node {
        if self.sanitize
            && let Err(reason) = check_href(href)
        {
            tracing::debug!(href, %reason, "Rejected link href");
            return Element::new("a").into();
        }
        let mut anchor = Element::new("a").with_attr("href", href);
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            anchor = anchor.with_attr("title", title);
        }
        anchor.with_children(children).into()
    }

    fn image(&self, href: &str, title: Option<&str>, alt: &str) -> Node {
        let mut img = Element::new("img")
            .with_attr("src", href)
            .with_attr("alt", alt);
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            img = img.with_attr("title", title);
        }
        img.into()
    }
}

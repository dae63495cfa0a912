//! Rendering options.

use std::fmt;
use std::sync::Arc;

use crate::key::KeyGenerator;
use crate::node::Node;

/// Rewrites a run of plain prose into nodes.
///
/// Receives the plain-text children of a paragraph, emphasis or list item
/// joined with single spaces; its result replaces those children.
pub type TextPreprocessor = Arc<dyn Fn(&str) -> Vec<Node> + Send + Sync>;

/// Code highlighter: `(code, lang) -> highlighted markup`.
///
/// Returning `None` (or the input unchanged) keeps the plain code text.
pub type Highlighter = Arc<dyn Fn(&str, Option<&str>) -> Option<String> + Send + Sync>;

/// Options shared by the lexer, the inline processor and [`NodeRenderer`](crate::NodeRenderer).
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// GitHub Flavored Markdown: fences, bare URLs, strikethrough.
    pub gfm: bool,
    /// GFM tables (requires `gfm`).
    pub tables: bool,
    /// Treat single newlines inside paragraphs as hard breaks (requires `gfm`).
    pub breaks: bool,
    /// Follow the original markdown.pl quirks; disables span processing of HTML blocks.
    pub pedantic: bool,
    /// Reject `javascript:`/`vbscript:` links and escape raw HTML.
    pub sanitize: bool,
    /// Obfuscate email autolinks with random character references.
    pub mangle: bool,
    /// Typographic quotes, dashes and ellipses.
    pub smartypants: bool,
    /// Prepended to generated heading ids.
    pub header_prefix: String,
    /// Prepended to the language of fenced code blocks in the `class` attribute.
    pub lang_prefix: String,
    /// Opaque value handed to the renderer, never interpreted by it.
    pub interpolations: Option<serde_json::Value>,
    /// Rewrites runs of plain prose.
    pub text_preprocessor: Option<TextPreprocessor>,
    /// Highlights code blocks.
    pub highlight: Option<Highlighter>,
    /// Key counter for paragraph, emphasis and list-item nodes.
    pub keys: KeyGenerator,
    /// Seed for email mangling; `None` uses an OS-seeded generator.
    pub mangle_seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gfm: true,
            tables: true,
            breaks: false,
            pedantic: false,
            sanitize: false,
            mangle: true,
            smartypants: false,
            header_prefix: String::new(),
            lang_prefix: "lang-".to_owned(),
            interpolations: None,
            text_preprocessor: None,
            highlight: None,
            keys: KeyGenerator::global(),
            mangle_seed: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("gfm", &self.gfm)
            .field("tables", &self.tables)
            .field("breaks", &self.breaks)
            .field("pedantic", &self.pedantic)
            .field("sanitize", &self.sanitize)
            .field("mangle", &self.mangle)
            .field("smartypants", &self.smartypants)
            .field("header_prefix", &self.header_prefix)
            .field("lang_prefix", &self.lang_prefix)
            .field("interpolations", &self.interpolations)
            .field("text_preprocessor", &self.text_preprocessor.is_some())
            .field("highlight", &self.highlight.is_some())
            .field("mangle_seed", &self.mangle_seed)
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Create options with defaults (GFM and tables on).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable GitHub Flavored Markdown.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable GFM tables.
    #[must_use]
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.tables = enabled;
        self
    }

    /// Enable or disable GFM line breaks.
    #[must_use]
    pub fn with_breaks(mut self, enabled: bool) -> Self {
        self.breaks = enabled;
        self
    }

    /// Enable or disable pedantic mode.
    #[must_use]
    pub fn with_pedantic(mut self, enabled: bool) -> Self {
        self.pedantic = enabled;
        self
    }

    /// Enable or disable sanitize mode.
    #[must_use]
    pub fn with_sanitize(mut self, enabled: bool) -> Self {
        self.sanitize = enabled;
        self
    }

    /// Enable or disable email mangling.
    #[must_use]
    pub fn with_mangle(mut self, enabled: bool) -> Self {
        self.mangle = enabled;
        self
    }

    /// Use a fixed seed for email mangling.
    #[must_use]
    pub fn with_mangle_seed(mut self, seed: u64) -> Self {
        self.mangle_seed = Some(seed);
        self
    }

    /// Enable or disable smartypants.
    #[must_use]
    pub fn with_smartypants(mut self, enabled: bool) -> Self {
        self.smartypants = enabled;
        self
    }

    /// Set the heading id prefix.
    #[must_use]
    pub fn with_header_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.header_prefix = prefix.into();
        self
    }

    /// Set the code language class prefix.
    #[must_use]
    pub fn with_lang_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.lang_prefix = prefix.into();
        self
    }

    /// Attach an opaque interpolations value.
    #[must_use]
    pub fn with_interpolations(mut self, value: serde_json::Value) -> Self {
        self.interpolations = Some(value);
        self
    }

    /// Set the plain-prose preprocessor.
    ///
    /// # Example
    ///
    /// ```
    /// use mdtree_renderer::{Node, Options, render};
    ///
    /// let options = Options::new().with_text_preprocessor(|text| {
    ///     vec![Node::text(text.replace("{name}", "World"))]
    /// });
    /// let nodes = render("Hello {name}", &options).unwrap();
    /// assert_eq!(nodes[0].text_content(), "Hello World");
    /// ```
    #[must_use]
    pub fn with_text_preprocessor<F>(mut self, preprocessor: F) -> Self
    where
        F: Fn(&str) -> Vec<Node> + Send + Sync + 'static,
    {
        self.text_preprocessor = Some(Arc::new(preprocessor));
        self
    }

    /// Set the code highlighter.
    #[must_use]
    pub fn with_highlight<F>(mut self, highlight: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        self.highlight = Some(Arc::new(highlight));
        self
    }

    /// Use a specific key generator.
    #[must_use]
    pub fn with_keys(mut self, keys: KeyGenerator) -> Self {
        self.keys = keys;
        self
    }
}

//! Renderer strategy trait.

use crate::node::Node;
use crate::token::Alignment;

/// Per-cell table information.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellFlags {
    /// Whether the cell belongs to the header row.
    pub header: bool,
    /// Column alignment, if the separator row declared one.
    pub align: Option<Alignment>,
}

/// Node construction strategy.
///
/// The block parser and the inline processor decide *what* to build; a
/// `Renderer` decides *how* each kind of node looks. Every method receives
/// children that are already rendered and returns exactly one node.
///
/// Methods must not fail for any input a tokenized document can produce.
/// Policy decisions such as sanitizing hrefs belong here, not in the parser.
pub trait Renderer {
    /// Code block. `escaped` means `code` is already markup.
    fn code(&self, code: &str, lang: Option<&str>, escaped: bool) -> Node;

    fn blockquote(&self, children: Vec<Node>) -> Node;

    /// Block-level HTML, either span-processed or a single raw node.
    fn html(&self, children: Vec<Node>) -> Node;

    /// Heading of `level` (1 to 6). `raw` is the unprocessed heading text.
    fn heading(&self, children: Vec<Node>, level: u8, raw: &str) -> Node;

    fn hr(&self) -> Node;

    /// List; children are the already keyed items.
    fn list(&self, children: Vec<Node>, ordered: bool) -> Node;

    fn list_item(&self, children: Vec<Node>) -> Node;

    fn paragraph(&self, children: Vec<Node>) -> Node;

    /// Table with header rows and body rows.
    fn table(&self, header: Vec<Node>, body: Vec<Node>) -> Node;

    fn table_row(&self, cells: Vec<Node>) -> Node;

    fn table_cell(&self, children: Vec<Node>, flags: CellFlags) -> Node;

    fn strong(&self, children: Vec<Node>) -> Node;

    fn em(&self, children: Vec<Node>) -> Node;

    /// Inline code. `text` is the literal code.
    fn codespan(&self, text: &str) -> Node;

    fn br(&self) -> Node;

    fn del(&self, children: Vec<Node>) -> Node;

    /// Hyperlink. This is where unsafe hrefs are rejected.
    fn link(&self, href: &str, title: Option<&str>, children: Vec<Node>) -> Node;

    /// Image. `alt` is literal text.
    fn image(&self, href: &str, title: Option<&str>, alt: &str) -> Node;

    /// Plain text run.
    fn text(&self, text: &str) -> Node {
        Node::text(text)
    }

    /// Inline markup passed through verbatim (raw tags, mangled addresses).
    fn raw_html(&self, html: &str) -> Node {
        Node::html(html)
    }
}

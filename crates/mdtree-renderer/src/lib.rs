//! Markdown to structured node trees.
//!
//! This crate renders markdown into a tree of [`Node`] values instead of an
//! HTML string, so a UI layer can mount the result directly.
//!
//! # Architecture
//!
//! The pipeline has four stages:
//! - [`BlockLexer`]: markdown text to a flat [`BlockToken`] stream plus the
//!   [`LinkTable`] of reference definitions
//! - [`Parser`]: recursive descent over the token stream, assembling containers
//! - [`InlineProcessor`]: span-level markup inside each block
//! - [`Renderer`]: strategy building one node per construct; [`NodeRenderer`]
//!   is the default
//!
//! Paragraph, emphasis and list-item nodes carry keys from a process-wide
//! [`KeyGenerator`]; top-level nodes and list items are then re-keyed with
//! their position among siblings.
//!
//! # Example
//!
//! ```
//! use mdtree_renderer::{Options, render};
//!
//! let nodes = render("# Hello World\n\n**bold** and *em*", &Options::new()).unwrap();
//! assert_eq!(nodes.len(), 2);
//! assert_eq!(nodes[0].attr("id"), Some("hello-world"));
//! assert_eq!(nodes[1].children().len(), 3);
//! ```

mod backend;
mod error;
mod inline;
mod key;
mod lexer;
mod node;
mod node_renderer;
mod options;
mod parser;
mod renderer;
mod sanitize;
mod token;
mod util;

pub use backend::{CellFlags, Renderer};
pub use error::{MAX_NESTING, RenderError};
pub use inline::InlineProcessor;
pub use key::KeyGenerator;
pub use lexer::{BlockLexer, normalize};
pub use node::{Attributes, Element, Fragment, Key, Node};
pub use node_renderer::NodeRenderer;
pub use options::{Highlighter, Options, TextPreprocessor};
pub use parser::Parser;
pub use renderer::MarkdownRenderer;
pub use sanitize::{UnsafeHref, check_href};
pub use token::{Alignment, BlockToken, LexOutput, Link, LinkTable};
pub use util::{escape_html, heading_id};

/// Render markdown into top-level nodes with [`NodeRenderer`].
///
/// # Errors
///
/// Returns a [`RenderError`] only on internal-consistency failures.
pub fn render(markdown: &str, options: &Options) -> Result<Vec<Node>, RenderError> {
    MarkdownRenderer::new(options.clone()).render_markdown(markdown)
}

//! Block token vocabulary and link reference table.
//!
//! Tokens are what the block lexer produces and the block parser consumes.
//! Container tokens come in start/end pairs; everything between a pair
//! belongs to that container.

use std::collections::BTreeMap;

use serde::Serialize;

/// Column alignment of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Block-level token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockToken {
    /// Blank lines between blocks. Produces no node.
    Space,
    /// Thematic break.
    Hr,
    /// ATX or setext heading.
    Heading {
        /// Level, 1 to 6.
        depth: u8,
        /// Raw heading text, used for span processing and the anchor id.
        text: String,
    },
    /// Indented or fenced code block.
    Code {
        /// Language hint from the fence info string.
        #[serde(skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        /// Code text.
        text: String,
        /// Whether `text` is already markup.
        escaped: bool,
    },
    /// Table with one header row and any number of body rows.
    Table {
        /// Raw header cell texts.
        header: Vec<String>,
        /// Alignment per column.
        align: Vec<Option<Alignment>>,
        /// Raw body cell texts, row by row.
        cells: Vec<Vec<String>>,
    },
    BlockquoteStart,
    BlockquoteEnd,
    ListStart {
        /// Whether the list uses numbered bullets.
        ordered: bool,
    },
    ListEnd,
    /// Start of a tight list item (plain lines, no paragraphs).
    ListItemStart,
    /// Start of a loose list item (full block content).
    LooseItemStart,
    ListItemEnd,
    /// Block-level HTML.
    Html {
        /// Content of a `pre`, `script` or `style` block; not span-processed.
        pre: bool,
        /// Raw HTML text.
        text: String,
    },
    Paragraph {
        text: String,
    },
    /// A plain line inside a list item.
    Text {
        text: String,
    },
}

impl BlockToken {
    /// Token type name as used in the serialized form.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Hr => "hr",
            Self::Heading { .. } => "heading",
            Self::Code { .. } => "code",
            Self::Table { .. } => "table",
            Self::BlockquoteStart => "blockquote_start",
            Self::BlockquoteEnd => "blockquote_end",
            Self::ListStart { .. } => "list_start",
            Self::ListEnd => "list_end",
            Self::ListItemStart => "list_item_start",
            Self::LooseItemStart => "loose_item_start",
            Self::ListItemEnd => "list_item_end",
            Self::Html { .. } => "html",
            Self::Paragraph { .. } => "paragraph",
            Self::Text { .. } => "text",
        }
    }
}

/// Resolved link reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Link reference definitions keyed by normalized label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkTable(BTreeMap<String, Link>);

impl LinkTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a label: collapse whitespace runs to one space, lowercase.
    #[must_use]
    pub fn normalize_label(label: &str) -> String {
        label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Add a definition. The first definition of a label wins.
    pub fn insert(&mut self, label: &str, link: Link) {
        self.0
            .entry(Self::normalize_label(label))
            .or_insert(link);
    }

    /// Look up a label. Definitions with an empty href are treated as missing.
    #[must_use]
    pub fn resolve(&self, label: &str) -> Option<&Link> {
        self.0
            .get(&Self::normalize_label(label))
            .filter(|link| !link.href.is_empty())
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of the block lexer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LexOutput {
    /// Tokens in document order.
    pub tokens: Vec<BlockToken>,
    /// Link reference definitions.
    pub links: LinkTable,
}

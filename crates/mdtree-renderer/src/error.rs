//! Render error types.
//!
//! Only internal-consistency failures are errors. Unresolved references,
//! unsafe hrefs and missing titles degrade gracefully and never reach the caller.

/// Deepest container or span nesting accepted before rendering fails with
/// [`RenderError::TooDeep`]. A list level counts twice (list and item).
pub const MAX_NESTING: usize = 256;

/// Fatal rendering error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// No inline rule consumed the remaining span text.
    #[error("Infinite loop on byte: {byte}")]
    InlineStall {
        /// First byte of the unconsumed input.
        byte: u8,
    },

    /// No block rule consumed the remaining document text.
    #[error("Infinite loop on byte: {byte} (block level)")]
    BlockStall {
        /// First byte of the unconsumed input.
        byte: u8,
    },

    /// A token that cannot start a node appeared where a node was expected.
    #[error("Unexpected {kind} token")]
    UnexpectedToken {
        /// Token type name (e.g. `list_end`).
        kind: &'static str,
    },

    /// The token stream ended inside an open container.
    #[error("Token stream ended before {expected}")]
    MissingEnd {
        /// Expected closing token type name.
        expected: &'static str,
    },

    /// Containers or spans nested past [`MAX_NESTING`].
    #[error("Nesting deeper than {limit} levels")]
    TooDeep {
        /// The nesting limit that was exceeded.
        limit: usize,
    },
}

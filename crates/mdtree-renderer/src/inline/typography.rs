//! Text transforms: smartypants and email mangling.

use std::fmt::Write;
use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use regex::Regex;

static OPENING_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|[-\x{2014}/(\[{"\s])'"#).expect("invalid opening single regex")
});
static OPENING_DOUBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|[-\x{2014}/(\[{\x{2018}\s])""#).expect("invalid opening double regex")
});

/// Typographic punctuation: dashes, curly quotes and ellipses.
pub(crate) fn smartypants(text: &str) -> String {
    let text = text.replace("---", "\u{2014}").replace("--", "\u{2013}");
    let text = OPENING_SINGLE.replace_all(&text, "${1}\u{2018}");
    let text = text.replace('\'', "\u{2019}");
    let text = OPENING_DOUBLE.replace_all(&text, "${1}\u{201c}");
    let text = text.replace('"', "\u{201d}");
    text.replace("...", "\u{2026}")
}

/// Encodes characters as randomly chosen decimal or hex character references.
pub(crate) struct Mangler {
    rng: StdRng,
}

impl Mangler {
    /// A fixed seed gives reproducible output; `None` draws one from the thread RNG.
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub(crate) fn mangle(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 6);
        for c in text.chars() {
            let code = u32::from(c);
            if self.rng.random_bool(0.5) {
                write!(out, "&#x{code:x};").unwrap();
            } else {
                write!(out, "&#{code};").unwrap();
            }
        }
        out
    }
}

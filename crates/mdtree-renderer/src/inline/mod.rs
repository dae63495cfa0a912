//! Inline span processor.
//!
//! Turns the raw text of one block into span nodes. At each offset the rules
//! are tried in priority order (escape, autolink, bare URL, raw tag, link,
//! reference link, strong, emphasis, code span, hard break, strikethrough,
//! text); the first match consumes its prefix and contributes one value.
//! Nested spans recurse on their inner text.

mod rules;
mod typography;

use crate::backend::Renderer;
use crate::error::{MAX_NESTING, RenderError};
use crate::node::Node;
use crate::options::Options;
use crate::token::LinkTable;
use crate::util::first_char_len;

use self::rules::Autolink;
use self::typography::{Mangler, smartypants};

/// Output under construction. Adjacent plain-text values merge into one run.
#[derive(Default)]
struct Spans {
    items: Vec<Span>,
}

enum Span {
    Text(String),
    Node(Node),
}

impl Spans {
    fn push_text(&mut self, text: &str) {
        if let Some(Span::Text(last)) = self.items.last_mut() {
            last.push_str(text);
        } else {
            self.items.push(Span::Text(text.to_owned()));
        }
    }

    fn push(&mut self, node: Node) {
        self.items.push(Span::Node(node));
    }

    fn finish<R: Renderer>(self, renderer: &R) -> Vec<Node> {
        self.items
            .into_iter()
            .map(|span| match span {
                Span::Text(text) => renderer.text(&text),
                Span::Node(node) => node,
            })
            .collect()
    }
}

/// Span processor bound to one parse session.
pub struct InlineProcessor<'a, R: Renderer> {
    renderer: &'a R,
    links: &'a LinkTable,
    options: &'a Options,
    mangler: Mangler,
    in_link: bool,
    depth: usize,
}

impl<'a, R: Renderer> InlineProcessor<'a, R> {
    pub fn new(renderer: &'a R, links: &'a LinkTable, options: &'a Options) -> Self {
        Self {
            renderer,
            links,
            options,
            mangler: Mangler::new(options.mangle_seed),
            in_link: false,
            depth: 0,
        }
    }

    /// Process the raw text of a block.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InlineStall`] if no rule consumes the remaining text
    /// and [`RenderError::TooDeep`] past [`MAX_NESTING`] nested spans.
    pub fn output(&mut self, src: &str) -> Result<Vec<Node>, RenderError> {
        if self.depth == MAX_NESTING {
            return Err(RenderError::TooDeep { limit: MAX_NESTING });
        }
        self.depth += 1;
        let spans = self.spans(src);
        self.depth -= 1;
        spans
    }

    fn spans(&mut self, src: &str) -> Result<Vec<Node>, RenderError> {
        let mut out = Spans::default();
        let mut rest = src;
        while !rest.is_empty() {
            let consumed = self.step(rest, &mut out)?;
            if consumed == 0 {
                return Err(RenderError::InlineStall {
                    byte: rest.as_bytes()[0],
                });
            }
            rest = &rest[consumed..];
        }
        Ok(out.finish(self.renderer))
    }

    /// Apply the first matching rule and return the bytes it consumed.
    fn step(&mut self, src: &str, out: &mut Spans) -> Result<usize, RenderError> {
        let gfm = self.options.gfm;
        let breaks = gfm && self.options.breaks;

        if let Some(c) = rules::escape(src, gfm) {
            out.push_text(c.encode_utf8(&mut [0; 4]));
            return Ok(1 + c.len_utf8());
        }

        if let Some((autolink, n)) = rules::autolink(src) {
            out.push(self.autolink(&autolink));
            return Ok(n);
        }

        if gfm
            && !self.in_link
            && let Some(url) = rules::url(src)
        {
            let text = self.renderer.text(url);
            out.push(self.renderer.link(url, None, vec![text]));
            return Ok(url.len());
        }

        if let Some(tag) = rules::tag(src) {
            let lower = tag.to_ascii_lowercase();
            if !self.in_link && lower.starts_with("<a ") {
                self.in_link = true;
            } else if self.in_link && lower.starts_with("</a>") {
                self.in_link = false;
            }
            if self.options.sanitize {
                out.push_text(tag);
            } else {
                out.push(self.renderer.raw_html(tag));
            }
            return Ok(tag.len());
        }

        if let Some(link) = rules::link(src) {
            let node = self.output_link(link.image, link.text, link.href, link.title)?;
            out.push(node);
            return Ok(link.len);
        }

        if let Some(reference) = rules::reflink(src) {
            let links = self.links;
            if let Some(link) = links.resolve(reference.label) {
                let node = self.output_link(
                    reference.image,
                    reference.text,
                    &link.href,
                    link.title.as_deref(),
                )?;
                out.push(node);
                return Ok(reference.len);
            }
            tracing::debug!(label = reference.label, "Unresolved link reference");
            let n = first_char_len(src);
            out.push_text(&src[..n]);
            return Ok(n);
        }

        if let Some((body, n)) = rules::strong(src) {
            let children = self.output(body)?;
            out.push(self.renderer.strong(children));
            return Ok(n);
        }

        if let Some((body, n)) = rules::em(src) {
            let children = self.output(body)?;
            out.push(self.renderer.em(children));
            return Ok(n);
        }

        if let Some((body, n)) = rules::code(src) {
            out.push(self.renderer.codespan(body));
            return Ok(n);
        }

        if let Some(n) = rules::br(src, breaks) {
            out.push(self.renderer.br());
            return Ok(n);
        }

        if gfm && let Some((body, n)) = rules::del(src) {
            let children = self.output(body)?;
            out.push(self.renderer.del(children));
            return Ok(n);
        }

        if let Some(n) = rules::text(src, gfm, breaks) {
            let text = &src[..n];
            if self.options.smartypants {
                out.push_text(&smartypants(text));
            } else {
                out.push_text(text);
            }
            return Ok(n);
        }

        Ok(0)
    }

    fn autolink(&mut self, autolink: &Autolink<'_>) -> Node {
        if !autolink.email {
            let text = self.renderer.text(autolink.body);
            return self.renderer.link(autolink.body, None, vec![text]);
        }

        let address = match autolink.body.get(6..7) {
            Some(":") => &autolink.body[7..],
            _ => autolink.body,
        };
        if self.options.mangle {
            let text = self.mangler.mangle(address);
            let href = format!("{}{text}", self.mangler.mangle("mailto:"));
            let child = self.renderer.raw_html(&text);
            self.renderer.link(&href, None, vec![child])
        } else {
            let child = self.renderer.text(address);
            self.renderer
                .link(&format!("mailto:{address}"), None, vec![child])
        }
    }

    fn output_link(
        &mut self,
        image: bool,
        text: &str,
        href: &str,
        title: Option<&str>,
    ) -> Result<Node, RenderError> {
        let title = title.filter(|t| !t.is_empty());
        if image {
            return Ok(self.renderer.image(href, title, text));
        }

        let was_in_link = self.in_link;
        self.in_link = true;
        let children = self.output(text);
        self.in_link = was_in_link;
        Ok(self.renderer.link(href, title, children?))
    }
}

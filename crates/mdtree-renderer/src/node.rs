//! Structured output nodes.
//!
//! A [`Node`] is the unit every [`Renderer`](crate::Renderer) method returns.
//! Nodes are built once by the renderer and only composed afterwards; the
//! single post-construction change is the identity key, applied through
//! [`Node::with_key`] which returns a new node.

use std::fmt::Write;

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::util::{escape_attr, escape_html};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

/// Identity key used by UI consumers to reconcile siblings.
pub type Key = u64;

/// Structured output node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Element with a tag, attributes and children.
    Element(Element),
    /// Plain text. Escaped when mounted or serialized.
    Text(String),
    /// Raw markup, mounted verbatim.
    Html(String),
    /// Children without a wrapping element.
    Fragment(Fragment),
}

/// Element node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Tag name (e.g. `p`, `h2`, `a`).
    pub tag: String,
    /// Identity key among siblings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// Attributes in insertion order.
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attrs: Attributes,
    /// Child nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// Keyed group of nodes without a wrapper element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Identity key among siblings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// Child nodes.
    pub children: Vec<Node>,
}

/// Ordered attribute map with unique keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the map has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}

impl Serialize for Attributes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Element {
    /// Create an element with no key, attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Set the identity key.
    #[must_use]
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a raw markup node.
    #[must_use]
    pub fn html(html: impl Into<String>) -> Self {
        Self::Html(html.into())
    }

    /// Create an unkeyed fragment.
    #[must_use]
    pub fn fragment(children: Vec<Node>) -> Self {
        Self::Fragment(Fragment {
            key: None,
            children,
        })
    }

    /// Return a copy of this node carrying `key`.
    ///
    /// Text and raw markup cannot carry keys and are returned unchanged.
    #[must_use]
    pub fn with_key(self, key: Key) -> Self {
        match self {
            Self::Element(element) => Self::Element(element.with_key(key)),
            Self::Fragment(fragment) => Self::Fragment(Fragment {
                key: Some(key),
                ..fragment
            }),
            other => other,
        }
    }

    /// Identity key, if any.
    #[must_use]
    pub fn key(&self) -> Option<Key> {
        match self {
            Self::Element(element) => element.key,
            Self::Fragment(fragment) => fragment.key,
            Self::Text(_) | Self::Html(_) => None,
        }
    }

    /// Tag name for element nodes.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element(element) => Some(&element.tag),
            _ => None,
        }
    }

    /// Attribute value for element nodes.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element(element) => element.attrs.get(name),
            _ => None,
        }
    }

    /// Children of element and fragment nodes.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element(element) => &element.children,
            Self::Fragment(fragment) => &fragment.children,
            Self::Text(_) | Self::Html(_) => &[],
        }
    }

    /// Text if this is a text node.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Html(_) => {}
            Self::Element(_) | Self::Fragment(_) => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serialize this node to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialize a node sequence to HTML.
    #[must_use]
    pub fn sequence_to_html(nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            node.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_html(text)),
            Self::Html(html) => out.push_str(html),
            Self::Fragment(fragment) => {
                for child in &fragment.children {
                    child.write_html(out);
                }
            }
            Self::Element(element) => {
                write!(out, "<{}", element.tag).unwrap();
                for (name, value) in element.attrs.iter() {
                    write!(out, r#" {name}="{}""#, escape_attr(value)).unwrap();
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    return;
                }
                for child in &element.children {
                    child.write_html(out);
                }
                write!(out, "</{}>", element.tag).unwrap();
            }
        }
    }
}

//! Queryable node tree over a parsed HTML document.
//!
//! Lookups never fail: a selector that matches nothing is `None` (or an empty
//! `Vec`), so callers decide what absence means for each field.

pub mod markers;

use scraper::{ElementRef, Html, Selector};

/// A parsed page. Not `Send`; parse and query it synchronously between awaits.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// First descendant matching `selector`, in document order.
    pub fn find_first(&self, selector: &Selector) -> Option<Node<'_>> {
        self.html.select(selector).next().map(Node)
    }

    /// Every descendant matching `selector`, in document order.
    pub fn find_all(&self, selector: &Selector) -> Vec<Node<'_>> {
        self.html.select(selector).map(Node).collect()
    }
}

/// An element inside a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    pub fn find_first(&self, selector: &Selector) -> Option<Node<'a>> {
        self.0.select(selector).next().map(Node)
    }

    pub fn find_all(&self, selector: &Selector) -> Vec<Node<'a>> {
        self.0.select(selector).map(Node).collect()
    }

    /// Immediate element children, optionally restricted to one tag name.
    pub fn child_elements(&self, tag: Option<&str>) -> Vec<Node<'a>> {
        self.0
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| tag.map_or(true, |t| el.value().name() == t))
            .map(Node)
            .collect()
    }

    /// Concatenated descendant text, untrimmed.
    pub fn text(&self) -> String {
        self.0.text().collect()
    }

    /// Descendant text with surrounding whitespace removed; `None` when blank.
    pub fn trimmed_text(&self) -> Option<String> {
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    pub fn tag(&self) -> &'a str {
        self.0.value().name()
    }
}

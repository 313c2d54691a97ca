//! In-memory host-page document model.
//!
//! The pipeline only touches the parts of the page that activation mutates:
//! the head's `<link>` hrefs, loaded script sources, evaluated inline
//! sources, and body nodes. Detached nodes (`DomNode`) hold an app's markup
//! until the host places them.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// A detached DOM node holding an HTML fragment.
///
/// Cheap to clone; clones share the same underlying node, and node identity
/// (not markup equality) is what distinguishes two instances of the same
/// app.
#[derive(Debug, Clone)]
pub struct DomNode {
    inner: Arc<Mutex<String>>,
}

impl DomNode {
    /// Create a detached node from an HTML fragment.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(html.into())),
        }
    }

    /// Create an empty detached node.
    pub fn empty() -> Self {
        Self::from_html("")
    }

    /// Get the node's current markup.
    pub fn html(&self) -> String {
        self.inner.lock().expect("dom node poisoned").clone()
    }

    /// Replace the node's markup.
    pub fn set_html(&self, html: impl Into<String>) {
        *self.inner.lock().expect("dom node poisoned") = html.into();
    }

    /// Check whether two handles refer to the same node.
    pub fn same_node(&self, other: &DomNode) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for DomNode {}

/// The mutable page state activation writes into.
///
/// A global shared resource: concurrent load calls against the same page
/// must observe each other's style links, which is why dedup consults the
/// live set rather than per-call state.
#[derive(Debug, Default)]
pub struct Document {
    links: Vec<String>,
    link_set: HashSet<String>,
    scripts: Vec<String>,
    inline_scripts: Vec<String>,
    body: Vec<DomNode>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document behind the shared handle the pipeline uses.
    pub fn shared() -> SharedDocument {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Check whether a `<link>` with this exact href is already on the page.
    pub fn has_link(&self, href: &str) -> bool {
        self.link_set.contains(href)
    }

    /// Append a batch of `<link>` tags. Hrefs already present are not
    /// re-inserted.
    pub fn append_links<I>(&mut self, hrefs: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for href in hrefs {
            let href = href.into();
            if self.link_set.insert(href.clone()) {
                self.links.push(href);
            }
        }
    }

    /// Record an external script as loaded on the page.
    pub fn append_script(&mut self, src: impl Into<String>) {
        self.scripts.push(src.into());
    }

    /// Record an inline script source as evaluated.
    pub fn record_inline(&mut self, source: impl Into<String>) {
        self.inline_scripts.push(source.into());
    }

    /// Place a detached node into the document body.
    pub fn append_body(&mut self, node: DomNode) {
        self.body.push(node);
    }

    /// Style link hrefs currently on the page, in insertion order.
    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// External script sources loaded on the page, in load order.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    /// Inline script sources evaluated on the page, in evaluation order.
    pub fn inline_scripts(&self) -> &[String] {
        &self.inline_scripts
    }

    /// Nodes placed into the body, in placement order.
    pub fn body(&self) -> &[DomNode] {
        &self.body
    }
}

/// Shared handle to the live page document.
pub type SharedDocument = Arc<Mutex<Document>>;

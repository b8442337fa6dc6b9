//! A small element tree that stands in for the rendered page.
//!
//! Nodes live in an arena owned by the `Document` and are addressed by `NodeId`. Detached nodes
//! stay in the arena but are unreachable from the root, so a `NodeId` is never invalidated.
//!
//! An element carries its own text, which is serialized *after* its children. That is enough to
//! express markup such as `<label><input type="checkbox">Food</label>`.

use crate::Result;
use anyhow::Context;
use maud::{html, Escaper, Render};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Handle to an element of a `Document`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(usize);

/// A single element: tag, classes, attributes, text and the `checked` property of form controls.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The element's own text, not including the text of its children.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only a `body` root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the element for `node`. `NodeId`s are only handed out by this document, so the
    /// lookup cannot miss.
    pub fn get(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    fn get_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    /// Creates a detached element.
    pub fn create(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Creates an element and appends it to `parent`.
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create(tag);
        self.append(parent, node);
        node
    }

    /// Appends `child` as the last child of `parent`, moving it if it is already attached.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.get_mut(child).parent = Some(parent);
        self.get_mut(parent).children.push(child);
    }

    /// Inserts `child` into the parent of `reference`, immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<()> {
        let parent = self
            .get(reference)
            .parent
            .context("Cannot insert before a node that has no parent")?;
        self.detach(child);
        let position = self
            .get(parent)
            .children
            .iter()
            .position(|n| *n == reference)
            .context("The reference node is not a child of its parent")?;
        self.get_mut(child).parent = Some(parent);
        self.get_mut(parent).children.insert(position, child);
        Ok(())
    }

    /// Removes `node` from its parent. Does nothing if it is already detached.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.get_mut(node).parent.take() {
            self.get_mut(parent).children.retain(|n| *n != node);
        }
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let _ = self.get_mut(node).attrs.insert(name.to_string(), value.into());
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        let _ = self.get_mut(node).attrs.remove(name);
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        let element = self.get_mut(node);
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.get_mut(node).classes.retain(|c| c != class);
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.get_mut(node).text = text.into();
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        self.get_mut(node).checked = checked;
    }

    /// The text of `node` and all of its descendants, in document order.
    pub fn inner_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let element = self.get(node);
        for child in &element.children {
            self.collect_text(*child, out);
        }
        out.push_str(&element.text);
    }

    /// All descendants of `scope` in document (pre-)order, excluding `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.get(scope).children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.get(node).children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `scope` for which `predicate` holds, in document order.
    pub fn select(&self, scope: NodeId, predicate: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| predicate(self.get(*n)))
            .collect()
    }

    /// The first descendant of `scope` for which `predicate` holds.
    pub fn select_first(
        &self,
        scope: NodeId,
        predicate: impl Fn(&Element) -> bool,
    ) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| predicate(self.get(*n)))
    }

    /// Finds the attached element whose `id` attribute is `id`.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.select_first(self.root, |e| e.attr("id") == Some(id))
    }

    /// Like `by_id` but treats a missing element as an error.
    pub fn require_id(&self, id: &str) -> Result<NodeId> {
        self.by_id(id)
            .with_context(|| format!("The page has no element with id '{id}'"))
    }

    /// Returns `node` or its nearest ancestor for which `predicate` holds.
    pub fn closest(&self, node: NodeId, predicate: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if predicate(self.get(n)) {
                return Some(n);
            }
            current = self.get(n).parent;
        }
        None
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.get(current).parent {
            current = parent;
        }
        current == self.root
    }

    /// Serializes the subtree at `node` as HTML.
    pub fn to_html(&self, node: NodeId) -> String {
        html! { (Subtree { doc: self, node }) }.into_string()
    }
}

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta"];

/// Markup for an element and its descendants. Tag and attribute names come from the view and are
/// written as is, attribute values and text are escaped.
struct Subtree<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl Render for Subtree<'_> {
    fn render_to(&self, buffer: &mut String) {
        let element = self.doc.get(self.node);
        buffer.push('<');
        buffer.push_str(&element.tag);
        if !element.classes.is_empty() {
            write_attr(buffer, "class", &element.classes.join(" "));
        }
        for (name, value) in &element.attrs {
            write_attr(buffer, name, value);
        }
        if element.checked {
            buffer.push_str(" checked");
        }
        buffer.push('>');
        if VOID_TAGS.contains(&element.tag.as_str()) {
            return;
        }
        for child in &element.children {
            Subtree {
                doc: self.doc,
                node: *child,
            }
            .render_to(buffer);
        }
        element.text.as_str().render_to(buffer);
        buffer.push_str("</");
        buffer.push_str(&element.tag);
        buffer.push('>');
    }
}

fn write_attr(buffer: &mut String, name: &str, value: &str) {
    buffer.push(' ');
    buffer.push_str(name);
    buffer.push_str("=\"");
    // Writing into a String cannot fail.
    let _ = Escaper::new(buffer).write_str(value);
    buffer.push('"');
}

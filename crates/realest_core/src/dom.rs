//! Document tree
//!
//! A small DOM-like element tree standing in for the host's rendering surface.
//! Elements carry marker attributes (`data-*` names) that animations target,
//! a layout box in page coordinates, authored (default) styles and inline
//! styles written by the animation engine.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::style::{Property, StyleValue};

new_key_type! {
    /// Handle to an element in a [`Document`]
    pub struct NodeId;
}

/// Document shared between the host, the UI store and animation contexts
pub type SharedDocument = Arc<Mutex<Document>>;

/// Visible area of the rendering surface in CSS pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1440.0, 900.0)
    }
}

/// Vertical placement of an element in page coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LayoutBox {
    pub top: f32,
    pub height: f32,
}

#[derive(Debug)]
struct Element {
    tag: String,
    markers: SmallVec<[String; 2]>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: LayoutBox,
    authored: FxHashMap<Property, StyleValue>,
    inline: FxHashMap<Property, StyleValue>,
    attributes: BTreeMap<String, String>,
}

impl Element {
    fn new(tag: &str, markers: &[&str], parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            markers: markers.iter().map(|m| m.to_string()).collect(),
            text: None,
            parent,
            children: Vec::new(),
            layout: LayoutBox::default(),
            authored: FxHashMap::default(),
            inline: FxHashMap::default(),
            attributes: BTreeMap::new(),
        }
    }
}

/// In-memory element tree
#[derive(Debug)]
pub struct Document {
    nodes: SlotMap<NodeId, Element>,
    root: NodeId,
    viewport: Viewport,
    /// Layout space reserved after pinned elements
    reserved: FxHashMap<NodeId, f32>,
    mutations: u64,
}

impl Document {
    /// Create an empty document whose root is the `html` element
    pub fn new(viewport: Viewport) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Element::new("html", &[], None));
        Self {
            nodes,
            root,
            viewport,
            reserved: FxHashMap::default(),
            mutations: 0,
        }
    }

    /// Wrap the document for sharing
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.mutations += 1;
    }

    /// Number of mutations applied since creation
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    // =========================================================================
    // Tree construction
    // =========================================================================

    /// Create an element and append it to `parent`
    pub fn create_element(&mut self, parent: NodeId, tag: &str, markers: &[&str]) -> NodeId {
        let id = self.nodes.insert(Element::new(tag, markers, Some(parent)));
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    /// Set the text content of an element
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.text = Some(text.into());
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).and_then(|el| el.text.as_deref())
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|el| el.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|el| el.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|el| el.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn has_marker(&self, node: NodeId, marker: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|el| el.markers.iter().any(|m| m == marker))
    }

    /// Whether `node` is `ancestor` or lies in its subtree
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// All elements carrying `marker` within `root`'s subtree, in document order
    pub fn query_all(&self, root: NodeId, marker: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        if !self.exists(root) {
            return found;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.has_marker(id, marker) {
                found.push(id);
            }
            // Reverse so the leftmost child is visited first
            stack.extend(self.children(id).iter().rev().copied());
        }
        found
    }

    /// First element carrying `marker` within `root`'s subtree
    pub fn query(&self, root: NodeId, marker: &str) -> Option<NodeId> {
        self.query_all(root, marker).into_iter().next()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn set_layout(&mut self, node: NodeId, layout: LayoutBox) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.layout = layout;
            self.mutations += 1;
        }
    }

    /// Layout box as authored, ignoring reserved pin space
    pub fn base_layout(&self, node: NodeId) -> LayoutBox {
        self.nodes.get(node).map(|el| el.layout).unwrap_or_default()
    }

    /// Top edge in page coordinates, shifted by space reserved for pinned
    /// elements that end at or before this element's top
    pub fn layout_top(&self, node: NodeId) -> f32 {
        let base = self.base_layout(node);
        let shift: f32 = self
            .reserved
            .iter()
            .filter(|(pinned, _)| **pinned != node && !self.contains(**pinned, node))
            .filter(|(pinned, _)| {
                let pinned_box = self.base_layout(**pinned);
                base.top >= pinned_box.top + pinned_box.height
            })
            .map(|(_, px)| *px)
            .sum();
        base.top + shift
    }

    /// Height including any space reserved after the element
    pub fn layout_height(&self, node: NodeId) -> f32 {
        self.base_layout(node).height + self.reserved.get(&node).copied().unwrap_or(0.0)
    }

    /// Total scrollable height of the page
    pub fn page_height(&self) -> f32 {
        self.nodes
            .keys()
            .map(|id| self.layout_top(id) + self.layout_height(id))
            .fold(0.0, f32::max)
    }

    /// Reserve `px` of layout space after a pinned element
    pub fn reserve_space(&mut self, node: NodeId, px: f32) {
        if self.exists(node) {
            self.reserved.insert(node, px.max(0.0));
            self.mutations += 1;
        }
    }

    pub fn release_space(&mut self, node: NodeId) {
        if self.reserved.remove(&node).is_some() {
            self.mutations += 1;
        }
    }

    pub fn reserved_space(&self, node: NodeId) -> f32 {
        self.reserved.get(&node).copied().unwrap_or(0.0)
    }

    // =========================================================================
    // Styles
    // =========================================================================

    /// Author a default style (the unanimated appearance)
    pub fn author_style(&mut self, node: NodeId, property: Property, value: StyleValue) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.authored.insert(property, value);
            self.mutations += 1;
        }
    }

    pub fn authored_style(&self, node: NodeId, property: Property) -> Option<StyleValue> {
        self.nodes
            .get(node)
            .and_then(|el| el.authored.get(&property).copied())
    }

    /// Inline style written at runtime
    pub fn style(&self, node: NodeId, property: Property) -> Option<StyleValue> {
        self.nodes
            .get(node)
            .and_then(|el| el.inline.get(&property).copied())
    }

    pub fn set_style(&mut self, node: NodeId, property: Property, value: StyleValue) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.inline.insert(property, value);
            self.mutations += 1;
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: Property) {
        if let Some(el) = self.nodes.get_mut(node) {
            if el.inline.remove(&property).is_some() {
                self.mutations += 1;
            }
        }
    }

    /// Effective value: inline, else authored, else the property's initial value
    pub fn computed(&self, node: NodeId, property: Property) -> StyleValue {
        self.style(node, property)
            .or_else(|| self.authored_style(node, property))
            .unwrap_or_else(|| property.initial_value())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.attributes.insert(name.to_string(), value.to_string());
            self.mutations += 1;
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            if el.attributes.remove(name).is_some() {
                self.mutations += 1;
            }
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|el| el.attributes.get(name).map(String::as_str))
    }

    /// Set an attribute on the document element (`<html>`)
    pub fn set_root_attribute(&mut self, name: &str, value: &str) {
        self.set_attribute(self.root, name, value);
    }

    pub fn remove_root_attribute(&mut self, name: &str) {
        self.remove_attribute(self.root, name);
    }

    pub fn root_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(self.root, name)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Capture the visible state of every element in document order
    pub fn snapshot(&self) -> DocumentSnapshot {
        let mut elements = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(el) = self.nodes.get(id) {
                let mut keys: Vec<Property> =
                    el.authored.keys().chain(el.inline.keys()).copied().collect();
                keys.sort();
                keys.dedup();
                let styles = keys
                    .into_iter()
                    .map(|p| (p.name().to_string(), self.computed(id, p).to_string()))
                    .collect();
                elements.push(ElementSnapshot {
                    tag: el.tag.clone(),
                    markers: el.markers.to_vec(),
                    text: el.text.clone(),
                    top: self.layout_top(id),
                    height: self.layout_height(id),
                    styles,
                    attributes: el.attributes.clone(),
                });
                stack.extend(el.children.iter().rev().copied());
            }
        }
        DocumentSnapshot {
            viewport: self.viewport,
            page_height: self.page_height(),
            elements,
        }
    }
}

/// Serializable view of a document
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentSnapshot {
    pub viewport: Viewport,
    pub page_height: f32,
    pub elements: Vec<ElementSnapshot>,
}

/// Serializable view of one element
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElementSnapshot {
    pub tag: String,
    pub markers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub top: f32,
    pub height: f32,
    pub styles: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Length;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new(Viewport::new(1000.0, 800.0));
        let root = doc.root();
        let section = doc.create_element(root, "section", &["data-section"]);
        doc.set_layout(section, LayoutBox { top: 0.0, height: 800.0 });
        let next = doc.create_element(root, "section", &["data-next"]);
        doc.set_layout(next, LayoutBox { top: 800.0, height: 800.0 });
        (doc, root, section, next)
    }

    #[test]
    fn test_query_in_document_order() {
        let (mut doc, root, section, next) = sample();
        let a = doc.create_element(section, "span", &["data-letter"]);
        let b = doc.create_element(section, "span", &["data-letter"]);
        let c = doc.create_element(next, "span", &["data-letter"]);

        assert_eq!(doc.query_all(root, "data-letter"), vec![a, b, c]);
        // Scoped to a subtree
        assert_eq!(doc.query_all(section, "data-letter"), vec![a, b]);
        assert_eq!(doc.query(next, "data-section"), None);
        assert!(doc.contains(section, a));
        assert!(!doc.contains(section, c));
    }

    #[test]
    fn test_computed_style_fallbacks() {
        let (mut doc, _, section, _) = sample();
        assert_eq!(
            doc.computed(section, Property::Opacity),
            StyleValue::Number(1.0)
        );

        doc.author_style(section, Property::Opacity, StyleValue::Number(0.5));
        assert_eq!(
            doc.computed(section, Property::Opacity),
            StyleValue::Number(0.5)
        );

        doc.set_style(section, Property::Opacity, StyleValue::Number(0.0));
        assert_eq!(
            doc.computed(section, Property::Opacity),
            StyleValue::Number(0.0)
        );

        doc.remove_style(section, Property::Opacity);
        assert_eq!(
            doc.computed(section, Property::Opacity),
            StyleValue::Number(0.5)
        );
        assert_eq!(
            doc.computed(section, Property::Y),
            StyleValue::Length(Length::px(0.0))
        );
    }

    #[test]
    fn test_reserved_space_shifts_following_elements() {
        let (mut doc, _, section, next) = sample();
        assert_eq!(doc.layout_top(next), 800.0);
        assert_eq!(doc.page_height(), 1600.0);

        doc.reserve_space(section, 3200.0);
        assert_eq!(doc.layout_top(next), 4000.0);
        assert_eq!(doc.layout_top(section), 0.0);
        assert_eq!(doc.page_height(), 4800.0);

        doc.release_space(section);
        assert_eq!(doc.layout_top(next), 800.0);
    }

    #[test]
    fn test_root_attributes_and_mutation_count() {
        let (mut doc, _, _, _) = sample();
        let before = doc.mutation_count();

        doc.set_root_attribute("data-theme", "dark");
        assert_eq!(doc.root_attribute("data-theme"), Some("dark"));

        doc.remove_root_attribute("data-theme");
        assert_eq!(doc.root_attribute("data-theme"), None);
        assert_eq!(doc.mutation_count(), before + 2);

        // Removing a missing attribute is not a mutation
        doc.remove_root_attribute("data-theme");
        assert_eq!(doc.mutation_count(), before + 2);
    }

    #[test]
    fn test_snapshot_lists_styles() {
        let (mut doc, _, section, _) = sample();
        doc.set_text(section, "Hello");
        doc.set_style(section, Property::Opacity, StyleValue::Number(0.25));

        let snapshot = doc.snapshot();
        let el = snapshot
            .elements
            .iter()
            .find(|e| e.markers.contains(&"data-section".to_string()))
            .unwrap();
        assert_eq!(el.styles.get("opacity").map(String::as_str), Some("0.25"));
        assert_eq!(el.text.as_deref(), Some("Hello"));
    }
}

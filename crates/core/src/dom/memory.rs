use std::collections::BTreeMap;

use waypost_protocol::{DomCommand, NodeId, PageMetrics, Rect};

use super::selector::{SelectorList, Subject};
use super::{Document, Renderer};

/// An in-memory page with absolute layout boxes.
///
/// Elements are positioned directly in document coordinates (there is no
/// layout engine); the window scroll position, viewport and location are
/// plain fields. Every applied [`DomCommand`] is also kept in a journal so
/// callers can check exactly what a behavior wrote.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    elements: Vec<Element>,
    location: String,
    scroll_y: f64,
    viewport_width: f64,
    viewport_height: f64,
    document_height: Option<f64>,
    focused: Option<NodeId>,
    journal: Vec<DomCommand>,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    layout: Rect,
}

#[derive(Clone, Copy)]
struct Handle<'a> {
    doc: &'a MemoryDocument,
    id: NodeId,
}

impl Subject for Handle<'_> {
    fn tag(&self) -> &str {
        &self.doc.element(self.id).tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.doc.element(self.id).attrs.get(name).map(String::as_str)
    }

    fn parent(&self) -> Option<Self> {
        self.doc.element(self.id).parent.map(|id| Handle {
            doc: self.doc,
            id,
        })
    }
}

const HTML: NodeId = NodeId(0);
const BODY: NodeId = NodeId(1);

impl MemoryDocument {
    /// A page at `location` containing only `<html>` and `<body>`.
    pub fn new(location: impl Into<String>, viewport_width: f64, viewport_height: f64) -> Self {
        let mut doc = Self {
            elements: Vec::new(),
            location: location.into(),
            scroll_y: 0.0,
            viewport_width,
            viewport_height,
            document_height: None,
            focused: None,
            journal: Vec::new(),
        };
        doc.push("html", None);
        doc.push("body", Some(HTML));
        doc
    }

    /// Append a child element and return its handle.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(tag, Some(parent))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> &mut Self {
        self.element_mut(node)
            .attrs
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Place the element's box at `top` (document coordinates) spanning the
    /// viewport width.
    pub fn set_layout(&mut self, node: NodeId, top: f64, height: f64) -> &mut Self {
        let width = self.viewport_width;
        self.element_mut(node).layout = Rect::new(0.0, top, width, height);
        self
    }

    pub fn set_box(&mut self, node: NodeId, rect: Rect) -> &mut Self {
        self.element_mut(node).layout = rect;
        self
    }

    /// Fix the document height. Without it the height is derived from the
    /// lowest element box.
    pub fn set_document_height(&mut self, height: f64) {
        self.document_height = Some(height);
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Move the window, clamped to the scrollable range (as a browser would).
    pub fn scroll_window(&mut self, y: f64) {
        let max = self.metrics().max_scroll();
        self.scroll_y = y.clamp(0.0, max);
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.element(node)
            .attrs
            .get("class")
            .map(|list| list.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Commands applied so far, oldest first.
    pub fn journal(&self) -> &[DomCommand] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    fn push(&mut self, tag: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.elements.len() as u32);
        self.elements.push(Element {
            tag: tag.to_ascii_lowercase(),
            parent,
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            layout: Rect::default(),
        });
        id
    }

    fn element(&self, node: NodeId) -> &Element {
        &self.elements[node.0 as usize]
    }

    fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.elements[node.0 as usize]
    }

    fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.elements.len()).map(|i| NodeId(i as u32))
    }

    fn handle(&self, id: NodeId) -> Handle<'_> {
        Handle { doc: self, id }
    }

    fn edit_classes(&mut self, node: NodeId, edit: impl FnOnce(&mut Vec<String>)) {
        let mut classes = self.classes(node);
        edit(&mut classes);
        self.element_mut(node)
            .attrs
            .insert("class".to_string(), classes.join(" "));
    }
}

impl Document for MemoryDocument {
    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(list) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        self.ids().filter(|&id| list.matches(self.handle(id))).collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids()
            .find(|&node| self.element(node).attrs.get("id").map(String::as_str) == Some(id))
    }

    fn body(&self) -> Option<NodeId> {
        Some(BODY)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector)?;
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if list.matches(self.handle(id)) {
                return Some(id);
            }
            cursor = self.element(id).parent;
        }
        None
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).parent
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node).tag.clone()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).attrs.get(name).cloned()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.handle(node).has_class(class)
    }

    fn inline_style(&self, node: NodeId, property: &str) -> String {
        self.element(node)
            .style
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.element(node).layout.top()
    }

    fn height(&self, node: NodeId) -> f64 {
        self.element(node).layout.h
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let layout = self.element(node).layout;
        Rect::new(layout.x, layout.y - self.scroll_y, layout.w, layout.h)
    }

    fn metrics(&self) -> PageMetrics {
        let document_height = self.document_height.unwrap_or_else(|| {
            self.elements
                .iter()
                .map(|e| e.layout.bottom())
                .fold(self.viewport_height, f64::max)
        });
        PageMetrics {
            scroll_y: self.scroll_y,
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            document_height,
        }
    }
}

impl Renderer for MemoryDocument {
    fn apply(&mut self, command: DomCommand) {
        match &command {
            DomCommand::AddClass { node, class } => self.edit_classes(*node, |classes| {
                if !classes.contains(class) {
                    classes.push(class.clone());
                }
            }),
            DomCommand::RemoveClass { node, class } => {
                self.edit_classes(*node, |classes| classes.retain(|c| c != class));
            }
            DomCommand::SetAttribute { node, name, value } => {
                self.set_attribute(*node, name, value);
            }
            DomCommand::SetStyle {
                node,
                property,
                value,
            } => {
                let style = &mut self.element_mut(*node).style;
                if value.is_empty() {
                    style.remove(property);
                } else {
                    style.insert(property.clone(), value.clone());
                }
            }
            DomCommand::ScrollTo { y } => self.scroll_window(*y),
            DomCommand::Focus { node } => {
                if self.is_focusable(*node) {
                    self.focused = Some(*node);
                }
            }
            DomCommand::SetLocationHash { hash } => {
                let base = self
                    .location
                    .split_once('#')
                    .map_or(self.location.as_str(), |(base, _)| base)
                    .to_string();
                self.location = format!("{base}#{hash}");
            }
        }
        self.journal.push(command);
    }
}

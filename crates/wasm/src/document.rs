use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Map;
use wasm_bindgen::{JsCast, JsError, JsValue};
use waypost_core::dom::{Document, Renderer};
use waypost_protocol::{ClickEvent, DomCommand, NodeId, PageMetrics, Rect};
use web_sys::{Element, HtmlElement, MouseEvent, Window};

/// Maps live elements to the ids the core works with. Ids are never
/// reused, so a node keeps its id for the life of the page.
#[derive(Clone, Default)]
pub(crate) struct NodeTable(Rc<RefCell<Nodes>>);

struct Nodes {
    elements: Vec<Element>,
    /// Element to index into `elements`, keyed by object identity.
    ids: Map,
}

impl Default for Nodes {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            ids: Map::new(),
        }
    }
}

impl NodeTable {
    /// `None` only once the id space is exhausted.
    pub(crate) fn intern(&self, element: &Element) -> Option<NodeId> {
        let mut nodes = self.0.borrow_mut();
        if let Some(index) = nodes.ids.get(element).as_f64() {
            // Only `intern` writes the map, always from a `u32`.
            return Some(NodeId(index as u32));
        }
        let id = u32::try_from(nodes.elements.len()).ok()?;
        nodes.ids.set(element, &JsValue::from(id));
        nodes.elements.push(element.clone());
        Some(NodeId(id))
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<Element> {
        let index = usize::try_from(id.0).ok()?;
        self.0.borrow().elements.get(index).cloned()
    }

    /// The element as a JS value, `null` for an unknown id.
    pub(crate) fn to_js(&self, id: Option<NodeId>) -> JsValue {
        id.and_then(|id| self.get(id))
            .map_or(JsValue::NULL, JsValue::from)
    }
}

/// The live page, read and written through `web-sys`.
#[derive(Clone)]
pub(crate) struct WebDocument {
    window: Window,
    document: web_sys::Document,
    nodes: NodeTable,
}

impl WebDocument {
    pub(crate) fn new() -> Result<Self, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("no document"))?;
        Ok(Self {
            window,
            document,
            nodes: NodeTable::default(),
        })
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    pub(crate) fn document(&self) -> &web_sys::Document {
        &self.document
    }

    pub(crate) fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    /// A click as the core sees it. `None` when the target is not an
    /// element or sits outside anything matching `selector`, so clicks
    /// elsewhere on the page never enter the node table.
    pub(crate) fn click(&self, event: &MouseEvent, selector: &str) -> Option<ClickEvent> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        if !matches!(target.closest(selector), Ok(Some(_))) {
            return None;
        }
        Some(ClickEvent {
            target: self.nodes.intern(&target)?,
            button: event.button(),
            meta_key: event.meta_key(),
            ctrl_key: event.ctrl_key(),
        })
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.nodes.get(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn viewport_dimension(value: Result<JsValue, JsValue>) -> f64 {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    }
}

fn report(context: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        web_sys::console::error_2(&format!("waypost: {context} failed:").into(), &err);
    }
}

impl Document for WebDocument {
    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(err) => {
                web_sys::console::error_2(
                    &format!("waypost: invalid selector {selector:?}").into(),
                    &err,
                );
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i)?.dyn_into::<Element>().ok())
            .filter_map(|element| self.nodes.intern(&element))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        self.nodes.intern(&element)
    }

    fn body(&self) -> Option<NodeId> {
        let body = self.document.body()?;
        self.nodes.intern(body.as_ref())
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let element = self.nodes.get(node)?;
        match element.closest(selector) {
            Ok(found) => found.and_then(|found| self.nodes.intern(&found)),
            Err(err) => {
                web_sys::console::error_2(
                    &format!("waypost: invalid selector {selector:?}").into(),
                    &err,
                );
                None
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(node)?.parent_element()?;
        self.nodes.intern(&parent)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.nodes
            .get(node)
            .map(|e| e.tag_name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(node)?.get_attribute(name)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn inline_style(&self, node: NodeId, property: &str) -> String {
        self.html(node)
            .and_then(|e| e.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        let mut top = 0.0;
        let mut cursor = self.html(node);
        while let Some(element) = cursor {
            top += f64::from(element.offset_top());
            cursor = element
                .offset_parent()
                .and_then(|parent| parent.dyn_into::<HtmlElement>().ok());
        }
        top
    }

    fn height(&self, node: NodeId) -> f64 {
        let Some(element) = self.html(node) else {
            return 0.0;
        };
        let height = element
            .scroll_height()
            .max(element.offset_height())
            .max(element.client_height());
        f64::from(height)
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.nodes.get(node).map_or_else(Rect::default, |element| {
            let rect = element.get_bounding_client_rect();
            Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
        })
    }

    fn metrics(&self) -> PageMetrics {
        let mut document_height = 0;
        if let Some(root) = self.document.document_element() {
            document_height = root.scroll_height().max(root.client_height());
            if let Some(root) = root.dyn_ref::<HtmlElement>() {
                document_height = document_height.max(root.offset_height());
            }
        }
        if let Some(body) = self.document.body() {
            document_height = document_height
                .max(body.scroll_height())
                .max(body.offset_height())
                .max(body.client_height());
        }
        PageMetrics {
            scroll_y: self.window.page_y_offset().unwrap_or(0.0),
            viewport_width: Self::viewport_dimension(self.window.inner_width()),
            viewport_height: Self::viewport_dimension(self.window.inner_height()),
            document_height: f64::from(document_height),
        }
    }
}

impl Renderer for WebDocument {
    fn apply(&mut self, command: DomCommand) {
        match command {
            DomCommand::ScrollTo { y } => self.window.scroll_to_with_x_and_y(0.0, y),
            DomCommand::SetLocationHash { hash } => {
                report("setting location hash", self.window.location().set_hash(&hash));
            }
            DomCommand::AddClass { node, class } => {
                if let Some(element) = self.nodes.get(node) {
                    report("adding class", element.class_list().add_1(&class));
                }
            }
            DomCommand::RemoveClass { node, class } => {
                if let Some(element) = self.nodes.get(node) {
                    report("removing class", element.class_list().remove_1(&class));
                }
            }
            DomCommand::SetAttribute { node, name, value } => {
                if let Some(element) = self.nodes.get(node) {
                    report("setting attribute", element.set_attribute(&name, &value));
                }
            }
            DomCommand::SetStyle {
                node,
                property,
                value,
            } => {
                if let Some(element) = self.html(node) {
                    let style = element.style();
                    let result = if value.is_empty() {
                        style.remove_property(&property).map(drop)
                    } else {
                        style.set_property(&property, &value)
                    };
                    report("setting style", result);
                }
            }
            DomCommand::Focus { node } => {
                if let Some(element) = self.html(node) {
                    report("focusing", element.focus());
                }
            }
        }
    }
}

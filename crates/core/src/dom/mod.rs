//! The page seam.
//!
//! Behaviors read the page through [`Document`] and write to it through
//! [`Renderer`]. The browser host implements both over `web-sys`; tests
//! and headless callers use [`memory::MemoryDocument`].

pub mod link;
pub mod memory;
mod selector;

use waypost_protocol::{DomCommand, NodeId, PageMetrics, Rect};

/// Read access to a rendered page.
pub trait Document {
    /// All elements matching a CSS selector, in document order. An invalid
    /// selector matches nothing.
    fn query_selector_all(&self, selector: &str) -> Vec<NodeId>;

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    fn body(&self) -> Option<NodeId>;

    /// The element itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Lowercase tag name.
    fn tag_name(&self, node: NodeId) -> String;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Inline style property value, empty when unset.
    fn inline_style(&self, node: NodeId, property: &str) -> String;

    /// Absolute URL of the page.
    fn location(&self) -> String;

    /// Distance of the element's border box from the top of the document.
    fn offset_top(&self, node: NodeId) -> f64;

    /// Rendered height of the element (largest of scroll, offset and client
    /// height).
    fn height(&self, node: NodeId) -> f64;

    /// Border box relative to the viewport.
    fn bounding_rect(&self, node: NodeId) -> Rect;

    fn metrics(&self) -> PageMetrics;

    /// Whether `focus()` would take effect without a `tabindex`.
    fn is_focusable(&self, node: NodeId) -> bool {
        if self.attribute(node, "tabindex").is_some() {
            return true;
        }
        match self.tag_name(node).as_str() {
            "a" | "area" => self.attribute(node, "href").is_some(),
            "button" | "input" | "select" | "textarea" | "iframe" => {
                self.attribute(node, "disabled").is_none()
            }
            _ => false,
        }
    }
}

/// Write access to a rendered page.
pub trait Renderer {
    fn apply(&mut self, command: DomCommand);
}

/// A page that can be both read and written.
pub trait Page: Document + Renderer {}

impl<T: Document + Renderer + ?Sized> Page for T {}

/// Whether the element's box lies entirely inside the viewport.
pub fn is_in_viewport<D: Document + ?Sized>(doc: &D, node: NodeId) -> bool {
    let rect = doc.bounding_rect(node);
    let metrics = doc.metrics();
    rect.top() >= 0.0
        && rect.left() >= 0.0
        && rect.bottom() <= metrics.viewport_height
        && rect.right() <= metrics.viewport_width
}

use serde::{Deserialize, Serialize};

/// Opaque handle to an element owned by a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }
}

/// Scroll and size snapshot of the window and document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageMetrics {
    /// Vertical scroll offset of the window (`pageYOffset`).
    pub scroll_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Largest of the body/root scroll, offset and client heights.
    pub document_height: f64,
}

impl PageMetrics {
    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Document coordinate of the bottom edge of the viewport.
    pub fn viewport_bottom(&self) -> f64 {
        self.scroll_y + self.viewport_height
    }
}

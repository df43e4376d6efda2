use waypost_protocol::{NodeId, PageMetrics};

use crate::easing::EasingTable;

/// What an animated scroll is heading for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollTarget {
    /// Scroll to the element, then focus it.
    Element(NodeId),
    /// Scroll to a raw document position; focus is left alone.
    Position(f64),
}

/// One in-flight scroll: a position curve over a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimation {
    target: ScrollTarget,
    toggle: Option<NodeId>,
    start: f64,
    end: f64,
    /// Document height when the animation started; used to stop at the
    /// bottom when `end` is out of reach.
    document_height: f64,
    duration_ms: f64,
    easing: String,
    elapsed_ms: f64,
}

impl ScrollAnimation {
    pub fn new(
        target: ScrollTarget,
        toggle: Option<NodeId>,
        start: f64,
        end: f64,
        document_height: f64,
        duration_ms: f64,
        easing: impl Into<String>,
    ) -> Self {
        Self {
            target,
            toggle,
            start,
            end,
            document_height,
            duration_ms,
            easing: easing.into(),
            elapsed_ms: 0.0,
        }
    }

    pub fn target(&self) -> ScrollTarget {
        self.target
    }

    pub fn toggle(&self) -> Option<NodeId> {
        self.toggle
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Normalized time in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).min(1.0)
    }

    /// Position for the current elapsed time. Exactly `end` once the
    /// duration has passed, whatever the easing returns at 1.
    pub fn position(&self, easings: &EasingTable) -> f64 {
        let t = self.progress();
        if t >= 1.0 {
            return self.end;
        }
        self.start + (self.end - self.start) * easings.evaluate(&self.easing, t)
    }

    /// Step the clock and return the new position.
    pub fn advance(&mut self, step_ms: u32, easings: &EasingTable) -> f64 {
        self.elapsed_ms += f64::from(step_ms);
        self.position(easings)
    }

    /// Whether the scroll is done, given the computed `position` and the
    /// page after the window moved there.
    pub fn is_finished(&self, position: f64, page: &PageMetrics) -> bool {
        position == self.end
            || page.scroll_y == self.end
            || page.viewport_bottom() >= self.document_height
    }
}

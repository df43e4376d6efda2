use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// The parts of a DOM `click` event the behaviors look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub target: NodeId,
    /// `MouseEvent.button`: 0 is the main (left) button.
    pub button: i16,
    pub meta_key: bool,
    pub ctrl_key: bool,
}

impl ClickEvent {
    /// A left click with no modifier, i.e. one that would navigate in place.
    pub fn left(target: NodeId) -> Self {
        Self {
            target,
            button: 0,
            meta_key: false,
            ctrl_key: false,
        }
    }

    /// Whether the click should be treated as in-page navigation rather than
    /// "open in new tab" or a context-menu click.
    pub fn is_plain_left_click(&self) -> bool {
        self.button == 0 && !self.meta_key && !self.ctrl_key
    }
}

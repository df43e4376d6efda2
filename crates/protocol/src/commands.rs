use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// A single, stateless DOM write.
///
/// The core emits these while reacting to page events. Hosts apply them
/// in order. Each command carries all the data it needs, so the same
/// stream drives the browser and the in-memory test page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomCommand {
    /// Add a class to an element's class list.
    AddClass { node: NodeId, class: String },

    /// Remove a class from an element's class list.
    RemoveClass { node: NodeId, class: String },

    /// Set an attribute. An empty value is kept as an empty attribute
    /// (used to blank an element's `id`).
    SetAttribute {
        node: NodeId,
        name: String,
        value: String,
    },

    /// Set an inline style property. An empty value clears the property.
    SetStyle {
        node: NodeId,
        property: String,
        value: String,
    },

    /// Scroll the window vertically to an absolute position.
    ScrollTo { y: f64 },

    /// Move keyboard focus to an element.
    Focus { node: NodeId },

    /// Replace the fragment of the page URL (without the leading `#`).
    SetLocationHash { hash: String },
}

impl DomCommand {
    pub fn add_class(node: NodeId, class: impl Into<String>) -> Self {
        Self::AddClass {
            node,
            class: class.into(),
        }
    }

    pub fn remove_class(node: NodeId, class: impl Into<String>) -> Self {
        Self::RemoveClass {
            node,
            class: class.into(),
        }
    }

    pub fn set_attribute(node: NodeId, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetAttribute {
            node,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn set_style(node: NodeId, property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetStyle {
            node,
            property: property.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_variant_tag() {
        let cmd = DomCommand::add_class(NodeId(3), "active");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"AddClass":{"node":3,"class":"active"}}"#);
    }
}

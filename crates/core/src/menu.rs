//! Collapsible navigation menu for narrow viewports.

use serde::Deserialize;
use tracing::debug;
use waypost_protocol::{DomCommand, NodeId};

use crate::dom::{Document, Page};
use crate::settings::{self, SettingsError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuSettings {
    /// Id of the button that opens and closes the menu.
    pub toggle_id: String,
    /// Id of the collapsible menu.
    pub menu_id: String,
    /// Links that close the menu when clicked.
    pub link_selector: String,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            toggle_id: "navbar-toggle".to_string(),
            menu_id: "nav-menu".to_string(),
            link_selector: ".navbar-collapse ul li a".to_string(),
        }
    }
}

impl MenuSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        settings::from_json(json)
    }
}

/// Open state lives in the menu's inline `display` style, so a menu
/// opened by other scripts is seen as open too.
#[derive(Debug, Clone)]
pub struct ResponsiveMenu {
    toggle: NodeId,
    menu: NodeId,
    links: Vec<NodeId>,
}

impl ResponsiveMenu {
    /// `None` when the toggle button or the menu is not on the page.
    pub fn new<D: Document + ?Sized>(doc: &D, settings: &MenuSettings) -> Option<Self> {
        let toggle = doc.element_by_id(&settings.toggle_id)?;
        let menu = doc.element_by_id(&settings.menu_id)?;
        Some(Self {
            toggle,
            menu,
            links: doc.query_selector_all(&settings.link_selector),
        })
    }

    pub fn toggle_button(&self) -> NodeId {
        self.toggle
    }

    pub fn menu(&self) -> NodeId {
        self.menu
    }

    /// Links whose clicks close the menu.
    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    pub fn is_open<D: Document + ?Sized>(&self, doc: &D) -> bool {
        doc.inline_style(self.menu, "display") == "block"
    }

    pub fn toggle<P: Page + ?Sized>(&self, page: &mut P) {
        let open = !self.is_open(&*page);
        debug!(open, "menu toggled");
        let value = if open { "block" } else { "" };
        page.apply(DomCommand::set_style(self.menu, "display", value));
    }

    pub fn close<P: Page + ?Sized>(&self, page: &mut P) {
        page.apply(DomCommand::set_style(self.menu, "display", ""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDocument;

    fn page() -> (MemoryDocument, Vec<NodeId>) {
        let mut doc = MemoryDocument::new("https://example.com/", 400.0, 700.0);
        let body = doc.body().unwrap();
        let header = doc.append(body, "header");
        let button = doc.append(header, "button");
        doc.set_attribute(button, "id", "navbar-toggle");
        let collapse = doc.append(header, "div");
        doc.set_attribute(collapse, "class", "navbar-collapse")
            .set_attribute(collapse, "id", "nav-menu");
        let list = doc.append(collapse, "ul");
        let links = ["#home", "#about"]
            .into_iter()
            .map(|href| {
                let li = doc.append(list, "li");
                let a = doc.append(li, "a");
                doc.set_attribute(a, "href", href);
                a
            })
            .collect();
        (doc, links)
    }

    #[test]
    fn finds_toggle_menu_and_links() {
        let (doc, links) = page();
        let menu = ResponsiveMenu::new(&doc, &MenuSettings::default()).unwrap();
        assert_eq!(menu.links(), links.as_slice());
        assert_eq!(doc.attribute(menu.toggle_button(), "id").as_deref(), Some("navbar-toggle"));
        assert!(!menu.is_open(&doc));
    }

    #[test]
    fn toggle_flips_display() {
        let (mut doc, _) = page();
        let menu = ResponsiveMenu::new(&doc, &MenuSettings::default()).unwrap();

        menu.toggle(&mut doc);
        assert_eq!(doc.inline_style(menu.menu(), "display"), "block");
        assert!(menu.is_open(&doc));

        menu.toggle(&mut doc);
        assert_eq!(doc.inline_style(menu.menu(), "display"), "");
        assert!(!menu.is_open(&doc));
    }

    #[test]
    fn close_hides_open_menu() {
        let (mut doc, _) = page();
        let menu = ResponsiveMenu::new(&doc, &MenuSettings::default()).unwrap();
        menu.toggle(&mut doc);
        menu.close(&mut doc);
        assert!(!menu.is_open(&doc));
    }

    #[test]
    fn missing_markup_disables_menu() {
        let (doc, _) = page();
        let settings = MenuSettings::from_json(r#"{"menuId":"sidebar"}"#).unwrap();
        assert!(ResponsiveMenu::new(&doc, &settings).is_none());
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::prelude::*;
use waypost_core::menu::{MenuSettings, ResponsiveMenu};
use waypost_protocol::NodeId;

use crate::document::WebDocument;

struct MenuHost {
    doc: WebDocument,
    menu: ResponsiveMenu,
}

#[derive(Clone, Copy)]
enum MenuAction {
    Toggle,
    Close,
}

/// Collapsible navigation: the toggle button shows and hides the menu, and
/// following any of its links closes it.
#[wasm_bindgen(js_name = ResponsiveMenu)]
pub struct WebMenu {
    host: Option<Rc<RefCell<MenuHost>>>,
    _listeners: Vec<EventListener>,
}

#[wasm_bindgen(js_class = ResponsiveMenu)]
impl WebMenu {
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<WebMenu, JsError> {
        let settings = MenuSettings::from_json(options.as_deref().unwrap_or_default())
            .map_err(|e| JsError::new(&e.to_string()))?;
        let doc = WebDocument::new()?;
        let Some(menu) = ResponsiveMenu::new(&doc, &settings) else {
            return Ok(Self {
                host: None,
                _listeners: Vec::new(),
            });
        };

        let toggle = menu.toggle_button();
        let links = menu.links().to_vec();
        let host = Rc::new(RefCell::new(MenuHost { doc, menu }));

        let mut listeners = Vec::with_capacity(links.len() + 1);
        listeners.extend(listen(&host, toggle, MenuAction::Toggle));
        for link in links {
            listeners.extend(listen(&host, link, MenuAction::Close));
        }
        Ok(Self {
            host: Some(host),
            _listeners: listeners,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.host.is_some()
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.host
            .as_ref()
            .and_then(|host| host.try_borrow().ok())
            .is_some_and(|host| host.menu.is_open(&host.doc))
    }

    pub fn toggle(&self) -> Result<(), JsError> {
        self.run(MenuAction::Toggle)
    }

    pub fn close(&self) -> Result<(), JsError> {
        self.run(MenuAction::Close)
    }

    /// Remove the click listeners by consuming the handle. The menu keeps
    /// whatever display state it has.
    pub fn destroy(self) {
        drop(self);
    }
}

impl WebMenu {
    fn run(&self, action: MenuAction) -> Result<(), JsError> {
        let Some(host) = &self.host else {
            return Ok(());
        };
        let mut guard = host
            .try_borrow_mut()
            .map_err(|_| JsError::new("ResponsiveMenu is busy"))?;
        perform(&mut guard, action);
        Ok(())
    }
}

fn perform(host: &mut MenuHost, action: MenuAction) {
    let MenuHost { doc, menu } = host;
    match action {
        MenuAction::Toggle => menu.toggle(doc),
        MenuAction::Close => menu.close(doc),
    }
}

fn listen(
    host: &Rc<RefCell<MenuHost>>,
    node: NodeId,
    action: MenuAction,
) -> Option<EventListener> {
    let element = host.borrow().doc.nodes().get(node)?;
    let host = Rc::clone(host);
    Some(EventListener::new(&element, "click", move |_| {
        if let Ok(mut guard) = host.try_borrow_mut() {
            perform(&mut guard, action);
        }
    }))
}

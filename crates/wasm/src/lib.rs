//! Browser bindings: runs the waypost behaviors against the live page.

mod document;
mod menu;
mod scroll;
mod spy;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

pub use menu::WebMenu;
pub use scroll::SmoothScroll;
pub use spy::WebScrollSpy;

/// Instances created by [`enable_site`], kept alive for the page's lifetime.
struct Site {
    _scroll: SmoothScroll,
    _spy: WebScrollSpy,
    _menu: WebMenu,
}

thread_local! {
    static SITE: RefCell<Option<Site>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Site bootstrap: smooth scrolling clear of the `#main-nav` header,
/// scroll-spy over `[data-gumshoe]` navigation, and the collapsible menu.
/// Calling it again replaces the previous instances.
#[wasm_bindgen(js_name = enableSite)]
pub fn enable_site() -> Result<(), JsError> {
    SITE.with(|site| site.borrow_mut().take());
    let site = Site {
        _scroll: SmoothScroll::new(Some(r##"{"selectorHeader":"#main-nav"}"##.to_string()))?,
        _spy: WebScrollSpy::new(None, None)?,
        _menu: WebMenu::new(None)?,
    };
    SITE.with(|slot| *slot.borrow_mut() = Some(site));
    Ok(())
}

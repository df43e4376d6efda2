use std::cell::{RefCell, RefMut};
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::{Interval, Timeout};
use js_sys::Function;
use wasm_bindgen::prelude::*;
use waypost_core::easing::EasingFn;
use waypost_core::scroll::{
    Offset, ScrollOverrides, ScrollSettings, ScrollTarget, SmoothScroller, Ticker,
};
use waypost_core::throttle::Schedule;
use waypost_protocol::NodeId;
use web_sys::{Element, Event, MouseEvent};

use crate::document::{NodeTable, WebDocument};

struct ScrollHost {
    doc: WebDocument,
    scroller: SmoothScroller<WebTicker>,
    resize_timer: Option<Timeout>,
}

/// Animation clock backed by `setInterval`.
struct WebTicker {
    host: Weak<RefCell<ScrollHost>>,
    interval: Option<Interval>,
}

impl Ticker for WebTicker {
    fn start(&mut self, period_ms: u32) {
        let host = self.host.clone();
        self.interval = Some(Interval::new(period_ms, move || {
            let Some(host) = host.upgrade() else {
                return;
            };
            let Ok(mut guard) = host.try_borrow_mut() else {
                return;
            };
            let ScrollHost { doc, scroller, .. } = &mut *guard;
            scroller.tick(doc);
        }));
    }

    fn stop(&mut self) {
        // Usually called from inside the interval's own callback; wasm-bindgen
        // defers freeing a running closure until it returns.
        self.interval = None;
    }
}

/// Animated scrolling for `[data-scroll]` links.
#[wasm_bindgen]
pub struct SmoothScroll {
    host: Rc<RefCell<ScrollHost>>,
    nodes: NodeTable,
    _listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl SmoothScroll {
    /// `options` is a JSON object such as `{"selectorHeader": "#main-nav"}`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<SmoothScroll, JsError> {
        let settings = ScrollSettings::from_json(options.as_deref().unwrap_or_default())
            .map_err(|e| JsError::new(&e.to_string()))?;
        let doc = WebDocument::new()?;
        let nodes = doc.nodes().clone();
        let window = doc.window().clone();
        let document = doc.document().clone();

        let host = Rc::new_cyclic(|weak| {
            let ticker = WebTicker {
                host: weak.clone(),
                interval: None,
            };
            RefCell::new(ScrollHost {
                scroller: SmoothScroller::new(&doc, settings, ticker),
                doc,
                resize_timer: None,
            })
        });

        let on_click = {
            let host = Rc::clone(&host);
            EventListener::new_with_options(
                &document,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| {
                    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                        return;
                    };
                    // The borrow must end before anything is thrown into JS.
                    let outcome = {
                        let Ok(mut guard) = host.try_borrow_mut() else {
                            return;
                        };
                        let ScrollHost { doc, scroller, .. } = &mut *guard;
                        let Some(click) = doc.click(mouse, &scroller.settings().selector)
                        else {
                            return;
                        };
                        scroller.handle_click(doc, &click)
                    };
                    match outcome {
                        Ok(outcome) if outcome.prevent_default => event.prevent_default(),
                        Ok(_) => {}
                        Err(err) => wasm_bindgen::throw_str(&err.to_string()),
                    }
                },
            )
        };

        let on_hash_change = {
            let host = Rc::clone(&host);
            EventListener::new(&window, "hashchange", move |_| {
                let result = {
                    let Ok(mut guard) = host.try_borrow_mut() else {
                        return;
                    };
                    let ScrollHost { doc, scroller, .. } = &mut *guard;
                    scroller.handle_hash_change(doc)
                };
                if let Err(err) = result {
                    wasm_bindgen::throw_str(&err.to_string());
                }
            })
        };

        let on_resize = {
            let host = Rc::clone(&host);
            EventListener::new(&window, "resize", move |_| {
                let Ok(mut guard) = host.try_borrow_mut() else {
                    return;
                };
                let Some(Schedule::Start(delay)) = guard.scroller.on_resize() else {
                    return;
                };
                let weak = Rc::downgrade(&host);
                guard.resize_timer = Some(Timeout::new(delay, move || {
                    let Some(host) = weak.upgrade() else {
                        return;
                    };
                    let Ok(mut guard) = host.try_borrow_mut() else {
                        return;
                    };
                    let ScrollHost { doc, scroller, .. } = &mut *guard;
                    scroller.on_resize_timer(doc);
                }));
            })
        };

        Ok(Self {
            host,
            nodes,
            _listeners: vec![on_click, on_hash_change, on_resize],
        })
    }

    /// Animate to an element or a document position. `options` overrides
    /// this instance's settings for this scroll only.
    #[wasm_bindgen(js_name = animateScroll)]
    pub fn animate_scroll(
        &self,
        target: JsValue,
        toggle: Option<Element>,
        options: Option<String>,
    ) -> Result<(), JsError> {
        let overrides = options
            .as_deref()
            .map(ScrollOverrides::from_json)
            .transpose()
            .map_err(|e| JsError::new(&e.to_string()))?;
        let target = if let Some(y) = target.as_f64() {
            ScrollTarget::Position(y)
        } else if let Some(node) = target
            .dyn_ref::<Element>()
            .and_then(|element| self.nodes.intern(element))
        {
            ScrollTarget::Element(node)
        } else {
            return Err(JsError::new("scroll target must be an element or a number"));
        };
        let toggle = toggle.and_then(|t| self.nodes.intern(&t));

        let mut guard = self.borrow()?;
        let ScrollHost { doc, scroller, .. } = &mut *guard;
        scroller
            .scroll_to(doc, target, toggle, overrides.as_ref())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Called as `hook(target, toggle)` before each animation starts.
    #[wasm_bindgen(js_name = setBefore)]
    pub fn set_before(&self, hook: Function) -> Result<(), JsError> {
        let nodes = self.nodes.clone();
        self.borrow()?
            .scroller
            .set_before(move |target, toggle| call_hook(&hook, &nodes, target, toggle));
        Ok(())
    }

    /// Called as `hook(target, toggle)` once an animation completes.
    #[wasm_bindgen(js_name = setAfter)]
    pub fn set_after(&self, hook: Function) -> Result<(), JsError> {
        let nodes = self.nodes.clone();
        self.borrow()?
            .scroller
            .set_after(move |target, toggle| call_hook(&hook, &nodes, target, toggle));
        Ok(())
    }

    /// Compute the offset at the start of every animation instead of using
    /// a fixed number.
    #[wasm_bindgen(js_name = setOffset)]
    pub fn set_offset(&self, offset: Function) -> Result<(), JsError> {
        let computed = Offset::Computed(Rc::new(move || {
            offset
                .call0(&JsValue::NULL)
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0)
        }));
        self.borrow()?.scroller.settings_mut().offset = computed;
        Ok(())
    }

    /// Make `curve(t)` available under `name` for the `easing` option.
    #[wasm_bindgen(js_name = registerEasing)]
    pub fn register_easing(&self, name: String, curve: Function) -> Result<(), JsError> {
        let easing: EasingFn = Rc::new(move |t: f64| {
            curve
                .call1(&JsValue::NULL, &JsValue::from_f64(t))
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(t)
        });
        self.borrow()?.scroller.register_easing(name, easing);
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        match self.host.try_borrow() {
            Ok(host) => host.scroller.is_animating(),
            // Only busy while a tick or hook is running.
            Err(_) => true,
        }
    }

    /// Stop any animation and remove the listeners.
    pub fn destroy(self) {
        if let Ok(mut host) = self.host.try_borrow_mut() {
            host.scroller.cancel();
            host.resize_timer = None;
        }
    }
}

impl SmoothScroll {
    fn borrow(&self) -> Result<RefMut<'_, ScrollHost>, JsError> {
        self.host
            .try_borrow_mut()
            .map_err(|_| JsError::new("SmoothScroll is busy"))
    }
}

fn call_hook(hook: &Function, nodes: &NodeTable, target: ScrollTarget, toggle: Option<NodeId>) {
    let target = match target {
        ScrollTarget::Element(node) => nodes.to_js(Some(node)),
        ScrollTarget::Position(y) => JsValue::from_f64(y),
    };
    if let Err(err) = hook.call2(&JsValue::NULL, &target, &nodes.to_js(toggle)) {
        web_sys::console::error_2(&"waypost: scroll hook threw:".into(), &err);
    }
}

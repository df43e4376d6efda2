use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use waypost_core::spy::{NavEntry, ScrollSpy, SpySettings, SpyTimer};
use waypost_core::throttle::Schedule;
use web_sys::Window;

use crate::document::{NodeTable, WebDocument};

struct SpyHost {
    doc: WebDocument,
    spy: ScrollSpy,
    throttle: Option<Timeout>,
    settle: Option<Timeout>,
}

impl SpyHost {
    /// (Re)arm the timer slot the spy asked for.
    fn arm(&mut self, host: Weak<RefCell<SpyHost>>, timer: SpyTimer, schedule: Schedule) {
        let delay = match schedule {
            Schedule::Start(delay) | Schedule::Restart(delay) => delay,
            Schedule::Keep => return,
        };
        let timeout = Timeout::new(delay, move || {
            let Some(host) = host.upgrade() else {
                return;
            };
            let Ok(mut guard) = host.try_borrow_mut() else {
                return;
            };
            let SpyHost { doc, spy, .. } = &mut *guard;
            spy.on_timer(doc, timer);
        });
        // Replacing a pending debounce timeout cancels it.
        match timer {
            SpyTimer::Throttle => self.throttle = Some(timeout),
            SpyTimer::Settle => self.settle = Some(timeout),
        }
    }
}

/// Highlights the `[data-gumshoe]` navigation link of the section in view.
///
/// A page without any navigation target gets a disabled instance.
#[wasm_bindgen(js_name = ScrollSpy)]
pub struct WebScrollSpy {
    host: Option<Rc<RefCell<SpyHost>>>,
    _listeners: Vec<EventListener>,
}

#[wasm_bindgen(js_class = ScrollSpy)]
impl WebScrollSpy {
    /// `callback` receives `{nav, target, parent, distance}` for the active
    /// link after every evaluation, or `null` when none is.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: Option<String>,
        callback: Option<Function>,
    ) -> Result<WebScrollSpy, JsError> {
        let settings = SpySettings::from_json(options.as_deref().unwrap_or_default())
            .map_err(|e| JsError::new(&e.to_string()))?;
        let mut doc = WebDocument::new()?;
        let Some(mut spy) = ScrollSpy::new(&doc, settings) else {
            return Ok(Self {
                host: None,
                _listeners: Vec::new(),
            });
        };
        if let Some(callback) = callback {
            let nodes = doc.nodes().clone();
            spy.on_activate(move |entry| notify(&callback, &nodes, entry));
        }
        spy.start(&mut doc);

        let window = doc.window().clone();
        let host = Rc::new(RefCell::new(SpyHost {
            doc,
            spy,
            throttle: None,
            settle: None,
        }));
        let listeners = vec![
            listen(&host, &window, "scroll", ScrollSpy::on_scroll),
            listen(&host, &window, "resize", ScrollSpy::on_resize),
        ];
        Ok(Self {
            host: Some(host),
            _listeners: listeners,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.host.is_some()
    }

    /// Re-highlight for the current scroll position; returns the active
    /// link or `null`.
    pub fn refresh(&self) -> Result<JsValue, JsError> {
        let link = self.with_host(|host| {
            let link = host.spy.refresh(&mut host.doc);
            host.doc.nodes().to_js(link)
        })?;
        Ok(link.unwrap_or(JsValue::NULL))
    }

    /// Re-measure the sections after the layout changed.
    #[wasm_bindgen(js_name = computeDistances)]
    pub fn compute_distances(&self) -> Result<(), JsError> {
        self.with_host(|host| host.spy.compute_distances(&host.doc))?;
        Ok(())
    }

    /// Remove the listeners and pending timers.
    pub fn destroy(self) {
        if let Some(host) = &self.host
            && let Ok(mut host) = host.try_borrow_mut()
        {
            host.throttle = None;
            host.settle = None;
            host.spy.reset_timers();
        }
    }
}

impl WebScrollSpy {
    fn with_host<R>(&self, f: impl FnOnce(&mut SpyHost) -> R) -> Result<Option<R>, JsError> {
        let Some(host) = &self.host else {
            return Ok(None);
        };
        let mut guard = host
            .try_borrow_mut()
            .map_err(|_| JsError::new("ScrollSpy is busy"))?;
        Ok(Some(f(&mut guard)))
    }
}

fn listen(
    host: &Rc<RefCell<SpyHost>>,
    window: &Window,
    event: &'static str,
    record: fn(&mut ScrollSpy) -> (SpyTimer, Schedule),
) -> EventListener {
    let host = Rc::clone(host);
    EventListener::new(window, event, move |_| {
        let Ok(mut guard) = host.try_borrow_mut() else {
            return;
        };
        let (timer, schedule) = record(&mut guard.spy);
        guard.arm(Rc::downgrade(&host), timer, schedule);
    })
}

fn notify(callback: &Function, nodes: &NodeTable, entry: Option<&NavEntry>) {
    let arg = entry.map_or(JsValue::NULL, |entry| {
        let nav = Object::new();
        let fields = [
            ("nav", nodes.to_js(Some(entry.link))),
            ("target", nodes.to_js(Some(entry.target))),
            ("parent", nodes.to_js(entry.parent)),
            ("distance", JsValue::from_f64(entry.distance)),
        ];
        for (key, value) in fields {
            let _ = Reflect::set(&nav, &JsValue::from_str(key), &value);
        }
        nav.into()
    });
    if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
        web_sys::console::error_2(&"waypost: scroll spy callback threw:".into(), &err);
    }
}

//! Scroll-spy: highlight the navigation link whose section is in view.

mod settings;

pub use settings::SpySettings;

use tracing::debug;
use waypost_protocol::{DomCommand, NodeId};

use crate::dom::{Document, Page, is_in_viewport, link};
use crate::throttle::{Debounce, PageEvent, Schedule, Throttle};

/// A navigation link paired with the section it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub link: NodeId,
    pub target: NodeId,
    /// The enclosing `<li>`, highlighted together with the link.
    pub parent: Option<NodeId>,
    /// Scroll position at which the section counts as reached. Only valid
    /// after [`ScrollSpy::compute_distances`].
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveNav {
    link: NodeId,
    parent: Option<NodeId>,
}

/// Which of the two timer slots a host should (re)arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyTimer {
    Throttle,
    Settle,
}

pub type ActivateCallback = Box<dyn FnMut(Option<&NavEntry>)>;

pub struct ScrollSpy {
    settings: SpySettings,
    header: Option<NodeId>,
    header_height: f64,
    document_height: f64,
    /// Sorted by descending distance after every recomputation.
    entries: Vec<NavEntry>,
    current: Option<ActiveNav>,
    callback: Option<ActivateCallback>,
    throttle: Throttle,
    settle: Debounce,
}

impl ScrollSpy {
    /// Scan the page for navigation links. Returns `None` when no link
    /// resolves to an element: the page has nothing to track.
    pub fn new<D: Document + ?Sized>(doc: &D, settings: SpySettings) -> Option<Self> {
        let entries = collect_entries(doc, &settings.selector);
        if entries.is_empty() {
            debug!(selector = %settings.selector, "no navigation targets, scroll spy disabled");
            return None;
        }

        // A link rendered as active keeps that state until the first move.
        let current = entries
            .iter()
            .rev()
            .find(|e| doc.has_class(e.link, &settings.active_class))
            .map(|e| ActiveNav {
                link: e.link,
                parent: e.parent,
            });

        Some(Self {
            header: doc.query_selector(&settings.selector_header),
            settings,
            header_height: 0.0,
            document_height: 0.0,
            entries,
            current,
            callback: None,
            throttle: Throttle::default(),
            settle: Debounce::default(),
        })
    }

    /// Called after every evaluation with the active entry, or `None` when
    /// nothing matches.
    pub fn on_activate(&mut self, callback: impl FnMut(Option<&NavEntry>) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    pub fn settings(&self) -> &SpySettings {
        &self.settings
    }

    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    pub fn active(&self) -> Option<&NavEntry> {
        let current = self.current?;
        self.entries.iter().find(|e| e.link == current.link)
    }

    /// Measure, then highlight whatever is under the current scroll position.
    pub fn start<P: Page + ?Sized>(&mut self, page: &mut P) -> Option<NodeId> {
        self.compute_distances(&*page);
        self.refresh(page)
    }

    /// Re-measure every target. Must run after anything that moves the
    /// layout (load, resize, content changes).
    pub fn compute_distances<D: Document + ?Sized>(&mut self, doc: &D) {
        self.document_height = doc.metrics().document_height;
        self.header_height = self
            .header
            .map_or(0.0, |header| doc.height(header) + doc.offset_top(header));

        let shift = self.header_height + self.settings.offset;
        for entry in &mut self.entries {
            entry.distance = (doc.offset_top(entry.target) - shift).max(0.0);
        }
        self.entries.sort_by(|a, b| b.distance.total_cmp(&a.distance));
    }

    /// [`Self::activate`] at the window's current scroll position.
    pub fn refresh<P: Page + ?Sized>(&mut self, page: &mut P) -> Option<NodeId> {
        let position = page.metrics().scroll_y;
        self.activate(page, position)
    }

    /// Highlight the entry for `position` and return its link.
    pub fn activate<P: Page + ?Sized>(&mut self, page: &mut P, position: f64) -> Option<NodeId> {
        let metrics = page.metrics();

        // Trailing whitespace can keep the last section's distance out of
        // reach; at the very bottom it wins if it is on screen.
        if let Some(last_section) = self.entries.first()
            && metrics.viewport_height + position >= self.document_height
            && is_in_viewport(&*page, last_section.target)
        {
            self.set_active(page, 0);
            return Some(self.entries[0].link);
        }

        match self.entries.iter().position(|e| e.distance <= position) {
            Some(index) => {
                self.set_active(page, index);
                Some(self.entries[index].link)
            }
            None => {
                self.deactivate(page);
                None
            }
        }
    }

    /// Remove the highlight, if any, and report that nothing is active.
    pub fn deactivate<P: Page + ?Sized>(&mut self, page: &mut P) {
        if let Some(previous) = self.current.take() {
            self.clear_classes(page, previous);
            debug!(link = ?previous.link, "nav deactivated");
        }
        if let Some(callback) = self.callback.as_mut() {
            callback(None);
        }
    }

    /// Record a scroll event; returns the timer slot to arm and how.
    pub fn on_scroll(&mut self) -> (SpyTimer, Schedule) {
        if self.settings.scroll_delay {
            (SpyTimer::Settle, self.settle.record())
        } else {
            (SpyTimer::Throttle, self.throttle.record(PageEvent::Scroll))
        }
    }

    pub fn on_resize(&mut self) -> (SpyTimer, Schedule) {
        (SpyTimer::Throttle, self.throttle.record(PageEvent::Resize))
    }

    /// A timer armed by `on_scroll` / `on_resize` fired.
    pub fn on_timer<P: Page + ?Sized>(&mut self, page: &mut P, timer: SpyTimer) {
        match timer {
            SpyTimer::Throttle => {
                let fired = self.throttle.fire();
                if fired.resize {
                    self.compute_distances(&*page);
                }
                if !fired.is_empty() {
                    self.refresh(page);
                }
            }
            SpyTimer::Settle => {
                if self.settle.fire() {
                    self.start(page);
                }
            }
        }
    }

    /// Forget pending timer work (the host dropped its timers).
    pub fn reset_timers(&mut self) {
        self.throttle.reset();
        self.settle.reset();
    }

    fn set_active<P: Page + ?Sized>(&mut self, page: &mut P, index: usize) {
        let entry = &self.entries[index];
        let next = ActiveNav {
            link: entry.link,
            parent: entry.parent,
        };
        // The classes are already in place; only the callback runs again.
        if self.current != Some(next) {
            if let Some(previous) = self.current.take() {
                self.clear_classes(page, previous);
            }
            let class = &self.settings.active_class;
            page.apply(DomCommand::add_class(next.link, class));
            if let Some(parent) = next.parent {
                page.apply(DomCommand::add_class(parent, class));
            }
            self.current = Some(next);
            debug!(link = ?next.link, distance = entry.distance, "nav activated");
        }

        if let Some(callback) = self.callback.as_mut() {
            callback(Some(&self.entries[index]));
        }
    }

    fn clear_classes<P: Page + ?Sized>(&self, page: &mut P, nav: ActiveNav) {
        let class = &self.settings.active_class;
        page.apply(DomCommand::remove_class(nav.link, class));
        if let Some(parent) = nav.parent {
            page.apply(DomCommand::remove_class(parent, class));
        }
    }
}

impl std::fmt::Debug for ScrollSpy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollSpy")
            .field("settings", &self.settings)
            .field("entries", &self.entries)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

fn collect_entries<D: Document + ?Sized>(doc: &D, selector: &str) -> Vec<NavEntry> {
    doc.query_selector_all(selector)
        .into_iter()
        .filter_map(|link| {
            let href = doc.attribute(link, "href")?;
            let fragment = link::href_fragment(&href).filter(|f| !f.is_empty())?;
            let target = doc.element_by_id(&fragment)?;
            let parent = doc.parent(link).filter(|&p| doc.tag_name(p) == "li");
            Some(NavEntry {
                link,
                target,
                parent,
                distance: 0.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::dom::memory::MemoryDocument;
    use crate::dom::Renderer;

    struct Fixture {
        doc: MemoryDocument,
        links: Vec<NodeId>,
        items: Vec<NodeId>,
    }

    /// `<nav data-gumshoe><ul><li><a href="#s{i}">` per section, sections
    /// laid out at `tops`, 300px viewport.
    fn fixture(tops: &[f64], document_height: f64) -> Fixture {
        let mut doc = MemoryDocument::new("https://example.com/", 1000.0, 300.0);
        let body = doc.body().unwrap();
        let nav = doc.append(body, "nav");
        doc.set_attribute(nav, "data-gumshoe", "");
        let ul = doc.append(nav, "ul");

        let mut links = Vec::new();
        let mut items = Vec::new();
        for (i, &top) in tops.iter().enumerate() {
            let li = doc.append(ul, "li");
            let a = doc.append(li, "a");
            doc.set_attribute(a, "href", &format!("#s{i}"));
            let section = doc.append(body, "section");
            doc.set_attribute(section, "id", &format!("s{i}"))
                .set_layout(section, top, 200.0);
            links.push(a);
            items.push(li);
        }
        doc.set_document_height(document_height);
        Fixture { doc, links, items }
    }

    fn spy(fx: &Fixture) -> ScrollSpy {
        let mut spy = ScrollSpy::new(&fx.doc, SpySettings::default()).unwrap();
        spy.compute_distances(&fx.doc);
        spy
    }

    fn active_links(fx: &Fixture) -> Vec<NodeId> {
        fx.links
            .iter()
            .copied()
            .filter(|&l| fx.doc.has_class(l, "active"))
            .collect()
    }

    #[test]
    fn entries_sorted_by_descending_distance() {
        let fx = fixture(&[0.0, 400.0, 800.0], 3000.0);
        let spy = spy(&fx);
        let distances: Vec<f64> = spy.entries().iter().map(|e| e.distance).collect();
        assert_eq!(distances, vec![800.0, 400.0, 0.0]);
        assert_eq!(spy.entries()[0].link, fx.links[2]);
        assert_eq!(spy.entries()[0].parent, Some(fx.items[2]));
    }

    #[test]
    fn activates_nearest_preceding_section() {
        let mut fx = fixture(&[0.0, 400.0, 800.0], 3000.0);
        let mut spy = spy(&fx);

        assert_eq!(spy.activate(&mut fx.doc, 450.0), Some(fx.links[1]));
        assert_eq!(spy.activate(&mut fx.doc, 0.0), Some(fx.links[0]));
        assert_eq!(spy.activate(&mut fx.doc, 900.0), Some(fx.links[2]));
        assert_eq!(active_links(&fx), vec![fx.links[2]]);
    }

    #[test]
    fn positions_between_distances_pick_the_lower_bound() {
        let mut fx = fixture(&[100.0, 400.0, 800.0], 3000.0);
        let mut spy = spy(&fx);
        for position in [401.0, 550.0, 799.0] {
            assert_eq!(spy.activate(&mut fx.doc, position), Some(fx.links[1]));
        }
        assert_eq!(spy.activate(&mut fx.doc, 400.0), Some(fx.links[1]));
    }

    #[test]
    fn nothing_matches_above_first_section() {
        let mut fx = fixture(&[100.0, 400.0], 3000.0);
        let mut spy = spy(&fx);
        spy.activate(&mut fx.doc, 150.0);
        assert_eq!(active_links(&fx), vec![fx.links[0]]);

        assert_eq!(spy.activate(&mut fx.doc, 50.0), None);
        assert!(active_links(&fx).is_empty());
        assert!(!fx.doc.has_class(fx.items[0], "active"));
        assert!(spy.active().is_none());
    }

    #[test]
    fn switching_moves_class_from_link_and_parent() {
        let mut fx = fixture(&[0.0, 400.0], 3000.0);
        let mut spy = spy(&fx);
        spy.activate(&mut fx.doc, 0.0);
        assert!(fx.doc.has_class(fx.items[0], "active"));

        spy.activate(&mut fx.doc, 500.0);
        assert!(!fx.doc.has_class(fx.links[0], "active"));
        assert!(!fx.doc.has_class(fx.items[0], "active"));
        assert!(fx.doc.has_class(fx.links[1], "active"));
        assert!(fx.doc.has_class(fx.items[1], "active"));
    }

    #[test]
    fn reactivating_writes_nothing() {
        let mut fx = fixture(&[0.0, 400.0], 3000.0);
        let mut spy = spy(&fx);
        spy.activate(&mut fx.doc, 500.0);
        fx.doc.clear_journal();

        spy.activate(&mut fx.doc, 520.0);
        spy.activate(&mut fx.doc, 700.0);
        assert!(fx.doc.journal().is_empty());
    }

    #[test]
    fn bottom_of_document_activates_last_section() {
        // Last section at 800 can never reach the top: max scroll is 700.
        let mut fx = fixture(&[0.0, 400.0, 800.0], 1000.0);
        let mut spy = spy(&fx);
        fx.doc.scroll_window(700.0);
        assert_eq!(spy.refresh(&mut fx.doc), Some(fx.links[2]));
    }

    #[test]
    fn bottom_rule_requires_visible_target() {
        // The last section is taller than the viewport, so it is never
        // fully in view; normal ordering applies.
        let mut fx = fixture(&[0.0, 400.0, 800.0], 1000.0);
        let last = fx.doc.element_by_id("s2").unwrap();
        fx.doc.set_layout(last, 800.0, 600.0);
        fx.doc.set_document_height(1000.0);
        let mut spy = spy(&fx);
        fx.doc.scroll_window(700.0);
        assert_eq!(spy.refresh(&mut fx.doc), Some(fx.links[1]));
    }

    #[test]
    fn header_and_offset_shift_distances() {
        let mut fx = fixture(&[0.0, 400.0, 800.0], 3000.0);
        let body = fx.doc.body().unwrap();
        let header = fx.doc.append(body, "header");
        fx.doc
            .set_attribute(header, "data-gumshoe-header", "")
            .set_layout(header, 0.0, 50.0);

        let settings = SpySettings {
            offset: 10.0,
            ..SpySettings::default()
        };
        let mut spy = ScrollSpy::new(&fx.doc, settings).unwrap();
        spy.compute_distances(&fx.doc);
        assert_eq!(spy.header_height(), 50.0);
        let distances: Vec<f64> = spy.entries().iter().map(|e| e.distance).collect();
        assert_eq!(distances, vec![740.0, 340.0, 0.0]);
    }

    #[test]
    fn disabled_without_targets() {
        let mut doc = MemoryDocument::new("https://example.com/", 1000.0, 300.0);
        let body = doc.body().unwrap();
        let nav = doc.append(body, "nav");
        doc.set_attribute(nav, "data-gumshoe", "");
        let a = doc.append(nav, "a");
        doc.set_attribute(a, "href", "#missing");
        let b = doc.append(nav, "a");
        doc.set_attribute(b, "href", "/elsewhere");

        assert!(ScrollSpy::new(&doc, SpySettings::default()).is_none());
    }

    #[test]
    fn callback_fires_on_every_evaluation() {
        let mut fx = fixture(&[100.0, 400.0], 3000.0);
        let mut spy = spy(&fx);
        let seen: Rc<RefCell<Vec<Option<NodeId>>>> = Rc::default();
        let sink = Rc::clone(&seen);
        spy.on_activate(move |entry| sink.borrow_mut().push(entry.map(|e| e.link)));

        spy.activate(&mut fx.doc, 500.0);
        fx.doc.clear_journal();
        spy.activate(&mut fx.doc, 520.0);
        assert!(fx.doc.journal().is_empty());
        spy.activate(&mut fx.doc, 0.0);
        spy.activate(&mut fx.doc, 0.0);

        assert_eq!(
            *seen.borrow(),
            vec![Some(fx.links[1]), Some(fx.links[1]), None, None]
        );
    }

    #[test]
    fn prerendered_active_link_is_adopted() {
        let mut fx = fixture(&[0.0, 400.0], 3000.0);
        fx.doc.apply(DomCommand::add_class(fx.links[1], "active"));
        let mut spy = spy(&fx);
        assert_eq!(spy.active().map(|e| e.link), Some(fx.links[1]));

        fx.doc.clear_journal();
        spy.activate(&mut fx.doc, 450.0);
        assert!(fx.doc.journal().is_empty());
    }

    #[test]
    fn resize_timer_recomputes_before_activating() {
        let mut fx = fixture(&[0.0, 400.0], 3000.0);
        let mut spy = spy(&fx);
        spy.start(&mut fx.doc);

        // Layout shifts: the second section moves down.
        let second = fx.doc.element_by_id("s1").unwrap();
        fx.doc.set_layout(second, 900.0, 200.0);
        fx.doc.scroll_window(500.0);

        assert_eq!(spy.on_scroll(), (SpyTimer::Throttle, Schedule::Start(66)));
        assert_eq!(spy.on_resize(), (SpyTimer::Throttle, Schedule::Keep));
        spy.on_timer(&mut fx.doc, SpyTimer::Throttle);

        assert_eq!(spy.entries()[0].distance, 900.0);
        assert_eq!(active_links(&fx), vec![fx.links[0]]);
    }

    #[test]
    fn scroll_delay_settles_once() {
        let mut fx = fixture(&[0.0, 400.0], 3000.0);
        let settings = SpySettings {
            scroll_delay: true,
            ..SpySettings::default()
        };
        let mut spy = ScrollSpy::new(&fx.doc, settings).unwrap();
        spy.start(&mut fx.doc);

        fx.doc.scroll_window(450.0);
        assert_eq!(spy.on_scroll(), (SpyTimer::Settle, Schedule::Restart(66)));
        assert_eq!(spy.on_scroll(), (SpyTimer::Settle, Schedule::Restart(66)));
        spy.on_timer(&mut fx.doc, SpyTimer::Settle);
        assert_eq!(active_links(&fx), vec![fx.links[1]]);
    }
}

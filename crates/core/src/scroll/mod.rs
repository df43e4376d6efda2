//! Animated scrolling to in-page anchors.

mod animation;
mod settings;

pub use animation::{ScrollAnimation, ScrollTarget};
pub use settings::{Offset, ScrollOverrides, ScrollSettings};

use tracing::{debug, trace};
use waypost_protocol::{ClickEvent, DomCommand, NodeId};

use crate::dom::{Document, Page, link};
use crate::easing::{EasingFn, EasingTable};
use crate::settings::SettingsError;
use crate::throttle::{PageEvent, Schedule, TICK_MS, Throttle};

/// Id given to `<body>` for `href="#"` links when it has none.
pub const TOP_ID: &str = "smooth-scroll-top";

/// Attribute holding an anchor's id while it is blanked.
const SCROLL_ID_ATTR: &str = "data-scroll-id";

/// Per-link options override, as JSON.
const OPTIONS_ATTR: &str = "data-options";

/// A repeating timer driving [`SmoothScroller::tick`].
pub trait Ticker {
    /// Begin calling `tick` every `period_ms`.
    fn start(&mut self, period_ms: u32);
    /// Stop calling `tick`. Idempotent.
    fn stop(&mut self);
}

/// Called with the target and the link that triggered the scroll, if any.
pub type ScrollHook = Box<dyn FnMut(ScrollTarget, Option<NodeId>)>;

#[derive(Default)]
pub struct ScrollHooks {
    pub before: Option<ScrollHook>,
    pub after: Option<ScrollHook>,
}

/// What the host should do with the click event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickOutcome {
    pub prevent_default: bool,
}

impl ClickOutcome {
    pub fn pass() -> Self {
        Self::default()
    }

    fn prevent() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

/// An anchor whose id is blanked until the hash change arrives.
#[derive(Debug, Clone, PartialEq)]
struct PendingJump {
    anchor: NodeId,
    toggle: NodeId,
    id: String,
}

pub struct SmoothScroller<T: Ticker> {
    settings: ScrollSettings,
    easings: EasingTable,
    hooks: ScrollHooks,
    header: Option<NodeId>,
    header_height: f64,
    resize: Throttle,
    pending: Option<PendingJump>,
    animation: Option<ScrollAnimation>,
    ticker: T,
}

impl<T: Ticker> SmoothScroller<T> {
    pub fn new<D: Document + ?Sized>(doc: &D, settings: ScrollSettings, ticker: T) -> Self {
        let header = settings
            .selector_header
            .as_deref()
            .and_then(|selector| doc.query_selector(selector));
        Self {
            header_height: header_height(doc, header),
            header,
            settings,
            easings: EasingTable::new(),
            hooks: ScrollHooks::default(),
            resize: Throttle::default(),
            pending: None,
            animation: None,
            ticker,
        }
    }

    pub fn settings(&self) -> &ScrollSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ScrollSettings {
        &mut self.settings
    }

    pub fn register_easing(&mut self, name: impl Into<String>, curve: EasingFn) {
        self.easings.register(name, curve);
    }

    pub fn set_before(&mut self, hook: impl FnMut(ScrollTarget, Option<NodeId>) + 'static) {
        self.hooks.before = Some(Box::new(hook));
    }

    pub fn set_after(&mut self, hook: impl FnMut(ScrollTarget, Option<NodeId>) + 'static) {
        self.hooks.after = Some(Box::new(hook));
    }

    pub fn header(&self) -> Option<NodeId> {
        self.header
    }

    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    pub fn animation(&self) -> Option<&ScrollAnimation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    /// Start animating toward `target`, replacing any scroll in flight.
    ///
    /// `toggle` is the link that asked for the scroll; its `data-options`
    /// attribute is applied over `options`, which is applied over the
    /// scroller's settings.
    pub fn scroll_to<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        target: ScrollTarget,
        toggle: Option<NodeId>,
        options: Option<&ScrollOverrides>,
    ) -> Result<(), SettingsError> {
        let link_options = match toggle.and_then(|t| page.attribute(t, OPTIONS_ATTR)) {
            Some(json) => ScrollOverrides::from_json(&json)?,
            None => ScrollOverrides::default(),
        };
        let mut settings = self.settings.clone();
        if let Some(options) = options {
            settings = settings.merged(options);
        }
        let settings = settings.merged(&link_options);

        if self.header.is_none()
            && let Some(selector) = settings.selector_header.as_deref()
        {
            self.header = page.query_selector(selector);
        }
        if self.header_height == 0.0 {
            self.header_height = header_height(&*page, self.header);
        }

        let metrics = page.metrics();
        let end = match target {
            ScrollTarget::Position(y) => y,
            ScrollTarget::Element(node) => {
                let location =
                    page.offset_top(node) - self.header_height - settings.offset.resolve();
                location.max(0.0).min(metrics.max_scroll())
            }
        };
        let animation = ScrollAnimation::new(
            target,
            toggle,
            metrics.scroll_y,
            end,
            metrics.document_height,
            settings.speed,
            settings.easing,
        );

        // iOS misreports the first scroll from the very top unless the
        // window is explicitly put there first.
        if metrics.scroll_y == 0.0 {
            page.apply(DomCommand::ScrollTo { y: 0.0 });
        }

        if let Some(before) = self.hooks.before.as_mut() {
            before(target, toggle);
        }

        if self.animation.take().is_some() {
            self.ticker.stop();
        }
        debug!(?target, start = animation.start(), end, "scroll animation started");
        self.animation = Some(animation);
        self.ticker.start(TICK_MS);
        Ok(())
    }

    /// Advance the running animation by one tick.
    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        let position = animation.advance(TICK_MS, &self.easings);
        page.apply(DomCommand::ScrollTo {
            y: position.floor(),
        });
        if !animation.is_finished(position, &page.metrics()) {
            trace!(position, "scroll tick");
            return;
        }

        let Some(animation) = self.animation.take() else {
            return;
        };
        self.ticker.stop();
        if let ScrollTarget::Element(node) = animation.target() {
            focus(page, node);
            page.apply(DomCommand::ScrollTo { y: animation.end() });
        }
        debug!(
            end = animation.end(),
            elapsed_ms = animation.elapsed_ms(),
            "scroll animation finished"
        );
        if let Some(after) = self.hooks.after.as_mut() {
            after(animation.target(), animation.toggle());
        }
    }

    /// Stop any animation without running the `after` hook.
    pub fn cancel(&mut self) {
        if self.animation.take().is_some() {
            self.ticker.stop();
        }
        self.pending = None;
        self.resize.reset();
    }

    /// React to a document click.
    ///
    /// Only plain left clicks on matching in-page links are taken. The
    /// target's id is blanked so the browser's own jump does not happen;
    /// the animation itself starts from [`Self::handle_hash_change`], either
    /// right away (the page is already on that hash, so no hash change
    /// would come) or when the browser reports the new hash.
    pub fn handle_click<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        click: &ClickEvent,
    ) -> Result<ClickOutcome, SettingsError> {
        if !click.is_plain_left_click() {
            return Ok(ClickOutcome::pass());
        }
        let Some(toggle) = page.closest(click.target, &self.settings.selector) else {
            return Ok(ClickOutcome::pass());
        };
        if page.tag_name(toggle) != "a"
            || page.closest(click.target, &self.settings.ignore).is_some()
        {
            return Ok(ClickOutcome::pass());
        }
        let Some(href) = page.attribute(toggle, "href") else {
            return Ok(ClickOutcome::pass());
        };
        let location = page.location();
        let Some(fragment) = link::same_page_fragment(&href, &location) else {
            return Ok(ClickOutcome::pass());
        };
        let current = link::page_fragment(&location);

        if fragment.is_empty() {
            let Some(body) = page.body() else {
                return Ok(ClickOutcome::pass());
            };
            let id = page
                .attribute(body, "id")
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| TOP_ID.to_string());
            self.stash(page, body, toggle, id.clone());
            if current == id {
                self.handle_hash_change(page)?;
            } else {
                page.apply(DomCommand::SetLocationHash { hash: id });
            }
            return Ok(ClickOutcome::prevent());
        }

        let Some(anchor) = page.element_by_id(&fragment) else {
            return Ok(ClickOutcome::pass());
        };
        self.stash(page, anchor, toggle, fragment.clone());
        if fragment == current {
            self.handle_hash_change(page)?;
            return Ok(ClickOutcome::prevent());
        }
        Ok(ClickOutcome::pass())
    }

    /// The page hash changed: restore the blanked anchor and scroll to it.
    pub fn handle_hash_change<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
    ) -> Result<(), SettingsError> {
        let Some(jump) = self.pending.take() else {
            return Ok(());
        };
        page.apply(DomCommand::set_attribute(jump.anchor, "id", jump.id));
        self.scroll_to(
            page,
            ScrollTarget::Element(jump.anchor),
            Some(jump.toggle),
            None,
        )
    }

    /// Record a window resize. `None` when there is no fixed header to
    /// re-measure.
    pub fn on_resize(&mut self) -> Option<Schedule> {
        self.header?;
        Some(self.resize.record(PageEvent::Resize))
    }

    /// The timer armed by [`Self::on_resize`] fired.
    pub fn on_resize_timer<D: Document + ?Sized>(&mut self, doc: &D) {
        if !self.resize.fire().is_empty() {
            self.header_height = header_height(doc, self.header);
        }
    }

    fn stash<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        anchor: NodeId,
        toggle: NodeId,
        id: String,
    ) {
        page.apply(DomCommand::set_attribute(anchor, SCROLL_ID_ATTR, id.as_str()));
        page.apply(DomCommand::set_attribute(anchor, "id", ""));
        self.pending = Some(PendingJump { anchor, toggle, id });
    }
}

impl<T: Ticker + std::fmt::Debug> std::fmt::Debug for SmoothScroller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmoothScroller")
            .field("settings", &self.settings)
            .field("easings", &self.easings)
            .field("header", &self.header)
            .field("header_height", &self.header_height)
            .field("animation", &self.animation)
            .field("ticker", &self.ticker)
            .finish_non_exhaustive()
    }
}

fn header_height<D: Document + ?Sized>(doc: &D, header: Option<NodeId>) -> f64 {
    header.map_or(0.0, |header| doc.height(header) + doc.offset_top(header))
}

/// Focus the element, making it programmatically focusable first if needed.
fn focus<P: Page + ?Sized>(page: &mut P, node: NodeId) {
    if !page.is_focusable(node) {
        page.apply(DomCommand::set_attribute(node, "tabindex", "-1"));
        page.apply(DomCommand::set_style(node, "outline", "none"));
    }
    page.apply(DomCommand::Focus { node });
}

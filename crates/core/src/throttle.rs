//! Rate limiting for scroll and resize handlers.
//!
//! The core never owns a timer. Recording an event returns a [`Schedule`]
//! telling the host what to do with its single timer slot; when that timer
//! fires the host calls back into the behavior, which drains the pending
//! work with `fire`.

/// Window for scroll/resize handlers, ~15 updates per second.
pub const EVENT_INTERVAL_MS: u32 = 66;

/// Animation step, ~60 frames per second.
pub const TICK_MS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Scroll,
    Resize,
}

/// What the host should do with its timer after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Arm a one-shot timer for this many milliseconds.
    Start(u32),
    /// Cancel the armed timer (if any) and arm a new one.
    Restart(u32),
    /// A timer is already armed; leave it alone.
    Keep,
}

/// Events seen since the timer was armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventSet {
    pub scroll: bool,
    pub resize: bool,
}

impl EventSet {
    pub fn insert(&mut self, event: PageEvent) {
        match event {
            PageEvent::Scroll => self.scroll = true,
            PageEvent::Resize => self.resize = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.scroll && !self.resize
    }
}

/// Runs a handler at most once per interval. The call at the end of a
/// burst is never dropped: it rides the armed timer.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: u32,
    pending: Option<EventSet>,
}

impl Throttle {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            pending: None,
        }
    }

    pub fn record(&mut self, event: PageEvent) -> Schedule {
        match &mut self.pending {
            Some(set) => {
                set.insert(event);
                Schedule::Keep
            }
            None => {
                let mut set = EventSet::default();
                set.insert(event);
                self.pending = Some(set);
                Schedule::Start(self.interval_ms)
            }
        }
    }

    /// Take the events gathered during the window and open the next one.
    pub fn fire(&mut self) -> EventSet {
        self.pending.take().unwrap_or_default()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(EVENT_INTERVAL_MS)
    }
}

/// Runs a handler once events stop arriving for a full interval.
#[derive(Debug, Clone)]
pub struct Debounce {
    interval_ms: u32,
    pending: bool,
}

impl Debounce {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            pending: false,
        }
    }

    pub fn record(&mut self) -> Schedule {
        self.pending = true;
        Schedule::Restart(self.interval_ms)
    }

    /// Whether an event was waiting; clears it.
    pub fn fire(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn reset(&mut self) {
        self.pending = false;
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(EVENT_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_arms_once_per_window() {
        let mut throttle = Throttle::default();
        assert_eq!(throttle.record(PageEvent::Scroll), Schedule::Start(66));
        assert_eq!(throttle.record(PageEvent::Scroll), Schedule::Keep);
        assert_eq!(throttle.record(PageEvent::Resize), Schedule::Keep);
        assert!(throttle.is_armed());

        let fired = throttle.fire();
        assert!(fired.scroll && fired.resize);
        assert!(!throttle.is_armed());

        // Next window starts fresh.
        assert_eq!(throttle.record(PageEvent::Scroll), Schedule::Start(66));
        assert_eq!(
            throttle.fire(),
            EventSet {
                scroll: true,
                resize: false
            }
        );
    }

    #[test]
    fn stray_fire_is_empty() {
        let mut throttle = Throttle::new(10);
        assert!(throttle.fire().is_empty());
    }

    #[test]
    fn debounce_restarts_on_every_event() {
        let mut debounce = Debounce::default();
        assert_eq!(debounce.record(), Schedule::Restart(66));
        assert_eq!(debounce.record(), Schedule::Restart(66));
        assert!(debounce.fire());
        assert!(!debounce.fire());
    }
}

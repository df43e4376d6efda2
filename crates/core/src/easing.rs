use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

/// A user-supplied easing curve: normalized time in, normalized progress out.
pub type EasingFn = Rc<dyn Fn(f64) -> f64>;

/// The built-in polynomial easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Easing {
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
}

impl Easing {
    pub const ALL: [Easing; 12] = [
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
        Easing::InQuint,
        Easing::OutQuint,
        Easing::InOutQuint,
    ];

    /// Name used in options, e.g. `easeInOutCubic`.
    pub fn name(self) -> &'static str {
        match self {
            Easing::InQuad => "easeInQuad",
            Easing::OutQuad => "easeOutQuad",
            Easing::InOutQuad => "easeInOutQuad",
            Easing::InCubic => "easeInCubic",
            Easing::OutCubic => "easeOutCubic",
            Easing::InOutCubic => "easeInOutCubic",
            Easing::InQuart => "easeInQuart",
            Easing::OutQuart => "easeOutQuart",
            Easing::InOutQuart => "easeInOutQuart",
            Easing::InQuint => "easeInQuint",
            Easing::OutQuint => "easeOutQuint",
            Easing::InOutQuint => "easeInOutQuint",
        }
    }

    pub fn apply(self, t: f64) -> f64 {
        match self {
            // accelerate from zero velocity
            Easing::InQuad => t * t,
            Easing::InCubic => t * t * t,
            Easing::InQuart => t.powi(4),
            Easing::InQuint => t.powi(5),
            // decelerate to zero velocity
            Easing::OutQuad => t * (2.0 - t),
            Easing::OutCubic => (t - 1.0).powi(3) + 1.0,
            Easing::OutQuart => 1.0 - (t - 1.0).powi(4),
            Easing::OutQuint => 1.0 + (t - 1.0).powi(5),
            // accelerate until halfway, then decelerate
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
                }
            }
            Easing::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - 8.0 * (t - 1.0).powi(4)
                }
            }
            Easing::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 + 16.0 * (t - 1.0).powi(5)
                }
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown easing: {0}")]
pub struct UnknownEasing(pub String);

impl FromStr for Easing {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| UnknownEasing(s.to_string()))
    }
}

/// Named easing curves: user-registered ones first, then the built-ins.
#[derive(Clone, Default)]
pub struct EasingTable {
    custom: HashMap<String, EasingFn>,
}

impl EasingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named curve. A custom curve may shadow a
    /// built-in name.
    pub fn register(&mut self, name: impl Into<String>, curve: EasingFn) {
        self.custom.insert(name.into(), curve);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name) || name.parse::<Easing>().is_ok()
    }

    /// Progress for `name` at time `t`. Unknown names ease linearly.
    pub fn evaluate(&self, name: &str, t: f64) -> f64 {
        if let Some(curve) = self.custom.get(name) {
            return curve(t);
        }
        match name.parse::<Easing>() {
            Ok(easing) => easing.apply(t),
            Err(_) => t,
        }
    }
}

impl fmt::Debug for EasingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("EasingTable").field("custom", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn curves_hit_both_endpoints() {
        for easing in Easing::ALL {
            assert!(close(easing.apply(0.0), 0.0), "{easing} at 0");
            assert!(close(easing.apply(1.0), 1.0), "{easing} at 1");
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in Easing::ALL {
            let mut last = 0.0;
            for step in 1..=100 {
                let value = easing.apply(step as f64 / 100.0);
                assert!(value + 1e-12 >= last, "{easing} decreased at step {step}");
                last = value;
            }
        }
    }

    #[test]
    fn in_out_curves_are_symmetric_at_midpoint() {
        for easing in [
            Easing::InOutQuad,
            Easing::InOutCubic,
            Easing::InOutQuart,
            Easing::InOutQuint,
        ] {
            assert!(close(easing.apply(0.5), 0.5), "{easing}");
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        assert_eq!("easeOutQuart".parse::<Easing>(), Ok(Easing::OutQuart));
        let err = "easeInOutExpo".parse::<Easing>().unwrap_err();
        assert_eq!(err.to_string(), "unknown easing: easeInOutExpo");
    }

    #[test]
    fn custom_curves_extend_and_override() {
        let mut table = EasingTable::new();
        table.register("step", Rc::new(|t: f64| if t < 1.0 { 0.0 } else { 1.0 }));
        table.register("easeInQuad", Rc::new(|t: f64| t.sqrt()));

        assert_eq!(table.evaluate("step", 0.7), 0.0);
        assert!(close(table.evaluate("easeInQuad", 0.25), 0.5));
        assert!(close(table.evaluate("easeOutQuad", 0.5), 0.75));
        assert!(table.contains("step"));
    }

    #[test]
    fn unknown_name_is_linear() {
        let table = EasingTable::new();
        assert_eq!(table.evaluate("bogus", 0.3), 0.3);
        assert!(!table.contains("bogus"));
    }
}

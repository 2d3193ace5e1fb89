//! Margin ranges and the boundary test applied to them.
//!
//! A [`Range`] is the editable wire shape: two endpoints plus one "open"
//! flag per side. An open side is unbounded, so the range degrades to a
//! single arrow (`<= max` when the min side is open, `>= min` when the max
//! side is open). Evaluation never looks at the flags directly; it goes
//! through [`Interval`], which makes every combination an explicit variant.

use serde::{Deserialize, Serialize};

/// Per-branch range configured on a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub min_is_open: bool,
    #[serde(default)]
    pub max_is_open: bool,
}

impl Range {
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_is_open: false,
            max_is_open: false,
        }
    }

    /// `margin <= max`; the stored `min` is kept for the editor but ignored.
    pub fn at_most(min: f64, max: f64) -> Self {
        Self {
            min_is_open: true,
            ..Self::closed(min, max)
        }
    }

    /// `margin >= min`; the stored `max` is kept for the editor but ignored.
    pub fn at_least(min: f64, max: f64) -> Self {
        Self {
            max_is_open: true,
            ..Self::closed(min, max)
        }
    }

    pub fn interval(&self) -> Interval {
        match (self.min_is_open, self.max_is_open) {
            (false, false) => Interval::Closed {
                min: self.min,
                max: self.max,
            },
            (true, false) => Interval::AtMost(self.max),
            (false, true) => Interval::AtLeast(self.min),
            (true, true) => Interval::Unbounded,
        }
    }

    pub fn contains(&self, margin: f64) -> bool {
        self.interval().contains(margin)
    }
}

/// Compiled form of a [`Range`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interval {
    Closed { min: f64, max: f64 },
    AtLeast(f64),
    AtMost(f64),
    /// Both sides open. Degenerate but legal: every margin satisfies it.
    Unbounded,
}

impl Interval {
    pub fn contains(&self, margin: f64) -> bool {
        match *self {
            Interval::Closed { min, max } => min <= margin && margin <= max,
            Interval::AtLeast(min) => margin >= min,
            Interval::AtMost(max) => margin <= max,
            Interval::Unbounded => true,
        }
    }
}

/// The range test: does `margin` satisfy `range`?
pub fn test(margin: f64, range: &Range) -> bool {
    range.contains(margin)
}

//! Observation configuration.
//!
//! A [`VisibilityConfig`] is fixed for the lifetime of one subscription. It is
//! validated once, at [`Tracker::attach`](super::Tracker::attach); a threshold
//! outside `[0, 1]` is rejected rather than clamped.
//!
//! The root margin uses the CSS shorthand the browser's intersection observer
//! accepts, so the same value can be written into the generated page:
//!
//! ```text
//! "50px"                 all sides
//! "50px 0px"             vertical | horizontal
//! "0px 0px -10% 0px"     top | right | bottom | left
//! ```
//!
//! Percentages resolve against the root's height (top/bottom) or width
//! (left/right). Negative values shrink the effective viewport.

use super::tracker::VisibilityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fraction(s) of the target's area that must be inside the (margin-adjusted)
/// viewport to count as visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Single(f64),
    /// Visible when any member is satisfied.
    Set(Vec<f64>),
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Single(0.1)
    }
}

impl Threshold {
    pub fn values(&self) -> &[f64] {
        match self {
            Threshold::Single(t) => std::slice::from_ref(t),
            Threshold::Set(ts) => ts,
        }
    }

    /// Whether `ratio` counts as intersecting.
    ///
    /// A zero threshold needs a strictly positive ratio, so a target sitting
    /// entirely outside the viewport never reads as visible.
    pub fn is_satisfied(&self, ratio: f64) -> bool {
        self.values().iter().any(|&t| {
            if t == 0.0 {
                ratio > 0.0
            } else {
                ratio >= t
            }
        })
    }

    pub fn validate(&self) -> Result<(), VisibilityError> {
        let values = self.values();
        if values.is_empty() {
            return Err(VisibilityError::InvalidConfig(
                "threshold set must not be empty".into(),
            ));
        }
        for &t in values {
            if !t.is_finite() || !(0.0..=1.0).contains(&t) {
                return Err(VisibilityError::InvalidConfig(format!(
                    "threshold {t} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Comma-separated form for a `data-threshold` attribute.
    pub fn to_attr(&self) -> String {
        self.values()
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    /// Resolve to pixels against the root dimension on the same axis.
    pub fn resolve(self, basis: f64) -> f64 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{v}px"),
            Length::Percent(v) => write!(f, "{v}%"),
        }
    }
}

impl FromStr for Length {
    type Err = VisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VisibilityError::InvalidConfig(format!("invalid margin length '{s}'"));
        let (number, make): (&str, fn(f64) -> Length) = if let Some(n) = s.strip_suffix("px") {
            (n, Length::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Length::Percent)
        } else if s == "0" {
            ("0", Length::Px)
        } else {
            return Err(invalid());
        };
        let value: f64 = number.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(make(value))
    }
}

/// Padding box applied to the viewport before intersection is evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: Length::Px(0.0),
        right: Length::Px(0.0),
        bottom: Length::Px(0.0),
        left: Length::Px(0.0),
    };
}

impl Default for RootMargin {
    fn default() -> Self {
        RootMargin::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = VisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(Length::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => {
                return Err(VisibilityError::InvalidConfig(format!(
                    "root margin '{s}' must have 1 to 4 lengths"
                )));
            }
        };
        Ok(RootMargin {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Configuration of one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityConfig {
    pub threshold: Threshold,
    pub root_margin: RootMargin,
    /// Latch the first rising edge and stop observing afterwards.
    pub trigger_once: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            root_margin: RootMargin {
                bottom: Length::Percent(-10.0),
                ..RootMargin::ZERO
            },
            trigger_once: true,
        }
    }
}

impl VisibilityConfig {
    /// Build a config from the textual root margin used in `config.toml`.
    pub fn parse(
        threshold: Threshold,
        root_margin: &str,
        trigger_once: bool,
    ) -> Result<Self, VisibilityError> {
        let config = Self {
            threshold,
            root_margin: root_margin.parse()?,
            trigger_once,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VisibilityError> {
        self.threshold.validate()
    }
}

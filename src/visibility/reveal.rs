//! One-shot section reveal.
//!
//! A reveal holds no state of its own: it is a projection of the section's
//! [`VisibilityState`], so it can never disagree with the tracker. Staggering
//! children is a presentation offset layered on top.

use super::tracker::VisibilityState;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed,
}

impl RevealState {
    /// CSS class the page stylesheet keys its entrance transition on.
    pub fn css_class(self) -> &'static str {
        match self {
            RevealState::Hidden => "reveal",
            RevealState::Revealed => "reveal is-revealed",
        }
    }
}

pub fn reveal_state(state: VisibilityState) -> RevealState {
    if state.is_visible {
        RevealState::Revealed
    } else {
        RevealState::Hidden
    }
}

/// Per-child animation offsets for a composite block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stagger {
    pub interval: Duration,
}

impl Stagger {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Offset of child `index` from the parent's reveal instant.
    pub fn delay(&self, index: usize) -> Duration {
        self.interval
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn schedule(&self, children: usize) -> Vec<Duration> {
        (0..children).map(|i| self.delay(i)).collect()
    }

    /// Inline style carrying the delay as a CSS custom property.
    pub fn style(&self, index: usize) -> String {
        format!("--reveal-delay: {}ms", self.delay(index).as_millis())
    }
}

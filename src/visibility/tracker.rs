//! Visibility tracking.
//!
//! The [`Tracker`] owns one subscription per observed element and turns the
//! platform's intersection-ratio reports into a [`VisibilityState`].
//!
//! ## State machine
//!
//! For each report, `intersecting = threshold.is_satisfied(ratio)`, then:
//!
//! - **one-shot** (`trigger_once`): the first intersecting report sets
//!   `is_visible` and `has_triggered` together, unregisters the target from the
//!   platform and freezes the subscription. Nothing changes afterwards.
//! - **continuous**: `is_visible` mirrors `intersecting` on every report;
//!   `has_triggered` latches the first time it is true.
//!
//! ## Lifecycle
//!
//! [`Tracker::attach`] validates the config, registers with the platform and
//! evaluates the ratio the platform reports at registration, so an element
//! that is already on screen becomes visible without waiting for a scroll.
//! [`Tracker::detach`] unregisters synchronously and is idempotent. Handles
//! are never reused, so a stale handle can never address a newer subscription.

use super::config::VisibilityConfig;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisibilityError {
    #[error("Invalid visibility config: {0}")]
    InvalidConfig(String),
    #[error("Target {0:?} is not mounted")]
    NotMounted(TargetId),
}

/// Stable identity of an observable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Handle to one active (or formerly active) subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Read model handed to presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    pub is_visible: bool,
    pub has_triggered: bool,
}

/// One ratio report from the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: TargetId,
    pub ratio: f64,
}

/// A state change produced by a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityUpdate {
    pub handle: SubscriptionHandle,
    pub target: TargetId,
    pub state: VisibilityState,
}

/// The platform's viewport-intersection facility.
///
/// Shared by every subscription; each registration carries its own config.
pub trait IntersectionSource {
    fn is_mounted(&self, target: TargetId) -> bool;

    /// Start reporting ratio changes for `target`. Returns the ratio at the
    /// moment of registration when it can be measured.
    fn observe(&mut self, target: TargetId, config: &VisibilityConfig) -> Option<f64>;

    /// Stop reporting for `target`. Reports already queued for it are dropped.
    fn unobserve(&mut self, target: TargetId);

    /// Drain queued reports in the order they happened.
    fn take_entries(&mut self) -> Vec<IntersectionEntry>;
}

#[derive(Debug)]
struct Subscription {
    target: TargetId,
    config: VisibilityConfig,
    state: VisibilityState,
    frozen: bool,
}

impl Subscription {
    /// Apply one report. Returns whether the state changed.
    fn apply(&mut self, ratio: f64) -> bool {
        if self.frozen {
            return false;
        }
        let intersecting = self.config.threshold.is_satisfied(ratio);
        let before = self.state;
        if self.config.trigger_once {
            if intersecting {
                self.state = VisibilityState {
                    is_visible: true,
                    has_triggered: true,
                };
                self.frozen = true;
            }
        } else {
            self.state.is_visible = intersecting;
            self.state.has_triggered |= intersecting;
        }
        self.state != before
    }
}

pub struct Tracker<S> {
    source: S,
    subscriptions: HashMap<SubscriptionHandle, Subscription>,
    by_target: HashMap<TargetId, SubscriptionHandle>,
    next_id: u64,
}

impl<S: IntersectionSource> Tracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            subscriptions: HashMap::new(),
            by_target: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn is_attached(&self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.contains_key(&handle)
    }

    /// Begin observing `target`.
    ///
    /// Attaching a target that is already observed returns the existing
    /// handle; the first config stays in force.
    pub fn attach(
        &mut self,
        target: TargetId,
        config: VisibilityConfig,
    ) -> Result<SubscriptionHandle, VisibilityError> {
        config.validate()?;
        if !self.source.is_mounted(target) {
            return Err(VisibilityError::NotMounted(target));
        }
        if let Some(&handle) = self.by_target.get(&target) {
            return Ok(handle);
        }

        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;

        let initial = self.source.observe(target, &config);
        let mut subscription = Subscription {
            target,
            config,
            state: VisibilityState::default(),
            frozen: false,
        };
        if let Some(ratio) = initial {
            subscription.apply(ratio);
        }
        if subscription.frozen {
            self.source.unobserve(target);
        }
        debug!(
            ?target,
            ?handle,
            visible = subscription.state.is_visible,
            "attached visibility subscription"
        );
        self.subscriptions.insert(handle, subscription);
        self.by_target.insert(target, handle);
        Ok(handle)
    }

    /// Latest state. A detached handle reads as never visible.
    pub fn current_state(&self, handle: SubscriptionHandle) -> VisibilityState {
        self.subscriptions
            .get(&handle)
            .map(|s| s.state)
            .unwrap_or_default()
    }

    /// Release the subscription. Detaching twice is a no-op.
    pub fn detach(&mut self, handle: SubscriptionHandle) {
        let Some(subscription) = self.subscriptions.remove(&handle) else {
            return;
        };
        self.by_target.remove(&subscription.target);
        if !subscription.frozen {
            self.source.unobserve(subscription.target);
        }
        debug!(target = ?subscription.target, ?handle, "detached visibility subscription");
    }

    /// The element left the document; drop whatever observes it.
    pub fn release_target(&mut self, target: TargetId) {
        if let Some(&handle) = self.by_target.get(&target) {
            self.detach(handle);
        }
    }

    /// Apply one platform report for `target`.
    ///
    /// Returns the new state only when it changed. Reports for targets with
    /// no live subscription, or for frozen one-shot subscriptions, are ignored.
    pub fn deliver(&mut self, target: TargetId, ratio: f64) -> Option<VisibilityUpdate> {
        let handle = *self.by_target.get(&target)?;
        let subscription = self.subscriptions.get_mut(&handle)?;
        if !subscription.apply(ratio) {
            return None;
        }
        let update = VisibilityUpdate {
            handle,
            target,
            state: subscription.state,
        };
        if subscription.frozen {
            self.source.unobserve(target);
        }
        Some(update)
    }

    /// Drain the platform's queued reports and apply them in order.
    pub fn poll(&mut self) -> Vec<VisibilityUpdate> {
        self.source
            .take_entries()
            .into_iter()
            .filter_map(|entry| self.deliver(entry.target, entry.ratio))
            .collect()
    }
}

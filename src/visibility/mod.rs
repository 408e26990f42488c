//! Visibility-driven lazy content control.
//!
//! Platform-agnostic state machines behind the page's scroll behavior. A
//! single producer, the [`Tracker`], turns intersection-ratio reports from a
//! platform facility into a [`VisibilityState`] per observed element. Two
//! independent consumers read that state:
//!
//! ```text
//!                    ┌──────────────────────┐
//!  ratio reports ──▶ │ Tracker (per target) │ ──▶ VisibilityState
//!                    └──────────────────────┘          │
//!                                        ┌─────────────┴─────────────┐
//!                                        ▼                           ▼
//!                          DeferredMediaLoader                 reveal_state()
//!                    Idle → Loading → Loaded | Failed        Hidden | Revealed
//! ```
//!
//! Nothing here blocks or spawns. Every transition happens on the caller's
//! thread in response to a platform callback: an intersection report
//! ([`Tracker::deliver`]) or a fetch outcome
//! ([`DeferredMediaLoader::on_load_succeeded`] /
//! [`DeferredMediaLoader::on_load_failed`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `VisibilityConfig`: thresholds, root margin, one-shot flag |
//! | [`geometry`] | Rectangles, margin expansion, intersection ratios, the in-process [`Viewport`] |
//! | [`tracker`] | Subscriptions and the visibility state machine |
//! | [`loader`] | Load decisions and the media load-state machine |
//! | [`reveal`] | One-shot section reveal projection and stagger schedule |
//! | [`observable`] | Observable value with explicit subscribe/unsubscribe |
//! | [`spy`] | Active-section tracking for navigation highlighting |

pub mod config;
pub mod geometry;
pub mod loader;
pub mod observable;
pub mod reveal;
pub mod spy;
pub mod tracker;

pub use config::{Length, RootMargin, Threshold, VisibilityConfig};
pub use geometry::{Rect, Viewport};
pub use loader::{
    DeferredMediaLoader, FetchRequest, LazyMedia, LoadTicket, LoaderError, MediaFetcher,
    MediaLoadState, MediaView, Priority, should_begin_load,
};
pub use observable::{ListenerId, Observable};
pub use reveal::{RevealState, Stagger, reveal_state};
pub use spy::ActiveSectionSpy;
pub use tracker::{
    IntersectionEntry, IntersectionSource, SubscriptionHandle, TargetId, Tracker,
    VisibilityError, VisibilityState, VisibilityUpdate,
};

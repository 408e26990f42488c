//! # Archfolio
//!
//! A static generator for single-page architecture and design portfolios,
//! built around a visibility-driven lazy content controller.
//!
//! # Architecture: Load, Then Generate
//!
//! ```text
//! 1. Load      content/  →  Site          (TOML + markdown → validated records)
//! 2. Generate  Site      →  dist/         (index.html, fingerprinted assets, site.json)
//! ```
//!
//! The page's scroll behavior (section reveals, deferred images, the active
//! navigation link) is specified once, in [`visibility`], as platform-neutral
//! state machines. The generator bakes their build-time decisions into the
//! HTML as data attributes and the embedded page script drives the same
//! machines from the browser's intersection observer.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`visibility`] | Visibility tracker, deferred media loader, section reveal, active-section spy |
//! | [`content`] | Reads and validates `site.toml`, `projects.toml`, `experience.toml`, `about.md`, `assets/` |
//! | [`generate`] | Renders the single page with Maud and copies assets |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Portfolio records: `Project`, `Experience`, `Person`, `Contact`, `Section` |
//! | [`output`] | CLI output formatting for `check` and `build` |
//!
//! # Design Decisions
//!
//! ## Tracker Owns the Observer Seam
//!
//! [`visibility::Tracker`] never computes geometry. It consumes intersection
//! ratios from an [`visibility::IntersectionSource`]: the in-process
//! [`visibility::Viewport`] for tests and layout reasoning, the browser's
//! observer at runtime. Subscription state is per target and per handle, so
//! two components watching the same element cannot interfere.
//!
//! ## Stale Loads Are Tickets, Not Timers
//!
//! Every fetch the [`visibility::DeferredMediaLoader`] starts carries a
//! [`visibility::LoadTicket`]. Completions with an old ticket are dropped, so
//! a source change or a detach can never be overwritten by a late response.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup is
//! a compile error and every interpolation is escaped, which matters for a
//! page built entirely from hand-edited data files.

pub mod config;
pub mod content;
pub mod generate;
pub mod output;
pub mod types;
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Deferred media loading.
//!
//! A [`DeferredMediaLoader`] holds the load state of one media element:
//!
//! ```text
//!   Idle ──begin_load──▶ Loading ──success──▶ Loaded
//!                          │   ▲
//!                   failure│   │retry
//!                          ▼   │
//!                          Failed
//!
//!   reset(new_source): any state ──▶ Idle
//! ```
//!
//! Every fetch is tagged with a [`LoadTicket`]. Outcomes only apply when they
//! carry the current ticket; a superseded request, a reset, or a detach makes
//! the old ticket stale and its callback a no-op. Failures are state, never
//! errors: the presentation layer reads [`MediaLoadState::view`] and offers a
//! manual retry. Nothing retries on its own.

use super::tracker::{TargetId, VisibilityState};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    #[error("Invalid media source: {0:?}")]
    InvalidSource(String),
    #[error("Media already loaded; reset with a new source first")]
    AlreadyLoaded,
    #[error("Loader is detached from its element")]
    Detached,
}

/// How urgently a media element wants its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Above the fold: load without waiting for visibility.
    Eager,
    #[default]
    Lazy,
}

impl Priority {
    /// Value for the HTML `loading` attribute.
    pub fn loading_attr(self) -> &'static str {
        match self {
            Priority::Eager => "eager",
            Priority::Lazy => "lazy",
        }
    }
}

/// Whether the resource is worth fetching now.
///
/// Once the element has triggered, the answer stays yes even if a continuous
/// subscription later reports it out of view.
pub fn should_begin_load(state: VisibilityState, priority: Priority) -> bool {
    priority == Priority::Eager || state.is_visible || state.has_triggered
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaLoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What the presentation layer draws for a load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaView {
    Placeholder,
    Rendered,
    /// Fallback indicator with a retry affordance.
    Fallback,
}

impl MediaLoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MediaLoadState::Loaded | MediaLoadState::Failed)
    }

    /// Value of the `data-media` attribute the page script and stylesheet
    /// key on.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaLoadState::Idle => "idle",
            MediaLoadState::Loading => "loading",
            MediaLoadState::Loaded => "loaded",
            MediaLoadState::Failed => "failed",
        }
    }

    pub fn view(self) -> MediaView {
        match self {
            MediaLoadState::Idle | MediaLoadState::Loading => MediaView::Placeholder,
            MediaLoadState::Loaded => MediaView::Rendered,
            MediaLoadState::Failed => MediaView::Fallback,
        }
    }
}

/// Identifies one fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub target: TargetId,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest<'a> {
    pub ticket: LoadTicket,
    pub source: &'a str,
}

/// The platform's resource-loading facility.
///
/// `fetch` must not block; the outcome is reported later through
/// [`DeferredMediaLoader::on_load_succeeded`] or
/// [`DeferredMediaLoader::on_load_failed`] with the request's ticket.
pub trait MediaFetcher {
    fn fetch(&mut self, request: FetchRequest<'_>);
    fn cancel(&mut self, ticket: LoadTicket);
}

#[derive(Debug)]
pub struct DeferredMediaLoader {
    target: TargetId,
    source: String,
    state: MediaLoadState,
    generation: u64,
    in_flight: Option<LoadTicket>,
    detached: bool,
}

impl DeferredMediaLoader {
    pub fn new(target: TargetId, source: impl Into<String>) -> Self {
        Self {
            target,
            source: source.into(),
            state: MediaLoadState::Idle,
            generation: 0,
            in_flight: None,
            detached: false,
        }
    }

    pub fn state(&self) -> MediaLoadState {
        self.state
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn in_flight(&self) -> Option<LoadTicket> {
        self.in_flight
    }

    /// Start fetching `source`.
    ///
    /// A request while `Loading` supersedes the previous one: the old ticket is
    /// cancelled and its outcome will be ignored.
    pub fn begin_load(
        &mut self,
        source: &str,
        fetcher: &mut dyn MediaFetcher,
    ) -> Result<MediaLoadState, LoaderError> {
        if self.detached {
            return Err(LoaderError::Detached);
        }
        if source.trim().is_empty() {
            warn!(target_id = ?self.target, "rejected empty media source");
            return Err(LoaderError::InvalidSource(source.to_string()));
        }
        if self.state == MediaLoadState::Loaded {
            return Err(LoaderError::AlreadyLoaded);
        }
        if let Some(stale) = self.in_flight.take() {
            fetcher.cancel(stale);
        }

        self.generation += 1;
        let ticket = LoadTicket {
            target: self.target,
            generation: self.generation,
        };
        self.source = source.to_string();
        self.state = MediaLoadState::Loading;
        self.in_flight = Some(ticket);
        debug!(target_id = ?self.target, source, "media load started");
        fetcher.fetch(FetchRequest {
            ticket,
            source: &self.source,
        });
        Ok(self.state)
    }

    /// Re-issue the last source after a failure.
    pub fn retry(&mut self, fetcher: &mut dyn MediaFetcher) -> Result<MediaLoadState, LoaderError> {
        if self.state != MediaLoadState::Failed {
            return Ok(self.state);
        }
        let source = self.source.clone();
        self.begin_load(&source, fetcher)
    }

    pub fn on_load_succeeded(&mut self, ticket: LoadTicket) -> MediaLoadState {
        self.settle(ticket, MediaLoadState::Loaded)
    }

    pub fn on_load_failed(&mut self, ticket: LoadTicket) -> MediaLoadState {
        self.settle(ticket, MediaLoadState::Failed)
    }

    fn settle(&mut self, ticket: LoadTicket, outcome: MediaLoadState) -> MediaLoadState {
        let current = !self.detached
            && self.state == MediaLoadState::Loading
            && self.in_flight == Some(ticket);
        if !current {
            debug!(target_id = ?self.target, ?ticket, "ignored stale media callback");
            return self.state;
        }
        self.in_flight = None;
        self.state = outcome;
        debug!(target_id = ?self.target, state = ?outcome, "media load settled");
        self.state
    }

    /// Point the element at a different resource. Any in-flight outcome
    /// becomes stale.
    pub fn reset(&mut self, new_source: impl Into<String>) {
        self.in_flight = None;
        self.generation += 1;
        self.source = new_source.into();
        self.state = MediaLoadState::Idle;
    }

    /// The element is gone. Cancels the in-flight fetch; every later call
    /// is ignored or rejected.
    pub fn detach(&mut self, fetcher: &mut dyn MediaFetcher) {
        if let Some(ticket) = self.in_flight.take() {
            fetcher.cancel(ticket);
        }
        self.detached = true;
    }
}

/// A media element: a loader plus the priority that gates it.
#[derive(Debug)]
pub struct LazyMedia {
    pub priority: Priority,
    loader: DeferredMediaLoader,
}

impl LazyMedia {
    pub fn new(target: TargetId, source: impl Into<String>, priority: Priority) -> Self {
        Self {
            priority,
            loader: DeferredMediaLoader::new(target, source),
        }
    }

    pub fn loader(&self) -> &DeferredMediaLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut DeferredMediaLoader {
        &mut self.loader
    }

    pub fn view(&self) -> MediaView {
        self.loader.state().view()
    }

    /// Feed the latest visibility. Starts the fetch the first time loading is
    /// warranted; later calls leave the state machine alone.
    pub fn sync(
        &mut self,
        visibility: VisibilityState,
        fetcher: &mut dyn MediaFetcher,
    ) -> Result<MediaLoadState, LoaderError> {
        if self.loader.state() != MediaLoadState::Idle
            || !should_begin_load(visibility, self.priority)
        {
            return Ok(self.loader.state());
        }
        let source = self.loader.source().to_string();
        self.loader.begin_load(&source, fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingFetcher {
        fetched: Vec<(LoadTicket, String)>,
        cancelled: Vec<LoadTicket>,
    }

    impl MediaFetcher for RecordingFetcher {
        fn fetch(&mut self, request: FetchRequest<'_>) {
            self.fetched.push((request.ticket, request.source.to_string()));
        }

        fn cancel(&mut self, ticket: LoadTicket) {
            self.cancelled.push(ticket);
        }
    }

    impl RecordingFetcher {
        fn last_ticket(&self) -> LoadTicket {
            self.fetched.last().expect("nothing fetched").0
        }
    }

    const T: TargetId = TargetId(3);

    fn visible(is_visible: bool, has_triggered: bool) -> VisibilityState {
        VisibilityState {
            is_visible,
            has_triggered,
        }
    }

    #[test]
    fn load_decision_truth_table() {
        assert!(should_begin_load(visible(false, false), Priority::Eager));
        assert!(should_begin_load(visible(true, false), Priority::Lazy));
        assert!(should_begin_load(visible(false, true), Priority::Lazy));
        assert!(!should_begin_load(visible(false, false), Priority::Lazy));
    }

    #[test]
    fn success_then_late_failure_stays_loaded() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "");
        assert_eq!(
            loader.begin_load("img.jpg", &mut fetcher),
            Ok(MediaLoadState::Loading)
        );
        let ticket = fetcher.last_ticket();
        assert_eq!(loader.on_load_succeeded(ticket), MediaLoadState::Loaded);
        assert_eq!(loader.on_load_failed(ticket), MediaLoadState::Loaded);
    }

    #[test]
    fn superseded_load_ignores_old_outcome() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "a.jpg");
        loader.begin_load("a.jpg", &mut fetcher).unwrap();
        let a = fetcher.last_ticket();
        loader.begin_load("b.jpg", &mut fetcher).unwrap();
        let b = fetcher.last_ticket();
        assert_eq!(fetcher.cancelled, vec![a]);

        assert_eq!(loader.on_load_succeeded(a), MediaLoadState::Loading);
        assert_eq!(loader.on_load_failed(b), MediaLoadState::Failed);
        assert_eq!(loader.source(), "b.jpg");
    }

    #[test]
    fn each_outcome_reaches_exactly_one_terminal_state() {
        for succeed in [true, false] {
            let mut fetcher = RecordingFetcher::default();
            let mut loader = DeferredMediaLoader::new(T, "x.png");
            loader.begin_load("x.png", &mut fetcher).unwrap();
            let ticket = fetcher.last_ticket();
            let end = if succeed {
                loader.on_load_succeeded(ticket)
            } else {
                loader.on_load_failed(ticket)
            };
            assert!(end.is_terminal());
            assert_eq!(loader.in_flight(), None);
        }
    }

    #[test]
    fn empty_source_rejected_without_transition() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "");
        assert!(matches!(
            loader.begin_load("  ", &mut fetcher),
            Err(LoaderError::InvalidSource(_))
        ));
        assert_eq!(loader.state(), MediaLoadState::Idle);
        assert!(fetcher.fetched.is_empty());
    }

    #[test]
    fn callback_outside_loading_is_noop() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "a.jpg");
        loader.begin_load("a.jpg", &mut fetcher).unwrap();
        let ticket = fetcher.last_ticket();
        loader.reset("c.jpg");
        assert_eq!(loader.on_load_succeeded(ticket), MediaLoadState::Idle);
    }

    #[test]
    fn loaded_requires_reset_before_new_load() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "a.jpg");
        loader.begin_load("a.jpg", &mut fetcher).unwrap();
        loader.on_load_succeeded(fetcher.last_ticket());
        assert_eq!(
            loader.begin_load("b.jpg", &mut fetcher),
            Err(LoaderError::AlreadyLoaded)
        );
        loader.reset("b.jpg");
        assert_eq!(loader.state(), MediaLoadState::Idle);
        assert_eq!(
            loader.begin_load("b.jpg", &mut fetcher),
            Ok(MediaLoadState::Loading)
        );
    }

    #[test]
    fn manual_retry_after_failure() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "a.jpg");
        loader.begin_load("a.jpg", &mut fetcher).unwrap();
        loader.on_load_failed(fetcher.last_ticket());
        assert_eq!(loader.state().view(), MediaView::Fallback);

        assert_eq!(loader.retry(&mut fetcher), Ok(MediaLoadState::Loading));
        assert_eq!(fetcher.fetched.len(), 2);
        assert_eq!(fetcher.fetched[1].1, "a.jpg");
        loader.on_load_succeeded(fetcher.last_ticket());
        assert_eq!(loader.state().view(), MediaView::Rendered);
    }

    #[test]
    fn retry_is_noop_unless_failed() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "a.jpg");
        assert_eq!(loader.retry(&mut fetcher), Ok(MediaLoadState::Idle));
        assert!(fetcher.fetched.is_empty());
    }

    #[test]
    fn detach_cancels_and_ignores_late_callbacks() {
        let mut fetcher = RecordingFetcher::default();
        let mut loader = DeferredMediaLoader::new(T, "a.jpg");
        loader.begin_load("a.jpg", &mut fetcher).unwrap();
        let ticket = fetcher.last_ticket();
        loader.detach(&mut fetcher);
        assert_eq!(fetcher.cancelled, vec![ticket]);
        assert_eq!(loader.on_load_succeeded(ticket), MediaLoadState::Loading);
        assert_eq!(
            loader.begin_load("a.jpg", &mut fetcher),
            Err(LoaderError::Detached)
        );
    }

    #[test]
    fn lazy_media_waits_for_visibility() {
        let mut fetcher = RecordingFetcher::default();
        let mut media = LazyMedia::new(T, "plan.jpg", Priority::Lazy);
        assert_eq!(
            media.sync(visible(false, false), &mut fetcher),
            Ok(MediaLoadState::Idle)
        );
        assert_eq!(media.view(), MediaView::Placeholder);

        assert_eq!(
            media.sync(visible(true, true), &mut fetcher),
            Ok(MediaLoadState::Loading)
        );
        // Scrolling away and back never issues a second fetch.
        media.sync(visible(false, true), &mut fetcher).unwrap();
        media.sync(visible(true, true), &mut fetcher).unwrap();
        assert_eq!(fetcher.fetched.len(), 1);
    }

    #[test]
    fn eager_media_loads_immediately() {
        let mut fetcher = RecordingFetcher::default();
        let mut media = LazyMedia::new(T, "hero.jpg", Priority::Eager);
        assert_eq!(
            media.sync(VisibilityState::default(), &mut fetcher),
            Ok(MediaLoadState::Loading)
        );
    }

    #[test]
    fn priority_loading_attr() {
        assert_eq!(Priority::Eager.loading_attr(), "eager");
        assert_eq!(Priority::Lazy.loading_attr(), "lazy");
    }
}

//! Active-section tracking for navigation highlighting.
//!
//! A section is active when its box spans a probe line a fixed distance below
//! the top of the viewport. The result is published through an
//! [`Observable`], so the navigation subscribes on mount and unsubscribes on
//! unmount instead of sharing a module-level variable.

use super::geometry::Rect;
use super::observable::{ListenerId, Observable};

/// Distance of the probe line from the viewport top, in px.
pub const DEFAULT_PROBE_OFFSET: f64 = 100.0;

#[derive(Debug)]
pub struct ActiveSectionSpy<K> {
    /// Sections in document order, rectangles in document coordinates.
    sections: Vec<(K, Rect)>,
    probe_offset: f64,
    active: Observable<Option<K>>,
}

impl<K: Clone + PartialEq + 'static> ActiveSectionSpy<K> {
    pub fn new(sections: Vec<(K, Rect)>) -> Self {
        Self::with_probe_offset(sections, DEFAULT_PROBE_OFFSET)
    }

    pub fn with_probe_offset(sections: Vec<(K, Rect)>, probe_offset: f64) -> Self {
        Self {
            sections,
            probe_offset,
            active: Observable::new(None),
        }
    }

    pub fn active(&self) -> Option<&K> {
        self.active.get().as_ref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Option<K>) + 'static) -> ListenerId {
        self.active.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.active.unsubscribe(id)
    }

    /// Layout changed (resize, content loaded).
    pub fn set_sections(&mut self, sections: Vec<(K, Rect)>) {
        self.sections = sections;
    }

    /// Recompute for a scroll position. When no section spans the probe line
    /// the previous section stays active.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Option<&K> {
        let probe = scroll_y + self.probe_offset;
        let hit = self
            .sections
            .iter()
            .find(|(_, rect)| rect.top() <= probe && rect.bottom() >= probe)
            .map(|(key, _)| key.clone());
        if hit.is_some() {
            self.active.set(hit);
        }
        self.active()
    }
}

//! Rectangles, intersection ratios, and an in-process viewport.
//!
//! [`intersection_ratio`] computes what a browser's intersection observer
//! reports: the fraction of the target's area inside the root after the root
//! has been grown or shrunk by its margin. [`Viewport`] applies it to a set of
//! mounted elements and a scroll offset, acting as an [`IntersectionSource`]
//! for the tracker outside a browser.

use super::config::{RootMargin, VisibilityConfig};
use super::tracker::{IntersectionEntry, IntersectionSource, TargetId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlap of two rectangles, `None` when they do not touch.
    ///
    /// Edge-adjacent rectangles produce a zero-area overlap, matching the
    /// browser treating a zero-size target on the root edge as intersecting.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

impl RootMargin {
    /// Apply the margin to a root rectangle.
    pub fn expand(&self, root: &Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            (root.width + left + right).max(0.0),
            (root.height + top + bottom).max(0.0),
        )
    }
}

/// Fraction of `target` inside `root` expanded by `margin`, in `[0, 1]`.
pub fn intersection_ratio(target: &Rect, root: &Rect, margin: &RootMargin) -> f64 {
    let root = margin.expand(root);
    match target.intersect(&root) {
        None => 0.0,
        Some(_) if target.area() == 0.0 => 1.0,
        Some(overlap) => (overlap.area() / target.area()).clamp(0.0, 1.0),
    }
}

#[derive(Debug)]
struct Observed {
    margin: RootMargin,
    last_ratio: f64,
}

/// In-process intersection facility over a scrollable document.
///
/// Element rectangles are in document coordinates; the viewport is the window
/// `[scroll_y, scroll_y + height)`. Every change of an observed element's
/// ratio is queued as an [`IntersectionEntry`], in the order it happened.
#[derive(Debug)]
pub struct Viewport {
    width: f64,
    height: f64,
    scroll_y: f64,
    elements: HashMap<TargetId, Rect>,
    observed: HashMap<TargetId, Observed>,
    pending: Vec<IntersectionEntry>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
            elements: HashMap::new(),
            observed: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn root(&self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.width, self.height)
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Add an element to the document.
    pub fn mount(&mut self, target: TargetId, rect: Rect) {
        self.elements.insert(target, rect);
        self.refresh();
    }

    /// Remove an element. Observation of it stops without further reports.
    pub fn unmount(&mut self, target: TargetId) -> bool {
        self.observed.remove(&target);
        self.elements.remove(&target).is_some()
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
        self.refresh();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.refresh();
    }

    /// Current ratio of a mounted element under `margin`.
    pub fn ratio_of(&self, target: TargetId, margin: &RootMargin) -> Option<f64> {
        let rect = self.elements.get(&target)?;
        Some(intersection_ratio(rect, &self.root(), margin))
    }

    fn refresh(&mut self) {
        let root = self.root();
        let mut changed: Vec<(TargetId, f64)> = Vec::new();
        for (target, observed) in &mut self.observed {
            let Some(rect) = self.elements.get(target) else {
                continue;
            };
            let ratio = intersection_ratio(rect, &root, &observed.margin);
            if ratio != observed.last_ratio {
                observed.last_ratio = ratio;
                changed.push((*target, ratio));
            }
        }
        // HashMap order is arbitrary; keep reports stable across runs.
        changed.sort_by_key(|(target, _)| *target);
        self.pending.extend(
            changed
                .into_iter()
                .map(|(target, ratio)| IntersectionEntry { target, ratio }),
        );
    }
}

impl IntersectionSource for Viewport {
    fn is_mounted(&self, target: TargetId) -> bool {
        self.elements.contains_key(&target)
    }

    fn observe(&mut self, target: TargetId, config: &VisibilityConfig) -> Option<f64> {
        let ratio = self.ratio_of(target, &config.root_margin)?;
        self.observed.insert(
            target,
            Observed {
                margin: config.root_margin,
                last_ratio: ratio,
            },
        );
        Some(ratio)
    }

    fn unobserve(&mut self, target: TargetId) {
        self.observed.remove(&target);
        self.pending.retain(|entry| entry.target != target);
    }

    fn take_entries(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::config::Length;

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
    }

    #[test]
    fn intersect_disjoint() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn ratio_fully_inside_and_outside() {
        let root = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let inside = Rect::new(100.0, 100.0, 200.0, 200.0);
        let below = Rect::new(100.0, 900.0, 200.0, 200.0);
        assert_eq!(intersection_ratio(&inside, &root, &RootMargin::ZERO), 1.0);
        assert_eq!(intersection_ratio(&below, &root, &RootMargin::ZERO), 0.0);
    }

    #[test]
    fn ratio_partial() {
        let root = Rect::new(0.0, 0.0, 1000.0, 800.0);
        // Top quarter of the target sits above the fold.
        let target = Rect::new(0.0, 700.0, 100.0, 400.0);
        assert_eq!(intersection_ratio(&target, &root, &RootMargin::ZERO), 0.25);
    }

    #[test]
    fn negative_bottom_margin_shrinks_root() {
        let root = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let margin = RootMargin {
            bottom: Length::Percent(-10.0),
            ..RootMargin::ZERO
        };
        // Sits in the bottom 10% strip: visible without margin, not with.
        let target = Rect::new(0.0, 920.0, 100.0, 50.0);
        assert_eq!(intersection_ratio(&target, &root, &RootMargin::ZERO), 1.0);
        assert_eq!(intersection_ratio(&target, &root, &margin), 0.0);
    }

    #[test]
    fn positive_margin_preloads() {
        let root = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let margin: RootMargin = "50px 0px".parse().unwrap();
        let target = Rect::new(0.0, 830.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(&target, &root, &RootMargin::ZERO), 0.0);
        assert!((intersection_ratio(&target, &root, &margin) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn zero_area_target_on_edge_counts() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        let line = Rect::new(0.0, 100.0, 100.0, 0.0);
        assert_eq!(intersection_ratio(&line, &root, &RootMargin::ZERO), 1.0);
    }

    #[test]
    fn viewport_queues_changes_in_order() {
        let mut vp = Viewport::new(1000.0, 800.0);
        let a = TargetId(1);
        let b = TargetId(2);
        vp.mount(a, Rect::new(0.0, 1000.0, 100.0, 100.0));
        vp.mount(b, Rect::new(0.0, 2000.0, 100.0, 100.0));
        let config = VisibilityConfig {
            root_margin: RootMargin::ZERO,
            ..Default::default()
        };
        assert_eq!(vp.observe(a, &config), Some(0.0));
        assert_eq!(vp.observe(b, &config), Some(0.0));

        vp.scroll_to(400.0);
        vp.scroll_to(1500.0);
        let entries = vp.take_entries();
        assert_eq!(
            entries,
            vec![
                IntersectionEntry { target: a, ratio: 1.0 },
                IntersectionEntry { target: a, ratio: 0.0 },
                IntersectionEntry { target: b, ratio: 1.0 },
            ]
        );
        assert!(vp.take_entries().is_empty());
    }

    #[test]
    fn viewport_unobserve_drops_pending() {
        let mut vp = Viewport::new(1000.0, 800.0);
        let a = TargetId(1);
        vp.mount(a, Rect::new(0.0, 1000.0, 100.0, 100.0));
        vp.observe(a, &VisibilityConfig::default());
        vp.scroll_to(900.0);
        vp.unobserve(a);
        assert!(vp.take_entries().is_empty());
    }

    #[test]
    fn observe_unmounted_is_none() {
        let mut vp = Viewport::new(1000.0, 800.0);
        assert_eq!(vp.observe(TargetId(9), &VisibilityConfig::default()), None);
        assert!(!vp.is_mounted(TargetId(9)));
    }
}

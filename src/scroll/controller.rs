//! Scroll position owner for one axis
//!
//! The controller keeps the scroll offset inside `[0, max_offset]` at all
//! times. Hostile inputs (negative or non-finite extents) are clamped to zero
//! rather than rejected; it performs no drawing.

use std::time::Instant;

use crate::geometry::sanitize;

use super::strategy::{AutoStrategy, ScrollRange, ScrollStrategy};

#[derive(Debug)]
pub struct VirtualScrollController {
    scroll_offset: f64,
    item_extent: f64,
    item_count: usize,
    viewport_extent: f64,
    strategy: Box<dyn ScrollStrategy>,
}

impl VirtualScrollController {
    pub fn new(item_extent: f64, viewport_extent: f64, strategy: Box<dyn ScrollStrategy>) -> Self {
        Self {
            scroll_offset: 0.0,
            item_extent: sanitize(item_extent),
            item_count: 0,
            viewport_extent: sanitize(viewport_extent),
            strategy,
        }
    }

    /// Controller with the default auto-selecting strategy
    pub fn with_defaults(item_extent: f64, viewport_extent: f64) -> Self {
        Self::new(item_extent, viewport_extent, Box::new(AutoStrategy::default()))
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn item_extent(&self) -> f64 {
        self.item_extent
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn viewport_extent(&self) -> f64 {
        self.viewport_extent
    }

    /// Scrollable content extent: `item_count * item_extent`
    pub fn total_extent(&self) -> f64 {
        self.item_count as f64 * self.item_extent
    }

    /// Largest offset that still fills the viewport
    pub fn max_offset(&self) -> f64 {
        (self.total_extent() - self.viewport_extent).max(0.0)
    }

    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;
        self.reclamp();
    }

    pub fn set_item_extent(&mut self, extent: f64) {
        self.item_extent = sanitize(extent);
        self.reclamp();
    }

    pub fn set_viewport_extent(&mut self, extent: f64) {
        self.viewport_extent = sanitize(extent);
        self.reclamp();
    }

    /// Swap the buffering policy
    pub fn set_strategy(&mut self, strategy: Box<dyn ScrollStrategy>) {
        self.strategy = strategy;
    }

    /// Request a new offset. Returns the offset actually stored, which may
    /// differ from the request after clamping.
    pub fn set_scroll_offset(&mut self, offset: f64) -> f64 {
        self.set_scroll_offset_at(offset, Instant::now())
    }

    /// Like [`set_scroll_offset`](Self::set_scroll_offset) with an explicit
    /// timestamp for speed tracking
    pub fn set_scroll_offset_at(&mut self, offset: f64, at: Instant) -> f64 {
        let clamped = if offset.is_finite() {
            offset.clamp(0.0, self.max_offset())
        } else {
            self.scroll_offset
        };
        self.scroll_offset = clamped;
        self.strategy.observe(clamped, at);
        clamped
    }

    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        let target = self.scroll_offset + if delta.is_finite() { delta } else { 0.0 };
        self.set_scroll_offset(target)
    }

    /// Scroll so that `index` is the first fully visible item
    pub fn scroll_to_index(&mut self, index: usize) -> f64 {
        self.set_scroll_offset(index as f64 * self.item_extent)
    }

    /// Buffered range of items to paint at the current offset
    pub fn visible_range(&mut self) -> ScrollRange {
        self.strategy.compute_range(
            self.scroll_offset,
            self.viewport_extent,
            self.item_count,
            self.item_extent,
        )
    }

    fn reclamp(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_offset());
    }
}

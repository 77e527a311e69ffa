//! Visible-range strategies
//!
//! A strategy maps `(offset, viewport extent, item count, item extent)` to a
//! half-open index range, padded by a buffer of off-screen items so that
//! rows just outside the viewport are already painted when they scroll in.

use std::collections::VecDeque;
use std::time::Instant;

use crate::geometry::sanitize;

/// Default number of off-screen items painted on each side
pub const DEFAULT_BUFFER: usize = 5;
/// Item count at which [`AutoStrategy`] switches to adaptive buffering
pub const DEFAULT_AUTO_THRESHOLD: usize = 1000;
/// Number of scroll-speed samples the adaptive strategy averages
pub const SPEED_SAMPLES: usize = 5;

/// Half-open index range `[start, end)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollRange {
    pub start: usize,
    pub end: usize,
}

impl ScrollRange {
    pub const EMPTY: ScrollRange = ScrollRange { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Policy mapping a scroll position to the items that should be painted
pub trait ScrollStrategy: std::fmt::Debug {
    /// Compute `[start, end)` with `0 <= start <= end <= item_count`
    fn compute_range(
        &mut self,
        scroll_offset: f64,
        viewport_extent: f64,
        item_count: usize,
        item_extent: f64,
    ) -> ScrollRange;

    /// Record a scroll position change; strategies that track speed use it
    fn observe(&mut self, _scroll_offset: f64, _at: Instant) {}
}

/// Unbuffered visible window, then padded by `buffer` on both ends
fn buffered_range(
    scroll_offset: f64,
    viewport_extent: f64,
    item_count: usize,
    item_extent: f64,
    buffer: usize,
) -> ScrollRange {
    let item_extent = sanitize(item_extent);
    if item_count == 0 || item_extent == 0.0 {
        return ScrollRange::EMPTY;
    }
    let offset = sanitize(scroll_offset);
    let viewport = sanitize(viewport_extent);

    let visible = (viewport / item_extent).ceil() as usize;
    let start = ((offset / item_extent).floor() as usize).min(item_count);
    let end = start.saturating_add(visible).min(item_count);

    ScrollRange {
        start: start.saturating_sub(buffer),
        end: end.saturating_add(buffer).min(item_count),
    }
}

/// Constant buffer on each side of the visible window
#[derive(Debug, Clone)]
pub struct FixedBuffer {
    pub buffer: usize,
}

impl FixedBuffer {
    pub fn new(buffer: usize) -> Self {
        Self { buffer }
    }

    /// No off-screen rows at all
    pub fn unbuffered() -> Self {
        Self { buffer: 0 }
    }
}

impl Default for FixedBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl ScrollStrategy for FixedBuffer {
    fn compute_range(
        &mut self,
        scroll_offset: f64,
        viewport_extent: f64,
        item_count: usize,
        item_extent: f64,
    ) -> ScrollRange {
        buffered_range(scroll_offset, viewport_extent, item_count, item_extent, self.buffer)
    }
}

/// Buffer that grows with recent scroll speed.
///
/// Speed is averaged over the last [`SPEED_SAMPLES`] observations in px/ms:
/// up to 1 keeps the base buffer, up to 2 doubles it, faster triples it.
#[derive(Debug, Clone)]
pub struct AdaptiveBuffer {
    pub base_buffer: usize,
    samples: VecDeque<f64>,
    last: Option<(f64, Instant)>,
}

impl AdaptiveBuffer {
    pub fn new(base_buffer: usize) -> Self {
        Self {
            base_buffer,
            samples: VecDeque::with_capacity(SPEED_SAMPLES),
            last: None,
        }
    }

    /// Mean of the recorded speed samples (px/ms)
    pub fn average_speed(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn multiplier(&self) -> usize {
        let speed = self.average_speed();
        if speed <= 1.0 {
            1
        } else if speed <= 2.0 {
            2
        } else {
            3
        }
    }

    pub fn effective_buffer(&self) -> usize {
        self.base_buffer.saturating_mul(self.multiplier())
    }

    /// Push a raw speed sample, dropping the oldest beyond the window
    pub fn record_speed(&mut self, px_per_ms: f64) {
        if self.samples.len() == SPEED_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(sanitize(px_per_ms));
    }
}

impl Default for AdaptiveBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl ScrollStrategy for AdaptiveBuffer {
    fn compute_range(
        &mut self,
        scroll_offset: f64,
        viewport_extent: f64,
        item_count: usize,
        item_extent: f64,
    ) -> ScrollRange {
        buffered_range(
            scroll_offset,
            viewport_extent,
            item_count,
            item_extent,
            self.effective_buffer(),
        )
    }

    fn observe(&mut self, scroll_offset: f64, at: Instant) {
        if let Some((prev_offset, prev_at)) = self.last {
            let elapsed_ms = at.saturating_duration_since(prev_at).as_secs_f64() * 1000.0;
            if elapsed_ms > 0.0 {
                self.record_speed((scroll_offset - prev_offset).abs() / elapsed_ms);
            }
        }
        self.last = Some((scroll_offset, at));
    }
}

/// Fixed buffering for small datasets, adaptive from `threshold` items on
#[derive(Debug, Clone)]
pub struct AutoStrategy {
    pub threshold: usize,
    fixed: FixedBuffer,
    adaptive: AdaptiveBuffer,
}

impl AutoStrategy {
    pub fn new(threshold: usize, buffer: usize) -> Self {
        Self {
            threshold,
            fixed: FixedBuffer::new(buffer),
            adaptive: AdaptiveBuffer::new(buffer),
        }
    }

    pub fn uses_adaptive(&self, item_count: usize) -> bool {
        item_count >= self.threshold
    }
}

impl Default for AutoStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_THRESHOLD, DEFAULT_BUFFER)
    }
}

impl ScrollStrategy for AutoStrategy {
    fn compute_range(
        &mut self,
        scroll_offset: f64,
        viewport_extent: f64,
        item_count: usize,
        item_extent: f64,
    ) -> ScrollRange {
        if self.uses_adaptive(item_count) {
            self.adaptive
                .compute_range(scroll_offset, viewport_extent, item_count, item_extent)
        } else {
            self.fixed
                .compute_range(scroll_offset, viewport_extent, item_count, item_extent)
        }
    }

    fn observe(&mut self, scroll_offset: f64, at: Instant) {
        // Keep the speed history warm so switching over is seamless
        self.adaptive.observe(scroll_offset, at);
    }
}

/// Strategy selection, as written in configuration files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Fixed,
    Adaptive,
    #[default]
    Auto,
}

impl StrategyKind {
    pub fn build(self, buffer: usize, auto_threshold: usize) -> Box<dyn ScrollStrategy> {
        match self {
            StrategyKind::Fixed => Box::new(FixedBuffer::new(buffer)),
            StrategyKind::Adaptive => Box::new(AdaptiveBuffer::new(buffer)),
            StrategyKind::Auto => Box::new(AutoStrategy::new(auto_threshold, buffer)),
        }
    }
}

//! Virtual scrolling tests - range bounds, clamping, strategies

use std::time::{Duration, Instant};

use gridcanvas::scroll::{
    AdaptiveBuffer, AutoStrategy, FixedBuffer, ScrollRange, ScrollStrategy, StrategyKind,
    VirtualScrollController,
};

fn controller(count: usize, strategy: Box<dyn ScrollStrategy>) -> VirtualScrollController {
    let mut c = VirtualScrollController::new(36.0, 500.0, strategy);
    c.set_item_count(count);
    c
}

// ========================================================================
// Range bounds
// ========================================================================

#[test]
fn test_range_stays_within_item_count() {
    let offsets = [0.0, 1.0, 35.9, 36.0, 1234.5, 35_999.0, 1e12, -50.0, f64::NAN, f64::INFINITY];
    for count in [0usize, 1, 2, 13, 14, 1000, 5000] {
        for buffer in [0usize, 1, 5, 50] {
            let mut strategy = FixedBuffer::new(buffer);
            for &offset in &offsets {
                let range = strategy.compute_range(offset, 500.0, count, 36.0);
                assert!(range.start <= range.end, "{:?} for offset {}", range, offset);
                assert!(range.end <= count, "{:?} exceeds {}", range, count);
            }
        }
    }
}

#[test]
fn test_visible_window_is_covered() {
    let mut c = controller(1000, Box::new(FixedBuffer::unbuffered()));
    c.set_scroll_offset(3600.0);
    let range = c.visible_range();
    assert_eq!(range.start, 100);
    // 500 / 36 rounds up to 14 rows
    assert_eq!(range.end, 114);
}

#[test]
fn test_buffer_extends_both_sides() {
    let mut c = controller(1000, Box::new(FixedBuffer::new(5)));
    c.set_scroll_offset(3600.0);
    assert_eq!(c.visible_range(), ScrollRange::new(95, 119));

    c.set_scroll_offset(0.0);
    assert_eq!(c.visible_range(), ScrollRange::new(0, 19));
}

#[test]
fn test_empty_collection_gives_empty_range() {
    let mut c = controller(0, Box::new(FixedBuffer::default()));
    assert!(c.visible_range().is_empty());
    assert_eq!(c.set_scroll_offset(500.0), 0.0);
}

#[test]
fn test_non_positive_item_extent_gives_empty_range() {
    for extent in [0.0, -10.0, f64::NAN] {
        let mut c = VirtualScrollController::new(extent, 500.0, Box::new(FixedBuffer::default()));
        c.set_item_count(100);
        assert_eq!(c.visible_range(), ScrollRange::EMPTY);
        assert_eq!(c.max_offset(), 0.0);
    }
}

// ========================================================================
// Offset clamping
// ========================================================================

#[test]
fn test_offset_is_clamped_to_content() {
    let mut c = controller(100, Box::new(FixedBuffer::unbuffered()));
    // 100 * 36 - 500
    assert_eq!(c.max_offset(), 3100.0);
    assert_eq!(c.set_scroll_offset(-20.0), 0.0);
    assert_eq!(c.set_scroll_offset(10_000.0), 3100.0);
    assert_eq!(c.scroll_offset(), 3100.0);
}

#[test]
fn test_clamping_is_idempotent() {
    let mut c = controller(100, Box::new(FixedBuffer::unbuffered()));
    for request in [-1.0, 0.0, 17.5, 3099.0, 3100.0, 99_999.0] {
        let first = c.set_scroll_offset(request);
        let second = c.set_scroll_offset(first);
        assert_eq!(first, second);
    }
}

#[test]
fn test_non_finite_offset_keeps_position() {
    let mut c = controller(100, Box::new(FixedBuffer::unbuffered()));
    c.set_scroll_offset(720.0);
    assert_eq!(c.set_scroll_offset(f64::NAN), 720.0);
    assert_eq!(c.scroll_by(f64::NEG_INFINITY), 720.0);
}

#[test]
fn test_shrinking_content_reclamps_offset() {
    let mut c = controller(100, Box::new(FixedBuffer::unbuffered()));
    c.set_scroll_offset(3100.0);
    c.set_item_count(20);
    // 20 * 36 - 500
    assert_eq!(c.scroll_offset(), 220.0);
    c.set_item_count(5);
    assert_eq!(c.scroll_offset(), 0.0);
}

#[test]
fn test_content_smaller_than_viewport_cannot_scroll() {
    let mut c = controller(3, Box::new(FixedBuffer::unbuffered()));
    assert_eq!(c.max_offset(), 0.0);
    assert_eq!(c.scroll_by(200.0), 0.0);
    assert_eq!(c.visible_range(), ScrollRange::new(0, 3));
}

#[test]
fn test_scroll_to_index() {
    let mut c = controller(100, Box::new(FixedBuffer::unbuffered()));
    assert_eq!(c.scroll_to_index(10), 360.0);
    assert_eq!(c.visible_range().start, 10);
    assert_eq!(c.scroll_to_index(1000), 3100.0);
}

// ========================================================================
// Strategies
// ========================================================================

#[test]
fn test_adaptive_buffer_grows_with_speed() {
    let mut strategy = AdaptiveBuffer::new(5);
    assert_eq!(strategy.effective_buffer(), 5);

    let start = Instant::now();
    let mut offset = 0.0;
    for i in 1..=5 {
        // 3 px/ms
        offset += 30.0;
        strategy.observe(offset, start + Duration::from_millis(10 * i));
    }
    assert!(strategy.average_speed() > 2.0);
    assert_eq!(strategy.effective_buffer(), 15);

    let range = strategy.compute_range(3600.0, 500.0, 1000, 36.0);
    assert_eq!(range, ScrollRange::new(85, 129));
}

#[test]
fn test_auto_strategy_switches_on_threshold() {
    let strategy = AutoStrategy::new(1000, 5);
    assert!(!strategy.uses_adaptive(999));
    assert!(strategy.uses_adaptive(1000));
}

#[test]
fn test_strategy_kind_builds_each_policy() {
    for kind in [StrategyKind::Fixed, StrategyKind::Adaptive, StrategyKind::Auto] {
        let mut c = controller(50, kind.build(2, 1000));
        let range = c.visible_range();
        assert_eq!(range, ScrollRange::new(0, 16), "{:?}", kind);
    }
}

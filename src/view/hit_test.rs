//! Hit-testing against the most recent geometry cache
//!
//! Pointer handling is split in two steps:
//! 1. `hit_test_grid()` resolves a device-pixel point to a [`HitTarget`]
//! 2. The dispatcher matches on the target to decide which events to emit
//!
//! A linear scan is enough: the cache holds one viewport's worth of cells.
//! Entries are scanned in reverse paint order so that pinned columns, which
//! paint last, win over the scrolling cells they occlude.

use crate::geometry::Point;

use super::cache::{Cell, CellRef, GeometryCache};

/// What lies under a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A column header
    Header { col: usize },
    /// A body cell
    Cell(CellRef),
}

/// Topmost body cell containing `point`
pub fn hit_test(cache: &GeometryCache, point: Point) -> Option<&Cell> {
    cache
        .cells()
        .iter()
        .rev()
        .find(|cell| cell.rect.contains_point(point))
}

/// Column index of the header cell containing `point`
pub fn hit_test_header(cache: &GeometryCache, point: Point) -> Option<usize> {
    cache
        .headers()
        .iter()
        .rev()
        .find(|header| header.rect.contains_point(point))
        .map(|header| header.col)
}

/// Header first, then body
pub fn hit_test_grid(cache: &GeometryCache, point: Point) -> Option<HitTarget> {
    if let Some(col) = hit_test_header(cache, point) {
        return Some(HitTarget::Header { col });
    }
    hit_test(cache, point).map(|cell| HitTarget::Cell(cell.cell_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::Record;

    #[test]
    fn test_empty_cache_misses() {
        let cache = GeometryCache::new();
        assert!(hit_test(&cache, Point::new(1.0, 1.0)).is_none());
        assert!(hit_test_grid(&cache, Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_later_entries_win_on_overlap() {
        let mut cache = GeometryCache::new();
        cache.begin_pass();
        let row = Record::new(1).into_ref();
        let under = Rect::new(0.0, 0.0, 100.0, 20.0);
        let pinned = Rect::new(0.0, 0.0, 40.0, 20.0);
        cache.push_cell(0, 1, under, under, row.clone(), "scrolling");
        cache.push_cell(0, 0, pinned, pinned, row, "pinned");

        assert_eq!(hit_test(&cache, Point::new(10.0, 10.0)).map(|c| c.col), Some(0));
        assert_eq!(hit_test(&cache, Point::new(60.0, 10.0)).map(|c| c.col), Some(1));
        // Right/bottom edges are exclusive
        assert!(hit_test(&cache, Point::new(100.0, 10.0)).is_none());
    }

    #[test]
    fn test_header_takes_priority() {
        let mut cache = GeometryCache::new();
        cache.begin_pass();
        let r = Rect::new(0.0, 0.0, 50.0, 30.0);
        cache.push_header(3, r, r, "name");
        assert_eq!(
            hit_test_grid(&cache, Point::new(5.0, 5.0)),
            Some(HitTarget::Header { col: 3 })
        );
    }
}

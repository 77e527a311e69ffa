//! Horizontal column placement
//!
//! Columns are laid out as fixed-left, scrolling, fixed-right. Scrolling
//! columns shift by the horizontal scroll offset inside the region left
//! between the pinned groups. All values are device pixels.

use crate::model::{Column, Fixed};

/// One column's placement in the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSlot {
    /// Index into the column list
    pub column: usize,
    /// Left edge of the full (unclipped) column
    pub x: f32,
    pub width: f32,
    pub fixed: Fixed,
    /// Horizontal span where this column may paint
    pub clip_left: f32,
    pub clip_right: f32,
}

impl ColumnSlot {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Visible horizontal span `(left, right)`
    pub fn visible_span(&self) -> (f32, f32) {
        (self.x.max(self.clip_left), self.right().min(self.clip_right))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    /// Visible columns in paint order: scrolling first, then pinned
    pub slots: Vec<ColumnSlot>,
    /// Sum of column widths after any stretch
    pub total_width: f32,
    /// Width actually covered by columns inside the viewport
    pub content_width: f32,
    /// Horizontal scroll offset after clamping
    pub scroll_left: f32,
    pub max_scroll_left: f32,
}

impl ColumnLayout {
    /// Place `columns` in a viewport `viewport_width` wide.
    ///
    /// Column widths are logical and scaled by `dpr`; `scroll_left` is in
    /// device pixels and clamped to the scrollable range.
    pub fn compute(columns: &[Column], viewport_width: f32, scroll_left: f32, dpr: f32) -> Self {
        let viewport_width = sanitize_f32(viewport_width);
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        if columns.is_empty() || viewport_width == 0.0 {
            return Self::default();
        }

        let order = layout_order(columns);
        let mut widths: Vec<f32> = columns.iter().map(|c| sanitize_f32(c.width) * dpr).collect();
        let declared: f32 = widths.iter().sum();

        // Stretch only when the declared widths fall strictly short
        if declared < viewport_width {
            let target = order
                .iter()
                .rev()
                .find(|&&i| columns[i].fixed == Fixed::None)
                .or_else(|| order.last())
                .copied();
            if let Some(i) = target {
                widths[i] += viewport_width - declared;
            }
        }
        let total_width: f32 = widths.iter().sum();

        let group_width = |fixed: Fixed| -> f32 {
            order
                .iter()
                .filter(|&&i| columns[i].fixed == fixed)
                .map(|&i| widths[i])
                .sum()
        };
        let left_width = group_width(Fixed::Left);
        let right_width = group_width(Fixed::Right);
        let scroll_width = group_width(Fixed::None);

        let region_left = left_width.min(viewport_width);
        let region_right = (viewport_width - right_width).max(region_left);
        let max_scroll_left = (scroll_width - (region_right - region_left)).max(0.0);
        let scroll_left = sanitize_f32(scroll_left).min(max_scroll_left);

        let mut scrolling = Vec::new();
        let mut pinned_left = Vec::new();
        let mut pinned_right = Vec::new();
        let (mut left_x, mut scroll_x) = (0.0f32, 0.0f32);
        let mut right_x = viewport_width - right_width;

        for &i in &order {
            let width = widths[i];
            let slot = match columns[i].fixed {
                Fixed::Left => {
                    let slot = ColumnSlot {
                        column: i,
                        x: left_x,
                        width,
                        fixed: Fixed::Left,
                        clip_left: 0.0,
                        clip_right: viewport_width,
                    };
                    left_x += width;
                    slot
                }
                Fixed::None => {
                    let slot = ColumnSlot {
                        column: i,
                        x: region_left + scroll_x - scroll_left,
                        width,
                        fixed: Fixed::None,
                        clip_left: region_left,
                        clip_right: region_right,
                    };
                    scroll_x += width;
                    slot
                }
                Fixed::Right => {
                    let slot = ColumnSlot {
                        column: i,
                        x: right_x,
                        width,
                        fixed: Fixed::Right,
                        clip_left: 0.0,
                        clip_right: viewport_width,
                    };
                    right_x += width;
                    slot
                }
            };

            let (vis_left, vis_right) = slot.visible_span();
            // Skip columns starting at/after the viewport edge or fully hidden
            if slot.x >= viewport_width || vis_left >= vis_right {
                continue;
            }
            match slot.fixed {
                Fixed::None => scrolling.push(slot),
                Fixed::Left => pinned_left.push(slot),
                Fixed::Right => pinned_right.push(slot),
            }
        }

        let mut slots = scrolling;
        slots.extend(pinned_left);
        slots.extend(pinned_right);

        let content_width = slots
            .iter()
            .map(|s| s.visible_span().1)
            .fold(0.0f32, f32::max);

        Self {
            slots,
            total_width,
            content_width,
            scroll_left,
            max_scroll_left,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, column: usize) -> Option<&ColumnSlot> {
        self.slots.iter().find(|s| s.column == column)
    }
}

/// Column indices in layout order: fixed-left, scrolling, fixed-right
pub fn layout_order(columns: &[Column]) -> Vec<usize> {
    let group = |fixed: Fixed| {
        columns
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.fixed == fixed)
            .map(|(i, _)| i)
    };
    group(Fixed::Left)
        .chain(group(Fixed::None))
        .chain(group(Fixed::Right))
        .collect()
}

fn sanitize_f32(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

//! Pointer input state machine
//!
//! Turns device-pixel pointer input into [`TableEvent`]s by hit-testing the
//! most recent geometry cache. The dispatcher tracks the hovered and the
//! selected cell plus the single highlighted cell, and reports highlight
//! moves so the owner can repaint just the two affected cells.
//!
//! It never touches scroll state: wheel input is forwarded as a
//! [`TableEvent::Scroll`] for the owner to act on.

use std::time::{Duration, Instant};

use crate::events::{CellEvent, TableEvent};
use crate::geometry::Point;
use crate::view::{hit_test_grid, Cell, CellRef, GeometryCache, HitTarget};

/// Default interval for two presses to count as a double-click
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(300);

/// Raw pointer input in device pixels relative to the surface origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Move(Point),
    Leave,
    /// Button press; classified into click or double-click by timing
    Press { pos: Point, at: Instant },
    Click(Point),
    DoubleClick(Point),
    Wheel { delta_x: f64, delta_y: f64 },
}

/// Cells whose highlight state changed, in repaint order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightChange {
    /// Repaint without highlight
    pub clear: Option<CellRef>,
    /// Repaint with highlight
    pub apply: Option<CellRef>,
}

impl HighlightChange {
    pub fn is_none(&self) -> bool {
        self.clear.is_none() && self.apply.is_none()
    }
}

/// Outcome of one input
#[derive(Debug, Clone, Default)]
pub struct Dispatch {
    /// Events in emission order
    pub events: Vec<TableEvent>,
    pub highlight: HighlightChange,
}

/// Double-click detection on raw presses
#[derive(Debug, Clone)]
pub struct ClickTracker {
    interval: Duration,
    last: Option<(CellRef, Instant)>,
    click_count: u32,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_INTERVAL)
    }
}

impl ClickTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
            click_count: 0,
        }
    }

    /// Update click count based on timing and position.
    ///
    /// Returns 1 for a single click and 2 for the second press on the same
    /// cell within the interval; a third press starts over at 1.
    pub fn track_click(&mut self, cell: CellRef, at: Instant) -> u32 {
        let is_repeat = match self.last {
            Some((last_cell, last_at)) => {
                last_cell == cell && at.saturating_duration_since(last_at) < self.interval
            }
            None => false,
        };

        self.click_count = if is_repeat && self.click_count == 1 { 2 } else { 1 };
        self.last = Some((cell, at));
        self.click_count
    }

    pub fn reset(&mut self) {
        self.click_count = 0;
        self.last = None;
    }
}

#[derive(Debug, Default)]
pub struct InteractionDispatcher {
    hover: Option<CellEvent>,
    selected: Option<CellRef>,
    highlighted: Option<CellRef>,
    clicks: ClickTracker,
}

impl InteractionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_double_click_interval(interval: Duration) -> Self {
        Self {
            clicks: ClickTracker::new(interval),
            ..Self::default()
        }
    }

    pub fn hovered(&self) -> Option<CellRef> {
        self.hover.as_ref().map(|h| h.cell)
    }

    pub fn selected(&self) -> Option<CellRef> {
        self.selected
    }

    /// Cell currently painted with the highlight tint
    pub fn highlighted(&self) -> Option<CellRef> {
        self.highlighted
    }

    /// Forget all pointer state, e.g. after the row set changed underneath.
    ///
    /// Returns the `HoverLeave` owed for a cell the pointer was still over,
    /// so the owner can close the pair before any later enter.
    pub fn reset(&mut self) -> Option<TableEvent> {
        self.selected = None;
        self.highlighted = None;
        self.clicks.reset();
        self.hover.take().map(TableEvent::HoverLeave)
    }

    pub fn dispatch(&mut self, cache: &GeometryCache, input: PointerInput) -> Dispatch {
        let mut out = Dispatch::default();
        match input {
            PointerInput::Move(pos) => self.pointer_move(cache, pos, &mut out),
            PointerInput::Leave => {
                if let Some(old) = self.hover.take() {
                    out.events.push(TableEvent::HoverLeave(old));
                }
                self.move_highlight(None, &mut out);
            }
            PointerInput::Press { pos, at } => match hit_test_grid(cache, pos) {
                Some(HitTarget::Cell(cell)) => {
                    if self.clicks.track_click(cell, at) == 2 {
                        self.double_click(cache, pos, &mut out);
                    } else {
                        self.click(cache, pos, &mut out);
                    }
                }
                Some(HitTarget::Header { .. }) => {
                    self.clicks.reset();
                    self.click(cache, pos, &mut out);
                }
                None => self.clicks.reset(),
            },
            PointerInput::Click(pos) => self.click(cache, pos, &mut out),
            PointerInput::DoubleClick(pos) => self.double_click(cache, pos, &mut out),
            PointerInput::Wheel { delta_x, delta_y } => {
                let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
                out.events.push(TableEvent::Scroll {
                    delta_x: finite(delta_x),
                    delta_y: finite(delta_y),
                });
            }
        }
        out
    }

    fn pointer_move(&mut self, cache: &GeometryCache, pos: Point, out: &mut Dispatch) {
        let target = match hit_test_grid(cache, pos) {
            Some(HitTarget::Cell(cell)) => cache.get(cell),
            _ => None,
        };
        let target_ref = target.map(Cell::cell_ref);
        if target_ref == self.hovered() {
            return;
        }

        // Leave strictly before enter
        if let Some(old) = self.hover.take() {
            out.events.push(TableEvent::HoverLeave(old));
        }
        if let Some(cell) = target {
            let event = cell_event(cell);
            self.hover = Some(event.clone());
            out.events.push(TableEvent::HoverEnter(event));
        }
        self.move_highlight(target_ref, out);
    }

    fn click(&mut self, cache: &GeometryCache, pos: Point, out: &mut Dispatch) {
        match hit_test_grid(cache, pos) {
            Some(HitTarget::Header { col }) => {
                let column_key = cache
                    .headers()
                    .iter()
                    .find(|h| h.col == col)
                    .map(|h| h.column_key.clone())
                    .unwrap_or_default();
                out.events.push(TableEvent::HeaderClick { col, column_key });
            }
            Some(HitTarget::Cell(cell_ref)) => {
                if let Some(cell) = cache.get(cell_ref) {
                    self.selected = Some(cell_ref);
                    out.events.push(TableEvent::CellClick(cell_event(cell)));
                    self.move_highlight(Some(cell_ref), out);
                }
            }
            None => {}
        }
    }

    fn double_click(&mut self, cache: &GeometryCache, pos: Point, out: &mut Dispatch) {
        if let Some(HitTarget::Cell(cell_ref)) = hit_test_grid(cache, pos) {
            if let Some(cell) = cache.get(cell_ref) {
                out.events.push(TableEvent::CellDoubleClick(cell_event(cell)));
            }
        }
    }

    fn move_highlight(&mut self, to: Option<CellRef>, out: &mut Dispatch) {
        if self.highlighted == to {
            return;
        }
        out.highlight = HighlightChange {
            clear: self.highlighted,
            apply: to,
        };
        self.highlighted = to;
    }
}

fn cell_event(cell: &Cell) -> CellEvent {
    CellEvent {
        cell: cell.cell_ref(),
        row: cell.row_data.clone(),
        column_key: cell.column_key.clone(),
        rect: cell.rect,
    }
}

//! Immediate-mode grid renderer
//!
//! One [`FrameRenderer::render`] call paints a complete, consistent frame:
//!
//! 1. new cache generation, surface cleared to the background color
//! 2. header row: background, titles, sort/filter glyphs, bottom border
//! 3. body rows in the visible range, one cache entry per painted cell
//! 4. cell separators, confined to the columns actually laid out
//! 5. selection tint on selected rows, highlight tint on one cell
//! 6. optional footer line
//!
//! Steps 3 to 5 run per cell, clipped to the cell's visible rectangle, so a
//! single cell can be repainted later without touching its neighbours.
//!
//! Everything is painted in device pixels. Scroll offsets and spacing come
//! in logical pixels and are multiplied by the device pixel ratio here.

use crate::geometry::{sanitize, Rect};
use crate::model::{Align, Column, RowData, RowRef, SelectionSet};
use crate::pipeline::{FilterState, SortDirection, SortState};
use crate::scroll::ScrollRange;
use crate::theme::{FontStyle, Spacing, Theme};

use super::cache::{CellRef, GeometryCache};
use super::frame::Frame;
use super::layout::{layout_order, ColumnLayout};
use super::text::{fit_text, TextRenderer};

/// Spacing scaled to device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub dpr: f32,
    pub header_height: f32,
    pub row_height: f32,
    pub border: f32,
    pub padding: f32,
}

impl GridMetrics {
    pub fn new(spacing: &Spacing, dpr: f32) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let scale = |v: f32| if v.is_finite() { v.max(0.0) * dpr } else { 0.0 };
        Self {
            dpr,
            header_height: scale(spacing.header_height),
            row_height: scale(spacing.cell_height),
            border: scale(spacing.border_width),
            padding: scale(spacing.padding),
        }
    }

    /// Footer bar height, one body row tall
    pub fn footer_height(&self) -> f32 {
        self.row_height
    }

    /// Side length of the sort/filter glyphs
    fn glyph_size(&self) -> f32 {
        (self.header_height * 0.28).max(4.0)
    }
}

/// Inputs of one render pass
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    /// All rows after the pipeline; indices into this slice are row indices
    pub rows: &'a [RowRef],
    /// Tree depth per row; empty for flat data
    pub depths: &'a [usize],
    /// Rows to paint, usually the scroll controller's visible range
    pub range: ScrollRange,
    pub columns: &'a [Column],
    pub theme: &'a Theme,
    pub selection: &'a SelectionSet,
    pub highlighted: Option<CellRef>,
    pub sort: Option<&'a SortState>,
    pub filter: Option<&'a FilterState>,
    pub striped: bool,
    /// Vertical scroll offset in logical pixels
    pub scroll_top: f64,
    /// Horizontal scroll offset in logical pixels
    pub scroll_left: f64,
    pub dpr: f32,
    /// Text for the footer line; no footer when `None`
    pub footer: Option<&'a str>,
}

impl<'a> RenderParams<'a> {
    /// Paint every row from the top, unstriped, at 1x
    pub fn new(rows: &'a [RowRef], columns: &'a [Column], theme: &'a Theme, selection: &'a SelectionSet) -> Self {
        Self {
            rows,
            depths: &[],
            range: ScrollRange::new(0, rows.len()),
            columns,
            theme,
            selection,
            highlighted: None,
            sort: None,
            filter: None,
            striped: false,
            scroll_top: 0.0,
            scroll_left: 0.0,
            dpr: 1.0,
            footer: None,
        }
    }

    fn depth(&self, row: usize) -> usize {
        self.depths.get(row).copied().unwrap_or(0)
    }
}

/// Everything needed to paint one body cell
struct CellPaint<'p> {
    column: &'p Column,
    row: &'p dyn RowData,
    row_index: usize,
    indent: f32,
    bounds: Rect,
    rect: Rect,
    selected: bool,
    highlighted: bool,
}

#[derive(Debug)]
pub struct FrameRenderer {
    text: Box<dyn TextRenderer>,
    cache: GeometryCache,
    layout: ColumnLayout,
}

impl FrameRenderer {
    pub fn new(text: Box<dyn TextRenderer>) -> Self {
        Self {
            text,
            cache: GeometryCache::new(),
            layout: ColumnLayout::default(),
        }
    }

    /// Geometry of the most recent pass
    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Column layout of the most recent pass
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn text_mut(&mut self) -> &mut dyn TextRenderer {
        self.text.as_mut()
    }

    /// Drop cached geometry, e.g. on destroy
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.layout = ColumnLayout::default();
    }

    /// Paint one frame. Without a frame nothing is drawn, but the cache is
    /// still reset so that hit-testing cannot see stale cells.
    pub fn render(&mut self, frame: Option<&mut Frame>, params: &RenderParams) {
        let generation = self.cache.begin_pass();
        let Some(frame) = frame else {
            self.layout = ColumnLayout::default();
            tracing::debug!(generation, "render skipped: no surface");
            return;
        };

        let theme = params.theme;
        let m = GridMetrics::new(&theme.spacing, params.dpr);
        let (vw, vh) = (frame.width() as f32, frame.height() as f32);

        frame.clear_clip();
        frame.clear(theme.colors.background.to_argb_u32());

        self.layout = ColumnLayout::compute(params.columns, vw, params.scroll_left as f32 * m.dpr, m.dpr);
        if self.layout.is_empty() || vh == 0.0 {
            tracing::debug!(generation, columns = params.columns.len(), "render: nothing to lay out");
            return;
        }

        let footer_h = if params.footer.is_some() {
            m.footer_height().min(vh)
        } else {
            0.0
        };
        let header_h = m.header_height.min(vh - footer_h);
        let body = Rect::new(0.0, header_h, vw, (vh - header_h - footer_h).max(0.0));

        let Self { text, cache, layout } = self;
        let text = text.as_mut();

        paint_header(frame, text, cache, layout, params, &m, header_h);
        let painted_rows = paint_body(frame, text, cache, layout, params, &m, body);

        if let Some(footer) = params.footer {
            paint_footer(frame, text, footer, theme, &m, Rect::new(0.0, vh - footer_h, vw, footer_h));
        }
        frame.clear_clip();

        #[cfg(feature = "geometry-debug")]
        for cell in cache.cells() {
            frame.stroke_rect(cell.rect, 1.0, 0xFFFF_00FF);
        }

        tracing::debug!(
            generation,
            rows = painted_rows,
            cells = cache.len(),
            range_start = params.range.start,
            range_end = params.range.end,
            "render pass"
        );
    }

    /// Repaint `cell` with the highlight tint. Returns false when the cell
    /// is not in the current cache or there is no frame.
    pub fn apply_highlight(&mut self, frame: Option<&mut Frame>, cell: CellRef, params: &RenderParams) -> bool {
        self.repaint_cell(frame, cell, params, true)
    }

    /// Repaint `cell` from theme colors, removing any highlight tint
    pub fn clear_highlight(&mut self, frame: Option<&mut Frame>, cell: CellRef, params: &RenderParams) -> bool {
        self.repaint_cell(frame, cell, params, false)
    }

    fn repaint_cell(&mut self, frame: Option<&mut Frame>, cell: CellRef, params: &RenderParams, highlighted: bool) -> bool {
        let Some(frame) = frame else {
            return false;
        };
        let Some(entry) = self.cache.get(cell) else {
            return false;
        };
        let Some(column) = params.columns.get(entry.col) else {
            return false;
        };
        let m = GridMetrics::new(&params.theme.spacing, params.dpr);
        let paint = CellPaint {
            column,
            row: entry.row_data.as_ref(),
            row_index: entry.row,
            indent: indent_for(params, entry.col, entry.row, &m),
            bounds: entry.bounds,
            rect: entry.rect,
            selected: params.selection.contains(entry.row_data.key()),
            highlighted,
        };
        paint_cell(frame, self.text.as_mut(), params, &m, &paint);
        frame.clear_clip();
        true
    }
}

fn paint_header(
    frame: &mut Frame,
    text: &mut dyn TextRenderer,
    cache: &mut GeometryCache,
    layout: &ColumnLayout,
    params: &RenderParams,
    m: &GridMetrics,
    header_h: f32,
) {
    if header_h <= 0.0 {
        return;
    }
    let colors = &params.theme.colors;
    let header_bg = colors.header_background.to_argb_u32();
    let border = colors.border.to_argb_u32();
    let font = params.theme.fonts.header.scaled(m.dpr);

    let width = frame.width() as f32;
    frame.fill_rect(Rect::new(0.0, 0.0, width, header_h), header_bg);

    for slot in &layout.slots {
        let column = &params.columns[slot.column];
        let bounds = Rect::new(slot.x, 0.0, slot.width, header_h);
        let (left, right) = slot.visible_span();
        let rect = Rect::new(left, 0.0, right - left, header_h);

        frame.set_clip(rect);
        frame.fill_rect(bounds, header_bg);

        let glyph = m.glyph_size();
        let gap = m.padding / 2.0;
        let mut glyph_right = bounds.right() - m.padding;
        let mut reserved = 0.0;

        if column.filterable {
            let active = params.filter.is_some_and(|f| f.is_active(&column.key));
            let x = glyph_right - glyph;
            paint_filter_glyph(frame, Rect::new(x, (header_h - glyph) / 2.0, glyph, glyph), active, params.theme);
            glyph_right = x - gap;
            reserved += glyph + gap;
        }
        if column.sortable {
            let direction = params.sort.and_then(|s| s.direction(&column.key));
            let x = glyph_right - glyph;
            paint_sort_glyph(frame, Rect::new(x, (header_h - glyph) / 2.0, glyph, glyph), direction, params.theme);
            reserved += glyph + gap;
        }

        let available = bounds.width - m.padding * 2.0 - reserved;
        let title = fit_text(text, &column.title, available, font);
        let width = text.measure(&title, font);
        let x = aligned_x(column.align, bounds.x + m.padding, available, width);
        let y = (header_h - text.line_height(font)) / 2.0;
        text.draw(frame, x, y, &title, font, colors.header_text.to_argb_u32());

        frame.vline(bounds.right() - m.border, 0.0, header_h, m.border, border);
        cache.push_header(slot.column, rect, bounds, &column.key);
    }

    frame.clear_clip();
    if m.border > 0.0 {
        frame.hline(0.0, header_h - m.border, layout.content_width, m.border, border);
    }
}

/// Returns the number of rows painted
fn paint_body(
    frame: &mut Frame,
    text: &mut dyn TextRenderer,
    cache: &mut GeometryCache,
    layout: &ColumnLayout,
    params: &RenderParams,
    m: &GridMetrics,
    body: Rect,
) -> usize {
    if body.is_empty() || m.row_height <= 0.0 {
        return 0;
    }
    let scroll_top = sanitize(params.scroll_top) as f32 * m.dpr;
    let end = params.range.end.min(params.rows.len());
    let mut painted = 0;

    for row_index in params.range.start..end {
        let y = body.y + row_index as f32 * m.row_height - scroll_top;
        if y >= body.bottom() {
            break;
        }
        if y + m.row_height <= body.y {
            continue;
        }
        let row = &params.rows[row_index];
        let selected = params.selection.contains(row.key());
        painted += 1;

        for slot in &layout.slots {
            let column = &params.columns[slot.column];
            let bounds = Rect::new(slot.x, y, slot.width, m.row_height);
            let (left, right) = slot.visible_span();
            let region = Rect::new(left, body.y, right - left, body.height);
            let Some(rect) = bounds.intersection(&region) else {
                continue;
            };

            let paint = CellPaint {
                column,
                row: row.as_ref(),
                row_index,
                indent: indent_for(params, slot.column, row_index, m),
                bounds,
                rect,
                selected,
                highlighted: params.highlighted == Some(CellRef::new(row_index, slot.column)),
            };
            paint_cell(frame, text, params, m, &paint);
            cache.push_cell(row_index, slot.column, rect, bounds, row.clone(), &column.key);
        }
    }
    painted
}

/// Background, text and separators of one cell, clipped to its visible rect
fn paint_cell(frame: &mut Frame, text: &mut dyn TextRenderer, params: &RenderParams, m: &GridMetrics, cell: &CellPaint) {
    let colors = &params.theme.colors;
    let font = params.theme.fonts.cell.scaled(m.dpr);
    let bounds = cell.bounds;

    frame.set_clip(cell.rect);
    let background = if params.striped && cell.row_index % 2 == 1 && !cell.selected {
        colors.stripe
    } else {
        colors.background
    };
    frame.fill_rect(bounds, background.to_argb_u32());

    let content = cell.column.display(cell.row);
    let available = bounds.width - m.padding * 2.0 - cell.indent;
    let fitted = fit_text(text, &content, available, font);
    let width = text.measure(&fitted, font);
    let x = aligned_x(cell.column.align, bounds.x + m.padding + cell.indent, available, width);
    let y = bounds.y + (bounds.height - text.line_height(font)) / 2.0;
    text.draw(frame, x, y, &fitted, font, colors.text.to_argb_u32());

    if m.border > 0.0 {
        let border = colors.border.to_argb_u32();
        frame.hline(bounds.x, bounds.bottom() - m.border, bounds.width, m.border, border);
        frame.vline(bounds.right() - m.border, bounds.y, bounds.height, m.border, border);
    }

    if cell.selected {
        frame.fill_rect_blended(cell.rect, colors.selected.to_argb_u32());
    }
    if cell.highlighted {
        frame.fill_rect_blended(cell.rect, colors.hover.to_argb_u32());
    }
}

fn paint_footer(frame: &mut Frame, text: &mut dyn TextRenderer, content: &str, theme: &Theme, m: &GridMetrics, rect: Rect) {
    if rect.is_empty() {
        return;
    }
    let font: FontStyle = theme.fonts.footer.scaled(m.dpr);
    frame.clear_clip();
    frame.fill_rect(rect, theme.colors.header_background.to_argb_u32());
    frame.hline(rect.x, rect.y, rect.width, m.border, theme.colors.border.to_argb_u32());
    frame.set_clip(rect);
    let fitted = fit_text(text, content, rect.width - m.padding * 2.0, font);
    let y = rect.y + (rect.height - text.line_height(font)) / 2.0;
    text.draw(frame, rect.x + m.padding, y, &fitted, font, theme.colors.header_text.to_argb_u32());
}

/// Up/down triangle pair; the active direction is drawn in the indicator color
fn paint_sort_glyph(frame: &mut Frame, rect: Rect, direction: Option<SortDirection>, theme: &Theme) {
    let active = theme.colors.indicator.to_argb_u32();
    let muted = theme.colors.header_text.with_alpha(0x50).to_argb_u32();
    let half = (rect.height / 2.0 - 1.0).max(1.0);
    let up = Rect::new(rect.x, rect.y, rect.width, half);
    let down = Rect::new(rect.x, rect.bottom() - half, rect.width, half);

    let (up_color, down_color) = match direction {
        Some(SortDirection::Ascend) => (active, muted),
        Some(SortDirection::Descend) => (muted, active),
        None => (muted, muted),
    };
    frame.fill_triangle(up, true, up_color);
    frame.fill_triangle(down, false, down_color);
}

/// Funnel: inverted triangle over a short stem
fn paint_filter_glyph(frame: &mut Frame, rect: Rect, active: bool, theme: &Theme) {
    let color = if active {
        theme.colors.indicator.to_argb_u32()
    } else {
        theme.colors.header_text.with_alpha(0x50).to_argb_u32()
    };
    let cone = rect.height * 0.6;
    frame.fill_triangle(Rect::new(rect.x, rect.y, rect.width, cone), false, color);
    let stem = (rect.width * 0.2).max(1.0);
    frame.paint_rect(
        Rect::new(rect.x + (rect.width - stem) / 2.0, rect.y + cone, stem, rect.height - cone),
        color,
    );
}

fn aligned_x(align: Align, left: f32, available: f32, width: f32) -> f32 {
    match align {
        Align::Left => left,
        Align::Center => left + ((available - width) / 2.0).max(0.0),
        Align::Right => left + (available - width).max(0.0),
    }
}

/// Tree indentation, applied to the first column in layout order only
fn indent_for(params: &RenderParams, col: usize, row: usize, m: &GridMetrics) -> f32 {
    if params.depths.is_empty() {
        return 0.0;
    }
    match layout_order(params.columns).first() {
        Some(&first) if first == col => params.depth(row) as f32 * m.padding,
        _ => 0.0,
    }
}

//! Grid instance facade
//!
//! A [`GridView`] owns one renderer with its geometry cache, the vertical
//! scroll controller, the row pipeline, the pointer dispatcher and the
//! listener registry. Hosts drive it with `update`, `resize`, scroll calls
//! and raw pointer input, and read pixels back from its [`PixelSurface`].
//!
//! Vertical scroll state is in logical pixels; everything painted or
//! hit-tested is in device pixels.

use std::time::Duration;

use crate::config::GridConfig;
use crate::dispatch::{HighlightChange, InteractionDispatcher, PointerInput};
use crate::error::{GridError, Result};
use crate::events::{EventBus, EventKind, SubscriptionId, TableEvent};
use crate::geometry::{sanitize, Point};
use crate::model::{Column, RowRef, SelectionSet};
use crate::pipeline::{Diagnostic, FilterState, Pagination, PipelineQuery, RowNode, RowPipeline, SortState};
use crate::scroll::{ScrollRange, ScrollStrategy, VirtualScrollController};
use crate::theme::Theme;
use crate::view::{ColumnLayout, FrameRenderer, GeometryCache, PixelSurface, RenderParams, TextRenderer};

/// Logical viewport size and device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Viewport {
    /// Negative or non-finite sizes become 0, a bad ratio becomes 1
    pub fn new(width: f32, height: f32, dpr: f32) -> Self {
        let size = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: size(width),
            height: size(height),
            dpr: if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 },
        }
    }

    /// Pixel buffer dimensions
    pub fn device_size(&self) -> (usize, usize) {
        (
            (self.width * self.dpr).round() as usize,
            (self.height * self.dpr).round() as usize,
        )
    }

    /// Convert a logical point to the device pixels used for hit-testing
    pub fn to_device(&self, point: Point) -> Point {
        point.scaled(self.dpr)
    }
}

/// Partial parameter update; `None` leaves a parameter unchanged
#[derive(Debug, Clone, Default)]
pub struct GridUpdate {
    pub rows: Option<Vec<RowRef>>,
    pub columns: Option<Vec<Column>>,
    pub theme: Option<Theme>,
    pub selection: Option<SelectionSet>,
    pub sort: Option<SortState>,
    pub filter: Option<FilterState>,
    pub page: Option<Option<Pagination>>,
    pub striped: Option<bool>,
    pub tree: Option<bool>,
    pub footer: Option<Option<String>>,
}

impl GridUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(mut self, rows: Vec<RowRef>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn selection(mut self, selection: SelectionSet) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn filter(mut self, filter: FilterState) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn page(mut self, page: Option<Pagination>) -> Self {
        self.page = Some(page);
        self
    }

    pub fn striped(mut self, striped: bool) -> Self {
        self.striped = Some(striped);
        self
    }

    /// Treat rows as trees and flatten them depth-first with indentation
    pub fn tree(mut self, tree: bool) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn footer(mut self, footer: Option<String>) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Whether the pipeline must run again
    fn touches_rows(&self) -> bool {
        self.rows.is_some()
            || self.columns.is_some()
            || self.sort.is_some()
            || self.filter.is_some()
            || self.page.is_some()
            || self.tree.is_some()
    }
}

/// Render parameters plus the pipeline output they produce
#[derive(Debug, Default)]
struct GridState {
    source_rows: Vec<RowRef>,
    columns: Vec<Column>,
    theme: Theme,
    selection: SelectionSet,
    sort: SortState,
    filter: FilterState,
    page: Option<Pagination>,
    striped: bool,
    tree: bool,
    footer: Option<String>,

    rows: Vec<RowRef>,
    depths: Vec<usize>,
    filtered_count: usize,
    page_count: usize,
    diagnostics: Vec<Diagnostic>,
}

impl GridState {
    fn refresh(&mut self, pipeline: &RowPipeline) {
        let query = PipelineQuery {
            sort: Some(&self.sort),
            filter: Some(&self.filter),
            page: self.page,
        };
        if self.tree {
            let out = pipeline.run_tree(&self.source_rows, &self.columns, query);
            let (rows, depths) = RowNode::flatten(&out.roots).into_iter().unzip();
            self.rows = rows;
            self.depths = depths;
            self.filtered_count = out.filtered_count;
            self.page_count = out.page_count;
            self.diagnostics = out.diagnostics;
        } else {
            let out = pipeline.run(&self.source_rows, &self.columns, query);
            self.rows = out.rows;
            self.depths.clear();
            self.filtered_count = out.filtered_count;
            self.page_count = out.page_count;
            self.diagnostics = out.diagnostics;
        }
        tracing::debug!(
            diagnostics = self.diagnostics.len(),
            filtered = self.filtered_count,
            "pipeline refreshed"
        );
    }

    fn params(&self, range: ScrollRange, scroll_top: f64, scroll_left: f64, dpr: f32) -> RenderParams<'_> {
        RenderParams {
            depths: &self.depths,
            range,
            sort: Some(&self.sort),
            filter: Some(&self.filter),
            striped: self.striped,
            scroll_top,
            scroll_left,
            dpr,
            footer: self.footer.as_deref(),
            ..RenderParams::new(&self.rows, &self.columns, &self.theme, &self.selection)
        }
    }
}

#[derive(Debug)]
pub struct GridView {
    surface: Option<PixelSurface>,
    viewport: Viewport,
    renderer: FrameRenderer,
    scroll: VirtualScrollController,
    /// Horizontal offset in logical pixels
    scroll_left: f64,
    pipeline: RowPipeline,
    dispatcher: InteractionDispatcher,
    events: EventBus,
    state: GridState,
    destroyed: bool,
}

impl GridView {
    /// Create a grid painting into `surface`. The surface is resized to the
    /// viewport's device size; without one the grid stays headless and
    /// every paint is a no-op.
    pub fn create(
        surface: Option<PixelSurface>,
        viewport: Viewport,
        theme: Theme,
        text: Box<dyn TextRenderer>,
    ) -> Self {
        let viewport = Viewport::new(viewport.width, viewport.height, viewport.dpr);
        let surface = surface.map(|mut s| {
            let (w, h) = viewport.device_size();
            if s.width() != w || s.height() != h {
                s.resize(w, h);
            }
            s
        });
        let scroll = VirtualScrollController::with_defaults(theme.spacing.cell_height as f64, 0.0);
        let mut grid = Self {
            surface,
            viewport,
            renderer: FrameRenderer::new(text),
            scroll,
            scroll_left: 0.0,
            pipeline: RowPipeline::new(),
            dispatcher: InteractionDispatcher::new(),
            events: EventBus::new(),
            state: GridState {
                theme,
                page_count: 1,
                ..GridState::default()
            },
            destroyed: false,
        };
        grid.sync_scroll_extents();
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            dpr = viewport.dpr,
            headless = grid.surface.is_none(),
            "grid created"
        );
        grid
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ScrollStrategy>) -> Self {
        self.scroll.set_strategy(strategy);
        self
    }

    pub fn with_pipeline(mut self, pipeline: RowPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_double_click_interval(mut self, interval: Duration) -> Self {
        self.dispatcher = InteractionDispatcher::with_double_click_interval(interval);
        self
    }

    /// Apply strategy, striping and click timing from a config file
    pub fn with_config(self, config: &GridConfig) -> Self {
        let mut grid = self
            .with_strategy(config.build_strategy())
            .with_double_click_interval(config.double_click_interval());
        grid.state.striped = config.striped;
        grid
    }

    // ---- painting ------------------------------------------------------

    /// Paint a full frame from the current parameters
    pub fn render(&mut self) {
        if self.destroyed {
            return;
        }
        let range = self.scroll.visible_range();
        let params = RenderParams {
            highlighted: self.dispatcher.highlighted(),
            ..self.state.params(range, self.scroll.scroll_offset(), self.scroll_left, self.viewport.dpr)
        };
        let mut frame = self.surface.as_mut().map(PixelSurface::frame);
        self.renderer.render(frame.as_mut(), &params);
    }

    /// Merge `update` into the current parameters and repaint
    pub fn update(&mut self, update: GridUpdate) {
        if self.destroyed {
            return;
        }
        let rerun = update.touches_rows();
        let rows_replaced = update.rows.is_some() || update.columns.is_some() || update.tree.is_some();
        let GridUpdate {
            rows,
            columns,
            theme,
            selection,
            sort,
            filter,
            page,
            striped,
            tree,
            footer,
        } = update;

        let state = &mut self.state;
        if let Some(rows) = rows {
            state.source_rows = rows;
        }
        if let Some(columns) = columns {
            state.columns = columns;
        }
        if let Some(theme) = theme {
            state.theme = theme;
        }
        if let Some(selection) = selection {
            state.selection = selection;
        }
        if let Some(sort) = sort {
            state.sort = sort;
        }
        if let Some(filter) = filter {
            state.filter = filter;
        }
        if let Some(page) = page {
            state.page = page;
        }
        if let Some(striped) = striped {
            state.striped = striped;
        }
        if let Some(tree) = tree {
            state.tree = tree;
        }
        if let Some(footer) = footer {
            state.footer = footer;
        }

        if rerun {
            state.refresh(&self.pipeline);
            // Row indices may now point at different rows
            if let Some(leave) = self.dispatcher.reset() {
                self.events.emit(&leave);
            }
        }
        if rows_replaced {
            self.scroll_left = 0.0;
        }
        tracing::debug!(
            rows = self.state.rows.len(),
            columns = self.state.columns.len(),
            rerun,
            "grid updated"
        );
        self.sync_scroll_extents();
        self.render();
    }

    /// Change the logical viewport size; reallocates the surface and repaints
    pub fn resize(&mut self, width: f32, height: f32) {
        self.set_viewport(Viewport::new(width, height, self.viewport.dpr));
    }

    /// Change size and device pixel ratio at once
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.destroyed {
            return;
        }
        self.viewport = Viewport::new(viewport.width, viewport.height, viewport.dpr);
        let (w, h) = self.viewport.device_size();
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(w, h);
        }
        tracing::debug!(width = w, height = h, dpr = self.viewport.dpr, "grid resized");
        self.sync_scroll_extents();
        self.render();
    }

    /// Release the surface, geometry and listeners. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.surface = None;
        self.renderer.clear_cache();
        self.events.destroy();
        let _ = self.dispatcher.reset();
        self.state = GridState::default();
        tracing::debug!("grid destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ---- listeners -----------------------------------------------------

    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&TableEvent) + 'static) -> Result<SubscriptionId> {
        if self.destroyed {
            return Err(GridError::Destroyed);
        }
        self.events.on(kind, handler)
    }

    /// Register a listener that runs before host listeners
    pub fn on_internal(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&TableEvent) + 'static,
    ) -> Result<SubscriptionId> {
        if self.destroyed {
            return Err(GridError::Destroyed);
        }
        self.events.on_internal(kind, handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    // ---- input ---------------------------------------------------------

    /// Resolve raw pointer input against the last frame, repaint the cells
    /// whose highlight changed, then notify listeners. Returns the emitted
    /// events in order.
    pub fn handle_pointer(&mut self, input: PointerInput) -> Vec<TableEvent> {
        if self.destroyed {
            return Vec::new();
        }
        let dispatch = self.dispatcher.dispatch(self.renderer.cache(), input);
        if !dispatch.highlight.is_none() {
            self.repaint_highlight(dispatch.highlight);
        }
        for event in &dispatch.events {
            self.events.emit(event);
        }
        dispatch.events
    }

    fn repaint_highlight(&mut self, change: HighlightChange) {
        let params = self.state.params(
            ScrollRange::EMPTY,
            self.scroll.scroll_offset(),
            self.scroll_left,
            self.viewport.dpr,
        );
        let mut frame = self.surface.as_mut().map(PixelSurface::frame);
        if let Some(cell) = change.clear {
            self.renderer.clear_highlight(frame.as_mut(), cell, &params);
        }
        if let Some(cell) = change.apply {
            self.renderer.apply_highlight(frame.as_mut(), cell, &params);
        }
    }

    // ---- scrolling -----------------------------------------------------

    /// Set the vertical offset in logical pixels and repaint. Returns the
    /// clamped offset.
    pub fn set_scroll_top(&mut self, offset: f64) -> f64 {
        if self.destroyed {
            return 0.0;
        }
        let stored = self.scroll.set_scroll_offset(offset);
        self.render();
        stored
    }

    /// Set the horizontal offset in logical pixels and repaint. Returns the
    /// clamped offset.
    pub fn set_scroll_left(&mut self, offset: f64) -> f64 {
        if self.destroyed {
            return 0.0;
        }
        self.scroll_left = sanitize(offset).min(self.max_scroll_left());
        self.render();
        self.scroll_left
    }

    /// Scroll by logical deltas, e.g. a wheel delta divided by the ratio
    pub fn scroll_by(&mut self, delta_x: f64, delta_y: f64) {
        if self.destroyed {
            return;
        }
        let delta = |d: f64| if d.is_finite() { d } else { 0.0 };
        self.scroll.scroll_by(delta(delta_y));
        self.scroll_left = sanitize(self.scroll_left + delta(delta_x)).min(self.max_scroll_left());
        self.render();
    }

    /// Bring row `index` to the top and repaint
    pub fn scroll_to_row(&mut self, index: usize) -> f64 {
        if self.destroyed {
            return 0.0;
        }
        let stored = self.scroll.scroll_to_index(index);
        self.render();
        stored
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll.scroll_offset()
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    /// Largest vertical offset in logical pixels
    pub fn max_scroll_top(&self) -> f64 {
        self.scroll.max_offset()
    }

    /// Largest horizontal offset in logical pixels
    pub fn max_scroll_left(&self) -> f64 {
        let (w, _) = self.viewport.device_size();
        let layout = ColumnLayout::compute(&self.state.columns, w as f32, 0.0, self.viewport.dpr);
        (layout.max_scroll_left / self.viewport.dpr) as f64
    }

    /// Rows painted by the next render, including the buffer
    pub fn visible_range(&mut self) -> ScrollRange {
        self.scroll.visible_range()
    }

    fn sync_scroll_extents(&mut self) {
        let spacing = &self.state.theme.spacing;
        let footer = if self.state.footer.is_some() {
            spacing.cell_height
        } else {
            0.0
        };
        let body = (self.viewport.height - spacing.header_height - footer).max(0.0);
        self.scroll.set_item_extent(spacing.cell_height as f64);
        self.scroll.set_viewport_extent(body as f64);
        self.scroll.set_item_count(self.state.rows.len());
        self.scroll_left = self.scroll_left.min(self.max_scroll_left());
    }

    // ---- accessors -----------------------------------------------------

    pub fn surface(&self) -> Option<&PixelSurface> {
        self.surface.as_ref()
    }

    /// Geometry of the most recent render pass
    pub fn cache(&self) -> &GeometryCache {
        self.renderer.cache()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn theme(&self) -> &Theme {
        &self.state.theme
    }

    pub fn columns(&self) -> &[Column] {
        &self.state.columns
    }

    /// Rows after the pipeline, in display order
    pub fn rows(&self) -> &[RowRef] {
        &self.state.rows
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.state.selection
    }

    pub fn sort(&self) -> &SortState {
        &self.state.sort
    }

    pub fn filter(&self) -> &FilterState {
        &self.state.filter
    }

    pub fn page(&self) -> Option<Pagination> {
        self.state.page
    }

    pub fn footer(&self) -> Option<&str> {
        self.state.footer.as_deref()
    }

    pub fn striped(&self) -> bool {
        self.state.striped
    }

    pub fn tree(&self) -> bool {
        self.state.tree
    }

    /// Row count after filtering, before pagination
    pub fn filtered_count(&self) -> usize {
        self.state.filtered_count
    }

    pub fn page_count(&self) -> usize {
        self.state.page_count
    }

    /// Descriptors skipped by the last pipeline run
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.state.diagnostics
    }

    pub fn dispatcher(&self) -> &InteractionDispatcher {
        &self.dispatcher
    }
}

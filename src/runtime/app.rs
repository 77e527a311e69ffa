use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use softbuffer::{Context, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

use gridcanvas::cli::{DataSource, StartupConfig};
use gridcanvas::dataset::{self, Dataset, DEFAULT_CHUNK_SIZE};
use gridcanvas::events::{EventKind, TableEvent};
use gridcanvas::geometry::Point;
use gridcanvas::model::find_column;
use gridcanvas::pipeline::Pagination;
use gridcanvas::theme::{self, Theme};
use gridcanvas::view::{FontdueText, MonospaceText, PixelSurface, TextRenderer};
use gridcanvas::{GridConfig, GridUpdate, GridView, PointerInput, Viewport};

use super::input::{action_for_key, ViewerAction};

/// Rows scrolled per wheel notch
const WHEEL_LINES: f32 = 3.0;

pub struct App {
    grid: GridView,
    startup: StartupConfig,
    theme_id: String,
    window: Option<Rc<Window>>,
    context: Option<Context<Rc<Window>>>,
    surface: Option<Surface<Rc<Window>, Rc<Window>>>,
    modifiers: ModifiersState,
    mouse_position: Option<Point>,
}

impl App {
    pub fn new(startup: StartupConfig, config: &GridConfig) -> Result<Self> {
        let data = load_rows(&startup.source)?.with_default_width(config.default_column_width);
        let theme = theme::load_theme(&startup.theme).unwrap_or_else(|e| {
            tracing::warn!("Theme '{}' unavailable ({}), using default", startup.theme, e);
            Theme::default_light()
        });

        let mut grid = GridView::create(
            Some(PixelSurface::new(0, 0)),
            Viewport::new(startup.width, startup.height, 1.0),
            theme,
            text_renderer(&startup),
        )
        .with_config(config);

        grid.on(EventKind::CellDoubleClick, |event| {
            if let Some(cell) = event.cell() {
                tracing::info!(
                    row = cell.cell.row,
                    column = %cell.column_key,
                    value = %cell.row.value(&cell.column_key),
                    "cell double-clicked"
                );
            }
        })?;

        grid.update(
            GridUpdate::new()
                .columns(data.columns)
                .rows(data.rows)
                .striped(startup.striped)
                .tree(startup.tree)
                .page(startup.page_size.map(|size| Pagination::new(1, size))),
        );

        let mut app = Self {
            grid,
            theme_id: startup.theme.clone(),
            startup,
            window: None,
            context: None,
            surface: None,
            modifiers: ModifiersState::empty(),
            mouse_position: None,
        };
        app.refresh_footer();
        Ok(app)
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("gridcanvas")
            .with_inner_size(LogicalSize::new(self.startup.width, self.startup.height));
        let window = Rc::new(event_loop.create_window(attributes).context("Failed to create window")?);
        let context = Context::new(Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create graphics context: {}", e))?;
        let surface = Surface::new(&context, Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create surface: {}", e))?;

        self.sync_viewport(&window);
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }

    /// Match the grid's viewport to the window's inner size and scale
    fn sync_viewport(&mut self, window: &Window) {
        let dpr = window.scale_factor() as f32;
        let size = window.inner_size();
        self.grid.set_viewport(Viewport::new(
            size.width as f32 / dpr,
            size.height as f32 / dpr,
            dpr,
        ));
    }

    fn present(&mut self) -> Result<()> {
        let (Some(window), Some(surface)) = (&self.window, self.surface.as_mut()) else {
            return Ok(());
        };
        let size = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return Ok(());
        };
        surface
            .resize(width, height)
            .map_err(|e| anyhow::anyhow!("Failed to resize surface: {}", e))?;

        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("Failed to get surface buffer: {}", e))?;
        let background = self.grid.theme().colors.background.to_argb_u32();
        buffer.fill(background);

        // The grid's buffer can be a pixel off the window after rounding
        if let Some(pixels) = self.grid.surface() {
            let dst_width = size.width as usize;
            let copy_width = pixels.width().min(dst_width);
            let rows = pixels.height().min(size.height as usize);
            for (y, src) in pixels.pixels().chunks_exact(pixels.width().max(1)).take(rows).enumerate() {
                buffer[y * dst_width..y * dst_width + copy_width].copy_from_slice(&src[..copy_width]);
            }
        }

        buffer
            .present()
            .map_err(|e| anyhow::anyhow!("Failed to present buffer: {}", e))
    }

    /// Feed pointer input to the grid and react to what it emits
    fn pointer(&mut self, input: PointerInput) -> bool {
        let events = self.grid.handle_pointer(input);
        for event in &events {
            self.react(event);
        }
        !events.is_empty()
    }

    fn react(&mut self, event: &TableEvent) {
        match event {
            TableEvent::Scroll { delta_x, delta_y } => {
                let dpr = self.grid.viewport().dpr as f64;
                self.grid.scroll_by(delta_x / dpr, delta_y / dpr);
            }
            TableEvent::HeaderClick { column_key, .. } => {
                let sortable = find_column(self.grid.columns(), column_key).is_some_and(|(_, c)| c.sortable);
                if sortable {
                    let mut sort = self.grid.sort().clone();
                    sort.cycle(column_key);
                    self.apply(GridUpdate::new().sort(sort));
                }
            }
            TableEvent::CellClick(cell) => {
                let mut selection = self.grid.selection().clone();
                selection.toggle(cell.row.key());
                self.apply(GridUpdate::new().selection(selection));
            }
            TableEvent::CellDoubleClick(_) | TableEvent::HoverEnter(_) | TableEvent::HoverLeave(_) => {}
        }
    }

    fn perform(&mut self, action: ViewerAction, event_loop: &ActiveEventLoop) {
        let row_height = self.grid.theme().spacing.cell_height as f64;
        let body_height = (self.grid.viewport().height - self.grid.theme().spacing.header_height) as f64;
        match action {
            ViewerAction::ScrollRows(n) => self.grid.scroll_by(0.0, n as f64 * row_height),
            ViewerAction::ScrollPages(n) => self.grid.scroll_by(0.0, n as f64 * body_height.max(row_height)),
            ViewerAction::Home => {
                self.grid.set_scroll_top(0.0);
            }
            ViewerAction::End => {
                let max = self.grid.max_scroll_top();
                self.grid.set_scroll_top(max);
            }
            ViewerAction::ScrollColumns(dx) => self.grid.scroll_by(dx, 0.0),
            ViewerAction::PreviousPage | ViewerAction::NextPage => {
                if let Some(page) = self.grid.page() {
                    let current = page.effective_page(self.grid.filtered_count());
                    let next = if action == ViewerAction::NextPage {
                        current + 1
                    } else {
                        current.saturating_sub(1)
                    };
                    self.apply(GridUpdate::new().page(Some(Pagination::new(next, page.page_size))));
                    self.grid.set_scroll_top(0.0);
                }
            }
            ViewerAction::SelectAll => {
                let mut selection = self.grid.selection().clone();
                selection.select_all(self.grid.rows());
                self.apply(GridUpdate::new().selection(selection));
            }
            ViewerAction::ClearSelection => {
                self.apply(GridUpdate::new().selection(Default::default()));
            }
            ViewerAction::ToggleStripes => {
                self.startup.striped = !self.startup.striped;
                self.apply(GridUpdate::new().striped(self.startup.striped));
            }
            ViewerAction::CycleTheme => self.cycle_theme(),
            ViewerAction::Quit => event_loop.exit(),
        }
    }

    fn cycle_theme(&mut self) {
        let ids: Vec<String> = theme::list_available_themes().into_iter().map(|t| t.id).collect();
        if ids.is_empty() {
            return;
        }
        let index = ids
            .iter()
            .position(|id| *id == self.theme_id)
            .map_or(0, |pos| (pos + 1) % ids.len());
        let next = &ids[index];
        match theme::load_theme(next) {
            Ok(theme) => {
                tracing::info!("Switched theme to {}", next);
                self.theme_id = next.clone();
                self.apply(GridUpdate::new().theme(theme));
            }
            Err(e) => tracing::warn!("Failed to load theme {}: {}", next, e),
        }
    }

    fn apply(&mut self, update: GridUpdate) {
        self.grid.update(update);
        self.refresh_footer();
    }

    fn refresh_footer(&mut self) {
        let text = footer_text(&self.grid);
        if self.grid.footer() != Some(text.as_str()) {
            self.grid.update(GridUpdate::new().footer(Some(text)));
        }
    }
}

fn footer_text(grid: &GridView) -> String {
    let mut text = format!("{} rows", grid.filtered_count());
    if !grid.selection().is_empty() {
        text.push_str(&format!("  ·  {} selected", grid.selection().len()));
    }
    if let Some(page) = grid.page() {
        text.push_str(&format!(
            "  ·  page {}/{}",
            page.effective_page(grid.filtered_count()),
            grid.page_count()
        ));
    }
    text
}

fn load_rows(source: &DataSource) -> Result<Dataset> {
    match source {
        DataSource::File(path) => {
            dataset::load(path).with_context(|| format!("Failed to load {}", path.display()))
        }
        DataSource::Mock(count) => {
            let started = Instant::now();
            let rows = dataset::generate(*count, DEFAULT_CHUNK_SIZE, dataset::mock_row)
                .with_yield(|done, total| tracing::trace!(done, total, "generated batch"))
                .collect_all();
            tracing::info!(rows = rows.len(), elapsed = ?started.elapsed(), "generated mock rows");
            Ok(Dataset {
                columns: dataset::mock_columns(),
                rows,
            })
        }
    }
}

fn text_renderer(startup: &StartupConfig) -> Box<dyn TextRenderer> {
    let loaded = match &startup.font {
        Some(path) => FontdueText::load(path),
        None => FontdueText::system_default(),
    };
    match loaded {
        Ok(text) => Box::new(text),
        Err(e) => {
            tracing::warn!("No font available ({}), drawing placeholder glyphs", e);
            Box::new(MonospaceText::new())
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("{:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        let redraw = match event {
            WindowEvent::CloseRequested => {
                self.grid.destroy();
                event_loop.exit();
                false
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.present() {
                    tracing::error!("Render error: {:#}", e);
                }
                false
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.sync_viewport(&window);
                true
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Point::new(position.x as f32, position.y as f32);
                self.mouse_position = Some(pos);
                self.pointer(PointerInput::Move(pos))
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
                self.pointer(PointerInput::Leave)
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => match self.mouse_position {
                Some(pos) => self.pointer(PointerInput::Press {
                    pos,
                    at: Instant::now(),
                }),
                None => false,
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => {
                        let line = self.grid.theme().spacing.cell_height * self.grid.viewport().dpr;
                        ((-x * WHEEL_LINES * line) as f64, (-y * WHEEL_LINES * line) as f64)
                    }
                    MouseScrollDelta::PixelDelta(pos) => (-pos.x, -pos.y),
                };
                // Shift turns vertical wheels into horizontal scrolling
                let (dx, dy) = if self.modifiers.shift_key() { (dy, dx) } else { (dx, dy) };
                self.pointer(PointerInput::Wheel {
                    delta_x: dx,
                    delta_y: dy,
                })
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(code) => match action_for_key(code, self.modifiers) {
                        Some(action) => {
                            self.perform(action, event_loop);
                            true
                        }
                        None => false,
                    },
                    PhysicalKey::Unidentified(_) => false,
                }
            }
            _ => false,
        };

        if redraw {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }
}

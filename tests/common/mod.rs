//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use gridcanvas::geometry::Point;
use gridcanvas::model::{Column, Record, RowRef};
use gridcanvas::scroll::FixedBuffer;
use gridcanvas::theme::Theme;
use gridcanvas::view::{Cell, MonospaceText, PixelSurface};
use gridcanvas::{GridUpdate, GridView, Viewport};

/// Rows keyed 0..n with a `name` and an `age` field
pub fn people(n: u64) -> Vec<RowRef> {
    (0..n)
        .map(|i| {
            Record::new(i)
                .with("name", format!("person {}", i))
                .with("age", (20 + i % 50) as i64)
                .into_ref()
        })
        .collect()
}

/// Rows carrying a single numeric `n` field, in the given order
pub fn numbers(values: &[i64]) -> Vec<RowRef> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| Record::new(i as u64).with("n", v).into_ref())
        .collect()
}

pub fn people_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name").width(160.0).sortable().filterable(),
        Column::new("age", "Age").width(80.0).sortable(),
    ]
}

/// A grid with a pixel surface, the default light theme and placeholder text
pub fn test_grid(width: f32, height: f32) -> GridView {
    test_grid_with_dpr(width, height, 1.0)
}

pub fn test_grid_with_dpr(width: f32, height: f32, dpr: f32) -> GridView {
    GridView::create(
        Some(PixelSurface::new(0, 0)),
        Viewport::new(width, height, dpr),
        Theme::default(),
        Box::new(MonospaceText::new()),
    )
    .with_strategy(Box::new(FixedBuffer::unbuffered()))
}

/// A grid already showing `n` people rows
pub fn people_grid(n: u64) -> GridView {
    let mut grid = test_grid(400.0, 300.0);
    grid.update(GridUpdate::new().columns(people_columns()).rows(people(n)));
    grid
}

/// Painted cell at logical position, if any
pub fn cell_at(grid: &GridView, row: usize, col: usize) -> Option<Cell> {
    grid.cache()
        .cells()
        .iter()
        .find(|c| c.row == row && c.col == col)
        .cloned()
}

/// Point inside a cell that sits in its left padding, clear of any text
pub fn padding_point(cell: &Cell) -> Point {
    Point::new(cell.rect.x + 2.0, cell.rect.y + 2.0)
}

/// Pixel at a device coordinate
pub fn pixel(grid: &GridView, point: Point) -> u32 {
    let surface = grid.surface().expect("grid has a surface");
    surface.pixels()[point.y as usize * surface.width() + point.x as usize]
}

/// Copy of all pixels for frame comparisons
pub fn snapshot(grid: &GridView) -> Vec<u32> {
    grid.surface().expect("grid has a surface").pixels().to_vec()
}

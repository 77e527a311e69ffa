//! Rendering tests - geometry cache, hit-testing, pixels

mod common;

use common::{cell_at, padding_point, people, people_columns, people_grid, pixel, snapshot, test_grid, test_grid_with_dpr};
use gridcanvas::geometry::Point;
use gridcanvas::model::{Column, Fixed, RowKey, SelectionSet};
use gridcanvas::theme::Theme;
use gridcanvas::view::{hit_test, hit_test_grid, HitTarget, MonospaceText};
use gridcanvas::{GridUpdate, GridView, PointerInput, Viewport};

// ========================================================================
// Geometry cache and hit-testing
// ========================================================================

#[test]
fn test_cell_centers_hit_their_own_cell() {
    let grid = people_grid(50);
    assert!(!grid.cache().is_empty());

    for cell in grid.cache().cells() {
        let hit = hit_test(grid.cache(), cell.rect.center()).expect("center hits a cell");
        assert_eq!((hit.row, hit.col), (cell.row, cell.col));
    }
}

#[test]
fn test_only_visible_rows_are_cached() {
    let grid = people_grid(10_000);
    // 300 - 40 header = 260 px body, 36 px rows
    let rows: std::collections::BTreeSet<usize> = grid.cache().cells().iter().map(|c| c.row).collect();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows.first(), Some(&0));
    assert_eq!(rows.last(), Some(&7));
    assert_eq!(grid.cache().len(), 16);
}

#[test]
fn test_cache_follows_scroll() {
    let mut grid = people_grid(1000);
    grid.set_scroll_top(360.0);

    let first = grid.cache().cells().iter().map(|c| c.row).min();
    assert_eq!(first, Some(10));
    let cell = cell_at(&grid, 10, 0).expect("row 10 painted");
    assert_eq!(cell.rect.y, 40.0);
}

#[test]
fn test_partially_hidden_row_is_clipped_below_header() {
    let mut grid = people_grid(1000);
    grid.set_scroll_top(18.0);

    let cell = cell_at(&grid, 0, 0).expect("row 0 still painted");
    assert_eq!(cell.bounds.y, 22.0);
    assert_eq!(cell.rect.y, 40.0);
    assert_eq!(cell.rect.height, 18.0);

    // The header owns the overlap
    assert_eq!(
        hit_test_grid(grid.cache(), Point::new(10.0, 30.0)),
        Some(HitTarget::Header { col: 0 })
    );
}

#[test]
fn test_headers_are_cached() {
    let grid = people_grid(3);
    let keys: Vec<&str> = grid.cache().headers().iter().map(|h| h.column_key.as_str()).collect();
    assert_eq!(keys, vec!["name", "age"]);
    assert_eq!(hit_test_grid(grid.cache(), Point::new(200.0, 20.0)), Some(HitTarget::Header { col: 1 }));
}

#[test]
fn test_points_outside_cells_miss() {
    let grid = people_grid(2);
    // Below the last row
    assert!(hit_test(grid.cache(), Point::new(50.0, 250.0)).is_none());
    assert!(hit_test(grid.cache(), Point::new(-1.0, 50.0)).is_none());
}

#[test]
fn test_pinned_columns_win_hit_tests() {
    let mut grid = test_grid(400.0, 300.0);
    grid.update(
        GridUpdate::new()
            .columns(vec![
                Column::new("id", "Id").width(60.0).fixed(Fixed::Left),
                Column::new("name", "Name").width(300.0),
                Column::new("age", "Age").width(300.0),
            ])
            .rows(people(5)),
    );
    grid.set_scroll_left(100.0);

    let hit = hit_test(grid.cache(), Point::new(30.0, 50.0)).expect("pinned cell");
    assert_eq!(hit.col, 0);

    // Scrolling cells never claim the pinned region
    for cell in grid.cache().cells().iter().filter(|c| c.col != 0) {
        assert!(cell.rect.x >= 60.0, "{:?}", cell.rect);
    }
    // The name column is scrolled under the pinned column
    let name = cell_at(&grid, 0, 1).expect("name painted");
    assert_eq!(name.bounds.x, -40.0);
    assert_eq!(name.rect.x, 60.0);
}

#[test]
fn test_horizontal_scroll_is_clamped() {
    let mut grid = test_grid(400.0, 300.0);
    grid.update(
        GridUpdate::new()
            .columns(vec![Column::new("name", "Name").width(300.0), Column::new("age", "Age").width(300.0)])
            .rows(people(5)),
    );
    assert_eq!(grid.max_scroll_left(), 200.0);
    assert_eq!(grid.set_scroll_left(1000.0), 200.0);
    assert_eq!(grid.set_scroll_left(-5.0), 0.0);
}

// ========================================================================
// Layout
// ========================================================================

#[test]
fn test_last_column_stretches_to_viewport() {
    let grid = people_grid(3);
    let age = cell_at(&grid, 0, 1).expect("age painted");
    assert_eq!(age.bounds.x, 160.0);
    assert_eq!(age.bounds.right(), 400.0);
}

#[test]
fn test_stretch_in_device_pixels() {
    let mut grid = test_grid_with_dpr(400.0, 300.0, 2.0);
    grid.update(GridUpdate::new().columns(people_columns()).rows(people(3)));

    assert_eq!(grid.surface().map(|s| (s.width(), s.height())), Some((800, 600)));
    let name = cell_at(&grid, 0, 0).expect("name painted");
    assert_eq!(name.bounds.width, 320.0);
    assert_eq!(name.bounds.height, 72.0);
    let age = cell_at(&grid, 0, 1).expect("age painted");
    assert_eq!(age.bounds.right(), 800.0);
}

#[test]
fn test_wide_columns_do_not_stretch() {
    let mut grid = test_grid(400.0, 300.0);
    grid.update(
        GridUpdate::new()
            .columns(vec![Column::new("name", "Name").width(250.0), Column::new("age", "Age").width(150.0)])
            .rows(people(3)),
    );
    let age = cell_at(&grid, 0, 1).expect("age painted");
    assert_eq!(age.bounds.width, 150.0);
}

// ========================================================================
// Pixels
// ========================================================================

#[test]
fn test_render_is_idempotent() {
    let mut grid = people_grid(100);
    let first = snapshot(&grid);
    grid.render();
    assert_eq!(first, snapshot(&grid));
}

#[test]
fn test_stripes_on_odd_rows() {
    let mut grid = people_grid(10);
    grid.update(GridUpdate::new().striped(true));

    let colors = Theme::default().colors;
    let even = cell_at(&grid, 0, 0).expect("row 0");
    let odd = cell_at(&grid, 1, 0).expect("row 1");
    assert_eq!(pixel(&grid, padding_point(&even)), colors.background.to_argb_u32());
    assert_eq!(pixel(&grid, padding_point(&odd)), colors.stripe.to_argb_u32());

    grid.update(GridUpdate::new().striped(false));
    let odd = cell_at(&grid, 1, 0).expect("row 1");
    assert_eq!(pixel(&grid, padding_point(&odd)), colors.background.to_argb_u32());
}

#[test]
fn test_selected_rows_are_tinted() {
    let mut grid = people_grid(10);
    let background = Theme::default().colors.background.to_argb_u32();

    let mut selection = SelectionSet::new();
    selection.select(RowKey(2));
    grid.update(GridUpdate::new().selection(selection));

    let selected = cell_at(&grid, 2, 0).expect("row 2");
    let plain = cell_at(&grid, 3, 0).expect("row 3");
    assert_ne!(pixel(&grid, padding_point(&selected)), background);
    assert_eq!(pixel(&grid, padding_point(&plain)), background);
}

#[test]
fn test_selection_follows_row_key_after_sort() {
    use gridcanvas::pipeline::{SortState, Sorter};

    let mut grid = people_grid(10);
    let mut selection = SelectionSet::new();
    selection.select(RowKey(9));
    grid.update(
        GridUpdate::new()
            .selection(selection)
            .sort(SortState::single(Sorter::desc("name"))),
    );

    // "person 9" moves from the last row to the first
    let tinted = cell_at(&grid, 0, 0).expect("row 0");
    assert_eq!(tinted.row_data.key(), RowKey(9));
    let background = Theme::default().colors.background.to_argb_u32();
    assert_ne!(pixel(&grid, padding_point(&tinted)), background);
}

#[test]
fn test_highlight_clears_without_residue() {
    let mut grid = people_grid(20);
    let before = snapshot(&grid);

    let cell = cell_at(&grid, 2, 1).expect("row 2");
    grid.handle_pointer(PointerInput::Move(cell.rect.center()));
    assert_ne!(pixel(&grid, padding_point(&cell)), before[padding_index(&grid, &cell)]);

    grid.handle_pointer(PointerInput::Leave);
    assert_eq!(before, snapshot(&grid));
}

#[test]
fn test_highlight_moves_between_cells() {
    let mut grid = people_grid(20);
    let before = snapshot(&grid);

    let a = cell_at(&grid, 1, 0).expect("a");
    let b = cell_at(&grid, 4, 1).expect("b");
    grid.handle_pointer(PointerInput::Move(a.rect.center()));
    grid.handle_pointer(PointerInput::Move(b.rect.center()));

    assert_eq!(pixel(&grid, padding_point(&a)), before[padding_index(&grid, &a)]);
    assert_ne!(pixel(&grid, padding_point(&b)), before[padding_index(&grid, &b)]);
}

fn padding_index(grid: &GridView, cell: &gridcanvas::view::Cell) -> usize {
    let point = padding_point(cell);
    let width = grid.surface().map(|s| s.width()).unwrap_or(0);
    point.y as usize * width + point.x as usize
}

#[test]
fn test_footer_reserves_space() {
    let mut grid = people_grid(100);
    let without = grid.cache().cells().iter().map(|c| c.row).max();

    grid.update(GridUpdate::new().footer(Some("100 rows".into())));
    let with = grid.cache().cells().iter().map(|c| c.row).max();
    assert!(with < without);
    assert!(grid.cache().cells().iter().all(|c| c.rect.bottom() <= 264.0));
}

// ========================================================================
// Headless
// ========================================================================

#[test]
fn test_detached_surface_is_a_noop() {
    let mut grid = GridView::create(
        None,
        Viewport::new(400.0, 300.0, 1.0),
        Theme::default(),
        Box::new(MonospaceText::new()),
    );
    grid.update(GridUpdate::new().columns(people_columns()).rows(people(100)));
    grid.render();

    assert!(grid.surface().is_none());
    assert!(grid.cache().is_empty());
    assert!(grid.handle_pointer(PointerInput::Move(Point::new(10.0, 50.0))).is_empty());
    // The pipeline still runs
    assert_eq!(grid.rows().len(), 100);
}

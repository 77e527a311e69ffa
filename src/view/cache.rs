//! Per-frame geometry cache
//!
//! Every render pass starts a new generation, dropping all entries from the
//! previous one, then records one [`Cell`] per painted body cell and one
//! [`HeaderCell`] per painted header cell, in paint order. Hit-testing reads
//! only from here, so it can never observe a stale frame.

use std::collections::HashMap;

use crate::geometry::Rect;
use crate::model::RowRef;

/// Logical cell coordinates: row index into the rendered rows, column index
/// into the column list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A painted body cell
#[derive(Debug, Clone)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    /// Visible (clipped) rectangle in device pixels
    pub rect: Rect,
    /// Full layout rectangle, possibly extending under pinned columns or
    /// the header
    pub bounds: Rect,
    pub row_data: RowRef,
    pub column_key: String,
    /// Render pass that produced this entry
    pub generation: u64,
}

impl Cell {
    pub fn cell_ref(&self) -> CellRef {
        CellRef::new(self.row, self.col)
    }
}

/// A painted header cell
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub col: usize,
    pub rect: Rect,
    pub bounds: Rect,
    pub column_key: String,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct GeometryCache {
    generation: u64,
    cells: Vec<Cell>,
    index: HashMap<CellRef, usize>,
    headers: Vec<HeaderCell>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render pass: bump the generation and drop all entries
    pub fn begin_pass(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.cells.clear();
        self.index.clear();
        self.headers.clear();
        self.generation
    }

    /// Drop all entries without starting a pass
    pub fn clear(&mut self) {
        self.cells.clear();
        self.index.clear();
        self.headers.clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a body cell for the current generation
    pub fn push_cell(&mut self, row: usize, col: usize, rect: Rect, bounds: Rect, row_data: RowRef, column_key: &str) {
        let key = CellRef::new(row, col);
        let cell = Cell {
            row,
            col,
            rect,
            bounds,
            row_data,
            column_key: column_key.to_string(),
            generation: self.generation,
        };
        match self.index.get(&key) {
            Some(&i) => self.cells[i] = cell,
            None => {
                self.index.insert(key, self.cells.len());
                self.cells.push(cell);
            }
        }
    }

    pub fn push_header(&mut self, col: usize, rect: Rect, bounds: Rect, column_key: &str) {
        self.headers.push(HeaderCell {
            col,
            rect,
            bounds,
            column_key: column_key.to_string(),
            generation: self.generation,
        });
    }

    /// Body cells in paint order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Header cells in paint order
    pub fn headers(&self) -> &[HeaderCell] {
        &self.headers
    }

    pub fn get(&self, cell: CellRef) -> Option<&Cell> {
        self.index.get(&cell).map(|&i| &self.cells[i])
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

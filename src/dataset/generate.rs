//! Chunked row generation
//!
//! Materialising a very large mock dataset in one go would block the thread
//! that owns the surface. [`ChunkedRows`] produces rows in bounded batches
//! and calls an injected yield hook after each batch, so the caller decides
//! how to hand control back (pump the event loop, repaint a progress
//! footer, or nothing at all in tests).

use std::fmt;

use crate::model::{Align, Column, Fixed, Record, RowRef};

/// Default batch size
pub const DEFAULT_CHUNK_SIZE: usize = 1_000;

/// Batch iterator over `total` generated rows
pub struct ChunkedRows<F> {
    total: usize,
    chunk_size: usize,
    next: usize,
    make: F,
    on_yield: Option<Box<dyn FnMut(usize, usize)>>,
}

impl<F> fmt::Debug for ChunkedRows<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedRows")
            .field("total", &self.total)
            .field("chunk_size", &self.chunk_size)
            .field("next", &self.next)
            .finish()
    }
}

/// Generate `total` rows with `make(index)`, `chunk_size` at a time.
/// A zero chunk size is treated as 1.
pub fn generate<F>(total: usize, chunk_size: usize, make: F) -> ChunkedRows<F>
where
    F: FnMut(usize) -> RowRef,
{
    ChunkedRows {
        total,
        chunk_size: chunk_size.max(1),
        next: 0,
        make,
        on_yield: None,
    }
}

impl<F> ChunkedRows<F>
where
    F: FnMut(usize) -> RowRef,
{
    /// Called as `hook(produced, total)` after every batch
    pub fn with_yield(mut self, hook: impl FnMut(usize, usize) + 'static) -> Self {
        self.on_yield = Some(Box::new(hook));
        self
    }

    pub fn produced(&self) -> usize {
        self.next
    }

    /// Drain every batch into one vector
    pub fn collect_all(self) -> Vec<RowRef> {
        let total = self.total;
        self.fold(Vec::with_capacity(total), |mut acc, batch| {
            acc.extend(batch);
            acc
        })
    }
}

impl<F> Iterator for ChunkedRows<F>
where
    F: FnMut(usize) -> RowRef,
{
    type Item = Vec<RowRef>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let end = (self.next + self.chunk_size).min(self.total);
        let batch: Vec<RowRef> = (self.next..end).map(&mut self.make).collect();
        self.next = end;
        if let Some(hook) = self.on_yield.as_mut() {
            hook(self.next, self.total);
        }
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next).div_ceil(self.chunk_size);
        (remaining, Some(remaining))
    }
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances", "Edsger",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson", "Allen", "Dijkstra",
];
const CITIES: &[&str] = &["Oslo", "Lisbon", "Seoul", "Austin", "Nairobi", "Lima", "Osaka", "Tallinn"];

/// Deterministic mock row `index`, keyed `index`
pub fn mock_row(index: usize) -> RowRef {
    // Cheap integer hash so neighbouring rows look unrelated
    let h = (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17);
    let pick = |list: &[&'static str], salt: u32| list[((h >> salt) as usize) % list.len()];
    let name = format!("{} {}", pick(FIRST_NAMES, 3), pick(LAST_NAMES, 11));

    Record::new(index as u64)
        .with("id", index as i64)
        .with("name", name)
        .with("city", pick(CITIES, 23))
        .with("age", 18 + (h % 60) as i64)
        .with("score", ((h >> 8) % 10_000) as f64 / 100.0)
        .with("active", (h >> 5) & 1 == 1)
        .into_ref()
}

/// Columns matching [`mock_row`]
pub fn mock_columns() -> Vec<Column> {
    vec![
        Column::new("id", "ID").width(70.0).align(Align::Right).fixed(Fixed::Left).sortable(),
        Column::new("name", "Name").width(180.0).sortable().filterable(),
        Column::new("city", "City").sortable().filterable(),
        Column::new("age", "Age").width(80.0).align(Align::Right).sortable(),
        Column::new("score", "Score")
            .width(100.0)
            .align(Align::Right)
            .sortable()
            .formatter(|v, _| v.as_f64().map(|s| format!("{:.2}", s)).unwrap_or_default()),
        Column::new("active", "Active").width(90.0).align(Align::Center).filterable(),
    ]
}

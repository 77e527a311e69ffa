//! Column definitions

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::row::RowData;
use super::value::CellValue;

/// Default column width in logical pixels
pub const DEFAULT_COLUMN_WIDTH: f32 = 120.0;

/// Horizontal text alignment inside a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Edge a column is pinned to during horizontal scroll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fixed {
    #[default]
    None,
    Left,
    Right,
}

pub type Formatter = Arc<dyn Fn(&CellValue, &dyn RowData) -> String + Send + Sync>;
pub type Comparator = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;
/// Custom filter: `(accepted value, cell value) -> keep`
pub type FilterPredicate = Arc<dyn Fn(&str, &CellValue) -> bool + Send + Sync>;

/// One column of the grid. Immutable for the duration of a render pass.
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub title: String,
    /// Declared width in logical pixels
    pub width: f32,
    pub align: Align,
    pub fixed: Fixed,
    pub sortable: bool,
    pub filterable: bool,
    pub formatter: Option<Formatter>,
    pub comparator: Option<Comparator>,
    pub filter: Option<FilterPredicate>,
}

impl Column {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            width: DEFAULT_COLUMN_WIDTH,
            align: Align::Left,
            fixed: Fixed::None,
            sortable: false,
            filterable: false,
            formatter: None,
            comparator: None,
            filter: None,
        }
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn fixed(mut self, fixed: Fixed) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn formatter(
        mut self,
        f: impl Fn(&CellValue, &dyn RowData) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn comparator(
        mut self,
        f: impl Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Some(Arc::new(f));
        self.sortable = true;
        self
    }

    pub fn filter_with(mut self, f: impl Fn(&str, &CellValue) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(f));
        self.filterable = true;
        self
    }

    /// Display text for this column in the given row
    pub fn display(&self, row: &dyn RowData) -> String {
        let value = row.value(&self.key);
        match &self.formatter {
            Some(f) => f(&value, row),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("align", &self.align)
            .field("fixed", &self.fixed)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("formatter", &self.formatter.as_ref().map(|_| ".."))
            .field("comparator", &self.comparator.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Find a column by key
pub fn find_column<'a>(columns: &'a [Column], key: &str) -> Option<(usize, &'a Column)> {
    columns.iter().enumerate().find(|(_, c)| c.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::Record;

    #[test]
    fn test_display_uses_formatter() {
        let row = Record::new(1).with("price", 12.5);
        let plain = Column::new("price", "Price");
        assert_eq!(plain.display(&row), "12.5");

        let money = Column::new("price", "Price").formatter(|v, _| format!("${:.2}", v.as_f64().unwrap_or(0.0)));
        assert_eq!(money.display(&row), "$12.50");
    }

    #[test]
    fn test_negative_width_clamps() {
        assert_eq!(Column::new("a", "A").width(-10.0).width, 0.0);
        assert_eq!(Column::new("a", "A").width, DEFAULT_COLUMN_WIDTH);
    }
}

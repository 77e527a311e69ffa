//! Grid data model: values, rows, columns and selection

pub mod column;
pub mod row;
pub mod selection;
pub mod value;

pub use column::{find_column, Align, Column, Comparator, Fixed, Formatter, DEFAULT_COLUMN_WIDTH};
pub use row::{Record, RowData, RowKey, RowRef};
pub use selection::SelectionSet;
pub use value::{CellValue, ValueKind};

//! Sorting: sort descriptors, comparator resolution and stable multi-key sort

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::value::{bool_cmp, lexical_cmp, numeric_cmp, text_cmp};
use crate::model::{find_column, CellValue, Column, Comparator, RowData, RowRef, ValueKind};

use super::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascend,
    Descend,
}

impl SortDirection {
    /// Header click cycle: unsorted -> ascending -> descending -> unsorted
    pub fn cycle(current: Option<SortDirection>) -> Option<SortDirection> {
        match current {
            None => Some(SortDirection::Ascend),
            Some(SortDirection::Ascend) => Some(SortDirection::Descend),
            Some(SortDirection::Descend) => None,
        }
    }
}

/// One sort descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorter {
    pub field: String,
    pub direction: SortDirection,
    /// Explicit priority for multi-column sorting; higher wins
    pub priority: Option<u32>,
}

impl Sorter {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Ascend,
            priority: None,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Descend,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Ordered list of active sorters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub sorters: Vec<Sorter>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(sorter: Sorter) -> Self {
        Self {
            sorters: vec![sorter],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sorters.is_empty()
    }

    /// Current direction for a field, if it is sorted
    pub fn direction(&self, field: &str) -> Option<SortDirection> {
        self.sorters
            .iter()
            .find(|s| s.field == field)
            .map(|s| s.direction)
    }

    /// Advance a field through the header-click cycle, replacing other sorters
    pub fn cycle(&mut self, field: &str) {
        let next = SortDirection::cycle(self.direction(field));
        self.sorters.clear();
        if let Some(direction) = next {
            self.sorters.push(Sorter {
                field: field.to_string(),
                direction,
                priority: None,
            });
        }
    }

    pub fn clear(&mut self) {
        self.sorters.clear();
    }
}

/// Default comparators by value kind, consulted when a column has none
#[derive(Clone)]
pub struct ComparatorRegistry {
    by_kind: HashMap<ValueKind, Comparator>,
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ValueKind::Number, numeric_cmp);
        registry.register(ValueKind::Text, text_cmp);
        registry.register(ValueKind::Bool, bool_cmp);
        registry
    }
}

impl ComparatorRegistry {
    /// A registry without defaults; everything falls back to lexical order
    pub fn empty() -> Self {
        Self {
            by_kind: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        kind: ValueKind,
        cmp: impl Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    ) {
        self.by_kind.insert(kind, Arc::new(cmp));
    }

    /// Compare with the registered comparator for the values' shared kind,
    /// falling back to lexical order for unregistered or mixed kinds.
    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        let kind = match (a.kind(), b.kind()) {
            (ValueKind::Null, k) | (k, ValueKind::Null) => k,
            (ka, kb) if ka == kb => ka,
            _ => return lexical_cmp(a, b),
        };
        match self.by_kind.get(&kind) {
            Some(cmp) => cmp(a, b),
            None => lexical_cmp(a, b),
        }
    }
}

impl std::fmt::Debug for ComparatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparatorRegistry")
            .field("kinds", &self.by_kind.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A sorter bound to its column's comparator
struct ResolvedSorter<'a> {
    field: &'a str,
    direction: SortDirection,
    priority: Option<u32>,
    comparator: Option<&'a Comparator>,
}

impl ResolvedSorter<'_> {
    fn compare(&self, a: &dyn RowData, b: &dyn RowData, registry: &ComparatorRegistry) -> Ordering {
        let va = a.value(self.field);
        let vb = b.value(self.field);
        let ord = match self.comparator {
            Some(cmp) => cmp(&va, &vb),
            None => registry.compare(&va, &vb),
        };
        match self.direction {
            SortDirection::Ascend => ord,
            SortDirection::Descend => ord.reverse(),
        }
    }
}

fn resolve<'a>(
    sort: &'a SortState,
    columns: &'a [Column],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ResolvedSorter<'a>> {
    let mut resolved = Vec::with_capacity(sort.sorters.len());
    for sorter in &sort.sorters {
        match find_column(columns, &sorter.field) {
            None => {
                tracing::warn!(field = %sorter.field, "skipping sorter for unknown column");
                diagnostics.push(Diagnostic::UnknownSortField(sorter.field.clone()));
            }
            Some((_, column)) if !column.sortable => {
                tracing::warn!(field = %sorter.field, "skipping sorter for non-sortable column");
                diagnostics.push(Diagnostic::NotSortable(sorter.field.clone()));
            }
            Some((_, column)) => resolved.push(ResolvedSorter {
                field: &sorter.field,
                direction: sorter.direction,
                priority: sorter.priority,
                comparator: column.comparator.as_ref(),
            }),
        }
    }
    resolved
}

/// Sort one level of rows in place.
///
/// With any explicit priority the sorters form one composite comparator,
/// highest priority first. Without priorities each sorter is applied as a
/// successive stable sort in declaration order.
pub fn sort_rows(
    rows: &mut [RowRef],
    sort: &SortState,
    columns: &[Column],
    registry: &ComparatorRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut resolved = resolve(sort, columns, diagnostics);
    if resolved.is_empty() {
        return;
    }
    apply(rows, &mut resolved, registry, |r| r.as_ref());
}

/// Tree variant: sort every level independently without flattening
pub(crate) fn sort_tree(
    nodes: &mut [super::RowNode],
    sort: &SortState,
    columns: &[Column],
    registry: &ComparatorRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut resolved = resolve(sort, columns, diagnostics);
    if resolved.is_empty() {
        return;
    }
    sort_level(nodes, &mut resolved, registry);
}

fn sort_level(
    nodes: &mut [super::RowNode],
    resolved: &mut [ResolvedSorter<'_>],
    registry: &ComparatorRegistry,
) {
    apply(nodes, resolved, registry, |n| n.row.as_ref());
    for node in nodes.iter_mut() {
        sort_level(&mut node.children, resolved, registry);
    }
}

fn apply<T>(
    items: &mut [T],
    resolved: &mut [ResolvedSorter<'_>],
    registry: &ComparatorRegistry,
    row: impl Fn(&T) -> &dyn RowData,
) {
    if resolved.iter().any(|s| s.priority.is_some()) {
        resolved.sort_by_key(|s| Reverse(s.priority.unwrap_or(0)));
        items.sort_by(|a, b| {
            resolved.iter().fold(Ordering::Equal, |acc, s| {
                acc.then_with(|| s.compare(row(a), row(b), registry))
            })
        });
    } else {
        for sorter in resolved.iter() {
            items.sort_by(|a, b| sorter.compare(row(a), row(b), registry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn rows(values: &[i64]) -> Vec<RowRef> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Record::new(i as u64).with("v", *v).into_ref())
            .collect()
    }

    fn values(rows: &[RowRef]) -> Vec<CellValue> {
        rows.iter().map(|r| r.value("v")).collect()
    }

    #[test]
    fn test_cycle() {
        let mut state = SortState::new();
        state.cycle("v");
        assert_eq!(state.direction("v"), Some(SortDirection::Ascend));
        state.cycle("v");
        assert_eq!(state.direction("v"), Some(SortDirection::Descend));
        state.cycle("v");
        assert!(state.is_empty());
    }

    #[test]
    fn test_registry_falls_back_to_lexical() {
        let registry = ComparatorRegistry::empty();
        // "10" < "9" lexically
        assert_eq!(
            registry.compare(&CellValue::Int(10), &CellValue::Int(9)),
            Ordering::Less
        );
        let registry = ComparatorRegistry::default();
        assert_eq!(
            registry.compare(&CellValue::Int(10), &CellValue::Int(9)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_column_comparator_wins() {
        let columns = vec![Column::new("v", "V").comparator(|a, b| numeric_cmp(b, a))];
        let mut data = rows(&[1, 3, 2]);
        let mut diags = Vec::new();
        sort_rows(
            &mut data,
            &SortState::single(Sorter::asc("v")),
            &columns,
            &ComparatorRegistry::default(),
            &mut diags,
        );
        assert_eq!(values(&data), vec![CellValue::Int(3), CellValue::Int(2), CellValue::Int(1)]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unknown_and_unsortable_fields_are_skipped() {
        let columns = vec![Column::new("v", "V")];
        let mut data = rows(&[2, 1]);
        let mut diags = Vec::new();
        let state = SortState {
            sorters: vec![Sorter::asc("nope"), Sorter::asc("v")],
        };
        sort_rows(&mut data, &state, &columns, &ComparatorRegistry::default(), &mut diags);
        assert_eq!(values(&data), vec![CellValue::Int(2), CellValue::Int(1)]);
        assert_eq!(
            diags,
            vec![
                Diagnostic::UnknownSortField("nope".into()),
                Diagnostic::NotSortable("v".into())
            ]
        );
    }
}

//! Row pipeline tests - sorting, filtering, pagination, tree data

mod common;

use std::cmp::Ordering;

use common::{numbers, people, people_columns};
use gridcanvas::model::{CellValue, Column, Record, RowKey, RowRef};
use gridcanvas::pipeline::{
    Diagnostic, FilterSpec, FilterState, Pagination, PipelineModes, PipelineQuery, RowNode,
    RowPipeline, SortState, Sorter,
};

fn values(rows: &[RowRef], field: &str) -> Vec<CellValue> {
    rows.iter().map(|r| r.value(field)).collect()
}

fn keys(rows: &[RowRef]) -> Vec<u64> {
    rows.iter().map(|r| r.key().0).collect()
}

fn number_columns() -> Vec<Column> {
    vec![Column::new("n", "N").sortable().filterable()]
}

fn ints(values: &[i64]) -> Vec<CellValue> {
    values.iter().map(|&v| CellValue::Int(v)).collect()
}

// ========================================================================
// Sorting
// ========================================================================

#[test]
fn test_sort_ascending_and_descending() {
    let rows = numbers(&[3, 1, 2]);
    let columns = number_columns();
    let pipeline = RowPipeline::new();

    let asc = SortState::single(Sorter::asc("n"));
    let out = pipeline.run(&rows, &columns, PipelineQuery { sort: Some(&asc), ..Default::default() });
    assert_eq!(values(&out.rows, "n"), ints(&[1, 2, 3]));

    let desc = SortState::single(Sorter::desc("n"));
    let out = pipeline.run(&rows, &columns, PipelineQuery { sort: Some(&desc), ..Default::default() });
    assert_eq!(values(&out.rows, "n"), ints(&[3, 2, 1]));
}

#[test]
fn test_sort_does_not_touch_input() {
    let rows = numbers(&[3, 1, 2]);
    let sort = SortState::single(Sorter::asc("n"));
    RowPipeline::new().run(&rows, &number_columns(), PipelineQuery { sort: Some(&sort), ..Default::default() });
    assert_eq!(values(&rows, "n"), ints(&[3, 1, 2]));
}

#[test]
fn test_sort_is_stable_for_equal_values() {
    let rows = numbers(&[2, 1, 2, 1, 2]);
    let sort = SortState::single(Sorter::asc("n"));
    let out = RowPipeline::new().run(&rows, &number_columns(), PipelineQuery { sort: Some(&sort), ..Default::default() });
    assert_eq!(keys(&out.rows), vec![1, 3, 0, 2, 4]);
}

#[test]
fn test_numbers_sort_numerically_not_lexically() {
    let rows = numbers(&[10, 9, 100]);
    let sort = SortState::single(Sorter::asc("n"));
    let out = RowPipeline::new().run(&rows, &number_columns(), PipelineQuery { sort: Some(&sort), ..Default::default() });
    assert_eq!(values(&out.rows, "n"), ints(&[9, 10, 100]));
}

#[test]
fn test_priority_orders_composite_sort() {
    let rows: Vec<RowRef> = [("b", 1), ("a", 2), ("a", 1), ("b", 2)]
        .iter()
        .enumerate()
        .map(|(i, (group, n))| Record::new(i as u64).with("group", *group).with("n", *n as i64).into_ref())
        .collect();
    let columns = vec![Column::new("group", "Group").sortable(), Column::new("n", "N").sortable()];

    // Group is the primary key because its priority is higher
    let sort = SortState {
        sorters: vec![Sorter::desc("n").with_priority(1), Sorter::asc("group").with_priority(2)],
    };
    let out = RowPipeline::new().run(&rows, &columns, PipelineQuery { sort: Some(&sort), ..Default::default() });
    assert_eq!(keys(&out.rows), vec![1, 2, 3, 0]);
}

#[test]
fn test_column_comparator_wins_over_registry() {
    let rows = numbers(&[1, 3, 2]);
    let columns = vec![Column::new("n", "N").sortable().comparator(|a, b| {
        // Reverse numeric order
        b.as_f64().partial_cmp(&a.as_f64()).unwrap_or(Ordering::Equal)
    })];
    let sort = SortState::single(Sorter::asc("n"));
    let out = RowPipeline::new().run(&rows, &columns, PipelineQuery { sort: Some(&sort), ..Default::default() });
    assert_eq!(values(&out.rows, "n"), ints(&[3, 2, 1]));
}

#[test]
fn test_unknown_and_unsortable_fields_are_skipped() {
    let rows = numbers(&[3, 1, 2]);
    let columns = vec![Column::new("n", "N")];
    let sort = SortState {
        sorters: vec![Sorter::asc("missing"), Sorter::asc("n")],
    };
    let out = RowPipeline::new().run(&rows, &columns, PipelineQuery { sort: Some(&sort), ..Default::default() });

    assert_eq!(values(&out.rows, "n"), ints(&[3, 1, 2]));
    assert_eq!(
        out.diagnostics,
        vec![Diagnostic::UnknownSortField("missing".into()), Diagnostic::NotSortable("n".into())]
    );
}

// ========================================================================
// Filtering
// ========================================================================

#[test]
fn test_value_filter_keeps_listed_values() {
    let rows = numbers(&[1, 2, 3, 2]);
    let filter = FilterState::new().with("n", FilterSpec::values(["2", "3"]));
    let out = RowPipeline::new().run(&rows, &number_columns(), PipelineQuery { filter: Some(&filter), ..Default::default() });
    assert_eq!(keys(&out.rows), vec![1, 2, 3]);
    assert_eq!(out.filtered_count, 3);
}

#[test]
fn test_keyword_filter_ignores_case() {
    let rows = people(12);
    let filter = FilterState::new().with("name", FilterSpec::keyword("PERSON 1"));
    let out = RowPipeline::new().run(&rows, &people_columns(), PipelineQuery { filter: Some(&filter), ..Default::default() });
    // person 1, person 10, person 11
    assert_eq!(keys(&out.rows), vec![1, 10, 11]);
}

#[test]
fn test_empty_filters_are_inactive() {
    let rows = people(5);
    let filter = FilterState::new()
        .with("name", FilterSpec::keyword("   "))
        .with("age", FilterSpec::values(Vec::<String>::new()));
    assert!(filter.is_empty());

    let out = RowPipeline::new().run(&rows, &people_columns(), PipelineQuery { filter: Some(&filter), ..Default::default() });
    assert_eq!(out.rows.len(), 5);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn test_filter_on_unfilterable_column_is_reported() {
    let rows = people(5);
    let filter = FilterState::new().with("age", FilterSpec::values(["20"]));
    let out = RowPipeline::new().run(&rows, &people_columns(), PipelineQuery { filter: Some(&filter), ..Default::default() });
    assert_eq!(out.rows.len(), 5);
    assert_eq!(out.diagnostics, vec![Diagnostic::NotFilterable("age".into())]);
}

#[test]
fn test_custom_filter_predicate() {
    let rows = numbers(&[5, 15, 25]);
    let columns = vec![Column::new("n", "N")
        .filterable()
        .filter_with(|accepted, value| match accepted {
            "big" => value.as_f64().is_some_and(|v| v > 10.0),
            _ => false,
        })];
    let filter = FilterState::new().with("n", FilterSpec::values(["big"]));
    let out = RowPipeline::new().run(&rows, &columns, PipelineQuery { filter: Some(&filter), ..Default::default() });
    assert_eq!(values(&out.rows, "n"), ints(&[15, 25]));
}

// ========================================================================
// Pagination
// ========================================================================

#[test]
fn test_pagination_slices_after_sort_and_filter() {
    let rows = numbers(&[9, 8, 7, 6, 5, 4, 3, 2, 1]);
    let sort = SortState::single(Sorter::asc("n"));
    let filter = FilterState::new().with("n", FilterSpec::values(["1", "2", "3", "4", "5", "6", "7"]));
    let out = RowPipeline::new().run(
        &rows,
        &number_columns(),
        PipelineQuery {
            sort: Some(&sort),
            filter: Some(&filter),
            page: Some(Pagination::new(2, 3)),
        },
    );
    assert_eq!(values(&out.rows, "n"), ints(&[4, 5, 6]));
    assert_eq!(out.filtered_count, 7);
    assert_eq!(out.page_count, 3);
}

#[test]
fn test_out_of_range_page_is_clamped() {
    let rows = numbers(&[1, 2, 3, 4, 5]);
    let pipeline = RowPipeline::new();

    let out = pipeline.run(&rows, &number_columns(), PipelineQuery { page: Some(Pagination::new(99, 2)), ..Default::default() });
    assert_eq!(values(&out.rows, "n"), ints(&[5]));

    let out = pipeline.run(&rows, &number_columns(), PipelineQuery { page: Some(Pagination::new(0, 2)), ..Default::default() });
    assert_eq!(values(&out.rows, "n"), ints(&[1, 2]));
}

#[test]
fn test_zero_page_size_is_ignored() {
    let rows = numbers(&[1, 2, 3]);
    let out = RowPipeline::new().run(&rows, &number_columns(), PipelineQuery { page: Some(Pagination::new(1, 0)), ..Default::default() });
    assert_eq!(out.rows.len(), 3);
    assert_eq!(out.diagnostics, vec![Diagnostic::ZeroPageSize]);
}

#[test]
fn test_empty_input_has_one_page() {
    let out = RowPipeline::new().run(&[], &number_columns(), PipelineQuery { page: Some(Pagination::new(1, 10)), ..Default::default() });
    assert!(out.rows.is_empty());
    assert_eq!(out.page_count, 1);
}

#[test]
fn test_remote_modes_pass_rows_through() {
    let rows = numbers(&[3, 1, 2]);
    let sort = SortState::single(Sorter::asc("n"));
    let filter = FilterState::new().with("n", FilterSpec::values(["1"]));
    let out = RowPipeline::new().with_modes(PipelineModes::remote()).run(
        &rows,
        &number_columns(),
        PipelineQuery {
            sort: Some(&sort),
            filter: Some(&filter),
            page: Some(Pagination::new(1, 1)),
        },
    );
    assert_eq!(values(&out.rows, "n"), ints(&[3, 1, 2]));
}

// ========================================================================
// Tree data
// ========================================================================

fn tree_rows() -> Vec<RowRef> {
    let leaf = |key: u64, name: &str| Record::new(key).with("name", name).into_ref();
    vec![
        Record::new(1)
            .with("name", "beta")
            .with_children(vec![leaf(11, "zulu"), leaf(12, "alpha")])
            .into_ref(),
        Record::new(2)
            .with("name", "alpha")
            .with_children(vec![leaf(21, "match me")])
            .into_ref(),
        leaf(3, "gamma"),
    ]
}

fn tree_columns() -> Vec<Column> {
    vec![Column::new("name", "Name").sortable().filterable()]
}

#[test]
fn test_tree_sorts_each_level() {
    let sort = SortState::single(Sorter::asc("name"));
    let out = RowPipeline::new().run_tree(&tree_rows(), &tree_columns(), PipelineQuery { sort: Some(&sort), ..Default::default() });
    let flat = RowNode::flatten(&out.roots);

    let order: Vec<(u64, usize)> = flat.iter().map(|(r, d)| (r.key().0, *d)).collect();
    assert_eq!(order, vec![(2, 0), (21, 1), (1, 0), (12, 1), (11, 1), (3, 0)]);
}

#[test]
fn test_tree_filter_keeps_ancestors() {
    let filter = FilterState::new().with("name", FilterSpec::keyword("match"));
    let out = RowPipeline::new().run_tree(&tree_rows(), &tree_columns(), PipelineQuery { filter: Some(&filter), ..Default::default() });
    let flat = RowNode::flatten(&out.roots);

    let order: Vec<RowKey> = flat.iter().map(|(r, _)| r.key()).collect();
    assert_eq!(order, vec![RowKey(2), RowKey(21)]);
    assert_eq!(out.filtered_count, 1);
}

#[test]
fn test_tree_paginates_roots() {
    let out = RowPipeline::new().run_tree(
        &tree_rows(),
        &tree_columns(),
        PipelineQuery { page: Some(Pagination::new(1, 1)), ..Default::default() },
    );
    assert_eq!(out.roots.len(), 1);
    assert_eq!(out.page_count, 3);
    // Children come along with their root
    assert_eq!(RowNode::flatten(&out.roots).len(), 3);
}

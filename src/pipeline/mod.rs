//! Row pipeline: filter, sort and paginate raw rows before rendering
//!
//! ```text
//! raw rows ──► filter ──► sort ──► paginate ──► PipelineOutput.rows
//! ```
//!
//! Each stage can be switched to [`PipelineMode::Remote`], in which case it
//! passes rows through untouched and the host is expected to fetch the right
//! slice itself. Malformed descriptors never abort a run: they are skipped and
//! reported as [`Diagnostic`]s.

mod filter;
mod page;
mod sort;

use std::fmt;

pub use filter::{FilterSpec, FilterState};
pub use page::Pagination;
pub use sort::{sort_rows, ComparatorRegistry, SortDirection, SortState, Sorter};

use crate::model::{Column, RowRef};

/// Where a pipeline stage is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineMode {
    #[default]
    Local,
    /// The host computes this stage; the pipeline passes rows through
    Remote,
}

/// Per-stage modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineModes {
    pub sort: PipelineMode,
    pub filter: PipelineMode,
    pub paginate: PipelineMode,
}

impl PipelineModes {
    pub fn remote() -> Self {
        Self {
            sort: PipelineMode::Remote,
            filter: PipelineMode::Remote,
            paginate: PipelineMode::Remote,
        }
    }
}

/// A descriptor the pipeline had to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownSortField(String),
    NotSortable(String),
    UnknownFilterField(String),
    NotFilterable(String),
    ZeroPageSize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownSortField(field) => write!(f, "sorter references unknown column '{}'", field),
            Diagnostic::NotSortable(field) => write!(f, "column '{}' is not sortable", field),
            Diagnostic::UnknownFilterField(field) => write!(f, "filter references unknown column '{}'", field),
            Diagnostic::NotFilterable(field) => write!(f, "column '{}' is not filterable", field),
            Diagnostic::ZeroPageSize => write!(f, "page size must be greater than zero"),
        }
    }
}

/// Result of a pipeline run over flat rows
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Rows the renderer treats as "all rows"
    pub rows: Vec<RowRef>,
    /// Row count after filtering, before pagination
    pub filtered_count: usize,
    pub page_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// A row with its (already processed) children
#[derive(Debug, Clone)]
pub struct RowNode {
    pub row: RowRef,
    pub children: Vec<RowNode>,
}

impl RowNode {
    /// Build a node tree from `RowData::children`
    pub fn build(row: RowRef) -> Self {
        let children = row.children().into_iter().map(RowNode::build).collect();
        Self { row, children }
    }

    /// Depth-first rows with their depth, parents before children
    pub fn flatten(nodes: &[RowNode]) -> Vec<(RowRef, usize)> {
        fn walk(nodes: &[RowNode], depth: usize, out: &mut Vec<(RowRef, usize)>) {
            for node in nodes {
                out.push((node.row.clone(), depth));
                walk(&node.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(nodes, 0, &mut out);
        out
    }
}

/// Result of a pipeline run over tree-shaped rows
#[derive(Debug, Clone, Default)]
pub struct TreeOutput {
    pub roots: Vec<RowNode>,
    pub filtered_count: usize,
    pub page_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Sorter, filter and pagination descriptors for one run
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineQuery<'a> {
    pub sort: Option<&'a SortState>,
    pub filter: Option<&'a FilterState>,
    pub page: Option<Pagination>,
}

/// Applies filters, sorters and pagination to a raw row collection
#[derive(Debug, Clone, Default)]
pub struct RowPipeline {
    pub registry: ComparatorRegistry,
    pub modes: PipelineModes,
}

impl RowPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ComparatorRegistry) -> Self {
        Self {
            registry,
            modes: PipelineModes::default(),
        }
    }

    pub fn with_modes(mut self, modes: PipelineModes) -> Self {
        self.modes = modes;
        self
    }

    /// Produce the exact row sequence the renderer should show
    pub fn run(&self, rows: &[RowRef], columns: &[Column], query: PipelineQuery<'_>) -> PipelineOutput {
        let mut diagnostics = Vec::new();

        let mut out: Vec<RowRef> = match (query.filter, self.modes.filter) {
            (Some(state), PipelineMode::Local) => {
                let resolved = filter::resolve(state, columns, &mut diagnostics);
                rows.iter()
                    .filter(|r| filter::passes(&resolved, r.as_ref()))
                    .cloned()
                    .collect()
            }
            _ => rows.to_vec(),
        };

        if let (Some(state), PipelineMode::Local) = (query.sort, self.modes.sort) {
            sort::sort_rows(&mut out, state, columns, &self.registry, &mut diagnostics);
        }

        let filtered_count = out.len();
        let (out, page_count) = self.paginate(out, query.page, &mut diagnostics);

        tracing::debug!(
            input = rows.len(),
            filtered = filtered_count,
            output = out.len(),
            skipped = diagnostics.len(),
            "pipeline run"
        );

        PipelineOutput {
            rows: out,
            filtered_count,
            page_count,
            diagnostics,
        }
    }

    /// Tree variant: filter keeps ancestors of matches, each level sorts
    /// independently, pagination applies to root nodes.
    pub fn run_tree(&self, rows: &[RowRef], columns: &[Column], query: PipelineQuery<'_>) -> TreeOutput {
        let mut diagnostics = Vec::new();
        let mut roots: Vec<RowNode> = rows.iter().cloned().map(RowNode::build).collect();

        if let (Some(state), PipelineMode::Local) = (query.filter, self.modes.filter) {
            let resolved = filter::resolve(state, columns, &mut diagnostics);
            if !resolved.is_empty() {
                roots = prune(roots, &resolved);
            }
        }

        if let (Some(state), PipelineMode::Local) = (query.sort, self.modes.sort) {
            sort::sort_tree(&mut roots, state, columns, &self.registry, &mut diagnostics);
        }

        let filtered_count = roots.len();
        let (roots, page_count) = self.paginate(roots, query.page, &mut diagnostics);

        TreeOutput {
            roots,
            filtered_count,
            page_count,
            diagnostics,
        }
    }

    fn paginate<T>(
        &self,
        mut items: Vec<T>,
        page: Option<Pagination>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (Vec<T>, usize) {
        let Some(page) = page else {
            return (items, 1);
        };
        if self.modes.paginate == PipelineMode::Remote {
            return (items, 1);
        }
        if page.page_size == 0 {
            tracing::warn!("ignoring pagination with zero page size");
            diagnostics.push(Diagnostic::ZeroPageSize);
            return (items, 1);
        }
        let page_count = page.page_count(items.len());
        let range = page.slice(items.len());
        items.truncate(range.end);
        items.drain(..range.start);
        (items, page_count)
    }
}

/// Keep nodes that match or have a matching descendant
fn prune(nodes: Vec<RowNode>, filters: &[filter::ResolvedFilter<'_>]) -> Vec<RowNode> {
    nodes
        .into_iter()
        .filter_map(|mut node| {
            node.children = prune(std::mem::take(&mut node.children), filters);
            if !node.children.is_empty() || filter::passes(filters, node.row.as_ref()) {
                Some(node)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Record, RowData};

    fn numbered(n: u64) -> Vec<RowRef> {
        (1..=n).map(|i| Record::new(i).with("id", i as i64).into_ref()).collect()
    }

    fn id_columns() -> Vec<Column> {
        vec![Column::new("id", "Id").sortable()]
    }

    #[test]
    fn test_remote_modes_pass_through() {
        let rows = numbered(30);
        let sort = SortState::single(Sorter::desc("id"));
        let pipeline = RowPipeline::new().with_modes(PipelineModes::remote());
        let out = pipeline.run(
            &rows,
            &id_columns(),
            PipelineQuery {
                sort: Some(&sort),
                filter: None,
                page: Some(Pagination::new(2, 10)),
            },
        );
        assert_eq!(out.rows.len(), 30);
        assert_eq!(out.rows[0].key(), rows[0].key());
    }

    #[test]
    fn test_zero_page_size_is_skipped() {
        let rows = numbered(5);
        let out = RowPipeline::new().run(
            &rows,
            &id_columns(),
            PipelineQuery {
                page: Some(Pagination::new(1, 0)),
                ..Default::default()
            },
        );
        assert_eq!(out.rows.len(), 5);
        assert_eq!(out.diagnostics, vec![Diagnostic::ZeroPageSize]);
    }

    #[test]
    fn test_tree_sort_keeps_hierarchy() {
        let child = |k: u64, v: i64| Record::new(k).with("id", v).into_ref();
        let a = Record::new(1)
            .with("id", 2i64)
            .with_children(vec![child(11, 9), child(12, 3)])
            .into_ref();
        let b = Record::new(2).with("id", 1i64).into_ref();
        let sort = SortState::single(Sorter::asc("id"));
        let out = RowPipeline::new().run_tree(
            &[a, b],
            &id_columns(),
            PipelineQuery {
                sort: Some(&sort),
                ..Default::default()
            },
        );
        assert_eq!(out.roots.len(), 2);
        assert_eq!(out.roots[0].row.value("id"), CellValue::Int(1));
        let kids: Vec<_> = out.roots[1].children.iter().map(|n| n.row.value("id")).collect();
        assert_eq!(kids, vec![CellValue::Int(3), CellValue::Int(9)]);

        let flat = RowNode::flatten(&out.roots);
        let depths: Vec<_> = flat.iter().map(|(_, d)| *d).collect();
        assert_eq!(depths, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_tree_filter_keeps_ancestors() {
        let leaf = Record::new(11).with("name", "needle").into_ref();
        let parent = Record::new(1)
            .with("name", "hay")
            .with_children(vec![leaf])
            .into_ref();
        let other = Record::new(2).with("name", "hay").into_ref();
        let columns = vec![Column::new("name", "Name").filterable()];
        let filter = FilterState::new().with("name", FilterSpec::keyword("need"));
        let out = RowPipeline::new().run_tree(
            &[parent, other],
            &columns,
            PipelineQuery {
                filter: Some(&filter),
                ..Default::default()
            },
        );
        assert_eq!(out.roots.len(), 1);
        assert_eq!(out.roots[0].row.key(), crate::model::RowKey(1));
        assert_eq!(out.roots[0].children.len(), 1);
    }
}

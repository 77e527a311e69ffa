//! Filtering: per-field accepted-value sets and keyword search

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{find_column, CellValue, Column, RowData};

use super::Diagnostic;

/// How a field filters its rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// Keep rows whose stringified value is one of these
    Values(BTreeSet<String>),
    /// Keep rows whose stringified value contains this text, ignoring case
    Keyword(String),
}

impl FilterSpec {
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterSpec::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn keyword(text: &str) -> Self {
        FilterSpec::Keyword(text.to_string())
    }

    /// An empty value set or blank keyword filters nothing
    pub fn is_active(&self) -> bool {
        match self {
            FilterSpec::Values(set) => !set.is_empty(),
            FilterSpec::Keyword(text) => !text.trim().is_empty(),
        }
    }
}

/// Active filters keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub filters: BTreeMap<String, FilterSpec>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, spec: FilterSpec) {
        self.filters.insert(field.to_string(), spec);
    }

    pub fn with(mut self, field: &str, spec: FilterSpec) -> Self {
        self.set(field, spec);
        self
    }

    pub fn remove(&mut self, field: &str) {
        self.filters.remove(field);
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// True when `field` has a filter that actually restricts rows
    pub fn is_active(&self, field: &str) -> bool {
        self.filters.get(field).is_some_and(FilterSpec::is_active)
    }

    pub fn is_empty(&self) -> bool {
        !self.filters.values().any(FilterSpec::is_active)
    }
}

/// A filter bound to its column
pub(crate) struct ResolvedFilter<'a> {
    column: &'a Column,
    spec: &'a FilterSpec,
    /// Lowercased keyword, computed once per pipeline run
    needle: Option<String>,
}

impl ResolvedFilter<'_> {
    pub(crate) fn matches(&self, row: &dyn RowData) -> bool {
        let value = row.value(&self.column.key);
        match self.spec {
            FilterSpec::Values(accepted) => match &self.column.filter {
                Some(predicate) => accepted.iter().any(|a| predicate(a, &value)),
                None => accepted.contains(&value.to_string()),
            },
            FilterSpec::Keyword(_) => {
                let needle = self.needle.as_deref().unwrap_or_default();
                keyword_match(&value, needle)
            }
        }
    }
}

fn keyword_match(value: &CellValue, needle_lower: &str) -> bool {
    value.to_string().to_lowercase().contains(needle_lower)
}

pub(crate) fn resolve<'a>(
    filter: &'a FilterState,
    columns: &'a [Column],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ResolvedFilter<'a>> {
    let mut resolved = Vec::new();
    for (field, spec) in &filter.filters {
        if !spec.is_active() {
            continue;
        }
        match find_column(columns, field) {
            None => {
                tracing::warn!(field = %field, "skipping filter for unknown column");
                diagnostics.push(Diagnostic::UnknownFilterField(field.clone()));
            }
            Some((_, column)) if !column.filterable => {
                tracing::warn!(field = %field, "skipping filter for non-filterable column");
                diagnostics.push(Diagnostic::NotFilterable(field.clone()));
            }
            Some((_, column)) => resolved.push(ResolvedFilter {
                column,
                spec,
                needle: match spec {
                    FilterSpec::Keyword(text) => Some(text.trim().to_lowercase()),
                    FilterSpec::Values(_) => None,
                },
            }),
        }
    }
    resolved
}

/// True when the row passes every resolved filter
pub(crate) fn passes(filters: &[ResolvedFilter<'_>], row: &dyn RowData) -> bool {
    filters.iter().all(|f| f.matches(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").filterable(),
            Column::new("city", "City").filterable(),
            Column::new("id", "Id"),
        ]
    }

    #[test]
    fn test_keyword_is_case_insensitive_substring() {
        let cols = columns();
        let state = FilterState::new().with("name", FilterSpec::keyword("LOV"));
        let mut diags = Vec::new();
        let resolved = resolve(&state, &cols, &mut diags);
        assert!(passes(&resolved, &Record::new(1).with("name", "Ada Lovelace")));
        assert!(!passes(&resolved, &Record::new(2).with("name", "Grace Hopper")));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_value_set_matches_stringified_value() {
        let cols = columns();
        let state = FilterState::new().with("city", FilterSpec::values(["Oslo", "Bergen"]));
        let resolved = resolve(&state, &cols, &mut Vec::new());
        assert!(passes(&resolved, &Record::new(1).with("city", "Oslo")));
        assert!(!passes(&resolved, &Record::new(2).with("city", "Paris")));
    }

    #[test]
    fn test_inactive_and_invalid_filters() {
        let cols = columns();
        let state = FilterState::new()
            .with("name", FilterSpec::values(Vec::<String>::new()))
            .with("id", FilterSpec::keyword("1"))
            .with("ghost", FilterSpec::keyword("x"));
        let mut diags = Vec::new();
        let resolved = resolve(&state, &cols, &mut diags);
        assert!(resolved.is_empty());
        assert_eq!(
            diags,
            vec![
                Diagnostic::UnknownFilterField("ghost".into()),
                Diagnostic::NotFilterable("id".into()),
            ]
        );
    }

    #[test]
    fn test_custom_predicate() {
        let cols = vec![Column::new("age", "Age").filter_with(|accepted, value| {
            let min: f64 = accepted.parse().unwrap_or(0.0);
            value.as_f64().is_some_and(|v| v >= min)
        })];
        let state = FilterState::new().with("age", FilterSpec::values(["30"]));
        let resolved = resolve(&state, &cols, &mut Vec::new());
        assert!(passes(&resolved, &Record::new(1).with("age", 42i64)));
        assert!(!passes(&resolved, &Record::new(2).with("age", 12i64)));
    }
}

//! Conjunctive, case-insensitive equality filters over a [`Dataset`].
//!
//! A [`FilterSpec`] names a subset of columns and the value each must hold.
//! Columns left out impose nothing, so an empty spec yields the full view.

use std::fmt;

use anyhow::{Context, Result as AnyResult, anyhow};
use log::{info, warn};

use crate::{
    cli::FilterArgs,
    dataset::{Dataset, Row, Table},
    error::{Result, SheetError},
    session::Session,
    source, table,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    conditions: Vec<FilterCondition>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `column` to equal `value`. Setting a column again replaces
    /// its previous value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.conditions.iter_mut().find(|c| c.column == column) {
            Some(existing) => existing.value = value,
            None => self.conditions.push(FilterCondition { column, value }),
        }
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Parses `column=value` expressions; values may be single or double quoted.
    pub fn parse(expressions: &[String]) -> AnyResult<Self> {
        let mut spec = Self::new();
        for expression in expressions {
            let trimmed = expression.trim();
            let (column, value) = trimmed
                .split_once('=')
                .ok_or_else(|| anyhow!("Failed to parse filter expression '{trimmed}'"))?;
            let column = column.trim();
            if column.is_empty() {
                return Err(anyhow!("Filter expression '{trimmed}' is missing a column"));
            }
            spec.set(column, unquote(value.trim()));
        }
        Ok(spec)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut spec = Self::new();
        for (column, value) in iter {
            spec.set(column, value);
        }
        spec
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Signals that a filter matched nothing. Not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyResultWarning {
    pub conditions: usize,
}

impl fmt::Display for EmptyResultWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No rows match the {} active filter condition(s)",
            self.conditions
        )
    }
}

/// Ordered subsequence of a dataset's rows.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    columns: &'a [String],
    rows: Vec<&'a Row>,
    conditions: usize,
}

impl<'a> FilteredView<'a> {
    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn rows(&self) -> &[&'a Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn warning(&self) -> Option<EmptyResultWarning> {
        self.rows.is_empty().then_some(EmptyResultWarning {
            conditions: self.conditions,
        })
    }

    pub fn to_table(&self) -> Table {
        Table {
            columns: self.columns.to_vec(),
            rows: self.rows.iter().map(|row| row.cells().to_vec()).collect(),
        }
    }
}

struct ResolvedCondition {
    index: usize,
    needle: String,
}

pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> Result<FilteredView<'a>> {
    let mut resolved = Vec::with_capacity(spec.conditions.len());
    for condition in &spec.conditions {
        let index = dataset
            .column_index(&condition.column)
            .ok_or_else(|| SheetError::UnknownColumn(condition.column.clone()))?;
        if condition.value.is_empty() {
            continue;
        }
        resolved.push(ResolvedCondition {
            index,
            needle: condition.value.to_lowercase(),
        });
    }

    let rows = dataset
        .current_view()
        .iter()
        .filter(|row| {
            resolved.iter().all(|condition| {
                row.get(condition.index)
                    .is_some_and(|cell| cell.to_lowercase() == condition.needle)
            })
        })
        .collect::<Vec<_>>();

    Ok(FilteredView {
        columns: dataset.columns(),
        rows,
        conditions: resolved.len(),
    })
}

pub fn execute(args: &FilterArgs) -> AnyResult<()> {
    let mut session = Session::new(crate::load_config(args.config.as_deref())?);
    crate::upload_from_path(&mut session, &args.input)?;
    let spec = FilterSpec::parse(&args.filters)?;
    let view = session
        .filter(&spec)
        .with_context(|| format!("Filtering {:?}", args.input))?;

    if let Some(warning) = view.warning() {
        warn!("{warning}");
    }

    match &args.output {
        Some(output) => {
            let bytes = session
                .export_rows(
                    view.columns(),
                    view.rows().iter().map(|row| row.cells()),
                    output,
                )
                .with_context(|| format!("Serializing filtered rows for {output:?}"))?;
            source::export_to_path(output, &bytes)
                .with_context(|| format!("Writing {output:?}"))?;
            info!("Wrote {} row(s) to {:?}", view.len(), output);
        }
        None => {
            let filtered = view.to_table();
            table::print_table(&filtered.columns, &filtered.rows);
            info!(
                "Displayed {} of {} row(s) from {:?}",
                view.len(),
                session.dataset()?.len(),
                args.input
            );
        }
    }
    Ok(())
}

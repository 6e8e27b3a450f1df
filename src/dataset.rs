//! The session-owned table of canonical rows.
//!
//! A [`Dataset`] is built once from raw source rows and then only ever grows:
//! [`Dataset::append`] either adds one fully normalized row at the end or
//! leaves the table untouched. Column order is fixed at load time.
//!
//! Uniqueness is a policy applied at insertion time only. Rows loaded from the
//! source are accepted as-is even when they would violate it.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    cell::{self, RawCell, SENTINEL},
    error::{Result, SheetError},
    profile::{self, ClassifierPolicy, ColumnProfile},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UniquenessPolicy {
    /// Reject a row whose first-column value is already present.
    #[default]
    FirstColumnKey,
    /// Reject a row only when every cell matches an existing row.
    WholeRow,
}

/// One canonical row, cells aligned with [`Dataset::columns`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row(Vec<String>);

impl Row {
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[String]> for Row {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

/// User-entered values keyed by column name, prior to normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRow {
    values: BTreeMap<String, String>,
}

impl CandidateRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CandidateRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Owned copy of a column list plus rows, detached from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Row>,
    policy: UniquenessPolicy,
}

impl Dataset {
    /// Builds the store from positional rows. Short rows are filled with the
    /// sentinel; rows wider than `columns` cannot be reconciled.
    pub fn load(
        columns: Vec<String>,
        rows: Vec<Vec<RawCell>>,
        policy: UniquenessPolicy,
    ) -> Result<Self> {
        let index = build_column_index(&columns)?;
        let width = columns.len();
        let mut normalized = Vec::with_capacity(rows.len());
        for (row_idx, raw) in rows.into_iter().enumerate() {
            if raw.len() > width {
                return Err(SheetError::MalformedSource(format!(
                    "Row {} has {} cell(s) but the header defines {} column(s)",
                    row_idx + 1,
                    raw.len(),
                    width
                )));
            }
            let mut cells = raw.iter().map(cell::normalize).collect::<Vec<_>>();
            cells.resize(width, SENTINEL.to_string());
            normalized.push(Row(cells));
        }
        debug!(
            "Loaded {} row(s) across {} column(s)",
            normalized.len(),
            width
        );
        Ok(Self {
            columns,
            index,
            rows: normalized,
            policy,
        })
    }

    /// Builds the store from keyed records. Column order comes from `columns`
    /// when given, otherwise from the first record.
    pub fn load_records(
        records: Vec<Vec<(String, RawCell)>>,
        columns: Option<Vec<String>>,
        policy: UniquenessPolicy,
    ) -> Result<Self> {
        let columns = match columns {
            Some(columns) => columns,
            None => records
                .first()
                .map(|record| record.iter().map(|(name, _)| name.clone()).collect())
                .unwrap_or_default(),
        };
        let index = build_column_index(&columns)?;
        let mut rows = Vec::with_capacity(records.len());
        for (row_idx, record) in records.into_iter().enumerate() {
            let mut cells = vec![RawCell::Empty; columns.len()];
            for (name, value) in record {
                let Some(&col_idx) = index.get(&name) else {
                    return Err(SheetError::MalformedSource(format!(
                        "Record {} has column '{}' outside the established column set",
                        row_idx + 1,
                        name
                    )));
                };
                cells[col_idx] = value;
            }
            rows.push(cells);
        }
        Self::load(columns, rows, policy)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn policy(&self) -> UniquenessPolicy {
        self.policy
    }

    /// Read-only view of every row in insertion order.
    pub fn current_view(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_table(&self) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().map(|row| row.0.clone()).collect(),
        }
    }

    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| SheetError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(move |row| row.0[idx].as_str()))
    }

    pub fn column_profile(&self, name: &str, policy: ClassifierPolicy) -> Result<ColumnProfile> {
        let values = self.column_values(name)?;
        Ok(profile::classify(name, values, policy))
    }

    pub fn profiles(&self, policy: ClassifierPolicy) -> Vec<ColumnProfile> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                profile::classify(
                    name,
                    self.rows.iter().map(|row| row.0[idx].as_str()),
                    policy,
                )
            })
            .collect()
    }

    /// Normalizes `candidate`, checks it against the uniqueness policy, and
    /// appends it. Returns the new row count.
    pub fn append(&mut self, candidate: &CandidateRow) -> Result<usize> {
        if let Some(unknown) = candidate.columns().find(|c| !self.index.contains_key(*c)) {
            return Err(SheetError::UnknownColumn(unknown.to_string()));
        }
        let cells = self
            .columns
            .iter()
            .map(|column| cell::normalize_str(candidate.get(column).unwrap_or("")))
            .collect::<Vec<_>>();
        let row = Row(cells);

        if let Some(existing) = self.find_conflict(&row) {
            let row_number = existing + 1;
            warn!(
                "Rejected append under {:?}: conflicts with row {}",
                self.policy, row_number
            );
            return Err(match self.policy {
                UniquenessPolicy::FirstColumnKey => SheetError::DuplicateEntry {
                    column: self.columns[0].clone(),
                    value: row.0[0].clone(),
                    row: row_number,
                },
                UniquenessPolicy::WholeRow => SheetError::DuplicateRow {
                    values: row.0,
                    row: row_number,
                },
            });
        }

        self.rows.push(row);
        debug!("Appended row {}", self.rows.len());
        Ok(self.rows.len())
    }

    fn find_conflict(&self, row: &Row) -> Option<usize> {
        match self.policy {
            UniquenessPolicy::FirstColumnKey => self
                .rows
                .iter()
                .position(|existing| existing.0.first() == row.0.first()),
            UniquenessPolicy::WholeRow => self.rows.iter().position(|existing| existing == row),
        }
    }
}

fn build_column_index(columns: &[String]) -> Result<HashMap<String, usize>> {
    if columns.is_empty() {
        return Err(SheetError::MalformedSource(
            "Source does not define any columns".to_string(),
        ));
    }
    let mut index = HashMap::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        if index.insert(name.clone(), idx).is_some() {
            return Err(SheetError::MalformedSource(format!(
                "Column '{name}' appears more than once in the header"
            )));
        }
    }
    Ok(index)
}

//! In-progress candidate row.
//!
//! The form mirrors what a data-entry sidebar is building before the user
//! submits it. Clearing it with [`EntryForm::reset`] never touches dataset rows.

use serde::Serialize;

use crate::{
    dataset::{CandidateRow, Dataset},
    error::{Result, SheetError},
    profile::ColumnProfile,
};

/// How a surrounding UI should offer one column for input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "input", rename_all = "lowercase")]
pub enum FieldInput {
    /// Options start with a blank entry meaning "use the sentinel".
    Select { options: Vec<String> },
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub column: String,
    #[serde(flatten)]
    pub input: FieldInput,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct EntryForm {
    columns: Vec<String>,
    values: Vec<String>,
}

impl EntryForm {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let columns = dataset.columns().to_vec();
        let values = vec![String::new(); columns.len()];
        Self { columns, values }
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) -> Result<()> {
        let idx = self
            .position(column)
            .ok_or_else(|| SheetError::UnknownColumn(column.to_string()))?;
        self.values[idx] = value.into();
        Ok(())
    }

    pub fn value(&self, column: &str) -> Option<&str> {
        self.position(column).map(|idx| self.values[idx].as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    pub fn candidate(&self) -> CandidateRow {
        self.columns
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    /// Describes each field, using `profiles` to pick select lists for
    /// categorical columns. Profiles are matched by column name.
    pub fn fields(&self, profiles: &[ColumnProfile]) -> Vec<FormField> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| {
                let input = match profiles.iter().find(|p| &p.name == column) {
                    Some(profile) if profile.is_categorical() => {
                        let mut options = Vec::with_capacity(profile.distinct_values.len() + 1);
                        options.push(String::new());
                        options.extend(profile.distinct_values.iter().cloned());
                        FieldInput::Select { options }
                    }
                    _ => FieldInput::Text,
                };
                FormField {
                    column: column.clone(),
                    input,
                    value: value.clone(),
                }
            })
            .collect()
    }

    pub fn reset(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

//! Column classification.
//!
//! Decides whether a column should be offered as a selection list
//! ([`ColumnKind::Categorical`]) or as free text, and collects the distinct
//! values seen so far in first-seen order. Profiles are derived on demand from
//! the current rows and are never cached across mutations.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierPolicy {
    /// Categorical when every value is non-empty text without digit characters.
    #[default]
    NoDigitText,
    /// Categorical when `1 < distinct < rows / 2`.
    CardinalityRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Categorical,
    Freeform,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Freeform => write!(f, "freeform"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub distinct_values: Vec<String>,
}

impl ColumnProfile {
    pub fn is_categorical(&self) -> bool {
        self.kind == ColumnKind::Categorical
    }
}

pub fn classify<'a, I>(name: &str, values: I, policy: ClassifierPolicy) -> ColumnProfile
where
    I: IntoIterator<Item = &'a str>,
{
    let values = values.into_iter().collect::<Vec<_>>();
    let distinct_values = values
        .iter()
        .copied()
        .unique()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let categorical = !values.is_empty()
        && match policy {
            ClassifierPolicy::NoDigitText => values.iter().all(|value| is_pure_text(value)),
            ClassifierPolicy::CardinalityRatio => {
                let distinct = distinct_values.len();
                // distinct < rows / 2, kept in integers
                distinct > 1 && distinct * 2 < values.len()
            }
        };

    ColumnProfile {
        name: name.to_string(),
        kind: if categorical {
            ColumnKind::Categorical
        } else {
            ColumnKind::Freeform
        },
        distinct_values,
    }
}

fn is_pure_text(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_make_a_column_freeform() {
        let profile = classify("Age", ["30", "NA", "41"], ClassifierPolicy::NoDigitText);
        assert_eq!(profile.kind, ColumnKind::Freeform);
        assert_eq!(profile.distinct_values, vec!["30", "NA", "41"]);
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let profile = classify(
            "City",
            ["Paris", "Oslo", "Paris", "Lima", "Oslo"],
            ClassifierPolicy::NoDigitText,
        );
        assert!(profile.is_categorical());
        assert_eq!(profile.distinct_values, vec!["Paris", "Oslo", "Lima"]);
    }

    #[test]
    fn cardinality_ratio_needs_repeats() {
        let unique = classify("Id", ["a", "b", "c", "d"], ClassifierPolicy::CardinalityRatio);
        assert_eq!(unique.kind, ColumnKind::Freeform);

        let repeated = classify(
            "Tier",
            ["gold", "silver", "gold", "gold", "silver"],
            ClassifierPolicy::CardinalityRatio,
        );
        assert_eq!(repeated.kind, ColumnKind::Categorical);

        let constant = classify("Flag", ["x", "x", "x"], ClassifierPolicy::CardinalityRatio);
        assert_eq!(constant.kind, ColumnKind::Freeform);
    }

    #[test]
    fn empty_column_is_freeform() {
        let profile = classify("Empty", std::iter::empty(), ClassifierPolicy::NoDigitText);
        assert_eq!(profile.kind, ColumnKind::Freeform);
        assert!(profile.distinct_values.is_empty());
    }
}

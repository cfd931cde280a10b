use serde::{Deserialize, Serialize};

use crate::collapse::{collapse, CollapsePlan};
use crate::error::GroupResult;
use crate::table::Table;

/// Delimiter used when a selection does not name one.
pub const DEFAULT_DELIMITER: &str = ", ";

/// Delimiters offered to users when picking how merged values are joined.
pub const DELIMITER_PRESETS: [&str; 5] = [", ", " | ", "; ", " / ", "||"];

/// The user's choices for one [`collapse`] run.
///
/// Serializes as a flat JSON object; every field is optional when deserializing:
///
/// ```json
/// { "drop_columns": ["Notes"], "group_by": ["Name", "Dept"], "merge_columns": ["Tag"], "delimiter": "; " }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub drop_columns: Vec<String>,
    pub group_by: Vec<String>,
    pub merge_columns: Vec<String>,
    pub delimiter: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            drop_columns: Vec::new(),
            group_by: Vec::new(),
            merge_columns: Vec::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl Selection {
    pub fn new<I, S>(group_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_by: group_by.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_merge_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.merge_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Check this selection against `table` without running the collapse.
    pub fn validate(&self, table: &Table) -> GroupResult<()> {
        CollapsePlan::new(
            table,
            &self.drop_columns,
            &self.group_by,
            &self.merge_columns,
        )
        .map(|_| ())
    }

    /// Column order the collapse would produce for `table`.
    pub fn output_columns(&self, table: &Table) -> GroupResult<Vec<String>> {
        let plan = CollapsePlan::new(
            table,
            &self.drop_columns,
            &self.group_by,
            &self.merge_columns,
        )?;
        Ok(plan.output_columns().to_vec())
    }

    pub fn apply(&self, table: &Table) -> GroupResult<Table> {
        collapse(
            table,
            &self.drop_columns,
            &self.group_by,
            &self.merge_columns,
            &self.delimiter,
        )
    }
}

/// Columns that may be offered as merge targets: everything in `table` not already chosen for
/// grouping, in table order.
pub fn merge_candidates<'a, S: AsRef<str>>(table: &'a Table, group_by: &[S]) -> Vec<&'a str> {
    table
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|column| !group_by.iter().any(|g| g.as_ref() == *column))
        .collect()
}

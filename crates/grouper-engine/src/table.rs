use std::collections::{HashMap, HashSet};

use crate::error::{ColumnRole, GroupResult, GroupingError, SelectionError};
use crate::value::Value;

/// An in-memory table: ordered, uniquely named columns over row-major cell storage.
///
/// Every row has exactly one value per column. Column order is significant and preserved by all
/// derived tables.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> GroupResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut column_index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if column_index.insert(name.clone(), idx).is_some() {
                return Err(GroupingError::DuplicateColumn {
                    column: name.clone(),
                });
            }
        }

        Ok(Self {
            columns,
            column_index,
            rows: Vec::new(),
        })
    }

    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> GroupResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> GroupResult<()> {
        if row.len() != self.columns.len() {
            return Err(GroupingError::SchemaMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index.contains_key(column)
    }

    pub fn column_idx(&self, column: &str) -> Option<usize> {
        self.column_index.get(column).copied()
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_idx(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
        let idx = self.column_idx(column)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Return a copy of this table without the named columns.
    ///
    /// Naming a column that does not exist is an [`SelectionError::UnknownColumn`].
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> GroupResult<Table> {
        let mut dropped = HashSet::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let idx = self.column_idx(name).ok_or_else(|| SelectionError::UnknownColumn {
                role: ColumnRole::Drop,
                column: name.to_string(),
            })?;
            dropped.insert(idx);
        }

        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|idx| !dropped.contains(idx))
            .collect();
        Ok(self.project(&keep))
    }

    /// Build a new table from the given column indexes, in the given order.
    pub(crate) fn project(&self, idxs: &[usize]) -> Table {
        let columns: Vec<String> = idxs.iter().map(|&i| self.columns[i].clone()).collect();
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.clone(), idx))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| idxs.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table {
            columns,
            column_index,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            ["A", "B", "C"],
            vec![
                vec![Value::from(1i64), Value::from("x"), Value::Empty],
                vec![Value::from(2i64), Value::from("y"), Value::from(true)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let err = Table::new(["A", "B", "A"]).unwrap_err();
        assert_eq!(
            err,
            GroupingError::DuplicateColumn {
                column: "A".to_string()
            }
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut table = Table::new(["A", "B"]).unwrap();
        let err = table.push_row(vec![Value::Empty]).unwrap_err();
        assert_eq!(
            err,
            GroupingError::SchemaMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn drop_columns_keeps_order_and_leaves_source_untouched() {
        let table = sample();
        let dropped = table.drop_columns(&["B"]).unwrap();
        assert_eq!(dropped.columns(), ["A", "C"]);
        assert_eq!(dropped.value(1, "C"), Some(&Value::from(true)));
        assert!(!dropped.has_column("B"));
        assert_eq!(table.columns(), ["A", "B", "C"]);
    }

    #[test]
    fn drop_unknown_column_is_an_invalid_selection() {
        let err = sample().drop_columns(&["Z"]).unwrap_err();
        assert_eq!(
            err,
            GroupingError::InvalidSelection(SelectionError::UnknownColumn {
                role: ColumnRole::Drop,
                column: "Z".to_string(),
            })
        );
    }

    #[test]
    fn column_values_reads_top_to_bottom() {
        let table = sample();
        assert_eq!(
            table.column_values("B").unwrap(),
            vec![&Value::from("x"), &Value::from("y")]
        );
        assert!(table.column_values("nope").is_none());
    }
}

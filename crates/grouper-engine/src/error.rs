use std::fmt;

pub type GroupResult<T> = Result<T, GroupingError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupingError {
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),
    #[error("duplicate column name `{column}`")]
    DuplicateColumn { column: String },
    #[error("row has {actual} values but the table has {expected} columns")]
    SchemaMismatch { expected: usize, actual: usize },
}

/// Which selection parameter a column name was supplied through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Drop,
    GroupBy,
    Merge,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnRole::Drop => "drop",
            ColumnRole::GroupBy => "group-by",
            ColumnRole::Merge => "merge",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("select at least one column to group by")]
    EmptyGroupBy,
    #[error("unknown {role} column `{column}`")]
    UnknownColumn { role: ColumnRole, column: String },
    #[error("{role} column `{column}` is selected more than once")]
    DuplicateColumn { role: ColumnRole, column: String },
    #[error("column `{column}` cannot be both a group-by and a merge column")]
    MergeOverlapsGroupBy { column: String },
}

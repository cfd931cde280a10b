//! Group-and-collapse engine for spreadsheet-style tables.
//!
//! The engine takes one [`Table`], removes unwanted columns, partitions the rows by one or more
//! key columns and collapses each partition into a single row:
//! - merge columns become the sorted, de-duplicated set of their values joined by a delimiter;
//! - every other column keeps the value from the partition's first row.
//!
//! See [`collapse`] for the exact contract and [`Selection`] for the serializable form of its
//! parameters.

#![forbid(unsafe_code)]

mod collapse;
mod error;
mod selection;
mod table;
mod value;

pub use crate::collapse::collapse;
pub use crate::error::{ColumnRole, GroupResult, GroupingError, SelectionError};
pub use crate::selection::{merge_candidates, Selection, DEFAULT_DELIMITER, DELIMITER_PRESETS};
pub use crate::table::Table;
pub use crate::value::Value;

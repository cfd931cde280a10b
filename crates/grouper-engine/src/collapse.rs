use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{ColumnRole, GroupResult, SelectionError};
use crate::table::Table;
use crate::value::Value;

/// How a non-key column is reduced to a single value per partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reducer {
    /// Sorted, de-duplicated canonical text of the non-absent values, joined by the delimiter.
    Merge,
    /// The value of the partition's first row, absent or not.
    KeepFirst,
}

/// Column indexes resolved against the source table, in output order.
#[derive(Debug)]
pub(crate) struct CollapsePlan {
    key_idxs: Vec<usize>,
    reducers: Vec<(usize, Reducer)>,
    output_columns: Vec<String>,
}

impl CollapsePlan {
    /// Resolve a selection against `table`.
    ///
    /// Dropped columns are treated as if they were not part of `table`, so naming one as a
    /// group-by or merge column reports it as unknown.
    pub(crate) fn new<D, G, M>(
        table: &Table,
        drop_columns: &[D],
        group_by: &[G],
        merge_columns: &[M],
    ) -> GroupResult<Self>
    where
        D: AsRef<str>,
        G: AsRef<str>,
        M: AsRef<str>,
    {
        let mut dropped = HashSet::with_capacity(drop_columns.len());
        for name in drop_columns {
            let name = name.as_ref();
            let idx = table
                .column_idx(name)
                .ok_or_else(|| unknown(ColumnRole::Drop, name))?;
            dropped.insert(idx);
        }

        if group_by.is_empty() {
            return Err(SelectionError::EmptyGroupBy.into());
        }

        let resolve = |names: &[&str], role: ColumnRole| -> GroupResult<Vec<usize>> {
            let mut seen = HashSet::with_capacity(names.len());
            let mut idxs = Vec::with_capacity(names.len());
            for &name in names {
                if !seen.insert(name) {
                    return Err(SelectionError::DuplicateColumn {
                        role,
                        column: name.to_string(),
                    }
                    .into());
                }
                let idx = table
                    .column_idx(name)
                    .filter(|idx| !dropped.contains(idx))
                    .ok_or_else(|| unknown(role, name))?;
                idxs.push(idx);
            }
            Ok(idxs)
        };

        let group_names: Vec<&str> = group_by.iter().map(AsRef::as_ref).collect();
        let merge_names: Vec<&str> = merge_columns.iter().map(AsRef::as_ref).collect();
        let key_idxs = resolve(&group_names, ColumnRole::GroupBy)?;
        let merge_idxs = resolve(&merge_names, ColumnRole::Merge)?;

        if let Some(&idx) = merge_idxs.iter().find(|idx| key_idxs.contains(*idx)) {
            return Err(SelectionError::MergeOverlapsGroupBy {
                column: table.columns()[idx].clone(),
            }
            .into());
        }

        let mut reducers: Vec<(usize, Reducer)> =
            merge_idxs.iter().map(|&idx| (idx, Reducer::Merge)).collect();
        reducers.extend(
            (0..table.column_count())
                .filter(|idx| {
                    !dropped.contains(idx) && !key_idxs.contains(idx) && !merge_idxs.contains(idx)
                })
                .map(|idx| (idx, Reducer::KeepFirst)),
        );

        let output_columns = key_idxs
            .iter()
            .chain(reducers.iter().map(|(idx, _)| idx))
            .map(|&idx| table.columns()[idx].clone())
            .collect();

        Ok(Self {
            key_idxs,
            reducers,
            output_columns,
        })
    }

    pub(crate) fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    /// Partition `table` and reduce every partition in a single scan over the rows.
    pub(crate) fn execute(&self, table: &Table, delimiter: &str) -> GroupResult<Table> {
        let mut slots: HashMap<Vec<Value>, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();

        for row in table.rows() {
            let key: Vec<Value> = self.key_idxs.iter().map(|&idx| row[idx].clone()).collect();
            match slots.entry(key) {
                Entry::Occupied(slot) => groups[*slot.get()].update(&self.reducers, row),
                Entry::Vacant(slot) => {
                    let group = Group::start(slot.key().clone(), &self.reducers, row);
                    slot.insert(groups.len());
                    groups.push(group);
                }
            }
        }

        log::debug!(
            "collapsed {} rows into {} partitions ({} key columns, {} reduced columns)",
            table.row_count(),
            groups.len(),
            self.key_idxs.len(),
            self.reducers.len()
        );

        let rows = groups
            .into_iter()
            .map(|group| group.finish(delimiter))
            .collect();
        Table::from_rows(self.output_columns.iter().cloned(), rows)
    }
}

fn unknown(role: ColumnRole, name: &str) -> crate::GroupingError {
    SelectionError::UnknownColumn {
        role,
        column: name.to_string(),
    }
    .into()
}

/// One partition's running state: its key plus one accumulator per reduced column.
struct Group {
    key: Vec<Value>,
    accumulators: Vec<Accumulator>,
}

impl Group {
    fn start(key: Vec<Value>, reducers: &[(usize, Reducer)], row: &[Value]) -> Self {
        let accumulators = reducers
            .iter()
            .map(|&(idx, reducer)| Accumulator::start(reducer, &row[idx]))
            .collect();
        Self { key, accumulators }
    }

    fn update(&mut self, reducers: &[(usize, Reducer)], row: &[Value]) {
        for (acc, &(idx, _)) in self.accumulators.iter_mut().zip(reducers) {
            acc.update(&row[idx]);
        }
    }

    fn finish(self, delimiter: &str) -> Vec<Value> {
        let mut row = self.key;
        row.extend(self.accumulators.into_iter().map(|acc| acc.finish(delimiter)));
        row
    }
}

enum Accumulator {
    Merge(BTreeSet<String>),
    KeepFirst(Value),
}

impl Accumulator {
    fn start(reducer: Reducer, value: &Value) -> Self {
        match reducer {
            Reducer::Merge => {
                let mut acc = Accumulator::Merge(BTreeSet::new());
                acc.update(value);
                acc
            }
            Reducer::KeepFirst => Accumulator::KeepFirst(value.clone()),
        }
    }

    fn update(&mut self, value: &Value) {
        match self {
            Accumulator::Merge(tokens) => {
                if let Some(text) = value.canonical_text() {
                    if !tokens.contains(&*text) {
                        tokens.insert(text.into_owned());
                    }
                }
            }
            Accumulator::KeepFirst(_) => {}
        }
    }

    fn finish(self, delimiter: &str) -> Value {
        match self {
            Accumulator::Merge(tokens) => {
                let parts: Vec<String> = tokens.into_iter().collect();
                Value::from(parts.join(delimiter))
            }
            Accumulator::KeepFirst(value) => value,
        }
    }
}

/// Collapse `table` into one row per distinct combination of `group_by` values.
///
/// `drop_columns` are removed first. Each `merge_columns` entry becomes the sorted set of
/// distinct non-empty values joined with `delimiter` (no escaping is applied, so tokens that
/// contain the delimiter cannot be split back apart). Every other remaining column keeps the
/// value from the partition's first row.
///
/// Output columns are `group_by`, then `merge_columns`, then the remaining columns in their
/// original order. Output rows follow the first appearance of each partition key. `Empty` key
/// values group together. `table` itself is never modified.
pub fn collapse<D, G, M>(
    table: &Table,
    drop_columns: &[D],
    group_by: &[G],
    merge_columns: &[M],
    delimiter: &str,
) -> GroupResult<Table>
where
    D: AsRef<str>,
    G: AsRef<str>,
    M: AsRef<str>,
{
    let plan = CollapsePlan::new(table, drop_columns, group_by, merge_columns)?;
    plan.execute(table, delimiter)
}

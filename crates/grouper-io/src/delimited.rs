use std::io::{Read, Write};

use grouper_engine::{Table, Value};

use crate::headers::normalize_headers;
use crate::{SourceReadError, WriteError};

/// Column type inferred from every non-blank field of a delimited-text column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColumnKind {
    Number,
    Boolean,
    Text,
}

impl ColumnKind {
    fn infer<'a>(fields: impl Iterator<Item = &'a str>) -> Self {
        let mut number = true;
        let mut boolean = true;
        let mut any = false;
        for field in fields.map(str::trim).filter(|f| !f.is_empty()) {
            any = true;
            number &= exact_number(field).is_some();
            boolean &= parse_bool(field).is_some();
            if !number && !boolean {
                return ColumnKind::Text;
            }
        }
        match (any, number, boolean) {
            (false, _, _) => ColumnKind::Text,
            (true, true, _) => ColumnKind::Number,
            (true, false, true) => ColumnKind::Boolean,
            (true, false, false) => ColumnKind::Text,
        }
    }

    fn parse(self, field: String) -> Value {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Value::Empty;
        }
        match self {
            ColumnKind::Number => exact_number(trimmed)
                .map(Value::number)
                .unwrap_or(Value::Empty),
            ColumnKind::Boolean => parse_bool(trimmed).map(Value::Boolean).unwrap_or_default(),
            ColumnKind::Text => Value::from(field),
        }
    }
}

/// Parse a numeric field, rejecting integers an `f64` cannot hold exactly.
///
/// Long digit strings (order or account ids) would otherwise round onto each other and stop
/// being distinct.
fn exact_number(field: &str) -> Option<f64> {
    let n = field.parse::<f64>().ok()?;
    let digits = field.strip_prefix(['+', '-']).unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Some(n);
    }
    match field.parse::<i128>() {
        Ok(int) if n.is_finite() && n as i128 == int => Some(n),
        _ => None,
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    if field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Read delimited text into a [`Table`].
///
/// The first record holds the headers. Short rows are padded with blanks, long rows are
/// truncated to the header width. Each column is typed as numeric or boolean when every non-blank
/// field parses as such, otherwise it stays text.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<Table, SourceReadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        // Headers are handled manually so they go through the same normalization as workbooks.
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(SourceReadError::EmptySheet),
    };
    let raw_headers = header
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let field = if idx == 0 {
                field.trim_start_matches('\u{feff}')
            } else {
                field
            };
            Some(field.to_string())
        })
        .collect();
    let columns = normalize_headers(raw_headers);
    let width = columns.len();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    let mut truncated = 0usize;
    for record in records {
        let record = record?;
        if record.len() > width {
            truncated += 1;
        }
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        raw_rows.push(row);
    }
    if truncated > 0 {
        log::warn!("{truncated} rows had more fields than the {width} headers; extra fields were ignored");
    }

    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| ColumnKind::infer(raw_rows.iter().map(|row| row[col].as_str())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(field, kind)| kind.parse(field))
                .collect()
        })
        .collect();
    Ok(Table::from_rows(columns, rows)?)
}

/// Write `table` as delimited text: a header record, then one record per row using each cell's
/// canonical text (blank for empty cells).
pub fn write_csv<W: Write>(writer: W, table: &Table, delimiter: u8) -> Result<(), WriteError> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    out.write_record(table.columns())?;
    for row in table.rows() {
        out.write_record(row.iter().map(Value::to_string))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_column_kinds_from_non_blank_fields() {
        assert_eq!(
            ColumnKind::infer(["1", " 2.5 ", ""].into_iter()),
            ColumnKind::Number
        );
        assert_eq!(
            ColumnKind::infer(["TRUE", "false", ""].into_iter()),
            ColumnKind::Boolean
        );
        assert_eq!(ColumnKind::infer(["1", "x"].into_iter()), ColumnKind::Text);
        assert_eq!(ColumnKind::infer(["", ""].into_iter()), ColumnKind::Text);
    }

    #[test]
    fn integers_beyond_f64_precision_are_not_numeric() {
        assert_eq!(exact_number("9007199254740992"), Some(9_007_199_254_740_992.0));
        assert_eq!(exact_number("9007199254740993"), None);
        assert_eq!(exact_number("-007"), Some(-7.0));
        assert_eq!(exact_number("1e300"), Some(1e300));
        assert_eq!(
            ColumnKind::infer(["12", "9007199254740993"].into_iter()),
            ColumnKind::Text
        );
    }

    #[test]
    fn text_fields_are_kept_verbatim() {
        assert_eq!(
            ColumnKind::Text.parse(" padded ".to_string()),
            Value::from(" padded ")
        );
        assert_eq!(ColumnKind::Text.parse("  ".to_string()), Value::Empty);
    }
}

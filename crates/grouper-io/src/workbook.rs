use std::borrow::Cow;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use grouper_engine::{Table, Value};

use crate::headers::normalize_headers;
use crate::serial::{parse_iso_datetime, serial_to_datetime};
use crate::SourceReadError;

/// Load one worksheet of a workbook as a [`Table`], using its first row as headers.
///
/// The sheet must exist by exact name; other sheets are ignored.
pub fn read_workbook_sheet(
    path: impl AsRef<Path>,
    sheet_name: &str,
) -> Result<Table, SourceReadError> {
    let mut workbook = open_workbook_auto(path.as_ref())?;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet_name) {
        return Err(SourceReadError::MissingSheet {
            sheet: sheet_name.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(SourceReadError::EmptySheet);
    };

    let columns = normalize_headers(header.iter().map(header_name).collect());
    let mut table = Table::new(columns)?;
    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect())?;
    }
    Ok(table)
}

fn header_name(cell: &Data) -> Option<String> {
    convert_cell(cell).canonical_text().map(Cow::into_owned)
}

/// Integers past 2^53 do not survive the trip through `f64`; keep their digits as text so
/// distinct ids stay distinct.
fn exact_int(v: i64) -> Value {
    let n = v as f64;
    if n as i128 == i128::from(v) {
        Value::number(n)
    } else {
        Value::from(v.to_string())
    }
}

fn convert_cell(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::Bool(v) => Value::Boolean(*v),
        Data::Int(v) => exact_int(*v),
        Data::Float(v) => Value::number(*v),
        Data::String(v) if v.is_empty() => Value::Empty,
        Data::String(v) => Value::from(v.as_str()),
        Data::Error(e) => Value::from(e.to_string()),
        // Durations have no calendar meaning; keep the raw day count.
        Data::DateTime(v) if v.is_duration() => Value::number(v.as_f64()),
        Data::DateTime(v) => serial_to_datetime(v.as_f64())
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::number(v.as_f64())),
        Data::DateTimeIso(v) => parse_iso_datetime(v)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::from(v.as_str())),
        Data::DurationIso(v) => Value::from(v.as_str()),
    }
}

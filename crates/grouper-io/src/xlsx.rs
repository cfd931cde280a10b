use std::path::Path;

use grouper_engine::{Table, Value};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};

use crate::serial::datetime_to_serial;
use crate::WriteError;

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Excel's per-cell text limit, in characters.
const MAX_CELL_CHARS: usize = 32_767;

fn check_cell_length(text: &str, column: &str, row: usize) -> Result<(), WriteError> {
    let length = text.chars().count();
    if length > MAX_CELL_CHARS {
        return Err(WriteError::CellTooLong {
            column: column.to_string(),
            row,
            length,
        });
    }
    Ok(())
}

/// Write `table` to a single-sheet `.xlsx` file.
pub fn write_xlsx(
    path: impl AsRef<Path>,
    table: &Table,
    sheet_name: &str,
) -> Result<(), WriteError> {
    let mut workbook = build_workbook(table, sheet_name)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

/// Serialize `table` as an in-memory `.xlsx` document.
pub fn write_xlsx_to_buffer(table: &Table, sheet_name: &str) -> Result<Vec<u8>, WriteError> {
    let mut workbook = build_workbook(table, sheet_name)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(table: &Table, sheet_name: &str) -> Result<Workbook, WriteError> {
    let too_large = || WriteError::TooLarge {
        rows: table.row_count(),
        columns: table.column_count(),
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in table.columns().iter().enumerate() {
        check_cell_length(name, name, 1)?;
        let col = ColNum::try_from(col).map_err(|_| too_large())?;
        worksheet.write_string_with_format(0, col, name.as_str(), &header_format)?;
    }

    for (row_idx, row) in table.rows().enumerate() {
        // Row 0 holds the headers.
        let row_num = RowNum::try_from(row_idx + 1).map_err(|_| too_large())?;
        for (col_idx, value) in row.iter().enumerate() {
            let col = ColNum::try_from(col_idx).map_err(|_| too_large())?;
            match value {
                Value::Empty => {}
                Value::Number(n) if n.0.is_nan() => {}
                Value::Number(n) => {
                    worksheet.write_number(row_num, col, n.0)?;
                }
                Value::Text(s) => {
                    check_cell_length(s, &table.columns()[col_idx], row_idx + 2)?;
                    worksheet.write_string(row_num, col, &**s)?;
                }
                Value::Boolean(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                Value::DateTime(dt) => match datetime_to_serial(dt) {
                    Some(serial) if serial >= 0.0 => {
                        worksheet.write_number_with_format(row_num, col, serial, &datetime_format)?;
                    }
                    // Excel cannot represent dates before its epoch; keep them readable as text.
                    _ => {
                        worksheet.write_string(row_num, col, value.to_string())?;
                    }
                },
            }
        }
    }

    Ok(workbook)
}

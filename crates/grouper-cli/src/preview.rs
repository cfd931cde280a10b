use grouper_engine::Table;

/// Render the header and the first `max_rows` rows of `table` as a left-aligned text grid.
pub fn render_preview(table: &Table, max_rows: usize) -> String {
    let shown: Vec<Vec<String>> = table
        .rows()
        .take(max_rows)
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();
    for row in &shown {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, table.columns().iter().map(String::as_str), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &shown {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    if table.row_count() > shown.len() {
        out.push_str(&format!("... {} more rows\n", table.row_count() - shown.len()));
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use grouper_engine::Value;

    #[test]
    fn pads_columns_and_reports_hidden_rows() {
        let table = Table::from_rows(
            ["Name", "Tag"],
            vec![
                vec![Value::from("A"), Value::from("blue; red")],
                vec![Value::from("Bee"), Value::Empty],
                vec![Value::from("C"), Value::from("x")],
            ],
        )
        .unwrap();

        assert_eq!(
            render_preview(&table, 2),
            "Name  Tag\n----  ---------\nA     blue; red\nBee\n... 1 more rows\n"
        );
    }
}

use std::path::{Path, PathBuf};

use clap::Parser;
use grouper_cli::{run_with_args, Args};
use grouper_engine::{Table, Value};
use grouper_io::{read_table, ReadOptions};
use pretty_assertions::assert_eq;

const STAFF_CSV: &str = "Name,Dept,Tag,Notes\nA,X,red,n1\nA,X,blue,n2\nB,Y,,n3\n";

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(argv: &[&str]) -> anyhow::Result<String> {
    let args = Args::try_parse_from(std::iter::once("sheet-grouper").chain(argv.iter().copied()))?;
    let mut out = Vec::new();
    run_with_args(args, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn groups_and_merges_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);

    let out = run(&[
        input.to_str().unwrap(),
        "--drop",
        "Notes",
        "--group-by",
        "Name",
        "--group-by",
        "Dept",
        "--merge",
        "Tag",
        "--delimiter",
        "; ",
    ])
    .unwrap();

    assert_eq!(out, "Name,Dept,Tag\nA,X,blue; red\nB,Y,\n");
}

#[test]
fn flags_override_a_saved_selection() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let selection = write_input(
        dir.path(),
        "selection.json",
        r#"{ "group_by": ["Dept"], "merge_columns": ["Tag"], "delimiter": " | " }"#,
    );

    let out = run(&[
        input.to_str().unwrap(),
        "--selection",
        selection.to_str().unwrap(),
        "--merge",
        "Notes",
    ])
    .unwrap();

    assert_eq!(out, "Dept,Notes,Name,Tag\nX,n1 | n2,A,red\nY,n3,B,\n");
}

#[test]
fn missing_group_by_is_reported_not_guessed() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);

    let err = run(&[input.to_str().unwrap(), "--merge", "Tag"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid selection: select at least one column to group by"
    );
}

#[test]
fn list_columns_shows_headers_and_merge_options() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);

    let out = run(&[
        input.to_str().unwrap(),
        "--list-columns",
        "--drop",
        "Notes",
        "--group-by",
        "Dept",
    ])
    .unwrap();

    assert_eq!(
        out,
        "Columns: Name, Dept, Tag, Notes\nAfter drop: Name, Dept, Tag\nMerge candidates: Name, Tag\n"
    );
}

#[test]
fn writes_xlsx_output_and_leaves_input_alone() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "staff.csv", STAFF_CSV);
    let output = dir.path().join("grouped_output.xlsx");

    let stdout = run(&[
        input.to_str().unwrap(),
        "--group-by",
        "Name",
        "--merge",
        "Notes",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(stdout, "");
    assert_eq!(std::fs::read_to_string(&input).unwrap(), STAFF_CSV);

    let grouped = read_table(&output, &ReadOptions::default()).unwrap();
    let expected = Table::from_rows(
        ["Name", "Notes", "Dept", "Tag"],
        vec![
            vec![
                Value::from("A"),
                Value::from("n1, n2"),
                Value::from("X"),
                Value::from("red"),
            ],
            vec![
                Value::from("B"),
                Value::from("n3"),
                Value::from("Y"),
                Value::Empty,
            ],
        ],
    )
    .unwrap();
    assert_eq!(grouped, expected);
}

#[test]
fn unreadable_input_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.xlsx");

    let err = run(&[missing.to_str().unwrap(), "--group-by", "Name"]).unwrap_err();
    assert!(err.to_string().starts_with("read "), "{err:#}");
}

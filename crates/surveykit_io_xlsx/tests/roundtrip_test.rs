use pretty_assertions::assert_eq;
use surveykit_io_xlsx::{
    EnumCellValue, SpecCellTable, SpecXlsxReadOptions, XlsxReadError, read_xlsx_table,
    write_xlsx_table,
};

fn derive_sample_table() -> SpecCellTable {
    SpecCellTable::from_text_header(
        &["Date", "Name", "Age", "All Members"],
        vec![
            vec![
                EnumCellValue::DateTime(45_292.0),
                EnumCellValue::text("Alice"),
                EnumCellValue::Number(30.0),
                EnumCellValue::text(r#"[{"name":"සමන්","age":"5"}]"#),
            ],
            vec![
                EnumCellValue::None,
                EnumCellValue::None,
                EnumCellValue::Number(4.5),
                EnumCellValue::None,
            ],
        ],
    )
}

#[test]
fn test_written_table_reads_back_with_same_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path_file = dir.path().join("table.xlsx");
    let table = derive_sample_table();

    let report = write_xlsx_table(path_file.clone(), &table, "Reformatted Data").unwrap();
    assert_eq!(report.rows_written(), 2);
    assert_eq!(report.sheets[0].sheet_name, "Reformatted Data");

    let table_read = read_xlsx_table(&path_file, &SpecXlsxReadOptions::default()).unwrap();
    assert_eq!(table_read.header, table.header);
    assert_eq!(table_read.rows[0][1], EnumCellValue::text("Alice"));
    assert_eq!(table_read.rows[0][2], EnumCellValue::Number(30.0));
    assert_eq!(table_read.rows[0][3], table.rows[0][3]);
    assert!(matches!(table_read.rows[0][0], EnumCellValue::DateTime(n) if n == 45_292.0));
    assert_eq!(table_read.rows[1][2], EnumCellValue::Number(4.5));
    assert!(table_read.rows[1][0].is_blank());
}

#[test]
fn test_named_sheet_lookup_reports_missing_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path_file = dir.path().join("table.xlsx");
    write_xlsx_table(path_file.clone(), &derive_sample_table(), "Data").unwrap();

    let err = read_xlsx_table(
        &path_file,
        &SpecXlsxReadOptions {
            sheet_name: Some("Nope".to_string()),
        },
    )
    .unwrap_err();
    assert!(matches!(err, XlsxReadError::SheetNotFound(name) if name == "Nope"));
}

#[test]
fn test_missing_file_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_xlsx_table(
        dir.path().join("absent.xlsx"),
        &SpecXlsxReadOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, XlsxReadError::Open { .. }));
    assert!(err.to_string().starts_with("Failed to load workbook"));
}

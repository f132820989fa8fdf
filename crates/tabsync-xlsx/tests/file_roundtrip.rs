//! Workbooks written to disk and read back

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tabsync_core::{CellError, CellRange, CellValue, Table, Workbook};
use tabsync_xlsx::{XlsxError, XlsxReader, XlsxWriter};

fn table(id: u32, range: &str, columns: &[&str]) -> Table {
    Table::new(
        id,
        CellRange::parse(range).unwrap(),
        columns.iter().map(|c| c.to_string()).collect(),
    )
}

#[test]
fn test_many_rows_and_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.xlsx");

    let mut wb = Workbook::new();
    wb.add_worksheet_with_name("Log & Notes").unwrap();
    {
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_value("A1", "n").unwrap();
        sheet.set_cell_value("B1", "label").unwrap();
        for row in 1..=2_000u32 {
            sheet.set_cell_value_at(row, 0, row as f64).unwrap();
            sheet
                .set_cell_value_at(row, 1, format!("row {}", row))
                .unwrap();
        }
        sheet.add_table(table(1, "A1:B2001", &["n", "label"])).unwrap();
    }
    {
        let sheet = wb.worksheet_mut(1).unwrap();
        let day = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();
        sheet.set_cell_value("A1", day).unwrap();
        sheet
            .set_cell_value("A2", day.and_hms_opt(23, 59, 59).unwrap())
            .unwrap();
        sheet.set_cell_value("A3", CellError::Na).unwrap();
        sheet.set_cell_value("A4", false).unwrap();
    }

    XlsxWriter::write_file(&wb, &path).unwrap();
    let back = XlsxReader::read_file(&path).unwrap();

    assert_eq!(back.sheet_names(), vec!["Sheet1", "Log & Notes"]);
    let first = back.worksheet(0).unwrap();
    assert_eq!(first.cell_count(), 4_002);
    assert_eq!(first.get_value("A2001").unwrap(), CellValue::Number(2000.0));
    assert_eq!(first.get_value("B2001").unwrap(), CellValue::string("row 2000"));
    assert_eq!(first.tables(), wb.worksheet(0).unwrap().tables());

    let second = back.worksheet(1).unwrap();
    let day = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();
    assert_eq!(second.get_value("A1").unwrap(), CellValue::Date(day));
    assert_eq!(
        second.get_value("A2").unwrap(),
        CellValue::DateTime(day.and_hms_opt(23, 59, 59).unwrap())
    );
    assert_eq!(second.get_value("A3").unwrap(), CellValue::Error(CellError::Na));
    assert_eq!(second.get_value("A4").unwrap(), CellValue::Boolean(false));
}

#[test]
fn test_table_document_order_survives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.xlsx");

    let mut wb = Workbook::new();
    {
        let sheet = wb.worksheet_mut(0).unwrap();
        for (addr, text) in [("A1", "late"), ("D1", "early")] {
            sheet.set_cell_value(addr, text).unwrap();
        }
        sheet.add_table(table(9, "D1:D2", &["early"])).unwrap();
        sheet.insert_table(0, table(3, "A1:A2", &["late"])).unwrap();
    }

    XlsxWriter::write_file(&wb, &path).unwrap();
    let back = XlsxReader::read_file(&path).unwrap();
    let names: Vec<&str> = back
        .worksheet(0)
        .unwrap()
        .tables()
        .iter()
        .map(Table::name)
        .collect();
    assert_eq!(names, vec!["Table3", "Table9"]);
    assert_eq!(back.next_table_id(), 10);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = XlsxReader::read_file(dir.path().join("absent.xlsx")).unwrap_err();
    assert!(matches!(err, XlsxError::Io(_)));
}

//! End-to-end tests for writing frames to sheets and reading them back

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tabsync::prelude::*;
use tabsync::{CellRange, Error, MAX_COLUMN_WIDTH};
use tempfile::TempDir;

fn scratch() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    (dir, path)
}

fn cells(sheet: &Worksheet) -> Vec<(u32, u16, CellValue)> {
    sheet
        .iter_cells()
        .map(|(row, col, value)| (row, col, value.clone()))
        .collect()
}

fn people() -> Frame {
    let day = NaiveDate::from_ymd_opt(2023, 11, 5).unwrap();
    Frame::new(vec![
        Series::new("name", ["Ana", "  Bo", "Cy"]),
        Series::new("age", [31, 45, 27]),
        Series::new("score", [0.25, 1.5, -3.0]),
        Series::new("active", [true, false, true]),
        Series::new("joined", [Value::Date(day), Value::Null, Value::Date(day)]),
        Series::new(
            "seen",
            [
                Value::DateTime(day.and_hms_opt(8, 30, 15).unwrap()),
                Value::Null,
                Value::Null,
            ],
        ),
        Series::new("note", [Value::Null, Value::text("x"), Value::Null]),
    ])
    .unwrap()
}

fn numbers(rows: i64, cols: usize) -> Frame {
    let columns = (0..cols)
        .map(|c| Series::new(format!("c{}", c), (0..rows).map(|r| r * 10 + c as i64)))
        .collect();
    Frame::new(columns).unwrap()
}

#[test]
fn scalar_frames_round_trip() {
    let (_dir, path) = scratch();
    let frame = people();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&frame, Some("People")).unwrap();
    assert_eq!(sync.read(Some("People")).unwrap(), frame);

    let reopened = SheetSync::open(&path).unwrap();
    let back = reopened.read(Some("People")).unwrap();
    assert_eq!(back, frame);
    assert!(matches!(back.column("age").unwrap().values()[0], Value::Int(31)));
    assert!(matches!(back.column("score").unwrap().values()[0], Value::Float(_)));
}

#[test]
fn index_is_not_restored() {
    let (_dir, path) = scratch();
    let frame = numbers(2, 1)
        .with_index(Series::new("key", ["a", "b"]))
        .unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&frame, None).unwrap();
    let back = sync.read(None).unwrap();
    assert!(back.index().is_none());
    assert_eq!(back.columns(), frame.columns());

    sync.write_with(&frame, &WriteOptions::new().index(true)).unwrap();
    let back = sync.read(None).unwrap();
    assert_eq!(back.column_names(), vec!["key", "c0"]);
    assert_eq!(
        back.column("key").unwrap().values(),
        &[Value::text("a"), Value::text("b")]
    );
}

#[test]
fn writing_twice_is_idempotent() {
    let (_dir, path) = scratch();
    let frame = people();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&frame, Some("Data")).unwrap();
    let once = SheetSync::open(&path).unwrap();
    sync.write(&frame, Some("Data")).unwrap();
    let twice = SheetSync::open(&path).unwrap();

    let (a, b) = (
        once.workbook().worksheet_by_name("Data").unwrap(),
        twice.workbook().worksheet_by_name("Data").unwrap(),
    );
    assert_eq!(cells(a), cells(b));
    assert_eq!(a.tables(), b.tables());
    assert_eq!(a.custom_column_widths(), b.custom_column_widths());
    assert_eq!(once.sheet_names(), twice.sheet_names());
}

#[test]
fn shrinking_leaves_no_stale_cells() {
    let (_dir, path) = scratch();
    let mut sync = SheetSync::create(&path).unwrap();

    sync.write(&numbers(5, 3), None).unwrap();
    let small = numbers(2, 2);
    sync.write(&small, None).unwrap();

    let reopened = SheetSync::open(&path).unwrap();
    let sheet = reopened.workbook().worksheet(0).unwrap();
    assert_eq!(sheet.cell_count(), 6);
    assert_eq!(sheet.used_range(), Some(CellRange::parse("A1:B3").unwrap()));
    assert_eq!(sheet.tables().len(), 1);
    assert_eq!(reopened.read(None).unwrap(), small);

    let large = numbers(8, 4);
    sync.write(&large, None).unwrap();
    assert_eq!(SheetSync::open(&path).unwrap().read(None).unwrap(), large);
}

#[test]
fn untabled_block_at_anchor_is_cleared() {
    let (_dir, path) = scratch();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.worksheet_mut(0).unwrap();
        for (addr, value) in [("A1", "h1"), ("B1", "h2"), ("A2", "x"), ("B2", "y"), ("A3", "z")] {
            sheet.set_cell_value(addr, value).unwrap();
        }
        // separated from the block by an empty column
        sheet.set_cell_value("D1", "keep").unwrap();
    }
    workbook.save(&path).unwrap();

    let mut sync = SheetSync::open(&path).unwrap();
    let frame = numbers(1, 1);
    sync.write(&frame, None).unwrap();

    let sheet = sync.workbook().worksheet(0).unwrap();
    assert_eq!(sheet.get_value("B1").unwrap(), CellValue::Empty);
    assert_eq!(sheet.get_value("A3").unwrap(), CellValue::Empty);
    assert_eq!(sheet.get_value("D1").unwrap(), CellValue::string("keep"));
    assert_eq!(sync.read(None).unwrap(), frame);
}

#[test]
fn overlapping_tables_are_replaced() {
    let (_dir, path) = scratch();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet.set_cell_value("D1", "other").unwrap();
        sheet.set_cell_value("D2", 1.0).unwrap();
        sheet
            .add_table(Table::new(7, CellRange::parse("D1:D2").unwrap(), vec!["other".into()]))
            .unwrap();
        sheet.set_cell_value("H1", "far").unwrap();
        sheet
            .add_table(Table::new(8, CellRange::parse("H1:H2").unwrap(), vec!["far".into()]))
            .unwrap();
    }
    workbook.save(&path).unwrap();

    let mut sync = SheetSync::open(&path).unwrap();
    sync.write(&numbers(2, 5), None).unwrap();

    let names = sync.tables(None).unwrap();
    assert_eq!(names, vec!["Table9", "Table8"]);
    assert_eq!(sync.read(None).unwrap(), numbers(2, 5));
}

#[test]
fn sheet_resolution() {
    let (_dir, path) = scratch();
    let mut sync = SheetSync::create(&path).unwrap();
    let frame = numbers(1, 1);

    sync.write(&frame, None).unwrap();
    assert_eq!(sync.sheet_names(), vec!["Sheet1"]);
    assert_eq!(sync.tables(Some("Sheet1")).unwrap().len(), 1);

    sync.write(&frame, Some("Data")).unwrap();
    assert_eq!(sync.sheet_names(), vec!["Sheet1", "Data"]);

    sync.write(&numbers(2, 2), Some("data")).unwrap();
    assert_eq!(sync.sheet_names(), vec!["Sheet1", "Data"]);
    assert_eq!(sync.read(Some("DATA")).unwrap(), numbers(2, 2));

    let reopened = SheetSync::open(&path).unwrap();
    assert_eq!(reopened.sheet_names(), vec!["Sheet1", "Data"]);
}

#[test]
fn invalid_new_sheet_name_fails() {
    let (_dir, path) = scratch();
    let mut sync = SheetSync::create(&path).unwrap();
    let err = sync.write(&numbers(1, 1), Some("a/b")).unwrap_err();
    assert!(matches!(err, SyncError::Core(_)));
    assert_eq!(sync.sheet_names(), vec!["Sheet1"]);
}

#[test]
fn oversized_frame_leaves_workbook_untouched() {
    let (_dir, path) = scratch();
    let kept = numbers(2, 1);
    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&kept, Some("Keep")).unwrap();

    let too_wide = numbers(0, usize::from(tabsync::MAX_COLS) + 1);
    for target in ["Keep", "Fresh"] {
        let err = sync.write(&too_wide, Some(target)).unwrap_err();
        assert!(matches!(err, SyncError::Core(Error::RegionTooLarge { cols: 16_385, .. })));
    }
    assert_eq!(sync.sheet_names(), vec!["Sheet1", "Keep"]);

    // a later successful write persists the whole workbook
    sync.write(&numbers(1, 1), Some("Other")).unwrap();
    let reopened = SheetSync::open(&path).unwrap();
    assert_eq!(reopened.read(Some("Keep")).unwrap(), kept);
    assert_eq!(reopened.tables(Some("Keep")).unwrap(), vec!["Table1"]);
}

#[test]
fn nested_columns_are_stringified() {
    let (_dir, path) = scratch();
    let frame = Frame::new(vec![
        Series::new("id", [1, 2, 3]),
        Series::new(
            "tags",
            [
                Value::List(vec![Value::text("a"), Value::Int(2)]),
                Value::Float(1.5),
                Value::Null,
            ],
        ),
    ])
    .unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&frame, None).unwrap();
    let back = SheetSync::open(&path).unwrap().read(None).unwrap();

    assert_eq!(back.column("id").unwrap(), frame.column("id").unwrap());
    assert_eq!(
        back.column("tags").unwrap().values(),
        &[Value::text(r#"["a", 2]"#), Value::text("1.5"), Value::Null]
    );
}

#[test]
fn nested_values_rejected_when_coercion_is_off() {
    let (_dir, path) = scratch();
    let frame = Frame::new(vec![Series::new("v", [Value::List(vec![Value::Int(1)])])]).unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    let options = WriteOptions::new().sheet("New").stringify_nested(false);
    let err = sync.write_with(&frame, &options).unwrap_err();

    assert!(matches!(err, SyncError::UnsupportedValue { ref column } if column == "v"));
    assert_eq!(sync.sheet_names(), vec!["Sheet1"]);
}

#[test]
fn reading_without_table_fails_and_leaves_sheet_alone() {
    let (_dir, path) = scratch();
    let mut workbook = Workbook::new();
    workbook
        .worksheet_mut(0)
        .unwrap()
        .set_cell_value("A1", "loose")
        .unwrap();
    workbook.save(&path).unwrap();

    let sync = SheetSync::open(&path).unwrap();
    let before = cells(sync.workbook().worksheet(0).unwrap());
    let err = sync.read(None).unwrap_err();
    assert!(matches!(err, SyncError::NoTableFound { ref sheet } if sheet == "Sheet1"));
    assert_eq!(cells(sync.workbook().worksheet(0).unwrap()), before);

    let err = sync.read(Some("Missing")).unwrap_err();
    assert!(matches!(err, SyncError::SheetNotFound(ref name) if name == "Missing"));
    assert_eq!(sync.sheet_names(), vec!["Sheet1"]);
}

#[test]
fn open_failures() {
    let (dir, path) = scratch();
    let err = SheetSync::open(&path).unwrap_err();
    assert!(matches!(err, SyncError::DocumentOpen { .. }));

    let junk = dir.path().join("junk.xlsx");
    std::fs::write(&junk, b"not a zip").unwrap();
    let err = SheetSync::open(&junk).unwrap_err();
    assert!(matches!(err, SyncError::DocumentOpen { ref path, .. } if path == &junk));

    let missing_dir = dir.path().join("no/such/dir/book.xlsx");
    assert!(matches!(
        SheetSync::create(&missing_dir),
        Err(SyncError::DocumentOpen { .. })
    ));
}

#[test]
fn open_or_create_reuses_existing_file() {
    let (_dir, path) = scratch();
    let mut sync = SheetSync::open_or_create(&path).unwrap();
    sync.write(&numbers(1, 2), Some("Kept")).unwrap();

    let again = SheetSync::open_or_create(&path).unwrap();
    assert_eq!(again.sheet_names(), vec!["Sheet1", "Kept"]);
}

#[test]
fn header_only_frames_round_trip() {
    let (_dir, path) = scratch();
    let frame = Frame::new(vec![
        Series::new("a", Vec::<i64>::new()),
        Series::new("b", Vec::<i64>::new()),
    ])
    .unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&frame, None).unwrap();

    let reopened = SheetSync::open(&path).unwrap();
    let table = reopened.workbook().worksheet(0).unwrap().first_table().unwrap().clone();
    assert!(table.has_insert_row());
    assert_eq!(table.range().to_a1_string(), "A1:B2");

    let back = reopened.read(None).unwrap();
    assert_eq!(back.column_names(), vec!["a", "b"]);
    assert_eq!(back.height(), 0);
}

#[test]
fn frames_without_columns_clear_the_region() {
    let (_dir, path) = scratch();
    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&numbers(3, 3), None).unwrap();
    sync.write(&Frame::empty(), None).unwrap();

    let reopened = SheetSync::open(&path).unwrap();
    assert!(reopened.workbook().worksheet(0).unwrap().is_empty());
    assert!(matches!(
        reopened.read(None),
        Err(SyncError::NoTableFound { .. })
    ));
}

#[test]
fn blank_and_repeated_headers() {
    let (_dir, path) = scratch();
    let frame = Frame::new(vec![
        Series::new("", [1]),
        Series::new("Column1", [2]),
        Series::new("x", [3]),
    ])
    .unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&frame, None).unwrap();
    let back = sync.read(None).unwrap();
    assert_eq!(back.column_names(), vec!["Column1", "Column1_1", "x"]);
}

#[test]
fn whitespace_headers_are_kept() {
    let (_dir, path) = scratch();
    let frame = Frame::new(vec![Series::new(" ", [1]), Series::new("  pad ", [2])]).unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write(&frame, None).unwrap();
    let reopened = SheetSync::open(&path).unwrap();
    assert_eq!(reopened.read(None).unwrap(), frame);
}

#[test]
fn headers_differing_in_case_stay_distinct_in_the_table() {
    let (_dir, path) = scratch();
    let frame = Frame::new(vec![Series::new("sku", [1]), Series::new("qty", [2])])
        .unwrap()
        .with_index(Series::new("SKU", ["a"]))
        .unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write_with(&frame, &WriteOptions::new().index(true)).unwrap();

    let reopened = SheetSync::open(&path).unwrap();
    let sheet = reopened.workbook().worksheet(0).unwrap();
    assert_eq!(sheet.first_table().unwrap().columns(), &["SKU", "sku_1", "qty"]);
    assert_eq!(
        reopened.read(None).unwrap().column_names(),
        vec!["SKU", "sku_1", "qty"]
    );
}

#[test]
fn new_tables_get_unused_names() {
    let (_dir, path) = scratch();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet.set_cell_value("E1", "e").unwrap();
        sheet.set_cell_value("E2", 1.0).unwrap();
        sheet
            .add_table(
                Table::new(1, CellRange::parse("E1:E2").unwrap(), vec!["e".into()])
                    .with_name("Table2"),
            )
            .unwrap();
    }
    workbook.save(&path).unwrap();

    let mut sync = SheetSync::open(&path).unwrap();
    sync.write(&numbers(1, 1), None).unwrap();
    assert_eq!(sync.tables(None).unwrap(), vec!["Table3", "Table2"]);

    let reopened = SheetSync::open(&path).unwrap();
    let ids: Vec<u32> = reopened.workbook().tables().map(Table::id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn replaced_table_keeps_its_name() {
    let (_dir, path) = scratch();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet.set_cell_value("A1", "old").unwrap();
        sheet.set_cell_value("A2", 1.0).unwrap();
        sheet
            .add_table(
                Table::new(4, CellRange::parse("A1:A2").unwrap(), vec!["old".into()])
                    .with_name("Sales"),
            )
            .unwrap();
    }
    workbook.save(&path).unwrap();

    let mut sync = SheetSync::open(&path).unwrap();
    sync.write(&numbers(3, 2), None).unwrap();
    sync.write(&numbers(1, 1), None).unwrap();

    let reopened = SheetSync::open(&path).unwrap();
    let table = reopened.workbook().worksheet(0).unwrap().first_table().unwrap();
    assert_eq!((table.id(), table.name()), (4, "Sales"));
    assert_eq!(reopened.read(None).unwrap(), numbers(1, 1));
}

#[test]
fn autofit_and_table_style_options() {
    let (_dir, path) = scratch();
    let frame = Frame::new(vec![
        Series::new("id", [1, 2]),
        Series::new("description", ["short", "a considerably longer value"]),
        Series::new("blob", ["z".repeat(400), String::new()]),
    ])
    .unwrap();

    let mut sync = SheetSync::create(&path).unwrap();
    sync.write_with(&frame, &WriteOptions::new().table_style(None)).unwrap();

    let reopened = SheetSync::open(&path).unwrap();
    let sheet = reopened.workbook().worksheet(0).unwrap();
    assert!(sheet.column_width(0) < sheet.column_width(1));
    assert_eq!(sheet.column_width(2), MAX_COLUMN_WIDTH);
    assert_eq!(sheet.first_table().unwrap().style(), None);

    sync.write_with(&numbers(1, 1), &WriteOptions::new().sheet("Plain").autofit(false))
        .unwrap();
    let plain = sync.workbook().worksheet_by_name("Plain").unwrap();
    assert!(plain.custom_column_widths().is_empty());
    assert_eq!(plain.first_table().unwrap().style(), Some("TableStyleMedium2"));
}

#[test]
fn reload_sees_writes_from_another_handle() {
    let (_dir, path) = scratch();
    let mut writer = SheetSync::create(&path).unwrap();
    let mut reader = SheetSync::open(&path).unwrap();

    writer.write(&numbers(2, 1), Some("Fresh")).unwrap();
    assert!(reader.read(Some("Fresh")).is_err());

    reader.reload().unwrap();
    assert_eq!(reader.read(Some("Fresh")).unwrap(), numbers(2, 1));
}

//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::table::Table;
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Characters a sheet name may not contain
const FORBIDDEN_SHEET_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// An ordered list of worksheets plus document settings
#[derive(Debug, Clone)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    settings: WorkbookSettings,
}

/// Document-wide settings kept across a round trip
#[derive(Debug, Clone, Default)]
pub struct WorkbookSettings {
    /// Serial dates count from 1904-01-01 instead of 1900-01-00
    pub date_1904: bool,
}

impl Workbook {
    /// A workbook holding a single empty `Sheet1`
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new("Sheet1")],
            settings: WorkbookSettings::default(),
        }
    }

    /// A workbook without any sheet, as a starting point for readers
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            settings: WorkbookSettings::default(),
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Sheet names in document order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(Worksheet::name).collect()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Sheet lookup ignoring case, as spreadsheet applications do
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.get(self.sheet_index(name)?)
    }

    /// Position of a sheet, ignoring case
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| same_sheet_name(ws.name(), name))
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Append a sheet named `SheetN` with the first free `N`
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = (self.worksheets.len() + 1..)
            .map(|n| format!("Sheet{}", n))
            .find(|name| self.sheet_index(name).is_none())
            .unwrap_or_default();
        self.add_worksheet_with_name(&name)
    }

    /// Append an empty sheet after the last one
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a sheet, checking that its name is valid and unused
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        validate_sheet_name(worksheet.name())?;
        if self.sheet_index(worksheet.name()).is_some() {
            return Err(Error::DuplicateSheetName(worksheet.name().to_string()));
        }
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    /// Every table in the workbook, sheet by sheet
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.worksheets.iter().flat_map(|ws| ws.tables().iter())
    }

    /// Next unused table id (ids and names are workbook-wide)
    pub fn next_table_id(&self) -> u32 {
        self.tables().map(Table::id).max().unwrap_or(0) + 1
    }

    /// `Table{n}` for the first `n >= from` that no table in the workbook
    /// uses as its name or display name, ignoring case
    pub fn unused_table_name(&self, from: u32) -> String {
        let taken = |name: &str| {
            self.tables().any(|t| {
                t.name().eq_ignore_ascii_case(name) || t.display_name().eq_ignore_ascii_case(name)
            })
        };
        (from.max(1)..)
            .map(|n| format!("Table{}", n))
            .find(|name| !taken(name))
            .unwrap_or_default()
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

fn same_sheet_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn validate_sheet_name(name: &str) -> Result<()> {
    let invalid = |reason: String| Err(Error::InvalidSheetName(format!("'{}': {}", name, reason)));

    if name.is_empty() {
        return invalid("name is empty".into());
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return invalid(format!("longer than {} characters", MAX_SHEET_NAME_LEN));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        return invalid(format!("contains '{}'", c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return invalid("starts or ends with an apostrophe".into());
    }
    Ok(())
}

//! Write options

use tabsync_core::table::DEFAULT_TABLE_STYLE;

/// Options controlling how a frame is written to a sheet
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Target sheet. `None` writes to the first sheet; an unknown name
    /// appends a new sheet after the last one.
    pub sheet_name: Option<String>,
    /// Size written columns to their longest value (default: true)
    pub autofit_columns: bool,
    /// Write the frame index as the first column (default: false)
    pub include_index: bool,
    /// Render columns holding nested values as text (default: true)
    pub stringify_nested: bool,
    /// Table style name; `None` writes an unstyled table
    pub table_style: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sheet_name: None,
            autofit_columns: true,
            include_index: false,
            stringify_nested: true,
            table_style: Some(DEFAULT_TABLE_STYLE.to_string()),
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn autofit(mut self, autofit: bool) -> Self {
        self.autofit_columns = autofit;
        self
    }

    pub fn index(mut self, include: bool) -> Self {
        self.include_index = include;
        self
    }

    pub fn stringify_nested(mut self, stringify: bool) -> Self {
        self.stringify_nested = stringify;
        self
    }

    pub fn table_style(mut self, style: Option<String>) -> Self {
        self.table_style = style;
        self
    }
}

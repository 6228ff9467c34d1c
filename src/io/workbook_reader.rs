//! Spreadsheet profile reader (.xlsx, .xlsm, .xls, .ods).
//!
//! Reads two numeric columns from one worksheet. The default layout matches
//! a sheet named `Sheet1` with a header row, depth in column A and
//! temperature in column B.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ProfileFileError;
use crate::profile::Profile;

/// Where the profile lives in the workbook.
///
/// Rows and columns are 0-based, relative to cell A1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Worksheet name; `None` selects the first sheet
    pub sheet: Option<String>,
    /// Depth column
    pub depth_column: usize,
    /// Temperature column
    pub temperature_column: usize,
    /// First data row (row 1 skips a single header row)
    pub first_row: usize,
    /// Number of data rows; `None` reads up to the first empty row
    pub row_count: Option<usize>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet: Some("Sheet1".to_string()),
            depth_column: 0,
            temperature_column: 1,
            first_row: 1,
            row_count: None,
        }
    }
}

impl SheetLayout {
    /// Select a worksheet by name.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Use the first worksheet, whatever its name.
    pub fn first_sheet(mut self) -> Self {
        self.sheet = None;
        self
    }

    /// Read a fixed number of data rows.
    pub fn with_row_count(mut self, rows: usize) -> Self {
        self.row_count = Some(rows);
        self
    }
}

/// Read a profile from a spreadsheet file.
///
/// The profile is named after the file.
pub fn read_profile_workbook(path: &Path, layout: &SheetLayout) -> Result<Profile, ProfileFileError> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = match &layout.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ProfileFileError::MissingSheet("<first>".to_string()))?,
    };
    if !workbook.sheet_names().contains(&sheet) {
        return Err(ProfileFileError::MissingSheet(sheet));
    }

    let range = workbook.worksheet_range(&sheet)?;
    debug!(sheet = %sheet, rows = range.height(), "worksheet loaded");

    let profile = profile_from_range(&range, layout)?;
    Ok(match path.file_name() {
        Some(name) => profile.with_name(name.to_string_lossy()),
        None => profile,
    })
}

/// Extract the profile columns from a worksheet range.
///
/// Row and column indices are absolute (A1 = (0, 0)), even when the used
/// range of the sheet starts further in.
pub fn profile_from_range(range: &Range<Data>, layout: &SheetLayout) -> Result<Profile, ProfileFileError> {
    let mut depth = Vec::new();
    let mut temperature = Vec::new();

    let end_row = match (layout.row_count, range.end()) {
        (Some(n), _) => layout.first_row + n,
        (None, Some((last, _))) => last as usize + 1,
        (None, None) => layout.first_row,
    };

    for row in layout.first_row..end_row {
        let d = range.get_value((row as u32, layout.depth_column as u32));
        let t = range.get_value((row as u32, layout.temperature_column as u32));

        if layout.row_count.is_none() && is_blank(d) && is_blank(t) {
            break;
        }

        depth.push(numeric_cell(d, row, layout.depth_column)?);
        temperature.push(numeric_cell(t, row, layout.temperature_column)?);
    }

    if depth.is_empty() {
        return Err(ProfileFileError::EmptyProfile);
    }
    Ok(Profile::new(&depth, &temperature)?)
}

fn is_blank(cell: Option<&Data>) -> bool {
    matches!(cell, None | Some(Data::Empty))
}

fn numeric_cell(cell: Option<&Data>, row: usize, column: usize) -> Result<f64, ProfileFileError> {
    let invalid = || ProfileFileError::InvalidCell { row: row + 1, column: column + 1 };
    match cell {
        Some(Data::Float(f)) => Ok(*f),
        Some(Data::Int(i)) => Ok(*i as f64),
        Some(Data::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

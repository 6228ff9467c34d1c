//! I/O utilities for reading profiles and writing detection results.
//!
//! This module provides:
//! - **Spreadsheets**: depth and temperature columns from `.xlsx`, `.xlsm`,
//!   `.xls` or `.ods` workbooks via `calamine`
//! - **Text/CSV**: two-column profile files with `#` comments
//! - **Detection export**: depth, temperature, gradient and flag columns for
//!   external plotting
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use thermocline_rs::io::{SheetLayout, load_profile, write_detection_file};
//! use thermocline_rs::analysis::ThermoclineDetector;
//!
//! let profile = load_profile(Path::new("data1.xlsx"), &SheetLayout::default())?;
//! let result = ThermoclineDetector::default().detect(&profile)?;
//! println!("{}", result.report());
//! write_detection_file(Path::new("data1.txt"), &result)?;
//! ```

mod detection_writer;
mod profile_reader;
mod workbook_reader;

pub use detection_writer::{write_detection, write_detection_file};
pub use profile_reader::{parse_profile, read_profile_file};
pub use workbook_reader::{SheetLayout, profile_from_range, read_profile_workbook};

use std::path::Path;

use thiserror::Error;

use crate::profile::{Profile, ProfileError};

/// Extensions read as spreadsheets.
const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Error type for profile file reading.
#[derive(Debug, Error)]
pub enum ProfileFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook could not be opened or read
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Requested worksheet does not exist
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),

    /// Cell is not numeric (1-based row and column)
    #[error("non-numeric cell at row {row}, column {column}")]
    InvalidCell { row: usize, column: usize },

    /// Parse error with line number
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// No data rows
    #[error("profile file contains no data")]
    EmptyProfile,

    /// Data rows do not form a valid profile
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),
}

/// True if `path` has a spreadsheet extension.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| WORKBOOK_EXTENSIONS.iter().any(|w| e.eq_ignore_ascii_case(w)))
}

/// Read a profile, choosing the reader from the file extension.
pub fn load_profile(path: &Path, layout: &SheetLayout) -> Result<Profile, ProfileFileError> {
    if is_workbook(path) {
        read_profile_workbook(path, layout)
    } else {
        read_profile_file(path)
    }
}

//! # Recipients
//!
//! Recipient sheet loading.
//!
//! Responsibilities:
//! - Read CSV files and spreadsheet workbooks into `RecipientRecord`s
//! - Map recognized columns case-insensitively, ignore the rest
//! - Expose the result as a `RecipientSource` for the dispatch engine
//!
//! # Example
//!
//! ```no_run
//! use recipients::RecipientSheet;
//! use std::path::Path;
//!
//! let sheet = RecipientSheet::load_from_path(Path::new("leads.csv")).unwrap();
//! println!("{} rows", sheet.len());
//! ```

mod columns;
mod delimited;
mod sheet;
mod workbook;

pub use columns::{Column, ColumnMap};
pub use contracts::{RecipientRecord, RecipientSource};
pub use sheet::{RecipientSheet, SheetFormat};

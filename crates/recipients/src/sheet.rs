//! RecipientSheet - in-memory recipient list

use std::path::Path;

use contracts::{ContractError, RecipientRecord, RecipientSource};
use tracing::{info, instrument};

use crate::{delimited, workbook};

/// Recipient file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Spreadsheet workbook (first worksheet)
    Workbook,
}

impl SheetFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

/// Recipient records loaded from one file, in row order
#[derive(Debug, Clone, Default)]
pub struct RecipientSheet {
    records: Vec<RecipientRecord>,
}

impl RecipientSheet {
    /// Wrap already-built records
    pub fn new(records: Vec<RecipientRecord>) -> Self {
        Self { records }
    }

    /// Load a sheet, detecting the format from the file extension
    ///
    /// # Errors
    /// - Unsupported or missing extension
    /// - Read / parse failure
    /// - No `email` column
    #[instrument(name = "recipient_sheet_load", skip(path), fields(path = %path.display()))]
    pub fn load_from_path(path: &Path) -> Result<Self, ContractError> {
        let origin = path.display().to_string();
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SheetFormat::from_extension)
            .ok_or_else(|| ContractError::source_read(&origin, "unsupported file type"))?;

        let records = match format {
            SheetFormat::Csv => {
                let file = std::fs::File::open(path)
                    .map_err(|e| ContractError::source_read(&origin, e.to_string()))?;
                delimited::read_records(file, &origin)?
            }
            SheetFormat::Workbook => workbook::read_records(path)?,
        };

        let sheet = Self::new(records);
        info!(
            rows = sheet.len(),
            deliverable = sheet.deliverable_count(),
            ?format,
            "Recipient sheet loaded"
        );
        Ok(sheet)
    }

    /// Parse CSV text (header row required)
    pub fn from_csv_str(content: &str) -> Result<Self, ContractError> {
        delimited::read_records(content.as_bytes(), "<inline>").map(Self::new)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the sheet has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows with a non-blank address
    pub fn deliverable_count(&self) -> usize {
        self.records.iter().filter(|r| r.address().is_some()).count()
    }

    /// All rows
    pub fn records(&self) -> &[RecipientRecord] {
        &self.records
    }
}

impl RecipientSource for RecipientSheet {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn get(&self, index: usize) -> Option<&RecipientRecord> {
        self.records.get(index)
    }
}

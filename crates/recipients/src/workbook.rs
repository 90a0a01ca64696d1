//! Spreadsheet workbook reading (xlsx / xls / ods)
//!
//! Only the first worksheet is read. The header row is the first non-empty
//! row of its used range, so a table that does not start at A1 still maps;
//! blank rows inside the range stay as blank records.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use contracts::{ContractError, RecipientRecord};

use crate::columns::ColumnMap;

/// Read all records from the first worksheet of a workbook
pub(crate) fn read_records(path: &Path) -> Result<Vec<RecipientRecord>, ContractError> {
    let origin = path.display().to_string();
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ContractError::source_read(&origin, e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ContractError::source_read(&origin, "workbook has no worksheets"))?
        .map_err(|e| ContractError::source_read(&origin, e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(ContractError::source_missing_column("email"));
    };
    let columns = ColumnMap::from_headers(header_row.iter().map(cell_text))?;

    let records = rows
        .map(|row| {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            columns.record(|i| cells.get(i).map(String::as_str))
        })
        .collect();
    Ok(records)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

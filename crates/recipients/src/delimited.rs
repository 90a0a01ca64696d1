//! CSV reading

use std::io::Read;

use contracts::{ContractError, RecipientRecord};

use crate::columns::ColumnMap;

/// Read all records from a CSV stream with a header row
pub(crate) fn read_records<R: Read>(
    reader: R,
    origin: &str,
) -> Result<Vec<RecipientRecord>, ContractError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ContractError::source_read(origin, e.to_string()))?
        .clone();
    let columns = ColumnMap::from_headers(headers.iter())?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|e| ContractError::source_read(origin, e.to_string()))?;
        records.push(columns.record(|i| row.get(i)));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_quoted_multiline_body() {
        let data = "email,first_name,body\n\
                    a@example.com,Ann,\"Hi {first_name}\n• one\n• two\"\n\
                    ,Nobody,ignored\n";
        let records = read_records(data.as_bytes(), "inline").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].body.as_deref(), Some("Hi {first_name}\n• one\n• two"));
        assert_eq!(records[1].address(), None);
    }

    #[test]
    fn test_missing_email_header_is_error() {
        let data = "name,body\nAnn,hello\n";
        assert!(read_records(data.as_bytes(), "inline").is_err());
    }
}

//! Header row mapping
//!
//! Recognized columns: email, first_name, last_name, company_name, subject,
//! body. Matching ignores case and surrounding whitespace.

use contracts::{ContractError, RecipientRecord};

/// Recognized recipient column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Email,
    FirstName,
    LastName,
    CompanyName,
    Subject,
    Body,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Email,
        Column::FirstName,
        Column::LastName,
        Column::CompanyName,
        Column::Subject,
        Column::Body,
    ];

    /// Header text as written in the sheet
    pub fn header(self) -> &'static str {
        match self {
            Column::Email => "email",
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::CompanyName => "company_name",
            Column::Subject => "subject",
            Column::Body => "body",
        }
    }

    fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.header().eq_ignore_ascii_case(header))
    }
}

/// Column positions resolved from a header row
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: [Option<usize>; 6],
}

impl ColumnMap {
    /// Resolve positions from header cells
    ///
    /// The first occurrence of a duplicated header wins.
    ///
    /// # Errors
    /// Returns `SourceMissingColumn` when there is no `email` column.
    pub fn from_headers<I, S>(headers: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::default();
        for (position, header) in headers.into_iter().enumerate() {
            if let Some(column) = Column::from_header(header.as_ref()) {
                let slot = &mut map.positions[column as usize];
                if slot.is_none() {
                    *slot = Some(position);
                }
            }
        }

        if map.position(Column::Email).is_none() {
            return Err(ContractError::source_missing_column(Column::Email.header()));
        }
        Ok(map)
    }

    /// Position of `column`, if present
    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column as usize]
    }

    /// Build a record from one row of cells
    ///
    /// `cell` returns the raw text at a position (None past the row end).
    pub fn record<'a, F>(&self, cell: F) -> RecipientRecord
    where
        F: Fn(usize) -> Option<&'a str>,
    {
        let value = |column: Column| -> Option<String> {
            self.position(column)
                .and_then(&cell)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };

        RecipientRecord {
            email: value(Column::Email).unwrap_or_default(),
            first_name: value(Column::FirstName),
            last_name: value(Column::LastName),
            company_name: value(Column::CompanyName),
            subject: value(Column::Subject),
            body: value(Column::Body),
        }
    }
}

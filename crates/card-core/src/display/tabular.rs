//! CSV reader for collection exports
//!
//! Exports start with a fixed number of free-form records, then a header
//! record, then data rows. Only the identity and display columns are read.

use super::LoadError;
use crate::identity::CardIdentity;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Shape of a tabular display-info source.
///
/// Sources must be UTF-8; a leading byte-order mark is ignored. Any other
/// encoding fails the load with `LoadError::Malformed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularFormat {
    /// Non-blank records preceding the header row.
    pub skip_records: usize,
    pub identity_column: String,
    pub display_column: String,
}

impl Default for TabularFormat {
    fn default() -> Self {
        Self {
            skip_records: 5,
            identity_column: "Card ID".to_string(),
            display_column: "Copies".to_string(),
        }
    }
}

/// Read every `(identity, display text)` row of one source.
pub(crate) fn read_rows<R: Read>(
    reader: R,
    source_name: &str,
    format: &TabularFormat,
) -> Result<Vec<(CardIdentity, String)>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = reader
        .records()
        .filter(|record| record.as_ref().map(|r| !is_blank(r)).unwrap_or(true))
        .map(|record| {
            record.map_err(|source| LoadError::Malformed {
                source_name: source_name.to_string(),
                source,
            })
        });

    for _ in 0..format.skip_records {
        if records.next().transpose()?.is_none() {
            break;
        }
    }

    let header = records
        .next()
        .transpose()?
        .ok_or_else(|| LoadError::MissingHeader {
            source_name: source_name.to_string(),
        })?;

    let column_index = |column: &str| {
        header
            .iter()
            .position(|name| name.trim_start_matches('\u{feff}').trim() == column)
            .ok_or_else(|| LoadError::MissingColumn {
                source_name: source_name.to_string(),
                column: column.to_string(),
            })
    };
    let id_col = column_index(&format.identity_column)?;
    let text_col = column_index(&format.display_column)?;

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let missing = |column: &str| LoadError::MissingField {
            source_name: source_name.to_string(),
            line,
            column: column.to_string(),
        };

        let id = record
            .get(id_col)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| missing(&format.identity_column))?;
        let text = record
            .get(text_col)
            .ok_or_else(|| missing(&format.display_column))?;

        rows.push((CardIdentity::new(id), text.to_string()));
    }

    Ok(rows)
}

/// A whitespace-only line parses as one blank field.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}

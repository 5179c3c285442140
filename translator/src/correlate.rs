//! Pairing of decoded values into per-column values.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::bail;
use crate::error::{ErrorKind, TranslateResult};
use crate::types::{Cell, ColumnId, ColumnMetadata, TableMetadata};

/// Values of one decoded row, indexed by column id.
///
/// The mapping has no meaningful iteration order. Statements are always built by walking the
/// table's declared columns and looking values up here.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecodedRow {
    values: HashMap<ColumnId, Cell>,
}

impl DecodedRow {
    /// Returns the value decoded for the column id.
    pub fn get(&self, id: ColumnId) -> Option<&Cell> {
        self.values.get(&id)
    }

    /// Removes and returns the value decoded for the column id.
    pub fn take(&mut self, id: ColumnId) -> Option<Cell> {
        self.values.remove(&id)
    }

    /// Drains the values of the given columns, in the order of `columns`.
    ///
    /// Columns without a decoded value are skipped, so the returned columns and values always
    /// have the same length.
    pub fn take_in_order<'a, I>(&mut self, columns: I) -> (Vec<&'a ColumnMetadata>, Vec<Cell>)
    where
        I: IntoIterator<Item = &'a ColumnMetadata>,
    {
        let mut present_columns = Vec::new();
        let mut values = Vec::new();

        for column in columns {
            if let Some(value) = self.take(column.id) {
                present_columns.push(column);
                values.push(value);
            }
        }

        (present_columns, values)
    }
}

/// Interprets `values` as alternating `(column id, value)` pairs of `table`.
///
/// Fails with [`ErrorKind::DecodeCorruption`] when the number of values is odd, a column id is
/// not an integer, or a column id appears twice, and with [`ErrorKind::SchemaInconsistency`]
/// when a column id is not declared by the table.
pub fn correlate(
    schema: &str,
    table: &TableMetadata,
    values: Vec<Cell>,
) -> TranslateResult<DecodedRow> {
    if values.len() % 2 != 0 {
        bail!(
            ErrorKind::DecodeCorruption,
            "Row raw data is corrupted",
            format!(
                "Table {schema}.{table} decoded an odd number of values ({}) where column id and value pairs were expected: {values:?}",
                values.len()
            )
        );
    }

    let mut row = DecodedRow {
        values: HashMap::with_capacity(values.len() / 2),
    };

    let mut values = values.into_iter();
    while let (Some(id), Some(value)) = (values.next(), values.next()) {
        let Some(column_id) = id.as_column_id() else {
            bail!(
                ErrorKind::DecodeCorruption,
                "Row raw data is corrupted",
                format!("Table {schema}.{table} decoded {id:?} where a column id was expected")
            );
        };

        if table.column_by_id(column_id).is_none() {
            bail!(
                ErrorKind::SchemaInconsistency,
                "Row references an unknown column",
                format!(
                    "Table {schema}.{table} has no column with id {column_id} (value {value:?})"
                )
            );
        }

        match row.values.entry(column_id) {
            Entry::Occupied(_) => {
                bail!(
                    ErrorKind::DecodeCorruption,
                    "Row raw data is corrupted",
                    format!("Table {schema}.{table} decoded column id {column_id} twice")
                );
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    Ok(row)
}

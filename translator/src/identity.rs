//! Resolution of the columns that identify a row of a table.

use crate::bail;
use crate::error::{ErrorKind, TranslateResult};
use crate::types::{ColumnMetadata, TableMetadata};

/// Returns the column stored as the integer row handle, if the table has one.
pub fn handle_column(table: &TableMetadata) -> Option<&ColumnMetadata> {
    table
        .columns
        .iter()
        .find(|column| table.is_handle_column(column))
}

/// Resolves the ordered set of columns that identify a row of `table`.
///
/// The integer row-handle column wins over any index. Otherwise the members of the primary
/// index are mapped to columns by case-insensitive name, in index order. Returns [`None`] when
/// the table has neither.
///
/// A primary index whose members match no declared column is reported as
/// [`ErrorKind::SchemaInconsistency`].
pub fn resolve_identity_columns<'a>(
    schema: &str,
    table: &'a TableMetadata,
) -> TranslateResult<Option<Vec<&'a ColumnMetadata>>> {
    if let Some(column) = handle_column(table) {
        return Ok(Some(vec![column]));
    }

    let Some(index) = table.primary_index() else {
        return Ok(None);
    };

    let columns: Vec<_> = index
        .columns
        .iter()
        .filter_map(|member| {
            table
                .columns
                .iter()
                .find(|column| column.name.eq_ignore_ascii_case(member))
        })
        .collect();

    if columns.is_empty() {
        bail!(
            ErrorKind::SchemaInconsistency,
            "Primary index unexpectedly empty",
            format!(
                "Primary index {} of table {schema}.{table} resolves to no declared column (members: {:?})",
                index.name, index.columns
            )
        );
    }

    Ok(Some(columns))
}

/// Resolves the identity columns of `table`, failing when there are none.
pub fn require_identity_columns<'a>(
    schema: &str,
    table: &'a TableMetadata,
) -> TranslateResult<Vec<&'a ColumnMetadata>> {
    match resolve_identity_columns(schema, table)? {
        Some(columns) => Ok(columns),
        None => bail!(
            ErrorKind::MissingIdentity,
            "Table has no identity columns",
            format!("Table {schema}.{table} has neither a row handle nor a primary index")
        ),
    }
}

/// Returns the row-handle column of `table`, failing when there is none.
pub fn require_handle_column<'a>(
    schema: &str,
    table: &'a TableMetadata,
) -> TranslateResult<&'a ColumnMetadata> {
    match handle_column(table) {
        Some(column) => Ok(column),
        None => bail!(
            ErrorKind::MissingIdentity,
            "Table has no row handle column",
            format!("Table {schema}.{table} does not store its primary key in the row handle")
        ),
    }
}

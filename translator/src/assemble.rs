//! Assembly of decoded row payloads into statement value vectors.
//!
//! Every function here handles exactly one row payload, so a corrupt payload only affects the
//! statement of its own row. Output order is always the declared column order of the table (or
//! the resolved identity order), never the order of the payload.

use tracing::{trace, warn};

use crate::bail;
use crate::codec::{CodecError, decode_n, decode_one};
use crate::correlate::correlate;
use crate::error::{ErrorKind, TranslateError, TranslateResult};
use crate::types::{Cell, ColumnMetadata, TableMetadata};

/// Columns paired with one value each, in statement order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RowSnapshot<'a> {
    pub columns: Vec<&'a ColumnMetadata>,
    pub values: Vec<Cell>,
}

impl<'a> RowSnapshot<'a> {
    pub fn push(&mut self, column: &'a ColumnMetadata, value: Cell) {
        self.columns.push(column);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// The two halves of an update statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateValues<'a> {
    /// Columns to set with their new values, in declared column order.
    pub assignments: RowSnapshot<'a>,
    /// Columns that locate the row with their old values.
    pub predicate: RowSnapshot<'a>,
}

/// Builds the full-width value vector of one inserted row.
///
/// The payload is a row handle followed by `(column id, value)` pairs. The handle is used for
/// the row-handle column, payload values for the columns they name and declared defaults for
/// every other column.
pub fn assemble_insert(
    schema: &str,
    table: &TableMetadata,
    row: &[u8],
) -> TranslateResult<Vec<Cell>> {
    let (data, handle) = decode_one(row).map_err(|err| undecodable(schema, table, row, err))?;

    let value_count = 2 * table
        .columns
        .iter()
        .filter(|column| !table.is_handle_column(column))
        .count();
    let (values, remaining) =
        decode_n(data, value_count).map_err(|err| undecodable(schema, table, row, err))?;
    ensure_consumed(schema, table, row, remaining)?;

    let mut decoded = correlate(schema, table, values)?;

    let mut values = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        if table.is_handle_column(column) {
            values.push(handle.clone());
            continue;
        }

        match decoded.take(column.id) {
            Some(value) => values.push(value),
            None => {
                trace!(
                    schema,
                    table = %table,
                    column = %column.name,
                    default = %column.default_value,
                    "column missing from insert payload, using declared default"
                );
                values.push(column.default_value.clone());
            }
        }
    }

    Ok(values)
}

/// Builds the assignments and predicate of one updated row.
///
/// With identity columns the payload is a row handle followed by `(column id, value)` pairs of
/// the new row, and the identity columns are located by the values they carry in the payload.
/// The peeled handle stands in for a row-handle column missing from the pairs.
///
/// Without identity columns the payload is the pairs of the old row followed by the pairs of the
/// new row, and the whole old row becomes the predicate.
pub fn assemble_update<'a>(
    schema: &str,
    table: &'a TableMetadata,
    identity: Option<&[&'a ColumnMetadata]>,
    row: &[u8],
) -> TranslateResult<UpdateValues<'a>> {
    let update = match identity {
        Some(identity) => assemble_update_by_identity(schema, table, identity, row)?,
        None => assemble_update_by_snapshot(schema, table, row)?,
    };

    if update.assignments.is_empty() {
        bail!(
            ErrorKind::DecodeCorruption,
            "Update row carries no column values",
            format!("Table {schema}.{table} update payload {row:02x?} has no column values")
        );
    }

    if update.predicate.is_empty() {
        bail!(
            ErrorKind::MissingIdentity,
            "Update row cannot be located",
            format!(
                "Table {schema}.{table} update payload {row:02x?} carries no value for any identity column"
            )
        );
    }

    Ok(update)
}

fn assemble_update_by_identity<'a>(
    schema: &str,
    table: &'a TableMetadata,
    identity: &[&'a ColumnMetadata],
    row: &[u8],
) -> TranslateResult<UpdateValues<'a>> {
    let (data, handle) = decode_one(row).map_err(|err| undecodable(schema, table, row, err))?;

    let (values, remaining) = decode_n(data, 2 * table.columns.len())
        .map_err(|err| undecodable(schema, table, row, err))?;
    ensure_consumed(schema, table, row, remaining)?;

    let mut decoded = correlate(schema, table, values)?;

    let mut predicate = RowSnapshot::default();
    for &column in identity {
        match decoded.get(column.id) {
            Some(value) => predicate.push(column, value.clone()),
            None if table.is_handle_column(column) => predicate.push(column, handle.clone()),
            None => {}
        }
    }

    let (columns, values) = decoded.take_in_order(&table.columns);

    Ok(UpdateValues {
        assignments: RowSnapshot { columns, values },
        predicate,
    })
}

fn assemble_update_by_snapshot<'a>(
    schema: &str,
    table: &'a TableMetadata,
    row: &[u8],
) -> TranslateResult<UpdateValues<'a>> {
    let value_count = 4 * table.columns.len();
    let (mut values, remaining) =
        decode_n(row, value_count).map_err(|err| undecodable(schema, table, row, err))?;
    ensure_consumed(schema, table, row, remaining)?;

    if values.len() % 4 != 0 {
        bail!(
            ErrorKind::DecodeCorruption,
            "Row raw data is corrupted",
            format!(
                "Table {schema}.{table} update payload decoded {} values where an even number of old and new column pairs was expected: {values:?}",
                values.len()
            )
        );
    }

    let new_values = values.split_off(values.len() / 2);
    let mut old = correlate(schema, table, values)?;
    let mut new = correlate(schema, table, new_values)?;

    warn!(
        schema,
        table = %table,
        "table has no identity columns, locating updated row by its whole old snapshot"
    );

    let (columns, values) = old.take_in_order(&table.columns);
    let predicate = RowSnapshot { columns, values };

    let (columns, values) = new.take_in_order(&table.columns);
    let assignments = RowSnapshot { columns, values };

    Ok(UpdateValues {
        assignments,
        predicate,
    })
}

/// Builds the predicate of one row deleted by its identity values.
///
/// The payload holds exactly one value per identity column, in identity order.
pub fn assemble_delete_by_identity<'a>(
    schema: &str,
    table: &TableMetadata,
    identity: &[&'a ColumnMetadata],
    row: &[u8],
) -> TranslateResult<RowSnapshot<'a>> {
    let (values, remaining) =
        decode_n(row, identity.len()).map_err(|err| undecodable(schema, table, row, err))?;

    if values.len() != identity.len() || !remaining.is_empty() {
        bail!(
            ErrorKind::DecodeCorruption,
            "Row raw data is corrupted",
            format!(
                "Table {schema}.{table} delete payload {row:02x?} does not hold exactly {} identity values (decoded {values:?})",
                identity.len()
            )
        );
    }

    Ok(RowSnapshot {
        columns: identity.to_vec(),
        values,
    })
}

/// Builds the predicate of one row deleted by a snapshot of its columns.
///
/// The payload is `(column id, value)` pairs. Only the columns present in the payload are
/// compared, in declared column order.
pub fn assemble_delete_by_columns<'a>(
    schema: &str,
    table: &'a TableMetadata,
    row: &[u8],
) -> TranslateResult<RowSnapshot<'a>> {
    let value_count = 2 * table.columns.len();
    let (values, remaining) =
        decode_n(row, value_count).map_err(|err| undecodable(schema, table, row, err))?;
    ensure_consumed(schema, table, row, remaining)?;

    let mut decoded = correlate(schema, table, values)?;
    let (columns, values) = decoded.take_in_order(&table.columns);

    if columns.is_empty() {
        bail!(
            ErrorKind::DecodeCorruption,
            "Delete row carries no column values",
            format!("Table {schema}.{table} delete payload {row:02x?} has no column values")
        );
    }

    Ok(RowSnapshot { columns, values })
}

/// Builds the predicate of one row deleted by its row handle.
pub fn assemble_delete_by_row_id(handle: &ColumnMetadata, row_id: i64) -> RowSnapshot<'_> {
    RowSnapshot {
        columns: vec![handle],
        values: vec![Cell::I64(row_id)],
    }
}

/// Wraps a codec failure with the table and payload it happened on.
fn undecodable(
    schema: &str,
    table: &TableMetadata,
    row: &[u8],
    err: CodecError,
) -> TranslateError {
    let detail = format!("Table {schema}.{table} payload {row:02x?}: {err}");
    TranslateError::from(err).with_detail(detail)
}

fn ensure_consumed(
    schema: &str,
    table: &TableMetadata,
    row: &[u8],
    remaining: &[u8],
) -> TranslateResult<()> {
    if !remaining.is_empty() {
        bail!(
            ErrorKind::DecodeCorruption,
            "Row raw data is corrupted",
            format!(
                "Table {schema}.{table} payload {row:02x?} has {} trailing bytes after its last expected value",
                remaining.len()
            )
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{require_identity_columns, resolve_identity_columns};
    use crate::test_utils::payload::{
        handle_payload, pairs_payload, snapshot_update_payload, values_payload,
    };
    use crate::test_utils::table::{composite_key_table, keyless_table, people_table};

    fn names(columns: &[&ColumnMetadata]) -> Vec<String> {
        columns.iter().map(|column| column.name.clone()).collect()
    }

    #[test]
    fn insert_fills_handle_and_defaults() {
        let table = people_table();
        let row = handle_payload(5, &[(2, Cell::from("ann"))]);

        let values = assemble_insert("s", &table, &row).unwrap();
        assert_eq!(values, vec![Cell::I64(5), Cell::from("ann"), Cell::I64(0)]);
    }

    #[test]
    fn insert_follows_declared_order_not_payload_order() {
        let table = composite_key_table();
        let row = handle_payload(
            1,
            &[
                (3, Cell::from("gift")),
                (2, Cell::I64(7)),
                (1, Cell::I64(100)),
            ],
        );

        let values = assemble_insert("s", &table, &row).unwrap();
        assert_eq!(
            values,
            vec![Cell::I64(100), Cell::I64(7), Cell::from("gift")]
        );
    }

    #[test]
    fn insert_with_odd_pairs_is_corruption() {
        let table = people_table();
        let mut row = handle_payload(5, &[(2, Cell::from("ann"))]);
        row.extend(values_payload(&[Cell::I64(3)]));

        let err = assemble_insert("s", &table, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
    }

    #[test]
    fn insert_with_trailing_bytes_is_corruption() {
        let table = people_table();
        let mut row = handle_payload(5, &[(2, Cell::from("ann")), (3, Cell::I64(1))]);
        row.push(0x00);

        let err = assemble_insert("s", &table, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
        assert!(err.detail().unwrap().contains("trailing"));
    }

    #[test]
    fn truncated_payload_keeps_table_context() {
        let table = people_table();
        let err = assemble_insert("s", &table, &[0x03, 0x80]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
        assert!(err.detail().unwrap().starts_with("Table s.t payload"));

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(
            source.downcast_ref::<CodecError>(),
            Some(&CodecError::Truncated("int"))
        );
    }

    #[test]
    fn update_with_handle_uses_handle_as_old_value() {
        let table = people_table();
        let identity = require_identity_columns("s", &table).unwrap();
        let row = handle_payload(5, &[(3, Cell::I64(31)), (2, Cell::from("bo"))]);

        let update = assemble_update("s", &table, Some(identity.as_slice()), &row).unwrap();

        assert_eq!(names(&update.assignments.columns), vec!["name", "age"]);
        assert_eq!(
            update.assignments.values,
            vec![Cell::from("bo"), Cell::I64(31)]
        );
        assert_eq!(names(&update.predicate.columns), vec!["id"]);
        assert_eq!(update.predicate.values, vec![Cell::I64(5)]);
    }

    #[test]
    fn update_with_primary_index_uses_payload_values() {
        let table = composite_key_table();
        let identity = require_identity_columns("s", &table).unwrap();
        let row = handle_payload(
            9,
            &[
                (1, Cell::I64(100)),
                (2, Cell::I64(7)),
                (3, Cell::from("late")),
            ],
        );

        let update = assemble_update("s", &table, Some(identity.as_slice()), &row).unwrap();

        assert_eq!(names(&update.predicate.columns), vec!["line", "order_id"]);
        assert_eq!(update.predicate.values, vec![Cell::I64(7), Cell::I64(100)]);
        assert_eq!(update.assignments.len(), 3);
    }

    #[test]
    fn update_without_identity_values_is_missing_identity() {
        let table = composite_key_table();
        let identity = require_identity_columns("s", &table).unwrap();
        let row = handle_payload(9, &[(3, Cell::from("late"))]);

        let err = assemble_update("s", &table, Some(identity.as_slice()), &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingIdentity);
    }

    #[test]
    fn update_without_identity_splits_old_and_new_halves() {
        let table = keyless_table();
        assert_eq!(resolve_identity_columns("s", &table).unwrap(), None);

        let row = snapshot_update_payload(
            &[(2, Cell::from("old")), (1, Cell::from("a"))],
            &[(1, Cell::from("a")), (2, Cell::Null)],
        );

        let update = assemble_update("s", &table, None, &row).unwrap();

        assert_eq!(names(&update.predicate.columns), vec!["kind", "body"]);
        assert_eq!(
            update.predicate.values,
            vec![Cell::from("a"), Cell::from("old")]
        );
        assert_eq!(update.assignments.values, vec![Cell::from("a"), Cell::Null]);
    }

    #[test]
    fn update_without_identity_and_odd_pairs_is_corruption() {
        let table = keyless_table();
        let row = pairs_payload(&[
            (1, Cell::from("a")),
            (2, Cell::from("b")),
            (1, Cell::from("c")),
        ]);

        let err = assemble_update("s", &table, None, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
    }

    #[test]
    fn delete_by_identity_requires_exact_value_count() {
        let table = composite_key_table();
        let identity = require_identity_columns("s", &table).unwrap();

        let row = values_payload(&[Cell::I64(7), Cell::I64(100)]);
        let snapshot = assemble_delete_by_identity("s", &table, &identity, &row).unwrap();
        assert_eq!(names(&snapshot.columns), vec!["line", "order_id"]);
        assert_eq!(snapshot.values, vec![Cell::I64(7), Cell::I64(100)]);

        let row = values_payload(&[Cell::I64(7)]);
        let err = assemble_delete_by_identity("s", &table, &identity, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);

        let row = values_payload(&[Cell::I64(7), Cell::I64(100), Cell::I64(1)]);
        let err = assemble_delete_by_identity("s", &table, &identity, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
    }

    #[test]
    fn delete_by_columns_uses_present_columns_in_declared_order() {
        let table = people_table();
        let row = pairs_payload(&[(3, Cell::Null), (1, Cell::I64(5))]);

        let snapshot = assemble_delete_by_columns("s", &table, &row).unwrap();
        assert_eq!(names(&snapshot.columns), vec!["id", "age"]);
        assert_eq!(snapshot.values, vec![Cell::I64(5), Cell::Null]);
    }

    #[test]
    fn delete_by_columns_with_odd_pairs_is_corruption() {
        let table = people_table();
        let mut row = pairs_payload(&[(1, Cell::I64(5))]);
        row.extend(values_payload(&[Cell::I64(2)]));

        let err = assemble_delete_by_columns("s", &table, &row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
    }

    #[test]
    fn delete_by_row_id_targets_handle() {
        let table = people_table();
        let snapshot = assemble_delete_by_row_id(&table.columns[0], 5);

        assert_eq!(names(&snapshot.columns), vec!["id"]);
        assert_eq!(snapshot.values, vec![Cell::I64(5)]);
    }
}

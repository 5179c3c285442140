use crate::codec::{encode_key, encode_value};
use crate::types::{Cell, ColumnId};

/// Encodes `values` one after another.
///
/// # Panics
///
/// Panics if a value cannot be encoded.
pub fn values_payload(values: &[Cell]) -> Vec<u8> {
    let mut buf = Vec::new();
    for value in values {
        encode_value(&mut buf, value).unwrap();
    }

    buf
}

/// Encodes `(column id, value)` pairs one after another.
///
/// # Panics
///
/// Panics if a value cannot be encoded.
pub fn pairs_payload(pairs: &[(ColumnId, Cell)]) -> Vec<u8> {
    let mut buf = Vec::new();
    append_pairs(&mut buf, pairs);

    buf
}

/// Encodes a row handle followed by `(column id, value)` pairs, the layout of insert payloads
/// and of update payloads on tables with identity columns.
///
/// # Panics
///
/// Panics if a value cannot be encoded.
pub fn handle_payload(handle: i64, pairs: &[(ColumnId, Cell)]) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_key(&mut buf, &Cell::I64(handle)).unwrap();
    append_pairs(&mut buf, pairs);

    buf
}

/// Encodes the old pairs followed by the new pairs, the layout of update payloads on tables
/// without identity columns.
///
/// # Panics
///
/// Panics if a value cannot be encoded.
pub fn snapshot_update_payload(old: &[(ColumnId, Cell)], new: &[(ColumnId, Cell)]) -> Vec<u8> {
    let mut buf = Vec::new();
    append_pairs(&mut buf, old);
    append_pairs(&mut buf, new);

    buf
}

fn append_pairs(buf: &mut Vec<u8>, pairs: &[(ColumnId, Cell)]) {
    for (id, value) in pairs {
        encode_value(buf, &Cell::I64(*id)).unwrap();
        encode_value(buf, value).unwrap();
    }
}

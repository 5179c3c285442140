use byteorder::{BigEndian, ByteOrder};

use crate::codec::{
    BYTES_FLAG, BYTES_GROUP_MARKER, BYTES_GROUP_SIZE, COMPACT_BYTES_FLAG, CodecError, DECIMAL_FLAG,
    DURATION_FLAG, FLOAT_FLAG, INT_FLAG, NIL_FLAG, SIGN_MASK, UINT_FLAG, UVARINT_FLAG, VARINT_FLAG,
};
use crate::types::Cell;

/// Appends the value form of `cell` to `buf`.
///
/// Integers use the varint flags and bytes the compact flag, which is the layout change logs
/// use for row values and column ids.
pub fn encode_value(buf: &mut Vec<u8>, cell: &Cell) -> Result<(), CodecError> {
    match cell {
        Cell::Null => buf.push(NIL_FLAG),
        Cell::I64(value) => {
            buf.push(VARINT_FLAG);
            encode_varint(buf, *value);
        }
        Cell::U64(value) => {
            buf.push(UVARINT_FLAG);
            encode_uvarint(buf, *value);
        }
        Cell::F64(value) => {
            buf.push(FLOAT_FLAG);
            write_u64(buf, encode_comparable_float(*value));
        }
        Cell::Bytes(bytes) => {
            buf.push(COMPACT_BYTES_FLAG);
            encode_compact_bytes(buf, bytes);
        }
        Cell::Numeric(value) => {
            buf.push(DECIMAL_FLAG);
            encode_compact_bytes(buf, value.to_string().as_bytes());
        }
        Cell::Duration(value) => {
            let nanos = value
                .num_nanoseconds()
                .ok_or_else(|| CodecError::DurationOutOfRange(value.to_string()))?;
            buf.push(DURATION_FLAG);
            write_u64(buf, (nanos as u64) ^ SIGN_MASK);
        }
    }

    Ok(())
}

/// Appends the order-preserving form of `cell` to `buf`.
///
/// Integers use fixed-width big endian and bytes the memcomparable groups, which is the layout
/// row handles use. Cells without a dedicated comparable form fall back to [`encode_value`].
pub fn encode_key(buf: &mut Vec<u8>, cell: &Cell) -> Result<(), CodecError> {
    match cell {
        Cell::I64(value) => {
            buf.push(INT_FLAG);
            write_u64(buf, (*value as u64) ^ SIGN_MASK);
        }
        Cell::U64(value) => {
            buf.push(UINT_FLAG);
            write_u64(buf, *value);
        }
        Cell::Bytes(bytes) => {
            buf.push(BYTES_FLAG);
            encode_memcomparable_bytes(buf, bytes);
        }
        Cell::Null | Cell::F64(_) | Cell::Numeric(_) | Cell::Duration(_) => {
            encode_value(buf, cell)?
        }
    }

    Ok(())
}

/// Encodes `cells` one after another with [`encode_value`].
pub fn encode_row(cells: &[Cell]) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    for cell in cells {
        encode_value(&mut buf, cell)?;
    }

    Ok(buf)
}

fn write_u64(buf: &mut Vec<u8>, value: u64) {
    let mut bytes = [0u8; 8];
    BigEndian::write_u64(&mut bytes, value);
    buf.extend_from_slice(&bytes);
}

fn encode_comparable_float(value: f64) -> u64 {
    let bits = value.to_bits();
    if value >= 0.0 { bits | SIGN_MASK } else { !bits }
}

fn encode_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

fn encode_varint(buf: &mut Vec<u8>, value: i64) {
    let mut zigzag = (value as u64) << 1;
    if value < 0 {
        zigzag = !zigzag;
    }
    encode_uvarint(buf, zigzag);
}

fn encode_compact_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_varint(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}

fn encode_memcomparable_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    // A trailing group is always written, fully padded when the length is a multiple of the
    // group size.
    for chunk_start in (0..=bytes.len()).step_by(BYTES_GROUP_SIZE) {
        let chunk = &bytes[chunk_start..bytes.len().min(chunk_start + BYTES_GROUP_SIZE)];
        let pad_count = BYTES_GROUP_SIZE - chunk.len();

        buf.extend_from_slice(chunk);
        buf.resize(buf.len() + pad_count, 0);
        buf.push(BYTES_GROUP_MARKER - pad_count as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_one;
    use chrono::TimeDelta;

    fn key_round_trip(cell: Cell) {
        let mut buf = Vec::new();
        encode_key(&mut buf, &cell).unwrap();

        let (remaining, decoded) = decode_one(&buf).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded, cell);
    }

    #[test]
    fn keys_survive_encode_then_decode() {
        key_round_trip(Cell::I64(-42));
        key_round_trip(Cell::U64(42));
        key_round_trip(Cell::from("exactly8"));
        key_round_trip(Cell::from("more than one group"));
        key_round_trip(Cell::Null);
    }

    #[test]
    fn memcomparable_bytes_pad_full_groups() {
        let mut buf = Vec::new();
        encode_key(&mut buf, &Cell::from("exactly8")).unwrap();

        assert_eq!(buf.len(), 1 + 9 + 9);
        assert_eq!(buf[9], 0xff);
        assert_eq!(buf[18], 0xf7);
    }

    #[test]
    fn small_varints_use_one_byte() {
        let payload = encode_row(&[Cell::I64(5), Cell::I64(-1)]).unwrap();
        assert_eq!(payload, vec![VARINT_FLAG, 0x0a, VARINT_FLAG, 0x01]);
    }

    #[test]
    fn int_keys_preserve_order() {
        let mut low = Vec::new();
        let mut high = Vec::new();
        encode_key(&mut low, &Cell::I64(-5)).unwrap();
        encode_key(&mut high, &Cell::I64(3)).unwrap();

        assert!(low < high);
    }

    #[test]
    fn oversized_duration_is_rejected() {
        let mut buf = Vec::new();
        let result = encode_value(&mut buf, &Cell::Duration(TimeDelta::days(365_000)));

        assert!(matches!(result, Err(CodecError::DurationOutOfRange(_))));
        assert!(buf.is_empty());
    }
}

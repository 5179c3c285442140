//! Self-describing binary row codec.
//!
//! A payload is a plain concatenation of values. Every value starts with a one-byte flag that
//! determines how many bytes follow, so a payload can be decoded strictly left to right without
//! any schema knowledge:
//!
//! | flag   | kind          | body                                                     |
//! |--------|---------------|----------------------------------------------------------|
//! | `0x00` | null          | none                                                     |
//! | `0x01` | bytes         | memcomparable groups of 8 bytes plus one marker byte     |
//! | `0x02` | compact bytes | signed varint length, raw bytes                          |
//! | `0x03` | int           | 8 bytes big endian with the sign bit flipped             |
//! | `0x04` | uint          | 8 bytes big endian                                       |
//! | `0x05` | float         | 8 bytes big endian, order preserving IEEE-754            |
//! | `0x06` | decimal       | signed varint length, decimal literal text               |
//! | `0x07` | duration      | nanoseconds, encoded like `int`                          |
//! | `0x08` | varint        | zig-zag LEB128                                           |
//! | `0x09` | uvarint       | LEB128                                                   |

mod decode;
mod encode;

pub use decode::{decode_n, decode_one};
pub use encode::{encode_key, encode_row, encode_value};

use thiserror::Error;

pub(crate) const NIL_FLAG: u8 = 0x00;
pub(crate) const BYTES_FLAG: u8 = 0x01;
pub(crate) const COMPACT_BYTES_FLAG: u8 = 0x02;
pub(crate) const INT_FLAG: u8 = 0x03;
pub(crate) const UINT_FLAG: u8 = 0x04;
pub(crate) const FLOAT_FLAG: u8 = 0x05;
pub(crate) const DECIMAL_FLAG: u8 = 0x06;
pub(crate) const DURATION_FLAG: u8 = 0x07;
pub(crate) const VARINT_FLAG: u8 = 0x08;
pub(crate) const UVARINT_FLAG: u8 = 0x09;

/// Flips the sign bit so that signed integers and floats sort as unsigned bytes.
pub(crate) const SIGN_MASK: u64 = 0x8000_0000_0000_0000;

/// Size of one memcomparable bytes group, excluding its marker.
pub(crate) const BYTES_GROUP_SIZE: usize = 8;

/// Marker of a full memcomparable bytes group.
pub(crate) const BYTES_GROUP_MARKER: u8 = 0xff;

/// Maximum number of bytes of a 64-bit LEB128 varint.
pub(crate) const MAX_VARINT_LEN: usize = 10;

/// Errors raised while decoding or encoding a row payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The payload ended in the middle of a value.
    #[error("unexpected end of payload while reading {0}")]
    Truncated(&'static str),

    /// A value started with an unknown flag byte.
    #[error("invalid value flag {0:#04x}")]
    InvalidFlag(u8),

    /// A memcomparable bytes group carried an invalid marker or non-zero padding.
    #[error("invalid memcomparable bytes group marker {0:#04x}")]
    InvalidBytesMarker(u8),

    /// A varint did not terminate within 64 bits.
    #[error("varint overflows 64 bits")]
    VarintOverflow,

    /// A length prefix was negative.
    #[error("invalid negative length {0}")]
    NegativeLength(i64),

    /// A decimal value did not contain a valid decimal literal.
    #[error("invalid decimal literal {0:?}")]
    InvalidDecimal(String),

    /// A duration could not be represented in nanoseconds.
    #[error("duration {0} does not fit in 64 bits of nanoseconds")]
    DurationOutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use bigdecimal::BigDecimal;
    use chrono::TimeDelta;
    use std::str::FromStr;

    fn round_trip(cell: Cell) {
        let mut buf = Vec::new();
        encode_value(&mut buf, &cell).unwrap();

        let (remaining, decoded) = decode_one(&buf).unwrap();
        assert!(remaining.is_empty(), "trailing bytes for {cell:?}");
        assert_eq!(decoded, cell);
    }

    #[test]
    fn scalars_survive_encode_then_decode() {
        round_trip(Cell::Null);
        round_trip(Cell::I64(0));
        round_trip(Cell::I64(i64::MIN));
        round_trip(Cell::I64(i64::MAX));
        round_trip(Cell::U64(u64::MAX));
        round_trip(Cell::F64(-1.5));
        round_trip(Cell::F64(f64::INFINITY));
        round_trip(Cell::from(""));
        round_trip(Cell::from("ann"));
        round_trip(Cell::Bytes(vec![0u8; 16]));
        round_trip(Cell::Numeric(BigDecimal::from_str("-1234.5600").unwrap()));
        round_trip(Cell::Duration(TimeDelta::seconds(-90)));
    }

    #[test]
    fn decode_n_stops_at_count() {
        let payload = encode_row(&[Cell::I64(1), Cell::I64(2), Cell::I64(3)]).unwrap();

        let (values, remaining) = decode_n(&payload, 2).unwrap();
        assert_eq!(values, vec![Cell::I64(1), Cell::I64(2)]);

        let (rest, _) = decode_n(remaining, 10).unwrap();
        assert_eq!(rest, vec![Cell::I64(3)]);
    }

    #[test]
    fn decode_n_stops_when_input_is_exhausted() {
        let payload = encode_row(&[Cell::Null, Cell::from("x")]).unwrap();

        let (values, remaining) = decode_n(&payload, 100).unwrap();
        assert_eq!(values, vec![Cell::Null, Cell::from("x")]);
        assert!(remaining.is_empty());
    }
}

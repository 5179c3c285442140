use bigdecimal::BigDecimal;
use byteorder::{BigEndian, ByteOrder};
use chrono::TimeDelta;
use std::str::FromStr;

use crate::codec::{
    BYTES_FLAG, BYTES_GROUP_MARKER, BYTES_GROUP_SIZE, COMPACT_BYTES_FLAG, CodecError, DECIMAL_FLAG,
    DURATION_FLAG, FLOAT_FLAG, INT_FLAG, MAX_VARINT_LEN, NIL_FLAG, SIGN_MASK, UINT_FLAG,
    UVARINT_FLAG, VARINT_FLAG,
};
use crate::types::Cell;

/// Decodes the leading value of `data`.
///
/// Returns the bytes following the value together with the decoded [`Cell`].
pub fn decode_one(data: &[u8]) -> Result<(&[u8], Cell), CodecError> {
    let (&flag, data) = data
        .split_first()
        .ok_or(CodecError::Truncated("value flag"))?;

    match flag {
        NIL_FLAG => Ok((data, Cell::Null)),
        BYTES_FLAG => {
            let (data, bytes) = decode_memcomparable_bytes(data)?;
            Ok((data, Cell::Bytes(bytes)))
        }
        COMPACT_BYTES_FLAG => {
            let (data, bytes) = decode_compact_bytes(data)?;
            Ok((data, Cell::Bytes(bytes.to_vec())))
        }
        INT_FLAG => {
            let (data, value) = decode_comparable_int(data, "int")?;
            Ok((data, Cell::I64(value)))
        }
        UINT_FLAG => {
            let (data, value) = read_u64(data, "uint")?;
            Ok((data, Cell::U64(value)))
        }
        FLOAT_FLAG => {
            let (data, value) = read_u64(data, "float")?;
            Ok((data, Cell::F64(decode_comparable_float(value))))
        }
        DECIMAL_FLAG => {
            let (data, text) = decode_compact_bytes(data)?;
            let text = std::str::from_utf8(text)
                .map_err(|_| CodecError::InvalidDecimal(String::from_utf8_lossy(text).into()))?;
            let value = BigDecimal::from_str(text)
                .map_err(|_| CodecError::InvalidDecimal(text.to_string()))?;
            Ok((data, Cell::Numeric(value)))
        }
        DURATION_FLAG => {
            let (data, nanos) = decode_comparable_int(data, "duration")?;
            Ok((data, Cell::Duration(TimeDelta::nanoseconds(nanos))))
        }
        VARINT_FLAG => {
            let (data, value) = decode_varint(data)?;
            Ok((data, Cell::I64(value)))
        }
        UVARINT_FLAG => {
            let (data, value) = decode_uvarint(data)?;
            Ok((data, Cell::U64(value)))
        }
        other => Err(CodecError::InvalidFlag(other)),
    }
}

/// Decodes values from `data` until `count` values were produced or the input is exhausted.
///
/// Returns the decoded values and the bytes that were not consumed.
pub fn decode_n(mut data: &[u8], count: usize) -> Result<(Vec<Cell>, &[u8]), CodecError> {
    let mut values = Vec::with_capacity(count.min(data.len()));

    while !data.is_empty() && values.len() < count {
        let (remaining, value) = decode_one(data)?;
        values.push(value);
        data = remaining;
    }

    Ok((values, data))
}

fn read_u64<'a>(data: &'a [u8], what: &'static str) -> Result<(&'a [u8], u64), CodecError> {
    if data.len() < 8 {
        return Err(CodecError::Truncated(what));
    }

    Ok((&data[8..], BigEndian::read_u64(&data[..8])))
}

fn decode_comparable_int<'a>(
    data: &'a [u8],
    what: &'static str,
) -> Result<(&'a [u8], i64), CodecError> {
    let (data, value) = read_u64(data, what)?;
    Ok((data, (value ^ SIGN_MASK) as i64))
}

fn decode_comparable_float(mut value: u64) -> f64 {
    if value & SIGN_MASK > 0 {
        value &= !SIGN_MASK;
    } else {
        value = !value;
    }

    f64::from_bits(value)
}

fn decode_uvarint(data: &[u8]) -> Result<(&[u8], u64), CodecError> {
    let mut value: u64 = 0;
    let mut shift = 0;

    for (i, &byte) in data.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(CodecError::VarintOverflow);
        }

        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(CodecError::VarintOverflow);
            }

            return Ok((&data[i + 1..], value | (u64::from(byte) << shift)));
        }

        value |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }

    Err(CodecError::Truncated("varint"))
}

fn decode_varint(data: &[u8]) -> Result<(&[u8], i64), CodecError> {
    let (data, zigzag) = decode_uvarint(data)?;

    let mut value = (zigzag >> 1) as i64;
    if zigzag & 1 != 0 {
        value = !value;
    }

    Ok((data, value))
}

fn decode_compact_bytes(data: &[u8]) -> Result<(&[u8], &[u8]), CodecError> {
    let (data, len) = decode_varint(data)?;
    let len = usize::try_from(len).map_err(|_| CodecError::NegativeLength(len))?;

    if data.len() < len {
        return Err(CodecError::Truncated("compact bytes"));
    }

    Ok((&data[len..], &data[..len]))
}

fn decode_memcomparable_bytes(mut data: &[u8]) -> Result<(&[u8], Vec<u8>), CodecError> {
    let mut bytes = Vec::with_capacity(data.len());

    loop {
        if data.len() < BYTES_GROUP_SIZE + 1 {
            return Err(CodecError::Truncated("bytes group"));
        }

        let group = &data[..BYTES_GROUP_SIZE];
        let marker = data[BYTES_GROUP_SIZE];
        data = &data[BYTES_GROUP_SIZE + 1..];

        let pad_count = usize::from(BYTES_GROUP_MARKER - marker);
        if pad_count > BYTES_GROUP_SIZE {
            return Err(CodecError::InvalidBytesMarker(marker));
        }

        let real_size = BYTES_GROUP_SIZE - pad_count;
        bytes.extend_from_slice(&group[..real_size]);

        if pad_count != 0 {
            // Padding must be all zeroes, anything else means the group was not produced by
            // the encoder.
            if group[real_size..].iter().any(|&byte| byte != 0) {
                return Err(CodecError::InvalidBytesMarker(marker));
            }

            return Ok((data, bytes));
        }
    }
}

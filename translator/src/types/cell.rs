use bigdecimal::BigDecimal;
use chrono::TimeDelta;
use std::fmt;

/// A single decoded scalar value.
///
/// [`Cell`] is produced fresh by every decode call and is bound as a positional statement
/// parameter, so every variant must carry enough information to be rendered safely by the
/// executing driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    I64(i64),
    U64(u64),
    F64(f64),
    Bytes(Vec<u8>),
    Numeric(BigDecimal),
    Duration(TimeDelta),
}

impl Cell {
    /// Returns whether this cell is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Interprets this cell as a column identifier.
    ///
    /// Column identifiers are always encoded with one of the integer flags, so any other variant,
    /// or an unsigned value beyond `i64::MAX`, returns [`None`].
    pub fn as_column_id(&self) -> Option<i64> {
        match self {
            Cell::I64(value) => Some(*value),
            Cell::U64(value) => i64::try_from(*value).ok(),
            Cell::Null
            | Cell::F64(_)
            | Cell::Bytes(_)
            | Cell::Numeric(_)
            | Cell::Duration(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::I64(value) => write!(f, "{value}"),
            Cell::U64(value) => write!(f, "{value}"),
            Cell::F64(value) => write!(f, "{value}"),
            Cell::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => write!(f, "'{}'", text.replace('\'', "''")),
                Err(_) => {
                    f.write_str("x'")?;
                    for byte in bytes {
                        write!(f, "{byte:02x}")?;
                    }
                    f.write_str("'")
                }
            },
            Cell::Numeric(value) => write!(f, "{value}"),
            Cell::Duration(value) => write_duration(*value, f),
        }
    }
}

/// Writes a duration in the `[-]HH:MM:SS[.ffffff]` form accepted by MySQL `TIME` columns.
fn write_duration(value: TimeDelta, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if value < TimeDelta::zero() { "-" } else { "" };
    let value = value.abs();

    let total_seconds = value.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let micros = value.subsec_nanos() / 1_000;

    write!(f, "'{sign}{hours:02}:{minutes:02}:{seconds:02}")?;
    if micros != 0 {
        write!(f, ".{micros:06}")?;
    }
    f.write_str("'")
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::I64(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::U64(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::F64(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Bytes(value.as_bytes().to_vec())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Bytes(value.into_bytes())
    }
}

impl From<Vec<u8>> for Cell {
    fn from(value: Vec<u8>) -> Self {
        Cell::Bytes(value)
    }
}

impl From<BigDecimal> for Cell {
    fn from(value: BigDecimal) -> Self {
        Cell::Numeric(value)
    }
}

impl From<TimeDelta> for Cell {
    fn from(value: TimeDelta) -> Self {
        Cell::Duration(value)
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

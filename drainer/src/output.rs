use serde::Serialize;
use serde_json::{Number, Value};
use translator::types::{Cell, Mutation};

use crate::hex::to_hex;

/// A translated statement as written to the output, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    pub sql: String,
    pub params: Vec<Value>,
}

impl From<Mutation> for StatementLine {
    fn from(mutation: Mutation) -> Self {
        let (sql, params) = mutation.into_parts();

        Self {
            sql,
            params: params.iter().map(cell_to_json).collect(),
        }
    }
}

/// Converts a bound parameter to JSON.
///
/// Byte strings that are not valid UTF-8 are rendered as `0x` prefixed hex, decimals as strings
/// to keep their precision.
fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::I64(value) => Value::from(*value),
        Cell::U64(value) => Value::from(*value),
        // Non finite floats have no JSON number form.
        Cell::F64(value) => Number::from_f64(*value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        Cell::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::String(text.to_string()),
            Err(_) => Value::String(to_hex(bytes)),
        },
        Cell::Numeric(value) => Value::String(value.to_string()),
        Cell::Duration(_) => Value::String(cell.to_string().trim_matches('\'').to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn mutation_becomes_statement_line() {
        let mutation = Mutation::new(
            "delete from s.t where id = ? and age is ? limit 1;",
            vec![Cell::I64(5), Cell::Null],
        );

        let line = StatementLine::from(mutation);
        assert_eq!(
            serde_json::to_string(&line).unwrap(),
            r#"{"sql":"delete from s.t where id = ? and age is ? limit 1;","params":[5,null]}"#
        );
    }

    #[test]
    fn cells_keep_their_precision() {
        assert_eq!(cell_to_json(&Cell::U64(u64::MAX)), Value::from(u64::MAX));
        assert_eq!(cell_to_json(&Cell::F64(1.5)), Value::from(1.5));
        assert_eq!(
            cell_to_json(&Cell::F64(f64::NAN)),
            Value::String("NaN".to_string())
        );
        assert_eq!(
            cell_to_json(&Cell::Numeric("12.50".parse().unwrap())),
            Value::String("12.50".to_string())
        );
    }

    #[test]
    fn bytes_fall_back_to_hex() {
        assert_eq!(cell_to_json(&Cell::from("ann")), Value::from("ann"));
        assert_eq!(
            cell_to_json(&Cell::Bytes(vec![0xff, 0x00])),
            Value::from("0xff00")
        );
    }

    #[test]
    fn durations_use_time_literal_form() {
        let duration = TimeDelta::seconds(3_723) + TimeDelta::microseconds(5);

        assert_eq!(
            cell_to_json(&Cell::Duration(-duration)),
            Value::from("-01:02:03.000005")
        );
    }
}

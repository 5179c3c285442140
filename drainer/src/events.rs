//! Change events as captured in the events file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use serde::Deserialize;
use serde_json::Value;
use translator::event::{ChangeEvent, EventKind, Operation};
use translator::translator::DeleteMode;
use translator::types::{Cell, ColumnMetadata, IndexMetadata, TableMetadata};

use crate::hex::parse_hex_payload;

/// A change event, with table metadata inlined and row payloads as hex strings.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub schema: String,
    pub table: TableRecord,
    pub operation: String,
    #[serde(default)]
    pub delete_mode: Option<String>,
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub row_ids: Vec<i64>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableRecord {
    pub name: String,
    #[serde(default)]
    pub pk_is_handle: bool,
    pub columns: Vec<ColumnRecord>,
    #[serde(default)]
    pub indices: Vec<IndexRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub primary_key: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexRecord {
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    pub columns: Vec<String>,
}

impl EventRecord {
    /// Converts the record into a [`ChangeEvent`].
    ///
    /// A delete without `delete_mode` is a delete by row handle driven by `row_ids`.
    pub fn into_change_event(self) -> anyhow::Result<ChangeEvent> {
        let operation: Operation = self.operation.parse()?;
        let table = self.table.into_table_metadata()?;

        let kind = match operation {
            Operation::Insert => EventKind::Insert {
                rows: parse_rows(&self.rows)?,
            },
            Operation::Update => EventKind::Update {
                rows: parse_rows(&self.rows)?,
            },
            Operation::Delete => match self.delete_mode {
                Some(mode) => EventKind::Delete {
                    mode: mode.parse::<DeleteMode>()?,
                    rows: parse_rows(&self.rows)?,
                },
                None => EventKind::DeleteByRowId {
                    row_ids: self.row_ids,
                },
            },
            Operation::Ddl => match self.query {
                Some(query) => EventKind::Ddl { query },
                None => bail!("ddl event on {}.{} has no `query`", self.schema, table.name),
            },
        };

        Ok(ChangeEvent {
            schema: self.schema,
            table: Arc::new(table),
            kind,
        })
    }
}

impl TableRecord {
    fn into_table_metadata(self) -> anyhow::Result<TableMetadata> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let default_value = json_to_cell(&column.default).with_context(|| {
                format!("invalid default of column {}.{}", self.name, column.name)
            })?;

            let mut metadata =
                ColumnMetadata::new(column.id, column.name).with_default(default_value);
            if column.primary_key {
                metadata = metadata.with_primary_key();
            }
            columns.push(metadata);
        }

        let mut table = TableMetadata::new(self.name, columns);
        table.pk_is_handle = self.pk_is_handle;
        table.indices = self
            .indices
            .into_iter()
            .map(|index| IndexMetadata {
                name: index.name,
                primary: index.primary,
                columns: index.columns,
            })
            .collect();

        Ok(table)
    }
}

/// Converts a JSON scalar to a [`Cell`].
fn json_to_cell(value: &Value) -> anyhow::Result<Cell> {
    let cell = match value {
        Value::Null => Cell::Null,
        Value::Bool(value) => Cell::I64(i64::from(*value)),
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Cell::I64(value)
            } else if let Some(value) = number.as_u64() {
                Cell::U64(value)
            } else if let Some(value) = number.as_f64() {
                Cell::F64(value)
            } else {
                bail!("number {number} cannot be represented");
            }
        }
        Value::String(value) => Cell::from(value.as_str()),
        Value::Array(_) | Value::Object(_) => bail!("{value} is not a scalar"),
    };

    Ok(cell)
}

fn parse_rows(rows: &[String]) -> anyhow::Result<Vec<Vec<u8>>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| parse_hex_payload(row).with_context(|| format!("invalid row {index}")))
        .collect()
}

/// Reads every event of the JSON file at `path`.
pub fn read_events(path: &Path) -> anyhow::Result<Vec<ChangeEvent>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read events file `{}`", path.display()))?;

    parse_events(&content).with_context(|| format!("invalid events file `{}`", path.display()))
}

/// Parses a JSON array of events.
pub fn parse_events(content: &str) -> anyhow::Result<Vec<ChangeEvent>> {
    let records: Vec<EventRecord> = serde_json::from_str(content)?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .into_change_event()
                .with_context(|| format!("invalid event {index}"))
        })
        .collect()
}

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ErrorKind, TranslateError, TranslateResult};
use crate::registry::TranslatorRegistry;
use crate::translate_error;
use crate::translator::{DeleteMode, RowResults};
use crate::types::{Mutation, TableMetadata};

/// Kind of change carried by a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Delete,
    Ddl,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Ddl => "ddl",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Operation::Insert),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            "ddl" => Ok(Operation::Ddl),
            other => Err(translate_error!(
                ErrorKind::UnsupportedOperation,
                "Unknown operation",
                format!("Operation `{other}` is not one of `insert`, `update`, `delete` or `ddl`")
            )),
        }
    }
}

/// Payload of a [`ChangeEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Row payloads of inserted rows.
    Insert { rows: Vec<Vec<u8>> },
    /// Row payloads of updated rows.
    Update { rows: Vec<Vec<u8>> },
    /// Row payloads of deleted rows, located as described by `mode`.
    Delete {
        mode: DeleteMode,
        rows: Vec<Vec<u8>>,
    },
    /// Row handles of deleted rows.
    DeleteByRowId { row_ids: Vec<i64> },
    /// A schema change statement.
    Ddl { query: String },
}

impl EventKind {
    /// Returns the [`Operation`] of this event.
    pub fn operation(&self) -> Operation {
        match self {
            EventKind::Insert { .. } => Operation::Insert,
            EventKind::Update { .. } => Operation::Update,
            EventKind::Delete { .. } | EventKind::DeleteByRowId { .. } => Operation::Delete,
            EventKind::Ddl { .. } => Operation::Ddl,
        }
    }

    /// Returns the number of rows carried by this event, zero for schema changes.
    pub fn row_count(&self) -> usize {
        match self {
            EventKind::Insert { rows }
            | EventKind::Update { rows }
            | EventKind::Delete { rows, .. } => rows.len(),
            EventKind::DeleteByRowId { row_ids } => row_ids.len(),
            EventKind::Ddl { .. } => 0,
        }
    }
}

/// A captured change of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Schema the table belongs to.
    pub schema: String,
    /// Metadata of the changed table as of the change.
    pub table: Arc<TableMetadata>,
    /// What changed.
    pub kind: EventKind,
}

/// Translates `event` with the translator registered for `dialect`.
///
/// Schema changes produce a single statement without parameters.
pub fn translate_event(
    registry: &TranslatorRegistry,
    dialect: &str,
    event: &ChangeEvent,
) -> TranslateResult<RowResults> {
    let translator = registry.lookup(dialect)?;
    let schema = event.schema.as_str();
    let table = event.table.as_ref();

    debug!(
        dialect,
        schema,
        table = %table,
        operation = %event.kind.operation(),
        rows = event.kind.row_count(),
        "translating change event"
    );

    match &event.kind {
        EventKind::Insert { rows } => translator.gen_insert_sqls(schema, table, rows),
        EventKind::Update { rows } => translator.gen_update_sqls(schema, table, rows),
        EventKind::Delete { mode, rows } => translator.gen_delete_sqls(schema, table, *mode, rows),
        EventKind::DeleteByRowId { row_ids } => {
            translator.gen_delete_sqls_by_id(schema, table, row_ids)
        }
        EventKind::Ddl { query } => {
            let ddl = translator.gen_ddl_sql(schema, query)?;
            Ok(vec![Ok(Mutation::new(ddl, vec![]))])
        }
    }
}

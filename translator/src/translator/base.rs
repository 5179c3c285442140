use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorKind, TranslateError, TranslateResult};
use crate::translate_error;
use crate::types::{Mutation, TableMetadata};

/// Outcome of every row of a batch, in row order.
///
/// A row that cannot be translated only fails its own entry, so callers decide whether one
/// corrupt row stops the batch.
pub type RowResults = Vec<TranslateResult<Mutation>>;

/// How the rows of a delete are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeleteMode {
    /// Each payload holds one value per identity column.
    ByIdentity,
    /// Each payload holds `(column id, value)` pairs of the deleted row.
    ByColumns,
}

impl DeleteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteMode::ByIdentity => "by_identity",
            DeleteMode::ByColumns => "by_columns",
        }
    }
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteMode {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_identity" | "by_pk" => Ok(DeleteMode::ByIdentity),
            "by_columns" | "by_col" => Ok(DeleteMode::ByColumns),
            other => Err(translate_error!(
                ErrorKind::UnsupportedOperation,
                "Unknown delete mode",
                format!("Delete mode `{other}` is not one of `by_identity` or `by_columns`")
            )),
        }
    }
}

/// A SQL dialect that change events can be translated into.
///
/// Batch methods return an outer error only for conditions shared by every row of the batch,
/// such as a table without identity columns. Everything that depends on a single payload is
/// reported in that row's entry of the returned [`RowResults`].
pub trait Translator: fmt::Debug + Send + Sync {
    /// Returns the name under which the translator is registered.
    fn dialect(&self) -> &'static str;

    /// Generates one insert statement per row payload.
    fn gen_insert_sqls(
        &self,
        schema: &str,
        table: &TableMetadata,
        rows: &[Vec<u8>],
    ) -> TranslateResult<RowResults>;

    /// Generates one update statement per row payload.
    fn gen_update_sqls(
        &self,
        schema: &str,
        table: &TableMetadata,
        rows: &[Vec<u8>],
    ) -> TranslateResult<RowResults>;

    /// Generates one delete statement per row handle.
    fn gen_delete_sqls_by_id(
        &self,
        schema: &str,
        table: &TableMetadata,
        row_ids: &[i64],
    ) -> TranslateResult<RowResults>;

    /// Generates one delete statement per row payload.
    fn gen_delete_sqls(
        &self,
        schema: &str,
        table: &TableMetadata,
        mode: DeleteMode,
        rows: &[Vec<u8>],
    ) -> TranslateResult<RowResults>;

    /// Renders a schema change statement so that it runs against `schema`.
    fn gen_ddl_sql(&self, schema: &str, query: &str) -> TranslateResult<String>;
}

/// Collects the statements of a batch, failing with every row error if any row failed.
pub fn collect_mutations(results: RowResults) -> TranslateResult<Vec<Mutation>> {
    let mut mutations = Vec::with_capacity(results.len());
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(mutation) => mutations.push(mutation),
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        return Err(TranslateError::from(errors));
    }

    Ok(mutations)
}

//! Rendering of the statement fragments shared by the SQL dialects.

use crate::types::{Cell, ColumnMetadata};

/// Qualifies `table` with `schema`, as in `schema.table`.
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{schema}.{table}")
}

/// Joins column names with `,` and no spaces, as in `id,name,age`.
pub fn column_list<'a, I>(columns: I) -> String
where
    I: IntoIterator<Item = &'a ColumnMetadata>,
{
    columns
        .into_iter()
        .map(|column| column.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders `count` positional placeholders, as in `?,?,?`.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Renders a `SET` list binding every column to a placeholder, as in `name = ?, age = ?`.
pub fn assignments(columns: &[&ColumnMetadata]) -> String {
    columns
        .iter()
        .map(|column| format!("{} = ?", column.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders a `WHERE` conjunction comparing every column to a placeholder.
///
/// `values` are the values the placeholders will be bound to, in the same order as `columns`;
/// they select the comparator of each column.
pub fn predicate(columns: &[&ColumnMetadata], values: &[Cell]) -> String {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| format!("{} {} ?", column.name, comparator(value)))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Returns the comparator matching `value`.
///
/// `NULL` never compares equal with `=`, so null values use `is`.
pub fn comparator(value: &Cell) -> &'static str {
    if value.is_null() { "is" } else { "=" }
}

use std::fmt;

use crate::types::Cell;

/// Numeric identifier of a column, as referenced by encoded row payloads.
pub type ColumnId = i64;

/// Metadata of a single column of a replicated table.
///
/// Column metadata is supplied by the schema registry and is never mutated by translation.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// The numeric column id used by encoded payloads.
    pub id: ColumnId,
    /// The name of the column in the target database.
    pub name: String,
    /// The value used when an insert payload omits the column.
    pub default_value: Cell,
    /// Whether the column carries the primary key flag.
    pub primary_key: bool,
}

impl ColumnMetadata {
    /// Creates a new [`ColumnMetadata`] with a `NULL` default and no primary key flag.
    pub fn new(id: ColumnId, name: impl Into<String>) -> ColumnMetadata {
        Self {
            id,
            name: name.into(),
            default_value: Cell::Null,
            primary_key: false,
        }
    }

    /// Sets the declared default value of this column.
    pub fn with_default(mut self, default_value: impl Into<Cell>) -> ColumnMetadata {
        self.default_value = default_value.into();
        self
    }

    /// Marks this column as part of the primary key.
    pub fn with_primary_key(mut self) -> ColumnMetadata {
        self.primary_key = true;
        self
    }
}

/// Metadata of an index declared on a replicated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMetadata {
    /// The name of the index.
    pub name: String,
    /// Whether this index is the table's primary key.
    pub primary: bool,
    /// The member column names in declared index order.
    pub columns: Vec<String>,
}

impl IndexMetadata {
    /// Creates a new non-primary [`IndexMetadata`].
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> IndexMetadata
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            primary: false,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a new [`IndexMetadata`] flagged as the primary key.
    pub fn primary<I, S>(columns: I) -> IndexMetadata
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: "PRIMARY".to_string(),
            primary: true,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Metadata of a replicated table.
///
/// The column order of [`TableMetadata::columns`] is the canonical order of every generated
/// statement; decoded payloads never dictate output order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    /// The name of the table within its schema.
    pub name: String,
    /// The columns of the table in declared order.
    pub columns: Vec<ColumnMetadata>,
    /// Whether the primary key is stored as the implicit integer row handle.
    pub pk_is_handle: bool,
    /// The indices declared on the table.
    pub indices: Vec<IndexMetadata>,
}

impl TableMetadata {
    /// Creates a new [`TableMetadata`] without indices and without a row-handle primary key.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMetadata>) -> TableMetadata {
        Self {
            name: name.into(),
            columns,
            pk_is_handle: false,
            indices: Vec::new(),
        }
    }

    /// Marks the table primary key as stored in the integer row handle.
    pub fn with_pk_handle(mut self) -> TableMetadata {
        self.pk_is_handle = true;
        self
    }

    /// Adds an index to this table.
    pub fn with_index(mut self, index: IndexMetadata) -> TableMetadata {
        self.indices.push(index);
        self
    }

    /// Returns the column with the given id.
    pub fn column_by_id(&self, id: ColumnId) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// Returns whether the column is the integer row-handle primary key.
    pub fn is_handle_column(&self, column: &ColumnMetadata) -> bool {
        self.pk_is_handle && column.primary_key
    }

    /// Returns the primary index, if declared.
    pub fn primary_index(&self) -> Option<&IndexMetadata> {
        self.indices.iter().find(|index| index.primary)
    }
}

impl fmt::Display for TableMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

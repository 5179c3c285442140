use crate::types::{ColumnMetadata, IndexMetadata, TableMetadata};

/// Table `t(id int primary key, name varchar, age int default 0)` whose primary key is the
/// integer row handle.
pub fn people_table() -> TableMetadata {
    TableMetadata::new(
        "t",
        vec![
            ColumnMetadata::new(1, "id").with_primary_key(),
            ColumnMetadata::new(2, "name"),
            ColumnMetadata::new(3, "age").with_default(0i64),
        ],
    )
    .with_pk_handle()
}

/// Table `orders(order_id, line, note default 'n/a')` with a composite primary index declared
/// as `(LINE, Order_Id)`.
pub fn composite_key_table() -> TableMetadata {
    TableMetadata::new(
        "orders",
        vec![
            ColumnMetadata::new(1, "order_id").with_primary_key(),
            ColumnMetadata::new(2, "line").with_primary_key(),
            ColumnMetadata::new(3, "note").with_default("n/a"),
        ],
    )
    .with_index(IndexMetadata::new("idx_note", ["note"]))
    .with_index(IndexMetadata::primary(["LINE", "Order_Id"]))
}

/// Table `events(kind, body)` without any primary key construct.
pub fn keyless_table() -> TableMetadata {
    TableMetadata::new(
        "events",
        vec![
            ColumnMetadata::new(1, "kind"),
            ColumnMetadata::new(2, "body"),
        ],
    )
}

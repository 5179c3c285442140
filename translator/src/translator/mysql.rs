use sqlparser::ast::Statement;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::assemble::{
    RowSnapshot, assemble_delete_by_columns, assemble_delete_by_identity, assemble_delete_by_row_id,
    assemble_insert, assemble_update,
};
use crate::bail;
use crate::error::{ErrorKind, TranslateResult};
use crate::identity::{require_handle_column, require_identity_columns, resolve_identity_columns};
use crate::sql::{assignments, column_list, placeholders, predicate, qualified_name};
use crate::translator::{DeleteMode, RowResults, Translator};
use crate::types::{Mutation, TableMetadata};

/// Translates change events into statements for MySQL compatible databases.
///
/// Inserts are rendered as `replace into` so that replaying an event twice converges, and every
/// update and delete is capped with `limit 1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlTranslator;

impl MysqlTranslator {
    /// Name under which the translator is registered.
    pub const DIALECT: &'static str = "mysql";

    fn delete_mutation(
        schema: &str,
        table: &TableMetadata,
        snapshot: RowSnapshot<'_>,
    ) -> Mutation {
        let sql = format!(
            "delete from {} where {} limit 1;",
            qualified_name(schema, &table.name),
            predicate(&snapshot.columns, &snapshot.values)
        );

        Mutation::new(sql, snapshot.values)
    }
}

impl Translator for MysqlTranslator {
    fn dialect(&self) -> &'static str {
        Self::DIALECT
    }

    fn gen_insert_sqls(
        &self,
        schema: &str,
        table: &TableMetadata,
        rows: &[Vec<u8>],
    ) -> TranslateResult<RowResults> {
        // Every row of the batch binds the same full-width column list.
        let sql = format!(
            "replace into {} ({}) values ({});",
            qualified_name(schema, &table.name),
            column_list(&table.columns),
            placeholders(table.columns.len())
        );

        let results = rows
            .iter()
            .map(|row| {
                assemble_insert(schema, table, row).map(|values| Mutation::new(sql.clone(), values))
            })
            .collect();

        debug!(schema, table = %table, rows = rows.len(), "generated insert statements");

        Ok(results)
    }

    fn gen_update_sqls(
        &self,
        schema: &str,
        table: &TableMetadata,
        rows: &[Vec<u8>],
    ) -> TranslateResult<RowResults> {
        let identity = resolve_identity_columns(schema, table)?;
        let qualified_name = qualified_name(schema, &table.name);

        let results = rows
            .iter()
            .map(|row| -> TranslateResult<Mutation> {
                let update = assemble_update(schema, table, identity.as_deref(), row)?;

                let sql = format!(
                    "update {qualified_name} set {} where {} limit 1;",
                    assignments(&update.assignments.columns),
                    predicate(&update.predicate.columns, &update.predicate.values)
                );

                let mut params = update.assignments.values;
                params.extend(update.predicate.values);

                Ok(Mutation::new(sql, params))
            })
            .collect();

        debug!(schema, table = %table, rows = rows.len(), "generated update statements");

        Ok(results)
    }

    fn gen_delete_sqls_by_id(
        &self,
        schema: &str,
        table: &TableMetadata,
        row_ids: &[i64],
    ) -> TranslateResult<RowResults> {
        let handle = require_handle_column(schema, table)?;

        let results = row_ids
            .iter()
            .map(|&row_id| {
                let snapshot = assemble_delete_by_row_id(handle, row_id);
                Ok(Self::delete_mutation(schema, table, snapshot))
            })
            .collect();

        debug!(
            schema,
            table = %table,
            rows = row_ids.len(),
            "generated delete statements by row id"
        );

        Ok(results)
    }

    fn gen_delete_sqls(
        &self,
        schema: &str,
        table: &TableMetadata,
        mode: DeleteMode,
        rows: &[Vec<u8>],
    ) -> TranslateResult<RowResults> {
        let results = match mode {
            DeleteMode::ByIdentity => {
                // Checked once for the batch, before any payload is decoded.
                let identity = require_identity_columns(schema, table)?;

                rows.iter()
                    .map(|row| -> TranslateResult<Mutation> {
                        let snapshot = assemble_delete_by_identity(schema, table, &identity, row)?;
                        Ok(Self::delete_mutation(schema, table, snapshot))
                    })
                    .collect()
            }
            DeleteMode::ByColumns => rows
                .iter()
                .map(|row| -> TranslateResult<Mutation> {
                    let snapshot = assemble_delete_by_columns(schema, table, row)?;
                    Ok(Self::delete_mutation(schema, table, snapshot))
                })
                .collect(),
        };

        debug!(
            schema,
            table = %table,
            %mode,
            rows = rows.len(),
            "generated delete statements"
        );

        Ok(results)
    }

    fn gen_ddl_sql(&self, schema: &str, query: &str) -> TranslateResult<String> {
        let query = query.trim().trim_end_matches(';').trim_end();
        let statements = Parser::parse_sql(&MySqlDialect {}, query)?;

        let statement = match statements.as_slice() {
            [statement] => statement,
            [] => bail!(
                ErrorKind::UnsupportedOperation,
                "Schema change holds no statement",
                format!("Query `{query}` on schema {schema} is empty")
            ),
            _ => bail!(
                ErrorKind::UnsupportedOperation,
                "Schema change holds several statements",
                format!(
                    "Query `{query}` on schema {schema} holds {} statements",
                    statements.len()
                )
            ),
        };

        // Creating a database must not be prefixed with a `use` of the database being created.
        let ddl = match statement {
            Statement::CreateDatabase { .. } | Statement::CreateSchema { .. } => {
                format!("{query};")
            }
            _ => format!("use {schema}; {query};"),
        };

        debug!(schema, ddl = %ddl, "generated schema change statement");

        Ok(ddl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::payload::{
        handle_payload, pairs_payload, snapshot_update_payload, values_payload,
    };
    use crate::test_utils::table::{composite_key_table, keyless_table, people_table};
    use crate::translator::collect_mutations;
    use crate::types::Cell;

    #[test]
    fn insert_reuses_statement_for_every_row() {
        let table = people_table();
        let rows = vec![
            handle_payload(5, &[(2, Cell::from("ann"))]),
            handle_payload(6, &[(2, Cell::from("bo")), (3, Cell::I64(40))]),
        ];

        let mutations =
            collect_mutations(MysqlTranslator.gen_insert_sqls("s", &table, &rows).unwrap())
                .unwrap();

        assert_eq!(mutations.len(), 2);
        for mutation in &mutations {
            assert_eq!(
                mutation.sql(),
                "replace into s.t (id,name,age) values (?,?,?);"
            );
        }
        assert_eq!(
            mutations[1].params(),
            &[Cell::I64(6), Cell::from("bo"), Cell::I64(40)]
        );
    }

    #[test]
    fn corrupt_insert_row_does_not_affect_siblings() {
        let table = people_table();
        let mut corrupt = handle_payload(6, &[(2, Cell::from("bo"))]);
        corrupt.extend(values_payload(&[Cell::I64(3)]));
        let rows = vec![handle_payload(5, &[]), corrupt, handle_payload(7, &[])];

        let results = MysqlTranslator.gen_insert_sqls("s", &table, &rows).unwrap();

        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().unwrap_err().kind(),
            ErrorKind::DecodeCorruption
        );
        assert!(results[2].is_ok());
    }

    #[test]
    fn update_sets_new_values_then_binds_old_values() {
        let table = composite_key_table();
        let pairs = [(3, Cell::Null), (1, Cell::I64(100)), (2, Cell::I64(7))];
        let rows = vec![handle_payload(1, &pairs)];

        let mutations =
            collect_mutations(MysqlTranslator.gen_update_sqls("s", &table, &rows).unwrap())
                .unwrap();

        assert_eq!(
            mutations[0].sql(),
            "update s.orders set order_id = ?, line = ?, note = ? where line = ? and order_id = ? limit 1;"
        );
        assert_eq!(
            mutations[0].params(),
            &[
                Cell::I64(100),
                Cell::I64(7),
                Cell::Null,
                Cell::I64(7),
                Cell::I64(100)
            ]
        );
    }

    #[test]
    fn update_without_identity_compares_whole_old_row() {
        let table = keyless_table();
        let rows = vec![snapshot_update_payload(
            &[(1, Cell::from("a")), (2, Cell::Null)],
            &[(1, Cell::from("a")), (2, Cell::from("b"))],
        )];

        let mutations =
            collect_mutations(MysqlTranslator.gen_update_sqls("s", &table, &rows).unwrap())
                .unwrap();

        assert_eq!(
            mutations[0].sql(),
            "update s.events set kind = ?, body = ? where kind = ? and body is ? limit 1;"
        );
        assert_eq!(
            mutations[0].params(),
            &[
                Cell::from("a"),
                Cell::from("b"),
                Cell::from("a"),
                Cell::Null
            ]
        );
    }

    #[test]
    fn delete_by_identity_without_identity_fails_for_the_batch() {
        let table = keyless_table();
        // The payload is not even decodable, identity is checked first.
        let rows = vec![vec![0xff]];

        let err = MysqlTranslator
            .gen_delete_sqls("s", &table, DeleteMode::ByIdentity, &rows)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingIdentity);
    }

    #[test]
    fn delete_by_columns_binds_present_values() {
        let table = people_table();
        let rows = vec![pairs_payload(&[(1, Cell::I64(5)), (3, Cell::Null)])];

        let mutations = collect_mutations(
            MysqlTranslator
                .gen_delete_sqls("s", &table, DeleteMode::ByColumns, &rows)
                .unwrap(),
        )
        .unwrap();

        assert_eq!(
            mutations[0].sql(),
            "delete from s.t where id = ? and age is ? limit 1;"
        );
        assert_eq!(mutations[0].params(), &[Cell::I64(5), Cell::Null]);
    }

    #[test]
    fn delete_by_row_id_requires_handle_column() {
        let table = composite_key_table();

        let err = MysqlTranslator
            .gen_delete_sqls_by_id("s", &table, &[1])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingIdentity);
    }

    #[test]
    fn ddl_is_scoped_to_schema() {
        assert_eq!(
            MysqlTranslator
                .gen_ddl_sql("s", "ALTER TABLE t ADD COLUMN c INT")
                .unwrap(),
            "use s; ALTER TABLE t ADD COLUMN c INT;"
        );
    }

    #[test]
    fn index_and_rename_ddl_is_passed_through() {
        for query in [
            "RENAME TABLE a TO b",
            "DROP INDEX idx_c ON t",
            "ALTER TABLE t DROP INDEX idx_c",
        ] {
            assert_eq!(
                MysqlTranslator.gen_ddl_sql("s", query).unwrap(),
                format!("use s; {query};")
            );
        }
    }

    #[test]
    fn create_database_is_not_scoped() {
        assert_eq!(
            MysqlTranslator
                .gen_ddl_sql("s", "CREATE DATABASE s;")
                .unwrap(),
            "CREATE DATABASE s;"
        );
    }

    #[test]
    fn unparsable_ddl_is_parse_failure() {
        let err = MysqlTranslator
            .gen_ddl_sql("s", "CREATE TABL t (id INT)")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnderlyingParseFailure);
    }

    #[test]
    fn several_ddl_statements_are_unsupported() {
        let err = MysqlTranslator
            .gen_ddl_sql("s", "DROP TABLE a; DROP TABLE b")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }
}

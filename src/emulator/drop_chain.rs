/// DROP family: table and database drops go through the administrative API.
///
/// Successful DDL reports zero affected rows. Index and view drops have no
/// link and run on the backend.
use log::info;

use super::chain::{Chain, ChainQuery};
use super::context::EmulatorContext;
use crate::analyzer::{DropQuery, DropTarget};
use crate::core::{CompatError, ResultSet};
use crate::vtctld::VtctldClient;

impl ChainQuery for DropQuery {
    type Pattern = DropTarget;

    fn pattern(&self) -> Result<Option<DropTarget>, CompatError> {
        self.target()
    }
}

pub fn build(with_vtctld: bool) -> Result<Chain<DropQuery>, CompatError> {
    let builder = Chain::builder("drop");
    if !with_vtctld {
        return builder.build();
    }
    builder
        .link(DropTarget::Table, drop_table)
        .link(DropTarget::Database, drop_database)
        .build()
}

/// `DROP [TEMPORARY] TABLE [IF EXISTS] [db.]t [, ...]`
fn drop_table(query: &DropQuery, context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let vtctld = context.vtctld()?;

    for object in query.object_expressions()? {
        let keyspace = object.schema_or(context.keyspace());

        if query.if_exists() && !table_listed(vtctld, keyspace, &object.name)? {
            info!("DROP TABLE IF EXISTS: {keyspace}.{} not found, skipping", object.name);
            continue;
        }
        vtctld.drop_table(keyspace, &object.name)?;
    }

    Ok(ResultSet::empty())
}

// A table in a keyspace the API does not list is not listed either.
fn table_listed(vtctld: &dyn VtctldClient, keyspace: &str, table: &str) -> Result<bool, CompatError> {
    if !vtctld.list_keyspaces()?.iter().any(|k| k == keyspace) {
        return Ok(false);
    }
    Ok(vtctld.list_tables(keyspace)?.iter().any(|t| t == table))
}

/// `DROP {DATABASE | SCHEMA} [IF EXISTS] db`
fn drop_database(query: &DropQuery, context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let vtctld = context.vtctld()?;
    let object = query.object_expression()?;
    if object.schema.is_some() {
        return Err(CompatError::MalformedQuery(format!(
            "database name '{}' cannot be qualified",
            query.object()?
        )));
    }

    if query.if_exists() && !vtctld.list_keyspaces()?.contains(&object.name) {
        info!("DROP DATABASE IF EXISTS: {} not found, skipping", object.name);
        return Ok(ResultSet::empty());
    }
    vtctld.drop_database(&object.name)?;

    Ok(ResultSet::empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analyzer::{QueryAnalyzer, QueryDecorator};
    use crate::vtctld::{StaticCatalog, TableMetadata, VtctldCall};

    fn setup() -> (Arc<StaticCatalog>, EmulatorContext, Chain<DropQuery>) {
        let catalog = Arc::new(
            StaticCatalog::new()
                .with_table("user", TableMetadata::new("orders"))
                .with_table("user", TableMetadata::new("users"))
                .with_table("lookup", TableMetadata::new("orders_idx")),
        );
        let context = EmulatorContext::new("user", Some(catalog.clone()));
        (catalog, context, build(true).unwrap())
    }

    fn run(chain: &Chain<DropQuery>, context: &EmulatorContext, sql: &str) -> Result<Option<ResultSet>, CompatError> {
        let query = DropQuery::wrap(QueryAnalyzer::new().analyze(sql).unwrap());
        chain.get_result(&query, context)
    }

    #[test]
    fn test_drop_table_calls_vtctld_once() {
        let (catalog, context, chain) = setup();
        let result = run(&chain, &context, "DROP TABLE orders").unwrap().unwrap();

        assert_eq!(result.rows_affected(), 0);
        assert!(result.is_empty());
        assert_eq!(
            catalog.calls(),
            vec![VtctldCall::DropTable {
                keyspace: "user".to_string(),
                table: "orders".to_string(),
            }]
        );
    }

    #[test]
    fn test_drop_qualified_and_multiple_tables() {
        let (catalog, context, chain) = setup();
        run(&chain, &context, "DROP TABLE users, lookup.orders_idx").unwrap();

        assert_eq!(
            catalog.calls(),
            vec![
                VtctldCall::DropTable {
                    keyspace: "user".to_string(),
                    table: "users".to_string(),
                },
                VtctldCall::DropTable {
                    keyspace: "lookup".to_string(),
                    table: "orders_idx".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_drop_table_if_exists_skips_missing() {
        let (catalog, context, chain) = setup();
        run(&chain, &context, "DROP TABLE IF EXISTS nope").unwrap().unwrap();
        assert_eq!(
            catalog.calls(),
            vec![VtctldCall::ListKeyspaces, VtctldCall::ListTables("user".to_string())]
        );

        assert!(matches!(
            run(&chain, &context, "DROP TABLE nope"),
            Err(CompatError::Vtctld(_))
        ));
    }

    #[test]
    fn test_drop_table_if_exists_in_missing_keyspace() {
        let (catalog, context, chain) = setup();
        let result = run(&chain, &context, "DROP TABLE IF EXISTS nope.t, users")
            .unwrap()
            .unwrap();
        assert_eq!(result.rows_affected(), 0);
        assert!(!catalog.calls().contains(&VtctldCall::ListTables("nope".to_string())));
        assert_eq!(
            catalog.calls().last(),
            Some(&VtctldCall::DropTable {
                keyspace: "user".to_string(),
                table: "users".to_string(),
            })
        );

        assert!(matches!(
            run(&chain, &context, "DROP TABLE nope.t"),
            Err(CompatError::Vtctld(_))
        ));
    }

    #[test]
    fn test_drop_database() {
        let (catalog, context, chain) = setup();
        run(&chain, &context, "DROP DATABASE `lookup`").unwrap().unwrap();
        assert_eq!(catalog.calls(), vec![VtctldCall::DropDatabase("lookup".to_string())]);

        run(&chain, &context, "DROP SCHEMA IF EXISTS lookup").unwrap().unwrap();
        assert_eq!(catalog.calls().last(), Some(&VtctldCall::ListKeyspaces));
        assert_eq!(catalog.calls().len(), 2);
    }

    #[test]
    fn test_index_drop_is_not_handled() {
        let (catalog, context, chain) = setup();
        assert!(run(&chain, &context, "DROP INDEX idx ON orders").unwrap().is_none());
        assert!(catalog.calls().is_empty());
    }

    #[test]
    fn test_without_vtctld_nothing_is_handled() {
        let chain = build(false).unwrap();
        let context = EmulatorContext::new("user", None);
        assert!(run(&chain, &context, "DROP TABLE orders").unwrap().is_none());
    }

    #[test]
    fn test_missing_object_is_malformed() {
        let (_, context, chain) = setup();
        assert!(matches!(
            run(&chain, &context, "DROP TABLE"),
            Err(CompatError::MalformedQuery(_))
        ));
    }
}

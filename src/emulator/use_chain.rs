use log::debug;

use super::chain::{Chain, ChainQuery};
use super::context::EmulatorContext;
use crate::analyzer::UseQuery;
use crate::core::{CompatError, ResultSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseTarget {
    Database,
}

impl ChainQuery for UseQuery {
    type Pattern = UseTarget;

    fn pattern(&self) -> Result<Option<UseTarget>, CompatError> {
        Ok(Some(UseTarget::Database))
    }
}

pub fn build() -> Result<Chain<UseQuery>, CompatError> {
    Chain::builder("use").link(UseTarget::Database, use_database).build()
}

/// Always succeeds, whether or not the database exists. The keyspace of the
/// connection is left unchanged.
fn use_database(query: &UseQuery, _context: &EmulatorContext) -> Result<ResultSet, CompatError> {
    let database = query.database()?;
    debug!("USE {database} emulated");
    Ok(ResultSet::empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analyzer::{QueryAnalyzer, QueryDecorator};
    use crate::vtctld::{StaticCatalog, VtctldClient};

    #[test]
    fn test_use_unknown_database_succeeds() {
        let catalog = Arc::new(StaticCatalog::new().with_keyspace("user"));
        let context = EmulatorContext::new("user", Some(catalog.clone()));
        let chain = build().unwrap();

        let query = UseQuery::wrap(QueryAnalyzer::new().analyze("USE tsm").unwrap());
        let result = chain.get_result(&query, &context).unwrap().unwrap();

        assert!(result.is_empty());
        assert_eq!(result.rows_affected(), 0);
        assert!(catalog.calls().is_empty());
        assert!(catalog.list_keyspaces().unwrap().contains(&"user".to_string()));
    }

    #[test]
    fn test_use_without_name_is_malformed() {
        let context = EmulatorContext::new("user", None);
        let query = UseQuery::wrap(QueryAnalyzer::new().analyze("USE").unwrap());
        assert!(matches!(
            build().unwrap().get_result(&query, &context),
            Err(CompatError::MalformedQuery(_))
        ));
    }
}

/// Statement classification and typed query decorators.
///
/// `QueryAnalyzer` turns SQL text into a `Query` with a fixed `QueryType`.
/// Decorators (`DropQuery`, `ShowQuery`, `UseQuery`) take ownership of a
/// `Query` and expose the structured pieces the emulator needs.
mod drop_query;
mod object;
mod query;
mod show_query;
mod use_query;

pub use drop_query::{DropQuery, DropTarget};
pub use object::ObjectExpression;
pub use query::{AnalyzedQuery, Placeholder, Query, QueryDecorator, QueryType};
pub use show_query::{ShowCommand, ShowQuery};
pub use use_query::UseQuery;

use crate::core::CompatError;
use crate::parser::{parse_sql, ParseTree};

#[derive(Debug, Default, Clone, Copy)]
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses and classifies one statement.
    pub fn analyze(&self, sql: &str) -> Result<Query, CompatError> {
        let tree = parse_sql(sql)?;
        self.classify(sql, tree)
    }

    /// Derives the statement kind from the first top-level clause.
    pub fn classify(&self, sql: &str, tree: ParseTree) -> Result<Query, CompatError> {
        let Some(clause) = tree.first() else {
            return Err(CompatError::UnsupportedStatement(sql.trim().to_string()));
        };
        let query_type = QueryType::from_keyword(&clause.keyword);
        Ok(Query::new(sql.to_string(), query_type, tree))
    }
}

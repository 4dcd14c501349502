use super::query::{AnalyzedQuery, Query, QueryDecorator};
use crate::core::CompatError;
use crate::parser::unquote_identifier;

/// USE statement decorator.
#[derive(Debug)]
pub struct UseQuery {
    query: Query,
}

impl UseQuery {
    /// The unquoted database name.
    pub fn database(&self) -> Result<String, CompatError> {
        match self.expressions() {
            [db] if db.is_name() => Ok(unquote_identifier(&db.base_expr)),
            [] => Err(CompatError::MalformedQuery("USE without a database".to_string())),
            _ => Err(CompatError::MalformedQuery(format!(
                "USE expects a single database name: {}",
                self.sql()
            ))),
        }
    }
}

impl AnalyzedQuery for UseQuery {
    fn query(&self) -> &Query {
        &self.query
    }
}

impl QueryDecorator for UseQuery {
    fn wrap(query: Query) -> Self {
        Self { query }
    }

    fn into_inner(self) -> Query {
        self.query
    }
}

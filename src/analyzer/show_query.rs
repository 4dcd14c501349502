use std::cell::OnceCell;

use super::query::{AnalyzedQuery, Query, QueryDecorator};
use crate::core::CompatError;
use crate::parser::{unquote_identifier, unquote_string, ExprType, Expression};

/// SHOW sub-commands the compatibility layer knows how to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowCommand {
    Tables,
    Databases,
    Collation,
    CreateDatabase,
    TableStatus,
}

#[derive(Debug, Default)]
struct ShowParts {
    command: Option<ShowCommand>,
    full: bool,
    if_not_exists: bool,
    database: Option<String>,
    like: Option<String>,
}

/// SHOW statement decorator.
#[derive(Debug)]
pub struct ShowQuery {
    query: Query,
    parts: OnceCell<ShowParts>,
}

impl ShowQuery {
    /// `None` when the SHOW variant is not one of `ShowCommand`, or when it
    /// carries clauses (`WHERE`, ...) that only the backend can evaluate.
    pub fn command(&self) -> Result<Option<ShowCommand>, CompatError> {
        Ok(self.parts()?.command)
    }

    /// `FROM`/`IN` database, or the database named by SHOW CREATE DATABASE.
    pub fn database(&self) -> Result<Option<&str>, CompatError> {
        Ok(self.parts()?.database.as_deref())
    }

    /// Unquoted `LIKE` pattern.
    pub fn like_pattern(&self) -> Result<Option<&str>, CompatError> {
        Ok(self.parts()?.like.as_deref())
    }

    pub fn is_full(&self) -> Result<bool, CompatError> {
        Ok(self.parts()?.full)
    }

    pub fn if_not_exists(&self) -> Result<bool, CompatError> {
        Ok(self.parts()?.if_not_exists)
    }

    fn parts(&self) -> Result<&ShowParts, CompatError> {
        if let Some(parts) = self.parts.get() {
            return Ok(parts);
        }
        let parts = parse_show(self.expressions())?;
        Ok(self.parts.get_or_init(|| parts))
    }
}

fn parse_show(expressions: &[Expression]) -> Result<ShowParts, CompatError> {
    let mut parts = ShowParts::default();
    let mut rest = expressions;

    let keyword = |rest: &[Expression], word: &str| rest.first().is_some_and(|e| e.is_reserved(word));

    if keyword(rest, "FULL") {
        parts.full = true;
        rest = &rest[1..];
    }

    let command = if keyword(rest, "TABLES") {
        rest = &rest[1..];
        ShowCommand::Tables
    } else if keyword(rest, "DATABASES") || keyword(rest, "SCHEMAS") {
        rest = &rest[1..];
        ShowCommand::Databases
    } else if keyword(rest, "COLLATION") {
        rest = &rest[1..];
        ShowCommand::Collation
    } else if keyword(rest, "TABLE") && keyword(&rest[1..], "STATUS") {
        rest = &rest[2..];
        ShowCommand::TableStatus
    } else if keyword(rest, "CREATE")
        && (keyword(&rest[1..], "DATABASE") || keyword(&rest[1..], "SCHEMA"))
    {
        rest = &rest[2..];
        if keyword(rest, "IF") && keyword(&rest[1..], "NOT") && keyword(&rest[2..], "EXISTS") {
            parts.if_not_exists = true;
            rest = &rest[3..];
        }
        let Some(name) = rest.first().filter(|e| e.is_name()) else {
            return Err(CompatError::MalformedQuery(
                "SHOW CREATE DATABASE without a database name".to_string(),
            ));
        };
        parts.database = Some(unquote_identifier(&name.base_expr));
        rest = &rest[1..];
        ShowCommand::CreateDatabase
    } else {
        return Ok(parts);
    };

    if parts.full && command != ShowCommand::Tables {
        return Ok(parts);
    }

    if command != ShowCommand::CreateDatabase && (keyword(rest, "FROM") || keyword(rest, "IN")) {
        match rest.get(1).filter(|e| e.is_name()) {
            Some(db) => parts.database = Some(unquote_identifier(&db.base_expr)),
            None => {
                return Err(CompatError::MalformedQuery(
                    "SHOW ... FROM without a database name".to_string(),
                ));
            }
        }
        rest = &rest[2..];
    }

    if command != ShowCommand::CreateDatabase && keyword(rest, "LIKE") {
        match rest.get(1).filter(|e| e.expr_type == ExprType::Constant) {
            Some(pattern) => parts.like = Some(unquote_string(&pattern.base_expr)),
            None => {
                return Err(CompatError::MalformedQuery(
                    "SHOW ... LIKE without a pattern".to_string(),
                ));
            }
        }
        rest = &rest[2..];
    }

    if rest.is_empty() {
        parts.command = Some(command);
    }
    Ok(parts)
}

impl AnalyzedQuery for ShowQuery {
    fn query(&self) -> &Query {
        &self.query
    }
}

impl QueryDecorator for ShowQuery {
    fn wrap(query: Query) -> Self {
        Self {
            query,
            parts: OnceCell::new(),
        }
    }

    fn into_inner(self) -> Query {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::QueryAnalyzer;

    fn show(sql: &str) -> ShowQuery {
        ShowQuery::wrap(QueryAnalyzer::new().analyze(sql).unwrap())
    }

    #[test]
    fn test_commands() {
        assert_eq!(show("SHOW TABLES").command().unwrap(), Some(ShowCommand::Tables));
        assert_eq!(show("show databases").command().unwrap(), Some(ShowCommand::Databases));
        assert_eq!(show("SHOW SCHEMAS").command().unwrap(), Some(ShowCommand::Databases));
        assert_eq!(show("SHOW COLLATION").command().unwrap(), Some(ShowCommand::Collation));
        assert_eq!(show("SHOW TABLE STATUS").command().unwrap(), Some(ShowCommand::TableStatus));
        assert_eq!(
            show("SHOW CREATE DATABASE `user`").command().unwrap(),
            Some(ShowCommand::CreateDatabase)
        );
    }

    #[test]
    fn test_unknown_or_filtered_variants() {
        assert_eq!(show("SHOW VARIABLES").command().unwrap(), None);
        assert_eq!(show("SHOW TABLES WHERE Tables_in_user = 'x'").command().unwrap(), None);
        assert_eq!(show("SHOW FULL COLLATION").command().unwrap(), None);
        assert_eq!(show("SHOW").command().unwrap(), None);
    }

    #[test]
    fn test_from_and_like() {
        let query = show("SHOW TABLES FROM `lookup` LIKE 'ord%'");
        assert_eq!(query.command().unwrap(), Some(ShowCommand::Tables));
        assert_eq!(query.database().unwrap(), Some("lookup"));
        assert_eq!(query.like_pattern().unwrap(), Some("ord%"));

        let status = show("SHOW TABLE STATUS IN user");
        assert_eq!(status.database().unwrap(), Some("user"));
        assert_eq!(status.like_pattern().unwrap(), None);
    }

    #[test]
    fn test_keyword_database_names() {
        let query = show("SHOW TABLES FROM status");
        assert_eq!(query.command().unwrap(), Some(ShowCommand::Tables));
        assert_eq!(query.database().unwrap(), Some("status"));

        let query = show("SHOW FULL TABLES IN tables LIKE 'a%'");
        assert_eq!(query.database().unwrap(), Some("tables"));
        assert_eq!(query.like_pattern().unwrap(), Some("a%"));

        assert_eq!(show("SHOW CREATE DATABASE session").database().unwrap(), Some("session"));
        assert_eq!(show("SHOW TABLE STATUS FROM 2fa").database().unwrap(), Some("2fa"));
        assert!(matches!(
            show("SHOW TABLES FROM where").command(),
            Err(CompatError::MalformedQuery(_))
        ));
    }

    #[test]
    fn test_full_tables() {
        let query = show("SHOW FULL TABLES");
        assert_eq!(query.command().unwrap(), Some(ShowCommand::Tables));
        assert!(query.is_full().unwrap());
    }

    #[test]
    fn test_create_database() {
        let query = show("SHOW CREATE DATABASE IF NOT EXISTS `user`");
        assert_eq!(query.database().unwrap(), Some("user"));
        assert!(query.if_not_exists().unwrap());

        assert!(matches!(
            show("SHOW CREATE DATABASE").command(),
            Err(CompatError::MalformedQuery(_))
        ));
    }
}

// Module declarations
mod common;
mod clauses;
mod tree;

pub use common::{parse_identifier_chain, tokenize, unquote_identifier, unquote_string, Token};
pub use tree::{Clause, ExprType, Expression, ParseTree};

use crate::core::CompatError;

/// Generic SQL parse: text to clause tree.
///
/// Only lexical errors fail here; a statement that starts with something other
/// than a statement keyword yields an empty tree, which the classifier rejects.
pub fn parse_sql(input: &str) -> Result<ParseTree, CompatError> {
    let tokens = tokenize(input)?;
    Ok(clauses::build_tree(&tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_use() {
        let tree = parse_sql("USE tsm").unwrap();
        let clause = tree.first().unwrap();
        assert_eq!(clause.keyword, "USE");
        assert_eq!(clause.expressions.len(), 1);
        assert_eq!(clause.expressions[0].base_expr, "tsm");
    }

    #[test]
    fn test_parse_insert() {
        let tree = parse_sql("INSERT INTO user (name) VALUES (?)").unwrap();
        let keywords: Vec<&str> = tree.clauses.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["INSERT", "INTO", "VALUES"]);

        let values = tree.clause("values").unwrap();
        assert_eq!(values.expressions[0].sub_tree[0].expr_type, ExprType::Placeholder);
    }

    #[test]
    fn test_parse_keyword_case_is_normalised() {
        let tree = parse_sql("show collation").unwrap();
        assert_eq!(tree.first().unwrap().keyword, "SHOW");
        assert_eq!(tree.first().unwrap().expressions[0].base_expr, "collation");
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_sql("SELECT \"x"), Err(CompatError::ParseError(_))));
    }
}

/// Assembly of the generic parse tree from tokens.
///
/// DML statements are split into clauses at top-level clause keywords; every
/// other statement family is a single clause. DROP gets a structured object
/// node so typed decorators can find the target name.
use super::common::Token;
use super::tree::{Clause, ExprType, Expression, ParseTree};

const STATEMENT_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "REPLACE", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER", "SHOW", "USE",
    "SET", "BEGIN", "START", "COMMIT", "ROLLBACK", "TRUNCATE", "RENAME", "DESCRIBE", "DESC",
    "EXPLAIN", "GRANT", "REVOKE", "CALL", "LOCK", "UNLOCK", "WITH",
];

const DML_KEYWORDS: &[&str] = &["SELECT", "INSERT", "REPLACE", "UPDATE", "DELETE"];

const CLAUSE_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "GROUP", "HAVING", "ORDER", "LIMIT", "INTO", "VALUES", "VALUE",
    "SET", "UNION",
];

// MySQL reserved words: never valid as bare names.
const RESERVED: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASCADE", "CASE", "CHARACTER", "CREATE", "CROSS",
    "DATABASE", "DATABASES", "DEFAULT", "DESC", "DISTINCT", "ELSE", "EXISTS", "FALSE", "FOR",
    "FROM", "GROUP", "HAVING", "IF", "IGNORE", "IN", "INDEX", "INNER", "INTO", "IS", "JOIN", "KEY",
    "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "RESTRICT",
    "RIGHT", "SCHEMA", "SCHEMAS", "SET", "TABLE", "THEN", "TRUE", "UNION", "UNIQUE", "UPDATE",
    "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

// Non-reserved keywords: keywords by position, names everywhere else.
const KEYWORDS: &[&str] = &[
    "CHARSET", "COLLATION", "COLUMNS", "DUPLICATE", "END", "ENGINE", "FIELDS", "FULL", "GLOBAL",
    "OFFSET", "SESSION", "STATUS", "TABLES", "TEMPORARY", "VARIABLES", "VIEW",
];

fn is_reserved(word: &str) -> bool {
    is_one_of(word, RESERVED)
}

fn is_one_of(word: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Builds the tree; an unrecognised leading token gives an empty tree.
pub fn build_tree(tokens: &[Token]) -> ParseTree {
    let mut end = tokens.len();
    while end > 0 && tokens[end - 1].is_symbol(";") {
        end -= 1;
    }
    let tokens = &tokens[..end];

    let Some((Token::Word(first), rest)) = tokens.split_first() else {
        return ParseTree::default();
    };
    if !is_one_of(first, STATEMENT_KEYWORDS) {
        return ParseTree::default();
    }

    let keyword = first.to_ascii_uppercase();
    let clauses = if keyword == "DROP" {
        vec![Clause {
            keyword,
            expressions: drop_expressions(rest),
        }]
    } else if is_one_of(&keyword, DML_KEYWORDS) {
        split_clauses(keyword, rest)
    } else {
        vec![Clause {
            keyword,
            expressions: leaves(rest),
        }]
    };

    ParseTree { clauses }
}

fn split_clauses(statement: String, tokens: &[Token]) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut keyword = statement;
    let mut start = 0;
    let mut depth = 0usize;
    let mut idx = 0;

    while idx < tokens.len() {
        let token = &tokens[idx];
        if token.is_symbol("(") {
            depth += 1;
        } else if token.is_symbol(")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 {
            if let Token::Word(word) = token {
                if is_one_of(word, CLAUSE_KEYWORDS) {
                    clauses.push(Clause {
                        keyword,
                        expressions: leaves(&tokens[start..idx]),
                    });
                    keyword = word.to_ascii_uppercase();
                    if matches!(keyword.as_str(), "GROUP" | "ORDER")
                        && tokens.get(idx + 1).is_some_and(|t| t.is_word("BY"))
                    {
                        keyword.push_str(" BY");
                        idx += 1;
                    }
                    start = idx + 1;
                }
            }
        }
        idx += 1;
    }

    clauses.push(Clause {
        keyword,
        expressions: leaves(&tokens[start..]),
    });
    clauses
}

fn leaf(token: &Token) -> Expression {
    let expr_type = match token {
        Token::Word(w) if is_reserved(w) => ExprType::Reserved,
        Token::Word(w) if is_one_of(w, KEYWORDS) => ExprType::Keyword,
        Token::Word(_) | Token::Identifier(_) => ExprType::Identifier,
        Token::Str(_) | Token::Number(_) => ExprType::Constant,
        Token::Placeholder(_) => ExprType::Placeholder,
        Token::Symbol(_) => ExprType::Operator,
    };
    Expression::leaf(expr_type, token.text())
}

/// Flat token run to expression nodes, nesting parenthesised groups.
fn leaves(tokens: &[Token]) -> Vec<Expression> {
    let mut stack: Vec<Vec<Expression>> = vec![Vec::new()];

    for token in tokens {
        if token.is_symbol("(") {
            stack.push(Vec::new());
        } else if token.is_symbol(")") && stack.len() > 1 {
            let children = stack.pop().unwrap_or_default();
            let text = children
                .iter()
                .map(|c| c.base_expr.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(parent) = stack.last_mut() {
                parent.push(Expression::node(ExprType::Bracket, format!("({text})"), children));
            }
        } else if let Some(current) = stack.last_mut() {
            current.push(leaf(token));
        }
    }

    // Unbalanced '(' : fold the open groups back into their parents.
    while stack.len() > 1 {
        let children = stack.pop().unwrap_or_default();
        if let Some(parent) = stack.last_mut() {
            parent.push(Expression::node(ExprType::Bracket, "(", children));
        }
    }
    stack.pop().unwrap_or_default()
}

fn is_name_token(token: &Token) -> bool {
    match token {
        Token::Word(w) => !is_reserved(w),
        Token::Identifier(_) => true,
        _ => false,
    }
}

/// `DROP [TEMPORARY] <object> [IF EXISTS] <name> [, <name> ...] [tail]`
///
/// The object node comes first; its sub-tree holds the first target's
/// fragments, then keyword tails and one `Expression` node for any further
/// targets. Option words follow the object node at top level.
fn drop_expressions(tokens: &[Token]) -> Vec<Expression> {
    let mut options = Vec::new();
    let mut rest = tokens;

    if rest.first().is_some_and(|t| t.is_word("TEMPORARY")) {
        options.push(Expression::leaf(ExprType::Reserved, rest[0].text()));
        rest = &rest[1..];
    }

    let Some((Token::Word(kind_word), after_kind)) = rest.split_first() else {
        options.extend(leaves(rest));
        return options;
    };
    let kind = match kind_word.to_ascii_uppercase().as_str() {
        "TABLE" | "TABLES" => ExprType::Table,
        "DATABASE" | "SCHEMA" => ExprType::Database,
        "INDEX" => ExprType::Index,
        "VIEW" => ExprType::View,
        _ => ExprType::Reserved,
    };
    rest = after_kind;

    if rest.len() >= 2 && rest[0].is_word("IF") && rest[1].is_word("EXISTS") {
        options.push(Expression::leaf(
            ExprType::Reserved,
            format!("{} {}", rest[0].text(), rest[1].text()),
        ));
        rest = &rest[2..];
    }

    let name_len = rest.iter().take_while(|t| is_name_token(t)).count();
    let mut sub_tree: Vec<Expression> = rest[..name_len]
        .iter()
        .map(|t| Expression::leaf(ExprType::Identifier, t.text()))
        .collect();
    rest = &rest[name_len..];

    if rest.first().is_some_and(|t| t.is_symbol(",")) {
        let list_len = rest
            .iter()
            .take_while(|t| t.is_symbol(",") || is_name_token(t))
            .count();
        let targets: Vec<Expression> = rest[..list_len]
            .iter()
            .filter(|t| !t.is_symbol(","))
            .map(|t| Expression::leaf(ExprType::Identifier, t.text()))
            .collect();
        let text = rest[..list_len]
            .iter()
            .map(Token::text)
            .collect::<Vec<_>>()
            .join(" ");
        sub_tree.push(Expression::node(ExprType::Expression, text, targets));
        rest = &rest[list_len..];
    }
    sub_tree.extend(leaves(rest));

    let mut expressions = vec![Expression::node(kind, kind_word.as_str(), sub_tree)];
    expressions.extend(options);
    expressions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::common::tokenize;

    fn tree(sql: &str) -> ParseTree {
        build_tree(&tokenize(sql).unwrap())
    }

    #[test]
    fn test_select_is_split_into_clauses() {
        let tree = tree("SELECT id, name FROM user WHERE id = 1 ORDER BY name LIMIT 5;");
        let keywords: Vec<&str> = tree.clauses.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["SELECT", "FROM", "WHERE", "ORDER BY", "LIMIT"]);
    }

    #[test]
    fn test_subquery_does_not_split() {
        let tree = tree("SELECT * FROM (SELECT id FROM t) AS x");
        let from = tree.clause("FROM").unwrap();
        assert_eq!(from.expressions[0].expr_type, ExprType::Bracket);
        assert_eq!(tree.clauses.len(), 2);
    }

    #[test]
    fn test_drop_table_tree() {
        let tree = tree("DROP TABLE IF EXISTS orders CASCADE");
        let clause = tree.first().unwrap();
        assert_eq!(clause.keyword, "DROP");

        let object = &clause.expressions[0];
        assert_eq!(object.expr_type, ExprType::Table);
        assert_eq!(object.sub_tree[0], Expression::leaf(ExprType::Identifier, "orders"));
        assert!(object.sub_tree[1].no_quotes);
        assert!(clause.expressions[1].is_reserved("IF EXISTS"));
    }

    #[test]
    fn test_drop_table_list() {
        let tree = tree("DROP TABLE a, b, `c`");
        let object = &tree.first().unwrap().expressions[0];
        assert_eq!(object.sub_tree.len(), 2);
        let list = &object.sub_tree[1];
        assert_eq!(list.expr_type, ExprType::Expression);
        let names: Vec<&str> = list.sub_tree.iter().map(|e| e.base_expr.as_str()).collect();
        assert_eq!(names, vec!["b", "`c`"]);
    }

    #[test]
    fn test_drop_database_tree() {
        let tree = tree("drop schema `user`");
        let object = &tree.first().unwrap().expressions[0];
        assert_eq!(object.expr_type, ExprType::Database);
        assert_eq!(object.base_expr, "schema");
        assert_eq!(object.sub_tree[0].base_expr, "`user`");
    }

    #[test]
    fn test_unknown_statement_gives_empty_tree() {
        assert!(tree("FOO bar").is_empty());
        assert!(tree("").is_empty());
        assert!(tree(";").is_empty());
        assert!(tree("(SELECT 1)").is_empty());
    }

    #[test]
    fn test_show_is_single_clause() {
        let tree = tree("SHOW TABLES FROM user LIKE 'ord%'");
        assert_eq!(tree.clauses.len(), 1);
        let expressions = &tree.first().unwrap().expressions;
        assert!(expressions[0].is_reserved("TABLES"));
        assert!(expressions[1].is_reserved("FROM"));
        assert_eq!(expressions[2].expr_type, ExprType::Identifier);
        assert_eq!(expressions[4].expr_type, ExprType::Constant);
    }
}

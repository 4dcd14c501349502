use crate::parser::{ExprType, Expression, ParseTree};

/// Statement kind, derived once when the query is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Create,
    Show,
    Use,
    Other,
}

impl QueryType {
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" => Self::Select,
            "INSERT" | "REPLACE" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "DROP" => Self::Drop,
            "CREATE" => Self::Create,
            "SHOW" => Self::Show,
            "USE" => Self::Use,
            _ => Self::Other,
        }
    }

    /// Statements sent down the read path when run through `query()`.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Select | Self::Show)
    }
}

/// A placeholder found in the statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Positional,
    Named(String),
}

/// A classified statement. Immutable once built by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    sql: String,
    query_type: QueryType,
    tree: ParseTree,
}

impl Query {
    /// Classified queries are only built by `QueryAnalyzer::classify`, which
    /// guarantees a non-empty tree.
    pub(crate) const fn new(sql: String, query_type: QueryType, tree: ParseTree) -> Self {
        Self {
            sql,
            query_type,
            tree,
        }
    }

    /// Placeholders in statement order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut found = Vec::new();
        for clause in &self.tree.clauses {
            for expression in &clause.expressions {
                expression.walk(&mut |e: &Expression| {
                    if e.expr_type == ExprType::Placeholder {
                        found.push(match e.base_expr.strip_prefix(':') {
                            Some(name) => Placeholder::Named(name.to_string()),
                            None => Placeholder::Positional,
                        });
                    }
                });
            }
        }
        found
    }
}

/// Read access shared by `Query` and every decorator wrapping one.
pub trait AnalyzedQuery {
    fn query(&self) -> &Query;

    fn sql(&self) -> &str {
        &self.query().sql
    }

    fn query_type(&self) -> QueryType {
        self.query().query_type
    }

    fn parse_tree(&self) -> &ParseTree {
        &self.query().tree
    }

    /// Top-level expressions of the statement clause.
    fn expressions(&self) -> &[Expression] {
        match self.parse_tree().first() {
            Some(clause) => &clause.expressions,
            None => &[],
        }
    }
}

impl AnalyzedQuery for Query {
    fn query(&self) -> &Query {
        self
    }
}

/// A typed wrapper that owns a `Query` and adds statement-specific accessors.
pub trait QueryDecorator: AnalyzedQuery + Sized {
    fn wrap(query: Query) -> Self;

    fn into_inner(self) -> Query;
}

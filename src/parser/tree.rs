/// Node type tags of the generic parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    /// Reserved keyword (`TABLE`, `IF EXISTS`, `LIKE`, ...)
    Reserved,
    /// Non-reserved keyword (`TABLES`, `STATUS`, ...); also usable as a name
    Keyword,
    Identifier,
    /// String or numeric literal
    Constant,
    /// `?` or `:name`
    Placeholder,
    Operator,
    /// Parenthesised group; children in `sub_tree`
    Bracket,
    /// Compound grouping of several nodes; children in `sub_tree`
    Expression,
    // DROP object nodes
    Table,
    Database,
    Index,
    View,
}

/// One node of the parse tree.
///
/// `base_expr` is the fragment exactly as written (quotes and case kept).
/// `no_quotes` marks keyword/operator fragments that are never treated as
/// (quote-strippable) identifier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub expr_type: ExprType,
    pub base_expr: String,
    pub no_quotes: bool,
    pub sub_tree: Vec<Expression>,
}

impl Expression {
    #[must_use]
    pub fn leaf(expr_type: ExprType, base_expr: impl Into<String>) -> Self {
        Self {
            expr_type,
            base_expr: base_expr.into(),
            no_quotes: matches!(
                expr_type,
                ExprType::Reserved | ExprType::Keyword | ExprType::Operator
            ),
            sub_tree: Vec::new(),
        }
    }

    #[must_use]
    pub fn node(expr_type: ExprType, base_expr: impl Into<String>, sub_tree: Vec<Self>) -> Self {
        Self {
            expr_type,
            base_expr: base_expr.into(),
            no_quotes: false,
            sub_tree,
        }
    }

    /// Case-insensitive keyword test.
    #[must_use]
    pub fn is_reserved(&self, keyword: &str) -> bool {
        matches!(self.expr_type, ExprType::Reserved | ExprType::Keyword)
            && self.base_expr.eq_ignore_ascii_case(keyword)
    }

    /// Whether this node can stand for a database or table name.
    #[must_use]
    pub fn is_name(&self) -> bool {
        matches!(self.expr_type, ExprType::Identifier | ExprType::Keyword)
    }

    /// Depth-first walk over this node and all of its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Self)) {
        visit(self);
        for child in &self.sub_tree {
            child.walk(visit);
        }
    }
}

/// A top-level clause: the clause keyword (upper-cased) and its expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub keyword: String,
    pub expressions: Vec<Expression>,
}

/// Generic parse tree: the ordered clauses of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTree {
    pub clauses: Vec<Clause>,
}

impl ParseTree {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The statement clause (first clause), if any.
    #[must_use]
    pub fn first(&self) -> Option<&Clause> {
        self.clauses.first()
    }

    #[must_use]
    pub fn clause(&self, keyword: &str) -> Option<&Clause> {
        self.clauses
            .iter()
            .find(|c| c.keyword.eq_ignore_ascii_case(keyword))
    }
}

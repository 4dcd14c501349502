use std::cell::OnceCell;

use super::object::ObjectExpression;
use super::query::{AnalyzedQuery, Query, QueryDecorator};
use crate::core::CompatError;
use crate::parser::{ExprType, Expression};

/// Which kind of object a DROP statement removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Table,
    Database,
    Index,
    View,
}

/// DROP statement decorator.
///
/// The object name is computed from the parse tree on first access and cached.
#[derive(Debug)]
pub struct DropQuery {
    query: Query,
    object: OnceCell<String>,
    after_object_index: OnceCell<usize>,
}

impl DropQuery {
    fn object_node(&self) -> Result<&Expression, CompatError> {
        self.expressions()
            .first()
            .ok_or_else(|| CompatError::MalformedQuery("DROP without an object".to_string()))
    }

    /// Object kind, from the type of the object node. `None` for objects the
    /// parser does not type (`DROP USER`, `DROP TRIGGER`, ...).
    pub fn target(&self) -> Result<Option<DropTarget>, CompatError> {
        Ok(match self.object_node()?.expr_type {
            ExprType::Table => Some(DropTarget::Table),
            ExprType::Database => Some(DropTarget::Database),
            ExprType::Index => Some(DropTarget::Index),
            ExprType::View => Some(DropTarget::View),
            _ => None,
        })
    }

    /// Target name exactly as written: the object node's fragments up to the
    /// first compound or keyword child, joined with single spaces.
    pub fn object(&self) -> Result<&str, CompatError> {
        if let Some(object) = self.object.get() {
            return Ok(object);
        }

        let sub_tree = &self.object_node()?.sub_tree;
        if sub_tree.is_empty() {
            return Err(CompatError::MalformedQuery("Object missing.".to_string()));
        }

        let mut parts = Vec::new();
        let mut boundary = sub_tree.len();
        for (index, expr) in sub_tree.iter().enumerate() {
            if expr.expr_type == ExprType::Expression || expr.no_quotes {
                boundary = index;
                break;
            }
            parts.push(expr.base_expr.as_str());
        }

        if parts.is_empty() {
            return Err(CompatError::MalformedQuery("Object missing.".to_string()));
        }

        let _ = self.after_object_index.set(boundary);
        Ok(self.object.get_or_init(|| parts.join(" ")))
    }

    /// Index of the first object-node child past the target name.
    pub fn after_object_index(&self) -> Result<usize, CompatError> {
        self.object()?;
        self.after_object_index
            .get()
            .copied()
            .ok_or_else(|| CompatError::MalformedQuery("Object missing.".to_string()))
    }

    /// The object name re-parsed into `[schema.]name`.
    pub fn object_expression(&self) -> Result<ObjectExpression, CompatError> {
        ObjectExpression::parse(self.object()?)
    }

    /// Every target of the statement, first one included (`DROP TABLE a, b`).
    pub fn object_expressions(&self) -> Result<Vec<ObjectExpression>, CompatError> {
        let mut objects = vec![self.object_expression()?];

        let boundary = self.after_object_index()?;
        if let Some(list) = self
            .object_node()?
            .sub_tree
            .get(boundary)
            .filter(|e| e.expr_type == ExprType::Expression)
        {
            for target in &list.sub_tree {
                objects.push(ObjectExpression::parse(&target.base_expr)?);
            }
        }

        Ok(objects)
    }

    #[must_use]
    pub fn if_exists(&self) -> bool {
        self.has_option("IF EXISTS")
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.has_option("TEMPORARY")
    }

    fn has_option(&self, option: &str) -> bool {
        self.expressions()
            .iter()
            .skip(1)
            .any(|e| e.is_reserved(option))
    }
}

impl AnalyzedQuery for DropQuery {
    fn query(&self) -> &Query {
        &self.query
    }
}

impl QueryDecorator for DropQuery {
    fn wrap(query: Query) -> Self {
        Self {
            query,
            object: OnceCell::new(),
            after_object_index: OnceCell::new(),
        }
    }

    fn into_inner(self) -> Query {
        self.query
    }
}

use std::fmt::Debug;

use super::context::EmulatorContext;
use crate::analyzer::QueryDecorator;
use crate::core::{CompatError, ResultSet};

/// A decorated query that a chain can dispatch on.
///
/// `pattern()` names the object or sub-command the statement targets;
/// `None` means no link of any chain can answer it.
pub trait ChainQuery: QueryDecorator {
    type Pattern: Copy + PartialEq + Debug;

    fn pattern(&self) -> Result<Option<Self::Pattern>, CompatError>;
}

pub type LinkAction<Q> = fn(&Q, &EmulatorContext) -> Result<ResultSet, CompatError>;

/// One handler entry: the pattern it answers for and what it does.
pub struct Link<Q: ChainQuery> {
    pattern: Q::Pattern,
    action: LinkAction<Q>,
}

/// Ordered handlers for one command family. First match wins.
pub struct Chain<Q: ChainQuery> {
    name: &'static str,
    links: Vec<Link<Q>>,
}

impl<Q: ChainQuery> Chain<Q> {
    #[must_use]
    pub const fn builder(name: &'static str) -> ChainBuilder<Q> {
        ChainBuilder {
            name,
            links: Vec::new(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Patterns in dispatch order.
    pub fn patterns(&self) -> impl Iterator<Item = Q::Pattern> + '_ {
        self.links.iter().map(|link| link.pattern)
    }

    /// `Ok(None)` when no link answers for the query: the caller defers to
    /// the backend.
    pub fn get_result(
        &self,
        query: &Q,
        context: &EmulatorContext,
    ) -> Result<Option<ResultSet>, CompatError> {
        let Some(pattern) = query.pattern()? else {
            return Ok(None);
        };

        for link in &self.links {
            if link.pattern == pattern {
                return (link.action)(query, context).map(Some);
            }
        }
        Ok(None)
    }
}

pub struct ChainBuilder<Q: ChainQuery> {
    name: &'static str,
    links: Vec<Link<Q>>,
}

impl<Q: ChainQuery> ChainBuilder<Q> {
    #[must_use]
    pub fn link(mut self, pattern: Q::Pattern, action: LinkAction<Q>) -> Self {
        self.links.push(Link { pattern, action });
        self
    }

    /// Rejects a chain in which two links claim the same pattern.
    pub fn build(self) -> Result<Chain<Q>, CompatError> {
        for (index, link) in self.links.iter().enumerate() {
            if self.links[..index].iter().any(|l| l.pattern == link.pattern) {
                return Err(CompatError::AmbiguousChainConfiguration {
                    chain: self.name,
                    pattern: format!("{:?}", link.pattern),
                });
            }
        }

        Ok(Chain {
            name: self.name,
            links: self.links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{DropQuery, DropTarget, QueryAnalyzer};

    fn drop_query(sql: &str) -> DropQuery {
        DropQuery::wrap(QueryAnalyzer::new().analyze(sql).unwrap())
    }

    fn affected_one(_: &DropQuery, _: &EmulatorContext) -> Result<ResultSet, CompatError> {
        Ok(ResultSet::affected(1, 0))
    }

    fn affected_two(_: &DropQuery, _: &EmulatorContext) -> Result<ResultSet, CompatError> {
        Ok(ResultSet::affected(2, 0))
    }

    #[test]
    fn test_duplicate_pattern_is_rejected() {
        let result = Chain::<DropQuery>::builder("drop")
            .link(DropTarget::Table, affected_one)
            .link(DropTarget::Database, affected_two)
            .link(DropTarget::Table, affected_two)
            .build();

        match result {
            Err(CompatError::AmbiguousChainConfiguration { chain, pattern }) => {
                assert_eq!(chain, "drop");
                assert_eq!(pattern, "Table");
            }
            other => panic!("expected ambiguous chain error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_links_tried_in_order() {
        let chain = Chain::<DropQuery>::builder("drop")
            .link(DropTarget::Database, affected_two)
            .link(DropTarget::Table, affected_one)
            .build()
            .unwrap();
        let context = EmulatorContext::new("user", None);

        let table = chain.get_result(&drop_query("DROP TABLE t"), &context).unwrap();
        assert_eq!(table.unwrap().rows_affected(), 1);

        let database = chain.get_result(&drop_query("DROP DATABASE d"), &context).unwrap();
        assert_eq!(database.unwrap().rows_affected(), 2);

        assert_eq!(
            chain.patterns().collect::<Vec<_>>(),
            vec![DropTarget::Database, DropTarget::Table]
        );
    }

    #[test]
    fn test_no_matching_link_is_not_handled() {
        let chain = Chain::<DropQuery>::builder("drop")
            .link(DropTarget::Table, affected_one)
            .build()
            .unwrap();
        let context = EmulatorContext::new("user", None);

        assert!(chain.get_result(&drop_query("DROP VIEW v"), &context).unwrap().is_none());
        assert!(chain.get_result(&drop_query("DROP USER bob"), &context).unwrap().is_none());
    }
}

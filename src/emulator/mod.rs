/// Compatibility emulator: answers administrative statements locally.
///
/// One chain per command family (DROP, SHOW, USE). Chains are built once,
/// when the emulator is constructed, and never change afterwards.
mod chain;
mod context;
mod drop_chain;
mod show_chain;
mod use_chain;

pub use chain::{Chain, ChainBuilder, ChainQuery, Link, LinkAction};
pub use context::EmulatorContext;
pub use show_chain::like_matches;
pub use use_chain::UseTarget;

use std::sync::Arc;

use log::debug;

use crate::analyzer::{AnalyzedQuery, DropQuery, Query, QueryType, ShowQuery, UseQuery};
use crate::core::{CompatError, ResultSet};
use crate::vtctld::VtctldClient;

/// Outcome of asking the emulator about a statement.
#[derive(Debug)]
pub enum Emulation {
    /// Answered locally. The backend must not be contacted.
    Emulated(ResultSet),
    /// Not emulated. The query is handed back for the backend.
    Deferred(Query),
}

pub struct Emulator {
    context: EmulatorContext,
    drop_chain: Chain<DropQuery>,
    show_chain: Chain<ShowQuery>,
    use_chain: Chain<UseQuery>,
}

impl Emulator {
    /// Without a vtctld client only the static emulations (USE, SHOW
    /// COLLATION, SHOW CREATE DATABASE) are linked.
    pub fn new(keyspace: &str, vtctld: Option<Arc<dyn VtctldClient>>) -> Result<Self, CompatError> {
        let context = EmulatorContext::new(keyspace, vtctld);
        let with_vtctld = context.has_vtctld();
        Ok(Self {
            context,
            drop_chain: drop_chain::build(with_vtctld)?,
            show_chain: show_chain::build(with_vtctld)?,
            use_chain: use_chain::build()?,
        })
    }

    #[must_use]
    pub const fn context(&self) -> &EmulatorContext {
        &self.context
    }

    pub fn get_result(&self, query: Query) -> Result<Emulation, CompatError> {
        match query.query_type() {
            QueryType::Drop => self.dispatch(&self.drop_chain, query),
            QueryType::Show => self.dispatch(&self.show_chain, query),
            QueryType::Use => self.dispatch(&self.use_chain, query),
            _ => Ok(Emulation::Deferred(query)),
        }
    }

    fn dispatch<Q: ChainQuery>(&self, chain: &Chain<Q>, query: Query) -> Result<Emulation, CompatError> {
        let decorated = Q::wrap(query);
        match chain.get_result(&decorated, &self.context)? {
            Some(result) => {
                debug!("{} chain emulated: {}", chain.name(), decorated.sql());
                Ok(Emulation::Emulated(result))
            }
            None => Ok(Emulation::Deferred(decorated.into_inner())),
        }
    }
}

/// Connection facade: configuration, transactions and statement execution.
///
/// A `Connection` owns one emulator and one executor for its lifetime.
/// Statements run through the executor: reads (SELECT, SHOW) on the read
/// path when issued through `query`, everything else on the write path.
pub mod config;
pub mod dsn;
pub mod statement;

pub use config::{ConnectionConfig, VtctldAddress};
pub use dsn::Dsn;
pub use statement::Statement;

use std::cell::Cell;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::analyzer::{Query, QueryAnalyzer};
use crate::backend::{Backend, BindVars};
use crate::core::{CompatError, ResultSet};
use crate::emulator::Emulator;
use crate::executor::Executor;
use crate::params::ParamProcessor;
use crate::vtctld::VtctldClient;

pub struct Connection {
    config: ConnectionConfig,
    analyzer: QueryAnalyzer,
    executor: Executor,
    params: ParamProcessor,
    in_transaction: Cell<bool>,
    last_insert_id: Cell<u64>,
}

impl Connection {
    pub fn open(
        config: ConnectionConfig,
        backend: Arc<dyn Backend>,
        vtctld: Option<Arc<dyn VtctldClient>>,
    ) -> Result<Self, CompatError> {
        info!(
            "Opening connection to {} (keyspace {}, vtctld {})",
            config.address(),
            config.keyspace,
            if vtctld.is_some() { "enabled" } else { "disabled" }
        );
        let emulator = Emulator::new(&config.keyspace, vtctld)?;
        let executor = Executor::new(Arc::new(emulator), backend, config.read_tablet_type);

        Ok(Self {
            config,
            analyzer: QueryAnalyzer::new(),
            executor,
            params: ParamProcessor::default(),
            in_transaction: Cell::new(false),
            last_insert_id: Cell::new(0),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    #[must_use]
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    pub(crate) const fn params(&self) -> &ParamProcessor {
        &self.params
    }

    /// Runs a statement on the write path and returns the affected row count.
    pub fn exec(&self, sql: &str) -> Result<u64, CompatError> {
        let query = self.analyzer.analyze(sql)?;
        let result = self.run(query, &BindVars::new(), false)?;
        Ok(result.rows_affected())
    }

    /// Prepares and executes a statement without parameters.
    pub fn query(&self, sql: &str) -> Result<Statement<'_>, CompatError> {
        let mut statement = self.prepare(sql)?;
        statement.execute()?;
        Ok(statement)
    }

    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>, CompatError> {
        let query = self.analyzer.analyze(sql)?;
        Ok(Statement::new(self, query))
    }

    pub(crate) fn run(&self, query: Query, params: &BindVars, read: bool) -> Result<ResultSet, CompatError> {
        let result = if read {
            self.executor.execute_read(query, params)?
        } else {
            self.executor.execute_write(query, params)?
        };
        if result.last_insert_id() != 0 {
            self.last_insert_id.set(result.last_insert_id());
        }
        Ok(result)
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    /// `Ok(false)` when a transaction is already open.
    pub fn begin_transaction(&self) -> Result<bool, CompatError> {
        if self.in_transaction() {
            return Ok(false);
        }
        self.executor.backend().begin()?;
        self.in_transaction.set(true);
        debug!("Transaction started");
        Ok(true)
    }

    /// `Ok(false)` without an open transaction or when the backend refuses
    /// the commit. The transaction is closed either way.
    pub fn commit(&self) -> Result<bool, CompatError> {
        if !self.in_transaction() {
            return Ok(false);
        }
        self.in_transaction.set(false);
        match self.executor.backend().commit() {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Commit failed: {e}");
                Ok(false)
            }
        }
    }

    pub fn rollback(&self) -> Result<bool, CompatError> {
        if !self.in_transaction() {
            return Err(CompatError::NoActiveTransaction);
        }
        self.in_transaction.set(false);
        match self.executor.backend().rollback() {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Rollback failed: {e}");
                Ok(false)
            }
        }
    }

    #[must_use]
    pub fn last_insert_id(&self) -> u64 {
        self.last_insert_id.get()
    }

    /// String literal for inlining into SQL: `it's` -> `'it''s'`.
    pub fn quote(&self, value: &str) -> Result<String, CompatError> {
        self.params.quote(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, LoopbackBackend};
    use crate::vtctld::{StaticCatalog, TableMetadata};

    fn connection(backend: Arc<LoopbackBackend>) -> Connection {
        let catalog: Arc<dyn VtctldClient> =
            Arc::new(StaticCatalog::new().with_table("user", TableMetadata::new("orders")));
        Connection::open(ConnectionConfig::default(), backend, Some(catalog)).unwrap()
    }

    #[test]
    fn test_exec_returns_rows_affected() {
        let backend = Arc::new(
            LoopbackBackend::new().with_result("INSERT INTO user (name) VALUES ('a')", ResultSet::affected(1, 42)),
        );
        let connection = connection(backend);

        assert_eq!(connection.exec("INSERT INTO user (name) VALUES ('a')").unwrap(), 1);
        assert_eq!(connection.last_insert_id(), 42);
        assert_eq!(connection.exec("USE tsm").unwrap(), 0);
        assert_eq!(connection.last_insert_id(), 42);
    }

    #[test]
    fn test_transactions() {
        let backend = Arc::new(LoopbackBackend::new());
        let connection = connection(backend.clone());

        assert!(!connection.commit().unwrap());
        assert!(matches!(connection.rollback(), Err(CompatError::NoActiveTransaction)));

        assert!(connection.begin_transaction().unwrap());
        assert!(!connection.begin_transaction().unwrap());
        assert!(connection.in_transaction());
        assert!(connection.commit().unwrap());
        assert!(!connection.in_transaction());

        assert!(connection.begin_transaction().unwrap());
        assert!(connection.rollback().unwrap());

        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::Begin,
                BackendCall::Commit,
                BackendCall::Begin,
                BackendCall::Rollback,
            ]
        );
    }

    #[test]
    fn test_quote() {
        let connection = connection(Arc::new(LoopbackBackend::new()));
        assert_eq!(connection.quote("Naughty ' string").unwrap(), "'Naughty '' string'");
    }

    #[test]
    fn test_unsupported_statement() {
        let connection = connection(Arc::new(LoopbackBackend::new()));
        assert!(matches!(
            connection.exec("FROBNICATE everything"),
            Err(CompatError::UnsupportedStatement(_))
        ));
    }
}

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use log::debug;

use super::{Backend, BindVars, TabletType};
use crate::analyzer::{AnalyzedQuery, Query};
use crate::core::{CompatError, ResultSet};

/// One call received by `LoopbackBackend`.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Write {
        sql: String,
        params: BindVars,
        tablet_type: TabletType,
    },
    Read {
        sql: String,
        params: BindVars,
        tablet_type: TabletType,
    },
    Begin,
    Commit,
    Rollback,
}

/// In-process backend client.
///
/// Answers every statement with a canned result (registered per SQL text) or
/// an empty one, and records each call. `fail_on` makes a statement fail the
/// way a real backend error would.
#[derive(Debug, Default)]
pub struct LoopbackBackend {
    canned: Mutex<HashMap<String, ResultSet>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<BackendCall>>,
}

impl LoopbackBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `result` whenever `sql` is executed.
    #[must_use]
    pub fn with_result(self, sql: &str, result: ResultSet) -> Self {
        self.canned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sql.trim().to_string(), result);
        self
    }

    /// Fails with `BackendExecution` whenever `sql` is executed.
    #[must_use]
    pub fn fail_on(self, sql: &str) -> Self {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sql.trim().to_string());
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn answer(&self, sql: &str) -> Result<ResultSet, CompatError> {
        let sql = sql.trim();
        if self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(sql)
        {
            return Err(CompatError::BackendExecution(format!(
                "loopback backend rejected: {sql}"
            )));
        }

        Ok(self
            .canned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sql)
            .cloned()
            .unwrap_or_else(ResultSet::empty))
    }
}

impl Backend for LoopbackBackend {
    fn execute_write(
        &self,
        query: &Query,
        params: &BindVars,
        tablet_type: TabletType,
    ) -> Result<ResultSet, CompatError> {
        debug!("loopback write ({tablet_type}): {}", query.sql());
        self.record(BackendCall::Write {
            sql: query.sql().to_string(),
            params: params.clone(),
            tablet_type,
        });
        self.answer(query.sql())
    }

    fn execute_read(
        &self,
        query: &Query,
        params: &BindVars,
        tablet_type: TabletType,
    ) -> Result<ResultSet, CompatError> {
        debug!("loopback read ({tablet_type}): {}", query.sql());
        self.record(BackendCall::Read {
            sql: query.sql().to_string(),
            params: params.clone(),
            tablet_type,
        });
        self.answer(query.sql())
    }

    fn begin(&self) -> Result<(), CompatError> {
        self.record(BackendCall::Begin);
        Ok(())
    }

    fn commit(&self) -> Result<(), CompatError> {
        self.record(BackendCall::Commit);
        Ok(())
    }

    fn rollback(&self) -> Result<(), CompatError> {
        self.record(BackendCall::Rollback);
        Ok(())
    }
}

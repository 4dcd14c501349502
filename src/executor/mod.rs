/// Executor - single entry point for running classified queries
///
/// Every statement goes to the emulator first. Emulated results return
/// immediately and the backend is never contacted for them; everything else
/// runs on the backend's write path (master) or read path (configured tablet
/// type). The caller picks the path, it is not re-derived here.
use std::sync::Arc;

use log::debug;

use crate::analyzer::{AnalyzedQuery, Query};
use crate::backend::{Backend, BindVars, TabletType};
use crate::core::{CompatError, ResultSet};
use crate::emulator::{Emulation, Emulator};

pub struct Executor {
    emulator: Arc<Emulator>,
    backend: Arc<dyn Backend>,
    read_tablet_type: TabletType,
}

impl Executor {
    #[must_use]
    pub fn new(emulator: Arc<Emulator>, backend: Arc<dyn Backend>, read_tablet_type: TabletType) -> Self {
        Self {
            emulator,
            backend,
            read_tablet_type,
        }
    }

    #[must_use]
    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    #[must_use]
    pub const fn read_tablet_type(&self) -> TabletType {
        self.read_tablet_type
    }

    pub fn execute_write(&self, query: Query, params: &BindVars) -> Result<ResultSet, CompatError> {
        match self.emulator.get_result(query)? {
            Emulation::Emulated(result) => Ok(result),
            Emulation::Deferred(query) => {
                debug!("write path: {}", query.sql());
                self.backend.execute_write(&query, params, TabletType::Master)
            }
        }
    }

    pub fn execute_read(&self, query: Query, params: &BindVars) -> Result<ResultSet, CompatError> {
        match self.emulator.get_result(query)? {
            Emulation::Emulated(result) => Ok(result),
            Emulation::Deferred(query) => {
                debug!("read path ({}): {}", self.read_tablet_type, query.sql());
                self.backend.execute_read(&query, params, self.read_tablet_type)
            }
        }
    }
}

use std::sync::Arc;

use crate::core::CompatError;
use crate::vtctld::VtctldClient;

/// What chain links may consult: the connection keyspace and, when
/// configured, the administrative API.
#[derive(Clone)]
pub struct EmulatorContext {
    keyspace: String,
    vtctld: Option<Arc<dyn VtctldClient>>,
}

impl EmulatorContext {
    #[must_use]
    pub fn new(keyspace: &str, vtctld: Option<Arc<dyn VtctldClient>>) -> Self {
        Self {
            keyspace: keyspace.to_string(),
            vtctld,
        }
    }

    #[must_use]
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    #[must_use]
    pub const fn has_vtctld(&self) -> bool {
        self.vtctld.is_some()
    }

    pub fn vtctld(&self) -> Result<&dyn VtctldClient, CompatError> {
        self.vtctld
            .as_deref()
            .ok_or_else(|| CompatError::Vtctld("no vtctld client configured".to_string()))
    }
}

impl std::fmt::Debug for EmulatorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulatorContext")
            .field("keyspace", &self.keyspace)
            .field("vtctld", &self.vtctld.is_some())
            .finish()
    }
}

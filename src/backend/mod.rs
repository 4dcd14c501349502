/// Backend client: the real execution path behind the emulator.
///
/// The crate ships the trait and `LoopbackBackend`, an in-process client that
/// records what it is asked to run. A vtgate client lives outside this crate.
pub mod loopback;

pub use loopback::{BackendCall, LoopbackBackend};

use serde::Deserialize;

use crate::analyzer::Query;
use crate::core::{CompatError, Value};

/// Tablet type used as the routing hint for a backend call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabletType {
    Master,
    #[default]
    Replica,
    Rdonly,
}

impl std::fmt::Display for TabletType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Replica => write!(f, "replica"),
            Self::Rdonly => write!(f, "rdonly"),
        }
    }
}

/// Key of a bound parameter: 1-based position for `?`, name for `:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Position(usize),
    Name(String),
}

impl From<usize> for ParamKey {
    fn from(position: usize) -> Self {
        Self::Position(position)
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        Self::Name(name.trim_start_matches(':').to_string())
    }
}

/// Bound parameters in binding order. Re-binding a key replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindVars {
    entries: Vec<(ParamKey, Value)>,
}

impl BindVars {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, key: ParamKey, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &ParamKey) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ParamKey, Value)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub trait Backend: Send + Sync {
    fn execute_write(
        &self,
        query: &Query,
        params: &BindVars,
        tablet_type: TabletType,
    ) -> Result<crate::core::ResultSet, CompatError>;

    fn execute_read(
        &self,
        query: &Query,
        params: &BindVars,
        tablet_type: TabletType,
    ) -> Result<crate::core::ResultSet, CompatError>;

    fn begin(&self) -> Result<(), CompatError>;

    fn commit(&self) -> Result<(), CompatError>;

    fn rollback(&self) -> Result<(), CompatError>;
}

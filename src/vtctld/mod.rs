/// Administrative metadata/lifecycle API (vtctld).
///
/// Used only by emulation chain links: listing keyspaces and tables, table
/// metadata for SHOW TABLE STATUS, and the DROP lifecycle calls.
pub mod catalog;

pub use catalog::{KeyspaceConfig, StaticCatalog, TableConfig, VtctldCall};

use chrono::NaiveDateTime;

use crate::core::CompatError;

/// Metadata the administrative API knows about one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub name: String,
    pub create_time: Option<NaiveDateTime>,
    pub update_time: Option<NaiveDateTime>,
}

impl TableMetadata {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_time: None,
            update_time: None,
        }
    }

    #[must_use]
    pub fn created_at(mut self, create_time: NaiveDateTime) -> Self {
        self.create_time = Some(create_time);
        self
    }
}

pub trait VtctldClient: Send + Sync {
    fn list_keyspaces(&self) -> Result<Vec<String>, CompatError>;

    fn list_tables(&self, keyspace: &str) -> Result<Vec<String>, CompatError>;

    fn table_status(&self, keyspace: &str) -> Result<Vec<TableMetadata>, CompatError>;

    fn drop_table(&self, keyspace: &str, table: &str) -> Result<(), CompatError>;

    fn drop_database(&self, keyspace: &str) -> Result<(), CompatError>;
}

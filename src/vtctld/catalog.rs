use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::NaiveDateTime;
use log::info;
use serde::Deserialize;

use super::{TableMetadata, VtctldClient};
use crate::core::CompatError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Keyspace entry of the shell configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyspaceConfig {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub name: String,
    /// `YYYY-MM-DD HH:MM:SS`
    #[serde(default)]
    pub created: Option<String>,
}

/// One administrative call, as recorded by `StaticCatalog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VtctldCall {
    ListKeyspaces,
    ListTables(String),
    TableStatus(String),
    DropTable { keyspace: String, table: String },
    DropDatabase(String),
}

/// In-memory administrative API: keyspaces and their tables held locally.
///
/// Backs the shell and tests. Every call is recorded and can be inspected
/// with `calls()`.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    keyspaces: RwLock<BTreeMap<String, BTreeMap<String, TableMetadata>>>,
    calls: Mutex<Vec<VtctldCall>>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_keyspace(mut self, keyspace: &str) -> Self {
        self.keyspaces
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(keyspace.to_string())
            .or_default();
        self
    }

    #[must_use]
    pub fn with_table(mut self, keyspace: &str, table: TableMetadata) -> Self {
        self.keyspaces
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(keyspace.to_string())
            .or_default()
            .insert(table.name.clone(), table);
        self
    }

    pub fn from_config(keyspaces: &[KeyspaceConfig]) -> Result<Self, CompatError> {
        let mut catalog = Self::new();
        for keyspace in keyspaces {
            catalog = catalog.with_keyspace(&keyspace.name);
            for table in &keyspace.tables {
                let mut metadata = TableMetadata::new(&table.name);
                if let Some(created) = &table.created {
                    let created = NaiveDateTime::parse_from_str(created, TIMESTAMP_FORMAT)
                        .map_err(|e| {
                            config::ConfigError::Message(format!(
                                "invalid created time '{created}' for table '{}': {e}",
                                table.name
                            ))
                        })?;
                    metadata = metadata.created_at(created);
                }
                catalog = catalog.with_table(&keyspace.name, metadata);
            }
        }
        Ok(catalog)
    }

    /// Calls made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<VtctldCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: VtctldCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn keyspace_not_found(keyspace: &str) -> CompatError {
        CompatError::Vtctld(format!("keyspace '{keyspace}' not found"))
    }
}

impl VtctldClient for StaticCatalog {
    fn list_keyspaces(&self) -> Result<Vec<String>, CompatError> {
        self.record(VtctldCall::ListKeyspaces);
        let keyspaces = self.keyspaces.read().unwrap_or_else(PoisonError::into_inner);
        Ok(keyspaces.keys().cloned().collect())
    }

    fn list_tables(&self, keyspace: &str) -> Result<Vec<String>, CompatError> {
        self.record(VtctldCall::ListTables(keyspace.to_string()));
        let keyspaces = self.keyspaces.read().unwrap_or_else(PoisonError::into_inner);
        keyspaces
            .get(keyspace)
            .map(|tables| tables.keys().cloned().collect())
            .ok_or_else(|| Self::keyspace_not_found(keyspace))
    }

    fn table_status(&self, keyspace: &str) -> Result<Vec<TableMetadata>, CompatError> {
        self.record(VtctldCall::TableStatus(keyspace.to_string()));
        let keyspaces = self.keyspaces.read().unwrap_or_else(PoisonError::into_inner);
        keyspaces
            .get(keyspace)
            .map(|tables| tables.values().cloned().collect())
            .ok_or_else(|| Self::keyspace_not_found(keyspace))
    }

    fn drop_table(&self, keyspace: &str, table: &str) -> Result<(), CompatError> {
        self.record(VtctldCall::DropTable {
            keyspace: keyspace.to_string(),
            table: table.to_string(),
        });
        let mut keyspaces = self.keyspaces.write().unwrap_or_else(PoisonError::into_inner);
        let tables = keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| Self::keyspace_not_found(keyspace))?;

        if tables.remove(table).is_none() {
            return Err(CompatError::Vtctld(format!(
                "table '{table}' not found in keyspace '{keyspace}'"
            )));
        }
        info!("Dropped table {keyspace}.{table}");
        Ok(())
    }

    fn drop_database(&self, keyspace: &str) -> Result<(), CompatError> {
        self.record(VtctldCall::DropDatabase(keyspace.to_string()));
        let mut keyspaces = self.keyspaces.write().unwrap_or_else(PoisonError::into_inner);
        if keyspaces.remove(keyspace).is_none() {
            return Err(Self::keyspace_not_found(keyspace));
        }
        info!("Dropped keyspace {keyspace}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_table("user", TableMetadata::new("users"))
            .with_table("user", TableMetadata::new("orders"))
            .with_keyspace("lookup")
    }

    #[test]
    fn test_listing() {
        let catalog = catalog();
        assert_eq!(catalog.list_keyspaces().unwrap(), vec!["lookup", "user"]);
        assert_eq!(catalog.list_tables("user").unwrap(), vec!["orders", "users"]);
        assert!(catalog.list_tables("lookup").unwrap().is_empty());
        assert!(matches!(catalog.list_tables("nope"), Err(CompatError::Vtctld(_))));
    }

    #[test]
    fn test_drop_table_and_database() {
        let catalog = catalog();
        catalog.drop_table("user", "orders").unwrap();
        assert_eq!(catalog.list_tables("user").unwrap(), vec!["users"]);
        assert!(matches!(
            catalog.drop_table("user", "orders"),
            Err(CompatError::Vtctld(_))
        ));

        catalog.drop_database("lookup").unwrap();
        assert_eq!(catalog.list_keyspaces().unwrap(), vec!["user"]);
    }

    #[test]
    fn test_calls_are_recorded() {
        let catalog = catalog();
        let _ = catalog.list_tables("user");
        let _ = catalog.drop_table("user", "users");
        assert_eq!(
            catalog.calls(),
            vec![
                VtctldCall::ListTables("user".to_string()),
                VtctldCall::DropTable {
                    keyspace: "user".to_string(),
                    table: "users".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = vec![KeyspaceConfig {
            name: "user".to_string(),
            tables: vec![
                TableConfig {
                    name: "users".to_string(),
                    created: Some("2016-06-15 13:12:59".to_string()),
                },
                TableConfig {
                    name: "orders".to_string(),
                    created: None,
                },
            ],
        }];

        let catalog = StaticCatalog::from_config(&config).unwrap();
        let status = catalog.table_status("user").unwrap();
        let users = status.iter().find(|t| t.name == "users").unwrap();
        assert_eq!(
            users.create_time.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2016-06-15 13:12:59"
        );

        let bad = vec![KeyspaceConfig {
            name: "user".to_string(),
            tables: vec![TableConfig {
                name: "users".to_string(),
                created: Some("yesterday".to_string()),
            }],
        }];
        assert!(matches!(StaticCatalog::from_config(&bad), Err(CompatError::Config(_))));
    }
}

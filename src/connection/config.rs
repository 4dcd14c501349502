use std::path::Path;
use std::sync::Arc;

use config::{Config, Environment, File};
use log::info;
use serde::Deserialize;

use super::dsn::Dsn;
use crate::backend::TabletType;
use crate::core::CompatError;
use crate::vtctld::{KeyspaceConfig, StaticCatalog, VtctldClient};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VtctldAddress {
    pub host: String,
    pub port: u16,
}

/// Connection settings.
///
/// Load order, later sources winning: defaults, config file,
/// `VTCOMPAT_*` environment variables, DSN.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_keyspace")]
    pub keyspace: String,
    #[serde(default)]
    pub vtctld: Option<VtctldAddress>,
    #[serde(default)]
    pub read_tablet_type: TabletType,
    /// Seed catalog for the in-memory administrative API.
    #[serde(default)]
    pub keyspaces: Vec<KeyspaceConfig>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    15991
}
fn default_keyspace() -> String {
    "user".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            keyspace: default_keyspace(),
            vtctld: None,
            read_tablet_type: TabletType::default(),
            keyspaces: Vec::new(),
        }
    }
}

impl ConnectionConfig {
    pub fn load(path: Option<&Path>, dsn: Option<&str>) -> Result<Self, CompatError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
            info!("Loaded config from: {}", path.display());
        }

        // VTCOMPAT_KEYSPACE, VTCOMPAT_READ_TABLET_TYPE, VTCOMPAT_VTCTLD__HOST, ...
        builder = builder.add_source(
            Environment::with_prefix("VTCOMPAT")
                .prefix_separator("_")
                .separator("__"),
        );

        if let Some(dsn) = dsn {
            let dsn = Dsn::parse(dsn)?;
            builder = builder
                .set_override("host", dsn.host)?
                .set_override("port", i64::from(dsn.port))?;
            if let Some(dbname) = dsn.dbname {
                builder = builder.set_override("keyspace", dbname)?;
            }
            if let Some((host, port)) = dsn.vtctld {
                builder = builder
                    .set_override("vtctld.host", host)?
                    .set_override("vtctld.port", i64::from(port))?;
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Administrative client for this configuration, `None` without a
    /// `vtctld` address. The catalog is seeded from `keyspaces` plus the
    /// connection keyspace.
    pub fn vtctld_client(&self) -> Result<Option<Arc<dyn VtctldClient>>, CompatError> {
        let Some(vtctld) = &self.vtctld else {
            info!("No vtctld configured, administrative statements go to the backend");
            return Ok(None);
        };
        info!("Administrative API at {}:{}", vtctld.host, vtctld.port);
        let catalog = StaticCatalog::from_config(&self.keyspaces)?.with_keyspace(&self.keyspace);
        let client: Arc<dyn VtctldClient> = Arc::new(catalog);
        Ok(Some(client))
    }

    /// `host:port` of the backend.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

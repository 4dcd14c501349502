// Connection facade against the loopback backend and the in-memory catalog
use std::io::Write;
use std::sync::Arc;

use vtcompat::backend::{BackendCall, LoopbackBackend};
use vtcompat::connection::{Connection, ConnectionConfig};
use vtcompat::fetcher::{FetchMode, RowKey};
use vtcompat::params::ParamType;
use vtcompat::vtctld::{StaticCatalog, VtctldClient};
use vtcompat::{CompatError, ResultSet, Value};

fn open(config: ConnectionConfig, backend: Arc<LoopbackBackend>) -> Connection {
    let catalog = StaticCatalog::from_config(&config.keyspaces)
        .unwrap()
        .with_keyspace(&config.keyspace);
    let vtctld: Arc<dyn VtctldClient> = Arc::new(catalog);
    Connection::open(config, backend, Some(vtctld)).unwrap()
}

#[test]
fn test_connection_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        br#"
keyspace = "user"

[[keyspaces]]
name = "user"
tables = [
    { name = "orders", created = "2016-06-15 13:12:59" },
    { name = "user" },
]
"#,
    )
    .unwrap();

    let config = ConnectionConfig::load(Some(file.path()), None).unwrap();
    let connection = open(config, Arc::new(LoopbackBackend::new()));

    let mut tables = connection.query("SHOW TABLES").unwrap();
    let rows = tables.fetch_all(FetchMode::Assoc);
    let names: Vec<String> = rows
        .iter()
        .map(|row| row.get_name("Tables_in_user").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["orders", "user"]);

    let mut status = connection.query("SHOW TABLE STATUS").unwrap();
    assert_eq!(status.column_count(), 18);
    let first = status.fetch(FetchMode::Assoc).unwrap();
    assert_eq!(first.get_name("Name"), Some(&Value::from("orders")));
    assert_eq!(
        first.get_name("Create_time").map(ToString::to_string),
        Some("2016-06-15 13:12:59".to_string())
    );
}

#[test]
fn test_dsn_keyspace() {
    let config = ConnectionConfig::load(None, Some("vitess:host=localhost;port=15991;dbname=lookup")).unwrap();
    let connection = open(config, Arc::new(LoopbackBackend::new()));

    let statement = connection.query("SHOW TABLES").unwrap();
    assert_eq!(statement.result().unwrap().columns(), &["Tables_in_lookup"]);
    assert_eq!(statement.row_count(), 0);
}

#[test]
fn test_use_and_drop() {
    let backend = Arc::new(LoopbackBackend::new());
    let connection = open(ConnectionConfig::default(), backend.clone());

    assert_eq!(connection.query("USE tsm").unwrap().row_count(), 0);
    assert!(matches!(
        connection.exec("DROP TABLE orders"),
        Err(CompatError::Vtctld(_))
    ));
    assert_eq!(connection.exec("DROP TABLE IF EXISTS orders").unwrap(), 0);
    assert!(backend.calls().is_empty());
}

#[test]
fn test_fetch_modes_on_backend_result() {
    let rows = ResultSet::new(
        vec!["id".to_string(), "name".to_string()],
        vec![
            vec![Value::Integer(1), Value::from("alice")],
            vec![Value::Integer(2), Value::from("bob")],
        ],
    )
    .unwrap();
    let backend = Arc::new(LoopbackBackend::new().with_result("SELECT id, name FROM user", rows));
    let connection = open(ConnectionConfig::default(), backend);

    let mut statement = connection.query("SELECT id, name FROM user").unwrap();
    let both = statement.fetch(FetchMode::Both).unwrap();
    assert_eq!(both.len(), 4);
    assert_eq!(both.get(&RowKey::Index(1)), Some(&Value::from("alice")));

    let num = statement.fetch(FetchMode::Num).unwrap();
    assert!(num.keys().all(RowKey::is_index));
    assert!(statement.fetch(FetchMode::Assoc).is_none());
}

#[test]
fn test_prepared_statement_with_transaction() {
    let backend = Arc::new(LoopbackBackend::new());
    let connection = open(ConnectionConfig::default(), backend.clone());

    assert!(connection.begin_transaction().unwrap());
    let mut statement = connection
        .prepare("INSERT INTO user (id, name) VALUES (?, ?)")
        .unwrap();
    statement.bind_value(1_usize, &Value::from("7"), ParamType::Int).unwrap();
    statement.bind_value(2_usize, &Value::from("it's"), ParamType::Str).unwrap();
    statement.execute().unwrap();
    assert!(connection.commit().unwrap());

    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], BackendCall::Begin);
    assert_eq!(calls[2], BackendCall::Commit);
    let BackendCall::Write { params, .. } = &calls[1] else {
        panic!("expected a write, got {:?}", calls[1]);
    };
    let values: Vec<&Value> = params.iter().map(|(_, v)| v).collect();
    assert_eq!(values, vec![&Value::Integer(7), &Value::from("it's")]);
}

#[test]
fn test_rollback_without_transaction() {
    let connection = open(ConnectionConfig::default(), Arc::new(LoopbackBackend::new()));
    assert!(matches!(connection.rollback(), Err(CompatError::NoActiveTransaction)));
    assert_eq!(connection.quote("Naughty ' string").unwrap(), "'Naughty '' string'");
}

#[test]
fn test_vtctld_support_follows_config() {
    let backend = Arc::new(LoopbackBackend::new());
    let config = ConnectionConfig::load(None, Some("vitess:host=localhost;port=15991;dbname=user")).unwrap();
    let vtctld = config.vtctld_client().unwrap();
    assert!(vtctld.is_none());
    let connection = Connection::open(config, backend.clone(), vtctld).unwrap();

    connection.query("SHOW TABLES").unwrap();
    connection.query("SHOW COLLATION").unwrap();
    assert_eq!(
        backend.calls(),
        vec![BackendCall::Read {
            sql: "SHOW TABLES".to_string(),
            params: vtcompat::BindVars::new(),
            tablet_type: vtcompat::TabletType::Replica,
        }]
    );

    let backend = Arc::new(LoopbackBackend::new());
    let config = ConnectionConfig::load(
        None,
        Some("vitess:host=localhost;port=15991;dbname=status;vtctld_host=localhost;vtctld_port=15999"),
    )
    .unwrap();
    let vtctld = config.vtctld_client().unwrap();
    let connection = Connection::open(config, backend.clone(), vtctld).unwrap();

    let statement = connection.query("SHOW TABLES FROM status").unwrap();
    assert_eq!(statement.result().unwrap().columns(), &["Tables_in_status"]);
    assert_eq!(connection.exec("DROP TABLE IF EXISTS status.`2fa`").unwrap(), 0);
    assert!(backend.calls().is_empty());
}

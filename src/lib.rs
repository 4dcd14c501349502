// vtcompat - MySQL compatibility layer for Vitess
// Classifies statements, emulates administrative commands, delegates the rest

// Clippy configuration
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::format_push_string)]
#![allow(clippy::float_cmp)]
#![allow(clippy::multiple_crate_versions)]

// Error enum, values, result sets
pub mod core;

// SQL tokenizer and generic parse tree
pub mod parser;

// Statement classification and typed query decorators
pub mod analyzer;

// Administrative metadata/lifecycle API (vtctld)
pub mod vtctld;

// Emulation chains and the emulator facade
pub mod emulator;

// Backend client trait and loopback implementation
pub mod backend;

// Emulator-first execution
pub mod executor;

// Fetch-mode projection of result rows
pub mod fetcher;

// Parameter coercion and escaping
pub mod params;

// DSN, configuration, connection facade, statements
pub mod connection;

// Table / JSON rendering for the shell
pub mod output;

// Re-export commonly used types for convenience
pub use analyzer::{AnalyzedQuery, Query, QueryAnalyzer, QueryType};
pub use backend::{Backend, BindVars, TabletType};
pub use connection::{Connection, ConnectionConfig, Statement};
pub use crate::core::{CompatError, ResultSet, Row, Value};
pub use emulator::{Emulation, Emulator};
pub use executor::Executor;
pub use fetcher::{FetchMode, FetchedRow, Fetcher};
pub use params::{ParamProcessor, ParamType};

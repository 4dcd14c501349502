use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),
    #[error("Malformed query: {0}")]
    MalformedQuery(String),
    #[error("Backend execution error: {0}")]
    BackendExecution(String),
    #[error("Ambiguous chain configuration: chain '{chain}' already has a link for {pattern}")]
    AmbiguousChainConfiguration { chain: &'static str, pattern: String },
    #[error("Vtctld error: {0}")]
    Vtctld(String),
    #[error("Column count mismatch: expected {expected}, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },
    #[error("Unsupported parameter type: {0}")]
    UnsupportedParamType(String),
    #[error("Invalid parameter number: {0}")]
    InvalidParameterNumber(String),
    #[error("No active transaction")]
    NoActiveTransaction,
    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CompatError {
    /// True for errors that came back from the real backend.
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::BackendExecution(_))
    }
}

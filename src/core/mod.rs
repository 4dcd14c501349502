// Module declarations
pub mod error;
pub mod value;
pub mod result;

// Re-exports for convenience
pub use error::CompatError;
pub use value::Value;
pub use result::{ResultSet, Row};

//! Configuration utility types.
//!
//! | Module   | Purpose                                      |
//! |----------|----------------------------------------------|
//! | `error`  | Config loading and watch root error types    |

mod error;

pub use error::{ConfigDiagnostics, ConfigError, ConfigurationError};

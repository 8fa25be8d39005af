//! Logging setup shared by the solmint binaries.
pub mod logging;

pub use logging::{init, LogConfig, LogFormat, LogOutput};

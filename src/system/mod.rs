//! System-level modules
//!
//! - Logging initialization (tracing + rolling file output)

pub mod logging;

pub use logging::init_logging;

//! Application lifecycle
//!
//! - `startup`: store backend and service wiring
//! - `server`: HTTP server
//! - `shutdown`: Ctrl+C handling and dispatcher drain

pub mod server;
pub mod shutdown;
pub mod startup;

pub use server::run_server;

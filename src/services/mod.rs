//! Service layer for business logic
//!
//! Components, leaves first:
//! - `link_store`: link records keyed by alias
//! - `alias`: collision-free alias generation
//! - `dedup_index`: (user, type, url) -> alias
//! - `stats`: per-user and per-event counters
//! - `link_service`: orchestration used by the HTTP handlers

pub mod alias;
pub mod dedup_index;
mod link_service;
pub mod link_store;
pub mod stats;

pub use alias::AliasGenerator;
pub use dedup_index::DedupIndex;
pub use link_service::*;
pub use link_store::LinkStore;
pub use stats::StatsAggregator;

//! Kurz - a small URL shortener with attribution statistics
//!
//! Long URLs are shortened on behalf of a user, an event and an interaction
//! type (invite / share / attend). Every alias resolution is counted, and
//! per-user and per-event statistics are aggregated in a Redis-like
//! key-value store.
//!
//! # Architecture
//! - `store`: key-value store adapters (Redis, in-memory)
//! - `services`: alias generation, link records, dedup index, statistics
//! - `analytics`: background application of click/creation side effects
//! - `api`: HTTP handlers and routes
//! - `config`: configuration loading (TOML + environment + CLI)
//! - `runtime`: startup, HTTP server and graceful shutdown
//! - `system`: logging

pub mod analytics;
pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod services;
pub mod store;
pub mod system;
pub mod utils;

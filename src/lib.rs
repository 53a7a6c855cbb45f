//! linkpulse - URL shortener with race-free click counting
//!
//! Maps long URLs to short codes, redirects visitors, counts every redirect
//! atomically and streams click updates to live subscribers.
//!
//! # Architecture
//! - `services`: code generation, create-or-fetch / redirect / history, QR rendering
//! - `storage`: the `UrlRegistry` trait with sea-orm and in-memory backends
//! - `system`: click notification bus, logging
//! - `api`: HTTP handlers and middleware
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: startup, shutdown and server mode

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;

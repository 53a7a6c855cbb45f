//! Mode routing
//!
//! `serve` is the only long-running mode; `config-gen` is handled directly
//! in the binary.

pub mod server;

pub use server::run_server;

//! System-level modules
//!
//! - Click event fan-out
//! - Logging initialization

pub mod event;
pub mod logging;

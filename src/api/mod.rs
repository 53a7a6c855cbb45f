//! HTTP interface
//!
//! - `POST /api/short`, `GET /api/history`, `GET /api/events`
//! - `GET /{code}`
//! - `GET /health`, `/health/ready`, `/health/live`

mod error;
pub mod middleware;
pub mod services;
pub mod types;

pub use error::status_for;

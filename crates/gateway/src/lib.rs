//! Operational HTTP endpoint.
//!
//! `GET /health` answers 200 with a fixed localized text. It reports process
//! liveness only; engine health is not probed.

pub mod server;

pub use server::{HealthServer, build_health_app, start_health_server};

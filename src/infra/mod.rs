//! Infrastructure adapters: HTTP plumbing to the admin API and runtime bootstrap.

pub mod error;
pub mod http;
pub mod telemetry;

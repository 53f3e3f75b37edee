//! contentdesk: headless client for the marketing content admin API.
//!
//! Layers follow the usual split: `domain` holds pure rules, `infra` talks
//! HTTP and sets up telemetry, `application` builds the editors and resource
//! clients on top, and `config` loads settings.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

mod util;

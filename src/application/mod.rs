//! Application services: resource clients, session state and the two editors.

pub mod auth;
pub mod client;
pub mod company;
pub mod contacts;
pub mod content;
pub mod draft;
pub mod edit;
pub mod error;
pub mod repos;
pub mod shell;
pub mod uploads;

#![deny(clippy::all, clippy::pedantic)]

pub mod auth;
pub mod company;
pub mod contacts;
pub mod content;

//! Domain layer types and invariants.

pub mod content;
pub mod drafts;
pub mod entities;
pub mod error;
pub mod ordering;
pub mod types;

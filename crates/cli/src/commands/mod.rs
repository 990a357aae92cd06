//! CLI command implementations.

pub mod chat;
pub mod doctor;
pub mod onboard;

//! ICS 24: Host Requirements

pub mod error;
pub mod identifier;
pub mod validate;

//! ICS 02: Client implementation for verifying remote IBC-enabled chains.

pub mod error;
pub mod header;
pub mod height;
pub mod msgs;

#![forbid(unsafe_code)]
#![warn(
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]
#![allow(clippy::result_large_err)]

//! Domain types used by the relaying core to reason about a pair of chains:
//! identifiers, heights, channel ends and light-client headers.
//!
//! None of the types in this crate perform any I/O. They are the vocabulary
//! shared by the chain adapters and the handshake state machine.

pub mod core;
pub mod signer;

pub use crate::core::ics02_client::height::Height;

#![forbid(unsafe_code)]
#![warn(
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications,
    rust_2018_idioms
)]
#![allow(clippy::result_large_err)]

//! Relaying core for IBC channels between a pair of chains.
//!
//! The crate drives the channel open handshake from the channel states
//! observed on both chains ([`channel::create_channel`]), keeps the light
//! clients of both chains in sync with each other ([`sync_headers`]), and
//! runs a pluggable packet relaying [`strategy`] off the events emitted by
//! the chains.
//!
//! Everything chain specific sits behind the [`chain::handle::ChainHandle`]
//! trait.

extern crate alloc;

pub mod chain;
pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod path;
pub mod relay_msgs;
pub mod strategy;
pub mod sync_headers;
pub mod util;

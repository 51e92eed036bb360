//! Core protocol modules, named after the ICS standard they cover.

pub mod ics02_client;
pub mod ics04_channel;
pub mod ics24_host;

pub mod counterparty;
pub mod handle;
pub mod requests;
pub mod tracking;

#[cfg(test)]
pub mod mock;

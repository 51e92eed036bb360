//! This module defines the errors raised by chain adapters and the
//! relaying core components built on top of them.

use flex_error::define_error;

use ibc_relay_types::core::ics24_host::identifier::ChainId;
use ibc_relay_types::Height;

define_error! {
    Error {
        Query
            {
                chain_id: ChainId,
                query: String,
                reason: String,
            }
            |e| {
                format_args!("failed to query {} on chain {}: {}",
                    e.query, e.chain_id, e.reason)
            },

        SendFailed
            {
                chain_id: ChainId,
                reason: String,
            }
            |e| {
                format_args!("transaction rejected by chain {}: {}",
                    e.chain_id, e.reason)
            },

        HeaderConstruction
            {
                chain_id: ChainId,
                reason: String,
            }
            |e| {
                format_args!("failed to build update headers for chain {}: {}",
                    e.chain_id, e.reason)
            },

        NonMonotonicHeaders
            {
                chain_id: ChainId,
                previous: Height,
                next: Height,
            }
            |e| {
                format_args!("update headers for chain {} are not strictly increasing: {} followed by {}",
                    e.chain_id, e.previous, e.next)
            },

        MissingHeader
            { chain_id: ChainId }
            |e| {
                format_args!("no latest header known for chain {}", e.chain_id)
            },

        MissingPath
            { chain_id: ChainId }
            |e| {
                format_args!("no path end configured for chain {}", e.chain_id)
            },

        PathChainMismatch
            {
                expected: ChainId,
                actual: ChainId,
            }
            |e| {
                format_args!("path end is configured for chain {} but was attached to chain {}",
                    e.actual, e.expected)
            },

        IdenticalChains
            { chain_id: ChainId }
            |e| {
                format_args!("both ends of the path refer to the same chain {}", e.chain_id)
            },

        Subscription
            { chain_id: ChainId }
            |e| {
                format_args!("event subscription for chain {} was closed", e.chain_id)
            },
    }
}

impl Error {
    /// Whether this error was raised by a chain rejecting a transaction.
    pub fn is_send_error(&self) -> bool {
        matches!(self.detail(), ErrorDetail::SendFailed(_))
    }
}

use core::time::Duration;

use flex_error::define_error;

use ibc_relay_types::core::ics04_channel::channel::State;
use ibc_relay_types::core::ics24_host::identifier::{ChainId, ChannelId, PortId};

use crate::config::Error as ConfigError;
use crate::error::Error as RelayerError;

define_error! {
    ChannelError {
        Relayer
            [ RelayerError ]
            |_| { "relayer error" },

        InvalidPath
            [ RelayerError ]
            |_| { "invalid path configuration" },

        InvalidConfig
            [ ConfigError ]
            |_| { "invalid relayer configuration" },

        MaxRetry
            {
                description: String,
                tries: u64,
                total_delay: Duration,
            }
            [ RelayerError ]
            |e| {
                format_args!("error after maximum retry of {} and total delay of {}s: {}",
                    e.tries, e.total_delay.as_secs(), e.description)
            },

        HeaderRefresh
            [ RelayerError ]
            |_| { "failed to refresh the latest headers" },

        Query
            [ RelayerError ]
            |_| { "failed to query the channel ends" },

        UnexpectedChannelStates
            {
                src_state: State,
                dst_state: State,
            }
            |e| {
                format_args!("unexpected channel states {} <=> {}: no handshake step leads from this pair",
                    e.src_state, e.dst_state)
            },

        HandshakeFailed
            {
                src_chain_id: ChainId,
                src_channel_id: ChannelId,
                src_port_id: PortId,
                dst_chain_id: ChainId,
                dst_channel_id: ChannelId,
                dst_port_id: PortId,
                failures: u64,
            }
            |e| {
                format_args!("channel handshake failed after {} consecutive failures: [{}]chan{{{}}}port{{{}}} -> [{}]chan{{{}}}port{{{}}}",
                    e.failures,
                    e.src_chain_id, e.src_channel_id, e.src_port_id,
                    e.dst_chain_id, e.dst_channel_id, e.dst_port_id)
            },
    }
}

impl ChannelError {
    /// Whether retrying the handshake cannot fix this error, because the
    /// chains are in a state the handshake never produces.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.detail(),
            ChannelErrorDetail::UnexpectedChannelStates(_)
        )
    }
}

use serde::{Deserialize, Serialize};

use ibc_relay_types::core::ics04_channel::channel::{ChannelEnd, State};
use ibc_relay_types::core::ics24_host::identifier::ChainId;
use ibc_relay_types::Height;

/// Pins a query to a chain at a given height.
///
/// All the queries of one handshake step are made against the same
/// heights, taken from the latest headers known to the header synchronizer,
/// so that the proofs they return match the update headers of that step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    pub chain_id: ChainId,
    pub height: Height,
}

impl QueryContext {
    pub fn new(chain_id: ChainId, height: Height) -> Self {
        Self { chain_id, height }
    }

    pub fn height(&self) -> Height {
        self.height
    }
}

/// A channel end together with the proof of its existence and the height
/// at which that proof was produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelWithProof {
    pub channel: ChannelEnd,
    pub proof: Vec<u8>,
    pub proof_height: Option<Height>,
}

impl ChannelWithProof {
    pub fn new(channel: ChannelEnd, proof: Vec<u8>, proof_height: Height) -> Self {
        Self {
            channel,
            proof,
            proof_height: Some(proof_height),
        }
    }

    pub fn state(&self) -> State {
        self.channel.state
    }
}
